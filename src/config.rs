//! Page-size and schema limits
//!
//! Limits are plain values handed to the argument parser and the schema
//! builder; nothing here is read from global state.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Page-size policy for one list field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageConfig {
    /// Page size when the client passes neither `first` nor `last`.
    pub default_limit: usize,
    /// Largest accepted `first`/`last`.
    pub max_limit: usize,
}

impl PageConfig {
    pub const USERS: PageConfig = PageConfig {
        default_limit: 10,
        max_limit: 30,
    };

    pub const TODOS: PageConfig = PageConfig {
        default_limit: 10,
        max_limit: 50,
    };

    pub fn validate(&self) -> Result<()> {
        if self.default_limit == 0 {
            return Err(Error::Config("default_limit must be at least 1".to_string()));
        }
        if self.default_limit > self.max_limit {
            return Err(Error::Config(format!(
                "default_limit {} exceeds max_limit {}",
                self.default_limit, self.max_limit
            )));
        }
        Ok(())
    }
}

/// Settings consumed by [`crate::schema::build_schema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    pub users: PageConfig,
    pub todos: PageConfig,
    /// Maximum query depth. Introspection alone needs about 13.
    pub max_depth: usize,
    pub max_complexity: usize,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            users: PageConfig::USERS,
            todos: PageConfig::TODOS,
            max_depth: 15,
            max_complexity: 500,
        }
    }
}

impl SchemaConfig {
    /// Parse and validate a JSON document; absent keys keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: SchemaConfig =
            serde_json::from_str(raw).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.users.validate()?;
        self.todos.validate()
    }
}
