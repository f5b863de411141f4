//! # relay-connections
//!
//! Global identifiers and Relay-style cursor pagination for a GraphQL
//! service where users own todos.
//!
//! ## Features
//!
//! - **Global IDs** - one `"{Kind}:{key}"` identifier space for every entity
//! - **Connection Arguments** - `first`/`after`/`last`/`before` validation
//! - **Deterministic Ordering** - sort field plus primary-key tie-break
//! - **Cursor Pagination** - lookahead paging in both directions
//! - **Schema** - `users`, `todos`, `node(id)` and friends on async-graphql
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use relay_connections::{build_schema, MemoryStore, Repositories, SchemaConfig};
//!
//! # fn main() -> relay_connections::Result<()> {
//! let repos: Arc<dyn Repositories> = Arc::new(MemoryStore::new());
//! let schema = build_schema(repos.clone(), SchemaConfig::default())?;
//! let app = relay_connections::server::router(schema, repos);
//! # Ok(())
//! # }
//! ```

pub mod args;
pub mod config;
pub mod id;
pub mod loader;
pub mod model;
pub mod order;
pub mod pagination;
pub mod schema;
pub mod server;
pub mod storage;
pub mod types;

#[cfg(test)]
mod testing;

pub use args::{ConnectionArgs, PageRequest};
pub use config::{PageConfig, SchemaConfig};
pub use id::{EntityKind, GlobalId, IdError};
pub use model::{Entity, Todo, User};
pub use order::{Direction, OrderBy, OrderSpec, OrderTerm};
pub use pagination::{paginate, Connection, Edge, PageInfo};
pub use schema::{build_schema, Node, TodoSchema};
pub use storage::{MemoryStore, Repositories, Storage, StorageError};
pub use types::Timestamp;

use thiserror::Error;

/// Errors surfaced to resolvers
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid `{argument}` cursor: {source}")]
    InvalidCursor {
        argument: &'static str,
        #[source]
        source: IdError,
    },

    #[error(transparent)]
    Identifier(#[from] IdError),

    #[error("Storage failure: {0}")]
    Internal(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the client caused this error and may see its message.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::InvalidInput(_) | Error::InvalidCursor { .. } | Error::Identifier(_)
        )
    }
}

/// Result type for pagination and lookup operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_errors_are_user_facing() {
        let err: Error = GlobalId::decode("abc123").unwrap_err().into();
        assert!(err.is_user_facing());
        assert!(err.to_string().contains("abc123"));

        let err = Error::InvalidCursor {
            argument: "after",
            source: IdError::IdentifierKindMismatch {
                expected: EntityKind::Todo,
                found: EntityKind::User,
            },
        };
        assert!(err.is_user_facing());
        assert!(err.to_string().contains("`after`"));
    }

    #[test]
    fn test_storage_errors_are_internal() {
        let err: Error = StorageError::Backend("timeout".into()).into();
        assert!(!err.is_user_facing());
        assert!(!Error::Config("bad".into()).is_user_facing());
    }
}
