//! Relay connection arguments
//!
//! Follows the Relay Cursor Connections Specification:
//! https://relay.dev/graphql/connections.htm

use serde::Deserialize;

use crate::config::PageConfig;
use crate::id::{EntityKind, GlobalId};
use crate::{Error, Result};

/// Raw `first`/`after`/`last`/`before` arguments as sent by the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConnectionArgs {
    /// Number of items to return (forward pagination)
    pub first: Option<i32>,

    /// Cursor to start after (forward pagination)
    pub after: Option<String>,

    /// Number of items to return (backward pagination)
    pub last: Option<i32>,

    /// Cursor to end before (backward pagination)
    pub before: Option<String>,
}

/// A validated page request, in exactly one direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    Forward { limit: usize, after: Option<GlobalId> },
    Backward { limit: usize, before: Option<GlobalId> },
}

impl PageRequest {
    pub fn limit(&self) -> usize {
        match self {
            PageRequest::Forward { limit, .. } | PageRequest::Backward { limit, .. } => *limit,
        }
    }

    pub fn cursor(&self) -> Option<&GlobalId> {
        match self {
            PageRequest::Forward { after, .. } => after.as_ref(),
            PageRequest::Backward { before, .. } => before.as_ref(),
        }
    }

    pub fn is_forward(&self) -> bool {
        matches!(self, PageRequest::Forward { .. })
    }
}

impl ConnectionArgs {
    pub fn forward(first: i32, after: Option<String>) -> Self {
        Self {
            first: Some(first),
            after,
            ..Self::default()
        }
    }

    pub fn backward(last: i32, before: Option<String>) -> Self {
        Self {
            last: Some(last),
            before,
            ..Self::default()
        }
    }

    /// Validate the arguments for a list of `kind` entities.
    ///
    /// With neither `first` nor `last`, the page holds `config.default_limit`
    /// rows and the direction follows the lone cursor: `after` alone pages
    /// forward, `before` alone pages backward, no cursor pages forward.
    ///
    /// `config` must have passed [`PageConfig::validate`].
    pub fn parse(&self, kind: EntityKind, config: &PageConfig) -> Result<PageRequest> {
        if self.first.is_some() && self.last.is_some() {
            return Err(Error::InvalidInput(
                "first and last are mutually exclusive".to_string(),
            ));
        }

        let first = self
            .first
            .map(|value| check_limit("first", value, config.max_limit))
            .transpose()?;
        let last = self
            .last
            .map(|value| check_limit("last", value, config.max_limit))
            .transpose()?;

        if first.is_some() && self.before.is_some() {
            return Err(Error::InvalidInput(
                "`before` cannot be combined with `first`".to_string(),
            ));
        }
        if last.is_some() && self.after.is_some() {
            return Err(Error::InvalidInput(
                "`after` cannot be combined with `last`".to_string(),
            ));
        }
        if first.is_none() && last.is_none() && self.after.is_some() && self.before.is_some() {
            return Err(Error::InvalidInput(
                "`after` and `before` cannot be combined".to_string(),
            ));
        }

        let after = decode_cursor("after", self.after.as_deref(), kind)?;
        let before = decode_cursor("before", self.before.as_deref(), kind)?;

        let request = match (first, last) {
            (_, Some(limit)) => PageRequest::Backward { limit, before },
            (Some(limit), None) => PageRequest::Forward { limit, after },
            (None, None) if before.is_some() => PageRequest::Backward {
                limit: config.default_limit,
                before,
            },
            (None, None) => PageRequest::Forward {
                limit: config.default_limit,
                after,
            },
        };
        Ok(request)
    }
}

fn check_limit(argument: &'static str, value: i32, max_limit: usize) -> Result<usize> {
    if value < 1 {
        return Err(Error::InvalidInput(format!(
            "`{argument}` must be at least 1"
        )));
    }
    let limit = value as usize;
    if limit > max_limit {
        return Err(Error::InvalidInput(format!(
            "`{argument}` cannot exceed {max_limit}"
        )));
    }
    Ok(limit)
}

fn decode_cursor(
    argument: &'static str,
    cursor: Option<&str>,
    kind: EntityKind,
) -> Result<Option<GlobalId>> {
    cursor
        .map(|raw| {
            GlobalId::decode_as(raw, kind).map_err(|source| Error::InvalidCursor { argument, source })
        })
        .transpose()
}
