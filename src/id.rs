//! Opaque global identifiers
//!
//! Every entity exposed through GraphQL is addressed by a single identifier
//! space of the form `"{kind}:{key}"`. The same value doubles as the
//! pagination cursor for that entity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Separator between the kind prefix and the local key.
pub const SEPARATOR: char = ':';

/// Entity types that can sit behind a global identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Todo,
}

impl EntityKind {
    pub const ALL: [EntityKind; 2] = [EntityKind::User, EntityKind::Todo];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::User => "User",
            EntityKind::Todo => "Todo",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| IdError::malformed(s, "unknown entity kind"))
    }
}

/// Identifier decoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    #[error("Malformed identifier `{input}`: {reason}")]
    MalformedIdentifier { input: String, reason: &'static str },

    #[error("Expected a {expected} identifier, got a {found} identifier")]
    IdentifierKindMismatch { expected: EntityKind, found: EntityKind },
}

impl IdError {
    fn malformed(input: &str, reason: &'static str) -> Self {
        IdError::MalformedIdentifier {
            input: input.to_string(),
            reason,
        }
    }
}

/// A decoded global identifier.
///
/// The local key is never empty and never contains [`SEPARATOR`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GlobalId {
    kind: EntityKind,
    local_key: String,
}

impl GlobalId {
    /// Build an identifier from parts the caller knows to be well formed.
    pub fn encode(kind: EntityKind, local_key: impl Into<String>) -> Self {
        let local_key = local_key.into();
        debug_assert!(
            !local_key.is_empty() && !local_key.contains(SEPARATOR),
            "local key `{local_key}` cannot be encoded"
        );
        Self { kind, local_key }
    }

    /// Parse `"{kind}:{key}"`, splitting on the first separator.
    pub fn decode(serialized: &str) -> Result<Self, IdError> {
        let (prefix, local_key) = serialized
            .split_once(SEPARATOR)
            .ok_or_else(|| IdError::malformed(serialized, "missing separator"))?;

        let kind = prefix
            .parse::<EntityKind>()
            .map_err(|_| IdError::malformed(serialized, "unknown entity kind"))?;

        if local_key.is_empty() {
            return Err(IdError::malformed(serialized, "empty local key"));
        }
        if local_key.contains(SEPARATOR) {
            return Err(IdError::malformed(serialized, "local key contains a separator"));
        }

        Ok(Self {
            kind,
            local_key: local_key.to_string(),
        })
    }

    /// Decode and require a specific kind, keeping the full identifier.
    pub fn decode_as(serialized: &str, expected: EntityKind) -> Result<Self, IdError> {
        let id = Self::decode(serialized)?;
        if id.kind != expected {
            return Err(IdError::IdentifierKindMismatch {
                expected,
                found: id.kind,
            });
        }
        Ok(id)
    }

    /// Decode and require a specific kind, returning only the local key.
    ///
    /// Type-specific resolvers go through here so that, for instance, a
    /// `User` identifier is rejected by `todo(id)`.
    pub fn decode_expecting(serialized: &str, expected: EntityKind) -> Result<String, IdError> {
        Self::decode_as(serialized, expected).map(Self::into_local_key)
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn local_key(&self) -> &str {
        &self.local_key
    }

    pub fn into_local_key(self) -> String {
        self.local_key
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.kind, SEPARATOR, self.local_key)
    }
}

impl FromStr for GlobalId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl Serialize for GlobalId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GlobalId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::decode(&raw).map_err(serde::de::Error::custom)
    }
}
