//! Entity Names
//!
//! An [`EntityId`] is the base name a client picks when drawing an entity.
//! A [`VersionedName`] is what the backend sees after `generation`
//! transforms: the base name itself at generation 0, `t{N}_{base}` after.
//!
//! Both types validate on construction. A base name can never carry a
//! versioned prefix, so a versioned name is always exactly one prefix deep
//! and parses back in a single pass.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{VERSION_PREFIX, VERSION_SEPARATOR};
use crate::error::{LineageError, LineageResult};

/// Splits `t<digits>_<rest>` into its digits and rest, if `name` has that shape
fn split_versioned(name: &str) -> Option<(&str, &str)> {
    let rest = name.strip_prefix(VERSION_PREFIX)?;
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let (digits, tail) = rest.split_at(digits_len);
    let base = tail.strip_prefix(VERSION_SEPARATOR)?;
    Some((digits, base))
}

/// Stable logical identifier of an entity (its base name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    /// Create an entity ID, rejecting empty names and names that already
    /// look versioned
    pub fn new(name: impl Into<String>) -> LineageResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(LineageError::malformed(name, "empty base name"));
        }
        if split_versioned(&name).is_some() {
            return Err(LineageError::malformed(
                name,
                "base name carries a versioned prefix",
            ));
        }
        Ok(Self(name))
    }

    /// Get the base name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EntityId {
    type Error = LineageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for EntityId {
    type Error = LineageError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// The backend-visible name of one generation of an entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionedName {
    base: EntityId,
    generation: u32,
}

impl VersionedName {
    /// Create the name of `base` at `generation`
    pub fn new(base: EntityId, generation: u32) -> Self {
        Self { base, generation }
    }

    /// Parse a backend name back into its base and generation
    ///
    /// Only canonical names are accepted: generation 0 is never written as
    /// a prefix and generations carry no leading zeros.
    pub fn parse(name: &str) -> LineageResult<Self> {
        let Some((digits, base)) = split_versioned(name) else {
            return EntityId::new(name).map(|base| Self::new(base, 0));
        };

        if digits.starts_with('0') {
            return Err(LineageError::malformed(
                name,
                "generation is zero or zero-padded",
            ));
        }
        let generation: u32 = digits
            .parse()
            .map_err(|_| LineageError::malformed(name, "generation out of range"))?;
        let base = EntityId::new(base).map_err(|e| match e {
            LineageError::MalformedName { reason, .. } => LineageError::malformed(name, reason),
            other => other,
        })?;

        Ok(Self::new(base, generation))
    }

    /// Get the base entity
    pub fn base(&self) -> &EntityId {
        &self.base
    }

    /// Get the generation this name refers to
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Check if this name carries a version prefix
    pub fn is_versioned(&self) -> bool {
        self.generation > 0
    }
}

impl fmt::Display for VersionedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generation == 0 {
            write!(f, "{}", self.base)
        } else {
            write!(
                f,
                "{}{}{}{}",
                VERSION_PREFIX, self.generation, VERSION_SEPARATOR, self.base
            )
        }
    }
}

impl From<EntityId> for VersionedName {
    fn from(base: EntityId) -> Self {
        Self::new(base, 0)
    }
}

impl TryFrom<String> for VersionedName {
    type Error = LineageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VersionedName> for String {
    fn from(name: VersionedName) -> Self {
        name.to_string()
    }
}

impl PartialEq<str> for VersionedName {
    fn eq(&self, other: &str) -> bool {
        Self::parse(other).is_ok_and(|parsed| parsed == *self)
    }
}

impl PartialEq<&str> for VersionedName {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
