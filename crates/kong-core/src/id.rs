//! Reference to another admin API entity.
//!
//! Kong expresses foreign keys as nested objects (`{"service": {"id": "..."}}`) rather than
//! bare strings, so a reference is distinguishable from a name on the wire.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Identifier of a referenced entity, serialized as `{"id": "<value>"}`.
///
/// Use `Option<Id>` with `skip_serializing_if = "Option::is_none"` for optional references so
/// that an absent reference is omitted instead of becoming an empty object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(String);

#[derive(Serialize, Deserialize)]
struct IdRef<'a> {
    #[serde(borrow)]
    id: std::borrow::Cow<'a, str>,
}

impl Id {
    /// Wrap an identifier string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap the identifier string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<&str> for Id {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for Id {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<Id> for String {
    fn from(id: Id) -> Self {
        id.0
    }
}

impl AsRef<str> for Id {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Id {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        IdRef {
            id: std::borrow::Cow::Borrowed(&self.0),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        IdRef::deserialize(deserializer).map(|reference| Self(reference.id.into_owned()))
    }
}
