//! Identifier wrappers for task nodes.
//!
//! The activity log producer numbers nodes with integers but writes them as
//! JSON strings (`"id": "12"`). Both spellings decode to the same
//! [`NodeId`], whose canonical form is the decimal text.

use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

/// Identity of a task node, as declared by its creation event.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct NodeId(pub String);

impl NodeId {
    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode an identifier from a raw JSON value.
    ///
    /// Strings are taken verbatim and integers are rendered in decimal.
    /// Anything else (null, objects, fractional numbers) yields `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Some(Self(s.clone())),
            serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => {
                Some(Self(n.to_string()))
            }
            _ => None,
        }
    }
}

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::from_json(&value)
            .ok_or_else(|| serde::de::Error::custom("node id must be a string or an integer"))
    }
}
