//! Run identifiers.
//!
//! ULID based, so ids sort by creation time and can be generated without
//! coordination between processes running integrations side by side.

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Identifier of one pipeline run.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Ulid);

impl RunId {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl From<Ulid> for RunId {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_has_run_prefix() {
        let ulid = Ulid::new();
        let id = RunId::from(ulid);
        assert_eq!(id.as_ulid(), ulid);
        assert_eq!(id.to_string(), format!("run-{ulid}"));
    }

    #[test]
    fn serializes_as_bare_ulid_string() {
        let id = RunId::from_ulid(Ulid::new());
        let v = serde_json::to_value(id).unwrap();
        assert_eq!(v, serde_json::Value::String(id.as_ulid().to_string()));

        let back: RunId = serde_json::from_value(v).unwrap();
        assert_eq!(back, id);
    }
}
