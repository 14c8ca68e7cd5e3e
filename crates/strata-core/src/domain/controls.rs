//! Compliance control mapping.
//!
//! The source document is keyed framework-first:
//! `{ "soc2": { "CC6.1": ["check_bucket", ...] } }`. Violations need the
//! opposite direction, so the map is inverted once at load time.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::LoadError;

/// One control an insight is evidence for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlReference {
    pub framework: String,
    pub control_id: String,
}

/// framework -> control id -> insight names.
pub type FrameworkMap = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Insight name -> controls it maps to.
#[derive(Debug, Clone, Default)]
pub struct ControlMap {
    by_insight: HashMap<String, Vec<ControlReference>>,
}

impl ControlMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// References come out sorted by framework, then control id.
    pub fn from_framework_map(map: FrameworkMap) -> Self {
        let mut by_insight: HashMap<String, Vec<ControlReference>> = HashMap::new();
        for (framework, controls) in map {
            for (control_id, insights) in controls {
                for insight in insights {
                    by_insight.entry(insight).or_default().push(ControlReference {
                        framework: framework.clone(),
                        control_id: control_id.clone(),
                    });
                }
            }
        }
        Self { by_insight }
    }

    pub fn from_json_str(s: &str) -> Result<Self, LoadError> {
        let map: FrameworkMap = serde_json::from_str(s)?;
        Ok(Self::from_framework_map(map))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn controls_for(&self, task_name: &str) -> &[ControlReference] {
        self.by_insight
            .get(task_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.by_insight.is_empty()
    }
}
