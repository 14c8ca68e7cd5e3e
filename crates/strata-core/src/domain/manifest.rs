//! Integration manifest.
//!
//! Consumed, not produced: the surrounding platform uses `schema` to validate
//! job config before it reaches a runner. The engine never re-validates.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::LoadError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationDescriptor {
    /// Must equal the runner name of the integration that provides the tasks.
    pub name: String,
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// JSON-Schema-shaped document for the job config.
    #[serde(default)]
    pub schema: serde_json::Value,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntegrationManifest {
    pub integrations: Vec<IntegrationDescriptor>,
}

impl IntegrationManifest {
    pub fn from_json_str(s: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn find(&self, name: &str) -> Option<&IntegrationDescriptor> {
        self.integrations.iter().find(|i| i.name == name)
    }

    /// Enabled integrations, manifest order.
    pub fn enabled(&self) -> impl Iterator<Item = &IntegrationDescriptor> {
        self.integrations.iter().filter(|i| i.enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
    {
      "integrations": [
        {
          "name": "hello_world",
          "title": "Hello World",
          "description": "Example integration",
          "enabled": true,
          "schema": { "type": "object", "properties": { "token": { "type": "string" } } }
        },
        { "name": "legacy", "title": "Legacy", "enabled": false }
      ]
    }"#;

    #[test]
    fn parses_and_finds_integrations() {
        let m = IntegrationManifest::from_json_str(DOC).unwrap();
        let hello = m.find("hello_world").unwrap();
        assert_eq!(hello.title, "Hello World");
        assert_eq!(hello.schema["type"], "object");

        let legacy = m.find("legacy").unwrap();
        assert!(!legacy.enabled);
        assert!(legacy.schema.is_null());

        assert!(m.find("missing").is_none());
    }

    #[test]
    fn enabled_filters_in_manifest_order() {
        let m = IntegrationManifest::from_json_str(DOC).unwrap();
        let names: Vec<&str> = m.enabled().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["hello_world"]);
    }

    #[test]
    fn enabled_defaults_to_true() {
        let m = IntegrationManifest::from_json_str(
            r#"{"integrations": [{"name": "a", "title": "A"}]}"#,
        )
        .unwrap();
        assert!(m.integrations[0].enabled);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = IntegrationManifest::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
