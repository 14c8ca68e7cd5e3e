//! Integrations shipped with the binary.

pub mod hello_world;

use strata_core::app::RunnerBuilder;
use strata_core::{BuildError, ControlMap, RegistryError, Runner, Settings};

pub struct Integration {
    pub name: &'static str,
    pub title: &'static str,
    configure: fn(RunnerBuilder) -> Result<RunnerBuilder, RegistryError>,
}

impl Integration {
    /// Fresh runner with its own registry; nothing is shared between calls.
    pub fn runner(&self, settings: Settings, controls: ControlMap) -> Result<Runner, BuildError> {
        let builder = Runner::builder(self.name).settings(settings).controls(controls);
        (self.configure)(builder)?.build()
    }
}

pub const CATALOG: &[Integration] = &[Integration {
    name: hello_world::NAME,
    title: hello_world::TITLE,
    configure: hello_world::configure,
}];

pub fn find(name: &str) -> Option<&'static Integration> {
    CATALOG.iter().find(|i| i.name == name)
}

pub fn names() -> Vec<&'static str> {
    CATALOG.iter().map(|i| i.name).collect()
}
