//! RunnerBuilder - wiring and fail-fast validation.
//!
//! # Usage
//! ```ignore
//! let runner = Runner::builder("hello_world")
//!     .stage_one(start)
//!     .tasks(TASKS.iter().map(|t| t.definition()))?
//!     .expect_tasks(&["list_buckets", "check_bucket"])
//!     .build()?;
//! ```
//!
//! Duplicate names fail at `register`, missing expected tasks fail at `build`,
//! so nothing about the task set can go wrong once a run has started.

use std::sync::Arc;

use crate::app::runner::Runner;
use crate::app::stage_one::{StageOne, no_setup};
use crate::config::Settings;
use crate::domain::{BuildError, ControlMap, RegistryError};
use crate::ports::{Clock, SystemClock, UlidGenerator};
use crate::tasks::{TaskDefinition, TaskRegistry};

pub struct RunnerBuilder {
    name: String,
    stage_one: Arc<dyn StageOne>,
    registry: TaskRegistry,
    controls: ControlMap,
    settings: Settings,
    clock: Arc<dyn Clock>,
    expected_tasks: Option<Vec<String>>,
}

impl RunnerBuilder {
    /// Builder with no setup stage, no tasks and default settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stage_one: Arc::new(no_setup),
            registry: TaskRegistry::new(),
            controls: ControlMap::new(),
            settings: Settings::default(),
            clock: Arc::new(SystemClock),
            expected_tasks: None,
        }
    }

    /// Setup run once per run before any task; defaults to [`no_setup`].
    pub fn stage_one(mut self, stage_one: impl StageOne + 'static) -> Self {
        self.stage_one = Arc::new(stage_one);
        self
    }

    /// # Errors
    /// [`RegistryError::DuplicateTask`] if the name is taken.
    pub fn register(mut self, definition: TaskDefinition) -> Result<Self, RegistryError> {
        self.registry.register(definition)?;
        Ok(self)
    }

    /// Register a static list of definitions; stops at the first conflict.
    pub fn tasks(
        mut self,
        definitions: impl IntoIterator<Item = TaskDefinition>,
    ) -> Result<Self, RegistryError> {
        self.registry.register_all(definitions)?;
        Ok(self)
    }

    /// Control mapping attached to every violation of this runner.
    pub fn controls(mut self, controls: ControlMap) -> Self {
        self.controls = controls;
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Names that must be registered (enabled or not) by the time `build` runs.
    pub fn expect_tasks(mut self, names: &[&str]) -> Self {
        self.expected_tasks = Some(names.iter().map(|n| n.to_string()).collect());
        self
    }

    /// # Errors
    /// [`BuildError::MissingTasks`] if an expected task was never registered.
    pub fn build(self) -> Result<Runner, BuildError> {
        if let Some(expected) = &self.expected_tasks {
            let missing: Vec<String> = expected
                .iter()
                .filter(|name| self.registry.get(name).is_none())
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(BuildError::MissingTasks(missing));
            }
        }

        let ids = Arc::new(UlidGenerator::new(Arc::clone(&self.clock)));
        Ok(Runner {
            name: self.name,
            stage_one: self.stage_one,
            registry: Arc::new(self.registry),
            controls: self.controls,
            settings: self.settings,
            clock: self.clock,
            ids,
        })
    }
}
