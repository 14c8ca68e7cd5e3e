//! TaskRegistry - task definitions of one integration.
//!
//! # Scope
//! A registry is built per integration load and owned by that integration's
//! runner. There is no process-wide registry, so two integrations running in
//! one process never see each other's tasks.
//!
//! # Ordering
//! [`TaskRegistry::list`] sorts by `(order, name)`. The name tie-break is
//! load-bearing: collectors feeding insights must run in the same sequence on
//! every run.

use std::collections::HashMap;

use super::definition::TaskDefinition;
use crate::domain::{RegistryError, TaskKind};

#[derive(Debug, Default, Clone)]
pub struct TaskRegistry {
    tasks: HashMap<String, TaskDefinition>,
}

impl TaskRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one definition. Duplicate names are rejected, never overwritten.
    pub fn register(&mut self, definition: TaskDefinition) -> Result<(), RegistryError> {
        let name = definition.name().to_owned();
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.tasks.contains_key(&name) {
            return Err(RegistryError::DuplicateTask(name));
        }
        self.tasks.insert(name, definition);
        Ok(())
    }

    /// Register a static list; stops at the first conflict.
    pub fn register_all(
        &mut self,
        definitions: impl IntoIterator<Item = TaskDefinition>,
    ) -> Result<(), RegistryError> {
        for definition in definitions {
            self.register(definition)?;
        }
        Ok(())
    }

    /// Lookup by name, disabled tasks included.
    pub fn get(&self, name: &str) -> Option<&TaskDefinition> {
        self.tasks.get(name)
    }

    /// Enabled tasks of `kind` in execution order.
    pub fn list(&self, kind: TaskKind) -> Vec<&TaskDefinition> {
        let mut listed: Vec<&TaskDefinition> = self
            .tasks
            .values()
            .filter(|d| d.descriptor.kind == kind && d.descriptor.enabled)
            .collect();
        listed.sort_by(|a, b| a.descriptor.sort_key().cmp(&b.descriptor.sort_key()));
        listed
    }

    /// Every task, disabled ones included: collectors first, then insights,
    /// each in `(order, name)` order.
    pub fn all(&self) -> Vec<&TaskDefinition> {
        let mut listed: Vec<&TaskDefinition> = self.tasks.values().collect();
        listed.sort_by(|a, b| {
            (a.descriptor.kind, a.descriptor.sort_key())
                .cmp(&(b.descriptor.kind, b.descriptor.sort_key()))
        });
        listed
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tasks.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered tasks, disabled ones included.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
