//! TaskDefinition - descriptor + body, the unit an integration registers.

use std::fmt;
use std::sync::Arc;

use super::body::TaskBody;
use crate::domain::TaskDescriptor;

/// An integration module exposes a static list of these (usually from a
/// `fn definitions() -> Vec<TaskDefinition>`), which the runner builder walks
/// at initialization.
#[derive(Clone)]
pub struct TaskDefinition {
    pub descriptor: TaskDescriptor,
    pub body: Arc<dyn TaskBody>,
}

impl TaskDefinition {
    /// Pair `descriptor` with `body`; plain functions are accepted as bodies.
    pub fn new(descriptor: TaskDescriptor, body: impl TaskBody + 'static) -> Self {
        Self {
            descriptor,
            body: Arc::new(body),
        }
    }

    /// Registry key, same as `descriptor.name`.
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}

impl fmt::Debug for TaskDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskDefinition")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}
