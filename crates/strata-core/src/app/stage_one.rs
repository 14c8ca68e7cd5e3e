//! StageOne - setup, executed once before any task.
//!
//! Typical work: authenticate, resolve credentials, build the values every
//! task will read through `ctx.base(..)`. A failure here is fatal to the run.

use async_trait::async_trait;

use crate::config::JobConfig;
use crate::domain::{BaseValues, SetupError};

#[async_trait]
pub trait StageOne: Send + Sync {
    async fn start(&self, config: &JobConfig) -> Result<BaseValues, SetupError>;
}

#[async_trait]
impl<F> StageOne for F
where
    F: Fn(&JobConfig) -> Result<BaseValues, SetupError> + Send + Sync,
{
    async fn start(&self, config: &JobConfig) -> Result<BaseValues, SetupError> {
        self(config)
    }
}

/// Setup for integrations that need none.
pub fn no_setup(_config: &JobConfig) -> Result<BaseValues, SetupError> {
    Ok(BaseValues::new())
}
