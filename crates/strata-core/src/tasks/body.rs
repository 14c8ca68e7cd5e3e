//! TaskBody - the callable half of a task definition.
//!
//! # Two ways to write a body
//! - a plain function or closure `Fn(&mut TaskContext) -> Result<TaskOutput, TaskError>`,
//!   which covers the usual "block until the API call returns" task
//! - a struct implementing [`TaskBody`] when the body needs state or awaits
//!
//! Either way the runner stores it as `Arc<dyn TaskBody>`.

use async_trait::async_trait;

use crate::context::TaskContext;
use crate::domain::{TaskError, TaskOutput};

/// # Example
/// ```ignore
/// struct ListItems { client: ApiClient }
///
/// #[async_trait]
/// impl TaskBody for ListItems {
///     async fn run(&self, ctx: &mut TaskContext) -> Result<TaskOutput, TaskError> {
///         let items = self.client.items(ctx.base("token")?).await?;
///         Ok(TaskOutput::new(json!({ "items": items })))
///     }
/// }
/// ```
#[async_trait]
pub trait TaskBody: Send + Sync {
    async fn run(&self, ctx: &mut TaskContext) -> Result<TaskOutput, TaskError>;
}

#[async_trait]
impl<F> TaskBody for F
where
    F: Fn(&mut TaskContext) -> Result<TaskOutput, TaskError> + Send + Sync,
{
    async fn run(&self, ctx: &mut TaskContext) -> Result<TaskOutput, TaskError> {
        self(ctx)
    }
}
