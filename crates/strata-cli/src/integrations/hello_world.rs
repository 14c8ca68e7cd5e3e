//! hello_world - a minimal integration.
//!
//! StageOne passes the configured `token` through; `list_buckets` returns a
//! fixed bucket listing and `check_bucket` flags `bucket_1` when it is present.

use serde_json::{Value, json};
use strata_core::app::RunnerBuilder;
use strata_core::{
    BaseValues, JobConfig, RegistryError, SetupError, Severity, TaskContext, TaskDefinition,
    TaskDescriptor, TaskError, TaskOutput,
};

pub const NAME: &str = "hello_world";
pub const TITLE: &str = "Hello World";

fn authenticate(config: &JobConfig) -> Result<BaseValues, SetupError> {
    let mut base = BaseValues::new();
    base.insert("token".to_owned(), config.get_or("token", Value::Null));
    Ok(base)
}

fn list_buckets(ctx: &mut TaskContext) -> Result<TaskOutput, TaskError> {
    ctx.add_log("Connecting to bucket API");
    ctx.add_log("Listing all buckets");
    ctx.base("token")?;

    let buckets = vec![
        json!({"name": "bucket_1", "region": "us-east-1", "encrypted": true}),
        json!({"name": "bucket_2", "region": "us-west-2", "encrypted": false}),
    ];
    ctx.add_log(format!("Found {} buckets", buckets.len()));

    Ok(TaskOutput::new(json!({
        "buckets": buckets,
        "count": buckets.len(),
    })))
}

fn check_bucket(ctx: &mut TaskContext) -> Result<TaskOutput, TaskError> {
    let listing = ctx.get_data("list_buckets");
    let buckets = listing
        .get("buckets")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let found = buckets
        .iter()
        .any(|b| b.get("name").and_then(Value::as_str) == Some("bucket_1"));

    let data = json!({
        "total_buckets": buckets.len(),
        "all_buckets": buckets,
    });
    if found {
        Ok(TaskOutput::new(data)
            .with_message("Found bucket_1 in bucket list")
            .with_violation(true))
    } else {
        Ok(TaskOutput::new(data).with_message("bucket_1 not found"))
    }
}

pub fn tasks() -> Vec<TaskDefinition> {
    vec![
        TaskDefinition::new(
            TaskDescriptor::collector("list_buckets", "List all buckets")
                .with_description("Fetch all buckets from the storage API"),
            list_buckets,
        ),
        TaskDefinition::new(
            TaskDescriptor::insight("check_bucket", "Check for specific buckets", Severity::High)
                .with_description("Check if bucket_1 is in list_buckets")
                .depends_on("list_buckets"),
            check_bucket,
        ),
    ]
}

pub fn configure(builder: RunnerBuilder) -> Result<RunnerBuilder, RegistryError> {
    Ok(builder
        .stage_one(authenticate)
        .tasks(tasks())?
        .expect_tasks(&["list_buckets", "check_bucket"]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::{OverallStatus, Runner};

    #[tokio::test]
    async fn flags_bucket_1() {
        let runner = configure(Runner::builder(NAME)).unwrap().build().unwrap();
        let report = runner.run(JobConfig::new().with("token", "t-123")).await;

        assert_eq!(report.overall_status, OverallStatus::Completed);
        assert_eq!(report.base["token"], json!("t-123"));
        assert_eq!(report.task_results.names(), vec!["list_buckets", "check_bucket"]);

        let listing = report.task_results.get("list_buckets").unwrap();
        assert_eq!(listing.data["count"], json!(2));
        assert_eq!(listing.logs.len(), 3);

        let check = report.task_results.get("check_bucket").unwrap();
        assert!(check.violation);
        assert_eq!(check.data["total_buckets"], json!(2));

        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].task_name, "check_bucket");
        assert_eq!(report.violations[0].severity, Severity::High);
        assert_eq!(report.violations[0].message.as_deref(), Some("Found bucket_1 in bucket list"));
    }

    #[tokio::test]
    async fn missing_token_is_null_not_fatal() {
        let runner = configure(Runner::builder(NAME)).unwrap().build().unwrap();
        let report = runner.run(JobConfig::new()).await;
        assert_eq!(report.base["token"], Value::Null);
        assert_eq!(report.overall_status, OverallStatus::Completed);
    }
}
