//! In-process implementations of the ports.

pub mod inmem_sink;
pub mod jsonl_sink;

pub use self::inmem_sink::InMemoryViolationSink;
pub use self::jsonl_sink::JsonLinesSink;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Runner, publish_violations};
    use crate::config::JobConfig;
    use crate::context::TaskContext;
    use crate::domain::{Report, Severity, TaskDescriptor, TaskError, TaskOutput, Violation};
    use crate::tasks::TaskDefinition;
    use serde_json::json;

    fn flags(ctx: &mut TaskContext) -> Result<TaskOutput, TaskError> {
        ctx.add_log("flagging");
        Ok(TaskOutput::new(json!({"resource_id": "r"})).with_violation(true))
    }

    async fn report_with_two_violations() -> Report {
        Runner::builder("sinks")
            .tasks([
                TaskDefinition::new(TaskDescriptor::insight("first", "First", Severity::Low), flags),
                TaskDefinition::new(TaskDescriptor::insight("second", "Second", Severity::High), flags),
            ])
            .unwrap()
            .build()
            .unwrap()
            .run(JobConfig::new())
            .await
    }

    #[tokio::test]
    async fn in_memory_sink_keeps_publish_order() {
        let report = report_with_two_violations().await;
        let sink = InMemoryViolationSink::new();

        let summary = publish_violations(&report, &sink).await;
        assert_eq!(summary.published, 2);
        assert!(summary.is_clean());

        let names: Vec<String> = sink.published().await.into_iter().map(|v| v.task_name).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn a_rejected_violation_does_not_stop_the_rest() {
        let report = report_with_two_violations().await;
        let sink = InMemoryViolationSink::new().rejecting("first");

        let summary = publish_violations(&report, &sink).await;
        assert_eq!(summary.published, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].0, "first");
        assert_eq!(sink.len().await, 1);
    }

    #[tokio::test]
    async fn json_lines_sink_appends_one_object_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("violations.jsonl");
        let sink = JsonLinesSink::new(&path);

        let report = report_with_two_violations().await;
        publish_violations(&report, &sink).await;
        publish_violations(&report, &sink).await;

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);

        let first: Violation = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.task_name, "first");
        assert_eq!(first.integration, "sinks");
        assert_eq!(first.resource_id.as_deref(), Some("r"));
    }
}
