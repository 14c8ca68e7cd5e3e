//! Engine logging setup and run summaries.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::domain::{Report, TaskStatus};

/// Install a `tracing` subscriber writing to stderr, filtered by
/// [`Settings::log_filter`].
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing(settings: &Settings) -> bool {
    let filter = EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}

/// Per-status task counts of one run. `failed` excludes skipped tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounts {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub violations: usize,
}

impl RunCounts {
    pub fn from_report(report: &Report) -> Self {
        let mut counts = Self {
            violations: report.violations.len(),
            ..Self::default()
        };
        for result in &report.task_results {
            if result.succeeded {
                counts.succeeded += 1;
            } else if result.status == TaskStatus::Skipped {
                counts.skipped += 1;
            } else {
                counts.failed += 1;
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Runner;
    use crate::config::JobConfig;
    use crate::context::TaskContext;
    use crate::domain::{Severity, TaskDescriptor, TaskError, TaskOutput};
    use crate::tasks::TaskDefinition;

    fn ok(_: &mut TaskContext) -> Result<TaskOutput, TaskError> {
        Ok(TaskOutput::empty())
    }

    fn fails(_: &mut TaskContext) -> Result<TaskOutput, TaskError> {
        Err(TaskError::msg("nope"))
    }

    fn flags(_: &mut TaskContext) -> Result<TaskOutput, TaskError> {
        Ok(TaskOutput::empty().with_violation(true))
    }

    #[tokio::test]
    async fn counts_split_by_status() {
        let report = Runner::builder("counts")
            .tasks([
                TaskDefinition::new(TaskDescriptor::collector("a", "A"), ok),
                TaskDefinition::new(TaskDescriptor::collector("b", "B"), fails),
                TaskDefinition::new(
                    TaskDescriptor::insight("c", "C", Severity::Low).depends_on("b"),
                    ok,
                ),
                TaskDefinition::new(TaskDescriptor::insight("d", "D", Severity::Low), flags),
            ])
            .unwrap()
            .build()
            .unwrap()
            .run(JobConfig::new())
            .await;

        assert_eq!(
            RunCounts::from_report(&report),
            RunCounts {
                succeeded: 2,
                failed: 1,
                skipped: 1,
                violations: 1,
            }
        );
    }

    #[test]
    fn init_tracing_tolerates_a_bad_filter() {
        let settings = Settings {
            log_filter: "[[not a filter".into(),
            ..Settings::default()
        };
        init_tracing(&settings);
        assert!(!init_tracing(&settings));
    }
}
