//! Runner - the pipeline controller.
//!
//! `run(config) -> Report`: StageOne, then StageTwo, then assemble the report.
//! The runner never returns an error and performs no remote I/O; publishing
//! violations is the caller's job (see [`crate::app::publish_violations`]).

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use tracing::Instrument;

use crate::app::builder::RunnerBuilder;
use crate::app::stage_one::StageOne;
use crate::app::stage_two::StageTwo;
use crate::config::{INTEGRATION_NAME_KEY, JobConfig, Settings};
use crate::context::{ContextParts, TaskContext};
use crate::domain::{
    BaseValues, ControlMap, OverallStatus, Report, RunId, SetupError, TaskResult, TaskResults,
    Violation,
};
use crate::observability::RunCounts;
use crate::ports::{Clock, IdGenerator};
use crate::tasks::TaskRegistry;

pub struct Runner {
    pub(crate) name: String,
    pub(crate) stage_one: Arc<dyn StageOne>,
    pub(crate) registry: Arc<TaskRegistry>,
    pub(crate) controls: ControlMap,
    pub(crate) settings: Settings,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) ids: Arc<dyn IdGenerator>,
}

impl Runner {
    /// Start wiring a runner for the integration `name`.
    pub fn builder(name: impl Into<String>) -> RunnerBuilder {
        RunnerBuilder::new(name)
    }

    /// Integration name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tasks this runner executes, disabled ones included.
    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Process settings the runner was built with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Execute one run: StageOne, then StageTwo, then assemble the report.
    ///
    /// # Failure
    /// Never returns an error. A failed StageOne gives a fatal report with no
    /// task results; task failures are recorded per task.
    pub async fn run(&self, config: JobConfig) -> Report {
        let run_id = self.ids.generate_run_id();
        let span = tracing::info_span!("run", integration = %self.name, run_id = %run_id);
        self.run_inner(run_id, config).instrument(span).await
    }

    async fn run_inner(&self, run_id: RunId, mut config: JobConfig) -> Report {
        let started_at = self.clock.now();
        config.insert(INTEGRATION_NAME_KEY, self.name.clone());

        tracing::info!("stage one starting");
        let base = match self.setup(&config).await {
            Ok(base) => base,
            Err(err) => {
                tracing::error!(error = %err, "stage one failed, no tasks will run");
                let finished_at = self.clock.now();
                return Report::fatal(run_id, &self.name, err.to_string(), started_at, finished_at);
            }
        };

        let timeout = config.task_timeout().or(self.settings.task_timeout);
        let mut ctx = TaskContext::new(base, config, Arc::clone(&self.clock));

        StageTwo::new(Arc::clone(&self.registry))
            .with_timeout(timeout)
            .with_debug(self.settings.debug)
            .start(&mut ctx)
            .await;

        let report = self.assemble(run_id, ctx.into_parts(), started_at);
        let counts = RunCounts::from_report(&report);
        tracing::info!(
            status = ?report.overall_status,
            succeeded = counts.succeeded,
            failed = counts.failed,
            skipped = counts.skipped,
            violations = counts.violations,
            "run finished"
        );
        report
    }

    /// StageOne with panics folded into [`SetupError::Failed`].
    async fn setup(&self, config: &JobConfig) -> Result<BaseValues, SetupError> {
        AssertUnwindSafe(self.stage_one.start(config))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(SetupError::Failed(panic_text(&*payload))))
    }

    fn assemble(&self, run_id: RunId, parts: ContextParts, started_at: DateTime<Utc>) -> Report {
        let ContextParts {
            base,
            config,
            results,
            logs,
            errors,
        } = parts;

        let job_id = config.job_id();
        let violations = results
            .iter()
            .filter(|r| r.succeeded && r.violation)
            .filter_map(|r| self.violation_for(r, job_id.clone()))
            .collect();

        let overall_status = if results.iter().all(|r| r.succeeded) {
            OverallStatus::Completed
        } else {
            OverallStatus::CompletedWithErrors
        };

        Report {
            run_id,
            integration: self.name.clone(),
            overall_status,
            fatal_error: None,
            base,
            task_results: TaskResults::new(results),
            violations,
            logs,
            errors,
            started_at,
            finished_at: self.clock.now(),
        }
    }

    fn violation_for(&self, result: &TaskResult, job_id: Option<String>) -> Option<Violation> {
        let definition = self.registry.get(&result.name)?;
        let violation = Violation::from_result(
            &definition.descriptor,
            result,
            self.controls.controls_for(&result.name).to_vec(),
            &self.name,
            job_id,
        );
        tracing::debug!(task = %violation.task_name, severity = %violation.severity, "violation collected");
        Some(violation)
    }
}

fn panic_text(payload: &(dyn Any + Send)) -> String {
    match payload.downcast_ref::<&str>() {
        Some(s) => format!("stage one panicked: {s}"),
        None => match payload.downcast_ref::<String>() {
            Some(s) => format!("stage one panicked: {s}"),
            None => "stage one panicked".to_owned(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Severity, TaskDescriptor, TaskError, TaskOutput};
    use crate::ports::FixedClock;
    use crate::tasks::TaskDefinition;
    use chrono::TimeZone;
    use serde_json::json;

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap())
    }

    fn flagging_insight() -> TaskDefinition {
        TaskDefinition::new(
            TaskDescriptor::insight("flag", "Flag it", Severity::High),
            |_: &mut TaskContext| -> Result<TaskOutput, TaskError> {
                Ok(TaskOutput::new(json!({"resource_id": "r1"}))
                    .with_message("m")
                    .with_violation(true))
            },
        )
    }

    #[tokio::test]
    async fn integration_name_is_visible_to_stage_one() {
        let runner = Runner::builder("acme")
            .stage_one(|config: &JobConfig| -> Result<BaseValues, SetupError> {
                let mut base = BaseValues::new();
                base.insert("seen".into(), json!(config.get_str("integration_name")));
                Ok(base)
            })
            .clock(clock())
            .build()
            .unwrap();

        let report = runner.run(JobConfig::new()).await;
        assert_eq!(report.base["seen"], json!("acme"));
        assert_eq!(report.overall_status, OverallStatus::Completed);
        assert!(report.task_results.is_empty());
    }

    #[tokio::test]
    async fn stage_one_panic_is_fatal_not_a_crash() {
        let runner = Runner::builder("acme")
            .stage_one(|_: &JobConfig| -> Result<BaseValues, SetupError> { panic!("no creds") })
            .register(flagging_insight())
            .unwrap()
            .build()
            .unwrap();

        let report = runner.run(JobConfig::new()).await;
        assert!(report.is_fatal());
        assert_eq!(report.fatal_error.as_deref(), Some("stage one panicked: no creds"));
        assert!(report.task_results.is_empty());
    }

    #[tokio::test]
    async fn violations_carry_job_id_and_controls() {
        let controls = ControlMap::from_json_str(r#"{"soc2": {"CC6.1": ["flag"]}}"#).unwrap();
        let runner = Runner::builder("acme")
            .register(flagging_insight())
            .unwrap()
            .controls(controls)
            .clock(clock())
            .build()
            .unwrap();

        let report = runner.run(JobConfig::new().with("job_id", "job-7")).await;
        assert_eq!(report.violations.len(), 1);

        let v = &report.violations[0];
        assert_eq!(v.integration, "acme");
        assert_eq!(v.job_id.as_deref(), Some("job-7"));
        assert_eq!(v.resource_id.as_deref(), Some("r1"));
        assert_eq!(v.control_references.len(), 1);
        assert_eq!(v.control_references[0].framework, "soc2");
        assert_eq!(v.control_references[0].control_id, "CC6.1");
    }

    struct Sleepy;

    #[async_trait::async_trait]
    impl crate::tasks::TaskBody for Sleepy {
        async fn run(&self, _ctx: &mut TaskContext) -> Result<TaskOutput, TaskError> {
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            Ok(TaskOutput::empty())
        }
    }

    #[tokio::test]
    async fn job_timeout_overrides_settings() {
        let runner = Runner::builder("acme")
            .register(TaskDefinition::new(TaskDescriptor::collector("slow", "Slow"), Sleepy))
            .unwrap()
            .settings(Settings {
                task_timeout: Some(std::time::Duration::from_secs(60)),
                ..Settings::default()
            })
            .build()
            .unwrap();

        let report = runner.run(JobConfig::new().with("task_timeout", 0.05)).await;
        assert_eq!(report.overall_status, OverallStatus::CompletedWithErrors);
        let slow = report.task_results.get("slow").unwrap();
        assert!(slow.error.as_deref().unwrap().starts_with("task timed out"));
    }

    #[tokio::test]
    async fn out_of_range_timeout_still_yields_a_report() {
        let runner = Runner::builder("acme")
            .register(TaskDefinition::new(
                TaskDescriptor::collector("ok", "Ok"),
                |_: &mut TaskContext| -> Result<TaskOutput, TaskError> { Ok(TaskOutput::empty()) },
            ))
            .unwrap()
            .build()
            .unwrap();

        let report = runner.run(JobConfig::new().with("task_timeout", 1e20)).await;
        assert_eq!(report.overall_status, OverallStatus::Completed);
        assert!(report.task_results.get("ok").unwrap().succeeded);
    }
}
