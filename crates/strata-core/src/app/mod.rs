//! App layer - stages, the pipeline controller and its wiring.
//!
//! # Components
//! - **StageOne**: setup, once per run
//! - **StageTwo**: collectors then insights
//! - **Runner**: StageOne -> StageTwo -> Report
//! - **RunnerBuilder**: registration and fail-fast validation
//! - **publish_violations**: hands a report's violations to a sink

pub mod builder;
pub mod publish;
pub mod runner;
pub mod stage_one;
pub mod stage_two;

pub use self::builder::RunnerBuilder;
pub use self::publish::{PublishSummary, publish_violations};
pub use self::runner::Runner;
pub use self::stage_one::{StageOne, no_setup};
pub use self::stage_two::StageTwo;
