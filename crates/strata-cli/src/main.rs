//! strata - run staged task integrations from the command line.

mod integrations;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use strata_core::domain::IntegrationManifest;
use strata_core::impls::JsonLinesSink;
use strata_core::observability::init_tracing;
use strata_core::{ControlMap, JobConfig, Settings, publish_violations};

use crate::integrations::Integration;

#[derive(Parser)]
#[command(name = "strata")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run collectors and insights of an integration and print the report")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List an integration's tasks in execution order
    List {
        /// Integration name
        integration: String,
    },

    /// Run an integration and print its report as JSON
    Run {
        /// Integration name
        integration: String,

        /// Job configuration (JSON object)
        #[arg(short, long)]
        config: PathBuf,

        /// Integration manifest; refuses to run integrations missing or disabled in it
        #[arg(long, env = "STRATA_MANIFEST")]
        manifest: Option<PathBuf>,

        /// Control mapping: { framework: { control_id: [insight, ...] } }
        #[arg(long)]
        controls: Option<PathBuf>,

        /// Append violations to this file as JSON lines
        #[arg(long)]
        violations_out: Option<PathBuf>,

        /// Print the report on a single line
        #[arg(long)]
        compact: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let settings = Settings::from_env();
    init_tracing(&settings);

    match cli.command {
        Commands::List { integration } => {
            list(lookup(&integration)?, settings)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run {
            integration,
            config,
            manifest,
            controls,
            violations_out,
            compact,
        } => {
            if let Some(path) = &manifest {
                check_manifest(path, &integration)?;
            }
            let integration = lookup(&integration)?;
            let controls = match &controls {
                Some(path) => ControlMap::load(path)?,
                None => ControlMap::new(),
            };
            let config = read_config(&config)?;
            let runner = integration.runner(settings, controls)?;

            let report = runner.run(config).await;

            let json = if compact {
                serde_json::to_string(&report)?
            } else {
                serde_json::to_string_pretty(&report)?
            };
            println!("{json}");

            if let Some(path) = violations_out {
                let sink = JsonLinesSink::new(path);
                let summary = publish_violations(&report, &sink).await;
                if !summary.is_clean() {
                    tracing::warn!(failures = ?summary.failures, "some violations were not written");
                }
            }

            Ok(if report.is_fatal() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
    }
}

fn lookup(name: &str) -> Result<&'static Integration> {
    integrations::find(name).ok_or_else(|| {
        anyhow!(
            "unknown integration '{name}' (available: {})",
            integrations::names().join(", ")
        )
    })
}

fn check_manifest(path: &Path, name: &str) -> Result<()> {
    let manifest = IntegrationManifest::load(path)?;
    match manifest.find(name) {
        None => bail!("integration '{name}' is not listed in {}", path.display()),
        Some(entry) if !entry.enabled => bail!("integration '{name}' is disabled in {}", path.display()),
        Some(_) => Ok(()),
    }
}

fn read_config(path: &Path) -> Result<JobConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parse config {}", path.display()))?;
    JobConfig::from_value(value).context("job config must be a JSON object")
}

fn list(integration: &Integration, settings: Settings) -> Result<()> {
    let runner = integration.runner(settings, ControlMap::new())?;
    println!("{} ({})", integration.title, integration.name);
    for definition in runner.registry().all() {
        let d = &definition.descriptor;
        let severity = d.severity.map(|s| s.to_string()).unwrap_or_else(|| "-".to_owned());
        let state = if d.enabled { "enabled" } else { "disabled" };
        println!(
            "  {:<9} {:>5}  {:<8} {:<8} {:<24} {}",
            d.kind.as_str(),
            d.order,
            severity,
            state,
            d.name,
            d.title
        );
    }
    Ok(())
}
