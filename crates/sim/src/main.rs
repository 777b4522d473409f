// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod scenario;

use clap::Parser;
use scenario::{Output, Scenario, ScenarioError};
use serde::de::DeserializeOwned;
use shift_slots_engine::EngineSettings;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Shift Slots Simulator - plays a scenario file against the slot engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the scenario JSON file
    scenario: String,

    /// Path to an engine settings JSON file. Defaults are used if not provided.
    #[arg(short, long)]
    settings: Option<String>,

    /// Override the quiet period before a form change settles
    #[arg(long)]
    config_quiet_ms: Option<u64>,

    /// Override the quiet period before a search term is sent
    #[arg(long)]
    search_quiet_ms: Option<u64>,

    /// Override how long eviction notices stay up
    #[arg(long)]
    notice_ttl_ms: Option<u64>,

    /// Override the number of candidates per page
    #[arg(long)]
    page_size: Option<u32>,
}

impl Args {
    fn settings(&self) -> Result<EngineSettings, ScenarioError> {
        let mut settings: EngineSettings = match &self.settings {
            Some(path) => read_json(path)?,
            None => EngineSettings::default(),
        };
        if let Some(ms) = self.config_quiet_ms {
            settings.config_quiet_period_ms = ms;
        }
        if let Some(ms) = self.search_quiet_ms {
            settings.search_quiet_period_ms = ms;
        }
        if let Some(ms) = self.notice_ttl_ms {
            settings.notice_ttl_ms = ms;
        }
        if let Some(size) = self.page_size {
            settings.page_size = size;
        }
        Ok(settings)
    }
}

fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, ScenarioError> {
    let text: String = std::fs::read_to_string(path).map_err(|source| ScenarioError::Read {
        path: path.to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ScenarioError::Parse {
        path: path.to_string(),
        source,
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings: EngineSettings = args.settings()?;
    let scenario: Scenario = read_json(&args.scenario)?;
    info!(
        path = %args.scenario,
        steps = scenario.steps.len(),
        "Running scenario"
    );

    let (tx, mut rx) = mpsc::unbounded_channel::<Output>();
    let printer: JoinHandle<()> = tokio::spawn(async move {
        while let Some(output) = rx.recv().await {
            match serde_json::to_string(&output) {
                Ok(line) => println!("{line}"),
                Err(err) => error!(%err, "Failed to serialize output"),
            }
        }
    });

    scenario::run(scenario, settings, tx).await?;
    printer.await?;

    Ok(())
}
