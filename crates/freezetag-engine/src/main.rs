//! Headless training engine for the freeze tag environment.
//!
//! Wires the episode controller to a baseline policy, an optional lesson
//! schedule, and a metrics sink, then plays episodes until the configured
//! limit or an interrupt.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `freezetag-config.yaml` (or the file named by
//!    `FREEZETAG_CONFIG`), falling back to defaults when it is absent
//! 2. Initialize structured logging (tracing)
//! 3. Build the parameter resolver, attaching the lesson schedule if one
//!    is configured
//! 4. Create the controller with the kinematic physics backend
//! 5. Install the interrupt handler
//! 6. Run the training loop
//! 7. Log the result

mod curriculum;
mod error;
mod metrics;
mod policy;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use tracing::info;
use tracing_subscriber::EnvFilter;

use freezetag_core::config::LoggingConfig;
use freezetag_core::runner::log_training_end;
use freezetag_core::{
    EpisodeController, KinematicPhysics, ParameterResolver, SimulationConfig, TrainingControl,
    run_training,
};
use freezetag_types::RunId;

use crate::curriculum::LessonSchedule;
use crate::error::EngineError;
use crate::metrics::{EpisodeLogCallback, MetricsSink};
use crate::policy::RandomDecisionSource;

/// Config file read when `FREEZETAG_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "freezetag-config.yaml";

/// Ticks the baseline policy repeats each action for.
const DECISION_PERIOD: u32 = 5;

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration, the lesson schedule, or the training
/// loop fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let config_path = config_path();
    let (config, from_file) = load_config(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);

    let run_id = RunId::new();
    info!(%run_id, "freezetag-engine starting");
    if !from_file {
        info!(path = %config_path.display(), "config file not found, using defaults");
    }
    info!(
        seed = config.world.seed,
        tick_ms = config.world.tick_ms,
        tick_interval_ms = config.world.tick_interval_ms,
        settle_delay_ms = config.world.settle_delay_ms,
        max_episodes = config.training.max_episodes,
        "configuration loaded"
    );

    // 3. Parameter resolver.
    let resolver = build_resolver(&config)?;

    // 4. Controller and collaborators.
    let mut controller = EpisodeController::new(
        &config,
        resolver,
        Box::new(KinematicPhysics::new(config.world.arena)),
    )
    .map_err(EngineError::from)?;
    let mut policy = RandomDecisionSource::new(config.world.seed, DECISION_PERIOD);
    let mut metrics = MetricsSink::new();
    let mut callback = EpisodeLogCallback;
    let control = Arc::new(TrainingControl::new(
        config.world.tick_interval_ms,
        config.training.max_episodes,
    ));

    // 5. Interrupt handler.
    let stopper = Arc::clone(&control);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping after the current tick");
            stopper.request_stop();
        }
    });

    // 6. Train.
    let result = run_training(
        &mut controller,
        &mut policy,
        &mut metrics,
        &control,
        &mut callback,
    )
    .await
    .map_err(EngineError::from)?;

    // 7. Log results.
    log_training_end(&result, &control);
    metrics.log_totals();
    info!(%run_id, "freezetag-engine shutdown complete");

    Ok(())
}

fn config_path() -> PathBuf {
    std::env::var_os("FREEZETAG_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Load the configuration file, or defaults if it does not exist.
///
/// Returns whether the file was read.
fn load_config(path: &Path) -> Result<(SimulationConfig, bool), EngineError> {
    if path.exists() {
        Ok((SimulationConfig::from_file(path)?, true))
    } else {
        Ok((SimulationConfig::parse("")?, false))
    }
}

/// `RUST_LOG` wins; otherwise the configured level applies.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn build_resolver(config: &SimulationConfig) -> Result<ParameterResolver, EngineError> {
    let Some(path) = &config.training.curriculum else {
        info!("no lesson schedule configured, using manual parameters");
        return Ok(ParameterResolver::manual(config.manual.clone()));
    };
    let schedule = LessonSchedule::from_file(path)?;
    info!(
        path = %path.display(),
        first_lesson = schedule.current().map_or("", |lesson| lesson.name.as_str()),
        "lesson schedule loaded"
    );
    Ok(ParameterResolver::with_curriculum(
        config.manual.clone(),
        Box::new(schedule),
    ))
}
