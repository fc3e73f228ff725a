mod control;
#[cfg(not(feature = "rpi"))]
mod host;
#[cfg(feature = "rpi")]
mod rpi;
mod runtime;
mod thermal;

use pifan_common::{FanActuator, FanConfig, FanControlEngine};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[cfg(not(feature = "rpi"))]
use crate::host::run as run_platform;
#[cfg(feature = "rpi")]
use crate::rpi::run as run_platform;
use crate::{
    control::{shutdown_signal, ControlLoop},
    runtime::RuntimeSettings,
    thermal::SysfsThermal,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = match FanConfig::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(errors) => {
            print!("{}", pifan_common::usage(&errors));
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = RuntimeSettings::from_env();
    run_platform(config, settings).await
}

async fn run_daemon<A: FanActuator>(
    config: FanConfig,
    settings: RuntimeSettings,
    actuator: A,
) -> anyhow::Result<()> {
    runtime::log_banner(&config, &actuator.describe());

    let source = SysfsThermal::new(&settings.thermal_path);
    info!("reading CPU temperature from {}", source.path().display());

    let engine = FanControlEngine::new(config);
    let mut control = ControlLoop::new(engine, source, actuator, settings.status_interval);
    control.run(settings.tick, shutdown_signal()).await
}
