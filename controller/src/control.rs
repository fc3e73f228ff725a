use std::{
    future::Future,
    sync::OnceLock,
    time::{Duration, Instant},
};

use anyhow::Context;
use pifan_common::{Decision, FanActuator, FanControlEngine, TemperatureSource};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Single owner of the engine and both hardware handles.
pub struct ControlLoop<S, A> {
    engine: FanControlEngine,
    source: S,
    actuator: A,
    status_interval: u64,
    ticks: u64,
    started: bool,
    // Pin level that failed to apply and is retried every tick.
    pending_level: Option<bool>,
}

impl<S, A> ControlLoop<S, A>
where
    S: TemperatureSource,
    A: FanActuator,
{
    pub fn new(engine: FanControlEngine, source: S, actuator: A, status_interval: u64) -> Self {
        Self {
            engine,
            source,
            actuator,
            status_interval,
            ticks: 0,
            started: false,
            pending_level: None,
        }
    }

    #[cfg(test)]
    pub fn engine(&self) -> &FanControlEngine {
        &self.engine
    }

    #[cfg(test)]
    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// Runs one sample through the engine and applies the outcome.
    pub fn step(&mut self, now_ms: u64) -> Decision {
        if let Some(level) = self.pending_level {
            self.apply(level);
        }

        let reading = match self.source.read_celsius() {
            Ok(temp) => Some(temp),
            Err(err) => {
                warn!("Error, temperature not measured: {err}");
                None
            }
        };

        let decision = self.engine.tick(reading, now_ms);
        let temp = format_temp(self.engine.state().last_temp_c);
        debug!("{temp}  :  {decision:?}");

        if !self.started {
            info!("{temp}  :  Measurement started.");
            self.started = true;
        }

        if let Some(level) = decision.fan_command() {
            if let Some(message) = decision.message() {
                info!("{temp}  :  {message}");
            }
            self.apply(level);
        }

        self.ticks = self.ticks.wrapping_add(1);
        if self.status_interval > 0 && self.ticks % self.status_interval == 0 {
            match serde_json::to_string(&self.engine.state_payload(now_ms)) {
                Ok(body) => debug!("fan state: {body}"),
                Err(err) => warn!("fan state serialization failed: {err}"),
            }
        }

        decision
    }

    /// Ticks on a fixed cadence until `shutdown` resolves, then drives the
    /// fan off.
    pub async fn run(
        &mut self,
        tick: Duration,
        shutdown: impl Future<Output = ()>,
    ) -> anyhow::Result<()> {
        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = interval.tick() => {
                    self.step(monotonic_ms());
                }
            }
        }

        info!("shutdown requested, turning fan off");
        self.actuator
            .set_fan(false)
            .context("failed to turn fan off on shutdown")?;
        Ok(())
    }

    fn apply(&mut self, level: bool) {
        match self.actuator.set_fan(level) {
            Ok(()) => self.pending_level = None,
            Err(err) => {
                error!("failed to drive fan pin: {err}");
                self.pending_level = Some(level);
            }
        }
    }
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!("failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

fn format_temp(temp: Option<f32>) -> String {
    match temp {
        Some(temp) => format!("{temp:.1}c"),
        None => "--c".to_string(),
    }
}

fn monotonic_ms() -> u64 {
    static START: OnceLock<Instant> = OnceLock::new();
    START
        .get_or_init(Instant::now)
        .elapsed()
        .as_millis()
        .try_into()
        .unwrap_or(u64::MAX)
}
