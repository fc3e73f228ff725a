use crate::{
    config::FanConfig,
    types::{Decision, FanState, FanStatePayload, StartReason, StopReason},
};

/// Mutable state of the fan engine.
///
/// `last_transition_ms` is `None` until the fan has been started or stopped
/// once; a never-run engine counts as overdue for its anti-dust spin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineState {
    pub fan: FanState,
    pub last_transition_ms: Option<u64>,
    pub last_temp_c: Option<f32>,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            fan: FanState::Idle,
            last_transition_ms: None,
            last_temp_c: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FanControlEngine {
    config: FanConfig,
    state: EngineState,
}

impl FanControlEngine {
    pub fn new(config: FanConfig) -> Self {
        Self::with_state(config, EngineState::default())
    }

    pub fn with_state(config: FanConfig, state: EngineState) -> Self {
        Self { config, state }
    }

    pub fn config(&self) -> &FanConfig {
        &self.config
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_fan_running(&self) -> bool {
        self.state.fan == FanState::Running
    }

    /// Evaluates one sample. `reading` is `None` when the measurement failed.
    ///
    /// Rules run in priority order: anti-dust start, thermal start, thermal
    /// stop. A failed or non-finite reading only allows the anti-dust start.
    pub fn tick(&mut self, reading: Option<f32>, now_ms: u64) -> Decision {
        let reading = reading.filter(|temp| temp.is_finite());
        if let Some(temp) = reading {
            self.state.last_temp_c = Some(temp);
        }

        if self.anti_dust_due(now_ms) {
            return self.start(StartReason::AntiDust, now_ms);
        }

        let Some(temp) = reading else {
            return Decision::MeasurementFailed;
        };

        match self.state.fan {
            FanState::Idle if temp >= self.config.max_temp_c => {
                self.start(StartReason::OverTemperature, now_ms)
            }
            FanState::Running
                if self.min_run_elapsed(now_ms) && temp <= self.config.min_temp_c =>
            {
                self.stop(StopReason::TemperatureRecovered, now_ms)
            }
            _ => Decision::NoChange,
        }
    }

    pub fn running_ms(&self, now_ms: u64) -> u64 {
        match (self.state.fan, self.state.last_transition_ms) {
            (FanState::Running, Some(start)) => now_ms.saturating_sub(start),
            _ => 0,
        }
    }

    pub fn idle_ms(&self, now_ms: u64) -> u64 {
        match self.state.fan {
            FanState::Idle => now_ms.saturating_sub(self.state.last_transition_ms.unwrap_or(0)),
            FanState::Running => 0,
        }
    }

    /// Time left until the next forced spin, `None` while running or disabled.
    pub fn next_dust_spin_ms(&self, now_ms: u64) -> Option<u64> {
        let interval = self.config.max_idle_interval_ms()?;
        if self.state.fan == FanState::Running {
            return None;
        }
        Some(match self.state.last_transition_ms {
            Some(last) => last.saturating_add(interval).saturating_sub(now_ms),
            None => 0,
        })
    }

    pub fn state_payload(&self, now_ms: u64) -> FanStatePayload {
        FanStatePayload {
            state: self.state.fan.as_str(),
            fan_on: self.is_fan_running(),
            last_temp_c: self.state.last_temp_c,
            min_temp_c: self.config.min_temp_c,
            max_temp_c: self.config.max_temp_c,
            running_ms: self.running_ms(now_ms),
            idle_ms: self.idle_ms(now_ms),
            next_dust_spin_ms: self.next_dust_spin_ms(now_ms),
        }
    }

    fn anti_dust_due(&self, now_ms: u64) -> bool {
        if self.state.fan != FanState::Idle {
            return false;
        }
        let Some(interval) = self.config.max_idle_interval_ms() else {
            return false;
        };
        self.state
            .last_transition_ms
            .map(|last| now_ms >= last.saturating_add(interval))
            .unwrap_or(true)
    }

    fn min_run_elapsed(&self, now_ms: u64) -> bool {
        self.state
            .last_transition_ms
            .map(|last| now_ms.saturating_sub(last) >= self.config.min_run_duration_ms)
            .unwrap_or(true)
    }

    fn start(&mut self, reason: StartReason, now_ms: u64) -> Decision {
        self.state.fan = FanState::Running;
        self.state.last_transition_ms = Some(now_ms);
        Decision::StartedFan { reason }
    }

    fn stop(&mut self, reason: StopReason, now_ms: u64) -> Decision {
        self.state.fan = FanState::Idle;
        self.state.last_transition_ms = Some(now_ms);
        Decision::StoppedFan { reason }
    }
}
