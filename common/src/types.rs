use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FanState {
    Idle,
    Running,
}

impl FanState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Running => "RUNNING",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartReason {
    /// Scheduled spin after the idle interval elapsed.
    AntiDust,
    OverTemperature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    TemperatureRecovered,
}

/// Outcome of a single engine tick.
///
/// On `StartedFan` / `StoppedFan` the engine has already committed the
/// transition; the caller only drives the pin and logs the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    NoChange,
    StartedFan { reason: StartReason },
    StoppedFan { reason: StopReason },
    MeasurementFailed,
}

impl Decision {
    /// Pin level the caller must apply, if any.
    pub fn fan_command(self) -> Option<bool> {
        match self {
            Self::StartedFan { .. } => Some(true),
            Self::StoppedFan { .. } => Some(false),
            Self::NoChange | Self::MeasurementFailed => None,
        }
    }

    pub fn message(self) -> Option<&'static str> {
        match self {
            Self::StartedFan {
                reason: StartReason::AntiDust,
            } => Some("Fan started for scheduled anti-dust run."),
            Self::StartedFan {
                reason: StartReason::OverTemperature,
            } => Some("Fan started because temp is too high!"),
            Self::StoppedFan {
                reason: StopReason::TemperatureRecovered,
            } => Some("Fan stopped. Everything is ok."),
            Self::MeasurementFailed => Some("Error, temperature not measured."),
            Self::NoChange => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FanStatePayload {
    pub state: &'static str,
    #[serde(rename = "fanOn")]
    pub fan_on: bool,
    #[serde(rename = "lastTemp")]
    pub last_temp_c: Option<f32>,
    #[serde(rename = "minTemp")]
    pub min_temp_c: f32,
    #[serde(rename = "maxTemp")]
    pub max_temp_c: f32,
    #[serde(rename = "runningMs")]
    pub running_ms: u64,
    #[serde(rename = "idleMs")]
    pub idle_ms: u64,
    #[serde(rename = "nextDustSpinMs")]
    pub next_dust_spin_ms: Option<u64>,
}
