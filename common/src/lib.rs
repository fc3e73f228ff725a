pub mod config;
pub mod engine;
pub mod hardware;
pub mod types;

pub use config::{usage, ConfigError, ConfigErrors, FanConfig};
pub use engine::{EngineState, FanControlEngine};
pub use hardware::{ActuatorError, FanActuator, MeasurementError, TemperatureSource};
pub use types::{Decision, FanState, FanStatePayload, StartReason, StopReason};
