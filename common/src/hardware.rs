use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeasurementError {
    #[error("failed to read temperature source: {0}")]
    Io(#[from] std::io::Error),
    #[error("unparseable temperature reading `{0}`")]
    Parse(String),
    #[error("implausible temperature reading {0}")]
    Implausible(f32),
}

#[derive(Debug, Error)]
pub enum ActuatorError {
    #[error("fan pin write failed: {0}")]
    Write(String),
}

/// Produces CPU temperature readings in degrees Celsius.
pub trait TemperatureSource {
    fn read_celsius(&mut self) -> Result<f32, MeasurementError>;
}

/// Drives the fan output: `true` is HIGH (fan on), `false` is LOW.
pub trait FanActuator {
    fn set_fan(&mut self, on: bool) -> Result<(), ActuatorError>;

    /// Human-readable pin identifier for the startup banner.
    fn describe(&self) -> String;
}
