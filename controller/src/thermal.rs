use std::path::{Path, PathBuf};

use pifan_common::{MeasurementError, TemperatureSource};

pub const DEFAULT_THERMAL_PATH: &str = "/sys/class/thermal/thermal_zone0/temp";

const MIN_PLAUSIBLE_C: f32 = -40.0;
const MAX_PLAUSIBLE_C: f32 = 150.0;

/// CPU temperature from the kernel thermal zone, reported in millidegrees.
#[derive(Debug, Clone)]
pub struct SysfsThermal {
    path: PathBuf,
}

impl SysfsThermal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TemperatureSource for SysfsThermal {
    fn read_celsius(&mut self) -> Result<f32, MeasurementError> {
        let raw = std::fs::read_to_string(&self.path)?;
        parse_millidegrees(&raw)
    }
}

fn parse_millidegrees(raw: &str) -> Result<f32, MeasurementError> {
    let trimmed = raw.trim();
    let milli = trimmed
        .parse::<i64>()
        .map_err(|_| MeasurementError::Parse(trimmed.to_string()))?;
    let celsius = milli as f32 / 1_000.0;
    if !(MIN_PLAUSIBLE_C..=MAX_PLAUSIBLE_C).contains(&celsius) {
        return Err(MeasurementError::Implausible(celsius));
    }
    Ok(celsius)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn reads_millidegrees_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "48312").unwrap();

        let mut source = SysfsThermal::new(file.path());
        let temp = source.read_celsius().unwrap();

        assert!((temp - 48.312).abs() < 0.001);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = SysfsThermal::new(dir.path().join("temp"));

        assert!(matches!(
            source.read_celsius(),
            Err(MeasurementError::Io(_))
        ));
    }

    #[test]
    fn rejects_garbage_and_implausible_values() {
        assert!(matches!(
            parse_millidegrees("hot\n"),
            Err(MeasurementError::Parse(_))
        ));
        assert!(matches!(
            parse_millidegrees("500000"),
            Err(MeasurementError::Implausible(_))
        ));
        assert_eq!(parse_millidegrees("-5000\n").unwrap(), -5.0);
    }
}
