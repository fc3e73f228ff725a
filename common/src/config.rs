use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_TEMP_RANGE_C: (f32, f32) = (30.0, 65.0);
pub const MAX_TEMP_RANGE_C: (f32, f32) = (70.0, 82.0);

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_HOUR: i64 = 3_600_000;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{arg}")]
    Malformed { arg: String },
    #[error("{arg}")]
    UnrecognizedKey { arg: String },
    #[error("{arg}")]
    NotANumber { arg: String },
    #[error("{arg}  Value is outside the accepted range ({low} - {high}).")]
    OutOfRange { arg: String, low: f32, high: f32 },
    #[error("{arg}  Value must be {min} or higher.")]
    BelowMinimum { arg: String, min: i64 },
    #[error("max={max_temp_c}  Value must be above min ({min_temp_c}).")]
    InvertedThresholds { min_temp_c: f32, max_temp_c: f32 },
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{} invalid argument(s)", .0.len())]
pub struct ConfigErrors(pub Vec<ConfigError>);

/// Thresholds and durations consumed by the fan engine.
///
/// Durations are in milliseconds; a `max_idle_interval_ms` of 0 disables
/// the anti-dust spin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FanConfig {
    pub min_temp_c: f32,
    pub max_temp_c: f32,
    pub min_run_duration_ms: u64,
    pub max_idle_interval_ms: u64,
}

impl Default for FanConfig {
    fn default() -> Self {
        Self {
            min_temp_c: 50.0,
            max_temp_c: 75.0,
            min_run_duration_ms: 300_000,
            max_idle_interval_ms: 0,
        }
    }
}

impl FanConfig {
    /// Builds a config from `key=value` arguments on top of the defaults.
    ///
    /// Every bad argument is reported, not just the first one.
    pub fn from_args<I, S>(args: I) -> Result<Self, ConfigErrors>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self::default();
        let mut errors = Vec::new();

        for arg in args {
            let arg = arg.as_ref();
            if let Err(err) = config.apply_arg(arg) {
                errors.push(err);
            }
        }

        if let Err(ConfigErrors(mut more)) = config.validate() {
            errors.append(&mut more);
        }

        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigErrors(errors))
        }
    }

    /// Checks every field against its accepted range.
    pub fn validate(&self) -> Result<(), ConfigErrors> {
        let mut errors = Vec::new();

        if !in_range(self.min_temp_c, MIN_TEMP_RANGE_C) {
            errors.push(out_of_range(
                format!("min={}", self.min_temp_c),
                MIN_TEMP_RANGE_C,
            ));
        }
        if !in_range(self.max_temp_c, MAX_TEMP_RANGE_C) {
            errors.push(out_of_range(
                format!("max={}", self.max_temp_c),
                MAX_TEMP_RANGE_C,
            ));
        }
        if self.max_temp_c <= self.min_temp_c {
            errors.push(ConfigError::InvertedThresholds {
                min_temp_c: self.min_temp_c,
                max_temp_c: self.max_temp_c,
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigErrors(errors))
        }
    }

    pub fn max_idle_interval_ms(&self) -> Option<u64> {
        (self.max_idle_interval_ms > 0).then_some(self.max_idle_interval_ms)
    }

    pub fn summary_lines(&self) -> Vec<String> {
        let dust = match self.max_idle_interval_ms() {
            Some(ms) => format!("{}h.", ms / MS_PER_HOUR as u64),
            None => "disabled.".to_string(),
        };
        vec![
            format!("fan lower threshold: {}c.", self.min_temp_c),
            format!("fan upper threshold: {}c.", self.max_temp_c),
            format!(
                "fan run duration: {}s.",
                self.min_run_duration_ms / MS_PER_SECOND as u64
            ),
            format!("fan max spin interval: {dust}"),
        ]
    }

    fn apply_arg(&mut self, arg: &str) -> Result<(), ConfigError> {
        let mut parts = arg.split('=');
        let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ConfigError::Malformed {
                arg: arg.to_string(),
            });
        };
        if value.is_empty() {
            return Err(ConfigError::Malformed {
                arg: arg.to_string(),
            });
        }

        match key {
            "min" => {
                let temp = parse_temp(arg, value, MIN_TEMP_RANGE_C)?;
                self.min_temp_c = temp;
            }
            "max" => {
                let temp = parse_temp(arg, value, MAX_TEMP_RANGE_C)?;
                self.max_temp_c = temp;
            }
            "dur" => {
                self.min_run_duration_ms = parse_duration_ms(arg, value, MS_PER_SECOND)?;
            }
            "dus" => {
                self.max_idle_interval_ms = parse_duration_ms(arg, value, MS_PER_HOUR)?;
            }
            _ => {
                return Err(ConfigError::UnrecognizedKey {
                    arg: arg.to_string(),
                })
            }
        }
        Ok(())
    }
}

/// Help dump printed when the arguments are rejected.
pub fn usage(errors: &ConfigErrors) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str("Error, the following parameters are not recognized:\n\n");
    for err in &errors.0 {
        let _ = writeln!(out, " {err}");
    }
    out.push_str("\n\nParameters:\n\n");
    out.push_str("  min=<value> = Temp (c) at which the fan will turn off.\n");
    out.push_str("  max=<value> = Temp (c) at which the fan will turn on.\n");
    out.push_str("  dur=<value> = Minimum duration (seconds) the fan runs.\n");
    out.push_str("  dus=<value> = Max time (hours) between fan spins. Used to remove dust.\n");
    out.push_str("\nParameter usage example:\n\n");
    out.push_str("  min=45 max=82 dur=600 dus=24\n\n");
    out
}

fn in_range(value: f32, (low, high): (f32, f32)) -> bool {
    (low..=high).contains(&value)
}

fn out_of_range(arg: String, (low, high): (f32, f32)) -> ConfigError {
    ConfigError::OutOfRange { arg, low, high }
}

fn parse_temp(arg: &str, value: &str, range: (f32, f32)) -> Result<f32, ConfigError> {
    let temp = value
        .trim()
        .parse::<f32>()
        .map_err(|_| ConfigError::NotANumber {
            arg: arg.to_string(),
        })?;
    if !in_range(temp, range) {
        return Err(out_of_range(arg.to_string(), range));
    }
    Ok(temp)
}

fn parse_duration_ms(arg: &str, value: &str, unit_ms: i64) -> Result<u64, ConfigError> {
    let amount = value
        .trim()
        .parse::<i64>()
        .map_err(|_| ConfigError::NotANumber {
            arg: arg.to_string(),
        })?;
    if amount < 0 {
        return Err(ConfigError::BelowMinimum {
            arg: arg.to_string(),
            min: 0,
        });
    }
    amount
        .checked_mul(unit_ms)
        .and_then(|ms| u64::try_from(ms).ok())
        .ok_or_else(|| ConfigError::OutOfRange {
            arg: arg.to_string(),
            low: 0.0,
            high: (i64::MAX / unit_ms) as f32,
        })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn no_arguments_yield_defaults() {
        let config = FanConfig::from_args(Vec::<String>::new()).unwrap();
        assert_eq!(config, FanConfig::default());
    }

    #[test]
    fn parses_all_keys_and_converts_units() {
        let config = FanConfig::from_args(["min=45", "max=82", "dur=600", "dus=24"]).unwrap();

        assert_eq!(
            config,
            FanConfig {
                min_temp_c: 45.0,
                max_temp_c: 82.0,
                min_run_duration_ms: 600_000,
                max_idle_interval_ms: 86_400_000,
            }
        );
    }

    #[test]
    fn accepts_fractional_temperatures() {
        let config = FanConfig::from_args(["min=47.5"]).unwrap();
        assert_eq!(config.min_temp_c, 47.5);
    }

    #[test]
    fn later_duplicate_wins() {
        let config = FanConfig::from_args(["dur=10", "dur=20"]).unwrap();
        assert_eq!(config.min_run_duration_ms, 20_000);
    }

    #[test]
    fn non_numeric_value_is_rejected() {
        let err = FanConfig::from_args(["min=abc"]).unwrap_err();
        assert_eq!(
            err.0,
            vec![ConfigError::NotANumber {
                arg: "min=abc".to_string()
            }]
        );
    }

    #[test]
    fn collects_every_bad_argument() {
        let err = FanConfig::from_args([
            "min=20", "max=90", "dur=-1", "dus=x", "speed=3", "min", "a=b=c", "max=",
        ])
        .unwrap_err();

        assert_eq!(
            err.0,
            vec![
                ConfigError::OutOfRange {
                    arg: "min=20".to_string(),
                    low: 30.0,
                    high: 65.0,
                },
                ConfigError::OutOfRange {
                    arg: "max=90".to_string(),
                    low: 70.0,
                    high: 82.0,
                },
                ConfigError::BelowMinimum {
                    arg: "dur=-1".to_string(),
                    min: 0,
                },
                ConfigError::NotANumber {
                    arg: "dus=x".to_string()
                },
                ConfigError::UnrecognizedKey {
                    arg: "speed=3".to_string()
                },
                ConfigError::Malformed {
                    arg: "min".to_string()
                },
                ConfigError::Malformed {
                    arg: "a=b=c".to_string()
                },
                ConfigError::Malformed {
                    arg: "max=".to_string()
                },
            ]
        );
    }

    #[test]
    fn nan_temperature_is_out_of_range() {
        let err = FanConfig::from_args(["max=NaN"]).unwrap_err();
        assert!(matches!(err.0[0], ConfigError::OutOfRange { .. }));
    }

    #[test]
    fn overflowing_duration_is_rejected() {
        let err = FanConfig::from_args(["dus=9223372036854775807"]).unwrap_err();
        assert!(matches!(err.0[0], ConfigError::OutOfRange { .. }));
    }

    #[test]
    fn validate_rejects_inverted_thresholds() {
        let config = FanConfig {
            min_temp_c: 65.0,
            max_temp_c: 65.0,
            ..FanConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.0,
            vec![
                ConfigError::OutOfRange {
                    arg: "max=65".to_string(),
                    low: 70.0,
                    high: 82.0,
                },
                ConfigError::InvertedThresholds {
                    min_temp_c: 65.0,
                    max_temp_c: 65.0,
                },
            ]
        );

        let deserialized: FanConfig = serde_json::from_str(
            r#"{"min_temp_c":60.0,"max_temp_c":70.0,"min_run_duration_ms":0,"max_idle_interval_ms":0}"#,
        )
        .unwrap();
        assert!(deserialized.validate().is_ok());
    }

    #[test]
    fn usage_lists_offending_arguments() {
        let err = FanConfig::from_args(["min=abc", "max=99"]).unwrap_err();
        let text = usage(&err);

        assert!(text.contains(" min=abc\n"));
        assert!(text.contains(" max=99  Value is outside the accepted range (70 - 82)."));
        assert!(text.contains("min=45 max=82 dur=600 dus=24"));
    }

    #[test]
    fn summary_reports_disabled_dust_spin() {
        let lines = FanConfig::default().summary_lines();
        assert_eq!(lines[2], "fan run duration: 300s.");
        assert_eq!(lines[3], "fan max spin interval: disabled.");

        let config = FanConfig::from_args(["dus=12"]).unwrap();
        assert_eq!(config.summary_lines()[3], "fan max spin interval: 12h.");
    }
}
