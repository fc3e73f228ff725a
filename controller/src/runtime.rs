use std::{path::PathBuf, time::Duration};

use pifan_common::FanConfig;
use tracing::{info, warn};

use crate::thermal::DEFAULT_THERMAL_PATH;

/// BCM 17 is physical header pin 11, the conventional fan pin.
pub const DEFAULT_GPIO_PIN: u8 = 17;

/// Process settings taken from the environment, separate from the fan
/// thresholds passed on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeSettings {
    pub gpio_pin: u8,
    pub thermal_path: PathBuf,
    pub tick: Duration,
    pub status_interval: u64,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            gpio_pin: DEFAULT_GPIO_PIN,
            thermal_path: PathBuf::from(DEFAULT_THERMAL_PATH),
            tick: Duration::from_secs(1),
            status_interval: 60,
        }
    }
}

impl RuntimeSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let gpio_pin = parse_or(&lookup, "PIFAN_GPIO_PIN", defaults.gpio_pin);
        let thermal_path = lookup("PIFAN_THERMAL_PATH")
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.thermal_path);
        let tick_ms = parse_or(&lookup, "PIFAN_TICK_MS", 1_000u64).max(1);
        let status_interval = parse_or(&lookup, "PIFAN_STATUS_INTERVAL", defaults.status_interval);

        Self {
            gpio_pin,
            thermal_path,
            tick: Duration::from_millis(tick_ms),
            status_interval,
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        Some(value) => value.trim().parse::<T>().unwrap_or_else(|_| {
            warn!("ignoring invalid {key}={value}; using {default}");
            default
        }),
        None => default,
    }
}

pub fn log_banner(config: &FanConfig, pin: &str) {
    info!("Raspberry Pi Fan Controller v{}", env!("CARGO_PKG_VERSION"));
    info!(" fan control pin: {pin}");
    for line in config.summary_lines() {
        info!(" {line}");
    }
}
