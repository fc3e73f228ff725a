use pifan_common::{ActuatorError, FanActuator, FanConfig};
use tracing::info;

use crate::runtime::RuntimeSettings;

/// Stand-in fan pin for machines without GPIO; it only logs the level.
#[derive(Debug)]
pub struct LoggingPin {
    pin: u8,
    level: bool,
}

impl LoggingPin {
    pub fn new(pin: u8) -> Self {
        Self { pin, level: false }
    }

    #[cfg(test)]
    pub fn is_high(&self) -> bool {
        self.level
    }
}

impl FanActuator for LoggingPin {
    fn set_fan(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.level = on;
        // Real GPIO lives behind the `rpi` feature.
        info!(
            "fan pin BCM {} -> {}",
            self.pin,
            if on { "HIGH" } else { "LOW" }
        );
        Ok(())
    }

    fn describe(&self) -> String {
        format!("BCM {} (simulated)", self.pin)
    }
}

pub async fn run(config: FanConfig, settings: RuntimeSettings) -> anyhow::Result<()> {
    let pin = LoggingPin::new(settings.gpio_pin);
    crate::run_daemon(config, settings, pin).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_commanded_level() {
        let mut pin = LoggingPin::new(17);
        assert!(!pin.is_high());

        pin.set_fan(true).unwrap();
        assert!(pin.is_high());

        pin.set_fan(false).unwrap();
        assert!(!pin.is_high());
        assert_eq!(pin.describe(), "BCM 17 (simulated)");
    }
}
