use anyhow::Context;
use pifan_common::{ActuatorError, FanActuator, FanConfig};
use rppal::gpio::{Gpio, OutputPin};

use crate::runtime::RuntimeSettings;

/// Fan transistor on a Raspberry Pi header pin, HIGH = on.
pub struct GpioFan {
    pin: OutputPin,
}

impl GpioFan {
    /// Claims the BCM pin and drives it LOW before the loop starts.
    pub fn new(bcm_pin: u8) -> anyhow::Result<Self> {
        let gpio = Gpio::new().context("failed to open GPIO peripheral")?;
        let pin = gpio
            .get(bcm_pin)
            .with_context(|| format!("failed to claim GPIO {bcm_pin}"))?
            .into_output_low();
        Ok(Self { pin })
    }
}

impl FanActuator for GpioFan {
    fn set_fan(&mut self, on: bool) -> Result<(), ActuatorError> {
        if on {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("GPIO {} (BCM)", self.pin.pin())
    }
}

pub async fn run(config: FanConfig, settings: RuntimeSettings) -> anyhow::Result<()> {
    let fan = GpioFan::new(settings.gpio_pin)?;
    crate::run_daemon(config, settings, fan).await
}
