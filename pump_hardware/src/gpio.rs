//! Raspberry Pi backends: relay and LED on GPIO outputs, potentiometer via
//! an MCP3008 ADC on SPI0. Linux only, behind the `hardware` feature.

use std::time::Duration;

use rppal::gpio::{Gpio, OutputPin};
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};

use crate::error::HwError;
use pump_traits::{GlucoseSensor, Indicator, Pump};

/// Relay-driven pump on a single GPIO output (active high).
pub struct RelayPump {
    pin: OutputPin,
}

impl RelayPump {
    pub fn new(gpio_pin: u8) -> Result<Self, HwError> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let mut pin = gpio
            .get(gpio_pin)
            .map_err(|e| HwError::Gpio(e.to_string()))?
            .into_output();
        pin.set_low();
        Ok(Self { pin })
    }
}

impl Pump for RelayPump {
    fn energize(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.pin.set_high();
        tracing::info!("pump relay energized");
        Ok(())
    }

    fn deenergize(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.pin.set_low();
        tracing::info!("pump relay de-energized");
        Ok(())
    }
}

// Relay must never stay energized past the process lifetime.
impl Drop for RelayPump {
    fn drop(&mut self) {
        self.pin.set_low();
    }
}

/// Indicator LED on a GPIO output.
pub struct LedIndicator {
    pin: OutputPin,
}

impl LedIndicator {
    pub fn new(gpio_pin: u8) -> Result<Self, HwError> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let pin = gpio
            .get(gpio_pin)
            .map_err(|e| HwError::Gpio(e.to_string()))?
            .into_output();
        Ok(Self { pin })
    }
}

impl Indicator for LedIndicator {
    fn set(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if on {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
        Ok(())
    }
}

/// Potentiometer sampled through an MCP3008 (10-bit) on SPI0.
pub struct Mcp3008Sensor {
    spi: Spi,
    channel: u8,
}

impl Mcp3008Sensor {
    pub fn new(channel: u8) -> Result<Self, HwError> {
        if channel > 7 {
            return Err(HwError::Spi(format!("invalid MCP3008 channel {channel}")));
        }
        let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, 1_350_000, Mode::Mode0)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        Ok(Self { spi, channel })
    }
}

impl GlucoseSensor for Mcp3008Sensor {
    fn sample(&mut self) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        // Single-ended conversion: start bit, mode+channel, one clock byte.
        let tx = [0x01, (0x08 | self.channel) << 4, 0x00];
        let mut rx = [0u8; 3];
        self.spi
            .transfer(&mut rx, &tx)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        let raw = (i32::from(rx[1] & 0x03) << 8) | i32::from(rx[2]);
        tracing::trace!(raw, "mcp3008 sample");
        // Settling time between conversions keeps readings clean.
        std::thread::sleep(Duration::from_micros(100));
        Ok(raw)
    }
}
