use thiserror::Error;

/// Typed hardware errors surfaced by sensor and actuator backends.
#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("spi error: {0}")]
    Spi(String),
    #[error("adc out of range: {0}")]
    AdcRange(i32),
}
