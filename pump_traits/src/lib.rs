pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Raw glucose sensor (potentiometer-backed ADC).
///
/// `sample()` returns one raw count in the converter's full-scale domain.
pub trait GlucoseSensor {
    fn sample(&mut self) -> Result<i32, Box<dyn std::error::Error + Send + Sync>>;
}

/// The pump actuator (relay-driven). Exactly one exists per device.
pub trait Pump {
    fn energize(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn deenergize(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Delivery indicator light; mirrors the pump state.
pub trait Indicator {
    fn set(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: GlucoseSensor + ?Sized> GlucoseSensor for Box<T> {
    fn sample(&mut self) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        (**self).sample()
    }
}

impl<T: Pump + ?Sized> Pump for Box<T> {
    fn energize(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).energize()
    }
    fn deenergize(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).deenergize()
    }
}

impl<T: Indicator + ?Sized> Indicator for Box<T> {
    fn set(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).set(on)
    }
}
