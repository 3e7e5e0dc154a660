//! Hardware backends for the pump controller.
//!
//! Simulated implementations are always available and are the default; real
//! GPIO/SPI backends (Raspberry Pi, via rppal) sit behind the `hardware`
//! feature. All interactions go through the `pump_traits` seams so the core
//! never links against a GPIO library.

pub mod error;

#[cfg(feature = "hardware")]
pub mod gpio;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use pump_traits::{GlucoseSensor, Indicator, Pump};

/// Simulated potentiometer: returns a shared base level plus a small
/// repeating jitter so the averaging/deadband stages have noise to chew on.
pub struct SimulatedPotentiometer {
    level: Arc<AtomicI32>,
    jitter: [i32; 4],
    idx: usize,
}

impl SimulatedPotentiometer {
    /// `level` is the raw ADC count the knob currently sits at.
    pub fn new(level: i32) -> Self {
        Self {
            level: Arc::new(AtomicI32::new(level)),
            jitter: [0, 3, -2, 1],
            idx: 0,
        }
    }

    /// Shared handle to turn the knob from another thread (demo/tests).
    pub fn level_handle(&self) -> Arc<AtomicI32> {
        self.level.clone()
    }
}

impl GlucoseSensor for SimulatedPotentiometer {
    fn sample(&mut self) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        let j = self.jitter[self.idx % self.jitter.len()];
        self.idx = self.idx.wrapping_add(1);
        let v = self.level.load(Ordering::Relaxed).saturating_add(j).max(0);
        Ok(v)
    }
}

/// Simulated relay-driven pump; exposes its energized flag for assertions.
#[derive(Default)]
pub struct SimulatedPump {
    energized: Arc<AtomicBool>,
}

impl SimulatedPump {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn energized_handle(&self) -> Arc<AtomicBool> {
        self.energized.clone()
    }
}

impl Pump for SimulatedPump {
    fn energize(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.energized.store(true, Ordering::Relaxed);
        tracing::debug!("pump relay energized (simulated)");
        Ok(())
    }

    fn deenergize(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.energized.store(false, Ordering::Relaxed);
        tracing::debug!("pump relay de-energized (simulated)");
        Ok(())
    }
}

/// Simulated indicator LED.
#[derive(Default)]
pub struct SimulatedIndicator {
    on: Arc<AtomicBool>,
}

impl SimulatedIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_handle(&self) -> Arc<AtomicBool> {
        self.on.clone()
    }
}

impl Indicator for SimulatedIndicator {
    fn set(&mut self, on: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.on.store(on, Ordering::Relaxed);
        Ok(())
    }
}
