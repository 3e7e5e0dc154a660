//! Sensor acquisition and noise filtering.
//!
//! Raw ADC counts become a stabilized glucose reading in three stages:
//! multi-sample integer averaging, linear mapping onto the clinical range,
//! and a deadband filter that suppresses jitter around the last accepted
//! value.

use std::sync::Arc;
use std::time::Duration;

use eyre::WrapErr;
use pump_traits::{Clock, GlucoseSensor};

use crate::error::{DeviceError, Result};
use crate::units::round_to_nearest_ten;

/// Lower bound of the mapped glucose range (mg/dL).
pub const GLUCOSE_MIN: i32 = 20;
/// Span of the mapped glucose range: `[20, 400]` mg/dL.
pub const GLUCOSE_SPAN: i32 = 380;

/// Sensor acquisition parameters.
#[derive(Debug, Clone)]
pub struct SensorTuning {
    /// ADC full-scale count.
    pub full_scale: i32,
    /// Raw samples averaged per reading.
    pub sample_count: u32,
    /// Delay between raw samples (ms).
    pub sample_interval_ms: u64,
    /// Deadband width in mg/dL; smaller deltas hold the previous value.
    pub stability_threshold: i32,
}

impl Default for SensorTuning {
    fn default() -> Self {
        Self {
            full_scale: 4095,
            sample_count: 10,
            sample_interval_ms: 5,
            stability_threshold: 5,
        }
    }
}

impl From<&pump_config::SensorCfg> for SensorTuning {
    fn from(c: &pump_config::SensorCfg) -> Self {
        Self {
            full_scale: c.full_scale,
            sample_count: c.sample_count,
            sample_interval_ms: c.sample_interval_ms,
            stability_threshold: c.stability_threshold,
        }
    }
}

/// One stabilized glucose reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlucoseReading {
    /// Integer average of the raw samples (sensor-unit domain).
    pub raw_average: i32,
    /// Stabilized value in mg/dL, always a multiple of 10.
    pub value: i32,
    /// The accepted value prior to this reading.
    pub last_stable: i32,
}

/// Display band for a glucose value, with the dashboard color/icon scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlucoseBand {
    Low,
    Normal,
    Elevated,
    Critical,
}

impl GlucoseBand {
    pub fn of(mg_dl: i32) -> Self {
        if mg_dl < 70 {
            Self::Low
        } else if mg_dl <= 140 {
            Self::Normal
        } else if mg_dl <= 200 {
            Self::Elevated
        } else {
            Self::Critical
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Normal => "NORMAL",
            Self::Elevated => "ELEVATED",
            Self::Critical => "CRITICAL",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Low => "#ef4444",
            Self::Normal => "#10b981",
            Self::Elevated => "#f59e0b",
            Self::Critical => "#dc2626",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Low => "⚠️",
            Self::Normal => "✅",
            Self::Elevated => "⚡",
            Self::Critical => "🚨",
        }
    }
}

/// Turns raw sensor samples into stabilized readings.
pub struct SensorFilter<S: GlucoseSensor> {
    sensor: S,
    tuning: SensorTuning,
    clock: Arc<dyn Clock + Send + Sync>,
    last_stable: i32,
}

impl<S: GlucoseSensor> SensorFilter<S> {
    pub fn new(sensor: S, tuning: SensorTuning, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            sensor,
            tuning,
            clock,
            last_stable: 0,
        }
    }

    /// The last accepted value in mg/dL (0 until the first reading).
    pub fn last_stable(&self) -> i32 {
        self.last_stable
    }

    /// Acquire one stabilized reading.
    ///
    /// Averages `sample_count` raw samples taken `sample_interval_ms` apart,
    /// maps `[0, full_scale]` linearly to `[20, 400]` mg/dL, rounds to the
    /// nearest multiple of 10, then applies the deadband against the previous
    /// accepted value.
    pub fn read(&mut self) -> Result<GlucoseReading> {
        let n = self.tuning.sample_count.max(1);
        let interval = Duration::from_millis(self.tuning.sample_interval_ms);

        let mut sum: i64 = 0;
        for i in 0..n {
            let raw = self
                .sensor
                .sample()
                .map_err(|e| eyre::Report::new(DeviceError::Hardware(e.to_string())))
                .wrap_err("reading glucose sensor")?;
            sum += i64::from(raw);
            if i + 1 < n {
                self.clock.sleep(interval);
            }
        }
        let raw_average = (sum / i64::from(n)) as i32;

        // Readings outside the converter's domain are clamped before mapping.
        let full_scale = self.tuning.full_scale.max(1);
        let in_domain = raw_average.clamp(0, full_scale);
        let scaled = (i64::from(in_domain) * i64::from(GLUCOSE_SPAN) / i64::from(full_scale))
            as i32
            + GLUCOSE_MIN;
        let candidate = round_to_nearest_ten(scaled);

        let last_stable = self.last_stable;
        let value = if (candidate - last_stable).abs() < self.tuning.stability_threshold {
            last_stable
        } else {
            self.last_stable = candidate;
            candidate
        };

        tracing::trace!(raw_average, candidate, value, "glucose reading");
        Ok(GlucoseReading {
            raw_average,
            value,
            last_stable,
        })
    }
}
