#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas for the pump controller.
//!
//! `Config` and sub-structs are deserialized from TOML and validated.
//! Every section has conservative defaults so a partial file is usable;
//! `validate()` rejects values that would break the control loop.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerCfg {
    /// Bind address for the HTTP frontend
    pub bind: String,
    pub port: u16,
}

impl Default for ServerCfg {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SensorCfg {
    /// ADC full-scale count (12-bit converter by default)
    pub full_scale: i32,
    /// Raw samples averaged per reading
    pub sample_count: u32,
    /// Delay between raw samples (ms)
    pub sample_interval_ms: u64,
    /// Deadband width in mg/dL; smaller deltas keep the previous stable value
    pub stability_threshold: i32,
}

impl Default for SensorCfg {
    fn default() -> Self {
        Self {
            full_scale: 4095,
            sample_count: 10,
            sample_interval_ms: 5,
            stability_threshold: 5,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InjectionCfg {
    /// Delivery rate in centi-units per second (10 = 0.1 U/s)
    pub rate_cu_per_s: u32,
    /// Period of the background tick thread (ms)
    pub tick_ms: u64,
}

impl Default for InjectionCfg {
    fn default() -> Self {
        Self {
            rate_cu_per_s: 10,
            tick_ms: 250,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageCfg {
    /// Path to the JSON user-record document
    pub users_file: String,
}

impl Default for StorageCfg {
    fn default() -> Self {
        Self {
            users_file: "users.json".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerCfg,
    pub sensor: SensorCfg,
    pub injection: InjectionCfg,
    pub storage: StorageCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Sensor
        if self.sensor.full_scale <= 0 {
            eyre::bail!("sensor.full_scale must be > 0");
        }
        if self.sensor.sample_count == 0 {
            eyre::bail!("sensor.sample_count must be >= 1");
        }
        if self.sensor.stability_threshold < 0 {
            eyre::bail!("sensor.stability_threshold must be >= 0");
        }
        if self.sensor.stability_threshold > 100 {
            eyre::bail!("sensor.stability_threshold is unreasonably large (>100 mg/dL)");
        }

        // Injection
        if self.injection.rate_cu_per_s == 0 {
            eyre::bail!("injection.rate_cu_per_s must be > 0");
        }
        if self.injection.tick_ms == 0 {
            eyre::bail!("injection.tick_ms must be >= 1");
        }
        if self.injection.tick_ms > 60_000 {
            eyre::bail!("injection.tick_ms is unreasonably large (>60s)");
        }

        // Storage
        if self.storage.users_file.is_empty() {
            eyre::bail!("storage.users_file must not be empty");
        }

        Ok(())
    }
}
