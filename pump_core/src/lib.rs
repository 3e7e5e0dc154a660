#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core pump-controller logic (hardware-agnostic).
//!
//! This crate provides the control and safety logic for a closed-loop
//! insulin-delivery device. All hardware interactions go through the
//! `pump_traits::GlucoseSensor`, `pump_traits::Pump` and
//! `pump_traits::Indicator` traits.
//!
//! ## Architecture
//!
//! - **Sensing**: multi-sample averaging, linear mg/dL mapping, deadband
//!   (`sensor` module)
//! - **Dosing**: pure glucose → dose/tier mapping (`dose` module)
//! - **Delivery**: injection lifecycle state machine owning the actuator
//!   (`injection` module)
//! - **Sessions**: token-gated identities (`session` module)
//! - **Persistence**: JSON flat-file user records (`store` module)
//! - **Aggregation**: the owned `Device` aggregate and the background
//!   `Ticker` (`device`, `ticker` modules)
//!
//! ## Fixed-Point Arithmetic
//!
//! Dose internals operate in **centi-units** (cu, 1 cu = 0.01 U) using `i32`
//! for deterministic behavior. See the `units` module for conversions and
//! rounding policy.

pub mod device;
pub mod dose;
pub mod error;
pub mod injection;
pub mod mocks;
pub mod password;
pub mod sensor;
pub mod session;
pub mod store;
pub mod ticker;
pub mod units;

pub use device::{Device, GlucoseSnapshot};
pub use dose::{DoseRecommendation, DoseTier, recommend};
pub use error::{DeviceError, Result};
pub use injection::{DoseOutcome, InjectionController, InjectionStatus, InjectionTuning};
pub use sensor::{GlucoseBand, GlucoseReading, SensorFilter, SensorTuning};
pub use session::SessionStore;
pub use store::{HistoryEntry, JsonUserStore, UserRecord, UserStore};
pub use ticker::Ticker;
