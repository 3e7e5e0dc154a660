//! HTTP frontend for the pump device.
//!
//! The router exposes the login/dashboard pages and the JSON API; all state
//! mutation goes through the shared `Device` aggregate behind one mutex.

pub mod cli;
pub mod pages;
pub mod routes;

pub use routes::{AppState, DynDevice, router};
