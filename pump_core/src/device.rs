//! The owned device aggregate.
//!
//! `Device` holds the sensor filter, the injection controller, the session
//! store and the user store; there is no ambient global state. All mutation
//! of the shared actuator flows through this one aggregate, which callers
//! wrap in a single `Arc<Mutex<_>>` boundary.

use std::sync::Arc;

use pump_traits::{Clock, GlucoseSensor, Indicator, Pump};
use serde::Serialize;

use crate::dose::{self, DoseRecommendation};
use crate::error::{DeviceError, Result};
use crate::injection::{DoseOutcome, InjectionController, InjectionStatus, InjectionTuning};
use crate::sensor::{GlucoseBand, SensorFilter, SensorTuning};
use crate::session::SessionStore;
use crate::store::{HistoryEntry, UserRecord, UserStore, unix_now};
use crate::units::{cu_to_units, units_to_cu};

/// Combined poll payload for the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct GlucoseSnapshot {
    pub glucose: i32,
    pub status: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
    pub insulin_dose: f32,
    pub insulin_recommendation: &'static str,
    pub injection_status: InjectionStatus,
}

pub struct Device<S: GlucoseSensor, P: Pump, L: Indicator> {
    filter: SensorFilter<S>,
    controller: InjectionController<P, L>,
    sessions: SessionStore,
    users: Box<dyn UserStore>,
}

impl<S: GlucoseSensor, P: Pump, L: Indicator> Device<S, P, L> {
    pub fn new(
        sensor: S,
        pump: P,
        indicator: L,
        users: Box<dyn UserStore>,
        sensor_tuning: SensorTuning,
        injection_tuning: InjectionTuning,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            filter: SensorFilter::new(sensor, sensor_tuning, clock.clone()),
            controller: InjectionController::new(pump, indicator, injection_tuning, clock),
            sessions: SessionStore::new(),
            users,
        }
    }

    // ── Accounts and sessions ────────────────────────────────────────────

    /// Create an account. The username must be free; age and weight arrive
    /// already parsed (the dispatch layer rejects non-numeric input).
    pub fn register(
        &mut self,
        username: &str,
        password: &str,
        email: &str,
        age: u32,
        weight: f32,
    ) -> Result<()> {
        if username.is_empty() || password.is_empty() {
            return Err(eyre::Report::new(DeviceError::Validation(
                "username and password required".into(),
            )));
        }
        self.users.create(UserRecord {
            username: username.to_string(),
            password: crate::password::hash(password),
            email: email.to_string(),
            age,
            weight,
            created_at: unix_now(),
            injection_history: Vec::new(),
        })
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<String> {
        self.sessions.login(&*self.users, username, password)
    }

    pub fn logout(&mut self, token: &str) -> Result<()> {
        self.sessions.logout(token)
    }

    pub fn is_authenticated(&self, token: &str) -> bool {
        self.sessions.is_authenticated(token)
    }

    /// Resolve a token to its username, or fail with an auth error.
    pub fn authenticate(&self, token: &str) -> Result<String> {
        self.sessions
            .current_user(token)
            .map(str::to_string)
            .ok_or_else(|| eyre::Report::new(DeviceError::Auth("not authenticated".into())))
    }

    // ── Readings and recommendations ─────────────────────────────────────

    /// One stabilized reading plus derived dose and injection status.
    pub fn glucose_snapshot(&mut self) -> Result<GlucoseSnapshot> {
        let reading = self.filter.read()?;
        let band = GlucoseBand::of(reading.value);
        let rec: DoseRecommendation = dose::recommend(reading.value);
        Ok(GlucoseSnapshot {
            glucose: reading.value,
            status: band.label(),
            color: band.color(),
            icon: band.icon(),
            insulin_dose: rec.units(),
            insulin_recommendation: rec.tier.label(),
            injection_status: self.controller.status(),
        })
    }

    // ── Injection lifecycle ──────────────────────────────────────────────

    pub fn start_injection(&mut self, token: &str, dose_units: f32) -> Result<()> {
        let username = self.authenticate(token)?;
        self.controller.start(units_to_cu(dose_units), &username)
    }

    pub fn stop_injection(&mut self, token: &str) -> Result<()> {
        let username = self.authenticate(token)?;
        let outcome = self.controller.stop(&username)?;
        self.record_outcome(outcome)
    }

    /// Advance an in-progress delivery; invoked by the background ticker,
    /// never by the request path.
    pub fn tick(&mut self) -> Result<()> {
        if let Some(outcome) = self.controller.tick()? {
            self.record_outcome(outcome)?;
        }
        Ok(())
    }

    /// Shutdown path: de-energize the actuator no matter what and record a
    /// partial dose if one was in flight.
    pub fn force_stop(&mut self) {
        if let Some(outcome) = self.controller.force_stop() {
            if let Err(e) = self.record_outcome(outcome) {
                tracing::error!(error = %e, "failed to record force-stopped dose");
            }
        }
    }

    pub fn injection_status(&self) -> InjectionStatus {
        self.controller.status()
    }

    pub fn injection_active(&self) -> bool {
        self.controller.is_active()
    }

    /// Exactly one history record per transition out of `Active`.
    fn record_outcome(&mut self, outcome: DoseOutcome) -> Result<()> {
        let glucose = self.filter.read()?.value;
        self.users.append_history(
            &outcome.username,
            HistoryEntry {
                timestamp: unix_now(),
                glucose,
                dose: cu_to_units(outcome.dose_cu),
                duration: (outcome.duration_ms as f32) / 1000.0,
            },
        )
    }
}
