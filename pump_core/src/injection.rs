//! The injection lifecycle state machine.
//!
//! Owns the sole pump actuator and the in-progress dose. Invariants:
//! the actuator is energized iff the phase is `Active`; the injected dose
//! never exceeds the target; every transition from `Active` to `Idle`
//! yields exactly one [`DoseOutcome`] for the caller to record.

use std::sync::Arc;
use std::time::Instant;

use eyre::WrapErr;
use pump_traits::{Clock, Indicator, Pump};
use serde::Serialize;

use crate::error::{DeviceError, Result};
use crate::units::cu_to_units;

/// Delivery parameters.
#[derive(Debug, Clone)]
pub struct InjectionTuning {
    /// Delivery rate in centi-units per second (10 = 0.1 U/s).
    pub rate_cu_per_s: u32,
}

impl Default for InjectionTuning {
    fn default() -> Self {
        Self { rate_cu_per_s: 10 }
    }
}

impl From<&pump_config::InjectionCfg> for InjectionTuning {
    fn from(c: &pump_config::InjectionCfg) -> Self {
        Self {
            rate_cu_per_s: c.rate_cu_per_s,
        }
    }
}

/// A finished (or manually cut short) delivery, produced exactly once per
/// transition back to idle. The caller turns this into one history record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoseOutcome {
    /// User the record is attributed to: the owner for automatic completion,
    /// the caller for a manual stop.
    pub username: String,
    /// Delivered dose in centi-units.
    pub dose_cu: i32,
    pub duration_ms: u64,
    /// True when the target was reached without a manual stop.
    pub auto: bool,
}

/// Read-only projection of the controller state, in display units.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct InjectionStatus {
    pub active: bool,
    pub target_dose: f32,
    pub injected_dose: f32,
    /// Percentage of the target delivered (0 when no target).
    pub progress: f32,
    pub remaining: f32,
}

#[derive(Debug)]
struct ActiveDose {
    target_cu: i32,
    injected_cu: i32,
    started_ms: u64,
    owner: String,
}

#[derive(Debug)]
enum Phase {
    Idle,
    Active(ActiveDose),
}

/// State machine owning the pump actuator and indicator light.
pub struct InjectionController<P: Pump, L: Indicator> {
    pump: P,
    indicator: L,
    tuning: InjectionTuning,
    clock: Arc<dyn Clock + Send + Sync>,
    epoch: Instant,
    phase: Phase,
}

impl<P: Pump, L: Indicator> core::fmt::Debug for InjectionController<P, L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InjectionController")
            .field("phase", &self.phase)
            .finish()
    }
}

impl<P: Pump, L: Indicator> InjectionController<P, L> {
    pub fn new(
        pump: P,
        indicator: L,
        tuning: InjectionTuning,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        let epoch = clock.now();
        Self {
            pump,
            indicator,
            tuning,
            clock,
            epoch,
            phase: Phase::Idle,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Active(_))
    }

    /// Begin a delivery. Valid only from `Idle` with a positive dose.
    pub fn start(&mut self, dose_cu: i32, username: &str) -> Result<()> {
        if self.is_active() {
            return Err(eyre::Report::new(DeviceError::State(
                "injection in progress".into(),
            )));
        }
        if dose_cu <= 0 {
            return Err(eyre::Report::new(DeviceError::Validation(
                "invalid dose".into(),
            )));
        }

        self.pump
            .energize()
            .map_err(|e| eyre::Report::new(DeviceError::Hardware(e.to_string())))
            .wrap_err("energizing pump")?;
        if let Err(e) = self.indicator.set(true) {
            tracing::warn!(error = %e, "indicator on failed");
        }

        let started_ms = self.clock.ms_since(self.epoch);
        self.phase = Phase::Active(ActiveDose {
            target_cu: dose_cu,
            injected_cu: 0,
            started_ms,
            owner: username.to_string(),
        });
        tracing::info!(dose_u = cu_to_units(dose_cu), username, "injection start");
        Ok(())
    }

    /// Advance the delivery to `now`. No-op when idle.
    ///
    /// Returns the completion outcome once the target is reached; the
    /// outcome is attributed to the owner captured at `start()`.
    pub fn tick(&mut self) -> Result<Option<DoseOutcome>> {
        let now = self.clock.ms_since(self.epoch);
        let (done, elapsed_ms) = match &mut self.phase {
            Phase::Idle => return Ok(None),
            Phase::Active(active) => {
                let elapsed_ms = now.saturating_sub(active.started_ms);
                active.injected_cu =
                    delivered_cu(elapsed_ms, self.tuning.rate_cu_per_s, active.target_cu);
                (active.injected_cu >= active.target_cu, elapsed_ms)
            }
        };
        if !done {
            return Ok(None);
        }

        // Leave the actuator energized and the phase Active if the relay
        // refuses to release; the next tick retries.
        self.pump
            .deenergize()
            .map_err(|e| eyre::Report::new(DeviceError::Hardware(e.to_string())))
            .wrap_err("de-energizing pump")?;
        if let Err(e) = self.indicator.set(false) {
            tracing::warn!(error = %e, "indicator off failed");
        }

        let Phase::Active(active) = std::mem::replace(&mut self.phase, Phase::Idle) else {
            unreachable!("tick completion requires an active phase");
        };
        let outcome = DoseOutcome {
            username: active.owner,
            dose_cu: active.injected_cu,
            duration_ms: elapsed_ms,
            auto: true,
        };
        tracing::info!(
            dose_u = cu_to_units(outcome.dose_cu),
            duration_ms = outcome.duration_ms,
            username = %outcome.username,
            "injection complete"
        );
        Ok(Some(outcome))
    }

    /// Manually stop an in-progress delivery. Valid only from `Active`.
    ///
    /// The outcome is attributed to the *caller*, who need not be the owner;
    /// any authenticated user may stop the pump.
    pub fn stop(&mut self, username: &str) -> Result<DoseOutcome> {
        let now = self.clock.ms_since(self.epoch);
        let Phase::Active(active) = &mut self.phase else {
            return Err(eyre::Report::new(DeviceError::State(
                "no injection in progress".into(),
            )));
        };
        let elapsed_ms = now.saturating_sub(active.started_ms);
        active.injected_cu = delivered_cu(elapsed_ms, self.tuning.rate_cu_per_s, active.target_cu);

        self.pump
            .deenergize()
            .map_err(|e| eyre::Report::new(DeviceError::Hardware(e.to_string())))
            .wrap_err("de-energizing pump")?;
        if let Err(e) = self.indicator.set(false) {
            tracing::warn!(error = %e, "indicator off failed");
        }

        let Phase::Active(active) = std::mem::replace(&mut self.phase, Phase::Idle) else {
            unreachable!("stop requires an active phase");
        };
        let outcome = DoseOutcome {
            username: username.to_string(),
            dose_cu: active.injected_cu,
            duration_ms: elapsed_ms,
            auto: false,
        };
        tracing::info!(
            dose_u = cu_to_units(outcome.dose_cu),
            duration_ms = outcome.duration_ms,
            username,
            "injection stopped"
        );
        Ok(outcome)
    }

    /// Shutdown path: de-energize unconditionally (best-effort) and return
    /// the partial outcome if a delivery was in progress.
    pub fn force_stop(&mut self) -> Option<DoseOutcome> {
        let now = self.clock.ms_since(self.epoch);
        if let Err(e) = self.pump.deenergize() {
            tracing::warn!(error = %e, "pump de-energize failed on force stop");
        }
        if let Err(e) = self.indicator.set(false) {
            tracing::warn!(error = %e, "indicator off failed on force stop");
        }
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => None,
            Phase::Active(active) => {
                let elapsed_ms = now.saturating_sub(active.started_ms);
                let dose_cu =
                    delivered_cu(elapsed_ms, self.tuning.rate_cu_per_s, active.target_cu);
                tracing::warn!(
                    dose_u = cu_to_units(dose_cu),
                    username = %active.owner,
                    "injection force-stopped"
                );
                Some(DoseOutcome {
                    username: active.owner,
                    dose_cu,
                    duration_ms: elapsed_ms,
                    auto: false,
                })
            }
        }
    }

    /// Read-only status projection.
    pub fn status(&self) -> InjectionStatus {
        match &self.phase {
            Phase::Idle => InjectionStatus {
                active: false,
                target_dose: 0.0,
                injected_dose: 0.0,
                progress: 0.0,
                remaining: 0.0,
            },
            Phase::Active(a) => {
                let progress = if a.target_cu > 0 {
                    (a.injected_cu as f32) / (a.target_cu as f32) * 100.0
                } else {
                    0.0
                };
                InjectionStatus {
                    active: true,
                    target_dose: cu_to_units(a.target_cu),
                    injected_dose: cu_to_units(a.injected_cu),
                    progress,
                    remaining: cu_to_units(a.target_cu - a.injected_cu),
                }
            }
        }
    }
}

/// Dose delivered after `elapsed_ms` at `rate_cu_per_s`, capped at the target.
#[inline]
fn delivered_cu(elapsed_ms: u64, rate_cu_per_s: u32, target_cu: i32) -> i32 {
    let cu = elapsed_ms.saturating_mul(u64::from(rate_cu_per_s)) / 1000;
    let cu = cu.min(i32::MAX as u64) as i32;
    cu.min(target_cu)
}
