//! Dose computation: pure mapping from a glucose value to a recommended
//! insulin dose and risk tier.

use crate::units::{DOSE_STEP_CU, MAX_DOSE_CU, cu_to_units, round_half_up_to_step};

/// Glucose at or below this level needs no insulin (mg/dL).
pub const NO_DOSE_BELOW: i32 = 140;
/// Baseline subtracted before scaling (mg/dL).
const DOSE_BASELINE: i32 = 100;
/// mg/dL per insulin unit in the linear correction law.
const MG_DL_PER_UNIT: i32 = 50;
/// Doses above this tier boundary require verification: 500 cu = 5.0 U.
const VERIFY_ABOVE_CU: i32 = 500;

/// Risk tier attached to a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoseTier {
    None,
    Recommended,
    Verify,
    ConsultDoctor,
}

impl DoseTier {
    /// Human label used in API payloads.
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "no insulin needed",
            Self::Recommended => "dose recommended",
            Self::Verify => "verify before injecting",
            Self::ConsultDoctor => "consult a doctor",
        }
    }
}

/// A derived recommendation; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoseRecommendation {
    /// Recommended dose in centi-units; non-negative multiple of 50,
    /// capped at 1000 (10.0 U).
    pub units_cu: i32,
    pub tier: DoseTier,
}

impl DoseRecommendation {
    pub fn units(&self) -> f32 {
        cu_to_units(self.units_cu)
    }

    fn none() -> Self {
        Self {
            units_cu: 0,
            tier: DoseTier::None,
        }
    }
}

/// Compute the recommended dose for a glucose value (mg/dL).
///
/// `glucose <= 140` needs no insulin. Above that the correction law is
/// `(glucose - 100) / 50` units, rounded **half-up** to the nearest 0.5 U.
/// The rounded dose tiers as: `> 10 U` clamps to 10.0 with `ConsultDoctor`;
/// `(5, 10] U` is `Verify`; `(0, 5] U` is `Recommended`.
pub fn recommend(glucose: i32) -> DoseRecommendation {
    if glucose <= NO_DOSE_BELOW {
        return DoseRecommendation::none();
    }

    // (glucose - 100) / 50 U expressed in centi-units: 2 cu per mg/dL.
    let raw_cu =
        (glucose - DOSE_BASELINE).saturating_mul(crate::units::CU_PER_UNIT / MG_DL_PER_UNIT);

    // Anything that would round past the cap clamps to 10.0 U.
    if raw_cu >= MAX_DOSE_CU + DOSE_STEP_CU / 2 {
        return DoseRecommendation {
            units_cu: MAX_DOSE_CU,
            tier: DoseTier::ConsultDoctor,
        };
    }

    let rounded_cu = round_half_up_to_step(raw_cu.max(0), DOSE_STEP_CU);
    if rounded_cu > VERIFY_ABOVE_CU {
        DoseRecommendation {
            units_cu: rounded_cu,
            tier: DoseTier::Verify,
        }
    } else if rounded_cu > 0 {
        DoseRecommendation {
            units_cu: rounded_cu,
            tier: DoseTier::Recommended,
        }
    } else {
        DoseRecommendation::none()
    }
}
