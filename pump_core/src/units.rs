//! Fixed-point dose units and rounding helpers.
//!
//! All dose arithmetic uses **centi-units** (cu, 1 cu = 0.01 U) in `i32` for
//! deterministic behavior; floating point only appears at the API surface.

/// Centi-units per insulin unit.
pub const CU_PER_UNIT: i32 = 100;
/// Dose granularity: 50 cu = 0.5 U.
pub const DOSE_STEP_CU: i32 = 50;
/// Hard cap on any recommended dose: 1000 cu = 10.0 U.
pub const MAX_DOSE_CU: i32 = 1000;

/// Convert centi-units to display units.
#[inline]
pub fn cu_to_units(cu: i32) -> f32 {
    (cu as f32) / (CU_PER_UNIT as f32)
}

/// Quantize a floating-point unit value to integer centi-units, rounding to
/// nearest and clamping to the i32 range. Non-finite values (NaN/±Inf) map to 0.
#[inline]
pub fn units_to_cu(units: f32) -> i32 {
    if !units.is_finite() {
        return 0;
    }
    let scaled = (units * CU_PER_UNIT as f32).round();
    if scaled >= i32::MAX as f32 {
        i32::MAX
    } else if scaled <= i32::MIN as f32 {
        i32::MIN
    } else {
        scaled as i32
    }
}

/// Round a non-negative value to the nearest multiple of ten (half rounds up).
#[inline]
pub fn round_to_nearest_ten(v: i32) -> i32 {
    debug_assert!(v >= 0, "round_to_nearest_ten expects non-negative input");
    ((v + 5) / 10) * 10
}

/// Round a non-negative value to the nearest multiple of `step`, half-up.
/// Half-up (not banker's) rounding is the documented policy for dose steps.
#[inline]
pub fn round_half_up_to_step(v: i32, step: i32) -> i32 {
    debug_assert!(step > 0, "step must be positive");
    debug_assert!(v >= 0, "round_half_up_to_step expects non-negative input");
    ((v + step / 2) / step) * step
}

#[cfg(test)]
mod rounding_tests {
    use super::*;

    #[test]
    fn nearest_ten_boundaries() {
        assert_eq!(round_to_nearest_ten(204), 200);
        assert_eq!(round_to_nearest_ten(205), 210);
        assert_eq!(round_to_nearest_ten(210), 210);
        assert_eq!(round_to_nearest_ten(0), 0);
    }

    #[test]
    fn half_up_to_dose_step() {
        // 1.8 U -> 2.0 U, 0.82 U -> 1.0 U, exact half rounds up
        assert_eq!(round_half_up_to_step(180, DOSE_STEP_CU), 200);
        assert_eq!(round_half_up_to_step(82, DOSE_STEP_CU), 100);
        assert_eq!(round_half_up_to_step(75, DOSE_STEP_CU), 100);
        assert_eq!(round_half_up_to_step(74, DOSE_STEP_CU), 50);
    }

    #[test]
    fn unit_conversions_clamp_and_reject_non_finite() {
        assert_eq!(units_to_cu(2.0), 200);
        assert_eq!(units_to_cu(0.5), 50);
        assert_eq!(units_to_cu(f32::NAN), 0);
        assert_eq!(units_to_cu(f32::INFINITY), 0);
        assert!((cu_to_units(250) - 2.5).abs() < f32::EPSILON);
    }
}
