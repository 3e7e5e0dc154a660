use pump_core::dose::{DoseTier, recommend};
use rstest::rstest;

#[rstest]
// At or below 140 mg/dL nothing is recommended.
#[case(70, 0.0, DoseTier::None)]
#[case(100, 0.0, DoseTier::None)]
#[case(140, 0.0, DoseTier::None)]
// Just above the threshold: (141-100)/50 = 0.82 -> 1.0 U
#[case(141, 1.0, DoseTier::Recommended)]
// (190-100)/50 = 1.8 -> 2.0 U
#[case(190, 2.0, DoseTier::Recommended)]
// Exactly 5.0 U still sits in the recommended tier.
#[case(350, 5.0, DoseTier::Recommended)]
// 5.5 U crosses into verify.
#[case(375, 5.5, DoseTier::Verify)]
// Exactly 10.0 U is still verify, not consult.
#[case(600, 10.0, DoseTier::Verify)]
// 10.02 U rounds back down to 10.0 -> verify.
#[case(601, 10.0, DoseTier::Verify)]
// (700-100)/50 = 12.0 -> clamped to the cap.
#[case(700, 10.0, DoseTier::ConsultDoctor)]
#[case(1000, 10.0, DoseTier::ConsultDoctor)]
fn recommendation_table(#[case] glucose: i32, #[case] units: f32, #[case] tier: DoseTier) {
    let rec = recommend(glucose);
    assert_eq!(rec.tier, tier, "tier for glucose {glucose}");
    assert!(
        (rec.units() - units).abs() < 1e-6,
        "glucose {glucose}: expected {units} U, got {} U",
        rec.units()
    );
}

#[test]
fn doses_are_half_unit_multiples_and_capped() {
    for glucose in 0..=1200 {
        let rec = recommend(glucose);
        assert_eq!(rec.units_cu % 50, 0, "glucose {glucose}");
        assert!((0..=1000).contains(&rec.units_cu), "glucose {glucose}");
        if glucose <= 140 {
            assert_eq!(rec.tier, DoseTier::None);
            assert_eq!(rec.units_cu, 0);
        } else {
            assert!(rec.units_cu > 0, "glucose {glucose} must dose");
        }
    }
}

#[test]
fn rounds_to_the_nearest_half_unit() {
    // (163-100)/50 = 1.26 -> 1.5 U; (162-100)/50 = 1.24 -> 1.0 U
    assert!((recommend(163).units() - 1.5).abs() < 1e-6);
    assert!((recommend(162).units() - 1.0).abs() < 1e-6);
}

#[test]
fn tier_labels_are_stable() {
    assert_eq!(DoseTier::None.label(), "no insulin needed");
    assert_eq!(DoseTier::Recommended.label(), "dose recommended");
    assert_eq!(DoseTier::Verify.label(), "verify before injecting");
    assert_eq!(DoseTier::ConsultDoctor.label(), "consult a doctor");
}
