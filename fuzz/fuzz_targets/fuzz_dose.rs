#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|glucose: i32| {
    // The recommendation must hold its contract for any integer input:
    // half-unit multiples, capped at 10.0 U, never panicking.
    let rec = pump_core::recommend(glucose);
    assert!(rec.units_cu >= 0);
    assert!(rec.units_cu <= 1000);
    assert_eq!(rec.units_cu % 50, 0);
});
