use std::sync::{Arc, Mutex};
use std::time::Duration;

use pump_core::mocks::{NoopIndicator, NoopPump, ScriptedSensor};
use pump_core::store::JsonUserStore;
use pump_core::{Device, InjectionTuning, SensorTuning, Ticker};
use pump_traits::clock::MonotonicClock;

type SimDevice = Device<ScriptedSensor, NoopPump, NoopIndicator>;

fn fast_device(users_path: &std::path::Path) -> SimDevice {
    // Real clock, but a delivery rate fast enough that a 0.5 U dose finishes
    // within a few ticker periods.
    Device::new(
        ScriptedSensor::new(vec![2048]),
        NoopPump::default(),
        NoopIndicator::default(),
        Box::new(JsonUserStore::new(users_path)),
        SensorTuning {
            sample_interval_ms: 0,
            ..SensorTuning::default()
        },
        InjectionTuning {
            rate_cu_per_s: 1000,
        },
        Arc::new(MonotonicClock::new()),
    )
}

#[test]
fn ticker_completes_a_delivery_without_any_request_traffic() {
    let dir = tempfile::tempdir().unwrap();
    let users_path = dir.path().join("users.json");
    let device = Arc::new(Mutex::new(fast_device(&users_path)));

    let token = {
        let mut dev = device.lock().unwrap();
        dev.register("alice", "secret1", "a@example.com", 34, 61.5)
            .unwrap();
        let token = dev.login("alice", "secret1").unwrap();
        dev.start_injection(&token, 0.5).unwrap();
        token
    };

    let ticker = Ticker::spawn(device.clone(), Duration::from_millis(10));
    // 0.5 U at 10 U/s is done in 50ms; give the ticker ample slack.
    std::thread::sleep(Duration::from_millis(400));
    drop(ticker);

    let dev = device.lock().unwrap();
    assert!(!dev.injection_active(), "delivery completed in background");
    assert!(dev.is_authenticated(&token));

    let store = JsonUserStore::new(&users_path);
    let alice = pump_core::UserStore::load(&store, "alice")
        .unwrap()
        .expect("record exists");
    assert_eq!(alice.injection_history.len(), 1);
    assert!((alice.injection_history[0].dose - 0.5).abs() < 1e-6);
}

#[test]
fn dropping_the_ticker_stops_the_thread() {
    let dir = tempfile::tempdir().unwrap();
    let device = Arc::new(Mutex::new(fast_device(&dir.path().join("users.json"))));

    let ticker = Ticker::spawn(device.clone(), Duration::from_millis(5));
    std::thread::sleep(Duration::from_millis(20));
    drop(ticker); // joins; deadlock or panic here fails the test

    // Device is still usable afterwards.
    let mut dev = device.lock().unwrap();
    assert!(dev.glucose_snapshot().is_ok());
}
