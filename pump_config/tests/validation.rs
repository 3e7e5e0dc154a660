use pump_config::load_toml;
use rstest::rstest;

#[test]
fn empty_document_uses_defaults_and_validates() {
    let cfg = load_toml("").expect("defaults parse");
    cfg.validate().expect("defaults are valid");
    assert_eq!(cfg.sensor.full_scale, 4095);
    assert_eq!(cfg.sensor.sample_count, 10);
    assert_eq!(cfg.injection.rate_cu_per_s, 10);
    assert_eq!(cfg.server.port, 8080);
}

#[test]
fn full_document_round_trips() {
    let toml = r#"
[server]
bind = "127.0.0.1"
port = 9000

[sensor]
full_scale = 1023
sample_count = 4
sample_interval_ms = 2
stability_threshold = 10

[injection]
rate_cu_per_s = 20
tick_ms = 100

[storage]
users_file = "/var/lib/pump/users.json"

[logging]
level = "debug"
"#;
    let cfg = load_toml(toml).expect("parse");
    cfg.validate().expect("valid");
    assert_eq!(cfg.server.bind, "127.0.0.1");
    assert_eq!(cfg.sensor.full_scale, 1023);
    assert_eq!(cfg.injection.tick_ms, 100);
    assert_eq!(cfg.storage.users_file, "/var/lib/pump/users.json");
    assert_eq!(cfg.logging.level.as_deref(), Some("debug"));
}

#[rstest]
#[case("[sensor]\nfull_scale = 0", "full_scale")]
#[case("[sensor]\nsample_count = 0", "sample_count")]
#[case("[sensor]\nstability_threshold = -1", "stability_threshold")]
#[case("[sensor]\nstability_threshold = 500", "stability_threshold")]
#[case("[injection]\nrate_cu_per_s = 0", "rate_cu_per_s")]
#[case("[injection]\ntick_ms = 0", "tick_ms")]
#[case("[storage]\nusers_file = \"\"", "users_file")]
fn out_of_range_values_are_rejected(#[case] doc: &str, #[case] needle: &str) {
    let cfg = load_toml(doc).expect("parse");
    let err = cfg.validate().expect_err("should fail validation");
    assert!(
        err.to_string().contains(needle),
        "error `{err}` should mention `{needle}`"
    );
}

#[test]
fn unknown_sections_are_ignored() {
    // Forward compatibility: extra tables do not fail the parse.
    let cfg = load_toml("[future]\nx = 1").expect("parse");
    cfg.validate().expect("valid");
}
