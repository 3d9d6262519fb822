use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_match_observed_domain_constants() {
    let settings = PipelineSettings::default();
    assert_eq!(settings.base_url, "http://localhost:5000");
    assert_eq!(settings.request_timeout, Duration::from_secs(10));
    assert_eq!(settings.policy.low_reading_threshold, 2.0);
    assert_eq!(settings.defaults.humidity, 65.0);
    assert_eq!(settings.defaults.rainfall, 75.0);
    assert_eq!(settings.defaults.soil_type, "Loamy");
}

#[test]
fn file_values_accept_strings_and_numbers() {
    let mut settings = PipelineSettings::default();
    apply_file(
        &mut settings,
        r#"
base_url = "http://192.168.1.20:5000"
timeout_secs = 4
low_reading_threshold = "1.5"
default_soil_type = "Clayey"
"#,
    );

    assert_eq!(settings.base_url, "http://192.168.1.20:5000");
    assert_eq!(settings.request_timeout, Duration::from_secs(4));
    assert_eq!(settings.policy.low_reading_threshold, 1.5);
    assert_eq!(settings.defaults.soil_type, "Clayey");
    assert_eq!(settings.defaults.humidity, 65.0);
}

#[test]
fn unparseable_file_is_ignored() {
    let mut settings = PipelineSettings::default();
    apply_file(&mut settings, "this is = = not toml");
    assert_eq!(settings, PipelineSettings::default());
}

#[test]
fn app_prefixed_env_wins_over_agro_prefix() {
    let mut settings = PipelineSettings::default();
    apply_env(
        &mut settings,
        lookup_from(&[
            ("AGRO_BASE_URL", "http://agro.local:5000"),
            ("APP__BASE_URL", "http://app.local:5000"),
            ("AGRO_DEFAULT_HUMIDITY", "70"),
            ("AGRO_DEFAULT_RAINFALL", "90.5"),
        ]),
    );

    assert_eq!(settings.base_url, "http://app.local:5000");
    assert_eq!(settings.defaults.humidity, 70.0);
    assert_eq!(settings.defaults.rainfall, 90.5);
}

#[test]
fn malformed_numeric_overrides_keep_previous_values() {
    let mut settings = PipelineSettings::default();
    apply_env(
        &mut settings,
        lookup_from(&[
            ("AGRO_TIMEOUT_SECS", "soon"),
            ("AGRO_LOW_READING_THRESHOLD", "NaN"),
            ("AGRO_DEFAULT_HUMIDITY", ""),
            ("AGRO_DEFAULT_SOIL_TYPE", "  "),
            ("APP__TIMEOUT_SECS", "-3"),
        ]),
    );
    assert_eq!(settings, PipelineSettings::default());
}

#[test]
fn normalizes_base_url() {
    assert_eq!(
        normalize_base_url("http://192.168.0.12:5000/").expect("url"),
        "http://192.168.0.12:5000"
    );
    assert_eq!(
        normalize_base_url("  ").expect("default"),
        "http://localhost:5000"
    );
    assert_eq!(
        normalize_base_url("https://agro.example.com/api/").expect("url"),
        "https://agro.example.com/api"
    );
}

#[test]
fn rejects_unusable_base_urls() {
    assert!(normalize_base_url("localhost:5000").is_err());
    assert!(normalize_base_url("ftp://agro.example.com").is_err());
    assert!(normalize_base_url("not a url").is_err());
}

#[test]
fn oversized_timeout_keeps_previous_value() {
    let mut settings = PipelineSettings::default();
    apply_env(
        &mut settings,
        lookup_from(&[("AGRO_TIMEOUT_SECS", "1e30"), ("APP__TIMEOUT_SECS", "inf")]),
    );
    assert_eq!(settings.request_timeout, DEFAULT_REQUEST_TIMEOUT);

    apply_file(&mut settings, "timeout_secs = 1e300");
    assert_eq!(settings.request_timeout, DEFAULT_REQUEST_TIMEOUT);
}

#[test]
fn timeout_from_secs_accepts_only_representable_positive_values() {
    assert_eq!(timeout_from_secs(2.5), Some(Duration::from_millis(2500)));
    assert_eq!(timeout_from_secs(0.0), None);
    assert_eq!(timeout_from_secs(-1.0), None);
    assert_eq!(timeout_from_secs(f64::NAN), None);
    assert_eq!(timeout_from_secs(1e30), None);
}
