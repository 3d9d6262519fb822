use std::{fs, path::Path, time::Duration};

use anyhow::{anyhow, Context};
use url::Url;

use crate::{inputs::SubmissionDefaults, validator::ValidationPolicy};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const SETTINGS_FILE: &str = "agro.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub base_url: String,
    pub request_timeout: Duration,
    pub policy: ValidationPolicy,
    pub defaults: SubmissionDefaults,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            policy: ValidationPolicy::default(),
            defaults: SubmissionDefaults::default(),
        }
    }
}

/// Defaults, then `agro.toml` in the working directory, then environment.
pub fn load_settings() -> PipelineSettings {
    let mut settings = PipelineSettings::default();
    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

pub fn load_settings_from(path: &Path) -> anyhow::Result<PipelineSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    let mut settings = PipelineSettings::default();
    apply_file(&mut settings, &raw);
    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut PipelineSettings, raw: &str) {
    let Ok(table) = toml::from_str::<toml::Table>(raw) else {
        return;
    };
    let lookup = |key: &str| {
        table.get(key).map(|value| match value {
            toml::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    };
    apply_overrides(settings, &lookup, FILE_KEYS);
}

/// Applies environment overrides; both the `AGRO_` and `APP__` spellings are
/// honoured, the latter winning.
pub fn apply_env(settings: &mut PipelineSettings, lookup: impl Fn(&str) -> Option<String>) {
    apply_overrides(settings, &lookup, AGRO_ENV_KEYS);
    apply_overrides(settings, &lookup, APP_ENV_KEYS);
}

struct Keys {
    base_url: &'static str,
    timeout_secs: &'static str,
    threshold: &'static str,
    humidity: &'static str,
    rainfall: &'static str,
    soil_type: &'static str,
}

const FILE_KEYS: Keys = Keys {
    base_url: "base_url",
    timeout_secs: "timeout_secs",
    threshold: "low_reading_threshold",
    humidity: "default_humidity",
    rainfall: "default_rainfall",
    soil_type: "default_soil_type",
};

const AGRO_ENV_KEYS: Keys = Keys {
    base_url: "AGRO_BASE_URL",
    timeout_secs: "AGRO_TIMEOUT_SECS",
    threshold: "AGRO_LOW_READING_THRESHOLD",
    humidity: "AGRO_DEFAULT_HUMIDITY",
    rainfall: "AGRO_DEFAULT_RAINFALL",
    soil_type: "AGRO_DEFAULT_SOIL_TYPE",
};

const APP_ENV_KEYS: Keys = Keys {
    base_url: "APP__BASE_URL",
    timeout_secs: "APP__TIMEOUT_SECS",
    threshold: "APP__LOW_READING_THRESHOLD",
    humidity: "APP__DEFAULT_HUMIDITY",
    rainfall: "APP__DEFAULT_RAINFALL",
    soil_type: "APP__DEFAULT_SOIL_TYPE",
};

fn apply_overrides(
    settings: &mut PipelineSettings,
    lookup: &impl Fn(&str) -> Option<String>,
    keys: Keys,
) {
    if let Some(v) = lookup(keys.base_url) {
        settings.base_url = v;
    }
    if let Some(timeout) = parse_f64(lookup(keys.timeout_secs)).and_then(timeout_from_secs) {
        settings.request_timeout = timeout;
    }
    if let Some(v) = parse_f64(lookup(keys.threshold)) {
        settings.policy.low_reading_threshold = v;
    }
    if let Some(v) = parse_f64(lookup(keys.humidity)) {
        settings.defaults.humidity = v;
    }
    if let Some(v) = parse_f64(lookup(keys.rainfall)) {
        settings.defaults.rainfall = v;
    }
    if let Some(v) = lookup(keys.soil_type) {
        if !v.trim().is_empty() {
            settings.defaults.soil_type = v.trim().to_string();
        }
    }
}

fn parse_f64(raw: Option<String>) -> Option<f64> {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Positive, finite seconds that fit in a [`Duration`].
pub fn timeout_from_secs(secs: f64) -> Option<Duration> {
    if secs <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(secs).ok()
}

/// Validates the collaborator base URL and strips trailing slashes.
pub fn normalize_base_url(raw: &str) -> anyhow::Result<String> {
    let raw = raw.trim();
    let raw = if raw.is_empty() { DEFAULT_BASE_URL } else { raw };
    let url = Url::parse(raw).with_context(|| format!("invalid base url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(anyhow!(
            "base url '{raw}' must use http or https, got '{}'",
            url.scheme()
        ));
    }
    if url.host_str().is_none() {
        return Err(anyhow!("base url '{raw}' has no host"));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
