use std::collections::BTreeMap;

use serde::Serialize;
use shared::domain::{SensorReading, CROP_TYPE, HUMIDITY, RAINFALL, SOIL_TYPE};

pub const DEFAULT_HUMIDITY: f64 = 65.0;
pub const DEFAULT_RAINFALL: f64 = 75.0;
pub const DEFAULT_SOIL_TYPE: &str = "Loamy";

/// Values injected at submission time for fields the reading lacks.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionDefaults {
    pub humidity: f64,
    pub rainfall: f64,
    pub soil_type: String,
}

impl Default for SubmissionDefaults {
    fn default() -> Self {
        Self {
            humidity: DEFAULT_HUMIDITY,
            rainfall: DEFAULT_RAINFALL,
            soil_type: DEFAULT_SOIL_TYPE.to_string(),
        }
    }
}

/// User-entered values from the soil and environment forms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionExtras {
    pub crop_type: Option<String>,
    pub soil_type: Option<String>,
    pub humidity: Option<f64>,
    pub rainfall: Option<f64>,
}

/// Form fields sent to the prediction service, keyed exactly as transmitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CropInputs {
    fields: BTreeMap<String, String>,
}

impl CropInputs {
    pub fn build(
        reading: &SensorReading,
        extras: &SubmissionExtras,
        defaults: &SubmissionDefaults,
    ) -> Self {
        let mut fields: BTreeMap<String, String> = reading
            .values
            .iter()
            .map(|(key, value)| (key.clone(), value.to_form_value()))
            .collect();

        let explicit = [
            (HUMIDITY, extras.humidity.map(|v| v.to_string())),
            (RAINFALL, extras.rainfall.map(|v| v.to_string())),
            (SOIL_TYPE, non_blank(extras.soil_type.as_deref())),
            (CROP_TYPE, non_blank(extras.crop_type.as_deref())),
        ];
        for (key, value) in explicit {
            if let Some(value) = value {
                fields.insert(key.to_string(), value);
            }
        }

        fields
            .entry(HUMIDITY.to_string())
            .or_insert_with(|| defaults.humidity.to_string());
        fields
            .entry(RAINFALL.to_string())
            .or_insert_with(|| defaults.rainfall.to_string());
        fields
            .entry(SOIL_TYPE.to_string())
            .or_insert_with(|| defaults.soil_type.clone());

        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
#[path = "tests/inputs_tests.rs"]
mod tests;
