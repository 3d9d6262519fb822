//! Plausibility rules for soil readings.
//!
//! Every check here is pure: the same reading under the same policy always
//! classifies the same way, and nothing is touched on the way.

use shared::domain::{SensorReading, MOISTURE, NITROGEN, PH, PHOSPHORUS, POTASSIUM};

/// Readings below this value are treated as "not in soil".
pub const LOW_READING_THRESHOLD: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationPolicy {
    pub low_reading_threshold: f64,
    /// Parameters that decide whether the probe is in soil at all.
    pub essential: Vec<String>,
    /// Parameters that must be usable before a reading is submitted.
    pub required: Vec<String>,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            low_reading_threshold: LOW_READING_THRESHOLD,
            essential: [NITROGEN, PHOSPHORUS, POTASSIUM, MOISTURE]
                .map(String::from)
                .to_vec(),
            required: [NITROGEN, PHOSPHORUS, POTASSIUM, PH, MOISTURE]
                .map(String::from)
                .to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadingClass {
    Ok,
    Mock,
    /// All essential parameters failed; carries their names.
    TooLow(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitCheck {
    Ok,
    Invalid(Vec<String>),
}

impl ValidationPolicy {
    /// Absent, unparseable and below-threshold values all fail.
    pub fn passes(&self, reading: &SensorReading, param: &str) -> bool {
        reading
            .numeric(param)
            .is_some_and(|value| value >= self.low_reading_threshold)
    }

    fn failing(&self, reading: &SensorReading, params: &[String]) -> Vec<String> {
        params
            .iter()
            .filter(|param| !self.passes(reading, param))
            .cloned()
            .collect()
    }

    pub fn classify_reading(&self, reading: &SensorReading) -> ReadingClass {
        if reading.is_mock() {
            return ReadingClass::Mock;
        }
        let failing = self.failing(reading, &self.essential);
        if !self.essential.is_empty() && failing.len() == self.essential.len() {
            ReadingClass::TooLow(failing)
        } else {
            ReadingClass::Ok
        }
    }

    pub fn classify_before_submit(&self, reading: &SensorReading) -> SubmitCheck {
        let failing = self.failing(reading, &self.required);
        if failing.is_empty() {
            SubmitCheck::Ok
        } else {
            SubmitCheck::Invalid(failing)
        }
    }
}

pub fn classify_reading(reading: &SensorReading) -> ReadingClass {
    ValidationPolicy::default().classify_reading(reading)
}

pub fn classify_before_submit(reading: &SensorReading) -> SubmitCheck {
    ValidationPolicy::default().classify_before_submit(reading)
}

pub fn describe_invalid(params: &[String]) -> String {
    let verb = if params.len() == 1 { "is" } else { "are" };
    format!(
        "Invalid sensor readings detected: {} {verb} too low or missing. Please ensure the sensor is properly inserted in soil.",
        params.join(", ")
    )
}

#[cfg(test)]
#[path = "tests/validator_tests.rs"]
mod tests;
