//! Submission body for `POST /workflow`.
//!
//! The engine accepts a batch of sensor readings and part measurements
//! plus free-form metadata. Every section defaults to empty so operators
//! can submit partial batches.

use serde::{Deserialize, Serialize};

use crate::error::SubmissionError;

/// Maximum length of any identifier field (`sensor_id`, `part_id`, ...).
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Time series from a single line sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub sensor_id: String,
    pub values: Vec<f64>,
    /// Fields the dashboard does not interpret (`unit`, ...), sent as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Repeated measurements of one dimension of a part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub part_id: String,
    pub dimension: String,
    pub values: Vec<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A batch submitted for analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowInput {
    #[serde(default)]
    pub sensor_readings: Vec<SensorReading>,
    #[serde(default)]
    pub measurements: Vec<Measurement>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl WorkflowInput {
    /// Parse operator-provided JSON text and validate it.
    pub fn parse(text: &str) -> Result<Self, SubmissionError> {
        let input: Self = serde_json::from_str(text)
            .map_err(|e| SubmissionError::InvalidInput(format!("Malformed JSON: {e}")))?;
        input.validate().map_err(SubmissionError::InvalidInput)?;
        Ok(input)
    }

    /// Check identifier fields and reading values.
    pub fn validate(&self) -> Result<(), String> {
        for (i, reading) in self.sensor_readings.iter().enumerate() {
            validate_identifier(&reading.sensor_id)
                .map_err(|e| format!("sensor_readings[{i}].sensor_id: {e}"))?;
            validate_values(&reading.values)
                .map_err(|e| format!("sensor_readings[{i}].values: {e}"))?;
        }
        for (i, m) in self.measurements.iter().enumerate() {
            validate_identifier(&m.part_id)
                .map_err(|e| format!("measurements[{i}].part_id: {e}"))?;
            validate_identifier(&m.dimension)
                .map_err(|e| format!("measurements[{i}].dimension: {e}"))?;
            validate_values(&m.values).map_err(|e| format!("measurements[{i}].values: {e}"))?;
        }
        Ok(())
    }

    /// The batch id from metadata, if one was given as a string.
    pub fn batch_id(&self) -> Option<&str> {
        self.metadata.get("batch_id").and_then(|v| v.as_str())
    }

    /// Demo batch pre-filled in the submit panel: one sensor with a spike,
    /// one stable sensor and a single part measurement.
    pub fn sample() -> Self {
        let mut metadata = serde_json::Map::new();
        metadata.insert("batch_id".into(), "B-2026-001".into());
        metadata.insert("line".into(), "assembly_3".into());

        Self {
            sensor_readings: vec![
                SensorReading {
                    sensor_id: "temp_1".into(),
                    values: vec![72.1, 73.4, 71.8, 99.2, 72.5],
                    extra: Default::default(),
                },
                SensorReading {
                    sensor_id: "pressure_1".into(),
                    values: vec![14.7, 14.8, 14.6, 14.7, 14.9],
                    extra: Default::default(),
                },
            ],
            measurements: vec![Measurement {
                part_id: "A100".into(),
                dimension: "width".into(),
                values: vec![10.01, 10.02, 9.98, 10.0],
                extra: Default::default(),
            }],
            metadata,
            extra: Default::default(),
        }
    }

    /// Pretty-printed JSON of [`WorkflowInput::sample`].
    pub fn sample_text() -> String {
        serde_json::to_string_pretty(&Self::sample()).unwrap_or_else(|_| "{}".to_string())
    }
}

fn validate_identifier(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err("must not be empty".to_string());
    }
    if value.len() > MAX_IDENTIFIER_LENGTH {
        return Err(format!(
            "exceeds maximum length of {MAX_IDENTIFIER_LENGTH} characters"
        ));
    }
    Ok(())
}

fn validate_values(values: &[f64]) -> Result<(), String> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(format!("value at index {i} is not a finite number")),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
