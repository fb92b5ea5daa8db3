use serde::{Deserialize, Serialize};

use crate::core::conversion::VoltageConversion;
use crate::error::{ViewError, ViewResult};

/// One channel's calibration row as stored in the group attributes.
///
/// Writers emit either one value per trace or a single value shared by every
/// trace of the channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CalibrationRow {
    PerTrace(Vec<f64>),
    Shared(f64),
}

impl CalibrationRow {
    fn value_for(&self, trace: usize) -> Option<f64> {
        match self {
            Self::PerTrace(values) => values.get(trace).copied(),
            Self::Shared(value) => Some(*value),
        }
    }
}

/// Dataset-level attributes of a waveform capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DatasetMetadata {
    /// Seconds per sample.
    #[serde(default)]
    pub horiz_interval: Option<f64>,
    #[serde(default)]
    pub vertical_gains: Option<Vec<CalibrationRow>>,
    #[serde(default)]
    pub vertical_offsets: Option<Vec<CalibrationRow>>,
}

impl DatasetMetadata {
    #[must_use]
    pub fn new(
        horiz_interval: f64,
        vertical_gains: Vec<Vec<f64>>,
        vertical_offsets: Vec<Vec<f64>>,
    ) -> Self {
        Self {
            horiz_interval: Some(horiz_interval),
            vertical_gains: Some(
                vertical_gains
                    .into_iter()
                    .map(CalibrationRow::PerTrace)
                    .collect(),
            ),
            vertical_offsets: Some(
                vertical_offsets
                    .into_iter()
                    .map(CalibrationRow::PerTrace)
                    .collect(),
            ),
        }
    }

    /// Parses the group attribute document.
    pub fn from_json_str(input: &str) -> ViewResult<Self> {
        serde_json::from_str(input).map_err(|e| {
            ViewError::MissingMetadata(format!("failed to parse dataset attributes: {e}"))
        })
    }

    pub fn to_json_pretty(&self) -> ViewResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ViewError::InvalidData(format!("failed to serialize dataset attributes: {e}"))
        })
    }

    /// Returns the sampling interval, which must be finite and positive.
    pub fn horiz_interval(&self) -> ViewResult<f64> {
        match self.horiz_interval {
            Some(value) if value.is_finite() && value > 0.0 => Ok(value),
            Some(value) => Err(ViewError::MissingMetadata(format!(
                "horiz_interval must be finite and > 0, got {value}"
            ))),
            None => Err(ViewError::MissingMetadata(
                "horiz_interval attribute is absent".to_owned(),
            )),
        }
    }

    pub fn validate(&self) -> ViewResult<()> {
        self.horiz_interval().map(|_| ())
    }

    /// Resolves the calibration for one `(channel, trace)` pair.
    pub fn conversion_for(&self, channel: usize, trace: usize) -> ViewResult<VoltageConversion> {
        let gain = lookup(self.vertical_gains.as_deref(), "vertical_gains", channel, trace)?;
        let offset = lookup(
            self.vertical_offsets.as_deref(),
            "vertical_offsets",
            channel,
            trace,
        )?;
        VoltageConversion::new(gain, offset)
    }
}

fn lookup(
    rows: Option<&[CalibrationRow]>,
    name: &str,
    channel: usize,
    trace: usize,
) -> ViewResult<f64> {
    let rows =
        rows.ok_or_else(|| ViewError::MissingMetadata(format!("{name} attribute is absent")))?;
    rows.get(channel)
        .and_then(|row| row.value_for(trace))
        .ok_or_else(|| {
            ViewError::MissingMetadata(format!(
                "{name} has no entry for channel {channel}, trace {trace}"
            ))
        })
}
