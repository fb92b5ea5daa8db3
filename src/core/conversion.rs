use serde::{Deserialize, Serialize};

use crate::error::{ViewError, ViewResult};

/// Maps a raw ADC sample to a physical value.
///
/// Implemented for [`VoltageConversion`] and for any `Fn(i16) -> f64`, so
/// callers can plug in ad-hoc conversions in tests or custom front-ends.
pub trait SampleConversion {
    fn convert(&self, raw: i16) -> f64;
}

impl<F> SampleConversion for F
where
    F: Fn(i16) -> f64,
{
    fn convert(&self, raw: i16) -> f64 {
        self(raw)
    }
}

/// Per `(channel, trace)` vertical calibration.
///
/// `value_mV = 1000 * (raw * gain - offset)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoltageConversion {
    pub gain: f64,
    pub offset: f64,
}

impl VoltageConversion {
    pub fn new(gain: f64, offset: f64) -> ViewResult<Self> {
        if !gain.is_finite() || !offset.is_finite() {
            return Err(ViewError::MissingMetadata(format!(
                "vertical gain/offset must be finite (gain={gain}, offset={offset})"
            )));
        }
        Ok(Self { gain, offset })
    }

    /// Identity-like calibration: raw counts scaled to millivolts with gain 1.
    #[must_use]
    pub fn unity() -> Self {
        Self {
            gain: 1.0,
            offset: 0.0,
        }
    }

    #[must_use]
    pub fn to_millivolts(self, raw: i16) -> f64 {
        1000.0 * (f64::from(raw) * self.gain - self.offset)
    }
}

impl SampleConversion for VoltageConversion {
    fn convert(&self, raw: i16) -> f64 {
        self.to_millivolts(raw)
    }
}
