use serde::{Deserialize, Serialize};

use crate::error::{ViewError, ViewResult};

/// Half-open sample index window `[start_index, end_index)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleWindow {
    pub start_index: usize,
    pub end_index: usize,
}

impl SampleWindow {
    #[must_use]
    pub fn width(self) -> usize {
        self.end_index - self.start_index
    }
}

/// Converts a time domain in seconds into a sample index window.
///
/// The start is floored and the end is ceiled, then both are clamped to
/// `[0, sample_count]`. A reversed or zero-length domain, or one that covers
/// no samples, is an `EmptyWindow` error.
pub fn resolve_sample_window(
    domain_start: f64,
    domain_end: f64,
    horiz_interval: f64,
    sample_count: usize,
) -> ViewResult<SampleWindow> {
    if !domain_start.is_finite() || !domain_end.is_finite() {
        return Err(ViewError::InvalidData(
            "time domain must be finite".to_owned(),
        ));
    }
    if !horiz_interval.is_finite() || horiz_interval <= 0.0 {
        return Err(ViewError::MissingMetadata(format!(
            "horiz_interval must be finite and > 0, got {horiz_interval}"
        )));
    }

    let start_index = ((domain_start / horiz_interval).floor() as i64).max(0);
    let end_index = ((domain_end / horiz_interval).ceil() as i64)
        .min(i64::try_from(sample_count).unwrap_or(i64::MAX));

    if domain_end <= domain_start || end_index.saturating_sub(start_index) <= 0 {
        return Err(ViewError::EmptyWindow {
            start_index,
            end_index,
        });
    }

    // Both bounds are within [0, sample_count] here.
    Ok(SampleWindow {
        start_index: start_index as usize,
        end_index: end_index as usize,
    })
}
