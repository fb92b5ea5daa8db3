use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ViewError, ViewResult};

/// One logical waveform: a `(channel, trace, segment)` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct SeriesSelection {
    pub channel: usize,
    pub trace: usize,
    pub segment: usize,
}

impl SeriesSelection {
    #[must_use]
    pub fn new(channel: usize, trace: usize, segment: usize) -> Self {
        Self {
            channel,
            trace,
            segment,
        }
    }
}

/// Extent of the 4-D raw array `(channel, trace, segment, sample)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayShape {
    pub channels: usize,
    pub traces: usize,
    pub segments: usize,
    pub samples: usize,
}

impl ArrayShape {
    #[must_use]
    pub fn new(channels: usize, traces: usize, segments: usize, samples: usize) -> Self {
        Self {
            channels,
            traces,
            segments,
            samples,
        }
    }

    #[must_use]
    pub fn contains(self, selection: SeriesSelection) -> bool {
        selection.channel < self.channels
            && selection.trace < self.traces
            && selection.segment < self.segments
    }

    #[must_use]
    pub fn as_array(self) -> [usize; 4] {
        [self.channels, self.traces, self.segments, self.samples]
    }
}

/// Cache key for one sample-axis chunk of one series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkKey {
    pub selection: SeriesSelection,
    pub chunk_index: usize,
}

impl ChunkKey {
    #[must_use]
    pub fn new(selection: SeriesSelection, chunk_index: usize) -> Self {
        Self {
            selection,
            chunk_index,
        }
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.selection.channel, self.selection.trace, self.selection.segment, self.chunk_index
        )
    }
}

/// Contiguous half-open sample range of one series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRangeRequest {
    pub selection: SeriesSelection,
    pub start: usize,
    pub end_exclusive: usize,
}

impl SampleRangeRequest {
    #[must_use]
    pub fn new(selection: SeriesSelection, start: usize, end_exclusive: usize) -> Self {
        Self {
            selection,
            start,
            end_exclusive,
        }
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.end_exclusive.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Checks `0 <= start < end_exclusive <= shape.samples` and the selection
    /// against the array shape.
    pub fn validate(self, shape: ArrayShape) -> ViewResult<()> {
        if self.start >= self.end_exclusive || self.end_exclusive > shape.samples {
            return Err(ViewError::InvalidRange {
                start: self.start,
                end: self.end_exclusive,
                sample_count: shape.samples,
            });
        }
        if !shape.contains(self.selection) {
            return Err(ViewError::SelectionOutOfShape {
                selection: self.selection,
                shape: shape.as_array(),
            });
        }
        Ok(())
    }
}

/// Full-resolution sample paired with its time offset in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    pub time: f64,
    pub value: f64,
}

impl RawPoint {
    #[must_use]
    pub fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }
}

/// Min/max envelope of one decimation bucket, timestamped at its midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvelopePoint {
    pub time: f64,
    pub min_value: f64,
    pub max_value: f64,
}

impl EnvelopePoint {
    #[must_use]
    pub fn new(time: f64, min_value: f64, max_value: f64) -> Self {
        Self {
            time,
            min_value,
            max_value,
        }
    }
}

/// Series produced for a detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DetailSeries {
    Raw(Vec<RawPoint>),
    Envelope(Vec<EnvelopePoint>),
}

impl DetailSeries {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Raw(points) => points.len(),
            Self::Envelope(points) => points.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_decimated(&self) -> bool {
        matches!(self, Self::Envelope(_))
    }

    #[must_use]
    pub fn times(&self) -> Vec<f64> {
        match self {
            Self::Raw(points) => points.iter().map(|p| p.time).collect(),
            Self::Envelope(points) => points.iter().map(|p| p.time).collect(),
        }
    }

    /// Returns the `(min, max)` value bounds for y-axis scaling.
    #[must_use]
    pub fn value_extent(&self) -> Option<(f64, f64)> {
        match self {
            Self::Raw(points) => fold_extent(points.iter().map(|p| (p.value, p.value))),
            Self::Envelope(points) => value_extent(points),
        }
    }
}

/// Returns the global `(min, max)` across envelope points.
#[must_use]
pub fn value_extent(points: &[EnvelopePoint]) -> Option<(f64, f64)> {
    fold_extent(points.iter().map(|p| (p.min_value, p.max_value)))
}

fn fold_extent(pairs: impl Iterator<Item = (f64, f64)>) -> Option<(f64, f64)> {
    pairs.fold(None, |acc, (lo, hi)| match acc {
        None => Some((lo, hi)),
        Some((min, max)) => Some((min.min(lo), max.max(hi))),
    })
}
