#[cfg(feature = "parallel-overview")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::conversion::SampleConversion;
use crate::core::types::EnvelopePoint;
use crate::error::{ViewError, ViewResult};

/// Number of buckets the whole-series overview aims for.
pub const OVERVIEW_TARGET_POINTS: usize = 4000;

/// Raw min/max rows of a whole-series overview, one pair per bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MinMaxOverview {
    pub min: Vec<i16>,
    pub max: Vec<i16>,
}

impl MinMaxOverview {
    #[must_use]
    pub fn len(&self) -> usize {
        self.min.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.is_empty()
    }
}

/// Bucket width used for a series of `sample_count` samples.
#[must_use]
pub fn overview_downsampling_factor(sample_count: usize) -> usize {
    (sample_count / OVERVIEW_TARGET_POINTS).max(1)
}

/// Reduces every full group of `factor` samples to its `(min, max)`.
///
/// Trailing samples that do not fill a whole group are dropped.
pub fn compute_overview(samples: &[i16], factor: usize) -> ViewResult<MinMaxOverview> {
    if factor == 0 {
        return Err(ViewError::InvalidData(
            "overview downsampling factor must be > 0".to_owned(),
        ));
    }

    let n_fit = samples.len() - samples.len() % factor;
    let fitted = &samples[..n_fit];

    #[cfg(feature = "parallel-overview")]
    let pairs: Vec<(i16, i16)> = fitted.par_chunks_exact(factor).map(bucket_min_max).collect();

    #[cfg(not(feature = "parallel-overview"))]
    let pairs: Vec<(i16, i16)> = fitted.chunks_exact(factor).map(bucket_min_max).collect();

    let (min, max) = pairs.into_iter().unzip();
    Ok(MinMaxOverview { min, max })
}

fn bucket_min_max(bucket: &[i16]) -> (i16, i16) {
    bucket
        .iter()
        .fold((i16::MAX, i16::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

/// Folds a series into overview buckets chunk by chunk.
///
/// Only the running extremes of the open bucket are kept between chunks, so
/// memory is bounded by the bucket count and never by the series length.
/// Produces the same rows as [`compute_overview`] over the whole series.
#[derive(Debug, Clone)]
pub struct OverviewAccumulator {
    factor: usize,
    remaining: usize,
    filled: usize,
    current: (i16, i16),
    overview: MinMaxOverview,
}

impl OverviewAccumulator {
    /// Accumulator for a series of `sample_count` samples.
    pub fn new(sample_count: usize, factor: usize) -> ViewResult<Self> {
        if factor == 0 {
            return Err(ViewError::InvalidData(
                "overview downsampling factor must be > 0".to_owned(),
            ));
        }
        let buckets = sample_count / factor;
        Ok(Self {
            factor,
            remaining: buckets * factor,
            filled: 0,
            current: (i16::MAX, i16::MIN),
            overview: MinMaxOverview {
                min: Vec::with_capacity(buckets),
                max: Vec::with_capacity(buckets),
            },
        })
    }

    /// Samples still expected before the last full bucket closes.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Feeds the next samples of the series in order. Samples past the last
    /// full bucket are ignored.
    pub fn push(&mut self, samples: &[i16]) {
        let take = samples.len().min(self.remaining);
        for &value in &samples[..take] {
            let (lo, hi) = self.current;
            self.current = (lo.min(value), hi.max(value));
            self.filled += 1;
            if self.filled == self.factor {
                self.overview.min.push(self.current.0);
                self.overview.max.push(self.current.1);
                self.current = (i16::MAX, i16::MIN);
                self.filled = 0;
            }
        }
        self.remaining -= take;
    }

    #[must_use]
    pub fn finish(self) -> MinMaxOverview {
        self.overview
    }
}

/// Converts an overview into envelope points timestamped at bucket centers.
pub fn project_overview<C: SampleConversion + ?Sized>(
    overview: &MinMaxOverview,
    sample_count: usize,
    horiz_interval: f64,
    conversion: &C,
) -> ViewResult<Vec<EnvelopePoint>> {
    if overview.min.len() != overview.max.len() {
        return Err(ViewError::InvalidData(format!(
            "overview rows differ in length: min={}, max={}",
            overview.min.len(),
            overview.max.len()
        )));
    }
    if overview.is_empty() {
        return Ok(Vec::new());
    }

    let factor = sample_count as f64 / overview.len() as f64;
    Ok(overview
        .min
        .iter()
        .zip(&overview.max)
        .enumerate()
        .map(|(i, (&lo, &hi))| {
            EnvelopePoint::new(
                (i as f64 + 0.5) * factor * horiz_interval,
                conversion.convert(lo),
                conversion.convert(hi),
            )
        })
        .collect())
}
