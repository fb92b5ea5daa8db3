use tracing::{debug, warn};

use crate::core::{
    DetailSeries, EnvelopePoint, RawPoint, SampleConversion, SampleRangeRequest, SampleWindow,
    SeriesSelection, VoltageConversion, resolve_sample_window,
};
use crate::error::ViewResult;
use crate::store::ArrayStore;

use super::chunk_cache::ChunkCache;
use super::generation::RenderTicket;
use super::range_fetcher::RangeSliceFetcher;
use super::reducer_config::ReducerConfig;

/// Everything the reducer needs to know about the series being viewed.
#[derive(Debug, Clone, Copy)]
pub struct SeriesContext<V = VoltageConversion> {
    /// Seconds per sample.
    pub horiz_interval: f64,
    pub sample_count: usize,
    pub selection: SeriesSelection,
    pub conversion: V,
}

impl<V: SampleConversion> SeriesContext<V> {
    #[must_use]
    pub fn new(
        horiz_interval: f64,
        sample_count: usize,
        selection: SeriesSelection,
        conversion: V,
    ) -> Self {
        Self {
            horiz_interval,
            sample_count,
            selection,
            conversion,
        }
    }
}

/// Rendering mode chosen for a visible window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReductionMode {
    Raw,
    Decimated { step: usize },
}

/// Chooses between raw and min/max envelope output for a visible window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdaptiveSeriesReducer {
    config: ReducerConfig,
}

impl AdaptiveSeriesReducer {
    pub fn new(config: ReducerConfig) -> ViewResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> ReducerConfig {
        self.config
    }

    /// Raw up to and including the threshold, decimated above it.
    #[must_use]
    pub fn mode_for(&self, visible_width: usize) -> ReductionMode {
        if visible_width > self.config.decimation_threshold {
            let step = (visible_width / self.config.target_points.max(1)).max(1);
            ReductionMode::Decimated { step }
        } else {
            ReductionMode::Raw
        }
    }

    /// Builds the detail series for `[domain_start, domain_end]` seconds.
    pub async fn get_series<S, C, V>(
        &self,
        fetcher: &mut RangeSliceFetcher<S, C>,
        domain_start: f64,
        domain_end: f64,
        context: &SeriesContext<V>,
    ) -> ViewResult<DetailSeries>
    where
        S: ArrayStore,
        C: ChunkCache,
        V: SampleConversion,
    {
        self.reduce(fetcher, domain_start, domain_end, context, None)
            .await
    }

    /// Like [`Self::get_series`], but abandons the work with `Superseded` as
    /// soon as `ticket` is no longer the latest generation.
    pub async fn get_series_with_ticket<S, C, V>(
        &self,
        fetcher: &mut RangeSliceFetcher<S, C>,
        domain_start: f64,
        domain_end: f64,
        context: &SeriesContext<V>,
        ticket: &RenderTicket,
    ) -> ViewResult<DetailSeries>
    where
        S: ArrayStore,
        C: ChunkCache,
        V: SampleConversion,
    {
        let result = self
            .reduce(fetcher, domain_start, domain_end, context, Some(ticket))
            .await;
        if let Err(err) = ticket.ensure_current() {
            warn!(generation = ticket.generation(), "discarding superseded detail series");
            return Err(err);
        }
        result
    }

    async fn reduce<S, C, V>(
        &self,
        fetcher: &mut RangeSliceFetcher<S, C>,
        domain_start: f64,
        domain_end: f64,
        context: &SeriesContext<V>,
        ticket: Option<&RenderTicket>,
    ) -> ViewResult<DetailSeries>
    where
        S: ArrayStore,
        C: ChunkCache,
        V: SampleConversion,
    {
        let window = resolve_sample_window(
            domain_start,
            domain_end,
            context.horiz_interval,
            context.sample_count,
        )?;

        match self.mode_for(window.width()) {
            ReductionMode::Raw => {
                debug!(
                    start_index = window.start_index,
                    visible_width = window.width(),
                    "raw detail series"
                );
                raw_series(fetcher, window, context, ticket)
                    .await
                    .map(DetailSeries::Raw)
            }
            ReductionMode::Decimated { step } => {
                debug!(
                    start_index = window.start_index,
                    visible_width = window.width(),
                    step,
                    "decimated detail series"
                );
                envelope_series(fetcher, window, step, context, ticket)
                    .await
                    .map(DetailSeries::Envelope)
            }
        }
    }
}

fn check_ticket(ticket: Option<&RenderTicket>) -> ViewResult<()> {
    ticket.map_or(Ok(()), RenderTicket::ensure_current)
}

async fn raw_series<S, C, V>(
    fetcher: &mut RangeSliceFetcher<S, C>,
    window: SampleWindow,
    context: &SeriesContext<V>,
    ticket: Option<&RenderTicket>,
) -> ViewResult<Vec<RawPoint>>
where
    S: ArrayStore,
    C: ChunkCache,
    V: SampleConversion,
{
    check_ticket(ticket)?;
    let samples = fetcher
        .get_range(SampleRangeRequest::new(
            context.selection,
            window.start_index,
            window.end_index,
        ))
        .await?;

    Ok(samples
        .iter()
        .enumerate()
        .map(|(i, &raw)| {
            RawPoint::new(
                i as f64 * context.horiz_interval,
                context.conversion.convert(raw),
            )
        })
        .collect())
}

/// Half-open buckets of width `step` covering the window; the last one may be
/// shorter.
pub fn bucket_bounds(window: SampleWindow, step: usize) -> impl Iterator<Item = (usize, usize)> {
    let step = step.max(1);
    (window.start_index..window.end_index)
        .step_by(step)
        .map(move |start| (start, (start + step).min(window.end_index)))
}

async fn envelope_series<S, C, V>(
    fetcher: &mut RangeSliceFetcher<S, C>,
    window: SampleWindow,
    step: usize,
    context: &SeriesContext<V>,
    ticket: Option<&RenderTicket>,
) -> ViewResult<Vec<EnvelopePoint>>
where
    S: ArrayStore,
    C: ChunkCache,
    V: SampleConversion,
{
    let mut out = Vec::with_capacity(window.width().div_ceil(step));

    for (bucket_start, bucket_end) in bucket_bounds(window, step) {
        check_ticket(ticket)?;
        let samples = fetcher
            .get_range(SampleRangeRequest::new(
                context.selection,
                bucket_start,
                bucket_end,
            ))
            .await?;

        // Every sample of the bucket is scanned so spikes are never skipped.
        let (min_value, max_value) = samples.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), &raw| {
                let value = context.conversion.convert(raw);
                (lo.min(value), hi.max(value))
            },
        );

        let offset = (bucket_start - window.start_index) as f64;
        let half_width = (bucket_end - bucket_start) as f64 / 2.0;
        out.push(EnvelopePoint::new(
            (offset + half_width) * context.horiz_interval,
            min_value,
            max_value,
        ));
    }

    Ok(out)
}
