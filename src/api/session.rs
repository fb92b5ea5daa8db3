use tracing::{debug, warn};

use crate::core::{
    DatasetMetadata, DetailSeries, EnvelopePoint, OverviewAccumulator, SampleRangeRequest,
    SeriesSelection, VoltageConversion, ZoomLevel, generate_zoom_levels_with_labels,
    overview_downsampling_factor, project_overview,
};
use crate::error::{ViewError, ViewResult};
use crate::store::ArrayStore;

use super::chunk_cache::{ChunkCache, ChunkCacheStats, LruChunkCache, SingleSlotCache};
use super::generation::{RenderTicket, RequestGenerations};
use super::range_fetcher::RangeSliceFetcher;
use super::reducer_config::SessionConfig;
use super::series_reducer::{AdaptiveSeriesReducer, SeriesContext};

/// Viewer state for one loaded dataset and one selected series.
///
/// This is the explicit context object that owns the fetcher and its cache.
/// Loading a dataset or changing the selection resets the cache and
/// supersedes every outstanding detail request.
#[derive(Debug)]
pub struct WaveformSession<S, C = SingleSlotCache> {
    fetcher: RangeSliceFetcher<S, C>,
    metadata: DatasetMetadata,
    reducer: AdaptiveSeriesReducer,
    generations: RequestGenerations,
    context: SeriesContext<VoltageConversion>,
}

impl<S: ArrayStore> WaveformSession<S, SingleSlotCache> {
    /// Opens a session on series `(0, 0, 0)` with a single-slot chunk cache.
    ///
    /// `config.cache_capacity` does not apply here; use
    /// [`WaveformSession::with_lru_cache`] to retain more than one chunk.
    pub fn new(store: S, metadata: DatasetMetadata, config: SessionConfig) -> ViewResult<Self> {
        if config.cache_capacity != 1 {
            warn!(
                cache_capacity = config.cache_capacity,
                "single-slot session ignores the configured cache capacity"
            );
        }
        Self::with_cache(store, SingleSlotCache::new(), metadata, config)
    }
}

impl<S: ArrayStore> WaveformSession<S, LruChunkCache> {
    /// Opens a session whose cache retains `config.cache_capacity` chunks.
    pub fn with_lru_cache(
        store: S,
        metadata: DatasetMetadata,
        config: SessionConfig,
    ) -> ViewResult<Self> {
        config.validate_cache_capacity()?;
        let cache = LruChunkCache::new(config.cache_capacity);
        Self::with_cache(store, cache, metadata, config)
    }
}

impl<S: ArrayStore, C: ChunkCache> WaveformSession<S, C> {
    pub fn with_cache(
        store: S,
        cache: C,
        metadata: DatasetMetadata,
        config: SessionConfig,
    ) -> ViewResult<Self> {
        config.validate()?;
        let reducer = AdaptiveSeriesReducer::new(config.reducer)?;
        let context = resolve_context(&store, &metadata, SeriesSelection::default())?;
        debug!(
            shape = ?store.shape().as_array(),
            chunk_sample_size = store.chunk_sample_size(),
            "waveform session opened"
        );

        Ok(Self {
            fetcher: RangeSliceFetcher::with_cache(store, cache),
            metadata,
            reducer,
            generations: RequestGenerations::new(),
            context,
        })
    }

    /// Switches to another series. Metadata is resolved before the cache is
    /// touched, so a failed selection leaves the session unchanged.
    pub fn select(&mut self, selection: SeriesSelection) -> ViewResult<()> {
        let context = resolve_context(self.fetcher.store(), &self.metadata, selection)?;
        self.context = context;
        self.fetcher.reset();
        self.generations.invalidate();
        debug!(?selection, "series selected");
        Ok(())
    }

    /// Replaces the dataset and returns the previous store.
    pub fn load(&mut self, store: S, metadata: DatasetMetadata) -> ViewResult<S> {
        let context = resolve_context(&store, &metadata, SeriesSelection::default())?;
        let previous_store = self.fetcher.replace_store(store);
        self.metadata = metadata;
        self.context = context;
        self.generations.invalidate();
        debug!("dataset loaded");
        Ok(previous_store)
    }

    #[must_use]
    pub fn selection(&self) -> SeriesSelection {
        self.context.selection
    }

    #[must_use]
    pub fn context(&self) -> &SeriesContext<VoltageConversion> {
        &self.context
    }

    #[must_use]
    pub fn metadata(&self) -> &DatasetMetadata {
        &self.metadata
    }

    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.context.sample_count
    }

    /// Duration from the first to the last sample, in seconds.
    #[must_use]
    pub fn total_time_s(&self) -> f64 {
        self.context.sample_count.saturating_sub(1) as f64 * self.context.horiz_interval
    }

    /// Zoom spans between one sample interval and the series duration.
    pub fn zoom_levels(&self) -> ViewResult<Vec<ZoomLevel>> {
        let interval = self.context.horiz_interval;
        generate_zoom_levels_with_labels(interval, self.context.sample_count as f64 * interval)
    }

    #[must_use]
    pub fn cache_stats(&self) -> ChunkCacheStats {
        self.fetcher.cache_stats()
    }

    #[must_use]
    pub fn fetcher(&self) -> &RangeSliceFetcher<S, C> {
        &self.fetcher
    }

    /// Starts a new detail request generation, superseding older tickets.
    pub fn issue_ticket(&self) -> RenderTicket {
        self.generations.issue()
    }

    pub async fn detail_series(
        &mut self,
        domain_start: f64,
        domain_end: f64,
    ) -> ViewResult<DetailSeries> {
        self.reducer
            .get_series(&mut self.fetcher, domain_start, domain_end, &self.context)
            .await
    }

    pub async fn detail_series_with_ticket(
        &mut self,
        domain_start: f64,
        domain_end: f64,
        ticket: &RenderTicket,
    ) -> ViewResult<DetailSeries> {
        self.reducer
            .get_series_with_ticket(
                &mut self.fetcher,
                domain_start,
                domain_end,
                &self.context,
                ticket,
            )
            .await
    }

    /// Samples `[start, end_exclusive)` of the selected series.
    pub async fn raw_range(&mut self, start: usize, end_exclusive: usize) -> ViewResult<Vec<i16>> {
        self.fetcher
            .get_range(SampleRangeRequest::new(
                self.context.selection,
                start,
                end_exclusive,
            ))
            .await
    }

    /// Min/max overview of the whole selected series.
    ///
    /// Chunks are folded into the buckets as they arrive, so at most one chunk
    /// of raw samples is held at a time. Chunks lying entirely in the dropped
    /// tail are never fetched.
    pub async fn overview(&mut self) -> ViewResult<Vec<EnvelopePoint>> {
        let sample_count = self.context.sample_count;
        if sample_count == 0 {
            return Ok(Vec::new());
        }
        let chunk = self.fetcher.store().chunk_sample_size().max(1);
        let mut acc =
            OverviewAccumulator::new(sample_count, overview_downsampling_factor(sample_count))?;
        let mut start = 0;
        while acc.remaining() > 0 {
            let end = (start + chunk).min(sample_count);
            let samples = self.raw_range(start, end).await?;
            acc.push(&samples);
            start = end;
        }
        debug!(sample_count, chunks_read = start.div_ceil(chunk), "overview built");

        project_overview(
            &acc.finish(),
            sample_count,
            self.context.horiz_interval,
            &self.context.conversion,
        )
    }
}

fn resolve_context<S: ArrayStore>(
    store: &S,
    metadata: &DatasetMetadata,
    selection: SeriesSelection,
) -> ViewResult<SeriesContext<VoltageConversion>> {
    let shape = store.shape();
    if !shape.contains(selection) {
        return Err(ViewError::SelectionOutOfShape {
            selection,
            shape: shape.as_array(),
        });
    }
    let horiz_interval = metadata.horiz_interval()?;
    let conversion = metadata.conversion_for(selection.channel, selection.trace)?;
    Ok(SeriesContext::new(
        horiz_interval,
        shape.samples,
        selection,
        conversion,
    ))
}
