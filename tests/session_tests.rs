use trc_view::api::{SessionConfig, WaveformSession};
use trc_view::core::{
    ArrayShape, DatasetMetadata, DetailSeries, SeriesSelection, VoltageConversion,
    compute_overview, project_overview,
};
use trc_view::error::ViewError;
use trc_view::store::InMemoryArrayStore;

fn metadata() -> DatasetMetadata {
    DatasetMetadata::new(
        1e-6,
        vec![vec![0.001, 0.002], vec![0.004, 0.008]],
        vec![vec![0.0, 0.0], vec![0.0, 0.0]],
    )
}

fn store(samples: usize, chunk: usize) -> InMemoryArrayStore {
    let shape = ArrayShape::new(2, 2, 1, samples);
    InMemoryArrayStore::from_fn(shape, chunk, |sel, i| {
        ((sel.channel * 2 + sel.trace) * 1_000 + i % 1_000) as i16
    })
    .expect("store")
}

#[tokio::test]
async fn session_reduces_detail_for_the_selected_series() {
    let mut session =
        WaveformSession::new(store(10_000, 4096), metadata(), SessionConfig::default())
            .expect("session");
    assert_eq!(session.selection(), SeriesSelection::default());
    assert!((session.total_time_s() - 9_999e-6).abs() <= 1e-12);

    let series = session.detail_series(0.0, 0.01).await.expect("series");
    let DetailSeries::Raw(points) = series else {
        panic!("expected raw");
    };
    assert_eq!(points.len(), 10_000);
    // gain 0.001 -> 1 mV per count
    assert!((points[3].value - 3.0).abs() <= 1e-9);
    assert_eq!(session.fetcher().store().fetch_count(), 3);
}

#[tokio::test]
async fn selecting_a_series_resets_the_cache_and_conversion() {
    let mut session =
        WaveformSession::new(store(1_000, 1_000), metadata(), SessionConfig::default())
            .expect("session");
    session.raw_range(0, 10).await.expect("warm");
    assert_eq!(session.cache_stats().size, 1);

    session
        .select(SeriesSelection::new(1, 1, 0))
        .expect("select");
    assert_eq!(session.cache_stats().size, 0);
    assert_eq!(session.context().conversion.gain, 0.008);

    let raw = session.raw_range(0, 2).await.expect("range");
    assert_eq!(raw, vec![3_000, 3_001]);
}

#[tokio::test]
async fn missing_calibration_fails_before_any_fetch() {
    let meta = DatasetMetadata::new(1e-6, vec![vec![1.0]], vec![vec![0.0]]);
    let mut session =
        WaveformSession::new(store(100, 10), meta, SessionConfig::default()).expect("session");

    let err = session
        .select(SeriesSelection::new(1, 0, 0))
        .expect_err("channel 1 has no calibration");
    assert!(matches!(err, ViewError::MissingMetadata(_)));
    assert_eq!(session.selection(), SeriesSelection::default());
    assert_eq!(session.fetcher().store().fetch_count(), 0);

    let err = WaveformSession::new(
        store(100, 10),
        DatasetMetadata::default(),
        SessionConfig::default(),
    )
    .expect_err("no interval");
    assert!(matches!(err, ViewError::MissingMetadata(_)));
}

#[tokio::test]
async fn selection_outside_shape_is_rejected() {
    let mut session =
        WaveformSession::new(store(100, 10), metadata(), SessionConfig::default())
            .expect("session");
    let err = session
        .select(SeriesSelection::new(0, 0, 3))
        .expect_err("segment 3 does not exist");
    assert!(matches!(err, ViewError::SelectionOutOfShape { .. }));
    assert!(err.is_invalid_range());
    assert_eq!(session.selection(), SeriesSelection::default());
}

#[tokio::test]
async fn new_ticket_supersedes_and_selection_invalidates() {
    let mut session =
        WaveformSession::new(store(1_000, 100), metadata(), SessionConfig::default())
            .expect("session");

    let first = session.issue_ticket();
    let second = session.issue_ticket();
    assert!(matches!(
        session.detail_series_with_ticket(0.0, 9.95e-5, &first).await,
        Err(ViewError::Superseded { .. })
    ));
    let series = session
        .detail_series_with_ticket(0.0, 9.95e-5, &second)
        .await
        .expect("current ticket");
    assert_eq!(series.len(), 100);

    session
        .select(SeriesSelection::new(0, 1, 0))
        .expect("select");
    assert!(!second.is_current());
}

#[tokio::test]
async fn loading_a_dataset_replaces_store_and_metadata() {
    let mut session =
        WaveformSession::new(store(1_000, 100), metadata(), SessionConfig::default())
            .expect("session");
    session.select(SeriesSelection::new(1, 0, 0)).expect("select");
    session.raw_range(0, 10).await.expect("warm");

    let replacement = InMemoryArrayStore::single_series(vec![7; 50], 25).expect("store");
    let new_meta = DatasetMetadata::new(2e-9, vec![vec![1.0]], vec![vec![0.0]]);
    let previous = session.load(replacement, new_meta).expect("load");

    assert_eq!(previous.fetch_count(), 1);
    assert_eq!(session.selection(), SeriesSelection::default());
    assert_eq!(session.sample_count(), 50);
    assert_eq!(session.cache_stats().size, 0);
    assert_eq!(session.raw_range(0, 3).await.expect("range"), vec![7, 7, 7]);
}

#[tokio::test]
async fn overview_covers_the_whole_series() {
    let shape = ArrayShape::new(1, 1, 1, 20_000);
    let source = InMemoryArrayStore::from_fn(shape, 3_000, |_, i| {
        if i == 12_345 { 9_000 } else { (i % 7) as i16 }
    })
    .expect("store");
    let meta = DatasetMetadata::new(1e-6, vec![vec![0.001]], vec![vec![0.0]]);
    let mut session =
        WaveformSession::new(source, meta, SessionConfig::default()).expect("session");

    let overview = session.overview().await.expect("overview");
    // factor = 20000 / 4000 = 5
    assert_eq!(overview.len(), 4_000);
    assert!((overview[0].time - 2.5e-6).abs() <= 1e-15);
    assert!((overview[12_345 / 5].max_value - 9_000.0).abs() <= 1e-9);
    let max = overview
        .iter()
        .map(|p| p.max_value)
        .fold(f64::NEG_INFINITY, f64::max);
    assert!((max - 9_000.0).abs() <= 1e-9);
    assert_eq!(session.fetcher().store().fetch_count(), 7);
}

#[tokio::test]
async fn lru_session_honours_configured_capacity() {
    let config = SessionConfig::default().with_cache_capacity(3);
    let mut session =
        WaveformSession::with_lru_cache(store(1_000, 100), metadata(), config).expect("session");
    session.raw_range(0, 300).await.expect("fill");
    session.raw_range(0, 300).await.expect("hit");
    assert_eq!(session.cache_stats().size, 3);
    assert_eq!(session.cache_stats().hits, 3);
    assert_eq!(session.fetcher().store().fetch_count(), 3);
}

#[tokio::test]
async fn cache_capacity_only_binds_lru_sessions() {
    let config = SessionConfig::default().with_cache_capacity(0);
    let session = WaveformSession::new(store(100, 10), metadata(), config).expect("single slot");
    assert_eq!(session.cache_stats().size, 0);

    let err = WaveformSession::with_lru_cache(store(100, 10), metadata(), config)
        .expect_err("lru needs a capacity");
    assert!(matches!(err, ViewError::InvalidData(_)));
}

#[tokio::test]
async fn overview_streams_one_chunk_at_a_time() {
    let samples = 20_003;
    let chunk = 4_000;
    let value = |i: usize| ((i * 7_919) % 20_011) as i16 - 10_000;
    let shape = ArrayShape::new(1, 1, 1, samples);
    let source = InMemoryArrayStore::from_fn(shape, chunk, |_, i| value(i)).expect("store");
    let meta = DatasetMetadata::new(1e-9, vec![vec![0.5]], vec![vec![0.0]]);
    let mut session =
        WaveformSession::new(source, meta, SessionConfig::default()).expect("session");

    let streamed = session.overview().await.expect("overview");

    // factor 5 keeps 20000 samples, so the 3-sample tail chunk is never read.
    let fetches = session.fetcher().store().fetches();
    assert_eq!(fetches.len(), 5);
    assert!(fetches.iter().all(|f| f.end_exclusive - f.start <= chunk));
    assert!(fetches.iter().all(|f| f.end_exclusive <= 20_000));
    assert!(session.cache_stats().size <= 1);

    let all: Vec<i16> = (0..samples).map(value).collect();
    let whole = compute_overview(&all, 5).expect("whole-series overview");
    let conversion = VoltageConversion::new(0.5, 0.0).expect("conversion");
    let expected = project_overview(&whole, samples, 1e-9, &conversion).expect("project");
    assert_eq!(streamed, expected);
}

#[test]
fn zoom_levels_span_interval_to_half_the_capture() {
    let session =
        WaveformSession::new(store(10_000, 4096), metadata(), SessionConfig::default())
            .expect("session");
    let levels = session.zoom_levels().expect("levels");

    let labels: Vec<&str> = levels.iter().map(|z| z.label.as_str()).collect();
    assert_eq!(labels.first(), Some(&"2 µs"));
    assert_eq!(labels.last(), Some(&"5 ms"));
    assert!(labels.contains(&"1 ms"));
}
