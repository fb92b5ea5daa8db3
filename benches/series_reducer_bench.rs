use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use trc_view::api::{AdaptiveSeriesReducer, RangeSliceFetcher, SeriesContext};
use trc_view::core::{
    ArrayShape, SeriesSelection, VoltageConversion, compute_overview, overview_downsampling_factor,
};
use trc_view::store::InMemoryArrayStore;

const SAMPLES: usize = 1_000_000;
const CHUNK: usize = 65_536;
const HORIZ_INTERVAL: f64 = 1e-9;

fn synthetic_store() -> InMemoryArrayStore {
    InMemoryArrayStore::from_fn(ArrayShape::new(1, 1, 1, SAMPLES), CHUNK, |_, i| {
        let phase = i as f64 * 0.002;
        (phase.sin() * 12_000.0) as i16
    })
    .expect("synthetic store")
}

fn context() -> SeriesContext {
    SeriesContext::new(
        HORIZ_INTERVAL,
        SAMPLES,
        SeriesSelection::default(),
        VoltageConversion::new(0.0005, 0.0).expect("conversion"),
    )
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
}

fn bench_raw_window_20k(c: &mut Criterion) {
    let rt = runtime();
    let mut fetcher = RangeSliceFetcher::new(synthetic_store());
    let reducer = AdaptiveSeriesReducer::default();
    let ctx = context();

    c.bench_function("raw_window_20k", |b| {
        b.iter(|| {
            let series = rt
                .block_on(reducer.get_series(
                    &mut fetcher,
                    black_box(400_000.0 * HORIZ_INTERVAL),
                    black_box(420_000.0 * HORIZ_INTERVAL),
                    &ctx,
                ))
                .expect("raw series");
            fetcher.store().clear_fetches();
            black_box(series);
        })
    });
}

fn bench_decimated_full_window_1m(c: &mut Criterion) {
    let rt = runtime();
    let mut fetcher = RangeSliceFetcher::new(synthetic_store());
    let reducer = AdaptiveSeriesReducer::default();
    let ctx = context();

    c.bench_function("decimated_full_window_1m", |b| {
        b.iter(|| {
            let series = rt
                .block_on(reducer.get_series(
                    &mut fetcher,
                    black_box(0.0),
                    black_box(SAMPLES as f64 * HORIZ_INTERVAL),
                    &ctx,
                ))
                .expect("decimated series");
            fetcher.store().clear_fetches();
            black_box(series);
        })
    });
}

fn bench_overview_1m(c: &mut Criterion) {
    let samples: Vec<i16> = (0..SAMPLES).map(|i| (i % 4_096) as i16).collect();
    let factor = overview_downsampling_factor(SAMPLES);

    c.bench_function("overview_min_max_1m", |b| {
        b.iter(|| {
            let overview = compute_overview(black_box(&samples), factor).expect("overview");
            black_box(overview);
        })
    });
}

criterion_group!(
    benches,
    bench_raw_window_20k,
    bench_decimated_full_window_1m,
    bench_overview_1m
);
criterion_main!(benches);
