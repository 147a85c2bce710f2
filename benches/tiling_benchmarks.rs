use criterion::{Criterion, black_box, criterion_group, criterion_main};
use geo::{Coord, Rect};
use tilery::{Config, GeoJson, RangeIndex, TileIndex};

/// Deterministic pseudo-random stream, good enough for benchmark data.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

fn synthetic_lines(count: usize, points_per_line: usize) -> GeoJson {
    let mut rng = Lcg(42);
    let features: Vec<String> = (0..count)
        .map(|_| {
            let start_lon = rng.next() * 300.0 - 150.0;
            let start_lat = rng.next() * 120.0 - 60.0;
            let coords: Vec<String> = (0..points_per_line)
                .map(|j| {
                    let lon = start_lon + j as f64 * 0.01 + rng.next() * 0.002;
                    let lat = start_lat + (rng.next() - 0.5) * 0.01;
                    format!("[{lon:.6},{lat:.6}]")
                })
                .collect();
            format!(
                r#"{{"type":"Feature","properties":null,"geometry":{{"type":"LineString","coordinates":[{}]}}}}"#,
                coords.join(",")
            )
        })
        .collect();

    format!(
        r#"{{"type":"FeatureCollection","features":[{}]}}"#,
        features.join(",")
    )
    .parse()
    .unwrap()
}

fn synthetic_points(count: usize) -> Vec<geojson::Feature> {
    let mut rng = Lcg(7);
    (0..count)
        .map(|_| geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::Point(vec![
                rng.next() * 360.0 - 180.0,
                rng.next() * 170.0 - 85.0,
            ]))),
            id: None,
            properties: None,
            foreign_members: None,
        })
        .collect()
}

fn benchmark_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");

    let small = synthetic_lines(50, 100);
    group.bench_function("build_50_lines", |b| {
        b.iter(|| TileIndex::new(black_box(&small), Config::default()).unwrap())
    });

    let large = synthetic_lines(200, 500);
    group.sample_size(20);
    group.bench_function("build_200_lines", |b| {
        b.iter(|| TileIndex::new(black_box(&large), Config::default()).unwrap())
    });

    group.finish();
}

fn benchmark_tile_serving(c: &mut Criterion) {
    let mut group = c.benchmark_group("tile_serving");

    let data = synthetic_lines(100, 200);

    // cached lookup: the eagerly built root
    let mut index = TileIndex::new(&data, Config::default()).unwrap();
    let _ = index.get_tile(0, 0, 0);
    group.bench_function("get_cached_root", |b| {
        b.iter(|| index.get_tile(black_box(0), 0, 0).map(|t| t.features.len()))
    });

    // drill-down: a fresh index per iteration batch keeps the cache cold
    group.sample_size(30);
    group.bench_function("drill_down_z10", |b| {
        b.iter_batched(
            || TileIndex::new(&data, Config::default().with_index_max_zoom(2)).unwrap(),
            |mut index| index.get_tile(black_box(10), 512, 512).map(|t| t.features.len()),
            criterion::BatchSize::LargeInput,
        )
    });

    group.finish();
}

fn benchmark_range_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_queries");

    let index = RangeIndex::new(synthetic_points(10_000));
    let viewport = Rect::new(Coord { x: -10.0, y: -10.0 }, Coord { x: 10.0, y: 10.0 });

    group.bench_function("query_10k_points", |b| {
        b.iter(|| index.query(black_box(&viewport)))
    });

    group.bench_function("count_10k_points", |b| {
        b.iter(|| index.count(black_box(&viewport)))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_index_build,
    benchmark_tile_serving,
    benchmark_range_queries
);
criterion_main!(benches);
