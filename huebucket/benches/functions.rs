use criterion::{
	black_box, criterion_group, criterion_main, measurement::WallTime, BenchmarkGroup, BenchmarkId, Criterion,
	SamplingMode,
};
use huebucket::{PixelBuffer, RunOptions};
use rand::{Rng, SeedableRng};
use std::time::Duration;

const SIZES: [(u32, u32); 3] = [(200, 200), (480, 270), (1920, 1080)];

/// Noisy blobs of a few hundred base colors, so both the raw and deduplicated counts are realistic
fn synthetic_image(width: u32, height: u32) -> Vec<u8> {
	let mut rng = rand_xoshiro::Xoshiro256PlusPlus::seed_from_u64(0);
	let bases = (0..256).map(|_| rng.gen::<[u8; 3]>()).collect::<Vec<_>>();

	(0..width * height)
		.flat_map(|i| {
			let (x, y) = (i % width, i / width);
			let [r, g, b] = bases[((x / 16 + y / 16 * 7) % 256) as usize];
			let noise = rng.gen_range(0..8);
			[r.saturating_add(noise), g.saturating_sub(noise), b, 255]
		})
		.collect()
}

fn create_group<'a>(c: &'a mut Criterion, name: &'a str) -> BenchmarkGroup<'a, WallTime> {
	let mut group = c.benchmark_group(name);
	group
		.sample_size(30)
		.noise_threshold(0.05)
		.sampling_mode(SamplingMode::Flat)
		.warm_up_time(Duration::from_millis(500));
	group
}

fn scan(c: &mut Criterion) {
	let mut group = create_group(c, "scan");

	for (width, height) in SIZES {
		let data = synthetic_image(width, height);
		let buffer = PixelBuffer::new(&data, width, height).expect("valid buffer");
		let id = format!("{width}x{height}");

		group.bench_with_input(BenchmarkId::new("analysis", &id), &buffer, |b, buffer| {
			b.iter(|| huebucket::scan(buffer, black_box(false), None));
		});

		let filter = Some(huebucket::CategorySet::all());
		group.bench_with_input(BenchmarkId::new("extraction", &id), &buffer, |b, buffer| {
			b.iter(|| huebucket::scan(buffer, black_box(false), black_box(filter)));
		});

		group.bench_with_input(BenchmarkId::new("parallel", &id), &buffer, |b, buffer| {
			b.iter(|| huebucket::scan_par(buffer, black_box(false), None));
		});
	}
}

fn aggregate(c: &mut Criterion) {
	let mut group = create_group(c, "aggregate");
	group.measurement_time(Duration::from_secs(4));

	let data = synthetic_image(1920, 1080);
	let buffer = PixelBuffer::new(&data, 1920, 1080).expect("valid buffer");
	let sorted = huebucket::scan(&buffer, false, None).colors.sorted_by_count();

	for threshold in [5.0, 10.0, 30.0] {
		group.bench_with_input(BenchmarkId::from_parameter(threshold), &sorted, |b, sorted| {
			b.iter(|| huebucket::aggregate(sorted, black_box(threshold)));
		});
	}
}

fn estimate(c: &mut Criterion) {
	let mut group = create_group(c, "estimate");

	let data = synthetic_image(1920, 1080);
	let buffer = PixelBuffer::new(&data, 1920, 1080).expect("valid buffer");
	let colors = huebucket::scan(&buffer, false, None).colors;

	group.bench_function("1920x1080", |b| {
		let mut rng = rand_xoshiro::Xoshiro256PlusPlus::seed_from_u64(0);
		b.iter(|| huebucket::estimate_unique_count(colors.colors(), black_box(10.0), &mut rng));
	});
}

fn all_steps(c: &mut Criterion) {
	let mut group = create_group(c, "all steps");
	group.measurement_time(Duration::from_secs(8));

	let options = RunOptions { extract_gradients: true, ..RunOptions::default() };

	for (width, height) in SIZES {
		let data = synthetic_image(width, height);
		let buffer = PixelBuffer::new(&data, width, height).expect("valid buffer");
		let id = format!("{width}x{height}");

		group.bench_with_input(BenchmarkId::new("analyze", &id), &buffer, |b, buffer| {
			b.iter(|| huebucket::analyze(buffer, black_box(&options)));
		});

		group.bench_with_input(BenchmarkId::new("extract", &id), &buffer, |b, buffer| {
			b.iter(|| huebucket::extract(buffer, black_box(&options)));
		});

		group.bench_with_input(BenchmarkId::new("extract_par", &id), &buffer, |b, buffer| {
			b.iter(|| huebucket::extract_par(buffer, black_box(&options)));
		});
	}
}

criterion_group!(benches, scan, aggregate, estimate, all_steps);
criterion_main!(benches);
