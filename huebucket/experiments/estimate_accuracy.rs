//! Compares the sampled unique color estimate against the exact deduplicated count.

use clap::Parser;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;

#[path = "../util/util.rs"]
mod util;

#[derive(Parser)]
struct Options {
	#[arg(long, default_value_t = 32)]
	seeds: u32,

	#[arg(short, long, default_value = "5,10,30", value_delimiter = ',')]
	thresholds: Vec<f32>,

	images: Vec<PathBuf>,
}

fn main() {
	let options = Options::parse();

	let images = if options.images.is_empty() {
		util::load_image_dir(util::IMAGE_DIR)
	} else {
		util::load_images(&options.images)
	};

	let mut rng = rand_xoshiro::Xoshiro256PlusPlus::seed_from_u64(42);
	let seeds = (0..options.seeds).map(|_| rng.gen()).collect::<Vec<u64>>();

	// use char count as supplement for grapheme count
	let max_name_len = images.iter().map(|(name, _)| name.chars().count()).max().unwrap_or(0);

	const NUM_COL_WIDTH: usize = 16;

	println!(
		"{:width$} {}",
		"image",
		options
			.thresholds
			.iter()
			.map(|t| format!("{:<w$}", format!("t={t}"), w = NUM_COL_WIDTH))
			.collect::<Vec<_>>()
			.join(" "),
		width = max_name_len,
	);

	for (name, image) in images {
		let sorted = util::sorted_colors(&image);
		let colors = sorted.iter().map(|&(color, _)| color).collect::<Vec<_>>();

		let columns = options
			.thresholds
			.iter()
			.map(|&threshold| {
				let exact = huebucket::aggregate(&sorted, threshold).len();

				let mean = seeds
					.iter()
					.map(|&seed| {
						let mut rng = rand_xoshiro::Xoshiro256PlusPlus::seed_from_u64(seed);
						f64::from(huebucket::estimate_unique_count(&colors, threshold, &mut rng))
					})
					.sum::<f64>() / f64::from(options.seeds);

				#[allow(clippy::cast_precision_loss)]
				let error = (mean - exact as f64) / (exact.max(1) as f64) * 100.0;

				format!("{:>width$}", format!("{exact} {error:+.1}%"), width = NUM_COL_WIDTH)
			})
			.collect::<Vec<_>>();

		println!("{:width$} {}", name, columns.join(" "), width = max_name_len);
	}
}
