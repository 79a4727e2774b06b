//! Count, deduplicate, and categorize the colors of an image.
//!
//! # Examples
//!
//! ## Get the main colors of each category
//!
//! ```no_run
//! let image = image::open("some image").unwrap().into_rgba8();
//! let buffer = huebucket::PixelBuffer::from_image(&image).unwrap();
//! let result = huebucket::extract(&buffer, &huebucket::RunOptions::default()).unwrap();
//!
//! for (category, colors) in &result.categories {
//!     for color in colors {
//!         println!("{category}: {} ({}%)", color.hex, color.percentage_text());
//!     }
//! }
//! ```
//!
//! ## Get a quick overview of an image
//!
//! ```no_run
//! let image = image::open("some image").unwrap().into_rgba8();
//! let buffer = huebucket::PixelBuffer::from_image(&image).unwrap();
//! let result = huebucket::analyze(&buffer, &huebucket::RunOptions::default()).unwrap();
//!
//! println!("about {} unique colors", result.estimated_unique_count);
//! ```
//!
//! ## Only look for a few categories, including gradients
//!
//! ```no_run
//! use huebucket::{Category, RunOptions};
//!
//! let image = image::open("some image").unwrap().into_rgba8();
//! let buffer = huebucket::PixelBuffer::from_image(&image).unwrap();
//! let options = RunOptions {
//!     selected_categories: [Category::Blue, Category::PastelBlue].into_iter().collect(),
//!     extract_gradients: true,
//!     ..RunOptions::default()
//! };
//! let result = huebucket::extract(&buffer, &options).unwrap();
//! ```
//!
//! # Pipeline
//!
//! Both [`analyze`] and [`extract`] start by scanning every pixel.
//! Pixels with an alpha below [`ALPHA_CUTOFF`] are skipped,
//! as are nearly white pixels if [`RunOptions::remove_background`] is set.
//!
//! [`analyze`] then counts the pixels in each [`Category`]
//! and estimates how many colors would remain after deduplication from a random sample
//! (see [`estimate_unique_count`]).
//!
//! [`extract`] only keeps the colors in [`RunOptions::selected_categories`],
//! merges colors closer than [`RunOptions::threshold`] (see [`aggregate`]),
//! and keeps the most common colors of each category (see [`rank_and_limit`]).
//! If [`RunOptions::extract_gradients`] is set, it also looks for colors on either side
//! of sharp horizontal transitions (see [`detect_gradients`]).
//!
//! ## Threshold
//!
//! This is a distance in RGB space, where each component is in `0..=255`.
//!
//! Around `10` merges colors that look the same.
//! Larger values merge more aggressively and give fewer, more distinct colors.
//!
//! ## Seed
//!
//! This is the value used to seed the random number generator which is used to sample colors
//! for the unique color estimate.
//! Extraction does no sampling, so it always gives the same result for the same input.
//!
//! ## Threads
//!
//! With the `threads` feature (enabled by default),
//! [`analyze_par`] and [`extract_par`] scan bands of rows in parallel using `rayon`.
//! Their results are identical to the single-threaded versions.

#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::cargo)]
#![warn(clippy::use_debug, clippy::dbg_macro, clippy::todo, clippy::unimplemented)]
#![warn(clippy::unwrap_used, clippy::unwrap_in_result)]
#![warn(clippy::unneeded_field_pattern, clippy::rest_pat_in_fully_bound_structs)]
#![warn(clippy::unnecessary_self_imports)]
#![warn(clippy::str_to_string, clippy::string_to_string, clippy::string_slice)]
#![warn(missing_docs, clippy::missing_docs_in_private_items, rustdoc::all)]
#![warn(clippy::float_cmp_const, clippy::lossy_float_literal)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::enum_glob_use)]
#![allow(clippy::unreadable_literal)]

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

mod category;
mod convert;
mod dedup;
mod error;
mod estimate;
mod gradient;
mod options;
mod rank;
mod scan;
mod session;

pub use category::{classify, classify_hsl, Category, CategorySet};
pub use convert::{decimal_to_rgb, hex_to_rgb, hue_degrees, rgb_to_decimal, rgb_to_hex, rgb_to_hsl, squared_distance};
pub use dedup::aggregate;
pub use error::{AnalysisError, ErrorKind, Result};
pub use estimate::{estimate_unique_count, MAX_SAMPLE_SIZE};
pub use gradient::detect_gradients;
pub use options::RunOptions;
pub use rank::{rank_and_limit, CategoryResults, ColorRecord};
pub use scan::{
	scan, scan_with_progress, CategoryCounts, ColorCounts, PixelBuffer, Progress, ScanResult, ALPHA_CUTOFF,
	BACKGROUND_CUTOFF,
};
pub use session::{ImageSession, Job, JobKind};

#[cfg(feature = "threads")]
pub use {
	gradient::detect_gradients_par,
	scan::{scan_par, scan_par_with_progress},
};

/// The overview produced by [`analyze`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
	/// The number of pixels that were counted
	pub total_pixels: u32,
	/// The number of distinct colors among the counted pixels
	pub raw_color_count: u32,
	/// The approximate number of colors left after deduplication
	pub estimated_unique_count: u32,
	/// The number of counted pixels in each category.
	///
	/// Categories with no pixels are absent.
	pub category_counts: CategoryCounts,
}

/// A summary of the largest categories of an [`AnalysisResult`]
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
	/// Category, pixel count, and percentage of all counted pixels, largest first
	pub entries: Vec<(Category, u32, f64)>,
	/// The number of categories past the `max_items` limit
	pub omitted: usize,
}

impl AnalysisResult {
	/// The categories that have at least one pixel, in report order
	pub fn available_categories(&self) -> impl Iterator<Item = Category> + '_ {
		self.category_counts
			.iter()
			.filter(|&(_, &count)| count > 0)
			.map(|(&category, _)| category)
	}

	/// The percentage of counted pixels in `category`
	#[must_use]
	pub fn percentage(&self, category: Category) -> f64 {
		match self.category_counts.get(&category) {
			Some(&count) if self.total_pixels > 0 => f64::from(count) / f64::from(self.total_pixels) * 100.0,
			_ => 0.0,
		}
	}

	/// Summarize the category counts, largest first.
	///
	/// Only the `max_items` largest categories are considered.
	/// Of those, categories below `min_percent` are left out, except for [`Category::Black`].
	/// Ties keep report order.
	#[must_use]
	pub fn distribution(&self, max_items: usize, min_percent: f64) -> Distribution {
		let mut counts = self.category_counts.iter().map(|(&c, &n)| (c, n)).collect::<Vec<_>>();
		counts.sort_by(|(_, x), (_, y)| y.cmp(x));

		let entries = counts
			.iter()
			.take(max_items)
			.map(|&(category, count)| (category, count, self.percentage(category)))
			.filter(|&(category, _, percent)| percent >= min_percent || category == Category::Black)
			.collect();

		Distribution {
			entries,
			omitted: counts.len().saturating_sub(max_items),
		}
	}
}

/// The colors produced by [`extract`]
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
	/// The kept colors of every selected category, plus [`Category::Gradients`] if any were found
	pub categories: CategoryResults,
	/// The number of records across all categories, gradients included
	pub final_unique_count: usize,
	/// The number of colors left after deduplication, before limiting each category
	pub deduplicated_count: usize,
	/// The number of pixels that were counted
	pub total_pixels: u32,
}

impl ExtractionResult {
	/// The categories with at least one record, in report order
	pub fn non_empty(&self) -> impl Iterator<Item = (Category, &[ColorRecord])> {
		self.categories
			.iter()
			.filter(|(_, records)| !records.is_empty())
			.map(|(&category, records)| (category, records.as_slice()))
	}
}

/// Estimate the unique colors of an unfiltered scan
fn finish_analysis(scan: ScanResult, options: &RunOptions) -> Result<AnalysisResult> {
	let Some(category_counts) = scan.category_counts else {
		return Err(AnalysisError::ComputationFault(
			"the analysis scan did not count categories".to_owned(),
		));
	};

	let mut rng = Xoshiro256PlusPlus::seed_from_u64(options.seed);
	let estimated_unique_count = estimate_unique_count(scan.colors.colors(), options.threshold, &mut rng);

	Ok(AnalysisResult {
		total_pixels: scan.total_pixels,
		raw_color_count: scan.colors.num_colors(),
		estimated_unique_count,
		category_counts,
	})
}

/// Deduplicate and rank the colors of a filtered scan
fn finish_extraction(scan: &ScanResult, options: &RunOptions, gradients: Option<Vec<ColorRecord>>) -> ExtractionResult {
	let sorted = scan.colors.sorted_by_count();
	let deduplicated = aggregate(&sorted, options.threshold);

	let mut categories = rank_and_limit(
		&deduplicated,
		options.selected_categories,
		options.max_colors_per_category,
		scan.total_pixels,
	);

	if let Some(mut gradients) = gradients {
		gradients.truncate(options.gradient_limit());
		if !gradients.is_empty() {
			categories.insert(Category::Gradients, gradients);
		}
	}

	let final_unique_count = categories.values().map(Vec::len).sum();
	log::info!(
		"extracted {final_unique_count} colors from {} deduplicated colors",
		deduplicated.len()
	);

	ExtractionResult {
		categories,
		final_unique_count,
		deduplicated_count: deduplicated.len(),
		total_pixels: scan.total_pixels,
	}
}

/// Count the pixels of each category and estimate the number of unique colors.
///
/// # Errors
/// Returns an error if `options` is invalid, see [`RunOptions::validate`].
pub fn analyze(buffer: &PixelBuffer, options: &RunOptions) -> Result<AnalysisResult> {
	analyze_with_progress(buffer, options, &())
}

/// [`analyze`], reporting scan progress to `progress`.
///
/// # Errors
/// See [`analyze`].
pub fn analyze_with_progress(
	buffer: &PixelBuffer,
	options: &RunOptions,
	progress: &dyn Progress,
) -> Result<AnalysisResult> {
	options.validate()?;
	let scan = scan_with_progress(buffer, options.remove_background, None, progress);
	finish_analysis(scan, options)
}

/// [`analyze`], scanning rows in parallel.
///
/// # Errors
/// See [`analyze`].
#[cfg(feature = "threads")]
pub fn analyze_par(buffer: &PixelBuffer, options: &RunOptions) -> Result<AnalysisResult> {
	analyze_par_with_progress(buffer, options, &())
}

/// [`analyze_par`], reporting scan progress to `progress`.
///
/// # Errors
/// See [`analyze`].
#[cfg(feature = "threads")]
pub fn analyze_par_with_progress(
	buffer: &PixelBuffer,
	options: &RunOptions,
	progress: &dyn Progress,
) -> Result<AnalysisResult> {
	options.validate()?;
	let scan = scan_par_with_progress(buffer, options.remove_background, None, progress);
	finish_analysis(scan, options)
}

/// Find the most common colors of each selected category, and optionally the gradient colors.
///
/// # Errors
/// Returns an error if `options` is invalid, see [`RunOptions::validate`].
pub fn extract(buffer: &PixelBuffer, options: &RunOptions) -> Result<ExtractionResult> {
	extract_with_progress(buffer, options, &())
}

/// [`extract`], reporting scan progress to `progress`.
///
/// # Errors
/// See [`extract`].
pub fn extract_with_progress(
	buffer: &PixelBuffer,
	options: &RunOptions,
	progress: &dyn Progress,
) -> Result<ExtractionResult> {
	options.validate()?;
	let scan = scan_with_progress(
		buffer,
		options.remove_background,
		Some(options.selected_categories),
		progress,
	);
	let gradients = options
		.extract_gradients
		.then(|| detect_gradients(buffer, options.threshold));

	Ok(finish_extraction(&scan, options, gradients))
}

/// [`extract`], scanning rows in parallel.
///
/// # Errors
/// See [`extract`].
#[cfg(feature = "threads")]
pub fn extract_par(buffer: &PixelBuffer, options: &RunOptions) -> Result<ExtractionResult> {
	extract_par_with_progress(buffer, options, &())
}

/// [`extract_par`], reporting scan progress to `progress`.
///
/// # Errors
/// See [`extract`].
#[cfg(feature = "threads")]
pub fn extract_par_with_progress(
	buffer: &PixelBuffer,
	options: &RunOptions,
	progress: &dyn Progress,
) -> Result<ExtractionResult> {
	options.validate()?;
	let scan = scan_par_with_progress(
		buffer,
		options.remove_background,
		Some(options.selected_categories),
		progress,
	);
	let gradients = options
		.extract_gradients
		.then(|| detect_gradients_par(buffer, options.threshold));

	Ok(finish_extraction(&scan, options, gradients))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
	use super::*;
	use palette::Srgb;

	fn rgba(pixels: &[[u8; 4]]) -> Vec<u8> {
		pixels.iter().flatten().copied().collect()
	}

	fn summary(records: &[ColorRecord]) -> Vec<(Srgb<u8>, u32)> {
		records.iter().map(|r| (r.rgb, r.count)).collect()
	}

	/// Blocks of a few base colors with slight noise, plus some transparent pixels
	fn test_image(width: u32, height: u32) -> Vec<u8> {
		let bases = [[200, 30, 30], [30, 60, 200], [240, 240, 240], [20, 20, 20], [120, 80, 40]];
		(0..width * height)
			.flat_map(|i| {
				let (x, y) = (i % width, i / width);
				let [r, g, b] = bases[((x / 7 + y / 5) % 5) as usize];
				#[allow(clippy::cast_possible_truncation)]
				let noise = ((x * 31 + y * 17) % 5) as u8;
				let alpha = if (x + y) % 13 == 0 { 0 } else { 255 };
				[r + noise, g + noise, b + noise, alpha]
			})
			.collect()
	}

	#[test]
	fn red_and_green() {
		let data = rgba(&[[255, 0, 0, 255], [0, 255, 0, 255]]);
		let buffer = PixelBuffer::new(&data, 2, 1).unwrap();
		let options = RunOptions::default();

		let analysis = analyze(&buffer, &options).unwrap();
		assert_eq!(analysis.total_pixels, 2);
		assert_eq!(analysis.raw_color_count, 2);
		assert_eq!(analysis.estimated_unique_count, 2);
		assert_eq!(
			analysis.category_counts,
			[(Category::Red, 1), (Category::Green, 1)].into_iter().collect::<CategoryCounts>()
		);
		assert_eq!(
			analysis.available_categories().collect::<Vec<_>>(),
			vec![Category::Red, Category::Green]
		);

		let extraction = extract(&buffer, &options).unwrap();
		assert_eq!(extraction.total_pixels, 2);
		assert_eq!(extraction.deduplicated_count, 2);
		assert_eq!(extraction.final_unique_count, 2);
		assert_eq!(extraction.categories.len(), 20);
		assert_eq!(summary(&extraction.categories[&Category::Red]), vec![(Srgb::new(255, 0, 0), 1)]);
		assert_eq!(summary(&extraction.categories[&Category::Green]), vec![(Srgb::new(0, 255, 0), 1)]);
		assert_eq!(extraction.categories[&Category::Red][0].percentage_text(), "50.00");
		assert_eq!(
			extraction.non_empty().map(|(c, _)| c).collect::<Vec<_>>(),
			vec![Category::Red, Category::Green]
		);
	}

	#[test]
	fn all_transparent() {
		let data = rgba(&[[10, 200, 30, 0]; 12]);
		let buffer = PixelBuffer::new(&data, 4, 3).unwrap();
		let options = RunOptions { extract_gradients: true, ..RunOptions::default() };

		let analysis = analyze(&buffer, &options).unwrap();
		assert_eq!(analysis.total_pixels, 0);
		assert_eq!(analysis.raw_color_count, 0);
		assert_eq!(analysis.estimated_unique_count, 0);
		assert!(analysis.category_counts.is_empty());
		assert!(analysis.distribution(15, 0.1).entries.is_empty());

		let extraction = extract(&buffer, &options).unwrap();
		assert_eq!(extraction.total_pixels, 0);
		assert_eq!(extraction.final_unique_count, 0);
		assert!(!extraction.categories.contains_key(&Category::Gradients));
	}

	#[test]
	fn near_white_background_removed() {
		let data = rgba(&[[245, 250, 242, 255]; 300 * 200]);
		let buffer = PixelBuffer::new(&data, 300, 200).unwrap();
		let options = RunOptions { remove_background: true, ..RunOptions::default() };

		assert_eq!(analyze(&buffer, &options).unwrap().total_pixels, 0);
		assert_eq!(extract(&buffer, &options).unwrap().total_pixels, 0);

		let kept = RunOptions::default();
		assert_eq!(analyze(&buffer, &kept).unwrap().total_pixels, 300 * 200);
	}

	#[test]
	fn filter_keeps_total_pixels() {
		let data = rgba(&[[255, 0, 0, 255], [0, 0, 255, 255], [0, 0, 255, 255]]);
		let buffer = PixelBuffer::new(&data, 3, 1).unwrap();
		let options = RunOptions {
			selected_categories: [Category::Red].into_iter().collect(),
			..RunOptions::default()
		};

		let extraction = extract(&buffer, &options).unwrap();
		assert_eq!(extraction.total_pixels, 3);
		assert_eq!(extraction.categories.len(), 1);
		assert_eq!(extraction.categories[&Category::Red][0].percentage_text(), "33.33");
	}

	#[test]
	fn invalid_options_are_rejected_before_scanning() {
		let data = rgba(&[[255, 0, 0, 255]]);
		let buffer = PixelBuffer::new(&data, 1, 1).unwrap();

		let options = RunOptions { threshold: -1.0, ..RunOptions::default() };
		let error = analyze(&buffer, &options).unwrap_err();
		assert_eq!(error.kind(), ErrorKind::InvalidInput);

		let options = RunOptions { max_colors_per_category: 0, ..RunOptions::default() };
		assert!(matches!(extract(&buffer, &options), Err(AnalysisError::InvalidMaxColors)));
	}

	#[test]
	fn gradients_are_limited_and_appended() {
		// alternating black and white columns
		let data = (0..20 * 4)
			.flat_map(|i: u32| {
				let v: u8 = if i % 2 == 0 { 0 } else { 255 };
				let shade = u8::try_from(i % 20 / 2).unwrap();
				[v, v.saturating_sub(shade), v, 255]
			})
			.collect::<Vec<u8>>();
		let buffer = PixelBuffer::new(&data, 20, 4).unwrap();
		let options = RunOptions {
			extract_gradients: true,
			max_colors_per_category: 1,
			..RunOptions::default()
		};

		let extraction = extract(&buffer, &options).unwrap();
		let gradients = &extraction.categories[&Category::Gradients];
		assert_eq!(gradients.len(), 2);
		assert!(gradients.iter().all(|r| r.percentage.is_none()));

		let limited = extraction
			.categories
			.iter()
			.filter(|&(&c, _)| c != Category::Gradients)
			.map(|(_, records)| records.len())
			.sum::<usize>();
		assert_eq!(extraction.final_unique_count, limited + 2);
		assert!(extraction.categories.keys().last() == Some(&Category::Gradients));
	}

	#[test]
	fn extraction_is_deterministic() {
		let data = test_image(90, 60);
		let buffer = PixelBuffer::new(&data, 90, 60).unwrap();
		let options = RunOptions { extract_gradients: true, threshold: 25.0, ..RunOptions::default() };

		let first = extract(&buffer, &options).unwrap();
		let second = extract(&buffer, &options).unwrap();
		assert_eq!(first, second);
		assert!(first.final_unique_count > 0);
	}

	#[test]
	fn same_seed_same_analysis() {
		let data = test_image(90, 60);
		let buffer = PixelBuffer::new(&data, 90, 60).unwrap();
		let options = RunOptions { seed: 123, ..RunOptions::default() };
		assert_eq!(analyze(&buffer, &options).unwrap(), analyze(&buffer, &options).unwrap());
	}

	#[test]
	fn category_counts_sum_to_total() {
		let data = test_image(90, 60);
		let buffer = PixelBuffer::new(&data, 90, 60).unwrap();
		let analysis = analyze(&buffer, &RunOptions::default()).unwrap();

		let opaque = data.chunks_exact(4).filter(|p| p[3] >= ALPHA_CUTOFF).count();
		assert_eq!(analysis.total_pixels as usize, opaque);
		assert_eq!(analysis.category_counts.values().sum::<u32>(), analysis.total_pixels);
	}

	#[test]
	fn distribution_summary() {
		let analysis = AnalysisResult {
			total_pixels: 10_000,
			raw_color_count: 4,
			estimated_unique_count: 4,
			category_counts: [
				(Category::Red, 5000),
				(Category::Blue, 4985),
				(Category::Black, 5),
				(Category::Green, 5),
				(Category::Cyan, 5),
			]
			.into_iter()
			.collect(),
		};

		let distribution = analysis.distribution(15, 0.1);
		let categories = distribution.entries.iter().map(|&(c, _, _)| c).collect::<Vec<_>>();
		assert_eq!(categories, vec![Category::Red, Category::Blue, Category::Black]);
		assert_eq!(distribution.omitted, 0);
		assert!((distribution.entries[0].2 - 50.0).abs() < 1e-9);

		let distribution = analysis.distribution(2, 0.0);
		assert_eq!(distribution.entries.len(), 2);
		assert_eq!(distribution.omitted, 3);
	}

	#[test]
	#[cfg(feature = "threads")]
	fn parallel_matches_sequential() {
		let data = test_image(150, 140);
		let buffer = PixelBuffer::new(&data, 150, 140).unwrap();
		let options = RunOptions {
			extract_gradients: true,
			remove_background: true,
			seed: 7,
			..RunOptions::default()
		};

		assert_eq!(analyze_par(&buffer, &options).unwrap(), analyze(&buffer, &options).unwrap());
		assert_eq!(extract_par(&buffer, &options).unwrap(), extract(&buffer, &options).unwrap());
	}
}
