//! Counts the colors of an RGBA pixel buffer, skipping transparent and background pixels

use crate::{
	category::{classify, Category, CategorySet},
	convert::rgb_to_decimal,
	AnalysisError, Result,
};
use image::RgbaImage;
use palette::{Srgb, Srgba};
use std::{
	cmp::Reverse,
	collections::{BTreeMap, HashMap},
	sync::atomic::{AtomicU8, Ordering},
};

#[cfg(feature = "threads")]
use {rayon::prelude::*, std::sync::Mutex};

/// Pixels with an alpha below this are treated as fully transparent and skipped
pub const ALPHA_CUTOFF: u8 = 128;

/// With background removal enabled, pixels with all three components above this are skipped
pub const BACKGROUND_CUTOFF: u8 = 240;

/// The number of image rows scanned between progress reports
const BAND_ROWS: usize = 64;

/// The number of pixels of each category
pub type CategoryCounts = BTreeMap<Category, u32>;

/// A borrowed, validated RGBA8 image
#[derive(Debug, Clone, Copy)]
pub struct PixelBuffer<'a> {
	/// The pixels in row-major order
	pixels: &'a [Srgba<u8>],
	/// Width in pixels
	width: u32,
	/// Height in pixels
	height: u32,
}

impl<'a> PixelBuffer<'a> {
	/// Wrap interleaved `[r, g, b, a, r, g, b, a, ...]` bytes.
	///
	/// # Errors
	/// Returns an error if `data` is empty, either dimension is zero,
	/// the image would have more than `u32::MAX` pixels,
	/// or `data.len()` is not `width * height * 4`.
	pub fn new(data: &'a [u8], width: u32, height: u32) -> Result<Self> {
		if data.is_empty() {
			return Err(AnalysisError::EmptyBuffer);
		}
		if width == 0 || height == 0 {
			return Err(AnalysisError::InvalidDimensions { width, height });
		}

		let pixels = u64::from(width) * u64::from(height);
		if pixels > u64::from(u32::MAX) {
			return Err(AnalysisError::TooManyPixels { pixels });
		}

		let expected = pixels * 4;
		if data.len() as u64 != expected {
			return Err(AnalysisError::BufferSizeMismatch {
				width,
				height,
				expected,
				actual: data.len(),
			});
		}

		Ok(Self {
			pixels: palette::cast::from_component_slice(data),
			width,
			height,
		})
	}

	/// Wrap the pixels of a decoded image.
	///
	/// # Errors
	/// See [`PixelBuffer::new`].
	pub fn from_image(image: &'a RgbaImage) -> Result<Self> {
		Self::new(image.as_raw(), image.width(), image.height())
	}

	/// Width in pixels
	#[must_use]
	pub const fn width(&self) -> u32 {
		self.width
	}

	/// Height in pixels
	#[must_use]
	pub const fn height(&self) -> u32 {
		self.height
	}

	/// The number of pixels in the image
	#[must_use]
	pub const fn num_pixels(&self) -> u32 {
		// checked in `new`
		self.width * self.height
	}

	/// All pixels in row-major order
	#[must_use]
	pub const fn pixels(&self) -> &'a [Srgba<u8>] {
		self.pixels
	}

	/// The rows of the image, top to bottom
	pub fn rows(&self) -> impl Iterator<Item = &'a [Srgba<u8>]> {
		self.pixels.chunks_exact(self.width as usize)
	}

	/// The number of pixels in a band of [`BAND_ROWS`] rows
	fn band_len(&self) -> usize {
		self.width as usize * BAND_ROWS
	}
}

/// Unique colors in first-seen order, each with the number of times it occurred
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorCounts {
	/// The unique colors
	colors: Vec<Srgb<u8>>,
	/// The number of occurrences of each color
	counts: Vec<u32>,
	/// Packed color -> index into `colors` and `counts`
	memo: HashMap<u32, u32>,
}

impl ColorCounts {
	/// Create an empty `ColorCounts`
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Count one more occurrence of `color`
	pub fn add(&mut self, color: Srgb<u8>) {
		self.add_count(color, 1);
	}

	/// Count `n` more occurrences of `color`
	pub fn add_count(&mut self, color: Srgb<u8>, n: u32) {
		let Self { colors, counts, memo } = self;
		let index = *memo.entry(rgb_to_decimal(color)).or_insert_with(|| {
			// there are only 2^24 unique colors
			#[allow(clippy::cast_possible_truncation)]
			let index = colors.len() as u32;
			colors.push(color);
			counts.push(0);
			index
		});

		counts[index as usize] += n;
	}

	/// Add all counts from `other`, keeping this set's colors first
	pub fn merge(&mut self, other: &Self) {
		for (color, n) in other.pairs() {
			self.add_count(color, n);
		}
	}

	/// The unique colors, in the order they were first seen
	#[must_use]
	pub fn colors(&self) -> &[Srgb<u8>] {
		&self.colors
	}

	/// The count of each color in [`ColorCounts::colors`]
	#[must_use]
	pub fn counts(&self) -> &[u32] {
		&self.counts
	}

	/// The number of occurrences of `color`, if it was seen at all
	#[must_use]
	pub fn get(&self, color: Srgb<u8>) -> Option<u32> {
		self.memo
			.get(&rgb_to_decimal(color))
			.map(|&index| self.counts[index as usize])
	}

	/// Each color with its count
	pub fn pairs(&self) -> impl Iterator<Item = (Srgb<u8>, u32)> + '_ {
		self.colors.iter().copied().zip(self.counts.iter().copied())
	}

	/// The number of unique colors
	#[must_use]
	pub fn num_colors(&self) -> u32 {
		#[allow(clippy::cast_possible_truncation)]
		{
			self.colors.len() as u32
		}
	}

	/// Whether no colors have been counted
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.colors.is_empty()
	}

	/// The sum of all counts
	#[must_use]
	pub fn total_count(&self) -> u32 {
		self.counts.iter().sum()
	}

	/// A copy containing only the colors for which `keep` returns `true`
	#[must_use]
	pub fn filtered(&self, mut keep: impl FnMut(Srgb<u8>) -> bool) -> Self {
		let mut filtered = Self::new();
		for (color, n) in self.pairs().filter(|&(color, _)| keep(color)) {
			filtered.add_count(color, n);
		}
		filtered
	}

	/// Each color with its count, sorted by descending count.
	///
	/// Colors with equal counts stay in first-seen order.
	#[must_use]
	pub fn sorted_by_count(&self) -> Vec<(Srgb<u8>, u32)> {
		let mut pairs = self.pairs().collect::<Vec<_>>();
		pairs.sort_by_key(|&(_, n)| Reverse(n));
		pairs
	}
}

impl FromIterator<Srgb<u8>> for ColorCounts {
	fn from_iter<I: IntoIterator<Item = Srgb<u8>>>(iter: I) -> Self {
		let mut counts = Self::new();
		for color in iter {
			counts.add(color);
		}
		counts
	}
}

/// Receives the percentage of rows scanned so far
pub trait Progress: Sync {
	/// Called with a value in `0..=100` that never decreases during a scan
	fn report(&self, percent: u8);
}

impl Progress for () {
	fn report(&self, _: u8) {}
}

impl Progress for AtomicU8 {
	fn report(&self, percent: u8) {
		self.fetch_max(percent, Ordering::Relaxed);
	}
}

/// The outcome of scanning a [`PixelBuffer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
	/// The counted colors.
	///
	/// When scanning with a category filter, this holds only colors in those categories.
	pub colors: ColorCounts,
	/// The number of pixels that were neither transparent nor removed as background
	pub total_pixels: u32,
	/// The number of counted pixels in each category, only present when scanning without a filter
	pub category_counts: Option<CategoryCounts>,
}

impl ScanResult {
	/// Apply the category filter, or tally categories if there is no filter
	fn finish(colors: ColorCounts, total_pixels: u32, filter: Option<CategorySet>) -> Self {
		// Classifying each unique color once gives the same result as classifying every pixel
		match filter {
			Some(selected) => Self {
				colors: colors.filtered(|color| selected.contains(classify(color))),
				total_pixels,
				category_counts: None,
			},
			None => {
				let mut category_counts = CategoryCounts::new();
				for (color, n) in colors.pairs() {
					*category_counts.entry(classify(color)).or_insert(0) += n;
				}

				Self {
					colors,
					total_pixels,
					category_counts: Some(category_counts),
				}
			},
		}
	}
}

/// Whether a color is bright enough in every component to count as background
fn is_background(color: Srgb<u8>) -> bool {
	color.red > BACKGROUND_CUTOFF && color.green > BACKGROUND_CUTOFF && color.blue > BACKGROUND_CUTOFF
}

/// Count the colors of the surviving pixels in `pixels`, returning the number of surviving pixels
fn scan_band(pixels: &[Srgba<u8>], remove_background: bool, colors: &mut ColorCounts) -> u32 {
	let mut total = 0;
	for pixel in pixels {
		if pixel.alpha < ALPHA_CUTOFF {
			continue;
		}

		let color = pixel.color;
		if remove_background && is_background(color) {
			continue;
		}

		total += 1;
		colors.add(color);
	}
	total
}

/// The percentage of `height` that `rows` makes up
fn percent_of(rows: usize, height: u32) -> u8 {
	// rows <= height
	#[allow(clippy::cast_possible_truncation)]
	{
		(rows as u64 * 100 / u64::from(height)) as u8
	}
}

/// Scan every pixel of `buffer`.
///
/// Pixels with an alpha below [`ALPHA_CUTOFF`] are skipped entirely.
/// If `remove_background` is set, pixels whose components are all above [`BACKGROUND_CUTOFF`]
/// are skipped as well. Every other pixel counts toward [`ScanResult::total_pixels`].
///
/// With a `filter`, only colors in the selected categories are kept in [`ScanResult::colors`].
/// Without one, every color is kept and [`ScanResult::category_counts`] is filled in.
#[must_use]
pub fn scan(buffer: &PixelBuffer, remove_background: bool, filter: Option<CategorySet>) -> ScanResult {
	scan_with_progress(buffer, remove_background, filter, &())
}

/// [`scan`], reporting progress after each band of rows.
#[must_use]
pub fn scan_with_progress(
	buffer: &PixelBuffer,
	remove_background: bool,
	filter: Option<CategorySet>,
	progress: &dyn Progress,
) -> ScanResult {
	let mut colors = ColorCounts::new();
	let mut total_pixels = 0;
	let mut rows = 0;

	for band in buffer.pixels().chunks(buffer.band_len()) {
		total_pixels += scan_band(band, remove_background, &mut colors);
		rows += band.len() / buffer.width() as usize;
		progress.report(percent_of(rows, buffer.height()));
		log::trace!("scanned {rows} of {} rows", buffer.height());
	}

	log::debug!(
		"scanned {total_pixels} of {} pixels, found {} raw colors",
		buffer.num_pixels(),
		colors.num_colors()
	);

	ScanResult::finish(colors, total_pixels, filter)
}

/// [`scan`], with bands of rows scanned in parallel.
///
/// The result is identical to [`scan`]: band results are merged in image order.
#[cfg(feature = "threads")]
#[must_use]
pub fn scan_par(buffer: &PixelBuffer, remove_background: bool, filter: Option<CategorySet>) -> ScanResult {
	scan_par_with_progress(buffer, remove_background, filter, &())
}

/// [`scan_par`], reporting progress as bands complete.
#[cfg(feature = "threads")]
#[must_use]
pub fn scan_par_with_progress(
	buffer: &PixelBuffer,
	remove_background: bool,
	filter: Option<CategorySet>,
	progress: &dyn Progress,
) -> ScanResult {
	// reports happen under the lock so they reach `progress` in increasing order
	let rows_done = Mutex::new(0);

	let bands = buffer
		.pixels()
		.par_chunks(buffer.band_len())
		.map(|band| {
			let mut colors = ColorCounts::new();
			let total = scan_band(band, remove_background, &mut colors);

			// only poisoned if a report panicked, which already fails the scan
			if let Ok(mut rows) = rows_done.lock() {
				*rows += band.len() / buffer.width() as usize;
				progress.report(percent_of(*rows, buffer.height()));
			}

			(colors, total)
		})
		.collect::<Vec<_>>();

	let mut colors = ColorCounts::new();
	let mut total_pixels = 0;
	for (band_colors, band_total) in &bands {
		colors.merge(band_colors);
		total_pixels += band_total;
	}

	log::debug!(
		"scanned {total_pixels} of {} pixels in {} bands, found {} raw colors",
		buffer.num_pixels(),
		bands.len(),
		colors.num_colors()
	);

	ScanResult::finish(colors, total_pixels, filter)
}
