//! Color records and the per-category limiting of deduplicated colors

use crate::{
	category::{classify, Category, CategorySet},
	convert::{rgb_to_decimal, rgb_to_hex},
};
use palette::Srgb;
use std::collections::BTreeMap;

/// The records kept for each category, iterated in report order
pub type CategoryResults = BTreeMap<Category, Vec<ColorRecord>>;

/// A color in a result, in every form a report may need
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRecord {
	/// The color itself
	pub rgb: Srgb<u8>,
	/// Lowercase `#rrggbb`
	pub hex: String,
	/// `r * 65536 + g * 256 + b`
	pub decimal: u32,
	/// The number of pixels this color stands for
	pub count: u32,
	/// Share of all counted pixels, in percent.
	///
	/// `None` for gradient colors, which have no meaningful share.
	pub percentage: Option<f64>,
}

impl ColorRecord {
	/// A record without a percentage
	#[must_use]
	pub fn new(rgb: Srgb<u8>, count: u32) -> Self {
		Self {
			rgb,
			hex: rgb_to_hex(rgb),
			decimal: rgb_to_decimal(rgb),
			count,
			percentage: None,
		}
	}

	/// A record whose percentage is `count / total * 100`.
	///
	/// `total` must be greater than zero.
	#[must_use]
	pub fn with_percentage(rgb: Srgb<u8>, count: u32, total: u32) -> Self {
		debug_assert!(total > 0);
		Self {
			percentage: Some(f64::from(count) / f64::from(total) * 100.0),
			..Self::new(rgb, count)
		}
	}

	/// The percentage with two decimals, or `N/A` if there is none
	#[must_use]
	pub fn percentage_text(&self) -> String {
		self.percentage.map_or_else(|| "N/A".to_owned(), |p| format!("{p:.2}"))
	}

	/// The category of this record's color
	#[must_use]
	pub fn category(&self) -> Category {
		classify(self.rgb)
	}
}

/// Sort deduplicated colors into the selected categories, keeping at most `max_per_category` in each.
///
/// `colors` must be sorted by descending count, and each list keeps that order.
/// Every selected category gets an entry, even if no color falls into it.
/// Colors in a category that is full or not selected are dropped.
///
/// Percentages are relative to `total_pixels`.
#[must_use]
pub fn rank_and_limit(
	colors: &[(Srgb<u8>, u32)],
	selected: CategorySet,
	max_per_category: u32,
	total_pixels: u32,
) -> CategoryResults {
	let mut results = selected.iter().map(|category| (category, Vec::new())).collect::<CategoryResults>();

	let mut dropped = 0;
	for &(color, count) in colors {
		match results.get_mut(&classify(color)) {
			Some(records) if records.len() < max_per_category as usize => {
				records.push(ColorRecord::with_percentage(color, count, total_pixels));
			},
			_ => dropped += 1,
		}
	}

	log::debug!(
		"kept {} colors across {} categories, dropped {dropped}",
		colors.len() - dropped,
		results.len()
	);

	results
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::aggregate;
	use rand::{Rng, SeedableRng};
	use std::cmp::Reverse;

	#[test]
	fn record_fields() {
		let record = ColorRecord::with_percentage(Srgb::new(255, 0, 0), 1, 3);
		assert_eq!(record.hex, "#ff0000");
		assert_eq!(record.decimal, 16_711_680);
		assert_eq!(record.percentage_text(), "33.33");
		assert_eq!(record.category(), Category::Red);

		let record = ColorRecord::new(Srgb::new(0, 0, 0), 7);
		assert_eq!(record.percentage, None);
		assert_eq!(record.percentage_text(), "N/A");
	}

	#[test]
	fn percentage_rounds_to_two_decimals() {
		assert_eq!(ColorRecord::with_percentage(Srgb::new(0, 0, 0), 2, 3).percentage_text(), "66.67");
		assert_eq!(ColorRecord::with_percentage(Srgb::new(0, 0, 0), 5, 5).percentage_text(), "100.00");
	}

	#[test]
	fn every_selected_category_is_present() {
		let selected = [Category::Red, Category::Blue, Category::Brown].into_iter().collect::<CategorySet>();
		let results = rank_and_limit(&[(Srgb::new(255, 0, 0), 4)], selected, 5, 4);

		assert_eq!(results.keys().copied().collect::<Vec<_>>(), vec![Category::Red, Category::Blue, Category::Brown]);
		assert_eq!(results[&Category::Red].len(), 1);
		assert!(results[&Category::Blue].is_empty());
		assert!(results[&Category::Brown].is_empty());
	}

	#[test]
	fn unselected_and_overflowing_colors_are_dropped() {
		let colors = [
			(Srgb::new(255, 0, 0), 10),
			(Srgb::new(0, 255, 0), 9),
			(Srgb::new(200, 0, 0), 8),
			(Srgb::new(230, 0, 0), 7),
		];
		let selected = [Category::Red].into_iter().collect();
		let results = rank_and_limit(&colors, selected, 2, 34);

		assert_eq!(results.len(), 1);
		let reds = results[&Category::Red].iter().map(|r| (r.rgb, r.count)).collect::<Vec<_>>();
		assert_eq!(reds, vec![(Srgb::new(255, 0, 0), 10), (Srgb::new(200, 0, 0), 8)]);
	}

	#[test]
	fn empty_selection_gives_empty_results() {
		let results = rank_and_limit(&[(Srgb::new(255, 0, 0), 1)], CategorySet::empty(), 5, 1);
		assert!(results.is_empty());
	}

	#[test]
	fn lists_are_limited_sorted_and_correctly_classified() {
		let mut rng = rand_xoshiro::Xoshiro256PlusPlus::seed_from_u64(5);
		let mut colors = (0..3000)
			.map(|_| (Srgb::new(rng.gen(), rng.gen(), rng.gen()), rng.gen_range(1..1000)))
			.collect::<Vec<(Srgb<u8>, u32)>>();
		colors.sort_by_key(|&(_, n)| Reverse(n));
		let reps = aggregate(&colors, 20.0);
		let total = reps.iter().map(|&(_, n)| n).sum();

		for max in [1, 3, 20] {
			let results = rank_and_limit(&reps, CategorySet::all(), max, total);
			assert_eq!(results.len(), 20);
			for (&category, records) in &results {
				assert!(records.len() <= max as usize);
				assert!(records.windows(2).all(|w| w[0].count >= w[1].count));
				assert!(records.iter().all(|r| r.category() == category));
			}
		}
	}
}
