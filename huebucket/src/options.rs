//! Per-run settings shared by analysis and extraction

use crate::{AnalysisError, CategorySet, Result};

/// Settings for a single analysis or extraction run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOptions {
	/// Colors closer than this in RGB space are merged.
	///
	/// Also the distance above which neighboring pixels count as a gradient.
	pub threshold: f32,
	/// Skip pixels that are nearly white in every component
	pub remove_background: bool,
	/// The categories to extract colors for
	pub selected_categories: CategorySet,
	/// The most colors kept per category
	pub max_colors_per_category: u32,
	/// Whether to also detect gradient colors
	pub extract_gradients: bool,
	/// Seed for the sampling done by the unique color estimate
	pub seed: u64,
}

impl Default for RunOptions {
	fn default() -> Self {
		Self {
			threshold: 10.0,
			remove_background: false,
			selected_categories: CategorySet::all(),
			max_colors_per_category: 20,
			extract_gradients: false,
			seed: 0,
		}
	}
}

impl RunOptions {
	/// Check the options before any pixels are scanned.
	///
	/// # Errors
	/// Returns an error if the threshold is not a positive finite number
	/// or if `max_colors_per_category` is zero.
	pub fn validate(&self) -> Result<()> {
		if !(self.threshold.is_finite() && self.threshold > 0.0) {
			return Err(AnalysisError::InvalidThreshold(self.threshold));
		}
		if self.max_colors_per_category == 0 {
			return Err(AnalysisError::InvalidMaxColors);
		}
		Ok(())
	}

	/// The most gradient colors kept
	#[must_use]
	pub const fn gradient_limit(&self) -> usize {
		self.max_colors_per_category as usize * 2
	}
}
