//! A sampled estimate of how many colors would remain after deduplication

use crate::dedup::merge_into;
use palette::Srgb;
use rand::{seq::SliceRandom, Rng};

/// The most colors that are sampled for an estimate
pub const MAX_SAMPLE_SIZE: usize = 500;

/// Estimate the number of representatives [`aggregate`](crate::aggregate) would return for `colors`.
///
/// If there are at most [`MAX_SAMPLE_SIZE`] colors, all of them are merged in the given order
/// and `rng` is not used, so the estimate is the exact count.
/// Otherwise, [`MAX_SAMPLE_SIZE`] colors are sampled without replacement using `rng`,
/// and the fraction of the sample that becomes a representative under the greedy merge
/// is scaled up to the full number of colors.
///
/// Returns 0 only when `colors` is empty.
#[must_use]
pub fn estimate_unique_count(colors: &[Srgb<u8>], threshold: f32, rng: &mut impl Rng) -> u32 {
	if colors.is_empty() {
		return 0;
	}

	let mut reps = Vec::new();
	if colors.len() <= MAX_SAMPLE_SIZE {
		merge_into(&mut reps, colors.iter().map(|&color| (color, 1)), threshold);
	} else {
		let sample = colors.choose_multiple(rng, MAX_SAMPLE_SIZE).map(|&color| (color, 1));
		merge_into(&mut reps, sample, threshold);
	}

	let sample_size = colors.len().min(MAX_SAMPLE_SIZE);

	// both lengths are < 2^24
	#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
	let estimate = {
		let ratio = reps.len() as f64 / sample_size as f64;
		(colors.len() as f64 * ratio).round() as u32
	};

	log::debug!(
		"{} of {sample_size} sampled colors are distinct, estimating {estimate} unique colors",
		reps.len()
	);

	estimate.max(1)
}
