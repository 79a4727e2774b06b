//! Greedy merging of near-identical colors

use crate::convert::is_within;
use palette::Srgb;
use std::cmp::Reverse;

/// Run the greedy merge over `colors`, appending new representatives to `reps`.
pub(crate) fn merge_into(
	reps: &mut Vec<(Srgb<u8>, u32)>,
	colors: impl IntoIterator<Item = (Srgb<u8>, u32)>,
	threshold: f32,
) {
	let threshold_sq = threshold * threshold;
	for (color, n) in colors {
		match reps.iter_mut().find(|(rep, _)| is_within(color, *rep, threshold_sq)) {
			Some((_, count)) => *count += n,
			None => reps.push((color, n)),
		}
	}
}

/// Merge colors closer than `threshold` in RGB space.
///
/// `colors` must be sorted by descending count.
/// Each color is compared against the representatives accepted so far, in order,
/// and is merged into the first one whose distance is below `threshold`.
/// Otherwise, it becomes a new representative.
/// Merging adds the counts together but keeps the representative's color.
///
/// The returned representatives are sorted by descending merged count,
/// with ties left in the order they were accepted.
#[must_use]
pub fn aggregate(colors: &[(Srgb<u8>, u32)], threshold: f32) -> Vec<(Srgb<u8>, u32)> {
	debug_assert!(colors.windows(2).all(|w| w[0].1 >= w[1].1));

	let mut reps = Vec::new();
	merge_into(&mut reps, colors.iter().copied(), threshold);
	reps.sort_by_key(|&(_, n)| Reverse(n));

	log::debug!("merged {} colors into {} representatives", colors.len(), reps.len());

	reps
}
