//! Detection of colors on either side of sharp horizontal transitions

use crate::{convert::is_beyond, rank::ColorRecord, scan::ALPHA_CUTOFF, ColorCounts, PixelBuffer};
use palette::Srgba;

#[cfg(feature = "threads")]
use rayon::prelude::*;

/// Count the endpoints of every jump in `row` larger than the threshold
fn scan_row(row: &[Srgba<u8>], threshold_sq: f32, participants: &mut ColorCounts) {
	for pair in row.windows(2) {
		let (left, right) = (pair[0], pair[1]);
		if left.alpha < ALPHA_CUTOFF || right.alpha < ALPHA_CUTOFF {
			continue;
		}

		if is_beyond(left.color, right.color, threshold_sq) {
			participants.add(left.color);
			participants.add(right.color);
		}
	}
}

/// Turn the participant counts into records ranked by descending count
fn into_records(participants: &ColorCounts) -> Vec<ColorRecord> {
	log::debug!("found {} gradient colors", participants.num_colors());

	participants
		.sorted_by_count()
		.into_iter()
		.map(|(color, count)| ColorRecord::new(color, count))
		.collect()
}

/// Find the colors that take part in sharp transitions.
///
/// Every pair of horizontally adjacent pixels where both are at least [`ALPHA_CUTOFF`] opaque
/// and their distance is above `threshold` counts once for each of its two colors.
/// Vertical neighbors are not compared.
///
/// The records have no percentage and are sorted by descending count,
/// with ties in the order the colors were first seen.
#[must_use]
pub fn detect_gradients(buffer: &PixelBuffer, threshold: f32) -> Vec<ColorRecord> {
	let threshold_sq = threshold * threshold;
	let mut participants = ColorCounts::new();
	for row in buffer.rows() {
		scan_row(row, threshold_sq, &mut participants);
	}
	into_records(&participants)
}

/// [`detect_gradients`], with rows compared in parallel.
#[cfg(feature = "threads")]
#[must_use]
pub fn detect_gradients_par(buffer: &PixelBuffer, threshold: f32) -> Vec<ColorRecord> {
	let threshold_sq = threshold * threshold;
	let rows = buffer
		.pixels()
		.par_chunks(buffer.width() as usize)
		.map(|row| {
			let mut participants = ColorCounts::new();
			scan_row(row, threshold_sq, &mut participants);
			participants
		})
		.collect::<Vec<_>>();

	let mut participants = ColorCounts::new();
	for row in &rows {
		participants.merge(row);
	}
	into_records(&participants)
}
