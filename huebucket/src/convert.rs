//! Conversions between 8-bit sRGB colors and the HSL, hex, and decimal forms used in results

use crate::{AnalysisError, Result};
use palette::{FromColor, Hsl, Srgb};

/// Convert an sRGB color to HSL.
///
/// Saturation and lightness are in `0.0..=1.0`.
/// The hue is stored in degrees, use [`hue_degrees`] to get it in `0.0..360.0`
/// (divide by 360 for a normalized hue).
/// Achromatic colors have a hue and saturation of `0.0`.
#[must_use]
pub fn rgb_to_hsl(color: Srgb<u8>) -> Hsl {
	Hsl::from_color(color.into_format::<f32>())
}

/// The hue of an HSL color in degrees, in the range `0.0..360.0`.
#[must_use]
pub fn hue_degrees(hsl: Hsl) -> f32 {
	hsl.hue.into_positive_degrees()
}

/// Format a color as a lowercase `#rrggbb` hex code.
#[must_use]
pub fn rgb_to_hex(color: Srgb<u8>) -> String {
	format!("#{color:x}")
}

/// Parse a `#rrggbb` or `#rgb` hex code, with or without the leading `#`.
///
/// # Errors
/// Returns [`AnalysisError::InvalidHex`] if `hex` is not a 3 or 6 digit hex code.
pub fn hex_to_rgb(hex: &str) -> Result<Srgb<u8>> {
	// palette slices the digits by byte offsets
	if !hex.is_ascii() {
		return Err(AnalysisError::InvalidHex(hex.to_owned()));
	}

	hex.parse().map_err(|_| AnalysisError::InvalidHex(hex.to_owned()))
}

/// Pack a color into `r * 65536 + g * 256 + b`.
#[must_use]
pub fn rgb_to_decimal(color: Srgb<u8>) -> u32 {
	u32::from(color.red) << 16 | u32::from(color.green) << 8 | u32::from(color.blue)
}

/// Unpack a color from its decimal form. Bits above the lowest 24 are ignored.
#[must_use]
pub fn decimal_to_rgb(decimal: u32) -> Srgb<u8> {
	let [_, red, green, blue] = decimal.to_be_bytes();
	Srgb::new(red, green, blue)
}

/// Squared euclidean distance between two colors in RGB space.
///
/// The result is at most `3 * 255^2`.
#[must_use]
pub fn squared_distance(x: Srgb<u8>, y: Srgb<u8>) -> u32 {
	let dr = u32::from(x.red.abs_diff(y.red));
	let dg = u32::from(x.green.abs_diff(y.green));
	let db = u32::from(x.blue.abs_diff(y.blue));
	dr * dr + dg * dg + db * db
}

/// Whether the squared distance between two colors is strictly below `threshold_sq`.
#[must_use]
pub(crate) fn is_within(x: Srgb<u8>, y: Srgb<u8>, threshold_sq: f32) -> bool {
	// distances are < 2^24, so they are exact as f32
	#[allow(clippy::cast_precision_loss)]
	let dist = squared_distance(x, y) as f32;
	dist < threshold_sq
}

/// Whether the squared distance between two colors is strictly above `threshold_sq`.
#[must_use]
pub(crate) fn is_beyond(x: Srgb<u8>, y: Srgb<u8>, threshold_sq: f32) -> bool {
	#[allow(clippy::cast_precision_loss)]
	let dist = squared_distance(x, y) as f32;
	dist > threshold_sq
}
