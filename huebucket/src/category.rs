//! Named color categories and the HSL rules that sort a color into one

use crate::{convert::hue_degrees, AnalysisError};
use palette::{Hsl, Srgb};
use std::{cmp::Ordering, fmt, str::FromStr};

/// A threshold of `numerator / denominator`
#[derive(Debug, Clone, Copy)]
struct Ratio(u16, u16);

impl Ratio {
	/// The threshold as a float
	fn value(self) -> f32 {
		f32::from(self.0) / f32::from(self.1)
	}
}

/// Below this lightness every color is [`Category::Black`]
const BLACK_MAX_LIGHTNESS: Ratio = Ratio(1, 10);
/// Above this lightness every color is [`Category::White`]
const WHITE_MIN_LIGHTNESS: Ratio = Ratio(19, 20);
/// Below this saturation every remaining color is [`Category::Grey`]
const GREY_MAX_SATURATION: Ratio = Ratio(1, 10);

/// Pastel colors are lighter than this...
const PASTEL_MIN_LIGHTNESS: Ratio = Ratio(7, 10);
/// ...and less saturated than this
const PASTEL_MAX_SATURATION: Ratio = Ratio(13, 20);

/// Brown colors are less saturated than this
const BROWN_MAX_SATURATION: Ratio = Ratio(7, 10);
/// Orange-hued brown colors are darker than this
const BROWN_MAX_LIGHTNESS: Ratio = Ratio(3, 5);
/// Orange hues (in degrees) that can be brown
const BROWN_HUES: std::ops::Range<u16> = 15..45;
/// Red-hued brown colors are darker than this
const RED_BROWN_MAX_LIGHTNESS: Ratio = Ratio(2, 5);
/// Red hues at or above this (in degrees) can be brown
const RED_BROWN_MIN_HUE: u16 = 340;
/// Red hues below this (in degrees) can be brown
const RED_BROWN_MAX_HUE: u16 = 25;

/// A named bucket of colors
///
/// The variant order is the order categories are listed in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
	/// Very light colors
	White,
	/// Colors with little saturation
	Grey,
	/// Very dark colors
	Black,
	/// Red hues
	Red,
	/// Light, desaturated red hues
	PastelPink,
	/// Orange hues
	Orange,
	/// Light, desaturated orange hues
	PastelOrange,
	/// Yellow hues
	Yellow,
	/// Light, desaturated yellow hues
	PastelYellow,
	/// Green hues
	Green,
	/// Light, desaturated green hues
	PastelGreen,
	/// Light, desaturated cyan hues
	PastelCyan,
	/// Cyan hues
	Cyan,
	/// Blue hues
	Blue,
	/// Light, desaturated blue hues
	PastelBlue,
	/// Purple hues
	Purple,
	/// Light, desaturated purple hues
	PastelPurple,
	/// Magenta hues
	Magenta,
	/// Light, desaturated magenta hues
	PastelMagenta,
	/// Dark, muted orange and red hues
	Brown,
	/// Colors on either side of a sharp transition between neighboring pixels.
	///
	/// [`classify`] never returns this category.
	Gradients,
}

use Category::*;

impl Category {
	/// Every category, in report order
	pub const ALL: [Self; 21] = [
		White,
		Grey,
		Black,
		Red,
		PastelPink,
		Orange,
		PastelOrange,
		Yellow,
		PastelYellow,
		Green,
		PastelGreen,
		PastelCyan,
		Cyan,
		Blue,
		PastelBlue,
		Purple,
		PastelPurple,
		Magenta,
		PastelMagenta,
		Brown,
		Gradients,
	];

	/// The display name of this category
	#[must_use]
	pub const fn label(self) -> &'static str {
		match self {
			White => "White",
			Grey => "Grey",
			Black => "Black",
			Red => "Red",
			PastelPink => "Pastel Pink",
			Orange => "Orange",
			PastelOrange => "Pastel Orange",
			Yellow => "Yellow",
			PastelYellow => "Pastel Yellow",
			Green => "Green",
			PastelGreen => "Pastel Green",
			PastelCyan => "Pastel Cyan",
			Cyan => "Cyan",
			Blue => "Blue",
			PastelBlue => "Pastel Blue",
			Purple => "Purple",
			PastelPurple => "Pastel Purple",
			Magenta => "Magenta",
			PastelMagenta => "Pastel Magenta",
			Brown => "Brown",
			Gradients => "Gradients",
		}
	}

	/// A typical color for this category, used for legends and swatches
	#[must_use]
	pub const fn swatch(self) -> Srgb<u8> {
		let (r, g, b) = match self {
			White => (0xFF, 0xFF, 0xFF),
			Grey => (0x80, 0x80, 0x80),
			Black => (0x00, 0x00, 0x00),
			Red => (0xFF, 0x00, 0x00),
			PastelPink => (0xFF, 0xD1, 0xDC),
			Orange => (0xFF, 0xA5, 0x00),
			PastelOrange => (0xFF, 0xD8, 0xB1),
			Yellow => (0xFF, 0xFF, 0x00),
			PastelYellow => (0xFF, 0xFA, 0xCD),
			Green => (0x00, 0x80, 0x00),
			PastelGreen => (0x98, 0xFB, 0x98),
			PastelCyan => (0xAF, 0xEE, 0xEE),
			Cyan => (0x00, 0xFF, 0xFF),
			Blue => (0x00, 0x00, 0xFF),
			PastelBlue => (0xAD, 0xD8, 0xE6),
			Purple => (0x80, 0x00, 0x80),
			PastelPurple => (0xD8, 0xBF, 0xD8),
			Magenta => (0xFF, 0x00, 0xFF),
			PastelMagenta => (0xFF, 0xB6, 0xC1),
			Brown => (0xA5, 0x2A, 0x2A),
			Gradients => (0xCC, 0xCC, 0xCC),
		};
		Srgb::new(r, g, b)
	}

	/// The bit for this category in a [`CategorySet`]
	const fn bit(self) -> u32 {
		1 << self as u32
	}
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

impl FromStr for Category {
	type Err = AnalysisError;

	/// Parses a category label, ignoring case and surrounding whitespace.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let label = s.trim();
		Self::ALL
			.into_iter()
			.find(|category| category.label().eq_ignore_ascii_case(label))
			.ok_or_else(|| AnalysisError::UnknownCategory(s.to_owned()))
	}
}

/// The eight hue sectors of the color wheel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hue {
	/// `[340, 360)` and `[0, 18)`
	Red,
	/// `[18, 45)`
	Orange,
	/// `[45, 70)`
	Yellow,
	/// `[70, 160)`
	Green,
	/// `[160, 200)`
	Cyan,
	/// `[200, 260)`
	Blue,
	/// `[260, 300)`
	Purple,
	/// `[300, 340)`
	Magenta,
}

impl Hue {
	/// Each sector but the wrapping red one, by the hue (in degrees) it ends before
	const SECTORS: [(u16, Self); 8] = [
		(18, Self::Red),
		(45, Self::Orange),
		(70, Self::Yellow),
		(160, Self::Green),
		(200, Self::Cyan),
		(260, Self::Blue),
		(300, Self::Purple),
		(340, Self::Magenta),
	];

	/// Find the sector containing the hue of `color`
	fn of(color: &impl Components) -> Self {
		Self::SECTORS
			.into_iter()
			.find(|&(end, _)| color.hue(end).is_lt())
			.map_or(Self::Red, |(_, hue)| hue)
	}

	/// The category for this hue, choosing the pastel variant if `pastel`
	const fn category(self, pastel: bool) -> Category {
		match (self, pastel) {
			(Self::Red, false) => Red,
			(Self::Red, true) => PastelPink,
			(Self::Orange, false) => Orange,
			(Self::Orange, true) => PastelOrange,
			(Self::Yellow, false) => Yellow,
			(Self::Yellow, true) => PastelYellow,
			(Self::Green, false) => Green,
			(Self::Green, true) => PastelGreen,
			(Self::Cyan, false) => Cyan,
			(Self::Cyan, true) => PastelCyan,
			(Self::Blue, false) => Blue,
			(Self::Blue, true) => PastelBlue,
			(Self::Purple, false) => Purple,
			(Self::Purple, true) => PastelPurple,
			(Self::Magenta, false) => Magenta,
			(Self::Magenta, true) => PastelMagenta,
		}
	}
}

/// Compares the HSL components of a color against thresholds
trait Components {
	/// Compare the lightness with `threshold`
	fn lightness(&self, threshold: Ratio) -> Ordering;
	/// Compare the saturation with `threshold`
	fn saturation(&self, threshold: Ratio) -> Ordering;
	/// Compare the hue with `degrees`
	fn hue(&self, degrees: u16) -> Ordering;
}

impl Components for Hsl {
	fn lightness(&self, threshold: Ratio) -> Ordering {
		self.lightness.total_cmp(&threshold.value())
	}

	fn saturation(&self, threshold: Ratio) -> Ordering {
		self.saturation.total_cmp(&threshold.value())
	}

	fn hue(&self, degrees: u16) -> Ordering {
		hue_degrees(*self).total_cmp(&f32::from(degrees))
	}
}

/// The HSL components of an 8-bit color as exact fractions
///
/// Lightness is `sum / 510`, saturation is `delta / saturation_denom`,
/// and the hue in degrees is `60 * hue_sextants / delta`.
#[derive(Debug, Clone, Copy)]
struct ExactHsl {
	/// `max + min` of the components
	sum: u32,
	/// `max - min` of the components
	delta: u32,
	/// `sum` for dark colors, `510 - sum` for light ones
	saturation_denom: u32,
	/// The hue as a multiple of `delta / 6` of a full turn
	hue_sextants: u32,
}

impl From<Srgb<u8>> for ExactHsl {
	fn from(color: Srgb<u8>) -> Self {
		let (r, g, b) = (u32::from(color.red), u32::from(color.green), u32::from(color.blue));
		let max = r.max(g).max(b);
		let min = r.min(g).min(b);
		let sum = max + min;
		let delta = max - min;

		let saturation_denom = if sum > 255 { 510 - sum } else { sum };

		// each case is non-negative since every component lies within `delta` of the others
		let hue_sextants = if delta == 0 {
			0
		} else if max == r {
			if g >= b {
				g - b
			} else {
				g + 6 * delta - b
			}
		} else if max == g {
			b + 2 * delta - r
		} else {
			r + 4 * delta - g
		};

		Self { sum, delta, saturation_denom, hue_sextants }
	}
}

impl Components for ExactHsl {
	fn lightness(&self, Ratio(num, den): Ratio) -> Ordering {
		(self.sum * u32::from(den)).cmp(&(u32::from(num) * 510))
	}

	fn saturation(&self, Ratio(num, den): Ratio) -> Ordering {
		if self.delta == 0 {
			0.cmp(&num)
		} else {
			(self.delta * u32::from(den)).cmp(&(u32::from(num) * self.saturation_denom))
		}
	}

	fn hue(&self, degrees: u16) -> Ordering {
		if self.delta == 0 {
			0.cmp(&degrees)
		} else {
			(60 * self.hue_sextants).cmp(&(u32::from(degrees) * self.delta))
		}
	}
}

/// The category rules, shared by the exact and float paths
fn classify_components(color: &impl Components) -> Category {
	if color.lightness(BLACK_MAX_LIGHTNESS).is_lt() {
		return Black;
	}
	if color.lightness(WHITE_MIN_LIGHTNESS).is_gt() {
		return White;
	}
	if color.saturation(GREY_MAX_SATURATION).is_lt() {
		return Grey;
	}

	if color.saturation(BROWN_MAX_SATURATION).is_lt() {
		if color.lightness(BROWN_MAX_LIGHTNESS).is_lt()
			&& color.hue(BROWN_HUES.start).is_ge()
			&& color.hue(BROWN_HUES.end).is_lt()
		{
			return Brown;
		}
		if color.lightness(RED_BROWN_MAX_LIGHTNESS).is_lt()
			&& (color.hue(RED_BROWN_MAX_HUE).is_lt() || color.hue(RED_BROWN_MIN_HUE).is_ge())
		{
			return Brown;
		}
	}

	let pastel =
		color.lightness(PASTEL_MIN_LIGHTNESS).is_gt() && color.saturation(PASTEL_MAX_SATURATION).is_lt();
	Hue::of(color).category(pastel)
}

/// Sort a color into its category.
///
/// Every color maps to exactly one category other than [`Category::Gradients`].
/// The thresholds are applied in exact integer arithmetic,
/// so colors that lie exactly on a hue, lightness, or saturation boundary
/// fall on the side the half-open ranges put them.
#[must_use]
pub fn classify(color: Srgb<u8>) -> Category {
	classify_components(&ExactHsl::from(color))
}

/// Sort an HSL color into its category.
///
/// Uses the same rules as [`classify`], compared in floating point.
#[must_use]
pub fn classify_hsl(hsl: Hsl) -> Category {
	classify_components(&hsl)
}

/// A set of [`Category`]s
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CategorySet(u32);

impl CategorySet {
	/// The set with no categories
	#[must_use]
	pub const fn empty() -> Self {
		Self(0)
	}

	/// Every category [`classify`] can return, i.e., all but [`Category::Gradients`]
	#[must_use]
	pub const fn all() -> Self {
		Self(Gradients.bit() - 1)
	}

	/// Whether `category` is in the set
	#[must_use]
	pub const fn contains(self, category: Category) -> bool {
		self.0 & category.bit() != 0
	}

	/// Add `category`, returning whether it was newly added
	pub fn insert(&mut self, category: Category) -> bool {
		let added = !self.contains(category);
		self.0 |= category.bit();
		added
	}

	/// Remove `category`, returning whether it was present
	pub fn remove(&mut self, category: Category) -> bool {
		let removed = self.contains(category);
		self.0 &= !category.bit();
		removed
	}

	/// The number of categories in the set
	#[must_use]
	pub const fn len(self) -> u32 {
		self.0.count_ones()
	}

	/// Whether the set has no categories
	#[must_use]
	pub const fn is_empty(self) -> bool {
		self.0 == 0
	}

	/// The categories in the set, in report order
	pub fn iter(self) -> impl Iterator<Item = Category> {
		Category::ALL.into_iter().filter(move |&category| self.contains(category))
	}
}

impl FromIterator<Category> for CategorySet {
	fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
		let mut set = Self::empty();
		set.extend(iter);
		set
	}
}

impl Extend<Category> for CategorySet {
	fn extend<I: IntoIterator<Item = Category>>(&mut self, iter: I) {
		for category in iter {
			self.insert(category);
		}
	}
}

impl fmt::Display for CategorySet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, category) in self.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			f.write_str(category.label())?;
		}
		Ok(())
	}
}
