//! Specifies the CLI and handles arg parsing

use clap::{Parser, ValueEnum};
use huebucket::{Category, CategorySet, RunOptions};
use std::{
	fmt::{Debug, Display},
	num::ParseFloatError,
	ops::{Bound, RangeBounds},
	path::PathBuf,
	str::FromStr,
};

/// Which passes to run over the image
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Mode {
	/// Category distribution and unique color estimate of a thumbnail
	Analyze,
	/// The main colors of each category in the full image
	Extract,
	/// Both of the above
	Both,
}

impl Mode {
	/// Whether the analysis pass should run
	pub const fn analyze(self) -> bool {
		matches!(self, Self::Analyze | Self::Both)
	}

	/// Whether the extraction pass should run
	pub const fn extract(self) -> bool {
		matches!(self, Self::Extract | Self::Both)
	}
}

/// Supported output formats for the extracted colors
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum FormatOutput {
	/// One line per color with its hex code, decimal value, RGB triple, percentage, and count
	List,
	/// Whitespace with true color background, one line per category
	Swatch,
	/// A markdown report with a table per category
	Markdown,
}

/// Extract the main colors of an image and sort them into named color categories.
///
/// Categories are based on HSL hue, saturation, and lightness,
/// e.g., Red, Pastel Blue, Brown, or Grey.
#[allow(clippy::struct_excessive_bools)]
#[derive(Parser)]
#[command(version)]
pub struct Options {
	/// The path to the input image
	pub image: PathBuf,

	/// Colors closer than this distance in RGB space are merged
	///
	/// This is also the distance above which two neighboring pixels count as a gradient.
	/// Around 10 merges colors that look the same, larger values give fewer, more distinct colors.
	#[arg(short, long, default_value_t = 10.0, value_parser = parse_valid_threshold)]
	pub threshold: f32,

	/// The maximum number of colors to print for each category
	///
	/// Up to twice as many gradient colors are printed.
	#[arg(short, long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
	pub max_colors: u32,

	/// Ignore nearly white pixels, e.g., a scanned page or a product photo background
	#[arg(short = 'b', long)]
	pub remove_background: bool,

	/// A comma separated list of categories to extract colors for, or "all"
	///
	/// Category names are case insensitive and may use '-' or '_' instead of spaces,
	/// e.g., "red,pastel-blue,grey".
	#[arg(short, long, value_delimiter = ',', default_value = "all", value_parser = parse_category_set)]
	pub categories: Vec<CategorySet>,

	/// Also find the colors on either side of sharp horizontal transitions
	#[arg(short, long)]
	pub gradients: bool,

	/// Which passes to run
	#[arg(long, default_value = "both")]
	pub mode: Mode,

	/// The format to print the extracted colors in
	#[arg(short, long, default_value = "list")]
	pub output: FormatOutput,

	/// The maximum image size, in number of pixels, for the analysis pass
	///
	/// The analysis runs on a thumbnail with at most this many pixels,
	/// while the extraction always uses the full image.
	#[arg(long, default_value_t = 40_000)]
	pub analysis_max_pixels: u32,

	/// The seed value used for the random number generator
	#[arg(long, default_value_t = 0)]
	pub seed: u64,

	/// Print additional information, such as the time taken by each step
	#[arg(long)]
	pub verbose: bool,

	/// The number of threads to use
	///
	/// A value of 0 will use one thread per CPU core.
	#[cfg(feature = "threads")]
	#[arg(long, default_value_t = 0)]
	pub threads: u8,
}

impl Options {
	/// The union of all selected categories
	pub fn selected_categories(&self) -> CategorySet {
		self.categories.iter().flat_map(|set| set.iter()).collect()
	}

	/// The library options for these arguments
	pub fn run_options(&self) -> RunOptions {
		RunOptions {
			threshold: self.threshold,
			remove_background: self.remove_background,
			selected_categories: self.selected_categories(),
			max_colors_per_category: self.max_colors,
			extract_gradients: self.gradients,
			seed: self.seed,
		}
	}
}

/// Parse a float value and ensure it in the provided, valid range
fn parse_float_in_range<T>(s: &str, range: impl RangeBounds<T> + Debug) -> Result<T, String>
where
	T: FromStr<Err = ParseFloatError> + Display + PartialOrd,
{
	let value: T = s.parse().map_err(|e| format!("{e}"))?;
	if range.contains(&value) {
		Ok(value)
	} else {
		Err(format!("{value} is not in {range:?}"))
	}
}

/// Parse the threshold and ensure it is finite and > `0.0`
fn parse_valid_threshold(s: &str) -> Result<f32, String> {
	parse_float_in_range(s, (Bound::Excluded(0.0), Bound::Excluded(f32::INFINITY)))
}

/// Parse a single category name, or "all" for every category
fn parse_category_set(s: &str) -> Result<CategorySet, String> {
	let name = s.trim().replace(&['-', '_'][..], " ");
	if name.eq_ignore_ascii_case("all") {
		return Ok(CategorySet::all());
	}

	match name.parse::<Category>() {
		Ok(Category::Gradients) => Err("use --gradients to extract gradient colors".to_owned()),
		Ok(category) => Ok([category].into_iter().collect()),
		Err(e) => Err(e.to_string()),
	}
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
	use super::*;

	#[test]
	fn threshold_must_be_positive() {
		assert_eq!(parse_valid_threshold("12.5"), Ok(12.5));
		assert!(parse_valid_threshold("0").is_err());
		assert!(parse_valid_threshold("-3").is_err());
		assert!(parse_valid_threshold("inf").is_err());
		assert!(parse_valid_threshold("ten").is_err());
	}

	#[test]
	fn category_names() {
		assert_eq!(parse_category_set("all"), Ok(CategorySet::all()));
		assert_eq!(parse_category_set(" ALL "), Ok(CategorySet::all()));
		assert_eq!(
			parse_category_set("pastel-blue"),
			Ok([Category::PastelBlue].into_iter().collect::<CategorySet>())
		);
		assert_eq!(
			parse_category_set("Pastel_Pink"),
			Ok([Category::PastelPink].into_iter().collect::<CategorySet>())
		);
		assert!(parse_category_set("gradients").is_err());
		assert!(parse_category_set("teal").is_err());
	}

	#[test]
	fn defaults() {
		let options = Options::try_parse_from(["huebucket", "image.png"]).unwrap();
		let run = options.run_options();
		assert_eq!(run, RunOptions::default());
		assert!(options.mode.analyze() && options.mode.extract());
		assert!(options.output == FormatOutput::List);
		assert_eq!(options.analysis_max_pixels, 40_000);
	}

	#[test]
	fn selections_are_combined() {
		let options = Options::try_parse_from([
			"huebucket",
			"image.png",
			"-c",
			"red,brown",
			"--categories",
			"grey",
			"-m",
			"3",
			"-t",
			"25",
			"-b",
			"-g",
			"--mode",
			"extract",
		])
		.unwrap();

		let run = options.run_options();
		assert_eq!(
			run.selected_categories,
			[Category::Grey, Category::Red, Category::Brown]
				.into_iter()
				.collect::<CategorySet>()
		);
		assert_eq!(run.max_colors_per_category, 3);
		assert!((run.threshold - 25.0).abs() < f32::EPSILON);
		assert!(run.remove_background && run.extract_gradients);
		assert!(!options.mode.analyze());
	}

	#[test]
	fn rejects_zero_max_colors() {
		assert!(Options::try_parse_from(["huebucket", "image.png", "-m", "0"]).is_err());
	}
}
