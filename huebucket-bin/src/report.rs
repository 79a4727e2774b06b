//! Formats analysis and extraction results for the terminal

use colored::Colorize;
use huebucket::{AnalysisResult, Category, ColorRecord, ExtractionResult, RunOptions};
use palette::Srgb;
use std::fmt::Write;

/// The most categories listed in the analysis distribution
pub const DISTRIBUTION_MAX_ITEMS: usize = 15;

/// Categories below this percentage are hidden from the distribution, except black
pub const DISTRIBUTION_MIN_PERCENT: f64 = 0.1;

/// Format a number with `,` between each group of three digits
pub fn group_thousands(n: impl Into<u64>) -> String {
	let digits = n.into().to_string();
	let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
	for (i, digit) in digits.chars().enumerate() {
		if i > 0 && (digits.len() - i) % 3 == 0 {
			grouped.push(',');
		}
		grouped.push(digit);
	}
	grouped
}

/// A block of whitespace with `color` as its background
fn swatch(color: Srgb<u8>, width: usize) -> String {
	" ".repeat(width)
		.on_truecolor(color.red, color.green, color.blue)
		.to_string()
}

/// The image overview, including the category distribution
pub fn analysis(result: &AnalysisResult) -> String {
	let mut out = String::new();
	// writing to a String never fails
	let _ = writeln!(out, "Total pixels: {}", group_thousands(result.total_pixels));
	let _ = writeln!(out, "Raw colors: {}", group_thousands(result.raw_color_count));
	let _ = writeln!(
		out,
		"Estimated unique colors: ~{}",
		group_thousands(result.estimated_unique_count)
	);

	let distribution = result.distribution(DISTRIBUTION_MAX_ITEMS, DISTRIBUTION_MIN_PERCENT);
	if distribution.entries.is_empty() {
		let _ = writeln!(out, "No colors found.");
		return out;
	}

	let _ = writeln!(out, "Distribution:");
	for (category, count, percent) in distribution.entries {
		let _ = writeln!(
			out,
			"{} {category} ({percent:.1}%, {} px)",
			swatch(category.swatch(), 2),
			group_thousands(count)
		);
	}
	if distribution.omitted > 0 {
		let _ = writeln!(out, "+{} more...", distribution.omitted);
	}

	out
}

/// One line per color, under a heading for each category
pub fn list(result: &ExtractionResult) -> String {
	let mut out = String::new();
	let _ = writeln!(
		out,
		"{} colors from {} pixels",
		group_thousands(u64::try_from(result.final_unique_count).unwrap_or(u64::MAX)),
		group_thousands(result.total_pixels)
	);

	for (category, records) in result.non_empty() {
		let _ = writeln!(out, "\n{} ({})", category.to_string().bold(), records.len());
		for record in records {
			let ColorRecord { rgb, .. } = *record;
			let percentage = match record.percentage {
				Some(_) => format!("{}%", record.percentage_text()),
				None => record.percentage_text(),
			};
			let _ = writeln!(
				out,
				"{} {:>10} ({:>3},{:>3},{:>3}) {percentage:>7} {:>12}",
				record.hex.truecolor(rgb.red, rgb.green, rgb.blue),
				record.decimal,
				rgb.red,
				rgb.green,
				rgb.blue,
				group_thousands(record.count),
			);
		}
	}

	out
}

/// A line of swatches for each category
pub fn swatches(result: &ExtractionResult) -> String {
	let width = result
		.non_empty()
		.map(|(category, _)| category.label().len())
		.max()
		.unwrap_or(0);

	let mut out = String::new();
	for (category, records) in result.non_empty() {
		let line = records.iter().map(|record| swatch(record.rgb, 3)).collect::<String>();
		let _ = writeln!(out, "{:width$} {line}", category.label());
	}
	out
}

/// The full report as markdown, with a table for each category
pub fn markdown(result: &ExtractionResult, options: &RunOptions, (width, height): (u32, u32)) -> String {
	let mut out = String::new();
	let _ = writeln!(out, "# Colour Extraction Results\n");
	let _ = writeln!(out, "- Image Size: {width}x{height} px");
	let _ = writeln!(out, "- Analysed Pixels: {}", group_thousands(result.total_pixels));
	let _ = writeln!(
		out,
		"- Final Unique Colours: {}",
		group_thousands(u64::try_from(result.final_unique_count).unwrap_or(u64::MAX))
	);
	let _ = writeln!(out, "- Categories: {}", options.selected_categories);
	let _ = writeln!(out, "- Threshold: {}", options.threshold);
	let _ = writeln!(out, "- Max/Category: {}\n", options.max_colors_per_category);

	for (category, records) in result.non_empty() {
		table(&mut out, category, records);
	}

	out
}

/// A markdown table of `records` under a heading for `category`
fn table(out: &mut String, category: Category, records: &[ColorRecord]) {
	let _ = writeln!(out, "## {category} ({})\n", records.len());
	let _ = writeln!(out, "| Hex       | Decimal    | RGB               | Percentage | Count      |");
	let _ = writeln!(out, "| :-------- | :--------- | :---------------- | :--------- | :--------- |");
	for record in records {
		let rgb = format!("({}, {}, {})", record.rgb.red, record.rgb.green, record.rgb.blue);
		let percentage = match record.percentage {
			Some(_) => format!("{}%", record.percentage_text()),
			None => record.percentage_text(),
		};
		let _ = writeln!(
			out,
			"| {:<9} | {:<10} | {rgb:<17} | {percentage:<10} | {:<10} |",
			record.hex,
			group_thousands(record.decimal),
			group_thousands(record.count),
		);
	}
	let _ = writeln!(out);
}
