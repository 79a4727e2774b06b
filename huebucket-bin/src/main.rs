//! Extract the main colors of an image and sort them into named hue, lightness, and saturation categories.

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::unreadable_literal
)]

mod cli;
mod report;

#[allow(clippy::wildcard_imports)]
use cli::*;

use std::{
    fmt::{self, Display},
    path::Path,
    process::ExitCode,
    time::Instant,
};

use clap::Parser;
use huebucket::{AnalysisError, AnalysisResult, ExtractionResult, PixelBuffer, RunOptions};
use image::{DynamicImage, GenericImageView, RgbaImage};
use log::{Level, Log, Metadata, Record};

/// Record the running time of a function and print the elapsed time
macro_rules! time {
    ($name: literal, $verbose: expr, $func_call: expr) => {{
        let start = Instant::now();
        let result = $func_call;
        if $verbose {
            println!("{} took {}ms", $name, start.elapsed().as_millis());
        }
        result
    }};
}

/// Error cases for the whole run
#[derive(Debug)]
enum CliError {
    /// Failed to read or decode the image file
    ImageLoad(image::ImageError),
    /// The image or options were rejected, or the computation failed
    Analysis(AnalysisError),
    /// Failed to start the worker threads
    #[cfg(feature = "threads")]
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CliError::ImageLoad(e) => write!(f, "Failed to load the image file: {e}"),
            CliError::Analysis(e) => write!(f, "Failed to process the image: {e}"),
            #[cfg(feature = "threads")]
            CliError::ThreadPool(e) => write!(f, "Failed to start the thread pool: {e}"),
        }
    }
}

impl From<AnalysisError> for CliError {
    fn from(e: AnalysisError) -> Self {
        CliError::Analysis(e)
    }
}

/// Prints library log messages to stderr
struct StderrLogger {
    /// The most verbose level that is printed
    level: Level,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Install the stderr logger, showing debug messages if `verbose` is set
fn init_logger(verbose: bool) {
    let level = if verbose { Level::Debug } else { Level::Warn };
    // only fails if a logger is already installed
    if log::set_boxed_logger(Box::new(StderrLogger { level })).is_ok() {
        log::set_max_level(level.to_level_filter());
    }
}

fn main() -> ExitCode {
    let options = Options::parse();
    init_logger(options.verbose);

    let result = run_analyze_and_extract(&options);

    // Returning Result<_> uses Debug printing instead of Display
    if let Err(e) = result {
        eprintln!("{e}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Builds a thread pool and then runs `analyze_and_extract`
#[cfg(feature = "threads")]
fn run_analyze_and_extract(options: &Options) -> Result<(), CliError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(usize::from(options.threads))
        .build()
        .map_err(CliError::ThreadPool)?;

    pool.install(|| analyze_and_extract(options))
}

/// Runs `analyze_and_extract` on a single thread
#[cfg(not(feature = "threads"))]
fn run_analyze_and_extract(options: &Options) -> Result<(), CliError> {
    analyze_and_extract(options)
}

/// Load an image, then analyze it and extract its colors according to the given options
fn analyze_and_extract(options: &Options) -> Result<(), CliError> {
    let run = options.run_options();
    run.validate()?;

    // Input
    let img = time!("Image loading", options.verbose, load_image(&options.image))?;
    let dimensions = img.dimensions();

    if options.mode.analyze() {
        let thumb = generate_thumbnail(&img, options.analysis_max_pixels, options.verbose).into_rgba8();
        let result = time!("Analysis", options.verbose, run_analysis(&thumb, &run, options))?;
        print!("{}", report::analysis(&result));
    }

    if options.mode.extract() {
        if options.mode.analyze() {
            println!();
        }

        let img = img.into_rgba8();
        let result = time!("Extraction", options.verbose, run_extraction(&img, &run, options))?;

        let text = match options.output {
            FormatOutput::List => report::list(&result),
            FormatOutput::Swatch => report::swatches(&result),
            FormatOutput::Markdown => report::markdown(&result, &run, dimensions),
        };
        print!("{text}");
    }

    Ok(())
}

/// Analyze the buffer on the current thread
#[cfg(not(feature = "threads"))]
fn analyze(buffer: &PixelBuffer, run: &RunOptions, _: &Options) -> huebucket::Result<AnalysisResult> {
    huebucket::analyze(buffer, run)
}

/// Analyze the buffer, in parallel unless a single thread was requested
#[cfg(feature = "threads")]
fn analyze(buffer: &PixelBuffer, run: &RunOptions, options: &Options) -> huebucket::Result<AnalysisResult> {
    if options.threads == 1 {
        huebucket::analyze(buffer, run)
    } else {
        huebucket::analyze_par(buffer, run)
    }
}

/// Extract colors from the buffer on the current thread
#[cfg(not(feature = "threads"))]
fn extract(buffer: &PixelBuffer, run: &RunOptions, _: &Options) -> huebucket::Result<ExtractionResult> {
    huebucket::extract(buffer, run)
}

/// Extract colors from the buffer, in parallel unless a single thread was requested
#[cfg(feature = "threads")]
fn extract(buffer: &PixelBuffer, run: &RunOptions, options: &Options) -> huebucket::Result<ExtractionResult> {
    if options.threads == 1 {
        huebucket::extract(buffer, run)
    } else {
        huebucket::extract_par(buffer, run)
    }
}

/// Run the analysis pass on the given image
fn run_analysis(image: &RgbaImage, run: &RunOptions, options: &Options) -> Result<AnalysisResult, CliError> {
    let buffer = PixelBuffer::from_image(image)?;

    if options.verbose {
        println!("Analyzing {} pixels", buffer.num_pixels());
    }

    Ok(analyze(&buffer, run, options)?)
}

/// Run the extraction pass on the given image
fn run_extraction(image: &RgbaImage, run: &RunOptions, options: &Options) -> Result<ExtractionResult, CliError> {
    let buffer = PixelBuffer::from_image(image)?;

    if options.verbose {
        println!(
            "Extracting colors from {} pixels for: {}",
            buffer.num_pixels(),
            run.selected_categories
        );
    }

    Ok(extract(&buffer, run, options)?)
}

/// Load the image at the given path
fn load_image(path: &Path) -> Result<DynamicImage, CliError> {
    image::open(path).map_err(CliError::ImageLoad)
}

/// Create a thumbnail with at most `max_pixels` pixels if the image has more than `max_pixels` pixels
fn generate_thumbnail(image: &DynamicImage, max_pixels: u32, verbose: bool) -> DynamicImage {
    // The number of pixels should be < u64::MAX, since image dimensions are (u32, u32)
    let (width, height) = image.dimensions();
    let pixels = u64::from(width) * u64::from(height);
    if pixels <= u64::from(max_pixels) {
        if verbose {
            println!("Skipping image thumbnail since pixels was below max pixels");
        }

        image.clone()
    } else {
        // (u64 as f64) only gives innaccurate results for very large u64
        // I.e, only when pixels is in the order of quintillions
        #[allow(clippy::cast_precision_loss)]
        let scale = (f64::from(max_pixels) / pixels as f64).sqrt();

        // multiplying by a positive factor < 1
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (thumb_width, thumb_height) = (
            ((f64::from(width) * scale) as u32).max(1),
            ((f64::from(height) * scale) as u32).max(1),
        );

        if verbose {
            println!("Creating a thumbnail with dimensions {thumb_width}x{thumb_height}");
        }

        time!(
            "Image thumbnail",
            verbose,
            image.thumbnail(thumb_width, thumb_height)
        )
    }
}
