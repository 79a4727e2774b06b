//! Runs analysis and extraction off the caller's thread, one job of each kind at a time

use crate::{
	analyze_with_progress, extract_with_progress, AnalysisError, AnalysisResult, ExtractionResult, PixelBuffer,
	Progress, Result, RunOptions,
};
use image::RgbaImage;
use std::{
	any::Any,
	fmt,
	sync::{
		atomic::{AtomicBool, AtomicU8, Ordering},
		Arc,
	},
	thread::{self, JoinHandle},
};

/// The two kinds of work a session can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
	/// [`crate::analyze`]
	Analysis,
	/// [`crate::extract`]
	Extraction,
}

impl fmt::Display for JobKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Analysis => "analysis",
			Self::Extraction => "extraction",
		})
	}
}

/// Clears an in-flight flag when dropped, including during a panic
#[derive(Debug)]
struct InFlight(Arc<AtomicBool>);

impl InFlight {
	/// Set `flag`, or fail if it is already set
	fn claim(flag: &Arc<AtomicBool>, kind: JobKind) -> Result<Self> {
		flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
			.map_err(|_| AnalysisError::JobInProgress(kind))?;
		Ok(Self(Arc::clone(flag)))
	}
}

impl Drop for InFlight {
	fn drop(&mut self) {
		self.0.store(false, Ordering::Release);
	}
}

/// An image whose colors can be analyzed and extracted in the background.
///
/// At most one analysis and one extraction may run at a time.
#[derive(Debug, Clone)]
pub struct ImageSession {
	/// RGBA8 pixel data, already validated against the dimensions
	data: Arc<[u8]>,
	/// Width in pixels
	width: u32,
	/// Height in pixels
	height: u32,
	/// Set while an analysis is running
	analysis: Arc<AtomicBool>,
	/// Set while an extraction is running
	extraction: Arc<AtomicBool>,
}

impl ImageSession {
	/// Create a session over interleaved RGBA8 pixel data.
	///
	/// # Errors
	/// Returns an error if the data does not describe a `width` by `height` image,
	/// see [`PixelBuffer::new`].
	pub fn new(data: impl Into<Arc<[u8]>>, width: u32, height: u32) -> Result<Self> {
		let data = data.into();
		PixelBuffer::new(&data, width, height)?;
		Ok(Self {
			data,
			width,
			height,
			analysis: Arc::new(AtomicBool::new(false)),
			extraction: Arc::new(AtomicBool::new(false)),
		})
	}

	/// Create a session over a copy of a decoded image.
	///
	/// # Errors
	/// See [`ImageSession::new`].
	pub fn from_image(image: &RgbaImage) -> Result<Self> {
		Self::new(image.as_raw().as_slice(), image.width(), image.height())
	}

	/// The in-flight flag for `kind`
	fn flag(&self, kind: JobKind) -> &Arc<AtomicBool> {
		match kind {
			JobKind::Analysis => &self.analysis,
			JobKind::Extraction => &self.extraction,
		}
	}

	/// Whether a job of `kind` is currently running
	#[must_use]
	pub fn is_busy(&self, kind: JobKind) -> bool {
		self.flag(kind).load(Ordering::Acquire)
	}

	/// Start a job of `kind` that runs `work` on a new thread
	fn spawn<T: Send + 'static>(
		&self,
		kind: JobKind,
		options: RunOptions,
		work: fn(&PixelBuffer, &RunOptions, &dyn Progress) -> Result<T>,
	) -> Result<Job<T>> {
		let guard = InFlight::claim(self.flag(kind), kind)?;
		let progress = Arc::new(AtomicU8::new(0));

		let data = Arc::clone(&self.data);
		let (width, height) = (self.width, self.height);
		let job_progress = Arc::clone(&progress);

		let handle = thread::Builder::new()
			.name(format!("huebucket-{kind}"))
			.spawn(move || {
				let _guard = guard;
				let buffer = PixelBuffer::new(&data, width, height)?;
				work(&buffer, &options, job_progress.as_ref())
			})
			.map_err(|e| AnalysisError::ComputationFault(format!("failed to start the {kind} thread: {e}")))?;

		log::debug!("started {kind} job");

		Ok(Job { kind, progress, handle })
	}

	/// Start analyzing the image in the background.
	///
	/// # Errors
	/// Returns [`AnalysisError::JobInProgress`] if an analysis is already running.
	pub fn spawn_analysis(&self, options: RunOptions) -> Result<Job<AnalysisResult>> {
		self.spawn(JobKind::Analysis, options, analyze_with_progress)
	}

	/// Start extracting colors from the image in the background.
	///
	/// # Errors
	/// Returns [`AnalysisError::JobInProgress`] if an extraction is already running.
	pub fn spawn_extraction(&self, options: RunOptions) -> Result<Job<ExtractionResult>> {
		self.spawn(JobKind::Extraction, options, extract_with_progress)
	}
}

/// A running analysis or extraction
#[derive(Debug)]
pub struct Job<T> {
	/// What this job is doing
	kind: JobKind,
	/// The percentage of the scan completed so far
	progress: Arc<AtomicU8>,
	/// The thread doing the work
	handle: JoinHandle<Result<T>>,
}

impl<T> Job<T> {
	/// What this job is doing
	#[must_use]
	pub const fn kind(&self) -> JobKind {
		self.kind
	}

	/// The percentage of rows scanned so far, in `0..=100`
	#[must_use]
	pub fn progress(&self) -> u8 {
		self.progress.load(Ordering::Relaxed)
	}

	/// Whether the job has finished, successfully or not
	#[must_use]
	pub fn is_finished(&self) -> bool {
		self.handle.is_finished()
	}

	/// Wait for the job to finish and take its result.
	///
	/// # Errors
	/// Returns the job's error, or [`AnalysisError::ComputationFault`] if the job panicked.
	pub fn join(self) -> Result<T> {
		let kind = self.kind;
		self.handle.join().map_err(|panic| {
			let message = panic_message(panic.as_ref());
			log::error!("{kind} job panicked: {message}");
			AnalysisError::ComputationFault(format!("the {kind} job panicked: {message}"))
		})?
	}
}

/// The message a panic was raised with, if it had one
fn panic_message(panic: &(dyn Any + Send)) -> &str {
	panic
		.downcast_ref::<&str>()
		.copied()
		.or_else(|| panic.downcast_ref::<String>().map(String::as_str))
		.unwrap_or("unknown cause")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
	use super::*;
	use crate::{analyze, extract, Category};

	fn stripes() -> (Vec<u8>, u32, u32) {
		let (width, height) = (30, 20);
		let data = (0..width * height)
			.flat_map(|i| match i % 3 {
				0 => [255, 0, 0, 255],
				1 => [0, 0, 255, 255],
				_ => [250, 250, 250, 255],
			})
			.collect();
		(data, width, height)
	}

	#[test]
	fn rejects_malformed_buffers() {
		assert!(matches!(ImageSession::new(Vec::<u8>::new(), 1, 1), Err(AnalysisError::EmptyBuffer)));
		assert!(matches!(
			ImageSession::new(vec![0; 12], 2, 2),
			Err(AnalysisError::BufferSizeMismatch { .. })
		));
	}

	#[test]
	fn background_jobs_match_direct_calls() {
		let (data, width, height) = stripes();
		let session = ImageSession::new(data.clone(), width, height).unwrap();
		let buffer = PixelBuffer::new(&data, width, height).unwrap();
		let options = RunOptions { extract_gradients: true, ..RunOptions::default() };

		let analysis = session.spawn_analysis(options).unwrap();
		let extraction = session.spawn_extraction(options).unwrap();
		assert_eq!(analysis.kind(), JobKind::Analysis);

		let analysis = analysis.join().unwrap();
		assert_eq!(analysis, analyze(&buffer, &options).unwrap());
		assert_eq!(analysis.category_counts[&Category::Red], 200);

		let extraction = extraction.join().unwrap();
		assert_eq!(extraction, extract(&buffer, &options).unwrap());

		assert!(!session.is_busy(JobKind::Analysis));
		assert!(!session.is_busy(JobKind::Extraction));
	}

	#[test]
	fn one_job_per_kind() {
		let (data, width, height) = stripes();
		let session = ImageSession::new(data, width, height).unwrap();

		session.analysis.store(true, Ordering::Release);
		assert!(matches!(
			session.spawn_analysis(RunOptions::default()),
			Err(AnalysisError::JobInProgress(JobKind::Analysis))
		));

		// the other kind is unaffected
		let job = session.spawn_extraction(RunOptions::default()).unwrap();
		assert!(job.join().is_ok());

		session.analysis.store(false, Ordering::Release);
		let job = session.spawn_analysis(RunOptions::default()).unwrap();
		assert!(job.join().is_ok());
	}

	#[test]
	fn finished_jobs_report_full_progress() {
		let (data, width, height) = stripes();
		let session = ImageSession::new(data, width, height).unwrap();
		let job = session.spawn_analysis(RunOptions::default()).unwrap();
		while !job.is_finished() {
			thread::yield_now();
		}
		assert_eq!(job.progress(), 100);
		assert!(job.join().is_ok());
	}

	#[test]
	fn invalid_options_fail_in_the_job() {
		let (data, width, height) = stripes();
		let session = ImageSession::new(data, width, height).unwrap();
		let options = RunOptions { threshold: 0.0, ..RunOptions::default() };
		let job = session.spawn_extraction(options).unwrap();
		assert!(matches!(job.join(), Err(AnalysisError::InvalidThreshold(_))));
		assert!(!session.is_busy(JobKind::Extraction));
	}

	#[test]
	fn panics_become_faults() {
		let panic = thread::spawn(|| panic!("boom")).join().unwrap_err();
		assert_eq!(panic_message(panic.as_ref()), "boom");

		let panic = thread::spawn(|| panic!("{} {}", "formatted", 1)).join().unwrap_err();
		assert_eq!(panic_message(panic.as_ref()), "formatted 1");
	}

	#[test]
	fn guard_clears_on_drop() {
		let flag = Arc::new(AtomicBool::new(false));
		{
			let _guard = InFlight::claim(&flag, JobKind::Analysis).unwrap();
			assert!(flag.load(Ordering::Acquire));
			assert!(InFlight::claim(&flag, JobKind::Analysis).is_err());
		}
		assert!(!flag.load(Ordering::Acquire));
	}
}
