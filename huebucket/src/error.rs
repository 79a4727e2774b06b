//! The error type shared by every fallible operation in the crate

use crate::session::JobKind;
use thiserror::Error;

/// Result type alias for `huebucket` operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// The two broad ways an analysis or extraction can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// The caller supplied a malformed buffer, options, or request.
	/// Nothing was scanned.
	InvalidInput,
	/// Something that should be impossible for valid input went wrong mid-computation.
	ComputationFault,
}

/// Errors reported by the pixel pipeline and the session wrapper
#[derive(Debug, Error)]
pub enum AnalysisError {
	/// No pixel data was provided
	#[error("the pixel buffer is empty")]
	EmptyBuffer,

	/// One of the image dimensions is zero
	#[error("image dimensions must be positive, got {width}x{height}")]
	InvalidDimensions {
		/// Width in pixels
		width: u32,
		/// Height in pixels
		height: u32,
	},

	/// The buffer length does not match `width * height * 4`
	#[error("a {width}x{height} RGBA image needs {expected} bytes, but the buffer has {actual}")]
	BufferSizeMismatch {
		/// Width in pixels
		width: u32,
		/// Height in pixels
		height: u32,
		/// Number of bytes implied by the dimensions
		expected: u64,
		/// Number of bytes actually provided
		actual: usize,
	},

	/// Pixel counts are tracked as `u32`
	#[error("the image has {pixels} pixels, which is more than the supported {max}", max = u32::MAX)]
	TooManyPixels {
		/// Number of pixels implied by the dimensions
		pixels: u64,
	},

	/// The deduplication threshold must be finite and greater than zero
	#[error("the color threshold must be a positive number, got {0}")]
	InvalidThreshold(f32),

	/// At least one color per category must be requested
	#[error("the maximum number of colors per category must be at least 1")]
	InvalidMaxColors,

	/// A category label did not name any known category
	#[error("unknown color category: '{0}'")]
	UnknownCategory(String),

	/// A hex color code could not be parsed
	#[error("invalid hex color code: '{0}'")]
	InvalidHex(String),

	/// The session already has a job of this kind running
	#[error("an {0} job is already running for this image")]
	JobInProgress(JobKind),

	/// An internal invariant was broken
	#[error("internal fault: {0}")]
	ComputationFault(String),
}

impl AnalysisError {
	/// Which of the two broad error kinds this error belongs to.
	#[must_use]
	pub const fn kind(&self) -> ErrorKind {
		match self {
			Self::ComputationFault(_) => ErrorKind::ComputationFault,
			Self::EmptyBuffer
			| Self::InvalidDimensions { .. }
			| Self::BufferSizeMismatch { .. }
			| Self::TooManyPixels { .. }
			| Self::InvalidThreshold(_)
			| Self::InvalidMaxColors
			| Self::UnknownCategory(_)
			| Self::InvalidHex(_)
			| Self::JobInProgress(_) => ErrorKind::InvalidInput,
		}
	}
}
