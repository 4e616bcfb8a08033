//! # Error Handling
//!
//! Every failure in the conversion path is returned to the caller as a
//! [`FrameError`]; nothing is logged and swallowed. Conversions are pure, so
//! an error is final: calling again with the same inputs fails the same way.
//!
//! [`FrameError::kind`] flattens the nested scaler errors into the taxonomy
//! callers branch on:
//!
//! | Kind | Raised when |
//! |------|-------------|
//! | `UnsupportedFormat` | source pixels are not packed 8-bit RGBA |
//! | `InvalidRegion` | crop rectangle or output size does not fit the source |
//! | `DimensionMismatch` | zero/odd target dimensions, buffer length or stride inconsistent with the reported size |
//! | `AllocationFailure` | the output buffer could not be reserved |
//! | `Source` | the bitmap provider could not decode or lock its pixels |
//! | `Internal` | the resizer rejected a request that passed validation |
//!
//! ```rust
//! use frame_inject::error::ErrorKind;
//! use frame_inject::{convert_to_planar_yuv, SourceImage};
//!
//! let pixels = vec![0u8; 8 * 8 * 4];
//! let source = SourceImage::rgba(&pixels, 8, 8, 8 * 4).unwrap();
//! let err = convert_to_planar_yuv(&source, 5, 4).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::DimensionMismatch);
//! ```

use std::path::PathBuf;

use frame_scale::ScaleError;

use crate::source::PixelFormat;

/// Coarse classification of a [`FrameError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnsupportedFormat,
    InvalidRegion,
    DimensionMismatch,
    AllocationFailure,
    Source,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("unsupported pixel format {format}, expected packed 8-bit RGBA")]
    UnsupportedFormat { format: PixelFormat },

    /// The pixel slice does not cover the dimensions and stride it claims.
    #[error("invalid source: {reason}")]
    InvalidSource { reason: String },

    #[error("failed to decode {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Provider-side failure to obtain the pixels (lock failed, bitmap
    /// recycled, ...).
    #[error("bitmap source error: {reason}")]
    Source { reason: String },

    #[error(transparent)]
    Scale(#[from] ScaleError),
}

impl FrameError {
    pub fn source_failure(reason: impl Into<String>) -> Self {
        Self::Source {
            reason: reason.into(),
        }
    }

    pub(crate) fn dimension(reason: impl Into<String>) -> Self {
        Self::Scale(ScaleError::DimensionMismatch {
            reason: reason.into(),
        })
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Self::InvalidSource { .. } => ErrorKind::DimensionMismatch,
            Self::Decode { .. } | Self::Source { .. } => ErrorKind::Source,
            Self::Scale(e) => match e {
                ScaleError::InvalidRegion { .. } => ErrorKind::InvalidRegion,
                ScaleError::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
                ScaleError::AllocationFailure { .. } => ErrorKind::AllocationFailure,
                ScaleError::Resize(_) | ScaleError::ImageBuffer(_) | ScaleError::CropBox(_) => {
                    ErrorKind::Internal
                }
            },
        }
    }
}

pub type FrameResult<T> = Result<T, FrameError>;
