// SPDX-License-Identifier: MIT
//! Error type shared by the crop, scale and color conversion stages.

use fast_image_resize as fir;

use crate::crop::{CropRect, Size};

#[derive(Debug, thiserror::Error)]
pub enum ScaleError {
    /// The crop rectangle is empty or reaches outside the source, or the
    /// requested output has a zero dimension.
    #[error("invalid region: crop {crop:?} within source {src:?} to output {dst:?}")]
    InvalidRegion { crop: CropRect, src: Size, dst: Size },

    #[error("dimension mismatch: {reason}")]
    DimensionMismatch { reason: String },

    #[error("could not allocate {bytes} byte output buffer")]
    AllocationFailure { bytes: usize },

    #[error("fast image resize error: {0}")]
    Resize(#[from] fir::ResizeError),

    #[error("image buffer error: {0}")]
    ImageBuffer(#[from] fir::ImageBufferError),

    #[error("crop box error: {0}")]
    CropBox(#[from] fir::CropBoxError),
}

impl ScaleError {
    pub(crate) fn dimension(reason: impl Into<String>) -> Self {
        Self::DimensionMismatch {
            reason: reason.into(),
        }
    }
}

/// Allocate a zeroed buffer of exactly `len` bytes, reporting failure instead
/// of aborting.
pub(crate) fn alloc_zeroed(len: usize) -> Result<Vec<u8>, ScaleError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| ScaleError::AllocationFailure { bytes: len })?;
    buf.resize(len, 0);
    Ok(buf)
}
