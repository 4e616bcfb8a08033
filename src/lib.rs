//! # Frame Inject
//!
//! Turns an arbitrary RGBA bitmap into a camera frame of exactly the size a
//! consumer asked for: center-cropped to the target aspect ratio, box-filter
//! scaled, and either left as packed RGBA or encoded as NV21.
//!
//! ## Architecture
//!
//! - `frame_scale` (member crate): crop geometry, stride-aware scaling and
//!   color conversion. Pure functions, no I/O.
//! - [`source`]: the boundary to whoever owns the pixels. A [`BitmapSource`]
//!   lends a borrowed [`SourceImage`] for the duration of a call and releases
//!   its lock afterwards.
//! - [`convert`]: the single pipeline, parameterized by [`OutputFormat`].
//!   [`convert_to_planar_yuv`] and [`convert_to_packed_rgba`] are thin
//!   wrappers returning raw bytes.
//! - [`config`]: validated settings for the `framecvt` binary.
//!
//! ## Threading
//!
//! Calls share no state. Each one builds its own resizer and output buffer,
//! so independent frames can be converted on any number of threads.
//!
//! ## Example
//!
//! ```rust
//! use frame_inject::{convert_to_planar_yuv, SourceImage};
//!
//! // 1920x1080 gray frame with 64 bytes of padding per row.
//! let stride = 1920 * 4 + 64;
//! let pixels = vec![128u8; stride * 1080];
//! let source = SourceImage::rgba(&pixels, 1920, 1080, stride)?;
//!
//! let nv21 = convert_to_planar_yuv(&source, 480, 480)?;
//! assert_eq!(nv21.len(), 480 * 480 * 3 / 2);
//! # Ok::<(), frame_inject::FrameError>(())
//! ```

use fast_image_resize::Resizer;
use frame_scale::colorspace::{rgba_to_nv21, to_packed_copy, PlanarYuvBuffer};
use frame_scale::cpu::{scale_rgba_cpu, ScaledBuffer};
use frame_scale::crop::center_crop;
use tracing::{debug, info, instrument};

pub mod config;
pub mod error;
pub mod source;

pub use error::{ErrorKind, FrameError, FrameResult};
pub use frame_scale::cpu::ScaleFilter;
pub use frame_scale::crop::{CropRect, Size};
pub use source::{BitmapInfo, BitmapSource, DecodedImage, LoadOptions, LockGuard, PixelFormat, SourceImage};

/// Byte layout of a converted frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum OutputFormat {
    /// Y plane followed by interleaved V/U at quarter resolution.
    #[default]
    Nv21,
    /// Tightly packed RGBA_8888.
    Rgba,
}

impl OutputFormat {
    /// Exact byte length of a frame of `size` in this format.
    pub const fn frame_len(self, size: Size) -> usize {
        match self {
            OutputFormat::Nv21 => PlanarYuvBuffer::len_for(size),
            OutputFormat::Rgba => size.pixel_count() * 4,
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            OutputFormat::Nv21 => "nv21",
            OutputFormat::Rgba => "rgba",
        }
    }

    /// 4:2:0 chroma needs both dimensions to be even.
    pub const fn needs_even_dimensions(self) -> bool {
        matches!(self, OutputFormat::Nv21)
    }
}

/// What to produce from a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertRequest {
    pub target: Size,
    pub format: OutputFormat,
    pub filter: ScaleFilter,
}

impl ConvertRequest {
    pub fn new(width: u32, height: u32, format: OutputFormat) -> Self {
        Self {
            target: Size::new(width, height),
            format,
            filter: ScaleFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: ScaleFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Reject targets the output format cannot represent.
    pub fn validate(&self) -> FrameResult<()> {
        let Size { w, h } = self.target;
        if self.target.is_empty() {
            return Err(FrameError::dimension(format!(
                "target must be non-empty, got {w}x{h}"
            )));
        }
        if self.format.needs_even_dimensions() && (w % 2 != 0 || h % 2 != 0) {
            return Err(FrameError::dimension(format!(
                "{:?} output needs even dimensions, got {w}x{h}",
                self.format
            )));
        }
        Ok(())
    }
}

/// A converted frame, owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertedFrame {
    Rgba(ScaledBuffer),
    Nv21(PlanarYuvBuffer),
}

impl ConvertedFrame {
    pub fn size(&self) -> Size {
        match self {
            ConvertedFrame::Rgba(b) => b.size(),
            ConvertedFrame::Nv21(b) => b.size(),
        }
    }

    pub fn format(&self) -> OutputFormat {
        match self {
            ConvertedFrame::Rgba(_) => OutputFormat::Rgba,
            ConvertedFrame::Nv21(_) => OutputFormat::Nv21,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ConvertedFrame::Rgba(b) => b.as_bytes(),
            ConvertedFrame::Nv21(b) => b.as_bytes(),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            ConvertedFrame::Rgba(b) => b.into_bytes(),
            ConvertedFrame::Nv21(b) => b.into_bytes(),
        }
    }
}

/// Center-crop `source` to the target aspect, scale it, and encode it.
///
/// The target is validated before any pixel is read, so a bad request never
/// allocates.
#[instrument(level = "debug", skip_all, fields(target = ?request.target, format = ?request.format))]
pub fn convert(source: &SourceImage<'_>, request: ConvertRequest) -> FrameResult<ConvertedFrame> {
    request.validate()?;
    let view = source.packed_view()?;

    let crop = center_crop(view.size(), request.target);
    debug!(src = ?view.size(), stride = view.stride(), ?crop, "center crop");

    let mut resizer = Resizer::new();
    let scaled = scale_rgba_cpu(&mut resizer, &view, crop, request.target, request.filter, None)?;

    let frame = match request.format {
        OutputFormat::Rgba => ConvertedFrame::Rgba(to_packed_copy(scaled)),
        OutputFormat::Nv21 => ConvertedFrame::Nv21(rgba_to_nv21(&scaled)?),
    };
    info!(
        "generated {}x{} {:?} frame ({} bytes)",
        request.target.w,
        request.target.h,
        request.format,
        frame.as_bytes().len()
    );
    Ok(frame)
}

/// NV21 bytes of exactly `w * h * 3 / 2` length.
pub fn convert_to_planar_yuv(source: &SourceImage<'_>, width: u32, height: u32) -> FrameResult<Vec<u8>> {
    convert(source, ConvertRequest::new(width, height, OutputFormat::Nv21)).map(ConvertedFrame::into_bytes)
}

/// Packed RGBA bytes of exactly `w * h * 4` length.
pub fn convert_to_packed_rgba(source: &SourceImage<'_>, width: u32, height: u32) -> FrameResult<Vec<u8>> {
    convert(source, ConvertRequest::new(width, height, OutputFormat::Rgba)).map(ConvertedFrame::into_bytes)
}

/// Convert straight from a [`BitmapSource`].
///
/// The request and the reported pixel format are checked before the source
/// is locked; the lock is held only while the frame is being converted.
pub fn convert_bitmap<S: BitmapSource>(source: &S, request: ConvertRequest) -> FrameResult<ConvertedFrame> {
    request.validate()?;
    let info = source.info()?;
    if !info.format.is_convertible() {
        return Err(FrameError::UnsupportedFormat {
            format: info.format,
        });
    }
    source.with_pixels(|image| convert(&image, request))?
}
