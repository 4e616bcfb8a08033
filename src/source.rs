//! # Bitmap Sources
//!
//! The conversion core only ever sees a [`SourceImage`]: a borrowed, already
//! addressable pixel slice plus its dimensions, stride and format. Getting
//! such a view is the job of a [`BitmapSource`], which owns whatever locking
//! its backing memory needs and must release it on every exit path.
//!
//! [`DecodedImage`] is the file-backed source used by the `framecvt` binary:
//! it decodes any format the `image` crate understands, rotates the picture
//! upright according to its EXIF orientation and stores it as RGBA8.

use std::fmt;
use std::path::Path;

use frame_scale::cpu::PackedView;
use frame_scale::crop::Size;
use image::{DynamicImage, ImageDecoder, ImageReader, RgbaImage};
use tracing::debug;

use crate::error::FrameError;

/// Bitmap pixel layouts a host can hand over. Only [`PixelFormat::Rgba8888`]
/// can be converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8-bit R, G, B, A in byte order.
    Rgba8888,
    Rgb565,
    Rgba4444,
    Alpha8,
    RgbaF16,
    Rgba1010102,
}

impl PixelFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8888 | PixelFormat::Rgba1010102 => 4,
            PixelFormat::Rgb565 | PixelFormat::Rgba4444 => 2,
            PixelFormat::Alpha8 => 1,
            PixelFormat::RgbaF16 => 8,
        }
    }

    pub const fn is_convertible(self) -> bool {
        matches!(self, PixelFormat::Rgba8888)
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelFormat::Rgba8888 => "RGBA_8888",
            PixelFormat::Rgb565 => "RGB_565",
            PixelFormat::Rgba4444 => "RGBA_4444",
            PixelFormat::Alpha8 => "A_8",
            PixelFormat::RgbaF16 => "RGBA_F16",
            PixelFormat::Rgba1010102 => "RGBA_1010102",
        };
        f.write_str(name)
    }
}

/// Dimensions, row stride and format of a bitmap, readable without locking
/// its pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapInfo {
    pub width: u32,
    pub height: u32,
    /// Bytes between the starts of consecutive rows.
    pub stride: usize,
    pub format: PixelFormat,
}

impl BitmapInfo {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Read-only view over caller-owned pixels.
///
/// The borrow ties the view to the memory it reads, so the owner can neither
/// free nor mutate the pixels while a conversion is running.
#[derive(Debug, Clone, Copy)]
pub struct SourceImage<'a> {
    pixels: &'a [u8],
    info: BitmapInfo,
}

impl<'a> SourceImage<'a> {
    /// Checks that `pixels` covers `height` rows of `stride` bytes (the last
    /// row only up to its final pixel).
    pub fn new(pixels: &'a [u8], info: BitmapInfo) -> Result<Self, FrameError> {
        if info.width == 0 || info.height == 0 {
            return Err(FrameError::InvalidSource {
                reason: format!("empty bitmap {}x{}", info.width, info.height),
            });
        }
        let row_bytes = info.width as usize * info.format.bytes_per_pixel();
        if info.stride < row_bytes {
            return Err(FrameError::InvalidSource {
                reason: format!(
                    "stride {} shorter than a {} row of {} pixels",
                    info.stride, info.format, info.width
                ),
            });
        }
        let needed = (info.height as usize - 1)
            .checked_mul(info.stride)
            .and_then(|n| n.checked_add(row_bytes));
        match needed {
            Some(needed) if pixels.len() >= needed => Ok(Self { pixels, info }),
            _ => Err(FrameError::InvalidSource {
                reason: format!(
                    "{} bytes cannot hold {}x{} with stride {}",
                    pixels.len(),
                    info.width,
                    info.height,
                    info.stride
                ),
            }),
        }
    }

    /// Shorthand for an RGBA_8888 view.
    pub fn rgba(pixels: &'a [u8], width: u32, height: u32, stride: usize) -> Result<Self, FrameError> {
        Self::new(
            pixels,
            BitmapInfo {
                width,
                height,
                stride,
                format: PixelFormat::Rgba8888,
            },
        )
    }

    pub fn info(&self) -> BitmapInfo {
        self.info
    }

    pub fn size(&self) -> Size {
        self.info.size()
    }

    pub fn stride(&self) -> usize {
        self.info.stride
    }

    pub fn format(&self) -> PixelFormat {
        self.info.format
    }

    pub fn pixels(&self) -> &'a [u8] {
        self.pixels
    }

    pub(crate) fn packed_view(&self) -> Result<PackedView<'a>, FrameError> {
        if !self.info.format.is_convertible() {
            return Err(FrameError::UnsupportedFormat {
                format: self.info.format,
            });
        }
        Ok(PackedView::new(self.pixels, self.size(), self.info.stride)?)
    }
}

/// Something that can lend out its pixels for the duration of a closure.
///
/// Implementations acquire whatever lock the memory needs before calling `f`
/// and release it before returning, whether `f` succeeded or not. Use
/// [`LockGuard`] so an unwinding panic releases it too.
pub trait BitmapSource {
    fn info(&self) -> Result<BitmapInfo, FrameError>;

    fn with_pixels<R, F>(&self, f: F) -> Result<R, FrameError>
    where
        F: FnOnce(SourceImage<'_>) -> R;
}

/// Runs its release action when dropped.
///
/// A helper for providers whose pixels live in lockable host memory (an
/// `AndroidBitmap_lockPixels` style API). Create it right after a successful
/// lock inside [`BitmapSource::with_pixels`]; the unlock then runs on normal
/// return, on `?` and while a panic unwinds. [`DecodedImage`] owns its pixels
/// and has nothing to release.
///
/// ```
/// use std::cell::Cell;
/// use frame_inject::LockGuard;
///
/// let locked = Cell::new(true);
/// {
///     let _guard = LockGuard::new(|| locked.set(false));
///     assert!(locked.get());
/// }
/// assert!(!locked.get());
/// ```
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct LockGuard<F: FnOnce()> {
    release: Option<F>,
}

impl<F: FnOnce()> LockGuard<F> {
    pub fn new(release: F) -> Self {
        Self {
            release: Some(release),
        }
    }
}

impl<F: FnOnce()> Drop for LockGuard<F> {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// How [`DecodedImage::open`] prepares a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Rotate/flip according to the EXIF orientation tag.
    pub apply_orientation: bool,
    /// Extra bytes at the end of each row.
    pub row_padding: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            apply_orientation: true,
            row_padding: 0,
        }
    }
}

/// An in-memory RGBA_8888 bitmap, optionally with padded rows.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pixels: Vec<u8>,
    info: BitmapInfo,
}

impl DecodedImage {
    pub fn open(path: impl AsRef<Path>, options: LoadOptions) -> Result<Self, FrameError> {
        let path = path.as_ref();
        let decode_err = |source: image::ImageError| FrameError::Decode {
            path: path.to_path_buf(),
            source,
        };

        let reader = ImageReader::open(path)
            .map_err(|e| decode_err(image::ImageError::IoError(e)))?
            .with_guessed_format()
            .map_err(|e| decode_err(image::ImageError::IoError(e)))?;
        let mut decoder = reader.into_decoder().map_err(decode_err)?;
        let orientation = decoder.orientation().map_err(decode_err)?;
        let mut image = DynamicImage::from_decoder(decoder).map_err(decode_err)?;
        if options.apply_orientation {
            debug!(?orientation, path = %path.display(), "applying orientation");
            image.apply_orientation(orientation);
        }

        Ok(Self::from_rgba(image.into_rgba8(), options.row_padding))
    }

    /// Copy `image` into rows of `width * 4 + row_padding` bytes.
    pub fn from_rgba(image: RgbaImage, row_padding: usize) -> Self {
        let (width, height) = image.dimensions();
        let row_bytes = width as usize * 4;
        let stride = row_bytes + row_padding;
        let pixels = if row_padding == 0 {
            image.into_raw()
        } else {
            let mut padded = vec![0u8; stride * height as usize];
            for (src, dst) in image
                .as_raw()
                .chunks_exact(row_bytes.max(1))
                .zip(padded.chunks_exact_mut(stride))
            {
                dst[..row_bytes].copy_from_slice(src);
            }
            padded
        };
        Self {
            pixels,
            info: BitmapInfo {
                width,
                height,
                stride,
                format: PixelFormat::Rgba8888,
            },
        }
    }

    pub fn size(&self) -> Size {
        self.info.size()
    }
}

impl BitmapSource for DecodedImage {
    fn info(&self) -> Result<BitmapInfo, FrameError> {
        Ok(self.info)
    }

    fn with_pixels<R, F>(&self, f: F) -> Result<R, FrameError>
    where
        F: FnOnce(SourceImage<'_>) -> R,
    {
        let image = SourceImage::new(&self.pixels, self.info)?;
        Ok(f(image))
    }
}
