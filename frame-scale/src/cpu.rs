// SPDX-License-Identifier: MIT
// CPU scaler built on fast_image_resize (SIMD-accelerated).
// RGBA8 crop in → tightly packed RGBA8 out, one allocation per call.

use fast_image_resize as fir;
use fir::images::{TypedCroppedImage, TypedImage, TypedImageRef};
use fir::pixels::U8x4;
use fir::{FilterType, ResizeAlg, ResizeOptions, Resizer};
use tracing::debug;

use crate::crop::{CropRect, Size};
use crate::error::{alloc_zeroed, ScaleError};

pub const BYTES_PER_PIXEL: usize = 4;

/// Resampling filter used when the crop and output sizes differ.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ScaleFilter {
    /// Area average of every source pixel under the output pixel.
    #[default]
    Box,
    Nearest,
    Bilinear,
    CatmullRom,
    Lanczos3,
}

impl ScaleFilter {
    pub fn resize_alg(self) -> ResizeAlg {
        match self {
            ScaleFilter::Box => ResizeAlg::Convolution(FilterType::Box),
            ScaleFilter::Nearest => ResizeAlg::Nearest,
            ScaleFilter::Bilinear => ResizeAlg::Convolution(FilterType::Bilinear),
            ScaleFilter::CatmullRom => ResizeAlg::Convolution(FilterType::CatmullRom),
            ScaleFilter::Lanczos3 => ResizeAlg::Convolution(FilterType::Lanczos3),
        }
    }
}

/// Borrowed, possibly strided, packed 4-byte-per-pixel image.
#[derive(Clone, Copy, Debug)]
pub struct PackedView<'a> {
    data: &'a [u8],
    size: Size,
    stride: usize,
}

impl<'a> PackedView<'a> {
    /// `stride` is the distance in bytes between row starts. The last row only
    /// needs `width * 4` bytes, so buffers trimmed after the final pixel are
    /// accepted.
    pub fn new(data: &'a [u8], size: Size, stride: usize) -> Result<Self, ScaleError> {
        if size.is_empty() {
            return Err(ScaleError::dimension(format!(
                "source must be non-empty, got {}x{}",
                size.w, size.h
            )));
        }
        let row_bytes = size.w as usize * BYTES_PER_PIXEL;
        if stride < row_bytes {
            return Err(ScaleError::dimension(format!(
                "stride {stride} is smaller than a {}px row ({row_bytes} bytes)",
                size.w
            )));
        }
        let needed = (size.h as usize - 1)
            .checked_mul(stride)
            .and_then(|n| n.checked_add(row_bytes))
            .ok_or_else(|| ScaleError::dimension("source extent overflows usize"))?;
        if data.len() < needed {
            return Err(ScaleError::dimension(format!(
                "source holds {} bytes, {}x{} with stride {stride} needs {needed}",
                data.len(),
                size.w,
                size.h
            )));
        }
        Ok(Self { data, size, stride })
    }

    /// View over a tightly packed buffer (`stride == width * 4`).
    pub fn tight(data: &'a [u8], size: Size) -> Result<Self, ScaleError> {
        Self::new(data, size, size.w as usize * BYTES_PER_PIXEL)
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Bytes of `w` pixels starting at pixel `(x, y)`.
    #[inline]
    pub fn row_span(&self, x: u32, y: u32, w: u32) -> &'a [u8] {
        let start = y as usize * self.stride + x as usize * BYTES_PER_PIXEL;
        &self.data[start..start + w as usize * BYTES_PER_PIXEL]
    }

    /// The whole buffer as one `(stride / 4) x height` image, padding
    /// included, when the layout allows it.
    fn as_padded_image(&self) -> Result<Option<TypedImageRef<'a, U8x4>>, ScaleError> {
        if self.stride % BYTES_PER_PIXEL != 0 {
            return Ok(None);
        }
        let Ok(width) = u32::try_from(self.stride / BYTES_PER_PIXEL) else {
            return Ok(None);
        };
        let len = self.stride * self.size.h as usize;
        if self.data.len() < len {
            return Ok(None);
        }
        let image = TypedImageRef::<U8x4>::from_buffer(width, self.size.h, &self.data[..len])?;
        Ok(Some(image))
    }
}

/// Owned, tightly packed RGBA output of the scaler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScaledBuffer {
    data: Vec<u8>,
    size: Size,
}

impl ScaledBuffer {
    /// Wrap an existing packed buffer; its length must be `w * h * 4`.
    pub fn from_packed(data: Vec<u8>, size: Size) -> Result<Self, ScaleError> {
        let expected = size.pixel_count() * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(ScaleError::dimension(format!(
                "packed buffer holds {} bytes, {}x{} needs {expected}",
                data.len(),
                size.w,
                size.h
            )));
        }
        Ok(Self { data, size })
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Scratch used to compact strided crop rows when the source cannot be
/// viewed in place.
pub struct Staging {
    pub(crate) buf: Vec<u8>,
}
impl Staging {
    pub fn new() -> Self { Self { buf: Vec::new() } }
    pub fn ensure_len(&mut self, len: usize) -> Result<(), ScaleError> {
        if self.buf.len() < len {
            self.buf
                .try_reserve_exact(len - self.buf.len())
                .map_err(|_| ScaleError::AllocationFailure { bytes: len })?;
            self.buf.resize(len, 0);
        }
        Ok(())
    }
    pub fn as_slice(&self) -> &[u8] { &self.buf }
}

impl Default for Staging {
    fn default() -> Self { Self::new() }
}

/// Main scaling entry point.
///
/// Reads only the pixels inside `crop` and writes a freshly allocated
/// `dst.w * dst.h * 4` byte buffer. `staging` is only touched when the source
/// stride is not a whole number of pixels; without it a call-local scratch is
/// used.
pub fn scale_rgba_cpu(
    resizer: &mut Resizer,
    src: &PackedView<'_>,
    crop: CropRect,
    dst: Size,
    filter: ScaleFilter,
    staging: Option<&mut Staging>,
) -> Result<ScaledBuffer, ScaleError> {
    if dst.is_empty() || !crop.fits_within(src.size()) {
        return Err(ScaleError::InvalidRegion {
            crop,
            src: src.size(),
            dst,
        });
    }

    let out_len = dst
        .pixel_count()
        .checked_mul(BYTES_PER_PIXEL)
        .ok_or(ScaleError::AllocationFailure { bytes: usize::MAX })?;
    let mut out = alloc_zeroed(out_len)?;

    if crop.size() == dst {
        debug!(?crop, ?dst, "crop matches output, copying rows");
        let row_bytes = dst.w as usize * BYTES_PER_PIXEL;
        for (r, d) in out.chunks_exact_mut(row_bytes).enumerate() {
            d.copy_from_slice(src.row_span(crop.x, crop.y + r as u32, crop.w));
        }
        return Ok(ScaledBuffer { data: out, size: dst });
    }

    let opts = ResizeOptions::new()
        .resize_alg(filter.resize_alg())
        .use_alpha(false);

    {
        let mut dst_image = TypedImage::<U8x4>::from_buffer(dst.w, dst.h, &mut out)?;
        if let Some(full) = src.as_padded_image()? {
            debug!(?crop, ?dst, ?filter, "scaling crop view in place");
            // Filter windows clamp to the view edges, so the view must be the
            // crop itself and not the padded frame.
            let view = TypedCroppedImage::from_ref(&full, crop.x, crop.y, crop.w, crop.h)?;
            resizer.resize_typed::<U8x4>(&view, &mut dst_image, &opts)?;
        } else {
            debug!(?crop, ?dst, ?filter, stride = src.stride(), "compacting crop rows");
            let mut local;
            let st = match staging {
                Some(st) => st,
                None => {
                    local = Staging::new();
                    &mut local
                }
            };
            let len = compact_crop(src, crop, st)?;
            let view = TypedImageRef::<U8x4>::from_buffer(crop.w, crop.h, &st.as_slice()[..len])?;
            resizer.resize_typed::<U8x4>(&view, &mut dst_image, &opts)?;
        }
    }

    Ok(ScaledBuffer { data: out, size: dst })
}

/// Copy the rows of `crop` into `staging`, tightly packed. Returns the number
/// of bytes written.
#[inline]
fn compact_crop(src: &PackedView<'_>, crop: CropRect, staging: &mut Staging) -> Result<usize, ScaleError> {
    let row_bytes = crop.w as usize * BYTES_PER_PIXEL;
    let len = row_bytes * crop.h as usize;
    staging.ensure_len(len)?;
    for (r, d) in staging.buf[..len].chunks_exact_mut(row_bytes).enumerate() {
        d.copy_from_slice(src.row_span(crop.x, crop.y + r as u32, crop.w));
    }
    Ok(len)
}
