// SPDX-License-Identifier: MIT
//! # Center-Crop Geometry
//!
//! Computes the source rectangle that has the destination's aspect ratio and
//! is centered in the source. The rectangle is handed to the scaler as a crop
//! box, so the scaler never sees pixels outside of it.
//!
//! ## Rules
//!
//! - Source relatively wider than the destination: keep the full height, cut
//!   the sides.
//! - Source relatively taller, or exactly the same aspect: keep the full
//!   width, cut top and bottom.
//! - The derived side is truncated toward zero, so an odd leftover puts the
//!   extra pixel on the right/bottom edge.
//!
//! All arithmetic is done on integers (cross-multiplied in `u64`), which gives
//! the exact truncation of `src_h * dst_w / dst_h` without float error.

/// Represents a 2D size with width and height in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    pub const fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    /// True when either side is zero.
    pub const fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    pub const fn pixel_count(&self) -> usize {
        (self.w as usize) * (self.h as usize)
    }
}

/// Rectangle in source pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl CropRect {
    /// The rectangle covering all of `size`.
    pub const fn full(size: Size) -> Self {
        Self {
            x: 0,
            y: 0,
            w: size.w,
            h: size.h,
        }
    }

    pub const fn size(&self) -> Size {
        Size {
            w: self.w,
            h: self.h,
        }
    }

    /// True when the rectangle is non-empty and lies entirely inside `bounds`.
    pub fn fits_within(&self, bounds: Size) -> bool {
        let right = u64::from(self.x) + u64::from(self.w);
        let bottom = u64::from(self.y) + u64::from(self.h);
        self.w > 0 && self.h > 0 && right <= u64::from(bounds.w) && bottom <= u64::from(bounds.h)
    }
}

/// Compute the centered crop of `src` matching the aspect ratio of `dst`.
///
/// Both sizes must be non-empty; the result always fits within `src` and is
/// at least one pixel on each side.
pub fn center_crop(src: Size, dst: Size) -> CropRect {
    let (sw, sh) = (u64::from(src.w), u64::from(src.h));
    let (dw, dh) = (u64::from(dst.w.max(1)), u64::from(dst.h.max(1)));

    // sw/sh > dw/dh, without dividing
    if sw * dh > dw * sh {
        let w = ((sh * dw) / dh).clamp(1, sw) as u32;
        CropRect {
            x: (src.w - w) / 2,
            y: 0,
            w,
            h: src.h,
        }
    } else {
        let h = ((sw * dh) / dw).clamp(1, sh) as u32;
        CropRect {
            x: 0,
            y: (src.h - h) / 2,
            w: src.w,
            h,
        }
    }
}
