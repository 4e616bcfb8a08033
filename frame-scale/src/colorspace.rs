// SPDX-License-Identifier: MIT
//! # Packed RGBA → NV21
//!
//! BT.601 limited range ("studio swing") conversion in the 8-bit fixed point
//! form used by most camera stacks:
//!
//! ```text
//! Y = ( 66 R + 129 G +  25 B + 0x1080) >> 8     16..=235
//! U = (-38 R -  74 G + 112 B + 0x8080) >> 8     16..=240
//! V = (112 R -  94 G -  18 B + 0x8080) >> 8     16..=240
//! ```
//!
//! which is `16 + 0.257R + 0.504G + 0.098B` (and the matching chroma rows)
//! scaled by 256 with a +0.5 rounding bias.
//!
//! Output layout is NV21: `w * h` luma bytes, then `w * h / 2` bytes of
//! interleaved V,U pairs, one pair per 2x2 block. Chroma is taken from the
//! top-left pixel of each block, not an average of the four. Consumers
//! compare frames byte for byte, so this must not change.

use crate::cpu::{ScaledBuffer, BYTES_PER_PIXEL};
use crate::crop::Size;
use crate::error::{alloc_zeroed, ScaleError};

/// Owned NV21 frame: luma plane followed by the interleaved V/U plane.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanarYuvBuffer {
    data: Vec<u8>,
    size: Size,
}

impl PlanarYuvBuffer {
    /// Total byte length of an NV21 frame of `size`.
    pub const fn len_for(size: Size) -> usize {
        let luma = size.pixel_count();
        luma + luma / 2
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn luma(&self) -> &[u8] {
        &self.data[..self.size.pixel_count()]
    }

    /// Interleaved V,U plane, `w` bytes per row and `h / 2` rows.
    pub fn chroma(&self) -> &[u8] {
        &self.data[self.size.pixel_count()..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

#[inline]
fn clamp_u8(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

#[inline]
pub fn rgb_to_y(r: u8, g: u8, b: u8) -> u8 {
    let (r, g, b) = (i32::from(r), i32::from(g), i32::from(b));
    clamp_u8((66 * r + 129 * g + 25 * b + 0x1080) >> 8)
}

#[inline]
pub fn rgb_to_u(r: u8, g: u8, b: u8) -> u8 {
    let (r, g, b) = (i32::from(r), i32::from(g), i32::from(b));
    clamp_u8((-38 * r - 74 * g + 112 * b + 0x8080) >> 8)
}

#[inline]
pub fn rgb_to_v(r: u8, g: u8, b: u8) -> u8 {
    let (r, g, b) = (i32::from(r), i32::from(g), i32::from(b));
    clamp_u8((112 * r - 94 * g - 18 * b + 0x8080) >> 8)
}

/// Hand a packed buffer on unchanged.
pub fn to_packed_copy(scaled: ScaledBuffer) -> ScaledBuffer {
    scaled
}

pub fn rgba_to_nv21(scaled: &ScaledBuffer) -> Result<PlanarYuvBuffer, ScaleError> {
    rgba_to_nv21_slice(scaled.as_bytes(), scaled.size())
}

/// Convert a tightly packed RGBA buffer of `size` to a new NV21 frame.
///
/// Both sides of `size` must be even and non-zero, and `rgba` must be exactly
/// `w * h * 4` bytes.
pub fn rgba_to_nv21_slice(rgba: &[u8], size: Size) -> Result<PlanarYuvBuffer, ScaleError> {
    if size.is_empty() || size.w % 2 != 0 || size.h % 2 != 0 {
        return Err(ScaleError::dimension(format!(
            "4:2:0 output needs even, non-zero dimensions, got {}x{}",
            size.w, size.h
        )));
    }
    let expected = size.pixel_count() * BYTES_PER_PIXEL;
    if rgba.len() != expected {
        return Err(ScaleError::dimension(format!(
            "rgba input holds {} bytes, {}x{} needs {expected}",
            rgba.len(),
            size.w,
            size.h
        )));
    }

    let w = size.w as usize;
    let row_bytes = w * BYTES_PER_PIXEL;
    let mut data = alloc_zeroed(PlanarYuvBuffer::len_for(size))?;
    let (y_plane, vu_plane) = data.split_at_mut(size.pixel_count());

    for (src_row, y_row) in rgba.chunks_exact(row_bytes).zip(y_plane.chunks_exact_mut(w)) {
        for (px, y) in src_row.chunks_exact(BYTES_PER_PIXEL).zip(y_row.iter_mut()) {
            *y = rgb_to_y(px[0], px[1], px[2]);
        }
    }

    // One chroma row per pair of source rows, sampled from the upper row.
    for (row_pair, vu_row) in rgba
        .chunks_exact(row_bytes * 2)
        .zip(vu_plane.chunks_exact_mut(w))
    {
        let top = &row_pair[..row_bytes];
        for (block, vu) in top
            .chunks_exact(BYTES_PER_PIXEL * 2)
            .zip(vu_row.chunks_exact_mut(2))
        {
            let (r, g, b) = (block[0], block[1], block[2]);
            vu[0] = rgb_to_v(r, g, b);
            vu[1] = rgb_to_u(r, g, b);
        }
    }

    Ok(PlanarYuvBuffer { data, size })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(size: Size, rgba: [u8; 4]) -> ScaledBuffer {
        let data = rgba.repeat(size.pixel_count());
        ScaledBuffer::from_packed(data, size).unwrap()
    }

    #[test]
    fn mid_gray_is_neutral() {
        let size = Size::new(8, 6);
        let out = rgba_to_nv21(&solid(size, [128, 128, 128, 255])).unwrap();
        assert_eq!(out.as_bytes().len(), 8 * 6 + 8 * 6 / 2);
        assert!(out.luma().iter().all(|&y| y == 126));
        assert!(out.chroma().iter().all(|&c| c == 128));
    }

    #[test]
    fn black_and_white_hit_studio_range() {
        let size = Size::new(2, 2);
        let white = rgba_to_nv21(&solid(size, [255, 255, 255, 255])).unwrap();
        assert_eq!(white.luma(), &[235; 4]);
        assert_eq!(white.chroma(), &[128, 128]);

        let black = rgba_to_nv21(&solid(size, [0, 0, 0, 0])).unwrap();
        assert_eq!(black.luma(), &[16; 4]);
        assert_eq!(black.chroma(), &[128, 128]);
    }

    #[test]
    fn chroma_is_vu_ordered() {
        let red = rgba_to_nv21(&solid(Size::new(2, 2), [255, 0, 0, 255])).unwrap();
        // V is high for red, U is low.
        assert_eq!(red.chroma(), &[rgb_to_v(255, 0, 0), rgb_to_u(255, 0, 0)]);
        assert!(red.chroma()[0] > 200);
        assert!(red.chroma()[1] < 128);
    }

    #[test]
    fn chroma_samples_top_left_of_each_block() {
        // Block (0,0) top-left red, the other three blue. Block (1,0) all
        // green except its top-left, which is white.
        let size = Size::new(4, 2);
        let red = [255, 0, 0, 255];
        let blue = [0, 0, 255, 255];
        let green = [0, 255, 0, 255];
        let white = [255, 255, 255, 255];
        let rows = [[red, blue, white, green], [blue, blue, green, green]];
        let data: Vec<u8> = rows.iter().flatten().flatten().copied().collect();
        let scaled = ScaledBuffer::from_packed(data, size).unwrap();

        let out = rgba_to_nv21(&scaled).unwrap();
        assert_eq!(
            out.chroma(),
            &[
                rgb_to_v(255, 0, 0),
                rgb_to_u(255, 0, 0),
                rgb_to_v(255, 255, 255),
                rgb_to_u(255, 255, 255),
            ]
        );
        assert_eq!(
            out.luma(),
            &[
                rgb_to_y(255, 0, 0),
                rgb_to_y(0, 0, 255),
                rgb_to_y(255, 255, 255),
                rgb_to_y(0, 255, 0),
                rgb_to_y(0, 0, 255),
                rgb_to_y(0, 0, 255),
                rgb_to_y(0, 255, 0),
                rgb_to_y(0, 255, 0),
            ]
        );
    }

    #[test]
    fn plane_layout_follows_rows() {
        // Each 2-row band has its own color; chroma rows must follow.
        let size = Size::new(2, 4);
        let mut data = [10, 200, 30, 255].repeat(4);
        data.extend([220, 40, 90, 255].repeat(4));
        let out = rgba_to_nv21(&ScaledBuffer::from_packed(data, size).unwrap()).unwrap();

        assert_eq!(out.luma().len(), 8);
        assert_eq!(out.chroma().len(), 4);
        assert_eq!(out.chroma()[..2], [rgb_to_v(10, 200, 30), rgb_to_u(10, 200, 30)]);
        assert_eq!(out.chroma()[2..], [rgb_to_v(220, 40, 90), rgb_to_u(220, 40, 90)]);
    }

    #[test]
    fn fixed_point_tracks_float_formulas() {
        let float_round = |v: f64| v.round().clamp(0.0, 255.0) as i32;
        for r in (0..=255u8).step_by(15) {
            for g in (0..=255u8).step_by(17) {
                for b in (0..=255u8).step_by(5) {
                    let (fr, fg, fb) = (f64::from(r), f64::from(g), f64::from(b));
                    let y = float_round(16.0 + 0.257 * fr + 0.504 * fg + 0.098 * fb);
                    let u = float_round(128.0 - 0.148 * fr - 0.291 * fg + 0.439 * fb);
                    let v = float_round(128.0 + 0.439 * fr - 0.368 * fg - 0.071 * fb);
                    assert!((i32::from(rgb_to_y(r, g, b)) - y).abs() <= 1, "Y {r} {g} {b}");
                    assert!((i32::from(rgb_to_u(r, g, b)) - u).abs() <= 1, "U {r} {g} {b}");
                    assert!((i32::from(rgb_to_v(r, g, b)) - v).abs() <= 1, "V {r} {g} {b}");
                }
            }
        }
    }

    #[test]
    fn alpha_is_ignored() {
        let size = Size::new(2, 2);
        let opaque = rgba_to_nv21(&solid(size, [90, 60, 30, 255])).unwrap();
        let clear = rgba_to_nv21(&solid(size, [90, 60, 30, 0])).unwrap();
        assert_eq!(opaque, clear);
    }

    #[test]
    fn rejects_odd_and_empty_dimensions() {
        for size in [Size::new(3, 2), Size::new(2, 3), Size::new(0, 2)] {
            let data = vec![0u8; size.pixel_count() * 4];
            let err = rgba_to_nv21_slice(&data, size).unwrap_err();
            assert!(matches!(err, ScaleError::DimensionMismatch { .. }), "{size:?}");
        }
    }

    #[test]
    fn rejects_wrong_input_length() {
        let err = rgba_to_nv21_slice(&[0u8; 15], Size::new(2, 2)).unwrap_err();
        assert!(matches!(err, ScaleError::DimensionMismatch { .. }));
    }

    #[test]
    fn packed_copy_is_a_hand_off() {
        let scaled = solid(Size::new(2, 2), [1, 2, 3, 4]);
        let ptr = scaled.as_bytes().as_ptr();
        let out = to_packed_copy(scaled);
        assert_eq!(out.as_bytes().as_ptr(), ptr);
        assert_eq!(out.as_bytes().len(), 16);
    }
}
