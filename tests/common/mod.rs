//! Shared fixtures for the integration tests.

#![allow(dead_code)]

pub const RED: [u8; 4] = [255, 0, 0, 255];
pub const GREEN: [u8; 4] = [0, 255, 0, 255];
pub const BLUE: [u8; 4] = [0, 0, 255, 255];

/// Every selectable resampling filter.
pub fn all_filters() -> &'static [frame_inject::ScaleFilter] {
    <frame_inject::ScaleFilter as clap::ValueEnum>::value_variants()
}

/// Within one step per channel; fixed-point filter weights may round a flat
/// color by one.
pub fn near(px: &[u8], expected: [u8; 4]) -> bool {
    px.iter().zip(expected).all(|(&a, b)| a.abs_diff(b) <= 1)
}

/// Deterministic RGBA pattern, tightly packed.
pub fn pattern(w: u32, h: u32, seed: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            data.extend_from_slice(&[
                (x.wrapping_mul(5) ^ seed) as u8,
                (y.wrapping_mul(3).wrapping_add(seed)) as u8,
                (x + y) as u8,
                (200 + (x % 50)) as u8,
            ]);
        }
    }
    data
}

/// One solid color, tightly packed.
pub fn solid(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    rgba.repeat((w * h) as usize)
}

/// Copy a tight buffer into rows of `stride` bytes; the padding is filled
/// with a value that would show up if it were ever read.
pub fn pad_rows(tight: &[u8], w: u32, stride: usize) -> Vec<u8> {
    let row = w as usize * 4;
    let rows = tight.len() / row;
    let mut out = vec![0x5A; stride * rows];
    for (r, chunk) in tight.chunks_exact(row).enumerate() {
        out[r * stride..r * stride + row].copy_from_slice(chunk);
    }
    out
}

/// `w x h` image whose outer `border` columns (or rows, when `vertical`) are
/// `edge` and whose middle is `center`.
pub fn banded(w: u32, h: u32, border: u32, vertical: bool, edge: [u8; 4], center: [u8; 4]) -> Vec<u8> {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            let pos = if vertical { y } else { x };
            let len = if vertical { h } else { w };
            let color = if pos < border || pos >= len - border {
                edge
            } else {
                center
            };
            data.extend_from_slice(&color);
        }
    }
    data
}
