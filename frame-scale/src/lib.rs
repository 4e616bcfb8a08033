// SPDX-License-Identifier: MIT
//! # frame-scale: Center-Crop Scaling and NV21 Conversion
//!
//! The numeric core behind `frame_inject`: turns an arbitrary RGBA bitmap into
//! a frame of exactly the size a camera consumer asked for.
//!
//! ## Stages
//!
//! - [`crop`]: centered crop rectangle with the destination's aspect ratio
//! - [`cpu`]: stride-aware crop + resize on fast_image_resize (box filter by default)
//! - [`colorspace`]: packed hand-off or BT.601 RGBA → NV21
//!
//! Every stage is a pure function of its inputs. Nothing is cached between
//! calls, so independent frames can be converted on as many threads as
//! needed.
//!
//! ## Usage Example
//!
//! ```rust
//! use frame_scale::colorspace::rgba_to_nv21;
//! use frame_scale::cpu::{scale_rgba_cpu, PackedView, ScaleFilter};
//! use frame_scale::crop::{center_crop, Size};
//!
//! let src_size = Size::new(64, 36);
//! let pixels = vec![128u8; 64 * 36 * 4];
//! let src = PackedView::new(&pixels, src_size, 64 * 4)?;
//!
//! let target = Size::new(16, 16);
//! let crop = center_crop(src_size, target);
//! let mut resizer = fast_image_resize::Resizer::new();
//! let scaled = scale_rgba_cpu(&mut resizer, &src, crop, target, ScaleFilter::Box, None)?;
//! let nv21 = rgba_to_nv21(&scaled)?;
//! assert_eq!(nv21.as_bytes().len(), 16 * 16 * 3 / 2);
//! # Ok::<(), frame_scale::ScaleError>(())
//! ```

pub mod colorspace;
pub mod cpu;
pub mod crop;
pub mod error;

pub use error::ScaleError;
