//! # Configuration Module
//!
//! Settings for a single `framecvt` run, shared between the CLI parser and the
//! library. Validation happens here so the binary can report a readable
//! message before any file is opened.
//!
//! ## Configuration Parameters
//!
//! | Parameter | Type | Range | Description |
//! |-----------|------|-------|-------------|
//! | `input` | `PathBuf` | existing image file | Source picture |
//! | `output` | `Option<PathBuf>` | any writable path | Raw frame destination (`frame.<ext>` when unset) |
//! | `width`, `height` | `u32` | 1-16384, even for NV21 | Target frame size |
//! | `format` | `OutputFormat` | nv21 / rgba | Output byte layout |
//! | `filter` | `ScaleFilter` | box / nearest / bilinear / catmull-rom / lanczos3 | Resampling filter |
//! | `apply_orientation` | `bool` | | Honor EXIF orientation |
//! | `row_padding` | `usize` | 0-4096 | Extra bytes per source row |
//! | `tag_dimensions` | `bool` | | Append `_WxH` to the output file stem |
//!
//! ## Examples
//!
//! ```rust
//! use frame_inject::config::ConvertConfig;
//! use frame_inject::OutputFormat;
//!
//! let mut config = ConvertConfig::new("photo.jpg".into(), 1280, 720, OutputFormat::Nv21);
//! config.tag_dimensions = true;
//! assert!(config.validate().is_ok());
//! assert_eq!(config.output_path().to_str(), Some("frame_1280x720.nv21"));
//! ```

use std::path::PathBuf;

use frame_scale::cpu::ScaleFilter;

use crate::source::LoadOptions;
use crate::{ConvertRequest, OutputFormat};

/// Largest side accepted for a target frame.
pub const MAX_DIMENSION: u32 = 16384;
/// Largest row padding accepted for the source bitmap.
pub const MAX_ROW_PADDING: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertConfig {
    /// Image file to read.
    pub input: PathBuf,

    /// Where the raw frame is written. Defaults to `frame.<ext>` in the
    /// current directory, `<ext>` being the format name.
    pub output: Option<PathBuf>,

    /// Target frame width in pixels.
    pub width: u32,

    /// Target frame height in pixels.
    pub height: u32,

    pub format: OutputFormat,

    pub filter: ScaleFilter,

    /// Rotate the picture upright according to its EXIF orientation before
    /// cropping.
    pub apply_orientation: bool,

    /// Extra bytes appended to every source row, to mimic bitmaps whose
    /// stride is wider than their pixels.
    pub row_padding: usize,

    /// Append `_WxH` to the output file stem, since the raw frame carries no
    /// header.
    pub tag_dimensions: bool,
}

impl Default for ConvertConfig {
    /// 640x480 NV21 from `input.jpg`, box filter, orientation applied.
    fn default() -> Self {
        Self {
            input: PathBuf::from("input.jpg"),
            output: None,
            width: 640,
            height: 480,
            format: OutputFormat::Nv21,
            filter: ScaleFilter::Box,
            apply_orientation: true,
            row_padding: 0,
            tag_dimensions: false,
        }
    }
}

impl ConvertConfig {
    pub fn new(input: PathBuf, width: u32, height: u32, format: OutputFormat) -> Self {
        Self {
            input,
            width,
            height,
            format,
            ..Self::default()
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), String> {
        if self.input.as_os_str().is_empty() {
            return Err("Input path must not be empty".to_string());
        }
        if self.width == 0 || self.height == 0 {
            return Err("Target width and height must be greater than 0".to_string());
        }
        if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
            return Err(format!("Target dimensions must not exceed {MAX_DIMENSION}"));
        }
        if self.format.needs_even_dimensions() && (self.width % 2 != 0 || self.height % 2 != 0) {
            return Err(format!(
                "NV21 output needs even dimensions, got {}x{}",
                self.width, self.height
            ));
        }
        if self.row_padding > MAX_ROW_PADDING {
            return Err(format!("Row padding must not exceed {MAX_ROW_PADDING} bytes"));
        }
        Ok(())
    }

    pub fn to_request(&self) -> ConvertRequest {
        ConvertRequest::new(self.width, self.height, self.format).with_filter(self.filter)
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            apply_orientation: self.apply_orientation,
            row_padding: self.row_padding,
        }
    }

    /// Resolved output path, including the optional `_WxH` tag.
    pub fn output_path(&self) -> PathBuf {
        let base = self
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("frame.{}", self.format.extension())));
        if !self.tag_dimensions {
            return base;
        }
        let stem = base
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "frame".to_string());
        let name = match base.extension() {
            Some(ext) => format!("{stem}_{}x{}.{}", self.width, self.height, ext.to_string_lossy()),
            None => format!("{stem}_{}x{}", self.width, self.height),
        };
        base.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConvertConfig::default();
        assert_eq!(config.width, 640);
        assert_eq!(config.height, 480);
        assert_eq!(config.format, OutputFormat::Nv21);
        assert_eq!(config.filter, ScaleFilter::Box);
        assert!(config.apply_orientation);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ConvertConfig::default();

        config.width = 0;
        assert!(config.validate().is_err());
        config.width = 641;
        assert!(config.validate().is_err());
        config.format = OutputFormat::Rgba;
        assert!(config.validate().is_ok());
        config.width = MAX_DIMENSION + 2;
        assert!(config.validate().is_err());
        config.width = 640;

        config.row_padding = MAX_ROW_PADDING + 1;
        assert!(config.validate().is_err());
        config.row_padding = 12;

        config.input = PathBuf::new();
        assert!(config.validate().is_err());
        config.input = PathBuf::from("a.png");

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_output_path() {
        let mut config = ConvertConfig::new("a.png".into(), 320, 240, OutputFormat::Rgba);
        assert_eq!(config.output_path(), PathBuf::from("frame.rgba"));

        config.output = Some(PathBuf::from("out/shot.bin"));
        config.tag_dimensions = true;
        assert_eq!(config.output_path(), PathBuf::from("out/shot_320x240.bin"));

        config.output = Some(PathBuf::from("raw"));
        assert_eq!(config.output_path(), PathBuf::from("raw_320x240"));
    }

    #[test]
    fn test_to_request() {
        let mut config = ConvertConfig::default();
        config.filter = ScaleFilter::Lanczos3;
        let request = config.to_request();
        assert_eq!(request.target.w, 640);
        assert_eq!(request.target.h, 480);
        assert_eq!(request.filter, ScaleFilter::Lanczos3);
        assert_eq!(config.load_options().row_padding, 0);
    }
}
