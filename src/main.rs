use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use frame_inject::config::ConvertConfig;
use frame_inject::{convert_bitmap, DecodedImage, OutputFormat, ScaleFilter};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Center-crop a picture to a camera frame size and dump the raw bytes:
/// - nv21: Y plane + interleaved V/U plane (w*h*3/2 bytes)
/// - rgba: packed RGBA_8888 (w*h*4 bytes)
#[derive(Parser, Debug)]
#[command(name = "framecvt")]
#[command(about = "Convert an image into a raw NV21 or RGBA camera frame")]
#[command(long_about = "Center-crop an image to the target aspect ratio, scale it with a box filter \
and write the raw frame bytes. The output has no header; the dimensions are the ones you pass.")]
struct Args {
    /// Source image (any format the image crate can decode)
    input: PathBuf,

    /// Target frame size
    #[arg(short, long, default_value = "640x480", help = "Target size as WIDTHxHEIGHT, e.g. 1280x720")]
    size: String,

    /// Output byte layout
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Nv21)]
    format: OutputFormat,

    /// Resampling filter
    #[arg(long, value_enum, default_value_t = ScaleFilter::Box)]
    filter: ScaleFilter,

    /// Output file
    #[arg(short, long, help = "Output path (defaults to frame.nv21 / frame.rgba)")]
    output: Option<PathBuf>,

    /// Keep the stored orientation instead of applying the EXIF tag
    #[arg(long)]
    no_orientation: bool,

    /// Extra bytes per source row
    #[arg(long, default_value_t = 0, help = "Pad each source row by this many bytes (stride testing)")]
    pad_rows: usize,

    /// Append _WxH to the output file name
    #[arg(long)]
    tag_dims: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let (width, height) = parse_size(&args.size)?;

    let mut config = ConvertConfig::new(args.input, width, height, args.format);
    config.output = args.output;
    config.filter = args.filter;
    config.apply_orientation = !args.no_orientation;
    config.row_padding = args.pad_rows;
    config.tag_dimensions = args.tag_dims;
    config.validate().map_err(anyhow::Error::msg)?;

    let image = DecodedImage::open(&config.input, config.load_options())
        .with_context(|| format!("reading {}", config.input.display()))?;
    info!(
        "loaded {} ({}x{})",
        config.input.display(),
        image.size().w,
        image.size().h
    );

    let frame = convert_bitmap(&image, config.to_request())?;
    let output = config.output_path();
    std::fs::write(&output, frame.as_bytes())
        .with_context(|| format!("writing {}", output.display()))?;

    info!(
        "wrote {} bytes of {}x{} {} to {}",
        frame.as_bytes().len(),
        width,
        height,
        config.format.extension(),
        output.display()
    );
    Ok(())
}

/// Parse a size string like "1280x720" into (width, height)
fn parse_size(size: &str) -> Result<(u32, u32)> {
    let (w, h) = size
        .to_lowercase()
        .split_once('x')
        .map(|(w, h)| (w.trim().to_string(), h.trim().to_string()))
        .ok_or_else(|| anyhow::anyhow!("Invalid size format: {}. Use WIDTHxHEIGHT, e.g. 640x480", size))?;
    let width: u32 = w.parse().map_err(|_| anyhow::anyhow!("Invalid width in size: {}", w))?;
    let height: u32 = h.parse().map_err(|_| anyhow::anyhow!("Invalid height in size: {}", h))?;
    Ok((width, height))
}
