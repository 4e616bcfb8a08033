/// Benchmark for the crop → scale → convert pipeline
///
/// Times NV21 and RGBA conversion from common photo resolutions to common
/// preview sizes, with both tight and padded source rows.
use std::time::{Duration, Instant};

use frame_inject::{convert, ConvertRequest, OutputFormat, SourceImage};

const ITERATIONS: u32 = 20;

fn main() -> anyhow::Result<()> {
    println!("Frame Conversion Benchmark");
    println!("═══════════════════════════════════");

    let sources = [(4032u32, 3024u32), (1920, 1080), (1080, 1920)];
    let targets = [(1920u32, 1080u32), (1280, 720), (640, 480), (480, 480)];

    for (sw, sh) in sources {
        for padding in [0usize, 64] {
            let stride = sw as usize * 4 + padding;
            let pixels = gradient(sw, sh, stride);
            let source = SourceImage::rgba(&pixels, sw, sh, stride)?;

            println!();
            println!("Source {}x{} (stride {} bytes)", sw, sh, stride);
            println!("───────────");
            for (tw, th) in targets {
                for format in [OutputFormat::Nv21, OutputFormat::Rgba] {
                    let request = ConvertRequest::new(tw, th, format);
                    let elapsed = time(|| convert(&source, request).map(|_| ()))?;
                    println!(
                        "  → {:>4}x{:<4} {:<4}: {:>7.2} ms per frame",
                        tw,
                        th,
                        format.extension(),
                        elapsed.as_secs_f64() * 1000.0 / ITERATIONS as f64
                    );
                }
            }
        }
    }
    Ok(())
}

fn time<F>(mut f: F) -> anyhow::Result<Duration>
where
    F: FnMut() -> Result<(), frame_inject::FrameError>,
{
    // warm-up
    f()?;
    let start = Instant::now();
    for _ in 0..ITERATIONS {
        f()?;
    }
    Ok(start.elapsed())
}

fn gradient(w: u32, h: u32, stride: usize) -> Vec<u8> {
    let mut data = vec![0u8; stride * h as usize];
    for y in 0..h as usize {
        let row = &mut data[y * stride..y * stride + w as usize * 4];
        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            px.copy_from_slice(&[(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255]);
        }
    }
    data
}
