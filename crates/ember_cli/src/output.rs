//! Writing rendered images to disk or stdout.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use ember_renderer::ImageBuffer;

/// Plain-text PPM (P3), one pixel per line.
pub fn write_ppm<W: Write>(out: &mut W, image: &ImageBuffer) -> io::Result<()> {
    writeln!(out, "P3\n{} {}\n255", image.width, image.height)?;
    for rgb in image.to_rgb8().chunks_exact(3) {
        writeln!(out, "{} {} {}", rgb[0], rgb[1], rgb[2])?;
    }
    out.flush()
}

pub fn write_png(path: &Path, image: &ImageBuffer) -> Result<()> {
    let rgb = image::RgbImage::from_raw(image.width, image.height, image.to_rgb8())
        .ok_or_else(|| anyhow!("pixel buffer does not match {}x{}", image.width, image.height))?;
    rgb.save(path)
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Write `image` in the format named by the extension of `path`.
/// `-` writes PPM to stdout.
pub fn save(path: &Path, image: &ImageBuffer) -> Result<()> {
    if path.as_os_str() == "-" {
        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        return write_ppm(&mut out, image).context("failed to write image to stdout");
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("ppm") => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_ppm(&mut BufWriter::new(file), image)
                .with_context(|| format!("failed to write {}", path.display()))
        }
        Some("png") => write_png(path, image),
        _ => bail!(
            "unsupported output format for {} (use .ppm or .png)",
            path.display()
        ),
    }
}
