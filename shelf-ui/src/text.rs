//! Text measurement and rasterization with fontdue.

use std::fs;
use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings};
use image::{Rgba, RgbaImage};
use shelf::{Color, LoadError, Pixmap, Size, TextRasterizer};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FontError {
    #[error("font not found, tried: {}", format_candidates(.0))]
    NotFound(Vec<PathBuf>),

    #[error("failed to parse font {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("font {0} has no horizontal line metrics")]
    NoLineMetrics(PathBuf),
}

fn format_candidates(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Where to look for a font: as given, then by file name under the assets
/// directory and the parent directory.
pub fn font_candidates(font_path: &Path, assets_dir: &Path) -> Vec<PathBuf> {
    let mut candidates = vec![font_path.to_path_buf()];
    if let Some(name) = font_path.file_name() {
        for dir in [assets_dir, Path::new("..")] {
            let candidate = dir.join(name);
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }
    candidates
}

/// Single-font rasterizer at a fixed pixel size.
pub struct FontRasterizer {
    font: Font,
    size: f32,
    ascent: f32,
    line_height: f32,
}

impl FontRasterizer {
    /// Load the first candidate from [`font_candidates`] that exists.
    pub fn load(font_path: &Path, assets_dir: &Path, size: f32) -> Result<Self, FontError> {
        let candidates = font_candidates(font_path, assets_dir);
        for path in &candidates {
            match fs::read(path) {
                Ok(bytes) => {
                    tracing::info!(path = %path.display(), size, "loaded font");
                    return Self::from_bytes(&bytes, path, size);
                }
                Err(e) => tracing::debug!(path = %path.display(), error = %e, "font candidate unavailable"),
            }
        }
        Err(FontError::NotFound(candidates))
    }

    pub fn from_bytes(bytes: &[u8], path: &Path, size: f32) -> Result<Self, FontError> {
        let font = Font::from_bytes(bytes, FontSettings::default()).map_err(|reason| FontError::Parse {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        })?;
        let line = font
            .horizontal_line_metrics(size)
            .ok_or_else(|| FontError::NoLineMetrics(path.to_path_buf()))?;

        Ok(Self {
            font,
            size,
            ascent: line.ascent,
            line_height: line.new_line_size,
        })
    }

    fn advance(&self, text: &str) -> f32 {
        text.chars().map(|ch| self.font.metrics(ch, self.size).advance_width).sum()
    }
}

impl TextRasterizer for FontRasterizer {
    fn measure(&self, text: &str) -> Size {
        Size::new(self.advance(text), self.line_height)
    }

    fn rasterize(&self, text: &str, color: Color) -> Result<Pixmap, LoadError> {
        let width = self.advance(text).ceil() as u32;
        let height = self.line_height.ceil() as u32;
        if width == 0 || height == 0 {
            return Err(LoadError::Rasterize(format!("{text:?} has no visible extent")));
        }

        let [r, g, b, a] = color.to_rgba8();
        let mut pixmap = RgbaImage::from_pixel(width, height, Rgba([r, g, b, 0]));

        let mut pen_x = 0.0;
        for ch in text.chars() {
            let (metrics, coverage) = self.font.rasterize(ch, self.size);
            let x = (pen_x + metrics.xmin as f32).round() as i64;
            let y = (self.ascent - metrics.ymin as f32 - metrics.height as f32).round() as i64;
            blit_coverage(&mut pixmap, &coverage, metrics.width, x, y, a);
            pen_x += metrics.advance_width;
        }

        Ok(pixmap)
    }
}

/// Merge a glyph coverage bitmap into `pixmap`'s alpha channel at (`x`, `y`),
/// clipping to the image. Overlapping glyphs keep the stronger coverage.
fn blit_coverage(pixmap: &mut RgbaImage, coverage: &[u8], glyph_width: usize, x: i64, y: i64, alpha: u8) {
    if glyph_width == 0 {
        return;
    }
    let (width, height) = (pixmap.width() as i64, pixmap.height() as i64);

    for (row, line) in coverage.chunks(glyph_width).enumerate() {
        let py = y + row as i64;
        if !(0..height).contains(&py) {
            continue;
        }
        for (col, &cov) in line.iter().enumerate() {
            let px = x + col as i64;
            if !(0..width).contains(&px) || cov == 0 {
                continue;
            }
            let value = (u16::from(cov) * u16::from(alpha) / 255) as u8;
            let pixel = pixmap.get_pixel_mut(px as u32, py as u32);
            pixel.0[3] = pixel.0[3].max(value);
        }
    }
}
