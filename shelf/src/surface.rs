//! Collaborators the list engine draws and reads input through.
//!
//! The engine never talks to a window system directly. A platform backend
//! implements these traits; tests use in-memory fakes.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::input::{CursorIcon, InputEvent};
use crate::primitives::{Color, Rect, Size};

/// Decoded or rasterized pixels, straight (non-premultiplied) RGBA8.
pub type Pixmap = image::RgbaImage;

/// Failure to produce a texture. Never fatal: the element is skipped for the
/// frame and the load is retried next time.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("failed to rasterize text: {0}")]
    Rasterize(String),
    #[error("failed to upload texture: {0}")]
    Upload(String),
}

impl LoadError {
    pub fn decode(path: &Path, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

/// A texture resident on the drawing surface. Dropping it releases it.
pub trait Texture {
    /// Size in logical pixels.
    fn size(&self) -> Size;
}

/// Drawing surface.
pub trait Surface {
    type Texture: Texture;

    /// Current drawable size in logical pixels.
    fn viewport(&self) -> Size;

    fn create_texture(&self, pixels: &Pixmap) -> Result<Self::Texture, LoadError>;

    /// Start a frame filled with `color`.
    fn clear(&mut self, color: Color);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draw `texture` stretched to `dest`.
    fn draw_texture(&mut self, texture: &Self::Texture, dest: Rect);

    fn set_cursor(&mut self, icon: CursorIcon);

    /// Show the frame.
    fn present(&mut self);
}

/// Text measurement and rasterization.
pub trait TextRasterizer {
    /// Extent of `text` on one line.
    fn measure(&self, text: &str) -> Size;

    fn rasterize(&self, text: &str, color: Color) -> Result<Pixmap, LoadError>;
}

/// Image file decoding.
pub trait ImageDecoder {
    fn decode(&self, path: &Path) -> Result<Pixmap, LoadError>;
}

/// Platform event queue.
pub trait EventSource {
    /// Append every pending event to `events` without blocking.
    fn poll_events(&mut self, events: &mut Vec<InputEvent>);
}

/// Hands URLs to the operating system. Fire-and-forget: failures are the
/// implementation's to log.
pub trait LinkOpener {
    fn open(&mut self, url: &str);
}
