//! Frame renderer for the item list and the error screen.
//!
//! Every frame is drawn from scratch: clear, lay out, draw each visible row,
//! present. Textures for covers and text runs come from two persistent
//! caches, so steady-state frames create no new resources.

use crate::item::ListItem;
use crate::layout::{layout_rows, link_hit_rect, ListMetrics, RowLayout};
use crate::primitives::{Color, Point, Rect, Size};
use crate::surface::{ImageDecoder, Surface, TextRasterizer, Texture};
use crate::texture_cache::{text_key, TextureCache};
use crate::wrap::{wrap_text, WrapOptions};

/// Where the error screen draws its two lines.
const MESSAGE_ORIGIN: Point = Point::new(20.0, 20.0);
const MESSAGE_LINE_SPACING: f32 = 20.0;

/// Prompt shown below an error message.
pub const DISMISS_PROMPT: &str = "Press ESC to continue";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    /// Fill of the selected row.
    pub selection: Color,
    pub error: Color,
    pub link: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::rgb8(32, 32, 32),
            text: Color::rgb8(200, 200, 200),
            selection: Color::BLACK,
            error: Color::rgb8(255, 0, 0),
            link: Color::rgb8(0, 120, 215),
        }
    }
}

/// Draws frames and owns the texture caches that back them.
pub struct FrameRenderer<T> {
    fonts: Box<dyn TextRasterizer>,
    decoder: Box<dyn ImageDecoder>,
    images: TextureCache<T>,
    texts: TextureCache<T>,
    theme: Theme,
    metrics: ListMetrics,
    link_label: String,
    warned_degenerate: bool,
}

impl<T> FrameRenderer<T> {
    pub fn new(
        fonts: Box<dyn TextRasterizer>,
        decoder: Box<dyn ImageDecoder>,
        theme: Theme,
        metrics: ListMetrics,
        link_label: impl Into<String>,
    ) -> Self {
        Self {
            fonts,
            decoder,
            images: TextureCache::new("images"),
            texts: TextureCache::new("text"),
            theme,
            metrics,
            link_label: link_label.into(),
            warned_degenerate: false,
        }
    }

    pub fn metrics(&self) -> &ListMetrics {
        &self.metrics
    }

    pub fn image_cache(&self) -> &TextureCache<T> {
        &self.images
    }

    pub fn text_cache(&self) -> &TextureCache<T> {
        &self.texts
    }

    /// Drop every cached texture.
    pub fn release(&mut self) {
        self.images.clear();
        self.texts.clear();
    }
}

impl<T: Texture> FrameRenderer<T> {
    /// Draw one frame of the list and return the row geometry that was drawn,
    /// including the link hit rectangles.
    pub fn render_list<S>(
        &mut self,
        surface: &mut S,
        items: &[ListItem],
        selected: Option<usize>,
        scroll_offset: f32,
    ) -> Vec<RowLayout>
    where
        S: Surface<Texture = T>,
    {
        let viewport = surface.viewport();
        surface.clear(self.theme.background);

        let mut rows = layout_rows(items, selected, scroll_offset, &self.metrics, viewport);
        let screen = Rect::from_origin_size(Point::ORIGIN, viewport);

        for (row, item) in rows.iter_mut().zip(items) {
            if row.row_rect.intersects(&screen) {
                self.draw_row(surface, item, row);
            }
        }

        surface.present();
        rows
    }

    /// Draw the error screen: the message in the error color with a dismiss
    /// prompt below it.
    pub fn render_message<S>(&mut self, surface: &mut S, message: &str)
    where
        S: Surface<Texture = T>,
    {
        surface.clear(self.theme.background);

        let fonts = &*self.fonts;
        let prompt_origin = Point::new(MESSAGE_ORIGIN.x, MESSAGE_ORIGIN.y + MESSAGE_LINE_SPACING);
        draw_text(surface, &mut self.texts, fonts, &format!("Error: {message}"), MESSAGE_ORIGIN, self.theme.error);
        draw_text(surface, &mut self.texts, fonts, DISMISS_PROMPT, prompt_origin, self.theme.text);

        surface.present();
    }

    fn draw_row<S>(&mut self, surface: &mut S, item: &ListItem, row: &mut RowLayout)
    where
        S: Surface<Texture = T>,
    {
        if let Some(highlight) = row.highlight {
            surface.fill_rect(highlight, self.theme.selection);
        }

        if let (Some(dest), Some(path)) = (row.cover_rect, item.cover_image_path.as_deref()) {
            let decoder = &*self.decoder;
            let key = path.to_string_lossy();
            let cover = self.images.get(&key, || {
                let pixels = decoder.decode(path)?;
                surface.create_texture(&pixels)
            });
            if let Some(texture) = cover {
                surface.draw_texture(texture, dest);
            }
        }

        let fonts = &*self.fonts;
        draw_text(surface, &mut self.texts, fonts, &item.title, row.title_origin, self.theme.text);
        draw_text(surface, &mut self.texts, fonts, &item.subtitle, row.subtitle_origin, self.theme.text);

        if item.description.is_empty() {
            return;
        }

        let bounds = row.description_bounds;
        if !(bounds.width > 0.0) {
            if !self.warned_degenerate {
                tracing::warn!(width = bounds.width, "no room for descriptions at this window width");
                self.warned_degenerate = true;
            }
            return;
        }

        let label = item
            .detail_link
            .as_ref()
            .map(|_| self.link_label.as_str())
            .filter(|l| !l.is_empty());
        let options = WrapOptions {
            width: bounds.width,
            max_lines: self.metrics.description_lines,
            link_label: label,
        };
        let wrapped = wrap_text(&item.description, &options, |s| fonts.measure(s).width);

        for (i, line) in wrapped.lines().iter().enumerate() {
            let origin = Point::new(bounds.x, bounds.y + i as f32 * self.metrics.description_line_height);
            draw_text(surface, &mut self.texts, fonts, &line.text, origin, self.theme.text);

            if let (true, Some(label)) = (line.is_link_suffix, label) {
                let text_width = if line.text.is_empty() {
                    0.0
                } else {
                    fonts.measure(&line.text).width
                };
                let label_width = fonts.measure(label).width;
                let rect = link_hit_rect(bounds, i, text_width, label_width, &self.metrics);
                draw_text(surface, &mut self.texts, fonts, label, rect.origin(), self.theme.link);
                row.link_hit_rect = Some(rect);
            }
        }
    }
}

/// Draw `text` through the text cache. Returns the drawn size, or `None` if
/// nothing was drawn.
fn draw_text<S: Surface>(
    surface: &mut S,
    cache: &mut TextureCache<S::Texture>,
    fonts: &dyn TextRasterizer,
    text: &str,
    origin: Point,
    color: Color,
) -> Option<Size> {
    if text.is_empty() {
        return None;
    }

    let key = text_key(text, color);
    let texture = cache.get(&key, || {
        let pixels = fonts.rasterize(text, color)?;
        surface.create_texture(&pixels)
    })?;

    let size = texture.size();
    surface.draw_texture(texture, Rect::from_origin_size(origin, size));
    Some(size)
}
