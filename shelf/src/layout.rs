//! Row geometry for the vertical item list.
//!
//! Layout is a pure function of the items, the selection, the scroll offset
//! and the viewport. It is recomputed every frame; nothing here is retained.

use crate::item::ListItem;
use crate::primitives::{Point, Rect, Size};

/// Fixed geometry of the list, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListMetrics {
    /// Gap above the first row.
    pub top_padding: f32,
    /// Height of a row's content (and of the highlight).
    pub row_height: f32,
    /// Gap between consecutive rows.
    pub row_padding: f32,
    /// Cover images are square.
    pub cover_size: f32,
    pub cover_x: f32,
    /// Text column start when the row has a cover.
    pub text_x_with_cover: f32,
    /// Text column start when the row has no cover.
    pub text_x: f32,
    pub right_margin: f32,
    pub subtitle_offset: f32,
    pub description_offset: f32,
    pub description_line_height: f32,
    pub description_lines: usize,
    /// Horizontal inset of the selection highlight from the window edges.
    pub highlight_inset: f32,
    /// Gap between the last description word and the link label.
    pub link_gap: f32,
}

impl Default for ListMetrics {
    fn default() -> Self {
        Self {
            top_padding: 20.0,
            row_height: 140.0,
            row_padding: 20.0,
            cover_size: 100.0,
            cover_x: 20.0,
            text_x_with_cover: 130.0,
            text_x: 20.0,
            right_margin: 20.0,
            subtitle_offset: 25.0,
            description_offset: 50.0,
            description_line_height: 25.0,
            description_lines: 2,
            highlight_inset: 10.0,
            link_gap: 5.0,
        }
    }
}

impl ListMetrics {
    /// Distance between the tops of consecutive rows.
    #[inline]
    pub fn row_pitch(&self) -> f32 {
        self.row_height + self.row_padding
    }

    /// Unscrolled top of row `index`'s content.
    #[inline]
    pub fn row_top(&self, index: usize) -> f32 {
        self.top_padding + index as f32 * self.row_pitch()
    }

    /// Total height of a list with `count` rows.
    pub fn content_height(&self, count: usize) -> f32 {
        self.top_padding + count as f32 * self.row_pitch()
    }

    /// Unscrolled vertical span that must be on screen for row `index` to
    /// count as visible, padding included. The first span starts at zero and
    /// the last one ends at [`content_height`](Self::content_height).
    pub fn row_span(&self, index: usize) -> (f32, f32) {
        let start = index as f32 * self.row_pitch();
        (start, start + self.row_pitch() + self.top_padding)
    }
}

/// Geometry of one row for a single frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLayout {
    pub index: usize,
    /// Everything the row occupies, padding included.
    pub row_rect: Rect,
    /// Set only for the selected row.
    pub highlight: Option<Rect>,
    /// Set when the item has a cover path, whether or not it loads.
    pub cover_rect: Option<Rect>,
    pub title_origin: Point,
    pub subtitle_origin: Point,
    pub description_bounds: Rect,
    /// Filled in by the renderer when it draws the link label.
    pub link_hit_rect: Option<Rect>,
}

/// Lay out every row of the list.
///
/// Row positions are shifted up by `scroll_offset`. The description width
/// may come out zero or negative on a narrow viewport; wrapping treats that
/// as "nothing to draw".
pub fn layout_rows(
    items: &[ListItem],
    selected: Option<usize>,
    scroll_offset: f32,
    metrics: &ListMetrics,
    viewport: Size,
) -> Vec<RowLayout> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let top = metrics.row_top(index) - scroll_offset;
            let band_top = top - metrics.row_padding / 2.0;

            let text_x = if item.has_cover() {
                metrics.text_x_with_cover
            } else {
                metrics.text_x
            };

            let highlight = (selected == Some(index)).then(|| {
                Rect::new(
                    metrics.highlight_inset,
                    band_top,
                    viewport.width - 2.0 * metrics.highlight_inset,
                    metrics.row_height,
                )
            });

            let cover_rect = item
                .has_cover()
                .then(|| Rect::new(metrics.cover_x, top, metrics.cover_size, metrics.cover_size));

            RowLayout {
                index,
                row_rect: Rect::new(0.0, band_top, viewport.width, metrics.row_pitch()),
                highlight,
                cover_rect,
                title_origin: Point::new(text_x, top),
                subtitle_origin: Point::new(text_x, top + metrics.subtitle_offset),
                description_bounds: Rect::new(
                    text_x,
                    top + metrics.description_offset,
                    viewport.width - (text_x + metrics.right_margin),
                    metrics.description_lines as f32 * metrics.description_line_height,
                ),
                link_hit_rect: None,
            }
        })
        .collect()
}

/// Clickable area of a link label drawn after `text_width` pixels of text on
/// description line `line_index`.
pub fn link_hit_rect(
    description_bounds: Rect,
    line_index: usize,
    text_width: f32,
    label_width: f32,
    metrics: &ListMetrics,
) -> Rect {
    Rect::new(
        description_bounds.x + text_width + metrics.link_gap,
        description_bounds.y + line_index as f32 * metrics.description_line_height,
        label_width,
        metrics.description_line_height,
    )
}
