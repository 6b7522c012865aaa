//! Scroll State
//!
//! Vertical scroll offset of the list, kept inside the content and moved
//! just enough to keep the selected row on screen.

/// Scroll state for the list viewport.
#[derive(Debug, Clone, Default)]
pub struct ScrollState {
    /// Current scroll offset (0 = top).
    offset: f32,
    /// Maximum scroll offset (set from the content size each frame).
    max: f32,
}

impl ScrollState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Sync limits from the content and viewport heights.
    ///
    /// Content shorter than the viewport cannot scroll at all.
    pub fn set_limits(&mut self, content_height: f32, viewport_height: f32) {
        self.max = (content_height - viewport_height).max(0.0);
        self.offset = self.offset.clamp(0.0, self.max);
    }

    /// Scroll the minimum distance that brings `[start, end)` into view.
    ///
    /// A span taller than the viewport is aligned to its start.
    pub fn reveal(&mut self, start: f32, end: f32, viewport_height: f32) {
        if start < self.offset || end - start > viewport_height {
            self.offset = start;
        } else if end > self.offset + viewport_height {
            self.offset = end - viewport_height;
        }
        self.offset = self.offset.clamp(0.0, self.max);
    }

    /// Back to the top.
    pub fn reset(&mut self) {
        self.offset = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveal_clamps() {
        let mut state = ScrollState::new();
        state.set_limits(700.0, 600.0);

        state.reveal(500.0, 650.0, 600.0); // scroll down
        assert_eq!(state.offset(), 50.0);

        state.reveal(500.0, 900.0, 600.0); // past the end
        assert_eq!(state.offset(), 100.0);

        state.reveal(-40.0, 100.0, 600.0); // before the start
        assert_eq!(state.offset(), 0.0);
    }

    #[test]
    fn short_content_never_scrolls() {
        let mut state = ScrollState::new();
        state.set_limits(340.0, 600.0);
        state.reveal(160.0, 340.0, 600.0);
        assert_eq!(state.offset(), 0.0);
    }

    #[test]
    fn reveal_moves_down_then_back_up() {
        let mut state = ScrollState::new();
        state.set_limits(820.0, 600.0);

        // Row 4 of 5 (pitch 160, top padding 20).
        state.reveal(640.0, 820.0, 600.0);
        assert_eq!(state.offset(), 220.0);

        // Already visible: no movement.
        state.reveal(320.0, 500.0, 600.0);
        assert_eq!(state.offset(), 220.0);

        state.reveal(0.0, 180.0, 600.0);
        assert_eq!(state.offset(), 0.0);
    }

    #[test]
    fn shrinking_content_pulls_offset_back() {
        let mut state = ScrollState::new();
        state.set_limits(2000.0, 600.0);
        state.reveal(1400.0, 1600.0, 600.0);
        assert_eq!(state.offset(), 1000.0);
        state.set_limits(900.0, 600.0);
        assert_eq!(state.offset(), 300.0);
        state.reset();
        assert_eq!(state.offset(), 0.0);
    }
}
