//! Blocking display calls: show the list until the user picks an item or
//! leaves, and show an error until it is dismissed.

use std::time::Duration;

use crate::frame_timing::{FramePacer, DEFAULT_FRAME_INTERVAL};
use crate::input::{CursorIcon, InputEvent, InputRouter, Key, NamedKey, SessionState};
use crate::item::ListItem;
use crate::layout::ListMetrics;
use crate::render::{FrameRenderer, Theme};
use crate::scroll_state::ScrollState;
use crate::surface::{EventSource, ImageDecoder, LinkOpener, Surface, TextRasterizer, Texture};

/// Default label of the inline description link.
pub const DEFAULT_LINK_LABEL: &str = "Read More";

/// Look and pacing of a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub metrics: ListMetrics,
    pub theme: Theme,
    pub link_label: String,
    pub frame_interval: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            metrics: ListMetrics::default(),
            theme: Theme::default(),
            link_label: DEFAULT_LINK_LABEL.to_owned(),
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }
}

/// Owns the renderer, its texture caches and the link opener across calls.
///
/// Textures belong to the surface that created them, so a session must be
/// released (or dropped) before that surface goes away.
pub struct ListSession<T> {
    renderer: FrameRenderer<T>,
    opener: Box<dyn LinkOpener>,
    scroll: ScrollState,
    pacer: FramePacer,
}

impl<T> ListSession<T> {
    pub fn new(
        fonts: Box<dyn TextRasterizer>,
        decoder: Box<dyn ImageDecoder>,
        opener: Box<dyn LinkOpener>,
        options: SessionOptions,
    ) -> Self {
        Self {
            renderer: FrameRenderer::new(fonts, decoder, options.theme, options.metrics, options.link_label),
            opener,
            scroll: ScrollState::new(),
            pacer: FramePacer::new(options.frame_interval),
        }
    }

    pub fn renderer(&self) -> &FrameRenderer<T> {
        &self.renderer
    }

    /// Release every cached texture. Safe to call more than once.
    pub fn release(&mut self) {
        self.renderer.release();
    }
}

impl<T: Texture> ListSession<T> {
    /// Show `items` until the user confirms a row or leaves.
    ///
    /// Returns the confirmed index, or `None` on Escape or window close. An
    /// empty list renders a blank frame and can only be left.
    pub fn display_list<P>(&mut self, platform: &mut P, items: &[ListItem]) -> Option<usize>
    where
        P: Surface<Texture = T> + EventSource,
    {
        tracing::debug!(count = items.len(), "displaying list");

        let mut router = InputRouter::new(items.len());
        let mut events = Vec::new();
        let mut cursor = CursorIcon::Arrow;
        self.scroll.reset();
        platform.set_cursor(cursor);

        loop {
            self.pacer.begin_frame();

            let metrics = *self.renderer.metrics();
            let viewport = platform.viewport();
            self.scroll.set_limits(metrics.content_height(items.len()), viewport.height);
            if let Some(selected) = router.selected() {
                let (start, end) = metrics.row_span(selected);
                self.scroll.reveal(start, end, viewport.height);
            }

            let offset = self.scroll.offset();
            let rows = self
                .pacer
                .measure("render", || self.renderer.render_list(platform, items, router.selected(), offset));

            events.clear();
            platform.poll_events(&mut events);
            for event in &events {
                if router.route(event, &rows, items, self.opener.as_mut()).is_terminal() {
                    break;
                }
            }

            if router.cursor_icon() != cursor {
                cursor = router.cursor_icon();
                platform.set_cursor(cursor);
            }

            match router.state() {
                SessionState::Activated => {
                    tracing::info!(index = ?router.selected(), "item activated");
                    return router.selected();
                }
                SessionState::ExitRequested => {
                    tracing::debug!("list closed");
                    if cursor != CursorIcon::Arrow {
                        platform.set_cursor(CursorIcon::Arrow);
                    }
                    return None;
                }
                SessionState::Idle => {}
            }

            self.pacer.finish_frame();
        }
    }

    /// Show `message` until Escape is pressed or the window is closed.
    pub fn show_error<P>(&mut self, platform: &mut P, message: &str)
    where
        P: Surface<Texture = T> + EventSource,
    {
        tracing::debug!(message, "showing error");
        platform.set_cursor(CursorIcon::Arrow);

        let mut events = Vec::new();
        loop {
            self.pacer.begin_frame();
            self.renderer.render_message(platform, message);

            events.clear();
            platform.poll_events(&mut events);
            let dismissed = events.iter().any(|event| {
                matches!(
                    event,
                    InputEvent::KeyDown(Key::Named(NamedKey::Escape)) | InputEvent::Quit
                )
            });
            if dismissed {
                return;
            }

            self.pacer.finish_frame();
        }
    }
}

impl<T> Drop for ListSession<T> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MouseButton;
    use crate::testing::{DrawOp, FakeDecoder, FakeFonts, FakeSurface, FakeTexture, RecordingOpener};

    fn session(opener: RecordingOpener) -> ListSession<FakeTexture> {
        let options = SessionOptions {
            frame_interval: Duration::ZERO,
            ..SessionOptions::default()
        };
        ListSession::new(
            Box::new(FakeFonts::default()),
            Box::new(FakeDecoder::with_files(["cover.png"])),
            Box::new(opener),
            options,
        )
    }

    fn games(n: usize) -> Vec<ListItem> {
        (0..n)
            .map(|i| {
                ListItem::new(format!("Game {i}"))
                    .subtitle("1987 | Capcom | Action")
                    .description("A long adventure through many stages full of traps. ".repeat(6))
                    .cover("cover.png")
                    .detail_link(format!("https://example.com/{i}"))
            })
            .collect()
    }

    fn key(k: NamedKey) -> InputEvent {
        InputEvent::key(k)
    }

    #[test]
    fn down_down_enter_returns_index_two() {
        let mut surface = FakeSurface::new(800.0, 600.0).with_script(vec![
            vec![key(NamedKey::ArrowDown)],
            vec![],
            vec![key(NamedKey::ArrowDown), key(NamedKey::Enter)],
        ]);
        let mut s = session(RecordingOpener::default());

        assert_eq!(s.display_list(&mut surface, &games(5)), Some(2));
        assert_eq!(surface.presents(), 3);
    }

    #[test]
    fn escape_returns_none() {
        let mut surface = FakeSurface::new(800.0, 600.0).with_script(vec![vec![key(NamedKey::Escape)]]);
        let mut s = session(RecordingOpener::default());
        assert_eq!(s.display_list(&mut surface, &games(3)), None);
    }

    #[test]
    fn window_close_returns_none() {
        let mut surface = FakeSurface::new(800.0, 600.0);
        let mut s = session(RecordingOpener::default());
        assert_eq!(s.display_list(&mut surface, &games(3)), None);
        assert_eq!(surface.polls(), 1);
    }

    #[test]
    fn events_after_confirm_are_ignored() {
        let mut surface = FakeSurface::new(800.0, 600.0).with_script(vec![vec![
            key(NamedKey::Enter),
            key(NamedKey::ArrowDown),
            key(NamedKey::Escape),
        ]]);
        let mut s = session(RecordingOpener::default());
        assert_eq!(s.display_list(&mut surface, &games(3)), Some(0));
    }

    #[test]
    fn empty_list_cannot_be_confirmed() {
        let mut surface = FakeSurface::new(800.0, 600.0)
            .with_script(vec![vec![key(NamedKey::Enter)], vec![key(NamedKey::Escape)]]);
        let mut s = session(RecordingOpener::default());
        assert_eq!(s.display_list(&mut surface, &[]), None);
        assert_eq!(surface.presents(), 2);
    }

    #[test]
    fn clicking_the_drawn_link_opens_it_once() {
        let items = games(3);
        let opener = RecordingOpener::default();
        let mut s = session(opener.clone());

        // Find where the link on row 1 was drawn in a first session.
        let mut probe = FakeSurface::new(800.0, 600.0);
        s.display_list(&mut probe, &items);
        let link = s
            .renderer
            .render_list(&mut probe, &items, Some(0), 0.0)[1]
            .link_hit_rect
            .expect("row 1 draws a link");
        let (x, y) = (link.x + 1.0, link.y + 1.0);

        let mut surface = FakeSurface::new(800.0, 600.0).with_script(vec![
            vec![InputEvent::PointerMove { x, y }],
            vec![InputEvent::PointerDown { x, y, button: MouseButton::Left }],
            vec![InputEvent::PointerDown { x: x - 200.0, y, button: MouseButton::Left }],
            vec![key(NamedKey::Escape)],
        ]);
        assert_eq!(s.display_list(&mut surface, &items), None);

        assert_eq!(opener.opened(), vec!["https://example.com/1".to_string()]);
        assert!(surface.ops.contains(&DrawOp::Cursor(CursorIcon::Pointer)));
        assert_eq!(surface.last_cursor(), Some(CursorIcon::Arrow));
    }

    #[test]
    fn selection_scrolls_into_view() {
        // 5 rows of 160px in a 400px viewport.
        let mut surface = FakeSurface::new(800.0, 400.0).with_script(vec![
            vec![key(NamedKey::ArrowDown); 4],
            vec![],
            vec![key(NamedKey::Escape)],
        ]);
        let mut s = session(RecordingOpener::default());
        s.display_list(&mut surface, &games(5));

        // Last frame shows row 4 highlighted at the bottom of the viewport.
        let highlight = surface.last_frame().iter().find_map(|op| match op {
            DrawOp::Fill(rect, _) => Some(*rect),
            _ => None,
        });
        let highlight = highlight.expect("selected row drawn");
        assert!(highlight.y >= 0.0 && highlight.bottom() <= 400.0);
        assert_eq!(s.scroll.offset(), 420.0);
    }

    #[test]
    fn show_error_waits_for_escape() {
        let mut surface = FakeSurface::new(800.0, 600.0).with_script(vec![
            vec![key(NamedKey::Enter)],
            vec![InputEvent::KeyDown(Key::Character("q".into()))],
            vec![key(NamedKey::Escape)],
        ]);
        let mut s = session(RecordingOpener::default());
        s.show_error(&mut surface, "Emulator not found");
        assert_eq!(surface.polls(), 3);
        assert_eq!(surface.presents(), 3);
    }

    #[test]
    fn show_error_returns_on_window_close() {
        let mut surface = FakeSurface::new(800.0, 600.0);
        let mut s = session(RecordingOpener::default());
        s.show_error(&mut surface, "boom");
        assert_eq!(surface.polls(), 1);
    }

    #[test]
    fn list_resumes_after_error() {
        let mut surface = FakeSurface::new(800.0, 600.0).with_script(vec![
            vec![key(NamedKey::Enter)],
            vec![key(NamedKey::Escape)],
            vec![key(NamedKey::ArrowDown), key(NamedKey::Enter)],
        ]);
        let mut s = session(RecordingOpener::default());
        let items = games(2);

        assert_eq!(s.display_list(&mut surface, &items), Some(0));
        s.show_error(&mut surface, "launch failed");
        assert_eq!(s.display_list(&mut surface, &items), Some(1));
    }

    #[test]
    fn release_and_drop_free_all_textures() {
        let mut surface = FakeSurface::new(800.0, 600.0).with_script(vec![vec![key(NamedKey::Escape)]]);
        let live = surface.live_counter();
        let mut s = session(RecordingOpener::default());
        s.display_list(&mut surface, &games(2));
        assert!(live.get() > 0);

        s.release();
        assert_eq!(live.get(), 0);
        s.release();

        s.display_list(&mut surface, &games(2));
        assert!(live.get() > 0);
        drop(s);
        assert_eq!(live.get(), 0);
    }
}
