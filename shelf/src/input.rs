//! Input routing for the list view.
//!
//! A small state machine: events move the selection, hover or activate a
//! link, or end the session. Once the session is `Activated` or
//! `ExitRequested` every further event is ignored.
//!
//! Link hit-testing uses the rectangles recorded by the renderer for the
//! frame on screen, so the clickable area always matches what was drawn.

use crate::item::ListItem;
use crate::layout::RowLayout;
use crate::primitives::Point;
use crate::surface::LinkOpener;

/// Named (non-character) keys the list reacts to, plus a few common ones so
/// platform adapters have somewhere to put them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Enter,
    Escape,
    Tab,
    Space,
}

/// A keyboard key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A named (special) key.
    Named(NamedKey),
    /// A character key.
    Character(String),
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Platform input, already translated into logical coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    PointerMove { x: f32, y: f32 },
    PointerDown { x: f32, y: f32, button: MouseButton },
    /// The window was closed.
    Quit,
}

impl InputEvent {
    pub fn key(key: NamedKey) -> Self {
        Self::KeyDown(Key::Named(key))
    }
}

/// Where the display loop stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    /// The user confirmed the current selection.
    Activated,
    /// Escape or window close.
    ExitRequested,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Cursor shape requested from the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CursorIcon {
    /// Default arrow cursor (non-interactive areas).
    #[default]
    Arrow,
    /// Pointer/hand cursor for clickable elements.
    Pointer,
}

/// Selected row, clamped to the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionState {
    index: Option<usize>,
    len: usize,
}

impl SelectionState {
    /// Start on the first row, or with no selection for an empty list.
    pub fn new(len: usize) -> Self {
        Self {
            index: (len > 0).then_some(0),
            len,
        }
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn previous(&mut self) {
        if let Some(i) = self.index {
            self.index = Some(i.saturating_sub(1));
        }
    }

    pub fn next(&mut self) {
        if let Some(i) = self.index {
            self.index = Some((i + 1).min(self.len - 1));
        }
    }
}

/// Routes events for one display session.
#[derive(Debug, Clone)]
pub struct InputRouter {
    selection: SelectionState,
    state: SessionState,
    hovered_link: Option<usize>,
}

impl InputRouter {
    pub fn new(item_count: usize) -> Self {
        Self {
            selection: SelectionState::new(item_count),
            state: SessionState::Idle,
            hovered_link: None,
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.selection.index()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Row whose link the pointer is over.
    pub fn hovered_link(&self) -> Option<usize> {
        self.hovered_link
    }

    pub fn cursor_icon(&self) -> CursorIcon {
        if self.hovered_link.is_some() {
            CursorIcon::Pointer
        } else {
            CursorIcon::Arrow
        }
    }

    /// Apply one event. `rows` must be the layouts of the frame on screen.
    pub fn route(
        &mut self,
        event: &InputEvent,
        rows: &[RowLayout],
        items: &[ListItem],
        opener: &mut dyn LinkOpener,
    ) -> SessionState {
        if self.state.is_terminal() {
            return self.state;
        }

        match event {
            InputEvent::KeyDown(Key::Named(key)) => match key {
                NamedKey::ArrowUp => self.selection.previous(),
                NamedKey::ArrowDown => self.selection.next(),
                NamedKey::Enter => {
                    if self.selection.index().is_some() {
                        self.state = SessionState::Activated;
                    }
                }
                NamedKey::Escape => self.state = SessionState::ExitRequested,
                NamedKey::ArrowLeft | NamedKey::ArrowRight | NamedKey::Tab | NamedKey::Space => {}
            },
            InputEvent::KeyDown(Key::Character(_)) => {}
            InputEvent::PointerMove { x, y } => {
                self.hovered_link = link_at(Point::new(*x, *y), rows, items).map(|(i, _)| i);
            }
            InputEvent::PointerDown {
                x,
                y,
                button: MouseButton::Left,
            } => {
                if let Some((index, url)) = link_at(Point::new(*x, *y), rows, items) {
                    tracing::debug!(index, url, "opening detail link");
                    opener.open(url);
                }
            }
            InputEvent::PointerDown { .. } => {}
            InputEvent::Quit => self.state = SessionState::ExitRequested,
        }

        self.state
    }
}

/// The row and URL of the link under `point`, if any.
fn link_at<'a>(point: Point, rows: &[RowLayout], items: &'a [ListItem]) -> Option<(usize, &'a str)> {
    rows.iter().find_map(|row| {
        let rect = row.link_hit_rect?;
        if !rect.contains(point) {
            return None;
        }
        let url = items.get(row.index)?.detail_link.as_deref()?;
        Some((row.index, url))
    })
}
