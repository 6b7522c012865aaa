//! Shelf: list rendering and text layout for a game launcher.
//!
//! Shelf draws a vertically scrolling list of items, each with a cover
//! image, a title, a subtitle and a wrapped description that may end in an
//! inline "Read More" link. It provides:
//! - Greedy word wrapping with an estimate-then-correct measuring strategy
//! - Persistent texture caches for covers and text runs
//! - A keyboard and pointer input state machine with link hit-testing
//! - Blocking `display_list` / `show_error` calls for a simple launcher loop
//!
//! # Architecture
//!
//! The engine draws through the [`Surface`] trait and reads input through
//! [`EventSource`]; text and images come from [`TextRasterizer`] and
//! [`ImageDecoder`]. A platform backend implements these once. The renderer
//! returns the row geometry it drew each frame, and the input router
//! hit-tests against exactly that geometry.
//!
//! ```ignore
//! let mut session = ListSession::new(fonts, decoder, opener, SessionOptions::default());
//! while let Some(index) = session.display_list(&mut shell, &items) {
//!     if let Err(e) = launch(&items[index]) {
//!         session.show_error(&mut shell, &e.to_string());
//!     }
//! }
//! ```

// Core primitives
pub mod primitives;
pub mod item;

// Text layout
pub mod wrap;

// Layout and state helpers
pub mod layout;
pub mod scroll_state;
pub mod input;

// Rendering
pub mod surface;
pub mod texture_cache;
pub mod render;

// Display loops
pub mod session;

// Performance instrumentation
pub mod frame_timing;

#[cfg(test)]
mod testing;

// Re-export core types
pub use primitives::{Color, Point, Rect, Size};
pub use item::{join_subtitle, ListItem};
pub use wrap::{wrap_text, LineSpan, WrapOptions, WrappedText};
pub use layout::{layout_rows, link_hit_rect, ListMetrics, RowLayout};
pub use input::{CursorIcon, InputEvent, InputRouter, Key, MouseButton, NamedKey, SessionState};
pub use surface::{EventSource, ImageDecoder, LinkOpener, LoadError, Pixmap, Surface, TextRasterizer, Texture};
pub use texture_cache::TextureCache;
pub use render::{FrameRenderer, Theme};
pub use session::{ListSession, SessionOptions, DEFAULT_LINK_LABEL};
pub use frame_timing::FramePacer;
