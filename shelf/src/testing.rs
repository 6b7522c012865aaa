//! In-memory collaborators for driving the renderer and sessions in tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::input::{CursorIcon, InputEvent};
use crate::primitives::{Color, Rect, Size};
use crate::surface::{
    EventSource, ImageDecoder, LinkOpener, LoadError, Pixmap, Surface, TextRasterizer, Texture,
};

/// Advance of every glyph of [`FakeFonts`].
pub const CHAR_WIDTH: f32 = 10.0;
pub const LINE_HEIGHT: f32 = 20.0;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear(Color),
    Fill(Rect, Color),
    Texture { id: u32, dest: Rect },
    Cursor(CursorIcon),
    Present,
}

#[derive(Debug)]
pub struct FakeTexture {
    pub id: u32,
    size: Size,
    live: Rc<Cell<i64>>,
}

impl Texture for FakeTexture {
    fn size(&self) -> Size {
        self.size
    }
}

impl Drop for FakeTexture {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}

/// Headless surface recording every draw call, with a scripted event queue.
///
/// Each `poll_events` call hands out the next scripted batch. Once the
/// script runs out it reports `Quit`, so a session under test always ends.
pub struct FakeSurface {
    viewport: Size,
    next_id: Cell<u32>,
    live: Rc<Cell<i64>>,
    pub ops: Vec<DrawOp>,
    script: VecDeque<Vec<InputEvent>>,
    polls: usize,
}

impl FakeSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            viewport: Size::new(width, height),
            next_id: Cell::new(0),
            live: Rc::new(Cell::new(0)),
            ops: Vec::new(),
            script: VecDeque::new(),
            polls: 0,
        }
    }

    pub fn with_script(mut self, frames: Vec<Vec<InputEvent>>) -> Self {
        self.script = frames.into();
        self
    }

    /// Textures created and not yet dropped.
    pub fn live_textures(&self) -> i64 {
        self.live.get()
    }

    /// Handle to the live-texture counter that outlives the surface borrow.
    pub fn live_counter(&self) -> Rc<Cell<i64>> {
        self.live.clone()
    }

    pub fn textures_created(&self) -> u32 {
        self.next_id.get()
    }

    pub fn polls(&self) -> usize {
        self.polls
    }

    pub fn presents(&self) -> usize {
        self.ops.iter().filter(|op| **op == DrawOp::Present).count()
    }

    /// Operations since the last `clear`.
    pub fn last_frame(&self) -> &[DrawOp] {
        let start = self
            .ops
            .iter()
            .rposition(|op| matches!(op, DrawOp::Clear(_)))
            .unwrap_or(0);
        &self.ops[start..]
    }

    pub fn last_cursor(&self) -> Option<CursorIcon> {
        self.ops.iter().rev().find_map(|op| match op {
            DrawOp::Cursor(icon) => Some(*icon),
            _ => None,
        })
    }
}

impl Surface for FakeSurface {
    type Texture = FakeTexture;

    fn viewport(&self) -> Size {
        self.viewport
    }

    fn create_texture(&self, pixels: &Pixmap) -> Result<FakeTexture, LoadError> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(LoadError::Upload("zero-sized texture".into()));
        }
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.live.set(self.live.get() + 1);
        Ok(FakeTexture {
            id,
            size: Size::new(pixels.width() as f32, pixels.height() as f32),
            live: self.live.clone(),
        })
    }

    fn clear(&mut self, color: Color) {
        self.ops.push(DrawOp::Clear(color));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(DrawOp::Fill(rect, color));
    }

    fn draw_texture(&mut self, texture: &FakeTexture, dest: Rect) {
        self.ops.push(DrawOp::Texture { id: texture.id, dest });
    }

    fn set_cursor(&mut self, icon: CursorIcon) {
        self.ops.push(DrawOp::Cursor(icon));
    }

    fn present(&mut self) {
        self.ops.push(DrawOp::Present);
    }
}

impl EventSource for FakeSurface {
    fn poll_events(&mut self, events: &mut Vec<InputEvent>) {
        self.polls += 1;
        match self.script.pop_front() {
            Some(batch) => events.extend(batch),
            None => events.push(InputEvent::Quit),
        }
    }
}

/// Monospace text: every char is [`CHAR_WIDTH`] wide.
#[derive(Debug, Clone, Default)]
pub struct FakeFonts {
    rasterized: Rc<Cell<u32>>,
}

impl FakeFonts {
    pub fn rasterized(&self) -> Rc<Cell<u32>> {
        self.rasterized.clone()
    }
}

impl TextRasterizer for FakeFonts {
    fn measure(&self, text: &str) -> Size {
        Size::new(text.chars().count() as f32 * CHAR_WIDTH, LINE_HEIGHT)
    }

    fn rasterize(&self, text: &str, _color: Color) -> Result<Pixmap, LoadError> {
        self.rasterized.set(self.rasterized.get() + 1);
        let width = text.chars().count() as u32 * CHAR_WIDTH as u32;
        Ok(Pixmap::new(width, LINE_HEIGHT as u32))
    }
}

/// Decodes a 4x4 image for every path marked present.
#[derive(Debug, Clone, Default)]
pub struct FakeDecoder {
    present: Rc<RefCell<HashSet<PathBuf>>>,
    decodes: Rc<Cell<u32>>,
}

impl FakeDecoder {
    pub fn with_files<'a>(paths: impl IntoIterator<Item = &'a str>) -> Self {
        let decoder = Self::default();
        for path in paths {
            decoder.add(path);
        }
        decoder
    }

    /// Make `path` decodable from now on.
    pub fn add(&self, path: &str) {
        self.present.borrow_mut().insert(PathBuf::from(path));
    }

    pub fn decodes(&self) -> Rc<Cell<u32>> {
        self.decodes.clone()
    }
}

impl ImageDecoder for FakeDecoder {
    fn decode(&self, path: &Path) -> Result<Pixmap, LoadError> {
        self.decodes.set(self.decodes.get() + 1);
        if self.present.borrow().contains(path) {
            Ok(Pixmap::new(4, 4))
        } else {
            Err(LoadError::decode(path, "no such file"))
        }
    }
}

/// Records every URL it is asked to open.
#[derive(Debug, Clone, Default)]
pub struct RecordingOpener {
    opened: Rc<RefCell<Vec<String>>>,
}

impl RecordingOpener {
    pub fn opened(&self) -> Vec<String> {
        self.opened.borrow().clone()
    }
}

impl LinkOpener for RecordingOpener {
    fn open(&mut self, url: &str) {
        self.opened.borrow_mut().push(url.to_owned());
    }
}
