//! Backend contract for GPU submission.
//!
//! The core never talks to a graphics API. The render system hands a
//! [`RenderBackend`] one vertex upload and up to three strip draws per frame;
//! hosts implement the trait on top of GL, wgpu, or whatever owns the context.

use super::vertex::Vertex;
use crate::api::types::{ColorA8, TextureId};

/// Source/destination blend factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstColor,
}

/// Blend function applied to a draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendFunc {
    pub src: BlendFactor,
    pub dst: BlendFactor,
}

impl BlendFunc {
    pub const fn new(src: BlendFactor, dst: BlendFactor) -> Self {
        Self { src, dst }
    }
}

/// Renderer trait for GPU backends.
///
/// Call order within a frame is `clear?`, `upload?`, `bind`, then one
/// `draw_strip` per non-empty pass. `upload` is skipped when the vertex data
/// did not change since the last draw.
pub trait RenderBackend {
    /// Backend identifier (e.g., "gl", "wgpu", "recording").
    fn backend(&self) -> &'static str;

    /// Clear the color target.
    fn clear(&mut self, color: ColorA8);

    /// Replace the contents of the shared vertex buffer.
    fn upload(&mut self, vertices: &[Vertex]);

    /// Bind the sprite shader and, when present, the texture all passes sample.
    fn bind(&mut self, texture: Option<TextureId>);

    /// Draw `count` vertices starting at `first` as one triangle strip.
    fn draw_strip(&mut self, blend: BlendFunc, first: u32, count: u32);
}

/// One call received by a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(ColorA8),
    Upload { vertex_count: usize },
    Bind(Option<TextureId>),
    DrawStrip { blend: BlendFunc, first: u32, count: u32 },
}

/// Backend that records commands instead of drawing.
/// Useful headless and for checking what a frame would submit.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub commands: Vec<DrawCommand>,
    /// Copy of the most recent upload.
    pub vertices: Vec<Vertex>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only the strip draws, in submission order.
    pub fn draws(&self) -> Vec<(BlendFunc, u32, u32)> {
        self.commands
            .iter()
            .filter_map(|c| match *c {
                DrawCommand::DrawStrip { blend, first, count } => Some((blend, first, count)),
                _ => None,
            })
            .collect()
    }

    pub fn upload_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Upload { .. }))
            .count()
    }

    /// Forget everything recorded so far.
    pub fn reset(&mut self) {
        self.commands.clear();
        self.vertices.clear();
    }
}

impl RenderBackend for RecordingBackend {
    fn backend(&self) -> &'static str {
        "recording"
    }

    fn clear(&mut self, color: ColorA8) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn upload(&mut self, vertices: &[Vertex]) {
        self.vertices.clear();
        self.vertices.extend_from_slice(vertices);
        self.commands.push(DrawCommand::Upload {
            vertex_count: vertices.len(),
        });
    }

    fn bind(&mut self, texture: Option<TextureId>) {
        self.commands.push(DrawCommand::Bind(texture));
    }

    fn draw_strip(&mut self, blend: BlendFunc, first: u32, count: u32) {
        self.commands.push(DrawCommand::DrawStrip { blend, first, count });
    }
}
