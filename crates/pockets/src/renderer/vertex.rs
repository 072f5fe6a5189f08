use bytemuck::{Pod, Zeroable};
use glam::{Affine2, Vec2};

use crate::api::types::ColorA8;

/// Interleaved vertex shared by meshes and the GPU buffer.
/// Must match the shader's attribute layout: 2 floats, 4 bytes, 2 floats = 20 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    /// Position in the mesh's local space (world space once flattened).
    pub position: [f32; 2],
    /// Straight or premultiplied RGBA, depending on the pass it is drawn in.
    pub color: [u8; 4],
    /// Texture coordinate.
    pub uv: [f32; 2],
}

impl Vertex {
    pub const STRIDE_BYTES: usize = std::mem::size_of::<Self>();
    pub const POSITION_OFFSET: usize = 0;
    pub const COLOR_OFFSET: usize = 8;
    pub const UV_OFFSET: usize = 12;

    pub fn new(position: Vec2, color: ColorA8, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            color: color.to_array(),
            uv: uv.to_array(),
        }
    }

    pub fn pos(&self) -> Vec2 {
        Vec2::from_array(self.position)
    }

    pub fn set_pos(&mut self, p: Vec2) {
        self.position = p.to_array();
    }

    pub fn tex_coord(&self) -> Vec2 {
        Vec2::from_array(self.uv)
    }

    /// Copy of this vertex with its position run through `matrix`.
    pub fn transformed(&self, matrix: &Affine2) -> Self {
        Self {
            position: matrix.transform_point2(self.pos()).to_array(),
            ..*self
        }
    }
}
