use crate::renderer::traits::{BlendFactor, BlendFunc};

/// Blend pass: which of the three draw calls an entity's geometry joins.
///
/// Passes are drawn in declaration order. Only `Premultiplied` is kept sorted by
/// layer; the other two draw in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum BlendPass {
    #[default]
    Premultiplied = 0,
    Additive = 1,
    Multiplicative = 2,
}

impl BlendPass {
    /// Total number of passes.
    pub const COUNT: usize = 3;

    pub const ALL: [BlendPass; Self::COUNT] = [
        Self::Premultiplied,
        Self::Additive,
        Self::Multiplicative,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn blend_func(self) -> BlendFunc {
        match self {
            Self::Premultiplied => BlendFunc::new(BlendFactor::One, BlendFactor::OneMinusSrcAlpha),
            Self::Additive => BlendFunc::new(BlendFactor::SrcAlpha, BlendFactor::One),
            Self::Multiplicative => BlendFunc::new(BlendFactor::DstColor, BlendFactor::OneMinusSrcAlpha),
        }
    }
}

/// Marks an entity's mesh for drawing.
///
/// The mesh and locus drawn are the entity's own [`RenderMesh`](super::mesh::RenderMesh)
/// and [`Locus`](super::locus::Locus). Lower layers draw first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderData {
    pub layer: i32,
    pub pass: BlendPass,
}

impl RenderData {
    pub fn new(layer: i32, pass: BlendPass) -> Self {
        Self { layer, pass }
    }

    pub fn premultiplied(layer: i32) -> Self {
        Self::new(layer, BlendPass::Premultiplied)
    }

    pub fn additive() -> Self {
        Self::new(0, BlendPass::Additive)
    }

    pub fn multiplicative() -> Self {
        Self::new(0, BlendPass::Multiplicative)
    }
}
