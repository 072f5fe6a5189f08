use bytemuck::{Pod, Zeroable};
use glam::Vec2;

slotmap::new_key_type! {
    /// Generational identifier for an entity in the world.
    /// A despawned id never matches a later entity that reuses its slot.
    pub struct EntityId;
}

/// Opaque handle to a texture owned by the rendering host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureId(pub u32);

/// 8-bit RGBA color, laid out for direct upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct ColorA8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ColorA8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Build from 0.0-1.0 float channels. Values are clamped.
    pub fn from_f32(r: f32, g: f32, b: f32, a: f32) -> Self {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { r: q(r), g: q(g), b: q(b), a: q(a) }
    }

    /// Premultiply the color channels by alpha.
    pub fn premultiplied(self) -> Self {
        let m = |c: u8| ((c as u16 * self.a as u16 + 127) / 255) as u8;
        Self { r: m(self.r), g: m(self.g), b: m(self.b), a: self.a }
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
}

/// Axis-aligned rectangle given by two corners.
/// `(x1, y1)` is the upper-left corner in a y-down space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Rect {
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// The 0..1 square, used as the default texture region.
    pub const UNIT: Self = Self::new(0.0, 0.0, 1.0, 1.0);

    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Self::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width(), self.height())
    }

    pub fn upper_left(&self) -> Vec2 {
        Vec2::new(self.x1, self.y1)
    }

    pub fn upper_right(&self) -> Vec2 {
        Vec2::new(self.x2, self.y1)
    }

    pub fn lower_left(&self) -> Vec2 {
        Vec2::new(self.x1, self.y2)
    }

    pub fn lower_right(&self) -> Vec2 {
        Vec2::new(self.x2, self.y2)
    }

    /// Map a point inside this rect to 0..1 coordinates.
    /// Zero-size axes map to 0.
    pub fn normalize(&self, p: Vec2) -> Vec2 {
        let size = self.size();
        let axis = |v: f32, lo: f32, extent: f32| if extent.abs() > f32::EPSILON { (v - lo) / extent } else { 0.0 };
        Vec2::new(axis(p.x, self.x1, size.x), axis(p.y, self.y1, size.y))
    }

    /// Map 0..1 coordinates back into this rect.
    pub fn lerp(&self, t: Vec2) -> Vec2 {
        self.upper_left() + self.size() * t
    }

    /// Smallest rect containing every point. None for an empty iterator.
    pub fn bounding(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (lo, hi) = iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Self::new(lo.x, lo.y, hi.x, hi.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_corners() {
        let r = Rect::new(0.0, 0.0, 10.0, 5.0);
        assert_eq!(r.upper_right(), Vec2::new(10.0, 0.0));
        assert_eq!(r.lower_left(), Vec2::new(0.0, 5.0));
        assert_eq!(r.size(), Vec2::new(10.0, 5.0));
    }

    #[test]
    fn normalize_and_lerp_are_inverse() {
        let r = Rect::new(2.0, 4.0, 6.0, 12.0);
        let p = Vec2::new(3.0, 10.0);
        assert_eq!(r.lerp(r.normalize(p)), p);
    }

    #[test]
    fn bounding_of_points() {
        let r = Rect::bounding([Vec2::new(1.0, -2.0), Vec2::new(-3.0, 4.0)]).unwrap();
        assert_eq!(r, Rect::new(-3.0, -2.0, 1.0, 4.0));
        assert!(Rect::bounding(std::iter::empty()).is_none());
    }

    #[test]
    fn premultiply_halves_channels_at_half_alpha() {
        let c = ColorA8::new(255, 128, 0, 128).premultiplied();
        assert_eq!(c, ColorA8::new(128, 64, 0, 128));
    }

    #[test]
    fn color_is_four_bytes() {
        assert_eq!(std::mem::size_of::<ColorA8>(), 4);
    }
}
