//! RenderMesh: CPU-side triangle-strip geometry with shape builders.
//!
//! Every `set_as_*` builder overwrites the vertex list. Vertices take the mesh's
//! current color; texture coordinates are generated per shape.

use glam::{Affine2, Vec2};

use crate::api::types::{ColorA8, Rect};
use crate::assets::sprite_sheet::SpriteData;
use crate::error::{PocketsError, Result};
use crate::renderer::vertex::Vertex;

/// Segment count used by `set_as_circle` when the caller passes 0.
/// One segment per 3 units of arc length, never fewer than 3.
pub fn auto_circle_segments(radius: Vec2, start: f32, end: f32) -> usize {
    let arc = radius.max_element() * (end - start).abs();
    ((arc / 3.0).floor() as usize).max(3)
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderMesh {
    vertices: Vec<Vertex>,
    color: ColorA8,
}

impl Default for RenderMesh {
    fn default() -> Self {
        Self::with_color(ColorA8::WHITE)
    }
}

impl RenderMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty mesh whose builders emit `color`.
    pub fn with_color(color: ColorA8) -> Self {
        Self {
            vertices: Vec::new(),
            color,
        }
    }

    /// Wrap an existing strip.
    pub fn from_vertices(vertices: Vec<Vertex>) -> Self {
        let color = vertices
            .first()
            .map(|v| {
                let [r, g, b, a] = v.color;
                ColorA8::new(r, g, b, a)
            })
            .unwrap_or(ColorA8::WHITE);
        Self { vertices, color }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn vertices_mut(&mut self) -> &mut [Vertex] {
        &mut self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    pub fn color(&self) -> ColorA8 {
        self.color
    }

    /// Recolor every vertex and use `color` for future builders.
    pub fn set_color(&mut self, color: ColorA8) -> &mut Self {
        self.color = color;
        let bytes = color.to_array();
        for v in &mut self.vertices {
            v.color = bytes;
        }
        self
    }

    pub fn bounding_box(&self) -> Option<Rect> {
        Rect::bounding(self.vertices.iter().map(Vertex::pos))
    }

    /// Bake `matrix` into the vertex positions.
    pub fn transform(&mut self, matrix: &Affine2) -> &mut Self {
        for v in &mut self.vertices {
            *v = v.transformed(matrix);
        }
        self
    }

    /// Assign UVs by mapping each vertex's place in the bounding box onto `bounds`.
    pub fn match_texture(&mut self, bounds: Rect) -> &mut Self {
        if let Some(bbox) = self.bounding_box() {
            for v in &mut self.vertices {
                v.uv = bounds.lerp(bbox.normalize(v.pos())).to_array();
            }
        }
        self
    }

    /// Set UVs of a 4-vertex box strip to the corners of `bounds`.
    /// Meshes that are not boxes are left alone.
    pub fn set_box_texture_coords(&mut self, bounds: Rect) -> &mut Self {
        if let [ur, ul, lr, ll] = self.vertices.as_mut_slice() {
            ur.uv = bounds.upper_right().to_array();
            ul.uv = bounds.upper_left().to_array();
            lr.uv = bounds.lower_right().to_array();
            ll.uv = bounds.lower_left().to_array();
        } else {
            log::warn!("set_box_texture_coords on a {}-vertex mesh", self.vertices.len());
        }
        self
    }

    fn vertex(&self, position: Vec2, uv: Vec2) -> Vertex {
        Vertex::new(position, self.color, uv)
    }

    // -- Shape builders --

    /// Quad in strip order: upper-right, upper-left, lower-right, lower-left.
    pub fn set_as_box(&mut self, rect: Rect) -> &mut Self {
        let uv = Rect::UNIT;
        self.vertices = vec![
            self.vertex(rect.upper_right(), uv.upper_right()),
            self.vertex(rect.upper_left(), uv.upper_left()),
            self.vertex(rect.lower_right(), uv.lower_right()),
            self.vertex(rect.lower_left(), uv.lower_left()),
        ];
        self
    }

    /// Arc (or full circle) from `start` to `end` radians.
    ///
    /// Each wedge is written as `center, b, c, c, center`; the repeats are
    /// zero-area triangles that let all wedges share one strip.
    /// `segments == 0` picks a count from the arc length.
    pub fn set_as_circle(&mut self, radius: Vec2, start: f32, end: f32, segments: usize) -> &mut Self {
        let segments = if segments == 0 {
            auto_circle_segments(radius, start, end)
        } else {
            segments.max(3)
        };
        let uv_of = |p: Vec2| {
            let extent = radius * 2.0;
            let axis = |v: f32, e: f32| if e.abs() > f32::EPSILON { v / e + 0.5 } else { 0.5 };
            Vec2::new(axis(p.x, extent.x), axis(p.y, extent.y))
        };
        let center = self.vertex(Vec2::ZERO, Vec2::splat(0.5));

        let mut vertices = Vec::with_capacity(segments * 5);
        for i in 0..segments {
            let t1 = start + (end - start) * i as f32 / segments as f32;
            let t2 = start + (end - start) * (i + 1) as f32 / segments as f32;
            let b = Vec2::from_angle(t1) * radius;
            let c = Vec2::from_angle(t2) * radius;
            let vb = self.vertex(b, uv_of(b));
            let vc = self.vertex(c, uv_of(c));
            vertices.extend_from_slice(&[center, vb, vc, vc, center]);
        }
        self.vertices = vertices;
        self
    }

    pub fn set_as_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2) -> &mut Self {
        self.vertices = vec![
            self.vertex(a, Vec2::ZERO),
            self.vertex(b, Vec2::ZERO),
            self.vertex(c, Vec2::ZERO),
        ];
        self.match_texture(Rect::UNIT)
    }

    /// Quad around the segment `a`-`b`, extending `width` to each side.
    pub fn set_as_line(&mut self, a: Vec2, b: Vec2, width: f32) -> Result<&mut Self> {
        let t = segment_direction(a, b, "line")?;
        let n = t.perp() * width;
        self.vertices = vec![
            self.vertex(a + n, Vec2::new(0.0, 0.0)),
            self.vertex(a - n, Vec2::new(0.0, 1.0)),
            self.vertex(b + n, Vec2::new(1.0, 0.0)),
            self.vertex(b - n, Vec2::new(1.0, 1.0)),
        ];
        Ok(self)
    }

    /// Octagon: the line quad plus a narrower cap pair `width` beyond each end.
    pub fn set_as_capped_line(&mut self, a: Vec2, b: Vec2, width: f32) -> Result<&mut Self> {
        let t = segment_direction(a, b, "capped line")?;
        let n = t.perp() * width;
        let cap = t * width;
        let total = (b - a).length() + 2.0 * width;
        let u = |along: f32| if total > 0.0 { along / total } else { 0.0 };
        let length = (b - a).length();

        self.vertices = vec![
            self.vertex(a - cap + n * 0.5, Vec2::new(0.0, 0.25)),
            self.vertex(a - cap - n * 0.5, Vec2::new(0.0, 0.75)),
            self.vertex(a + n, Vec2::new(u(width), 0.0)),
            self.vertex(a - n, Vec2::new(u(width), 1.0)),
            self.vertex(b + n, Vec2::new(u(width + length), 0.0)),
            self.vertex(b - n, Vec2::new(u(width + length), 1.0)),
            self.vertex(b + cap + n * 0.5, Vec2::new(1.0, 0.25)),
            self.vertex(b + cap - n * 0.5, Vec2::new(1.0, 0.75)),
        ];
        Ok(self)
    }

    /// Strip of width `2 * width` following `skeleton`.
    ///
    /// Emits two vertices per skeleton point, `p + n * width` then
    /// `p - n * width`, where `n` is the perpendicular of the averaged
    /// neighbouring edge directions. With `closed`, the endpoints also average
    /// in the edge that wraps from the last point to the first.
    pub fn set_as_ribbon(&mut self, skeleton: &[Vec2], width: f32, closed: bool) -> Result<&mut Self> {
        let n = skeleton.len();
        if n < 2 {
            return Err(PocketsError::InsufficientPoints {
                shape: "ribbon",
                required: 2,
                actual: n,
            });
        }

        let tangents = edge_tangents(skeleton, closed);
        let last = n - 1;
        let mut vertices = Vec::with_capacity(n * 2);
        for (i, &p) in skeleton.iter().enumerate() {
            let (incoming, outgoing) = match i {
                0 if closed => (tangents[last], tangents[0]),
                0 => (tangents[0], tangents[0]),
                i if i == last && closed => (tangents[last - 1], tangents[last]),
                i if i == last => (tangents[last - 1], tangents[last - 1]),
                i => (tangents[i - 1], tangents[i]),
            };
            let tangent = match (incoming + outgoing).try_normalize() {
                Some(t) => t,
                None => incoming,
            };
            let offset = tangent.perp() * width;
            let u = i as f32 / last as f32;
            vertices.push(self.vertex(p + offset, Vec2::new(u, 0.0)));
            vertices.push(self.vertex(p - offset, Vec2::new(u, 1.0)));
        }
        self.vertices = vertices;
        Ok(self)
    }

    /// Quad sized and pivoted like `sprite`, sampling its atlas region.
    pub fn set_as_sprite(&mut self, sprite: &SpriteData) -> &mut Self {
        let size = sprite.size.as_vec2();
        let origin = -sprite.registration_point;
        self.set_as_box(Rect::new(origin.x, origin.y, origin.x + size.x, origin.y + size.y));
        self.match_texture(sprite.texture_bounds)
    }
}

fn segment_direction(a: Vec2, b: Vec2, shape: &'static str) -> Result<Vec2> {
    (b - a)
        .try_normalize()
        .ok_or(PocketsError::DegenerateSegment { shape })
}

/// Unit direction of every edge (plus the wrap edge when `closed`).
/// Zero-length edges borrow the previous valid direction, leading ones the
/// first valid direction; a skeleton of coincident points falls back to +X.
fn edge_tangents(skeleton: &[Vec2], closed: bool) -> Vec<Vec2> {
    let n = skeleton.len();
    let mut raw: Vec<Option<Vec2>> = skeleton
        .windows(2)
        .map(|w| (w[1] - w[0]).try_normalize())
        .collect();
    if closed {
        raw.push((skeleton[0] - skeleton[n - 1]).try_normalize());
    }

    let first_valid = raw.iter().flatten().copied().next().unwrap_or(Vec2::X);
    let mut previous = first_valid;
    raw.into_iter()
        .map(|t| {
            if let Some(t) = t {
                previous = t;
            }
            previous
        })
        .collect()
}
