//! Locus: the 2D transform component.
//!
//! Holds local position, rotation, scale and registration point, plus an
//! optional parent entity. World matrices are composed by the world (on demand)
//! or by [`TransformSystem`](crate::systems::transform::TransformSystem) (in bulk).

use glam::{Affine2, Vec2};

use crate::api::types::EntityId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Locus {
    /// Position relative to the parent (or world if no parent).
    pub position: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
    pub scale: Vec2,
    /// Local-space pivot for rotation and scale.
    pub registration_point: Vec2,
    /// Set through [`World::set_parent`](crate::World::set_parent) so cycles are rejected.
    pub(crate) parent: Option<EntityId>,
}

impl Default for Locus {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
            registration_point: Vec2::ZERO,
            parent: None,
        }
    }
}

impl Locus {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Builder pattern --

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_registration_point(mut self, point: Vec2) -> Self {
        self.registration_point = point;
        self
    }

    // -- Accessors --

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        self.scale = scale;
    }

    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.scale = Vec2::splat(scale);
    }

    pub fn registration_point(&self) -> Vec2 {
        self.registration_point
    }

    pub fn set_registration_point(&mut self, point: Vec2) {
        self.registration_point = point;
    }

    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// T(position) · R(rotation) · S(scale) · T(-registration_point)
    pub fn local_matrix(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(self.scale, self.rotation, self.position)
            * Affine2::from_translation(-self.registration_point)
    }

    /// Overwrite position/rotation/scale so that `local_matrix()` reproduces
    /// `matrix` as closely as an unsheared transform can. The registration
    /// point is kept.
    pub fn set_from_matrix(&mut self, matrix: &Affine2) {
        let pivoted = *matrix * Affine2::from_translation(self.registration_point);
        let (scale, rotation, position) = pivoted.to_scale_angle_translation();
        self.scale = scale;
        self.rotation = rotation;
        self.position = position;
    }
}
