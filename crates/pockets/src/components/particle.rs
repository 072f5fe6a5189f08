//! Verlet particle state for an entity's locus.
//!
//! Velocity is implicit: it is the difference between the locus and the
//! `previous_*` values. Friction scales that difference each step
//! (1.0 keeps moving forever, 0.0 stops immediately).

use glam::Vec2;

use super::locus::Locus;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub previous_position: Vec2,
    pub previous_rotation: f32,
    pub previous_scale: Vec2,
    pub friction: f32,
    pub rotation_friction: f32,
    pub scale_friction: f32,
    /// Seconds left before the particle system despawns the entity.
    /// `None` lives forever.
    pub lifetime: Option<f32>,
}

impl Particle {
    pub const DEFAULT_FRICTION: f32 = 0.98;

    /// Particle with no velocity at `locus`'s current state.
    pub fn at_rest(locus: &Locus) -> Self {
        Self {
            previous_position: locus.position,
            previous_rotation: locus.rotation,
            previous_scale: locus.scale,
            friction: Self::DEFAULT_FRICTION,
            rotation_friction: Self::DEFAULT_FRICTION,
            scale_friction: Self::DEFAULT_FRICTION,
            lifetime: None,
        }
    }

    /// Particle moving `velocity` units per step from `locus`.
    pub fn launched(locus: &Locus, velocity: Vec2) -> Self {
        Self {
            previous_position: locus.position - velocity,
            ..Self::at_rest(locus)
        }
    }

    // -- Builder pattern --

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_rotation_friction(mut self, friction: f32) -> Self {
        self.rotation_friction = friction;
        self
    }

    pub fn with_scale_friction(mut self, friction: f32) -> Self {
        self.scale_friction = friction;
        self
    }

    pub fn with_lifetime(mut self, seconds: f32) -> Self {
        self.lifetime = Some(seconds);
        self
    }

    /// Displacement per step implied by the previous position.
    pub fn velocity(&self, locus: &Locus) -> Vec2 {
        locus.position - self.previous_position
    }

    /// Change the implied velocity without moving the locus.
    pub fn set_velocity(&mut self, locus: &Locus, velocity: Vec2) {
        self.previous_position = locus.position - velocity;
    }

    /// One Verlet step with no forces.
    pub fn integrate(&mut self, locus: &mut Locus) {
        let position = locus.position;
        let rotation = locus.rotation;
        let scale = locus.scale;

        locus.position = position + (position - self.previous_position) * self.friction;
        locus.rotation = rotation + (rotation - self.previous_rotation) * self.rotation_friction;
        locus.scale = scale + (scale - self.previous_scale) * self.scale_friction;

        self.previous_position = position;
        self.previous_rotation = rotation;
        self.previous_scale = scale;
    }

    /// Count down the lifetime. Returns false once it has run out.
    pub fn age(&mut self, dt: f32) -> bool {
        match self.lifetime.as_mut() {
            Some(remaining) => {
                *remaining -= dt;
                *remaining > 0.0
            }
            None => true,
        }
    }
}
