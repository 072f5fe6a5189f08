use std::f32::consts::TAU;
use std::fmt;

use crate::api::types::EntityId;
use crate::core::world::World;

/// Finishes a freshly spawned particle entity (mesh, render data, ...).
/// The entity already has a `Locus` and a `Particle` when this runs.
pub type ParticleBuilder = Box<dyn FnMut(&mut World, EntityId)>;

/// How the emitter releases particles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmissionMode {
    /// Emit particles continuously at a fixed rate.
    Continuous,
    /// Emit particles in bursts.
    Burst,
}

/// Component for spawning particle entities from an entity's position.
pub struct ParticleEmitter {
    /// Whether the emitter is actively spawning.
    pub active: bool,
    pub mode: EmissionMode,
    /// Particles per second (Continuous mode).
    pub rate: f32,
    /// Particles per burst (Burst mode).
    pub burst_count: u32,
    /// Seconds between bursts (0 = one-shot).
    pub burst_interval: f32,
    /// Min/max initial speed in units per step.
    pub speed_range: (f32, f32),
    /// Center of the launch cone, in radians.
    pub direction: f32,
    /// Full width of the launch cone, in radians (TAU = any direction).
    pub spread: f32,
    /// Friction given to spawned particles.
    pub friction: f32,
    /// Lifetime given to spawned particles, in seconds.
    pub lifetime: Option<f32>,
    builder: Option<ParticleBuilder>,
    accumulator: f32,
    burst_timer: f32,
    burst_fired: bool,
}

impl fmt::Debug for ParticleEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParticleEmitter")
            .field("active", &self.active)
            .field("mode", &self.mode)
            .field("rate", &self.rate)
            .field("burst_count", &self.burst_count)
            .field("burst_interval", &self.burst_interval)
            .field("speed_range", &self.speed_range)
            .field("direction", &self.direction)
            .field("spread", &self.spread)
            .field("friction", &self.friction)
            .field("lifetime", &self.lifetime)
            .field("builder", &self.builder.is_some())
            .finish()
    }
}

impl Default for ParticleEmitter {
    fn default() -> Self {
        Self {
            active: true,
            mode: EmissionMode::Continuous,
            rate: 10.0,
            burst_count: 8,
            burst_interval: 0.0,
            speed_range: (1.0, 4.0),
            direction: 0.0,
            spread: TAU,
            friction: 0.98,
            lifetime: Some(1.0),
            builder: None,
            accumulator: 0.0,
            burst_timer: 0.0,
            burst_fired: false,
        }
    }
}

impl ParticleEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Builder pattern --

    pub fn with_mode(mut self, mode: EmissionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_burst_count(mut self, count: u32) -> Self {
        self.burst_count = count;
        self
    }

    pub fn with_burst_interval(mut self, interval: f32) -> Self {
        self.burst_interval = interval;
        self
    }

    pub fn with_speed_range(mut self, min: f32, max: f32) -> Self {
        self.speed_range = (min, max);
        self
    }

    pub fn with_cone(mut self, direction: f32, spread: f32) -> Self {
        self.direction = direction;
        self.spread = spread;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_lifetime(mut self, lifetime: Option<f32>) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn with_builder(mut self, builder: impl FnMut(&mut World, EntityId) + 'static) -> Self {
        self.builder = Some(Box::new(builder));
        self
    }

    pub(crate) fn take_builder(&mut self) -> Option<ParticleBuilder> {
        self.builder.take()
    }

    pub(crate) fn restore_builder(&mut self, builder: ParticleBuilder) {
        if self.builder.is_none() {
            self.builder = Some(builder);
        }
    }

    /// Advance the emitter by `dt` seconds. Returns the number of particles to spawn.
    pub fn tick(&mut self, dt: f32) -> usize {
        if !self.active {
            return 0;
        }

        match self.mode {
            EmissionMode::Continuous => {
                self.accumulator += self.rate * dt;
                let count = self.accumulator as usize;
                self.accumulator -= count as f32;
                count
            }
            EmissionMode::Burst => {
                if self.burst_interval <= 0.0 {
                    // One-shot burst
                    if !self.burst_fired {
                        self.burst_fired = true;
                        self.burst_count as usize
                    } else {
                        0
                    }
                } else {
                    self.burst_timer += dt;
                    if self.burst_timer >= self.burst_interval {
                        self.burst_timer -= self.burst_interval;
                        self.burst_count as usize
                    } else {
                        0
                    }
                }
            }
        }
    }
}
