use glam::Vec2;

use crate::api::types::EntityId;
use crate::components::locus::Locus;
use crate::components::particle::Particle;
use crate::core::world::World;
use crate::error::Result;
use crate::systems::rng::Rng;

/// Ticks particle emitters and spawns the particles they release.
#[derive(Debug, Clone)]
pub struct EmitterSystem {
    rng: Rng,
}

struct Launch {
    origin: Vec2,
    speed_range: (f32, f32),
    direction: f32,
    spread: f32,
    friction: f32,
    lifetime: Option<f32>,
}

impl EmitterSystem {
    pub fn new(seed: u64) -> Self {
        Self { rng: Rng::new(seed) }
    }

    /// Advance every active emitter by `dt`.
    ///
    /// Each released particle is a new entity with a `Locus` at the emitter's
    /// world position and a launched `Particle`; the emitter's builder runs
    /// on it afterwards.
    pub fn update(&mut self, world: &mut World, dt: f32) {
        let ids: Vec<EntityId> = world.emitters.keys().collect();

        for id in ids {
            let Some(emitter) = world.emitters.get_mut(id) else {
                continue;
            };
            let count = emitter.tick(dt);
            if count == 0 {
                continue;
            }
            let mut launch = Launch {
                origin: Vec2::ZERO,
                speed_range: emitter.speed_range,
                direction: emitter.direction,
                spread: emitter.spread,
                friction: emitter.friction,
                lifetime: emitter.lifetime,
            };
            let mut builder = emitter.take_builder();

            launch.origin = match (world.get::<Locus>(id), world.world_matrix(id)) {
                (Some(locus), Ok(matrix)) => matrix.transform_point2(locus.registration_point),
                _ => Vec2::ZERO,
            };

            for _ in 0..count {
                match self.spawn_particle(world, &launch) {
                    Ok(particle) => {
                        if let Some(build) = builder.as_mut() {
                            build(world, particle);
                        }
                    }
                    Err(err) => log::warn!("emitter {id:?} failed to spawn: {err}"),
                }
            }

            if let (Some(build), Some(emitter)) = (builder, world.emitters.get_mut(id)) {
                emitter.restore_builder(build);
            }
        }
    }

    fn spawn_particle(&mut self, world: &mut World, launch: &Launch) -> Result<EntityId> {
        let half = launch.spread * 0.5;
        let angle = launch.direction + self.rng.range(-half, half);
        let speed = self.rng.range(launch.speed_range.0, launch.speed_range.1);

        let locus = Locus::new().with_position(launch.origin);
        let mut particle = Particle::launched(&locus, Vec2::from_angle(angle) * speed)
            .with_friction(launch.friction);
        particle.lifetime = launch.lifetime;

        let id = world.spawn();
        world.insert(id, locus)?;
        world.insert(id, particle)?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::emitter::{EmissionMode, ParticleEmitter};
    use crate::components::mesh::RenderMesh;
    use std::f32::consts::FRAC_PI_2;

    fn burst(count: u32) -> ParticleEmitter {
        ParticleEmitter::new()
            .with_mode(EmissionMode::Burst)
            .with_burst_count(count)
            .with_burst_interval(0.0)
    }

    fn particles(world: &World) -> Vec<EntityId> {
        world.iter::<Particle>().map(|(id, _)| id).collect()
    }

    #[test]
    fn spawns_at_emitter_world_position() {
        let mut world = World::new();
        let parent = world.spawn();
        world.insert(parent, Locus::new().with_position(Vec2::new(100.0, 0.0))).unwrap();
        let source = world.spawn();
        world.insert(source, Locus::new().with_position(Vec2::new(0.0, 200.0))).unwrap();
        world.set_parent(source, parent).unwrap();
        world.insert(source, burst(5)).unwrap();

        let mut system = EmitterSystem::new(42);
        system.update(&mut world, 0.016);

        let spawned = particles(&world);
        assert_eq!(spawned.len(), 5);
        for id in spawned {
            assert_eq!(world.get::<Locus>(id).unwrap().position, Vec2::new(100.0, 200.0));
        }
    }

    #[test]
    fn velocity_respects_speed_range_and_cone() {
        let mut world = World::new();
        let source = world.spawn();
        world.insert(source, Locus::new()).unwrap();
        world
            .insert(
                source,
                burst(50).with_speed_range(2.0, 3.0).with_cone(FRAC_PI_2, 0.5),
            )
            .unwrap();

        EmitterSystem::new(7).update(&mut world, 0.016);
        for id in particles(&world) {
            let velocity = world.get::<Particle>(id).unwrap().velocity(world.get::<Locus>(id).unwrap());
            let speed = velocity.length();
            assert!((2.0 - 1e-4..=3.0 + 1e-4).contains(&speed), "{speed}");
            let angle = velocity.to_angle();
            assert!((angle - FRAC_PI_2).abs() <= 0.25 + 1e-4, "{angle}");
        }
    }

    #[test]
    fn builder_finishes_each_particle() {
        let mut world = World::new();
        let source = world.spawn();
        world.insert(source, Locus::new()).unwrap();
        world
            .insert(
                source,
                burst(3).with_lifetime(Some(0.5)).with_builder(|world, id| {
                    world.insert(id, RenderMesh::new()).unwrap();
                }),
            )
            .unwrap();

        EmitterSystem::new(1).update(&mut world, 0.016);
        let spawned = particles(&world);
        assert_eq!(spawned.len(), 3);
        for id in &spawned {
            assert!(world.has::<RenderMesh>(*id));
            assert_eq!(world.get::<Particle>(*id).unwrap().lifetime, Some(0.5));
        }
        // The builder is handed back for the next burst.
        assert!(format!("{:?}", world.get::<ParticleEmitter>(source).unwrap()).contains("builder: true"));
    }

    #[test]
    fn inactive_emitter_spawns_nothing() {
        let mut world = World::new();
        let source = world.spawn();
        let mut emitter = burst(5);
        emitter.active = false;
        world.insert(source, emitter).unwrap();
        EmitterSystem::new(42).update(&mut world, 1.0);
        assert!(particles(&world).is_empty());
    }

    #[test]
    fn same_seed_same_particles() {
        let run = || {
            let mut world = World::new();
            let source = world.spawn();
            world.insert(source, Locus::new()).unwrap();
            world.insert(source, burst(4)).unwrap();
            EmitterSystem::new(9).update(&mut world, 0.016);
            world
                .iter::<Particle>()
                .map(|(_, p)| p.previous_position)
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
