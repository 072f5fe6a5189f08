use crate::api::types::EntityId;
use crate::core::world::World;

/// Integrate every particle one Verlet step and despawn those whose lifetime ran out.
pub fn tick_particles(world: &mut World, dt: f32) {
    let mut expired: Vec<EntityId> = Vec::new();

    for (id, particle) in world.particles.iter_mut() {
        let Some(locus) = world.loci.get_mut(id) else {
            continue;
        };
        particle.integrate(locus);
        if !particle.age(dt) {
            expired.push(id);
        }
    }

    for id in expired {
        if let Err(err) = world.despawn(id) {
            log::warn!("failed to despawn expired particle: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::locus::Locus;
    use crate::components::particle::Particle;
    use glam::Vec2;

    #[test]
    fn frictionless_particle_keeps_constant_step() {
        let mut world = World::new();
        let id = world.spawn();
        let locus = Locus::new();
        world.insert(id, Particle::launched(&locus, Vec2::X).with_friction(1.0)).unwrap();
        world.insert(id, locus).unwrap();

        for step in 1..=5 {
            tick_particles(&mut world, 1.0 / 60.0);
            assert_eq!(world.get::<Locus>(id).unwrap().position, Vec2::new(step as f32, 0.0));
        }
    }

    #[test]
    fn expired_particles_are_despawned() {
        let mut world = World::new();
        let id = world.spawn();
        let locus = Locus::new();
        world.insert(id, Particle::at_rest(&locus).with_lifetime(0.25)).unwrap();
        world.insert(id, locus).unwrap();

        tick_particles(&mut world, 0.2);
        assert!(world.is_alive(id));
        tick_particles(&mut world, 0.2);
        assert!(!world.is_alive(id));
    }

    #[test]
    fn particle_without_locus_is_ignored() {
        let mut world = World::new();
        let id = world.spawn();
        world
            .insert(id, Particle::at_rest(&Locus::new()).with_lifetime(0.1))
            .unwrap();
        tick_particles(&mut world, 1.0);
        assert!(world.is_alive(id));
    }
}
