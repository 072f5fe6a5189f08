use std::fmt;

use crate::api::types::EntityId;
use crate::core::world::World;

/// Per-frame behavior attached to an entity.
///
/// The closure runs once per update with the world, its own entity and the
/// frame delta. Captures are moved in; anything captured must not assume the
/// entity outlives the closure (the entity may be despawned by the closure itself).
pub struct Script {
    f: Box<dyn FnMut(&mut World, EntityId, f32)>,
}

impl Script {
    pub fn new(f: impl FnMut(&mut World, EntityId, f32) + 'static) -> Self {
        Self { f: Box::new(f) }
    }

    pub(crate) fn run(&mut self, world: &mut World, entity: EntityId, dt: f32) {
        (self.f)(world, entity, dt);
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Script")
    }
}
