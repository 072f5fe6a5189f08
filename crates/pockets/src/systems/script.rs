use crate::api::types::EntityId;
use crate::core::world::World;

/// Run every entity script once.
///
/// Each script is taken out of the world while it runs so it can mutate the
/// world freely, then put back if its entity survived and it was not replaced.
pub fn run_scripts(world: &mut World, dt: f32) {
    let ids: Vec<EntityId> = world.scripts.keys().collect();
    for id in ids {
        let Some(mut script) = world.scripts.remove(id) else {
            continue;
        };
        script.run(world, id, dt);
        if world.is_alive(id) && !world.scripts.contains_key(id) {
            world.scripts.insert(id, script);
        }
    }
}
