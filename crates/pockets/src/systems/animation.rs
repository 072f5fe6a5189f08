//! Animation system: advances sprite animations and shows their current frame.

use slotmap::SecondaryMap;

use crate::api::types::EntityId;
use crate::assets::animation::{AnimationId, AnimationLibrary};
use crate::core::world::World;

#[derive(Debug, Default)]
pub struct SpriteAnimationSystem {
    library: AnimationLibrary,
    // Frame currently baked into each entity's mesh.
    shown: SecondaryMap<EntityId, (AnimationId, usize)>,
}

impl SpriteAnimationSystem {
    pub fn new(library: AnimationLibrary) -> Self {
        Self {
            library,
            shown: SecondaryMap::new(),
        }
    }

    pub fn library(&self) -> &AnimationLibrary {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut AnimationLibrary {
        &mut self.library
    }

    /// Advance every sprite animation by `dt` seconds.
    ///
    /// An entity's mesh is rebuilt as the frame's sprite quad when its frame
    /// changes, and on the first update after an animation is attached, even
    /// when it replaces one that showed the same frame.
    pub fn update(&mut self, world: &mut World, dt: f32) {
        let library = &self.library;
        let shown = &mut self.shown;

        for (id, anim) in world.sprite_animations.iter_mut() {
            let Some(def) = library.get(anim.animation) else {
                log::warn!("{id:?} plays unknown animation {:?}", anim.animation);
                continue;
            };

            let step = anim.step(def, dt);
            if step.finished {
                anim.notify_finished(id);
            }

            let Some(frame) = def.frame(anim.current_index) else {
                continue;
            };
            let current = (anim.animation, anim.current_index);
            let attached = anim.take_unshown();
            if !attached && shown.get(id) == Some(&current) {
                continue;
            }
            if let Some(mesh) = world.meshes.get_mut(id) {
                mesh.set_as_sprite(&frame.sprite);
                shown.insert(id, current);
            }
        }

        let animations = &world.sprite_animations;
        shown.retain(|id, _| animations.contains_key(id));
    }
}
