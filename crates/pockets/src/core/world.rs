//! Entity/component store.
//!
//! Entities are generational [`EntityId`]s owning at most one instance of each
//! component type. Structural changes that systems index (render data coming and
//! going, entities despawning) are queued as [`WorldEvent`]s; systems drain the
//! queue instead of holding pointers back into the store.

use glam::Affine2;
use slotmap::{SecondaryMap, SlotMap};

use crate::api::config::EngineConfig;
use crate::api::types::EntityId;
use crate::components::animation::SpriteAnimation;
use crate::components::emitter::ParticleEmitter;
use crate::components::locus::Locus;
use crate::components::mesh::RenderMesh;
use crate::components::particle::Particle;
use crate::components::render_data::{BlendPass, RenderData};
use crate::components::script::Script;
use crate::error::{PocketsError, Result};

/// Structural change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldEvent {
    Spawned(EntityId),
    Despawned(EntityId),
    /// The entity gained render data (or had it replaced).
    RenderDataAdded(EntityId),
    /// The entity lost render data that was drawn in `pass`.
    RenderDataRemoved { entity: EntityId, pass: BlendPass },
}

#[derive(Debug, Default)]
struct EntityRecord {
    tag: String,
}

/// A type the world can store per entity.
///
/// Implemented for every component in this crate. The hooks keep dependent
/// state consistent: render data requires a mesh and a locus, removing either
/// drops the render data, and every render data change is announced.
pub trait Component: Sized + 'static {
    const NAME: &'static str;

    #[doc(hidden)]
    fn storage(world: &World) -> &SecondaryMap<EntityId, Self>;

    #[doc(hidden)]
    fn storage_mut(world: &mut World) -> &mut SecondaryMap<EntityId, Self>;

    #[doc(hidden)]
    fn before_insert(_world: &World, _entity: EntityId, _component: &mut Self) -> Result<()> {
        Ok(())
    }

    #[doc(hidden)]
    fn after_insert(_world: &mut World, _entity: EntityId, _previous: Option<&Self>) {}

    /// Runs while the component is still attached.
    #[doc(hidden)]
    fn before_remove(_world: &mut World, _entity: EntityId) {}

    #[doc(hidden)]
    fn after_remove(_world: &mut World, _entity: EntityId, _removed: &Self) {}
}

pub struct World {
    entities: SlotMap<EntityId, EntityRecord>,
    pub(crate) loci: SecondaryMap<EntityId, Locus>,
    pub(crate) meshes: SecondaryMap<EntityId, RenderMesh>,
    pub(crate) render_data: SecondaryMap<EntityId, RenderData>,
    pub(crate) particles: SecondaryMap<EntityId, Particle>,
    pub(crate) emitters: SecondaryMap<EntityId, ParticleEmitter>,
    pub(crate) sprite_animations: SecondaryMap<EntityId, SpriteAnimation>,
    pub(crate) scripts: SecondaryMap<EntityId, Script>,
    events: Vec<WorldEvent>,
    preserve_world_on_detach: bool,
}

impl World {
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            entities: SlotMap::with_capacity_and_key(config.entity_capacity),
            loci: SecondaryMap::new(),
            meshes: SecondaryMap::new(),
            render_data: SecondaryMap::new(),
            particles: SecondaryMap::new(),
            emitters: SecondaryMap::new(),
            sprite_animations: SecondaryMap::new(),
            scripts: SecondaryMap::new(),
            events: Vec::new(),
            preserve_world_on_detach: config.preserve_world_on_detach,
        }
    }

    // -- Entities --

    /// Create an entity with no components.
    pub fn spawn(&mut self) -> EntityId {
        let id = self.entities.insert(EntityRecord::default());
        self.events.push(WorldEvent::Spawned(id));
        id
    }

    /// Create an entity with a string tag for lookups.
    pub fn spawn_tagged(&mut self, tag: impl Into<String>) -> EntityId {
        let id = self.spawn();
        if let Some(record) = self.entities.get_mut(id) {
            record.tag = tag.into();
        }
        id
    }

    /// Destroy an entity and every component it owns.
    /// Children of its locus are detached first.
    pub fn despawn(&mut self, entity: EntityId) -> Result<()> {
        self.ensure_alive(entity)?;

        for child in self.children_of(entity) {
            self.detach(child);
        }
        if let Some(data) = self.render_data.remove(entity) {
            self.events.push(WorldEvent::RenderDataRemoved {
                entity,
                pass: data.pass,
            });
        }
        self.loci.remove(entity);
        self.meshes.remove(entity);
        self.particles.remove(entity);
        self.emitters.remove(entity);
        self.sprite_animations.remove(entity);
        self.scripts.remove(entity);
        self.entities.remove(entity);
        self.events.push(WorldEvent::Despawned(entity));
        log::debug!("despawned {entity:?}");
        Ok(())
    }

    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.entities.contains_key(entity)
    }

    pub fn ensure_alive(&self, entity: EntityId) -> Result<()> {
        if self.is_alive(entity) {
            Ok(())
        } else {
            Err(PocketsError::StaleEntity(entity))
        }
    }

    /// Iterate over all live entity ids.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys()
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn tag(&self, entity: EntityId) -> Option<&str> {
        self.entities.get(entity).map(|r| r.tag.as_str())
    }

    pub fn set_tag(&mut self, entity: EntityId, tag: impl Into<String>) -> Result<()> {
        let record = self
            .entities
            .get_mut(entity)
            .ok_or(PocketsError::StaleEntity(entity))?;
        record.tag = tag.into();
        Ok(())
    }

    /// Find the first entity with the given tag.
    pub fn find_by_tag(&self, tag: &str) -> Option<EntityId> {
        self.entities
            .iter()
            .find(|(_, r)| r.tag == tag)
            .map(|(id, _)| id)
    }

    // -- Components --

    /// Attach `component`, returning the one it replaced.
    pub fn insert<T: Component>(&mut self, entity: EntityId, mut component: T) -> Result<Option<T>> {
        self.ensure_alive(entity)?;
        T::before_insert(self, entity, &mut component)?;
        let previous = T::storage_mut(self).insert(entity, component);
        T::after_insert(self, entity, previous.as_ref());
        Ok(previous)
    }

    /// Detach and return a component.
    pub fn remove<T: Component>(&mut self, entity: EntityId) -> Option<T> {
        if !T::storage(self).contains_key(entity) {
            return None;
        }
        T::before_remove(self, entity);
        let removed = T::storage_mut(self).remove(entity)?;
        T::after_remove(self, entity, &removed);
        Some(removed)
    }

    pub fn get<T: Component>(&self, entity: EntityId) -> Option<&T> {
        T::storage(self).get(entity)
    }

    pub fn get_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        T::storage_mut(self).get_mut(entity)
    }

    pub fn has<T: Component>(&self, entity: EntityId) -> bool {
        T::storage(self).contains_key(entity)
    }

    /// Like [`get`](Self::get), but a missing component is an error.
    pub fn component<T: Component>(&self, entity: EntityId) -> Result<&T> {
        self.get(entity).ok_or(PocketsError::MissingComponent {
            entity,
            component: T::NAME,
        })
    }

    /// Like [`get_mut`](Self::get_mut), but a missing component is an error.
    pub fn component_mut<T: Component>(&mut self, entity: EntityId) -> Result<&mut T> {
        T::storage_mut(self)
            .get_mut(entity)
            .ok_or(PocketsError::MissingComponent {
                entity,
                component: T::NAME,
            })
    }

    /// Iterate over every instance of one component type.
    pub fn iter<T: Component>(&self) -> impl Iterator<Item = (EntityId, &T)> {
        T::storage(self).iter()
    }

    pub fn iter_mut<T: Component>(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        T::storage_mut(self).iter_mut()
    }

    // -- Hierarchy --

    /// Make `parent`'s locus the parent of `child`'s locus.
    /// The child's local state is kept, so it moves with the parent from here on.
    pub fn set_parent(&mut self, child: EntityId, parent: EntityId) -> Result<()> {
        self.ensure_alive(child)?;
        self.ensure_alive(parent)?;
        self.component::<Locus>(child)?;
        self.component::<Locus>(parent)?;

        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(PocketsError::HierarchyCycle { child, parent });
            }
            cursor = self.loci.get(id).and_then(|l| l.parent);
        }

        if let Some(locus) = self.loci.get_mut(child) {
            locus.parent = Some(parent);
        }
        Ok(())
    }

    /// Remove `child` from its parent. See [`EngineConfig::preserve_world_on_detach`].
    pub fn detach_from_parent(&mut self, child: EntityId) -> Result<()> {
        self.ensure_alive(child)?;
        self.component::<Locus>(child)?;
        self.detach(child);
        Ok(())
    }

    fn detach(&mut self, child: EntityId) {
        let world = if self.preserve_world_on_detach {
            self.world_matrix(child).ok()
        } else {
            None
        };
        if let Some(locus) = self.loci.get_mut(child) {
            if locus.parent.is_none() {
                return;
            }
            if let Some(matrix) = world {
                locus.set_from_matrix(&matrix);
            }
            locus.parent = None;
        }
    }

    pub fn preserve_world_on_detach(&self) -> bool {
        self.preserve_world_on_detach
    }

    pub fn set_preserve_world_on_detach(&mut self, preserve: bool) {
        self.preserve_world_on_detach = preserve;
    }

    pub fn parent_of(&self, entity: EntityId) -> Option<EntityId> {
        self.loci.get(entity).and_then(|l| l.parent)
    }

    /// Entities whose locus is directly parented to `entity`.
    pub fn children_of(&self, entity: EntityId) -> Vec<EntityId> {
        self.loci
            .iter()
            .filter(|(_, l)| l.parent == Some(entity))
            .map(|(id, _)| id)
            .collect()
    }

    /// Full transform of `entity`: every ancestor's local matrix composed with its own.
    pub fn world_matrix(&self, entity: EntityId) -> Result<Affine2> {
        let mut matrix = self.component::<Locus>(entity)?.local_matrix();
        let mut cursor = self.parent_of(entity);
        while let Some(id) = cursor {
            let Some(parent) = self.loci.get(id) else { break };
            matrix = parent.local_matrix() * matrix;
            cursor = parent.parent;
        }
        Ok(matrix)
    }

    // -- Events --

    /// Take all queued structural events, oldest first.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, WorldEvent> {
        self.events.drain(..)
    }

    pub fn pending_events(&self) -> &[WorldEvent] {
        &self.events
    }

    /// Drop every entity and queued event.
    pub fn clear(&mut self) {
        let ids: Vec<EntityId> = self.entities.keys().collect();
        for id in ids {
            // Ids were just collected from the live set.
            let _ = self.despawn(id);
        }
        self.events.clear();
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! plain_component {
    ($ty:ty, $field:ident, $name:literal) => {
        impl Component for $ty {
            const NAME: &'static str = $name;

            fn storage(world: &World) -> &SecondaryMap<EntityId, Self> {
                &world.$field
            }

            fn storage_mut(world: &mut World) -> &mut SecondaryMap<EntityId, Self> {
                &mut world.$field
            }
        }
    };
}

plain_component!(Particle, particles, "Particle");
plain_component!(ParticleEmitter, emitters, "ParticleEmitter");
plain_component!(SpriteAnimation, sprite_animations, "SpriteAnimation");
plain_component!(Script, scripts, "Script");

impl Component for Locus {
    const NAME: &'static str = "Locus";

    fn storage(world: &World) -> &SecondaryMap<EntityId, Self> {
        &world.loci
    }

    fn storage_mut(world: &mut World) -> &mut SecondaryMap<EntityId, Self> {
        &mut world.loci
    }

    /// Replacing a locus keeps its place in the hierarchy.
    fn before_insert(world: &World, entity: EntityId, component: &mut Self) -> Result<()> {
        component.parent = world.parent_of(entity);
        Ok(())
    }

    /// Children are detached while the parent's matrix can still be resolved.
    fn before_remove(world: &mut World, entity: EntityId) {
        for child in world.children_of(entity) {
            world.detach(child);
        }
    }

    fn after_remove(world: &mut World, entity: EntityId, _removed: &Self) {
        world.remove::<RenderData>(entity);
    }
}

impl Component for RenderMesh {
    const NAME: &'static str = "RenderMesh";

    fn storage(world: &World) -> &SecondaryMap<EntityId, Self> {
        &world.meshes
    }

    fn storage_mut(world: &mut World) -> &mut SecondaryMap<EntityId, Self> {
        &mut world.meshes
    }

    fn after_remove(world: &mut World, entity: EntityId, _removed: &Self) {
        world.remove::<RenderData>(entity);
    }
}

impl Component for RenderData {
    const NAME: &'static str = "RenderData";

    fn storage(world: &World) -> &SecondaryMap<EntityId, Self> {
        &world.render_data
    }

    fn storage_mut(world: &mut World) -> &mut SecondaryMap<EntityId, Self> {
        &mut world.render_data
    }

    fn before_insert(world: &World, entity: EntityId, _component: &mut Self) -> Result<()> {
        world.component::<RenderMesh>(entity)?;
        world.component::<Locus>(entity)?;
        Ok(())
    }

    fn after_insert(world: &mut World, entity: EntityId, previous: Option<&Self>) {
        if let Some(previous) = previous {
            world.events.push(WorldEvent::RenderDataRemoved {
                entity,
                pass: previous.pass,
            });
        }
        world.events.push(WorldEvent::RenderDataAdded(entity));
    }

    fn after_remove(world: &mut World, entity: EntityId, removed: &Self) {
        world.events.push(WorldEvent::RenderDataRemoved {
            entity,
            pass: removed.pass,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Rect;
    use glam::Vec2;

    fn drawable(world: &mut World) -> EntityId {
        let id = world.spawn();
        world.insert(id, Locus::new()).unwrap();
        let mut mesh = RenderMesh::new();
        mesh.set_as_box(Rect::UNIT);
        world.insert(id, mesh).unwrap();
        id
    }

    #[test]
    fn spawn_and_get() {
        let mut world = World::new();
        let id = world.spawn();
        world
            .insert(id, Locus::new().with_position(Vec2::new(10.0, 20.0)))
            .unwrap();
        assert_eq!(world.get::<Locus>(id).unwrap().position, Vec2::new(10.0, 20.0));
        assert!(world.has::<Locus>(id));
        assert!(!world.has::<Particle>(id));
    }

    #[test]
    fn despawn_removes_components_and_invalidates_id() {
        let mut world = World::new();
        let id = drawable(&mut world);
        world.insert(id, RenderData::premultiplied(0)).unwrap();
        world.drain_events().for_each(drop);

        world.despawn(id).unwrap();
        assert!(!world.is_alive(id));
        assert!(world.get::<Locus>(id).is_none());
        assert_eq!(
            world.drain_events().collect::<Vec<_>>(),
            vec![
                WorldEvent::RenderDataRemoved { entity: id, pass: BlendPass::Premultiplied },
                WorldEvent::Despawned(id),
            ]
        );

        // The slot is reused, but the old id stays dead.
        let reused = world.spawn();
        assert_ne!(reused, id);
        assert!(matches!(world.despawn(id), Err(PocketsError::StaleEntity(_))));
        assert!(world.insert(id, Locus::new()).is_err());
    }

    #[test]
    fn render_data_requires_mesh_and_locus() {
        let mut world = World::new();
        let id = world.spawn();
        world.insert(id, Locus::new()).unwrap();
        let err = world.insert(id, RenderData::default()).unwrap_err();
        assert!(matches!(
            err,
            PocketsError::MissingComponent { component: "RenderMesh", .. }
        ));
    }

    #[test]
    fn replacing_render_data_announces_both_sides() {
        let mut world = World::new();
        let id = drawable(&mut world);
        world.insert(id, RenderData::premultiplied(1)).unwrap();
        world.insert(id, RenderData::additive()).unwrap();
        let events: Vec<_> = world.drain_events().collect();
        assert_eq!(
            &events[events.len() - 3..],
            &[
                WorldEvent::RenderDataAdded(id),
                WorldEvent::RenderDataRemoved { entity: id, pass: BlendPass::Premultiplied },
                WorldEvent::RenderDataAdded(id),
            ]
        );
    }

    #[test]
    fn removing_mesh_drops_render_data() {
        let mut world = World::new();
        let id = drawable(&mut world);
        world.insert(id, RenderData::multiplicative()).unwrap();
        world.remove::<RenderMesh>(id);
        assert!(!world.has::<RenderData>(id));
        assert_eq!(
            world.pending_events().last(),
            Some(&WorldEvent::RenderDataRemoved { entity: id, pass: BlendPass::Multiplicative })
        );
    }

    #[test]
    fn component_reports_missing() {
        let mut world = World::new();
        let id = world.spawn();
        assert!(matches!(
            world.component::<Particle>(id),
            Err(PocketsError::MissingComponent { component: "Particle", .. })
        ));
    }

    #[test]
    fn find_by_tag() {
        let mut world = World::new();
        let hero = world.spawn_tagged("hero");
        world.spawn_tagged("enemy");
        assert_eq!(world.find_by_tag("hero"), Some(hero));
        assert_eq!(world.tag(hero), Some("hero"));
        assert!(world.find_by_tag("nobody").is_none());
    }

    #[test]
    fn child_world_matrix_composes_parent() {
        let mut world = World::new();
        let parent = world.spawn();
        let child = world.spawn();
        world.insert(parent, Locus::new().with_position(Vec2::new(10.0, 0.0))).unwrap();
        world.insert(child, Locus::new().with_position(Vec2::new(0.0, 5.0))).unwrap();
        world.set_parent(child, parent).unwrap();

        let origin = world.world_matrix(child).unwrap().transform_point2(Vec2::ZERO);
        assert_eq!(origin, Vec2::new(10.0, 5.0));
    }

    #[test]
    fn set_parent_rejects_cycles() {
        let mut world = World::new();
        let a = world.spawn();
        let b = world.spawn();
        let c = world.spawn();
        for id in [a, b, c] {
            world.insert(id, Locus::new()).unwrap();
        }
        world.set_parent(b, a).unwrap();
        world.set_parent(c, b).unwrap();

        assert!(matches!(world.set_parent(a, c), Err(PocketsError::HierarchyCycle { .. })));
        assert!(matches!(world.set_parent(a, a), Err(PocketsError::HierarchyCycle { .. })));
        assert_eq!(world.children_of(b), vec![c]);
    }

    #[test]
    fn replacing_locus_keeps_parent() {
        let mut world = World::new();
        let parent = world.spawn();
        let child = world.spawn();
        world.insert(parent, Locus::new()).unwrap();
        world.insert(child, Locus::new()).unwrap();
        world.set_parent(child, parent).unwrap();
        world.insert(child, Locus::new().with_rotation(1.0)).unwrap();
        assert_eq!(world.parent_of(child), Some(parent));
    }

    fn parented(preserve: bool) -> (World, EntityId, EntityId) {
        let mut world = World::with_config(&EngineConfig::default().with_preserve_world_on_detach(preserve));
        let parent = world.spawn();
        let child = world.spawn();
        world
            .insert(
                parent,
                Locus::new()
                    .with_position(Vec2::new(100.0, 0.0))
                    .with_rotation(std::f32::consts::FRAC_PI_2)
                    .with_scale(Vec2::splat(2.0)),
            )
            .unwrap();
        world.insert(child, Locus::new().with_position(Vec2::new(5.0, 0.0))).unwrap();
        world.set_parent(child, parent).unwrap();
        (world, parent, child)
    }

    #[test]
    fn detach_preserving_world_transform() {
        let (mut world, _, child) = parented(true);
        let before = world.world_matrix(child).unwrap();
        world.detach_from_parent(child).unwrap();

        assert_eq!(world.parent_of(child), None);
        let after = world.world_matrix(child).unwrap();
        assert!(after.abs_diff_eq(before, 1e-4));
        let locus = world.get::<Locus>(child).unwrap();
        assert!(locus.position.abs_diff_eq(Vec2::new(100.0, 10.0), 1e-4));
        assert!(locus.scale.abs_diff_eq(Vec2::splat(2.0), 1e-4));
    }

    #[test]
    fn detach_keeping_local_state() {
        let (mut world, _, child) = parented(false);
        world.detach_from_parent(child).unwrap();
        let locus = world.get::<Locus>(child).unwrap();
        assert_eq!(locus.position, Vec2::new(5.0, 0.0));
        assert_eq!(locus.rotation, 0.0);
    }

    #[test]
    fn despawning_parent_orphans_children_in_place() {
        let (mut world, parent, child) = parented(true);
        let before = world.world_matrix(child).unwrap();
        world.despawn(parent).unwrap();
        assert_eq!(world.parent_of(child), None);
        assert!(world.world_matrix(child).unwrap().abs_diff_eq(before, 1e-4));
    }

    #[test]
    fn removing_parent_locus_orphans_children_in_place() {
        let (mut world, parent, child) = parented(true);
        let before = world.world_matrix(child).unwrap();
        assert!(world.remove::<Locus>(parent).is_some());
        assert_eq!(world.parent_of(child), None);
        assert!(world.world_matrix(child).unwrap().abs_diff_eq(before, 1e-4));
        assert!(world.get::<Locus>(child).unwrap().position.abs_diff_eq(Vec2::new(100.0, 10.0), 1e-4));
    }

    #[test]
    fn removing_parent_locus_keeps_child_local_state() {
        let (mut world, parent, child) = parented(false);
        world.remove::<Locus>(parent);
        assert_eq!(world.parent_of(child), None);
        assert_eq!(world.get::<Locus>(child).unwrap().position, Vec2::new(5.0, 0.0));
    }

    #[test]
    fn clear_empties_world() {
        let mut world = World::new();
        drawable(&mut world);
        drawable(&mut world);
        world.clear();
        assert!(world.is_empty());
        assert!(world.pending_events().is_empty());
    }
}
