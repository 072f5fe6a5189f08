//! Render system: per-pass draw lists flattened into one triangle strip buffer.
//!
//! Every drawable entity lives in exactly one of three lists, one per
//! [`BlendPass`]. The premultiplied list is kept sorted by layer; the additive
//! and multiplicative lists keep insertion order. Each frame the lists are
//! flattened into a single vertex buffer, consecutive meshes stitched with two
//! degenerate vertices, and drawn with one strip call per non-empty pass.

use crate::api::config::EngineConfig;
use crate::api::types::{ColorA8, EntityId, TextureId};
use crate::components::render_data::BlendPass;
use crate::core::world::{World, WorldEvent};
use crate::renderer::traits::RenderBackend;
use crate::renderer::vertex::Vertex;
use crate::systems::transform::TransformSystem;

/// Contiguous range of the vertex buffer drawn by one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassBatch {
    pub first: u32,
    pub count: u32,
}

#[derive(Debug)]
pub struct RenderSystem {
    passes: [Vec<EntityId>; BlendPass::COUNT],
    batches: [PassBatch; BlendPass::COUNT],
    vertices: Vec<Vertex>,
    texture: Option<TextureId>,
    clear_color: Option<ColorA8>,
    needs_upload: bool,
}

impl RenderSystem {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            passes: Default::default(),
            batches: Default::default(),
            vertices: Vec::with_capacity(config.vertex_capacity),
            texture: None,
            clear_color: config.theme.background,
            needs_upload: false,
        }
    }

    /// Texture bound for every pass. `None` draws untextured.
    pub fn set_texture(&mut self, texture: Option<TextureId>) {
        self.texture = texture;
    }

    pub fn texture(&self) -> Option<TextureId> {
        self.texture
    }

    /// Color cleared at the start of [`draw`](Self::draw). `None` skips the clear.
    pub fn set_clear_color(&mut self, color: Option<ColorA8>) {
        self.clear_color = color;
    }

    /// Entities drawn in `pass`, in draw order.
    pub fn pass(&self, pass: BlendPass) -> &[EntityId] {
        &self.passes[pass.index()]
    }

    pub fn batch(&self, pass: BlendPass) -> PassBatch {
        self.batches[pass.index()]
    }

    /// The flattened buffer from the last [`update`](Self::update).
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    // -- List maintenance --

    /// Apply queued structural changes from the world to the draw lists.
    pub fn process_events(&mut self, world: &mut World) {
        let events: Vec<WorldEvent> = world.drain_events().collect();
        for event in events {
            match event {
                WorldEvent::RenderDataAdded(id) => self.insert(world, id),
                WorldEvent::RenderDataRemoved { entity, pass } => self.remove(entity, pass),
                WorldEvent::Despawned(id) => {
                    for pass in BlendPass::ALL {
                        self.remove(id, pass);
                    }
                }
                WorldEvent::Spawned(_) => {}
            }
        }
    }

    /// Add `id` to the list of the pass its render data names.
    ///
    /// Premultiplied entries go before the first entry with a strictly greater
    /// layer, so equal layers keep insertion order. Ignored when the entity no
    /// longer has render data or is already listed.
    pub(crate) fn insert(&mut self, world: &World, id: EntityId) {
        let Some(data) = world.render_data.get(id) else {
            return;
        };
        let list = &mut self.passes[data.pass.index()];
        if list.contains(&id) {
            return;
        }
        match data.pass {
            BlendPass::Premultiplied => {
                let at = list
                    .iter()
                    .position(|&other| layer_of(world, other) > data.layer)
                    .unwrap_or(list.len());
                list.insert(at, id);
            }
            BlendPass::Additive | BlendPass::Multiplicative => list.push(id),
        }
    }

    /// Drop `id` from `pass`'s list, keeping the order of the rest.
    pub(crate) fn remove(&mut self, id: EntityId, pass: BlendPass) {
        self.passes[pass.index()].retain(|&other| other != id);
    }

    /// True when the premultiplied list is in non-decreasing layer order.
    /// Layers changed in place through `World::get_mut` can break it.
    pub fn check_ordering(&self, world: &World) -> bool {
        let sorted = self.passes[BlendPass::Premultiplied.index()]
            .windows(2)
            .all(|w| layer_of(world, w[0]) <= layer_of(world, w[1]));
        if !sorted {
            log::warn!("premultiplied draw list is out of layer order; call sort()");
        }
        sorted
    }

    /// Restore layer order in the premultiplied list. Stable.
    pub fn sort(&mut self, world: &World) {
        self.passes[BlendPass::Premultiplied.index()].sort_by_key(|&id| layer_of(world, id));
    }

    // -- Frame --

    /// Rebuild the vertex buffer from the draw lists.
    ///
    /// Positions are moved into world space with the matrices from `transforms`;
    /// loci that have not been propagated yet fall back to walking the hierarchy.
    pub fn update(&mut self, world: &World, transforms: &TransformSystem) {
        self.vertices.clear();

        for pass in BlendPass::ALL {
            let first = self.vertices.len();

            for &id in &self.passes[pass.index()] {
                if !world.render_data.get(id).is_some_and(|d| d.pass == pass) {
                    log::warn!("skipping stale {pass:?} draw entry {id:?}");
                    continue;
                }
                let Some(mesh) = world.meshes.get(id) else {
                    log::warn!("draw entry {id:?} has no mesh");
                    continue;
                };
                if mesh.is_empty() {
                    continue;
                }
                let matrix = match transforms.world_matrix(id) {
                    Some(matrix) => matrix,
                    None => match world.world_matrix(id) {
                        Ok(matrix) => matrix,
                        Err(err) => {
                            log::warn!("skipping draw entry: {err}");
                            continue;
                        }
                    },
                };

                let head = mesh.vertices()[0].transformed(&matrix);
                if self.vertices.len() > first {
                    if let Some(&last) = self.vertices.last() {
                        self.vertices.push(last);
                        self.vertices.push(head);
                    }
                }
                self.vertices.push(head);
                self.vertices
                    .extend(mesh.vertices()[1..].iter().map(|v| v.transformed(&matrix)));
            }

            self.batches[pass.index()] = PassBatch {
                first: first as u32,
                count: (self.vertices.len() - first) as u32,
            };
        }

        self.needs_upload = true;
    }

    /// Submit the frame: clear, upload (once per update), bind, then one strip
    /// per non-empty pass in pass order.
    pub fn draw(&mut self, backend: &mut dyn RenderBackend) {
        if let Some(color) = self.clear_color {
            backend.clear(color);
        }
        if self.needs_upload {
            backend.upload(&self.vertices);
            self.needs_upload = false;
        }
        backend.bind(self.texture);
        for pass in BlendPass::ALL {
            let batch = self.batches[pass.index()];
            if batch.count > 0 {
                backend.draw_strip(pass.blend_func(), batch.first, batch.count);
            }
        }
    }
}

fn layer_of(world: &World, id: EntityId) -> i32 {
    world.render_data.get(id).map_or(i32::MIN, |d| d.layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Rect;
    use crate::components::locus::Locus;
    use crate::components::mesh::RenderMesh;
    use crate::components::render_data::RenderData;
    use crate::renderer::traits::{DrawCommand, RecordingBackend};
    use crate::systems::rng::Rng;
    use glam::Vec2;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn boxed(world: &mut World, at: Vec2, data: RenderData) -> EntityId {
        let id = world.spawn();
        world.insert(id, Locus::new().with_position(at)).unwrap();
        let mut mesh = RenderMesh::new();
        mesh.set_as_box(Rect::new(0.0, 0.0, 10.0, 10.0));
        world.insert(id, mesh).unwrap();
        world.insert(id, data).unwrap();
        id
    }

    fn frame(world: &mut World, render: &mut RenderSystem) {
        render.process_events(world);
        let mut transforms = TransformSystem::new();
        transforms.propagate(world);
        render.update(world, &transforms);
    }

    #[test]
    fn two_meshes_stitch_into_ten_vertices() {
        let mut world = World::new();
        let mut render = RenderSystem::new(&EngineConfig::default());
        boxed(&mut world, Vec2::ZERO, RenderData::premultiplied(0));
        boxed(&mut world, Vec2::new(100.0, 0.0), RenderData::premultiplied(0));
        frame(&mut world, &mut render);

        let v = render.vertices();
        assert_eq!(v.len(), 10);
        // Degenerates repeat the first mesh's tail and the second mesh's head.
        assert_eq!(v[4], v[3]);
        assert_eq!(v[5], v[6]);
        assert_eq!(v[6].pos(), Vec2::new(110.0, 0.0));
        assert_eq!(render.batch(BlendPass::Premultiplied), PassBatch { first: 0, count: 10 });
    }

    #[test]
    fn premultiplied_list_stays_sorted_through_churn() {
        let mut world = World::new();
        let mut render = RenderSystem::new(&EngineConfig::default());
        let mut rng = Rng::new(99);
        let mut live = Vec::new();

        for _ in 0..200 {
            if live.is_empty() || rng.next_int(3) > 0 {
                let layer = rng.next_int(10) as i32 - 5;
                live.push(boxed(&mut world, Vec2::ZERO, RenderData::premultiplied(layer)));
            } else {
                let victim = live.swap_remove(rng.next_int(live.len() as u32) as usize);
                world.despawn(victim).unwrap();
            }
            render.process_events(&mut world);

            let layers: Vec<i32> = render
                .pass(BlendPass::Premultiplied)
                .iter()
                .map(|&id| world.get::<RenderData>(id).unwrap().layer)
                .collect();
            assert!(layers.windows(2).all(|w| w[0] <= w[1]), "{layers:?}");
            assert_eq!(layers.len(), live.len());
        }
    }

    #[test]
    fn equal_layers_keep_insertion_order() {
        let mut world = World::new();
        let mut render = RenderSystem::new(&EngineConfig::default());
        let a = boxed(&mut world, Vec2::ZERO, RenderData::premultiplied(1));
        let b = boxed(&mut world, Vec2::ZERO, RenderData::premultiplied(1));
        let under = boxed(&mut world, Vec2::ZERO, RenderData::premultiplied(0));
        let c = boxed(&mut world, Vec2::ZERO, RenderData::premultiplied(1));
        render.process_events(&mut world);
        assert_eq!(render.pass(BlendPass::Premultiplied), &[under, a, b, c]);

        world.remove::<RenderData>(b);
        render.process_events(&mut world);
        assert_eq!(render.pass(BlendPass::Premultiplied), &[under, a, c]);
    }

    #[test]
    fn repeated_add_notifications_list_entity_once() {
        let mut world = World::new();
        let mut render = RenderSystem::new(&EngineConfig::default());
        let a = boxed(&mut world, Vec2::ZERO, RenderData::premultiplied(0));
        let glow = boxed(&mut world, Vec2::ZERO, RenderData::additive());
        render.process_events(&mut world);

        render.insert(&world, a);
        render.insert(&world, a);
        render.insert(&world, glow);
        assert_eq!(render.pass(BlendPass::Premultiplied), &[a]);
        assert_eq!(render.pass(BlendPass::Additive), &[glow]);

        frame(&mut world, &mut render);
        assert_eq!(render.batch(BlendPass::Premultiplied), PassBatch { first: 0, count: 4 });
        assert_eq!(render.batch(BlendPass::Additive), PassBatch { first: 4, count: 4 });
    }

    #[test]
    fn other_passes_keep_insertion_order() {
        let mut world = World::new();
        let mut render = RenderSystem::new(&EngineConfig::default());
        let a = boxed(&mut world, Vec2::ZERO, RenderData::new(9, BlendPass::Additive));
        let b = boxed(&mut world, Vec2::ZERO, RenderData::new(-9, BlendPass::Additive));
        let m = boxed(&mut world, Vec2::ZERO, RenderData::multiplicative());
        render.process_events(&mut world);
        assert_eq!(render.pass(BlendPass::Additive), &[a, b]);
        assert_eq!(render.pass(BlendPass::Multiplicative), &[m]);
    }

    #[test]
    fn draw_issues_one_strip_per_pass() {
        let mut world = World::new();
        let mut render = RenderSystem::new(&EngineConfig::default());
        render.set_texture(Some(TextureId(3)));
        boxed(&mut world, Vec2::ZERO, RenderData::premultiplied(0));
        boxed(&mut world, Vec2::ZERO, RenderData::premultiplied(1));
        boxed(&mut world, Vec2::ZERO, RenderData::multiplicative());
        frame(&mut world, &mut render);

        let mut backend = RecordingBackend::new();
        render.draw(&mut backend);

        assert_eq!(
            backend.draws(),
            vec![
                (BlendPass::Premultiplied.blend_func(), 0, 10),
                (BlendPass::Multiplicative.blend_func(), 10, 4),
            ]
        );
        assert_eq!(backend.vertices.len(), 14);
        assert_eq!(backend.commands[0], DrawCommand::Clear(EngineConfig::default().theme.background.unwrap()));
        assert!(backend.commands.contains(&DrawCommand::Bind(Some(TextureId(3)))));
    }

    #[test]
    fn uploads_once_per_update() {
        let mut world = World::new();
        let mut render = RenderSystem::new(&EngineConfig::default());
        render.set_clear_color(None);
        boxed(&mut world, Vec2::ZERO, RenderData::additive());
        frame(&mut world, &mut render);

        let mut backend = RecordingBackend::new();
        render.draw(&mut backend);
        render.draw(&mut backend);
        assert_eq!(backend.upload_count(), 1);
        assert_eq!(backend.draws().len(), 2);
        assert!(!backend.commands.iter().any(|c| matches!(c, DrawCommand::Clear(_))));
    }

    #[test]
    fn empty_meshes_are_skipped() {
        let mut world = World::new();
        let mut render = RenderSystem::new(&EngineConfig::default());
        let id = boxed(&mut world, Vec2::ZERO, RenderData::premultiplied(0));
        boxed(&mut world, Vec2::ZERO, RenderData::premultiplied(0));
        world.get_mut::<RenderMesh>(id).unwrap().clear();
        frame(&mut world, &mut render);
        assert_eq!(render.vertices().len(), 4);
    }

    #[test]
    fn stale_entries_are_skipped() {
        init_logger();
        let mut world = World::new();
        let mut render = RenderSystem::new(&EngineConfig::default());
        let id = boxed(&mut world, Vec2::ZERO, RenderData::premultiplied(0));
        boxed(&mut world, Vec2::ZERO, RenderData::premultiplied(0));
        render.process_events(&mut world);

        // Bypass the event queue so the list still names the entity.
        world.render_data.remove(id);
        let transforms = TransformSystem::new();
        render.update(&world, &transforms);
        assert_eq!(render.vertices().len(), 4);
    }

    #[test]
    fn in_place_layer_change_is_detected_and_sorted() {
        init_logger();
        let mut world = World::new();
        let mut render = RenderSystem::new(&EngineConfig::default());
        let a = boxed(&mut world, Vec2::ZERO, RenderData::premultiplied(0));
        let b = boxed(&mut world, Vec2::ZERO, RenderData::premultiplied(1));
        render.process_events(&mut world);
        assert!(render.check_ordering(&world));

        world.get_mut::<RenderData>(a).unwrap().layer = 5;
        assert!(!render.check_ordering(&world));
        render.sort(&world);
        assert!(render.check_ordering(&world));
        assert_eq!(render.pass(BlendPass::Premultiplied), &[b, a]);
    }

    #[test]
    fn replacing_render_data_moves_entity_between_passes() {
        let mut world = World::new();
        let mut render = RenderSystem::new(&EngineConfig::default());
        let id = boxed(&mut world, Vec2::ZERO, RenderData::premultiplied(0));
        render.process_events(&mut world);
        world.insert(id, RenderData::additive()).unwrap();
        render.process_events(&mut world);
        assert!(render.pass(BlendPass::Premultiplied).is_empty());
        assert_eq!(render.pass(BlendPass::Additive), &[id]);
    }
}
