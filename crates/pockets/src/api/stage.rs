//! The stage owns the world and every system, and runs one frame at a time.

use glam::Vec2;

use crate::api::config::EngineConfig;
use crate::api::types::EntityId;
use crate::assets::animation::AnimationLibrary;
use crate::assets::sprite_sheet::SpriteSheet;
use crate::components::animation::SpriteAnimation;
use crate::components::locus::Locus;
use crate::components::mesh::RenderMesh;
use crate::components::render_data::RenderData;
use crate::core::world::World;
use crate::error::Result;
use crate::renderer::traits::RenderBackend;
use crate::systems::animation::SpriteAnimationSystem;
use crate::systems::emitter::EmitterSystem;
use crate::systems::particle::tick_particles;
use crate::systems::render::RenderSystem;
use crate::systems::script::run_scripts;
use crate::systems::transform::TransformSystem;

pub struct Stage {
    config: EngineConfig,
    pub world: World,
    transforms: TransformSystem,
    render: RenderSystem,
    animations: SpriteAnimationSystem,
    emitters: EmitterSystem,
    frame: u64,
    elapsed: f64,
}

impl Stage {
    pub fn new(config: EngineConfig) -> Self {
        log::debug!("stage created: {config:?}");
        Self {
            world: World::with_config(&config),
            transforms: TransformSystem::new(),
            render: RenderSystem::new(&config),
            animations: SpriteAnimationSystem::default(),
            emitters: EmitterSystem::new(config.rng_seed),
            frame: 0,
            elapsed: 0.0,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn transforms(&self) -> &TransformSystem {
        &self.transforms
    }

    pub fn render(&self) -> &RenderSystem {
        &self.render
    }

    pub fn render_mut(&mut self) -> &mut RenderSystem {
        &mut self.render
    }

    pub fn animations(&self) -> &AnimationLibrary {
        self.animations.library()
    }

    pub fn animations_mut(&mut self) -> &mut AnimationLibrary {
        self.animations.library_mut()
    }

    /// Use `sheet`'s texture for every pass and load `animations_json` against it.
    pub fn load_sprite_sheet(&mut self, sheet: &SpriteSheet, animations_json: Option<&str>) {
        self.render.set_texture(sheet.texture);
        if let Some(json) = animations_json {
            let ids = self.animations.library_mut().load_json(json, sheet);
            log::debug!("loaded {} animations", ids.len());
        }
    }

    /// Frames run so far.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Seconds of simulated time.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    // -- Entities --

    pub fn spawn(&mut self) -> EntityId {
        self.world.spawn()
    }

    /// Spawn an entity with a locus at `position`.
    pub fn spawn_at(&mut self, position: Vec2) -> Result<EntityId> {
        let id = self.world.spawn();
        self.world.insert(id, Locus::new().with_position(position))?;
        Ok(id)
    }

    /// Spawn an entity at `position` that draws `mesh`.
    pub fn spawn_drawable(&mut self, position: Vec2, mesh: RenderMesh, data: RenderData) -> Result<EntityId> {
        let id = self.spawn_at(position)?;
        self.world.insert(id, mesh)?;
        self.world.insert(id, data)?;
        Ok(id)
    }

    pub fn despawn(&mut self, id: EntityId) -> Result<()> {
        self.world.despawn(id)
    }

    /// Empty mesh in the theme's foreground color.
    pub fn mesh(&self) -> RenderMesh {
        RenderMesh::with_color(self.config.theme.foreground)
    }

    /// Draw `id`'s mesh with `data`. Needs a mesh and a locus.
    pub fn assign_render_data(&mut self, id: EntityId, data: RenderData) -> Result<()> {
        self.world.insert(id, data)?;
        Ok(())
    }

    /// Move `id` to `layer`, keeping the draw list sorted.
    pub fn set_render_layer(&mut self, id: EntityId, layer: i32) -> Result<()> {
        let mut data = *self.world.component::<RenderData>(id)?;
        data.layer = layer;
        self.world.insert(id, data)?;
        Ok(())
    }

    /// Start the named animation on `id`, whose mesh becomes the animation's sprite.
    pub fn assign_sprite_animation(&mut self, id: EntityId, name: &str) -> Result<()> {
        let animation = self.animations.library().id(name)?;
        self.world.component::<RenderMesh>(id)?;
        self.world.insert(id, SpriteAnimation::new(animation))?;
        Ok(())
    }

    // -- Frame --

    /// Advance everything by `dt` seconds and rebuild the vertex buffer.
    pub fn update(&mut self, dt: f32) {
        run_scripts(&mut self.world, dt);
        self.animations.update(&mut self.world, dt);
        tick_particles(&mut self.world, dt);
        self.emitters.update(&mut self.world, dt);

        self.transforms.propagate(&self.world);
        self.render.process_events(&mut self.world);
        self.render.update(&self.world, &self.transforms);

        self.frame += 1;
        self.elapsed += dt as f64;
    }

    /// Submit the last update's geometry to `backend`.
    pub fn draw(&mut self, backend: &mut dyn RenderBackend) {
        self.render.draw(backend);
    }
}
