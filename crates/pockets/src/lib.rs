pub mod api;
pub mod assets;
pub mod components;
pub mod core;
pub mod error;
pub mod renderer;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::config::{EngineConfig, Theme};
pub use api::sketch::{Sketch, SketchRunner};
pub use api::stage::Stage;
pub use api::types::{ColorA8, EntityId, Rect, TextureId};
pub use assets::animation::{AnimationDef, AnimationDescriptor, AnimationId, AnimationLibrary};
pub use assets::sprite_sheet::{SpriteData, SpriteSheet, SpriteSheetDescriptor};
pub use components::animation::SpriteAnimation;
pub use components::emitter::{EmissionMode, ParticleEmitter};
pub use components::locus::Locus;
pub use components::mesh::RenderMesh;
pub use components::particle::Particle;
pub use components::render_data::{BlendPass, RenderData};
pub use components::script::Script;
pub use crate::core::time::FixedTimestep;
pub use crate::core::world::{Component, World, WorldEvent};
pub use error::{PocketsError, Result};
pub use renderer::{BlendFactor, BlendFunc, RecordingBackend, RenderBackend, Vertex};
pub use systems::render::RenderSystem;
pub use systems::transform::TransformSystem;
