use crate::api::types::ColorA8;

/// Colors a sketch draws with by default.
/// Passed in through [`EngineConfig`] instead of being baked into free functions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    /// Clear color used at the start of each draw. `None` skips clearing.
    pub background: Option<ColorA8>,
    /// Vertex color for meshes created through the stage.
    pub foreground: ColorA8,
    /// Secondary color for highlights.
    pub accent: ColorA8,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Some(ColorA8::rgb(20, 20, 24)),
            foreground: ColorA8::WHITE,
            accent: ColorA8::rgb(255, 160, 40),
        }
    }
}

/// Configuration for a [`Stage`](crate::Stage), provided by the sketch.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fixed update step in seconds. `None` forwards the host's frame delta.
    pub fixed_dt: Option<f32>,
    /// When a locus leaves its parent, fold the parent's transform into the
    /// locus so it stays where it was on screen (default: true).
    pub preserve_world_on_detach: bool,
    /// Initial capacity of the entity store (default: 256).
    pub entity_capacity: usize,
    /// Initial capacity of the shared vertex buffer (default: 4096).
    pub vertex_capacity: usize,
    /// Seed for emitter randomness (default: 42).
    pub rng_seed: u64,
    pub theme: Theme,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fixed_dt: None,
            preserve_world_on_detach: true,
            entity_capacity: 256,
            vertex_capacity: 4096,
            rng_seed: 42,
            theme: Theme::default(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Builder pattern --

    pub fn with_fixed_dt(mut self, dt: f32) -> Self {
        self.fixed_dt = Some(dt);
        self
    }

    pub fn with_preserve_world_on_detach(mut self, preserve: bool) -> Self {
        self.preserve_world_on_detach = preserve;
        self
    }

    pub fn with_entity_capacity(mut self, capacity: usize) -> Self {
        self.entity_capacity = capacity;
        self
    }

    pub fn with_vertex_capacity(mut self, capacity: usize) -> Self {
        self.vertex_capacity = capacity;
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }
}
