use crate::api::config::EngineConfig;
use crate::api::stage::Stage;
use crate::core::time::FixedTimestep;
use crate::renderer::traits::RenderBackend;

/// The contract every sketch fulfills.
pub trait Sketch {
    /// Engine configuration. Called once, before setup.
    fn config(&self) -> EngineConfig {
        EngineConfig::default()
    }

    /// Spawn the initial entities.
    fn setup(&mut self, stage: &mut Stage);

    /// Per-step logic, run before the stage's own systems.
    fn update(&mut self, _stage: &mut Stage, _dt: f32) {}
}

/// Drives a [`Sketch`] from host frames.
///
/// With `EngineConfig::fixed_dt` set, each host frame runs as many fixed steps
/// as have accumulated; otherwise the host delta is forwarded as is.
pub struct SketchRunner<S: Sketch> {
    sketch: S,
    stage: Stage,
    timestep: Option<FixedTimestep>,
}

impl<S: Sketch> SketchRunner<S> {
    pub fn new(mut sketch: S) -> Self {
        let config = sketch.config();
        let timestep = config
            .fixed_dt
            .filter(|dt| *dt > 0.0)
            .map(FixedTimestep::new);
        let mut stage = Stage::new(config);
        sketch.setup(&mut stage);
        Self {
            sketch,
            stage,
            timestep,
        }
    }

    /// Run one host frame. Returns the number of update steps taken.
    pub fn frame(&mut self, frame_dt: f32) -> u32 {
        match self.timestep.as_mut() {
            Some(timestep) => {
                let steps = timestep.accumulate(frame_dt);
                let dt = timestep.step();
                for _ in 0..steps {
                    self.sketch.update(&mut self.stage, dt);
                    self.stage.update(dt);
                }
                steps
            }
            None => {
                self.sketch.update(&mut self.stage, frame_dt);
                self.stage.update(frame_dt);
                1
            }
        }
    }

    pub fn draw(&mut self, backend: &mut dyn RenderBackend) {
        self.stage.draw(backend);
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    pub fn sketch(&self) -> &S {
        &self.sketch
    }

    pub fn sketch_mut(&mut self) -> &mut S {
        &mut self.sketch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{EntityId, Rect};
    use crate::components::locus::Locus;
    use crate::components::render_data::RenderData;
    use crate::renderer::traits::RecordingBackend;
    use glam::Vec2;

    #[derive(Default)]
    struct Spinner {
        fixed: Option<f32>,
        square: Option<EntityId>,
        updates: u32,
    }

    impl Sketch for Spinner {
        fn config(&self) -> EngineConfig {
            match self.fixed {
                Some(dt) => EngineConfig::default().with_fixed_dt(dt),
                None => EngineConfig::default(),
            }
        }

        fn setup(&mut self, stage: &mut Stage) {
            let mut mesh = stage.mesh();
            mesh.set_as_box(Rect::new(-5.0, -5.0, 5.0, 5.0));
            self.square = stage
                .spawn_drawable(Vec2::new(50.0, 50.0), mesh, RenderData::premultiplied(0))
                .ok();
        }

        fn update(&mut self, stage: &mut Stage, dt: f32) {
            self.updates += 1;
            let Some(id) = self.square else { return };
            if let Some(locus) = stage.world.get_mut::<Locus>(id) {
                locus.rotation += dt;
            }
        }
    }

    #[test]
    fn variable_step_forwards_host_delta() {
        let mut runner = SketchRunner::new(Spinner::default());
        assert_eq!(runner.frame(0.25), 1);
        let id = runner.sketch().square.unwrap();
        assert_eq!(runner.stage().world.get::<Locus>(id).unwrap().rotation, 0.25);

        let mut backend = RecordingBackend::new();
        runner.draw(&mut backend);
        assert_eq!(backend.draws().len(), 1);
        assert_eq!(backend.vertices.len(), 4);
    }

    #[test]
    fn fixed_step_runs_accumulated_steps() {
        let mut runner = SketchRunner::new(Spinner {
            fixed: Some(0.25),
            ..Default::default()
        });
        assert_eq!(runner.frame(0.125), 0);
        assert_eq!(runner.frame(0.625), 3);
        assert_eq!(runner.sketch().updates, 3);
        assert_eq!(runner.stage().frame_count(), 3);
    }
}
