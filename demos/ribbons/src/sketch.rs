//! Ribbons: a few waving ribbons over a stack of layered boxes, with an
//! additive spark emitter orbiting the center on a parented arm.

use std::f32::consts::TAU;

use glam::Vec2;
use pockets::*;

// ── Layout ───────────────────────────────────────────────────────────

const CENTER: Vec2 = Vec2::new(400.0, 300.0);
const RIBBON_COUNT: usize = 3;
const RIBBON_POINTS: usize = 24;
const RIBBON_LENGTH: f32 = 480.0;
const RIBBON_WIDTH: f32 = 6.0;
const WAVE_AMPLITUDE: f32 = 40.0;

const ARM_LENGTH: f32 = 160.0;
const ARM_SPEED: f32 = 0.8; // radians per second

// ── Colors ───────────────────────────────────────────────────────────

const RIBBON_COLORS: [ColorA8; RIBBON_COUNT] = [
    ColorA8::rgb(90, 200, 250),
    ColorA8::rgb(250, 120, 160),
    ColorA8::rgb(180, 240, 120),
];
const SHADOW: ColorA8 = ColorA8::new(60, 40, 80, 255);

#[derive(Default)]
pub struct Ribbons {
    arm: Option<EntityId>,
    time: f32,
}

impl Ribbons {
    pub fn new() -> Self {
        Self { arm: None, time: 0.0 }
    }
}

/// Points of a sine wave centered on the origin.
fn wave(phase: f32) -> Vec<Vec2> {
    (0..RIBBON_POINTS)
        .map(|i| {
            let t = i as f32 / (RIBBON_POINTS - 1) as f32;
            let x = (t - 0.5) * RIBBON_LENGTH;
            Vec2::new(x, (t * TAU * 2.0 + phase).sin() * WAVE_AMPLITUDE)
        })
        .collect()
}

fn spawn_ribbon(stage: &mut Stage, index: usize) -> Result<EntityId> {
    let mut mesh = RenderMesh::with_color(RIBBON_COLORS[index]);
    mesh.set_as_ribbon(&wave(0.0), RIBBON_WIDTH, false)?;
    let offset = Vec2::new(0.0, (index as f32 - 1.0) * 90.0);
    let id = stage.spawn_drawable(CENTER + offset, mesh, RenderData::premultiplied(index as i32 + 1))?;

    let phase = index as f32 * 1.3;
    let mut time = 0.0;
    stage.world.insert(
        id,
        Script::new(move |world, me, dt| {
            time += dt;
            if let Some(mesh) = world.get_mut::<RenderMesh>(me) {
                if let Err(err) = mesh.set_as_ribbon(&wave(time * 2.0 + phase), RIBBON_WIDTH, false) {
                    log::warn!("ribbon rebuild failed: {err}");
                }
            }
        }),
    )?;
    Ok(id)
}

fn spawn_backdrop(stage: &mut Stage) -> Result<()> {
    // Drawn under everything; shadow in the multiplicative pass.
    let mut panel = stage.mesh();
    panel.set_as_box(Rect::new(-300.0, -200.0, 300.0, 200.0));
    stage.spawn_drawable(CENTER, panel, RenderData::premultiplied(0))?;

    let mut shade = RenderMesh::with_color(SHADOW);
    shade.set_as_circle(Vec2::splat(220.0), 0.0, TAU, 0);
    stage.spawn_drawable(CENTER, shade, RenderData::multiplicative())?;

    let mut frame = stage.mesh();
    frame.set_as_capped_line(Vec2::new(-300.0, 210.0), Vec2::new(300.0, 210.0), 4.0)?;
    stage.spawn_drawable(CENTER, frame, RenderData::premultiplied(10))?;
    Ok(())
}

fn spawn_orbiter(stage: &mut Stage) -> Result<EntityId> {
    let arm = stage.spawn_at(CENTER)?;
    let accent = stage.config().theme.accent;

    let mut bob = RenderMesh::with_color(accent);
    bob.set_as_circle(Vec2::splat(8.0), 0.0, TAU, 12);
    let tip = stage.spawn_drawable(Vec2::new(ARM_LENGTH, 0.0), bob, RenderData::premultiplied(5))?;
    stage.world.set_parent(tip, arm)?;

    let sparks = ParticleEmitter::new()
        .with_rate(30.0)
        .with_speed_range(0.5, 2.5)
        .with_lifetime(Some(0.8))
        .with_friction(0.95)
        .with_builder(move |world, id| {
            let mut mesh = RenderMesh::with_color(accent.premultiplied());
            mesh.set_as_triangle(Vec2::new(0.0, -3.0), Vec2::new(3.0, 2.0), Vec2::new(-3.0, 2.0));
            let built = world
                .insert(id, mesh)
                .and_then(|_| world.insert(id, RenderData::additive()));
            if let Err(err) = built {
                log::warn!("spark setup failed: {err}");
            }
        });
    stage.world.insert(tip, sparks)?;
    Ok(arm)
}

impl Sketch for Ribbons {
    fn config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_fixed_dt(1.0 / 60.0)
            .with_rng_seed(7)
    }

    fn setup(&mut self, stage: &mut Stage) {
        let built = spawn_backdrop(stage).and_then(|_| {
            for i in 0..RIBBON_COUNT {
                spawn_ribbon(stage, i)?;
            }
            spawn_orbiter(stage)
        });
        match built {
            Ok(arm) => self.arm = Some(arm),
            Err(err) => log::error!("setup failed: {err}"),
        }
        log::info!("setup done: {} entities", stage.world.len());
    }

    fn update(&mut self, stage: &mut Stage, dt: f32) {
        self.time += dt;
        let Some(arm) = self.arm else { return };
        if let Some(locus) = stage.world.get_mut::<Locus>(arm) {
            locus.set_rotation(self.time * ARM_SPEED);
        }
    }
}
