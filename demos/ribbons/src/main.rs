use pockets::{RecordingBackend, RenderBackend, SketchRunner};

mod sketch;
use sketch::Ribbons;

/// Host frame delta, as a display running at 60 Hz would report it.
const FRAME_DT: f32 = 1.0 / 60.0;
const FRAMES: u32 = 180;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut runner = SketchRunner::new(Ribbons::new());
    let mut backend = RecordingBackend::new();

    for frame in 0..FRAMES {
        runner.frame(FRAME_DT);
        backend.reset();
        runner.draw(&mut backend);

        if frame % 60 == 0 {
            let stage = runner.stage();
            log::info!(
                "frame {frame}: {} entities, {} vertices, {} draw calls via {}",
                stage.world.len(),
                backend.vertices.len(),
                backend.draws().len(),
                backend.backend(),
            );
            for (blend, first, count) in backend.draws() {
                log::info!("  strip {first}..{} blend {blend:?}", first + count);
            }
        }
    }
}
