pub mod traits;
pub mod vertex;

pub use traits::{BlendFactor, BlendFunc, DrawCommand, RecordingBackend, RenderBackend};
pub use vertex::Vertex;
