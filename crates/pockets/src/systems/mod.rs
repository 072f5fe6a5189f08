pub mod animation;
pub mod emitter;
pub mod particle;
pub mod render;
pub mod rng;
pub mod script;
pub mod transform;
