pub mod animation;
pub mod emitter;
pub mod locus;
pub mod mesh;
pub mod particle;
pub mod render_data;
pub mod script;
