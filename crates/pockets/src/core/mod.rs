pub mod time;
pub mod world;
