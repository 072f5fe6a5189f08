pub mod config;
pub mod sketch;
pub mod stage;
pub mod types;
