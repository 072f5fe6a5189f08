pub mod animation;
pub mod sprite_sheet;
