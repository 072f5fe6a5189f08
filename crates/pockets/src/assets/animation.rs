//! Sprite animation descriptors and the library they resolve into.
//!
//! Descriptor format, one entry per named animation:
//!
//! ```json
//! { "walk": { "fps": 12, "frames": [["walk_0", 1], ["walk_1", 2]] } }
//! ```
//!
//! Each frame is held for `hold_count / fps` seconds.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::sprite_sheet::{SpriteData, SpriteSheet};
use crate::error::{PocketsError, Result};

/// Frame rate used when a descriptor's fps is missing or not positive.
pub const DEFAULT_FPS: f32 = 12.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationDescriptor {
    #[serde(default = "default_fps")]
    pub fps: f32,
    /// `(sprite id, hold count)` pairs.
    pub frames: Vec<(String, f32)>,
}

fn default_fps() -> f32 {
    DEFAULT_FPS
}

/// Index of an animation inside an [`AnimationLibrary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationFrame {
    pub sprite: SpriteData,
    /// Seconds this frame is shown.
    pub duration: f32,
}

/// A resolved frame sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationDef {
    pub name: String,
    pub frames: Vec<AnimationFrame>,
}

impl AnimationDef {
    /// Create from explicit `(sprite, hold count)` frames.
    pub fn from_frames(name: impl Into<String>, frames: &[(SpriteData, f32)], fps: f32) -> Self {
        let fps = sanitize_fps(fps);
        Self {
            name: name.into(),
            frames: frames
                .iter()
                .map(|&(sprite, hold)| AnimationFrame {
                    sprite,
                    duration: hold / fps,
                })
                .collect(),
        }
    }

    /// Resolve sprite ids against `sheet`. Unknown ids are skipped with a warning.
    pub fn from_descriptor(name: impl Into<String>, desc: &AnimationDescriptor, sheet: &SpriteSheet) -> Self {
        let name = name.into();
        let fps = sanitize_fps(desc.fps);
        let frames = desc
            .frames
            .iter()
            .filter_map(|(id, hold)| match sheet.get(id) {
                Some(sprite) => Some(AnimationFrame {
                    sprite: *sprite,
                    duration: hold / fps,
                }),
                None => {
                    log::warn!("animation '{name}' references unknown sprite '{id}'");
                    None
                }
            })
            .collect();
        Self { name, frames }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Frame at `index`, clamped into range. None when there are no frames.
    pub fn frame(&self, index: usize) -> Option<&AnimationFrame> {
        let last = self.frames.len().checked_sub(1)?;
        self.frames.get(index.min(last))
    }

    pub fn total_duration(&self) -> f32 {
        self.frames.iter().map(|f| f.duration).sum()
    }
}

fn sanitize_fps(fps: f32) -> f32 {
    if fps.is_finite() && fps > 0.0 {
        fps
    } else {
        log::warn!("invalid animation fps {fps}, using {DEFAULT_FPS}");
        DEFAULT_FPS
    }
}

/// All animations a stage can play, addressed by id or name.
#[derive(Debug, Clone, Default)]
pub struct AnimationLibrary {
    animations: Vec<AnimationDef>,
    by_name: HashMap<String, AnimationId>,
}

impl AnimationLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace, by name) an animation.
    pub fn add(&mut self, def: AnimationDef) -> AnimationId {
        if let Some(&id) = self.by_name.get(&def.name) {
            self.animations[id.0 as usize] = def;
            return id;
        }
        let id = AnimationId(self.animations.len() as u32);
        self.by_name.insert(def.name.clone(), id);
        self.animations.push(def);
        id
    }

    /// Parse a descriptor set, returning the parse error to the caller.
    pub fn try_load_json(&mut self, json: &str, sheet: &SpriteSheet) -> Result<Vec<AnimationId>> {
        let descriptors: HashMap<String, AnimationDescriptor> = serde_json::from_str(json)?;
        let mut names: Vec<_> = descriptors.keys().cloned().collect();
        names.sort();
        Ok(names
            .into_iter()
            .map(|name| {
                let def = AnimationDef::from_descriptor(name.as_str(), &descriptors[&name], sheet);
                self.add(def)
            })
            .collect())
    }

    /// Parse a descriptor set. Malformed JSON is logged and adds nothing.
    pub fn load_json(&mut self, json: &str, sheet: &SpriteSheet) -> Vec<AnimationId> {
        self.try_load_json(json, sheet).unwrap_or_else(|err| {
            log::error!("failed to parse animation descriptors: {err}");
            Vec::new()
        })
    }

    pub fn get(&self, id: AnimationId) -> Option<&AnimationDef> {
        self.animations.get(id.0 as usize)
    }

    pub fn id(&self, name: &str) -> Result<AnimationId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| PocketsError::UnknownAnimation(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }
}
