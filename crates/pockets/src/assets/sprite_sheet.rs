use std::collections::HashMap;

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::api::types::{Rect, TextureId};
use crate::error::Result;

/// Where a sprite lives in its atlas and how it is pivoted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteData {
    /// Region of the atlas in normalized (0..1) texture coordinates.
    pub texture_bounds: Rect,
    /// Size of the sprite in pixels.
    pub size: IVec2,
    /// Pivot in pixels, measured from the sprite's upper-left corner.
    pub registration_point: Vec2,
}

/// Sprite sheet descriptor as produced by the packing tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpriteSheetDescriptor {
    /// Named sprite lookup: id → atlas region.
    #[serde(default)]
    pub sprites: HashMap<String, SpriteDescriptor>,
}

/// Describes one named sprite within the atlas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteDescriptor {
    /// `[x1, y1, x2, y2]`, normalized.
    pub texture_bounds: [f32; 4],
    /// `[width, height]` in pixels.
    pub size: [i32; 2],
    /// `[x, y]` in pixels (default: upper-left corner).
    #[serde(default)]
    pub registration_point: [f32; 2],
}

impl From<&SpriteDescriptor> for SpriteData {
    fn from(desc: &SpriteDescriptor) -> Self {
        let [x1, y1, x2, y2] = desc.texture_bounds;
        Self {
            texture_bounds: Rect::new(x1, y1, x2, y2),
            size: IVec2::from_array(desc.size),
            registration_point: Vec2::from_array(desc.registration_point),
        }
    }
}

/// Named sprites of one texture atlas.
#[derive(Debug, Clone, Default)]
pub struct SpriteSheet {
    /// Texture the host uploaded for this atlas, if any.
    pub texture: Option<TextureId>,
    sprites: HashMap<String, SpriteData>,
}

impl SpriteSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_descriptor(desc: &SpriteSheetDescriptor) -> Self {
        let sprites = desc
            .sprites
            .iter()
            .map(|(name, sprite)| (name.clone(), SpriteData::from(sprite)))
            .collect();
        Self { texture: None, sprites }
    }

    /// Parse a descriptor, returning the parse error to the caller.
    pub fn try_from_json(json: &str) -> Result<Self> {
        let desc: SpriteSheetDescriptor = serde_json::from_str(json)?;
        Ok(Self::from_descriptor(&desc))
    }

    /// Parse a descriptor. A malformed descriptor is logged and yields an empty sheet.
    pub fn from_json(json: &str) -> Self {
        match Self::try_from_json(json) {
            Ok(sheet) => {
                log::debug!("loaded sprite sheet with {} sprites", sheet.len());
                sheet
            }
            Err(err) => {
                log::error!("failed to parse sprite sheet: {err}");
                Self::new()
            }
        }
    }

    pub fn with_texture(mut self, texture: TextureId) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, sprite: SpriteData) {
        self.sprites.insert(name.into(), sprite);
    }

    /// Look up a sprite by id. Returns None if not found.
    pub fn get(&self, name: &str) -> Option<&SpriteData> {
        self.sprites.get(name)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}
