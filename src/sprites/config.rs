//! Sprite and spritesheet configuration model.
//!
//! A sprite is a named character or effect variant; it owns an ordered list
//! of sheets, each a grid of animation frames with one named animation per
//! row. The shipped data tables stay outside the engine; this is the schema
//! they load through.

use serde::{Deserialize, Serialize};

/// One named animation occupying a row of a sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationRow {
    /// Zero-based row within the sheet grid.
    pub row: u32,
    /// Action label, e.g. "Swalk" or "Nidle".
    pub name: String,
    /// Finite animations play once and signal completion instead of looping.
    #[serde(default)]
    pub finite: bool,
}

/// Grid layout and output frame box for one spritesheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Sheet file name, unique within its sprite.
    pub name: String,
    pub rows: u32,
    pub cols: u32,
    /// Target box for sliced frames. When absent the trimmed size is used
    /// as-is (scale 1, no letterboxing).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_height: Option<u32>,
    pub animations: Vec<AnimationRow>,
}

impl SheetConfig {
    pub fn animation_for_row(&self, row: u32) -> Option<&AnimationRow> {
        self.animations.iter().find(|anim| anim.row == row)
    }

    pub fn animation_named(&self, action: &str) -> Option<&AnimationRow> {
        self.animations.iter().find(|anim| anim.name == action)
    }
}

/// A character or effect variant with its ordered sheets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteConfig {
    pub name: String,
    pub sheets: Vec<SheetConfig>,
}

impl SpriteConfig {
    pub fn sheet(&self, name: &str) -> Option<&SheetConfig> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.sheets.iter().position(|sheet| sheet.name == name)
    }

    pub fn first_sheet(&self) -> Option<&SheetConfig> {
        self.sheets.first()
    }

    /// First sheet containing an animation with the given label, falling
    /// back to the sprite's first sheet.
    pub fn sheet_for_action(&self, action: &str) -> Option<&SheetConfig> {
        self.sheets
            .iter()
            .find(|sheet| sheet.animation_named(action).is_some())
            .or_else(|| self.first_sheet())
    }
}

/// All configured sprites, in declaration order. Sprite names must be unique.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpriteLibrary {
    pub sprites: Vec<SpriteConfig>,
}

impl SpriteLibrary {
    pub fn from_json_str(json: &str) -> crate::core::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn sprite(&self, name: &str) -> Option<&SpriteConfig> {
        self.sprites.iter().find(|sprite| sprite.name == name)
    }

    pub fn sprite_index(&self, name: &str) -> Option<usize> {
        self.sprites.iter().position(|sprite| sprite.name == name)
    }

    pub fn first(&self) -> Option<&SpriteConfig> {
        self.sprites.first()
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}
