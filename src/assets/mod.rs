//! Decoded-image slots and the asset library.
//!
//! Image decode is the engine's only asynchronous boundary. A slot is either
//! `Pending` (decode not finished) or `Ready`; every consumer treats
//! `Pending` as a valid, non-error state and simply retries next frame once
//! the host has pushed the decoded pixels in.

use std::path::Path;
use std::sync::Arc;

use ahash::AHashMap;
use image::RgbaImage;

use crate::core::error::Result;

/// Decode state for one source image.
#[derive(Debug, Clone, Default)]
pub enum ImageSlot {
    /// Decode has not completed; there are no pixels to read yet.
    #[default]
    Pending,
    /// Fully decoded RGBA pixels.
    Ready(Arc<RgbaImage>),
}

impl ImageSlot {
    pub fn is_ready(&self) -> bool {
        matches!(self, ImageSlot::Ready(_))
    }

    pub fn ready(&self) -> Option<&Arc<RgbaImage>> {
        match self {
            ImageSlot::Ready(image) => Some(image),
            ImageSlot::Pending => None,
        }
    }
}

/// Identity of one spritesheet: the sprite it belongs to plus the sheet name
/// within that sprite. Cache keys derive from this so distinct sheets never
/// collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SheetKey {
    pub sprite: String,
    pub sheet: String,
}

impl SheetKey {
    pub fn new(sprite: impl Into<String>, sheet: impl Into<String>) -> Self {
        Self {
            sprite: sprite.into(),
            sheet: sheet.into(),
        }
    }
}

/// Process-wide store of decoded images: spritesheets keyed by sprite/sheet,
/// plus standalone images (background map, static asset files) keyed by file
/// name.
#[derive(Debug, Default)]
pub struct AssetLibrary {
    sheets: AHashMap<SheetKey, ImageSlot>,
    images: AHashMap<String, ImageSlot>,
}

impl AssetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current slot for a spritesheet. Unknown sheets read as `Pending`.
    pub fn sheet(&self, key: &SheetKey) -> ImageSlot {
        self.sheets.get(key).cloned().unwrap_or_default()
    }

    /// Publish a decoded spritesheet (the host's load callback).
    pub fn insert_sheet(&mut self, key: SheetKey, image: RgbaImage) {
        self.sheets.insert(key, ImageSlot::Ready(Arc::new(image)));
    }

    /// Decode a spritesheet from disk and publish it.
    pub fn load_sheet_from_path(&mut self, key: SheetKey, path: &Path) -> Result<()> {
        let image = image::open(path)?.to_rgba8();
        self.insert_sheet(key, image);
        Ok(())
    }

    /// Current slot for a standalone image file.
    pub fn image(&self, file: &str) -> ImageSlot {
        self.images.get(file).cloned().unwrap_or_default()
    }

    /// Publish a decoded standalone image.
    pub fn insert_image(&mut self, file: impl Into<String>, image: RgbaImage) {
        self.images.insert(file.into(), ImageSlot::Ready(Arc::new(image)));
    }

    /// Decode a standalone image from disk and publish it.
    pub fn load_image_from_path(&mut self, file: impl Into<String>, path: &Path) -> Result<()> {
        let image = image::open(path)?.to_rgba8();
        self.insert_image(file, image);
        Ok(())
    }

    /// Pixel dimensions of a decoded image, if ready.
    pub fn image_size(&self, file: &str) -> Option<(u32, u32)> {
        self.image(file)
            .ready()
            .map(|image| (image.width(), image.height()))
    }
}
