//! Frame slicing and the append-only frame cache.
//!
//! Extracting one animation frame is expensive: the cell is trimmed of
//! fully-transparent border pixels, integer-scaled to fit the target box,
//! and centered within it with nearest-neighbor sampling. Trim bounds are
//! the union over every column in the row, so walk-cycle frames never
//! jitter from per-frame trim variance. Results are cached by
//! (sheet identity, row, col) for the session lifetime.

use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use image::RgbaImage;
use tracing::debug;

use crate::assets::{ImageSlot, SheetKey};
use crate::sprites::config::SheetConfig;

/// Inclusive pixel bounds of the drawable content within a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimBounds {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl TrimBounds {
    pub fn width(&self) -> u32 {
        self.right - self.left + 1
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top + 1
    }
}

/// Union of non-transparent bounding boxes across every column of `row`,
/// padded by 1px and clamped to the cell. A row with no opaque pixels trims
/// to the full cell.
pub fn row_bounds(sheet: &RgbaImage, row: u32, rows: u32, cols: u32) -> TrimBounds {
    let frame_width = sheet.width() / cols;
    let frame_height = sheet.height() / rows;

    let mut top = frame_height;
    let mut bottom = 0u32;
    let mut left = frame_width;
    let mut right = 0u32;
    let mut any_opaque = false;

    for col in 0..cols {
        let origin_x = col * frame_width;
        let origin_y = row * frame_height;
        for y in 0..frame_height {
            for x in 0..frame_width {
                let alpha = sheet.get_pixel(origin_x + x, origin_y + y)[3];
                if alpha > 0 {
                    any_opaque = true;
                    top = top.min(y);
                    bottom = bottom.max(y);
                    left = left.min(x);
                    right = right.max(x);
                }
            }
        }
    }

    if !any_opaque {
        return TrimBounds {
            top: 0,
            bottom: frame_height - 1,
            left: 0,
            right: frame_width - 1,
        };
    }

    let padding = 1;
    TrimBounds {
        top: top.saturating_sub(padding),
        bottom: (bottom + padding).min(frame_height - 1),
        left: left.saturating_sub(padding),
        right: (right + padding).min(frame_width - 1),
    }
}

/// Slice one cell out of the sheet using precomputed row bounds, then
/// integer-scale and center it in the target box with nearest-neighbor
/// sampling (no smoothing).
fn slice_cell(sheet: &RgbaImage, row: u32, col: u32, config: &SheetConfig, bounds: TrimBounds) -> RgbaImage {
    let frame_width = sheet.width() / config.cols;
    let frame_height = sheet.height() / config.rows;

    let trimmed_width = bounds.width();
    let trimmed_height = bounds.height();
    let src_x = col * frame_width + bounds.left;
    let src_y = row * frame_height + bounds.top;

    let target_width = config.max_width.unwrap_or(trimmed_width);
    let target_height = config.max_height.unwrap_or(trimmed_height);

    // Uniform integer scale preserving aspect ratio, minimum 1.
    let scale = (target_width / trimmed_width)
        .min(target_height / trimmed_height)
        .max(1);
    let scaled_width = trimmed_width * scale;
    let scaled_height = trimmed_height * scale;

    let offset_x = (target_width.saturating_sub(scaled_width)) / 2;
    let offset_y = (target_height.saturating_sub(scaled_height)) / 2;

    let mut output = RgbaImage::new(target_width, target_height);
    for y in 0..scaled_height {
        if offset_y + y >= target_height {
            break;
        }
        for x in 0..scaled_width {
            if offset_x + x >= target_width {
                break;
            }
            let pixel = *sheet.get_pixel(src_x + x / scale, src_y + y / scale);
            output.put_pixel(offset_x + x, offset_y + y, pixel);
        }
    }
    output
}

/// Append-only cache of sliced frames plus per-sheet bulk-cache flags.
///
/// Row trim bounds are memoized per (sheet, row) so every column in a row
/// shares the exact same crop rectangle.
#[derive(Debug, Default)]
pub struct FrameCache {
    frames: AHashMap<(SheetKey, u32, u32), Arc<RgbaImage>>,
    bounds: AHashMap<(SheetKey, u32), TrimBounds>,
    cached_sheets: AHashSet<SheetKey>,
}

impl FrameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the sliced frame for (row, col), computing and caching it on
    /// first use. Returns `None` while the sheet image is still decoding;
    /// callers skip the frame and retry next paint.
    pub fn frame(
        &mut self,
        key: &SheetKey,
        slot: &ImageSlot,
        row: u32,
        col: u32,
        config: &SheetConfig,
    ) -> Option<Arc<RgbaImage>> {
        let cache_key = (key.clone(), row, col);
        if let Some(frame) = self.frames.get(&cache_key) {
            return Some(frame.clone());
        }

        let sheet = slot.ready()?;

        // A grid the image cannot hold would slice zero-sized cells.
        if config.cols == 0
            || config.rows == 0
            || sheet.width() < config.cols
            || sheet.height() < config.rows
        {
            return None;
        }

        let bounds = *self
            .bounds
            .entry((key.clone(), row))
            .or_insert_with(|| row_bounds(sheet, row, config.rows, config.cols));

        let frame = Arc::new(slice_cell(sheet, row, col, config, bounds));
        self.frames.insert(cache_key, frame.clone());
        Some(frame)
    }

    /// Whether the bulk pre-cache pass has completed for this sheet.
    pub fn is_sheet_cached(&self, key: &SheetKey) -> bool {
        self.cached_sheets.contains(key)
    }

    /// Walk every (row, col) of the sheet once, populating the cache.
    /// Idempotent: a second call is a flag check. Returns false (deferring
    /// to a later call) while the sheet image is still decoding.
    pub fn cache_sheet(&mut self, key: &SheetKey, slot: &ImageSlot, config: &SheetConfig) -> bool {
        if self.is_sheet_cached(key) {
            return true;
        }
        if !slot.is_ready() {
            return false;
        }

        debug!(sprite = %key.sprite, sheet = %key.sheet, "bulk-caching sheet frames");
        for row in 0..config.rows {
            for col in 0..config.cols {
                self.frame(key, slot, row, col, config);
            }
        }
        self.cached_sheets.insert(key.clone());
        true
    }

    /// Number of cached frames (test observability).
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
