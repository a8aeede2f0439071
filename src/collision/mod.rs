//! Overlap tests, depth classification, and segment intersection.
//!
//! Two rectangle conventions coexist: player rectangles anchor at the
//! top-left corner, placed assets anchor at their center. The overlap test
//! mixes them deliberately, matching how the world was authored.

use glam::Vec2;
use tracing::debug;

/// Rectangle anchored at its top-left corner (players).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Rectangle anchored at its center (placed assets).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CornerRect {
    /// Overlap against a center-anchored rectangle. The corner rect's own
    /// extent is compared from its anchor, the center rect's from half-sizes.
    pub fn overlaps(&self, other: &CenterRect) -> bool {
        self.x < other.x + other.width / 2.0
            && self.x + self.width > other.x - other.width / 2.0
            && self.y < other.y + other.height / 2.0
            && self.y + self.height > other.y - other.height / 2.0
    }
}

/// Which side of an asset's depth line the player stands on. `High` means
/// visually behind the asset (draw under), `Low` means in front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthPosition {
    High,
    Low,
}

/// Classify the player against an asset's depth line. The line sits
/// `depth_line` world units below the asset's center; a player whose anchor
/// is above it reads as behind the asset.
pub fn depth_position(player: &CornerRect, asset: &CenterRect, depth_line: f32) -> DepthPosition {
    if player.y < asset.y + depth_line {
        DepthPosition::High
    } else {
        DepthPosition::Low
    }
}

/// Intersection point of segments a1-a2 and b1-b2, if any.
///
/// Standard parametric form; parallel or degenerate segments report no hit.
pub fn segment_intersection(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> Option<Vec2> {
    let denom = (b2.y - b1.y) * (a2.x - a1.x) - (b2.x - b1.x) * (a2.y - a1.y);
    if denom == 0.0 {
        return None;
    }
    let ua = ((b2.x - b1.x) * (a1.y - b1.y) - (b2.y - b1.y) * (a1.x - b1.x)) / denom;
    let ub = ((a2.x - a1.x) * (a1.y - b1.y) - (a2.y - a1.y) * (a1.x - b1.x)) / denom;
    if (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub) {
        Some(Vec2::new(a1.x + ua * (a2.x - a1.x), a1.y + ua * (a2.y - a1.y)))
    } else {
        None
    }
}

/// Whether the movement segment from `from` to `to` crosses any consecutive
/// pair of the polyline.
pub fn polyline_blocks(from: Vec2, to: Vec2, points: &[Vec2]) -> bool {
    points
        .windows(2)
        .any(|pair| segment_intersection(from, to, pair[0], pair[1]).is_some())
}

/// A placed asset's collision-relevant footprint.
#[derive(Debug, Clone)]
pub struct AssetFootprint {
    /// Scene node key of the asset.
    pub key: String,
    pub file: String,
    pub rect: CenterRect,
    pub depth_line: f32,
}

/// One asset the player currently overlaps, with the player's side of its
/// depth line.
#[derive(Debug, Clone)]
pub struct DepthHit {
    pub key: String,
    pub file: String,
    pub position: DepthPosition,
    pub depth_line: f32,
}

/// Per-frame overlap sweep between the current player and placed assets.
#[derive(Debug, Default)]
pub struct CollisionEngine {
    pub debug: bool,
}

impl CollisionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test the player against every placed asset and report hits with their
    /// depth classification. Assets with zero-sized footprints (image not
    /// measured yet) are skipped.
    pub fn depth_pass(&self, player: &CornerRect, assets: &[AssetFootprint]) -> Vec<DepthHit> {
        let mut hits = Vec::new();
        for asset in assets {
            if asset.rect.width == 0.0 || asset.rect.height == 0.0 {
                continue;
            }
            if !player.overlaps(&asset.rect) {
                continue;
            }
            let position = depth_position(player, &asset.rect, asset.depth_line);
            if self.debug {
                debug!(
                    asset = %asset.key,
                    file = %asset.file,
                    ?position,
                    depth_line = asset.depth_line,
                    "depth overlap"
                );
            }
            hits.push(DepthHit {
                key: asset.key.clone(),
                file: asset.file.clone(),
                position,
                depth_line: asset.depth_line,
            });
        }
        hits
    }
}
