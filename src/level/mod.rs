//! Level documents: barrier polylines, top-Z polylines, and placed assets.
//!
//! A level file carries two path groups (movement barriers and draw-over
//! lines) plus the placed static and animated assets. The runtime keeps the
//! loaded lines separate from editor-drawn lines so an export can merge both
//! without mutating the shipped data.

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::Result;

/// World distance within which a right-click removes the nearest point or
/// placed asset.
pub const MAX_REMOVE_DISTANCE: f32 = 50.0;

// --- On-disk document shape ---

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PointDef {
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PointListDef {
    points: Vec<PointDef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PathsSection {
    #[serde(rename = "barrierLine", default)]
    barrier_line: Vec<PointListDef>,
    #[serde(rename = "topZ", default)]
    top_z: Vec<PointListDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AssetDef {
    file: String,
    x: f32,
    y: f32,
    #[serde(rename = "depthLine", default, skip_serializing_if = "Option::is_none")]
    depth_line: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    layer: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct AssetsSection {
    #[serde(rename = "static", default)]
    static_assets: Vec<AssetDef>,
    #[serde(default)]
    animations: Vec<AssetDef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LevelFile {
    #[serde(default)]
    paths: PathsSection,
    #[serde(default)]
    assets: AssetsSection,
}

// --- Runtime model ---

/// One vertex of a polyline. Indices are 1-based display labels and are
/// renumbered after removals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarrierPoint {
    pub raw: Vec2,
    pub index: u32,
}

/// An ordered polyline of barrier or top-Z points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarrierLine {
    pub points: Vec<BarrierPoint>,
}

impl BarrierLine {
    pub fn push_point(&mut self, x: f32, y: f32) {
        let index = self.points.len() as u32 + 1;
        self.points.push(BarrierPoint { raw: Vec2::new(x, y), index });
    }

    /// Remove the point at `index` (0-based position) and renumber labels.
    pub fn remove_point(&mut self, index: usize) {
        if index >= self.points.len() {
            return;
        }
        self.points.remove(index);
        for (i, point) in self.points.iter_mut().enumerate() {
            point.index = i as u32 + 1;
        }
    }

    /// Append a copy of the first point, closing the shape. Lines with
    /// fewer than three points are left open.
    pub fn close_polygon(&mut self) {
        if self.points.len() >= 3 {
            let first = self.points[0].raw;
            let index = self.points.len() as u32 + 1;
            self.points.push(BarrierPoint { raw: first, index });
        }
    }

    /// Consecutive point pairs as segments.
    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.points.windows(2).map(|pair| (pair[0].raw, pair[1].raw))
    }
}

/// Whether a placed asset draws once or animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Static,
    Animated,
}

/// One asset placed in the level, anchored at its center.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedAsset {
    pub file: String,
    pub x: f32,
    pub y: f32,
    pub depth_line: f32,
    pub layer: f32,
    pub kind: AssetKind,
}

/// Which path group the editor is currently drawing into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    Barrier,
    TopZ,
}

/// Loaded level content plus editor-drawn additions.
#[derive(Debug, Clone, Default)]
pub struct LevelData {
    pub barrier_lines: Vec<BarrierLine>,
    pub top_z_lines: Vec<BarrierLine>,
    pub static_assets: Vec<PlacedAsset>,
    pub animated_assets: Vec<PlacedAsset>,

    pub editor_barrier_lines: Vec<BarrierLine>,
    pub editor_top_z_lines: Vec<BarrierLine>,
    draw_mode: Option<DrawMode>,
}

impl LevelData {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: LevelFile = serde_json::from_str(json)?;
        Ok(Self::from_file_model(file))
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let level = Self::from_json_str(&text)?;
        debug!(
            path = %path.display(),
            barriers = level.barrier_lines.len(),
            top_z = level.top_z_lines.len(),
            assets = level.static_assets.len() + level.animated_assets.len(),
            "level loaded"
        );
        Ok(level)
    }

    /// Serialize loaded and editor content merged, as an export would.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_file_model())?)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    fn from_file_model(file: LevelFile) -> Self {
        let lines = |defs: Vec<PointListDef>| {
            defs.into_iter()
                .map(|list| {
                    let mut line = BarrierLine::default();
                    for point in list.points {
                        line.push_point(point.x, point.y);
                    }
                    line
                })
                .collect()
        };
        let assets = |defs: Vec<AssetDef>, kind: AssetKind| {
            defs.into_iter()
                .map(|def| PlacedAsset {
                    file: def.file,
                    x: def.x,
                    y: def.y,
                    depth_line: def.depth_line.unwrap_or(0.0),
                    layer: def.layer.unwrap_or(2.0),
                    kind,
                })
                .collect()
        };
        Self {
            barrier_lines: lines(file.paths.barrier_line),
            top_z_lines: lines(file.paths.top_z),
            static_assets: assets(file.assets.static_assets, AssetKind::Static),
            animated_assets: assets(file.assets.animations, AssetKind::Animated),
            editor_barrier_lines: Vec::new(),
            editor_top_z_lines: Vec::new(),
            draw_mode: None,
        }
    }

    fn to_file_model(&self) -> LevelFile {
        let lists = |loaded: &[BarrierLine], editor: &[BarrierLine]| {
            loaded
                .iter()
                .chain(editor.iter())
                .map(|line| PointListDef {
                    points: line
                        .points
                        .iter()
                        .map(|point| PointDef { x: point.raw.x, y: point.raw.y })
                        .collect(),
                })
                .collect()
        };
        let defs = |assets: &[PlacedAsset]| {
            assets
                .iter()
                .map(|asset| AssetDef {
                    file: asset.file.clone(),
                    x: asset.x,
                    y: asset.y,
                    depth_line: Some(asset.depth_line),
                    layer: Some(asset.layer),
                })
                .collect()
        };
        LevelFile {
            paths: PathsSection {
                barrier_line: lists(&self.barrier_lines, &self.editor_barrier_lines),
                top_z: lists(&self.top_z_lines, &self.editor_top_z_lines),
            },
            assets: AssetsSection {
                static_assets: defs(&self.static_assets),
                animations: defs(&self.animated_assets),
            },
        }
    }

    /// Every barrier line movement must respect: loaded plus editor-drawn.
    pub fn all_barrier_lines(&self) -> impl Iterator<Item = &BarrierLine> {
        self.barrier_lines.iter().chain(self.editor_barrier_lines.iter())
    }

    pub fn all_placed_assets(&self) -> impl Iterator<Item = &PlacedAsset> {
        self.static_assets.iter().chain(self.animated_assets.iter())
    }

    // --- Editing ---

    pub fn draw_mode(&self) -> Option<DrawMode> {
        self.draw_mode
    }

    /// Enter drawing mode. The next dot starts a fresh line.
    pub fn start_drawing(&mut self, mode: DrawMode) {
        self.draw_mode = Some(mode);
        match mode {
            DrawMode::Barrier => self.editor_barrier_lines.push(BarrierLine::default()),
            DrawMode::TopZ => self.editor_top_z_lines.push(BarrierLine::default()),
        }
    }

    /// Leave drawing mode, optionally closing the line into a polygon.
    pub fn stop_drawing(&mut self, close_polygon: bool) {
        if close_polygon {
            if let Some(line) = self.current_line_mut() {
                line.close_polygon();
            }
        }
        // Drop an empty line left by starting and immediately stopping.
        if let Some(mode) = self.draw_mode {
            let lines = match mode {
                DrawMode::Barrier => &mut self.editor_barrier_lines,
                DrawMode::TopZ => &mut self.editor_top_z_lines,
            };
            if lines.last().map(|line| line.points.is_empty()).unwrap_or(false) {
                lines.pop();
            }
        }
        self.draw_mode = None;
    }

    fn current_line_mut(&mut self) -> Option<&mut BarrierLine> {
        match self.draw_mode? {
            DrawMode::Barrier => self.editor_barrier_lines.last_mut(),
            DrawMode::TopZ => self.editor_top_z_lines.last_mut(),
        }
    }

    /// Add a point to the line being drawn. No-op outside drawing mode.
    pub fn add_dot(&mut self, x: f32, y: f32) {
        if let Some(line) = self.current_line_mut() {
            line.push_point(x, y);
        }
    }

    /// Remove the editor-drawn point nearest to the click, if within
    /// `MAX_REMOVE_DISTANCE`. Only the active mode's lines are scanned.
    pub fn remove_dot_near(&mut self, x: f32, y: f32) -> bool {
        let Some(mode) = self.draw_mode else {
            return false;
        };
        let lines = match mode {
            DrawMode::Barrier => &mut self.editor_barrier_lines,
            DrawMode::TopZ => &mut self.editor_top_z_lines,
        };
        let target = Vec2::new(x, y);

        let mut closest: Option<(usize, usize, f32)> = None;
        for (line_index, line) in lines.iter().enumerate() {
            for (point_index, point) in line.points.iter().enumerate() {
                let distance = point.raw.distance(target);
                if closest.map(|(_, _, best)| distance < best).unwrap_or(true) {
                    closest = Some((line_index, point_index, distance));
                }
            }
        }

        match closest {
            Some((line_index, point_index, distance)) if distance <= MAX_REMOVE_DISTANCE => {
                lines[line_index].remove_point(point_index);
                true
            }
            _ => false,
        }
    }

    /// Place an asset at a world position, anchored at its center.
    pub fn place_asset(&mut self, kind: AssetKind, file: impl Into<String>, x: f32, y: f32) {
        let asset = PlacedAsset {
            file: file.into(),
            x,
            y,
            depth_line: 0.0,
            layer: 2.0,
            kind,
        };
        match kind {
            AssetKind::Static => self.static_assets.push(asset),
            AssetKind::Animated => self.animated_assets.push(asset),
        }
    }

    /// Remove the placed asset nearest to the click, if within
    /// `MAX_REMOVE_DISTANCE`. Static and animated assets are scanned
    /// together.
    pub fn remove_asset_near(&mut self, x: f32, y: f32) -> bool {
        let target = Vec2::new(x, y);
        let static_count = self.static_assets.len();

        let mut closest: Option<(usize, f32)> = None;
        for (index, asset) in self.all_placed_assets().enumerate() {
            let distance = Vec2::new(asset.x, asset.y).distance(target);
            if closest.map(|(_, best)| distance < best).unwrap_or(true) {
                closest = Some((index, distance));
            }
        }

        match closest {
            Some((index, distance)) if distance <= MAX_REMOVE_DISTANCE => {
                if index < static_count {
                    self.static_assets.remove(index);
                } else {
                    self.animated_assets.remove(index - static_count);
                }
                true
            }
            Some((_, distance)) => {
                debug!(distance, "no asset within removal distance");
                false
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL_JSON: &str = r#"{
        "paths": {
            "barrierLine": [
                { "points": [ {"x": 0, "y": 0}, {"x": 100, "y": 0}, {"x": 100, "y": 100} ] }
            ],
            "topZ": [
                { "points": [ {"x": 5, "y": 5}, {"x": 10, "y": 5} ] }
            ]
        },
        "assets": {
            "static": [ {"file": "house_01.png", "x": 50, "y": 60, "depthLine": 12, "layer": 2} ],
            "animations": [ {"file": "campfire.png", "x": -20, "y": 30} ]
        }
    }"#;

    #[test]
    fn test_load_assigns_one_based_indices() {
        let level = LevelData::from_json_str(LEVEL_JSON).unwrap();
        let indices: Vec<u32> = level.barrier_lines[0].points.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert_eq!(level.top_z_lines.len(), 1);
    }

    #[test]
    fn test_asset_defaults_fill_in() {
        let level = LevelData::from_json_str(LEVEL_JSON).unwrap();
        assert_eq!(level.static_assets[0].depth_line, 12.0);
        let campfire = &level.animated_assets[0];
        assert_eq!(campfire.depth_line, 0.0);
        assert_eq!(campfire.layer, 2.0);
        assert_eq!(campfire.kind, AssetKind::Animated);
    }

    #[test]
    fn test_remove_point_renumbers() {
        let mut line = BarrierLine::default();
        line.push_point(0.0, 0.0);
        line.push_point(10.0, 0.0);
        line.push_point(20.0, 0.0);
        line.remove_point(1);
        let indices: Vec<u32> = line.points.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(line.points[1].raw, Vec2::new(20.0, 0.0));
    }

    #[test]
    fn test_close_polygon_needs_three_points() {
        let mut line = BarrierLine::default();
        line.push_point(0.0, 0.0);
        line.push_point(10.0, 0.0);
        line.close_polygon();
        assert_eq!(line.points.len(), 2);

        line.push_point(10.0, 10.0);
        line.close_polygon();
        assert_eq!(line.points.len(), 4);
        assert_eq!(line.points[3].raw, Vec2::new(0.0, 0.0));
    }

    #[test]
    fn test_drawing_flow_and_removal() {
        let mut level = LevelData::default();
        level.start_drawing(DrawMode::Barrier);
        level.add_dot(0.0, 0.0);
        level.add_dot(50.0, 0.0);
        level.add_dot(50.0, 50.0);
        level.stop_drawing(true);

        assert_eq!(level.editor_barrier_lines.len(), 1);
        assert_eq!(level.editor_barrier_lines[0].points.len(), 4);

        // Removal only works while in a drawing mode.
        assert!(!level.remove_dot_near(50.0, 0.0));
        level.start_drawing(DrawMode::Barrier);
        assert!(level.remove_dot_near(52.0, 1.0));
        assert_eq!(level.editor_barrier_lines[0].points.len(), 3);
        // Beyond the removal radius nothing happens.
        assert!(!level.remove_dot_near(500.0, 500.0));
        level.stop_drawing(false);
        // The untouched empty line from the second session is dropped.
        assert_eq!(level.editor_barrier_lines.len(), 1);
    }

    #[test]
    fn test_asset_placement_and_nearest_removal() {
        let mut level = LevelData::default();
        level.place_asset(AssetKind::Static, "house_01.png", 0.0, 0.0);
        level.place_asset(AssetKind::Animated, "campfire.png", 100.0, 0.0);

        assert!(level.remove_asset_near(95.0, 5.0));
        assert!(level.animated_assets.is_empty());
        assert_eq!(level.static_assets.len(), 1);

        assert!(!level.remove_asset_near(300.0, 300.0));
        assert_eq!(level.static_assets.len(), 1);
    }

    #[test]
    fn test_export_merges_editor_lines_and_round_trips() {
        let mut level = LevelData::from_json_str(LEVEL_JSON).unwrap();
        level.start_drawing(DrawMode::Barrier);
        level.add_dot(-10.0, -10.0);
        level.add_dot(-20.0, -10.0);
        level.stop_drawing(false);

        let exported = level.to_json_string().unwrap();
        let reloaded = LevelData::from_json_str(&exported).unwrap();
        assert_eq!(reloaded.barrier_lines.len(), 2);
        assert_eq!(reloaded.barrier_lines[1].points[0].raw, Vec2::new(-10.0, -10.0));
        assert_eq!(reloaded.static_assets.len(), 1);
        assert_eq!(reloaded.animated_assets.len(), 1);
    }
}
