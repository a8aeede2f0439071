//! Viewport position, zoom, and edge clamping.
//!
//! The camera stores its translation in screen space (world center times
//! zoom, negated when clamped against map bounds). When the focused point
//! would push the view past a map edge, the clamp freezes the translation
//! and the overshoot is remembered as an offset so zoom changes keep the
//! same world center.

use glam::Vec2;
use tracing::debug;

use crate::core::config::ClientConfig;

#[derive(Debug, Clone)]
pub struct Camera {
    /// Screen-space translation applied to the world layer.
    pub x: f32,
    pub y: f32,
    pub zoom: f32,
    pub screen_width: f32,
    pub screen_height: f32,
    /// Overshoot between the requested and clamped center, in world units.
    pub offset_x: f32,
    pub offset_y: f32,
    map_bounds: Option<Vec2>,
}

impl Camera {
    pub fn new(config: &ClientConfig, screen_width: f32, screen_height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: config.default_zoom,
            screen_width,
            screen_height,
            offset_x: 0.0,
            offset_y: 0.0,
            map_bounds: None,
        }
    }

    /// Record the map's pixel dimensions; subsequent moves clamp to them.
    pub fn set_map_bounds(&mut self, width: f32, height: f32) {
        self.map_bounds = Some(Vec2::new(width, height));
    }

    pub fn map_bounds(&self) -> Option<Vec2> {
        self.map_bounds
    }

    pub fn set_screen_size(&mut self, width: f32, height: f32) {
        self.screen_width = width;
        self.screen_height = height;
    }

    /// Convert a screen point to world coordinates.
    ///
    /// Subtracts the screen center and the camera translation but not the
    /// zoom factor, so the result is in zoomed world units. Callers that
    /// need unzoomed coordinates divide by `zoom` themselves.
    pub fn screen_to_world(&self, screen_x: f32, screen_y: f32) -> Vec2 {
        Vec2::new(
            (screen_x - self.screen_width / 2.0) - self.x,
            (screen_y - self.screen_height / 2.0) - self.y,
        )
    }

    /// World-space center the camera is currently focused on.
    pub fn world_center(&self) -> Vec2 {
        Vec2::new(
            -self.x / self.zoom + self.offset_x,
            -self.y / self.zoom + self.offset_y,
        )
    }

    /// Focus the camera on a world position, clamping against map bounds so
    /// the view never shows past a map edge.
    pub fn move_to_position(&mut self, x: f32, y: f32) {
        let Some(bounds) = self.map_bounds else {
            self.x = x * self.zoom;
            self.y = y * self.zoom;
            self.offset_x = 0.0;
            self.offset_y = 0.0;
            return;
        };

        let visible_width = self.screen_width / self.zoom;
        let visible_height = self.screen_height / self.zoom;
        let max_x = bounds.x / 2.0 - visible_width / 2.0;
        let max_y = bounds.y / 2.0 - visible_height / 2.0;

        let clamped_x = x.clamp(-max_x, max_x);
        let clamped_y = y.clamp(-max_y, max_y);

        self.offset_x = x - clamped_x;
        self.offset_y = y - clamped_y;

        self.x = -clamped_x * self.zoom;
        self.y = -clamped_y * self.zoom;
    }

    /// Change zoom while keeping the current world center fixed. The center
    /// is reconstructed from the translation plus the clamp offset, so a
    /// player pinned against a map edge stays focused through zoom changes.
    pub fn set_zoom(&mut self, zoom: f32) {
        let center = self.world_center();
        debug!(zoom, center_x = center.x, center_y = center.y, "zoom change");
        self.zoom = zoom;
        self.move_to_position(center.x, center.y);
    }
}
