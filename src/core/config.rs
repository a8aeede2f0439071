//! Client configuration with documented constants
//!
//! Everything that used to be a global mutable (`window.INPUT_TICK_RATE` and
//! friends in the original client) lives here and is passed into components
//! at construction.

use serde::Deserialize;

use crate::core::error::Result;

/// Tuning for the client's timers, entity geometry, and camera.
///
/// These values reproduce the shipped defaults. Changing them affects game
/// feel (input latency, animation cadence, zoom range) but not correctness.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// How often held keys are re-validated into movement, in Hz.
    pub input_tick_rate_hz: u32,

    /// Number of empty input ticks before the current movement is dropped.
    pub input_reset_ticks: u32,

    /// Animation tick rate. The director advances frames on this clock,
    /// independent of paint rate. Adjustable at runtime in steps of 10
    /// within [10, 60].
    pub animation_ticks_per_second: u32,

    /// Frames advance only once every this many animation ticks (a second,
    /// independent throttle). Adjustable at runtime within [1, 10].
    pub ticks_per_frame: u32,

    /// Character bounding box in world units. Head and foot lines are always
    /// derived from the center and this height.
    pub entity_width: f32,
    pub entity_height: f32,

    /// Delay after the last movement input before the walk animation drops
    /// to the matching idle, in ms.
    pub idle_threshold_ms: u64,

    /// Lifetime of a chat bubble node, in ms.
    pub bubble_duration_ms: u64,

    /// Grace period after one of two diagonal keys releases before movement
    /// is recomputed, so a diagonal walk does not visibly snap to a cardinal.
    pub diagonal_release_delay_ms: u64,

    /// Camera zoom range, stepped by 1 per wheel notch.
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub default_zoom: f32,

    /// World units moved per axis per input tick while a key is held.
    pub movement_speed: f32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            input_tick_rate_hz: 60,
            input_reset_ticks: 1,
            animation_ticks_per_second: 10,
            ticks_per_frame: 1,
            entity_width: 32.0,
            entity_height: 32.0,
            idle_threshold_ms: 100,
            bubble_duration_ms: 5000,
            diagonal_release_delay_ms: 32,
            min_zoom: 1.0,
            max_zoom: 10.0,
            default_zoom: 3.0,
            movement_speed: 10.0,
        }
    }
}

impl ClientConfig {
    /// Parse a config from TOML, filling unspecified fields from defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Animation tick interval in ms for the configured rate.
    pub fn animation_tick_interval_ms(&self) -> u64 {
        1000 / self.animation_ticks_per_second.max(1) as u64
    }

    /// Input tick interval in ms for the configured rate.
    pub fn input_tick_interval_ms(&self) -> u64 {
        1000 / self.input_tick_rate_hz.max(1) as u64
    }
}
