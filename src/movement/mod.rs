//! Movement validation: direction labels, barrier checks, idle demotion,
//! and the zoom step.
//!
//! Movement is resolved against the player's foot line, not the center, so
//! barriers read as things the feet cannot cross. A blocked move keeps the
//! position but still applies the walk action, so the player animates
//! against the wall.

use glam::Vec2;
use tracing::warn;

use crate::collision::segment_intersection;
use crate::core::config::ClientConfig;
use crate::core::types::{Millis, PlayerId};
use crate::level::LevelData;
use crate::store::PlayerStore;

/// Input direction. Pure west and east inputs are remapped to the
/// southwest and southeast facings because no side-facing art exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    East,
    West,
    Northeast,
    Northwest,
    Southeast,
    Southwest,
}

impl Direction {
    /// Direction for a movement delta, or `None` when still.
    pub fn from_delta(dx: f32, dy: f32) -> Option<Self> {
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        if dy == 0.0 {
            return Some(if dx < 0.0 { Direction::Southwest } else { Direction::Southeast });
        }
        if dx == 0.0 {
            return Some(if dy < 0.0 { Direction::North } else { Direction::South });
        }
        Some(if dy < 0.0 {
            if dx < 0.0 { Direction::Northwest } else { Direction::Northeast }
        } else {
            if dx < 0.0 { Direction::Southwest } else { Direction::Southeast }
        })
    }

    pub fn walk_label(self) -> &'static str {
        match self {
            Direction::North => "Nwalk",
            Direction::South => "Swalk",
            Direction::Southwest | Direction::West => "SWwalk",
            Direction::Southeast | Direction::East => "SEwalk",
            Direction::Northwest => "NWwalk",
            Direction::Northeast => "NEwalk",
        }
    }
}

/// Idle label for a walk label. Southeast demotes to the east-facing idle,
/// which is the only side-facing idle in the shipped sheets.
pub fn idle_for_walk(walk: &str) -> Option<&'static str> {
    match walk {
        "Swalk" => Some("Sidle"),
        "SWwalk" => Some("SWidle"),
        "NWwalk" => Some("NWidle"),
        "Nwalk" => Some("Nidle"),
        "NEwalk" => Some("NEidle"),
        "SEwalk" => Some("Eidle"),
        _ => None,
    }
}

/// Outcome of validating one movement command.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMovement {
    pub x: f32,
    pub y: f32,
    pub action: String,
    pub blocked: bool,
}

#[derive(Debug, Clone)]
struct IdleDeadline {
    at: Millis,
    walk: String,
    player: PlayerId,
}

/// Validates movement commands against barriers and drives the walk-to-idle
/// demotion and the zoom step.
#[derive(Debug)]
pub struct MovementResolver {
    zoom: f32,
    min_zoom: f32,
    max_zoom: f32,
    idle_threshold_ms: u64,
    idle_deadline: Option<IdleDeadline>,
}

impl MovementResolver {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            zoom: config.default_zoom,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            idle_threshold_ms: config.idle_threshold_ms,
            idle_deadline: None,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Validate one movement command for a player.
    ///
    /// A zero delta resolves to the idle matching the last facing. A
    /// non-zero delta resolves to the walk label and re-arms the idle
    /// deadline. When the foot-line segment from the current to the
    /// candidate position crosses any barrier, the position reverts but the
    /// action still applies.
    pub fn validate(
        &mut self,
        now: Millis,
        store: &PlayerStore,
        level: Option<&LevelData>,
        id: &PlayerId,
        dx: f32,
        dy: f32,
        direction: Option<Direction>,
    ) -> Option<ResolvedMovement> {
        let Some(player) = store.player(id) else {
            warn!(player = %id, "movement for unknown player");
            return None;
        };

        let mut new_x = player.x + dx;
        let mut new_feet_y = player.foot_y + dy;

        let action = if dx == 0.0 && dy == 0.0 {
            let walk = direction.map(Direction::walk_label).unwrap_or("Swalk");
            idle_for_walk(walk).unwrap_or("Sidle").to_string()
        } else {
            let walk = direction.map(Direction::walk_label).unwrap_or("Swalk");
            self.idle_deadline = Some(IdleDeadline {
                at: now + self.idle_threshold_ms,
                walk: walk.to_string(),
                player: id.clone(),
            });
            walk.to_string()
        };

        let Some(level) = level else {
            warn!("no barrier lines loaded, accepting movement unchecked");
            let y = new_feet_y - player.height / 2.0;
            return Some(ResolvedMovement { x: new_x, y, action, blocked: false });
        };

        let from = Vec2::new(player.x, player.foot_y);
        let to = Vec2::new(new_x, new_feet_y);
        let blocked = level
            .all_barrier_lines()
            .any(|line| line.segments().any(|(a, b)| segment_intersection(from, to, a, b).is_some()));

        if blocked {
            new_x = player.x;
            new_feet_y = player.foot_y;
        }

        let y = new_feet_y - player.height / 2.0;
        Some(ResolvedMovement { x: new_x, y, action, blocked })
    }

    /// Fire the idle demotion once the deadline passes: the player keeps
    /// their position and drops to the idle matching their last walk.
    pub fn poll_idle(&mut self, now: Millis, store: &PlayerStore) -> Option<(PlayerId, ResolvedMovement)> {
        let deadline = self.idle_deadline.as_ref()?;
        if now < deadline.at {
            return None;
        }
        let deadline = self.idle_deadline.take()?;
        let player = store.player(&deadline.player)?;
        let idle = idle_for_walk(&deadline.walk)?;
        Some((
            deadline.player,
            ResolvedMovement {
                x: player.x,
                y: player.y,
                action: idle.to_string(),
                blocked: false,
            },
        ))
    }

    /// Cancel a pending idle demotion (on disconnect or teleport).
    pub fn clear_idle(&mut self) {
        self.idle_deadline = None;
    }

    /// Step the zoom by one notch, clamped to the configured range.
    /// Returns the new zoom only when it changed.
    pub fn handle_zoom(&mut self, zoom_in: bool) -> Option<f32> {
        let target = if zoom_in {
            (self.zoom + 1.0).min(self.max_zoom)
        } else {
            (self.zoom - 1.0).max(self.min_zoom)
        };
        if target != self.zoom {
            self.zoom = target;
            Some(target)
        } else {
            None
        }
    }
}
