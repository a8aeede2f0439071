//! Held-key sampling into fixed-rate movement commands.
//!
//! Key events only update the current movement; actual commands are emitted
//! on the input tick clock so movement speed is independent of key-repeat
//! and paint rates. Releasing one key of a diagonal starts a short grace
//! period before the movement is recomputed, so a slightly staggered
//! release does not snap the facing to a cardinal.

use ahash::AHashSet;
use tracing::debug;

use crate::core::config::ClientConfig;
use crate::core::types::Millis;
use crate::movement::Direction;

/// The four movement keys (WASD and arrows collapse to these).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKey {
    Up,
    Down,
    Left,
    Right,
}

impl MoveKey {
    fn delta(self) -> (f32, f32) {
        match self {
            MoveKey::Up => (0.0, -1.0),
            MoveKey::Down => (0.0, 1.0),
            MoveKey::Left => (-1.0, 0.0),
            MoveKey::Right => (1.0, 0.0),
        }
    }
}

/// Emote labels bound to the digit keys.
pub fn emote_for_key(key: char) -> Option<&'static str> {
    match key {
        '1' => Some("pop"),
        '2' => Some("love"),
        '3' => Some("awkward"),
        '4' => Some("yay"),
        '5' => Some("swag"),
        '6' => Some("madge"),
        '7' => Some("yawn"),
        '8' => Some("sleep"),
        '9' => Some("ear"),
        _ => None,
    }
}

/// One movement command, emitted once per input tick while movement is
/// active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementCommand {
    pub dx: f32,
    pub dy: f32,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, Default)]
struct CurrentMovement {
    dx: f32,
    dy: f32,
    direction: Option<Direction>,
}

/// Samples held keys into movement commands on the input tick clock.
#[derive(Debug)]
pub struct InputSampler {
    active: AHashSet<MoveKey>,
    current: CurrentMovement,
    no_input_ticks: u32,
    reset_ticks: u32,
    speed: f32,

    tick_interval_ms: u64,
    last_now: Option<Millis>,
    accumulated_ms: u64,

    diagonal_grace: Option<Millis>,
    diagonal_delay_ms: u64,
}

impl InputSampler {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            active: AHashSet::new(),
            current: CurrentMovement::default(),
            no_input_ticks: 0,
            reset_ticks: config.input_reset_ticks,
            speed: config.movement_speed,
            tick_interval_ms: config.input_tick_interval_ms(),
            last_now: None,
            accumulated_ms: 0,
            diagonal_grace: None,
            diagonal_delay_ms: config.diagonal_release_delay_ms,
        }
    }

    pub fn press(&mut self, key: MoveKey) {
        self.active.insert(key);
        self.recompute();
    }

    /// Release a key. If the movement was diagonal at the moment of
    /// release, the recompute is deferred by the grace period.
    pub fn release(&mut self, key: MoveKey, now: Millis) {
        let was_diagonal = self.is_diagonal();
        self.active.remove(&key);

        if was_diagonal {
            self.diagonal_grace = Some(now + self.diagonal_delay_ms);
            debug!(?key, "diagonal release, deferring recompute");
        } else if !self.active.is_empty() {
            self.recompute();
        }
    }

    fn is_diagonal(&self) -> bool {
        let (dx, dy) = self.summed_deltas();
        dx != 0.0 && dy != 0.0
    }

    fn summed_deltas(&self) -> (f32, f32) {
        let mut dx = 0.0;
        let mut dy = 0.0;
        for key in &self.active {
            let (kx, ky) = key.delta();
            dx += kx;
            dy += ky;
        }
        (dx, dy)
    }

    /// Collapse held keys to per-axis speed and a facing.
    fn recompute(&mut self) {
        // f32::signum maps 0.0 to 1.0, so spell out the three-way sign.
        let sign = |v: f32| {
            if v > 0.0 {
                1.0
            } else if v < 0.0 {
                -1.0
            } else {
                0.0
            }
        };
        let (dx, dy) = self.summed_deltas();
        let dx = sign(dx) * self.speed;
        let dy = sign(dy) * self.speed;
        self.current = CurrentMovement {
            dx,
            dy,
            direction: Direction::from_delta(dx, dy),
        };
        self.no_input_ticks = 0;
    }

    /// Advance the tick clock to `now`, emitting one command per elapsed
    /// tick while movement is active. After `reset_ticks` empty ticks the
    /// stale movement is dropped.
    pub fn advance(&mut self, now: Millis) -> Vec<MovementCommand> {
        if let Some(deadline) = self.diagonal_grace {
            if now >= deadline {
                self.diagonal_grace = None;
                if !self.active.is_empty() {
                    self.recompute();
                }
            }
        }

        let last = self.last_now.replace(now).unwrap_or(now);
        self.accumulated_ms += now.saturating_sub(last);

        let mut commands = Vec::new();
        while self.accumulated_ms >= self.tick_interval_ms {
            self.accumulated_ms -= self.tick_interval_ms;

            if self.active.is_empty() {
                self.no_input_ticks += 1;
                if self.no_input_ticks >= self.reset_ticks {
                    self.current = CurrentMovement::default();
                    continue;
                }
            }

            if let Some(direction) = self.current.direction {
                commands.push(MovementCommand {
                    dx: self.current.dx,
                    dy: self.current.dy,
                    direction,
                });
            }
        }
        commands
    }
}
