// the pointer pulls the head along whichever axis it is furthest away on
// offsets inside the dead zone, exact diagonals and reversals keep the current heading
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::debug;

use crate::snake::{SnakeDirection, SnakeGame};

pub const DEFAULT_DEAD_ZONE: i32 = 40;
pub const DEFAULT_COOLDOWN_MS: u64 = 150;

/// A position in frame pixels, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> PixelPoint {
        PixelPoint { x, y }
    }
}

pub fn direction_toward(
    pointer: PixelPoint,
    head: PixelPoint,
    dead_zone: i32,
    current: SnakeDirection,
) -> SnakeDirection {
    let dx = pointer.x - head.x;
    let dy = pointer.y - head.y;

    let candidate = if dx.abs() > dy.abs() && dx.abs() > dead_zone {
        if dx > 0 {
            SnakeDirection::Right
        } else {
            SnakeDirection::Left
        }
    } else if dy.abs() > dx.abs() && dy.abs() > dead_zone {
        if dy > 0 {
            SnakeDirection::Down
        } else {
            SnakeDirection::Up
        }
    } else {
        return current;
    };

    if candidate == current.opposite() {
        current
    } else {
        candidate
    }
}

#[derive(Debug, Clone)]
pub struct GestureSteering {
    dead_zone: i32,
    cooldown: Duration,
    last_change: Option<Instant>,
}

impl GestureSteering {
    pub fn new(dead_zone: i32, cooldown: Duration) -> Self {
        GestureSteering {
            dead_zone,
            cooldown,
            last_change: None,
        }
    }

    /// Applies the pointer to the game, returning the new direction if it turned.
    pub fn steer<R: Rng>(
        &mut self,
        pointer: PixelPoint,
        game: &mut SnakeGame<R>,
        now: Instant,
    ) -> Option<SnakeDirection> {
        if game.is_over() {
            return None;
        }
        if let Some(last) = self.last_change {
            if now.saturating_duration_since(last) <= self.cooldown {
                return None;
            }
        }

        let (head_x, head_y) = game.board_size().cell_origin(&game.head());
        let next = direction_toward(
            pointer,
            PixelPoint::new(head_x, head_y),
            self.dead_zone,
            game.direction(),
        );
        if game.set_direction(next) {
            self.last_change = Some(now);
            debug!(direction = ?next, x = pointer.x, y = pointer.y, "pointer turned the snake");
            Some(next)
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.last_change = None;
    }
}

impl Default for GestureSteering {
    fn default() -> Self {
        GestureSteering::new(
            DEFAULT_DEAD_ZONE,
            Duration::from_millis(DEFAULT_COOLDOWN_MS),
        )
    }
}
