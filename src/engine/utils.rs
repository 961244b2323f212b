use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::{Direction, Vec2};

pub fn now_ms() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    now as u64
}

/// One-unit step toward `target` on each axis, and whether that step lands on it.
pub(super) fn step_toward(x: i32, y: i32, target: Vec2) -> (i32, i32, bool) {
    let dx = (target.x - x).signum();
    let dy = (target.y - y).signum();
    let reached = x + dx == target.x && y + dy == target.y;
    (dx, dy, reached)
}

pub(super) fn direction_from_delta(dx: i32, dy: i32, fallback: Direction) -> Direction {
    if dx > 0 {
        Direction::Right
    } else if dx < 0 {
        Direction::Left
    } else if dy > 0 {
        Direction::Down
    } else if dy < 0 {
        Direction::Up
    } else {
        fallback
    }
}
