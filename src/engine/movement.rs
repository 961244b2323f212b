use std::f32::consts::SQRT_2;

use crate::constants::{FRAME_TIME_MS, GAME_HEIGHT, GAME_WIDTH, PLAYER_SIZE, SLIDE_FACTOR};
use crate::types::{ActiveInteractable, Direction, GameState, InteractableKind, PlayerState, Rect};

/// Probe used for interactable detection; larger than the sprite.
pub fn player_hit_rect(x: f32, y: f32) -> Rect {
    Rect::new(x.round() + 2.0, y.round() + 2.0, 44.0, 44.0)
}

/// Probe used for solid-body collision; smaller than the sprite.
pub fn player_collision_rect(x: f32, y: f32) -> Rect {
    Rect::new(x.round() + 5.0, y.round() + 5.0, 30.0, 30.0)
}

pub fn is_in_bounds(x: f32, y: f32) -> bool {
    x > 0.0 && x < GAME_WIDTH - PLAYER_SIZE && y > 0.0 && y < GAME_HEIGHT - PLAYER_SIZE * 2.0
}

/// Everything the player cannot walk through. Chairs contribute their
/// collision rect, not the seat rect.
pub fn solid_rects(state: &GameState) -> Vec<Rect> {
    state
        .walls
        .iter()
        .copied()
        .chain(state.decorations.iter().map(|value| value.rect))
        .chain(state.counters.iter().map(|value| value.rect))
        .chain(state.prep_tables.iter().map(|value| value.rect))
        .chain(state.trashbins.iter().map(|value| value.rect))
        .chain(state.chairs.iter().map(|value| value.collision_rect))
        .collect()
}

pub fn collides_at(solids: &[Rect], x: f32, y: f32) -> bool {
    let probe = player_collision_rect(x, y);
    solids.iter().any(|rect| probe.intersects(rect))
}

/// Velocity and facing implied by the held flags. Opposing keys cancel;
/// diagonal components are scaled by 1/sqrt(2).
pub fn velocity_from_flags(player: &PlayerState) -> (f32, f32, Direction) {
    let speed = player.speed;
    let mut direction = player.direction;
    if player.d_held && !player.a_held {
        direction = Direction::Right;
    } else if player.a_held && !player.d_held {
        direction = Direction::Left;
    } else if player.w_held && !player.s_held {
        direction = Direction::Up;
    } else if player.s_held && !player.w_held {
        direction = Direction::Down;
    }

    let axis = |negative: bool, positive: bool| match (negative, positive) {
        (true, false) => -speed,
        (false, true) => speed,
        _ => 0.0,
    };
    let mut dx = axis(player.a_held, player.d_held);
    let mut dy = axis(player.w_held, player.s_held);
    if dx != 0.0 && dy != 0.0 {
        dx = dx.signum() * (speed / SQRT_2);
        dy = dy.signum() * (speed / SQRT_2);
    }
    (dx, dy, direction)
}

pub fn compute_player_velocity(state: GameState) -> GameState {
    let mut state = state;
    let (dx, dy, direction) = velocity_from_flags(&state.player);
    state.player.dx = dx;
    state.player.dy = dy;
    state.player.direction = direction;
    state
}

pub fn tick_movement(state: GameState) -> GameState {
    let mut state = compute_player_velocity(state);
    let solids = solid_rects(&state);
    let can_move_to = |x: f32, y: f32| is_in_bounds(x, y) && !collides_at(&solids, x, y);

    let PlayerState { x: old_x, y: old_y, dx, dy, .. } = state.player;
    let mut x = old_x;
    let mut y = old_y;
    let mut moved_x = false;
    let mut moved_y = false;

    if dx != 0.0 && can_move_to(old_x + dx, y) {
        x = old_x + dx;
        moved_x = true;
    }
    if dy != 0.0 && can_move_to(x, old_y + dy) {
        y = old_y + dy;
        moved_y = true;
    }

    let diagonal_input = dx != 0.0 && dy != 0.0;
    if diagonal_input && moved_x != moved_y {
        x = old_x + (x - old_x) * SLIDE_FACTOR;
        y = old_y + (y - old_y) * SLIDE_FACTOR;
    }

    state.player.x = x;
    state.player.y = y;
    state.runtime.ms += FRAME_TIME_MS;
    update_active_interactable(state)
}

/// First hit in priority order: counters, prep tables, trash bins, then
/// chairs whose assigned customer is seated.
pub fn find_active_interactable(state: &GameState) -> Option<ActiveInteractable> {
    let hit = player_hit_rect(state.player.x, state.player.y);

    if let Some(counter) = state.counters.iter().find(|value| hit.intersects(&value.hit_box)) {
        return Some(ActiveInteractable {
            kind: InteractableKind::Counter,
            id: counter.id.clone(),
            popup_direction: counter.popup_direction,
            rect: counter.rect,
        });
    }

    if let Some(prep) = state.prep_tables.iter().find(|value| hit.intersects(&value.hit_box)) {
        return Some(ActiveInteractable {
            kind: InteractableKind::PrepTable,
            id: prep.id.clone(),
            popup_direction: prep.popup_direction,
            rect: prep.rect,
        });
    }

    if let Some(trash) = state.trashbins.iter().find(|value| hit.intersects(&value.hit_box)) {
        return Some(ActiveInteractable {
            kind: InteractableKind::Trashbin,
            id: trash.id.clone(),
            popup_direction: trash.popup_direction,
            rect: trash.rect,
        });
    }

    state
        .chairs
        .iter()
        .find(|chair| {
            hit.intersects(&chair.hit_box)
                && chair
                    .customer_id
                    .as_deref()
                    .and_then(|id| state.customer(id))
                    .is_some_and(|customer| customer.seated)
        })
        .map(|chair| ActiveInteractable {
            kind: InteractableKind::Chair,
            id: chair.id.clone(),
            popup_direction: chair.popup_direction,
            rect: chair.rect,
        })
}

pub fn update_active_interactable(state: GameState) -> GameState {
    let mut state = state;
    state.runtime.active_interactable = find_active_interactable(&state);
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PLAYER_BASE_SPEED;
    use crate::rng::Rng;
    use crate::types::CustomerState;
    use crate::world::create_initial_state;

    fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() <= eps
    }

    fn with_keys(w: bool, a: bool, s: bool, d: bool) -> GameState {
        let mut state = create_initial_state();
        state.player.w_held = w;
        state.player.a_held = a;
        state.player.s_held = s;
        state.player.d_held = d;
        state
    }

    fn open_floor_state() -> GameState {
        let mut state = create_initial_state();
        state.player.x = 520.0;
        state.player.y = 440.0;
        state
    }

    #[test]
    fn facing_follows_key_priority() {
        let cases = [
            ((false, false, false, true), Direction::Right),
            ((false, true, false, false), Direction::Left),
            ((true, false, false, false), Direction::Up),
            ((false, false, true, false), Direction::Down),
            ((true, false, false, true), Direction::Right),
            ((true, true, false, false), Direction::Left),
            ((true, false, true, true), Direction::Right),
        ];
        for ((w, a, s, d), expected) in cases {
            let state = compute_player_velocity(with_keys(w, a, s, d));
            assert_eq!(state.player.direction, expected, "keys w={w} a={a} s={s} d={d}");
        }
    }

    #[test]
    fn opposing_or_no_keys_produce_zero_velocity() {
        for (w, a, s, d) in [
            (false, false, false, false),
            (false, true, false, true),
            (true, false, true, false),
            (true, true, true, true),
        ] {
            let state = compute_player_velocity(with_keys(w, a, s, d));
            assert_eq!(state.player.dx, 0.0);
            assert_eq!(state.player.dy, 0.0);
        }
        let idle = compute_player_velocity(with_keys(false, true, false, true));
        assert_eq!(idle.player.direction, Direction::Down);
    }

    #[test]
    fn diagonal_velocity_matches_axial_speed() {
        let state = compute_player_velocity(with_keys(true, false, false, true));
        let expected = PLAYER_BASE_SPEED / SQRT_2;
        assert!(approx_eq(state.player.dx, expected, 1e-6));
        assert!(approx_eq(state.player.dy, -expected, 1e-6));
        let magnitude = (state.player.dx.powi(2) + state.player.dy.powi(2)).sqrt();
        assert!(approx_eq(magnitude, PLAYER_BASE_SPEED, 1e-5));
    }

    #[test]
    fn axial_move_on_open_floor_advances_clock() {
        let mut state = open_floor_state();
        state.player.d_held = true;
        let next = tick_movement(state);
        assert!(approx_eq(next.player.x, 520.0 + PLAYER_BASE_SPEED, 1e-5));
        assert_eq!(next.player.y, 440.0);
        assert_eq!(next.runtime.ms, FRAME_TIME_MS);
    }

    #[test]
    fn blocked_axis_during_diagonal_input_slides_at_ten_percent() {
        let mut state = create_initial_state();
        // Collision probe bottom edge sits exactly on the wall at y=423.
        state.player.x = 200.0;
        state.player.y = 388.0;
        state.player.s_held = true;
        state.player.d_held = true;
        let next = tick_movement(state);
        let diagonal = PLAYER_BASE_SPEED / SQRT_2;
        assert_eq!(next.player.y, 388.0);
        assert!(approx_eq(next.player.x, 200.0 + diagonal * SLIDE_FACTOR, 1e-4));
    }

    #[test]
    fn blocked_axial_move_stays_put() {
        let mut state = create_initial_state();
        state.player.x = 200.0;
        state.player.y = 388.0;
        state.player.s_held = true;
        let next = tick_movement(state);
        assert_eq!(next.player.y, 388.0);
        assert_eq!(next.player.x, 200.0);
    }

    #[test]
    fn random_walk_never_overlaps_solids_or_leaves_bounds() {
        let mut rng = Rng::new(77);
        let mut state = create_initial_state();
        let solids = solid_rects(&state);
        for _ in 0..20_000 {
            if rng.bool(0.05) {
                state.player.w_held = rng.bool(0.5);
                state.player.a_held = rng.bool(0.5);
                state.player.s_held = rng.bool(0.5);
                state.player.d_held = rng.bool(0.5);
            }
            state = tick_movement(state);
            assert!(is_in_bounds(state.player.x, state.player.y));
            assert!(!collides_at(&solids, state.player.x, state.player.y));
        }
    }

    #[test]
    fn counter_wins_over_other_kinds_and_clears_when_away() {
        let mut state = create_initial_state();
        state.player.x = 240.0;
        state.player.y = 60.0;
        let near = update_active_interactable(state);
        let active = near.runtime.active_interactable.clone().expect("counter in range");
        assert_eq!(active.kind, InteractableKind::Counter);
        assert_eq!(active.id, "counter-milk");

        let mut away = near;
        away.player.x = 520.0;
        away.player.y = 440.0;
        let away = update_active_interactable(away);
        assert!(away.runtime.active_interactable.is_none());
    }

    #[test]
    fn chair_requires_seated_customer() {
        let mut state = create_initial_state();
        state.player.x = 585.0;
        state.player.y = 340.0;
        assert!(find_active_interactable(&state).is_none());

        state.chairs[0].customer_id = Some("customer-1".to_string());
        state.customers.push(CustomerState {
            id: "customer-1".to_string(),
            x: 575,
            y: 385,
            w: 75,
            h: 75,
            seated: false,
            leaving: false,
            chair_id: state.chairs[0].id.clone(),
            current_target: 0,
            direction: Direction::Left,
            order: Vec::new(),
            seat_number: 1,
        });
        assert!(find_active_interactable(&state).is_none());

        state.customers[0].seated = true;
        let active = find_active_interactable(&state).expect("seated chair is interactable");
        assert_eq!(active.kind, InteractableKind::Chair);
        assert_eq!(active.id, "chair-1");
    }

    #[test]
    fn recomputing_active_interactable_is_idempotent() {
        let mut state = create_initial_state();
        state.player.x = 160.0;
        state.player.y = 100.0;
        let once = update_active_interactable(state);
        let twice = update_active_interactable(once.clone());
        assert_eq!(once.runtime.active_interactable, twice.runtime.active_interactable);
    }
}
