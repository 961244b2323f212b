use crate::engine::{compute_player_velocity, interact_with_active};
use crate::types::{GameState, Panel, Screen};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKey {
    Up,
    Left,
    Down,
    Right,
    Interact,
}

impl InputKey {
    /// Maps a keyboard `key` value (case-insensitive WASD plus E).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "w" | "W" => Some(Self::Up),
            "a" | "A" => Some(Self::Left),
            "s" | "S" => Some(Self::Down),
            "d" | "D" => Some(Self::Right),
            "e" | "E" => Some(Self::Interact),
            _ => None,
        }
    }
}

pub fn accepts_input(state: &GameState) -> bool {
    state.screen == Screen::Game && state.panel != Panel::Upgrades
}

fn set_flag(state: &mut GameState, key: InputKey, held: bool) {
    let player = &mut state.player;
    match key {
        InputKey::Up => player.w_held = held,
        InputKey::Left => player.a_held = held,
        InputKey::Down => player.s_held = held,
        InputKey::Right => player.d_held = held,
        InputKey::Interact => {}
    }
}

/// Auto-repeat events are dropped so holding the interact key fires once.
pub fn key_down(state: GameState, key: InputKey, repeat: bool) -> GameState {
    if !accepts_input(&state) || repeat {
        return state;
    }
    let mut state = state;
    if key == InputKey::Interact {
        state = interact_with_active(state);
    } else {
        set_flag(&mut state, key, true);
    }
    compute_player_velocity(state)
}

pub fn key_up(state: GameState, key: InputKey) -> GameState {
    if !accepts_input(&state) {
        return state;
    }
    let mut state = state;
    set_flag(&mut state, key, false);
    compute_player_velocity(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, HeldItem};
    use crate::world::create_initial_state;

    fn in_game() -> GameState {
        let mut state = create_initial_state();
        state.screen = Screen::Game;
        state
    }

    #[test]
    fn parses_case_insensitive_keys() {
        assert_eq!(InputKey::parse("W"), Some(InputKey::Up));
        assert_eq!(InputKey::parse("d"), Some(InputKey::Right));
        assert_eq!(InputKey::parse("E"), Some(InputKey::Interact));
        assert_eq!(InputKey::parse("ArrowUp"), None);
    }

    #[test]
    fn key_down_sets_flag_and_velocity() {
        let state = key_down(in_game(), InputKey::Right, false);
        assert!(state.player.d_held);
        assert!(state.player.dx > 0.0);
        assert_eq!(state.player.direction, Direction::Right);

        let state = key_up(state, InputKey::Right);
        assert!(!state.player.d_held);
        assert_eq!(state.player.dx, 0.0);
    }

    #[test]
    fn input_is_suppressed_outside_game_and_in_upgrades_panel() {
        let menu = create_initial_state();
        assert_eq!(key_down(menu.clone(), InputKey::Up, false), menu);

        let mut upgrades = in_game();
        upgrades.panel = Panel::Upgrades;
        assert_eq!(key_down(upgrades.clone(), InputKey::Up, false), upgrades);
        assert_eq!(key_up(upgrades.clone(), InputKey::Up), upgrades);

        let mut restock = in_game();
        restock.panel = Panel::Restock;
        assert!(key_down(restock, InputKey::Up, false).player.w_held);
    }

    #[test]
    fn repeated_interact_fires_once() {
        let mut state = in_game();
        state.player.x = 240.0;
        state.player.y = 60.0;
        let state = crate::engine::update_active_interactable(state);

        let repeated = key_down(state.clone(), InputKey::Interact, true);
        assert_eq!(repeated.player.held_item, HeldItem::Empty);

        let pressed = key_down(state, InputKey::Interact, false);
        assert!(matches!(pressed.player.held_item, HeldItem::Ingredient { .. }));
    }
}
