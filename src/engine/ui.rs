use crate::constants::MONEY_DELTA_DISPLAY_MS;
use crate::types::{AudioCue, GameState, Panel, Screen};
use crate::world::create_initial_state;

fn stop_player(state: &mut GameState) {
    let player = &mut state.player;
    player.w_held = false;
    player.a_held = false;
    player.s_held = false;
    player.d_held = false;
    player.dx = 0.0;
    player.dy = 0.0;
}

pub fn set_screen(state: GameState, screen: Screen) -> GameState {
    if state.screen == screen {
        return state;
    }
    let mut state = state;
    let leaving_game = state.screen == Screen::Game;
    state.screen = screen;
    if screen == Screen::Game {
        if state.music_on {
            state.cue(AudioCue::MusicStart);
        }
    } else if leaving_game {
        stop_player(&mut state);
        state.events.push(AudioCue::MusicStop);
    }
    state
}

pub fn set_panel(state: GameState, panel: Panel) -> GameState {
    let mut state = state;
    state.panel = panel;
    state.ui.current_banner = panel.banner();
    if panel == Panel::Upgrades {
        stop_player(&mut state);
    }
    state
}

/// Opens `panel`, or closes it when it is already the active one.
pub fn toggle_panel(state: GameState, panel: Panel) -> GameState {
    let next = if state.panel == panel { Panel::None } else { panel };
    set_panel(state, next)
}

pub fn toggle_sounds(state: GameState) -> GameState {
    let mut state = state;
    state.sound_on = !state.sound_on;
    if state.sound_on {
        state.cue(AudioCue::MusicStart);
    } else {
        state.events.push(AudioCue::MusicStop);
    }
    state
}

/// Music cannot be switched on while sound is muted.
pub fn toggle_music(state: GameState) -> GameState {
    let mut state = state;
    if state.music_on {
        state.music_on = false;
        state.events.push(AudioCue::MusicStop);
    } else if state.sound_on {
        state.music_on = true;
        state.cue(AudioCue::MusicStart);
    }
    state
}

pub fn play_click(state: GameState) -> GameState {
    let mut state = state;
    state.cue(AudioCue::Click);
    state
}

/// Fresh bootstrap. Resetting mid-game still stops the music.
pub fn reset_game(state: GameState) -> GameState {
    let mut fresh = create_initial_state();
    if state.screen == Screen::Game {
        fresh.events.push(AudioCue::MusicStop);
    }
    fresh
}

/// Clears the popup once the simulation clock has passed its expiry.
pub fn validate_transient_ui(state: GameState) -> GameState {
    if state.runtime.popup_until == 0 || state.runtime.ms <= state.runtime.popup_until {
        return state;
    }
    let mut state = state;
    state.runtime.popup_until = 0;
    state.runtime.popup_image = None;
    state
}

pub fn is_money_delta_visible(state: &GameState) -> bool {
    state.player.money_delta != 0
        && state.runtime.ms.saturating_sub(state.player.money_delta_at) < MONEY_DELTA_DISPLAY_MS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Banner;

    fn in_game() -> GameState {
        let mut state = create_initial_state();
        state.screen = Screen::Game;
        state
    }

    #[test]
    fn entering_game_starts_music_only_when_enabled() {
        let state = set_screen(create_initial_state(), Screen::Game);
        assert_eq!(state.screen, Screen::Game);
        assert!(state.events.is_empty());

        let mut state = create_initial_state();
        state.music_on = true;
        let state = set_screen(state, Screen::Game);
        assert_eq!(state.events, vec![AudioCue::MusicStart]);

        let mut muted = create_initial_state();
        muted.music_on = true;
        muted.sound_on = false;
        assert!(set_screen(muted, Screen::Game).events.is_empty());
    }

    #[test]
    fn leaving_game_stops_player_and_music() {
        let mut state = in_game();
        state.sound_on = false;
        state.player.d_held = true;
        state.player.dx = 2.2;
        let state = set_screen(state, Screen::Menu);
        assert!(!state.player.d_held);
        assert_eq!(state.player.dx, 0.0);
        assert_eq!(state.events, vec![AudioCue::MusicStop]);
    }

    #[test]
    fn same_screen_is_noop() {
        let state = in_game();
        assert_eq!(set_screen(state.clone(), Screen::Game), state);
    }

    #[test]
    fn upgrades_panel_halts_movement_and_sets_banner() {
        let mut state = in_game();
        state.player.w_held = true;
        state.player.dy = -2.2;
        let state = set_panel(state, Panel::Upgrades);
        assert_eq!(state.ui.current_banner, Banner::Upgrades);
        assert!(!state.player.w_held);
        assert_eq!(state.player.dy, 0.0);

        let state = set_panel(state, Panel::None);
        assert_eq!(state.ui.current_banner, Banner::Item);
    }

    #[test]
    fn restock_panel_keeps_movement() {
        let mut state = in_game();
        state.player.a_held = true;
        let state = set_panel(state, Panel::Restock);
        assert!(state.player.a_held);
        assert_eq!(state.ui.current_banner, Banner::Restock);
    }

    #[test]
    fn toggle_panel_closes_active_panel() {
        let state = toggle_panel(in_game(), Panel::Orders);
        assert_eq!(state.panel, Panel::Orders);
        let state = toggle_panel(state, Panel::Restock);
        assert_eq!(state.panel, Panel::Restock);
        let state = toggle_panel(state, Panel::Restock);
        assert_eq!(state.panel, Panel::None);
    }

    #[test]
    fn music_stays_off_while_sound_is_muted() {
        let mut state = create_initial_state();
        state.sound_on = false;
        let state = toggle_music(state);
        assert!(!state.music_on);
        assert!(state.events.is_empty());

        let state = toggle_sounds(state);
        assert!(state.sound_on);
        let state = toggle_music(state);
        assert!(state.music_on);
        assert_eq!(state.events, vec![AudioCue::MusicStart, AudioCue::MusicStart]);

        let state = toggle_music(state);
        assert!(!state.music_on);
        assert_eq!(state.events.last(), Some(&AudioCue::MusicStop));
    }

    #[test]
    fn muting_sound_always_emits_music_stop() {
        let state = toggle_sounds(create_initial_state());
        assert!(!state.sound_on);
        assert_eq!(state.events, vec![AudioCue::MusicStop]);
        let state = play_click(state);
        assert_eq!(state.events.len(), 1);
    }

    #[test]
    fn popup_clears_only_after_expiry() {
        let mut state = create_initial_state();
        state.runtime.ms = 500;
        state.runtime.popup_until = 1_500;
        state.runtime.popup_image = Some("x.png".to_string());

        let state = validate_transient_ui(state);
        assert_eq!(state.runtime.popup_until, 1_500);

        let mut at_expiry = state.clone();
        at_expiry.runtime.ms = 1_500;
        let at_expiry = validate_transient_ui(at_expiry);
        assert!(at_expiry.runtime.popup_image.is_some());

        let mut after = at_expiry;
        after.runtime.ms = 1_516;
        let cleared = validate_transient_ui(after);
        assert_eq!(cleared.runtime.popup_until, 0);
        assert!(cleared.runtime.popup_image.is_none());
        assert_eq!(validate_transient_ui(cleared.clone()), cleared);
    }

    #[test]
    fn money_delta_shows_for_display_window() {
        let mut state = create_initial_state();
        assert!(!is_money_delta_visible(&state));
        state.player.money_delta = 7;
        state.player.money_delta_at = 1_000;
        state.runtime.ms = 2_999;
        assert!(is_money_delta_visible(&state));
        state.runtime.ms = 3_000;
        assert!(!is_money_delta_visible(&state));
    }

    #[test]
    fn reset_discards_progress() {
        let mut state = create_initial_state();
        state.player.money = 5;
        state.upgrades.energy_level = 3;
        assert_eq!(reset_game(state), create_initial_state());
    }

    #[test]
    fn reset_mid_game_stops_music() {
        let mut state = in_game();
        state.music_on = true;
        state.player.money = 5;
        let next = reset_game(state);
        assert_eq!(next.screen, Screen::Menu);
        assert_eq!(next.player.money, create_initial_state().player.money);
        assert_eq!(next.events, vec![AudioCue::MusicStop]);
    }
}
