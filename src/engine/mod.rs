use crate::rng::{RandomSource, Rng};
use crate::types::{GameState, LayoutInit, Snapshot};
use crate::world::{create_initial_state, to_layout_init};

mod customer_system;
mod economy;
mod interaction;
mod movement;
mod spawn_system;
mod ui;
mod utils;

pub use self::customer_system::move_customers;
pub use self::economy::{
    adjust_restock_amount, apply_upgrade, commit_restock, set_restock_counter, upgrade_cap,
    upgrade_cost, upgrade_level,
};
pub use self::interaction::{interact_with_active, order_matches, order_payout};
pub use self::movement::{
    collides_at, compute_player_velocity, find_active_interactable, is_in_bounds, solid_rects,
    tick_movement, update_active_interactable,
};
pub use self::spawn_system::{maybe_spawn_customer, random_order};
pub use self::ui::{
    is_money_delta_visible, play_click, reset_game, set_panel, set_screen, toggle_music,
    toggle_panel, toggle_sounds, validate_transient_ui,
};
pub use self::utils::now_ms;

/// Owns the single mutable game slot. Every step swaps the state through
/// one pure transition, so observers never see a partial update.
pub struct GameEngine {
    state: GameState,
    rng: Box<dyn RandomSource + Send>,
    tick_counter: u64,
}

impl GameEngine {
    pub fn new(state: GameState, rng: Box<dyn RandomSource + Send>) -> Self {
        Self {
            state,
            rng,
            tick_counter: 0,
        }
    }

    pub fn with_seed(seed: u32) -> Self {
        Self::new(create_initial_state(), Box::new(Rng::new(seed)))
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    pub fn tick_counter(&self) -> u64 {
        self.tick_counter
    }

    pub fn layout_init(&self) -> LayoutInit {
        to_layout_init(&self.state)
    }

    pub fn apply<F>(&mut self, transition: F)
    where
        F: FnOnce(GameState) -> GameState,
    {
        let current = std::mem::take(&mut self.state);
        self.state = transition(current);
    }

    /// Movement, collision and interactable detection, then popup expiry.
    pub fn step_movement(&mut self) {
        self.tick_counter += 1;
        self.apply(|state| validate_transient_ui(tick_movement(state)));
    }

    pub fn step_spawn(&mut self) {
        let current = std::mem::take(&mut self.state);
        self.state = maybe_spawn_customer(current, &mut self.rng);
    }

    pub fn step_customers(&mut self) {
        self.apply(move_customers);
    }

    pub fn interact(&mut self) {
        self.apply(interact_with_active);
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let state = &self.state;
        let snapshot = Snapshot {
            tick: self.tick_counter,
            now_ms: state.runtime.ms,
            screen: state.screen,
            panel: state.panel,
            sound_on: state.sound_on,
            music_on: state.music_on,
            player: state.player.clone(),
            ui: state.ui.clone(),
            upgrades: state.upgrades.clone(),
            counters: state.counters.clone(),
            prep_tables: state.prep_tables.clone(),
            chairs: state.chairs.clone(),
            customers: state.customers.clone(),
            active_interactable: state.runtime.active_interactable.clone(),
            popup_image: state.runtime.popup_image.clone(),
            popup_until: state.runtime.popup_until,
            show_money_delta: is_money_delta_visible(state),
            events: if include_events {
                state.events.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.state.events.clear();
        }
        snapshot
    }
}
