use std::collections::BTreeMap;

use crate::constants::{
    chair_collision_rect, hit_box, CHAIR_LAYOUT, CHAIR_SIZE, COUNTER_LAYOUT, COUNTER_SIZE,
    DECORATIONS, GAME_HEIGHT, GAME_WIDTH, INITIAL_CUSTOMER_CHANCE, INITIAL_MAX_LEVEL,
    PLAYER_BASE_SPEED, PLAYER_SIZE, PLAYER_START_X, PLAYER_START_Y, PREP_TABLE_LAYOUT,
    STARTING_MONEY, TRASHBIN_LAYOUT, WALLS,
};
use crate::types::{
    Banner, ChairState, CounterState, DecorState, Direction, GameState, HeldItem, ItemDefinition,
    ItemKey, LayoutInit, Panel, PlayerState, PrepTableState, Rect, RuntimeState, Screen,
    TrashbinState, UiState, UpgradeState,
};

fn asset(file: &str) -> String {
    format!("/assets/{file}")
}

pub fn create_item_definitions() -> BTreeMap<ItemKey, ItemDefinition> {
    let defs = [
        (ItemKey::Cup, 1, "emptyCup.png"),
        (ItemKey::Boba, 2, "boba.png"),
        (ItemKey::Jelly, 2, "jelly.png"),
        (ItemKey::Milk, 2, "milk.png"),
        (ItemKey::Grapefruit, 2, "grapefruit.png"),
        (ItemKey::Greentea, 2, "greentea.png"),
        (ItemKey::Lychee, 2, "lychee.png"),
        (ItemKey::Mango, 2, "mango.png"),
        (ItemKey::Sugar, 1, "sugar.png"),
        (ItemKey::Ice, 1, "ice.png"),
    ];
    defs.into_iter()
        .map(|(key, cost, file)| {
            (
                key,
                ItemDefinition {
                    key,
                    cost,
                    image: asset(file),
                },
            )
        })
        .collect()
}

pub fn build_counters() -> Vec<CounterState> {
    COUNTER_LAYOUT
        .iter()
        .map(|def| CounterState {
            id: def.id.to_string(),
            item_key: def.item_key,
            stock: def.stock,
            rect: Rect::new(def.x, def.y, COUNTER_SIZE, COUNTER_SIZE),
            hit_box: hit_box(def.x, def.y, COUNTER_SIZE, COUNTER_SIZE, def.hx, def.hy),
            popup_direction: def.popup_direction,
        })
        .collect()
}

pub fn build_prep_tables() -> Vec<PrepTableState> {
    PREP_TABLE_LAYOUT
        .iter()
        .map(|&(id, x, y, size, popup_direction)| PrepTableState {
            id: id.to_string(),
            rect: Rect::new(x, y, size, size),
            hit_box: hit_box(x, y, size, size, 10.0, 10.0),
            popup_direction,
            cup: None,
        })
        .collect()
}

pub fn build_trashbins() -> Vec<TrashbinState> {
    TRASHBIN_LAYOUT
        .iter()
        .map(|&(id, x, y, size, popup_direction)| TrashbinState {
            id: id.to_string(),
            rect: Rect::new(x, y, size, size),
            hit_box: hit_box(x, y, size, size, 10.0, 10.0),
            popup_direction,
        })
        .collect()
}

pub fn build_chairs() -> Vec<ChairState> {
    CHAIR_LAYOUT
        .iter()
        .map(|def| ChairState {
            id: def.id.to_string(),
            rect: Rect::new(def.x, def.y, CHAIR_SIZE, CHAIR_SIZE),
            collision_rect: chair_collision_rect(def.x, def.y),
            hit_box: hit_box(def.x, def.y, CHAIR_SIZE, CHAIR_SIZE, 10.0, 10.0),
            popup_direction: Direction::Up,
            chair_right: def.chair_right,
            route: def.route.to_vec(),
            customer_id: None,
        })
        .collect()
}

pub fn build_decorations() -> Vec<DecorState> {
    DECORATIONS
        .iter()
        .map(|&(id, image, rect)| DecorState {
            id: id.to_string(),
            image: image.to_string(),
            rect,
        })
        .collect()
}

pub fn create_initial_state() -> GameState {
    GameState {
        screen: Screen::Menu,
        panel: Panel::None,
        sound_on: true,
        music_on: false,
        player: PlayerState {
            x: PLAYER_START_X,
            y: PLAYER_START_Y,
            dx: 0.0,
            dy: 0.0,
            speed: PLAYER_BASE_SPEED,
            direction: Direction::Down,
            w_held: false,
            a_held: false,
            s_held: false,
            d_held: false,
            held_item: HeldItem::Empty,
            money: STARTING_MONEY,
            tips: 0,
            money_delta: 0,
            money_delta_at: 0,
        },
        runtime: RuntimeState {
            ms: 0,
            customer_chance: INITIAL_CUSTOMER_CHANCE,
            chance_divisor: 1.0,
            popup_until: 0,
            popup_image: None,
            active_interactable: None,
            next_customer_id: 1,
        },
        ui: UiState {
            current_banner: Banner::Item,
            restock_counter_id: "counter-cup".to_string(),
            restock_amount: 0,
        },
        upgrades: UpgradeState {
            advertisement_level: 0,
            energy_level: 0,
            cuteness_level: 0,
            meowmax_level: 0,
            advertisement_cost: 20,
            energy_cost: 10,
            cuteness_cost: 50,
            meowmax_cost: 100,
            max_level: INITIAL_MAX_LEVEL,
        },
        items: create_item_definitions(),
        counters: build_counters(),
        prep_tables: build_prep_tables(),
        trashbins: build_trashbins(),
        chairs: build_chairs(),
        decorations: build_decorations(),
        walls: WALLS.to_vec(),
        customers: Vec::new(),
        events: Vec::new(),
    }
}

pub fn to_layout_init(state: &GameState) -> LayoutInit {
    LayoutInit {
        width: GAME_WIDTH,
        height: GAME_HEIGHT,
        player_size: PLAYER_SIZE,
        items: state.items.values().cloned().collect(),
        decorations: state.decorations.clone(),
        walls: state.walls.clone(),
        trashbins: state.trashbins.clone(),
    }
}
