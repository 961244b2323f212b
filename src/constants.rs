use crate::types::{Direction, ItemKey, Rect, Vec2};

pub const GAME_WIDTH: f32 = 1000.0;
pub const GAME_HEIGHT: f32 = 700.0;
pub const PLAYER_SIZE: f32 = 40.0;

pub const FRAME_TIME_MS: u64 = 16;
pub const MOVEMENT_TICK_MS: u64 = 16;
pub const SPAWN_TICK_MS: u64 = 1_350;
pub const CUSTOMER_TICK_MS: u64 = 10;

pub const POPUP_DURATION_MS: u64 = 1_000;
pub const MONEY_DELTA_DISPLAY_MS: u64 = 2_000;
pub const SLIDE_FACTOR: f32 = 0.1;

pub const PLAYER_START_X: f32 = 100.0;
pub const PLAYER_START_Y: f32 = 100.0;
pub const PLAYER_BASE_SPEED: f32 = 2.2;
pub const STARTING_MONEY: i64 = 1_000;

pub const CUSTOMER_SIZE: i32 = 40;
pub const CUSTOMER_ENTRY: Vec2 = Vec2 { x: 980, y: 180 };

pub const INITIAL_CUSTOMER_CHANCE: u32 = 10;
pub const CUSTOMER_CHANCE_DECAY: f64 = 1.08;
pub const CUSTOMER_CHANCE_PER_OCCUPANT: u32 = 100;

pub const ORDER_PAYOUT_MULTIPLIER: f64 = 1.5;
pub const ORDER_MISMATCH_PENALTY: i64 = 3;

pub const INITIAL_MAX_LEVEL: u32 = 5;
pub const MEOWMAX_LEVEL_CAP: u32 = 2;
pub const MEOWMAX_CAP_BONUS: u32 = 3;
pub const ADVERTISEMENT_COST_STEP: i64 = 5;
pub const ENERGY_COST_STEP: i64 = 5;
pub const CUTENESS_COST_STEP: i64 = 15;
pub const MEOWMAX_COST_STEP: i64 = 100;
pub const ENERGY_SPEED_STEP: f32 = 0.2;

pub const INSUFFICIENT_MESSAGE_IMAGE: &str = "/assets/insufficientMessage.png";
pub const EMPTY_CUP_IMAGE: &str = "/assets/emptyCup.png";
pub const FILLED_CUP_IMAGE: &str = "/assets/filledCup.png";

pub const LIQUIDS: [ItemKey; 5] = [
    ItemKey::Milk,
    ItemKey::Grapefruit,
    ItemKey::Greentea,
    ItemKey::Lychee,
    ItemKey::Mango,
];
pub const TOPPINGS: [ItemKey; 2] = [ItemKey::Boba, ItemKey::Jelly];

/// Rectangle grown by `hx`/`hy` on each side.
pub fn hit_box(x: f32, y: f32, w: f32, h: f32, hx: f32, hy: f32) -> Rect {
    Rect::new(x - hx, y - hy, w + hx * 2.0, h + hy * 2.0)
}

pub struct CounterDef {
    pub id: &'static str,
    pub item_key: ItemKey,
    pub x: f32,
    pub y: f32,
    pub hx: f32,
    pub hy: f32,
    pub popup_direction: Direction,
    pub stock: u32,
}

pub const COUNTER_SIZE: f32 = 75.0;

pub const COUNTER_LAYOUT: [CounterDef; 10] = [
    counter("counter-cup", ItemKey::Cup, 235.0, 150.0, 10.0, 10.0, Direction::Up, 3),
    counter("counter-boba", ItemKey::Boba, 150.0, 0.0, 0.0, 10.0, Direction::Down, 1),
    counter("counter-milk", ItemKey::Milk, 225.0, 0.0, 0.0, 10.0, Direction::Down, 1),
    counter("counter-sugar", ItemKey::Sugar, 300.0, 0.0, 0.0, 10.0, Direction::Down, 2),
    counter("counter-ice", ItemKey::Ice, 0.0, 225.0, 10.0, 0.0, Direction::Right, 2),
    counter("counter-grapefruit", ItemKey::Grapefruit, 0.0, 75.0, 10.0, 0.0, Direction::Right, 1),
    counter("counter-greentea", ItemKey::Greentea, 0.0, 150.0, 10.0, 0.0, Direction::Right, 1),
    counter("counter-jelly", ItemKey::Jelly, 150.0, 300.0, 0.0, 10.0, Direction::Up, 1),
    counter("counter-lychee", ItemKey::Lychee, 225.0, 300.0, 0.0, 10.0, Direction::Up, 1),
    counter("counter-mango", ItemKey::Mango, 300.0, 300.0, 0.0, 10.0, Direction::Up, 1),
];

#[allow(clippy::too_many_arguments)]
const fn counter(
    id: &'static str,
    item_key: ItemKey,
    x: f32,
    y: f32,
    hx: f32,
    hy: f32,
    popup_direction: Direction,
    stock: u32,
) -> CounterDef {
    CounterDef {
        id,
        item_key,
        x,
        y,
        hx,
        hy,
        popup_direction,
        stock,
    }
}

/// (id, x, y, size, popup direction); hit-box padding is 10 on every side.
pub const PREP_TABLE_LAYOUT: [(&str, f32, f32, f32, Direction); 2] = [
    ("prep-1", 150.0, 150.0, 75.0, Direction::Up),
    ("prep-2", 320.0, 150.0, 75.0, Direction::Up),
];

pub const TRASHBIN_LAYOUT: [(&str, f32, f32, f32, Direction); 2] = [
    ("trash-1", 0.0, 325.0, 50.0, Direction::Right),
    ("trash-2", 75.0, 0.0, 50.0, Direction::Down),
];

pub const CHAIR_SIZE: f32 = 75.0;

pub struct ChairDef {
    pub id: &'static str,
    pub x: f32,
    pub y: f32,
    pub chair_right: bool,
    pub route: &'static [Vec2],
}

const fn wp(x: i32, y: i32) -> Vec2 {
    Vec2 { x, y }
}

pub const CHAIR_LAYOUT: [ChairDef; 8] = [
    ChairDef {
        id: "chair-1",
        x: 575.0,
        y: 385.0,
        chair_right: false,
        route: &[wp(980, 180), wp(900, 180), wp(900, 350), wp(600, 350), wp(600, 380)],
    },
    ChairDef {
        id: "chair-2",
        x: 675.0,
        y: 385.0,
        chair_right: false,
        route: &[wp(980, 180), wp(900, 180), wp(900, 350), wp(700, 350), wp(700, 380)],
    },
    ChairDef {
        id: "chair-3",
        x: 775.0,
        y: 385.0,
        chair_right: true,
        route: &[wp(980, 180), wp(900, 180), wp(900, 350), wp(800, 350), wp(800, 380)],
    },
    ChairDef {
        id: "chair-4",
        x: 875.0,
        y: 385.0,
        chair_right: true,
        route: &[wp(980, 180), wp(900, 180), wp(900, 350), wp(900, 380)],
    },
    ChairDef {
        id: "chair-5",
        x: 625.0,
        y: 62.0,
        chair_right: false,
        route: &[wp(980, 180), wp(620, 180), wp(620, 100)],
    },
    ChairDef {
        id: "chair-6",
        x: 800.0,
        y: 62.0,
        chair_right: true,
        route: &[wp(980, 180), wp(850, 180), wp(850, 100)],
    },
    ChairDef {
        id: "chair-7",
        x: 625.0,
        y: 242.0,
        chair_right: false,
        route: &[wp(980, 180), wp(620, 180), wp(620, 260)],
    },
    ChairDef {
        id: "chair-8",
        x: 800.0,
        y: 242.0,
        chair_right: true,
        route: &[wp(980, 180), wp(850, 180), wp(850, 260)],
    },
];

/// Chair collision rect relative to the seat: inset (10, 13), size 55x60.
pub fn chair_collision_rect(x: f32, y: f32) -> Rect {
    Rect::new(x + 10.0, y + 13.0, 55.0, 60.0)
}

pub const DECORATIONS: [(&str, &str, Rect); 3] = [
    ("long-table", "/assets/longTable.png", Rect::new(575.0, 475.0, 400.0, 100.0)),
    ("table-1", "/assets/table.png", Rect::new(700.0, 50.0, 100.0, 100.0)),
    ("table-2", "/assets/table.png", Rect::new(700.0, 230.0, 100.0, 100.0)),
];

pub const WALLS: [Rect; 4] = [
    Rect::new(0.0, 423.0, 450.0, 4.0),
    Rect::new(448.0, 75.0, 4.0, 275.0),
    Rect::new(448.0, 425.0, 4.0, 165.0),
    Rect::new(450.0, 588.0, 550.0, 4.0),
];
