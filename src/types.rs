use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    #[default]
    Menu,
    Instructions,
    Game,
}

impl Screen {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "menu" => Some(Self::Menu),
            "instructions" => Some(Self::Instructions),
            "game" => Some(Self::Game),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    #[default]
    None,
    Restock,
    Orders,
    Upgrades,
}

impl Panel {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "restock" => Some(Self::Restock),
            "orders" => Some(Self::Orders),
            "upgrades" => Some(Self::Upgrades),
            _ => None,
        }
    }

    pub fn banner(self) -> Banner {
        match self {
            Self::None => Banner::Item,
            Self::Restock => Banner::Restock,
            Self::Orders => Banner::Orders,
            Self::Upgrades => Banner::Upgrades,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Banner {
    #[default]
    Item,
    Restock,
    Orders,
    Upgrades,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractableKind {
    Counter,
    PrepTable,
    Trashbin,
    Chair,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeKind {
    Advertisement,
    Energy,
    Cuteness,
    Meowmax,
}

impl UpgradeKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "advertisement" => Some(Self::Advertisement),
            "energy" => Some(Self::Energy),
            "cuteness" => Some(Self::Cuteness),
            "meowmax" => Some(Self::Meowmax),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKey {
    Cup,
    Boba,
    Jelly,
    Milk,
    Grapefruit,
    Greentea,
    Lychee,
    Mango,
    Sugar,
    Ice,
}

/// Audio triggers handed to the host; the engine never plays sound itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioCue {
    MeowHappy,
    MeowAngry,
    Click,
    MusicStart,
    MusicStop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Strict overlap; touching edges do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub key: ItemKey,
    pub cost: i64,
    pub image: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CupItem {
    pub image: String,
    pub ingredients: Vec<ItemKey>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeldItem {
    #[default]
    Empty,
    Ingredient {
        key: ItemKey,
        image: String,
    },
    Cup(CupItem),
}

impl HeldItem {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CounterState {
    pub id: String,
    #[serde(rename = "itemKey")]
    pub item_key: ItemKey,
    pub stock: u32,
    pub rect: Rect,
    #[serde(rename = "hitBox")]
    pub hit_box: Rect,
    #[serde(rename = "popupDirection")]
    pub popup_direction: Direction,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrepTableState {
    pub id: String,
    pub rect: Rect,
    #[serde(rename = "hitBox")]
    pub hit_box: Rect,
    #[serde(rename = "popupDirection")]
    pub popup_direction: Direction,
    pub cup: Option<CupItem>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrashbinState {
    pub id: String,
    pub rect: Rect,
    #[serde(rename = "hitBox")]
    pub hit_box: Rect,
    #[serde(rename = "popupDirection")]
    pub popup_direction: Direction,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChairState {
    pub id: String,
    pub rect: Rect,
    #[serde(rename = "collisionRect")]
    pub collision_rect: Rect,
    #[serde(rename = "hitBox")]
    pub hit_box: Rect,
    #[serde(rename = "popupDirection")]
    pub popup_direction: Direction,
    #[serde(rename = "chairRight")]
    pub chair_right: bool,
    pub route: Vec<Vec2>,
    #[serde(rename = "customerId")]
    pub customer_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecorState {
    pub id: String,
    pub image: String,
    pub rect: Rect,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerState {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub seated: bool,
    pub leaving: bool,
    #[serde(rename = "chairId")]
    pub chair_id: String,
    #[serde(rename = "currentTarget")]
    pub current_target: usize,
    pub direction: Direction,
    pub order: Vec<ItemKey>,
    #[serde(rename = "seatNumber")]
    pub seat_number: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub speed: f32,
    pub direction: Direction,
    #[serde(rename = "wHeld")]
    pub w_held: bool,
    #[serde(rename = "aHeld")]
    pub a_held: bool,
    #[serde(rename = "sHeld")]
    pub s_held: bool,
    #[serde(rename = "dHeld")]
    pub d_held: bool,
    #[serde(rename = "heldItem")]
    pub held_item: HeldItem,
    pub money: i64,
    pub tips: i64,
    #[serde(rename = "moneyDelta")]
    pub money_delta: i64,
    #[serde(rename = "moneyDeltaAt")]
    pub money_delta_at: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeState {
    #[serde(rename = "advertisementLevel")]
    pub advertisement_level: u32,
    #[serde(rename = "energyLevel")]
    pub energy_level: u32,
    #[serde(rename = "cutenessLevel")]
    pub cuteness_level: u32,
    #[serde(rename = "meowmaxLevel")]
    pub meowmax_level: u32,
    #[serde(rename = "advertisementCost")]
    pub advertisement_cost: i64,
    #[serde(rename = "energyCost")]
    pub energy_cost: i64,
    #[serde(rename = "cutenessCost")]
    pub cuteness_cost: i64,
    #[serde(rename = "meowmaxCost")]
    pub meowmax_cost: i64,
    #[serde(rename = "maxLevel")]
    pub max_level: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveInteractable {
    pub kind: InteractableKind,
    pub id: String,
    #[serde(rename = "popupDirection")]
    pub popup_direction: Direction,
    pub rect: Rect,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeState {
    pub ms: u64,
    #[serde(rename = "customerChance")]
    pub customer_chance: u32,
    #[serde(rename = "chanceDivisor")]
    pub chance_divisor: f64,
    #[serde(rename = "popupUntil")]
    pub popup_until: u64,
    #[serde(rename = "popupImage")]
    pub popup_image: Option<String>,
    #[serde(rename = "activeInteractable")]
    pub active_interactable: Option<ActiveInteractable>,
    #[serde(rename = "nextCustomerId", default)]
    pub next_customer_id: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    #[serde(rename = "currentBanner")]
    pub current_banner: Banner,
    #[serde(rename = "restockCounterId")]
    pub restock_counter_id: String,
    #[serde(rename = "restockAmount")]
    pub restock_amount: u32,
}

/// The single aggregate every transition consumes and returns.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub screen: Screen,
    pub panel: Panel,
    #[serde(rename = "soundOn")]
    pub sound_on: bool,
    #[serde(rename = "musicOn")]
    pub music_on: bool,
    pub player: PlayerState,
    pub runtime: RuntimeState,
    pub ui: UiState,
    pub upgrades: UpgradeState,
    pub items: BTreeMap<ItemKey, ItemDefinition>,
    pub counters: Vec<CounterState>,
    #[serde(rename = "prepTables")]
    pub prep_tables: Vec<PrepTableState>,
    pub trashbins: Vec<TrashbinState>,
    pub chairs: Vec<ChairState>,
    pub decorations: Vec<DecorState>,
    pub walls: Vec<Rect>,
    pub customers: Vec<CustomerState>,
    /// Pending audio cues; drained by the host, never persisted.
    #[serde(skip)]
    pub events: Vec<AudioCue>,
}

impl GameState {
    pub fn item(&self, key: ItemKey) -> Option<&ItemDefinition> {
        self.items.get(&key)
    }

    pub fn counter(&self, id: &str) -> Option<&CounterState> {
        self.counters.iter().find(|counter| counter.id == id)
    }

    pub fn chair(&self, id: &str) -> Option<&ChairState> {
        self.chairs.iter().find(|chair| chair.id == id)
    }

    pub fn customer(&self, id: &str) -> Option<&CustomerState> {
        self.customers.iter().find(|customer| customer.id == id)
    }

    /// Queue a cue if sound is enabled.
    pub fn cue(&mut self, cue: AudioCue) {
        if self.sound_on {
            self.events.push(cue);
        }
    }
}

/// Static geometry sent once per connection.
#[derive(Clone, Debug, Serialize)]
pub struct LayoutInit {
    pub width: f32,
    pub height: f32,
    #[serde(rename = "playerSize")]
    pub player_size: f32,
    pub items: Vec<ItemDefinition>,
    pub decorations: Vec<DecorState>,
    pub walls: Vec<Rect>,
    pub trashbins: Vec<TrashbinState>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "nowMs")]
    pub now_ms: u64,
    pub screen: Screen,
    pub panel: Panel,
    #[serde(rename = "soundOn")]
    pub sound_on: bool,
    #[serde(rename = "musicOn")]
    pub music_on: bool,
    pub player: PlayerState,
    pub ui: UiState,
    pub upgrades: UpgradeState,
    pub counters: Vec<CounterState>,
    #[serde(rename = "prepTables")]
    pub prep_tables: Vec<PrepTableState>,
    pub chairs: Vec<ChairState>,
    pub customers: Vec<CustomerState>,
    #[serde(rename = "activeInteractable")]
    pub active_interactable: Option<ActiveInteractable>,
    #[serde(rename = "popupImage")]
    pub popup_image: Option<String>,
    #[serde(rename = "popupUntil")]
    pub popup_until: u64,
    #[serde(rename = "showMoneyDelta")]
    pub show_money_delta: bool,
    pub events: Vec<AudioCue>,
}
