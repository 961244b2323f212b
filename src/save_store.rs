use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::types::{
    Banner, ChairState, CounterState, CustomerState, GameState, HeldItem, Panel, PlayerState,
    PrepTableState, RuntimeState, Screen, UpgradeState,
};
use crate::world::create_initial_state;

const SAVE_FORMAT_VERSION: u8 = 1;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("i/o failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed save file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported save version {version} in {path}")]
    UnsupportedVersion { path: PathBuf, version: u8 },
}

/// The persisted slice of a [`GameState`]. Screen, panel, banner and every
/// transient runtime field are left out and restored to defaults on load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedProgress {
    #[serde(rename = "soundOn")]
    pub sound_on: bool,
    #[serde(rename = "musicOn")]
    pub music_on: bool,
    pub player: PlayerState,
    pub counters: Vec<CounterState>,
    #[serde(rename = "prepTables")]
    pub prep_tables: Vec<PrepTableState>,
    pub chairs: Vec<ChairState>,
    pub customers: Vec<CustomerState>,
    pub runtime: RuntimeState,
    pub upgrades: UpgradeState,
}

impl SavedProgress {
    pub fn from_state(state: &GameState) -> Self {
        let mut player = state.player.clone();
        clear_transient_player(&mut player);
        player.held_item = HeldItem::Empty;

        let mut runtime = state.runtime.clone();
        clear_transient_runtime(&mut runtime);

        Self {
            sound_on: state.sound_on,
            music_on: state.music_on,
            player,
            counters: state.counters.clone(),
            prep_tables: state.prep_tables.clone(),
            chairs: state.chairs.clone(),
            customers: state.customers.clone(),
            runtime,
            upgrades: state.upgrades.clone(),
        }
    }

    /// Overlay saved progress on `base`, forcing the menu screen and wiping
    /// anything transient regardless of what the file held.
    pub fn merge_into(self, base: GameState) -> GameState {
        let mut state = base;
        state.sound_on = self.sound_on;
        state.music_on = self.music_on;
        state.player = self.player;
        clear_transient_player(&mut state.player);
        state.counters = self.counters;
        state.prep_tables = self.prep_tables;
        state.chairs = self.chairs;
        state.customers = self.customers;
        state.runtime = self.runtime;
        clear_transient_runtime(&mut state.runtime);
        if state.runtime.next_customer_id == 0 {
            state.runtime.next_customer_id = next_free_customer_id(&state.customers);
        }
        state.upgrades = self.upgrades;

        state.screen = Screen::Menu;
        state.panel = Panel::None;
        state.ui.current_banner = Banner::Item;
        state.events.clear();
        state
    }
}

fn clear_transient_player(player: &mut PlayerState) {
    player.dx = 0.0;
    player.dy = 0.0;
    player.w_held = false;
    player.a_held = false;
    player.s_held = false;
    player.d_held = false;
    player.money_delta = 0;
    player.money_delta_at = 0;
}

fn clear_transient_runtime(runtime: &mut RuntimeState) {
    runtime.active_interactable = None;
    runtime.popup_until = 0;
    runtime.popup_image = None;
}

/// Saves written before ids were counted carry no counter; resume past the
/// highest numeric suffix in use.
fn next_free_customer_id(customers: &[CustomerState]) -> u64 {
    customers
        .iter()
        .filter_map(|customer| customer.id.strip_prefix("customer-"))
        .filter_map(|suffix| suffix.parse::<u64>().ok())
        .max()
        .map_or(1, |value| value + 1)
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct SaveFile {
    version: u8,
    #[serde(rename = "savedAtIso")]
    saved_at_iso: String,
    state: SavedProgress,
}

#[derive(Clone, Debug, Deserialize)]
struct SaveFileRaw {
    version: u8,
    state: serde_json::Value,
}

pub struct SaveStore {
    file_path: PathBuf,
}

impl SaveStore {
    pub fn new(file_path: PathBuf) -> Self {
        Self { file_path }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// `Ok(None)` when no save exists yet.
    pub fn load(&self) -> Result<Option<SavedProgress>, SaveError> {
        let text = match fs::read_to_string(&self.file_path) {
            Ok(value) => value,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SaveError::Io {
                    path: self.file_path.clone(),
                    source,
                })
            }
        };
        let parse_error = |source| SaveError::Parse {
            path: self.file_path.clone(),
            source,
        };
        let raw: SaveFileRaw = serde_json::from_str(&text).map_err(parse_error)?;
        if raw.version != SAVE_FORMAT_VERSION {
            return Err(SaveError::UnsupportedVersion {
                path: self.file_path.clone(),
                version: raw.version,
            });
        }
        let progress = serde_json::from_value(raw.state).map_err(parse_error)?;
        Ok(Some(progress))
    }

    /// Fresh state merged with whatever progress the file holds. Any
    /// failure is logged and yields a clean bootstrap.
    pub fn load_or_fresh(&self) -> GameState {
        let fresh = create_initial_state();
        match self.load() {
            Ok(Some(progress)) => {
                debug!(path = %self.file_path.display(), "restored saved progress");
                progress.merge_into(fresh)
            }
            Ok(None) => fresh,
            Err(error) => {
                warn!(%error, "discarding unreadable save");
                fresh
            }
        }
    }

    pub fn save(&self, state: &GameState) -> Result<(), SaveError> {
        let io_error = |source| SaveError::Io {
            path: self.file_path.clone(),
            source,
        };
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_error)?;
            }
        }

        let payload = SaveFile {
            version: SAVE_FORMAT_VERSION,
            saved_at_iso: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            state: SavedProgress::from_state(state),
        };
        let text = serde_json::to_string_pretty(&payload).map_err(|source| SaveError::Parse {
            path: self.file_path.clone(),
            source,
        })?;
        fs::write(&self.file_path, text).map_err(io_error)
    }
}
