use serde::Serialize;
use serde_json::Value;

use crate::input::InputKey;
use crate::types::{LayoutInit, Panel, Screen, Snapshot, UpgradeKind};

#[derive(Debug, PartialEq)]
pub enum ParsedClientMessage {
    KeyDown { key: InputKey, repeat: bool },
    KeyUp { key: InputKey },
    SetScreen { screen: Screen },
    SetPanel { panel: Panel },
    TogglePanel { panel: Panel },
    SelectRestock { counter_id: String },
    AdjustRestock { delta: i64 },
    CommitRestock,
    Upgrade { kind: UpgradeKind },
    ToggleSounds,
    ToggleMusic,
    Hover,
    Reset,
    Ping { t: f64 },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        layout: LayoutInit,
        snapshot: Snapshot,
    },
    State {
        snapshot: Snapshot,
    },
    Pong {
        t: f64,
    },
    Error {
        message: String,
    },
}

pub fn parse_client_message(raw: &str) -> Option<ParsedClientMessage> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;
    let message_type = object.get("type")?.as_str()?;

    match message_type {
        "key_down" => {
            let key = InputKey::parse(object.get("key")?.as_str()?)?;
            let repeat = match object.get("repeat") {
                None => false,
                Some(value) => value.as_bool()?,
            };
            Some(ParsedClientMessage::KeyDown { key, repeat })
        }
        "key_up" => {
            let key = InputKey::parse(object.get("key")?.as_str()?)?;
            Some(ParsedClientMessage::KeyUp { key })
        }
        "set_screen" => {
            let screen = Screen::parse(object.get("screen")?.as_str()?)?;
            Some(ParsedClientMessage::SetScreen { screen })
        }
        "set_panel" => {
            let panel = Panel::parse(object.get("panel")?.as_str()?)?;
            Some(ParsedClientMessage::SetPanel { panel })
        }
        "toggle_panel" => {
            let panel = Panel::parse(object.get("panel")?.as_str()?)?;
            Some(ParsedClientMessage::TogglePanel { panel })
        }
        "select_restock" => {
            let counter_id = object.get("counterId")?.as_str()?.trim();
            if counter_id.is_empty() {
                return None;
            }
            Some(ParsedClientMessage::SelectRestock {
                counter_id: counter_id.to_string(),
            })
        }
        "adjust_restock" => {
            let delta = parse_i64(object.get("delta")?)?;
            Some(ParsedClientMessage::AdjustRestock { delta })
        }
        "commit_restock" => Some(ParsedClientMessage::CommitRestock),
        "upgrade" => {
            let kind = UpgradeKind::parse(object.get("kind")?.as_str()?)?;
            Some(ParsedClientMessage::Upgrade { kind })
        }
        "toggle_sounds" => Some(ParsedClientMessage::ToggleSounds),
        "toggle_music" => Some(ParsedClientMessage::ToggleMusic),
        "hover" => Some(ParsedClientMessage::Hover),
        "reset" => Some(ParsedClientMessage::Reset),
        "ping" => {
            let t = object.get("t")?.as_f64()?;
            if !t.is_finite() {
                return None;
            }
            Some(ParsedClientMessage::Ping { t })
        }
        _ => None,
    }
}

/// Integral JSON numbers only; floats are floored and rejected past the
/// exactly-representable range.
fn parse_i64(value: &Value) -> Option<i64> {
    const MAX_SAFE_INTEGER_F64: f64 = 9_007_199_254_740_991.0;

    if let Some(number) = value.as_i64() {
        return Some(number);
    }
    if value.is_u64() {
        return None;
    }
    let number = value.as_f64()?;
    if !number.is_finite() {
        return None;
    }
    let floored = number.floor();
    if floored.abs() > MAX_SAFE_INTEGER_F64 {
        return None;
    }
    Some(floored as i64)
}
