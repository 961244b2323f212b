use crate::constants::{
    ADVERTISEMENT_COST_STEP, CUTENESS_COST_STEP, ENERGY_COST_STEP, ENERGY_SPEED_STEP,
    MEOWMAX_CAP_BONUS, MEOWMAX_COST_STEP, MEOWMAX_LEVEL_CAP,
};
use crate::types::{GameState, UpgradeKind};

pub fn set_restock_counter(state: GameState, counter_id: &str) -> GameState {
    let mut state = state;
    state.ui.restock_counter_id = counter_id.to_string();
    state.ui.restock_amount = 0;
    state
}

pub fn adjust_restock_amount(state: GameState, delta: i64) -> GameState {
    let mut state = state;
    let next = (state.ui.restock_amount as i64).saturating_add(delta).max(0);
    state.ui.restock_amount = u32::try_from(next).unwrap_or(u32::MAX);
    state
}

pub fn commit_restock(state: GameState) -> GameState {
    let amount = state.ui.restock_amount;
    if amount == 0 {
        return state;
    }
    let Some(counter_idx) = state
        .counters
        .iter()
        .position(|counter| counter.id == state.ui.restock_counter_id)
    else {
        return state;
    };
    let Some(item) = state.item(state.counters[counter_idx].item_key) else {
        return state;
    };
    let Some(cost) = item.cost.checked_mul(amount as i64) else {
        return state;
    };
    if state.player.money < cost {
        return state;
    }
    let Some(stock) = state.counters[counter_idx].stock.checked_add(amount) else {
        return state;
    };

    let mut state = state;
    state.counters[counter_idx].stock = stock;
    state.player.money -= cost;
    state.ui.restock_amount = 0;
    state
}

/// Level cap for a track. Meowmax has its own fixed cap; the others share
/// `max_level`, which meowmax purchases raise.
pub fn upgrade_cap(state: &GameState, kind: UpgradeKind) -> u32 {
    match kind {
        UpgradeKind::Meowmax => MEOWMAX_LEVEL_CAP,
        _ => state.upgrades.max_level,
    }
}

pub fn upgrade_level(state: &GameState, kind: UpgradeKind) -> u32 {
    let upgrades = &state.upgrades;
    match kind {
        UpgradeKind::Advertisement => upgrades.advertisement_level,
        UpgradeKind::Energy => upgrades.energy_level,
        UpgradeKind::Cuteness => upgrades.cuteness_level,
        UpgradeKind::Meowmax => upgrades.meowmax_level,
    }
}

pub fn upgrade_cost(state: &GameState, kind: UpgradeKind) -> i64 {
    let upgrades = &state.upgrades;
    match kind {
        UpgradeKind::Advertisement => upgrades.advertisement_cost,
        UpgradeKind::Energy => upgrades.energy_cost,
        UpgradeKind::Cuteness => upgrades.cuteness_cost,
        UpgradeKind::Meowmax => upgrades.meowmax_cost,
    }
}

pub fn apply_upgrade(state: GameState, kind: UpgradeKind) -> GameState {
    let cost = upgrade_cost(&state, kind);
    let level = upgrade_level(&state, kind);
    if state.player.money < cost || level >= upgrade_cap(&state, kind) {
        return state;
    }

    let mut state = state;
    state.player.money -= cost;
    let upgrades = &mut state.upgrades;
    match kind {
        UpgradeKind::Advertisement => {
            // Uses the level held before this purchase.
            state.runtime.chance_divisor = 1.0 + (level as f64).powf(1.1) / 10.0;
            upgrades.advertisement_level += 1;
            upgrades.advertisement_cost += ADVERTISEMENT_COST_STEP;
        }
        UpgradeKind::Energy => {
            state.player.speed += ENERGY_SPEED_STEP;
            upgrades.energy_level += 1;
            upgrades.energy_cost += ENERGY_COST_STEP;
        }
        UpgradeKind::Cuteness => {
            state.player.tips += 1;
            upgrades.cuteness_level += 1;
            upgrades.cuteness_cost += CUTENESS_COST_STEP;
        }
        UpgradeKind::Meowmax => {
            upgrades.meowmax_level += 1;
            upgrades.meowmax_cost += MEOWMAX_COST_STEP;
            upgrades.max_level += MEOWMAX_CAP_BONUS;
        }
    }
    state
}
