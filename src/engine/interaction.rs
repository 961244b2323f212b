use crate::constants::{
    CUSTOMER_SIZE, EMPTY_CUP_IMAGE, FILLED_CUP_IMAGE, INSUFFICIENT_MESSAGE_IMAGE,
    ORDER_MISMATCH_PENALTY, ORDER_PAYOUT_MULTIPLIER, POPUP_DURATION_MS,
};
use crate::types::{AudioCue, CupItem, GameState, HeldItem, InteractableKind, ItemKey};

pub fn create_cup() -> CupItem {
    CupItem {
        image: EMPTY_CUP_IMAGE.to_string(),
        ingredients: Vec::new(),
    }
}

/// Re-derive the cup artwork from whether it holds anything.
pub fn with_cup_image(cup: CupItem) -> CupItem {
    let image = if cup.ingredients.is_empty() {
        EMPTY_CUP_IMAGE
    } else {
        FILLED_CUP_IMAGE
    };
    CupItem {
        image: image.to_string(),
        ..cup
    }
}

/// Multiset equality: ingredient order is irrelevant, counts must agree.
pub fn order_matches(expected: &[ItemKey], actual: &[ItemKey]) -> bool {
    if expected.len() != actual.len() {
        return false;
    }
    let mut expected = expected.to_vec();
    let mut actual = actual.to_vec();
    expected.sort_unstable();
    actual.sort_unstable();
    expected == actual
}

/// `floor(1.5 * (1 + sum of ingredient costs))`, or `None` if an
/// ingredient is missing from the catalog.
pub fn order_payout(state: &GameState, order: &[ItemKey]) -> Option<i64> {
    let mut total = 1;
    for key in order {
        total += state.item(*key)?.cost;
    }
    Some((total as f64 * ORDER_PAYOUT_MULTIPLIER).trunc() as i64)
}

pub fn interact_with_active(state: GameState) -> GameState {
    let Some(target) = state.runtime.active_interactable.clone() else {
        return state;
    };
    match target.kind {
        InteractableKind::Counter => interact_counter(state, &target.id),
        InteractableKind::PrepTable => interact_prep_table(state, &target.id),
        InteractableKind::Trashbin => interact_trashbin(state),
        InteractableKind::Chair => interact_chair(state, &target.id),
    }
}

fn interact_counter(state: GameState, counter_id: &str) -> GameState {
    if !state.player.held_item.is_empty() {
        return state;
    }
    let Some(counter_idx) = state.counters.iter().position(|value| value.id == counter_id) else {
        return state;
    };
    let mut state = state;
    let item_key = state.counters[counter_idx].item_key;

    if state.counters[counter_idx].stock == 0 {
        state.runtime.popup_until = state.runtime.ms + POPUP_DURATION_MS;
        state.runtime.popup_image = Some(INSUFFICIENT_MESSAGE_IMAGE.to_string());
        return state;
    }

    let held = if item_key == ItemKey::Cup {
        HeldItem::Cup(create_cup())
    } else {
        let Some(item) = state.item(item_key) else {
            return state;
        };
        HeldItem::Ingredient {
            key: item_key,
            image: item.image.clone(),
        }
    };
    state.counters[counter_idx].stock -= 1;
    state.player.held_item = held;
    state
}

fn interact_prep_table(state: GameState, table_id: &str) -> GameState {
    let Some(table_idx) = state.prep_tables.iter().position(|value| value.id == table_id) else {
        return state;
    };
    let mut state = state;
    let held = std::mem::take(&mut state.player.held_item);
    let table_cup = state.prep_tables[table_idx].cup.take();

    let (held, table_cup) = match (held, table_cup) {
        (HeldItem::Empty, Some(cup)) => (HeldItem::Cup(with_cup_image(cup)), None),
        (HeldItem::Cup(cup), None) => (HeldItem::Empty, Some(with_cup_image(cup))),
        (HeldItem::Ingredient { key, .. }, Some(mut cup)) => {
            cup.ingredients.push(key);
            (HeldItem::Empty, Some(with_cup_image(cup)))
        }
        (held @ (HeldItem::Empty | HeldItem::Ingredient { .. }), None) => (held, None),
        (held @ HeldItem::Cup(_), Some(cup)) => (held, Some(cup)),
    };

    state.player.held_item = held;
    state.prep_tables[table_idx].cup = table_cup;
    state
}

fn interact_trashbin(state: GameState) -> GameState {
    if state.player.held_item.is_empty() {
        return state;
    }
    let mut state = state;
    state.player.held_item = HeldItem::Empty;
    state
}

fn interact_chair(state: GameState, chair_id: &str) -> GameState {
    let ingredients = match &state.player.held_item {
        HeldItem::Cup(cup) => cup.ingredients.clone(),
        HeldItem::Empty | HeldItem::Ingredient { .. } => return state,
    };
    let Some(chair_idx) = state.chairs.iter().position(|value| value.id == chair_id) else {
        return state;
    };
    let Some(customer_id) = state.chairs[chair_idx].customer_id.clone() else {
        return state;
    };
    let Some(customer_idx) = state
        .customers
        .iter()
        .position(|value| value.id == customer_id && value.seated)
    else {
        return state;
    };
    let Some(last_idx) = state.chairs[chair_idx].route.len().checked_sub(1) else {
        return state;
    };

    let order = state.customers[customer_idx].order.clone();
    let is_match = order_matches(&order, &ingredients);
    let money_delta = if is_match {
        let Some(payout) = order_payout(&state, &order) else {
            return state;
        };
        payout + state.player.tips
    } else {
        -ORDER_MISMATCH_PENALTY
    };

    let mut state = state;
    state.cue(if is_match {
        AudioCue::MeowHappy
    } else {
        AudioCue::MeowAngry
    });

    let exit = state.chairs[chair_idx].route[last_idx];
    state.chairs[chair_idx].customer_id = None;
    let customer = &mut state.customers[customer_idx];
    customer.seated = false;
    customer.leaving = true;
    customer.x = exit.x;
    customer.y = exit.y;
    customer.w = CUSTOMER_SIZE;
    customer.h = CUSTOMER_SIZE;
    customer.current_target = last_idx;

    state.player.held_item = HeldItem::Empty;
    state.player.money += money_delta;
    state.player.money_delta = money_delta;
    state.player.money_delta_at = state.runtime.ms;
    state
}
