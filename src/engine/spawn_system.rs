use crate::constants::{
    CUSTOMER_CHANCE_DECAY, CUSTOMER_CHANCE_PER_OCCUPANT, CUSTOMER_ENTRY, CUSTOMER_SIZE, LIQUIDS,
    TOPPINGS,
};
use crate::rng::RandomSource;
use crate::types::{CustomerState, Direction, GameState, ItemKey};

/// One liquid and one topping, then sugar and ice on independent coin flips.
pub fn random_order<R: RandomSource + ?Sized>(rng: &mut R) -> Vec<ItemKey> {
    let liquid = LIQUIDS[rng.below(LIQUIDS.len() as u32) as usize];
    let topping = TOPPINGS[rng.below(TOPPINGS.len() as u32) as usize];
    let mut order = vec![liquid, topping];
    if rng.below(2) == 0 {
        order.push(ItemKey::Sugar);
    }
    if rng.below(2) == 0 {
        order.push(ItemKey::Ice);
    }
    order
}

pub fn spawn_roll_range(customer_chance: u32, chance_divisor: f64) -> u32 {
    ((customer_chance as f64 / chance_divisor).floor() as u32).max(1)
}

pub fn decayed_chance(customer_chance: u32) -> u32 {
    ((customer_chance as f64 / CUSTOMER_CHANCE_DECAY).floor() as u32).max(1)
}

pub fn maybe_spawn_customer<R: RandomSource + ?Sized>(state: GameState, rng: &mut R) -> GameState {
    let available: Vec<usize> = state
        .chairs
        .iter()
        .enumerate()
        .filter(|(_, chair)| chair.customer_id.is_none())
        .map(|(idx, _)| idx)
        .collect();
    if available.is_empty() {
        return state;
    }

    let mut state = state;
    let roll = rng.below(spawn_roll_range(
        state.runtime.customer_chance,
        state.runtime.chance_divisor,
    ));
    if roll != 0 {
        state.runtime.customer_chance = decayed_chance(state.runtime.customer_chance);
        return state;
    }

    let chair_idx = available[rng.below(available.len() as u32) as usize];
    let id = format!("customer-{}", state.runtime.next_customer_id);
    state.runtime.next_customer_id += 1;
    let chair_id = state.chairs[chair_idx].id.clone();
    state.chairs[chair_idx].customer_id = Some(id.clone());
    state.customers.push(CustomerState {
        id,
        x: CUSTOMER_ENTRY.x,
        y: CUSTOMER_ENTRY.y,
        w: CUSTOMER_SIZE,
        h: CUSTOMER_SIZE,
        seated: false,
        leaving: false,
        chair_id,
        current_target: 0,
        direction: Direction::Left,
        order: random_order(rng),
        seat_number: 1,
    });
    state.runtime.customer_chance = CUSTOMER_CHANCE_PER_OCCUPANT * state.customers.len() as u32;
    state
}
