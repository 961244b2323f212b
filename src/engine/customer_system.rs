use super::utils::{direction_from_delta, step_toward};
use crate::types::{CustomerState, GameState};

/// Advance every customer one unit along its chair route, seat arrivals,
/// drop customers that walked back out, then renumber the seated ones.
pub fn move_customers(state: GameState) -> GameState {
    let mut state = state;
    let customers = std::mem::take(&mut state.customers);
    let mut next_customers: Vec<CustomerState> = Vec::with_capacity(customers.len());

    for customer in customers {
        let Some(chair) = state.chair(&customer.chair_id) else {
            continue;
        };
        let route = &chair.route;

        if !customer.leaving {
            if customer.current_target >= route.len() {
                next_customers.push(CustomerState {
                    seated: true,
                    x: chair.rect.x as i32,
                    y: chair.rect.y as i32,
                    w: chair.rect.w as i32,
                    h: chair.rect.h as i32,
                    ..customer
                });
                continue;
            }

            let target = route[customer.current_target];
            let (dx, dy, reached) = step_toward(customer.x, customer.y, target);
            let next_target = if reached {
                customer.current_target + 1
            } else {
                customer.current_target
            };
            let seated = reached && next_target >= route.len();
            next_customers.push(CustomerState {
                x: customer.x + dx,
                y: customer.y + dy,
                direction: direction_from_delta(dx, dy, customer.direction),
                current_target: next_target,
                seated,
                w: if seated { chair.rect.w as i32 } else { customer.w },
                h: if seated { chair.rect.h as i32 } else { customer.h },
                ..customer
            });
            continue;
        }

        let Some(&target) = route.get(customer.current_target) else {
            continue;
        };
        let (dx, dy, reached) = step_toward(customer.x, customer.y, target);
        if reached && customer.current_target == 0 {
            continue;
        }
        next_customers.push(CustomerState {
            x: customer.x + dx,
            y: customer.y + dy,
            direction: direction_from_delta(dx, dy, customer.direction),
            current_target: if reached {
                customer.current_target - 1
            } else {
                customer.current_target
            },
            ..customer
        });
    }

    let mut seat_number = 0;
    for customer in &mut next_customers {
        if customer.seated {
            seat_number += 1;
            customer.seat_number = seat_number;
        }
    }

    state.customers = next_customers;
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{CUSTOMER_ENTRY, CUSTOMER_SIZE};
    use crate::engine::interaction::{interact_with_active, with_cup_image};
    use crate::types::{
        ActiveInteractable, CupItem, Direction, HeldItem, InteractableKind, ItemKey, Rect,
    };
    use crate::world::create_initial_state;

    fn arriving(chair_id: &str, id: &str) -> CustomerState {
        CustomerState {
            id: id.to_string(),
            x: CUSTOMER_ENTRY.x,
            y: CUSTOMER_ENTRY.y,
            w: CUSTOMER_SIZE,
            h: CUSTOMER_SIZE,
            seated: false,
            leaving: false,
            chair_id: chair_id.to_string(),
            current_target: 0,
            direction: Direction::Left,
            order: vec![ItemKey::Milk, ItemKey::Boba],
            seat_number: 1,
        }
    }

    fn with_customer(chair_idx: usize) -> GameState {
        let mut state = create_initial_state();
        let chair_id = state.chairs[chair_idx].id.clone();
        let id = format!("customer-{}", chair_idx + 1);
        state.chairs[chair_idx].customer_id = Some(id.clone());
        state.customers.push(arriving(&chair_id, &id));
        state
    }

    fn run_until<F: Fn(&GameState) -> bool>(mut state: GameState, done: F) -> (GameState, usize) {
        for step in 1..=20_000 {
            state = move_customers(state);
            if done(&state) {
                return (state, step);
            }
        }
        panic!("condition not reached within step budget");
    }

    #[test]
    fn arrival_snaps_to_chair_seat() {
        for chair_idx in 0..8 {
            let state = with_customer(chair_idx);
            let (state, _) = run_until(state, |s| s.customers[0].seated);
            let chair = &state.chairs[chair_idx];
            let customer = &state.customers[0];
            assert_eq!(customer.current_target, chair.route.len());
            assert_eq!(customer.w, chair.rect.w as i32);
            assert_eq!(customer.h, chair.rect.h as i32);

            let settled = move_customers(state.clone());
            let customer = &settled.customers[0];
            assert!(customer.seated);
            assert_eq!((customer.x, customer.y), (chair.rect.x as i32, chair.rect.y as i32));
        }
    }

    #[test]
    fn first_leg_heads_left_from_the_door() {
        let state = with_customer(4);
        let state = move_customers(move_customers(state));
        let customer = &state.customers[0];
        assert_eq!(customer.direction, Direction::Left);
        assert_eq!(customer.x, CUSTOMER_ENTRY.x - 1);
        assert_eq!(customer.current_target, 1);
    }

    #[test]
    fn served_customer_walks_out_and_is_removed_for_every_chair() {
        for chair_idx in 0..8 {
            let state = with_customer(chair_idx);
            let (mut state, _) = run_until(state, |s| {
                s.customers[0].seated && s.customers[0].x == s.chairs[chair_idx].rect.x as i32
            });
            let order = state.customers[0].order.clone();
            state.player.held_item = HeldItem::Cup(with_cup_image(CupItem {
                image: String::new(),
                ingredients: order,
            }));
            state.runtime.active_interactable = Some(ActiveInteractable {
                kind: InteractableKind::Chair,
                id: state.chairs[chair_idx].id.clone(),
                popup_direction: Direction::Up,
                rect: Rect::default(),
            });
            let state = interact_with_active(state);
            assert!(state.customers[0].leaving);
            assert!(state.chairs[chair_idx].customer_id.is_none());

            let (state, _) = run_until(state, |s| s.customers.is_empty());
            assert!(state.chairs.iter().all(|chair| chair.customer_id.is_none()));
        }
    }

    #[test]
    fn leaving_customer_one_step_from_door_exits_next_tick() {
        let mut state = with_customer(0);
        state.chairs[0].customer_id = None;
        let customer = &mut state.customers[0];
        customer.leaving = true;
        customer.current_target = 0;
        for (x, y) in [(981, 181), (979, 180), (980, 179), (980, 180)] {
            let mut probe = state.clone();
            probe.customers[0].x = x;
            probe.customers[0].y = y;
            let next = move_customers(probe);
            assert!(next.customers.is_empty(), "stuck at ({x}, {y})");
        }
    }

    #[test]
    fn leaving_customers_never_stall_from_any_offset() {
        let base = {
            let mut state = with_customer(5);
            state.chairs[5].customer_id = None;
            state.customers[0].leaving = true;
            state.customers[0].current_target = 0;
            state
        };
        for ox in -6..=6 {
            for oy in -6..=6 {
                let mut state = base.clone();
                state.customers[0].x = CUSTOMER_ENTRY.x + ox;
                state.customers[0].y = CUSTOMER_ENTRY.y + oy;
                let (_, steps) = run_until(state, |s| s.customers.is_empty());
                let expected = ox.abs().max(oy.abs()).max(1) as usize;
                assert_eq!(steps, expected, "offset ({ox}, {oy})");
            }
        }
    }

    #[test]
    fn seat_numbers_follow_collection_order_of_seated_subset() {
        let mut state = create_initial_state();
        for (idx, chair_idx) in [2usize, 0, 5].into_iter().enumerate() {
            let chair = &state.chairs[chair_idx];
            let mut customer = arriving(&chair.id, &format!("customer-{idx}"));
            customer.current_target = chair.route.len();
            state.chairs[chair_idx].customer_id = Some(customer.id.clone());
            state.customers.push(customer);
        }
        state.customers.insert(1, {
            let mut walker = arriving("chair-2", "walker");
            walker.seat_number = 9;
            walker
        });
        state.chairs[1].customer_id = Some("walker".to_string());

        let next = move_customers(state);
        let numbers: Vec<(String, bool, usize)> = next
            .customers
            .iter()
            .map(|c| (c.id.clone(), c.seated, c.seat_number))
            .collect();
        assert_eq!(
            numbers,
            vec![
                ("customer-0".to_string(), true, 1),
                ("walker".to_string(), false, 9),
                ("customer-1".to_string(), true, 2),
                ("customer-2".to_string(), true, 3),
            ]
        );
    }

    #[test]
    fn customer_with_unknown_chair_is_dropped() {
        let mut state = create_initial_state();
        state.customers.push(arriving("chair-99", "customer-404"));
        let next = move_customers(state);
        assert!(next.customers.is_empty());
    }
}
