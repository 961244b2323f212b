use cat_cafe_rust_server::constants::{CUSTOMER_TICK_MS, MOVEMENT_TICK_MS, SPAWN_TICK_MS};
use cat_cafe_rust_server::engine::{
    adjust_restock_amount, apply_upgrade, collides_at, commit_restock, is_in_bounds, now_ms,
    set_restock_counter, set_screen, solid_rects, GameEngine,
};
use cat_cafe_rust_server::input::{key_down, key_up, InputKey};
use cat_cafe_rust_server::rng::Rng;
use cat_cafe_rust_server::types::{AudioCue, GameState, Rect, Screen, UpgradeKind};
use clap::Parser;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

const MOVE_KEYS: [InputKey; 4] = [InputKey::Up, InputKey::Left, InputKey::Down, InputKey::Right];
const UPGRADE_KINDS: [UpgradeKind; 4] = [
    UpgradeKind::Advertisement,
    UpgradeKind::Energy,
    UpgradeKind::Cuteness,
    UpgradeKind::Meowmax,
];

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless cat café soak run")]
struct Cli {
    #[arg(long, default_value_t = 300)]
    seconds: u64,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 3)]
    runs: u32,
    #[arg(long)]
    match_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct RunResultLine {
    run: u32,
    seed: u32,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    #[serde(rename = "customersSpawned")]
    customers_spawned: u64,
    #[serde(rename = "happyServes")]
    happy_serves: u32,
    #[serde(rename = "angryServes")]
    angry_serves: u32,
    interactions: u32,
    purchases: u32,
    #[serde(rename = "finalMoney")]
    final_money: i64,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    #[serde(rename = "atMs")]
    at_ms: u64,
    message: String,
}

#[derive(Clone, Debug)]
struct RunOutcome {
    result: RunResultLine,
    anomaly_records: Vec<AnomalyRecord>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "runCount")]
    run_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageServes")]
    average_serves: f64,
    runs: Vec<RunResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    run: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "atMs")]
    at_ms: Option<u64>,
    details: Value,
}

fn main() {
    let cli = Cli::parse();
    let started_at_ms = now_ms();
    let base_seed = cli.seed.unwrap_or(started_at_ms) as u32;
    let match_id = cli
        .match_id
        .clone()
        .unwrap_or_else(|| default_match_id(base_seed, started_at_ms));
    let duration_ms = cli.seconds.max(1) * 1_000;
    let mut has_anomaly = false;
    let mut total_anomalies = 0usize;
    let mut results = Vec::new();

    for run in 0..cli.runs.max(1) {
        let seed = base_seed.wrapping_add(run);
        emit_log(
            "info",
            "run_started",
            &match_id,
            Some(run),
            Some(seed),
            None,
            json!({ "durationMs": duration_ms }),
        );
        let outcome = run_once(run, seed, duration_ms);

        for anomaly in &outcome.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &match_id,
                Some(run),
                Some(seed),
                Some(anomaly.at_ms),
                json!({ "message": anomaly.message }),
            );
        }
        if !outcome.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += outcome.anomaly_records.len();

        emit_log(
            "info",
            "run_finished",
            &match_id,
            Some(run),
            Some(seed),
            Some(duration_ms),
            json!({
                "customersSpawned": outcome.result.customers_spawned,
                "happyServes": outcome.result.happy_serves,
                "angryServes": outcome.result.angry_serves,
                "finalMoney": outcome.result.final_money,
                "anomalyCount": outcome.anomaly_records.len(),
            }),
        );

        match serde_json::to_string(&outcome.result) {
            Ok(line) => println!("{line}"),
            Err(error) => emit_log(
                "error",
                "result_encode_failed",
                &match_id,
                Some(run),
                Some(seed),
                None,
                json!({ "error": error.to_string() }),
            ),
        }
        results.push(outcome.result);
    }

    let summary = build_run_summary(
        match_id.clone(),
        started_at_ms,
        now_ms(),
        results,
        total_anomalies,
    );
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &match_id,
                None,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
    }

    if has_anomaly {
        std::process::exit(1);
    }
}

#[derive(Default)]
struct WalkerTurn {
    interacted: bool,
    purchases: u32,
    anomaly: Option<String>,
}

/// Random-walk bot: re-rolls its held keys every few hundred milliseconds,
/// taps interact whenever something is in reach, and now and then spends
/// money on restocks or upgrades.
struct Walker {
    rng: Rng,
    next_decision_ms: u64,
}

impl Walker {
    fn new(seed: u32) -> Self {
        Self {
            rng: Rng::new(seed ^ 0x5bd1_e995),
            next_decision_ms: 0,
        }
    }

    fn act(&mut self, engine: &mut GameEngine, now: u64) -> WalkerTurn {
        let mut turn = WalkerTurn::default();
        if now >= self.next_decision_ms {
            self.next_decision_ms = now + self.rng.int(150, 900) as u64;
            for key in MOVE_KEYS {
                let pressed = self.rng.bool(0.35);
                engine.apply(|state| {
                    if pressed {
                        key_down(state, key, false)
                    } else {
                        key_up(state, key)
                    }
                });
            }
            turn.anomaly = self.maybe_purchase(engine, &mut turn.purchases);
        }
        let in_reach = engine.state().runtime.active_interactable.is_some();
        if in_reach && self.rng.bool(0.2) {
            engine.apply(|state| {
                let state = key_down(state, InputKey::Interact, false);
                key_up(state, InputKey::Interact)
            });
            turn.interacted = true;
        }
        turn
    }

    fn maybe_purchase(&mut self, engine: &mut GameEngine, purchases: &mut u32) -> Option<String> {
        let money_before = engine.state().player.money;
        if self.rng.bool(0.05) {
            let counters = &engine.state().counters;
            let counter_id = counters[self.rng.pick_index(counters.len())].id.clone();
            let amount = self.rng.int(-2, 6) as i64;
            engine.apply(|state| {
                let state = set_restock_counter(state, &counter_id);
                commit_restock(adjust_restock_amount(state, amount))
            });
        } else if self.rng.bool(0.03) {
            let kind = UPGRADE_KINDS[self.rng.pick_index(UPGRADE_KINDS.len())];
            engine.apply(|state| apply_upgrade(state, kind));
        } else {
            return None;
        }

        let money_after = engine.state().player.money;
        if money_after != money_before {
            *purchases += 1;
        }
        if money_before >= 0 && money_after < 0 {
            return Some(format!("purchase overdrew money: {money_before} -> {money_after}"));
        }
        None
    }
}

fn run_once(run: u32, seed: u32, duration_ms: u64) -> RunOutcome {
    let mut engine = GameEngine::with_seed(seed);
    engine.apply(|state| set_screen(state, Screen::Game));
    let solids = solid_rects(engine.state());
    let mut walker = Walker::new(seed);

    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut stalled: HashMap<String, ((i32, i32), u32)> = HashMap::new();
    let mut happy_serves = 0;
    let mut angry_serves = 0;
    let mut interactions = 0;
    let mut purchases = 0;

    for ms in 1..=duration_ms {
        if ms % MOVEMENT_TICK_MS == 0 {
            engine.step_movement();
            let turn = walker.act(&mut engine, ms);
            if turn.interacted {
                interactions += 1;
            }
            purchases += turn.purchases;
            if let Some(message) = turn.anomaly {
                push_anomaly(&mut anomalies, &mut anomaly_records, &mut anomaly_seen, ms, message);
            }
            for event in engine.build_snapshot(true).events {
                match event {
                    AudioCue::MeowHappy => happy_serves += 1,
                    AudioCue::MeowAngry => angry_serves += 1,
                    _ => {}
                }
            }
            for message in collect_state_anomalies(engine.state(), &solids) {
                push_anomaly(&mut anomalies, &mut anomaly_records, &mut anomaly_seen, ms, message);
            }
        }
        if ms % CUSTOMER_TICK_MS == 0 {
            engine.step_customers();
            for message in track_leaving_customers(engine.state(), &mut stalled) {
                push_anomaly(&mut anomalies, &mut anomaly_records, &mut anomaly_seen, ms, message);
            }
        }
        if ms % SPAWN_TICK_MS == 0 {
            engine.step_spawn();
        }
    }

    let state = engine.into_state();
    RunOutcome {
        result: RunResultLine {
            run,
            seed,
            duration_ms,
            customers_spawned: state.runtime.next_customer_id.saturating_sub(1),
            happy_serves,
            angry_serves,
            interactions,
            purchases,
            final_money: state.player.money,
            anomalies,
        },
        anomaly_records,
    }
}

fn collect_state_anomalies(state: &GameState, solids: &[Rect]) -> Vec<String> {
    let mut anomalies = Vec::new();
    let player = &state.player;
    if !is_in_bounds(player.x, player.y) {
        anomalies.push(format!("player out of bounds at ({:.1}, {:.1})", player.x, player.y));
    }
    if collides_at(solids, player.x, player.y) {
        anomalies.push(format!("player overlaps a solid at ({:.1}, {:.1})", player.x, player.y));
    }

    for chair in &state.chairs {
        let Some(customer_id) = chair.customer_id.as_deref() else {
            continue;
        };
        match state.customer(customer_id) {
            None => anomalies.push(format!("{} points at missing {customer_id}", chair.id)),
            Some(customer) if customer.chair_id != chair.id || customer.leaving => {
                anomalies.push(format!("{} holds {customer_id} which does not hold it", chair.id));
            }
            Some(_) => {}
        }
    }
    for customer in state.customers.iter().filter(|value| !value.leaving) {
        let holds = state
            .chair(&customer.chair_id)
            .is_some_and(|chair| chair.customer_id.as_deref() == Some(customer.id.as_str()));
        if !holds {
            anomalies.push(format!("{} has no chair reservation", customer.id));
        }
    }

    let mut seat_numbers: Vec<usize> = state
        .customers
        .iter()
        .filter(|value| value.seated)
        .map(|value| value.seat_number)
        .collect();
    seat_numbers.sort_unstable();
    if seat_numbers.iter().enumerate().any(|(idx, &number)| number != idx + 1) {
        anomalies.push(format!("seat numbers not contiguous: {seat_numbers:?}"));
    }
    anomalies
}

/// A leaving customer may pause for one tick at its turn-around waypoint;
/// anything longer means it is stuck.
fn track_leaving_customers(
    state: &GameState,
    stalled: &mut HashMap<String, ((i32, i32), u32)>,
) -> Vec<String> {
    let mut anomalies = Vec::new();
    let mut next = HashMap::new();
    for customer in state.customers.iter().filter(|value| value.leaving) {
        let position = (customer.x, customer.y);
        let still_ticks = match stalled.get(&customer.id) {
            Some(&(previous, count)) if previous == position => count + 1,
            _ => 0,
        };
        if still_ticks == 2 {
            anomalies.push(format!("leaving {} stuck at {position:?}", customer.id));
        }
        next.insert(customer.id.clone(), (position, still_ticks));
    }
    *stalled = next;
    anomalies
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    at_ms: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        at_ms,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_match_id(seed: u32, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    match_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    runs: Vec<RunResultLine>,
    anomaly_count: usize,
) -> RunSummary {
    let run_count = runs.len();
    let total_serves: u32 = runs
        .iter()
        .map(|run| run.happy_serves + run.angry_serves)
        .sum();
    let average_serves = if run_count == 0 {
        0.0
    } else {
        total_serves as f64 / run_count as f64
    };
    RunSummary {
        match_id,
        started_at_ms,
        finished_at_ms,
        run_count,
        anomaly_count,
        average_serves,
        runs,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    match_id: &str,
    run: Option<u32>,
    seed: Option<u32>,
    at_ms: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        match_id: match_id.to_string(),
        run,
        seed,
        at_ms,
        details,
    };
    match serde_json::to_string(&log_line) {
        Ok(text) => eprintln!("{text}"),
        Err(error) => eprintln!("structured log encode failed: {error}"),
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cat_cafe_rust_server::types::{CustomerState, Direction};
    use cat_cafe_rust_server::world::create_initial_state;

    fn make_result(happy: u32, angry: u32) -> RunResultLine {
        RunResultLine {
            run: 0,
            seed: 42,
            duration_ms: 60_000,
            customers_spawned: 3,
            happy_serves: happy,
            angry_serves: angry,
            interactions: 10,
            purchases: 2,
            final_money: 1_000,
            anomalies: Vec::new(),
        }
    }

    fn leaving_customer(id: &str, x: i32, y: i32) -> CustomerState {
        CustomerState {
            id: id.to_string(),
            x,
            y,
            w: 40,
            h: 40,
            seated: false,
            leaving: true,
            chair_id: "chair-1".to_string(),
            current_target: 0,
            direction: Direction::Left,
            order: Vec::new(),
            seat_number: 1,
        }
    }

    #[test]
    fn default_match_id_contains_seed_and_timestamp() {
        assert_eq!(default_match_id(42, 123456789), "sim-42-123456789");
    }

    #[test]
    fn build_run_summary_averages_serves() {
        let summary = build_run_summary(
            "sim-42-1".to_string(),
            1,
            2,
            vec![make_result(3, 1), make_result(1, 1)],
            0,
        );
        assert_eq!(summary.run_count, 2);
        assert_eq!(summary.average_serves, 3.0);
    }

    #[test]
    fn write_summary_returns_error_when_parent_does_not_exist() {
        let target = std::env::temp_dir()
            .join(format!("cat-cafe-missing-{}", now_ms()))
            .join("summary.json");
        let summary = build_run_summary("sim-1-1".to_string(), 1, 2, vec![make_result(0, 0)], 0);
        assert!(write_summary(&target, &summary).is_err());
    }

    #[test]
    fn fresh_state_has_no_anomalies() {
        let state = create_initial_state();
        let solids = solid_rects(&state);
        assert!(collect_state_anomalies(&state, &solids).is_empty());
    }

    #[test]
    fn dangling_chair_reservation_is_reported() {
        let mut state = create_initial_state();
        state.chairs[0].customer_id = Some("customer-9".to_string());
        let solids = solid_rects(&state);
        let anomalies = collect_state_anomalies(&state, &solids);
        assert_eq!(anomalies, vec!["chair-1 points at missing customer-9".to_string()]);
    }

    #[test]
    fn leaving_customer_may_pause_once_but_not_twice() {
        let mut state = create_initial_state();
        state.customers.push(leaving_customer("customer-1", 600, 380));
        let mut stalled = HashMap::new();
        assert!(track_leaving_customers(&state, &mut stalled).is_empty());
        assert!(track_leaving_customers(&state, &mut stalled).is_empty());
        let flagged = track_leaving_customers(&state, &mut stalled);
        assert_eq!(flagged.len(), 1);

        state.customers[0].x -= 1;
        assert!(track_leaving_customers(&state, &mut stalled).is_empty());
    }

    #[test]
    fn short_run_is_clean() {
        let outcome = run_once(0, 7, 20_000);
        assert!(outcome.result.anomalies.is_empty(), "{:?}", outcome.result.anomalies);
        assert!(outcome.result.customers_spawned >= 1);
    }

    #[test]
    fn push_anomaly_keeps_records_and_deduplicates_summary_messages() {
        let mut anomalies = Vec::new();
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        push_anomaly(&mut anomalies, &mut records, &mut seen, 10, "same".to_string());
        push_anomaly(&mut anomalies, &mut records, &mut seen, 11, "same".to_string());
        assert_eq!(anomalies.len(), 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].at_ms, 11);
    }
}
