//! minisol node binary.
//!
//! One process, one role. `LEDGER_ROLE=leader` runs the PoH clock and
//! accepts airdrops and transfers; `LEDGER_ROLE=validator` accepts slot
//! batches on `/ingest` and replays them. Both serve the read endpoints.
//!
//! Run a leader:    LEDGER_ROLE=leader cargo run
//! Run a validator: LEDGER_ROLE=validator PORT=8001 cargo run

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use minisol::config::{NodeConfig, Role};
use minisol::routes::{leader_routes, validator_routes};
use minisol::runtime::{run_poh_clock, Leader, NodeState, Validator};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = NodeConfig::from_env();
    let state = Arc::new(Mutex::new(NodeState::new(
        config.ledger.clone(),
        &config.poh_seed,
    )));

    info!(
        role = %config.role,
        port = config.port,
        hashes_per_tick = config.ledger.hashes_per_tick,
        ticks_per_slot = config.ledger.ticks_per_slot,
        recent_hash_window = config.ledger.recent_hash_window,
        "minisol node starting"
    );

    let addr = ([0, 0, 0, 0], config.port);
    match config.role {
        Role::Leader => {
            let leader = Leader::new(state);
            tokio::spawn(run_poh_clock(leader.clone(), config.tick_interval));
            warp::serve(leader_routes(leader, config)).run(addr).await;
        }
        Role::Validator => {
            let validator = Validator::new(state);
            warp::serve(validator_routes(validator, config)).run(addr).await;
        }
    }
}
