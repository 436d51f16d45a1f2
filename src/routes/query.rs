//! Read-only endpoints served by both roles: `/health`, `/poh`, `/bank`,
//! `/ledger` and `/config`.

use serde_json::json;
use warp::Filter;

use crate::config::NodeConfig;
use crate::runtime::SharedState;

/// GET /health - liveness probe.
pub fn health_route() -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("health")
        .and(warp::get())
        .map(|| warp::reply::json(&json!({ "ok": true })))
}

/// GET /poh - current clock snapshot. Clients take `hash` as the
/// `recent_hash` for transfers they are about to sign.
pub fn poh_route(
    state: SharedState,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("poh").and(warp::get()).map(move || {
        let status = state.lock().poh_status();
        warp::reply::json(&status)
    })
}

/// GET /bank - balances and total supply.
pub fn bank_route(
    state: SharedState,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("bank").and(warp::get()).map(move || {
        let snapshot = state.lock().bank_snapshot();
        warp::reply::json(&snapshot)
    })
}

/// GET /ledger - the sealed slots, oldest first.
pub fn ledger_route(
    state: SharedState,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("ledger").and(warp::get()).map(move || {
        let snapshot = state.lock().ledger_snapshot();
        warp::reply::json(&snapshot)
    })
}

/// GET /config - the effective knobs this node runs with.
pub fn config_route(
    config: NodeConfig,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("config").and(warp::get()).map(move || {
        warp::reply::json(&json!({
            "role": config.role.to_string(),
            "hashes_per_tick": config.ledger.hashes_per_tick,
            "ticks_per_slot": config.ledger.ticks_per_slot,
            "recent_hash_window": config.ledger.recent_hash_window,
            "max_slots": config.ledger.max_slots,
            "tick_interval_ms": config.tick_interval.as_millis() as u64,
        }))
    })
}
