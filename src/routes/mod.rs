//! HTTP surface: warp filters, one module per concern.
//!
//! Route organization:
//! - query.rs:    /health, /poh, /bank, /ledger, /config (both roles)
//! - transfer.rs: /airdrop, /transfer (leader)
//! - ingest.rs:   /ingest (validator)

use serde_json::json;
use warp::http::StatusCode;
use warp::Filter;

use crate::config::NodeConfig;
use crate::runtime::{Leader, Validator};

pub mod ingest;
pub mod query;
pub mod transfer;

pub use ingest::ingest_route;
pub use query::{bank_route, config_route, health_route, ledger_route, poh_route};
pub use transfer::{airdrop_route, transfer_route};

/// Uniform success body.
pub(crate) fn reply_ok() -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(warp::reply::json(&json!({ "ok": true })), StatusCode::OK)
}

/// Uniform validation-failure body. Validation errors never mutate state,
/// so a plain 400 with the reason is the whole story.
pub(crate) fn reply_error(error: String) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(
        warp::reply::json(&json!({ "ok": false, "error": error })),
        StatusCode::BAD_REQUEST,
    )
}

/// The full leader surface.
pub fn leader_routes(
    leader: Leader,
    config: NodeConfig,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let state = leader.state().clone();
    health_route()
        .or(poh_route(state.clone()))
        .or(bank_route(state.clone()))
        .or(ledger_route(state))
        .or(config_route(config))
        .or(airdrop_route(leader.clone()))
        .or(transfer_route(leader))
}

/// The full validator surface.
pub fn validator_routes(
    validator: Validator,
    config: NodeConfig,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let state = validator.state().clone();
    health_route()
        .or(poh_route(state.clone()))
        .or(bank_route(state.clone()))
        .or(ledger_route(state))
        .or(config_route(config))
        .or(ingest_route(validator))
}
