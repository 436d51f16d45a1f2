//! End-to-end scenarios over the HTTP surface
//!
//! Exercises the warp filters the way a client would: airdrop, signed
//! transfer, replication to a validator, and every published failure
//! shape, using `warp::test` against in-process route stacks.


use std::sync::Arc;

use ed25519_dalek::SigningKey;
use parking_lot::Mutex;
use serde_json::{json, Value};

use minisol::config::{NodeConfig, Role};
use minisol::routes::{leader_routes, validator_routes};
use minisol::{Hash, Leader, NodeState, Pubkey, Validator};
use test_helpers::{keypair, sign_transfer, test_config, TEST_SEED};

fn node_config(role: Role) -> NodeConfig {
    NodeConfig {
        role,
        ledger: test_config(),
        poh_seed: TEST_SEED.to_string(),
        ..NodeConfig::default()
    }
}

fn leader_stack() -> (
    Leader,
    impl warp::Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone,
) {
    let config = node_config(Role::Leader);
    let state = Arc::new(Mutex::new(NodeState::new(config.ledger.clone(), TEST_SEED)));
    let leader = Leader::new(state);
    let routes = leader_routes(leader.clone(), config);
    (leader, routes)
}

fn validator_stack() -> (
    Validator,
    impl warp::Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone,
) {
    let config = node_config(Role::Validator);
    let state = Arc::new(Mutex::new(NodeState::new(config.ledger.clone(), TEST_SEED)));
    let validator = Validator::new(state);
    let routes = validator_routes(validator.clone(), config);
    (validator, routes)
}

async fn get_json<F>(routes: &F, path: &str) -> Value
where
    F: warp::Filter<Error = warp::Rejection> + Clone + Send + Sync + 'static,
    F::Extract: warp::Reply + Send,
{
    let res = warp::test::request().method("GET").path(path).reply(routes).await;
    assert_eq!(res.status(), 200, "GET {path}: {:?}", res.body());
    serde_json::from_slice(res.body()).unwrap()
}

async fn post_json<F>(routes: &F, path: &str, body: &Value) -> (u16, Value)
where
    F: warp::Filter<Error = warp::Rejection> + Clone + Send + Sync + 'static,
    F::Extract: warp::Reply + Send,
{
    let res = warp::test::request()
        .method("POST")
        .path(path)
        .json(body)
        .reply(routes)
        .await;
    let value = serde_json::from_slice(res.body()).unwrap_or(Value::Null);
    (res.status().as_u16(), value)
}

fn transfer_body(sk: &SigningKey, to: Pubkey, amount: u64, recent: Hash) -> Value {
    let tx = sign_transfer(sk, to, amount, recent);
    json!({
        "from": tx.from.to_hex(),
        "to": tx.to.to_hex(),
        "amount": tx.amount,
        "recent_hash": tx.recent_hash.to_hex(),
        "sig": tx.sig.to_hex(),
    })
}

#[tokio::test]
async fn health_and_config_report_the_node() {
    let (_, routes) = leader_stack();
    let health = get_json(&routes, "/health").await;
    assert_eq!(health, json!({ "ok": true }));

    let config = get_json(&routes, "/config").await;
    assert_eq!(config["role"], "leader");
    assert_eq!(config["ticks_per_slot"], 4);
    assert_eq!(config["recent_hash_window"], 16);
}

#[tokio::test]
async fn airdrop_then_transfer_updates_the_bank() {
    let (_, routes) = leader_stack();
    let (sk, alice) = keypair();
    let (_, bob) = keypair();

    let (status, body) =
        post_json(&routes, "/airdrop", &json!({ "pubkey": alice.to_hex(), "amount": 1000 })).await;
    assert_eq!(status, 200, "{body}");

    let poh = get_json(&routes, "/poh").await;
    let recent = Hash::parse(poh["hash"].as_str().unwrap()).unwrap();

    let (status, body) = post_json(&routes, "/transfer", &transfer_body(&sk, bob, 10, recent)).await;
    assert_eq!(status, 200, "{body}");
    assert_eq!(body, json!({ "ok": true }));

    let bank = get_json(&routes, "/bank").await;
    assert_eq!(bank["balances"][alice.to_hex()], 990);
    assert_eq!(bank["balances"][bob.to_hex()], 10);
    assert_eq!(bank["total_supply"], 1000);
}

#[tokio::test]
async fn replayed_signature_is_rejected_and_bank_unchanged() {
    let (_, routes) = leader_stack();
    let (sk, alice) = keypair();
    let (_, bob) = keypair();
    post_json(&routes, "/airdrop", &json!({ "pubkey": alice.to_hex(), "amount": 1000 })).await;

    let poh = get_json(&routes, "/poh").await;
    let recent = Hash::parse(poh["hash"].as_str().unwrap()).unwrap();
    let body = transfer_body(&sk, bob, 10, recent);

    let (status, _) = post_json(&routes, "/transfer", &body).await;
    assert_eq!(status, 200);

    let (status, reply) = post_json(&routes, "/transfer", &body).await;
    assert_eq!(status, 400);
    assert_eq!(reply["error"], "duplicate signature");

    let bank = get_json(&routes, "/bank").await;
    assert_eq!(bank["balances"][alice.to_hex()], 990);
    assert_eq!(bank["balances"][bob.to_hex()], 10);
}

#[tokio::test]
async fn unknown_recent_hash_is_rejected() {
    let (_, routes) = leader_stack();
    let (sk, alice) = keypair();
    post_json(&routes, "/airdrop", &json!({ "pubkey": alice.to_hex(), "amount": 100 })).await;

    let zeros = Hash([0u8; 32]);
    let (status, reply) =
        post_json(&routes, "/transfer", &transfer_body(&sk, Pubkey([9; 32]), 1, zeros)).await;
    assert_eq!(status, 400);
    assert_eq!(reply["error"], "stale recent_hash");
}

#[tokio::test]
async fn overdraw_is_rejected_with_balances() {
    let (_, routes) = leader_stack();
    let (sk, alice) = keypair();
    post_json(&routes, "/airdrop", &json!({ "pubkey": alice.to_hex(), "amount": 1000 })).await;

    let poh = get_json(&routes, "/poh").await;
    let recent = Hash::parse(poh["hash"].as_str().unwrap()).unwrap();
    let (status, reply) =
        post_json(&routes, "/transfer", &transfer_body(&sk, Pubkey([9; 32]), 1001, recent)).await;
    assert_eq!(status, 400);
    assert_eq!(reply["error"], "insufficient funds: have 1000, need 1001");
}

#[tokio::test]
async fn malformed_hex_is_rejected() {
    let (_, routes) = leader_stack();
    let (status, reply) = post_json(
        &routes,
        "/transfer",
        &json!({
            "from": "zz",
            "to": "00".repeat(32),
            "amount": 1,
            "recent_hash": "00".repeat(32),
            "sig": "00".repeat(64),
        }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(reply["error"], "bad 'pubkey' (64 hex chars expected)");
}

#[tokio::test]
async fn leader_slots_replicate_to_a_validator() {
    let (leader, leader_routes) = leader_stack();
    let (_, validator_routes) = validator_stack();

    let (sk, alice) = keypair();
    let (_, bob) = keypair();
    post_json(&leader_routes, "/airdrop", &json!({ "pubkey": alice.to_hex(), "amount": 500 }))
        .await;

    let poh = get_json(&leader_routes, "/poh").await;
    let recent = Hash::parse(poh["hash"].as_str().unwrap()).unwrap();
    post_json(&leader_routes, "/transfer", &transfer_body(&sk, bob, 25, recent)).await;

    // Seal slots 0..4 on the leader.
    for _ in 0..(4 * 5) {
        leader.tick_once();
    }

    let ledger = get_json(&leader_routes, "/ledger").await;
    assert_eq!(ledger["slots"].as_array().unwrap().len(), 5);

    let (status, reply) = post_json(&validator_routes, "/ingest", &ledger).await;
    assert_eq!(status, 200, "{reply}");
    assert_eq!(reply, json!({ "accepted": 5 }));

    assert_eq!(
        get_json(&leader_routes, "/bank").await,
        get_json(&validator_routes, "/bank").await
    );
    assert_eq!(ledger, get_json(&validator_routes, "/ledger").await);
}

#[tokio::test]
async fn gapped_batch_commits_the_prefix_and_reports_the_gap() {
    let (leader, leader_routes) = leader_stack();
    let (_, validator_routes) = validator_stack();

    for _ in 0..(4 * 4) {
        leader.tick_once();
    }
    let ledger = get_json(&leader_routes, "/ledger").await;
    let slots = ledger["slots"].as_array().unwrap();
    let gapped = json!({ "slots": [slots[0], slots[1], slots[3]] });

    let (status, reply) = post_json(&validator_routes, "/ingest", &gapped).await;
    assert_eq!(status, 400);
    assert_eq!(reply["accepted"], 2);
    assert_eq!(reply["error"], "slot 3: expected slot 2");

    let validator_ledger = get_json(&validator_routes, "/ledger").await;
    assert_eq!(validator_ledger["slots"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn write_endpoints_are_role_gated() {
    let (_, leader_routes) = leader_stack();
    let (_, validator_routes) = validator_stack();

    // A validator has no faucet or transfer admission.
    let res = warp::test::request()
        .method("POST")
        .path("/airdrop")
        .json(&json!({ "pubkey": "00".repeat(32), "amount": 1 }))
        .reply(&validator_routes)
        .await;
    assert_eq!(res.status(), 404);

    // A leader does not ingest.
    let res = warp::test::request()
        .method("POST")
        .path("/ingest")
        .json(&json!({ "slots": [] }))
        .reply(&leader_routes)
        .await;
    assert_eq!(res.status(), 404);
}
