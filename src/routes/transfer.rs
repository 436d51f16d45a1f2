//! Leader write endpoints: `/airdrop` and `/transfer`.
//!
//! Bodies arrive with hex fields as strings; parsing to the typed forms
//! (and the Ed25519 check inside `submit_transfer`) happens here on the
//! request task, before the consistency domain is ever locked.

use serde::Deserialize;
use warp::Filter;

use crate::protocol::{Hash, ParseError, Pubkey, Signature, Transfer};
use crate::routes::{reply_error, reply_ok};
use crate::runtime::Leader;

#[derive(Debug, Deserialize)]
pub struct AirdropRequest {
    pub pubkey: String,
    pub amount: u64,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub from: String,
    pub to: String,
    pub amount: u64,
    pub recent_hash: String,
    pub sig: String,
}

impl TransferRequest {
    fn parse(&self) -> Result<Transfer, ParseError> {
        Ok(Transfer {
            from: Pubkey::parse(&self.from)?,
            to: Pubkey::parse(&self.to)?,
            amount: self.amount,
            recent_hash: Hash::parse(&self.recent_hash)?,
            sig: Signature::parse(&self.sig)?,
        })
    }
}

/// POST /airdrop - operator faucet, leader only.
pub fn airdrop_route(
    leader: Leader,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("airdrop")
        .and(warp::post())
        .and(warp::body::json())
        .map(move |req: AirdropRequest| {
            let pubkey = match Pubkey::parse(&req.pubkey) {
                Ok(pk) => pk,
                Err(e) => return reply_error(e.to_string()),
            };
            match leader.airdrop(pubkey, req.amount) {
                Ok(()) => reply_ok(),
                Err(e) => reply_error(e.to_string()),
            }
        })
}

/// POST /transfer - signed transfer admission, leader only.
pub fn transfer_route(
    leader: Leader,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("transfer")
        .and(warp::post())
        .and(warp::body::json())
        .map(move |req: TransferRequest| {
            let tx = match req.parse() {
                Ok(tx) => tx,
                Err(e) => return reply_error(e.to_string()),
            };
            match leader.submit_transfer(tx) {
                Ok(()) => reply_ok(),
                Err(e) => reply_error(e.to_string()),
            }
        })
}
