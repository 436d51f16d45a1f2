//! Validator write endpoint: `/ingest`.

use serde::Deserialize;
use serde_json::json;
use warp::http::StatusCode;
use warp::Filter;

use crate::protocol::Slot;
use crate::runtime::Validator;

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub slots: Vec<Slot>,
}

/// POST /ingest - replay a batch of leader slots. Responds with the count
/// of slots committed; a mismatch stops the batch and reports the reason
/// alongside whatever was already committed.
pub fn ingest_route(
    validator: Validator,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path!("ingest")
        .and(warp::post())
        .and(warp::body::json())
        .map(move |req: IngestRequest| {
            let report = validator.ingest(&req.slots);
            let status = if report.error.is_none() {
                StatusCode::OK
            } else {
                StatusCode::BAD_REQUEST
            };
            let mut body = json!({ "accepted": report.accepted });
            if let Some(error) = &report.error {
                body["error"] = json!(error);
            }
            warp::reply::with_status(warp::reply::json(&body), status)
        })
}
