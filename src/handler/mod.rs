//! HTTP request handlers for the campaign messaging API
//!
//! This module implements all the core business logic, one submodule per
//! store:
//! - Contact import batch job and contact listing
//! - Template CRUD with audit side-writes
//! - Campaign creation (recipient expansion), lifecycle transitions and
//!   statistics
//! - Message delivery-status transitions with campaign counter updates
//! - Bounded activity-log listing
//!
//! The shared helpers below keep error payloads and the audit side-write
//! uniform across every handler instead of re-deriving them per call site.

pub mod activity;
pub mod campaign;
pub mod contact;
pub mod message;
pub mod template;

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use chrono::Utc;
use rand::{distr::Alphanumeric, Rng};
use redb::WriteTransaction;
use serde_json::json;

use crate::database::TABLE_ACTIVITY;
use crate::model::ActivityRecord;

/// Generates a random 12-character alphanumeric record identifier
pub(crate) fn new_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect()
}

/// Standard 400 response for malformed or incomplete request payloads
pub(crate) fn invalid_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": message,
            "code": "invalid_request"
        })),
    )
        .into_response()
}

/// Standard 404 response for identifiers that do not resolve
pub(crate) fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": format!("{} not found", what),
            "code": "not_found"
        })),
    )
        .into_response()
}

/// Standard 403 response for resources owned by a different user
///
/// Kept distinct from 404: the identifier resolved, but the caller's
/// `user_id` does not match the record's owner.
pub(crate) fn forbidden(what: &str) -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "error": format!("You are not authorized to access this {}", what),
            "code": "forbidden"
        })),
    )
        .into_response()
}

/// Appends one audit entry inside the caller's write transaction
///
/// Every mutation handler routes its activity side-write through here so the
/// entry shape stays uniform. The caller must not hold the activity table
/// open; this helper opens and drops its own handle.
///
/// Key layout: "{user_id}:{timestamp_micros}:{suffix}" - chronological within
/// one user's range, with a random suffix against same-microsecond collisions.
pub(crate) fn append_activity(
    write_txn: &WriteTransaction,
    user_id: &str,
    action: &str,
    resource_type: &str,
    resource_id: &str,
    details: String,
) {
    let now = Utc::now();
    let record = ActivityRecord {
        user_id: user_id.to_string(),
        action: action.to_string(),
        resource_type: resource_type.to_string(),
        resource_id: resource_id.to_string(),
        details,
        timestamp: now,
    };
    let record_json = serde_json::to_string(&record).unwrap();

    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(4)
        .map(char::from)
        .collect();
    let key = format!("{}:{}:{}", user_id, now.timestamp_micros(), suffix);

    let mut table = write_txn.open_table(TABLE_ACTIVITY).unwrap();
    table.insert(key.as_str(), record_json.as_str()).unwrap();
}
