//! Activity log listing
//!
//! The log is append-only (written through `super::append_activity` inside
//! each mutation's transaction); this module only reads it back as a bounded
//! most-recent listing for display.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use redb::{ReadableDatabase, ReadableTable};
use serde_json::json;

use crate::database::{range_bounds, AppState, TABLE_ACTIVITY};
use crate::model::{ActivityParams, ActivityRecord};

/// Lists a user's most recent activity entries, newest first
///
/// The activity keys embed the write timestamp, so walking the user's key
/// range in reverse yields reverse-chronological order without sorting.
///
/// # Query Parameters
///
/// - `user_id` (required) - owner whose entries are listed
/// - `limit` (optional) - number of entries, max 100 (default: 20)
///
/// # Example Request
///
/// `GET /api/activity?user_id=user_123&limit=50`
pub async fn list_activity(
    State(state): State<AppState>,
    Query(params): Query<ActivityParams>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(20).min(100);

    let read_txn = state.db.begin_read().unwrap();
    let table = read_txn.open_table(TABLE_ACTIVITY).unwrap();

    let (start_key, end_key) = range_bounds(&params.user_id);
    let results: Vec<ActivityRecord> = table
        .range(start_key.as_str()..end_key.as_str())
        .unwrap()
        .rev()
        .take(limit)
        .filter_map(|res| {
            res.ok()
                .and_then(|(_, value)| serde_json::from_str::<ActivityRecord>(value.value()).ok())
        })
        .collect();

    Json(json!({
        "limit": limit,
        "total_fetched": results.len(),
        "data": results
    }))
    .into_response()
}
