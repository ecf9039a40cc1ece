//! Contact store handlers: the import batch job and the scoped listing

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use redb::{ReadableDatabase, ReadableTable};
use serde_json::json;
use std::collections::HashMap;

use crate::database::{range_bounds, AppState, TABLE_CONTACTS};
use crate::model::{ContactRecord, ImportRequest, ImportResult, UserParams};

/// Reconciles a batch of externally supplied contacts against the store
///
/// This handler:
/// 1. Loads all of the user's existing contacts once and builds a
///    number-to-key map
/// 2. Iterates the input list strictly sequentially
/// 3. Skips (and counts) entries whose trimmed `number` or `name` is empty
/// 4. Patches the existing record for matched numbers, inserts otherwise
///
/// The map is updated after each insert, so a duplicate number later in the
/// same batch takes the update path instead of inserting a second record.
/// The whole batch runs inside a single write transaction: either every
/// valid entry lands or none does.
///
/// # Request Body
///
/// ```json
/// {
///   "user_id": "user_123",
///   "contacts": [
///     { "number": "5511999990000", "name": "Ana", "last_message_text": "oi" }
///   ]
/// }
/// ```
///
/// # Response
///
/// - **200 OK** - `{ "inserted": n, "updated": n, "skipped": n }`
pub async fn import_contacts(
    State(state): State<AppState>,
    Json(payload): Json<ImportRequest>,
) -> impl IntoResponse {
    if payload.user_id.trim().is_empty() {
        return super::invalid_request("user_id is required");
    }

    let now = Utc::now();
    let mut result = ImportResult {
        inserted: 0,
        updated: 0,
        skipped: 0,
    };

    let write_txn = state.db.begin_write().unwrap();
    {
        let mut table = write_txn.open_table(TABLE_CONTACTS).unwrap();

        // One scan up front; the loop below only does point lookups
        let (start_key, end_key) = range_bounds(&payload.user_id);
        let mut known: HashMap<String, String> = table
            .range(start_key.as_str()..end_key.as_str())
            .unwrap()
            .filter_map(|res| {
                res.ok().and_then(|(key, value)| {
                    serde_json::from_str::<ContactRecord>(value.value())
                        .ok()
                        .map(|record| (record.number, key.value().to_string()))
                })
            })
            .collect();

        for item in &payload.contacts {
            let number = item.number.trim().to_string();
            let name = item.name.trim().to_string();

            // Validation failures are recovered locally: count and move on
            if number.is_empty() || name.is_empty() {
                result.skipped += 1;
                continue;
            }

            let last_message_at = item
                .last_message_at
                .as_ref()
                .map(|v| v.trim().to_string());
            let last_message_text = item
                .last_message_text
                .as_ref()
                .map(|v| v.trim().to_string());

            match known.get(&number).cloned() {
                Some(existing_key) => {
                    let mut record = {
                        let guard = table.get(existing_key.as_str()).unwrap().unwrap();
                        serde_json::from_str::<ContactRecord>(guard.value()).unwrap()
                    };
                    record.name = name;
                    record.last_message_at = last_message_at;
                    record.last_message_text = last_message_text;
                    record.updated_at = now;

                    let record_json = serde_json::to_string(&record).unwrap();
                    table
                        .insert(existing_key.as_str(), record_json.as_str())
                        .unwrap();
                    result.updated += 1;
                }
                None => {
                    let key = format!("{}:{}", payload.user_id, number);
                    let record = ContactRecord {
                        number: number.clone(),
                        name,
                        last_message_at,
                        last_message_text,
                        user_id: payload.user_id.clone(),
                        created_at: now,
                        updated_at: now,
                    };

                    let record_json = serde_json::to_string(&record).unwrap();
                    table.insert(key.as_str(), record_json.as_str()).unwrap();

                    // Later occurrences of this number in the same batch must
                    // match the record we just wrote
                    known.insert(number, key);
                    result.inserted += 1;
                }
            }
        }
    }
    write_txn.commit().unwrap();

    (StatusCode::OK, Json(result)).into_response()
}

/// Lists all contacts belonging to one user
///
/// Uses a range scan over the "{user_id}:" key prefix, so only the caller's
/// own records are touched.
///
/// # Example Request
///
/// `GET /api/contacts?user_id=user_123`
pub async fn list_contacts(
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> impl IntoResponse {
    let read_txn = state.db.begin_read().unwrap();
    let table = read_txn.open_table(TABLE_CONTACTS).unwrap();

    let (start_key, end_key) = range_bounds(&params.user_id);
    let results: Vec<ContactRecord> = table
        .range(start_key.as_str()..end_key.as_str())
        .unwrap()
        .filter_map(|res| {
            res.ok()
                .and_then(|(_, value)| serde_json::from_str::<ContactRecord>(value.value()).ok())
        })
        .collect();

    Json(json!({
        "total_fetched": results.len(),
        "data": results
    }))
    .into_response()
}
