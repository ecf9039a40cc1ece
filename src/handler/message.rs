//! Message tracking handlers
//!
//! The delivery notifier (an external collaborator) reports progress for one
//! message at a time through `update_message_status`. The per-message state
//! machine is `pending -> sent -> delivered -> read` with `failed` reachable
//! from `pending` or `sent`, but no transition is rejected: the notifier is
//! trusted to report what the provider said.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use redb::ReadableTable;
use serde_json::json;

use crate::database::{AppState, TABLE_CAMPAIGNS, TABLE_CAMPAIGN_INDEX, TABLE_MESSAGES};
use crate::model::{CampaignRecord, MessageRecord, MessageStatus, MessageStatusRequest};

/// Records delivery progress for one message
///
/// This handler:
/// 1. Resolves the message (404 if missing, 403 if owned by a different user)
/// 2. Patches `status`, `updated_at`, and the timestamp field matching the
///    new status (`sent_at` / `delivered_at` / `read_at`); records the
///    provider message id and failure reason when supplied
/// 3. Mirrors the patched record into the campaign index
/// 4. On `sent` increments the parent campaign's `sent_count`, on `failed`
///    its `failed_count`, provided the campaign still exists and is owned by
///    the same user
///
/// The increment is unconditional on the message's prior status: reporting
/// `sent` twice for the same message counts twice. Everything runs in one
/// write transaction, and redb serializes writers, so two concurrent calls
/// cannot lose an increment.
///
/// # Request Body
///
/// ```json
/// {
///   "user_id": "user_123",
///   "status": "delivered",
///   "meta_message_id": "wamid.abc123"
/// }
/// ```
///
/// # Response
///
/// - **200 OK** - status recorded
/// - **404 Not Found** - message does not exist
/// - **403 Forbidden** - message owned by a different user
pub async fn update_message_status(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<MessageStatusRequest>,
) -> impl IntoResponse {
    let now = Utc::now();
    let write_txn = state.db.begin_write().unwrap();

    let record = {
        let mut table = write_txn.open_table(TABLE_MESSAGES).unwrap();

        let mut record = match table.get(id.as_str()).unwrap() {
            Some(guard) => serde_json::from_str::<MessageRecord>(guard.value()).unwrap(),
            None => return super::not_found("Message"),
        };
        if record.user_id != payload.user_id {
            return super::forbidden("message");
        }

        record.status = payload.status;
        record.updated_at = now;
        match payload.status {
            MessageStatus::Sent => record.sent_at = Some(now),
            MessageStatus::Delivered => record.delivered_at = Some(now),
            MessageStatus::Read => record.read_at = Some(now),
            MessageStatus::Pending | MessageStatus::Failed => {}
        }
        if payload.meta_message_id.is_some() {
            record.meta_message_id = payload.meta_message_id;
        }
        if payload.failure_reason.is_some() {
            record.failure_reason = payload.failure_reason;
        }

        let record_json = serde_json::to_string(&record).unwrap();
        table.insert(id.as_str(), record_json.as_str()).unwrap();

        // Keep the denormalized index copy in step with the main row
        let index_key = format!("{}:{}", record.campaign_id, record.id);
        let mut table_index = write_txn.open_table(TABLE_CAMPAIGN_INDEX).unwrap();
        table_index
            .insert(index_key.as_str(), record_json.as_str())
            .unwrap();

        record
    };

    // Terminal progress rolls up into the owning campaign's counters
    if matches!(payload.status, MessageStatus::Sent | MessageStatus::Failed) {
        let mut table = write_txn.open_table(TABLE_CAMPAIGNS).unwrap();

        let campaign = match table.get(record.campaign_id.as_str()).unwrap() {
            Some(guard) => Some(serde_json::from_str::<CampaignRecord>(guard.value()).unwrap()),
            None => None,
        };
        if let Some(mut campaign) = campaign {
            if campaign.user_id == payload.user_id {
                match payload.status {
                    MessageStatus::Sent => campaign.sent_count += 1,
                    MessageStatus::Failed => campaign.failed_count += 1,
                    _ => unreachable!(),
                }
                campaign.updated_at = now;

                let campaign_json = serde_json::to_string(&campaign).unwrap();
                table
                    .insert(campaign.id.as_str(), campaign_json.as_str())
                    .unwrap();
            }
        }
    }

    write_txn.commit().unwrap();

    (
        StatusCode::OK,
        Json(json!({
            "message": "Message status updated",
            "id": record.id
        })),
    )
        .into_response()
}
