//! Campaign store handlers
//!
//! Campaign creation is the one multi-row write in the service: one campaign
//! row, one tracking row per recipient (with the template content
//! interpolated per recipient), and one audit entry. All of it goes through
//! a single write transaction, so no partially created campaign is ever
//! observable.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use redb::{ReadableDatabase, ReadableTable};
use serde_json::json;

use crate::database::{
    range_bounds, AppState, TABLE_CAMPAIGNS, TABLE_CAMPAIGN_INDEX, TABLE_MESSAGES, TABLE_TEMPLATES,
};
use crate::model::{
    interpolate, CampaignRecord, CampaignStats, CampaignStatus, CampaignStatusRequest,
    CreateCampaignRequest, MessageRecord, MessageStatus, TemplateRecord, UserParams,
};

/// Creates a campaign and expands its recipient list into tracking rows
///
/// This handler:
/// 1. Resolves the referenced template (404 if missing, 403 if owned by a
///    different user) - nothing is created on failure
/// 2. Creates the campaign row: `scheduled` if `scheduled_for` is supplied,
///    `draft` otherwise; counters start at zero
/// 3. Inserts one tracking row per recipient with `status = pending` and the
///    template content interpolated with that recipient's variables
/// 4. Appends one audit entry
///
/// # Response
///
/// - **201 Created** - `{ "id": "<campaign id>" }`
/// - **400 Bad Request** - missing user_id or name
/// - **404 Not Found** - template does not exist
/// - **403 Forbidden** - template owned by a different user
///
/// # Database Operations
///
/// N + 2 rows for N recipients (campaign, N messages mirrored into the
/// campaign index, audit entry), committed atomically.
pub async fn create_campaign(
    State(state): State<AppState>,
    Json(payload): Json<CreateCampaignRequest>,
) -> impl IntoResponse {
    if payload.user_id.trim().is_empty() {
        return super::invalid_request("user_id is required");
    }
    if payload.name.trim().is_empty() {
        return super::invalid_request("name is required");
    }

    let now = Utc::now();
    let write_txn = state.db.begin_write().unwrap();

    // Resolve the template before writing anything
    let template_content = {
        let table = write_txn.open_table(TABLE_TEMPLATES).unwrap();
        let template = match table.get(payload.template_id.as_str()).unwrap() {
            Some(guard) => serde_json::from_str::<TemplateRecord>(guard.value()).unwrap(),
            None => return super::not_found("Template"),
        };
        if template.user_id != payload.user_id {
            return super::forbidden("template");
        }
        template.content
    };

    let campaign = CampaignRecord {
        id: super::new_id(),
        name: payload.name,
        description: payload.description,
        template_id: payload.template_id,
        status: if payload.scheduled_for.is_some() {
            CampaignStatus::Scheduled
        } else {
            CampaignStatus::Draft
        },
        recipient_list: payload.recipient_list.clone(),
        scheduled_for: payload.scheduled_for,
        total_recipients: payload.recipient_list.len(),
        sent_count: 0,
        failed_count: 0,
        started_at: None,
        completed_at: None,
        user_id: payload.user_id,
        created_at: now,
        updated_at: now,
    };
    let campaign_json = serde_json::to_string(&campaign).unwrap();

    {
        let mut table_campaigns = write_txn.open_table(TABLE_CAMPAIGNS).unwrap();
        table_campaigns
            .insert(campaign.id.as_str(), campaign_json.as_str())
            .unwrap();

        let mut table_messages = write_txn.open_table(TABLE_MESSAGES).unwrap();
        let mut table_index = write_txn.open_table(TABLE_CAMPAIGN_INDEX).unwrap();

        for recipient in &payload.recipient_list {
            let message = MessageRecord {
                id: super::new_id(),
                campaign_id: campaign.id.clone(),
                user_id: campaign.user_id.clone(),
                phone_number: recipient.phone.clone(),
                message_content: interpolate(&template_content, &recipient.variables),
                status: MessageStatus::Pending,
                retry_count: 0,
                meta_message_id: None,
                failure_reason: None,
                sent_at: None,
                delivered_at: None,
                read_at: None,
                created_at: now,
                updated_at: now,
            };
            let message_json = serde_json::to_string(&message).unwrap();

            table_messages
                .insert(message.id.as_str(), message_json.as_str())
                .unwrap();

            let index_key = format!("{}:{}", campaign.id, message.id);
            table_index
                .insert(index_key.as_str(), message_json.as_str())
                .unwrap();
        }
    }

    super::append_activity(
        &write_txn,
        &campaign.user_id,
        "campaign_created",
        "campaign",
        &campaign.id,
        format!(
            "Campaign '{}' created with {} recipient(s)",
            campaign.name, campaign.total_recipients
        ),
    );
    write_txn.commit().unwrap();

    (StatusCode::CREATED, Json(json!({ "id": campaign.id }))).into_response()
}

/// Lists all campaigns belonging to one user
pub async fn list_campaigns(
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> impl IntoResponse {
    let read_txn = state.db.begin_read().unwrap();
    let table = read_txn.open_table(TABLE_CAMPAIGNS).unwrap();

    let results: Vec<CampaignRecord> = table
        .iter()
        .unwrap()
        .filter_map(|res| {
            res.ok()
                .and_then(|(_, value)| serde_json::from_str::<CampaignRecord>(value.value()).ok())
        })
        .filter(|record| record.user_id == params.user_id)
        .collect();

    Json(json!({
        "total_fetched": results.len(),
        "data": results
    }))
    .into_response()
}

/// Fetches one campaign with ownership verification
pub async fn get_campaign(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> impl IntoResponse {
    let read_txn = state.db.begin_read().unwrap();
    let table = read_txn.open_table(TABLE_CAMPAIGNS).unwrap();

    let record = match table.get(id.as_str()).unwrap() {
        Some(guard) => serde_json::from_str::<CampaignRecord>(guard.value()).unwrap(),
        None => return super::not_found("Campaign"),
    };
    if record.user_id != params.user_id {
        return super::forbidden("campaign");
    }

    Json(record).into_response()
}

/// Applies a campaign lifecycle transition
///
/// No transition validation is performed: any status may be written over any
/// prior status. Entering `sending` records `started_at` the first time;
/// entering `sent` or `cancelled` records `completed_at`. Appends one audit
/// entry.
///
/// # Request Body
///
/// ```json
/// { "user_id": "user_123", "status": "sending" }
/// ```
pub async fn update_campaign_status(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<CampaignStatusRequest>,
) -> impl IntoResponse {
    let now = Utc::now();
    let write_txn = state.db.begin_write().unwrap();

    let record = {
        let mut table = write_txn.open_table(TABLE_CAMPAIGNS).unwrap();

        let mut record = match table.get(id.as_str()).unwrap() {
            Some(guard) => serde_json::from_str::<CampaignRecord>(guard.value()).unwrap(),
            None => return super::not_found("Campaign"),
        };
        if record.user_id != payload.user_id {
            return super::forbidden("campaign");
        }

        record.status = payload.status;
        match payload.status {
            CampaignStatus::Sending => {
                if record.started_at.is_none() {
                    record.started_at = Some(now);
                }
            }
            CampaignStatus::Sent | CampaignStatus::Cancelled => {
                record.completed_at = Some(now);
            }
            _ => {}
        }
        record.updated_at = now;

        let record_json = serde_json::to_string(&record).unwrap();
        table.insert(id.as_str(), record_json.as_str()).unwrap();
        record
    };

    super::append_activity(
        &write_txn,
        &record.user_id,
        "campaign_status_changed",
        "campaign",
        &record.id,
        format!(
            "Campaign '{}' moved to {}",
            record.name,
            format!("{:?}", record.status).to_lowercase()
        ),
    );
    write_txn.commit().unwrap();

    Json(record).into_response()
}

/// Computes per-status counts over one campaign's tracking rows
///
/// Scans the campaign index and counts by delivery status. Recomputed on
/// every call; campaigns are bounded by the recipient list supplied by the
/// user, so the O(n) scan stays small.
///
/// # Response
///
/// - **200 OK** - `{ "total", "pending", "sent", "delivered", "read", "failed" }`
/// - **404 Not Found** / **403 Forbidden** - campaign missing or not owned
pub async fn campaign_stats(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> impl IntoResponse {
    let read_txn = state.db.begin_read().unwrap();

    {
        let table = read_txn.open_table(TABLE_CAMPAIGNS).unwrap();
        let record = match table.get(id.as_str()).unwrap() {
            Some(guard) => serde_json::from_str::<CampaignRecord>(guard.value()).unwrap(),
            None => return super::not_found("Campaign"),
        };
        if record.user_id != params.user_id {
            return super::forbidden("campaign");
        }
    }

    let table = read_txn.open_table(TABLE_CAMPAIGN_INDEX).unwrap();
    let (start_key, end_key) = range_bounds(&id);

    let mut stats = CampaignStats::default();
    for res in table.range(start_key.as_str()..end_key.as_str()).unwrap() {
        let Ok((_, value)) = res else { continue };
        let Ok(message) = serde_json::from_str::<MessageRecord>(value.value()) else {
            continue;
        };
        stats.total += 1;
        match message.status {
            MessageStatus::Pending => stats.pending += 1,
            MessageStatus::Sent => stats.sent += 1,
            MessageStatus::Delivered => stats.delivered += 1,
            MessageStatus::Read => stats.read += 1,
            MessageStatus::Failed => stats.failed += 1,
        }
    }

    Json(stats).into_response()
}

/// Lists one campaign's tracking rows
///
/// Serves the delivery-tracking table in the UI. Uses the same ownership
/// check and index range scan as the statistics handler.
pub async fn list_campaign_messages(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> impl IntoResponse {
    let read_txn = state.db.begin_read().unwrap();

    {
        let table = read_txn.open_table(TABLE_CAMPAIGNS).unwrap();
        let record = match table.get(id.as_str()).unwrap() {
            Some(guard) => serde_json::from_str::<CampaignRecord>(guard.value()).unwrap(),
            None => return super::not_found("Campaign"),
        };
        if record.user_id != params.user_id {
            return super::forbidden("campaign");
        }
    }

    let table = read_txn.open_table(TABLE_CAMPAIGN_INDEX).unwrap();
    let (start_key, end_key) = range_bounds(&id);
    let results: Vec<MessageRecord> = table
        .range(start_key.as_str()..end_key.as_str())
        .unwrap()
        .filter_map(|res| {
            res.ok()
                .and_then(|(_, value)| serde_json::from_str::<MessageRecord>(value.value()).ok())
        })
        .collect();

    Json(json!({
        "total_fetched": results.len(),
        "data": results
    }))
    .into_response()
}
