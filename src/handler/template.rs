//! Template store handlers: CRUD with an audit side-write on every mutation

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use redb::{ReadableDatabase, ReadableTable};
use serde_json::json;

use crate::database::{AppState, TABLE_TEMPLATES};
use crate::model::{
    CreateTemplateRequest, TemplateRecord, TemplateStatus, UpdateTemplateRequest, UserParams,
};

/// Creates a new message template
///
/// Templates start in `draft` status. The content may carry `{{n}}`
/// placeholders; nothing validates them here, interpolation at campaign
/// creation simply leaves unmatched placeholders literal.
///
/// # Response
///
/// - **201 Created** - the stored template record
/// - **400 Bad Request** - missing user_id, name or content
pub async fn create_template(
    State(state): State<AppState>,
    Json(payload): Json<CreateTemplateRequest>,
) -> impl IntoResponse {
    if payload.user_id.trim().is_empty() {
        return super::invalid_request("user_id is required");
    }
    if payload.name.trim().is_empty() {
        return super::invalid_request("name is required");
    }
    if payload.content.trim().is_empty() {
        return super::invalid_request("content is required");
    }

    let now = Utc::now();
    let record = TemplateRecord {
        id: super::new_id(),
        name: payload.name,
        category: payload.category,
        content: payload.content,
        variables: payload.variables,
        status: TemplateStatus::Draft,
        user_id: payload.user_id,
        created_at: now,
        updated_at: now,
    };
    let record_json = serde_json::to_string(&record).unwrap();

    let write_txn = state.db.begin_write().unwrap();
    {
        let mut table = write_txn.open_table(TABLE_TEMPLATES).unwrap();
        table
            .insert(record.id.as_str(), record_json.as_str())
            .unwrap();
    }
    super::append_activity(
        &write_txn,
        &record.user_id,
        "template_created",
        "template",
        &record.id,
        format!("Template '{}' created", record.name),
    );
    write_txn.commit().unwrap();

    (StatusCode::CREATED, Json(record)).into_response()
}

/// Lists all templates belonging to one user
pub async fn list_templates(
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> impl IntoResponse {
    let read_txn = state.db.begin_read().unwrap();
    let table = read_txn.open_table(TABLE_TEMPLATES).unwrap();

    let results: Vec<TemplateRecord> = table
        .iter()
        .unwrap()
        .filter_map(|res| {
            res.ok()
                .and_then(|(_, value)| serde_json::from_str::<TemplateRecord>(value.value()).ok())
        })
        .filter(|record| record.user_id == params.user_id)
        .collect();

    Json(json!({
        "total_fetched": results.len(),
        "data": results
    }))
    .into_response()
}

/// Fetches one template with ownership verification
///
/// # Response
///
/// - **200 OK** - the template record
/// - **404 Not Found** - no template under this ID
/// - **403 Forbidden** - template owned by a different user
pub async fn get_template(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> impl IntoResponse {
    let read_txn = state.db.begin_read().unwrap();
    let table = read_txn.open_table(TABLE_TEMPLATES).unwrap();

    let record = match table.get(id.as_str()).unwrap() {
        Some(guard) => serde_json::from_str::<TemplateRecord>(guard.value()).unwrap(),
        None => return super::not_found("Template"),
    };
    if record.user_id != params.user_id {
        return super::forbidden("template");
    }

    Json(record).into_response()
}

/// Partially updates a template
///
/// Only the fields present in the payload are changed; `updated_at` is always
/// bumped. Appends one audit entry.
pub async fn update_template(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateTemplateRequest>,
) -> impl IntoResponse {
    let write_txn = state.db.begin_write().unwrap();

    let record = {
        let mut table = write_txn.open_table(TABLE_TEMPLATES).unwrap();

        let mut record = match table.get(id.as_str()).unwrap() {
            Some(guard) => serde_json::from_str::<TemplateRecord>(guard.value()).unwrap(),
            None => return super::not_found("Template"),
        };
        if record.user_id != payload.user_id {
            return super::forbidden("template");
        }

        if let Some(name) = payload.name {
            record.name = name;
        }
        if let Some(category) = payload.category {
            record.category = category;
        }
        if let Some(content) = payload.content {
            record.content = content;
        }
        if let Some(variables) = payload.variables {
            record.variables = variables;
        }
        if let Some(status) = payload.status {
            record.status = status;
        }
        record.updated_at = Utc::now();

        let record_json = serde_json::to_string(&record).unwrap();
        table.insert(id.as_str(), record_json.as_str()).unwrap();
        record
    };

    super::append_activity(
        &write_txn,
        &record.user_id,
        "template_updated",
        "template",
        &record.id,
        format!("Template '{}' updated", record.name),
    );
    write_txn.commit().unwrap();

    Json(record).into_response()
}

/// Deletes a template with ownership verification
///
/// # Response
///
/// - **200 OK** - template removed
/// - **404 Not Found** - no template under this ID
/// - **403 Forbidden** - template owned by a different user
pub async fn delete_template(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> impl IntoResponse {
    let write_txn = state.db.begin_write().unwrap();

    let record = {
        let mut table = write_txn.open_table(TABLE_TEMPLATES).unwrap();

        let record = match table.get(id.as_str()).unwrap() {
            Some(guard) => serde_json::from_str::<TemplateRecord>(guard.value()).unwrap(),
            None => return super::not_found("Template"),
        };
        if record.user_id != params.user_id {
            return super::forbidden("template");
        }

        table.remove(id.as_str()).unwrap();
        record
    };

    super::append_activity(
        &write_txn,
        &record.user_id,
        "template_deleted",
        "template",
        &record.id,
        format!("Template '{}' deleted", record.name),
    );
    write_txn.commit().unwrap();

    (
        StatusCode::OK,
        Json(json!({
            "message": "Template deleted successfully",
            "deleted_id": id
        })),
    )
        .into_response()
}
