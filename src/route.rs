//! Route definitions for the campaign messaging API
//!
//! This module configures all HTTP routes and maps them to their respective
//! handlers. Every endpoint lives under `/api` and passes through the
//! shared-secret authorization middleware.

use axum::routing::{get, post};
use axum::Router;

use crate::database::AppState;
use crate::handler::{activity, campaign, contact, message, template};

use crate::middleware::auth_middleware;
use axum::middleware;

/// Creates and configures the Axum application router with all routes
///
/// # Route Definitions
///
/// - `POST /api/contacts/import` - Contact import batch job
/// - `GET /api/contacts` - List a user's contacts
/// - `GET|POST /api/templates`, `GET|PUT|DELETE /api/templates/{id}` - Template CRUD
/// - `GET|POST /api/campaigns`, `GET /api/campaigns/{id}` - Campaign CRUD
/// - `POST /api/campaigns/{id}/status` - Campaign lifecycle transition
/// - `GET /api/campaigns/{id}/stats` - Per-status delivery counts
/// - `GET /api/campaigns/{id}/messages` - A campaign's tracking rows
/// - `POST /api/messages/{id}/status` - Message delivery-status transition
/// - `GET /api/activity` - Bounded most-recent activity listing
///
/// # Example Usage
///
/// ```no_run
/// # use std::sync::Arc;
/// # use campaigner::database::{init_db, AppState};
/// # use campaigner::route::create_app;
/// # let db = init_db("data.db").unwrap();
/// let state = AppState { db: Arc::new(db) };
/// let app = create_app(state);
/// // axum::serve(listener, app).await.unwrap();
/// ```
pub fn create_app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/contacts/import", post(contact::import_contacts))
        .route("/contacts", get(contact::list_contacts))
        .route(
            "/templates",
            get(template::list_templates).post(template::create_template),
        )
        .route(
            "/templates/{id}",
            get(template::get_template)
                .put(template::update_template)
                .delete(template::delete_template),
        )
        .route(
            "/campaigns",
            get(campaign::list_campaigns).post(campaign::create_campaign),
        )
        .route("/campaigns/{id}", get(campaign::get_campaign))
        .route(
            "/campaigns/{id}/status",
            post(campaign::update_campaign_status),
        )
        .route("/campaigns/{id}/stats", get(campaign::campaign_stats))
        .route(
            "/campaigns/{id}/messages",
            get(campaign::list_campaign_messages),
        )
        .route("/messages/{id}/status", post(message::update_message_status))
        .route("/activity", get(activity::list_activity))
        .layer(middleware::from_fn(auth_middleware));

    Router::new()
        // Mount API routes under /api
        .nest("/api", api_routes)
        // Inject the application state into all handlers
        .with_state(state)
}
