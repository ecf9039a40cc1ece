//! Database initialization and table definitions
//!
//! This module handles the setup and configuration of the embedded redb
//! database. It defines one table per store plus the campaign secondary index,
//! and provides the initialization function that creates them.

use redb::{Database, TableDefinition};
use std::sync::Arc;

/// Contact store
///
/// Key: Composite key in format "{user_id}:{number}"
/// Value: JSON-serialized ContactRecord as string
///
/// Keying by owner and phone number makes the (user_id, number) uniqueness
/// rule a property of the storage layout rather than an application-level
/// lookup: a second import of the same number lands on the same key.
pub const TABLE_CONTACTS: TableDefinition<&str, &str> = TableDefinition::new("contacts_v1");

/// Template store
///
/// Key: Template ID as string
/// Value: JSON-serialized TemplateRecord as string
pub const TABLE_TEMPLATES: TableDefinition<&str, &str> = TableDefinition::new("templates_v1");

/// Campaign store
///
/// Key: Campaign ID as string
/// Value: JSON-serialized CampaignRecord as string
pub const TABLE_CAMPAIGNS: TableDefinition<&str, &str> = TableDefinition::new("campaigns_v1");

/// Message tracking store, one row per (campaign, recipient)
///
/// Key: Message ID as string
/// Value: JSON-serialized MessageRecord as string
pub const TABLE_MESSAGES: TableDefinition<&str, &str> = TableDefinition::new("messages_v1");

/// Index table for efficient querying of a campaign's tracking rows
///
/// Key: Composite key in format "{campaign_id}:{message_id}"
/// Value: JSON-serialized MessageRecord as string
///
/// This secondary index enables the statistics scan and the per-campaign
/// message listing without iterating the whole message store. The record JSON
/// is duplicated here, so every message mutation must patch both tables
/// inside the same write transaction.
pub const TABLE_CAMPAIGN_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("campaign_index_v1");

/// Append-only activity log
///
/// Key: Composite key in format "{user_id}:{timestamp_micros}:{suffix}"
/// Value: JSON-serialized ActivityRecord as string
///
/// The timestamp in the key gives chronological ordering within one user's
/// range; the random suffix keeps two entries written in the same microsecond
/// from colliding.
pub const TABLE_ACTIVITY: TableDefinition<&str, &str> = TableDefinition::new("activity_v1");

/// Application state shared across all request handlers
///
/// Wraps the database instance in an Arc for thread-safe sharing across async
/// handlers in the Axum web framework.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe reference to the embedded database
    pub db: Arc<Database>,
}

/// Initializes the embedded database and creates all required tables
///
/// Creates or opens the database file at the specified path, opens every store
/// table plus the campaign index, and commits so the table structures are
/// persisted even if the first real write never happens.
///
/// # Arguments
///
/// * `db_path` - File path where the database should be stored (e.g., "data.db")
///
/// # Example
///
/// ```no_run
/// # use campaigner::database::init_db;
/// let db = init_db("data.db").expect("Failed to initialize database");
/// ```
pub fn init_db(db_path: &str) -> Result<Database, redb::Error> {
    let db = Database::create(db_path)?;

    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(TABLE_CONTACTS)?;
        write_txn.open_table(TABLE_TEMPLATES)?;
        write_txn.open_table(TABLE_CAMPAIGNS)?;
        write_txn.open_table(TABLE_MESSAGES)?;
        write_txn.open_table(TABLE_CAMPAIGN_INDEX)?;
        write_txn.open_table(TABLE_ACTIVITY)?;
    }
    write_txn.commit()?;

    Ok(db)
}

/// Builds the bounds for a `"{prefix}:"` composite-key range scan
///
/// The character '{' is lexicographically after ':', so
/// `"{prefix}:".."{prefix}:{"` covers exactly the keys belonging to `prefix`.
pub fn range_bounds(prefix: &str) -> (String, String) {
    (format!("{}:", prefix), format!("{}:{{", prefix))
}
