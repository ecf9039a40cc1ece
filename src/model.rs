//! Data models for the campaign messaging service
//!
//! This module defines all the data structures used throughout the application:
//! the database record structures for every store (contacts, templates,
//! campaigns, message tracking, activity log), the status enums that drive the
//! campaign and per-message state machines, and the request/response payloads
//! accepted by the HTTP entry points.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delivery status of a single tracked message
///
/// The intended progression is `pending -> sent -> delivered -> read`, with
/// `failed` reachable from `pending` or `sent`. No transition validation is
/// performed by the service: any status may be written over any prior status.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Pending,
    Sent,
    Delivered,
    Read,
    Failed,
}

/// Lifecycle status of a campaign
///
/// `draft` and `scheduled` are pre-launch states (chosen at creation time
/// depending on whether `scheduled_for` is supplied). The remaining states are
/// driven by explicit transition calls; the service does not derive a terminal
/// campaign status from its messages.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Draft,
    Scheduled,
    Sending,
    Sent,
    Paused,
    Cancelled,
}

/// Review status of a message template
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TemplateStatus {
    Draft,
    Approved,
    Rejected,
}

/// Declared type of a template variable
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Text,
    Number,
    Date,
    Url,
}

/// Represents a contact record stored in the database
///
/// Contacts are keyed by `"{user_id}:{number}"`, so the storage key itself
/// guarantees at most one record per (owner, phone number) pair. Records are
/// created and updated by the import job and never deleted.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ContactRecord {
    /// Phone number in whatever format the importer supplied (trimmed)
    pub number: String,

    /// Display name of the contact
    pub name: String,

    /// Timestamp string of the last message exchanged with this contact,
    /// as reported by the importing client (not parsed by the service)
    pub last_message_at: Option<String>,

    /// Text of the last message exchanged with this contact
    pub last_message_text: Option<String>,

    /// Owning user; all lookups are scoped by this value
    pub user_id: String,

    /// Timestamp when this contact was first imported
    pub created_at: DateTime<Utc>,

    /// Timestamp of the most recent import touching this contact
    pub updated_at: DateTime<Utc>,
}

/// A named placeholder declared by a template
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TemplateVariable {
    /// Human-readable name (e.g., "customer_name")
    pub name: String,

    /// The literal placeholder token in the content (e.g., "{{1}}")
    pub placeholder: String,

    /// Declared value type, informational only
    pub kind: VariableKind,

    /// Whether the variable is expected for every recipient
    pub required: bool,
}

/// Represents a message template stored in the database
///
/// The `content` field carries numbered placeholders (`{{1}}`, `{{2}}`, ...)
/// that are substituted per recipient when a campaign is created.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TemplateRecord {
    /// Unique identifier of the template
    pub id: String,

    pub name: String,

    pub category: String,

    /// Message body with `{{n}}` placeholders
    pub content: String,

    #[serde(default)]
    pub variables: Vec<TemplateVariable>,

    pub status: TemplateStatus,

    /// Owning user
    pub user_id: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// One entry of a campaign's recipient list
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Recipient {
    /// Destination phone number
    pub phone: String,

    /// Positional variable values substituted into the template content;
    /// `variables[0]` fills `{{1}}`, `variables[1]` fills `{{2}}`, and so on
    #[serde(default)]
    pub variables: Vec<String>,
}

/// Represents a campaign record stored in the database
///
/// A campaign groups one template, a recipient list, and aggregate delivery
/// counters. The invariant `sent_count + failed_count <= total_recipients`
/// holds as long as each message reaches `sent`/`failed` at most once; the
/// counters are incremented per status transition, not reconciled.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CampaignRecord {
    /// Unique identifier of the campaign
    pub id: String,

    pub name: String,

    pub description: Option<String>,

    /// The template whose content was expanded for this campaign
    pub template_id: String,

    pub status: CampaignStatus,

    /// The recipient list as supplied at creation time
    pub recipient_list: Vec<Recipient>,

    /// Client-supplied schedule marker; its presence at creation time decides
    /// whether the campaign starts as `scheduled` or `draft`
    pub scheduled_for: Option<String>,

    pub total_recipients: usize,

    /// Number of messages that have reached `sent`
    pub sent_count: u64,

    /// Number of messages that have reached `failed`
    pub failed_count: u64,

    /// Set the first time the campaign enters `sending`
    pub started_at: Option<DateTime<Utc>>,

    /// Set when the campaign enters `sent` or `cancelled`
    pub completed_at: Option<DateTime<Utc>>,

    /// Owning user
    pub user_id: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Represents the per-recipient delivery record for a campaign
///
/// One row is created per recipient at campaign-creation time with
/// `status = pending`; the status is mutated thereafter by the external
/// delivery notifier calling the status entry point.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageRecord {
    /// Unique identifier of the tracking row
    pub id: String,

    /// The owning campaign
    pub campaign_id: String,

    /// Owning user (same as the campaign's)
    pub user_id: String,

    /// Destination phone number
    pub phone_number: String,

    /// Template content with this recipient's variables interpolated
    pub message_content: String,

    pub status: MessageStatus,

    /// Reserved for a delivery-retry pass; always written as 0 today
    #[serde(default)]
    pub retry_count: u32,

    /// Provider-side message identifier, recorded when the notifier supplies it
    pub meta_message_id: Option<String>,

    /// Failure detail, recorded on `failed` transitions
    pub failure_reason: Option<String>,

    pub sent_at: Option<DateTime<Utc>>,

    pub delivered_at: Option<DateTime<Utc>>,

    pub read_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// One append-only audit trail entry
///
/// Written as a side effect of every mutation; read back only through the
/// bounded most-recent listing.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ActivityRecord {
    pub user_id: String,

    /// Verb describing the mutation (e.g., "template_created")
    pub action: String,

    /// Kind of resource mutated ("template", "campaign", "message")
    pub resource_type: String,

    /// Identifier of the mutated resource
    pub resource_id: String,

    /// Free-form human-readable summary
    pub details: String,

    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Request / response payloads
// ---------------------------------------------------------------------------

/// One raw entry of a contact import batch
///
/// `number` and `name` must be non-empty after trimming; entries failing that
/// check are counted as skipped and otherwise ignored.
#[derive(Deserialize, Debug, Clone)]
pub struct ContactItem {
    #[serde(default)]
    pub number: String,

    #[serde(default)]
    pub name: String,

    pub last_message_at: Option<String>,

    pub last_message_text: Option<String>,
}

/// Request payload for the contact import batch job
///
/// # Example
/// ```json
/// {
///   "user_id": "user_123",
///   "contacts": [
///     { "number": "5511999990000", "name": "Ana" }
///   ]
/// }
/// ```
#[derive(Deserialize)]
pub struct ImportRequest {
    pub user_id: String,
    pub contacts: Vec<ContactItem>,
}

/// Per-batch reconciliation counts returned by the import job
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ImportResult {
    pub inserted: u64,
    pub updated: u64,
    pub skipped: u64,
}

/// Request payload for creating a template
#[derive(Deserialize)]
pub struct CreateTemplateRequest {
    pub user_id: String,
    pub name: String,
    pub category: String,
    pub content: String,
    #[serde(default)]
    pub variables: Vec<TemplateVariable>,
}

/// Request payload for partially updating a template
///
/// Absent fields keep their stored value; `updated_at` is always bumped.
#[derive(Deserialize)]
pub struct UpdateTemplateRequest {
    pub user_id: String,
    pub name: Option<String>,
    pub category: Option<String>,
    pub content: Option<String>,
    pub variables: Option<Vec<TemplateVariable>>,
    pub status: Option<TemplateStatus>,
}

/// Request payload for creating a campaign
///
/// # Example
/// ```json
/// {
///   "user_id": "user_123",
///   "name": "August promo",
///   "template_id": "aZ3kQ9mN2pX7",
///   "recipient_list": [
///     { "phone": "5511999990000", "variables": ["Ana", "50"] }
///   ]
/// }
/// ```
#[derive(Deserialize)]
pub struct CreateCampaignRequest {
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub template_id: String,
    #[serde(default)]
    pub recipient_list: Vec<Recipient>,
    pub scheduled_for: Option<String>,
}

/// Request payload for a campaign lifecycle transition
#[derive(Deserialize)]
pub struct CampaignStatusRequest {
    pub user_id: String,
    pub status: CampaignStatus,
}

/// Request payload for a message delivery-status transition
#[derive(Deserialize)]
pub struct MessageStatusRequest {
    pub user_id: String,
    pub status: MessageStatus,
    pub meta_message_id: Option<String>,
    pub failure_reason: Option<String>,
}

/// Per-status counts over one campaign's tracking rows
///
/// Recomputed by scanning the campaign's messages on every call; no caching.
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub struct CampaignStats {
    pub total: u64,
    pub pending: u64,
    pub sent: u64,
    pub delivered: u64,
    pub read: u64,
    pub failed: u64,
}

/// Query parameters carrying the calling user for scoped reads
#[derive(Deserialize)]
pub struct UserParams {
    pub user_id: String,
}

/// Query parameters for the bounded activity listing
///
/// # Example
/// Query string: `?user_id=user_123&limit=50`
#[derive(Deserialize)]
pub struct ActivityParams {
    pub user_id: String,

    /// Number of most-recent entries to return
    /// Defaults to 20 if not provided, maximum is 100
    pub limit: Option<usize>,
}

/// Interpolates numbered placeholders into template content
///
/// Replaces every occurrence of `{{i}}` (1-indexed) with `variables[i - 1]`.
/// Placeholders with no matching variable are left literally in place; extra
/// variables with no matching placeholder are ignored. No error is raised in
/// either direction.
///
/// # Example
///
/// ```
/// # use campaigner::model::interpolate;
/// let out = interpolate("Olá {{1}}, total {{2}}", &["Ana".into()]);
/// assert_eq!(out, "Olá Ana, total {{2}}");
/// ```
pub fn interpolate(content: &str, variables: &[String]) -> String {
    let mut result = content.to_string();
    for (i, value) in variables.iter().enumerate() {
        let placeholder = format!("{{{{{}}}}}", i + 1);
        result = result.replace(&placeholder, value);
    }
    result
}
