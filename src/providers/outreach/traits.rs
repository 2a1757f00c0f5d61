//! Outreach provider trait definition.
//!
//! This module defines the [`OutreachProvider`] trait which abstracts the
//! upstream email-marketing platform behind the relay. The production
//! implementation is [`PiplProvider`](super::PiplProvider); tests substitute
//! stubs to exercise the caching and fallback layers without network access.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{CampaignId, EmailId, EmailRecord, LeadsPage, SequenceId, ThreadId};

/// Result type alias for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Errors that can occur while talking to the upstream provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Network-level failure reaching the upstream, including timeouts.
    #[error("transport error: {0}")]
    Transport(String),

    /// The upstream answered with a non-success status.
    #[error("upstream returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, when one could be read.
        body: String,
    },

    /// The upstream payload did not match any recognized shape.
    #[error("unrecognized response shape: {0}")]
    Shape(String),

    /// A required configuration value is absent.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ProviderError {
    /// Whether this failure is in the not-found class, which drives
    /// advancement through fallback tiers.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

/// Caller-facing filter parameters for a unibox email query.
///
/// Optional filters that are `None` are omitted from the upstream call
/// entirely rather than sent as empty values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailQuery {
    /// Return truncated preview content without thread expansion.
    pub preview_only: bool,
    /// Restrict to emails exchanged with this lead.
    pub lead_email: Option<String>,
    /// Restrict to emails belonging to this campaign.
    pub campaign_id: Option<CampaignId>,
    /// Email type filter understood by the upstream.
    pub email_type: String,
    /// Restrict to emails carrying this label.
    pub label: Option<String>,
}

impl Default for EmailQuery {
    fn default() -> Self {
        Self {
            preview_only: true,
            lead_email: None,
            campaign_id: None,
            email_type: "all".to_string(),
            label: None,
        }
    }
}

impl EmailQuery {
    /// Deterministic cache key built from the ordered, named significant
    /// parameters. Two logically-identical queries produce the same key.
    pub fn fingerprint(&self) -> String {
        format!(
            "preview={}&lead={}&campaign={}&type={}&label={}",
            self.preview_only,
            self.lead_email.as_deref().unwrap_or(""),
            self.campaign_id.as_ref().map(|c| c.0.as_str()).unwrap_or(""),
            self.email_type,
            self.label.as_deref().unwrap_or(""),
        )
    }
}

/// Filter and pagination parameters for a workspace lead listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadQuery {
    /// Restrict to leads in this campaign.
    pub campaign_id: Option<CampaignId>,
    /// Restrict to leads with this status.
    pub status: Option<String>,
    /// Restrict to leads carrying this label.
    pub label: Option<String>,
    /// Restrict to this exact lead email.
    pub email: Option<String>,
    /// Restrict by first name.
    pub first_name: Option<String>,
    /// Restrict by last name.
    pub last_name: Option<String>,
    /// Page number, starting at 1.
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// Upstream sort key.
    pub sort: String,
    /// Sort direction, `asc` or `desc`.
    pub direction: String,
}

impl Default for LeadQuery {
    fn default() -> Self {
        Self {
            campaign_id: None,
            status: None,
            label: None,
            email: None,
            first_name: None,
            last_name: None,
            page: 1,
            limit: 10,
            sort: "_id".to_string(),
            direction: "asc".to_string(),
        }
    }
}

/// An email to be sent through the upstream.
///
/// With `reply_to_id` set this becomes a reply into an existing thread;
/// without it the recipient is enrolled as a new lead in the configured
/// default campaign, carrying the subject and body as custom variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutgoingEmail {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Body content.
    pub body: String,
    /// Email being replied to, if any.
    pub reply_to_id: Option<EmailId>,
}

/// Trait for the upstream outreach platform.
///
/// Implementations translate caller-facing parameters into upstream query
/// parameters, issue the HTTPS calls, and reshape every response into the
/// normalized domain entities. Failure handling policy (propagate vs.
/// degrade) is NOT applied here; that is the service layer's concern.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OutreachProvider: Send + Sync {
    /// Fetches unibox emails matching `query`, fully normalized.
    ///
    /// When `query.preview_only` is false and a record carries a thread id,
    /// the full conversation is fetched and the record's body replaced with
    /// its matching thread entry. Thread expansion is best-effort: its
    /// failure empties `thread` and never fails the outer call.
    async fn fetch_emails(&self, query: EmailQuery) -> Result<Vec<EmailRecord>>;

    /// Sends an email, either as a thread reply or as a new-lead enrollment.
    async fn send_email(&self, outgoing: OutgoingEmail) -> Result<Value>;

    /// Lists all campaigns in the workspace.
    async fn list_campaigns(&self) -> Result<Vec<Value>>;

    /// Adds a lead to a follow-up sequence.
    async fn add_lead_to_sequence(&self, email: &str, sequence_id: SequenceId) -> Result<Value>;

    /// Lists all workspace tags.
    async fn list_tags(&self) -> Result<Vec<Value>>;

    /// Updates a lead's custom variables within a campaign.
    async fn update_lead(
        &self,
        email: &str,
        campaign_id: CampaignId,
        variables: Value,
    ) -> Result<Value>;

    /// Fetches campaign statistics, across the workspace or for one campaign.
    async fn campaign_stats(&self, campaign_id: Option<CampaignId>) -> Result<Value>;

    /// Fetches labels from the dedicated labels endpoint.
    ///
    /// Only the raw endpoint; the tag-derivation and fixed-default fallback
    /// tiers live in the service layer.
    async fn list_labels(&self) -> Result<Vec<String>>;

    /// Sets the label on an email.
    async fn update_email_label(&self, email_id: EmailId, label: &str) -> Result<Value>;

    /// Lists workspace leads, folding all upstream response shapes into a
    /// uniform [`LeadsPage`].
    async fn list_leads(&self, query: LeadQuery) -> Result<LeadsPage>;

    /// Marks a thread as read.
    async fn mark_thread_read(&self, thread_id: ThreadId) -> Result<Value>;

    /// Returns the unread email count payload.
    async fn unread_count(&self) -> Result<Value>;
}
