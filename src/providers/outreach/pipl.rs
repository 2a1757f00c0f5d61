//! pipl.ai provider implementation.
//!
//! This module provides an [`OutreachProvider`] implementation over the
//! pipl.ai REST API. It handles API-key authentication, unibox email
//! fetching with on-demand thread expansion, sending (reply and new-lead
//! modes), and the lead/campaign/tag/label/analytics listing endpoints.
//!
//! # Response reshaping
//!
//! The upstream is inconsistent about response shapes: email bodies arrive
//! as strings or partial objects, address lists and flags go missing, and
//! the leads endpoint answers with an envelope, a bare object, or a bare
//! list depending on the filters. Everything returned from this module is
//! normalized into the domain entities before it escapes.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{EmailQuery, LeadQuery, OutgoingEmail, OutreachProvider, ProviderError, Result};
use crate::config::Settings;
use crate::domain::{
    Address, CampaignId, EmailBody, EmailId, EmailRecord, LeadId, LeadsPage, SequenceId, ThreadId,
};

/// Timeout applied to every upstream round trip.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Generic `{data: [...]}` envelope used by the unibox endpoints.
#[derive(Debug, Deserialize)]
struct DataEnvelope {
    #[serde(default)]
    data: Vec<Value>,
}

/// Response of the dedicated labels endpoint.
#[derive(Debug, Deserialize)]
struct LabelsResponse {
    #[serde(default)]
    labels: Vec<String>,
}

/// An upstream email record before normalization.
///
/// Every field is optional; the upstream omits or nulls them freely.
#[derive(Debug, Deserialize)]
struct RawEmail {
    id: Option<String>,
    message_id: Option<String>,
    subject: Option<String>,
    from_address_email: Option<String>,
    from_address_json: Option<Vec<Address>>,
    to_address_json: Option<Vec<Address>>,
    cc_address_json: Option<Vec<Address>>,
    timestamp_created: Option<String>,
    content_preview: Option<String>,
    body: Option<RawBody>,
    label: Option<String>,
    campaign_id: Option<String>,
    lead_id: Option<String>,
    thread_id: Option<String>,
    is_unread: Option<bool>,
}

/// The upstream body union: a bare string, a partial `{text, html}` object,
/// or something unrecognized.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawBody {
    Text(String),
    Structured {
        text: Option<String>,
        html: Option<String>,
    },
    Other(Value),
}

/// pipl.ai API provider.
///
/// Holds a pre-configured [`reqwest::Client`] carrying the `x-api-key`
/// header and the fixed timeout; the workspace identifier is attached to
/// every call.
pub struct PiplProvider {
    client: reqwest::Client,
    base_url: String,
    workspace_id: String,
    sender: String,
    default_campaign_id: Option<CampaignId>,
}

impl PiplProvider {
    /// Creates a provider from the loaded settings.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Config`] if the API key cannot be used as a
    /// header value, or [`ProviderError::Transport`] if the HTTP client
    /// cannot be constructed.
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut key = HeaderValue::from_str(&settings.api_key)
            .map_err(|e| ProviderError::Config(format!("invalid API key: {}", e)))?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            workspace_id: settings.workspace_id.clone(),
            sender: settings.sender(),
            default_campaign_id: settings.default_campaign_id.clone(),
        })
    }

    /// Base query parameters attached to every upstream call.
    fn workspace_params(&self) -> Vec<(&'static str, String)> {
        vec![("workspace_id", self.workspace_id.clone())]
    }

    /// Issues a GET request and decodes the JSON response.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "upstream GET");

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        self.handle_response(response).await
    }

    /// Issues a POST request with a JSON body and decodes the response.
    async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "upstream POST");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        self.handle_response(response).await
    }

    /// Decodes a successful response, or classifies the failure.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            return Err(self.error_for(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Shape(e.to_string()))
    }

    /// Builds the status error for a non-success response, logging the
    /// upstream body.
    async fn error_for(&self, response: reqwest::Response) -> ProviderError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        tracing::error!(status, body = %body, "upstream request failed");
        ProviderError::Status { status, body }
    }

    /// Fetches and normalizes a full conversation.
    async fn fetch_thread(&self, thread_id: &ThreadId) -> Result<Vec<EmailRecord>> {
        let envelope: DataEnvelope = self
            .get_json(
                &format!("/unibox/thread/{}", thread_id),
                &self.workspace_params(),
            )
            .await?;

        Ok(records_from_values(envelope.data))
    }
}

/// Normalizes the body union into the invariant `{text, html}` shape.
fn normalize_body(raw: Option<RawBody>) -> EmailBody {
    match raw {
        Some(RawBody::Text(content)) => EmailBody::from_plain(content),
        Some(RawBody::Structured { text, html }) => EmailBody {
            text: text.unwrap_or_default(),
            html: html.unwrap_or_default(),
        },
        Some(RawBody::Other(_)) | None => EmailBody::default(),
    }
}

/// Lenient RFC 3339 parse; anything unparseable normalizes to `None`.
fn parse_timestamp(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Converts an upstream record into the normalized domain entity,
/// backfilling every missing field with a type-appropriate default.
fn normalize_email(raw: RawEmail) -> EmailRecord {
    let from_address_email = raw.from_address_email.unwrap_or_default();
    let from_address_json = raw
        .from_address_json
        .unwrap_or_else(|| vec![Address::new(from_address_email.clone())]);

    EmailRecord {
        id: EmailId::from(raw.id.unwrap_or_default()),
        message_id: raw.message_id.unwrap_or_default(),
        subject: raw.subject.unwrap_or_default(),
        from_address_email,
        from_address_json,
        to_address_json: raw.to_address_json.unwrap_or_default(),
        cc_address_json: raw.cc_address_json.unwrap_or_default(),
        timestamp_created: parse_timestamp(raw.timestamp_created),
        content_preview: raw.content_preview.unwrap_or_default(),
        body: normalize_body(raw.body),
        thread: Vec::new(),
        label: raw.label,
        campaign_id: raw.campaign_id.map(CampaignId::from),
        lead_id: raw.lead_id.map(LeadId::from),
        thread_id: raw.thread_id.filter(|t| !t.is_empty()).map(ThreadId::from),
        is_unread: raw.is_unread.unwrap_or(false),
    }
}

/// Decodes and normalizes a list of raw records, skipping entries that do
/// not decode at all rather than failing the batch.
fn records_from_values(values: Vec<Value>) -> Vec<EmailRecord> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<RawEmail>(value) {
            Ok(raw) => Some(normalize_email(raw)),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed email record");
                None
            }
        })
        .collect()
}

/// Applies the result of a thread fetch to a record.
///
/// On success the record adopts the full conversation, and its body is
/// replaced by the matching thread entry's body when one exists. On failure
/// the thread is left empty; the outer fetch never fails here.
fn apply_thread_expansion(record: &mut EmailRecord, thread: Result<Vec<EmailRecord>>) {
    match thread {
        Ok(entries) => {
            if let Some(entry) = entries.iter().find(|e| e.id == record.id) {
                record.body = entry.body.clone();
            }
            record.thread = entries;
        }
        Err(e) => {
            tracing::warn!(id = %record.id, error = %e, "thread expansion failed");
            record.thread = Vec::new();
        }
    }
}

/// Folds the four possible upstream leads shapes into a uniform page.
///
/// An envelope missing `total`/`page`/`limit` is backfilled; an
/// unrecognized payload maps to an empty page, never an error.
fn normalize_leads_page(payload: Value, page: u32, limit: u32) -> LeadsPage {
    match payload {
        Value::Object(map) if map.contains_key("data") => {
            let data = match map.get("data") {
                Some(Value::Array(items)) => items.clone(),
                _ => Vec::new(),
            };
            LeadsPage {
                total: map
                    .get("total")
                    .and_then(Value::as_u64)
                    .unwrap_or(data.len() as u64),
                page: map
                    .get("page")
                    .and_then(Value::as_u64)
                    .map(|p| p as u32)
                    .unwrap_or(page),
                limit: map
                    .get("limit")
                    .and_then(Value::as_u64)
                    .map(|l| l as u32)
                    .unwrap_or(limit),
                data,
            }
        }
        Value::Object(map) if map.contains_key("_id") => LeadsPage {
            data: vec![Value::Object(map)],
            total: 1,
            page,
            limit,
        },
        Value::Array(items) => LeadsPage {
            total: items.len() as u64,
            data: items,
            page,
            limit,
        },
        _ => {
            tracing::warn!("unrecognized leads response shape");
            LeadsPage::empty(page, limit)
        }
    }
}

#[async_trait::async_trait]
impl OutreachProvider for PiplProvider {
    async fn fetch_emails(&self, query: EmailQuery) -> Result<Vec<EmailRecord>> {
        let mut params = self.workspace_params();
        params.push(("preview_only", query.preview_only.to_string()));
        params.push(("email_type", query.email_type.clone()));
        if let Some(lead) = &query.lead_email {
            params.push(("lead", lead.clone()));
        }
        if let Some(campaign) = &query.campaign_id {
            params.push(("campaign_id", campaign.0.clone()));
        }
        if let Some(label) = &query.label {
            params.push(("label", label.clone()));
        }

        let envelope: DataEnvelope = self.get_json("/unibox/emails", &params).await?;
        let mut records = records_from_values(envelope.data);

        if !query.preview_only {
            for record in &mut records {
                let Some(thread_id) = record.thread_id.clone() else {
                    continue;
                };
                let thread = self.fetch_thread(&thread_id).await;
                apply_thread_expansion(record, thread);
            }
        }

        Ok(records)
    }

    async fn send_email(&self, outgoing: OutgoingEmail) -> Result<Value> {
        match &outgoing.reply_to_id {
            Some(reply_to) => {
                let payload = json!({
                    "workspace_id": self.workspace_id,
                    "reply_to_id": reply_to,
                    "subject": outgoing.subject,
                    "to": outgoing.to,
                    "body": outgoing.body,
                    "from": self.sender,
                });
                self.post_json("/unibox/emails/reply", &payload).await
            }
            None => {
                let campaign = self.default_campaign_id.as_ref().ok_or_else(|| {
                    ProviderError::Config(
                        "PIPL_DEFAULT_CAMPAIGN_ID must be set to send a first-touch email"
                            .to_string(),
                    )
                })?;
                let payload = json!({
                    "workspace_id": self.workspace_id,
                    "campaign_id": campaign,
                    "leads": [{
                        "email": outgoing.to,
                        "custom_variables": {
                            "initial_subject": outgoing.subject,
                            "initial_body": outgoing.body,
                        },
                    }],
                });
                self.post_json("/lead/add", &payload).await
            }
        }
    }

    async fn list_campaigns(&self) -> Result<Vec<Value>> {
        self.get_json("/campaign/list/all", &self.workspace_params())
            .await
    }

    async fn add_lead_to_sequence(&self, email: &str, sequence_id: SequenceId) -> Result<Value> {
        let payload = json!({
            "workspace_id": self.workspace_id,
            "subseq_id": sequence_id,
            "parent_lead_ids": [email],
        });
        self.post_json("/lead/add-lead-in-subseq", &payload).await
    }

    async fn list_tags(&self) -> Result<Vec<Value>> {
        self.get_json("/tag/list", &self.workspace_params()).await
    }

    async fn update_lead(
        &self,
        email: &str,
        campaign_id: CampaignId,
        variables: Value,
    ) -> Result<Value> {
        let payload = json!({
            "workspace_id": self.workspace_id,
            "campaign_id": campaign_id,
            "email": email,
            "variables": variables,
        });
        self.post_json("/lead/data/update", &payload).await
    }

    async fn campaign_stats(&self, campaign_id: Option<CampaignId>) -> Result<Value> {
        let mut params = self.workspace_params();
        if let Some(campaign) = campaign_id {
            params.push(("campaign_id", campaign.0));
        }
        self.get_json("/analytics/campaign/stats", &params).await
    }

    async fn list_labels(&self) -> Result<Vec<String>> {
        let response: LabelsResponse = self
            .get_json("/unibox/labels", &self.workspace_params())
            .await?;
        Ok(response.labels)
    }

    async fn update_email_label(&self, email_id: EmailId, label: &str) -> Result<Value> {
        let payload = json!({
            "workspace_id": self.workspace_id,
            "email_id": email_id,
            "label": label,
        });
        self.post_json("/unibox/emails/label", &payload).await
    }

    async fn list_leads(&self, query: LeadQuery) -> Result<LeadsPage> {
        let mut params = self.workspace_params();
        if let Some(campaign) = &query.campaign_id {
            params.push(("campaign_id", campaign.0.clone()));
        }
        if let Some(status) = &query.status {
            params.push(("status", status.clone()));
        }
        if let Some(label) = &query.label {
            params.push(("label", label.clone()));
        }
        if let Some(email) = &query.email {
            params.push(("email", email.clone()));
        }
        if let Some(first_name) = &query.first_name {
            params.push(("first_name", first_name.clone()));
        }
        if let Some(last_name) = &query.last_name {
            params.push(("last_name", last_name.clone()));
        }
        params.push(("page", query.page.to_string()));
        params.push(("limit", query.limit.to_string()));
        params.push(("sort", query.sort.clone()));
        params.push(("direction", query.direction.clone()));

        let payload: Value = self.get_json("/lead/workspace-leads", &params).await?;
        Ok(normalize_leads_page(payload, query.page, query.limit))
    }

    async fn mark_thread_read(&self, thread_id: ThreadId) -> Result<Value> {
        let payload = json!({ "workspace_id": self.workspace_id });
        self.post_json(
            &format!("/unibox/threads/{}/mark-as-read", thread_id),
            &payload,
        )
        .await
    }

    async fn unread_count(&self) -> Result<Value> {
        self.get_json("/unibox/emails/count/unread", &self.workspace_params())
            .await
    }
}
