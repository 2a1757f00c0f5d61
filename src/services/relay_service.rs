//! Relay service orchestrating the gateway, caches, and fallback policy.
//!
//! The [`RelayService`] is the caller-facing surface of the relay. Every
//! operation consults the response cache first where one applies, delegates
//! to the [`OutreachProvider`] gateway, and applies the per-operation
//! failure policy:
//!
//! - Read-heavy, multi-consumer operations (campaigns, tags, analytics,
//!   labels, leads) degrade to a safe default on upstream failure.
//! - Write and reply-correctness-sensitive operations (send, sequence
//!   enrollment, lead/label updates, mark-read) propagate failures so the
//!   caller knows the write did not happen.
//!
//! Successful mutating calls clear the email cache so subsequent reads
//! observe the write.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use crate::cache::ResponseCache;
use crate::domain::{
    label_from_tag, CampaignId, EmailId, EmailRecord, LeadsPage, SequenceId, ThreadId,
    DEFAULT_LABELS,
};
use crate::providers::outreach::{
    EmailQuery, LeadQuery, OutgoingEmail, OutreachProvider, Result,
};

/// How long cached email listings stay valid.
const EMAIL_CACHE_TTL: Duration = Duration::from_secs(300);

/// How long the cached label vocabulary stays valid.
const LABEL_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Maximum entries per cache family.
const CACHE_CAPACITY: usize = 100;

/// The label vocabulary is a single cached value per workspace.
const LABELS_CACHE_KEY: &str = "labels";

/// One candidate source in the label fallback chain, tried in declaration
/// order. A not-found-class failure advances to the next tier; any other
/// failure short-circuits to the fixed defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelTier {
    /// The dedicated labels endpoint.
    Endpoint,
    /// Derivation from workspace tag names.
    DerivedFromTags,
    /// The fixed default vocabulary. Always succeeds.
    Defaults,
}

const LABEL_TIERS: [LabelTier; 3] = [
    LabelTier::Endpoint,
    LabelTier::DerivedFromTags,
    LabelTier::Defaults,
];

fn default_labels() -> Vec<String> {
    DEFAULT_LABELS.iter().map(|label| label.to_string()).collect()
}

/// Caller-facing relay operations over the upstream outreach platform.
///
/// Holds the gateway behind an `Arc<dyn OutreachProvider>` so the service
/// can be shared across concurrent request handlers; the caches are the
/// only shared mutable state and are internally synchronized.
pub struct RelayService {
    provider: Arc<dyn OutreachProvider>,
    email_cache: ResponseCache<Vec<EmailRecord>>,
    label_cache: ResponseCache<Vec<String>>,
}

impl RelayService {
    /// Creates a relay service over the given gateway.
    pub fn new(provider: Arc<dyn OutreachProvider>) -> Self {
        Self {
            provider,
            email_cache: ResponseCache::new(CACHE_CAPACITY, EMAIL_CACHE_TTL),
            label_cache: ResponseCache::new(CACHE_CAPACITY, LABEL_CACHE_TTL),
        }
    }

    /// Fetches normalized unibox emails, serving repeated identical queries
    /// from the cache within the TTL window.
    ///
    /// # Errors
    ///
    /// Upstream failures propagate to the caller.
    pub async fn get_emails(&self, query: EmailQuery) -> Result<Vec<EmailRecord>> {
        let key = query.fingerprint();
        if let Some(cached) = self.email_cache.get(&key) {
            tracing::debug!(%key, "email cache hit");
            return Ok(cached);
        }

        let records = self.provider.fetch_emails(query).await?;
        self.email_cache.put(key, records.clone());
        Ok(records)
    }

    /// Sends an email through the upstream.
    ///
    /// # Errors
    ///
    /// Propagates every failure; the caller must know delivery did not
    /// happen.
    pub async fn send_email(&self, outgoing: OutgoingEmail) -> Result<Value> {
        let response = self.provider.send_email(outgoing).await?;
        self.invalidate_emails();
        Ok(response)
    }

    /// Lists campaigns, degrading to an empty list on failure.
    pub async fn get_campaigns(&self) -> Vec<Value> {
        match self.provider.list_campaigns().await {
            Ok(campaigns) => campaigns,
            Err(e) => {
                tracing::warn!(error = %e, "campaign listing failed, returning empty list");
                Vec::new()
            }
        }
    }

    /// Enrolls a lead into a follow-up sequence.
    ///
    /// # Errors
    ///
    /// Propagates every failure.
    pub async fn add_lead_to_sequence(&self, email: &str, sequence_id: SequenceId) -> Result<Value> {
        self.provider.add_lead_to_sequence(email, sequence_id).await
    }

    /// Lists workspace tags, degrading to an empty list on failure.
    pub async fn get_tags(&self) -> Vec<Value> {
        match self.provider.list_tags().await {
            Ok(tags) => tags,
            Err(e) => {
                tracing::warn!(error = %e, "tag listing failed, returning empty list");
                Vec::new()
            }
        }
    }

    /// Updates a lead's custom variables.
    ///
    /// # Errors
    ///
    /// Propagates every failure.
    pub async fn update_lead(
        &self,
        email: &str,
        campaign_id: CampaignId,
        variables: Value,
    ) -> Result<Value> {
        let response = self
            .provider
            .update_lead(email, campaign_id, variables)
            .await?;
        self.invalidate_emails();
        Ok(response)
    }

    /// Fetches campaign analytics, degrading to `{"stats": {}}` on failure.
    pub async fn get_analytics(&self, campaign_id: Option<CampaignId>) -> Value {
        match self.provider.campaign_stats(campaign_id).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!(error = %e, "analytics fetch failed, returning empty stats");
                json!({ "stats": {} })
            }
        }
    }

    /// Returns the label vocabulary, walking the fallback chain:
    /// dedicated endpoint, then tag-name derivation, then the fixed
    /// defaults. The result is cached whichever tier produced it.
    pub async fn get_labels(&self) -> Vec<String> {
        if let Some(cached) = self.label_cache.get(LABELS_CACHE_KEY) {
            return cached;
        }

        let mut labels = None;
        for tier in LABEL_TIERS {
            match self.labels_from_tier(tier).await {
                Ok(found) => {
                    labels = Some(found);
                    break;
                }
                Err(e) if e.is_not_found() => {
                    tracing::warn!(?tier, error = %e, "label tier unavailable, advancing");
                }
                Err(e) => {
                    tracing::error!(?tier, error = %e, "label tier failed, using defaults");
                    labels = Some(default_labels());
                    break;
                }
            }
        }

        let labels = labels.unwrap_or_else(default_labels);
        self.label_cache.put(LABELS_CACHE_KEY, labels.clone());
        labels
    }

    async fn labels_from_tier(&self, tier: LabelTier) -> Result<Vec<String>> {
        match tier {
            LabelTier::Endpoint => self.provider.list_labels().await,
            LabelTier::DerivedFromTags => {
                let tags = self.provider.list_tags().await?;
                Ok(tags
                    .iter()
                    .filter_map(|tag| tag.get("name").and_then(Value::as_str))
                    .filter(|name| !name.is_empty())
                    .map(label_from_tag)
                    .collect())
            }
            LabelTier::Defaults => Ok(default_labels()),
        }
    }

    /// Sets the label on an email.
    ///
    /// # Errors
    ///
    /// Propagates every failure.
    pub async fn update_email_label(&self, email_id: EmailId, label: &str) -> Result<Value> {
        let response = self.provider.update_email_label(email_id, label).await?;
        self.invalidate_emails();
        Ok(response)
    }

    /// Lists workspace leads, degrading to an empty page that echoes the
    /// requested pagination on failure. Never errors.
    pub async fn get_leads(&self, query: LeadQuery) -> LeadsPage {
        let (page, limit) = (query.page, query.limit);
        match self.provider.list_leads(query).await {
            Ok(leads) => leads,
            Err(e) => {
                tracing::warn!(error = %e, "lead listing failed, returning empty page");
                LeadsPage::empty(page, limit)
            }
        }
    }

    /// Marks a thread as read.
    ///
    /// # Errors
    ///
    /// Propagates every failure.
    pub async fn mark_thread_read(&self, thread_id: ThreadId) -> Result<Value> {
        let response = self.provider.mark_thread_read(thread_id).await?;
        self.invalidate_emails();
        Ok(response)
    }

    /// Returns the unread email count payload.
    ///
    /// # Errors
    ///
    /// Propagates every failure.
    pub async fn unread_count(&self) -> Result<Value> {
        self.provider.unread_count().await
    }

    /// Drops all cached email listings immediately.
    pub fn invalidate_emails(&self) {
        self.email_cache.clear();
    }

    /// Drops the cached label vocabulary immediately.
    pub fn invalidate_labels(&self) {
        self.label_cache.clear();
    }
}
