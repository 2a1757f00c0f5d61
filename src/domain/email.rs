//! Email domain types.
//!
//! Represents the normalized shape of unibox emails as served to API
//! consumers. Upstream responses vary wildly (string vs. structured bodies,
//! absent address lists, missing flags); everything crossing the gateway is
//! reshaped into these types first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CampaignId, EmailId, LeadId, ThreadId};

/// An email address with an optional display name.
///
/// Wire shape matches the upstream `*_address_json` entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Email address.
    #[serde(default)]
    pub address: String,
    /// Display name, empty when the upstream omits it.
    #[serde(default)]
    pub name: String,
}

impl Address {
    /// Creates a new address with just an email.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: String::new(),
        }
    }

    /// Creates a new address with email and display name.
    pub fn with_name(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
        }
    }

    /// Returns the display representation of this address.
    ///
    /// If a name is present, returns "Name <email>", otherwise just the email.
    pub fn display(&self) -> String {
        if self.name.is_empty() {
            self.address.clone()
        } else {
            format!("{} <{}>", self.name, self.address)
        }
    }
}

/// Normalized email body.
///
/// Invariant: both `text` and `html` are always present after normalization,
/// possibly as empty strings, no matter what shape the upstream returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailBody {
    /// Plain text content.
    pub text: String,
    /// HTML content.
    pub html: String,
}

impl EmailBody {
    /// Creates a body with identical text and HTML content, the shape used
    /// when the upstream sends a bare string body.
    pub fn from_plain(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            html: content.clone(),
            text: content,
        }
    }
}

/// A normalized unibox email.
///
/// Every field is backfilled with a type-appropriate default when the
/// upstream omits it: empty strings for text, empty vectors for address
/// lists, `false` for the unread flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailRecord {
    /// Unique identifier assigned by the upstream.
    pub id: EmailId,
    /// RFC 5322 Message-ID header value.
    pub message_id: String,
    /// Email subject line.
    pub subject: String,
    /// Sender address as a bare string.
    pub from_address_email: String,
    /// Sender addresses in structured form.
    pub from_address_json: Vec<Address>,
    /// Primary recipient addresses.
    pub to_address_json: Vec<Address>,
    /// Carbon copy recipient addresses.
    pub cc_address_json: Vec<Address>,
    /// When the email was created upstream, if the timestamp parsed.
    pub timestamp_created: Option<DateTime<Utc>>,
    /// Short preview of the email content.
    pub content_preview: String,
    /// Normalized body, always carrying both `text` and `html`.
    pub body: EmailBody,
    /// Full conversation, populated only by thread expansion.
    pub thread: Vec<EmailRecord>,
    /// Classification label, if any.
    pub label: Option<String>,
    /// Campaign this email belongs to.
    pub campaign_id: Option<CampaignId>,
    /// Lead this email is associated with.
    pub lead_id: Option<LeadId>,
    /// Conversation identifier.
    pub thread_id: Option<ThreadId>,
    /// Whether the email is unread.
    pub is_unread: bool,
}
