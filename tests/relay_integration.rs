//! Integration tests for the relay service and HTTP surface.
//!
//! These tests wire a stub gateway under the real service and routes to
//! verify caching, fallback policy, and response shaping across module
//! boundaries. Each module contains its own unit tests for detailed logic.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use serde_json::{json, Value};

use caeros::domain::{
    label_from_tag, Address, CampaignId, EmailBody, EmailId, EmailRecord, LeadsPage, SequenceId,
    ThreadId,
};
use caeros::providers::outreach::{
    EmailQuery, LeadQuery, OutgoingEmail, OutreachProvider, ProviderError,
    Result as ProviderResult,
};
use caeros::RelayService;

// ============================================================================
// Stub gateway
// ============================================================================

/// A configurable in-memory gateway. Defaults to all-success responses.
#[derive(Default)]
struct StubProvider {
    fetch_calls: AtomicUsize,
    label_calls: AtomicUsize,
    fail_send: bool,
    fail_leads: bool,
    fail_analytics: bool,
    /// When set, `list_labels` fails with this HTTP status.
    labels_status: Option<u16>,
    /// Tags served by `list_tags`.
    tags: Vec<Value>,
}

fn sample_email(id: &str) -> EmailRecord {
    EmailRecord {
        id: EmailId::from(id),
        message_id: format!("<{}@upstream>", id),
        subject: "Q3 update".to_string(),
        from_address_email: "founder@startup.com".to_string(),
        from_address_json: vec![Address::new("founder@startup.com")],
        to_address_json: vec![Address::with_name("investor@fund.com", "Investor")],
        cc_address_json: vec![],
        timestamp_created: None,
        content_preview: "Quick update".to_string(),
        body: EmailBody::from_plain("Quick update on the quarter."),
        thread: vec![],
        label: None,
        campaign_id: None,
        lead_id: None,
        thread_id: None,
        is_unread: true,
    }
}

#[async_trait]
impl OutreachProvider for StubProvider {
    async fn fetch_emails(&self, _query: EmailQuery) -> ProviderResult<Vec<EmailRecord>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![sample_email("em-1")])
    }

    async fn send_email(&self, _outgoing: OutgoingEmail) -> ProviderResult<Value> {
        if self.fail_send {
            return Err(ProviderError::Status {
                status: 422,
                body: "lead rejected".to_string(),
            });
        }
        Ok(json!({ "ok": true }))
    }

    async fn list_campaigns(&self) -> ProviderResult<Vec<Value>> {
        Ok(vec![json!({ "id": "camp-1", "name": "Investor outreach" })])
    }

    async fn add_lead_to_sequence(
        &self,
        _email: &str,
        _sequence_id: SequenceId,
    ) -> ProviderResult<Value> {
        Ok(json!({ "queued": true }))
    }

    async fn list_tags(&self) -> ProviderResult<Vec<Value>> {
        Ok(self.tags.clone())
    }

    async fn update_lead(
        &self,
        _email: &str,
        _campaign_id: CampaignId,
        _variables: Value,
    ) -> ProviderResult<Value> {
        Ok(json!({ "updated": true }))
    }

    async fn campaign_stats(&self, _campaign_id: Option<CampaignId>) -> ProviderResult<Value> {
        if self.fail_analytics {
            return Err(ProviderError::Transport("timed out".to_string()));
        }
        Ok(json!({ "stats": { "sent": 10 } }))
    }

    async fn list_labels(&self) -> ProviderResult<Vec<String>> {
        self.label_calls.fetch_add(1, Ordering::SeqCst);
        match self.labels_status {
            Some(status) => Err(ProviderError::Status {
                status,
                body: "labels endpoint unavailable".to_string(),
            }),
            None => Ok(vec!["INTERESTED".to_string(), "FOLLOW_UP".to_string()]),
        }
    }

    async fn update_email_label(&self, _email_id: EmailId, _label: &str) -> ProviderResult<Value> {
        Ok(json!({ "ok": true }))
    }

    async fn list_leads(&self, query: LeadQuery) -> ProviderResult<LeadsPage> {
        if self.fail_leads {
            return Err(ProviderError::Transport("refused".to_string()));
        }
        Ok(LeadsPage {
            data: vec![json!({ "_id": "l1", "email": "investor@fund.com" })],
            total: 1,
            page: query.page,
            limit: query.limit,
        })
    }

    async fn mark_thread_read(&self, _thread_id: ThreadId) -> ProviderResult<Value> {
        Ok(json!({ "ok": true }))
    }

    async fn unread_count(&self) -> ProviderResult<Value> {
        Ok(json!({ "count": 3 }))
    }
}

fn rocket_for(stub: Arc<StubProvider>) -> rocket::Rocket<rocket::Build> {
    rocket::build()
        .manage(RelayService::new(stub))
        .mount("/", caeros::api::root_routes())
        .mount("/api", caeros::api::api_routes())
}

// ============================================================================
// Domain type tests
// ============================================================================

#[test]
fn fingerprints_identify_identical_queries() {
    let a = EmailQuery::default();
    let b = EmailQuery::default();
    assert_eq!(a.fingerprint(), b.fingerprint());

    let mut c = EmailQuery::default();
    c.campaign_id = Some(CampaignId::from("camp-1"));
    assert_ne!(a.fingerprint(), c.fingerprint());
}

#[test]
fn address_display_forms() {
    assert_eq!(
        Address::with_name("a@b.com", "Ada").display(),
        "Ada <a@b.com>"
    );
    assert_eq!(Address::new("a@b.com").display(), "a@b.com");
}

#[test]
fn label_derivation_from_tag_names() {
    assert_eq!(label_from_tag("Follow Up"), "FOLLOW_UP");
    assert_eq!(label_from_tag("vip"), "VIP");
}

#[test]
fn empty_leads_page_shape() {
    let page = LeadsPage::empty(2, 50);
    assert_eq!((page.total, page.page, page.limit), (0, 2, 50));
    assert!(page.data.is_empty());
}

// ============================================================================
// Service-level tests
// ============================================================================

#[tokio::test]
async fn second_identical_query_is_served_from_cache() {
    let stub = Arc::new(StubProvider::default());
    let service = RelayService::new(stub.clone());

    let first = service.get_emails(EmailQuery::default()).await.unwrap();
    let second = service.get_emails(EmailQuery::default()).await.unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_eq!(stub.fetch_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn invalidation_forces_a_fresh_fetch() {
    let stub = Arc::new(StubProvider::default());
    let service = RelayService::new(stub.clone());

    service.get_emails(EmailQuery::default()).await.unwrap();
    service.invalidate_emails();
    service.get_emails(EmailQuery::default()).await.unwrap();

    assert_eq!(stub.fetch_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn mutating_call_invalidates_cached_emails() {
    let stub = Arc::new(StubProvider::default());
    let service = RelayService::new(stub.clone());

    service.get_emails(EmailQuery::default()).await.unwrap();
    service
        .update_email_label(EmailId::from("em-1"), "INTERESTED")
        .await
        .unwrap();
    service.get_emails(EmailQuery::default()).await.unwrap();

    assert_eq!(stub.fetch_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn labels_derive_from_tags_when_endpoint_is_missing() {
    let stub = Arc::new(StubProvider {
        labels_status: Some(404),
        tags: vec![json!({"name": "Follow Up"}), json!({"name": "vip"})],
        ..StubProvider::default()
    });
    let service = RelayService::new(stub);

    assert_eq!(service.get_labels().await, vec!["FOLLOW_UP", "VIP"]);
}

#[tokio::test]
async fn label_cache_survives_until_invalidated() {
    let stub = Arc::new(StubProvider::default());
    let service = RelayService::new(stub.clone());

    service.get_labels().await;
    service.get_labels().await;
    assert_eq!(stub.label_calls.load(Ordering::SeqCst), 1);

    service.invalidate_labels();
    service.get_labels().await;
    assert_eq!(stub.label_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn labels_fall_back_to_defaults_on_server_error() {
    let stub = Arc::new(StubProvider {
        labels_status: Some(500),
        ..StubProvider::default()
    });
    let service = RelayService::new(stub);

    let labels = service.get_labels().await;
    assert_eq!(labels.len(), 10);
    assert!(labels.contains(&"MEETING_BOOKED".to_string()));
}

// ============================================================================
// HTTP surface tests
// ============================================================================

#[rocket::async_test]
async fn index_serves_welcome_banner() {
    let client = Client::tracked(rocket_for(Arc::new(StubProvider::default())))
        .await
        .unwrap();

    let response = client.get("/").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let body: Value = response.into_json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("Investor"));
}

#[rocket::async_test]
async fn emails_endpoint_serves_normalized_records() {
    let client = Client::tracked(rocket_for(Arc::new(StubProvider::default())))
        .await
        .unwrap();

    let response = client.get("/api/emails?preview_only=true").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let body: Value = response.into_json().await.unwrap();
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 1);
    // The normalized body always carries both halves.
    assert!(records[0]["body"]["text"].is_string());
    assert!(records[0]["body"]["html"].is_string());
}

#[rocket::async_test]
async fn failed_send_surfaces_upstream_error_text() {
    let stub = Arc::new(StubProvider {
        fail_send: true,
        ..StubProvider::default()
    });
    let client = Client::tracked(rocket_for(stub)).await.unwrap();

    let response = client
        .post("/api/emails/send")
        .header(ContentType::JSON)
        .body(r#"{"to": "investor@fund.com", "subject": "Intro", "body": "Hello"}"#)
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::InternalServerError);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["error"], "UpstreamError");
    assert!(body["message"].as_str().unwrap().contains("lead rejected"));
}

#[rocket::async_test]
async fn leads_endpoint_degrades_to_empty_page() {
    let stub = Arc::new(StubProvider {
        fail_leads: true,
        ..StubProvider::default()
    });
    let client = Client::tracked(rocket_for(stub)).await.unwrap();

    let response = client.get("/api/leads?page=3&limit=20").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["total"], 0);
    assert_eq!(body["page"], 3);
    assert_eq!(body["limit"], 20);
}

#[rocket::async_test]
async fn analytics_endpoint_degrades_to_empty_stats() {
    let stub = Arc::new(StubProvider {
        fail_analytics: true,
        ..StubProvider::default()
    });
    let client = Client::tracked(rocket_for(stub)).await.unwrap();

    let response = client.get("/api/analytics").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body, json!({ "stats": {} }));
}

#[rocket::async_test]
async fn labels_endpoint_serves_vocabulary() {
    let client = Client::tracked(rocket_for(Arc::new(StubProvider::default())))
        .await
        .unwrap();

    let response = client.get("/api/labels").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let labels: Vec<String> = response.into_json().await.unwrap();
    assert_eq!(labels, vec!["INTERESTED", "FOLLOW_UP"]);
}

#[rocket::async_test]
async fn unread_count_passes_through() {
    let client = Client::tracked(rocket_for(Arc::new(StubProvider::default())))
        .await
        .unwrap();

    let response = client.get("/api/emails/unread/count").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["count"], 3);
}

#[rocket::async_test]
async fn mark_read_route_is_not_shadowed_by_label_route() {
    let client = Client::tracked(rocket_for(Arc::new(StubProvider::default())))
        .await
        .unwrap();

    let response = client.post("/api/emails/mark-read/th-1").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let response = client
        .post("/api/emails/em-1/label?label=INTERESTED")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
}
