//! HTTP route handlers.
//!
//! Thin request/response mapping over [`RelayService`]: handlers assemble
//! query structs, delegate, and wrap the result in JSON. No relay logic
//! lives here.

use rocket::serde::json::Json;
use rocket::{get, post, State};
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::ApiError;
use crate::domain::{CampaignId, EmailId, EmailRecord, LeadsPage, SequenceId, ThreadId};
use crate::providers::outreach::{EmailQuery, LeadQuery, OutgoingEmail};
use crate::services::RelayService;

/// Body of `POST /api/emails/send`.
#[derive(Debug, Deserialize)]
pub struct SendEmailRequest {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub reply_to_id: Option<String>,
}

/// Body of `POST /api/tags`.
#[derive(Debug, Deserialize)]
pub struct TagUpdateRequest {
    pub email: String,
    pub campaign_id: String,
    pub tags: Vec<String>,
}

#[get("/")]
pub async fn index() -> Json<Value> {
    Json(json!({ "message": "Welcome to Investor Email Manager API" }))
}

#[get("/emails?<preview_only>&<email_type>&<label>&<lead_email>&<campaign_id>")]
pub async fn get_emails(
    service: &State<RelayService>,
    preview_only: Option<bool>,
    email_type: Option<String>,
    label: Option<String>,
    lead_email: Option<String>,
    campaign_id: Option<String>,
) -> Result<Json<Vec<EmailRecord>>, ApiError> {
    let query = EmailQuery {
        preview_only: preview_only.unwrap_or(true),
        lead_email,
        campaign_id: campaign_id.map(CampaignId::from),
        email_type: email_type.unwrap_or_else(|| "all".to_string()),
        label,
    };
    Ok(Json(service.get_emails(query).await?))
}

#[post("/emails/send", data = "<request>")]
pub async fn send_email(
    service: &State<RelayService>,
    request: Json<SendEmailRequest>,
) -> Result<Json<Value>, ApiError> {
    let request = request.into_inner();
    let outgoing = OutgoingEmail {
        to: request.to,
        subject: request.subject,
        body: request.body,
        reply_to_id: request.reply_to_id.map(EmailId::from),
    };
    Ok(Json(service.send_email(outgoing).await?))
}

#[get("/campaigns")]
pub async fn get_campaigns(service: &State<RelayService>) -> Json<Vec<Value>> {
    Json(service.get_campaigns().await)
}

#[post("/leads/sequence?<email>&<sequence_id>")]
pub async fn add_to_sequence(
    service: &State<RelayService>,
    email: String,
    sequence_id: String,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(
        service
            .add_lead_to_sequence(&email, SequenceId::from(sequence_id))
            .await?,
    ))
}

#[get("/tags")]
pub async fn get_tags(service: &State<RelayService>) -> Json<Vec<Value>> {
    Json(service.get_tags().await)
}

#[post("/tags", data = "<request>")]
pub async fn update_tags(
    service: &State<RelayService>,
    request: Json<TagUpdateRequest>,
) -> Result<Json<Value>, ApiError> {
    let request = request.into_inner();
    Ok(Json(
        service
            .update_lead(
                &request.email,
                CampaignId::from(request.campaign_id),
                json!({ "tags": request.tags }),
            )
            .await?,
    ))
}

#[get("/analytics?<campaign_id>")]
pub async fn get_analytics(
    service: &State<RelayService>,
    campaign_id: Option<String>,
) -> Json<Value> {
    Json(service.get_analytics(campaign_id.map(CampaignId::from)).await)
}

#[get("/labels")]
pub async fn get_labels(service: &State<RelayService>) -> Json<Vec<String>> {
    Json(service.get_labels().await)
}

// Ranked below the mark-read route so the `mark-read` literal is never
// captured as an email id.
#[post("/emails/<email_id>/label?<label>", rank = 2)]
pub async fn update_email_label(
    service: &State<RelayService>,
    email_id: String,
    label: String,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(
        service
            .update_email_label(EmailId::from(email_id), &label)
            .await?,
    ))
}

#[post("/emails/mark-read/<thread_id>")]
pub async fn mark_email_read(
    service: &State<RelayService>,
    thread_id: String,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(
        service.mark_thread_read(ThreadId::from(thread_id)).await?,
    ))
}

#[get("/emails/unread/count")]
pub async fn unread_count(service: &State<RelayService>) -> Result<Json<Value>, ApiError> {
    Ok(Json(service.unread_count().await?))
}

#[get("/leads?<campaign_id>&<status>&<label>&<email>&<first_name>&<last_name>&<page>&<limit>&<sort>&<direction>")]
#[allow(clippy::too_many_arguments)]
pub async fn get_leads(
    service: &State<RelayService>,
    campaign_id: Option<String>,
    status: Option<String>,
    label: Option<String>,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
    sort: Option<String>,
    direction: Option<String>,
) -> Json<LeadsPage> {
    let defaults = LeadQuery::default();
    let query = LeadQuery {
        campaign_id: campaign_id.map(CampaignId::from),
        status,
        label,
        email,
        first_name,
        last_name,
        page: page.unwrap_or(defaults.page),
        limit: limit.unwrap_or(defaults.limit),
        sort: sort.unwrap_or(defaults.sort),
        direction: direction.unwrap_or(defaults.direction),
    };
    Json(service.get_leads(query).await)
}
