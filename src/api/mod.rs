//! HTTP surface of the relay.
//!
//! Thin Rocket handlers mapping REST paths onto [`RelayService`]
//! operations, plus the error responder. Mounted by the binary entry point.

mod error;
pub mod routes;

pub use error::ApiError;

/// Routes mounted under `/api`.
pub fn api_routes() -> Vec<rocket::Route> {
    rocket::routes![
        routes::get_emails,
        routes::send_email,
        routes::get_campaigns,
        routes::add_to_sequence,
        routes::get_tags,
        routes::update_tags,
        routes::get_analytics,
        routes::get_labels,
        routes::update_email_label,
        routes::mark_email_read,
        routes::unread_count,
        routes::get_leads,
    ]
}

/// Routes mounted at the root.
pub fn root_routes() -> Vec<rocket::Route> {
    rocket::routes![routes::index]
}
