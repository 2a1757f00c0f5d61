//! Business services layer.
//!
//! Services sit between the HTTP surface and the provider gateway:
//!
//! ```text
//! HTTP layer (routes)
//!        |
//!        v
//!  Services layer  <-- caching + fallback policy
//!        |
//!        v
//!  Provider gateway (upstream HTTP)
//! ```
//!
//! - [`RelayService`]: caller-facing relay operations with response caching
//!   and per-operation failure policy

mod relay_service;

pub use relay_service::RelayService;
