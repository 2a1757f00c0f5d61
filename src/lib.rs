//! caeros - Backend relay for investor-communication email management
//!
//! This crate relays a unified REST API onto an upstream email-marketing
//! provider, normalizing the provider's inconsistent response shapes,
//! caching recent reads, and applying a per-operation fallback policy.

pub mod api;
pub mod cache;
pub mod config;
pub mod domain;
pub mod providers;
pub mod services;

pub use config::Settings;
pub use services::RelayService;
