//! Outreach provider abstraction.
//!
//! This module contains the [`OutreachProvider`] trait and its pipl.ai
//! implementation. The trait is the seam the service layer depends on:
//! everything above it works with normalized domain entities and never sees
//! upstream response shapes.

mod pipl;
mod traits;

pub use pipl::PiplProvider;
pub use traits::{
    EmailQuery, LeadQuery, OutgoingEmail, OutreachProvider, ProviderError, Result,
};

#[cfg(test)]
pub use traits::MockOutreachProvider;
