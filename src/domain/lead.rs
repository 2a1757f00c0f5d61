//! Lead listing envelope.
//!
//! The upstream leads endpoint answers in several shapes depending on the
//! filters it was given; everything is folded into [`LeadsPage`] before
//! leaving the gateway.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A uniform page of leads.
///
/// Invariant: all four fields are always present, regardless of whether the
/// upstream returned an envelope, a single object, a bare list, or nothing
/// usable at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadsPage {
    /// Lead objects, passed through as received.
    pub data: Vec<Value>,
    /// Total number of matching leads.
    pub total: u64,
    /// Page number this result corresponds to.
    pub page: u32,
    /// Page size this result corresponds to.
    pub limit: u32,
}

impl LeadsPage {
    /// An empty page echoing the requested pagination, used when the
    /// upstream fails or answers in an unrecognized shape.
    pub fn empty(page: u32, limit: u32) -> Self {
        Self {
            data: Vec::new(),
            total: 0,
            page,
            limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_page_echoes_pagination() {
        let page = LeadsPage::empty(3, 25);
        assert!(page.data.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.page, 3);
        assert_eq!(page.limit, 25);
    }

    #[test]
    fn leads_page_serializes_all_fields() {
        let page = LeadsPage::empty(1, 10);
        let json = serde_json::to_value(&page).unwrap();
        assert!(json.get("data").is_some());
        assert!(json.get("total").is_some());
        assert!(json.get("page").is_some());
        assert!(json.get("limit").is_some());
    }
}
