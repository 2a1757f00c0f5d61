//! Email label vocabulary.
//!
//! Labels classify unibox emails by disposition (interested, follow up,
//! wrong person, ...). The upstream may expose a dedicated labels endpoint;
//! when it does not, labels are derived from workspace tag names, and when
//! the upstream is unreachable entirely the fixed vocabulary below applies.

/// Fixed fallback vocabulary used when no upstream label source is available.
pub const DEFAULT_LABELS: [&str; 10] = [
    "INTERESTED",
    "NOT_INTERESTED",
    "MEETING_BOOKED",
    "FOLLOW_UP",
    "WRONG_PERSON",
    "QUALIFIED",
    "NOT_QUALIFIED",
    "CONTACTED",
    "RESPONDED",
    "NO_RESPONSE",
];

/// Derives a label identifier from a workspace tag name.
///
/// Tag names are free-form ("Follow Up"); label identifiers are uppercase
/// with underscores ("FOLLOW_UP").
pub fn label_from_tag(name: &str) -> String {
    name.to_uppercase().replace(' ', "_")
}
