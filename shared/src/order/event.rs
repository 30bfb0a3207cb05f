//! Journal event entries
//!
//! One entry describes a reconciliation action over a set of line items.
//! Entries are persisted as structured journal records and replayed by
//! the marketplace's tracking poller; empty fields are dropped from the
//! serialized form.

use serde::{Deserialize, Serialize};

/// One structured journal event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventEntry {
    /// What happened, as a lowercase status vocabulary name
    /// ("created", "shipped", "canceled", ...)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub action: String,
    /// External IDs of the line items this event covers
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub affected_items: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub eta: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tracking_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tracking_number: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub carrier: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub notes: String,
    /// UTC ISO-8601 timestamp, stamped from the journal row during replay
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl EventEntry {
    /// Entry carrying only an action and the items it affected
    pub fn action(action: impl Into<String>, affected_items: Vec<String>) -> Self {
        Self {
            action: action.into(),
            affected_items,
            ..Default::default()
        }
    }

    /// True when every field is empty — such entries are not journaled
    pub fn is_empty(&self) -> bool {
        self.action.is_empty()
            && self.affected_items.is_empty()
            && self.eta.is_empty()
            && self.tracking_url.is_empty()
            && self.tracking_number.is_empty()
            && self.carrier.is_empty()
            && self.notes.is_empty()
    }
}
