//! Discrete vote events emitted on qualifying label transitions.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::gesture::CanonicalLabel;

/// The two labels that produce human-facing feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum VoteKind {
    Yes,
    No,
}

impl VoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteKind::Yes => "YES",
            VoteKind::No => "NO",
        }
    }

    /// Vote carried by a canonical label, if any.
    pub fn from_canonical(label: CanonicalLabel) -> Option<Self> {
        match label {
            CanonicalLabel::Yes => Some(VoteKind::Yes),
            CanonicalLabel::No => Some(VoteKind::No),
            CanonicalLabel::None => None,
        }
    }
}

impl fmt::Display for VoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A rate-limited vote event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EmittedEvent {
    pub kind: VoteKind,
    pub timestamp: DateTime<Utc>,
}

impl EmittedEvent {
    pub fn new(kind: VoteKind) -> Self {
        Self {
            kind,
            timestamp: Utc::now(),
        }
    }

    /// Spoken feedback for this event.
    pub fn announcement(&self) -> String {
        format!("Vote {} submitted", self.kind)
    }
}
