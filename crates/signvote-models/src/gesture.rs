//! Gesture label definitions.
//!
//! Three closely related vocabularies flow through the pipeline:
//!
//! - `Gesture`: what a classifier may answer (`YES`, `NO`, `UNKNOWN`)
//! - `CanonicalLabel`: what the edge detector reasons about (`YES`, `NO`, `NONE`)
//! - `PayloadLabel`: what downstream JSON consumers see, including `NONE`
//!   for "no hand observed" and `N/A` before any frame was processed

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

const YES_SYNONYMS: &[&str] = &["YES", "THUMB_UP", "THUMBS_UP", "UP", "APPROVE", "LIKE"];
const NO_SYNONYMS: &[&str] = &[
    "NO",
    "OPEN_HAND",
    "PALM",
    "STOP",
    "DISLIKE",
    "DOWN",
    "THUMB_DOWN",
    "THUMBS_DOWN",
];

/// Gesture produced by a classifier for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gesture {
    /// Closed fist / thumb posture family.
    Yes,
    /// Open palm family.
    No,
    /// Signal too ambiguous to trust.
    Unknown,
}

impl Gesture {
    /// All classifier labels.
    pub const ALL: &'static [Gesture] = &[Gesture::Yes, Gesture::No, Gesture::Unknown];

    /// Returns the label as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Gesture::Yes => "YES",
            Gesture::No => "NO",
            Gesture::Unknown => "UNKNOWN",
        }
    }

    /// Returns true for the two labels that can become vote events.
    pub fn is_decisive(&self) -> bool {
        !matches!(self, Gesture::Unknown)
    }

    /// Canonical form used by the edge detector. `UNKNOWN` carries no vote.
    pub fn canonical(&self) -> CanonicalLabel {
        match self {
            Gesture::Yes => CanonicalLabel::Yes,
            Gesture::No => CanonicalLabel::No,
            Gesture::Unknown => CanonicalLabel::None,
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parses free-form labels from datasets and external tools.
///
/// Accepts the synonym vocabulary used when the exemplar archive was
/// collected (`THUMBS_UP`, `OPEN_HAND`, ...) and tolerates a trailing
/// confidence suffix such as `"YES (0.91)"`.
impl FromStr for Gesture {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = strip_confidence_suffix(s).trim().to_uppercase();

        if YES_SYNONYMS.contains(&normalized.as_str()) {
            Ok(Gesture::Yes)
        } else if NO_SYNONYMS.contains(&normalized.as_str()) {
            Ok(Gesture::No)
        } else if normalized == "UNKNOWN" {
            Ok(Gesture::Unknown)
        } else {
            Err(ModelError::UnknownLabel(s.to_string()))
        }
    }
}

fn strip_confidence_suffix(s: &str) -> &str {
    match s.find('(') {
        Some(idx) if s.trim_end().ends_with(')') => &s[..idx],
        _ => s,
    }
}

/// Label used for edge detection and cooldown bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum CanonicalLabel {
    Yes,
    No,
    /// No hand, or nothing decisive about it.
    #[default]
    None,
}

impl CanonicalLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalLabel::Yes => "YES",
            CanonicalLabel::No => "NO",
            CanonicalLabel::None => "NONE",
        }
    }

    /// Canonicalizes an arbitrary label string. Unrecognized labels map to `None`.
    pub fn from_label(label: &str) -> Self {
        label
            .parse::<Gesture>()
            .map(|g| g.canonical())
            .unwrap_or(CanonicalLabel::None)
    }
}

impl fmt::Display for CanonicalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Label carried by the downstream JSON payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum PayloadLabel {
    #[serde(rename = "YES")]
    Yes,
    #[serde(rename = "NO")]
    No,
    #[serde(rename = "UNKNOWN")]
    Unknown,
    /// No hand observed in the frame.
    #[serde(rename = "NONE")]
    None,
    /// Nothing processed yet.
    #[serde(rename = "N/A")]
    NotAvailable,
}

impl PayloadLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadLabel::Yes => "YES",
            PayloadLabel::No => "NO",
            PayloadLabel::Unknown => "UNKNOWN",
            PayloadLabel::None => "NONE",
            PayloadLabel::NotAvailable => "N/A",
        }
    }

    pub fn canonical(&self) -> CanonicalLabel {
        match self {
            PayloadLabel::Yes => CanonicalLabel::Yes,
            PayloadLabel::No => CanonicalLabel::No,
            _ => CanonicalLabel::None,
        }
    }
}

impl From<Gesture> for PayloadLabel {
    fn from(gesture: Gesture) -> Self {
        match gesture {
            Gesture::Yes => PayloadLabel::Yes,
            Gesture::No => PayloadLabel::No,
            Gesture::Unknown => PayloadLabel::Unknown,
        }
    }
}

impl fmt::Display for PayloadLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_synonyms() {
        assert_eq!("thumbs_up".parse::<Gesture>(), Ok(Gesture::Yes));
        assert_eq!(" Open_Hand ".parse::<Gesture>(), Ok(Gesture::No));
        assert_eq!("THUMB_DOWN".parse::<Gesture>(), Ok(Gesture::No));
        assert_eq!("unknown".parse::<Gesture>(), Ok(Gesture::Unknown));
    }

    #[test]
    fn test_parse_strips_confidence_suffix() {
        assert_eq!("YES (0.91)".parse::<Gesture>(), Ok(Gesture::Yes));
        assert_eq!("no(0.70)".parse::<Gesture>(), Ok(Gesture::No));
    }

    #[test]
    fn test_parse_rejects_unrelated_labels() {
        assert!("WAVE".parse::<Gesture>().is_err());
        assert!("".parse::<Gesture>().is_err());
    }

    #[test]
    fn test_unknown_is_not_a_vote() {
        // "UNKNOWN" must never be mistaken for NO.
        assert_eq!(CanonicalLabel::from_label("UNKNOWN"), CanonicalLabel::None);
        assert_eq!(CanonicalLabel::from_label("garbage"), CanonicalLabel::None);
        assert_eq!(CanonicalLabel::from_label("like"), CanonicalLabel::Yes);
    }

    #[test]
    fn test_serde_wire_names() {
        assert_eq!(serde_json::to_string(&Gesture::Yes).unwrap(), "\"YES\"");
        assert_eq!(
            serde_json::to_string(&PayloadLabel::NotAvailable).unwrap(),
            "\"N/A\""
        );
        assert_eq!(serde_json::to_string(&PayloadLabel::None).unwrap(), "\"NONE\"");
        let parsed: Gesture = serde_json::from_str("\"UNKNOWN\"").unwrap();
        assert_eq!(parsed, Gesture::Unknown);
    }
}
