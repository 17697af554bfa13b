//! Downstream JSON payloads.

use chrono::{DateTime, Local, SecondsFormat, TimeZone};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::gesture::PayloadLabel;

/// Round a confidence to the three decimals published downstream.
pub fn round_confidence(confidence: f64) -> f64 {
    (confidence * 1000.0).round() / 1000.0
}

/// Latest gesture as served to pollers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GesturePayload {
    pub gesture: PayloadLabel,
    pub confidence: f64,
}

impl GesturePayload {
    pub fn new(gesture: PayloadLabel, confidence: f64) -> Self {
        Self {
            gesture,
            confidence,
        }
    }

    /// Payload for a frame without a hand.
    pub fn none() -> Self {
        Self::new(PayloadLabel::None, 0.0)
    }

    /// Same payload with the confidence rounded for publication.
    pub fn rounded(&self) -> Self {
        Self::new(self.gesture, round_confidence(self.confidence))
    }
}

/// Served before the first frame has been processed.
impl Default for GesturePayload {
    fn default() -> Self {
        Self::new(PayloadLabel::NotAvailable, 0.0)
    }
}

/// One line of the change-driven record stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GestureRecord {
    pub gesture: PayloadLabel,
    /// Rounded to three decimals.
    pub confidence: f64,
    /// ISO-8601 with offset, second precision.
    pub ts: String,
}

impl GestureRecord {
    /// Build a record stamped with the local wall clock.
    pub fn now(payload: GesturePayload) -> Self {
        Self::at(payload, Local::now())
    }

    pub fn at<Tz: TimeZone>(payload: GesturePayload, at: DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            gesture: payload.gesture,
            confidence: round_confidence(payload.confidence),
            ts: at.to_rfc3339_opts(SecondsFormat::Secs, false),
        }
    }
}
