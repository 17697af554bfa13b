//! Engine tuning parameters.

use std::time::Duration;

/// Geometric confidence below which the rule-based result becomes UNKNOWN.
pub const UNKNOWN_FLOOR: f64 = 0.55;
/// Learned confidence at which the model overrides geometry.
pub const ML_TAKEOVER: f64 = 0.60;
/// Capacity of the temporal smoothing window.
pub const SMOOTH_WINDOW: usize = 9;
/// Gesture-level and message-level cooldown.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(1500);
/// Upper bound on neighbors consulted by the learned model.
pub const MAX_NEIGHBORS: usize = 5;

/// Configuration for the per-frame pipeline and its feedback layer.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub unknown_floor: f64,
    pub ml_takeover: f64,
    pub smooth_window: usize,
    pub yes_cooldown: Duration,
    pub no_cooldown: Duration,
    /// Cooldown for repeating an identical feedback message
    pub message_cooldown: Duration,
    pub max_neighbors: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            unknown_floor: UNKNOWN_FLOOR,
            ml_takeover: ML_TAKEOVER,
            smooth_window: SMOOTH_WINDOW,
            yes_cooldown: DEFAULT_COOLDOWN,
            no_cooldown: DEFAULT_COOLDOWN,
            message_cooldown: DEFAULT_COOLDOWN,
            max_neighbors: MAX_NEIGHBORS,
        }
    }
}

impl EngineConfig {
    /// Create config from environment variables, falling back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            unknown_floor: env_parse("GESTURE_UNKNOWN_FLOOR").unwrap_or(defaults.unknown_floor),
            ml_takeover: env_parse("GESTURE_ML_TAKEOVER").unwrap_or(defaults.ml_takeover),
            smooth_window: env_parse::<usize>("GESTURE_SMOOTH_WINDOW")
                .filter(|w| *w > 0)
                .unwrap_or(defaults.smooth_window),
            yes_cooldown: env_parse("GESTURE_YES_COOLDOWN_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.yes_cooldown),
            no_cooldown: env_parse("GESTURE_NO_COOLDOWN_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.no_cooldown),
            message_cooldown: env_parse("FEEDBACK_COOLDOWN_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.message_cooldown),
            max_neighbors: env_parse::<usize>("GESTURE_MAX_NEIGHBORS")
                .filter(|k| *k > 0)
                .unwrap_or(defaults.max_neighbors),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}
