//! Edge-triggered, cooldown-gated vote emission.
//!
//! A held YES or NO emits once on entry and then once per cooldown interval
//! while it stays held. A NONE frame resets the edge state so the next
//! YES/NO after the hand reappears always emits, whatever the timers say.

use std::time::{Duration, Instant};

use signvote_models::{CanonicalLabel, EmittedEvent, VoteKind};
use tracing::debug;

use crate::config::DEFAULT_COOLDOWN;

/// Per-stream edge detector. Owns all previous-label and timer state.
#[derive(Debug, Clone)]
pub struct EdgeEmitter {
    previous: CanonicalLabel,
    last_yes: Option<Instant>,
    last_no: Option<Instant>,
    yes_cooldown: Duration,
    no_cooldown: Duration,
}

impl Default for EdgeEmitter {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN, DEFAULT_COOLDOWN)
    }
}

impl EdgeEmitter {
    pub fn new(yes_cooldown: Duration, no_cooldown: Duration) -> Self {
        Self {
            previous: CanonicalLabel::None,
            last_yes: None,
            last_no: None,
            yes_cooldown,
            no_cooldown,
        }
    }

    /// Canonical label seen on the previous frame.
    pub fn previous(&self) -> CanonicalLabel {
        self.previous
    }

    /// Feed one frame's canonical label.
    pub fn observe(&mut self, label: CanonicalLabel, now: Instant) -> Option<EmittedEvent> {
        let event = match VoteKind::from_canonical(label) {
            Some(kind) if self.previous != label || self.cooled_down(kind, now) => {
                self.mark_emitted(kind, now);
                Some(EmittedEvent::new(kind))
            }
            _ => None,
        };

        if let Some(ref e) = event {
            debug!(kind = %e.kind, previous = %self.previous, "vote event");
        }

        self.previous = label;
        event
    }

    /// A timer that never fired counts as cooled down.
    fn cooled_down(&self, kind: VoteKind, now: Instant) -> bool {
        let (last, cooldown) = match kind {
            VoteKind::Yes => (self.last_yes, self.yes_cooldown),
            VoteKind::No => (self.last_no, self.no_cooldown),
        };
        last.map_or(true, |at| now.saturating_duration_since(at) > cooldown)
    }

    fn mark_emitted(&mut self, kind: VoteKind, now: Instant) {
        match kind {
            VoteKind::Yes => self.last_yes = Some(now),
            VoteKind::No => self.last_no = Some(now),
        }
    }
}
