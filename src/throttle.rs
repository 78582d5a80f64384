//! Announcement throttle.
//!
//! Decides, frame by frame, whether the current sentence should be spoken.
//! A changed sentence is always announced at once; an unchanged sentence is
//! repeated only after the cooldown has elapsed since its last announcement.
//!
//! State lives in an `AnnouncementState` owned by the caller, one per
//! navigation session. Times are offsets from the start of that session.

use std::time::Duration;

/// Default interval before an unchanged sentence is repeated.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(3);

/// What has been announced so far in one session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnnouncementState {
    last_sentence: String,
    last_spoken: Option<Duration>,
}

impl AnnouncementState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_sentence(&self) -> &str {
        &self.last_sentence
    }

    /// Time of the last announcement, `None` before the first one.
    pub fn last_spoken(&self) -> Option<Duration> {
        self.last_spoken
    }

    fn record(&mut self, now: Duration) {
        // Never move backwards if the caller's clock does.
        let at = match self.last_spoken {
            Some(prev) => prev.max(now),
            None => now,
        };
        self.last_spoken = Some(at);
    }
}

/// Cooldown policy applied to an `AnnouncementState`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Throttle {
    cooldown: Duration,
}

impl Throttle {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Returns true when `candidate` should be announced at `now`, and records
    /// the announcement in `state`. Returns false without touching `state`
    /// otherwise.
    pub fn should_announce(
        &self,
        state: &mut AnnouncementState,
        candidate: &str,
        now: Duration,
    ) -> bool {
        if candidate != state.last_sentence {
            state.last_sentence = candidate.to_string();
            state.record(now);
            return true;
        }

        let due = match state.last_spoken {
            Some(last) => now.checked_sub(last).is_some_and(|e| e >= self.cooldown),
            None => true,
        };
        if due {
            state.record(now);
        }
        due
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}
