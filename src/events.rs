use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audio::CueKind;
use crate::engine::Phase;
use crate::overlay::OverlayKind;

/// Which rule fired the hard lockout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HardCause {
    /// Window length reached the hard threshold outright.
    Direct,
    /// Enough extra clicks landed while the post-soft arm was live.
    AfterSoft,
}

/// Why the spam state was cleared mid-session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetReason {
    /// A fresh burst after a gap longer than the window.
    IdleGap,
    /// The press landed on a same-tab link.
    LinkActivated,
}

/// Every observable state change in the engine produces an Event.
/// The host subscribes to the stream; nothing here is load-bearing for
/// the state machine itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// First qualifying interaction un-suspended audio output.
    AudioUnlocked {
        at: DateTime<Utc>,
    },
    CuePlayed {
        kind: CueKind,
        /// Rare counter value at play time.
        counter: u64,
        at: DateTime<Utc>,
    },
    /// A cue asset failed to load; permanent for the page lifetime.
    CueLoadFailed {
        kind: CueKind,
        reason: String,
        at: DateTime<Utc>,
    },
    SoftEntered {
        window_len: usize,
        /// Absolute time until which post-soft clicks count toward hard.
        armed_until_ms: u64,
        at: DateTime<Utc>,
    },
    SoftAutoHidden {
        at: DateTime<Utc>,
    },
    /// User tap closed the soft overlay after the lock expired.
    SoftDismissed {
        at: DateTime<Utc>,
    },
    HardFired {
        window_len: usize,
        cause: HardCause,
        at: DateTime<Utc>,
    },
    TakeoverScheduled {
        delay_ms: u64,
        at: DateTime<Utc>,
    },
    TakeoverFired {
        destination: String,
        fullscreen: bool,
        at: DateTime<Utc>,
    },
    /// Spam state cleared without a session reset.
    WindowReset {
        reason: ResetReason,
        at: DateTime<Utc>,
    },
    /// In-page navigation reset the whole session.
    SessionReset {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: Phase,
        window_len: usize,
        soft_armed_until_ms: u64,
        overlay: Option<OverlayKind>,
        takeover_fired: bool,
        at: DateTime<Utc>,
    },
}
