//! Escalation engine.
//!
//! The engine is a wall-clock-based state machine. It has no internal
//! threads and never reads a clock itself: every entry point takes `now`
//! in epoch milliseconds and the host is responsible for calling `tick()`
//! when scheduled work falls due (see [`next_deadline`](EscalationEngine::next_deadline)).
//!
//! ## Phase transitions
//!
//! ```text
//! Idle -> SoftWarned -> HardFired      (one way within a session)
//!   ^         |
//!   +---------+  auto-hide, dismissal, or an idle gap longer than the window
//! ```
//!
//! `HardFired` is terminal for the session; only an explicit session reset
//! (in-page navigation) re-arms the machine. The takeover latch itself
//! stays fired for the page lifetime.
//!
//! ## Qualifying input
//!
//! One canonical event type: the primary pointer press (pointer-down).
//! The host must install exactly one listener for it -- pairing it with
//! touch or click listeners for the same gesture double-counts.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::audio::{AudioSink, CueKind, SoundPlayer};
use crate::config::EngineConfig;
use crate::events::{Event, HardCause, ResetReason};
use crate::media::{MediaBridge, MediaElement};
use crate::overlay::{OverlayController, OverlayKind, OverlaySurface};
use crate::takeover::{TakeoverHost, TakeoverTrigger};
use crate::tasks::{TaskId, TaskKind, TaskQueue};
use crate::window::ClickWindow;

/// Escalation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    /// Soft warning shown; extra clicks are armed toward hard.
    SoftWarned,
    /// Hard lockout; terminal for the session.
    HardFired,
}

/// Core escalation state machine. One instance per page view; the
/// collaborators are dependency-injected at construction.
pub struct EscalationEngine {
    config: EngineConfig,
    window: ClickWindow,
    phase: Phase,
    /// Window length recorded when the soft warning was entered.
    soft_base_count: usize,
    /// Absolute time until which post-soft clicks count toward hard.
    /// Survives auto-hide; zero means unarmed.
    soft_armed_until: u64,
    soft_shown_at: u64,
    soft_autohide_task: Option<TaskId>,
    tasks: TaskQueue,
    sound: SoundPlayer,
    overlay: OverlayController,
    media: MediaBridge,
    takeover: TakeoverTrigger,
}

impl EscalationEngine {
    pub fn new(
        config: EngineConfig,
        sink: Box<dyn AudioSink>,
        surface: Box<dyn OverlaySurface>,
        media_element: Option<Box<dyn MediaElement>>,
        takeover_host: Box<dyn TakeoverHost>,
    ) -> Self {
        let sound = SoundPlayer::new(config.audio.clone(), sink);
        let takeover = TakeoverTrigger::new(config.takeover.destination.clone(), takeover_host);
        Self {
            window: ClickWindow::new(config.escalation.window_ms),
            config,
            phase: Phase::Idle,
            soft_base_count: 0,
            soft_armed_until: 0,
            soft_shown_at: 0,
            soft_autohide_task: None,
            tasks: TaskQueue::new(),
            sound,
            overlay: OverlayController::new(surface),
            media: MediaBridge::new(media_element),
            takeover,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    pub fn overlay_kind(&self) -> Option<OverlayKind> {
        self.overlay.visible_kind()
    }

    pub fn soft_armed_until(&self) -> u64 {
        self.soft_armed_until
    }

    pub fn is_media_suspended(&self) -> bool {
        self.media.is_suspended()
    }

    pub fn takeover_fired(&self) -> bool {
        self.takeover.has_fired()
    }

    /// Earliest due time of pending scheduled work, epoch ms.
    pub fn next_deadline(&self) -> Option<u64> {
        self.tasks.next_due()
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            window_len: self.window.len(),
            soft_armed_until_ms: self.soft_armed_until,
            overlay: self.overlay.visible_kind(),
            takeover_fired: self.takeover.has_fired(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Process one qualifying input (primary pointer press).
    ///
    /// Transitions are evaluated in strict priority order; the first match
    /// wins. Inputs while the overlay is visible are still recorded into
    /// the window -- continued spamming through the overlay must stay
    /// detectable -- but never produce a cue.
    pub fn on_input(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        if self.phase == Phase::HardFired {
            return events;
        }
        if self.sound.unlock() {
            events.push(Event::AudioUnlocked { at: Utc::now() });
        }

        let len = self.window.record(now_ms);
        let esc = &self.config.escalation;

        if len >= esc.hard_threshold {
            self.fire_hard(now_ms, len, HardCause::Direct, &mut events);
            return events;
        }
        if self.soft_armed_until != 0
            && now_ms <= self.soft_armed_until
            && len.saturating_sub(self.soft_base_count) >= esc.hard_after_soft
        {
            self.fire_hard(now_ms, len, HardCause::AfterSoft, &mut events);
            return events;
        }
        if self.phase == Phase::Idle && len >= esc.soft_threshold {
            self.enter_soft(now_ms, len, &mut events);
            return events;
        }
        if len == 1 && (self.phase != Phase::Idle || self.soft_armed_until != 0) {
            // This input started a fresh burst after an idle gap longer
            // than the window: disarm soft state before handling it.
            if self.phase == Phase::SoftWarned {
                self.overlay.hide();
            }
            self.phase = Phase::Idle;
            self.soft_armed_until = 0;
            self.soft_base_count = 0;
            events.push(Event::WindowReset {
                reason: ResetReason::IdleGap,
                at: Utc::now(),
            });
            // Falls through: a fresh burst still gets its click cue.
        }

        if self.phase == Phase::Idle && !self.overlay.is_visible() {
            if let Some(play) = self.sound.play_click(now_ms) {
                events.push(Event::CuePlayed {
                    kind: play.kind,
                    counter: play.counter,
                    at: Utc::now(),
                });
            }
        }
        events
    }

    /// Deliver scheduled work due at or before `now`.
    pub fn tick(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        for kind in self.tasks.take_due(now_ms) {
            match kind {
                TaskKind::SoftAutoHide => {
                    // Voided by the phase check, not by cancellation.
                    if self.phase == Phase::SoftWarned {
                        self.overlay.hide();
                        self.phase = Phase::Idle;
                        self.soft_autohide_task = None;
                        events.push(Event::SoftAutoHidden { at: Utc::now() });
                    }
                }
                TaskKind::HardTakeover => {
                    if self.phase == Phase::HardFired {
                        if let Some(outcome) = self.takeover.fire() {
                            events.push(Event::TakeoverFired {
                                destination: outcome.destination,
                                fullscreen: outcome.fullscreen,
                                at: Utc::now(),
                            });
                        }
                    }
                }
            }
        }
        events
    }

    /// A tap landing on the overlay itself.
    ///
    /// Hard swallows everything. Soft swallows taps for the first
    /// `soft_lock_ms`; after that a tap dismisses the overlay and returns
    /// to idle. The post-soft arm survives dismissal.
    pub fn on_overlay_tap(&mut self, now_ms: u64) -> Vec<Event> {
        match self.overlay.visible_kind() {
            Some(OverlayKind::Soft) => {
                if now_ms < self.soft_shown_at + self.config.escalation.soft_lock_ms {
                    return Vec::new();
                }
                self.overlay.hide();
                self.media.resume();
                self.phase = Phase::Idle;
                if let Some(id) = self.soft_autohide_task.take() {
                    self.tasks.cancel(id);
                }
                vec![Event::SoftDismissed { at: Utc::now() }]
            }
            Some(OverlayKind::Hard) | None => Vec::new(),
        }
    }

    /// The press landed on a same-tab link: the interaction is navigation,
    /// not spam. Clears the window and soft state; plays nothing and
    /// counts nothing.
    pub fn on_link_activated(&mut self) -> Vec<Event> {
        if self.phase == Phase::HardFired {
            return Vec::new();
        }
        let had_state =
            !self.window.is_empty() || self.phase != Phase::Idle || self.soft_armed_until != 0;
        self.window.clear();
        if self.phase == Phase::SoftWarned {
            self.overlay.hide();
        }
        if let Some(id) = self.soft_autohide_task.take() {
            self.tasks.cancel(id);
        }
        self.phase = Phase::Idle;
        self.soft_armed_until = 0;
        self.soft_base_count = 0;
        if had_state {
            vec![Event::WindowReset {
                reason: ResetReason::LinkActivated,
                at: Utc::now(),
            }]
        } else {
            Vec::new()
        }
    }

    /// In-page navigation replaced the content: force everything back to
    /// the initial state. Re-arms escalation even after a hard lockout;
    /// the takeover latch and loaded cue buffers persist.
    pub fn on_session_reset(&mut self) -> Vec<Event> {
        self.overlay.hide();
        self.media.resume();
        self.phase = Phase::Idle;
        self.window.clear();
        self.soft_armed_until = 0;
        self.soft_base_count = 0;
        self.soft_shown_at = 0;
        self.soft_autohide_task = None;
        self.tasks.clear();
        vec![Event::SessionReset { at: Utc::now() }]
    }

    /// A cue asset finished decoding.
    pub fn cue_loaded(&mut self, kind: CueKind, duration_ms: Option<u64>) {
        self.sound.mark_loaded(kind, duration_ms);
    }

    /// A cue asset failed to load. Degrades to a silent no-op for that
    /// kind; never an error.
    pub fn cue_load_failed(&mut self, kind: CueKind, reason: &str) -> Vec<Event> {
        self.sound.mark_failed(kind);
        vec![Event::CueLoadFailed {
            kind,
            reason: reason.to_string(),
            at: Utc::now(),
        }]
    }

    /// Silence every cue without touching escalation state.
    pub fn set_muted(&mut self, muted: bool) {
        self.sound.set_muted(muted);
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn enter_soft(&mut self, now_ms: u64, len: usize, events: &mut Vec<Event>) {
        self.phase = Phase::SoftWarned;
        self.soft_base_count = len;
        self.soft_armed_until = now_ms + self.config.escalation.soft_arm_ms;
        self.soft_shown_at = now_ms;
        self.overlay.show(OverlayKind::Soft);
        if let Some(id) = self.soft_autohide_task.take() {
            self.tasks.cancel(id);
        }
        self.soft_autohide_task = Some(self.tasks.schedule(
            TaskKind::SoftAutoHide,
            now_ms + self.config.escalation.soft_autohide_ms,
        ));
        events.push(Event::SoftEntered {
            window_len: len,
            armed_until_ms: self.soft_armed_until,
            at: Utc::now(),
        });
    }

    fn fire_hard(&mut self, now_ms: u64, len: usize, cause: HardCause, events: &mut Vec<Event>) {
        // The phase latch is the re-entrancy guard.
        if self.phase == Phase::HardFired {
            return;
        }
        self.phase = Phase::HardFired;
        self.media.suspend();
        self.overlay.show(OverlayKind::Hard);
        let played = self.sound.play_warn();
        events.push(Event::HardFired {
            window_len: len,
            cause,
            at: Utc::now(),
        });
        if played {
            events.push(Event::CuePlayed {
                kind: CueKind::Warn,
                counter: self.sound.rare_counter(),
                at: Utc::now(),
            });
        }
        let tk = &self.config.takeover;
        let delay = self
            .sound
            .duration_ms(CueKind::Warn)
            .map(|d| d + tk.warn_tail_ms)
            .unwrap_or(tk.warn_fallback_ms)
            .clamp(tk.warn_delay_min_ms, tk.warn_delay_max_ms);
        self.tasks.schedule(TaskKind::HardTakeover, now_ms + delay);
        events.push(Event::TakeoverScheduled {
            delay_ms: delay,
            at: Utc::now(),
        });
    }
}

impl std::fmt::Debug for EscalationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EscalationEngine")
            .field("phase", &self.phase)
            .field("window_len", &self.window.len())
            .field("soft_armed_until", &self.soft_armed_until)
            .field("overlay", &self.overlay.visible_kind())
            .field("takeover_fired", &self.takeover.has_fired())
            .finish()
    }
}
