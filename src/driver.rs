//! Tokio host driver.
//!
//! The engine is synchronous and clock-free; something has to feed it real
//! time and host signals. The driver owns that seam: it receives
//! [`HostSignal`]s over a channel, stamps them with milliseconds since its
//! own epoch, delivers them to the engine in arrival order, and sleeps
//! until the engine's next scheduled deadline in between. Emitted
//! [`Event`]s are forwarded to the host.
//!
//! Everything stays on one task, so the ordering guarantee holds: the
//! window and phase updates for signal N complete before signal N+1 is
//! processed.

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Duration, Instant};

use crate::audio::CueKind;
use crate::engine::EscalationEngine;
use crate::events::Event;

/// Host-side notifications fed into the engine.
#[derive(Debug)]
pub enum HostSignal {
    /// A qualifying input: the primary pointer press.
    Input,
    /// A tap landing on the warning overlay itself.
    OverlayTap,
    /// The press landed on a same-tab link.
    LinkActivated,
    /// The client-side router replaced the page content.
    SessionReset,
    /// A cue asset finished decoding.
    CueLoaded {
        kind: CueKind,
        duration_ms: Option<u64>,
    },
    /// A cue asset failed to load.
    CueLoadFailed { kind: CueKind, reason: String },
    MuteAll(bool),
    Shutdown,
}

/// Pumps host signals and wall-clock time into the engine.
pub struct Driver {
    engine: EscalationEngine,
    signals: mpsc::UnboundedReceiver<HostSignal>,
    events: mpsc::UnboundedSender<Event>,
    epoch: Instant,
}

impl Driver {
    pub fn new(
        engine: EscalationEngine,
        signals: mpsc::UnboundedReceiver<HostSignal>,
        events: mpsc::UnboundedSender<Event>,
    ) -> Self {
        Self {
            engine,
            signals,
            events,
            epoch: Instant::now(),
        }
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn emit(&self, events: Vec<Event>) {
        for event in events {
            // A host that dropped its receiver just stops observing.
            let _ = self.events.send(event);
        }
    }

    /// Run until the signal channel closes or `Shutdown` arrives.
    pub async fn run(mut self) {
        loop {
            let now = self.now_ms();
            let due = self.engine.tick(now);
            self.emit(due);

            let deadline = self.engine.next_deadline();
            let epoch = self.epoch;
            tokio::select! {
                signal = self.signals.recv() => {
                    let now = self.now_ms();
                    match signal {
                        None | Some(HostSignal::Shutdown) => break,
                        Some(HostSignal::Input) => {
                            let events = self.engine.on_input(now);
                            self.emit(events);
                        }
                        Some(HostSignal::OverlayTap) => {
                            let events = self.engine.on_overlay_tap(now);
                            self.emit(events);
                        }
                        Some(HostSignal::LinkActivated) => {
                            let events = self.engine.on_link_activated();
                            self.emit(events);
                        }
                        Some(HostSignal::SessionReset) => {
                            let events = self.engine.on_session_reset();
                            self.emit(events);
                        }
                        Some(HostSignal::CueLoaded { kind, duration_ms }) => {
                            self.engine.cue_loaded(kind, duration_ms);
                        }
                        Some(HostSignal::CueLoadFailed { kind, reason }) => {
                            let events = self.engine.cue_load_failed(kind, &reason);
                            self.emit(events);
                        }
                        Some(HostSignal::MuteAll(muted)) => {
                            self.engine.set_muted(muted);
                        }
                    }
                }
                _ = wait_until(deadline, epoch) => {}
            }
        }
    }
}

async fn wait_until(deadline_ms: Option<u64>, epoch: Instant) {
    match deadline_ms {
        Some(ms) => sleep_until(epoch + Duration::from_millis(ms)).await,
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioSink;
    use crate::config::EngineConfig;
    use crate::overlay::{OverlayKind, OverlaySurface};
    use crate::takeover::TakeoverHost;
    use std::sync::{Arc, Mutex};

    struct NullSink;
    impl AudioSink for NullSink {
        fn play(&mut self, _kind: CueKind, _volume: f32) {}
    }

    struct NullSurface;
    impl OverlaySurface for NullSurface {
        fn show(&mut self, _kind: OverlayKind) {}
        fn hide(&mut self) {}
        fn set_input_blocked(&mut self, _blocked: bool) {}
    }

    struct RecordingHost(Arc<Mutex<Vec<String>>>);
    impl TakeoverHost for RecordingHost {
        fn request_fullscreen(&mut self) -> bool {
            false
        }
        fn embed_video(&mut self, url: &str) {
            self.0.lock().unwrap().push(url.to_string());
        }
    }

    fn spawn_driver(
        embeds: Arc<Mutex<Vec<String>>>,
    ) -> (
        mpsc::UnboundedSender<HostSignal>,
        mpsc::UnboundedReceiver<Event>,
        tokio::task::JoinHandle<()>,
    ) {
        let engine = EscalationEngine::new(
            EngineConfig::default(),
            Box::new(NullSink),
            Box::new(NullSurface),
            None,
            Box::new(RecordingHost(embeds)),
        );
        let (sig_tx, sig_rx) = mpsc::unbounded_channel();
        let (ev_tx, ev_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(Driver::new(engine, sig_rx, ev_tx).run());
        (sig_tx, ev_rx, handle)
    }

    #[tokio::test(start_paused = true)]
    async fn soft_cycle_through_the_driver() {
        let (sig_tx, mut ev_rx, handle) = spawn_driver(Arc::default());
        for _ in 0..30 {
            sig_tx.send(HostSignal::Input).unwrap();
        }

        let mut seen_soft = false;
        while let Some(event) = ev_rx.recv().await {
            match event {
                Event::SoftEntered { window_len, .. } => {
                    assert_eq!(window_len, 30);
                    seen_soft = true;
                }
                // The paused clock auto-advances to the 3 200 ms deadline.
                Event::SoftAutoHidden { .. } => break,
                _ => {}
            }
        }
        assert!(seen_soft);

        sig_tx.send(HostSignal::Shutdown).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn hard_escalation_reaches_the_takeover() {
        let embeds = Arc::new(Mutex::new(Vec::new()));
        let (sig_tx, mut ev_rx, handle) = spawn_driver(embeds.clone());

        sig_tx
            .send(HostSignal::CueLoaded {
                kind: CueKind::Warn,
                duration_ms: Some(2_000),
            })
            .unwrap();
        for _ in 0..50 {
            sig_tx.send(HostSignal::Input).unwrap();
        }

        let mut scheduled_delay = None;
        while let Some(event) = ev_rx.recv().await {
            match event {
                Event::TakeoverScheduled { delay_ms, .. } => scheduled_delay = Some(delay_ms),
                Event::TakeoverFired { destination, .. } => {
                    assert!(destination.contains("youtube.com"));
                    break;
                }
                _ => {}
            }
        }
        assert_eq!(scheduled_delay, Some(2_200));
        assert_eq!(embeds.lock().unwrap().len(), 1);

        // Hard is terminal: further inputs emit nothing.
        sig_tx.send(HostSignal::Input).unwrap();
        sig_tx.send(HostSignal::Shutdown).unwrap();
        handle.await.unwrap();
        assert!(ev_rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn session_reset_rearms_through_the_driver() {
        let (sig_tx, mut ev_rx, handle) = spawn_driver(Arc::default());
        for _ in 0..30 {
            sig_tx.send(HostSignal::Input).unwrap();
        }
        sig_tx.send(HostSignal::SessionReset).unwrap();
        for _ in 0..30 {
            sig_tx.send(HostSignal::Input).unwrap();
        }

        let mut soft_entries = 0;
        let mut resets = 0;
        while let Some(event) = ev_rx.recv().await {
            match event {
                Event::SoftEntered { .. } => {
                    soft_entries += 1;
                    if soft_entries == 2 {
                        break;
                    }
                }
                Event::SessionReset { .. } => resets += 1,
                _ => {}
            }
        }
        assert_eq!(soft_entries, 2);
        assert_eq!(resets, 1);

        sig_tx.send(HostSignal::Shutdown).unwrap();
        handle.await.unwrap();
    }
}
