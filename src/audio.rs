//! Cue registry and playback gating.
//!
//! The sound player owns everything audible: per-cue load state, the
//! platform audio-unlock latch, the mute-all latch, the minimum inter-play
//! gap for the plain click, and rare-variant selection. Actual output goes
//! through an injected [`AudioSink`]; a sink that drops every call is a
//! valid (silent) implementation.
//!
//! Load failures are state, not errors: a cue that failed to load makes
//! later plays for that kind a silent no-op. The plain click may substitute
//! a synthesized tone via [`AudioSink::play_fallback_tone`].

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::{AudioConfig, RareMode};

/// The three audio cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CueKind {
    Click,
    Rare,
    Warn,
}

impl CueKind {
    fn index(self) -> usize {
        match self {
            CueKind::Click => 0,
            CueKind::Rare => 1,
            CueKind::Warn => 2,
        }
    }
}

/// Load state of one cue asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueState {
    /// Decode still in flight; plays are dropped.
    Pending,
    /// Decoded and playable. Duration is known for most codecs.
    Ready { duration_ms: Option<u64> },
    /// Load or decode failed; permanent for the page lifetime.
    Failed,
}

/// Platform audio output.
///
/// Implementations must not block; playback rejection (autoplay policy)
/// is the sink's problem and must be swallowed there.
pub trait AudioSink: Send {
    fn play(&mut self, kind: CueKind, volume: f32);

    /// Synthesized short tone, used only when the plain click asset failed.
    fn play_fallback_tone(&mut self) {}
}

/// A cue playback that actually produced output.
#[derive(Debug, Clone, Copy)]
pub struct CuePlay {
    pub kind: CueKind,
    /// Value of the rare counter at play time.
    pub counter: u64,
}

/// Owns cue state and playback gating. See module docs.
pub struct SoundPlayer {
    sink: Box<dyn AudioSink>,
    config: AudioConfig,
    states: [CueState; 3],
    unlocked: bool,
    muted: bool,
    last_click_ms: Option<u64>,
    rare_counter: u64,
    rng: Pcg32,
}

impl SoundPlayer {
    pub fn new(config: AudioConfig, sink: Box<dyn AudioSink>) -> Self {
        let rng = Pcg32::seed_from_u64(config.rng_seed);
        Self {
            sink,
            config,
            states: [CueState::Pending; 3],
            unlocked: false,
            muted: false,
            last_click_ms: None,
            rare_counter: 0,
            rng,
        }
    }

    /// Un-suspend audio output. Returns true only on the first call.
    pub fn unlock(&mut self) -> bool {
        if self.unlocked {
            return false;
        }
        self.unlocked = true;
        true
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Silence every cue without touching any other state.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn mark_loaded(&mut self, kind: CueKind, duration_ms: Option<u64>) {
        self.states[kind.index()] = CueState::Ready { duration_ms };
    }

    pub fn mark_failed(&mut self, kind: CueKind) {
        self.states[kind.index()] = CueState::Failed;
    }

    pub fn state(&self, kind: CueKind) -> CueState {
        self.states[kind.index()]
    }

    pub fn duration_ms(&self, kind: CueKind) -> Option<u64> {
        match self.state(kind) {
            CueState::Ready { duration_ms } => duration_ms,
            _ => None,
        }
    }

    pub fn rare_counter(&self) -> u64 {
        self.rare_counter
    }

    /// Play the click cue for one qualifying input, selecting the rare
    /// variant per the configured mode.
    ///
    /// The rare counter advances on every call; gating (lock, mute, gap,
    /// load state) only decides whether anything is audible. Returns what
    /// was actually played, if anything.
    pub fn play_click(&mut self, now_ms: u64) -> Option<CuePlay> {
        self.rare_counter += 1;
        let rare = match self.config.rare_mode {
            RareMode::Deterministic => self.rare_counter % u64::from(self.config.rare_rate) == 0,
            RareMode::Probabilistic => self.rng.gen_ratio(1, self.config.rare_rate),
        };
        if !self.unlocked || self.muted {
            return None;
        }
        if rare {
            // Rare is exempt from the inter-play gap.
            if matches!(self.state(CueKind::Rare), CueState::Ready { .. }) {
                self.sink.play(CueKind::Rare, self.config.rare_volume);
                return Some(CuePlay {
                    kind: CueKind::Rare,
                    counter: self.rare_counter,
                });
            }
            return None;
        }
        if let Some(last) = self.last_click_ms {
            if now_ms.saturating_sub(last) < self.config.click_min_gap_ms {
                return None;
            }
        }
        match self.state(CueKind::Click) {
            CueState::Ready { .. } => {
                self.sink.play(CueKind::Click, self.config.click_volume);
            }
            CueState::Failed => {
                self.sink.play_fallback_tone();
            }
            CueState::Pending => return None,
        }
        self.last_click_ms = Some(now_ms);
        Some(CuePlay {
            kind: CueKind::Click,
            counter: self.rare_counter,
        })
    }

    /// Play the warning cue. Bypasses the inter-play gap and the rare
    /// counter; still subject to the lock, mute, and load-state gates.
    pub fn play_warn(&mut self) -> bool {
        if !self.unlocked || self.muted {
            return false;
        }
        if !matches!(self.state(CueKind::Warn), CueState::Ready { .. }) {
            return false;
        }
        self.sink.play(CueKind::Warn, self.config.warn_volume);
        true
    }
}

impl std::fmt::Debug for SoundPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundPlayer")
            .field("states", &self.states)
            .field("unlocked", &self.unlocked)
            .field("muted", &self.muted)
            .field("rare_counter", &self.rare_counter)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct SinkLog {
        plays: Vec<(CueKind, f32)>,
        tones: usize,
    }

    struct TestSink(Arc<Mutex<SinkLog>>);

    impl AudioSink for TestSink {
        fn play(&mut self, kind: CueKind, volume: f32) {
            self.0.lock().unwrap().plays.push((kind, volume));
        }
        fn play_fallback_tone(&mut self) {
            self.0.lock().unwrap().tones += 1;
        }
    }

    fn player(config: AudioConfig) -> (SoundPlayer, Arc<Mutex<SinkLog>>) {
        let log = Arc::new(Mutex::new(SinkLog::default()));
        let player = SoundPlayer::new(config, Box::new(TestSink(log.clone())));
        (player, log)
    }

    #[test]
    fn locked_player_drops_plays() {
        let (mut p, log) = player(AudioConfig::default());
        p.mark_loaded(CueKind::Click, Some(120));
        assert!(p.play_click(0).is_none());
        assert!(log.lock().unwrap().plays.is_empty());
        // Counter still advanced.
        assert_eq!(p.rare_counter(), 1);
    }

    #[test]
    fn unlock_is_one_shot() {
        let (mut p, _) = player(AudioConfig::default());
        assert!(p.unlock());
        assert!(!p.unlock());
    }

    #[test]
    fn pending_cue_is_silent() {
        let (mut p, log) = player(AudioConfig::default());
        p.unlock();
        assert!(p.play_click(0).is_none());
        assert!(log.lock().unwrap().plays.is_empty());
    }

    #[test]
    fn failed_click_uses_fallback_tone() {
        let (mut p, log) = player(AudioConfig::default());
        p.unlock();
        p.mark_failed(CueKind::Click);
        let play = p.play_click(0).unwrap();
        assert_eq!(play.kind, CueKind::Click);
        let log = log.lock().unwrap();
        assert!(log.plays.is_empty());
        assert_eq!(log.tones, 1);
    }

    #[test]
    fn min_gap_suppresses_rapid_clicks() {
        let (mut p, log) = player(AudioConfig::default());
        p.unlock();
        p.mark_loaded(CueKind::Click, Some(120));
        assert!(p.play_click(0).is_some());
        assert!(p.play_click(50).is_none()); // inside the 90 ms gap
        assert!(p.play_click(95).is_some());
        assert_eq!(log.lock().unwrap().plays.len(), 2);
    }

    #[test]
    fn deterministic_rare_every_nth() {
        let config = AudioConfig {
            rare_rate: 5,
            click_min_gap_ms: 0,
            ..AudioConfig::default()
        };
        let (mut p, log) = player(config);
        p.unlock();
        p.mark_loaded(CueKind::Click, None);
        p.mark_loaded(CueKind::Rare, None);
        for i in 0..10u64 {
            p.play_click(i * 1_000);
        }
        let plays = &log.lock().unwrap().plays;
        let rares = plays.iter().filter(|(k, _)| *k == CueKind::Rare).count();
        assert_eq!(rares, 2); // 5th and 10th
        assert_eq!(plays.len(), 10);
    }

    #[test]
    fn rare_not_ready_is_silent_not_substituted() {
        let config = AudioConfig {
            rare_rate: 2,
            click_min_gap_ms: 0,
            ..AudioConfig::default()
        };
        let (mut p, log) = player(config);
        p.unlock();
        p.mark_loaded(CueKind::Click, None);
        p.play_click(0); // click
        assert!(p.play_click(1_000).is_none()); // rare slot, buffer missing
        assert_eq!(log.lock().unwrap().plays.len(), 1);
    }

    #[test]
    fn probabilistic_mode_is_seed_deterministic() {
        let config = AudioConfig {
            rare_rate: 4,
            rare_mode: RareMode::Probabilistic,
            click_min_gap_ms: 0,
            ..AudioConfig::default()
        };
        let run = |cfg: AudioConfig| {
            let (mut p, log) = player(cfg);
            p.unlock();
            p.mark_loaded(CueKind::Click, None);
            p.mark_loaded(CueKind::Rare, None);
            for i in 0..50u64 {
                p.play_click(i * 1_000);
            }
            let plays = log.lock().unwrap().plays.clone();
            plays
        };
        assert_eq!(run(config.clone()), run(config));
    }

    #[test]
    fn mute_all_silences_everything() {
        let (mut p, log) = player(AudioConfig::default());
        p.unlock();
        p.mark_loaded(CueKind::Click, None);
        p.mark_loaded(CueKind::Warn, Some(7_000));
        p.set_muted(true);
        assert!(p.play_click(0).is_none());
        assert!(!p.play_warn());
        assert!(log.lock().unwrap().plays.is_empty());
    }

    #[test]
    fn warn_uses_warn_volume() {
        let (mut p, log) = player(AudioConfig::default());
        p.unlock();
        p.mark_loaded(CueKind::Warn, Some(7_000));
        assert!(p.play_warn());
        assert_eq!(log.lock().unwrap().plays[0], (CueKind::Warn, 0.8));
        assert_eq!(p.duration_ms(CueKind::Warn), Some(7_000));
    }
}
