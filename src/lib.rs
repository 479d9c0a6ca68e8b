//! # Clickguard
//!
//! An escalating spam-click deterrent for a hosted page: counts rapid
//! repeated pointer activity in a sliding window, plays feedback cues, and
//! above configured thresholds shows a blocking warning overlay, eventually
//! forcing a full-page takeover.
//!
//! This is deliberately not a security or anti-bot system: all state lives
//! in the page and resets on navigation.
//!
//! ## Architecture
//!
//! - **Escalation Engine**: a wall-clock-based state machine that never
//!   reads a clock itself -- every entry point takes `now` in epoch
//!   milliseconds, and the host (or the [`Driver`]) calls `tick()` when
//!   scheduled work falls due
//! - **Collaborators**: sound player, overlay controller, media bridge,
//!   and takeover trigger, each owning its own latch logic over an
//!   injected platform trait ([`AudioSink`], [`OverlaySurface`],
//!   [`MediaElement`], [`TakeoverHost`])
//! - **Events**: every observable state change produces an [`Event`];
//!   the host subscribes to the stream
//!
//! ## Key components
//!
//! - [`EscalationEngine`]: the core state machine
//! - [`EngineConfig`]: thresholds and durations, TOML-loadable
//! - [`Driver`]: tokio pump feeding host signals and real time into the
//!   engine

pub mod assets;
pub mod audio;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod events;
pub mod media;
pub mod overlay;
pub mod takeover;
pub mod tasks;
pub mod window;

pub use assets::AssetCatalog;
pub use audio::{AudioSink, CueKind, CuePlay, CueState, SoundPlayer};
pub use config::{AudioConfig, EngineConfig, EscalationConfig, RareMode, TakeoverConfig};
pub use driver::{Driver, HostSignal};
pub use engine::{EscalationEngine, Phase};
pub use error::ConfigError;
pub use events::{Event, HardCause, ResetReason};
pub use media::{MediaBridge, MediaElement};
pub use overlay::{OverlayController, OverlayKind, OverlaySurface};
pub use takeover::{TakeoverHost, TakeoverOutcome, TakeoverTrigger};
pub use tasks::{TaskId, TaskKind, TaskQueue};
pub use window::ClickWindow;
