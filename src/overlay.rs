//! Blocking warning overlay.
//!
//! The controller owns visibility and the input-block latch; rendering and
//! the actual event interception (pointer-down, wheel, key-down at the
//! capture phase, plus scroll locking) live behind [`OverlaySurface`].
//!
//! Show and hide are idempotent: showing while shown swaps the kind,
//! hiding while hidden is a no-op.

use serde::{Deserialize, Serialize};

/// Which warning image the overlay carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    /// First-tier, reversible, time-limited.
    Soft,
    /// Second-tier, terminal for the session.
    Hard,
}

/// Platform rendering and input interception.
pub trait OverlaySurface: Send {
    /// Render the full-viewport layer with the kind-specific image.
    fn show(&mut self, kind: OverlayKind);

    fn hide(&mut self);

    /// Toggle system-wide interception of pointer-down, wheel, and
    /// key-down events, and page scroll locking.
    fn set_input_blocked(&mut self, blocked: bool);
}

/// Owns overlay visibility. See module docs.
pub struct OverlayController {
    surface: Box<dyn OverlaySurface>,
    visible: Option<OverlayKind>,
}

impl OverlayController {
    pub fn new(surface: Box<dyn OverlaySurface>) -> Self {
        Self {
            surface,
            visible: None,
        }
    }

    pub fn show(&mut self, kind: OverlayKind) {
        if self.visible == Some(kind) {
            return;
        }
        if self.visible.is_none() {
            self.surface.set_input_blocked(true);
        }
        self.surface.show(kind);
        self.visible = Some(kind);
    }

    /// Reverses everything `show` did, unconditionally.
    pub fn hide(&mut self) {
        if self.visible.is_none() {
            return;
        }
        self.surface.hide();
        self.surface.set_input_blocked(false);
        self.visible = None;
    }

    pub fn visible_kind(&self) -> Option<OverlayKind> {
        self.visible
    }

    pub fn is_visible(&self) -> bool {
        self.visible.is_some()
    }
}

impl std::fmt::Debug for OverlayController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayController")
            .field("visible", &self.visible)
            .finish()
    }
}
