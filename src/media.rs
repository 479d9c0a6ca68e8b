//! External media bridge.
//!
//! Suspends and resumes an embedded third-party player (located by the host
//! via CSS selector) while the hard overlay is active. Suspension stores
//! the current source and clears it, which stops playback; resumption
//! restores it. Both directions latch: a second suspend while suspended is
//! a no-op, as is a resume with nothing stored. A page without the media
//! element makes the whole bridge a no-op.

/// The embedded third-party player, reduced to source get/set semantics.
pub trait MediaElement: Send {
    fn source(&self) -> Option<String>;
    fn set_source(&mut self, source: Option<String>);
}

/// Suspend/resume latch over an optional [`MediaElement`].
pub struct MediaBridge {
    element: Option<Box<dyn MediaElement>>,
    stored: Option<String>,
}

impl MediaBridge {
    pub fn new(element: Option<Box<dyn MediaElement>>) -> Self {
        Self {
            element,
            stored: None,
        }
    }

    /// Store the current source and clear it, exactly once.
    pub fn suspend(&mut self) {
        if self.stored.is_some() {
            return;
        }
        let Some(element) = self.element.as_mut() else {
            return;
        };
        let Some(src) = element.source() else {
            return;
        };
        element.set_source(None);
        self.stored = Some(src);
    }

    /// Restore the stored source and clear the stored value.
    pub fn resume(&mut self) {
        let Some(src) = self.stored.take() else {
            return;
        };
        if let Some(element) = self.element.as_mut() {
            element.set_source(Some(src));
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.stored.is_some()
    }
}

impl std::fmt::Debug for MediaBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaBridge")
            .field("present", &self.element.is_some())
            .field("suspended", &self.is_suspended())
            .finish()
    }
}
