//! Full-page takeover.
//!
//! The irrecoverable final action after a hard lockout: request fullscreen
//! (failure ignored) and embed a full-viewport video at the configured
//! destination, or navigate there, depending on what the host supports.
//! An internal latch guards double invocation for the page lifetime.

/// Platform side of the takeover.
pub trait TakeoverHost: Send {
    /// Best-effort fullscreen request; returns whether it took effect.
    fn request_fullscreen(&mut self) -> bool;

    /// Embed the full-viewport video, or navigate the browsing context.
    fn embed_video(&mut self, url: &str);
}

/// What a successful takeover did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TakeoverOutcome {
    pub destination: String,
    pub fullscreen: bool,
}

/// One-shot takeover latch.
pub struct TakeoverTrigger {
    host: Box<dyn TakeoverHost>,
    destination: String,
    fired: bool,
}

impl TakeoverTrigger {
    pub fn new(destination: String, host: Box<dyn TakeoverHost>) -> Self {
        Self {
            host,
            destination,
            fired: false,
        }
    }

    /// Perform the takeover. Returns `None` when already fired.
    pub fn fire(&mut self) -> Option<TakeoverOutcome> {
        if self.fired {
            return None;
        }
        self.fired = true;
        let fullscreen = self.host.request_fullscreen();
        self.host.embed_video(&self.destination);
        Some(TakeoverOutcome {
            destination: self.destination.clone(),
            fullscreen,
        })
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }
}

impl std::fmt::Debug for TakeoverTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TakeoverTrigger")
            .field("destination", &self.destination)
            .field("fired", &self.fired)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct TestHost {
        log: Arc<Mutex<Vec<String>>>,
        fullscreen_ok: bool,
    }

    impl TakeoverHost for TestHost {
        fn request_fullscreen(&mut self) -> bool {
            self.log.lock().unwrap().push("fullscreen".into());
            self.fullscreen_ok
        }
        fn embed_video(&mut self, url: &str) {
            self.log.lock().unwrap().push(format!("embed:{url}"));
        }
    }

    fn trigger(fullscreen_ok: bool) -> (TakeoverTrigger, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let host = TestHost {
            log: log.clone(),
            fullscreen_ok,
        };
        (
            TakeoverTrigger::new("https://example.com/v".into(), Box::new(host)),
            log,
        )
    }

    #[test]
    fn fire_requests_fullscreen_then_embeds() {
        let (mut t, log) = trigger(true);
        let out = t.fire().unwrap();
        assert!(out.fullscreen);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["fullscreen".to_string(), "embed:https://example.com/v".to_string()]
        );
    }

    #[test]
    fn fullscreen_failure_does_not_stop_the_takeover() {
        let (mut t, log) = trigger(false);
        let out = t.fire().unwrap();
        assert!(!out.fullscreen);
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[test]
    fn second_fire_is_latched_out() {
        let (mut t, log) = trigger(true);
        assert!(t.fire().is_some());
        assert!(t.fire().is_none());
        assert!(t.has_fired());
        assert_eq!(log.lock().unwrap().len(), 2);
    }
}
