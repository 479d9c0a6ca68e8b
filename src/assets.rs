//! Asset URL resolution.
//!
//! Cue and overlay-image URLs are resolved relative to a configurable base
//! path served by a static file server. Fetching is the host's concern;
//! this catalog only constructs the URLs.

use crate::audio::CueKind;
use crate::overlay::OverlayKind;

/// Resolves asset URLs relative to a base path.
#[derive(Debug, Clone)]
pub struct AssetCatalog {
    base: String,
}

impl AssetCatalog {
    /// A trailing slash on the base is trimmed so joins stay single-slash.
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn cue_url(&self, kind: CueKind) -> String {
        let file = match kind {
            CueKind::Click => "click.mp3",
            CueKind::Rare => "click-rare.mp3",
            CueKind::Warn => "warn.mp3",
        };
        format!("{}/assets/audio/{}", self.base, file)
    }

    pub fn overlay_image_url(&self, kind: OverlayKind) -> String {
        let file = match kind {
            OverlayKind::Soft => "warn-soft.jpg",
            OverlayKind::Hard => "warn.jpg",
        };
        format!("{}/assets/images/{}", self.base, file)
    }
}
