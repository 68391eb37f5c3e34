//! View projection: playback state → what every observer should show.
//!
//! Observers never keep their own idea of "what's playing". Each render
//! visits every registered observer and derives its icon from the state
//! snapshot alone, so a missed notification can't leave one stale.

use serde::Serialize;

use crate::catalog::{AssetUrls, MetadataIndex, Section};

use super::identity::{self, TrackRef};
use super::state::PlaybackState;

/// The two visual variants of a play/pause affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IconVariant {
    /// Shows "pause": this item is the one playing
    Playing,
    /// Shows "play"
    NotPlaying,
}

/// What an observer is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ObserverKind {
    /// Footer transport button; follows `is_playing` only
    MainButton,
    /// Row in the playlist sidebar
    PlaylistRow(TrackRef),
    /// Card in a section grid
    Card(TrackRef),
}

impl ObserverKind {
    pub fn track(&self) -> Option<&TrackRef> {
        match self {
            Self::MainButton => None,
            Self::PlaylistRow(track) | Self::Card(track) => Some(track),
        }
    }
}

/// Handle for a registered observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ObserverId(usize);

/// Footer now-playing block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FooterView {
    pub title: String,
    pub artists: Vec<String>,
    pub image_url: String,
}

/// Everything a renderer needs after one notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame {
    /// One entry per registered observer, in registration order
    pub icons: Vec<(ObserverId, IconVariant)>,
    /// Formatted position ("M:SS")
    pub elapsed: String,
    /// Formatted duration ("0:00" when unknown)
    pub total: String,
    /// Seek bar value, 0 - 100
    pub progress_percent: f64,
    pub footer: Option<FooterView>,
    pub error: Option<String>,
}

impl RenderFrame {
    /// Icon for `id`, if registered.
    pub fn icon(&self, id: ObserverId) -> Option<IconVariant> {
        self.icons.iter().find(|(i, _)| *i == id).map(|(_, v)| *v)
    }
}

/// Whether an item bound to `track` is the one currently playing.
pub fn is_active_playing(state: &PlaybackState, track: &str) -> bool {
    state.is_playing
        && state
            .loaded
            .as_ref()
            .is_some_and(|loaded| identity::equivalent(loaded.as_str(), track))
}

/// Icon variant for one observer.
pub fn variant_for(state: &PlaybackState, kind: &ObserverKind) -> IconVariant {
    let active = match kind.track() {
        None => state.is_playing,
        Some(track) => is_active_playing(state, track.as_str()),
    };
    if active {
        IconVariant::Playing
    } else {
        IconVariant::NotPlaying
    }
}

/// Icon variants for all `observers`.
pub fn project(
    state: &PlaybackState,
    observers: &[(ObserverId, ObserverKind)],
) -> Vec<(ObserverId, IconVariant)> {
    observers
        .iter()
        .map(|(id, kind)| (*id, variant_for(state, kind)))
        .collect()
}

/// Registry of observers plus the last rendered footer.
#[derive(Debug, Default)]
pub struct ViewProjector {
    observers: Vec<(ObserverId, ObserverKind)>,
    next_id: usize,
    footer: Option<FooterView>,
}

impl ViewProjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: ObserverKind) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, kind));
        id
    }

    /// Register one card observer per section item that has a track.
    pub fn register_cards(&mut self, sections: &[(String, Section)]) -> Vec<ObserverId> {
        sections
            .iter()
            .flat_map(|(_, section)| section.items.iter())
            .filter_map(|item| item.track.clone())
            .map(|track| self.register(ObserverKind::Card(track)))
            .collect()
    }

    pub fn unregister(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(i, _)| *i != id);
        self.observers.len() != before
    }

    pub fn observers(&self) -> &[(ObserverId, ObserverKind)] {
        &self.observers
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Last footer shown.
    pub fn footer(&self) -> Option<&FooterView> {
        self.footer.as_ref()
    }

    /// Re-derive every observer from `state`.
    ///
    /// The footer is replaced only when metadata for the loaded track exists;
    /// otherwise the previous footer stays on screen.
    pub fn render(
        &mut self,
        state: &PlaybackState,
        metadata: &MetadataIndex,
        assets: &AssetUrls,
    ) -> RenderFrame {
        if let Some(loaded) = &state.loaded {
            match metadata.lookup(loaded.as_str()) {
                Some(meta) => {
                    self.footer = Some(FooterView {
                        title: meta.title.clone(),
                        artists: meta.artists.clone(),
                        image_url: assets.image_url(&meta.image_file),
                    });
                }
                None => tracing::trace!(track = %loaded, "No metadata, keeping footer"),
            }
        }

        RenderFrame {
            icons: project(state, &self.observers),
            elapsed: state.position_str(),
            total: state.duration_str(),
            progress_percent: state.progress_percent(),
            footer: self.footer.clone(),
            error: state.error.clone(),
        }
    }
}
