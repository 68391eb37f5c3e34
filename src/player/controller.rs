//! Playback controller: owns the session and applies playlist policy.
//!
//! # Control Flow
//!
//! ```text
//! user action ──► controller ──► session ──► media primitive
//!                     ▲                          │ MediaEvent
//!                     │ Notification             ▼
//!                     └──────────────────── session.poll()
//!                                 │
//!                                 ▼
//!                       projector.render() ──► RenderFrame
//! ```
//!
//! The session stays single-track; moving to the next playlist entry on
//! "ended" happens here.

use crossbeam_channel::{Receiver, unbounded};
use tracing::{debug, info};

use crate::catalog::{AssetUrls, Catalog, MetadataIndex, Playlist};

use super::identity::{self, TrackRef};
use super::media::{MediaElement, MediaEvent};
use super::navigator;
use super::projector::{ObserverId, ObserverKind, RenderFrame, ViewProjector};
use super::session::{Notification, NotificationKind, PlaybackSession};
use super::state::PlaybackState;

/// Playlist-aware owner of a [`PlaybackSession`].
pub struct PlaybackController<M: MediaElement> {
    session: PlaybackSession<M>,
    notifications: Receiver<Notification>,
    playlist: Playlist,
    metadata: MetadataIndex,
    assets: AssetUrls,
    projector: ViewProjector,
}

impl<M: MediaElement> PlaybackController<M> {
    /// Create a controller over `media` for the given playlist and metadata.
    pub fn new(
        media: M,
        events: Receiver<MediaEvent>,
        playlist: Playlist,
        metadata: MetadataIndex,
        assets: AssetUrls,
    ) -> Self {
        let (tx, notifications) = unbounded();
        Self {
            session: PlaybackSession::new(media, events, tx),
            notifications,
            playlist,
            metadata,
            assets,
            projector: ViewProjector::new(),
        }
    }

    /// Create a controller from a loaded catalog with the usual observers
    /// registered: main button, one row per playlist entry, one per card.
    pub fn from_catalog(
        media: M,
        events: Receiver<MediaEvent>,
        catalog: Catalog,
        assets: AssetUrls,
    ) -> Self {
        let Catalog {
            playlist,
            metadata,
            sections,
        } = catalog;
        let mut controller = Self::new(media, events, playlist, metadata, assets);
        controller.projector.register(ObserverKind::MainButton);
        controller.register_playlist_rows();
        controller.projector.register_cards(&sections);
        controller
    }

    /// Register one row observer per playlist entry, in playlist order.
    pub fn register_playlist_rows(&mut self) -> Vec<ObserverId> {
        let tracks = self.playlist.tracks().to_vec();
        tracks
            .into_iter()
            .map(|track| self.projector.register(ObserverKind::PlaylistRow(track)))
            .collect()
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn state(&self) -> &PlaybackState {
        self.session.state()
    }

    pub fn session(&self) -> &PlaybackSession<M> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut PlaybackSession<M> {
        &mut self.session
    }

    pub fn projector(&self) -> &ViewProjector {
        &self.projector
    }

    pub fn projector_mut(&mut self) -> &mut ViewProjector {
        &mut self.projector
    }

    /// Apply the initial volume and optionally start the first playlist entry.
    pub fn start(&mut self, volume: f64, autoplay_first: bool) {
        self.session.set_volume(volume);
        if !autoplay_first {
            return;
        }
        match self.playlist.first().cloned() {
            Some(first) => self.session.load(first),
            None => debug!("Playlist is empty, nothing to autoplay"),
        }
    }

    /// Load `track` and play it.
    pub fn load(&mut self, track: TrackRef) {
        self.session.load(track);
    }

    /// Click on a row or card: toggle if it's the loaded track, else load it.
    pub fn select(&mut self, track: &TrackRef) {
        let same = self
            .session
            .loaded()
            .is_some_and(|loaded| identity::equivalent(loaded.as_str(), track.as_str()));
        if same {
            self.session.toggle();
        } else {
            self.session.load(track.clone());
        }
    }

    pub fn play(&mut self) {
        self.session.play();
    }

    pub fn pause(&mut self) {
        self.session.pause();
    }

    pub fn toggle(&mut self) {
        self.session.toggle();
    }

    pub fn seek_to_fraction(&mut self, fraction: f64) {
        self.session.seek_to_fraction(fraction);
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.session.set_volume(volume);
    }

    /// Skip to the next playlist entry. Returns whether a track was loaded.
    pub fn next(&mut self) -> bool {
        let target = self
            .session
            .loaded()
            .and_then(|current| navigator::next(self.playlist.tracks(), current.as_str()))
            .cloned();
        self.load_target(target, "next")
    }

    /// Go back to the previous playlist entry. Returns whether a track was loaded.
    pub fn previous(&mut self) -> bool {
        let target = self
            .session
            .loaded()
            .and_then(|current| navigator::previous(self.playlist.tracks(), current.as_str()))
            .cloned();
        self.load_target(target, "previous")
    }

    fn load_target(&mut self, target: Option<TrackRef>, direction: &str) -> bool {
        match target {
            Some(track) => {
                self.session.load(track);
                true
            }
            None => {
                debug!(direction, "No navigation target");
                false
            }
        }
    }

    /// Process everything pending, in order, and return one frame per
    /// notification.
    ///
    /// Media events are applied one at a time; each resulting notification is
    /// rendered before the next event is looked at. An `Ended` for the track
    /// that is still loaded advances to the next playlist entry.
    pub fn pump(&mut self) -> Vec<RenderFrame> {
        let mut frames = Vec::new();
        loop {
            while let Ok(notification) = self.notifications.try_recv() {
                frames.push(self.on_notification(notification));
            }
            if !self.session.poll() {
                break;
            }
        }
        frames
    }

    /// Render the current state without waiting for a notification.
    pub fn render(&mut self) -> RenderFrame {
        self.projector
            .render(self.session.state(), &self.metadata, &self.assets)
    }

    fn on_notification(&mut self, notification: Notification) -> RenderFrame {
        let frame = self
            .projector
            .render(&notification.state, &self.metadata, &self.assets);

        if notification.kind == NotificationKind::Ended
            && let Some(ended) = notification.state.loaded
        {
            self.advance_after(&ended);
        }
        frame
    }

    fn advance_after(&mut self, ended: &TrackRef) {
        let still_loaded = self
            .session
            .loaded()
            .is_some_and(|loaded| identity::equivalent(loaded.as_str(), ended.as_str()));
        if !still_loaded {
            debug!(track = %ended, "Ignoring end of a track that is no longer loaded");
            return;
        }

        match navigator::next(self.playlist.tracks(), ended.as_str()).cloned() {
            Some(next) => {
                info!(from = %ended, to = %next, "Advancing to next track");
                self.session.load(next);
            }
            None => info!(track = %ended, "End of playlist"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::media::SimulatedMedia;
    use crate::player::projector::IconVariant;
    use crate::test_utils::{controller_with, mock_catalog};

    #[test]
    fn test_ended_walks_playlist_without_wraparound() {
        let mut c = controller_with(&["A.mp3", "B.mp3", "C.mp3"]);
        c.load(TrackRef::from("A.mp3"));
        c.pump();
        assert!(c.state().is_playing);

        c.session_mut().media_mut().finish();
        c.pump();
        assert_eq!(c.state().loaded, Some(TrackRef::from("B.mp3")));
        assert!(c.state().is_playing);

        c.session_mut().media_mut().finish();
        c.pump();
        assert_eq!(c.state().loaded, Some(TrackRef::from("C.mp3")));

        c.session_mut().media_mut().finish();
        c.pump();
        assert_eq!(c.state().loaded, Some(TrackRef::from("C.mp3")));
        assert!(!c.state().is_playing);
    }

    #[test]
    fn test_late_load_completion_does_not_overwrite_current() {
        let mut c = controller_with(&["X.mp3", "Y.mp3"]);
        c.load(TrackRef::from("X.mp3"));
        c.load(TrackRef::from("Y.mp3"));
        c.session().media().emit(MediaEvent::Loaded {
            source: TrackRef::from("X.mp3"),
            duration: 99.0,
        });
        c.pump();

        assert_eq!(c.state().loaded, Some(TrackRef::from("Y.mp3")));
        assert_eq!(c.state().duration, None);
    }

    #[test]
    fn test_stale_ended_does_not_advance() {
        let mut c = controller_with(&["A.mp3", "B.mp3", "C.mp3"]);
        c.load(TrackRef::from("A.mp3"));
        c.pump();

        // A ends, but the user picks C before the notification is handled.
        c.session_mut().media_mut().finish();
        c.session_mut().drain_events();
        c.load(TrackRef::from("C.mp3"));
        c.pump();

        assert_eq!(c.state().loaded, Some(TrackRef::from("C.mp3")));
    }

    #[test]
    fn test_next_and_previous() {
        let mut c = controller_with(&["A.mp3", "B.mp3", "C.mp3"]);
        assert!(!c.next());
        assert!(!c.previous());

        c.load(TrackRef::from("B.mp3"));
        assert!(c.next());
        assert_eq!(c.state().loaded, Some(TrackRef::from("C.mp3")));
        assert!(!c.next());

        assert!(c.previous());
        assert!(c.previous());
        assert_eq!(c.state().loaded, Some(TrackRef::from("A.mp3")));
        assert!(!c.previous());
    }

    #[test]
    fn test_next_from_foreign_track_is_noop() {
        let mut c = controller_with(&["A.mp3", "B.mp3"]);
        c.load(TrackRef::from("Elsewhere.mp3"));
        assert!(!c.next());
        assert_eq!(c.state().loaded, Some(TrackRef::from("Elsewhere.mp3")));
    }

    #[test]
    fn test_select_toggles_same_track_across_encodings() {
        let mut c = controller_with(&["Song%20A.mp3", "B.mp3"]);
        c.select(&TrackRef::from("Song%20A.mp3"));
        c.pump();
        assert!(c.state().is_playing);

        c.select(&TrackRef::from("Song A.mp3"));
        c.pump();
        assert!(!c.state().is_playing);
        assert_eq!(c.state().loaded, Some(TrackRef::from("Song%20A.mp3")));

        c.select(&TrackRef::from("B.mp3"));
        c.pump();
        assert!(c.state().is_playing);
        assert_eq!(c.state().loaded, Some(TrackRef::from("B.mp3")));
    }

    #[test]
    fn test_second_click_before_pump_pauses() {
        let mut c = controller_with(&["A.mp3", "B.mp3"]);
        c.select(&TrackRef::from("A.mp3"));
        c.select(&TrackRef::from("A.mp3"));
        c.pump();

        assert_eq!(c.state().loaded, Some(TrackRef::from("A.mp3")));
        assert!(!c.state().is_playing);
        assert!(c.session().media().is_paused());
    }

    #[test]
    fn test_frames_keep_all_observers_in_sync() {
        let (media, events) = SimulatedMedia::new();
        let mut c =
            PlaybackController::from_catalog(media, events, mock_catalog(), AssetUrls::default());
        let observers = c.projector().observers().to_vec();

        c.select(&TrackRef::from("Song A.mp3"));
        let frames = c.pump();
        let last = frames.last().unwrap();

        for (id, kind) in &observers {
            let expected = match kind.track() {
                None => IconVariant::Playing,
                Some(t) if identity::equivalent(t.as_str(), "Song A.mp3") => IconVariant::Playing,
                Some(_) => IconVariant::NotPlaying,
            };
            assert_eq!(last.icon(*id), Some(expected), "observer {:?}", kind);
        }
        assert_eq!(last.footer.as_ref().unwrap().title, "Song A");
    }

    #[test]
    fn test_media_error_renders_not_playing() {
        let mut c = controller_with(&["A.mp3", "B.mp3"]);
        let row = c.register_playlist_rows()[0];
        c.load(TrackRef::from("A.mp3"));
        c.session_mut().media_mut().fail("decode error");
        let frames = c.pump();

        let last = frames.last().unwrap();
        assert_eq!(last.icon(row), Some(IconVariant::NotPlaying));
        assert_eq!(last.error.as_deref(), Some("decode error"));
        // A failed track doesn't auto-advance.
        assert_eq!(c.state().loaded, Some(TrackRef::from("A.mp3")));
    }

    #[test]
    fn test_start_autoplays_first_entry() {
        let mut c = controller_with(&["A.mp3", "B.mp3"]);
        c.start(0.5, true);
        c.pump();
        assert_eq!(c.state().loaded, Some(TrackRef::from("A.mp3")));
        assert!(c.state().is_playing);
        assert_eq!(c.state().volume, 0.5);

        let mut idle = controller_with(&["A.mp3"]);
        idle.start(1.0, false);
        idle.pump();
        assert!(idle.state().loaded.is_none());
    }

    #[test]
    fn test_pump_frames_follow_event_order() {
        let mut c = controller_with(&["A.mp3"]);
        c.load(TrackRef::from("A.mp3"));
        c.session_mut().media_mut().complete_load(60.0);
        c.pump();

        c.session_mut().media_mut().advance(15.0);
        c.session_mut().media_mut().advance(15.0);
        let frames = c.pump();
        let elapsed: Vec<&str> = frames.iter().map(|f| f.elapsed.as_str()).collect();
        assert_eq!(elapsed, vec!["0:15", "0:30"]);
        assert_eq!(frames[1].progress_percent, 50.0);
    }
}
