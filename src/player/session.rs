//! Playback session: the only owner and mutator of [`PlaybackState`].
//!
//! The session wraps one media primitive. Transport calls go to the
//! primitive; the state follows what the primitive reports back through its
//! event stream, so the state never claims "playing" unless the primitive
//! said so. Every applied change is published as a [`Notification`] carrying
//! a full snapshot taken after the mutation.
//!
//! The session knows nothing about playlists. End of track is reported as
//! [`NotificationKind::Ended`] and the owner decides what comes next.

use crossbeam_channel::{Receiver, Sender};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::identity::{self, TrackRef};
use super::media::{MediaElement, MediaEvent};
use super::state::PlaybackState;

/// What changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NotificationKind {
    /// A new source was assigned
    SourceChanged,
    /// The primitive reported metadata for the loaded source
    Loaded,
    /// Playback clock advanced
    Tick,
    Played,
    Paused,
    Ended,
    Seeked,
    VolumeChanged,
    /// Load or decode failure for the loaded source
    Failed(String),
}

/// A state-change notification with the state it produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub state: PlaybackState,
}

/// Single-track playback session over a media primitive.
pub struct PlaybackSession<M: MediaElement> {
    media: M,
    events: Receiver<MediaEvent>,
    notifications: Sender<Notification>,
    state: PlaybackState,
}

impl<M: MediaElement> PlaybackSession<M> {
    /// Create a session over `media`, consuming its event stream and
    /// publishing to `notifications`.
    pub fn new(
        media: M,
        events: Receiver<MediaEvent>,
        notifications: Sender<Notification>,
    ) -> Self {
        Self {
            media,
            events,
            notifications,
            state: PlaybackState::default(),
        }
    }

    /// Current state (read-only).
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Owned copy of the current state.
    pub fn snapshot(&self) -> PlaybackState {
        self.state.clone()
    }

    pub fn loaded(&self) -> Option<&TrackRef> {
        self.state.loaded.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    /// Load `track` and start playing it.
    ///
    /// Supersedes any load still in flight: events from the previous source
    /// are dropped from here on. A refused load leaves `track` loaded with an
    /// error marker instead of propagating.
    pub fn load(&mut self, track: TrackRef) {
        if track.as_str().trim().is_empty() {
            debug!("Ignoring load of empty track reference");
            return;
        }

        info!(track = %track, "Loading track");
        // Stop the old source first so a refused load can't leave it audible.
        self.media.pause();

        self.state.loaded = Some(track.clone());
        self.state.is_playing = false;
        self.state.position = 0.0;
        self.state.duration = None;
        self.state.error = None;

        if let Err(e) = self.media.load(&track) {
            warn!(track = %track, error = %e, "Media primitive refused source");
            let message = e.to_string();
            self.state.error = Some(message.clone());
            self.notify(NotificationKind::Failed(message));
            return;
        }

        self.notify(NotificationKind::SourceChanged);
        self.media.play();
    }

    /// Play / resume the loaded track. No-op when nothing is loaded.
    pub fn play(&mut self) {
        if self.state.loaded.is_none() {
            debug!("play() with no track loaded");
            return;
        }
        self.media.play();
    }

    /// Pause the loaded track. No-op when nothing is loaded.
    pub fn pause(&mut self) {
        if self.state.loaded.is_none() {
            debug!("pause() with no track loaded");
            return;
        }
        self.media.pause();
    }

    /// Toggle play/pause. No-op when nothing is loaded.
    ///
    /// Decides on the primitive's paused flag, which flips synchronously;
    /// `is_playing` lags until the next event is applied.
    pub fn toggle(&mut self) {
        if self.state.loaded.is_none() {
            debug!("toggle() with no track loaded");
            return;
        }
        if self.media.is_paused() {
            self.media.play();
        } else {
            self.media.pause();
        }
    }

    /// Seek to a fraction (0.0 - 1.0) of the track.
    ///
    /// Out-of-range fractions are clamped; does nothing while the duration is
    /// unknown.
    pub fn seek_to_fraction(&mut self, fraction: f64) {
        if !fraction.is_finite() {
            warn!(fraction, "Ignoring non-finite seek fraction");
            return;
        }
        let clamped = fraction.clamp(0.0, 1.0);
        if clamped != fraction {
            debug!(fraction, clamped, "Clamped seek fraction");
        }
        let Some(duration) = self.state.known_duration() else {
            debug!("Seek ignored: duration unknown");
            return;
        };

        let target = clamped * duration;
        self.media.set_current_time(target);
        self.state.position = target;
        self.notify(NotificationKind::Seeked);
    }

    /// Set volume (0.0 - 1.0), clamping out-of-range input.
    pub fn set_volume(&mut self, volume: f64) {
        if !volume.is_finite() {
            warn!(volume, "Ignoring non-finite volume");
            return;
        }
        let clamped = volume.clamp(0.0, 1.0);
        if clamped != volume {
            debug!(volume, clamped, "Clamped volume");
        }
        self.media.set_volume(clamped);
        self.state.volume = clamped;
        self.notify(NotificationKind::VolumeChanged);
    }

    /// Position as a fraction of the duration; 0 when the duration is unusable.
    pub fn current_progress_fraction(&self) -> f64 {
        self.state.progress_fraction()
    }

    /// Apply the next pending media event, if any. Returns `false` when the
    /// event queue is empty.
    pub fn poll(&mut self) -> bool {
        match self.events.try_recv() {
            Ok(event) => {
                self.apply(event);
                true
            }
            Err(_) => false,
        }
    }

    /// Apply every pending media event in arrival order.
    pub fn drain_events(&mut self) -> usize {
        let mut applied = 0;
        while self.poll() {
            applied += 1;
        }
        applied
    }

    fn apply(&mut self, event: MediaEvent) {
        let is_current = self
            .state
            .loaded
            .as_ref()
            .is_some_and(|t| identity::equivalent(t.as_str(), event.source().as_str()));
        if !is_current {
            debug!(source = %event.source(), "Dropping event from superseded source");
            return;
        }

        match event {
            MediaEvent::Loaded { duration, .. } => {
                self.state.duration = (duration.is_finite() && duration > 0.0).then_some(duration);
                self.notify(NotificationKind::Loaded);
            }
            MediaEvent::TimeUpdate { position, .. } => {
                self.state.position = if position.is_finite() { position.max(0.0) } else { 0.0 };
                let reported = self.media.duration();
                if reported.is_finite() && reported > 0.0 {
                    self.state.duration = Some(reported);
                }
                self.notify(NotificationKind::Tick);
            }
            MediaEvent::Playing { .. } => {
                self.state.is_playing = true;
                self.state.error = None;
                self.notify(NotificationKind::Played);
            }
            MediaEvent::Paused { .. } => {
                self.state.is_playing = false;
                self.notify(NotificationKind::Paused);
            }
            MediaEvent::Ended { .. } => {
                self.state.is_playing = false;
                if let Some(d) = self.state.known_duration() {
                    self.state.position = d;
                }
                self.notify(NotificationKind::Ended);
            }
            MediaEvent::Error { source, message } => {
                warn!(track = %source, error = %message, "Media error");
                self.state.is_playing = false;
                self.state.error = Some(message.clone());
                self.notify(NotificationKind::Failed(message));
            }
        }
    }

    fn notify(&self, kind: NotificationKind) {
        let notification = Notification {
            kind,
            state: self.state.clone(),
        };
        if self.notifications.send(notification).is_err() {
            debug!("No notification listener");
        }
    }
}
