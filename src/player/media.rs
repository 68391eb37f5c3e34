//! The underlying media primitive and its event stream.
//!
//! A [`MediaElement`] is the thing that actually plays audio (an
//! `HtmlAudioElement` in a browser). It is driven by the session through the
//! trait methods and reports what really happened through [`MediaEvent`]s
//! sent on a crossbeam channel, in the order the primitive observed them.

use crossbeam_channel::{Receiver, Sender, unbounded};
use std::collections::HashMap;

use super::PlayerError;
use super::identity::TrackRef;

/// Operations the session needs from a media primitive.
pub trait MediaElement {
    /// Start loading `track`. Completion or failure arrives later as an event;
    /// `Err` means the primitive refused the source synchronously.
    fn load(&mut self, track: &TrackRef) -> Result<(), PlayerError>;

    /// Start or resume playback of the current source.
    fn play(&mut self);

    fn pause(&mut self);

    /// Whether the primitive is paused right now. Flips as soon as `play` or
    /// `pause` is called, before the matching event is delivered.
    fn is_paused(&self) -> bool;

    fn current_time(&self) -> f64;

    fn set_current_time(&mut self, seconds: f64);

    /// Duration in seconds; NaN while unknown.
    fn duration(&self) -> f64;

    fn set_volume(&mut self, volume: f64);
}

/// Notifications from the media primitive.
///
/// Every event names the source it belongs to so late events from a
/// superseded load can be recognised and dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Metadata is available (duration may still be NaN/Infinity for streams)
    Loaded { source: TrackRef, duration: f64 },
    /// Playback clock advanced
    TimeUpdate { source: TrackRef, position: f64 },
    Playing { source: TrackRef },
    Paused { source: TrackRef },
    /// Reached the end of the source
    Ended { source: TrackRef },
    /// Network or decode failure
    Error { source: TrackRef, message: String },
}

impl MediaEvent {
    /// The source this event originated from.
    pub fn source(&self) -> &TrackRef {
        match self {
            Self::Loaded { source, .. }
            | Self::TimeUpdate { source, .. }
            | Self::Playing { source }
            | Self::Paused { source }
            | Self::Ended { source }
            | Self::Error { source, .. } => source,
        }
    }
}

/// Deterministic in-process media primitive.
///
/// Nothing happens on its own: loads complete, time advances and tracks end
/// only when the owner says so. Used by the CLI `simulate` command and tests.
#[derive(Debug)]
pub struct SimulatedMedia {
    events: Sender<MediaEvent>,
    source: Option<TrackRef>,
    paused: bool,
    current_time: f64,
    duration: f64,
    volume: f64,
    /// Sources whose `load` is refused synchronously, with the reason
    rejected: HashMap<String, String>,
}

impl SimulatedMedia {
    /// Create the primitive and the receiving end of its event stream.
    pub fn new() -> (Self, Receiver<MediaEvent>) {
        let (events, rx) = unbounded();
        let media = Self {
            events,
            source: None,
            paused: true,
            current_time: 0.0,
            duration: f64::NAN,
            volume: 1.0,
            rejected: HashMap::new(),
        };
        (media, rx)
    }

    /// Make every future `load` of `track` fail synchronously.
    pub fn reject(&mut self, track: &str, reason: impl Into<String>) {
        self.rejected.insert(track.to_string(), reason.into());
    }

    /// Push an arbitrary event, e.g. a late completion for an old source.
    pub fn emit(&self, event: MediaEvent) {
        // The receiver lives in the session; if it is gone nobody is listening.
        let _ = self.events.send(event);
    }

    /// Finish loading the current source with the given duration.
    pub fn complete_load(&mut self, duration: f64) {
        let Some(source) = self.source.clone() else {
            return;
        };
        self.duration = duration;
        self.emit(MediaEvent::Loaded { source, duration });
    }

    /// Advance the clock while playing; ends the track when the duration is reached.
    pub fn advance(&mut self, seconds: f64) {
        let Some(source) = self.source.clone() else {
            return;
        };
        if self.paused || !seconds.is_finite() {
            return;
        }
        let mut position = self.current_time + seconds.max(0.0);
        let reached_end = self.duration.is_finite() && position >= self.duration;
        if reached_end {
            position = self.duration;
        }
        self.current_time = position;
        self.emit(MediaEvent::TimeUpdate {
            source: source.clone(),
            position,
        });
        if reached_end {
            self.paused = true;
            self.emit(MediaEvent::Ended { source });
        }
    }

    /// Jump to the end of the current source.
    pub fn finish(&mut self) {
        let Some(source) = self.source.clone() else {
            return;
        };
        if self.duration.is_finite() {
            self.current_time = self.duration;
        }
        self.paused = true;
        self.emit(MediaEvent::TimeUpdate {
            source: source.clone(),
            position: self.current_time,
        });
        self.emit(MediaEvent::Ended { source });
    }

    /// Report an asynchronous network/decode failure for the current source.
    pub fn fail(&mut self, message: impl Into<String>) {
        let Some(source) = self.source.clone() else {
            return;
        };
        self.paused = true;
        self.emit(MediaEvent::Error {
            source,
            message: message.into(),
        });
    }

    pub fn source(&self) -> Option<&TrackRef> {
        self.source.as_ref()
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }
}

impl MediaElement for SimulatedMedia {
    fn load(&mut self, track: &TrackRef) -> Result<(), PlayerError> {
        if let Some(reason) = self.rejected.get(track.as_str()) {
            return Err(PlayerError::Load {
                track: track.to_string(),
                reason: reason.clone(),
            });
        }
        self.source = Some(track.clone());
        self.paused = true;
        self.current_time = 0.0;
        self.duration = f64::NAN;
        Ok(())
    }

    fn play(&mut self) {
        let Some(source) = self.source.clone() else {
            return;
        };
        if !self.paused {
            return;
        }
        self.paused = false;
        self.emit(MediaEvent::Playing { source });
    }

    fn pause(&mut self) {
        let Some(source) = self.source.clone() else {
            return;
        };
        if self.paused {
            return;
        }
        self.paused = true;
        self.emit(MediaEvent::Paused { source });
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        let Some(source) = self.source.clone() else {
            return;
        };
        let mut position = seconds.max(0.0);
        if self.duration.is_finite() {
            position = position.min(self.duration);
        }
        self.current_time = position;
        self.emit(MediaEvent::TimeUpdate { source, position });
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }
}
