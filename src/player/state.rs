//! Playback state snapshot and time formatting.

use serde::Serialize;

use super::identity::TrackRef;

/// The single authoritative playback state.
///
/// Only [`PlaybackSession`](super::PlaybackSession) mutates it; everyone else
/// gets clones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackState {
    /// Currently loaded track (if any)
    pub loaded: Option<TrackRef>,
    /// Whether the media primitive reports active playback
    pub is_playing: bool,
    /// Current position in seconds (>= 0)
    pub position: f64,
    /// Track length in seconds, `None` until the primitive reports a usable value
    pub duration: Option<f64>,
    /// Volume level (0.0 - 1.0)
    pub volume: f64,
    /// Last media error for the loaded track
    pub error: Option<String>,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            loaded: None,
            is_playing: false,
            position: 0.0,
            duration: None,
            volume: 1.0,
            error: None,
        }
    }
}

impl PlaybackState {
    /// Duration if it is finite and positive.
    pub fn known_duration(&self) -> Option<f64> {
        self.duration.filter(|d| d.is_finite() && *d > 0.0)
    }

    /// Position as a fraction (0.0 - 1.0); 0 when the duration is unknown.
    pub fn progress_fraction(&self) -> f64 {
        match self.known_duration() {
            Some(d) if self.position.is_finite() => (self.position / d).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    /// Progress for a 0-100 seek bar.
    pub fn progress_percent(&self) -> f64 {
        self.progress_fraction() * 100.0
    }

    /// Format position as M:SS.
    pub fn position_str(&self) -> String {
        format_time(self.position)
    }

    /// Format duration as M:SS ("0:00" when unknown).
    pub fn duration_str(&self) -> String {
        format_time(self.duration.unwrap_or(0.0))
    }
}

/// Format seconds as `M:SS`.
///
/// Non-finite or non-positive input gives `"0:00"`. Minutes are not padded
/// and keep counting past an hour.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
