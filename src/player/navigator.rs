//! Next/previous targets over a linear playlist.
//!
//! No wraparound: the ends of the playlist are hard stops. A reference that
//! can't be located yields `None` as well.

use super::identity::{TrackRef, locate};

/// Entry after `current`, or `None` at the end / when `current` is unknown.
pub fn next<'a>(playlist: &'a [TrackRef], current: &str) -> Option<&'a TrackRef> {
    let index = locate(playlist, current)?;
    playlist.get(index + 1)
}

/// Entry before `current`, or `None` at the start / when `current` is unknown.
pub fn previous<'a>(playlist: &'a [TrackRef], current: &str) -> Option<&'a TrackRef> {
    let index = locate(playlist, current)?;
    index.checked_sub(1).and_then(|i| playlist.get(i))
}
