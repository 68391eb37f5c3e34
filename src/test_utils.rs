//! Test utilities and fixtures for playdeck tests.
//!
//! This module provides common test helpers and mock factories to reduce
//! boilerplate in tests.
//!
//! # Example
//!
//! ```ignore
//! use playdeck::test_utils::{controller_with, mock_track_meta};
//!
//! #[test]
//! fn test_something() {
//!     let mut controller = controller_with(&["A.mp3", "B.mp3"]);
//!     controller.load(TrackRef::from("A.mp3"));
//!     controller.pump();
//!     // ... test logic
//! }
//! ```

use std::collections::HashMap;

use crate::catalog::{AssetUrls, CardItem, Catalog, MetadataIndex, Playlist, Section, TrackMeta};
use crate::player::{PlaybackController, SimulatedMedia, TrackRef};

/// Creates a mock TrackMeta with sensible defaults.
///
/// Use struct update syntax to customize:
///
/// ```ignore
/// let meta = TrackMeta {
///     title: "Custom Title".to_string(),
///     ..mock_track_meta()
/// };
/// ```
pub fn mock_track_meta() -> TrackMeta {
    TrackMeta {
        title: "Test Song".to_string(),
        artists: vec!["Test Artist".to_string()],
        image_file: "test.jpg".to_string(),
    }
}

/// Builds a playlist from plain names. Panics on equivalent duplicates.
pub fn mock_playlist(names: &[&str]) -> Playlist {
    Playlist::new(names.iter().map(|n| TrackRef::from(*n)).collect())
        .expect("Fixture playlist has duplicates")
}

/// Creates a catalog with two sections, a duplicate entry across them and
/// metadata for every track.
///
/// Playlist: `Song A.mp3`, `Song B.mp3`, `Song C.mp3`.
pub fn mock_catalog() -> Catalog {
    let card = |track: &str, title: &str| CardItem {
        track: Some(TrackRef::from(track)),
        title: Some(title.to_string()),
        ..CardItem::default()
    };
    let sections = vec![
        (
            "trendingSongs".to_string(),
            Section {
                title: "Trending".to_string(),
                items: vec![card("Song A.mp3", "Song A"), card("Song%20B.mp3", "Song B")],
            },
        ),
        (
            "recentlyPlayed".to_string(),
            Section {
                title: "Recently played".to_string(),
                items: vec![card("Song%20A.mp3", "Song A"), card("Song C.mp3", "Song C")],
            },
        ),
    ];

    let mut entries = HashMap::new();
    for name in ["Song A", "Song B", "Song C"] {
        entries.insert(
            format!("{}.mp3", name),
            TrackMeta {
                title: name.to_string(),
                image_file: format!("{}.jpg", name),
                ..mock_track_meta()
            },
        );
    }

    Catalog {
        playlist: crate::catalog::playlist_from_sections(&sections),
        metadata: MetadataIndex::new(entries),
        sections,
    }
}

/// Creates a controller over a simulated media element for `names`, with no
/// observers registered and no metadata.
pub fn controller_with(names: &[&str]) -> PlaybackController<SimulatedMedia> {
    let (media, events) = SimulatedMedia::new();
    PlaybackController::new(
        media,
        events,
        mock_playlist(names),
        MetadataIndex::default(),
        AssetUrls::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_catalog_playlist_is_deduplicated() {
        let catalog = mock_catalog();
        let names: Vec<&str> = catalog.playlist.tracks().iter().map(|t| t.as_str()).collect();
        assert_eq!(names, vec!["Song A.mp3", "Song%20B.mp3", "Song C.mp3"]);
        assert_eq!(catalog.metadata.len(), 3);
    }

    #[test]
    fn test_controller_with_starts_idle() {
        let controller = controller_with(&["A.mp3"]);
        assert!(controller.state().loaded.is_none());
        assert_eq!(controller.playlist().len(), 1);
    }
}
