//! Track catalog: the playlist, per-track metadata and card sections.
//!
//! Everything here is loaded once at startup and read-only afterwards.
//!
//! # Files
//!
//! ```text
//! songsData.json   { "<section>": { "title": .., "items": [ { "track": .., "img": .. } ] } }
//! songs.json       { "<bare filename>": { "title": .., "artists": [..], "image": .. } }
//! ```

mod assets;
mod loader;

pub use assets::{AssetUrls, PlaylistRow, playlist_rows};
pub use loader::{load_catalog, parse_metadata, parse_sections, playlist_from_sections};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::player::identity::{self, CanonicalKey, TrackRef};

/// Display metadata for one track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackMeta {
    pub title: String,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(rename = "image", default)]
    pub image_file: String,
}

/// One card in a section grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardItem {
    pub track: Option<TrackRef>,
    pub img: Option<String>,
    pub title: Option<String>,
    pub text: Option<String>,
    /// Secondary caption
    pub text1: Option<String>,
}

impl CardItem {
    /// Card caption: `title`, else `text`, else empty.
    pub fn label(&self) -> &str {
        self.title
            .as_deref()
            .or(self.text.as_deref())
            .unwrap_or_default()
    }
}

/// A titled grid of cards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Section {
    pub title: String,
    pub items: Vec<CardItem>,
}

/// Ordered, duplicate-free list of tracks. Index = navigation position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Playlist {
    tracks: Vec<TrackRef>,
}

impl Playlist {
    /// Build a playlist, rejecting two entries with the same canonical key.
    pub fn new(tracks: Vec<TrackRef>) -> Result<Self, CatalogError> {
        let mut seen: HashMap<CanonicalKey, usize> = HashMap::with_capacity(tracks.len());
        for (i, track) in tracks.iter().enumerate() {
            if let Some(first) = seen.insert(track.key(), i) {
                return Err(CatalogError::DuplicateTrack {
                    first: tracks[first].to_string(),
                    second: track.to_string(),
                });
            }
        }
        Ok(Self { tracks })
    }

    /// Build a playlist from raw references, keeping the first of any
    /// equivalent entries.
    pub fn dedup(tracks: impl IntoIterator<Item = TrackRef>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let mut kept = Vec::new();
        for track in tracks {
            if seen.insert(track.key()) {
                kept.push(track);
            } else {
                tracing::debug!(track = %track, "Skipping duplicate playlist entry");
            }
        }
        Self { tracks: kept }
    }

    pub fn tracks(&self) -> &[TrackRef] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TrackRef> {
        self.tracks.get(index)
    }

    pub fn first(&self) -> Option<&TrackRef> {
        self.tracks.first()
    }

    /// Position of `track`, tolerant of encoding differences.
    pub fn locate(&self, track: &str) -> Option<usize> {
        identity::locate(&self.tracks, track)
    }
}

/// Metadata keyed by bare filename.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataIndex {
    entries: HashMap<String, TrackMeta>,
}

impl MetadataIndex {
    pub fn new(entries: HashMap<String, TrackMeta>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Metadata for a track reference.
    ///
    /// Looks up the bare filename as stored, then its percent-decoded form.
    pub fn lookup(&self, track: &str) -> Option<&TrackMeta> {
        let filename = identity::bare_filename(track);
        self.entries.get(filename).or_else(|| {
            let decoded = identity::percent_decode(filename);
            self.entries.get(&*decoded)
        })
    }
}

/// Everything loaded from the catalog files.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub playlist: Playlist,
    pub metadata: MetadataIndex,
    /// Card sections in document order
    pub sections: Vec<(String, Section)>,
}

/// Catalog loading errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse {what}: {source}")]
    Parse {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Duplicate playlist entry: {second} is the same track as {first}")]
    DuplicateTrack { first: String, second: String },
}
