//! Asset URLs and playlist row descriptors.

use serde::Serialize;

use crate::config::AssetsConfig;
use crate::player::identity::{self, TrackRef};

use super::Playlist;

/// Builds song and image URLs from the configured prefixes.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetUrls {
    songs_base: String,
    images_base: String,
    placeholder_image: String,
}

impl AssetUrls {
    pub fn new(config: &AssetsConfig) -> Self {
        Self {
            songs_base: config.songs_base.clone(),
            images_base: config.images_base.clone(),
            placeholder_image: config.placeholder_image.clone(),
        }
    }

    /// URL the media primitive should fetch for `track`.
    ///
    /// Leading slashes are dropped and the reference is decoded before being
    /// encoded again, so an already-encoded entry isn't encoded twice.
    pub fn track_url(&self, track: &TrackRef) -> String {
        let relative = track.as_str().trim_start_matches('/');
        let decoded = identity::percent_decode(relative);
        format!("{}{}", self.songs_base, urlencoding::encode(&decoded))
    }

    /// URL of an image file under the images prefix.
    pub fn image_url(&self, image_file: &str) -> String {
        if image_file.is_empty() {
            return self.placeholder_url();
        }
        format!("{}{}", self.images_base, urlencoding::encode(image_file))
    }

    /// Fallback image for covers that fail to load.
    pub fn placeholder_url(&self) -> String {
        format!("{}{}", self.images_base, self.placeholder_image)
    }
}

impl Default for AssetUrls {
    fn default() -> Self {
        Self::new(&AssetsConfig::default())
    }
}

/// What a playlist row needs to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaylistRow {
    pub index: usize,
    pub track: TrackRef,
    /// Decoded filename without extension
    pub display_name: String,
    /// `<display name>.jpg` under the images prefix
    pub cover_url: String,
    pub url: String,
}

/// Row descriptors for every playlist entry, in order.
pub fn playlist_rows(playlist: &Playlist, assets: &AssetUrls) -> Vec<PlaylistRow> {
    playlist
        .tracks()
        .iter()
        .enumerate()
        .map(|(index, track)| {
            let display_name = track.key().as_str().to_string();
            PlaylistRow {
                index,
                track: track.clone(),
                cover_url: assets.image_url(&format!("{}.jpg", display_name)),
                url: assets.track_url(track),
                display_name,
            }
        })
        .collect()
}
