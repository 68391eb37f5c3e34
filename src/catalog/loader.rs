//! JSON catalog loading.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use crate::config::CatalogConfig;

use super::{Catalog, CatalogError, MetadataIndex, Playlist, Section, TrackMeta};

/// Parse a sectioned track list, keeping document order.
///
/// Entries that aren't section objects are skipped with a warning.
pub fn parse_sections(json: &str, what: &str) -> Result<Vec<(String, Section)>, CatalogError> {
    let root: Map<String, Value> = serde_json::from_str(json).map_err(|source| CatalogError::Parse {
        what: what.to_string(),
        source,
    })?;

    let mut sections = Vec::with_capacity(root.len());
    for (name, value) in root {
        match serde_json::from_value::<Section>(value) {
            Ok(section) => sections.push((name, section)),
            Err(e) => warn!("Skipping section {:?} in {}: {}", name, what, e),
        }
    }
    Ok(sections)
}

/// Every section's tracks in order, without equivalent duplicates.
pub fn playlist_from_sections(sections: &[(String, Section)]) -> Playlist {
    Playlist::dedup(
        sections
            .iter()
            .flat_map(|(_, section)| section.items.iter())
            .filter_map(|item| item.track.clone())
            .filter(|track| !track.as_str().trim().is_empty()),
    )
}

/// Parse the bare-filename → metadata map.
pub fn parse_metadata(json: &str, what: &str) -> Result<MetadataIndex, CatalogError> {
    let entries: HashMap<String, TrackMeta> =
        serde_json::from_str(json).map_err(|source| CatalogError::Parse {
            what: what.to_string(),
            source,
        })?;
    Ok(MetadataIndex::new(entries))
}

fn read(path: &Path) -> Result<String, CatalogError> {
    std::fs::read_to_string(path).map_err(|e| CatalogError::Read(path.to_path_buf(), e))
}

/// Load the catalog described by `config`, resolving relative paths against `root`.
///
/// The track list is required. Metadata and extra sections are optional:
/// a missing or broken file is logged and the catalog loads without it.
pub fn load_catalog(config: &CatalogConfig, root: &Path) -> Result<Catalog, CatalogError> {
    let songs_data = root.join(&config.songs_data);
    let sections = parse_sections(&read(&songs_data)?, &songs_data.display().to_string())?;
    let playlist = playlist_from_sections(&sections);

    let songs_meta = root.join(&config.songs_meta);
    let metadata = match read(&songs_meta)
        .and_then(|json| parse_metadata(&json, &songs_meta.display().to_string()))
    {
        Ok(metadata) => metadata,
        Err(e) => {
            warn!("Track metadata unavailable: {}", e);
            MetadataIndex::default()
        }
    };

    let mut all_sections = sections;
    for extra in &config.extra_sections {
        let path = root.join(extra);
        match read(&path).and_then(|json| parse_sections(&json, &path.display().to_string())) {
            Ok(more) => all_sections.extend(more),
            Err(e) => warn!("Skipping card sections: {}", e),
        }
    }

    info!(
        tracks = playlist.len(),
        metadata = metadata.len(),
        sections = all_sections.len(),
        "Catalog loaded"
    );

    Ok(Catalog {
        playlist,
        metadata,
        sections: all_sections,
    })
}
