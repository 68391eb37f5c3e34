//! Track identity: one place that decides whether two references name the same track.
//!
//! Track references arrive in several spellings. The catalog may store
//! `Song%20A.mp3` while a card stores `Song A.mp3`, and the media primitive
//! reports a resolved URL with a path in front. Every comparison in the crate goes
//! through [`canonicalize`] / [`equivalent`] so these spellings agree.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// A catalog-issued track reference (possibly percent-encoded, possibly with a
/// directory prefix). Never rewritten after the catalog hands it out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackRef(String);

impl TrackRef {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical comparison key for this reference.
    pub fn key(&self) -> CanonicalKey {
        canonicalize(&self.0)
    }
}

impl AsRef<str> for TrackRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TrackRef {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for TrackRef {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TrackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decoded, extension-stripped form of a [`TrackRef`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Percent-decode `raw`, keeping it verbatim when the escapes don't form valid UTF-8.
pub fn percent_decode(raw: &str) -> Cow<'_, str> {
    urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}

/// Strip a trailing `.ext` when the final dot has at least one character after it.
fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) if dot + 1 < name.len() => &name[..dot],
        _ => name,
    }
}

/// Derive the canonical key of a raw track reference. Total: never fails.
///
/// Only the final path segment counts, so a resolved URL such as
/// `http://host/assets/songs/Song%20A.mp3` keys the same as `Song A.mp3`.
pub fn canonicalize(raw: &str) -> CanonicalKey {
    let decoded = percent_decode(bare_filename(raw));
    CanonicalKey(strip_extension(&decoded).to_string())
}

/// Whether two references name the same track despite encoding differences.
pub fn equivalent(a: &str, b: &str) -> bool {
    a == b || canonicalize(a) == canonicalize(b)
}

/// Find `track` in `playlist`.
///
/// Exact string match first; on a miss, falls back to canonical equivalence
/// and returns the first entry that matches.
pub fn locate(playlist: &[TrackRef], track: &str) -> Option<usize> {
    if let Some(idx) = playlist.iter().position(|t| t.as_str() == track) {
        return Some(idx);
    }
    let wanted = canonicalize(track);
    playlist.iter().position(|t| t.key() == wanted)
}

/// Final path component of a reference, as stored (no decoding).
pub fn bare_filename(raw: &str) -> &str {
    raw.rsplit('/').next().unwrap_or(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(names: &[&str]) -> Vec<TrackRef> {
        names.iter().map(|n| TrackRef::from(*n)).collect()
    }

    #[test]
    fn test_canonicalize_decodes_and_strips_extension() {
        assert_eq!(canonicalize("Song%20A.mp3").as_str(), "Song A");
        assert_eq!(canonicalize("Song A.mp3").as_str(), "Song A");
        assert_eq!(canonicalize("Song A").as_str(), "Song A");
    }

    #[test]
    fn test_canonicalize_ignores_path_prefix() {
        assert_eq!(canonicalize("songs/Song%20A.mp3").as_str(), "Song A");
        assert_eq!(canonicalize("./assets/songs/Song%20A.mp3").as_str(), "Song A");
        assert_eq!(canonicalize("http://host/assets/songs/Song%20A.mp3").as_str(), "Song A");
        // The dot belongs to the directory, not the file.
        assert_eq!(canonicalize("v1.2/readme").as_str(), "readme");
    }

    #[test]
    fn test_canonicalize_tolerates_bad_escapes() {
        assert_eq!(canonicalize("100%.mp3").as_str(), "100%");
        assert_eq!(canonicalize("bad%FF.mp3").as_str(), "bad%FF");
    }

    #[test]
    fn test_canonicalize_only_strips_last_extension() {
        assert_eq!(canonicalize("mix.v2.mp3").as_str(), "mix.v2");
        assert_eq!(canonicalize("trailing.").as_str(), "trailing.");
    }

    #[test]
    fn test_canonicalize_is_idempotent_on_bare_keys() {
        let once = canonicalize("Song%20A.mp3");
        assert_eq!(canonicalize(once.as_str()), once);
    }

    #[test]
    fn test_equivalent_ignores_encoding() {
        assert!(equivalent("Song%20A.mp3", "Song A.mp3"));
        assert!(equivalent("Song A.mp3", "Song A.ogg"));
        assert!(!equivalent("Song A.mp3", "Song B.mp3"));
    }

    #[test]
    fn test_equivalent_resolved_url_and_bare_entry() {
        assert!(equivalent("./assets/songs/Song%20A.mp3", "Song A.mp3"));
        assert!(equivalent("http://host/assets/songs/Song%20A.mp3", "/Song A.mp3"));
        assert!(!equivalent("http://host/assets/songs/Song%20B.mp3", "Song A.mp3"));
    }

    #[test]
    fn test_locate_prefers_exact_match() {
        // Both entries are equivalent to the target; exact wins even though it is second.
        let playlist = refs(&["Song A.mp3", "Song%20A.mp3"]);
        assert_eq!(locate(&playlist, "Song%20A.mp3"), Some(1));
    }

    #[test]
    fn test_locate_falls_back_to_equivalence() {
        let playlist = refs(&["Intro.mp3", "Song%20A.mp3", "Outro.mp3"]);
        assert_eq!(locate(&playlist, "Song A.mp3"), Some(1));
        assert_eq!(locate(&playlist, "Missing.mp3"), None);
    }

    #[test]
    fn test_locate_resolved_url() {
        let playlist = refs(&["Intro.mp3", "Song A.mp3"]);
        assert_eq!(locate(&playlist, "http://host/assets/songs/Song%20A.mp3"), Some(1));
    }

    #[test]
    fn test_bare_filename() {
        assert_eq!(bare_filename("./assets/songs/Song%20A.mp3"), "Song%20A.mp3");
        assert_eq!(bare_filename("Song A.mp3"), "Song A.mp3");
    }
}
