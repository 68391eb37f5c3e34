//! Playdeck - playback session controller for a browser playlist player.
//!
//! The [`player`] module holds the core: identity resolution across URL
//! encodings, a single authoritative playback state, playlist navigation and
//! projection of that state onto every play/pause affordance. [`catalog`]
//! loads the JSON track lists it plays from.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod player;
#[cfg(test)]
pub mod test_utils;
