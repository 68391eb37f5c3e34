//! Playback session controller for a single media primitive.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    PlaybackController                           │
//! │   select / next / previous, auto-advance on end of track        │
//! └────────────────────────────┬────────────────────────────────────┘
//!                              │ owns
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     PlaybackSession                             │
//! │   sole owner of PlaybackState, drops stale media events         │
//! └────────────────────────────┬────────────────────────────────────┘
//!                              │ MediaElement / MediaEvent channel
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Media primitive                            │
//! │          HTML audio element, or SimulatedMedia                  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every state change is published as a notification. The controller renders
//! each one through the [`ViewProjector`], which recomputes every play/pause
//! affordance from the snapshot.

mod controller;
pub mod identity;
mod media;
pub mod navigator;
mod projector;
mod session;
mod state;

pub use controller::PlaybackController;
pub use identity::{CanonicalKey, TrackRef};
pub use media::{MediaElement, MediaEvent, SimulatedMedia};
pub use projector::{
    FooterView, IconVariant, ObserverId, ObserverKind, RenderFrame, ViewProjector,
    is_active_playing, project, variant_for,
};
pub use session::{Notification, NotificationKind, PlaybackSession};
pub use state::{PlaybackState, format_time};

/// Player-related errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlayerError {
    #[error("Failed to load {track}: {reason}")]
    Load { track: String, reason: String },
}
