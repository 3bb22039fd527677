//! Viewer orchestration for the read-along story player.
//!
//! Thin by design: the heavy lifting lives in `fable-playback`. This crate
//! turns user intents (toggle narration, tap a word, tap or drag a hotspot,
//! change page) into playback calls and [`ViewerRuntime`] events the
//! frontend renders from.

mod controller;
mod error;
mod events;
mod pronounce;
mod runtime;

pub use controller::{ContainerRect, DropPoint, ViewerController, HOTSPOT_HIDE_DELAY};
pub use error::*;
pub use events::{HighlightEvent, HotspotEvent, NarrationEvent, ViewerErrorEvent};
pub use pronounce::{BoxFuture, PronounceError, Pronouncer};
pub use runtime::ViewerRuntime;
