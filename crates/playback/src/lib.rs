//! Channel-exclusive audio playback with a shared clock.
//!
//! One [`PlaybackEngine`] per player session. Every clip plays on a logical
//! [`Channel`]; starting a clip on a busy channel silences the previous one
//! first ([`ChannelRegistry`] owns that invariant). [`WordSync`] is the
//! cooperative tick task that turns the engine's clock into a word-highlight
//! index while narration is live.

mod clock;
mod engine;
mod error;
mod output;
mod registry;
mod sync;

pub use clock::AudioClock;
pub use engine::{PlaybackEngine, Playing};
pub use error::*;
pub use output::{AudioOutput, NullOutput, RodioOutput, SourceHandle};
pub use registry::{Channel, ChannelRegistry, Generation, PlaybackEnd};
pub use sync::WordSync;
