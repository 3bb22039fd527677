use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::oneshot;

use crate::output::SourceHandle;

/// Logical playback slot. At most one clip is live per channel; the string
/// names are the wire names the frontend event surface uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Narration,
    Word,
    Vocab,
    Hotspot,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Narration,
        Channel::Word,
        Channel::Vocab,
        Channel::Hotspot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Narration => "narration",
            Channel::Word => "word",
            Channel::Vocab => "vocab",
            Channel::Hotspot => "hotspot",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a clip's life ended, delivered on the completion channel returned by
/// [`crate::PlaybackEngine::play`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEnd {
    /// Played to the end of its buffer.
    Completed,
    /// Stopped by a newer clip on the same channel, an explicit stop, or
    /// `stop_all`.
    Preempted,
}

/// Monotonic id distinguishing successive clips on the same channel, so a
/// stale natural-completion timer cannot remove its successor.
pub type Generation = u64;

struct ActiveSource {
    generation: Generation,
    source: Box<dyn SourceHandle>,
    done_tx: Option<oneshot::Sender<PlaybackEnd>>,
}

impl ActiveSource {
    fn end(mut self, end: PlaybackEnd) {
        self.source.stop();
        if let Some(tx) = self.done_tx.take() {
            let _ = tx.send(end);
        }
    }
}

/// Session-wide map from [`Channel`] to the currently live source.
///
/// All mutation happens on the single control thread; the mutex exists so
/// the word-sync task and natural-completion timers can read/finish without
/// a handle on the controller.
#[derive(Default)]
pub struct ChannelRegistry {
    inner: Mutex<HashMap<Channel, ActiveSource>>,
    next_generation: AtomicU64,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Silence and drop whatever is live on `channel`. Safe to call when
    /// nothing is playing, and when the source already finished on its own.
    pub fn acquire(&self, channel: Channel) {
        let existing = self.inner.lock().unwrap().remove(&channel);
        if let Some(active) = existing {
            tracing::debug!(%channel, generation = active.generation, "channel_preempted");
            active.end(PlaybackEnd::Preempted);
        }
    }

    /// Store a freshly started source. Any source still registered under the
    /// same channel is silenced first, keeping the one-live-source invariant
    /// even without a preceding [`Self::acquire`].
    pub fn register(
        &self,
        channel: Channel,
        source: Box<dyn SourceHandle>,
        done_tx: oneshot::Sender<PlaybackEnd>,
    ) -> Generation {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let previous = self.inner.lock().unwrap().insert(
            channel,
            ActiveSource {
                generation,
                source,
                done_tx: Some(done_tx),
            },
        );
        if let Some(active) = previous {
            active.end(PlaybackEnd::Preempted);
        }
        generation
    }

    /// Natural-completion self-removal. Only removes the entry if it is
    /// still the same clip; a newer clip on the channel is left alone.
    /// Returns whether the entry was removed.
    pub fn finish(&self, channel: Channel, generation: Generation) -> bool {
        let finished = {
            let mut inner = self.inner.lock().unwrap();
            match inner.get(&channel) {
                Some(active) if active.generation == generation => inner.remove(&channel),
                _ => None,
            }
        };

        match finished {
            Some(active) => {
                tracing::debug!(%channel, generation, "playback_completed");
                active.end(PlaybackEnd::Completed);
                true
            }
            None => false,
        }
    }

    /// Silence every channel. Used on page transitions and player exit.
    pub fn stop_all(&self) {
        let drained: Vec<_> = self.inner.lock().unwrap().drain().collect();
        for (channel, active) in drained {
            tracing::debug!(%channel, generation = active.generation, "channel_stopped");
            active.end(PlaybackEnd::Preempted);
        }
    }

    pub fn is_active(&self, channel: Channel) -> bool {
        self.inner.lock().unwrap().contains_key(&channel)
    }
}
