use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;

use crate::clock::AudioClock;
use crate::error::Result;
use crate::output::AudioOutput;
use crate::registry::{Channel, ChannelRegistry, Generation, PlaybackEnd};

/// A clip the engine just started. One-shot: holds the completion receiver
/// and everything a caller needs to read elapsed time against the table of
/// word timings.
pub struct Playing {
    pub channel: Channel,
    pub generation: Generation,
    /// Clock reading at the instant the source started.
    pub started_at: Duration,
    pub duration: Duration,
    pub clock: AudioClock,
    /// Resolves when the clip completes naturally or is preempted; dropped
    /// without a value only if the whole registry is torn down.
    pub done: oneshot::Receiver<PlaybackEnd>,
}

impl Playing {
    /// Elapsed playback time, in seconds.
    pub fn elapsed(&self) -> f64 {
        self.clock
            .now()
            .saturating_sub(self.started_at)
            .as_secs_f64()
    }
}

/// Decodes payloads, starts sources, and keeps channel exclusivity via the
/// registry. One per player session; cheap to clone.
#[derive(Clone)]
pub struct PlaybackEngine {
    clock: AudioClock,
    output: Arc<dyn AudioOutput>,
    registry: Arc<ChannelRegistry>,
}

impl PlaybackEngine {
    pub fn new(output: Arc<dyn AudioOutput>) -> Self {
        Self {
            clock: AudioClock::start(),
            output,
            registry: Arc::new(ChannelRegistry::new()),
        }
    }

    pub fn clock(&self) -> AudioClock {
        self.clock
    }

    pub fn registry(&self) -> Arc<ChannelRegistry> {
        self.registry.clone()
    }

    /// Decode `payload` and play it on `channel`, preempting whatever the
    /// channel was playing.
    ///
    /// A decode failure leaves the channel's current clip untouched; an
    /// output failure leaves the channel silent but never leaves a stale
    /// registry entry behind.
    pub async fn play(&self, channel: Channel, payload: &str) -> Result<Playing> {
        let buffer = fable_pcm::decode(payload)?;
        let duration = buffer.duration();

        self.registry.acquire(channel);
        let source = self.output.start(buffer)?;

        let (done_tx, done_rx) = oneshot::channel();
        let generation = self.registry.register(channel, source, done_tx);
        let started_at = self.clock.now();

        // Natural completion: remove our own entry once the buffer has
        // played out, unless a newer clip took the channel first.
        let registry = self.registry.clone();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            registry.finish(channel, generation);
        });

        tracing::debug!(%channel, generation, ?duration, "playback_started");

        Ok(Playing {
            channel,
            generation,
            started_at,
            duration,
            clock: self.clock,
            done: done_rx,
        })
    }

    /// Silence `channel`. Always safe, even when nothing is playing.
    pub fn stop(&self, channel: Channel) {
        self.registry.acquire(channel);
    }

    pub fn stop_all(&self) {
        self.registry.stop_all();
    }

    pub fn is_active(&self, channel: Channel) -> bool {
        self.registry.is_active(channel)
    }
}
