use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use fable_pcm::SampleBuffer;

use crate::error::{Error, Result};

/// A started, one-shot source. Exclusively owned by the registry entry it
/// was registered under.
pub trait SourceHandle: Send {
    /// Silence the source. Calling this after the source already ran out
    /// (or was stopped) is a no-op, never an error.
    fn stop(&mut self);
}

/// Seam between the engine and the audio device, so tests and headless
/// hosts run without one.
pub trait AudioOutput: Send + Sync {
    fn start(&self, buffer: SampleBuffer) -> Result<Box<dyn SourceHandle>>;
}

// ── Rodio-backed output ──────────────────────────────────────────────────────

enum Command {
    Start {
        buffer: SampleBuffer,
        reply: mpsc::Sender<std::result::Result<rodio::Sink, String>>,
    },
}

/// Real output device. A dedicated thread owns the `rodio::OutputStream`
/// (cpal streams are not `Send`); the device is opened lazily on the first
/// clip, which is also the session's first user gesture.
pub struct RodioOutput {
    tx: mpsc::Sender<Command>,
}

impl RodioOutput {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || device_loop(rx));
        Self { tx }
    }
}

impl Default for RodioOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioOutput for RodioOutput {
    fn start(&self, buffer: SampleBuffer) -> Result<Box<dyn SourceHandle>> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(Command::Start {
                buffer,
                reply: reply_tx,
            })
            .map_err(|_| Error::Output("audio thread exited".into()))?;

        let sink = reply_rx
            .recv()
            .map_err(|_| Error::Output("audio thread exited".into()))?
            .map_err(Error::Output)?;

        Ok(Box::new(RodioHandle { sink }))
    }
}

fn device_loop(rx: mpsc::Receiver<Command>) {
    let mut stream: Option<rodio::OutputStream> = None;

    while let Ok(command) = rx.recv() {
        match command {
            Command::Start { buffer, reply } => {
                let _ = reply.send(start_sink(&mut stream, buffer));
            }
        }
    }
}

fn start_sink(
    stream: &mut Option<rodio::OutputStream>,
    buffer: SampleBuffer,
) -> std::result::Result<rodio::Sink, String> {
    let stream = match stream {
        Some(stream) => stream,
        None => {
            tracing::info!("audio_device_opening");
            let opened = rodio::OutputStreamBuilder::open_default_stream()
                .map_err(|e| e.to_string())?;
            stream.insert(opened)
        }
    };

    let sink = rodio::Sink::connect_new(stream.mixer());
    sink.append(rodio::buffer::SamplesBuffer::new(
        buffer.channels,
        buffer.sample_rate,
        buffer.samples,
    ));
    Ok(sink)
}

struct RodioHandle {
    sink: rodio::Sink,
}

impl SourceHandle for RodioHandle {
    fn stop(&mut self) {
        self.sink.stop();
    }
}

// ── Headless output ──────────────────────────────────────────────────────────

#[derive(Debug)]
struct StartedClip {
    buffer: SampleBuffer,
    stops: u32,
}

/// Output that starts clips into thin air. For tests and hosts without an
/// audio device; records what was started and how often each handle was
/// stopped.
#[derive(Debug, Clone, Default)]
pub struct NullOutput {
    started: Arc<Mutex<Vec<StartedClip>>>,
}

impl NullOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of clips started so far, in start order.
    pub fn started(&self) -> usize {
        self.started.lock().unwrap().len()
    }

    /// How many times `stop` was invoked on the `index`-th started clip.
    pub fn stop_count(&self, index: usize) -> u32 {
        self.started.lock().unwrap()[index].stops
    }

    pub fn started_buffer(&self, index: usize) -> SampleBuffer {
        self.started.lock().unwrap()[index].buffer.clone()
    }
}

impl AudioOutput for NullOutput {
    fn start(&self, buffer: SampleBuffer) -> Result<Box<dyn SourceHandle>> {
        let index = {
            let mut started = self.started.lock().unwrap();
            started.push(StartedClip { buffer, stops: 0 });
            started.len() - 1
        };
        Ok(Box::new(NullHandle {
            index,
            started: self.started.clone(),
        }))
    }
}

struct NullHandle {
    index: usize,
    started: Arc<Mutex<Vec<StartedClip>>>,
}

impl SourceHandle for NullHandle {
    fn stop(&mut self) {
        self.started.lock().unwrap()[self.index].stops += 1;
    }
}
