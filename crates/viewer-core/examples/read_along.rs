//! Plays a tiny synthetic story page through the real audio device.
//!
//! Narration is a generated tone sweep with word timings attached, so the
//! highlight events scroll in sync with what you hear. Tapping is simulated
//! on a timer: a word tap halfway through, then a hotspot tap.
//!
//!     cargo run --example read_along

use std::sync::Arc;
use std::time::Duration;

use fable_pcm::{SAMPLE_RATE, SampleBuffer};
use fable_playback::{PlaybackEngine, RodioOutput};
use fable_story::{ImageHotspot, PageData};
use fable_timed_text::{TimedWord, WordTable};
use viewer_core::{
    BoxFuture, HighlightEvent, HotspotEvent, NarrationEvent, PronounceError, Pronouncer,
    ViewerController, ViewerErrorEvent, ViewerRuntime,
};

struct CliRuntime {
    words: Vec<String>,
}

impl ViewerRuntime for CliRuntime {
    fn emit_highlight(&self, event: HighlightEvent) {
        let HighlightEvent::Word { index } = event;
        match index {
            Some(i) => eprintln!("[highlight] {}", self.words[i]),
            None => eprintln!("[highlight] (clear)"),
        }
    }

    fn emit_narration(&self, event: NarrationEvent) {
        match event {
            NarrationEvent::Started { duration_secs } => {
                eprintln!("[narration] started ({duration_secs:.1}s)");
            }
            NarrationEvent::Stopped { completed } => {
                eprintln!("[narration] stopped completed={completed}");
            }
        }
    }

    fn emit_hotspot(&self, event: HotspotEvent) {
        match event {
            HotspotEvent::Revealed { word, x, y } => {
                eprintln!("[hotspot] \"{word}\" at ({x:.0}%, {y:.0}%)");
            }
            HotspotEvent::Hidden => eprintln!("[hotspot] hidden"),
        }
    }

    fn emit_error(&self, event: ViewerErrorEvent) {
        eprintln!("[error] {event:?}");
    }
}

/// Pronounces every word as a short tone whose pitch tracks the word length.
struct TonePronouncer;

impl Pronouncer for TonePronouncer {
    fn pronounce<'a>(
        &'a self,
        word: &'a str,
        _voice: &'a str,
    ) -> BoxFuture<'a, Result<String, PronounceError>> {
        let pitch = 300.0 + word.len() as f32 * 60.0;
        Box::pin(async move { Ok(fable_pcm::encode(&tone(pitch, 0.4))) })
    }
}

fn tone(pitch: f32, secs: f32) -> SampleBuffer {
    let frames = (secs * SAMPLE_RATE as f32) as usize;
    let samples = (0..frames)
        .map(|n| {
            let t = n as f32 / SAMPLE_RATE as f32;
            let fade = 1.0 - t / secs;
            (t * pitch * std::f32::consts::TAU).sin() * 0.3 * fade
        })
        .collect();
    SampleBuffer {
        samples,
        sample_rate: SAMPLE_RATE,
        channels: fable_pcm::CHANNELS,
    }
}

/// One tone per word, pitch rising across the sentence.
fn narration(words: &[&str], per_word: f64) -> (String, WordTable) {
    let mut samples = Vec::new();
    let mut table = Vec::new();

    for (i, word) in words.iter().enumerate() {
        let start = i as f64 * per_word;
        table.push(TimedWord {
            word: word.to_string(),
            start,
            end: start + per_word,
        });
        samples.extend(tone(220.0 + i as f32 * 80.0, per_word as f32).samples);
    }

    let buffer = SampleBuffer {
        samples,
        sample_rate: SAMPLE_RATE,
        channels: fable_pcm::CHANNELS,
    };
    (fable_pcm::encode(&buffer), WordTable::new(table))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let words = ["Once", "upon", "a", "time", "a", "fox", "sang"];
    let (audio, timed_text) = narration(&words, 0.4);

    let page = PageData {
        text: words.join(" "),
        audio,
        timed_text: Some(timed_text),
        image_hotspots: vec![ImageHotspot {
            word: "fox".into(),
            x: 42.0,
            y: 61.0,
        }],
        ..Default::default()
    };

    let runtime = Arc::new(CliRuntime {
        words: words.iter().map(|w| w.to_string()).collect(),
    });
    let engine = PlaybackEngine::new(Arc::new(RodioOutput::new()));
    let mut controller = ViewerController::new(engine, runtime, Arc::new(TonePronouncer));

    controller.change_page(&page);

    eprintln!("Narrating \"{}\"...", page.text);
    controller.toggle_narration(&page).await;

    tokio::time::sleep(Duration::from_millis(1500)).await;
    eprintln!("Tapping the word \"fox\" (preempts narration)...");
    controller.tap_word("fox", None);

    tokio::time::sleep(Duration::from_millis(800)).await;
    eprintln!("Tapping the hotspot...");
    controller
        .tap_hotspot(&page.image_hotspots[0], None)
        .await;

    // Let the hotspot label auto-hide before exiting.
    tokio::time::sleep(Duration::from_millis(3000)).await;
    controller.exit();
}
