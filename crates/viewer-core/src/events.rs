//! Events the frontend renders from. Tagged the way the TypeScript side
//! expects them.

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(tag = "type")]
pub enum HighlightEvent {
    /// The word to highlight, or `None` to clear the highlight.
    #[serde(rename = "wordHighlight")]
    Word { index: Option<usize> },
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(tag = "type")]
pub enum NarrationEvent {
    #[serde(rename = "narrationStarted")]
    Started { duration_secs: f64 },
    /// `completed` is false when the clip was preempted or stopped.
    #[serde(rename = "narrationStopped")]
    Stopped { completed: bool },
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(tag = "type")]
pub enum HotspotEvent {
    #[serde(rename = "hotspotRevealed")]
    Revealed { word: String, x: f64, y: f64 },
    #[serde(rename = "hotspotHidden")]
    Hidden,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(tag = "type")]
pub enum ViewerErrorEvent {
    #[serde(rename = "narrationError")]
    Narration { error: String },
    #[serde(rename = "pronunciationError")]
    Pronunciation { word: String, error: String },
}
