//! Story data model.
//!
//! Mirrors the `.story.json` shape owned by the persistence/export
//! collaborators: camelCase fields, base64 payload strings carried opaquely.
//! This crate only proposes in-memory updates; it never touches disk.

use fable_timed_text::WordTable;

/// A word the learner can expand for a definition, a fun fact, and their
/// narration clips.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "camelCase")]
pub struct VocabularyData {
    pub word: String,
    pub definition: String,
    pub fun_fact: String,
    /// Base64 PCM clip narrating the definition.
    pub definition_audio: String,
    /// Base64 PCM clip narrating the fun fact.
    pub fun_fact_audio: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "camelCase")]
pub struct PageQuizData {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer_index: usize,
}

/// A tappable, draggable labeled point over the page illustration.
/// Coordinates are percentages of the image container, `0..=100`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct ImageHotspot {
    pub word: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "camelCase")]
pub struct PageData {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timed_text: Option<WordTable>,
    pub image_prompt: String,
    /// Base64 PNG; empty while the illustration is still generating.
    #[serde(default)]
    pub image: String,
    /// Base64 PCM narration for the whole page.
    #[serde(default)]
    pub audio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocabulary: Option<VocabularyData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_quiz: Option<PageQuizData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_hotspots: Vec<ImageHotspot>,
}

/// End-of-story quiz, played by the excluded mini-game screens.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "camelCase")]
pub struct QuizData {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer_index: usize,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "camelCase")]
pub struct StoryData {
    pub id: String,
    pub title: String,
    pub category: String,
    pub loves: u32,
    /// Timbre selector passed through to the generation side, opaque here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_name: Option<String>,
    pub pages: Vec<PageData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz: Option<QuizData>,
}

impl StoryData {
    /// Move one hotspot to new percent coordinates, clamping both axes to
    /// `0..=100`. Returns `false` when the page or hotspot index is out of
    /// range. A targeted write, not a whole-story copy; callers that need
    /// the immutable-update contract clone first and hand out the clone.
    pub fn move_hotspot(&mut self, page: usize, hotspot: usize, x: f64, y: f64) -> bool {
        let Some(spot) = self
            .pages
            .get_mut(page)
            .and_then(|p| p.image_hotspots.get_mut(hotspot))
        else {
            return false;
        };

        spot.x = x.clamp(0.0, 100.0);
        spot.y = y.clamp(0.0, 100.0);
        true
    }
}
