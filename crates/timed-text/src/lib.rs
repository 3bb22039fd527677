//! Per-word narration timing for read-along highlighting.

/// One narrated word and its offset interval from narration start, in
/// seconds. The interval is half-open: `start` is inclusive, `end` is not.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct TimedWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

/// Ordered word-timing table for one narration clip.
///
/// Entries come from the generation side sorted by `start`. Lookups scan
/// linearly — pages are tens of words, not thousands — and the first entry
/// whose interval contains the elapsed time wins, which also settles
/// overlapping (malformed) intervals deterministically.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(transparent)]
pub struct WordTable(Vec<TimedWord>);

impl WordTable {
    pub fn new(words: Vec<TimedWord>) -> Self {
        Self(words)
    }

    /// Zero-width entries for pages whose narration carries no timings.
    /// Keeps the word list renderable; `active_index` never matches them.
    pub fn from_plain_text(text: &str) -> Self {
        Self(
            text.split_whitespace()
                .map(|word| TimedWord {
                    word: word.to_string(),
                    start: 0.0,
                    end: 0.0,
                })
                .collect(),
        )
    }

    /// Index of the word being narrated at `elapsed` seconds, or `None`
    /// in a gap or past the end of the table.
    pub fn active_index(&self, elapsed: f64) -> Option<usize> {
        self.0
            .iter()
            .position(|word| elapsed >= word.start && elapsed < word.end)
    }

    /// End of the last interval, in seconds.
    pub fn duration(&self) -> f64 {
        self.0.iter().fold(0.0, |acc, word| acc.max(word.end))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn words(&self) -> &[TimedWord] {
        &self.0
    }
}

impl From<Vec<TimedWord>> for WordTable {
    fn from(words: Vec<TimedWord>) -> Self {
        Self(words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, f64, f64)]) -> WordTable {
        WordTable::new(
            entries
                .iter()
                .map(|&(word, start, end)| TimedWord {
                    word: word.to_string(),
                    start,
                    end,
                })
                .collect(),
        )
    }

    #[test]
    fn active_index_follows_narration() {
        let table = table(&[("Once", 0.0, 0.5), ("upon", 0.5, 0.9)]);

        assert_eq!(table.active_index(0.3), Some(0));
        assert_eq!(table.active_index(0.7), Some(1));
        assert_eq!(table.active_index(1.0), None);
    }

    #[test]
    fn start_is_inclusive_end_is_exclusive() {
        let table = table(&[("a", 0.0, 0.5), ("b", 0.5, 0.9)]);

        assert_eq!(table.active_index(0.0), Some(0));
        assert_eq!(table.active_index(0.5), Some(1));
        assert_eq!(table.active_index(0.9), None);
    }

    #[test]
    fn gap_between_words_highlights_nothing() {
        let table = table(&[("a", 0.0, 0.4), ("b", 0.6, 0.9)]);
        assert_eq!(table.active_index(0.5), None);
    }

    #[test]
    fn first_match_wins_on_overlap() {
        let table = table(&[("a", 0.0, 0.6), ("b", 0.4, 0.9)]);
        assert_eq!(table.active_index(0.5), Some(0));
    }

    #[test]
    fn plain_text_entries_never_match() {
        let table = WordTable::from_plain_text("Once upon a time");

        assert_eq!(table.len(), 4);
        assert_eq!(table.active_index(0.0), None);
        assert_eq!(table.duration(), 0.0);
    }

    #[test]
    fn serializes_as_bare_array() {
        let table = table(&[("hi", 0.0, 0.2)]);
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json[0]["word"], "hi");
        assert_eq!(json[0]["start"], 0.0);
    }
}
