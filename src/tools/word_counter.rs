//! Text statistics: words, characters, sentences, paragraphs, reading time

use regex::Regex;

use crate::state::{ComputationResult, Derived, FieldSpec, Record, Rules};

use super::format;

pub const STORAGE_KEY: &str = "word_counter_data";

/// Average adult silent reading speed
pub const DEFAULT_READING_SPEED: u32 = 200;

pub fn specs() -> Vec<FieldSpec> {
    vec![FieldSpec::multiline("text", "Text")]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStats {
    pub words: usize,
    pub characters: usize,
    pub characters_no_spaces: usize,
    pub sentences: usize,
    pub paragraphs: usize,
    /// Whole minutes, rounded up
    pub reading_minutes: usize,
}

#[derive(Debug, Clone)]
pub struct WordCounter {
    words_per_minute: u32,
    sentence_break: Regex,
    paragraph_break: Regex,
}

impl WordCounter {
    pub fn new(words_per_minute: u32) -> Result<Self, regex::Error> {
        Ok(Self {
            words_per_minute: words_per_minute.max(1),
            sentence_break: Regex::new(r"[.!?]+")?,
            paragraph_break: Regex::new(r"\n\s*\n")?,
        })
    }

    pub fn stats(&self, text: &str) -> TextStats {
        let words = text.split_whitespace().count();
        let paragraphs = self
            .paragraph_break
            .split(text)
            .filter(|p| !p.trim().is_empty())
            .count();
        TextStats {
            words,
            characters: text.chars().count(),
            characters_no_spaces: text.chars().filter(|c| !c.is_whitespace()).count(),
            sentences: self
                .sentence_break
                .split(text)
                .filter(|s| !s.trim().is_empty())
                .count(),
            paragraphs: if paragraphs == 0 && !text.trim().is_empty() {
                1
            } else {
                paragraphs
            },
            reading_minutes: words.div_ceil(self.words_per_minute as usize),
        }
    }
}

impl Rules for WordCounter {
    fn compute(&self, record: &Record) -> ComputationResult {
        let stats = self.stats(record.text("text"));
        Ok(Derived::new()
            .headline("Words", format::count(stats.words))
            .entry("Characters", format::count(stats.characters))
            .entry("Characters (no spaces)", format::count(stats.characters_no_spaces))
            .entry("Sentences", format::count(stats.sentences))
            .entry("Paragraphs", format::count(stats.paragraphs))
            .entry(
                "Reading Time",
                format::plural(stats.reading_minutes as u64, "minute", "minutes"),
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{FieldValue, FormState, Outcome};
    use pretty_assertions::assert_eq;

    fn counter() -> WordCounter {
        WordCounter::new(DEFAULT_READING_SPEED).unwrap()
    }

    #[test]
    fn test_empty_text_counts_nothing() {
        assert_eq!(counter().stats(""), TextStats::default());
        assert_eq!(counter().stats("  \n\n "), TextStats {
            characters: 5,
            ..TextStats::default()
        });
    }

    #[test]
    fn test_sentences_and_paragraphs() {
        let text = "Hello there. How are you?!\n\nFine... thanks\n  \nBye";
        let stats = counter().stats(text);
        assert_eq!(stats.words, 8);
        assert_eq!(stats.sentences, 4);
        assert_eq!(stats.paragraphs, 3);
        assert_eq!(stats.reading_minutes, 1);
    }

    #[test]
    fn test_single_line_is_one_paragraph() {
        let stats = counter().stats("just one line");
        assert_eq!(stats.paragraphs, 1);
        assert_eq!(stats.sentences, 1);
        assert_eq!(stats.characters, 13);
        assert_eq!(stats.characters_no_spaces, 11);
    }

    #[test]
    fn test_reading_time_rounds_up() {
        let text = "word ".repeat(201);
        assert_eq!(counter().stats(&text).reading_minutes, 2);
        let slow = WordCounter::new(100).unwrap();
        assert_eq!(slow.stats(&"word ".repeat(100)).reading_minutes, 1);
    }

    #[test]
    fn test_zero_speed_does_not_divide_by_zero() {
        let counter = WordCounter::new(0).unwrap();
        assert_eq!(counter.stats("a b c").reading_minutes, 3);
    }

    #[test]
    fn test_characters_count_unicode_scalars() {
        assert_eq!(counter().stats("₹100 café").characters, 9);
    }

    #[test]
    fn test_blank_form_is_ready_with_zeros() {
        let form = FormState::new(specs(), counter());
        let Outcome::Ready(derived) = form.evaluate() else {
            panic!("word counter should always be ready");
        };
        assert_eq!(derived.get("Words"), Some("0"));
        assert_eq!(derived.get("Reading Time"), Some("0 minutes"));
    }

    #[test]
    fn test_compute_formats_counts() {
        let mut record = Record::from_specs(&specs());
        record.set("text", FieldValue::Text("word ".repeat(1500)));
        let derived = counter().compute(&record).unwrap();
        assert_eq!(derived.get("Words"), Some("1,500"));
        assert_eq!(derived.get("Reading Time"), Some("8 minutes"));
    }
}
