//! Dictionary index for word validation and prefix pruning
//!
//! Holds every playable word twice: a hash set for O(1) membership and a
//! sorted vector so the word search can ask "does anything start with this?"
//! with a binary search.
//!
//! A small common-English word list is embedded at build time and used when
//! no word list file is supplied.

use derive_more::{Display, Error, From};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::MIN_WORD_LENGTH;

/// Embedded wordlist, lowercase, one word per line
static WORDS_DATA: &str = include_str!("../../data/words.txt");

/// Pre-built index over the embedded wordlist
static EMBEDDED: Lazy<Arc<Dictionary>> = Lazy::new(|| {
    Arc::new(Dictionary::from_words(WORDS_DATA.lines()))
});

/// Errors raised while loading a word list.
#[derive(Debug, Display, Error, From)]
pub enum DictionaryError {
    /// The source could not be read
    #[display("cannot read word list: {_0}")]
    Io(io::Error),
    /// The source held no usable words
    #[display("word list contains no usable words")]
    #[from(ignore)]
    Empty,
}

/// Immutable word set plus its sorted form.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    words: HashSet<String>,
    sorted: Vec<String>,
}

impl Dictionary {
    /// The embedded fallback dictionary.
    pub fn embedded() -> Arc<Dictionary> {
        Arc::clone(&EMBEDDED)
    }

    /// Build from any sequence of raw lines. Lines are trimmed and lowercased,
    /// apostrophes are dropped, and anything else non-alphabetic is skipped.
    pub fn from_words<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: HashSet<String> = lines
            .into_iter()
            .filter_map(|line| normalize(line.as_ref()))
            .collect();
        let mut sorted: Vec<String> = words.iter().cloned().collect();
        sorted.sort_unstable();
        Self { words, sorted }
    }

    /// Load from a newline-delimited string. Fails if nothing usable is found.
    pub fn from_text(text: &str) -> Result<Self, DictionaryError> {
        Self::non_empty(Self::from_words(text.lines()))
    }

    /// Load from a reader.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, DictionaryError> {
        let lines = reader.lines().collect::<io::Result<Vec<_>>>()?;
        Self::non_empty(Self::from_words(lines))
    }

    /// Load from a word list file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let file = File::open(path.as_ref())?;
        let dictionary = Self::from_reader(BufReader::new(file))?;
        info!(words = dictionary.len(), "dictionary loaded");
        Ok(dictionary)
    }

    fn non_empty(dictionary: Self) -> Result<Self, DictionaryError> {
        if dictionary.is_empty() {
            warn!("word list had no usable words");
            Err(DictionaryError::Empty)
        } else {
            Ok(dictionary)
        }
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, word: &str) -> bool {
        if word.bytes().any(|b| b.is_ascii_uppercase()) {
            self.words.contains(&word.to_ascii_lowercase())
        } else {
            self.words.contains(word)
        }
    }

    /// Whether any word starts with `prefix` (lowercase).
    pub fn has_prefix(&self, prefix: &str) -> bool {
        let idx = self.sorted.partition_point(|w| w.as_str() < prefix);
        self.sorted
            .get(idx)
            .is_some_and(|w| w.starts_with(prefix))
    }

    /// Number of words in the index
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.sorted.iter().map(String::as_str)
    }
}

fn normalize(line: &str) -> Option<String> {
    let word: String = line
        .trim()
        .chars()
        .filter(|&c| c != '\'')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if word.len() >= MIN_WORD_LENGTH && word.chars().all(|c| c.is_ascii_lowercase()) {
        Some(word)
    } else {
        None
    }
}

/// Availability of the dictionary for a round.
///
/// Validation is refused in every state but `Ready`.
#[derive(Debug, Clone)]
pub enum DictionaryStatus {
    /// Still loading; submissions get a "not ready" answer
    Loading,
    /// Loaded and usable
    Ready(Arc<Dictionary>),
    /// Load failed; needs a retry before anything validates
    Unavailable(String),
}

impl DictionaryStatus {
    pub fn ready(&self) -> Option<&Dictionary> {
        match self {
            DictionaryStatus::Ready(dictionary) => Some(dictionary),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready().is_some()
    }
}

impl From<Result<Dictionary, DictionaryError>> for DictionaryStatus {
    fn from(result: Result<Dictionary, DictionaryError>) -> Self {
        match result {
            Ok(dictionary) => DictionaryStatus::Ready(Arc::new(dictionary)),
            Err(e) => DictionaryStatus::Unavailable(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_contains_is_case_insensitive() {
        let dictionary = Dictionary::from_text("cat\ndog\n").unwrap();
        assert!(dictionary.contains("cat"));
        assert!(dictionary.contains("CAT"));
        assert!(dictionary.contains("Dog"));
        assert!(!dictionary.contains("cow"));
    }

    #[test]
    fn test_short_and_invalid_lines_skipped() {
        let dictionary = Dictionary::from_text("at\n  Rate \nit's\nx-ray\n\n").unwrap();
        assert_eq!(dictionary.len(), 2);
        assert!(dictionary.contains("rate"));
        assert!(dictionary.contains("its"));
        assert!(!dictionary.contains("at"));
        assert!(!dictionary.contains("xray"));
    }

    #[test]
    fn test_has_prefix() {
        let dictionary = Dictionary::from_text("bath\nbat\ncats\nrate").unwrap();
        assert!(dictionary.has_prefix("b"));
        assert!(dictionary.has_prefix("ba"));
        assert!(dictionary.has_prefix("bath"));
        assert!(dictionary.has_prefix("ca"));
        assert!(!dictionary.has_prefix("bx"));
        assert!(!dictionary.has_prefix("rates"));
        assert!(!dictionary.has_prefix("z"));
    }

    #[test]
    fn test_empty_source_is_unavailable() {
        assert!(matches!(Dictionary::from_text(""), Err(DictionaryError::Empty)));
        assert!(matches!(
            Dictionary::from_text("a\nbe\n"),
            Err(DictionaryError::Empty)
        ));
        let status: DictionaryStatus = Dictionary::from_text("").into();
        assert!(!status.is_ready());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = Dictionary::from_file("/definitely/not/here/words.txt");
        assert!(matches!(result, Err(DictionaryError::Io(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chain\nlink\ntile").unwrap();
        let dictionary = Dictionary::from_file(file.path()).unwrap();
        assert_eq!(dictionary.len(), 3);
        assert!(dictionary.contains("link"));
    }

    #[test]
    fn test_loading_twice_is_identical() {
        let text = "cat\nrat\nbat\nrate\nbath\ncats\nate\neats\n";
        let first = Dictionary::from_text(text).unwrap();
        let second = Dictionary::from_text(text).unwrap();
        for probe in ["cat", "rat", "bath", "eats", "ba", "ra", "zz", "", "cats", "catsup"] {
            assert_eq!(first.contains(probe), second.contains(probe));
            assert_eq!(first.has_prefix(probe), second.has_prefix(probe));
        }
        assert!(first.iter().eq(second.iter()));
    }

    #[test]
    fn test_embedded_dictionary() {
        let dictionary = Dictionary::embedded();
        assert!(dictionary.len() > 1000);
        assert!(dictionary.contains("cat"));
        assert!(dictionary.contains("chain"));
        assert!(dictionary.iter().all(|w| w.len() >= MIN_WORD_LENGTH));
    }
}
