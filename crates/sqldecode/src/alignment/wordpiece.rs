//! # `WordPiece` Tokenizer
//!
//! A BERT-style tokenizer over an explicit vocabulary:
//! * whitespace splitting, with every CJK ideograph and punctuation mark
//!   split out as its own word;
//! * optional lowercasing;
//! * greedy longest-match-first sub-word segmentation, marking
//!   non-initial pieces with `##` and falling back to `[UNK]`.
//!
//! The vocabulary file format is one token per line; the line number is the id.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::{
    alignment::subword_tokenizer::{CONTINUATION_PREFIX, SubwordTokenizer},
    errors::{SDResult, SqlDecodeError},
    types::{SDHashMap, hash_map_new},
};

/// The unknown-piece token.
pub const UNK_TOKEN: &str = "[UNK]";

/// The sequence-start token.
pub const CLS_TOKEN: &str = "[CLS]";

/// The segment separator token.
pub const SEP_TOKEN: &str = "[SEP]";

/// The padding token.
pub const PAD_TOKEN: &str = "[PAD]";

/// Words longer than this many chars tokenize to `[UNK]`.
pub const DEFAULT_MAX_WORD_CHARS: usize = 100;

/// An immutable token-to-id vocabulary.
///
/// ## Style Hints
/// Instance names should prefer `vocab`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordPieceVocab {
    token_to_id: SDHashMap<String, u32>,
    id_to_token: Vec<String>,
}

impl WordPieceVocab {
    /// Build a vocabulary from tokens; ids are positions.
    ///
    /// Duplicate tokens keep their first id.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut token_to_id = hash_map_new();
        let mut id_to_token = Vec::new();
        for token in tokens {
            let token = token.into();
            let id = id_to_token.len() as u32;
            token_to_id.entry(token.clone()).or_insert(id);
            id_to_token.push(token);
        }
        Self {
            token_to_id,
            id_to_token,
        }
    }

    /// Read a vocabulary from a [`BufRead`] stream, one token per line.
    ///
    /// Trailing line-ending whitespace is stripped; blank lines still take an id.
    pub fn read_vocab<R: BufRead>(reader: R) -> SDResult<Self> {
        let mut tokens = Vec::new();
        for line in reader.lines() {
            let line = line?;
            tokens.push(line.trim_end_matches(['\r', '\n']).to_string());
        }
        Ok(Self::from_tokens(tokens))
    }

    /// Load a vocabulary file.
    ///
    /// ## Arguments
    /// * `path` - the path to the vocabulary file.
    pub fn load_vocab_path<P: AsRef<Path>>(path: P) -> SDResult<Self> {
        let vocab = Self::read_vocab(BufReader::new(File::open(path)?))?;
        log::debug!("loaded wordpiece vocab with {} tokens", vocab.len());
        Ok(vocab)
    }

    /// The number of ids.
    pub fn len(&self) -> usize {
        self.id_to_token.len()
    }

    /// Is the vocabulary empty?
    pub fn is_empty(&self) -> bool {
        self.id_to_token.is_empty()
    }

    /// Look up the id of a token.
    pub fn token_id(
        &self,
        token: &str,
    ) -> Option<u32> {
        self.token_to_id.get(token).copied()
    }

    /// Look up the token for an id.
    pub fn id_token(
        &self,
        id: u32,
    ) -> Option<&str> {
        self.id_to_token.get(id as usize).map(|s| s.as_str())
    }

    /// Does the vocabulary contain this token?
    pub fn contains(
        &self,
        token: &str,
    ) -> bool {
        self.token_to_id.contains_key(token)
    }
}

/// Is `c` a CJK ideograph (split out as its own word)?
pub fn is_cjk_char(c: char) -> bool {
    matches!(c as u32,
        0x4E00..=0x9FFF
        | 0x3400..=0x4DBF
        | 0x20000..=0x2A6DF
        | 0x2A700..=0x2B73F
        | 0x2B740..=0x2B81F
        | 0x2B820..=0x2CEAF
        | 0xF900..=0xFAFF
        | 0x2F800..=0x2FA1F)
}

fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
        || matches!(c as u32, 0x3000..=0x303F | 0xFF00..=0xFF0F | 0xFF1A..=0xFF20 | 0xFF3B..=0xFF40 | 0xFF5B..=0xFF65 | 0x2010..=0x2027)
}

/// A greedy longest-match-first `WordPiece` tokenizer.
#[derive(Debug, Clone)]
pub struct WordPieceTokenizer {
    vocab: WordPieceVocab,
    lowercase: bool,
    max_word_chars: usize,
}

impl WordPieceTokenizer {
    /// Create a tokenizer over a vocabulary.
    ///
    /// ## Arguments
    /// * `vocab` - The vocabulary; should contain [`UNK_TOKEN`].
    /// * `lowercase` - Lowercase text before splitting.
    pub fn new(
        vocab: WordPieceVocab,
        lowercase: bool,
    ) -> Self {
        Self {
            vocab,
            lowercase,
            max_word_chars: DEFAULT_MAX_WORD_CHARS,
        }
    }

    /// Set the longest word, in chars, segmented before falling back to `[UNK]`.
    pub fn with_max_word_chars(
        mut self,
        max_word_chars: usize,
    ) -> Self {
        self.max_word_chars = max_word_chars;
        self
    }

    /// The vocabulary.
    pub fn vocab(&self) -> &WordPieceVocab {
        &self.vocab
    }

    /// Split text into words: whitespace boundaries, with each CJK
    /// ideograph and punctuation mark as a word of its own.
    pub fn split_words(
        &self,
        text: &str,
    ) -> Vec<String> {
        let mut words = Vec::new();
        let mut current = String::new();
        for c in text.chars() {
            if c.is_whitespace() || c.is_control() {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            } else if is_cjk_char(c) || is_punctuation(c) {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
                words.push(c.to_string());
            } else if self.lowercase {
                current.extend(c.to_lowercase());
            } else {
                current.push(c);
            }
        }
        if !current.is_empty() {
            words.push(current);
        }
        words
    }

    /// Segment one word into pieces.
    pub fn segment_word(
        &self,
        word: &str,
    ) -> Vec<String> {
        let chars: Vec<char> = word.chars().collect();
        if chars.is_empty() {
            return Vec::new();
        }
        if chars.len() > self.max_word_chars {
            return vec![UNK_TOKEN.to_string()];
        }

        let mut pieces = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let mut end = chars.len();
            let mut found = None;
            while start < end {
                let substr: String = chars[start..end].iter().collect();
                let candidate = if start == 0 {
                    substr
                } else {
                    format!("{CONTINUATION_PREFIX}{substr}")
                };
                if self.vocab.contains(&candidate) {
                    found = Some(candidate);
                    break;
                }
                end -= 1;
            }
            match found {
                Some(piece) => {
                    pieces.push(piece);
                    start = end;
                }
                // Any unmatchable suffix makes the whole word unknown.
                None => return vec![UNK_TOKEN.to_string()],
            }
        }
        pieces
    }
}

impl SubwordTokenizer for WordPieceTokenizer {
    fn tokenize(
        &self,
        text: &str,
    ) -> SDResult<Vec<String>> {
        Ok(self
            .split_words(text)
            .iter()
            .flat_map(|w| self.segment_word(w))
            .collect())
    }

    fn convert_tokens_to_ids(
        &self,
        tokens: &[String],
    ) -> SDResult<Vec<u32>> {
        tokens
            .iter()
            .map(|t| {
                self.vocab
                    .token_id(t)
                    .or_else(|| self.vocab.token_id(UNK_TOKEN))
                    .ok_or_else(|| {
                        SqlDecodeError::Tokenizer(format!(
                            "token {t:?} not in vocabulary and no {UNK_TOKEN} fallback"
                        ))
                    })
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// A small mixed English/Chinese vocabulary.
    pub fn sample_vocab() -> WordPieceVocab {
        WordPieceVocab::from_tokens([
            PAD_TOKEN, UNK_TOKEN, CLS_TOKEN, SEP_TOKEN, "how", "old", "is", "bob", "alice", "name",
            "age", "un", "##aff", "##able", "##s", "k", "(", ")", "?", "三", "月", "五", "日", "的",
            "空", "列", "20", "##24", "年", "2024", "butler", "cc",
        ])
    }

    /// A lowercasing tokenizer over [`sample_vocab`].
    pub fn sample_tokenizer() -> WordPieceTokenizer {
        WordPieceTokenizer::new(sample_vocab(), true)
    }
}
