//! # Tokenization Alignment Index
//!
//! Bidirectional maps between word-level tokens and their sub-word pieces:
//! * `t_to_tt[word]` - the index of the word's first piece;
//! * `tt_to_t[piece]` - the index of the word that produced the piece.
//!
//! A word the tokenizer maps to no pieces (e.g. an empty string) still gets
//! an offset in `t_to_tt`, but owns no pieces; its offset is that of the
//! next word's first piece (or the piece count, at the end).

use crate::{
    alignment::subword_tokenizer::SubwordTokenizer,
    errors::{SDResult, SqlDecodeError},
    types::TokenSpan,
};

/// Immutable word-to-piece alignment for one token sequence.
///
/// ## Style Hints
/// Instance names should prefer `alignment`.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct AlignmentIndex {
    pieces: Vec<String>,
    t_to_tt: Vec<usize>,
    tt_to_t: Vec<usize>,
}

impl AlignmentIndex {
    /// Build the index by tokenizing each word in turn.
    ///
    /// ## Arguments
    /// * `tokenizer` - The sub-word tokenizer.
    /// * `words` - The word-level tokens.
    ///
    /// ## Returns
    /// The index, or the first tokenizer error.
    pub fn build<S: AsRef<str>>(
        tokenizer: &dyn SubwordTokenizer,
        words: &[S],
    ) -> SDResult<Self> {
        let mut pieces = Vec::new();
        let mut t_to_tt = Vec::with_capacity(words.len());
        let mut tt_to_t = Vec::new();
        for (word_idx, word) in words.iter().enumerate() {
            t_to_tt.push(pieces.len());
            for piece in tokenizer.tokenize(word.as_ref())? {
                tt_to_t.push(word_idx);
                pieces.push(piece);
            }
        }
        Ok(Self {
            pieces,
            t_to_tt,
            tt_to_t,
        })
    }

    /// The concatenated sub-word pieces.
    pub fn pieces(&self) -> &[String] {
        &self.pieces
    }

    /// Word index to first-piece index.
    pub fn t_to_tt(&self) -> &[usize] {
        &self.t_to_tt
    }

    /// Piece index to owning word index.
    pub fn tt_to_t(&self) -> &[usize] {
        &self.tt_to_t
    }

    /// The number of words.
    pub fn num_words(&self) -> usize {
        self.t_to_tt.len()
    }

    /// The number of pieces.
    pub fn num_pieces(&self) -> usize {
        self.pieces.len()
    }

    /// The pieces owned by one word; empty for a zero-length run.
    pub fn word_pieces(
        &self,
        word: usize,
    ) -> &[String] {
        match self.t_to_tt.get(word) {
            Some(&start) => {
                let end = self
                    .t_to_tt
                    .get(word + 1)
                    .copied()
                    .unwrap_or(self.pieces.len());
                &self.pieces[start..end]
            }
            None => &[],
        }
    }

    /// Map a word-level span to a piece-level span.
    ///
    /// Both ends map to the *first* piece of their word; span-to-text
    /// extends the end across continuation pieces.
    pub fn word_span_to_piece_span(
        &self,
        span: TokenSpan,
    ) -> SDResult<TokenSpan> {
        let lookup = |idx: usize| {
            self.t_to_tt
                .get(idx)
                .copied()
                .ok_or(SqlDecodeError::InvalidSpan {
                    start: span.start,
                    end: span.end,
                    len: self.t_to_tt.len(),
                })
        };
        Ok(TokenSpan::new(lookup(span.start)?, lookup(span.end)?))
    }

    /// Map a piece-level span to the word-level span that owns it.
    pub fn piece_span_to_word_span(
        &self,
        span: TokenSpan,
    ) -> SDResult<TokenSpan> {
        let lookup = |idx: usize| {
            self.tt_to_t
                .get(idx)
                .copied()
                .ok_or(SqlDecodeError::InvalidSpan {
                    start: span.start,
                    end: span.end,
                    len: self.tt_to_t.len(),
                })
        };
        Ok(TokenSpan::new(lookup(span.start)?, lookup(span.end)?))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::alignment::{merge_pieces, wordpiece::testing::sample_tokenizer};

    #[test]
    fn test_build() {
        let tok = sample_tokenizer();
        let words = ["butler", "cc", "(ks)"];
        let alignment = AlignmentIndex::build(&tok, &words).unwrap();

        assert_eq!(alignment.pieces(), &["butler", "cc", "(", "k", "##s", ")"]);
        assert_eq!(alignment.t_to_tt(), &[0, 1, 2]);
        assert_eq!(alignment.tt_to_t(), &[0, 1, 2, 2, 2, 2]);
        assert_eq!(alignment.word_pieces(2), &["(", "k", "##s", ")"]);
        assert!(alignment.word_pieces(3).is_empty());
    }

    #[test]
    fn test_empty_word_gets_zero_length_run() {
        let tok = sample_tokenizer();
        let words = ["how", "", "old"];
        let alignment = AlignmentIndex::build(&tok, &words).unwrap();

        assert_eq!(alignment.num_words(), 3);
        assert_eq!(alignment.num_pieces(), 2);
        assert_eq!(alignment.t_to_tt(), &[0, 1, 1]);
        assert!(alignment.word_pieces(1).is_empty());
        assert_eq!(alignment.word_pieces(2), &["old"]);

        let span = alignment
            .word_span_to_piece_span(TokenSpan::new(1, 2))
            .unwrap();
        assert_eq!(span, TokenSpan::new(1, 1));
    }

    #[test]
    fn test_span_conversions() {
        let tok = sample_tokenizer();
        let words = ["how", "old", "is", "unaffable", "bob"];
        let alignment = AlignmentIndex::build(&tok, &words).unwrap();

        let pieces = alignment
            .word_span_to_piece_span(TokenSpan::new(3, 4))
            .unwrap();
        assert_eq!(pieces, TokenSpan::new(3, 6));

        let back = alignment
            .piece_span_to_word_span(TokenSpan::new(4, 6))
            .unwrap();
        assert_eq!(back, TokenSpan::new(3, 4));

        assert!(matches!(
            alignment.word_span_to_piece_span(TokenSpan::new(0, 9)),
            Err(SqlDecodeError::InvalidSpan { len: 5, .. })
        ));
        assert!(alignment
            .piece_span_to_word_span(TokenSpan::new(7, 7))
            .is_err());
    }

    proptest! {
        #[test]
        fn test_runs_reconstruct_pieces(
            words in prop::collection::vec(
                prop::sample::select(vec!["how", "unaffable", "ks", "", "三", "zzz", "bob"]),
                0..12,
            )
        ) {
            let tok = sample_tokenizer();
            let alignment = AlignmentIndex::build(&tok, &words).unwrap();

            let rebuilt: Vec<String> = (0..alignment.num_words())
                .flat_map(|w| alignment.word_pieces(w).to_vec())
                .collect();
            prop_assert_eq!(&rebuilt, alignment.pieces());

            for (piece_idx, &word_idx) in alignment.tt_to_t().iter().enumerate() {
                prop_assert!(alignment.t_to_tt()[word_idx] <= piece_idx);
            }

            for (word_idx, word) in words.iter().enumerate() {
                let run = alignment.word_pieces(word_idx);
                prop_assert_eq!(run.is_empty(), word.is_empty());
                prop_assert_eq!(
                    merge_pieces(run, "##"),
                    merge_pieces(&tok.tokenize(word).unwrap(), "##")
                );
            }
        }
    }
}
