//! # Encoder Input Layout
//!
//! The encoder sees one sequence per example:
//!
//! ```text
//! [CLS] q1 .. qn [SEP] h1 .. [SEP] h2 .. [SEP] ... hm .. [SEP]
//! ```
//!
//! Question positions (and the leading `[CLS]`/`[SEP]`) take segment id `1`;
//! header positions and their separators take segment id `2`.

use std::ops::Range;

use crate::{
    alignment::{
        subword_tokenizer::SubwordTokenizer,
        wordpiece::{CLS_TOKEN, SEP_TOKEN},
    },
    errors::{SDResult, SqlDecodeError},
};

/// Segment id of question positions.
pub const QUESTION_SEGMENT: u32 = 1;

/// Segment id of header positions.
pub const HEADER_SEGMENT: u32 = 2;

/// One example laid out for the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderInput {
    /// The token sequence, specials included, unpadded.
    pub tokens: Vec<String>,

    /// Segment id per token.
    pub segment_ids: Vec<u32>,

    /// Position range of the question pieces (`i_nlu`).
    pub question_range: Range<usize>,

    /// Position range of each header's pieces (`i_hds`).
    pub header_ranges: Vec<Range<usize>>,
}

impl EncoderInput {
    /// Lay out a question and headers.
    ///
    /// ## Arguments
    /// * `tokenizer` - Tokenizes each header.
    /// * `question_pieces` - The question, already split into pieces.
    /// * `headers` - Header texts, the "no filter" sentinel included.
    pub fn build<S: AsRef<str>>(
        tokenizer: &dyn SubwordTokenizer,
        question_pieces: &[String],
        headers: &[S],
    ) -> SDResult<Self> {
        let mut tokens = vec![CLS_TOKEN.to_string()];
        let mut segment_ids = vec![QUESTION_SEGMENT];

        let q_start = tokens.len();
        tokens.extend(question_pieces.iter().cloned());
        segment_ids.extend(std::iter::repeat_n(QUESTION_SEGMENT, question_pieces.len()));
        let question_range = q_start..tokens.len();
        tokens.push(SEP_TOKEN.to_string());
        segment_ids.push(QUESTION_SEGMENT);

        let mut header_ranges = Vec::with_capacity(headers.len());
        for header in headers {
            let pieces = tokenizer.tokenize(header.as_ref())?;
            let h_start = tokens.len();
            segment_ids.extend(std::iter::repeat_n(HEADER_SEGMENT, pieces.len()));
            tokens.extend(pieces);
            header_ranges.push(h_start..tokens.len());
            tokens.push(SEP_TOKEN.to_string());
            segment_ids.push(HEADER_SEGMENT);
        }

        Ok(Self {
            tokens,
            segment_ids,
            question_range,
            header_ranges,
        })
    }

    /// The number of real (unpadded) positions.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Is the layout empty? Never true for a built layout.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The number of question pieces (`l_n`).
    pub fn question_len(&self) -> usize {
        self.question_range.len()
    }

    /// Piece count per header (`l_hpu`).
    pub fn header_piece_lens(&self) -> Vec<usize> {
        self.header_ranges.iter().map(|r| r.len()).collect()
    }

    /// Vocabulary ids, attention mask, and segment ids, zero-padded.
    ///
    /// ## Arguments
    /// * `tokenizer` - Maps tokens to ids.
    /// * `max_seq_length` - The padded length.
    ///
    /// ## Returns
    /// `(input_ids, input_mask, segment_ids)`, each `max_seq_length` long;
    /// or [`SqlDecodeError::ShapeMismatch`] if the layout does not fit.
    pub fn padded_ids(
        &self,
        tokenizer: &dyn SubwordTokenizer,
        max_seq_length: usize,
    ) -> SDResult<(Vec<u32>, Vec<u32>, Vec<u32>)> {
        if self.len() > max_seq_length {
            return Err(SqlDecodeError::ShapeMismatch {
                context: "encoder input length",
                expected: max_seq_length,
                found: self.len(),
            });
        }

        let mut input_ids = tokenizer.convert_tokens_to_ids(&self.tokens)?;
        let mut input_mask = vec![1; input_ids.len()];
        let mut segment_ids = self.segment_ids.clone();

        input_ids.resize(max_seq_length, 0);
        input_mask.resize(max_seq_length, 0);
        segment_ids.resize(max_seq_length, 0);

        Ok((input_ids, input_mask, segment_ids))
    }
}

/// Flatten per-example header piece counts into one list (`l_hpu`).
///
/// Headers of a batch are treated as one batch of short sequences.
pub fn batch_header_piece_lens(inputs: &[EncoderInput]) -> Vec<usize> {
    inputs.iter().flat_map(|i| i.header_piece_lens()).collect()
}
