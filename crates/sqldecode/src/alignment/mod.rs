//! # Tokenization Alignment
//!
//! Everything between word-level question tokens and the sub-word
//! sequence the encoder sees:
//! * [`SubwordTokenizer`] - the tokenizer boundary, and [`WordPieceTokenizer`].
//! * [`AlignmentIndex`] - `t_to_tt` / `tt_to_t` maps.
//! * [`span_locator`] - gold value spans.
//! * [`EncoderInput`] - the `[CLS] q [SEP] h [SEP] ...` layout.
//! * [`span_text()`] - predicted span to value text.

pub mod alignment_index;
pub mod input_layout;
pub mod span_locator;
pub mod span_text;
pub mod subword_tokenizer;
pub mod wordpiece;

pub use alignment_index::AlignmentIndex;
pub use input_layout::{EncoderInput, batch_header_piece_lens};
pub use span_locator::{find_sub_list, gold_value_spans, piece_spans_from_word_spans};
pub use span_text::{SpanText, span_text};
pub use subword_tokenizer::{CONTINUATION_PREFIX, SubwordTokenizer, merge_pieces};
pub use wordpiece::{WordPieceTokenizer, WordPieceVocab};
