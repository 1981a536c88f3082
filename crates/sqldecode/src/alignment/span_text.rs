//! # Span Text
//!
//! Recover the value text a predicted sub-word span points at.

use crate::{
    alignment::subword_tokenizer::{is_continuation, merge_pieces},
    errors::{SDResult, SqlDecodeError},
    types::TokenSpan,
};

/// The text behind one predicted value span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanText {
    /// The pieces exactly as predicted.
    pub raw_pieces: Vec<String>,

    /// The pieces, with the end extended over trailing continuation pieces.
    pub pieces: Vec<String>,

    /// `pieces` merged, continuation markers removed.
    pub text: String,
}

/// Read the pieces a span covers.
///
/// A span ending inside a word is extended to the end of that word, so a
/// prediction of `"butler cc ("` over `butler cc ( k ##s )` still reads
/// `"butler cc (ks"`.
///
/// ## Arguments
/// * `pieces` - The question pieces.
/// * `span` - The predicted span; `start <= end < pieces.len()`.
/// * `prefix` - The continuation marker.
pub fn span_text(
    pieces: &[String],
    span: TokenSpan,
    prefix: &str,
) -> SDResult<SpanText> {
    if span.is_empty() || span.end >= pieces.len() {
        return Err(SqlDecodeError::InvalidSpan {
            start: span.start,
            end: span.end,
            len: pieces.len(),
        });
    }

    let mut end = span.end;
    while end + 1 < pieces.len() && is_continuation(&pieces[end + 1], prefix) {
        end += 1;
    }

    let extended = pieces[span.start..=end].to_vec();
    Ok(SpanText {
        raw_pieces: pieces[span.start..=span.end].to_vec(),
        text: merge_pieces(&extended, prefix),
        pieces: extended,
    })
}
