//! # Span Locator
//!
//! Ground-truth value spans: locate gold WHERE values inside the question,
//! and move word-level spans onto the sub-word sequence.

use crate::{
    alignment::AlignmentIndex,
    errors::{SDResult, SqlDecodeError},
    types::TokenSpan,
};

/// Marker for a condition with no value span in the question.
pub const NO_SPAN_MARKER: i64 = -100;

/// Comparison operator tokens of a reference SQL token stream, in search order.
///
/// The literal symbols are not searched for; values sometimes contain them.
pub const SQL_WHERE_OPS: [&str; 3] = ["EQL", "LT", "GT"];

/// Find every occurrence of `needle` in `haystack`.
///
/// ## Arguments
/// * `needle` - The token subsequence to find; an empty needle matches nowhere.
/// * `haystack` - The sequence to search.
///
/// ## Returns
/// Inclusive `(start, end)` spans, in order of first occurrence.
pub fn find_sub_list<T: PartialEq>(
    needle: &[T],
    haystack: &[T],
) -> Vec<TokenSpan> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return Vec::new();
    }
    haystack
        .windows(needle.len())
        .enumerate()
        .filter(|(_, window)| *window == needle)
        .map(|(start, _)| TokenSpan::new(start, start + needle.len() - 1))
        .collect()
}

/// Locate the gold value span of each WHERE condition.
///
/// The WHERE clause of `sql_tokens` is cut into `AND`-separated segments;
/// in each, the value is the tokens after the first operator token
/// ([`SQL_WHERE_OPS`]). The first occurrence of the value in
/// `question_words` is mapped through `alignment` to sub-word positions.
///
/// ## Arguments
/// * `question_words` - The word-level question tokens.
/// * `alignment` - The alignment built over `question_words`.
/// * `sql_tokens` - The reference SQL token stream.
///
/// ## Returns
/// One sub-word span per condition, or an error if a segment has no operator
/// or a value does not occur in the question.
pub fn gold_value_spans<S: AsRef<str>>(
    question_words: &[S],
    alignment: &AlignmentIndex,
    sql_tokens: &[S],
) -> SDResult<Vec<TokenSpan>> {
    let question: Vec<&str> = question_words.iter().map(|w| w.as_ref()).collect();
    let sql: Vec<&str> = sql_tokens.iter().map(|w| w.as_ref()).collect();

    let mut st = sql
        .iter()
        .position(|&t| t == "WHERE")
        .map_or(sql.len(), |i| i + 1);

    let mut spans = Vec::new();
    while st < sql.len() {
        let ed = sql[st..]
            .iter()
            .position(|&t| t == "AND")
            .map_or(sql.len(), |i| i + st);
        let segment = &sql[st..ed];

        let op_pos = SQL_WHERE_OPS
            .iter()
            .find_map(|op| segment.iter().position(|t| t == op))
            .ok_or_else(|| SqlDecodeError::MissingOperator {
                tokens: segment.iter().map(|t| t.to_string()).collect(),
            })?;

        let value = &segment[op_pos + 1..];
        let found = find_sub_list(value, &question)
            .into_iter()
            .next()
            .ok_or_else(|| SqlDecodeError::ValueNotFound {
                value: value.iter().map(|t| t.to_string()).collect(),
            })?;

        spans.push(alignment.word_span_to_piece_span(found)?);
        st = ed + 1;
    }
    Ok(spans)
}

/// Map word-level gold spans onto sub-word positions.
///
/// `[-100, -100]` marks a condition with no span and maps to `None`.
pub fn piece_spans_from_word_spans(
    alignment: &AlignmentIndex,
    word_spans: &[[i64; 2]],
) -> SDResult<Vec<Option<TokenSpan>>> {
    word_spans
        .iter()
        .map(|&[start, end]| {
            if start == NO_SPAN_MARKER && end == NO_SPAN_MARKER {
                return Ok(None);
            }
            let (Ok(s), Ok(e)) = (usize::try_from(start), usize::try_from(end)) else {
                return Err(SqlDecodeError::InvalidSpan {
                    start: start.max(0) as usize,
                    end: end.max(0) as usize,
                    len: alignment.num_words(),
                });
            };
            alignment.word_span_to_piece_span(TokenSpan::new(s, e)).map(Some)
        })
        .collect()
}

/// Render an optional span in its marked JSON form.
pub fn marked_span(span: Option<TokenSpan>) -> [i64; 2] {
    match span {
        Some(span) => [span.start as i64, span.end as i64],
        None => [NO_SPAN_MARKER, NO_SPAN_MARKER],
    }
}
