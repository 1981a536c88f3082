//! # Sub-word Tokenizer Boundary

use crate::errors::SDResult;

/// The default continuation marker for non-initial word pieces.
pub const CONTINUATION_PREFIX: &str = "##";

/// Trait for sub-word tokenizers.
///
/// Implementations must be deterministic, and must mark every non-initial
/// piece of a split word with [`SubwordTokenizer::continuation_prefix`].
pub trait SubwordTokenizer: Send + Sync {
    /// Split text into sub-word pieces.
    ///
    /// ## Arguments
    /// * `text` - The text to split.
    ///
    /// ## Returns
    /// The pieces, in order.
    fn tokenize(
        &self,
        text: &str,
    ) -> SDResult<Vec<String>>;

    /// Map pieces to vocabulary ids.
    ///
    /// ## Arguments
    /// * `tokens` - Pieces as produced by [`SubwordTokenizer::tokenize`],
    ///   or special tokens.
    ///
    /// ## Returns
    /// One id per piece.
    fn convert_tokens_to_ids(
        &self,
        tokens: &[String],
    ) -> SDResult<Vec<u32>>;

    /// The marker prefixed to non-initial pieces.
    fn continuation_prefix(&self) -> &str {
        CONTINUATION_PREFIX
    }
}

/// Is this piece a continuation of the previous one?
pub fn is_continuation(
    piece: &str,
    prefix: &str,
) -> bool {
    !prefix.is_empty() && piece.starts_with(prefix)
}

/// Join pieces into text, dropping every occurrence of the continuation marker.
///
/// ```
/// use sqldecode::alignment::merge_pieces;
///
/// let pieces = ["butler", "cc", "(", "k", "##s", ")"];
/// assert_eq!(merge_pieces(&pieces, "##"), "butlercc(ks)");
/// ```
pub fn merge_pieces<S: AsRef<str>>(
    pieces: &[S],
    prefix: &str,
) -> String {
    let joined: String = pieces.iter().map(|p| p.as_ref()).collect();
    if prefix.is_empty() {
        joined
    } else {
        joined.replace(prefix, "")
    }
}
