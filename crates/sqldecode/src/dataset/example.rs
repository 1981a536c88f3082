//! # Dataset Examples

use std::{fs::File, io::BufRead, io::BufReader, path::Path};

use crate::{
    alignment::{AlignmentIndex, SubwordTokenizer, piece_spans_from_word_spans},
    errors::SDResult,
    query::StructuredQuery,
    types::TokenSpan,
};

/// One annotated question over a table.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Example {
    /// The question text.
    pub question: String,

    /// Word-level question tokens.
    #[serde(default)]
    pub question_tok: Vec<String>,

    /// The table the question is asked of.
    pub table_id: String,

    /// The gold query; absent in unlabeled sets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<StructuredQuery>,

    /// The reference SQL token stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_tok: Option<Vec<String>>,

    /// Word-level gold value spans, one per gold condition, in annotation
    /// order; `[-100, -100]` marks a value absent from the question.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wvi_corenlp: Option<Vec<[i64; 2]>>,
}

impl Example {
    /// The word tokens, or the question split on whitespace when absent.
    pub fn words(&self) -> Vec<String> {
        if self.question_tok.is_empty() {
            self.question
                .split_whitespace()
                .map(|w| w.to_string())
                .collect()
        } else {
            self.question_tok.clone()
        }
    }

    /// Build the sub-word alignment over [`Example::words`].
    pub fn alignment(
        &self,
        tokenizer: &dyn SubwordTokenizer,
    ) -> SDResult<AlignmentIndex> {
        AlignmentIndex::build(tokenizer, &self.words())
    }

    /// The gold value spans moved onto sub-word positions.
    ///
    /// ## Returns
    /// One entry per annotated span; `None` for "no span" markers. Empty
    /// when the example carries no word-level spans.
    pub fn gold_piece_spans(
        &self,
        alignment: &AlignmentIndex,
    ) -> SDResult<Vec<Option<TokenSpan>>> {
        match &self.wvi_corenlp {
            Some(spans) => piece_spans_from_word_spans(alignment, spans),
            None => Ok(Vec::new()),
        }
    }
}

/// Read examples from line-delimited JSON; blank lines are skipped.
pub fn read_examples<R: BufRead>(reader: R) -> SDResult<Vec<Example>> {
    let mut examples = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        examples.push(serde_json::from_str(line)?);
    }
    log::debug!("loaded {} examples", examples.len());
    Ok(examples)
}

/// Read examples from a line-delimited JSON file.
pub fn load_examples_path<P: AsRef<Path>>(path: P) -> SDResult<Vec<Example>> {
    read_examples(BufReader::new(File::open(path)?))
}
