//! # Prediction Results
//!
//! Two line-delimited JSON files per dataset split:
//! * `results_<dset>.jsonl` - one predicted query per line.
//! * `results_aux_<dset>.jsonl` - one [`ResultRecord`] per line.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    decoders::{ConditionGrounding, FieldProbabilities, PredictedExample, QueryProbability},
    errors::{SDResult, SqlDecodeError},
    query::StructuredQuery,
};

/// The evaluation file path for a dataset split.
pub fn results_path<P: AsRef<Path>>(
    dir: P,
    dset: &str,
) -> PathBuf {
    dir.as_ref().join(format!("results_{dset}.jsonl"))
}

/// The auxiliary file path for a dataset split.
pub fn aux_results_path<P: AsRef<Path>>(
    dir: P,
    dset: &str,
) -> PathBuf {
    dir.as_ref().join(format!("results_aux_{dset}.jsonl"))
}

/// Write one JSON value per line.
///
/// ## Returns
/// The number of lines written.
pub fn write_jsonl<W: Write, T: Serialize>(
    writer: W,
    items: impl IntoIterator<Item = T>,
) -> SDResult<usize> {
    let mut writer = BufWriter::new(writer);
    let mut count = 0;
    for item in items {
        serde_json::to_writer(&mut writer, &item)?;
        writer.write_all(b"\n")?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

/// Read one JSON value per line; blank lines are skipped.
pub fn read_jsonl<R: BufRead, T: DeserializeOwned>(reader: R) -> SDResult<Vec<T>> {
    let mut items = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        items.push(serde_json::from_str(&line)?);
    }
    Ok(items)
}

/// One example's prediction with its provenance.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResultRecord {
    /// The predicted query.
    pub query: StructuredQuery,

    /// The example's table.
    pub table_id: String,

    /// The question text.
    pub question: String,

    /// How each condition value was found.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grounding: Vec<ConditionGrounding>,

    /// The query probability.
    pub probability: QueryProbability,

    /// Per-field confidences, rounded.
    pub confidences: FieldProbabilities,

    /// Legality per select slot.
    pub legal_select: Vec<bool>,

    /// Why the example could not be decoded; the query is then empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResultRecord {
    /// Build a record from a prediction.
    pub fn from_prediction(
        prediction: &PredictedExample,
        table_id: &str,
        question: &str,
    ) -> Self {
        Self {
            query: prediction.query().clone(),
            table_id: table_id.to_string(),
            question: question.to_string(),
            grounding: prediction.assembly.grounding.clone(),
            probability: prediction.decoded.probability(),
            confidences: prediction.decoded.confidences(),
            legal_select: prediction.legal_select.clone(),
            error: None,
        }
    }

    /// Build the placeholder record of an example that failed to decode.
    ///
    /// The query is empty and every probability is zero, so the example
    /// keeps its line in the result files and scores as wrong.
    pub fn failed(
        table_id: &str,
        question: &str,
        error: &SqlDecodeError,
    ) -> Self {
        Self {
            query: StructuredQuery::default(),
            table_id: table_id.to_string(),
            question: question.to_string(),
            grounding: Vec::new(),
            probability: QueryProbability::new(0.0, 0.0),
            confidences: FieldProbabilities::default(),
            legal_select: Vec::new(),
            error: Some(error.to_string()),
        }
    }

    /// Did decoding fail for this example?
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Write the predicted queries to `results_<dset>.jsonl` under `dir`.
///
/// ## Returns
/// The path written.
pub fn save_for_evaluation<P: AsRef<Path>>(
    dir: P,
    records: &[ResultRecord],
    dset: &str,
) -> SDResult<PathBuf> {
    let path = results_path(dir, dset);
    let n = write_jsonl(File::create(&path)?, records.iter().map(|r| &r.query))?;
    log::info!("wrote {n} predictions to {}", path.display());
    Ok(path)
}

/// Write the full records to `results_aux_<dset>.jsonl` under `dir`.
///
/// ## Returns
/// The path written.
pub fn save_for_evaluation_aux<P: AsRef<Path>>(
    dir: P,
    records: &[ResultRecord],
    dset: &str,
) -> SDResult<PathBuf> {
    let path = aux_results_path(dir, dset);
    let n = write_jsonl(File::create(&path)?, records)?;
    log::info!("wrote {n} records to {}", path.display());
    Ok(path)
}

/// Load the predicted queries written by [`save_for_evaluation`].
pub fn load_results<P: AsRef<Path>>(path: P) -> SDResult<Vec<StructuredQuery>> {
    read_jsonl(BufReader::new(File::open(path)?))
}
