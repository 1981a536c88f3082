use sqldecode::{
    alignment::{SubwordTokenizer, gold_value_spans},
    dataset::{Example, read_examples, write_jsonl},
    errors::SDResult,
    types::TokenSpan,
};

use crate::{
    input_output::{InputArgs, OutputArgs},
    logging::LogArgs,
    tokenizer_args::TokenizerArgs,
};

/// Args for the spans command.
#[derive(clap::Args, Debug)]
pub struct SpansArgs {
    #[command(flatten)]
    tokenizer: TokenizerArgs,

    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    output: OutputArgs,

    #[clap(flatten)]
    logging: LogArgs,
}

/// One example's sub-word view.
#[derive(Debug, serde::Serialize)]
struct SpanRecord {
    table_id: String,
    question_pieces: Vec<String>,
    t_to_tt: Vec<usize>,

    /// `null` when a gold value could not be located.
    value_spans: Option<Vec<Option<TokenSpan>>>,
}

/// Gold value spans: from annotated word spans when present, otherwise by
/// locating each value of the reference SQL tokens in the question.
fn value_spans(
    example: &Example,
    tokenizer: &dyn SubwordTokenizer,
) -> SDResult<(SpanRecord, Option<String>)> {
    let words = example.words();
    let alignment = example.alignment(tokenizer)?;

    let spans = if example.wvi_corenlp.is_some() {
        example.gold_piece_spans(&alignment)
    } else if let Some(sql_tokens) = &example.query_tok {
        gold_value_spans(&words, &alignment, sql_tokens)
            .map(|spans| spans.into_iter().map(Some).collect())
    } else {
        Ok(Vec::new())
    };
    let (value_spans, failure) = match spans {
        Ok(spans) => (Some(spans), None),
        Err(e) => (None, Some(e.to_string())),
    };

    Ok((
        SpanRecord {
            table_id: example.table_id.clone(),
            question_pieces: alignment.pieces().to_vec(),
            t_to_tt: alignment.t_to_tt().to_vec(),
            value_spans,
        },
        failure,
    ))
}

impl SpansArgs {
    /// Run the spans command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(3)?;
        let tokenizer = self.tokenizer.load_tokenizer()?;
        let examples = read_examples(self.input.open_reader()?)?;

        let mut records = Vec::with_capacity(examples.len());
        let mut failures = 0;
        for (idx, example) in examples.iter().enumerate() {
            let (record, failure) = value_spans(example, &tokenizer)?;
            if let Some(reason) = failure {
                log::warn!("example {idx}: {reason}");
                failures += 1;
            }
            records.push(record);
        }

        let n = write_jsonl(self.output.open_writer()?, &records)?;
        log::info!("wrote {n} span records; {failures} without gold spans");
        Ok(())
    }
}
