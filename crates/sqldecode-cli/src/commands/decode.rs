use std::sync::Arc;

use sqldecode::{
    dataset::{
        Example,
        ResultRecord,
        read_examples,
        read_jsonl,
        save_for_evaluation,
        save_for_evaluation_aux,
    },
    decoders::{ExampleDecoder, ExampleInput, ExampleScores, QueryPipeline},
    errors::SqlDecodeError,
    matching::ValueMatcher,
    rayon::ParallelRayonDecoder,
    scoring::{Evaluator, TableEngine},
    table::{InMemoryTableStore, TableStore},
};

use crate::{
    config::{CliConfig, ConfigArgs},
    input_output::open_path,
    logging::LogArgs,
    tokenizer_args::TokenizerArgs,
};

/// Args for the decode command.
#[derive(clap::Args, Debug)]
pub struct DecodeArgs {
    /// Examples, one JSON object per line.
    #[arg(long)]
    examples: String,

    /// Tables, one JSON object per line.
    #[arg(long)]
    tables: String,

    /// Encoder scores, one JSON object per example, in example order.
    #[arg(long)]
    scores: String,

    /// Directory for the result files.
    #[arg(long, default_value = ".")]
    out_dir: String,

    /// Dataset split name used in result file names.
    #[arg(long, default_value = "dev")]
    dset: String,

    /// Score predictions against the examples' gold queries.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    eval: bool,

    #[command(flatten)]
    tokenizer: TokenizerArgs,

    #[command(flatten)]
    config: ConfigArgs,

    #[clap(flatten)]
    logging: LogArgs,
}

impl DecodeArgs {
    /// Run the decode command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(3)?;
        let config = self.config.load()?;
        let tokenizer = self.tokenizer.load_tokenizer()?;

        let examples = read_examples(open_path(&self.examples)?)?;
        let store = InMemoryTableStore::from_jsonl(open_path(&self.tables)?)?;
        let scores: Vec<ExampleScores> = read_jsonl(open_path(&self.scores)?)?;
        log::info!(
            "examples: {}, tables: {}, score records: {}",
            examples.len(),
            store.len(),
            scores.len()
        );
        if scores.len() != examples.len() {
            return Err(format!(
                "{} score records for {} examples",
                scores.len(),
                examples.len()
            )
            .into());
        }

        let pieces = examples
            .iter()
            .map(|ex| ex.alignment(&tokenizer).map(|a| a.pieces().to_vec()))
            .collect::<Result<Vec<_>, _>>()?;

        // A missing table fails only its own example.
        let mut lookups: Vec<Result<(), SqlDecodeError>> = Vec::with_capacity(examples.len());
        let mut inputs = Vec::with_capacity(examples.len());
        for ((ex, pieces), scores) in examples.iter().zip(&pieces).zip(&scores) {
            match store.table(&ex.table_id) {
                Ok(table) => {
                    lookups.push(Ok(()));
                    inputs.push(ExampleInput {
                        question: &ex.question,
                        question_pieces: pieces,
                        table,
                        scores,
                    });
                }
                Err(e) => lookups.push(Err(e)),
            }
        }

        let pipeline = ParallelRayonDecoder::new(QueryPipeline::new(
            config.decode.clone(),
            ValueMatcher::new(config.matching.clone()),
        ));
        let mut predictions = pipeline.decode_examples(&inputs).into_iter();

        let mut records = Vec::with_capacity(examples.len());
        let mut illegal = 0;
        let mut failed = 0;
        for (idx, (ex, lookup)) in examples.iter().zip(lookups).enumerate() {
            let result = match lookup {
                Ok(()) => predictions.next().ok_or("decoder returned too few predictions")?,
                Err(e) => Err(e),
            };
            let record = match result {
                Ok(p) => {
                    illegal += usize::from(!p.is_legal());
                    ResultRecord::from_prediction(&p, &ex.table_id, &ex.question)
                }
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    log::warn!("example {idx} (table {}): {e}", ex.table_id);
                    failed += 1;
                    ResultRecord::failed(&ex.table_id, &ex.question, &e)
                }
            };
            records.push(record);
        }
        if illegal > 0 {
            log::warn!("{illegal} predictions select illegal aggregations");
        }
        if failed > 0 {
            log::warn!("{failed} of {} examples failed to decode", examples.len());
        }

        save_for_evaluation(&self.out_dir, &records, &self.dset)?;
        save_for_evaluation_aux(&self.out_dir, &records, &self.dset)?;

        if self.eval {
            self.evaluate(&config, store, &examples, &records)?;
        }
        Ok(())
    }

    fn evaluate(
        &self,
        config: &CliConfig,
        store: InMemoryTableStore,
        examples: &[Example],
        records: &[ResultRecord],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut evaluator = Evaluator::new(config.eval);
        if config.eval.execution() {
            evaluator = evaluator.with_engine(Arc::new(TableEngine::new(store)));
        }

        let mut unlabeled = 0;
        for (ex, record) in examples.iter().zip(records) {
            match &ex.sql {
                Some(_) if record.is_failed() => {
                    evaluator.score_failure();
                }
                Some(gold) => {
                    evaluator.score(&ex.table_id, &record.query, gold);
                }
                None => unlabeled += 1,
            }
        }
        if unlabeled > 0 {
            log::warn!("{unlabeled} examples have no gold query");
        }

        let report = evaluator.counts().report();
        log::info!("{} {report}", self.dset);
        println!("{report}");
        Ok(())
    }
}
