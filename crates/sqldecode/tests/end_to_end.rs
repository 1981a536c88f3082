#![allow(missing_docs)]

use std::sync::Arc;

use sqldecode::{
    alignment::{AlignmentIndex, WordPieceTokenizer, WordPieceVocab},
    decoders::{DecodeOptions, ExampleDecoder, ExampleInput, ExampleScores, QueryPipeline},
    matching::{MatchStrategy, ValueMatcher},
    query::{CondOp, Condition, StructuredQuery, render_sql},
    scoring::{EvalOptions, Evaluator, TableEngine},
    table::{InMemoryTableStore, Table, TableStore},
};

const PEOPLE: &str = r#"{"id": "people", "name": "people",
    "header": ["name", "age"], "types": ["text", "real"],
    "rows": [["Alice", "30"], ["Bob", "25"]]}"#;

const GOLD: &str = r#"{"sel": [1], "agg": [0], "conds": [[0, 0, "Bob"]], "cond_conn_op": 0}"#;

fn peaked(
    len: usize,
    hot: &[usize],
) -> Vec<f32> {
    (0..len)
        .map(|i| if hot.contains(&i) { 5.0 } else { 0.0 })
        .collect()
}

/// Scores selecting `age`, filtering `name` on the piece span `[3, 3]`.
fn how_old_scores(num_pieces: usize) -> ExampleScores {
    let slots = 4;
    let mut starts = vec![peaked(num_pieces, &[0]); slots];
    let mut ends = vec![peaked(num_pieces, &[0]); slots];
    starts[0] = peaked(num_pieces, &[3]);
    ends[0] = peaked(num_pieces, &[3]);

    ExampleScores {
        select_len: peaked(4, &[1]),
        select_columns: peaked(3, &[1]),
        select_aggs: vec![peaked(6, &[0]); slots],
        where_num: peaked(5, &[1]),
        where_conn: peaked(3, &[0]),
        where_columns: peaked(3, &[0]),
        where_ops: vec![peaked(4, &[0]); slots],
        where_value_start: starts,
        where_value_end: ends,
    }
}

fn tokenizer() -> WordPieceTokenizer {
    let vocab = WordPieceVocab::from_tokens(["[PAD]", "[UNK]", "how", "old", "is", "bob"]);
    WordPieceTokenizer::new(vocab, true)
}

#[test]
fn test_how_old_is_bob() {
    let table: Table = serde_json::from_str(PEOPLE).unwrap();
    let store: InMemoryTableStore = [table].into_iter().collect();
    let gold: StructuredQuery = serde_json::from_str(GOLD).unwrap();

    let question = "How old is Bob";
    let words: Vec<&str> = question.split_whitespace().collect();
    let alignment = AlignmentIndex::build(&tokenizer(), &words).unwrap();
    assert_eq!(alignment.pieces(), &["how", "old", "is", "bob"]);

    let scores = how_old_scores(alignment.num_pieces());
    let input = ExampleInput {
        question,
        question_pieces: alignment.pieces(),
        table: store.table("people").unwrap(),
        scores: &scores,
    };

    let pipeline = QueryPipeline::new(DecodeOptions::default(), ValueMatcher::default());
    let predicted = pipeline.decode_example(&input).unwrap();
    assert!(predicted.is_legal());
    assert_eq!(
        predicted.query().conds,
        vec![Condition::new(0, CondOp::Eq, "Bob")]
    );

    let grounding = &predicted.assembly.grounding[0];
    assert_eq!(grounding.span_text.as_deref(), Some("bob"));
    let matched = grounding.matched.as_ref().unwrap();
    assert_eq!(matched.row, 1);
    assert_eq!(matched.value, "Bob");
    assert_eq!(matched.strategy, MatchStrategy::Substring);

    let sql = render_sql(predicted.query(), store.table("people").unwrap()).unwrap();
    assert!(sql.contains("age"));

    let mut evaluator = Evaluator::new(EvalOptions::default().with_execution(true))
        .with_engine(Arc::new(TableEngine::new(store.clone())));
    let m = evaluator.score("people", predicted.query(), &gold);
    assert_eq!(m.lx, 1);
    assert_eq!(m.x, Some(1));
    assert_eq!(evaluator.counts().report().lx, 1.0);
}

#[cfg(feature = "rayon")]
#[test]
fn test_parallel_batch_matches_sequential() {
    use sqldecode::rayon::ParallelRayonDecoder;

    let table: Table = serde_json::from_str(PEOPLE).unwrap();
    let pieces: Vec<String> = ["how", "old", "is", "bob"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let scores = how_old_scores(pieces.len());
    let input = ExampleInput {
        question: "How old is Bob",
        question_pieces: &pieces,
        table: &table,
        scores: &scores,
    };
    let batch = vec![input; 8];

    let sequential = QueryPipeline::default();
    let parallel = ParallelRayonDecoder::new(QueryPipeline::default());
    let parallel: Vec<_> = parallel
        .decode_examples(&batch)
        .into_iter()
        .map(|p| p.unwrap())
        .collect();
    let sequential: Vec<_> = sequential
        .decode_examples(&batch)
        .into_iter()
        .map(|p| p.unwrap())
        .collect();
    assert_eq!(parallel, sequential);
}

#[test]
fn test_mixed_batch_scores_each_example() {
    let table: Table = serde_json::from_str(PEOPLE).unwrap();
    let gold: StructuredQuery = serde_json::from_str(GOLD).unwrap();
    let long: Vec<String> = ["how", "old", "is", "bob"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let short: Vec<String> = ["bob", "age"].iter().map(|s| s.to_string()).collect();

    // Score rows are padded to the longest question in the batch.
    let long_scores = how_old_scores(long.len());
    let short_scores = how_old_scores(long.len());
    let mut broken_scores = how_old_scores(long.len());
    broken_scores.where_ops.clear();

    let batch = [
        ExampleInput {
            question: "How old is Bob",
            question_pieces: &long,
            table: &table,
            scores: &long_scores,
        },
        ExampleInput {
            question: "bob age",
            question_pieces: &short,
            table: &table,
            scores: &short_scores,
        },
        ExampleInput {
            question: "How old is Bob",
            question_pieces: &long,
            table: &table,
            scores: &broken_scores,
        },
    ];

    let predictions = QueryPipeline::default().decode_examples(&batch);
    assert_eq!(predictions.len(), 3);

    let short_prediction = predictions[1].as_ref().unwrap();
    let span = short_prediction.decoded.query.conds[0].value.as_span().unwrap();
    assert!(span.end < short.len());

    let failure = predictions[2].as_ref().unwrap_err();
    assert!(!failure.is_fatal());

    let mut evaluator = Evaluator::default();
    let matches: Vec<_> = predictions
        .iter()
        .map(|p| match p {
            Ok(p) => evaluator.score("people", p.query(), &gold),
            Err(_) => evaluator.score_failure(),
        })
        .collect();
    assert_eq!(matches[0].lx, 1);
    assert_eq!(matches[1].lx, 1);
    assert_eq!(matches[2].lx, 0);

    let counts = evaluator.counts();
    assert_eq!(counts.total, 3);
    assert_eq!(counts.lx, 2);
    assert_eq!(counts.sel, 2);
}
