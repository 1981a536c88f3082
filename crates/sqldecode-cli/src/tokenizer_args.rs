use sqldecode::alignment::{WordPieceTokenizer, WordPieceVocab};

/// WordPiece tokenizer arg group.
#[derive(clap::Args, Debug)]
pub struct TokenizerArgs {
    /// WordPiece vocabulary file, one token per line.
    #[arg(long)]
    vocab: String,

    /// Keep case; questions are lowercased by default.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    cased: bool,
}

impl TokenizerArgs {
    /// Load the tokenizer.
    pub fn load_tokenizer(&self) -> Result<WordPieceTokenizer, Box<dyn std::error::Error>> {
        let vocab = WordPieceVocab::load_vocab_path(&self.vocab)?;
        log::info!("vocab: {} ({} tokens)", self.vocab, vocab.len());
        Ok(WordPieceTokenizer::new(vocab, !self.cased))
    }
}
