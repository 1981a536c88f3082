mod decode;
mod numeral;
mod spans;

/// Subcommands for sqldecode
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Decode encoder scores into queries, and optionally score them.
    Decode(decode::DecodeArgs),

    /// Compute gold sub-word value spans for a dataset.
    Spans(spans::SpansArgs),

    /// Convert numbers between Arabic and Chinese forms.
    Numeral(numeral::NumeralArgs),
}

impl Commands {
    /// Run the subcommand.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Commands::Decode(cmd) => cmd.run(),
            Commands::Spans(cmd) => cmd.run(),
            Commands::Numeral(cmd) => cmd.run(),
        }
    }
}
