use sqldecode::{
    normalize::{chn_to_sum, num2char},
    table::format_number,
};

/// The conversion direction.
#[derive(Debug, Clone, Copy)]
pub enum NumeralMode {
    ToChinese,
    ToArabic,
}

/// Mode selection for the numeral command.
#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
pub struct NumeralModeArgs {
    /// Convert Arabic numbers to Chinese numerals.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    to_chinese: bool,

    /// Convert Chinese numerals to Arabic numbers.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    to_arabic: bool,
}

impl NumeralModeArgs {
    /// Get the conversion mode.
    pub fn mode(&self) -> NumeralMode {
        if self.to_arabic {
            NumeralMode::ToArabic
        } else {
            debug_assert!(self.to_chinese);
            NumeralMode::ToChinese
        }
    }
}

/// Args for the numeral command.
#[derive(clap::Args, Debug)]
pub struct NumeralArgs {
    /// Values to convert.
    #[arg(required = true)]
    values: Vec<String>,

    #[command(flatten)]
    mode: NumeralModeArgs,
}

impl NumeralArgs {
    /// Run the numeral command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let mode = self.mode.mode();
        for value in &self.values {
            let converted = match mode {
                NumeralMode::ToChinese => num2char(value)?,
                NumeralMode::ToArabic => format_number(chn_to_sum(value)?),
            };
            println!("{value}\t{converted}");
        }
        Ok(())
    }
}
