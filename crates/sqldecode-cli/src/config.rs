use sqldecode::{decoders::DecodeOptions, matching::MatchOptions, scoring::EvalOptions};

use crate::input_output::open_path;

/// Options read from a `--config` JSON file; missing sections take defaults.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Score decoding.
    pub decode: DecodeOptions,

    /// Value grounding.
    pub matching: MatchOptions,

    /// Evaluation.
    pub eval: EvalOptions,
}

/// Config file arg group.
#[derive(clap::Args, Debug)]
pub struct ConfigArgs {
    /// JSON config with `decode`, `matching`, and `eval` sections.
    #[arg(long, default_value = None)]
    config: Option<String>,
}

impl ConfigArgs {
    /// Load the config, or the defaults when none is given.
    pub fn load(&self) -> Result<CliConfig, Box<dyn std::error::Error>> {
        let Some(path) = &self.config else {
            return Ok(CliConfig::default());
        };
        let config: CliConfig = serde_json::from_reader(open_path(path)?)?;
        log::debug!("config: {config:?}");
        Ok(config)
    }
}
