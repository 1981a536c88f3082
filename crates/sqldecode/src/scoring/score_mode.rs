//! # Scoring Mode

use std::str::FromStr;

use crate::errors::SqlDecodeError;

/// How gold slots line up with predicted slots.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum_macros::Display,
    strum_macros::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScoreMode {
    /// Predictions were decoded under gold columns; no permutation.
    Train,

    /// Gold slots are permuted into ascending column order first.
    #[default]
    Test,
}

impl FromStr for ScoreMode {
    type Err = SqlDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "train" => Ok(ScoreMode::Train),
            "test" => Ok(ScoreMode::Test),
            _ => Err(SqlDecodeError::InvalidMode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("train".parse::<ScoreMode>().unwrap(), ScoreMode::Train);
        assert_eq!("test".parse::<ScoreMode>().unwrap(), ScoreMode::Test);
        assert!(matches!(
            "eval".parse::<ScoreMode>(),
            Err(SqlDecodeError::InvalidMode(m)) if m == "eval"
        ));
        assert!("Test".parse::<ScoreMode>().is_err());
    }

    #[test]
    fn test_display_and_json() {
        assert_eq!(ScoreMode::Train.to_string(), "train");
        assert_eq!(serde_json::to_string(&ScoreMode::Test).unwrap(), "\"test\"");
    }
}
