//! Output format value object

use serde::{Deserialize, Serialize};

/// How transcripts and council results are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Whole transcripts, every ranking and the synthesis (default)
    #[default]
    Full,
    /// Only the latest reply, or only the chairman's answer
    Synthesis,
    /// Machine-readable JSON
    Json,
}

impl OutputFormat {
    pub fn is_json(&self) -> bool {
        matches!(self, OutputFormat::Json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_full() {
        assert_eq!(OutputFormat::default(), OutputFormat::Full);
    }

    #[test]
    fn test_serialize_lowercase() {
        let json = serde_json::to_string(&OutputFormat::Synthesis).unwrap();
        assert_eq!(json, "\"synthesis\"");
    }

    #[test]
    fn test_deserialize_lowercase() {
        let format: OutputFormat = serde_json::from_str("\"json\"").unwrap();
        assert!(format.is_json());
    }
}
