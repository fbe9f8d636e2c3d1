//! Configuration structures for the intake pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{IntakeError, Result};
use crate::extract::rules::vendor::VENDOR_MAX_LINE_CHARS;

/// Main configuration for the intake pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// PDF text loading configuration.
    pub pdf: PdfConfig,

    /// Sender filtering and run mode.
    pub intake: IntakeSettings,

    /// Ledger and review output files.
    pub ledger: LedgerConfig,
}

/// Field extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Input text beyond this many characters is ignored.
    pub max_input_chars: usize,

    /// Longest line (in characters) accepted as a vendor name.
    pub vendor_max_line_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_input_chars: 500_000,
            vendor_max_line_chars: VENDOR_MAX_LINE_CHARS,
        }
    }
}

/// PDF text loading configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum pages to read text from (0 = unlimited).
    pub max_pages: u32,

    /// Below this many non-whitespace characters a PDF is treated as a scan.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_pages: 3,
            min_text_length: 30,
        }
    }
}

/// Sender filtering and run mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeSettings {
    /// Accepted sender addresses; empty accepts everyone.
    pub allowlisted_senders: Vec<String>,

    /// Extract and report without writing ledger or review files.
    pub dry_run: bool,
}

impl IntakeSettings {
    /// Whether documents from `sender` should be processed.
    pub fn accepts_sender(&self, sender: Option<&str>) -> bool {
        if self.allowlisted_senders.is_empty() {
            return true;
        }
        let Some(sender) = sender else {
            return false;
        };
        let sender = sender.trim().to_lowercase();
        self.allowlisted_senders
            .iter()
            .any(|allowed| allowed.trim().to_lowercase() == sender)
    }
}

/// Ledger and review output files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// CSV file receiving ledger-ready rows.
    pub ledger_file: PathBuf,

    /// CSV file receiving documents that need manual review.
    pub todos_file: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            ledger_file: PathBuf::from("ledger.csv"),
            todos_file: PathBuf::from("todos.csv"),
        }
    }
}

impl IntakeConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| IntakeError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load configuration from a JSON file, or defaults if it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| IntakeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = IntakeConfig::load_or_default(&dir.path().join("missing.json")).unwrap();
        assert_eq!(config, IntakeConfig::default());
        assert_eq!(config.extraction.vendor_max_line_chars, 80);
        assert_eq!(config.pdf.max_pages, 3);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "intake": { "allowlisted_senders": ["billing@example.com"] } }"#,
        )
        .unwrap();

        let config = IntakeConfig::load_or_default(&path).unwrap();
        assert_eq!(config.intake.allowlisted_senders, vec!["billing@example.com"]);
        assert_eq!(config.ledger, LedgerConfig::default());
        assert!(!config.intake.dry_run);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = IntakeConfig::default();
        config.extraction.max_input_chars = 1_000;
        config.save(&path).unwrap();

        assert_eq!(IntakeConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            IntakeConfig::from_file(&path),
            Err(IntakeError::Config(_))
        ));
    }

    #[test]
    fn test_allowlist() {
        let settings = IntakeSettings {
            allowlisted_senders: vec!["Billing@Example.com".to_string()],
            dry_run: false,
        };
        assert!(settings.accepts_sender(Some("billing@example.com")));
        assert!(!settings.accepts_sender(Some("spam@example.com")));
        assert!(!settings.accepts_sender(None));
        assert!(IntakeSettings::default().accepts_sender(None));
    }
}
