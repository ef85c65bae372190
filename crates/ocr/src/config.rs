use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::types::{Binarization, DocumentPolicy, PageSegMode};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Largest accepted `upscale_factor`.
pub const MAX_UPSCALE_FACTOR: u32 = 8;

/// Static settings for one pipeline instance. Every field has a default, so a
/// config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub page_segmentation: PageSegMode,
    pub binarization: Binarization,
    /// Upscale factor applied before binarization. 1 disables resizing.
    pub upscale_factor: u32,
    /// Median filter radius. 0 disables denoising.
    pub denoise_radius: u32,
    /// Shorter trimmed lines are treated as noise.
    pub min_line_length: usize,
    pub document_policy: DocumentPolicy,
    /// Upper bound on preprocessing + OCR, in seconds. 0 waits forever.
    pub ocr_timeout_secs: u64,
    /// Tesseract language pack.
    pub language: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            page_segmentation: PageSegMode::SingleBlock,
            binarization: Binarization::default(),
            upscale_factor: 2,
            denoise_radius: 1,
            min_line_length: 10,
            document_policy: DocumentPolicy::Optional,
            ocr_timeout_secs: 60,
            language: "spa".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upscale_factor == 0 {
            return Err(ConfigError::Invalid("upscale_factor must be at least 1".into()));
        }
        if self.upscale_factor > MAX_UPSCALE_FACTOR {
            return Err(ConfigError::Invalid(format!(
                "upscale_factor must be at most {MAX_UPSCALE_FACTOR}"
            )));
        }
        if self.min_line_length == 0 {
            return Err(ConfigError::Invalid("min_line_length must be at least 1".into()));
        }
        if let Binarization::Adaptive { block_radius: 0 } = self.binarization {
            return Err(ConfigError::Invalid("block_radius must be at least 1".into()));
        }
        if self.language.trim().is_empty() {
            return Err(ConfigError::Invalid("language must not be empty".into()));
        }
        Ok(())
    }

    pub fn ocr_timeout(&self) -> Option<Duration> {
        (self.ocr_timeout_secs > 0).then(|| Duration::from_secs(self.ocr_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        let c = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(c, PipelineConfig::default());
        assert_eq!(c.min_line_length, 10);
        assert_eq!(c.ocr_timeout(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn fixed_threshold_from_toml() {
        let c = PipelineConfig::from_toml_str(
            r#"
            page_segmentation = "single_column"
            min_line_length = 12
            document_policy = "required"

            [binarization]
            mode = "fixed"
            cutoff = 140
            "#,
        )
        .unwrap();
        assert_eq!(c.binarization, Binarization::Fixed { cutoff: 140 });
        assert_eq!(c.page_segmentation, PageSegMode::SingleColumn);
        assert_eq!(c.document_policy, DocumentPolicy::Required);
        assert_eq!(c.min_line_length, 12);
        assert_eq!(c.upscale_factor, 2);
    }

    #[test]
    fn fixed_threshold_cutoff_defaults_to_150() {
        let c = PipelineConfig::from_toml_str("[binarization]\nmode = \"fixed\"\n").unwrap();
        assert_eq!(c.binarization, Binarization::Fixed { cutoff: 150 });
    }

    #[test]
    fn zero_timeout_disables_it() {
        let c = PipelineConfig::from_toml_str("ocr_timeout_secs = 0").unwrap();
        assert_eq!(c.ocr_timeout(), None);
    }

    #[test]
    fn rejects_zero_upscale() {
        let err = PipelineConfig::from_toml_str("upscale_factor = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_huge_upscale() {
        let err = PipelineConfig::from_toml_str("upscale_factor = 100000").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(PipelineConfig::from_toml_str("upscale_factor = 8").is_ok());
    }

    #[test]
    fn rejects_unknown_binarization_mode() {
        let err = PipelineConfig::from_toml_str("[binarization]\nmode = \"otsu\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn sample_config_matches_defaults() {
        let c = PipelineConfig::from_toml_str(include_str!("../../../extracto.toml")).unwrap();
        assert_eq!(c, PipelineConfig::default());
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "denoise_radius = 0").unwrap();
        let c = PipelineConfig::load(file.path()).unwrap();
        assert_eq!(c.denoise_radius, 0);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PipelineConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
