use serde::{Deserialize, Serialize};

/// A raw OCR line that looks like a transaction row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    /// 1-based line number in the OCR text.
    pub line_no: usize,
    /// The line, trimmed.
    pub text: &'a str,
}

/// Layout hint handed to the OCR engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSegMode {
    /// Fully automatic page segmentation.
    Auto,
    /// A single column of text of variable sizes.
    SingleColumn,
    /// One uniform block of text. Suits table-like printouts.
    #[default]
    SingleBlock,
}

impl PageSegMode {
    /// The numeric `--psm` value Tesseract uses for this mode.
    pub fn tesseract_psm(self) -> u8 {
        match self {
            PageSegMode::Auto => 3,
            PageSegMode::SingleColumn => 4,
            PageSegMode::SingleBlock => 6,
        }
    }
}

/// How the grayscale page is turned into black and white.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Binarization {
    /// Local mean threshold over a square block. Tolerates uneven lighting.
    Adaptive {
        #[serde(default = "default_block_radius")]
        block_radius: u32,
    },
    /// Global cutoff: pixels brighter than `cutoff` become white.
    Fixed {
        #[serde(default = "default_cutoff")]
        cutoff: u8,
    },
}

pub const DEFAULT_BLOCK_RADIUS: u32 = 15;
pub const DEFAULT_CUTOFF: u8 = 150;

fn default_block_radius() -> u32 {
    DEFAULT_BLOCK_RADIUS
}

fn default_cutoff() -> u8 {
    DEFAULT_CUTOFF
}

impl Default for Binarization {
    fn default() -> Self {
        Binarization::Adaptive { block_radius: DEFAULT_BLOCK_RADIUS }
    }
}

/// Whether a row with nothing after its amount still becomes a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentPolicy {
    /// Emit the record with an empty DOCUMENTO.
    #[default]
    Optional,
    /// Drop the line.
    Required,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_block_is_psm_6() {
        assert_eq!(PageSegMode::default(), PageSegMode::SingleBlock);
        assert_eq!(PageSegMode::SingleBlock.tesseract_psm(), 6);
        assert_eq!(PageSegMode::Auto.tesseract_psm(), 3);
    }

    #[test]
    fn binarization_defaults_to_adaptive() {
        assert_eq!(
            Binarization::default(),
            Binarization::Adaptive { block_radius: 15 }
        );
    }

    #[test]
    fn document_policy_defaults_to_optional() {
        assert_eq!(DocumentPolicy::default(), DocumentPolicy::Optional);
    }
}
