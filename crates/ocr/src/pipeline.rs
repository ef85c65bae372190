use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use extracto_core::{TransactionRecord, TransactionTable};
use image::GrayImage;
use thiserror::Error;

use crate::classify::LineClassifier;
use crate::config::PipelineConfig;
use crate::extract::{FieldExtractor, LineRejection};
use crate::preprocess::{self, PreprocessError, PreprocessOptions};
use crate::recognizer::{OcrBackend, OcrError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unreadable image: {0}")]
    UnreadableImage(String),
    #[error("Image preprocessing failed: {0}")]
    Preprocess(PreprocessError),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
    #[error("OCR did not finish within {0:?}")]
    OcrTimeout(Duration),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("OCR worker failed: {0}")]
    Worker(String),
}

impl From<PreprocessError> for PipelineError {
    fn from(e: PreprocessError) -> Self {
        match e {
            PreprocessError::Load(_) | PreprocessError::Empty => {
                PipelineError::UnreadableImage(e.to_string())
            }
            PreprocessError::Encode(_) => PipelineError::Preprocess(e),
        }
    }
}

/// The result of processing one scanned page.
#[derive(Debug)]
pub struct StatementResult {
    /// Raw OCR text output.
    pub ocr_text: String,
    /// Dimensions of the bitmap handed to the OCR engine.
    pub prepared_size: (u32, u32),
    pub table: TransactionTable,
}

// ── Text phases ───────────────────────────────────────────────────────────────

/// classify → date anchor → amount anchor → description/document → normalize.
/// Line-level problems are counted in the table's report, never returned.
pub fn parse_text(text: &str, config: &PipelineConfig) -> TransactionTable {
    let classifier = LineClassifier::new(config.min_line_length);
    let extractor = FieldExtractor::new(config.document_policy);

    let mut table = TransactionTable::new();
    let candidates = classifier.classify(text);
    {
        let report = table.report_mut();
        report.lines_seen = text.lines().count();
        report.candidates = candidates.len();
    }

    for candidate in &candidates {
        match extractor.extract(candidate) {
            Ok(row) => {
                let (record, warnings) = TransactionRecord::from_row(&row);
                for w in &warnings {
                    tracing::warn!("{w}");
                }
                table.push(record, warnings);
            }
            Err(LineRejection::NoAmountAnchor) => {
                tracing::debug!(line = candidate.line_no, "dropped row without amount");
                table.report_mut().dropped_without_amount += 1;
            }
            Err(LineRejection::NoDocument) => {
                tracing::debug!(line = candidate.line_no, "dropped row without document");
                table.report_mut().dropped_without_document += 1;
            }
            // The classifier already required a date, so this only happens if the
            // two patterns drift apart.
            Err(LineRejection::NoDateAnchor) => {
                tracing::debug!(line = candidate.line_no, "dropped row without date");
            }
        }
    }

    table
}

// ── Image phases ──────────────────────────────────────────────────────────────

fn recognize_page<R: OcrBackend + ?Sized>(
    recognizer: &R,
    data: &[u8],
    config: &PipelineConfig,
) -> Result<(String, (u32, u32)), PipelineError> {
    let img = preprocess::decode(data)?;
    let prepared = preprocess::prepare(&img, &PreprocessOptions::from(config));
    recognize_prepared(recognizer, &prepared, config)
}

fn recognize_prepared<R: OcrBackend + ?Sized>(
    recognizer: &R,
    prepared: &GrayImage,
    config: &PipelineConfig,
) -> Result<(String, (u32, u32)), PipelineError> {
    let size = prepared.dimensions();
    tracing::info!(width = size.0, height = size.1, "prepared page for OCR");
    let png = preprocess::encode_as_png(prepared)?;
    let text = recognizer.recognize(&png, config.page_segmentation)?;
    Ok((text, size))
}

/// Orchestrates: decode → preprocess → OCR → classify → extract → normalize.
/// Holds only static configuration; every call owns its buffers and table.
pub struct StatementPipeline<R: OcrBackend> {
    recognizer: Arc<R>,
    config: PipelineConfig,
}

impl<R: OcrBackend + 'static> StatementPipeline<R> {
    pub fn new(recognizer: R, config: PipelineConfig) -> Self {
        Self { recognizer: Arc::new(recognizer), config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run only the text phases on OCR output obtained elsewhere.
    pub fn parse_text(&self, text: &str) -> TransactionTable {
        parse_text(text, &self.config)
    }

    /// Decode and preprocess without running OCR. Useful for tuning thresholds.
    pub fn prepare_image(&self, data: &[u8]) -> Result<GrayImage, PipelineError> {
        let img = preprocess::decode(data)?;
        Ok(preprocess::prepare(&img, &PreprocessOptions::from(&self.config)))
    }

    /// Full pipeline on the calling thread. Blocks for the duration of the OCR call.
    pub fn process_bytes_blocking(&self, data: &[u8]) -> Result<StatementResult, PipelineError> {
        let (ocr_text, prepared_size) = recognize_page(self.recognizer.as_ref(), data, &self.config)?;
        Ok(self.finish(ocr_text, prepared_size))
    }

    /// Full pipeline with preprocessing and OCR moved to the blocking pool and
    /// bounded by the configured timeout. A timed-out OCR call is abandoned, not
    /// interrupted: its thread runs to completion in the background.
    pub async fn process_bytes(&self, data: &[u8]) -> Result<StatementResult, PipelineError> {
        let recognizer = Arc::clone(&self.recognizer);
        let config = self.config.clone();
        let data = data.to_vec();
        let job = tokio::task::spawn_blocking(move || {
            recognize_page(recognizer.as_ref(), &data, &config)
        });
        self.await_ocr(job).await
    }

    /// OCR and extraction on an image already returned by [`Self::prepare_image`].
    /// Only the OCR call counts against the timeout.
    pub async fn process_prepared(&self, prepared: GrayImage) -> Result<StatementResult, PipelineError> {
        let recognizer = Arc::clone(&self.recognizer);
        let config = self.config.clone();
        let job = tokio::task::spawn_blocking(move || {
            recognize_prepared(recognizer.as_ref(), &prepared, &config)
        });
        self.await_ocr(job).await
    }

    async fn await_ocr(
        &self,
        job: tokio::task::JoinHandle<Result<(String, (u32, u32)), PipelineError>>,
    ) -> Result<StatementResult, PipelineError> {
        let joined = match self.config.ocr_timeout() {
            Some(limit) => tokio::time::timeout(limit, job)
                .await
                .map_err(|_| PipelineError::OcrTimeout(limit))?,
            None => job.await,
        };
        let (ocr_text, prepared_size) =
            joined.map_err(|e| PipelineError::Worker(e.to_string()))??;

        Ok(self.finish(ocr_text, prepared_size))
    }

    /// Process a file on disk.
    pub async fn process_file(&self, path: &Path) -> Result<StatementResult, PipelineError> {
        let bytes = tokio::fs::read(path).await?;
        self.process_bytes(&bytes).await
    }

    fn finish(&self, ocr_text: String, prepared_size: (u32, u32)) -> StatementResult {
        let table = self.parse_text(&ocr_text);
        tracing::info!(
            records = table.len(),
            warnings = table.warning_count(),
            "extracted transactions"
        );
        StatementResult { ocr_text, prepared_size, table }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
