use std::path::Path;

use anyhow::{Context, Result};
use extracto_core::TransactionTable;
use extracto_ocr::{
    Binarization, DocumentPolicy, OcrBackend, PipelineConfig, StatementPipeline,
};

use crate::export;
use crate::{OutputArgs, ParseArgs, ThresholdMode, TuningArgs};

pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(p) => PipelineConfig::load(p)
            .with_context(|| format!("Failed to load config {}", p.display())),
        None => Ok(PipelineConfig::default()),
    }
}

/// Layer command-line flags over the file config.
pub fn apply_overrides(
    mut config: PipelineConfig,
    parse: &ParseArgs,
    tuning: Option<&TuningArgs>,
) -> Result<PipelineConfig> {
    if let Some(n) = parse.min_line_length {
        config.min_line_length = n;
    }
    if parse.require_document {
        config.document_policy = DocumentPolicy::Required;
    }

    if let Some(t) = tuning {
        let cutoff = t.cutoff.or(match config.binarization {
            Binarization::Fixed { cutoff } => Some(cutoff),
            Binarization::Adaptive { .. } => None,
        });
        match (t.threshold, cutoff) {
            (Some(ThresholdMode::Adaptive), _) => {
                if !matches!(config.binarization, Binarization::Adaptive { .. }) {
                    config.binarization = Binarization::default();
                }
            }
            // A cutoff on its own implies the fixed strategy.
            (Some(ThresholdMode::Fixed), c) | (None, c @ Some(_)) => {
                config.binarization = Binarization::Fixed {
                    cutoff: c.unwrap_or(extracto_ocr::types::DEFAULT_CUTOFF),
                };
            }
            (None, None) => {}
        }
        if let Some(f) = t.upscale {
            config.upscale_factor = f;
        }
    }

    config.validate()?;
    Ok(config)
}

#[cfg(feature = "tesseract")]
fn backend(config: &PipelineConfig, tessdata: Option<String>) -> impl OcrBackend + 'static {
    extracto_ocr::TesseractRecognizer::new(tessdata, &config.language)
}

#[cfg(not(feature = "tesseract"))]
fn backend(_config: &PipelineConfig, _tessdata: Option<String>) -> impl OcrBackend + 'static {
    extracto_ocr::UnavailableRecognizer
}

pub async fn extract(
    image: &Path,
    config: PipelineConfig,
    save_prepared: Option<&Path>,
    tessdata: Option<String>,
    output: &OutputArgs,
) -> Result<()> {
    let bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("Failed to read {}", image.display()))?;
    let pipeline = StatementPipeline::new(backend(&config, tessdata), config);

    let result = match save_prepared {
        Some(dest) => {
            let prepared = pipeline.prepare_image(&bytes)?;
            prepared
                .save(dest)
                .with_context(|| format!("Failed to write {}", dest.display()))?;
            tracing::info!("Prepared image written to {}", dest.display());
            pipeline.process_prepared(prepared).await?
        }
        None => pipeline.process_bytes(&bytes).await?,
    };
    emit(&result.table, output)
}

pub fn parse(text_path: &Path, config: &PipelineConfig, output: &OutputArgs) -> Result<()> {
    let text = std::fs::read_to_string(text_path)
        .with_context(|| format!("Failed to read {}", text_path.display()))?;
    let table = extracto_ocr::parse_text(&text, config);
    emit(&table, output)
}

fn emit(table: &TransactionTable, output: &OutputArgs) -> Result<()> {
    if table.is_empty() {
        eprintln!("No transactions recognized. Check that the image is sharp and the report has dated rows.");
    }
    if table.is_degraded() {
        tracing::warn!(
            "{} value(s) could not be converted; extraction is degraded",
            table.warning_count()
        );
    }

    if let Some(path) = &output.output {
        match export::FileFormat::from_path(path) {
            export::FileFormat::Xlsx => export::write_xlsx_file(path, table)
                .with_context(|| format!("Failed to write {}", path.display()))?,
            export::FileFormat::Csv => export::write_csv_file(path, table)
                .with_context(|| format!("Failed to write {}", path.display()))?,
        }
        tracing::info!("{} row(s) written to {}", table.len(), path.display());
    } else if output.json {
        println!("{}", serde_json::to_string_pretty(&table.rows())?);
    } else if !table.is_empty() {
        print!("{}", export::render_text(table));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutoff_alone_selects_fixed_threshold() {
        let tuning = TuningArgs { cutoff: Some(120), ..TuningArgs::default() };
        let c = apply_overrides(PipelineConfig::default(), &ParseArgs::default(), Some(&tuning)).unwrap();
        assert_eq!(c.binarization, Binarization::Fixed { cutoff: 120 });
    }

    #[test]
    fn fixed_without_cutoff_uses_default() {
        let tuning = TuningArgs { threshold: Some(ThresholdMode::Fixed), ..TuningArgs::default() };
        let c = apply_overrides(PipelineConfig::default(), &ParseArgs::default(), Some(&tuning)).unwrap();
        assert_eq!(c.binarization, Binarization::Fixed { cutoff: 150 });
    }

    #[test]
    fn adaptive_flag_overrides_fixed_config() {
        let base = PipelineConfig {
            binarization: Binarization::Fixed { cutoff: 90 },
            ..PipelineConfig::default()
        };
        let tuning = TuningArgs { threshold: Some(ThresholdMode::Adaptive), ..TuningArgs::default() };
        let c = apply_overrides(base, &ParseArgs::default(), Some(&tuning)).unwrap();
        assert_eq!(c.binarization, Binarization::default());
    }

    #[test]
    fn parse_flags_override_config() {
        let parse = ParseArgs { min_line_length: Some(20), require_document: true };
        let c = apply_overrides(PipelineConfig::default(), &parse, None).unwrap();
        assert_eq!(c.min_line_length, 20);
        assert_eq!(c.document_policy, DocumentPolicy::Required);
    }

    #[test]
    fn invalid_override_is_rejected() {
        let tuning = TuningArgs { upscale: Some(0), ..TuningArgs::default() };
        assert!(apply_overrides(PipelineConfig::default(), &ParseArgs::default(), Some(&tuning)).is_err());
        let tuning = TuningArgs { upscale: Some(100_000), ..TuningArgs::default() };
        assert!(apply_overrides(PipelineConfig::default(), &ParseArgs::default(), Some(&tuning)).is_err());
    }

    #[test]
    fn parse_command_writes_csv() {
        let dir = tempfile::tempdir().unwrap();
        let text = dir.path().join("ocr.txt");
        let csv = dir.path().join("out.csv");
        std::fs::write(&text, "2022-09-05 15:08 POSTGRADO FAC.POLITE 4800.00 31571483\n").unwrap();

        let output = OutputArgs { output: Some(csv.clone()), json: false };
        parse(&text, &PipelineConfig::default(), &output).unwrap();

        let written = std::fs::read_to_string(&csv).unwrap();
        assert_eq!(
            written,
            "FECHA,DESCRIPCION,MONTO,DOCUMENTO\n05/09/2022,POSTGRADO FAC.POLITE,4800.00,31571483\n"
        );
    }

    #[test]
    fn parse_command_writes_xlsx_by_extension() {
        use calamine::{open_workbook, Data, Reader, Xlsx};

        let dir = tempfile::tempdir().unwrap();
        let text = dir.path().join("ocr.txt");
        let xlsx = dir.path().join("out.xlsx");
        std::fs::write(&text, "2023-01-15 09:30 PAGO SERVICIOS AGUA 125.50 00012345 0-0 EXTRA\n").unwrap();

        let output = OutputArgs { output: Some(xlsx.clone()), json: false };
        parse(&text, &PipelineConfig::default(), &output).unwrap();

        let mut book: Xlsx<_> = open_workbook(&xlsx).unwrap();
        let range = book.worksheet_range(export::SHEET_NAME).unwrap();
        assert_eq!(range.get_value((1, 2)), Some(&Data::Float(125.5)));
        assert_eq!(range.get_value((1, 3)), Some(&Data::String("00012345".into())));
    }

    #[cfg(not(feature = "tesseract"))]
    #[tokio::test]
    async fn extract_saves_prepared_image_before_ocr() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("page.png");
        let prepared = dir.path().join("prepared.png");
        let gray = image::GrayImage::from_pixel(4, 4, image::Luma([200u8]));
        std::fs::write(&page, extracto_ocr::preprocess::encode_as_png(&gray).unwrap()).unwrap();

        let err = extract(&page, PipelineConfig::default(), Some(&prepared), None, &OutputArgs::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<extracto_ocr::PipelineError>(),
            Some(extracto_ocr::PipelineError::Ocr(extracto_ocr::OcrError::NotAvailable))
        ));
        let saved = image::open(&prepared).unwrap();
        assert_eq!((saved.width(), saved.height()), (8, 8));
    }

    #[test]
    fn load_config_without_path_is_default() {
        assert_eq!(load_config(None).unwrap(), PipelineConfig::default());
    }
}
