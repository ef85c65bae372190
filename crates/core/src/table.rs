use serde::{Deserialize, Serialize};

use crate::record::{ExtractionWarning, TransactionRecord};

/// Per-call counters describing how much of the OCR text turned into records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub lines_seen: usize,
    pub candidates: usize,
    /// Lines with a date anchor but no amount anchor.
    pub dropped_without_amount: usize,
    /// Lines rejected because the document identifier was required but missing.
    pub dropped_without_document: usize,
    pub warnings: Vec<ExtractionWarning>,
}

/// One output row with the report's column names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRow {
    #[serde(rename = "FECHA")]
    pub fecha: String,
    #[serde(rename = "DESCRIPCION")]
    pub descripcion: String,
    #[serde(rename = "MONTO")]
    pub monto: f64,
    #[serde(rename = "DOCUMENTO")]
    pub documento: String,
}

impl From<&TransactionRecord> for OutputRow {
    fn from(r: &TransactionRecord) -> Self {
        OutputRow {
            fecha: r.date.to_string(),
            descripcion: r.description.clone(),
            monto: r.amount.to_f64(),
            documento: r.document_id.clone(),
        }
    }
}

/// Records in source-line order. Append-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionTable {
    records: Vec<TransactionRecord>,
    report: ExtractionReport,
}

impl TransactionTable {
    pub const COLUMNS: [&'static str; 4] = ["FECHA", "DESCRIPCION", "MONTO", "DOCUMENTO"];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: TransactionRecord, warnings: Vec<ExtractionWarning>) {
        self.records.push(record);
        self.report.warnings.extend(warnings);
    }

    pub fn report_mut(&mut self) -> &mut ExtractionReport {
        &mut self.report
    }

    pub fn report(&self) -> &ExtractionReport {
        &self.report
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TransactionRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// An empty table means no transaction-shaped lines were recognized. It is not an error.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.report.warnings.len()
    }

    pub fn is_degraded(&self) -> bool {
        self.warning_count() > 0
    }

    pub fn rows(&self) -> Vec<OutputRow> {
        self.records.iter().map(OutputRow::from).collect()
    }

    pub fn into_records(self) -> Vec<TransactionRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a TransactionTable {
    type Item = &'a TransactionRecord;
    type IntoIter = std::slice::Iter<'a, TransactionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ExtractedRow, WarningField};

    fn record(line_no: usize, date: &str, amount: &str) -> (TransactionRecord, Vec<ExtractionWarning>) {
        TransactionRecord::from_row(&ExtractedRow {
            line_no,
            date,
            time: None,
            description: "PAGO",
            amount,
            document: "007",
        })
    }

    #[test]
    fn empty_table_is_not_degraded() {
        let t = TransactionTable::new();
        assert!(t.is_empty());
        assert_eq!(t.len(), 0);
        assert!(!t.is_degraded());
        assert!(t.rows().is_empty());
    }

    #[test]
    fn push_preserves_order_and_collects_warnings() {
        let mut t = TransactionTable::new();
        let (a, wa) = record(1, "2022-09-05", "1.00");
        let (b, wb) = record(2, "2022-02-30", "2.00");
        t.push(a, wa);
        t.push(b, wb);

        let lines: Vec<usize> = t.iter().map(|r| r.line_no).collect();
        assert_eq!(lines, vec![1, 2]);
        assert_eq!(t.warning_count(), 1);
        assert!(t.is_degraded());
        assert_eq!(t.report().warnings[0].field, WarningField::Date);
    }

    #[test]
    fn rows_use_report_column_names() {
        let mut t = TransactionTable::new();
        let (a, wa) = record(1, "2022-09-05", "4800.00");
        t.push(a, wa);

        let json = serde_json::to_value(t.rows()).unwrap();
        assert_eq!(json[0]["FECHA"], "05/09/2022");
        assert_eq!(json[0]["DESCRIPCION"], "PAGO");
        assert_eq!(json[0]["MONTO"], 4800.0);
        assert_eq!(json[0]["DOCUMENTO"], "007");
    }
}
