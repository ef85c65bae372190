use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

/// Raw field slices located on a single OCR line, before any type coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractedRow<'a> {
    /// 1-based line number in the OCR text.
    pub line_no: usize,
    pub date: &'a str,
    pub time: Option<&'a str>,
    pub description: &'a str,
    pub amount: &'a str,
    pub document: &'a str,
}

/// The date column of a record. Dates that fail to parse keep their source token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordDate {
    Parsed(NaiveDate),
    Raw(String),
}

impl RecordDate {
    pub fn parsed(&self) -> Option<NaiveDate> {
        match self {
            RecordDate::Parsed(d) => Some(*d),
            RecordDate::Raw(_) => None,
        }
    }
}

impl fmt::Display for RecordDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordDate::Parsed(d) => write!(f, "{}", d.format("%d/%m/%Y")),
            RecordDate::Raw(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningField {
    Date,
    Amount,
}

impl fmt::Display for WarningField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningField::Date => write!(f, "FECHA"),
            WarningField::Amount => write!(f, "MONTO"),
        }
    }
}

/// A field that could not be coerced and fell back to its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionWarning {
    pub line_no: usize,
    pub field: WarningField,
    pub raw: String,
}

impl fmt::Display for ExtractionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: could not convert {} value '{}'", self.line_no, self.field, self.raw)
    }
}

/// One transaction row of the printed report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub line_no: usize,
    pub date: RecordDate,
    pub time: Option<NaiveTime>,
    pub description: String,
    pub amount: Money,
    /// Kept as text so leading zeros survive.
    pub document_id: String,
}

impl TransactionRecord {
    /// Normalize an extracted row. Never fails: a bad date keeps its raw text and a
    /// bad amount becomes zero, each reported as a warning.
    pub fn from_row(row: &ExtractedRow<'_>) -> (TransactionRecord, Vec<ExtractionWarning>) {
        let mut warnings = Vec::new();

        let date = match NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d") {
            Ok(d) => RecordDate::Parsed(d),
            Err(_) => {
                warnings.push(ExtractionWarning {
                    line_no: row.line_no,
                    field: WarningField::Date,
                    raw: row.date.to_string(),
                });
                RecordDate::Raw(row.date.trim().to_string())
            }
        };

        // Not an output column, so an unreadable time is dropped quietly.
        let time = row.time.and_then(|t| {
            let t = t.trim();
            NaiveTime::parse_from_str(t, "%H:%M:%S")
                .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M"))
                .ok()
        });

        let amount = Money::parse(row.amount).unwrap_or_else(|| {
            warnings.push(ExtractionWarning {
                line_no: row.line_no,
                field: WarningField::Amount,
                raw: row.amount.to_string(),
            });
            Money::zero()
        });

        let record = TransactionRecord {
            line_no: row.line_no,
            date,
            time,
            description: row.description.trim().to_string(),
            amount,
            document_id: row.document.trim().to_string(),
        };
        (record, warnings)
    }
}
