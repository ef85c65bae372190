use extracto_core::ExtractedRow;

use crate::patterns::{re_amount, re_date_anchor, re_leading_time};
use crate::types::{Candidate, DocumentPolicy};

/// Why a candidate line produced no row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRejection {
    NoDateAnchor,
    NoAmountAnchor,
    NoDocument,
}

/// The `YYYY-MM-DD [HH:MM]` token that opens a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateAnchor<'a> {
    pub date: &'a str,
    pub time: Option<&'a str>,
    /// Byte offset just past the anchor.
    pub end: usize,
}

/// The `1234.56` token that closes the description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountAnchor<'a> {
    pub value: &'a str,
    pub start: usize,
    pub end: usize,
}

// ── Anchors ──────────────────────────────────────────────────────────────────

pub fn locate_date_anchor(line: &str) -> Option<DateAnchor<'_>> {
    let c = re_date_anchor().captures(line)?;
    let whole = c.get(0)?;
    Some(DateAnchor {
        date: c.get(1)?.as_str(),
        time: c.get(2).map(|m| m.as_str()),
        end: whole.end(),
    })
}

/// Locate the amount at or after byte offset `from`.
///
/// Amounts always carry a decimal point while the document number never does,
/// so the last decimal token on the line is the amount and anything after it is
/// the trailing document. Decimal-then-integer pairs earlier in the line belong
/// to the description.
pub fn locate_amount_anchor(line: &str, from: usize) -> Option<AmountAnchor<'_>> {
    let chosen = re_amount()
        .find_iter(line)
        .filter(|m| m.start() >= from)
        .last()?;

    Some(AmountAnchor {
        value: chosen.as_str(),
        start: chosen.start(),
        end: chosen.end(),
    })
}

fn next_token(line: &str, from: usize) -> Option<&str> {
    line.get(from..)?.split_whitespace().next()
}

/// Drop a `HH:MM` left at the front of a description when the date anchor
/// did not absorb it.
pub fn strip_leading_time(s: &str) -> &str {
    let s = s.trim();
    match re_leading_time().find(s) {
        Some(m) => s[m.end()..].trim_start(),
        None => s,
    }
}

// ── Row extraction ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct FieldExtractor {
    document_policy: DocumentPolicy,
}

impl FieldExtractor {
    pub fn new(document_policy: DocumentPolicy) -> Self {
        Self { document_policy }
    }

    pub fn extract<'a>(&self, candidate: &Candidate<'a>) -> Result<ExtractedRow<'a>, LineRejection> {
        let line = candidate.text;

        let date = locate_date_anchor(line).ok_or(LineRejection::NoDateAnchor)?;
        let amount = locate_amount_anchor(line, date.end).ok_or(LineRejection::NoAmountAnchor)?;

        let description = strip_leading_time(&line[date.end..amount.start]);
        let document = next_token(line, amount.end).unwrap_or("");

        if document.is_empty() && self.document_policy == DocumentPolicy::Required {
            return Err(LineRejection::NoDocument);
        }

        Ok(ExtractedRow {
            line_no: candidate.line_no,
            date: date.date,
            time: date.time,
            description,
            amount: amount.value,
            document,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
