use std::fs::File;
use std::io::Write;
use std::path::Path;

use extracto_core::TransactionTable;
use rust_xlsxwriter::{Format, Workbook, XlsxError};

/// Sheet name used for the workbook export.
pub const SHEET_NAME: &str = "Transacciones";

/// Output format picked from the destination's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xlsx") => FileFormat::Xlsx,
            _ => FileFormat::Csv,
        }
    }
}

/// One sheet: a header row, then one row per record. No index column.
pub fn write_csv<W: Write>(writer: W, table: &TransactionTable) -> Result<(), csv::Error> {
    let mut w = csv::Writer::from_writer(writer);
    w.write_record(TransactionTable::COLUMNS)?;
    for r in table {
        w.write_record([
            r.date.to_string(),
            r.description.clone(),
            r.amount.to_string(),
            r.document_id.clone(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_csv_file(path: &Path, table: &TransactionTable) -> Result<(), csv::Error> {
    let file = File::create(path)?;
    write_csv(file, table)
}

/// One `Transacciones` sheet with a header row. MONTO is a numeric cell shown
/// with two decimals; DOCUMENTO is a text cell so leading zeros survive.
pub fn build_workbook(table: &TransactionTable) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let amount = Format::new().set_num_format("0.00");

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    for (col, name) in (0u16..).zip(TransactionTable::COLUMNS) {
        sheet.write_string_with_format(0, col, name, &header)?;
    }
    for (row, r) in (1u32..).zip(table) {
        sheet.write_string(row, 0, r.date.to_string())?;
        sheet.write_string(row, 1, &r.description)?;
        sheet.write_number_with_format(row, 2, r.amount.to_f64(), &amount)?;
        sheet.write_string(row, 3, &r.document_id)?;
    }
    Ok(workbook)
}

pub fn write_xlsx_file(path: &Path, table: &TransactionTable) -> Result<(), XlsxError> {
    build_workbook(table)?.save(path)
}

/// Fixed-width text table for the terminal.
pub fn render_text(table: &TransactionTable) -> String {
    let rows: Vec<[String; 4]> = table
        .iter()
        .map(|r| {
            [
                r.date.to_string(),
                r.description.clone(),
                r.amount.to_string(),
                r.document_id.clone(),
            ]
        })
        .collect();

    let mut widths = TransactionTable::COLUMNS.map(|c| c.chars().count());
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header = TransactionTable::COLUMNS.map(str::to_string);
    for row in std::iter::once(&header).chain(rows.iter()) {
        let line = format!(
            "{:<w0$}  {:<w1$}  {:>w2$}  {}",
            row[0],
            row[1],
            row[2],
            row[3],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
