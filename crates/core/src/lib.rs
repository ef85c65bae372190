pub mod money;
pub mod record;
pub mod table;

pub use money::Money;
pub use record::{ExtractedRow, ExtractionWarning, RecordDate, TransactionRecord, WarningField};
pub use table::{ExtractionReport, OutputRow, TransactionTable};
