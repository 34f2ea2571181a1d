//! Result types produced by the two pipelines.
//!
//! The receipt indexer works in terms of [`ParsedReceipt`] (what the model
//! told us) and [`IndexRow`] (what lands in the CSV). The archive converter
//! reports an [`ArchiveEntry`] per converted message. Both pipelines return a
//! stats struct so callers can print a summary without re-reading outputs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The sentinel written for any value that is absent or unparseable.
pub const UNKNOWN: &str = "N/A";

/// A numeric total, or [`UNKNOWN`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Amount {
    Value(f64),
    #[default]
    Unknown,
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Debug keeps the trailing ".0" on whole numbers ("12.0", not "12").
            Amount::Value(v) => write!(f, "{v:?}"),
            Amount::Unknown => f.write_str(UNKNOWN),
        }
    }
}

/// A free-text field, or [`UNKNOWN`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Field {
    Text(String),
    #[default]
    Unknown,
}

impl Field {
    /// Wrap `s`, mapping blank strings to [`Field::Unknown`].
    pub fn from_text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.trim().is_empty() {
            Field::Unknown
        } else {
            Field::Text(s)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Field::Text(s) => s,
            Field::Unknown => UNKNOWN,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Field::Unknown)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four fields extracted from one receipt.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedReceipt {
    pub amount: Amount,
    pub currency: Field,
    pub transaction_date: Field,
    pub description: Field,
}

impl ParsedReceipt {
    /// Every field [`UNKNOWN`].
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_unknown(&self) -> bool {
        self.amount == Amount::Unknown
            && self.currency.is_unknown()
            && self.transaction_date.is_unknown()
            && self.description.is_unknown()
    }
}

/// Fixed CSV header, in column order.
pub const INDEX_HEADER: [&str; 5] = [
    "File Name",
    "Total Amount",
    "Currency",
    "Transaction Date",
    "Descriptive Details",
];

/// One persisted line of the receipt index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRow {
    pub file_name: String,
    pub receipt: ParsedReceipt,
}

impl IndexRow {
    pub fn new(file_name: impl Into<String>, receipt: ParsedReceipt) -> Self {
        Self {
            file_name: file_name.into(),
            receipt,
        }
    }

    /// A row with every field except the file name set to [`UNKNOWN`].
    pub fn placeholder(file_name: impl Into<String>) -> Self {
        Self::new(file_name, ParsedReceipt::unknown())
    }

    /// Cell values in [`INDEX_HEADER`] order.
    pub fn to_record(&self) -> [String; 5] {
        [
            self.file_name.clone(),
            self.receipt.amount.to_string(),
            self.receipt.currency.to_string(),
            self.receipt.transaction_date.to_string(),
            self.receipt.description.to_string(),
        ]
    }
}

/// Run statistics for a receipt-index build.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStats {
    /// PDF files discovered in the source directory.
    pub total_documents: usize,
    /// Rows written to the index (always equals `total_documents` on success).
    pub rows_written: usize,
    /// Rows whose reply parsed into a structured object.
    pub parsed_documents: usize,
    /// Documents whose text layer was empty or unreadable (no LLM call made).
    pub empty_documents: usize,
    /// Documents whose LLM call or reply parsing failed.
    pub failed_documents: usize,
    pub total_duration_ms: u64,
    /// Destination file.
    pub output_path: PathBuf,
}

/// One line of the email archive index.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArchiveEntry {
    /// Name of the rendered PDF inside the output directory.
    pub file_name: String,
    pub subject: Option<String>,
    /// Date header as written in the message.
    pub date: Option<String>,
    pub sender: Option<String>,
    /// Parsed `date`, used for ordering the index.
    pub timestamp: Option<i64>,
}

/// Run statistics for an email archive conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchiveStats {
    pub total_messages: usize,
    pub converted: usize,
    pub failed: usize,
    /// Path of `index.pdf`; `None` when no message converted.
    pub index_path: Option<PathBuf>,
    pub total_duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_display() {
        assert_eq!(Amount::Value(1234.56).to_string(), "1234.56");
        assert_eq!(Amount::Value(12.0).to_string(), "12.0");
        assert_eq!(Amount::Unknown.to_string(), "N/A");
    }

    #[test]
    fn blank_field_is_unknown() {
        assert_eq!(Field::from_text("   "), Field::Unknown);
        assert_eq!(Field::from_text("EUR"), Field::Text("EUR".into()));
    }

    #[test]
    fn placeholder_row_record() {
        let row = IndexRow::placeholder("scan.pdf");
        assert_eq!(row.to_record(), ["scan.pdf", "N/A", "N/A", "N/A", "N/A"]);
        assert!(row.receipt.is_unknown());
    }

    #[test]
    fn full_row_record() {
        let row = IndexRow::new(
            "cafe.pdf",
            ParsedReceipt {
                amount: Amount::Value(4.5),
                currency: Field::from_text("GBP"),
                transaction_date: Field::from_text("2024-03-01"),
                description: Field::from_text("Coffee at Cafe Nero"),
            },
        );
        assert_eq!(
            row.to_record(),
            ["cafe.pdf", "4.5", "GBP", "2024-03-01", "Coffee at Cafe Nero"]
        );
    }
}
