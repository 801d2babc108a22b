use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while locating, parsing, or emitting a feed run.
///
/// The converter is fail-fast: any field-level failure aborts the whole run
/// rather than skipping the offending invoice.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FeedError {
    /// No pending export file in the export directory.
    #[error("no XML export found in {}", .dir.display())]
    InputNotFound { dir: PathBuf },

    /// More than one candidate export. The export directory must hold exactly
    /// one pending XML file; anything older belongs in the archive.
    #[error("found {} XML files in {}, expected exactly one: {}", .candidates.len(), .dir.display(), .candidates.join(", "))]
    AmbiguousInput {
        dir: PathBuf,
        candidates: Vec<String>,
    },

    /// The document is not well-formed XML or is not an Alma invoice export.
    #[error("malformed export: {0}")]
    MalformedXml(String),

    /// A required invoice header element is absent.
    #[error("invoice {invoice}: missing required element {path}")]
    MissingField { invoice: usize, path: &'static str },

    /// A required invoice line element is absent.
    #[error("invoice {invoice}, line {line}: missing required element {path}")]
    MissingLineField {
        invoice: usize,
        line: usize,
        path: &'static str,
    },

    /// `vendor_FinancialSys_Code` lacks the `-` separating vendor id from
    /// payment address.
    #[error("invoice {invoice}: vendor code {code:?} has no '-' separator")]
    MalformedVendorCode { invoice: usize, code: String },

    /// A date field does not match its expected format.
    #[error("invoice {invoice}: cannot parse {field} value {value:?}: {reason}")]
    DateParse {
        invoice: usize,
        field: &'static str,
        value: String,
        reason: String,
    },

    /// A monetary field is not a parsable decimal.
    #[error("invoice {invoice}: cannot parse {field} value {value:?} as an amount")]
    MalformedAmount {
        invoice: usize,
        field: &'static str,
        value: String,
    },

    /// A payment method code outside the four known Alma codes.
    #[error("invoice {invoice}: unknown payment method {value:?}")]
    UnknownPaymentMethod { invoice: usize, value: String },

    /// Filesystem failure while reading, writing, or rotating files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Feed rendering produced invalid UTF-8.
    #[error("feed is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
