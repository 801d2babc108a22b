//! Row derivation and CSV writing for the Banner import feed.

use std::io::Write;

use rust_decimal::Decimal;
use tracing::debug;

use crate::core::{FeedError, Invoice};

/// Banner import header. Column order is fixed; every data row matches it.
pub const FEED_HEADER: [&str; 11] = [
    "INVOICE_NUMBER",
    "VENDOR_ID",
    "ATYPE_SEQ",
    "INVOICE_DATE",
    "INVOICE_TOTAL",
    "PMT_DUE_DATE",
    "PO_SEQ",
    "ACCOUNT_INDEX",
    "UNIT_PRICE",
    "ADDL_CHG",
    "LINE_DESC",
];

/// Derive the feed rows for one invoice, in document order.
///
/// The payment-method filter is evaluated per line: a non-remittable invoice
/// yields no rows, but every line is still walked.
pub fn invoice_rows(invoice: &Invoice) -> Vec<[String; 11]> {
    let invoice_date = invoice.invoice_date.format("%Y%m%d").to_string();
    let due_date = invoice.payment_due_date.format("%Y%m%d").to_string();

    let mut rows = Vec::new();
    for line in &invoice.lines {
        // Shipment is charged against the first POL only; every other line
        // carries a literal zero.
        let additional = if line.number == "1" {
            invoice.shipment_amount
        } else {
            Decimal::ZERO
        };
        if !invoice.payment_method.exported() {
            continue;
        }
        rows.push([
            invoice.number.clone(),
            invoice.vendor_id.clone(),
            invoice.payment_address.clone(),
            invoice_date.clone(),
            invoice.total.to_string(),
            due_date.clone(),
            line.number.clone(),
            line.fund_code.clone(),
            line.price.to_string(),
            additional.to_string(),
            line.po_line_number.clone(),
        ]);
    }
    rows
}

/// Write the header plus all feed rows for `invoices` through `out`.
///
/// The dialect matches what Banner ingests: CRLF record terminators, fields
/// quoted only when they need it. The writer is flushed before returning, so
/// a run that fails later still leaves a readable file behind.
///
/// Returns the number of data rows written.
pub fn write_feed<W: Write>(invoices: &[Invoice], out: W) -> Result<usize, FeedError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(out);
    writer.write_record(FEED_HEADER)?;

    let mut written = 0;
    for invoice in invoices {
        let rows = invoice_rows(invoice);
        if rows.is_empty() && !invoice.lines.is_empty() {
            debug!(
                invoice = %invoice.number,
                method = invoice.payment_method.code(),
                "invoice filtered from feed"
            );
        }
        for row in rows {
            writer.write_record(&row)?;
            written += 1;
        }
    }
    writer.flush()?;
    Ok(written)
}

/// Render the complete feed as a CSV string.
pub fn to_feed_csv(invoices: &[Invoice]) -> Result<String, FeedError> {
    let mut buf = Vec::new();
    write_feed(invoices, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}
