//! Banner finance feed emission.
//!
//! One CSV row per invoice line, fixed column order, filtered down to
//! accounting-department invoices. Persistence stays with the caller:
//! [`write_feed`] takes any [`std::io::Write`], and [`to_feed_csv`] renders
//! the feed in memory for tests and embedding callers.

mod feed;

pub use feed::{FEED_HEADER, invoice_rows, to_feed_csv, write_feed};
