//! Alma acquisitions invoice export parsing.
//!
//! Alma exports one XML document per batch. The root element declares the
//! namespace in [`ALMA_NS`] and contains repeating `invoice_list/invoice`
//! elements; each invoice nests its lines under a list container. The export
//! is small enough that [`parse_export`] loads the whole document and returns
//! the invoices in document order, ready for emission.

mod extract;

pub use extract::parse_export;

/// Root namespace of the Alma invoice export schema.
pub const ALMA_NS: &str = "http://com/exlibris/repository/acq/invoice/xmlbeans";
