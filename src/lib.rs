//! # bannerfeed
//!
//! Converts an Alma acquisitions XML invoice export into a flat CSV feed for
//! the Banner finance system.
//!
//! The pipeline runs two stages in sequence:
//! 1. [`alma::parse_export`] walks the namespaced export tree and yields one
//!    [`Invoice`] per `<invoice>` element, with the derived header fields
//!    already resolved (vendor code split, date reformatting, due-date
//!    arithmetic).
//! 2. [`banner::write_feed`] derives one CSV row per invoice line, applies the
//!    payment-method filter, and emits the fixed Banner column order.
//!
//! All monetary values are carried as [`rust_decimal::Decimal`], which keeps
//! the source scale intact, so amounts re-render exactly as exported.
//!
//! ## Quick Start
//!
//! ```rust
//! use bannerfeed::{alma, banner};
//!
//! let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
//! <payment_data xmlns="http://com/exlibris/repository/acq/invoice/xmlbeans">
//!   <invoice_list>
//!     <invoice>
//!       <invoice_number>INV-1001</invoice_number>
//!       <invoice_date>03/15/2019</invoice_date>
//!       <vendor_FinancialSys_Code>123-45</vendor_FinancialSys_Code>
//!       <payment_method>ACCOUNTINGDEPARTMENT</payment_method>
//!       <invoice_amount><sum>150.00</sum></invoice_amount>
//!       <invoice_ownered_entity><creationDate>20190301</creationDate></invoice_ownered_entity>
//!       <additional_charges><shipment_amount>5.25</shipment_amount></additional_charges>
//!       <invoice_line_list>
//!         <invoice_line>
//!           <line_number>1</line_number>
//!           <price>144.75</price>
//!           <fund_info_list><fund_info><external_id>LIBFUND</external_id></fund_info></fund_info_list>
//!           <po_line_info><po_line_number>POL-77</po_line_number></po_line_info>
//!         </invoice_line>
//!       </invoice_line_list>
//!     </invoice>
//!   </invoice_list>
//! </payment_data>"#;
//!
//! let invoices = alma::parse_export(xml).unwrap();
//! assert_eq!(invoices.len(), 1);
//!
//! let feed = banner::to_feed_csv(&invoices).unwrap();
//! assert!(feed.starts_with("INVOICE_NUMBER,"));
//! assert!(feed.contains("INV-1001,123,45,20190315,150.00,20190308,1,LIBFUND,144.75,5.25,POL-77"));
//! ```
//!
//! Batch operation (export discovery, dated output names, archiving,
//! retention pruning) lives in [`job`]; the `bannerfeed` binary is a thin CLI
//! over [`job::run`].

pub mod alma;
pub mod banner;
pub mod core;
pub mod job;

// Re-export the data model at the crate root for convenience
pub use crate::core::*;
