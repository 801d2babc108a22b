//! Batch-run tests: export discovery, archiving, retention, end to end.

use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};

use bannerfeed::FeedError;
use bannerfeed::job::{self, RunConfig};
use chrono::NaiveDate;
use tempfile::tempdir;

/// An export with one accounting-department invoice (two lines) and one
/// credit-card invoice (one line).
const EXPORT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<payment_data xmlns="http://com/exlibris/repository/acq/invoice/xmlbeans">
  <invoice_list>
    <invoice>
      <invoice_number>INV-A</invoice_number>
      <invoice_date>03/15/2019</invoice_date>
      <vendor_FinancialSys_Code>123-45</vendor_FinancialSys_Code>
      <payment_method>ACCOUNTINGDEPARTMENT</payment_method>
      <invoice_amount><sum>30.00</sum></invoice_amount>
      <invoice_ownered_entity><creationDate>20190301</creationDate></invoice_ownered_entity>
      <additional_charges><shipment_amount>2.00</shipment_amount></additional_charges>
      <invoice_line_list>
        <invoice_line>
          <line_number>1</line_number>
          <price>10.00</price>
          <fund_info_list><fund_info><external_id>LIBFUND</external_id></fund_info></fund_info_list>
          <po_line_info><po_line_number>POL-1</po_line_number></po_line_info>
        </invoice_line>
        <invoice_line>
          <line_number>2</line_number>
          <price>20.00</price>
          <fund_info_list><fund_info><external_id>LIBFUND</external_id></fund_info></fund_info_list>
          <po_line_info><po_line_number>POL-2</po_line_number></po_line_info>
        </invoice_line>
      </invoice_line_list>
    </invoice>
    <invoice>
      <invoice_number>INV-B</invoice_number>
      <invoice_date>03/16/2019</invoice_date>
      <vendor_FinancialSys_Code>9-8</vendor_FinancialSys_Code>
      <payment_method>CREDITCARD</payment_method>
      <invoice_amount><sum>99.00</sum></invoice_amount>
      <invoice_ownered_entity><creationDate>20190302</creationDate></invoice_ownered_entity>
      <additional_charges><shipment_amount>0</shipment_amount></additional_charges>
      <invoice_line_list>
        <invoice_line>
          <line_number>1</line_number>
          <price>99.00</price>
          <fund_info_list><fund_info><external_id>SERFUND</external_id></fund_info></fund_info_list>
          <po_line_info><po_line_number>POL-9</po_line_number></po_line_info>
        </invoice_line>
      </invoice_line_list>
    </invoice>
  </invoice_list>
</payment_data>"#;

fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 4, 1).unwrap()
}

fn touch(path: &Path, mtime_secs: u64) {
    fs::write(path, b"x").unwrap();
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(mtime_secs))
        .unwrap();
}

#[test]
fn find_export_requires_a_candidate() {
    let dir = tempdir().unwrap();
    let err = job::find_export(dir.path()).unwrap_err();
    assert!(matches!(err, FeedError::InputNotFound { .. }));
}

#[test]
fn find_export_ignores_other_extensions() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("old.csv"), "a").unwrap();
    fs::write(dir.path().join("notes.log"), "b").unwrap();
    fs::write(dir.path().join("pending.xml"), "c").unwrap();
    let found = job::find_export(dir.path()).unwrap();
    assert_eq!(found.file_name().unwrap(), "pending.xml");
}

#[test]
fn find_export_rejects_multiple_candidates() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("b.xml"), "b").unwrap();
    fs::write(dir.path().join("a.xml"), "a").unwrap();
    let err = job::find_export(dir.path()).unwrap_err();
    match err {
        FeedError::AmbiguousInput { candidates, .. } => {
            assert_eq!(candidates, vec!["a.xml".to_string(), "b.xml".to_string()]);
        }
        other => panic!("expected AmbiguousInput, got {other:?}"),
    }
}

#[test]
fn archive_moves_export_to_dated_name() {
    let dir = tempdir().unwrap();
    let export = dir.path().join("pending.xml");
    fs::write(&export, EXPORT).unwrap();
    let archive_dir = dir.path().join("saved");
    fs::create_dir(&archive_dir).unwrap();

    let target = job::archive(&export, &archive_dir, run_date()).unwrap();
    assert_eq!(target, archive_dir.join("20190401.xml"));
    assert!(!export.exists());
    assert_eq!(fs::read_to_string(target).unwrap(), EXPORT);
}

#[test]
fn prune_keeps_the_newest_files() {
    let dir = tempdir().unwrap();
    for (name, mtime) in [("a.xml", 100), ("b.xml", 200), ("c.xml", 300), ("d.xml", 400), ("e.xml", 500)] {
        touch(&dir.path().join(name), mtime);
    }

    let deleted = job::prune(dir.path(), 3).unwrap();
    let mut deleted: Vec<_> = deleted
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    deleted.sort();
    assert_eq!(deleted, vec!["a.xml".to_string(), "b.xml".to_string()]);
    assert!(dir.path().join("c.xml").exists());
    assert!(dir.path().join("e.xml").exists());
}

#[test]
fn prune_is_a_noop_under_retention() {
    let dir = tempdir().unwrap();
    touch(&dir.path().join("a.xml"), 100);
    touch(&dir.path().join("b.xml"), 200);
    assert!(job::prune(dir.path(), 3).unwrap().is_empty());
    assert!(dir.path().join("a.xml").exists());
}

#[test]
fn end_to_end_run_produces_feed_and_rotates() {
    let root = tempdir().unwrap();
    let export_dir = root.path().join("exports");
    let output_dir = root.path().join("feeds");
    let archive_dir = root.path().join("saved");
    for d in [&export_dir, &output_dir, &archive_dir] {
        fs::create_dir(d).unwrap();
    }
    fs::write(export_dir.join("batch.xml"), EXPORT).unwrap();

    let config = RunConfig {
        export_dir: export_dir.clone(),
        output_dir: output_dir.clone(),
        archive_dir: archive_dir.clone(),
        retention: 3,
        run_date: run_date(),
    };
    let report = job::run(&config).unwrap();

    assert_eq!(report.invoices, 2);
    assert_eq!(report.rows_written, 2);
    assert_eq!(report.rows_skipped, 1);

    let feed = fs::read_to_string(output_dir.join("alma_invoice_20190401.csv")).unwrap();
    let rows: Vec<&str> = feed.trim_end().split("\r\n").collect();
    assert_eq!(rows.len(), 3);
    assert!(rows[0].starts_with("INVOICE_NUMBER,"));
    assert_eq!(rows[1], "INV-A,123,45,20190315,30.00,20190308,1,LIBFUND,10.00,2.00,POL-1");
    assert_eq!(rows[2], "INV-A,123,45,20190315,30.00,20190308,2,LIBFUND,20.00,0,POL-2");

    // The consumed export was archived under its dated name.
    assert!(!export_dir.join("batch.xml").exists());
    assert!(archive_dir.join("20190401.xml").exists());

    // A second run finds nothing to do.
    let err = job::run(&config).unwrap_err();
    assert!(matches!(err, FeedError::InputNotFound { .. }));
}

#[test]
fn run_aborts_before_writing_when_parse_fails() {
    let root = tempdir().unwrap();
    let export_dir = root.path().join("exports");
    let output_dir = root.path().join("feeds");
    let archive_dir = root.path().join("saved");
    for d in [&export_dir, &output_dir, &archive_dir] {
        fs::create_dir(d).unwrap();
    }
    // vendor code without separator
    let bad = EXPORT.replace("123-45", "12345");
    fs::write(export_dir.join("batch.xml"), bad).unwrap();

    let config = RunConfig {
        export_dir: export_dir.clone(),
        output_dir: output_dir.clone(),
        archive_dir,
        retention: 3,
        run_date: run_date(),
    };
    let err = job::run(&config).unwrap_err();
    assert!(matches!(err, FeedError::MalformedVendorCode { invoice: 1, .. }));

    // Nothing was written and the export stays in place for inspection.
    assert!(!output_dir.join("alma_invoice_20190401.csv").exists());
    assert!(export_dir.join("batch.xml").exists());
}
