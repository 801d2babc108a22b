//! Event-driven extraction of invoices from an Alma export document.

use std::str::FromStr;

use chrono::{Days, NaiveDate};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use rust_decimal::Decimal;

use super::ALMA_NS;
use crate::core::{FeedError, Invoice, InvoiceLine, PaymentMethod};

/// Banner payment terms: invoices fall due seven days after they enter Alma.
const PAYMENT_TERMS_DAYS: u64 = 7;

/// Parse a complete Alma export document into invoices, document order.
///
/// Fails fast: the first missing or malformed field aborts the whole run,
/// identifying the invoice (1-based, document order) and the element path.
pub fn parse_export(xml: &str) -> Result<Vec<Invoice>, FeedError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut invoices: Vec<Invoice> = Vec::new();
    let mut current: Option<RawInvoice> = None;
    let mut root_seen = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = local_name(e);
                if !root_seen {
                    root_seen = true;
                    check_namespace(e)?;
                }
                if name == "invoice" && path.last().is_some_and(|p| p == "invoice_list") {
                    current = Some(RawInvoice::new(invoices.len() + 1));
                } else if name == "invoice_line" {
                    if let Some(inv) = current.as_mut() {
                        inv.lines.push(RawLine::default());
                    }
                }
                path.push(name);
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| FeedError::MalformedXml(e.to_string()))?;
                if !text.is_empty() {
                    if let Some(inv) = current.as_mut() {
                        inv.handle_text(&path, &text);
                    }
                }
            }
            Ok(Event::End(_)) => {
                let ended = path.pop().unwrap_or_default();
                if ended == "invoice" {
                    if let Some(raw) = current.take() {
                        invoices.push(raw.into_invoice()?);
                    }
                }
            }
            Ok(Event::Eof) => {
                if !path.is_empty() {
                    return Err(FeedError::MalformedXml(format!(
                        "document ended inside <{}>",
                        path.join("/")
                    )));
                }
                break;
            }
            Err(e) => return Err(FeedError::MalformedXml(e.to_string())),
            _ => {}
        }
    }

    Ok(invoices)
}

fn local_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// The root element must declare the Alma invoice namespace, either as the
/// default namespace or bound to a prefix.
fn check_namespace(root: &BytesStart) -> Result<(), FeedError> {
    for attr in root.attributes().flatten() {
        let key = attr.key.as_ref();
        if (key == b"xmlns" || key.starts_with(b"xmlns:")) && &*attr.value == ALMA_NS.as_bytes() {
            return Ok(());
        }
    }
    Err(FeedError::MalformedXml(format!(
        "root element does not declare the Alma namespace {ALMA_NS}"
    )))
}

/// Parent of the element currently holding text, i.e. the second-to-last
/// path segment.
fn parent(path: &[String]) -> &str {
    if path.len() >= 2 {
        &path[path.len() - 2]
    } else {
        ""
    }
}

/// First-match-wins assignment, mirroring a single path lookup per field.
fn set_first(slot: &mut Option<String>, text: &str) {
    if slot.is_none() {
        *slot = Some(text.to_string());
    }
}

/// Field accumulator for one `<invoice>` element, finalized on its end tag.
#[derive(Default)]
struct RawInvoice {
    ordinal: usize,
    number: Option<String>,
    sum: Option<String>,
    vendor_code: Option<String>,
    invoice_date: Option<String>,
    creation_date: Option<String>,
    payment_method: Option<String>,
    shipment_amount: Option<String>,
    lines: Vec<RawLine>,
}

#[derive(Default)]
struct RawLine {
    number: Option<String>,
    external_id: Option<String>,
    price: Option<String>,
    po_line_number: Option<String>,
}

impl RawInvoice {
    fn new(ordinal: usize) -> Self {
        Self {
            ordinal,
            ..Self::default()
        }
    }

    fn handle_text(&mut self, path: &[String], text: &str) {
        let field = path.last().map(String::as_str).unwrap_or("");
        if path.iter().any(|p| p == "invoice_line") {
            let Some(line) = self.lines.last_mut() else {
                return;
            };
            match (field, parent(path)) {
                ("line_number", "invoice_line") => set_first(&mut line.number, text),
                ("price", "invoice_line") => set_first(&mut line.price, text),
                ("external_id", "fund_info") => set_first(&mut line.external_id, text),
                ("po_line_number", "po_line_info") => set_first(&mut line.po_line_number, text),
                _ => {}
            }
        } else {
            match (field, parent(path)) {
                ("invoice_number", "invoice") => set_first(&mut self.number, text),
                ("invoice_date", "invoice") => set_first(&mut self.invoice_date, text),
                ("vendor_FinancialSys_Code", "invoice") => set_first(&mut self.vendor_code, text),
                ("payment_method", "invoice") => set_first(&mut self.payment_method, text),
                ("sum", "invoice_amount") => set_first(&mut self.sum, text),
                ("creationDate", "invoice_ownered_entity") => {
                    set_first(&mut self.creation_date, text)
                }
                ("shipment_amount", "additional_charges") => {
                    set_first(&mut self.shipment_amount, text)
                }
                _ => {}
            }
        }
    }

    fn into_invoice(self) -> Result<Invoice, FeedError> {
        let ordinal = self.ordinal;
        let missing = |path: &'static str| FeedError::MissingField {
            invoice: ordinal,
            path,
        };

        let number = self.number.ok_or_else(|| missing("invoice_number"))?;
        let sum = self.sum.ok_or_else(|| missing("invoice_amount/sum"))?;
        let vendor_code = self
            .vendor_code
            .ok_or_else(|| missing("vendor_FinancialSys_Code"))?;
        let invoice_date = self.invoice_date.ok_or_else(|| missing("invoice_date"))?;
        let creation_date = self
            .creation_date
            .ok_or_else(|| missing("invoice_ownered_entity/creationDate"))?;
        let method = self
            .payment_method
            .ok_or_else(|| missing("payment_method"))?;
        let shipment = self
            .shipment_amount
            .ok_or_else(|| missing("additional_charges/shipment_amount"))?;

        let (vendor_id, payment_address) = split_vendor_code(ordinal, &vendor_code)?;
        let invoice_date = parse_date(ordinal, "invoice_date", &invoice_date, "%m/%d/%Y")?;
        let creation = parse_date(ordinal, "creationDate", &creation_date, "%Y%m%d")?;
        let payment_due_date = creation
            .checked_add_days(Days::new(PAYMENT_TERMS_DAYS))
            .ok_or_else(|| FeedError::DateParse {
                invoice: ordinal,
                field: "creationDate",
                value: creation_date,
                reason: "payment due date out of range".into(),
            })?;
        let payment_method =
            PaymentMethod::from_code(&method).ok_or(FeedError::UnknownPaymentMethod {
                invoice: ordinal,
                value: method,
            })?;
        let total = parse_amount(ordinal, "invoice_amount/sum", &sum)?;
        let shipment_amount =
            parse_amount(ordinal, "additional_charges/shipment_amount", &shipment)?;

        let mut lines = Vec::with_capacity(self.lines.len());
        for (i, raw) in self.lines.into_iter().enumerate() {
            lines.push(raw.into_line(ordinal, i + 1)?);
        }

        Ok(Invoice {
            number,
            total,
            vendor_id,
            payment_address,
            invoice_date,
            payment_due_date,
            payment_method,
            shipment_amount,
            lines,
        })
    }
}

impl RawLine {
    fn into_line(self, invoice: usize, line: usize) -> Result<InvoiceLine, FeedError> {
        let missing = |path: &'static str| FeedError::MissingLineField {
            invoice,
            line,
            path,
        };

        let number = self.number.ok_or_else(|| missing("line_number"))?;
        let fund_code = self
            .external_id
            .ok_or_else(|| missing("fund_info_list/fund_info/external_id"))?;
        let price = self.price.ok_or_else(|| missing("price"))?;
        let po_line_number = self
            .po_line_number
            .ok_or_else(|| missing("po_line_info/po_line_number"))?;

        Ok(InvoiceLine {
            number,
            fund_code,
            price: parse_amount(invoice, "price", &price)?,
            po_line_number,
        })
    }
}

/// Split `vendor_FinancialSys_Code` on the first `-` into vendor id and
/// payment address.
fn split_vendor_code(invoice: usize, code: &str) -> Result<(String, String), FeedError> {
    match code.split_once('-') {
        Some((id, addr)) => Ok((id.to_string(), addr.to_string())),
        None => Err(FeedError::MalformedVendorCode {
            invoice,
            code: code.to_string(),
        }),
    }
}

fn parse_date(
    invoice: usize,
    field: &'static str,
    value: &str,
    format: &str,
) -> Result<NaiveDate, FeedError> {
    NaiveDate::parse_from_str(value, format).map_err(|e| FeedError::DateParse {
        invoice,
        field,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn parse_amount(invoice: usize, field: &'static str, value: &str) -> Result<Decimal, FeedError> {
    Decimal::from_str(value).map_err(|_| FeedError::MalformedAmount {
        invoice,
        field,
        value: value.to_string(),
    })
}
