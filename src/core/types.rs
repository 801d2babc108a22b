use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One vendor bill from an Alma export, header fields already derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Alma `invoice_number`, verbatim.
    pub number: String,
    /// Invoice total (`invoice_amount/sum`).
    pub total: Decimal,
    /// Left half of `vendor_FinancialSys_Code`, split on the first `-`.
    pub vendor_id: String,
    /// Right half of `vendor_FinancialSys_Code`; may itself contain `-`.
    pub payment_address: String,
    /// Alma `invoice_date` (`MM/DD/YYYY` in the export).
    pub invoice_date: NaiveDate,
    /// Due date: ownership-entity creation date plus seven calendar days.
    pub payment_due_date: NaiveDate,
    /// Settlement classification. Only accounting-department invoices reach
    /// the Banner feed.
    pub payment_method: PaymentMethod,
    /// Invoice-level shipment charge, allocated to the line numbered `"1"`.
    pub shipment_amount: Decimal,
    /// Invoice lines in document order.
    pub lines: Vec<InvoiceLine>,
}

/// One purchase-order-line-level charge within an invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceLine {
    /// Alma `line_number`, kept as text. `"1"` marks the shipment-bearing line.
    pub number: String,
    /// Funding account index, the first `fund_info_list/fund_info/external_id`.
    pub fund_code: String,
    /// Unit price for the line.
    pub price: Decimal,
    /// Alma `po_line_info/po_line_number`.
    pub po_line_number: String,
}

/// Alma payment method codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// ACCOUNTINGDEPARTMENT, the only code that is fed to Banner.
    AccountingDepartment,
    /// CORRECTION, settled internally.
    Correction,
    /// CREDITCARD, already paid by card.
    CreditCard,
    /// DEPOSITACCOUNT, drawn against a vendor deposit.
    DepositAccount,
}

impl PaymentMethod {
    /// Parse an Alma payment method code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ACCOUNTINGDEPARTMENT" => Some(Self::AccountingDepartment),
            "CORRECTION" => Some(Self::Correction),
            "CREDITCARD" => Some(Self::CreditCard),
            "DEPOSITACCOUNT" => Some(Self::DepositAccount),
            _ => None,
        }
    }

    /// The wire code as it appears in the export.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AccountingDepartment => "ACCOUNTINGDEPARTMENT",
            Self::Correction => "CORRECTION",
            Self::CreditCard => "CREDITCARD",
            Self::DepositAccount => "DEPOSITACCOUNT",
        }
    }

    /// Whether invoices settled this way are written to the feed.
    pub fn exported(self) -> bool {
        matches!(self, Self::AccountingDepartment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_method_codes_round_trip() {
        for code in [
            "ACCOUNTINGDEPARTMENT",
            "CORRECTION",
            "CREDITCARD",
            "DEPOSITACCOUNT",
        ] {
            let method = PaymentMethod::from_code(code).unwrap();
            assert_eq!(method.code(), code);
        }
        assert!(PaymentMethod::from_code("WIRE").is_none());
        assert!(PaymentMethod::from_code("accountingdepartment").is_none());
    }

    #[test]
    fn only_accounting_department_is_exported() {
        assert!(PaymentMethod::AccountingDepartment.exported());
        assert!(!PaymentMethod::Correction.exported());
        assert!(!PaymentMethod::CreditCard.exported());
        assert!(!PaymentMethod::DepositAccount.exported());
    }
}
