// 💰 Finance Entities - Invoices, expenses, payouts, payments, payroll, taxes
//
// Monetary fields stay `Option<f64>`: a missing total is "unknown", which
// is not the same thing as zero. Sums treat `None` as 0; presence checks
// never do.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity;
use crate::resolve;
use crate::value::RawRecord;

// ============================================================================
// INVOICE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub number: Option<String>,
    pub client_name: String,
    pub client_id: Option<String>,

    /// Free-text status, defaults to "pending"
    pub status: String,

    pub total: Option<f64>,

    /// Explicit unpaid remainder when the store tracks one
    pub balance_due: Option<f64>,

    pub issued_at: Option<DateTime<Utc>>,
    pub due_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub currency: Option<String>,
}

pub fn map_invoice(record: &RawRecord) -> Invoice {
    let client_name = resolve::string(
        record,
        &["client_name", "client", "customer_name", "customer", "bill_to", "name"],
    )
    .unwrap_or_else(|| "Unknown".to_string());

    Invoice {
        id: identity::entity_id(record, &["invoice_id"], "inv", &client_name),
        number: resolve::string(record, &["invoice_number", "number", "invoice_no", "reference"]),
        client_id: resolve::string(record, &["client_id", "customer_id"]),
        status: resolve::string(record, &["status", "invoice_status", "payment_status", "state"])
            .unwrap_or_else(|| "pending".to_string()),
        total: resolve::number(
            record,
            &["total", "amount", "total_amount", "amount_total", "grand_total", "subtotal"],
        ),
        balance_due: resolve::number(
            record,
            &["balance_due", "balance", "amount_due", "amount_remaining", "outstanding"],
        ),
        issued_at: resolve::date(
            record,
            &["issued_at", "issue_date", "invoice_date", "issuedAt", "created_at", "date"],
        ),
        due_at: resolve::date(record, &["due_at", "due_date", "dueDate", "payment_due"]),
        paid_at: resolve::date(record, &["paid_at", "paid_date", "payment_date"]),
        category: resolve::string(record, &["category", "service_category", "revenue_category", "type"]),
        currency: resolve::string(record, &["currency", "currency_code"]),
        client_name,
    }
}

// ============================================================================
// EXPENSE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,

    /// What the money went to ("Unnamed" when the row has no label)
    pub description: String,
    pub vendor: Option<String>,
    pub category: Option<String>,
    pub amount: Option<f64>,
    pub incurred_at: Option<DateTime<Utc>>,

    /// Free-text status, defaults to "recorded"
    pub status: String,
    pub receipt_url: Option<String>,
}

pub fn map_expense(record: &RawRecord) -> Expense {
    let description = resolve::string(
        record,
        &["description", "name", "title", "memo", "vendor_name", "vendor", "payee"],
    )
    .unwrap_or_else(|| "Unnamed".to_string());

    Expense {
        id: identity::entity_id(record, &["expense_id"], "exp", &description),
        vendor: resolve::string(record, &["vendor", "vendor_name", "payee", "merchant"]),
        category: resolve::string(record, &["category", "expense_category", "account", "type"]),
        amount: resolve::number(record, &["amount", "total", "cost", "amount_total", "value"]),
        incurred_at: resolve::date(
            record,
            &["incurred_at", "expense_date", "spent_at", "transaction_date", "date", "created_at"],
        ),
        status: resolve::string(record, &["status", "state"])
            .unwrap_or_else(|| "recorded".to_string()),
        receipt_url: resolve::string(record, &["receipt_url", "receipt", "attachment_url"]),
        description,
    }
}

// ============================================================================
// PAYOUT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payout {
    pub id: String,
    pub recipient: String,
    pub amount: Option<f64>,

    /// Free-text status, defaults to "pending"
    pub status: String,

    /// Expected arrival / scheduled date
    pub scheduled_for: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
}

pub fn map_payout(record: &RawRecord) -> Payout {
    let recipient = resolve::string(
        record,
        &["recipient", "recipient_name", "payee", "staff_name", "destination_name", "name"],
    )
    .unwrap_or_else(|| "Unknown".to_string());

    Payout {
        id: identity::entity_id(record, &["payout_id"], "pay", &recipient),
        amount: resolve::number(record, &["amount", "net", "total", "amount_paid"]),
        status: resolve::string(record, &["status", "payout_status", "state"])
            .unwrap_or_else(|| "pending".to_string()),
        scheduled_for: resolve::date(
            record,
            &["arrival_date", "scheduled_for", "expected_at", "payout_date", "date"],
        ),
        paid_at: resolve::date(record, &["paid_at", "completed_at", "arrived_at"]),
        recipient,
    }
}

// ============================================================================
// PAYMENT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub payer: String,
    pub amount: Option<f64>,

    /// Processor fee, when reported
    pub fee: Option<f64>,

    /// Free-text status, defaults to "pending"
    pub status: String,
    pub received_at: Option<DateTime<Utc>>,
    pub invoice_id: Option<String>,
}

pub fn map_payment(record: &RawRecord) -> Payment {
    let payer = resolve::string(
        record,
        &["payer", "payer_name", "client_name", "customer_name", "customer", "name"],
    )
    .unwrap_or_else(|| "Unknown".to_string());

    Payment {
        id: identity::entity_id(record, &["payment_id", "charge_id", "transaction_id"], "pmt", &payer),
        amount: resolve::number(record, &["amount", "gross", "total", "amount_received"]),
        fee: resolve::number(record, &["fee", "fees", "processing_fee", "stripe_fee"]),
        status: resolve::string(record, &["status", "payment_status", "state"])
            .unwrap_or_else(|| "pending".to_string()),
        received_at: resolve::date(
            record,
            &["received_at", "paid_at", "payment_date", "created_at", "date"],
        ),
        invoice_id: resolve::string(record, &["invoice_id", "invoice"]),
        payer,
    }
}

// ============================================================================
// PAYROLL RUN
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollRun {
    pub id: String,
    pub label: String,
    pub period_start: Option<DateTime<Utc>>,
    pub period_end: Option<DateTime<Utc>>,
    pub pay_date: Option<DateTime<Utc>>,
    pub gross: Option<f64>,
    pub net: Option<f64>,
    pub taxes: Option<f64>,
    pub employee_count: Option<u32>,

    /// Free-text status, defaults to "draft"
    pub status: String,
}

pub fn map_payroll_run(record: &RawRecord) -> PayrollRun {
    let label = resolve::string(
        record,
        &["label", "name", "title", "period_label", "pay_period"],
    )
    .unwrap_or_else(|| "Payroll".to_string());

    PayrollRun {
        id: identity::entity_id(record, &["payroll_id", "run_id"], "prl", &label),
        period_start: resolve::date(record, &["period_start", "start_date", "pay_period_start"]),
        period_end: resolve::date(record, &["period_end", "end_date", "pay_period_end"]),
        pay_date: resolve::date(record, &["pay_date", "check_date", "payday", "paid_at", "date"]),
        gross: resolve::number(record, &["gross", "gross_pay", "gross_amount", "total_gross"]),
        net: resolve::number(record, &["net", "net_pay", "net_amount", "total_net"]),
        taxes: resolve::number(record, &["taxes", "tax", "employer_taxes", "withholding"]),
        employee_count: resolve::number(record, &["employee_count", "employees", "headcount"])
            .filter(|n| *n >= 0.0)
            .map(|n| n.round() as u32),
        status: resolve::string(record, &["status", "state"])
            .unwrap_or_else(|| "draft".to_string()),
        label,
    }
}

// ============================================================================
// TAX FILING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxFiling {
    pub id: String,
    pub name: String,
    pub jurisdiction: Option<String>,
    pub period: Option<String>,
    pub amount_due: Option<f64>,
    pub amount_paid: Option<f64>,
    pub due_at: Option<DateTime<Utc>>,
    pub filed_at: Option<DateTime<Utc>>,

    /// Free-text status, defaults to "upcoming"
    pub status: String,
}

pub fn map_tax_filing(record: &RawRecord) -> TaxFiling {
    let name = resolve::string(
        record,
        &["name", "form", "form_name", "title", "filing_type"],
    )
    .unwrap_or_else(|| "Tax filing".to_string());

    TaxFiling {
        id: identity::entity_id(record, &["filing_id", "tax_id"], "tax", &name),
        jurisdiction: resolve::string(record, &["jurisdiction", "agency", "authority"]),
        period: resolve::string(record, &["period", "tax_period", "quarter"]),
        amount_due: resolve::number(
            record,
            &["amount_due", "amount", "liability", "estimated_amount", "balance_due"],
        ),
        amount_paid: resolve::number(record, &["amount_paid", "paid_amount"]),
        due_at: resolve::date(record, &["due_at", "due_date", "deadline"]),
        filed_at: resolve::date(record, &["filed_at", "filed_date", "submitted_at"]),
        status: resolve::string(record, &["status", "filing_status", "state"])
            .unwrap_or_else(|| "upcoming".to_string()),
        name,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::RawValue;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawRecord {
        match RawValue::from(value) {
            RawValue::Map(m) => m,
            _ => panic!("test record must be an object"),
        }
    }

    #[test]
    fn test_map_invoice() {
        let inv = map_invoice(&record(json!({
            "invoice_number": "INV-1001",
            "customer": "Maya",
            "amount": "$1,200.00",
            "amount_due": "200",
            "issue_date": "2025-01-15",
            "due_date": "2025-02-15",
            "status": "Sent"
        })));

        assert_eq!(inv.number.as_deref(), Some("INV-1001"));
        assert_eq!(inv.client_name, "Maya");
        assert_eq!(inv.total, Some(1200.0));
        assert_eq!(inv.balance_due, Some(200.0));
        assert_eq!(inv.issued_at.unwrap().to_rfc3339(), "2025-01-15T00:00:00+00:00");
        assert!(inv.due_at.is_some());
        assert_eq!(inv.status, "Sent");
        assert!(inv.id.starts_with("inv-maya-"));
    }

    #[test]
    fn test_map_invoice_missing_money_stays_unknown() {
        let inv = map_invoice(&record(json!({"total": "", "balance_due": null})));

        assert!(inv.total.is_none());
        assert!(inv.balance_due.is_none());
        assert_eq!(inv.client_name, "Unknown");
        assert_eq!(inv.status, "pending");
    }

    #[test]
    fn test_map_expense() {
        let exp = map_expense(&record(json!({
            "expense_id": "e-9",
            "vendor": "PetSupply Co",
            "category": " Supplies ",
            "cost": 84.5,
            "date": 1735689600000_i64
        })));

        assert_eq!(exp.id, "e-9");
        assert_eq!(exp.description, "PetSupply Co");
        assert_eq!(exp.category.as_deref(), Some("Supplies"));
        assert_eq!(exp.amount, Some(84.5));
        assert_eq!(exp.incurred_at.unwrap().to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_map_expense_defaults() {
        let exp = map_expense(&RawRecord::new());

        assert_eq!(exp.description, "Unnamed");
        assert_eq!(exp.status, "recorded");
    }

    #[test]
    fn test_map_payout_and_payment() {
        let payout = map_payout(&record(json!({"payee": "Ana", "net": "412.10", "status": "paid"})));
        assert_eq!(payout.recipient, "Ana");
        assert_eq!(payout.amount, Some(412.10));

        let payment = map_payment(&record(json!({
            "charge_id": "ch_1",
            "customer_name": "Jon",
            "gross": 100,
            "stripe_fee": "3.20",
            "status": "succeeded"
        })));
        assert_eq!(payment.id, "ch_1");
        assert_eq!(payment.payer, "Jon");
        assert_eq!(payment.fee, Some(3.2));
    }

    #[test]
    fn test_map_payroll_run() {
        let run = map_payroll_run(&record(json!({
            "pay_period": "Jan 1-15",
            "gross_pay": "8,000",
            "net_pay": 6100,
            "employees": "4",
            "check_date": "2025-01-17"
        })));

        assert_eq!(run.label, "Jan 1-15");
        assert_eq!(run.gross, Some(8000.0));
        assert_eq!(run.net, Some(6100.0));
        assert_eq!(run.employee_count, Some(4));
        assert_eq!(run.status, "draft");
        assert!(run.pay_date.is_some());
    }

    #[test]
    fn test_map_tax_filing() {
        let filing = map_tax_filing(&record(json!({
            "form": "941",
            "agency": "IRS",
            "quarter": "Q1 2025",
            "liability": "1,900",
            "deadline": "2025-04-30"
        })));

        assert_eq!(filing.name, "941");
        assert_eq!(filing.jurisdiction.as_deref(), Some("IRS"));
        assert_eq!(filing.amount_due, Some(1900.0));
        assert_eq!(filing.status, "upcoming");
    }
}
