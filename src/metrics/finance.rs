// 💵 Finance Metrics - Balances, overdue invoices, rollups, cashflow
//
// Paid/open classification for invoices:
//   paid  = status contains "paid" | "settled" | "complete"
//           and none of "unpaid" | "not paid" | "incomplete" | "partial"
//   open  = not paid and contains neither "void" nor "draft"
//
// Paid and open invoices are both receivable: a paid status that still
// carries an explicit balance counts that balance as outstanding.
//
// Remaining balance:
//   explicit balance  -> clamp(balance, 0, total)   (total only when known)
//   paid              -> 0
//   otherwise         -> max(0, total)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{
    group_by_category, is_before_today, percent_change, start_of_day, sum_known, CategoryTotal,
    PercentChange,
};
use crate::entities::{Expense, Invoice, Payment, Payout, PayrollRun, TaxFiling};
use crate::timeline::{self, CashflowPoint};
use crate::tone::{classify, StatusDomain, Tone, ToneCounts};

const PAID_KEYWORDS: &[&str] = &["paid", "settled", "complete"];
const NOT_PAID_KEYWORDS: &[&str] = &["unpaid", "not paid", "incomplete", "partial"];
const CLOSED_KEYWORDS: &[&str] = &["void", "draft"];

// ============================================================================
// CLASSIFICATION
// ============================================================================

pub fn is_paid(status: &str) -> bool {
    let status = status.to_lowercase();
    PAID_KEYWORDS.iter().any(|k| status.contains(*k))
        && !NOT_PAID_KEYWORDS.iter().any(|k| status.contains(*k))
}

pub fn is_open(status: &str) -> bool {
    let lowered = status.to_lowercase();
    !is_paid(status) && !CLOSED_KEYWORDS.iter().any(|k| lowered.contains(*k))
}

/// Paid or open; void and draft invoices carry no receivable
pub fn is_receivable(status: &str) -> bool {
    is_paid(status) || is_open(status)
}

/// Unpaid remainder of an invoice, never negative and never above the total
pub fn remaining_invoice_balance(invoice: &Invoice) -> f64 {
    if let Some(balance) = invoice.balance_due {
        let balance = balance.max(0.0);
        return match invoice.total {
            Some(total) if total >= 0.0 => balance.min(total),
            _ => balance,
        };
    }

    let total = invoice.total.unwrap_or(0.0);
    let collected = if is_paid(&invoice.status) { total } else { 0.0 };
    (total - collected).max(0.0)
}

/// Balance outstanding and due date strictly before today (UTC).
/// Invoices without a due date are never overdue.
pub fn is_invoice_overdue(invoice: &Invoice, now: DateTime<Utc>) -> bool {
    remaining_invoice_balance(invoice) > 0.0 && is_before_today(invoice.due_at, now)
}

// ============================================================================
// SUMMARIES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceSummary {
    pub count: usize,
    /// Σ total over every invoice
    pub billed: f64,
    /// Σ (total - remaining) over invoices that are paid or open
    pub collected: f64,
    /// Σ remaining over invoices that are paid or open
    pub outstanding: f64,
    pub open_count: usize,
    pub paid_count: usize,
    pub overdue_count: usize,
    pub overdue_amount: f64,
    pub tones: ToneCounts,
}

pub fn summarize_invoices(invoices: &[Invoice], now: DateTime<Utc>) -> InvoiceSummary {
    let mut summary = InvoiceSummary {
        count: invoices.len(),
        billed: sum_known(invoices.iter().map(|i| i.total)),
        collected: 0.0,
        outstanding: 0.0,
        open_count: 0,
        paid_count: 0,
        overdue_count: 0,
        overdue_amount: 0.0,
        tones: ToneCounts::tally(StatusDomain::Invoice, invoices.iter().map(|i| i.status.as_str())),
    };

    for invoice in invoices {
        let remaining = remaining_invoice_balance(invoice);
        let paid = is_paid(&invoice.status);
        let open = is_open(&invoice.status);

        if paid {
            summary.paid_count += 1;
        }
        if open {
            summary.open_count += 1;
        }
        if paid || open {
            summary.collected += (invoice.total.unwrap_or(0.0) - remaining).max(0.0);
            summary.outstanding += remaining;
            if is_invoice_overdue(invoice, now) {
                summary.overdue_count += 1;
                summary.overdue_amount += remaining;
            }
        }
    }

    summary
}

/// Paid or open invoices past due, oldest due date first
pub fn overdue_invoices<'a>(invoices: &'a [Invoice], now: DateTime<Utc>) -> Vec<&'a Invoice> {
    let mut overdue: Vec<&Invoice> = invoices
        .iter()
        .filter(|i| is_receivable(&i.status) && is_invoice_overdue(i, now))
        .collect();
    overdue.sort_by(|a, b| a.due_at.cmp(&b.due_at).then_with(|| a.id.cmp(&b.id)));
    overdue
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSummary {
    pub count: usize,
    pub total: f64,
    pub categories: Vec<CategoryTotal>,
    pub tones: ToneCounts,
}

pub fn summarize_expenses(expenses: &[Expense]) -> ExpenseSummary {
    ExpenseSummary {
        count: expenses.len(),
        total: sum_known(expenses.iter().map(|e| e.amount)),
        categories: group_by_category(expenses, |e| e.category.as_deref(), |e| e.amount),
        tones: ToneCounts::tally(StatusDomain::Expense, expenses.iter().map(|e| e.status.as_str())),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutSummary {
    pub count: usize,
    pub paid_total: f64,
    pub pending_total: f64,
    pub failed_count: usize,
    /// Earliest scheduled date of a pending payout
    pub next_scheduled: Option<DateTime<Utc>>,
    pub tones: ToneCounts,
}

fn payout_tone(payout: &Payout) -> Tone {
    classify(StatusDomain::Payout, &payout.status)
}

pub fn summarize_payouts(payouts: &[Payout]) -> PayoutSummary {
    let tone_of = payout_tone;

    PayoutSummary {
        count: payouts.len(),
        paid_total: sum_known(payouts.iter().filter(|p| tone_of(p) == Tone::Positive).map(|p| p.amount)),
        pending_total: sum_known(payouts.iter().filter(|p| tone_of(p) == Tone::Pending).map(|p| p.amount)),
        failed_count: payouts.iter().filter(|p| tone_of(p) == Tone::Negative).count(),
        next_scheduled: payouts
            .iter()
            .filter(|p| tone_of(p) == Tone::Pending)
            .filter_map(|p| p.scheduled_for)
            .min(),
        tones: ToneCounts::tally(StatusDomain::Payout, payouts.iter().map(|p| p.status.as_str())),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub count: usize,
    /// Σ amount over successful payments
    pub gross: f64,
    /// Σ fee over successful payments
    pub fees: f64,
    pub net: f64,
    pub succeeded_count: usize,
    pub failed_count: usize,
    pub tones: ToneCounts,
}

pub fn summarize_payments(payments: &[Payment]) -> PaymentSummary {
    let succeeded: Vec<&Payment> = payments
        .iter()
        .filter(|p| classify(StatusDomain::Payment, &p.status) == Tone::Positive)
        .collect();
    let gross = sum_known(succeeded.iter().map(|p| p.amount));
    let fees = sum_known(succeeded.iter().map(|p| p.fee));
    let tones = ToneCounts::tally(StatusDomain::Payment, payments.iter().map(|p| p.status.as_str()));

    PaymentSummary {
        count: payments.len(),
        gross,
        fees,
        net: gross - fees,
        succeeded_count: succeeded.len(),
        failed_count: tones.negative,
        tones,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollSummary {
    pub runs: usize,
    pub gross_total: f64,
    pub net_total: f64,
    pub tax_total: f64,
    /// Most recent pay date before today
    pub last_pay_date: Option<DateTime<Utc>>,
    /// Earliest pay date from today on
    pub next_pay_date: Option<DateTime<Utc>>,
    pub tones: ToneCounts,
}

pub fn summarize_payroll(runs: &[PayrollRun], now: DateTime<Utc>) -> PayrollSummary {
    let today = start_of_day(now);

    PayrollSummary {
        runs: runs.len(),
        gross_total: sum_known(runs.iter().map(|r| r.gross)),
        net_total: sum_known(runs.iter().map(|r| r.net)),
        tax_total: sum_known(runs.iter().map(|r| r.taxes)),
        last_pay_date: runs.iter().filter_map(|r| r.pay_date).filter(|d| *d < today).max(),
        next_pay_date: runs.iter().filter_map(|r| r.pay_date).filter(|d| *d >= today).min(),
        tones: ToneCounts::tally(StatusDomain::Payroll, runs.iter().map(|r| r.status.as_str())),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxSummary {
    pub count: usize,
    /// Σ max(0, due - paid) over filings not yet filed or paid
    pub amount_due_total: f64,
    pub overdue_count: usize,
    pub next_due_name: Option<String>,
    pub next_due_at: Option<DateTime<Utc>>,
    pub tones: ToneCounts,
}

fn tax_settled(filing: &TaxFiling) -> bool {
    filing.filed_at.is_some() || classify(StatusDomain::TaxFiling, &filing.status) == Tone::Positive
}

pub fn summarize_taxes(filings: &[TaxFiling], now: DateTime<Utc>) -> TaxSummary {
    let unsettled: Vec<&TaxFiling> = filings.iter().filter(|f| !tax_settled(f)).collect();
    let today = start_of_day(now);

    let next_due = unsettled
        .iter()
        .filter(|f| f.due_at.map_or(false, |d| d >= today))
        .min_by(|a, b| a.due_at.cmp(&b.due_at).then_with(|| a.id.cmp(&b.id)));

    TaxSummary {
        count: filings.len(),
        amount_due_total: unsettled
            .iter()
            .map(|f| (f.amount_due.unwrap_or(0.0) - f.amount_paid.unwrap_or(0.0)).max(0.0))
            .sum(),
        overdue_count: unsettled.iter().filter(|f| is_before_today(f.due_at, now)).count(),
        next_due_name: next_due.map(|f| f.name.clone()),
        next_due_at: next_due.and_then(|f| f.due_at),
        tones: ToneCounts::tally(StatusDomain::TaxFiling, filings.iter().map(|f| f.status.as_str())),
    }
}

// ============================================================================
// FINANCE REPORT
// ============================================================================

/// Every finance dataset for one page render
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinanceSnapshot {
    pub invoices: Vec<Invoice>,
    pub expenses: Vec<Expense>,
    pub payouts: Vec<Payout>,
    pub payments: Vec<Payment>,
    pub payroll_runs: Vec<PayrollRun>,
    pub tax_filings: Vec<TaxFiling>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceReport {
    pub generated_at: DateTime<Utc>,
    pub invoices: InvoiceSummary,
    pub invoice_categories: Vec<CategoryTotal>,
    pub expenses: ExpenseSummary,
    pub payouts: PayoutSummary,
    pub payments: PaymentSummary,
    pub payroll: PayrollSummary,
    pub taxes: TaxSummary,
    /// collected - expenses
    pub net_income: f64,
    pub cashflow: Vec<CashflowPoint>,
    /// This calendar month against the previous one
    pub revenue_trend: PercentChange,
    pub expense_trend: PercentChange,
}

pub fn finance_report(snapshot: &FinanceSnapshot, now: DateTime<Utc>, months: usize) -> FinanceReport {
    let invoices = summarize_invoices(&snapshot.invoices, now);
    let expenses = summarize_expenses(&snapshot.expenses);

    let revenue_by_month = timeline::monthly_totals(&snapshot.invoices, |i| i.issued_at, |i| i.total);
    let expense_by_month = timeline::monthly_totals(&snapshot.expenses, |e| e.incurred_at, |e| e.amount);
    let (this_month, last_month) = (timeline::month_key(now), timeline::previous_month_key(now));
    let month_value = |series: &timeline::MonthlySeries, key: &str| series.get(key).copied().unwrap_or(0.0);

    FinanceReport {
        generated_at: now,
        invoice_categories: group_by_category(
            &snapshot.invoices,
            |i| i.category.as_deref(),
            |i| i.total,
        ),
        payouts: summarize_payouts(&snapshot.payouts),
        payments: summarize_payments(&snapshot.payments),
        payroll: summarize_payroll(&snapshot.payroll_runs, now),
        taxes: summarize_taxes(&snapshot.tax_filings, now),
        net_income: invoices.collected - expenses.total,
        cashflow: timeline::cashflow_timeline(&snapshot.invoices, &snapshot.expenses, months),
        revenue_trend: percent_change(
            month_value(&revenue_by_month, &this_month),
            month_value(&revenue_by_month, &last_month),
        ),
        expense_trend: percent_change(
            month_value(&expense_by_month, &this_month),
            month_value(&expense_by_month, &last_month),
        ),
        invoices,
        expenses,
    }
}

// ============================================================================
// TESTS
// ============================================================================
