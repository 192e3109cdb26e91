// 📈 Timeline Builders - Month-bucketed series for charts
//
// Items are bucketed by the UTC calendar month of one of their dates.
// Items without a date are left out of the buckets only; they still count
// in every other aggregate.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::entities::{Expense, Invoice};

/// Months shown on the cashflow chart unless the caller asks otherwise
pub const DEFAULT_CASHFLOW_MONTHS: usize = 6;

/// Month key -> summed value, ordered by key
pub type MonthlySeries = BTreeMap<String, f64>;

/// "YYYY-MM" from UTC calendar fields
pub fn month_key(date: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Key of the calendar month before the one containing `date`
pub fn previous_month_key(date: DateTime<Utc>) -> String {
    if date.month() == 1 {
        format!("{:04}-12", date.year() - 1)
    } else {
        format!("{:04}-{:02}", date.year(), date.month() - 1)
    }
}

/// Sum `amount` per month of `date`; undated items are skipped
pub fn monthly_totals<'a, T: 'a>(
    items: impl IntoIterator<Item = &'a T>,
    date: impl Fn(&T) -> Option<DateTime<Utc>>,
    amount: impl Fn(&T) -> Option<f64>,
) -> MonthlySeries {
    let mut series = MonthlySeries::new();
    for item in items {
        if let Some(when) = date(item) {
            *series.entry(month_key(when)).or_insert(0.0) += amount(item).unwrap_or(0.0);
        }
    }
    series
}

// ============================================================================
// MERGING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub month: String,
    /// One value per input series, in input order; 0 where a series has no bucket
    pub values: Vec<f64>,
}

/// Merge series on the union of their month keys, ascending, keeping only
/// the last `limit` months.
pub fn merge_series(series: &[&MonthlySeries], limit: usize) -> Vec<SeriesPoint> {
    let months: BTreeSet<&String> = series.iter().flat_map(|s| s.keys()).collect();
    let skip = months.len().saturating_sub(limit);

    months
        .into_iter()
        .skip(skip)
        .map(|month| SeriesPoint {
            month: month.clone(),
            values: series
                .iter()
                .map(|s| s.get(month).copied().unwrap_or(0.0))
                .collect(),
        })
        .collect()
}

// ============================================================================
// CASHFLOW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowPoint {
    pub month: String,
    pub revenue: f64,
    pub expenses: f64,
    /// revenue - expenses
    pub net: f64,
}

/// Revenue by invoice issue month against expenses by incurred month
pub fn cashflow_timeline(invoices: &[Invoice], expenses: &[Expense], months: usize) -> Vec<CashflowPoint> {
    let revenue = monthly_totals(invoices, |i| i.issued_at, |i| i.total);
    let spent = monthly_totals(expenses, |e| e.incurred_at, |e| e.amount);

    merge_series(&[&revenue, &spent], months)
        .into_iter()
        .map(|point| {
            let (revenue, expenses) = (point.values[0], point.values[1]);
            CashflowPoint {
                month: point.month,
                revenue,
                expenses,
                net: revenue - expenses,
            }
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
