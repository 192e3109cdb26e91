// 📊 Shared aggregation primitives
//
// Sums, category rollups and period-over-period change. Everything here is
// pure and total over its input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Label for entities without a usable category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Σ (v ?? 0)
pub fn sum_known(values: impl IntoIterator<Item = Option<f64>>) -> f64 {
    values.into_iter().map(|v| v.unwrap_or(0.0)).sum()
}

/// Start of the UTC calendar day containing `now`
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or(now)
}

/// True when `date` is present and strictly before today (UTC)
pub fn is_before_today(date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    date.map_or(false, |d| d < start_of_day(now))
}

// ============================================================================
// CATEGORY GROUPING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub count: usize,
    pub total: f64,
}

/// Trimmed category, or "Uncategorized" when absent or blank
pub fn normalize_category(category: Option<&str>) -> String {
    category
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(UNCATEGORIZED)
        .to_string()
}

/// Group items by category, summing amounts (unknown amounts count as 0).
///
/// Sorted by total descending, then category name ascending so equal totals
/// render in a stable order.
pub fn group_by_category<'a, T: 'a>(
    items: impl IntoIterator<Item = &'a T>,
    category: impl Fn(&T) -> Option<&str>,
    amount: impl Fn(&T) -> Option<f64>,
) -> Vec<CategoryTotal> {
    let mut groups: HashMap<String, (usize, f64)> = HashMap::new();

    for item in items {
        let entry = groups
            .entry(normalize_category(category(item)))
            .or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += amount(item).unwrap_or(0.0);
    }

    let mut totals: Vec<CategoryTotal> = groups
        .into_iter()
        .map(|(category, (count, total))| CategoryTotal {
            category,
            count,
            total,
        })
        .collect();

    totals.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
    });
    totals
}

// ============================================================================
// PERCENT CHANGE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentChange {
    pub trend: Trend,
    /// Signed percentage, e.g. 12.5 for +12.5%
    pub percent: f64,
}

/// Change from `previous` to `current`.
///
/// With no baseline (`previous == 0`) the change is flat when `current` is
/// also 0, otherwise ±100% following the sign of `current`.
pub fn percent_change(current: f64, previous: f64) -> PercentChange {
    let percent = if previous == 0.0 {
        if current == 0.0 {
            0.0
        } else {
            100.0_f64.copysign(current)
        }
    } else {
        (current - previous) / previous.abs() * 100.0
    };

    let trend = if percent > 0.0 {
        Trend::Up
    } else if percent < 0.0 {
        Trend::Down
    } else {
        Trend::Flat
    };

    PercentChange { trend, percent }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct Row {
        category: Option<&'static str>,
        amount: Option<f64>,
    }

    fn row(category: Option<&'static str>, amount: Option<f64>) -> Row {
        Row { category, amount }
    }

    #[test]
    fn test_sum_known() {
        assert_eq!(sum_known([Some(1.5), None, Some(2.5)]), 4.0);
        assert_eq!(sum_known(Vec::<Option<f64>>::new()), 0.0);
    }

    #[test]
    fn test_group_by_category() {
        let rows = vec![
            row(Some("Supplies"), Some(50.0)),
            row(Some(" Supplies "), Some(25.0)),
            row(None, Some(10.0)),
            row(Some(""), None),
            row(Some("Rent"), Some(1200.0)),
        ];

        let groups = group_by_category(&rows, |r| r.category, |r| r.amount);

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].category, "Rent");
        assert_eq!(groups[1].category, "Supplies");
        assert_eq!(groups[1].count, 2);
        assert_eq!(groups[1].total, 75.0);
        assert_eq!(groups[2].category, UNCATEGORIZED);
        assert_eq!(groups[2].count, 2);
        assert_eq!(groups[2].total, 10.0);
    }

    #[test]
    fn test_group_totals_partition_overall_total() {
        let rows = vec![
            row(Some("A"), Some(10.25)),
            row(Some("B"), Some(3.5)),
            row(Some("A"), None),
            row(None, Some(7.0)),
        ];

        let groups = group_by_category(&rows, |r| r.category, |r| r.amount);
        let grouped: f64 = groups.iter().map(|g| g.total).sum();
        let overall = sum_known(rows.iter().map(|r| r.amount));

        assert!((grouped - overall).abs() < 1e-9);
        assert_eq!(groups.iter().map(|g| g.count).sum::<usize>(), rows.len());
    }

    #[test]
    fn test_group_ties_sorted_by_name() {
        let rows = vec![row(Some("b"), Some(5.0)), row(Some("a"), Some(5.0))];
        let groups = group_by_category(&rows, |r| r.category, |r| r.amount);

        assert_eq!(groups[0].category, "a");
        assert_eq!(groups[1].category, "b");
    }

    #[test]
    fn test_percent_change_without_baseline() {
        assert_eq!(
            percent_change(0.0, 0.0),
            PercentChange { trend: Trend::Flat, percent: 0.0 }
        );
        assert_eq!(
            percent_change(50.0, 0.0),
            PercentChange { trend: Trend::Up, percent: 100.0 }
        );
        assert_eq!(
            percent_change(-10.0, 0.0),
            PercentChange { trend: Trend::Down, percent: -100.0 }
        );
    }

    #[test]
    fn test_percent_change_with_baseline() {
        let up = percent_change(150.0, 100.0);
        assert_eq!(up.trend, Trend::Up);
        assert_eq!(up.percent, 50.0);

        let down = percent_change(50.0, 100.0);
        assert_eq!(down.trend, Trend::Down);
        assert_eq!(down.percent, -50.0);

        // Negative baseline: improvement from -100 to -50 is +50%
        let recovering = percent_change(-50.0, -100.0);
        assert_eq!(recovering.trend, Trend::Up);
        assert_eq!(recovering.percent, 50.0);

        assert_eq!(percent_change(80.0, 80.0).trend, Trend::Flat);
    }

    #[test]
    fn test_is_before_today() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 15, 0, 0).unwrap();

        assert!(is_before_today(Some(Utc.with_ymd_and_hms(2025, 3, 9, 23, 59, 59).unwrap()), now));
        assert!(!is_before_today(Some(Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap()), now));
        assert!(!is_before_today(None, now));
    }
}
