// 📦 Inventory Metrics - Stock levels, reorders, purchase orders, counts
//
// available  = max(0, on_hand - reserved)          unknowns count as 0
// par target = par_level, falling back to reorder_point
// below par  = available < par target              no target -> never

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{group_by_category, is_before_today, sum_known, CategoryTotal};
use crate::entities::{CycleCount, InventoryItem, PurchaseOrder, StockAdjustment, Vendor};
use crate::tone::{classify, StatusDomain, Tone, ToneCounts};

// ============================================================================
// STOCK LEVELS
// ============================================================================

pub fn available(item: &InventoryItem) -> f64 {
    (item.on_hand.unwrap_or(0.0) - item.reserved.unwrap_or(0.0)).max(0.0)
}

pub fn par_target(item: &InventoryItem) -> Option<f64> {
    item.par_level.or(item.reorder_point)
}

pub fn is_below_par(item: &InventoryItem) -> bool {
    par_target(item).map_or(false, |target| available(item) < target)
}

/// on_hand x unit cost; negative stock and unknown cost count as 0
pub fn stock_value(item: &InventoryItem) -> f64 {
    item.on_hand.unwrap_or(0.0).max(0.0) * item.unit_cost.unwrap_or(0.0)
}

/// The explicit status, or one derived from stock levels when the row has none
pub fn stock_status(item: &InventoryItem) -> String {
    if let Some(status) = &item.status {
        return status.clone();
    }
    if item.on_hand.is_none() {
        return String::new();
    }

    let status = if available(item) <= 0.0 {
        "out of stock"
    } else if is_below_par(item) {
        "low"
    } else {
        "in stock"
    };
    status.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderSuggestion {
    pub item_id: String,
    pub name: String,
    pub sku: Option<String>,
    pub vendor: Option<String>,
    pub available: f64,
    pub par_target: f64,
    /// Whole units needed to get back to the target
    pub suggested_quantity: f64,
    /// suggested_quantity x unit cost, when the cost is known
    pub estimated_cost: Option<f64>,
}

/// Below-par items, largest shortfall first
pub fn reorder_suggestions(items: &[InventoryItem]) -> Vec<ReorderSuggestion> {
    let mut suggestions: Vec<ReorderSuggestion> = items
        .iter()
        .filter_map(|item| {
            let target = par_target(item)?;
            let on_shelf = available(item);
            if on_shelf >= target {
                return None;
            }
            let suggested_quantity = (target - on_shelf).ceil();
            Some(ReorderSuggestion {
                item_id: item.id.clone(),
                name: item.name.clone(),
                sku: item.sku.clone(),
                vendor: item.vendor.clone(),
                available: on_shelf,
                par_target: target,
                suggested_quantity,
                estimated_cost: item.unit_cost.map(|cost| cost * suggested_quantity),
            })
        })
        .collect();

    suggestions.sort_by(|a, b| {
        b.suggested_quantity
            .total_cmp(&a.suggested_quantity)
            .then_with(|| a.name.cmp(&b.name))
    });
    suggestions
}

// ============================================================================
// PURCHASE ORDERS
// ============================================================================

/// Stored total, else the sum of line extended costs
pub fn order_total(order: &PurchaseOrder) -> f64 {
    order
        .total
        .unwrap_or_else(|| order.line_items.iter().map(|line| line.extended_cost()).sum())
}

fn is_received(order: &PurchaseOrder) -> bool {
    order.received_at.is_some() || classify(StatusDomain::PurchaseOrder, &order.status) == Tone::Positive
}

fn is_open_order(order: &PurchaseOrder) -> bool {
    !is_received(order) && classify(StatusDomain::PurchaseOrder, &order.status) == Tone::Pending
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrderSummary {
    pub count: usize,
    pub open_count: usize,
    pub open_value: f64,
    /// Open orders whose expected date is before today
    pub overdue_count: usize,
    pub received_count: usize,
    pub tones: ToneCounts,
}

pub fn summarize_purchase_orders(orders: &[PurchaseOrder], now: DateTime<Utc>) -> PurchaseOrderSummary {
    let open: Vec<&PurchaseOrder> = orders.iter().filter(|o| is_open_order(o)).collect();

    PurchaseOrderSummary {
        count: orders.len(),
        open_count: open.len(),
        open_value: open.iter().map(|o| order_total(o)).sum(),
        overdue_count: open.iter().filter(|o| is_before_today(o.expected_at, now)).count(),
        received_count: orders.iter().filter(|o| is_received(o)).count(),
        tones: ToneCounts::tally(
            StatusDomain::PurchaseOrder,
            orders.iter().map(|o| o.status.as_str()),
        ),
    }
}

// ============================================================================
// ADJUSTMENTS & CYCLE COUNTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentSummary {
    pub count: usize,
    pub net_change: f64,
    /// `total` is the net unit change for the reason
    pub by_reason: Vec<CategoryTotal>,
}

pub fn summarize_adjustments(adjustments: &[StockAdjustment]) -> AdjustmentSummary {
    AdjustmentSummary {
        count: adjustments.len(),
        net_change: sum_known(adjustments.iter().map(|a| a.quantity_change)),
        by_reason: group_by_category(adjustments, |a| a.reason.as_deref(), |a| a.quantity_change),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleCountSummary {
    pub count: usize,
    /// Counts with both expected and counted quantities
    pub completed: usize,
    pub discrepancies: usize,
    /// Σ (counted - expected)
    pub net_variance: f64,
    /// Σ |counted - expected|
    pub absolute_variance: f64,
    /// 100 x (1 - absolute variance / expected units), within [0, 100]
    pub accuracy_percent: Option<f64>,
    pub tones: ToneCounts,
}

pub fn summarize_cycle_counts(counts: &[CycleCount]) -> CycleCountSummary {
    let measured: Vec<(f64, f64)> = counts
        .iter()
        .filter_map(|c| Some((c.expected_quantity?, c.variance()?)))
        .collect();

    let expected_units: f64 = measured.iter().map(|(expected, _)| expected.abs()).sum();
    let absolute_variance: f64 = measured.iter().map(|(_, variance)| variance.abs()).sum();
    let accuracy_percent = if expected_units > 0.0 {
        Some(((1.0 - absolute_variance / expected_units) * 100.0).clamp(0.0, 100.0))
    } else {
        None
    };

    CycleCountSummary {
        count: counts.len(),
        completed: measured.len(),
        discrepancies: measured.iter().filter(|(_, variance)| *variance != 0.0).count(),
        net_variance: measured.iter().map(|(_, variance)| variance).sum(),
        absolute_variance,
        accuracy_percent,
        tones: ToneCounts::tally(StatusDomain::CycleCount, counts.iter().map(|c| c.status.as_str())),
    }
}

// ============================================================================
// VENDORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorSummary {
    pub count: usize,
    pub active: usize,
    pub average_lead_time_days: Option<f64>,
    pub tones: ToneCounts,
}

pub fn summarize_vendors(vendors: &[Vendor]) -> VendorSummary {
    let lead_times: Vec<f64> = vendors.iter().filter_map(|v| v.lead_time_days).collect();
    let tones = ToneCounts::tally(StatusDomain::Vendor, vendors.iter().map(|v| v.status.as_str()));

    VendorSummary {
        count: vendors.len(),
        active: tones.positive,
        average_lead_time_days: if lead_times.is_empty() {
            None
        } else {
            Some(lead_times.iter().sum::<f64>() / lead_times.len() as f64)
        },
        tones,
    }
}

// ============================================================================
// INVENTORY REPORT
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub vendors: Vec<Vendor>,
    pub purchase_orders: Vec<PurchaseOrder>,
    pub items: Vec<InventoryItem>,
    pub adjustments: Vec<StockAdjustment>,
    pub cycle_counts: Vec<CycleCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryReport {
    pub generated_at: DateTime<Utc>,
    pub sku_count: usize,
    pub units_on_hand: f64,
    pub units_available: f64,
    pub stock_value: f64,
    pub below_par: Vec<ReorderSuggestion>,
    /// `total` is stock value per category
    pub categories: Vec<CategoryTotal>,
    pub item_tones: ToneCounts,
    pub purchase_orders: PurchaseOrderSummary,
    pub adjustments: AdjustmentSummary,
    pub cycle_counts: CycleCountSummary,
    pub vendors: VendorSummary,
}

pub fn inventory_report(snapshot: &InventorySnapshot, now: DateTime<Utc>) -> InventoryReport {
    let items = &snapshot.items;
    let statuses: Vec<String> = items.iter().map(stock_status).collect();

    InventoryReport {
        generated_at: now,
        sku_count: items.len(),
        units_on_hand: sum_known(items.iter().map(|i| i.on_hand)),
        units_available: items.iter().map(available).sum(),
        stock_value: items.iter().map(stock_value).sum(),
        below_par: reorder_suggestions(items),
        categories: group_by_category(items, |i| i.category.as_deref(), |i| Some(stock_value(i))),
        item_tones: ToneCounts::tally(StatusDomain::Inventory, statuses.iter().map(String::as_str)),
        purchase_orders: summarize_purchase_orders(&snapshot.purchase_orders, now),
        adjustments: summarize_adjustments(&snapshot.adjustments),
        cycle_counts: summarize_cycle_counts(&snapshot.cycle_counts),
        vendors: summarize_vendors(&snapshot.vendors),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        map_cycle_count, map_inventory_item, map_purchase_order, map_stock_adjustment, map_vendor,
    };
    use crate::value::{RawRecord, RawValue};
    use chrono::TimeZone;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawRecord {
        match RawValue::from(value) {
            RawValue::Map(m) => m,
            _ => panic!("test record must be an object"),
        }
    }

    fn item(value: serde_json::Value) -> InventoryItem {
        map_inventory_item(&record(value))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_below_par_falls_back_to_reorder_point() {
        let shampoo = item(json!({"on_hand": 9, "reserved": 3, "reorder_point": 15}));

        assert_eq!(available(&shampoo), 6.0);
        assert!(is_below_par(&shampoo));
    }

    #[test]
    fn test_par_level_wins_over_reorder_point() {
        let towels = item(json!({"on_hand": 10, "par_level": 8, "reorder_point": 20}));
        assert!(!is_below_par(&towels));

        let untracked = item(json!({"on_hand": 0}));
        assert!(!is_below_par(&untracked));

        let oversold = item(json!({"on_hand": 2, "reserved": 5, "par": 1}));
        assert_eq!(available(&oversold), 0.0);
        assert!(is_below_par(&oversold));
    }

    #[test]
    fn test_stock_status_derivation() {
        assert_eq!(stock_status(&item(json!({"on_hand": 0, "par": 4}))), "out of stock");
        assert_eq!(stock_status(&item(json!({"on_hand": 2, "par": 4}))), "low");
        assert_eq!(stock_status(&item(json!({"on_hand": 6, "par": 4}))), "in stock");
        assert_eq!(stock_status(&item(json!({"status": "Discontinued"}))), "Discontinued");
        assert_eq!(stock_status(&item(json!({"name": "Mystery"}))), "");
    }

    #[test]
    fn test_reorder_suggestions() {
        let items = vec![
            item(json!({"name": "Shampoo", "on_hand": 9, "reserved": 3, "reorder_point": 15, "cost": 12.5})),
            item(json!({"name": "Bows", "on_hand": 1.5, "par": 4})),
            item(json!({"name": "Towels", "on_hand": 40, "par": 20})),
        ];

        let suggestions = reorder_suggestions(&items);

        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].name, "Shampoo");
        assert_eq!(suggestions[0].suggested_quantity, 9.0);
        assert_eq!(suggestions[0].estimated_cost, Some(112.5));
        assert_eq!(suggestions[1].suggested_quantity, 3.0);
        assert_eq!(suggestions[1].estimated_cost, None);
    }

    #[test]
    fn test_order_total_falls_back_to_lines() {
        let explicit = map_purchase_order(&record(json!({"total": 500, "items": [{"qty": 2, "unit_cost": 10}]})));
        assert_eq!(order_total(&explicit), 500.0);

        let from_lines = map_purchase_order(&record(json!({
            "items": [
                {"name": "Clippers", "qty": 2, "unit_cost": 45},
                {"name": "Blades", "line_total": 30},
                "Mystery box"
            ]
        })));
        assert_eq!(order_total(&from_lines), 120.0);
    }

    #[test]
    fn test_summarize_purchase_orders() {
        let orders: Vec<PurchaseOrder> = [
            json!({"status": "ordered", "total": 200, "expected_date": "2025-03-10"}),
            json!({"status": "submitted", "total": 100, "expected_date": "2025-03-20"}),
            json!({"status": "received", "total": 300}),
            json!({"status": "ordered", "total": 50, "received_at": "2025-03-12"}),
            json!({"status": "cancelled", "total": 75}),
        ]
        .into_iter()
        .map(|r| map_purchase_order(&record(r)))
        .collect();

        let summary = summarize_purchase_orders(&orders, now());

        assert_eq!(summary.open_count, 2);
        assert_eq!(summary.open_value, 300.0);
        assert_eq!(summary.overdue_count, 1);
        assert_eq!(summary.received_count, 2);
    }

    #[test]
    fn test_summarize_adjustments_and_counts() {
        let adjustments: Vec<StockAdjustment> = [
            json!({"item": "Shampoo", "change": -2, "reason": "damaged"}),
            json!({"item": "Shampoo", "change": 12, "reason": "restock"}),
            json!({"item": "Bows", "change": -1, "reason": "damaged"}),
        ]
        .into_iter()
        .map(|r| map_stock_adjustment(&record(r)))
        .collect();

        let summary = summarize_adjustments(&adjustments);
        assert_eq!(summary.net_change, 9.0);
        assert_eq!(summary.by_reason[0].category, "restock");
        assert_eq!(summary.by_reason[1].total, -3.0);

        let counts: Vec<CycleCount> = [
            json!({"expected": 4, "counted": 3, "status": "complete"}),
            json!({"expected": 4, "counted": 4, "status": "complete"}),
            json!({"expected": 5, "status": "scheduled"}),
        ]
        .into_iter()
        .map(|r| map_cycle_count(&record(r)))
        .collect();

        let summary = summarize_cycle_counts(&counts);
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.discrepancies, 1);
        assert_eq!(summary.net_variance, -1.0);
        assert_eq!(summary.accuracy_percent, Some(87.5));
        assert!(summarize_cycle_counts(&[]).accuracy_percent.is_none());
    }

    #[test]
    fn test_inventory_report() {
        let snapshot = InventorySnapshot {
            items: vec![
                item(json!({"name": "Shampoo", "category": "Grooming", "on_hand": 9, "reserved": 3, "reorder_point": 15, "cost": 10})),
                item(json!({"name": "Collars", "category": "Retail", "on_hand": 4, "cost": 8})),
            ],
            vendors: vec![
                map_vendor(&record(json!({"name": "PetSupply", "lead_time_days": 4}))),
                map_vendor(&record(json!({"name": "OldCo", "status": "inactive", "lead_time_days": 10}))),
            ],
            ..InventorySnapshot::default()
        };

        let report = inventory_report(&snapshot, now());

        assert_eq!(report.sku_count, 2);
        assert_eq!(report.units_on_hand, 13.0);
        assert_eq!(report.units_available, 10.0);
        assert_eq!(report.stock_value, 122.0);
        assert_eq!(report.below_par.len(), 1);
        assert_eq!(report.categories[0].category, "Grooming");
        assert_eq!(report.item_tones.pending, 1);
        assert_eq!(report.item_tones.positive, 1);
        assert_eq!(report.vendors.active, 1);
        assert_eq!(report.vendors.average_lead_time_days, Some(7.0));
    }
}
