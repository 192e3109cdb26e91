// Entity Mappers - raw rows in, typed entities out
//
// Every mapper is a total function: it never fails, it never drops a row.
// Fields that cannot be coerced come out as `None`, lists come out empty,
// and names fall back to a literal ("Walk-in", "Unknown", "Unnamed").

pub mod clients;
pub mod finance;
pub mod inventory;
pub mod scheduling;
pub mod staff;

pub use clients::{map_client, Client, VaccineRecord};
pub use finance::{
    map_expense, map_invoice, map_payment, map_payout, map_payroll_run, map_tax_filing, Expense,
    Invoice, Payment, Payout, PayrollRun, TaxFiling,
};
pub use inventory::{
    map_cycle_count, map_inventory_item, map_purchase_order, map_stock_adjustment, map_vendor,
    CycleCount, InventoryItem, LineItem, PurchaseOrder, StockAdjustment, Vendor,
};
pub use scheduling::{map_appointment, map_waitlist_entry, Appointment, WaitlistEntry};
pub use staff::{
    map_onboarding_checklist, map_performance_review, map_shift, map_staff_member,
    ChecklistItem, OnboardingChecklist, PerformanceReview, ReviewGoal, Shift, StaffMember,
};

use crate::identity;
use crate::resolve;
use crate::value::{RawRecord, RawValue};

/// Anything with a collection-unique id
pub trait Entity {
    fn id(&self) -> &str;
    fn id_mut(&mut self) -> &mut String;
}

macro_rules! impl_entity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Entity for $ty {
                fn id(&self) -> &str {
                    &self.id
                }

                fn id_mut(&mut self) -> &mut String {
                    &mut self.id
                }
            }
        )*
    };
}

impl_entity!(
    Appointment,
    WaitlistEntry,
    Client,
    Invoice,
    Expense,
    Payout,
    Payment,
    PayrollRun,
    TaxFiling,
    Vendor,
    PurchaseOrder,
    InventoryItem,
    StockAdjustment,
    CycleCount,
    StaffMember,
    Shift,
    PerformanceReview,
    OnboardingChecklist,
);

/// Map a whole table and make ids unique within it
pub fn map_records<T: Entity>(records: &[RawRecord], mapper: impl Fn(&RawRecord) -> T) -> Vec<T> {
    let mut entities: Vec<T> = records.iter().map(mapper).collect();
    identity::make_unique(entities.iter_mut().map(|e| e.id_mut()));
    entities
}

// ============================================================================
// NESTED STRUCTURES
// ============================================================================

/// Key that nested label-only entries are stored under
pub(crate) const LABEL_KEY: &str = "label";

/// Flatten a nested collection into records for a sub-mapper.
///
/// Accepted shapes, taken from the first candidate key that yields entries:
/// - array of objects: each object as-is
/// - array of strings: `{label}` only
/// - keyed object: one record per key, the key becoming the label; object
///   values are merged in, scalar values kept under `value`
/// - a comma/newline separated string: label-only entries
pub(crate) fn nested_records(record: &RawRecord, keys: &[&str]) -> Vec<RawRecord> {
    keys.iter()
        .filter_map(|key| record.get(key))
        .map(nested_from_value)
        .find(|entries| !entries.is_empty())
        .unwrap_or_default()
}

fn nested_from_value(value: &RawValue) -> Vec<RawRecord> {
    match value {
        RawValue::List(items) => items
            .iter()
            .filter_map(|item| match item {
                RawValue::Map(m) => Some(m.clone()),
                RawValue::Text(_) => {
                    resolve::text_value(item).map(|label| RawRecord::new().with(LABEL_KEY, label))
                }
                _ => None,
            })
            .collect(),
        RawValue::Map(map) => map
            .iter()
            .map(|(key, inner)| match inner {
                RawValue::Map(m) => m.clone().with(LABEL_KEY, key.clone()),
                other => RawRecord::new()
                    .with(LABEL_KEY, key.clone())
                    .with("value", other.clone()),
            })
            .collect(),
        RawValue::Text(_) => resolve::list_value(value)
            .into_iter()
            .map(|label| RawRecord::new().with(LABEL_KEY, label))
            .collect(),
        _ => Vec::new(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RawRecord {
        match RawValue::from(value) {
            RawValue::Map(m) => m,
            _ => panic!("test record must be an object"),
        }
    }

    #[test]
    fn test_nested_array_of_objects() {
        let r = record(json!({"items": [{"name": "Shampoo", "qty": 2}, {"name": "Towels"}]}));
        let nested = nested_records(&r, &["items"]);

        assert_eq!(nested.len(), 2);
        assert_eq!(resolve::string(&nested[0], &["name"]), Some("Shampoo".to_string()));
    }

    #[test]
    fn test_nested_array_of_strings() {
        let r = record(json!({"items": ["Shampoo", "  ", "Towels"]}));
        let nested = nested_records(&r, &["items"]);

        assert_eq!(nested.len(), 2);
        assert_eq!(resolve::string(&nested[1], &[LABEL_KEY]), Some("Towels".to_string()));
    }

    #[test]
    fn test_nested_keyed_object() {
        let r = record(json!({"items": {"Rabies": {"expires": "2026-01-01"}, "Bordetella": true}}));
        let nested = nested_records(&r, &["items"]);

        assert_eq!(nested.len(), 2);
        // BTreeMap order
        assert_eq!(resolve::string(&nested[0], &[LABEL_KEY]), Some("Bordetella".to_string()));
        assert_eq!(resolve::boolean(&nested[0], &["value"]), Some(true));
        assert_eq!(resolve::string(&nested[1], &[LABEL_KEY]), Some("Rabies".to_string()));
        assert!(resolve::date(&nested[1], &["expires"]).is_some());
    }

    #[test]
    fn test_nested_falls_through_empty_candidates() {
        let r = record(json!({"line_items": [], "items": "Bath, Nails"}));
        let nested = nested_records(&r, &["line_items", "items"]);

        assert_eq!(nested.len(), 2);
    }

    #[test]
    fn test_map_records_unique_ids() {
        let rows = vec![
            record(json!({"id": "a", "client_name": "Maya"})),
            record(json!({"id": "a", "client_name": "Jon"})),
        ];
        let appointments = map_records(&rows, map_appointment);

        assert_eq!(appointments[0].id, "a");
        assert_eq!(appointments[1].id, "a-2");
    }

    #[test]
    fn test_map_records_identical_rows_without_ids() {
        let row = record(json!({"client_name": "Maya", "start_time": "2025-01-01T10:00:00Z"}));
        let appointments = map_records(&[row.clone(), row], map_appointment);

        assert_ne!(appointments[0].id, appointments[1].id);
        assert!(appointments[1].id.starts_with(&appointments[0].id));
    }
}
