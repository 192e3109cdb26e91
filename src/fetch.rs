// 🔄 Fetch Orchestration - Load every dataset a page needs, then aggregate
//
// Per page:
//   1. issue one fetch per dataset concurrently (tokio::join!)
//   2. a failed fetch degrades only its own dataset:
//        inventory datasets -> fixed illustrative rows
//        everything else    -> empty collection
//   3. map rows through the entity mappers (ids made unique per table)
//   4. aggregate once every fetch has finished
//
// Failures are logged with `tracing::warn!` and never surface to the page.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::{Dataset, TableConfig};
use crate::entities::{self, map_records, Client, Entity};
use crate::error::FetchResult;
use crate::metrics::{
    client_report, finance_report, inventory_report, scheduling_report, staff_report, ClientReport,
    FinanceReport, FinanceSnapshot, InventoryReport, InventorySnapshot, SchedulingReport,
    SchedulingSnapshot, StaffReport, StaffSnapshot,
};
use crate::value::{records_from_json, RawRecord};

// ============================================================================
// TABLE STORE
// ============================================================================

/// The one capability the dashboard needs from a data source
#[async_trait]
pub trait TableStore: Send + Sync {
    /// All rows of `table`, or why they could not be read
    async fn fetch_table(&self, table: &str) -> FetchResult<Vec<RawRecord>>;
}

#[async_trait]
impl<T: TableStore + ?Sized> TableStore for Arc<T> {
    async fn fetch_table(&self, table: &str) -> FetchResult<Vec<RawRecord>> {
        (**self).fetch_table(table).await
    }
}

// ============================================================================
// PAGES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Finance,
    Scheduling,
    Clients,
    Inventory,
    Staff,
}

impl Page {
    pub const ALL: [Page; 5] = [Page::Finance, Page::Scheduling, Page::Clients, Page::Inventory, Page::Staff];

    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Finance => "finance",
            Page::Scheduling => "scheduling",
            Page::Clients => "clients",
            Page::Inventory => "inventory",
            Page::Staff => "staff",
        }
    }

    pub fn from_name(name: &str) -> Option<Page> {
        let name = name.trim().to_lowercase();
        Page::ALL.into_iter().find(|p| p.as_str() == name)
    }

    /// Datasets fetched to render the page
    pub fn datasets(&self) -> &'static [Dataset] {
        match self {
            Page::Finance => &[
                Dataset::Invoices,
                Dataset::Expenses,
                Dataset::Payouts,
                Dataset::Payments,
                Dataset::PayrollRuns,
                Dataset::TaxFilings,
            ],
            Page::Scheduling => &[Dataset::Appointments, Dataset::Waitlist],
            Page::Clients => &[Dataset::Clients],
            Page::Inventory => &[
                Dataset::Vendors,
                Dataset::PurchaseOrders,
                Dataset::InventoryItems,
                Dataset::StockAdjustments,
                Dataset::CycleCounts,
            ],
            Page::Staff => &[
                Dataset::StaffMembers,
                Dataset::Shifts,
                Dataset::PerformanceReviews,
                Dataset::OnboardingChecklists,
            ],
        }
    }
}

/// Any page's report, serialized without a wrapper tag
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PageReport {
    Finance(FinanceReport),
    Scheduling(SchedulingReport),
    Clients(ClientReport),
    Inventory(InventoryReport),
    Staff(StaffReport),
}

// ============================================================================
// DASHBOARD
// ============================================================================

pub struct Dashboard<S> {
    store: S,
    tables: TableConfig,
}

impl<S: TableStore> Dashboard<S> {
    pub fn new(store: S, tables: TableConfig) -> Self {
        Self { store, tables }
    }

    pub fn tables(&self) -> &TableConfig {
        &self.tables
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Raw rows for one dataset, with the fallback applied on failure
    pub async fn load_raw(&self, dataset: Dataset) -> Vec<RawRecord> {
        let table = self.tables.table(dataset);

        match self.store.fetch_table(table).await {
            Ok(records) => {
                debug!(dataset = dataset.key(), table, rows = records.len(), "fetched table");
                records
            }
            Err(err) if dataset.has_illustrative_fallback() => {
                warn!(dataset = dataset.key(), table, error = %err, "fetch failed, showing illustrative rows");
                illustrative_records(dataset)
            }
            Err(err) => {
                warn!(dataset = dataset.key(), table, error = %err, "fetch failed, showing no rows");
                Vec::new()
            }
        }
    }

    async fn load<T: Entity>(&self, dataset: Dataset, mapper: fn(&RawRecord) -> T) -> Vec<T> {
        map_records(&self.load_raw(dataset).await, mapper)
    }

    pub async fn load_finance(&self) -> FinanceSnapshot {
        let (invoices, expenses, payouts, payments, payroll_runs, tax_filings) = tokio::join!(
            self.load(Dataset::Invoices, entities::map_invoice),
            self.load(Dataset::Expenses, entities::map_expense),
            self.load(Dataset::Payouts, entities::map_payout),
            self.load(Dataset::Payments, entities::map_payment),
            self.load(Dataset::PayrollRuns, entities::map_payroll_run),
            self.load(Dataset::TaxFilings, entities::map_tax_filing),
        );

        FinanceSnapshot {
            invoices,
            expenses,
            payouts,
            payments,
            payroll_runs,
            tax_filings,
        }
    }

    pub async fn load_scheduling(&self) -> SchedulingSnapshot {
        let (appointments, waitlist) = tokio::join!(
            self.load(Dataset::Appointments, entities::map_appointment),
            self.load(Dataset::Waitlist, entities::map_waitlist_entry),
        );

        SchedulingSnapshot { appointments, waitlist }
    }

    pub async fn load_clients(&self) -> Vec<Client> {
        self.load(Dataset::Clients, entities::map_client).await
    }

    pub async fn load_inventory(&self) -> InventorySnapshot {
        let (vendors, purchase_orders, items, adjustments, cycle_counts) = tokio::join!(
            self.load(Dataset::Vendors, entities::map_vendor),
            self.load(Dataset::PurchaseOrders, entities::map_purchase_order),
            self.load(Dataset::InventoryItems, entities::map_inventory_item),
            self.load(Dataset::StockAdjustments, entities::map_stock_adjustment),
            self.load(Dataset::CycleCounts, entities::map_cycle_count),
        );

        InventorySnapshot {
            vendors,
            purchase_orders,
            items,
            adjustments,
            cycle_counts,
        }
    }

    pub async fn load_staff(&self) -> StaffSnapshot {
        let (members, shifts, reviews, onboarding) = tokio::join!(
            self.load(Dataset::StaffMembers, entities::map_staff_member),
            self.load(Dataset::Shifts, entities::map_shift),
            self.load(Dataset::PerformanceReviews, entities::map_performance_review),
            self.load(Dataset::OnboardingChecklists, entities::map_onboarding_checklist),
        );

        StaffSnapshot {
            members,
            shifts,
            reviews,
            onboarding,
        }
    }

    // ------------------------------------------------------------------------
    // Reports
    // ------------------------------------------------------------------------

    pub async fn finance_report(&self, now: DateTime<Utc>, months: usize) -> FinanceReport {
        finance_report(&self.load_finance().await, now, months)
    }

    pub async fn scheduling_report(&self, now: DateTime<Utc>, months: usize) -> SchedulingReport {
        scheduling_report(&self.load_scheduling().await, now, months)
    }

    pub async fn client_report(&self, now: DateTime<Utc>) -> ClientReport {
        client_report(&self.load_clients().await, now)
    }

    pub async fn inventory_report(&self, now: DateTime<Utc>) -> InventoryReport {
        inventory_report(&self.load_inventory().await, now)
    }

    pub async fn staff_report(&self, now: DateTime<Utc>) -> StaffReport {
        staff_report(&self.load_staff().await, now)
    }

    /// `months` only applies to pages with a monthly series
    pub async fn page_report(&self, page: Page, now: DateTime<Utc>, months: usize) -> PageReport {
        match page {
            Page::Finance => PageReport::Finance(self.finance_report(now, months).await),
            Page::Scheduling => PageReport::Scheduling(self.scheduling_report(now, months).await),
            Page::Clients => PageReport::Clients(self.client_report(now).await),
            Page::Inventory => PageReport::Inventory(self.inventory_report(now).await),
            Page::Staff => PageReport::Staff(self.staff_report(now).await),
        }
    }
}

// ============================================================================
// ILLUSTRATIVE FALLBACK
// ============================================================================

/// Fixed sample rows shown when an inventory table cannot be read.
/// Empty for every other dataset.
pub fn illustrative_records(dataset: Dataset) -> Vec<RawRecord> {
    let rows = match dataset {
        Dataset::Vendors => json!([
            {"vendor_id": "sample-ven-1", "name": "Pawsome Supply Co.", "contact_name": "Rita Gomez",
             "email": "orders@pawsomesupply.example", "categories": ["Shampoo", "Conditioner"],
             "status": "preferred", "lead_time_days": 3, "payment_terms": "Net 30"},
            {"vendor_id": "sample-ven-2", "name": "Groom Tools Direct", "contact_name": "Sam Lee",
             "categories": "Clippers, Blades, Shears", "status": "active", "lead_time_days": 7,
             "payment_terms": "Net 15"},
            {"vendor_id": "sample-ven-3", "name": "Tidy Tails Linens", "categories": ["Towels"],
             "status": "on review", "lead_time_days": 10}
        ]),
        Dataset::PurchaseOrders => json!([
            {"po_id": "sample-po-1", "po_number": "PO-1042", "vendor_name": "Pawsome Supply Co.",
             "status": "ordered", "order_date": "2025-01-06", "expected_date": "2025-01-09",
             "line_items": [
                 {"name": "Oatmeal Shampoo (gallon)", "sku": "SHMP-01", "qty": 6, "unit_cost": 24.0},
                 {"name": "Detangling Conditioner", "sku": "COND-02", "qty": 4, "unit_cost": 18.5}
             ]},
            {"po_id": "sample-po-2", "po_number": "PO-1043", "vendor_name": "Groom Tools Direct",
             "status": "received", "order_date": "2024-12-12", "received_date": "2024-12-19",
             "total": 289.0,
             "line_items": ["#10 Blade", "Curved Shears"]}
        ]),
        Dataset::InventoryItems => json!([
            {"sku": "SHMP-01", "name": "Oatmeal Shampoo (gallon)", "category": "Shampoo",
             "on_hand": 9, "reserved": 3, "reorder_point": 15, "unit_cost": 24.0,
             "vendor": "Pawsome Supply Co.", "location": "Back shelf A"},
            {"sku": "COND-02", "name": "Detangling Conditioner", "category": "Conditioner",
             "on_hand": 12, "par_level": 8, "unit_cost": 18.5, "vendor": "Pawsome Supply Co."},
            {"sku": "TWL-10", "name": "Microfiber Towels", "category": "Towels",
             "on_hand": 40, "reserved": 4, "par_level": 30, "unit_cost": 2.75,
             "vendor": "Tidy Tails Linens"},
            {"sku": "BLD-10", "name": "#10 Blade", "category": "Blades",
             "on_hand": 0, "reorder_point": 2, "unit_cost": 32.0, "vendor": "Groom Tools Direct"}
        ]),
        Dataset::StockAdjustments => json!([
            {"adjustment_id": "sample-adj-1", "item_name": "Oatmeal Shampoo (gallon)", "sku": "SHMP-01",
             "quantity_change": -2, "reason": "damaged", "adjusted_by": "Ana", "adjusted_at": "2025-01-04"},
            {"adjustment_id": "sample-adj-2", "item_name": "Microfiber Towels", "sku": "TWL-10",
             "quantity_change": 20, "reason": "restock", "adjusted_by": "Ben", "adjusted_at": "2025-01-02"},
            {"adjustment_id": "sample-adj-3", "item_name": "#10 Blade", "sku": "BLD-10",
             "quantity_change": -1, "reason": "used in service", "adjusted_at": "2025-01-05"}
        ]),
        Dataset::CycleCounts => json!([
            {"count_id": "sample-cnt-1", "zone": "Back shelf A", "item_name": "Oatmeal Shampoo (gallon)",
             "expected_quantity": 10, "counted_quantity": 9, "counted_at": "2025-01-03",
             "counted_by": "Ana", "status": "complete"},
            {"count_id": "sample-cnt-2", "zone": "Linen closet", "item_name": "Microfiber Towels",
             "expected_quantity": 40, "scheduled_for": "2025-01-20", "status": "scheduled"}
        ]),
        _ => return Vec::new(),
    };

    records_from_json(rows).unwrap_or_default()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTableStore;
    use chrono::TimeZone;
    use std::sync::Mutex;

    /// Records which tables were asked for; every fetch fails
    #[derive(Default)]
    struct RecordingStore {
        requested: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TableStore for RecordingStore {
        async fn fetch_table(&self, table: &str) -> FetchResult<Vec<RawRecord>> {
            self.requested.lock().unwrap().push(table.to_string());
            Err(crate::error::FetchError::MissingTable(table.to_string()))
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_illustrative_rows_only_for_inventory() {
        for dataset in Dataset::ALL {
            let rows = illustrative_records(dataset);
            assert_eq!(!rows.is_empty(), dataset.has_illustrative_fallback(), "{:?}", dataset);
        }
    }

    #[test]
    fn test_page_datasets_cover_every_dataset_once() {
        let mut seen: Vec<Dataset> = Page::ALL.iter().flat_map(|p| p.datasets().iter().copied()).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), Dataset::ALL.len());
    }

    #[test]
    fn test_page_from_name() {
        assert_eq!(Page::from_name("Inventory"), Some(Page::Inventory));
        assert_eq!(Page::from_name(" staff "), Some(Page::Staff));
        assert_eq!(Page::from_name("payroll"), None);
    }

    #[tokio::test]
    async fn test_finance_page_fetches_configured_tables() {
        let mut tables = TableConfig::default();
        tables.set(Dataset::Invoices, "qb_invoices").unwrap();
        let dashboard = Dashboard::new(RecordingStore::default(), tables);

        let snapshot = dashboard.load_finance().await;

        assert!(snapshot.invoices.is_empty());
        assert!(snapshot.tax_filings.is_empty());

        let mut requested = dashboard.store().requested.lock().unwrap().clone();
        requested.sort();
        assert_eq!(
            requested,
            vec!["expenses", "payments", "payouts", "payroll_runs", "qb_invoices", "tax_filings"]
        );
    }

    #[tokio::test]
    async fn test_failures_degrade_per_dataset() {
        let store = MemoryTableStore::new()
            .with_json("vendors", json!([{"name": "Local Vendor"}]))
            .with_json("inventory_items", json!({"error": "permission denied"}))
            .with_failure("purchase_orders", "timeout");
        let dashboard = Dashboard::new(store, TableConfig::default());

        let inventory = dashboard.load_inventory().await;

        // successful fetch is used as-is
        assert_eq!(inventory.vendors.len(), 1);
        assert_eq!(inventory.vendors[0].name, "Local Vendor");
        // non-list payload, failure and missing table all fall back
        assert_eq!(inventory.items.len(), 4);
        assert_eq!(inventory.purchase_orders.len(), 2);
        assert_eq!(inventory.cycle_counts.len(), 2);

        // non-inventory datasets come back empty
        assert!(dashboard.load_clients().await.is_empty());
    }

    #[tokio::test]
    async fn test_illustrative_inventory_report() {
        let dashboard = Dashboard::new(RecordingStore::default(), TableConfig::default());

        let report = dashboard.inventory_report(now()).await;

        assert_eq!(report.sku_count, 4);
        assert_eq!(report.below_par.len(), 2);
        assert_eq!(report.below_par[0].name, "Oatmeal Shampoo (gallon)");
        assert_eq!(report.purchase_orders.open_count, 1);
        assert_eq!(report.purchase_orders.overdue_count, 1);
        assert_eq!(report.vendors.count, 3);
    }

    #[tokio::test]
    async fn test_ids_unique_after_loading() {
        let store = MemoryTableStore::new().with_json(
            "clients",
            json!([{"id": "c1", "name": "Maya"}, {"id": "c1", "name": "Maya"}, {"name": "Jon"}]),
        );
        let dashboard = Dashboard::new(store, TableConfig::default());

        let clients = dashboard.load_clients().await;
        let ids: Vec<&str> = clients.iter().map(|c| c.id.as_str()).collect();

        assert_eq!(ids[0], "c1");
        assert_eq!(ids[1], "c1-2");
        assert!(ids[2].starts_with("cli-jon-"));
    }

    #[tokio::test]
    async fn test_page_report_serializes_untagged() {
        let dashboard = Dashboard::new(Arc::new(MemoryTableStore::new()), TableConfig::default());

        let report = dashboard.page_report(Page::Staff, now(), 6).await;
        let json = serde_json::to_value(&report).unwrap();

        assert!(json.get("headcount").is_some());
        assert_eq!(json["headcount"]["total"], 0);
    }
}
