// 📦 Inventory Entities - Vendors, purchase orders, stock, adjustments, counts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{nested_records, LABEL_KEY};
use crate::identity;
use crate::resolve;
use crate::value::RawRecord;

// ============================================================================
// VENDOR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: String,
    pub name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,

    /// What the vendor supplies
    pub categories: Vec<String>,

    /// Free-text status, defaults to "active"
    pub status: String,
    pub lead_time_days: Option<f64>,
}

pub fn map_vendor(record: &RawRecord) -> Vendor {
    let name = resolve::string(
        record,
        &["name", "vendor_name", "vendor", "company", "supplier_name", "supplier"],
    )
    .unwrap_or_else(|| "Unnamed".to_string());

    Vendor {
        id: identity::entity_id(record, &["vendor_id", "supplier_id"], "ven", &name),
        contact_name: resolve::string(record, &["contact_name", "contact", "rep", "account_manager"]),
        email: resolve::string(record, &["email", "contact_email", "email_address"]),
        phone: resolve::string(record, &["phone", "contact_phone", "phone_number"]),
        categories: resolve::string_list(
            record,
            &["categories", "category", "supplies", "product_categories", "tags"],
        ),
        status: resolve::string(record, &["status", "vendor_status", "state"])
            .unwrap_or_else(|| "active".to_string()),
        lead_time_days: resolve::number(record, &["lead_time_days", "lead_time", "lead_days"]),
        name,
    }
}

// ============================================================================
// PURCHASE ORDER
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: String,
    pub number: Option<String>,
    pub vendor_name: String,

    /// Free-text status, defaults to "draft"
    pub status: String,
    pub line_items: Vec<LineItem>,

    /// Order total as stored; see `metrics::inventory::order_total`
    pub total: Option<f64>,

    pub ordered_at: Option<DateTime<Utc>>,
    pub expected_at: Option<DateTime<Utc>>,
    pub received_at: Option<DateTime<Utc>>,
}

/// One purchase order line.
///
/// Label-only lines (a bare string in the source) carry zero quantity and
/// no cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub label: String,
    pub quantity: f64,
    pub unit_cost: Option<f64>,
    pub total: Option<f64>,
}

impl LineItem {
    /// Stored line total, else quantity x unit cost, else 0
    pub fn extended_cost(&self) -> f64 {
        self.total
            .or_else(|| self.unit_cost.map(|cost| cost * self.quantity))
            .unwrap_or(0.0)
    }
}

pub fn map_purchase_order(record: &RawRecord) -> PurchaseOrder {
    let vendor_name = resolve::string(
        record,
        &["vendor_name", "vendor", "supplier_name", "supplier"],
    )
    .unwrap_or_else(|| "Unknown".to_string());

    PurchaseOrder {
        id: identity::entity_id(record, &["po_id", "purchase_order_id", "order_id"], "po", &vendor_name),
        number: resolve::string(record, &["po_number", "number", "order_number", "reference"]),
        status: resolve::string(record, &["status", "po_status", "state"])
            .unwrap_or_else(|| "draft".to_string()),
        line_items: nested_records(record, &["line_items", "items", "lines", "products"])
            .iter()
            .map(map_line_item)
            .collect(),
        total: resolve::number(record, &["total", "amount", "order_total", "total_cost"]),
        ordered_at: resolve::date(record, &["ordered_at", "order_date", "created_at", "date"]),
        expected_at: resolve::date(
            record,
            &["expected_at", "expected_date", "eta", "delivery_date"],
        ),
        received_at: resolve::date(record, &["received_at", "received_date", "delivered_at"]),
        vendor_name,
    }
}

pub fn map_line_item(record: &RawRecord) -> LineItem {
    LineItem {
        label: resolve::string(
            record,
            &[LABEL_KEY, "name", "item_name", "product", "description", "sku"],
        )
        .unwrap_or_else(|| "Unnamed".to_string()),
        quantity: resolve::number(record, &["quantity", "qty", "units", "value"]).unwrap_or(0.0),
        unit_cost: resolve::number(record, &["unit_cost", "cost", "price", "unit_price"]),
        total: resolve::number(record, &["total", "line_total", "amount", "extended_cost"]),
    }
}

// ============================================================================
// INVENTORY ITEM
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub on_hand: Option<f64>,
    pub reserved: Option<f64>,

    /// Target quantity; takes precedence over `reorder_point`
    pub par_level: Option<f64>,
    pub reorder_point: Option<f64>,

    pub unit_cost: Option<f64>,
    pub vendor: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
    pub tags: Vec<String>,
    pub last_counted_at: Option<DateTime<Utc>>,
}

pub fn map_inventory_item(record: &RawRecord) -> InventoryItem {
    let name = resolve::string(
        record,
        &["name", "item_name", "product_name", "product", "title", "description"],
    )
    .unwrap_or_else(|| "Unnamed".to_string());

    InventoryItem {
        id: identity::entity_id(record, &["item_id", "product_id", "sku"], "itm", &name),
        sku: resolve::string(record, &["sku", "item_sku", "code", "barcode"]),
        category: resolve::string(record, &["category", "item_category", "type", "group"]),
        on_hand: resolve::number(
            record,
            &["on_hand", "quantity_on_hand", "onHand", "quantity", "qty", "stock", "in_stock"],
        ),
        reserved: resolve::number(
            record,
            &["reserved", "quantity_reserved", "allocated", "committed"],
        ),
        par_level: resolve::number(record, &["par_level", "parLevel", "par", "target_level", "target_quantity"]),
        reorder_point: resolve::number(
            record,
            &["reorder_point", "reorderPoint", "reorder_level", "min_quantity", "minimum"],
        ),
        unit_cost: resolve::number(record, &["unit_cost", "cost", "unit_price", "price"]),
        vendor: resolve::string(record, &["vendor", "vendor_name", "supplier", "supplier_name"]),
        location: resolve::string(record, &["location", "bin", "shelf", "storage_location"]),
        status: resolve::string(record, &["status", "stock_status", "state"]),
        tags: resolve::string_list(record, &["tags", "labels"]),
        last_counted_at: resolve::date(
            record,
            &["last_counted_at", "last_count_date", "counted_at", "updated_at"],
        ),
        name,
    }
}

// ============================================================================
// STOCK ADJUSTMENT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub id: String,
    pub item_name: String,

    /// Signed change in units (negative = removed from stock)
    pub quantity_change: Option<f64>,
    pub reason: Option<String>,
    pub adjusted_by: Option<String>,
    pub adjusted_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

pub fn map_stock_adjustment(record: &RawRecord) -> StockAdjustment {
    let item_name = resolve::string(
        record,
        &["item_name", "item", "product_name", "product", "name", "sku"],
    )
    .unwrap_or_else(|| "Unknown".to_string());

    StockAdjustment {
        id: identity::entity_id(record, &["adjustment_id"], "adj", &item_name),
        quantity_change: resolve::number(
            record,
            &["quantity_change", "change", "delta", "adjustment", "quantity", "qty"],
        ),
        reason: resolve::string(record, &["reason", "adjustment_type", "type", "category"]),
        adjusted_by: resolve::string(record, &["adjusted_by", "staff_name", "user", "created_by"]),
        adjusted_at: resolve::date(
            record,
            &["adjusted_at", "created_at", "timestamp", "date"],
        ),
        notes: resolve::string(record, &["notes", "note", "comments"]),
        item_name,
    }
}

// ============================================================================
// CYCLE COUNT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleCount {
    pub id: String,

    /// Zone, shelf or item the count covers
    pub label: String,
    pub item_name: Option<String>,
    pub expected_quantity: Option<f64>,
    pub counted_quantity: Option<f64>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub counted_at: Option<DateTime<Utc>>,
    pub counted_by: Option<String>,

    /// Free-text status, defaults to "scheduled"
    pub status: String,
}

impl CycleCount {
    /// counted - expected, only when both sides are known
    pub fn variance(&self) -> Option<f64> {
        match (self.counted_quantity, self.expected_quantity) {
            (Some(counted), Some(expected)) => Some(counted - expected),
            _ => None,
        }
    }
}

pub fn map_cycle_count(record: &RawRecord) -> CycleCount {
    let label = resolve::string(
        record,
        &["label", "name", "title", "zone", "location", "item_name"],
    )
    .unwrap_or_else(|| "Cycle count".to_string());

    CycleCount {
        id: identity::entity_id(record, &["count_id", "cycle_count_id"], "cnt", &label),
        item_name: resolve::string(record, &["item_name", "item", "product", "sku"]),
        expected_quantity: resolve::number(
            record,
            &["expected_quantity", "expected", "system_quantity", "book_quantity"],
        ),
        counted_quantity: resolve::number(
            record,
            &["counted_quantity", "counted", "actual_quantity", "actual", "physical_count"],
        ),
        scheduled_for: resolve::date(record, &["scheduled_for", "scheduled_date", "due_date"]),
        counted_at: resolve::date(record, &["counted_at", "count_date", "completed_at", "date"]),
        counted_by: resolve::string(record, &["counted_by", "staff_name", "user"]),
        status: resolve::string(record, &["status", "state"])
            .unwrap_or_else(|| "scheduled".to_string()),
        label,
    }
}

// ============================================================================
// TESTS
// ============================================================================
