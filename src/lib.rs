// Studio Ledger - Core Library
// Record normalization and metrics aggregation for a service-business dashboard.
// Exposes all modules for use in the CLI, the API server, and tests.

pub mod value;      // Raw rows as returned by a table store
pub mod resolve;    // Typed field extraction from candidate keys
pub mod identity;   // Entity ids: lookup, stable synthetic ids, de-duplication
pub mod tone;       // Central status -> tone keyword table
pub mod entities;   // Entity mappers per domain
pub mod metrics;    // Aggregators per domain
pub mod timeline;   // Month-bucketed series and cashflow
pub mod config;     // Table name configuration
pub mod error;      // Fetch and config errors
pub mod fetch;      // Dashboard: concurrent page loads with fallbacks
pub mod store;      // SQLite, file and in-memory table stores

// Re-export commonly used types
pub use value::{records_from_json, RawRecord, RawValue};
pub use tone::{classify, StatusDomain, Tone, ToneCounts};
pub use entities::{
    map_records, Entity,
    Appointment, WaitlistEntry,
    Client, VaccineRecord,
    Invoice, Expense, Payout, Payment, PayrollRun, TaxFiling,
    Vendor, PurchaseOrder, LineItem, InventoryItem, StockAdjustment, CycleCount,
    StaffMember, Shift, PerformanceReview, ReviewGoal, OnboardingChecklist, ChecklistItem,
};
pub use metrics::{
    ClientReport, FinanceReport, InventoryReport, SchedulingReport, StaffReport,
    FinanceSnapshot, InventorySnapshot, SchedulingSnapshot, StaffSnapshot,
    CategoryTotal, PercentChange, Trend,
};
pub use timeline::{cashflow_timeline, CashflowPoint, DEFAULT_CASHFLOW_MONTHS};
pub use config::{Dataset, TableConfig};
pub use error::{ConfigError, FetchError, FetchResult};
pub use fetch::{Dashboard, Page, PageReport, TableStore};
pub use store::{FileTableStore, MemoryTableStore, SqliteTableStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
