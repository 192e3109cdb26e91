// Aggregators - pure summaries over normalized entities
//
// Nothing here reads a clock: every function that needs "today" takes
// `now` from the caller.

pub mod clients;
pub mod common;
pub mod finance;
pub mod inventory;
pub mod scheduling;
pub mod staff;

pub use clients::{client_report, ClientReport};
pub use common::{group_by_category, percent_change, sum_known, CategoryTotal, PercentChange, Trend};
pub use finance::{
    finance_report, is_invoice_overdue, is_open, is_paid, is_receivable, remaining_invoice_balance,
    FinanceReport, FinanceSnapshot,
};
pub use inventory::{available, inventory_report, is_below_par, InventoryReport, InventorySnapshot};
pub use scheduling::{scheduling_report, SchedulingReport, SchedulingSnapshot};
pub use staff::{staff_report, StaffReport, StaffSnapshot};
