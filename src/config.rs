// ⚙️ Table Configuration - Which store table backs each dataset
//
// Resolution order, resolved once at startup:
//   1. literal default per dataset ("invoices", "payroll_runs", ...)
//   2. `[tables]` section of a TOML file
//   3. environment: STUDIO_LEDGER_TABLE_<DATASET>, e.g. STUDIO_LEDGER_TABLE_INVOICES
//
// Example file:
//   [tables]
//   invoices = "qb_invoices"
//   staff_members = "employees"

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::ConfigError;

/// Prefix of the per-dataset environment overrides
pub const TABLE_ENV_PREFIX: &str = "STUDIO_LEDGER_TABLE_";

// ============================================================================
// DATASETS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Appointments,
    Waitlist,
    Clients,
    Invoices,
    Expenses,
    Payouts,
    Payments,
    PayrollRuns,
    TaxFilings,
    Vendors,
    PurchaseOrders,
    InventoryItems,
    StockAdjustments,
    CycleCounts,
    StaffMembers,
    Shifts,
    PerformanceReviews,
    OnboardingChecklists,
}

impl Dataset {
    pub const ALL: [Dataset; 18] = [
        Dataset::Appointments,
        Dataset::Waitlist,
        Dataset::Clients,
        Dataset::Invoices,
        Dataset::Expenses,
        Dataset::Payouts,
        Dataset::Payments,
        Dataset::PayrollRuns,
        Dataset::TaxFilings,
        Dataset::Vendors,
        Dataset::PurchaseOrders,
        Dataset::InventoryItems,
        Dataset::StockAdjustments,
        Dataset::CycleCounts,
        Dataset::StaffMembers,
        Dataset::Shifts,
        Dataset::PerformanceReviews,
        Dataset::OnboardingChecklists,
    ];

    /// Config key, also used in the env var suffix (upper-cased)
    pub fn key(&self) -> &'static str {
        match self {
            Dataset::Appointments => "appointments",
            Dataset::Waitlist => "waitlist",
            Dataset::Clients => "clients",
            Dataset::Invoices => "invoices",
            Dataset::Expenses => "expenses",
            Dataset::Payouts => "payouts",
            Dataset::Payments => "payments",
            Dataset::PayrollRuns => "payroll_runs",
            Dataset::TaxFilings => "tax_filings",
            Dataset::Vendors => "vendors",
            Dataset::PurchaseOrders => "purchase_orders",
            Dataset::InventoryItems => "inventory_items",
            Dataset::StockAdjustments => "stock_adjustments",
            Dataset::CycleCounts => "cycle_counts",
            Dataset::StaffMembers => "staff_members",
            Dataset::Shifts => "shifts",
            Dataset::PerformanceReviews => "performance_reviews",
            Dataset::OnboardingChecklists => "onboarding_checklists",
        }
    }

    /// Table name used when nothing overrides it
    pub fn default_table(&self) -> &'static str {
        match self {
            Dataset::Waitlist => "waitlist_entries",
            Dataset::StaffMembers => "staff",
            other => other.key(),
        }
    }

    pub fn env_var(&self) -> String {
        format!("{}{}", TABLE_ENV_PREFIX, self.key().to_uppercase())
    }

    pub fn from_key(key: &str) -> Option<Dataset> {
        let key = key.trim().to_lowercase();
        Dataset::ALL.into_iter().find(|d| d.key() == key)
    }

    /// Inventory datasets fall back to illustrative rows instead of nothing
    pub fn has_illustrative_fallback(&self) -> bool {
        matches!(
            self,
            Dataset::Vendors
                | Dataset::PurchaseOrders
                | Dataset::InventoryItems
                | Dataset::StockAdjustments
                | Dataset::CycleCounts
        )
    }
}

/// Plain identifiers only: letters, digits and `_`, not starting with a digit
pub fn is_valid_table_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

// ============================================================================
// TABLE CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    tables: BTreeMap<Dataset, String>,
}

/// On-disk layout
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    tables: HashMap<String, String>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            tables: Dataset::ALL
                .into_iter()
                .map(|d| (d, d.default_table().to_string()))
                .collect(),
        }
    }
}

impl TableConfig {
    /// Defaults, then the optional file, then the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = path {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
            config.apply_toml(&content)?;
        }

        config.apply_env(std::env::vars())?;
        Ok(config)
    }

    /// Apply the `[tables]` section of a TOML document
    pub fn apply_toml(&mut self, content: &str) -> Result<(), ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;

        for (key, table) in file.tables {
            let dataset = Dataset::from_key(&key).ok_or(ConfigError::UnknownDataset(key))?;
            self.set(dataset, table)?;
        }
        Ok(())
    }

    /// Apply `STUDIO_LEDGER_TABLE_<DATASET>` overrides; other variables are ignored
    pub fn apply_env(&mut self, vars: impl IntoIterator<Item = (String, String)>) -> Result<(), ConfigError> {
        for (name, value) in vars {
            let Some(suffix) = name.strip_prefix(TABLE_ENV_PREFIX) else {
                continue;
            };
            let dataset = Dataset::from_key(suffix).ok_or_else(|| ConfigError::UnknownDataset(name.clone()))?;
            self.set(dataset, value)?;
        }
        Ok(())
    }

    pub fn set(&mut self, dataset: Dataset, table: impl Into<String>) -> Result<(), ConfigError> {
        let table = table.into().trim().to_string();
        if !is_valid_table_name(&table) {
            return Err(ConfigError::InvalidTableName {
                dataset: dataset.key().to_string(),
                name: table,
            });
        }
        self.tables.insert(dataset, table);
        Ok(())
    }

    pub fn table(&self, dataset: Dataset) -> &str {
        self.tables
            .get(&dataset)
            .map(String::as_str)
            .unwrap_or_else(|| dataset.default_table())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Dataset, &str)> {
        self.tables.iter().map(|(d, t)| (*d, t.as_str()))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = TableConfig::default();

        assert_eq!(config.table(Dataset::Invoices), "invoices");
        assert_eq!(config.table(Dataset::Waitlist), "waitlist_entries");
        assert_eq!(config.table(Dataset::StaffMembers), "staff");
        assert_eq!(config.iter().count(), Dataset::ALL.len());
    }

    #[test]
    fn test_dataset_keys_round_trip() {
        for dataset in Dataset::ALL {
            assert_eq!(Dataset::from_key(dataset.key()), Some(dataset));
            assert!(is_valid_table_name(dataset.default_table()));
        }
        assert_eq!(Dataset::PayrollRuns.env_var(), "STUDIO_LEDGER_TABLE_PAYROLL_RUNS");
        assert_eq!(Dataset::from_key("PAYROLL_RUNS"), Some(Dataset::PayrollRuns));
    }

    #[test]
    fn test_toml_then_env_override() {
        let mut config = TableConfig::default();
        config
            .apply_toml("[tables]\ninvoices = \"qb_invoices\"\nshifts = \"roster\"\n")
            .unwrap();
        config
            .apply_env(vec![
                ("STUDIO_LEDGER_TABLE_INVOICES".to_string(), "stripe_invoices".to_string()),
                ("HOME".to_string(), "/root".to_string()),
            ])
            .unwrap();

        assert_eq!(config.table(Dataset::Invoices), "stripe_invoices");
        assert_eq!(config.table(Dataset::Shifts), "roster");
        assert_eq!(config.table(Dataset::Expenses), "expenses");
    }

    #[test]
    fn test_rejects_bad_names_and_unknown_datasets() {
        let mut config = TableConfig::default();

        assert!(matches!(
            config.apply_toml("[tables]\ninvoices = \"x; DROP TABLE y\"\n"),
            Err(ConfigError::InvalidTableName { .. })
        ));
        assert!(matches!(
            config.apply_toml("[tables]\nwidgets = \"w\"\n"),
            Err(ConfigError::UnknownDataset(_))
        ));
        assert!(matches!(
            config.apply_env(vec![("STUDIO_LEDGER_TABLE_NOPE".to_string(), "t".to_string())]),
            Err(ConfigError::UnknownDataset(_))
        ));
        assert!(matches!(config.apply_toml("[tables"), Err(ConfigError::Parse(_))));
        assert_eq!(config.table(Dataset::Invoices), "invoices");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[tables]\nvendors = \"suppliers\"").unwrap();

        let config = TableConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.table(Dataset::Vendors), "suppliers");

        let missing = TableConfig::load(Some(Path::new("/nonexistent/studio-ledger.toml")));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_valid_table_names() {
        assert!(is_valid_table_name("invoices"));
        assert!(is_valid_table_name("_tmp2"));
        assert!(!is_valid_table_name(""));
        assert!(!is_valid_table_name("2024_invoices"));
        assert!(!is_valid_table_name("bad-name"));
        assert!(!is_valid_table_name("a\"b"));
    }
}
