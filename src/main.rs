// Studio Ledger - CLI
// Loads one dashboard page from a table store and prints its report as JSON.
//
//   studio-ledger --sqlite studio.db finance --months 12
//   studio-ledger --data-dir ./exports inventory
//   studio-ledger --config ledger.toml tables

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studio_ledger::resolve::parse_date;
use studio_ledger::{
    Dashboard, Dataset, FileTableStore, Page, SqliteTableStore, TableConfig, TableStore,
    DEFAULT_CASHFLOW_MONTHS,
};

#[derive(Parser, Debug)]
#[command(name = "studio-ledger")]
#[command(about = "Normalize studio data and print dashboard reports")]
#[command(version)]
struct Args {
    /// SQLite database holding one table per dataset
    #[arg(long, env = "STUDIO_LEDGER_SQLITE", conflicts_with = "data_dir")]
    sqlite: Option<PathBuf>,

    /// Directory of <table>.json / <table>.csv exports
    #[arg(long, env = "STUDIO_LEDGER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// TOML file with a [tables] section overriding table names
    #[arg(long, env = "STUDIO_LEDGER_CONFIG")]
    config: Option<PathBuf>,

    /// Report as of this date instead of now (any format the resolver accepts)
    #[arg(long)]
    as_of: Option<String>,

    /// Print single-line JSON
    #[arg(long)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Invoices, expenses, payouts, payments, payroll and taxes
    Finance {
        /// Months on the cashflow chart
        #[arg(long, default_value_t = DEFAULT_CASHFLOW_MONTHS)]
        months: usize,
    },
    /// Appointments and the waitlist
    Scheduling {
        /// Months on the appointment chart
        #[arg(long, default_value_t = DEFAULT_CASHFLOW_MONTHS)]
        months: usize,
    },
    /// Client roster and vaccine alerts
    Clients,
    /// Stock, purchase orders, adjustments, cycle counts and vendors
    Inventory,
    /// Headcount, shifts, reviews and onboarding
    Staff,
    /// Show the table name resolved for every dataset
    Tables,
}

fn main() -> Result<()> {
    // Reports go to stdout, logs to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studio_ledger=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let tables = TableConfig::load(args.config.as_deref()).context("Failed to load table configuration")?;

    let (page, months) = match args.command {
        Command::Tables => {
            print_tables(&tables);
            return Ok(());
        }
        Command::Finance { months } => (Page::Finance, months),
        Command::Scheduling { months } => (Page::Scheduling, months),
        Command::Clients => (Page::Clients, DEFAULT_CASHFLOW_MONTHS),
        Command::Inventory => (Page::Inventory, DEFAULT_CASHFLOW_MONTHS),
        Command::Staff => (Page::Staff, DEFAULT_CASHFLOW_MONTHS),
    };

    let now = match &args.as_of {
        Some(raw) => parse_date(raw).with_context(|| format!("Cannot parse --as-of date {:?}", raw))?,
        None => Utc::now(),
    };

    let store = open_store(&args)?;

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let json = runtime.block_on(render_page(store, tables, page, now, months, args.compact))?;

    println!("{}", json);
    Ok(())
}

fn open_store(args: &Args) -> Result<Arc<dyn TableStore>> {
    if let Some(path) = &args.sqlite {
        if !path.exists() {
            bail!("SQLite database not found at {}", path.display());
        }
        info!("📂 Reading tables from SQLite {}", path.display());
        let store = SqliteTableStore::open(path)
            .with_context(|| format!("Failed to open SQLite database {}", path.display()))?;
        return Ok(Arc::new(store));
    }

    if let Some(dir) = &args.data_dir {
        if !dir.is_dir() {
            bail!("Data directory not found at {}", dir.display());
        }
        info!("📂 Reading tables from {}", dir.display());
        return Ok(Arc::new(FileTableStore::new(dir)));
    }

    bail!("No table store given: pass --sqlite <file> or --data-dir <dir>")
}

async fn render_page(
    store: Arc<dyn TableStore>,
    tables: TableConfig,
    page: Page,
    now: DateTime<Utc>,
    months: usize,
    compact: bool,
) -> Result<String> {
    let dashboard = Dashboard::new(store, tables);

    info!("📊 Building {} report as of {}", page.as_str(), now.to_rfc3339());
    let report = dashboard.page_report(page, now, months).await;

    let json = if compact {
        serde_json::to_string(&report)
    } else {
        serde_json::to_string_pretty(&report)
    };
    json.context("Failed to serialize report")
}

fn print_tables(tables: &TableConfig) {
    for dataset in Dataset::ALL {
        println!("{:<24} {:<24} {}", dataset.key(), tables.table(dataset), dataset.env_var());
    }
}
