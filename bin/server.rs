// Studio Ledger - Web Server
// REST API serving one JSON report per dashboard page
//
//   STUDIO_LEDGER_SQLITE=studio.db cargo run --features server --bin studio-ledger-server
//   curl localhost:3000/api/pages/finance?months=12

use anyhow::{bail, Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studio_ledger::resolve::parse_date;
use studio_ledger::{
    Dashboard, Dataset, FileTableStore, Page, SqliteTableStore, TableConfig, TableStore,
    DEFAULT_CASHFLOW_MONTHS, VERSION,
};

const DEFAULT_ADDR: &str = "0.0.0.0:3000";

/// Shared application state
#[derive(Clone)]
struct AppState {
    dashboard: Arc<Dashboard<Arc<dyn TableStore>>>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ApiResponse {
        success: false,
        data: serde_json::Value::Null,
        error: Some(message.into()),
    };
    (status, Json(body)).into_response()
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct TableResponse {
    dataset: &'static str,
    table: String,
    env_var: String,
}

/// Query string accepted by the page endpoints
#[derive(Debug, Default, Deserialize)]
struct ReportQuery {
    months: Option<usize>,
    as_of: Option<String>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "OK",
        version: VERSION,
    }))
}

/// GET /api/pages - Page names
async fn list_pages() -> impl IntoResponse {
    let pages: Vec<&'static str> = Page::ALL.iter().map(|p| p.as_str()).collect();
    Json(ApiResponse::ok(pages))
}

/// GET /api/tables - Resolved table name per dataset
async fn list_tables(State(state): State<AppState>) -> impl IntoResponse {
    let tables = state.dashboard.tables();
    let response: Vec<TableResponse> = Dataset::ALL
        .iter()
        .map(|dataset| TableResponse {
            dataset: dataset.key(),
            table: tables.table(*dataset).to_string(),
            env_var: dataset.env_var(),
        })
        .collect();

    Json(ApiResponse::ok(response))
}

/// GET /api/pages/:page - One page report
async fn get_page(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Response {
    let Some(page) = Page::from_name(&name) else {
        return error_response(StatusCode::NOT_FOUND, format!("Unknown page: {}", name));
    };

    let now = match query.as_of.as_deref() {
        Some(raw) => match parse_date(raw) {
            Some(date) => date,
            None => {
                return error_response(StatusCode::BAD_REQUEST, format!("Cannot parse as_of date: {}", raw));
            }
        },
        None => Utc::now(),
    };
    let months = query.months.unwrap_or(DEFAULT_CASHFLOW_MONTHS);

    let report = state.dashboard.page_report(page, now, months).await;
    (StatusCode::OK, Json(ApiResponse::ok(report))).into_response()
}

// ============================================================================
// Main Server
// ============================================================================

fn open_store() -> Result<Arc<dyn TableStore>> {
    if let Some(path) = std::env::var_os("STUDIO_LEDGER_SQLITE").map(PathBuf::from) {
        if !path.exists() {
            bail!("SQLite database not found at {}", path.display());
        }
        info!("✓ Database opened: {}", path.display());
        let store = SqliteTableStore::open(&path)
            .with_context(|| format!("Failed to open SQLite database {}", path.display()))?;
        return Ok(Arc::new(store));
    }

    if let Some(dir) = std::env::var_os("STUDIO_LEDGER_DATA_DIR").map(PathBuf::from) {
        if !dir.is_dir() {
            bail!("Data directory not found at {}", dir.display());
        }
        info!("✓ Reading tables from {}", dir.display());
        return Ok(Arc::new(FileTableStore::new(dir)));
    }

    bail!("Set STUDIO_LEDGER_SQLITE or STUDIO_LEDGER_DATA_DIR to choose a table store")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studio_ledger=info,studio_ledger_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🌐 Studio Ledger - Web Server v{}", VERSION);

    let config_path = std::env::var_os("STUDIO_LEDGER_CONFIG").map(PathBuf::from);
    let tables = TableConfig::load(config_path.as_deref()).context("Failed to load table configuration")?;
    let store = open_store()?;

    // Create shared state
    let state = AppState {
        dashboard: Arc::new(Dashboard::new(store, tables)),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/pages", get(list_pages))
        .route("/pages/:page", get(get_page))
        .route("/tables", get(list_tables))
        .with_state(state);

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = std::env::var("STUDIO_LEDGER_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("🚀 Server running on http://{}", addr);
    info!("   API: http://{}/api/pages/finance", addr);

    axum::serve(listener, app).await.context("Server stopped with an error")?;
    Ok(())
}
