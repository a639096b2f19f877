// Station Recon - Web Server
// Read-only JSON API over the record store: raw records, aggregated
// day reports, and dashboard counters.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

use station_recon::{
    build_report, get_records, verify_count, DayAggregator, DayReport, GlobalSummary, QueryWindow,
    RawRecord,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
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

    fn err(data: T, message: String) -> Self {
        Self {
            success: false,
            data,
            error: Some(message),
        }
    }
}

/// Date window query parameters shared by the read endpoints
#[derive(Deserialize)]
struct WindowParams {
    date_from: Option<String>,
    date_to: Option<String>,
    limit: Option<u32>,
}

impl From<WindowParams> for QueryWindow {
    fn from(params: WindowParams) -> Self {
        QueryWindow {
            date_from: params.date_from,
            date_to: params.date_to,
            limit: params.limit,
        }
    }
}

/// Aggregated report response
#[derive(Serialize)]
struct ReportResponse {
    days: Vec<DayReport>,
    summary: GlobalSummary,
}

/// Dashboard counters
#[derive(Serialize)]
struct StatsResponse {
    total_records: i64,
    total_days: usize,
    ok_days: usize,
    anomaly_days: usize,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/reconciliations - Raw reconciliation records for a window
async fn get_reconciliations(
    State(state): State<AppState>,
    Query(params): Query<WindowParams>,
) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    match get_records(&conn, &params.into()) {
        Ok(records) => (StatusCode::OK, Json(ApiResponse::ok(records))).into_response(),
        Err(e) => {
            eprintln!("Error getting records: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::err(Vec::<RawRecord>::new(), e.to_string())),
            )
                .into_response()
        }
    }
}

/// GET /api/report - Aggregated day reports + global summary
async fn get_report(
    State(state): State<AppState>,
    Query(params): Query<WindowParams>,
) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    let records = match get_records(&conn, &params.into()) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Error getting records: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::err(empty_report(), e.to_string())),
            )
                .into_response();
        }
    };

    let aggregator = DayAggregator::new();
    match aggregator.aggregate(&records) {
        Ok((days, summary)) => {
            let response = ReportResponse {
                days: build_report(&days),
                summary,
            };
            (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
        }
        Err(e) => {
            // Stored data violating the contract is a server-side defect
            eprintln!("Error aggregating records: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::err(empty_report(), e.to_string())),
            )
                .into_response()
        }
    }
}

/// GET /api/stats - Dashboard counters across the whole store
async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    let window = QueryWindow {
        limit: Some(u32::MAX),
        ..Default::default()
    };

    let records = match get_records(&conn, &window) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Error getting records: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::err(empty_stats(), e.to_string())),
            )
                .into_response();
        }
    };

    let total_records = match verify_count(&conn) {
        Ok(count) => count,
        Err(e) => {
            eprintln!("Error counting records: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::err(empty_stats(), e.to_string())),
            )
                .into_response();
        }
    };

    let aggregator = DayAggregator::new();
    match aggregator.aggregate(&records) {
        Ok((_, summary)) => {
            let stats = StatsResponse {
                total_records,
                total_days: summary.total_days,
                ok_days: summary.ok_days,
                anomaly_days: summary.anomaly_days,
            };
            (StatusCode::OK, Json(ApiResponse::ok(stats))).into_response()
        }
        Err(e) => {
            eprintln!("Error aggregating records: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::err(empty_stats(), e.to_string())),
            )
                .into_response()
        }
    }
}

fn empty_report() -> ReportResponse {
    ReportResponse {
        days: vec![],
        summary: GlobalSummary {
            total_days: 0,
            ok_days: 0,
            anomaly_days: 0,
        },
    }
}

fn empty_stats() -> StatsResponse {
    StatsResponse {
        total_records: 0,
        total_days: 0,
        ok_days: 0,
        anomaly_days: 0,
    }
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    println!("🌐 Station Recon - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let db_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "reconciliations.db".to_string());
    let db_path = std::path::Path::new(&db_path);

    if !db_path.exists() {
        eprintln!("❌ Database not found at {:?}", db_path);
        eprintln!("   Run: station-recon import <records.json>");
        eprintln!("   to load reconciliation records first.");
        std::process::exit(1);
    }

    let conn = Connection::open(db_path).expect("Failed to open database");
    println!("✓ Database opened: {:?}", db_path);

    // Create shared state
    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/reconciliations", get(get_reconciliations))
        .route("/report", get(get_report))
        .route("/stats", get(get_stats))
        .with_state(state);

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    // Start server
    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://localhost:3000");
    println!("   Report: http://localhost:3000/api/report");
    println!("   Stats:  http://localhost:3000/api/stats");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
