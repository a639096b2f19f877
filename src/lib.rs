// Station Recon - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod record;     // Wire contract + validated model
pub mod classifier; // Category/status display classification
pub mod aggregate;  // Day grouping + severity reduction
pub mod report;     // Presentation-layer data contract
pub mod db;         // SQLite record store

// Re-export commonly used types
pub use record::{
    AggregationError, Category, RawRecord, ReconciliationRecord, RecordStatus,
};
pub use classifier::{
    category_label, status_badge, SeverityClass, StatusBadge,
};
pub use aggregate::{
    DayAggregator, DayGroup, DayStatus, GlobalSummary,
};
pub use report::{
    build_report, format_difference, DayReport, ItemReport,
};
pub use db::{
    get_records, insert_records, setup_database, verify_count,
    QueryWindow, DEFAULT_QUERY_LIMIT,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
