// 🗄️ Record Store - SQLite persistence for reconciliation rows
//
// The store is the query-service side of the system: the analysis pipeline
// writes one row per category per day, the aggregation core reads them back
// for a date window. Nothing here interprets the rows - validation and
// severity reduction belong to the aggregation core.

use crate::record::RawRecord;
use anyhow::{Context, Result};
use rusqlite::{params, Connection};

/// Default window size, matching the dashboard's query limit.
pub const DEFAULT_QUERY_LIMIT: u32 = 200;

// ============================================================================
// QUERY WINDOW
// ============================================================================

/// Optional date window + row cap for a records query.
#[derive(Debug, Clone, Default)]
pub struct QueryWindow {
    /// Inclusive lower bound (ISO date).
    pub date_from: Option<String>,
    /// Inclusive upper bound (ISO date).
    pub date_to: Option<String>,
    /// Maximum rows returned; defaults to `DEFAULT_QUERY_LIMIT`.
    pub limit: Option<u32>,
}

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS reconciliation_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            category TEXT NOT NULL,
            status TEXT NOT NULL,
            difference REAL NOT NULL,
            note TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_records_date ON reconciliation_records(date)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// WRITE
// ============================================================================

pub fn insert_records(conn: &Connection, records: &[RawRecord]) -> Result<usize> {
    let mut inserted = 0;

    for record in records {
        conn.execute(
            "INSERT INTO reconciliation_records (date, category, status, difference, note)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.date,
                record.category,
                record.status,
                record.difference,
                record.note,
            ],
        )
        .context("Failed to insert reconciliation record")?;

        inserted += 1;
    }

    Ok(inserted)
}

// ============================================================================
// READ
// ============================================================================

/// Fetch reconciliation rows for a window, newest date first.
///
/// Secondary order by category keeps rows of one day stable across fetches.
pub fn get_records(conn: &Connection, window: &QueryWindow) -> Result<Vec<RawRecord>> {
    let mut sql = String::from(
        "SELECT date, category, status, difference, note
         FROM reconciliation_records
         WHERE 1=1",
    );
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(date_from) = &window.date_from {
        sql.push_str(" AND date >= ?");
        params_vec.push(Box::new(date_from.clone()));
    }
    if let Some(date_to) = &window.date_to {
        sql.push_str(" AND date <= ?");
        params_vec.push(Box::new(date_to.clone()));
    }

    sql.push_str(" ORDER BY date DESC, category LIMIT ?");
    params_vec.push(Box::new(window.limit.unwrap_or(DEFAULT_QUERY_LIMIT)));

    let mut stmt = conn.prepare(&sql)?;

    let records = stmt
        .query_map(rusqlite::params_from_iter(params_vec.iter()), |row| {
            Ok(RawRecord {
                date: row.get(0)?,
                category: row.get(1)?,
                status: row.get(2)?,
                difference: row.get(3)?,
                note: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to read reconciliation records")?;

    Ok(records)
}

pub fn verify_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM reconciliation_records",
        [],
        |row| row.get(0),
    )?;

    Ok(count)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_record(date: &str, category: &str, status: &str, difference: f64) -> RawRecord {
        RawRecord {
            date: date.to_string(),
            category: category.to_string(),
            status: status.to_string(),
            difference,
            note: None,
        }
    }

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    #[test]
    fn test_insert_and_read_back() {
        let conn = test_db();

        let mut record = create_test_record("2024-05-01", "CASH", "BALANCED", 0.0);
        record.note = Some("counted twice".to_string());

        let inserted = insert_records(&conn, &[record.clone()]).unwrap();
        assert_eq!(inserted, 1);
        assert_eq!(verify_count(&conn).unwrap(), 1);

        let records = get_records(&conn, &QueryWindow::default()).unwrap();
        assert_eq!(records, vec![record]);
    }

    #[test]
    fn test_records_come_back_newest_first() {
        let conn = test_db();

        let records = vec![
            create_test_record("2024-01-01", "CASH", "BALANCED", 0.0),
            create_test_record("2024-03-05", "CASH", "BALANCED", 0.0),
            create_test_record("2024-02-10", "CASH", "BALANCED", 0.0),
        ];
        insert_records(&conn, &records).unwrap();

        let fetched = get_records(&conn, &QueryWindow::default()).unwrap();
        let dates: Vec<&str> = fetched.iter().map(|r| r.date.as_str()).collect();

        assert_eq!(dates, vec!["2024-03-05", "2024-02-10", "2024-01-01"]);
    }

    #[test]
    fn test_date_window_filters() {
        let conn = test_db();

        let records = vec![
            create_test_record("2024-01-01", "CASH", "BALANCED", 0.0),
            create_test_record("2024-02-10", "CASH", "BALANCED", 0.0),
            create_test_record("2024-03-05", "CASH", "BALANCED", 0.0),
        ];
        insert_records(&conn, &records).unwrap();

        let window = QueryWindow {
            date_from: Some("2024-01-15".to_string()),
            date_to: Some("2024-02-28".to_string()),
            limit: None,
        };

        let fetched = get_records(&conn, &window).unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].date, "2024-02-10");
    }

    #[test]
    fn test_limit_caps_result() {
        let conn = test_db();

        let records = vec![
            create_test_record("2024-01-01", "CASH", "BALANCED", 0.0),
            create_test_record("2024-01-02", "CASH", "BALANCED", 0.0),
            create_test_record("2024-01-03", "CASH", "BALANCED", 0.0),
        ];
        insert_records(&conn, &records).unwrap();

        let window = QueryWindow {
            limit: Some(2),
            ..Default::default()
        };

        let fetched = get_records(&conn, &window).unwrap();
        assert_eq!(fetched.len(), 2);
        assert_eq!(fetched[0].date, "2024-01-03");
    }

    #[test]
    fn test_same_day_rows_ordered_by_category() {
        let conn = test_db();

        let records = vec![
            create_test_record("2024-05-01", "VOUCHER", "BALANCED", 0.0),
            create_test_record("2024-05-01", "CASH", "BALANCED", 0.0),
        ];
        insert_records(&conn, &records).unwrap();

        let fetched = get_records(&conn, &QueryWindow::default()).unwrap();
        let categories: Vec<&str> = fetched.iter().map(|r| r.category.as_str()).collect();

        assert_eq!(categories, vec!["CASH", "VOUCHER"]);
    }
}
