use anyhow::{Context, Result};
use rusqlite::Connection;
use std::env;
use std::fs::File;
use std::path::Path;

// Use library instead of local modules
use station_recon::{
    format_difference, get_records, insert_records, setup_database, verify_count, DayAggregator,
    QueryWindow, RawRecord,
};

const DEFAULT_DB_PATH: &str = "reconciliations.db";

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("import") => {
            // Import mode: bulk-load wire-format JSON records
            let json_path = args
                .get(2)
                .context("Usage: station-recon import <records.json> [db_path]")?;
            let db_path = args.get(3).map(|s| s.as_str()).unwrap_or(DEFAULT_DB_PATH);
            run_import(Path::new(json_path), Path::new(db_path))?;
        }
        Some("report") | None => {
            // Report mode (default)
            let db_path = args.get(2).map(|s| s.as_str()).unwrap_or(DEFAULT_DB_PATH);
            run_report(Path::new(db_path))?;
        }
        Some(other) => {
            eprintln!("❌ Unknown mode: {}", other);
            eprintln!("   Usage: station-recon [report [db_path]]");
            eprintln!("          station-recon import <records.json> [db_path]");
            std::process::exit(1);
        }
    }

    Ok(())
}

fn run_import(json_path: &Path, db_path: &Path) -> Result<()> {
    println!("🗄️  Importing reconciliation records");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Load wire-format records
    println!("\n📂 Loading records from {:?}...", json_path);
    let file = File::open(json_path).context("Failed to open records file")?;
    let records: Vec<RawRecord> =
        serde_json::from_reader(file).context("Failed to parse records file")?;
    println!("✓ Loaded {} records", records.len());

    // 2. Setup database
    println!("\n🔧 Setting up database...");
    let conn = Connection::open(db_path)?;
    setup_database(&conn)?;
    println!("✓ Database initialized with WAL mode");

    // 3. Insert records
    println!("\n💾 Inserting records...");
    let inserted = insert_records(&conn, &records)?;
    println!("✓ Inserted {} records", inserted);

    // 4. Verify count
    let count = verify_count(&conn)?;
    println!("✓ Database contains {} records total", count);

    Ok(())
}

fn run_report(db_path: &Path) -> Result<()> {
    if !db_path.exists() {
        eprintln!("❌ Database not found: {:?}", db_path);
        eprintln!("   Run: station-recon import <records.json>");
        eprintln!("   to load reconciliation records first.");
        std::process::exit(1);
    }

    let conn = Connection::open(db_path)?;
    let records = get_records(&conn, &QueryWindow::default())?;

    println!("📊 Daily Cash Reconciliation");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if records.is_empty() {
        println!("\nNo results available.");
        return Ok(());
    }

    let aggregator = DayAggregator::new();
    let (days, summary) = aggregator.aggregate(&records)?;

    for day in &days {
        let badge = day.status.badge();
        println!("\n📅 {}   {} {}", day.date, badge.glyph, day.status.label());

        for item in &day.items {
            let item_badge = item.status.badge();
            let mut line = format!(
                "   {} {}: {} (diff {})",
                item_badge.glyph,
                item.category.label(),
                item.status.code().replace('_', " "),
                format_difference(item.difference),
            );
            if let Some(note) = &item.note {
                line.push_str(&format!(" | {}", note));
            }
            println!("{}", line);
        }
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "{} days analyzed  ✅ {} OK  ⚠️ {} with anomalies",
        summary.total_days, summary.ok_days, summary.anomaly_days
    );

    Ok(())
}
