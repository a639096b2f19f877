// 📋 Report Builder - Presentation-ready view of the aggregation output
//
// The dashboard consumes a fixed shape per day:
//   { date, status, items: [ { label, statusGlyph, statusClass,
//                              formattedDifference, note? } ] }
// plus one { totalDays, okDays, anomalyDays } summary object.
//
// Building the report is the only place where the classifier's display
// attributes meet the aggregated groups. Still pure: no I/O, no state.

use crate::aggregate::{DayGroup, DayStatus};
use crate::record::ReconciliationRecord;
use serde::Serialize;

// ============================================================================
// REPORT SHAPES
// ============================================================================

/// One labeled row inside a day card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemReport {
    pub label: String,
    pub status_glyph: String,
    pub status_class: String,
    pub formatted_difference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One day card: date, reduced status, labeled rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayReport {
    pub date: String,
    pub status: DayStatus,
    pub items: Vec<ItemReport>,
}

impl From<&ReconciliationRecord> for ItemReport {
    fn from(record: &ReconciliationRecord) -> Self {
        let badge = record.status.badge();
        ItemReport {
            label: record.category.label().to_string(),
            status_glyph: badge.glyph.to_string(),
            status_class: badge.class.as_str().to_string(),
            formatted_difference: format_difference(record.difference),
            note: record.note.clone(),
        }
    }
}

impl From<&DayGroup> for DayReport {
    fn from(group: &DayGroup) -> Self {
        DayReport {
            date: group.date.clone(),
            status: group.status,
            items: group.items.iter().map(ItemReport::from).collect(),
        }
    }
}

// ============================================================================
// FORMATTING
// ============================================================================

/// Render a discrepancy with two decimals and a leading `+` for strictly
/// positive amounts. Zero (including negative zero) renders as "0.00";
/// negative amounts keep their own sign.
pub fn format_difference(amount: f64) -> String {
    if amount > 0.0 {
        format!("+{:.2}", amount)
    } else if amount == 0.0 {
        "0.00".to_string()
    } else {
        format!("{:.2}", amount)
    }
}

/// Build the presentation-layer report from sorted day groups.
pub fn build_report(days: &[DayGroup]) -> Vec<DayReport> {
    days.iter().map(DayReport::from).collect()
}

// ============================================================================
// TESTS
// ============================================================================
