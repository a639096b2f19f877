// ⚖️ Day Aggregator - Fold flat reconciliation rows into per-day summaries
//
// Pipeline: records -> groups -> sorted day summaries -> global summary.
// Every stage is a pure, synchronous function; each call builds its own
// structures, so concurrent calls never share state.
//
// Day-level status is a three-state machine {Balanced, MinorAnomaly,
// MajorAnomaly}: it starts Balanced and can only move toward more severe as
// rows are folded in. MajorAnomaly is absorbing. Balanced and Pending rows
// never move it. The fold is commutative: any permutation of the same rows
// lands on the same status.

use crate::classifier::StatusBadge;
use crate::record::{AggregationError, RawRecord, ReconciliationRecord, RecordStatus};
use serde::Serialize;
use std::collections::HashMap;

// ============================================================================
// DAY STATUS
// ============================================================================

/// Status of a whole calendar day, reduced across its category rows.
///
/// Note the asymmetry with `RecordStatus`: there is no `Pending` here. A day
/// holding only pending rows stays `Balanced` at this level while still being
/// excluded from the OK count (see `GlobalSummary`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayStatus {
    Balanced,
    MinorAnomaly,
    MajorAnomaly,
}

impl DayStatus {
    /// Fold one incoming row status into the day status.
    ///
    /// Monotone downgrade: MajorAnomaly is terminal, MinorAnomaly only wins
    /// over Balanced, everything else leaves the state alone.
    pub fn absorb(&mut self, incoming: RecordStatus) {
        match incoming {
            RecordStatus::MajorAnomaly => *self = DayStatus::MajorAnomaly,
            RecordStatus::MinorAnomaly => {
                if *self != DayStatus::MajorAnomaly {
                    *self = DayStatus::MinorAnomaly;
                }
            }
            RecordStatus::Balanced | RecordStatus::Pending => {}
        }
    }

    pub fn is_anomaly(&self) -> bool {
        !matches!(self, DayStatus::Balanced)
    }

    pub fn code(&self) -> &'static str {
        match self {
            DayStatus::Balanced => "BALANCED",
            DayStatus::MinorAnomaly => "MINOR_ANOMALY",
            DayStatus::MajorAnomaly => "MAJOR_ANOMALY",
        }
    }

    /// Human-facing label for the day header.
    pub fn label(&self) -> &'static str {
        match self {
            DayStatus::Balanced => "Balanced",
            DayStatus::MinorAnomaly => "Minor Anomaly",
            DayStatus::MajorAnomaly => "Major Anomaly",
        }
    }

    pub fn badge(&self) -> StatusBadge {
        match self {
            DayStatus::Balanced => RecordStatus::Balanced.badge(),
            DayStatus::MinorAnomaly => RecordStatus::MinorAnomaly.badge(),
            DayStatus::MajorAnomaly => RecordStatus::MajorAnomaly.badge(),
        }
    }
}

// ============================================================================
// DAY GROUP
// ============================================================================

/// All reconciliation rows for one calendar date, plus the reduced status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayGroup {
    pub date: String,
    /// Rows in the order first encountered in the input. Never resorted.
    pub items: Vec<ReconciliationRecord>,
    pub status: DayStatus,
}

impl DayGroup {
    pub fn new(date: &str) -> Self {
        DayGroup {
            date: date.to_string(),
            items: Vec::new(),
            status: DayStatus::Balanced,
        }
    }

    /// Append a row and fold its status into the day status.
    pub fn push(&mut self, record: ReconciliationRecord) {
        self.status.absorb(record.status);
        self.items.push(record);
    }

    /// True when every row is strictly Balanced (Pending does not count).
    pub fn all_balanced(&self) -> bool {
        !self.items.is_empty()
            && self
                .items
                .iter()
                .all(|r| r.status == RecordStatus::Balanced)
    }
}

// ============================================================================
// GLOBAL SUMMARY
// ============================================================================

/// Aggregate counts across one query result.
///
/// `ok_days + anomaly_days` need not equal `total_days`: a day holding only
/// Pending rows is in neither bucket. That gap is intrinsic to the two-bucket
/// design, not a bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSummary {
    pub total_days: usize,
    pub ok_days: usize,
    pub anomaly_days: usize,
}

// ============================================================================
// DAY AGGREGATOR
// ============================================================================

/// Stateless engine turning a flat record list into day summaries + totals.
pub struct DayAggregator;

impl DayAggregator {
    pub fn new() -> Self {
        DayAggregator
    }

    /// Group raw records by date, validating every one of them.
    ///
    /// Fails fast with `InvalidRecord` on the first contract violation - no
    /// partial result is ever returned. Records for the same date need not be
    /// contiguous; item order within a group follows the input.
    pub fn group(
        &self,
        records: &[RawRecord],
    ) -> Result<HashMap<String, DayGroup>, AggregationError> {
        let mut groups: HashMap<String, DayGroup> = HashMap::new();

        for raw in records {
            let record = ReconciliationRecord::from_raw(raw)?;
            groups
                .entry(record.date.clone())
                .or_insert_with(|| DayGroup::new(&record.date))
                .push(record);
        }

        Ok(groups)
    }

    /// Order day groups by date, newest first.
    ///
    /// Descending lexicographic order equals descending chronological order
    /// for ISO dates. Dates are unique per group, so ties cannot occur.
    pub fn sorted_descending(&self, groups: HashMap<String, DayGroup>) -> Vec<DayGroup> {
        let mut days: Vec<DayGroup> = groups.into_values().collect();
        days.sort_by(|a, b| b.date.cmp(&a.date));
        days
    }

    /// Count OK days and anomalous days across the groups.
    pub fn summarize(&self, days: &[DayGroup]) -> GlobalSummary {
        GlobalSummary {
            total_days: days.len(),
            ok_days: days.iter().filter(|d| d.all_balanced()).count(),
            anomaly_days: days.iter().filter(|d| d.status.is_anomaly()).count(),
        }
    }

    /// Full pipeline: records -> sorted day groups + global summary.
    pub fn aggregate(
        &self,
        records: &[RawRecord],
    ) -> Result<(Vec<DayGroup>, GlobalSummary), AggregationError> {
        let groups = self.group(records)?;
        let days = self.sorted_descending(groups);
        let summary = self.summarize(&days);
        Ok((days, summary))
    }
}

impl Default for DayAggregator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(date: &str, category: &str, status: &str, difference: f64) -> RawRecord {
        RawRecord {
            date: date.to_string(),
            category: category.to_string(),
            status: status.to_string(),
            difference,
            note: None,
        }
    }

    #[test]
    fn test_empty_input() {
        let aggregator = DayAggregator::new();
        let (days, summary) = aggregator.aggregate(&[]).unwrap();

        assert!(days.is_empty());
        assert_eq!(
            summary,
            GlobalSummary {
                total_days: 0,
                ok_days: 0,
                anomaly_days: 0
            }
        );
    }

    #[test]
    fn test_downgrade_is_commutative() {
        let aggregator = DayAggregator::new();
        let records = vec![
            raw("2024-05-01", "CASH", "BALANCED", 0.0),
            raw("2024-05-01", "BANK_CARD", "MAJOR_ANOMALY", 120.0),
            raw("2024-05-01", "VOUCHER", "MINOR_ANOMALY", -2.0),
            raw("2024-05-01", "CREDIT", "PENDING", 0.0),
        ];

        // Every permutation of the same multiset must land on the same status.
        let permutations: [[usize; 4]; 6] = [
            [0, 1, 2, 3],
            [3, 2, 1, 0],
            [1, 0, 3, 2],
            [2, 3, 0, 1],
            [1, 3, 0, 2],
            [2, 0, 3, 1],
        ];

        for order in &permutations {
            let shuffled: Vec<RawRecord> = order.iter().map(|&i| records[i].clone()).collect();
            let groups = aggregator.group(&shuffled).unwrap();
            let day = &groups["2024-05-01"];

            assert_eq!(day.status, DayStatus::MajorAnomaly);
            assert_eq!(day.items.len(), 4);
        }
    }

    #[test]
    fn test_major_anomaly_is_absorbing() {
        let mut status = DayStatus::Balanced;
        status.absorb(RecordStatus::MajorAnomaly);

        // No later row of any status moves the day away from MajorAnomaly.
        for incoming in [
            RecordStatus::Balanced,
            RecordStatus::MinorAnomaly,
            RecordStatus::Pending,
            RecordStatus::MajorAnomaly,
        ] {
            status.absorb(incoming);
            assert_eq!(status, DayStatus::MajorAnomaly);
        }
    }

    #[test]
    fn test_balanced_and_pending_never_downgrade() {
        let mut status = DayStatus::Balanced;
        status.absorb(RecordStatus::Balanced);
        status.absorb(RecordStatus::Pending);
        assert_eq!(status, DayStatus::Balanced);

        let mut status = DayStatus::MinorAnomaly;
        status.absorb(RecordStatus::Balanced);
        status.absorb(RecordStatus::Pending);
        assert_eq!(status, DayStatus::MinorAnomaly);
    }

    #[test]
    fn test_items_keep_encounter_order() {
        let aggregator = DayAggregator::new();
        let records = vec![
            raw("2024-05-01", "VOUCHER", "BALANCED", 0.0),
            raw("2024-05-02", "CASH", "BALANCED", 0.0),
            raw("2024-05-01", "CASH", "BALANCED", 0.0),
            raw("2024-05-01", "CREDIT", "BALANCED", 0.0),
        ];

        let groups = aggregator.group(&records).unwrap();
        let codes: Vec<&str> = groups["2024-05-01"]
            .items
            .iter()
            .map(|r| r.category.code())
            .collect();

        assert_eq!(codes, vec!["VOUCHER", "CASH", "CREDIT"]);
    }

    #[test]
    fn test_sorted_descending() {
        let aggregator = DayAggregator::new();
        let records = vec![
            raw("2024-01-01", "CASH", "BALANCED", 0.0),
            raw("2024-03-05", "CASH", "BALANCED", 0.0),
            raw("2024-02-10", "CASH", "BALANCED", 0.0),
        ];

        let (days, _) = aggregator.aggregate(&records).unwrap();
        let dates: Vec<&str> = days.iter().map(|d| d.date.as_str()).collect();

        assert_eq!(dates, vec!["2024-03-05", "2024-02-10", "2024-01-01"]);
    }

    #[test]
    fn test_pending_only_day_counts_in_neither_bucket() {
        let aggregator = DayAggregator::new();
        let records = vec![raw("2024-05-01", "CASH", "IN_ATTESA", 0.0)];

        let (days, summary) = aggregator.aggregate(&records).unwrap();

        // The lone pending row leaves the day Balanced at day level...
        assert_eq!(days[0].status, DayStatus::Balanced);
        // ...but the day is neither OK (not all rows balanced) nor anomalous.
        assert_eq!(
            summary,
            GlobalSummary {
                total_days: 1,
                ok_days: 0,
                anomaly_days: 0
            }
        );
    }

    #[test]
    fn test_invalid_status_aborts_whole_pass() {
        let aggregator = DayAggregator::new();
        let records = vec![
            raw("2024-05-01", "CASH", "BALANCED", 0.0),
            raw("2024-05-02", "CASH", "BOGUS", 0.0),
        ];

        let err = aggregator.group(&records).unwrap_err();
        assert!(matches!(err, AggregationError::InvalidRecord { .. }));
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let aggregator = DayAggregator::new();
        let records = vec![
            raw("2024-05-01", "CASH", "BALANCED", 0.0),
            raw("2024-05-01", "BANK_CARD", "MINOR_ANOMALY", -5.5),
            raw("2024-05-02", "CASH", "MAJOR_ANOMALY", 120.0),
        ];

        let first = aggregator.aggregate(&records).unwrap();
        let second = aggregator.aggregate(&records).unwrap();

        let first_json = serde_json::to_string(&first).unwrap();
        let second_json = serde_json::to_string(&second).unwrap();
        assert_eq!(first_json, second_json);
    }

    #[test]
    fn test_end_to_end_scenario() {
        let aggregator = DayAggregator::new();
        let records = vec![
            raw("2024-05-01", "CASH", "BALANCED", 0.0),
            raw("2024-05-01", "BANK_CARD", "MINOR_ANOMALY", -5.5),
            raw("2024-05-02", "CASH", "MAJOR_ANOMALY", 120.0),
        ];

        let (days, summary) = aggregator.aggregate(&records).unwrap();

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, "2024-05-02");
        assert_eq!(days[0].status, DayStatus::MajorAnomaly);
        assert_eq!(days[1].date, "2024-05-01");
        assert_eq!(days[1].status, DayStatus::MinorAnomaly);
        assert_eq!(
            summary,
            GlobalSummary {
                total_days: 2,
                ok_days: 0,
                anomaly_days: 2
            }
        );

        println!("✅ End-to-end scenario: {:?}", summary);
    }

    #[test]
    fn test_ok_day_requires_every_row_balanced() {
        let aggregator = DayAggregator::new();
        let records = vec![
            // Fully balanced day
            raw("2024-05-01", "CASH", "BALANCED", 0.0),
            raw("2024-05-01", "CREDIT", "BALANCED", 0.0),
            // Balanced + pending day: day status stays Balanced, but not OK
            raw("2024-05-02", "CASH", "BALANCED", 0.0),
            raw("2024-05-02", "CREDIT", "PENDING", 0.0),
        ];

        let (days, summary) = aggregator.aggregate(&records).unwrap();

        assert!(days.iter().all(|d| d.status == DayStatus::Balanced));
        assert_eq!(
            summary,
            GlobalSummary {
                total_days: 2,
                ok_days: 1,
                anomaly_days: 0
            }
        );
    }
}
