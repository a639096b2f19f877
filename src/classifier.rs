// 🏷️ Category Classifier - Codes to labels, glyphs and severity classes
//
// Pure lookups, no state. Two different contracts on purpose:
// - categories are lenient: an unknown code renders as itself
// - statuses are strict: an unknown code is an UnknownStatus error

use crate::record::{AggregationError, Category, RecordStatus};
use serde::Serialize;

// ============================================================================
// SEVERITY CLASS
// ============================================================================

/// Display severity bucket, serialized as the css class the dashboard uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityClass {
    Ok,
    Warn,
    Err,
    Info,
}

impl SeverityClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityClass::Ok => "color-ok",
            SeverityClass::Warn => "color-warn",
            SeverityClass::Err => "color-err",
            SeverityClass::Info => "color-info",
        }
    }
}

impl Serialize for SeverityClass {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

// ============================================================================
// STATUS BADGE
// ============================================================================

/// Glyph + severity class pair for one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusBadge {
    pub glyph: &'static str,
    pub class: SeverityClass,
}

impl RecordStatus {
    /// Display badge for a per-category status. Total - the enum is closed.
    pub fn badge(&self) -> StatusBadge {
        match self {
            RecordStatus::Balanced => StatusBadge {
                glyph: "✅",
                class: SeverityClass::Ok,
            },
            RecordStatus::MinorAnomaly => StatusBadge {
                glyph: "⚠️",
                class: SeverityClass::Warn,
            },
            RecordStatus::MajorAnomaly => StatusBadge {
                glyph: "🔴",
                class: SeverityClass::Err,
            },
            RecordStatus::Pending => StatusBadge {
                glyph: "⏳",
                class: SeverityClass::Info,
            },
        }
    }
}

// ============================================================================
// RAW-CODE LOOKUPS
// ============================================================================

/// Display label for a raw category code.
///
/// Unknown codes come back unchanged - a category the backend adds tomorrow
/// must still render today.
pub fn category_label(code: &str) -> String {
    Category::parse(code).label().to_string()
}

/// Badge for a raw status code.
///
/// Unlike categories there is no fallback here: a status outside the fixed
/// enumeration fails with `UnknownStatus`.
pub fn status_badge(code: &str) -> Result<StatusBadge, AggregationError> {
    match RecordStatus::from_code(code) {
        Some(status) => Ok(status.badge()),
        None => Err(AggregationError::UnknownStatus {
            code: code.to_string(),
        }),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_labels() {
        assert_eq!(category_label("CASH"), "Cash");
        assert_eq!(category_label("BANK_CARD"), "Bank Card");
        assert_eq!(category_label("FUEL_CARD"), "Fuel Card");
        assert_eq!(category_label("VOUCHER"), "Voucher");
        assert_eq!(category_label("DIGITAL_WALLET"), "Digital Wallet");
        assert_eq!(category_label("CREDIT"), "Credit");
    }

    #[test]
    fn test_unknown_category_falls_through() {
        assert_eq!(category_label("FOO"), "FOO");
        assert_eq!(category_label(""), "");
    }

    #[test]
    fn test_status_badges() {
        let ok = status_badge("BALANCED").unwrap();
        assert_eq!(ok.glyph, "✅");
        assert_eq!(ok.class, SeverityClass::Ok);

        let warn = status_badge("MINOR_ANOMALY").unwrap();
        assert_eq!(warn.glyph, "⚠️");
        assert_eq!(warn.class, SeverityClass::Warn);

        let err = status_badge("MAJOR_ANOMALY").unwrap();
        assert_eq!(err.glyph, "🔴");
        assert_eq!(err.class, SeverityClass::Err);

        let info = status_badge("IN_ATTESA").unwrap();
        assert_eq!(info.glyph, "⏳");
        assert_eq!(info.class, SeverityClass::Info);
    }

    #[test]
    fn test_unknown_status_is_an_error() {
        let err = status_badge("BOGUS").unwrap_err();
        match err {
            AggregationError::UnknownStatus { code } => assert_eq!(code, "BOGUS"),
            other => panic!("expected UnknownStatus, got {:?}", other),
        }
    }

    #[test]
    fn test_severity_class_serializes_as_css_class() {
        let json = serde_json::to_string(&SeverityClass::Warn).unwrap();
        assert_eq!(json, "\"color-warn\"");
    }
}
