// 🧾 Reconciliation Records - Wire contract and validated domain model
//
// The legacy backend exports one row per category per day:
//   { "data": "YYYY-MM-DD", "categoria": "...", "stato": "...",
//     "differenza": 12.5 | "12.5", "note": "..." }
//
// RawRecord mirrors that JSON shape unchanged. ReconciliationRecord is the
// validated form: the date must be ISO, the status must be a known code.
// Categories are deliberately open - an unknown code still renders.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============================================================================
// ERRORS
// ============================================================================

/// Errors surfaced by the aggregation core.
///
/// `InvalidRecord` aborts a whole grouping pass: a partial summary built from
/// a batch with a bad record would be worse than an explicit failure.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregationError {
    /// A record violates the data contract (missing/malformed date,
    /// status outside the fixed enumeration).
    InvalidRecord { field: String, message: String },

    /// The classifier was asked to render a status code it does not know.
    UnknownStatus { code: String },
}

impl std::fmt::Display for AggregationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregationError::InvalidRecord { field, message } => {
                write!(f, "invalid record: {}: {}", field, message)
            }
            AggregationError::UnknownStatus { code } => {
                write!(f, "unknown status code: {}", code)
            }
        }
    }
}

impl std::error::Error for AggregationError {}

// ============================================================================
// RAW RECORD (wire format)
// ============================================================================

/// One reconciliation row exactly as the backend emits it.
///
/// Missing `data` / `categoria` / `stato` deserialize to empty strings so the
/// contract violation is reported by validation as `InvalidRecord` instead of
/// a serde error half-way through a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "data", default)]
    pub date: String,

    #[serde(rename = "categoria", default)]
    pub category: String,

    #[serde(rename = "stato", default)]
    pub status: String,

    /// Signed discrepancy in currency units. The backend sends either a JSON
    /// number or a numeric string, depending on the export path.
    #[serde(rename = "differenza", deserialize_with = "amount_from_number_or_string")]
    pub difference: f64,

    #[serde(rename = "note", default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

fn amount_from_number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("not a numeric amount: {:?}", s))),
    }
}

// ============================================================================
// CATEGORY
// ============================================================================

/// Payment category of a reconciliation row.
///
/// The enumeration is closed for the known codes, but deliberately keeps an
/// `Other` arm: a category the backend adds tomorrow must still render today,
/// with its raw code as the label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category {
    Cash,
    BankCard,
    FuelCard,
    Voucher,
    DigitalWallet,
    Credit,
    /// Unrecognized code, passed through verbatim.
    Other(String),
}

impl Category {
    /// Parse a wire code. Never fails - unknown codes land in `Other`.
    ///
    /// Accepts both the canonical codes and the legacy codes the original
    /// backend still emits (CONTANTI, CARTE_BANCARIE, ...).
    pub fn parse(code: &str) -> Self {
        match code {
            "CASH" | "CONTANTI" => Category::Cash,
            "BANK_CARD" | "CARTE_BANCARIE" => Category::BankCard,
            "FUEL_CARD" | "CARTE_PETROLIFERE" => Category::FuelCard,
            "VOUCHER" | "BUONI" => Category::Voucher,
            "DIGITAL_WALLET" | "SATISPAY" => Category::DigitalWallet,
            "CREDIT" | "CREDITO" => Category::Credit,
            other => Category::Other(other.to_string()),
        }
    }

    /// Canonical wire code (the raw code for `Other`).
    pub fn code(&self) -> &str {
        match self {
            Category::Cash => "CASH",
            Category::BankCard => "BANK_CARD",
            Category::FuelCard => "FUEL_CARD",
            Category::Voucher => "VOUCHER",
            Category::DigitalWallet => "DIGITAL_WALLET",
            Category::Credit => "CREDIT",
            Category::Other(raw) => raw,
        }
    }

    /// Human-facing label for display.
    pub fn label(&self) -> &str {
        match self {
            Category::Cash => "Cash",
            Category::BankCard => "Bank Card",
            Category::FuelCard => "Fuel Card",
            Category::Voucher => "Voucher",
            Category::DigitalWallet => "Digital Wallet",
            Category::Credit => "Credit",
            Category::Other(raw) => raw,
        }
    }
}

impl Serialize for Category {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.code())
    }
}

// ============================================================================
// RECORD STATUS
// ============================================================================

/// Per-category reconciliation outcome. Closed enumeration: any code outside
/// this set is a data-contract violation, never silently coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    Balanced,
    MinorAnomaly,
    MajorAnomaly,
    Pending,
}

impl RecordStatus {
    /// Parse a wire code. Accepts canonical codes and the legacy codes the
    /// original backend emits (QUADRATO, ANOMALIA_LIEVE, ...).
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "BALANCED" | "QUADRATO" => Some(RecordStatus::Balanced),
            "MINOR_ANOMALY" | "ANOMALIA_LIEVE" => Some(RecordStatus::MinorAnomaly),
            "MAJOR_ANOMALY" | "ANOMALIA_GRAVE" => Some(RecordStatus::MajorAnomaly),
            "PENDING" | "IN_ATTESA" => Some(RecordStatus::Pending),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            RecordStatus::Balanced => "BALANCED",
            RecordStatus::MinorAnomaly => "MINOR_ANOMALY",
            RecordStatus::MajorAnomaly => "MAJOR_ANOMALY",
            RecordStatus::Pending => "PENDING",
        }
    }
}

// ============================================================================
// VALIDATED RECORD
// ============================================================================

/// A reconciliation row that passed contract validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationRecord {
    /// ISO calendar date (YYYY-MM-DD), the grouping key.
    pub date: String,
    pub category: Category,
    pub status: RecordStatus,
    pub difference: f64,
    pub note: Option<String>,
}

impl ReconciliationRecord {
    /// Validate a raw row into the typed form.
    ///
    /// Fails with `InvalidRecord` when the date is absent or not ISO
    /// YYYY-MM-DD, or when the status code is outside the enumeration.
    /// Category codes are never rejected.
    pub fn from_raw(raw: &RawRecord) -> Result<Self, AggregationError> {
        if raw.date.is_empty() {
            return Err(AggregationError::InvalidRecord {
                field: "data".to_string(),
                message: "required field is missing or empty".to_string(),
            });
        }

        if NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d").is_err() {
            return Err(AggregationError::InvalidRecord {
                field: "data".to_string(),
                message: format!("not an ISO date (YYYY-MM-DD): {:?}", raw.date),
            });
        }

        let status = RecordStatus::from_code(&raw.status).ok_or_else(|| {
            AggregationError::InvalidRecord {
                field: "stato".to_string(),
                message: format!("status code outside the enumeration: {:?}", raw.status),
            }
        })?;

        Ok(ReconciliationRecord {
            date: raw.date.clone(),
            category: Category::parse(&raw.category),
            status,
            difference: raw.difference,
            note: raw.note.clone(),
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
