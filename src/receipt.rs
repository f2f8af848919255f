//! # Receipt Data
//!
//! The payment record handed to the printer by the rest of the application.
//!
//! Everything here is caller-owned and already final: the date is rendered by
//! the caller and `total` is printed as supplied, never recomputed from
//! `base_amount + penalty`.
//!
//! ## JSON
//!
//! Both snake_case and the camelCase names used by web front ends are accepted:
//!
//! ```
//! use struk::receipt::ReceiptData;
//!
//! let receipt = ReceiptData::from_json(r#"{
//!     "billNumber": "INV-001", "payerName": "Budi", "objectName": "Kios A1",
//!     "baseAmount": 50000, "penalty": 0, "total": "50000.00",
//!     "date": "01/01/2026", "period": "Jan 2026"
//! }"#)?;
//! assert_eq!(receipt.total.units(), 50_000);
//! # Ok::<(), struk::StrukError>(())
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::StrukError;

/// A money amount in whole currency units (no fractional part).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Self = Self(0);

    pub const fn new(units: i64) -> Self {
        Self(units)
    }

    pub const fn units(self) -> i64 {
        self.0
    }
}

impl From<i64> for Amount {
    fn from(units: i64) -> Self {
        Self(units)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wire forms an amount may arrive in.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawAmount {
    fn into_amount(self) -> Result<Amount, String> {
        match self {
            Self::Int(units) => Ok(Amount(units)),
            Self::Float(value) => round_units(value),
            Self::Text(text) => {
                let text = text.trim();
                if let Ok(units) = text.parse::<i64>() {
                    return Ok(Amount(units));
                }
                match text.parse::<f64>() {
                    Ok(value) => round_units(value),
                    Err(_) => Err(format!("'{}' is not a number", text)),
                }
            }
        }
    }
}

fn round_units(value: f64) -> Result<Amount, String> {
    // i64::MAX is not representable as f64; stay strictly inside the range
    const LIMIT: f64 = 9.0e18;
    if !value.is_finite() || value.abs() >= LIMIT {
        return Err(format!("{} is out of range", value));
    }
    Ok(Amount(value.round() as i64))
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawAmount::deserialize(deserializer)?
            .into_amount()
            .map_err(serde::de::Error::custom)
    }
}

/// One finalized bill or payment, ready to print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptData {
    #[serde(alias = "billNumber")]
    pub bill_number: String,
    #[serde(alias = "payerName")]
    pub payer_name: String,
    #[serde(alias = "objectName")]
    pub object_name: String,
    #[serde(alias = "baseAmount")]
    pub base_amount: Amount,
    pub penalty: Amount,
    pub total: Amount,
    /// Pre-formatted by the caller
    pub date: String,
    pub period: String,
}

impl ReceiptData {
    /// Parse a receipt from JSON.
    pub fn from_json(json: &str) -> Result<Self, StrukError> {
        serde_json::from_str(json).map_err(|e| StrukError::Receipt(e.to_string()))
    }

    /// Read a receipt from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StrukError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            StrukError::Receipt(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// A small receipt for test prints.
    pub fn sample() -> Self {
        Self {
            bill_number: "INV-001".to_string(),
            payer_name: "Budi".to_string(),
            object_name: "Kios A1".to_string(),
            base_amount: Amount::new(50_000),
            penalty: Amount::ZERO,
            total: Amount::new(50_000),
            date: "01/01/2026".to_string(),
            period: "Jan 2026".to_string(),
        }
    }
}

/// Today's date as `DD/MM/YYYY`, the format receipts are printed with.
pub fn current_date() -> String {
    chrono::Local::now().format("%d/%m/%Y").to_string()
}
