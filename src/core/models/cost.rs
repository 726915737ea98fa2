use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single cost line as returned by the billing API, before aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCost {
    pub key: String,
    pub amount: f64,
    pub currency: String,
}

impl RawCost {
    pub fn new(key: impl Into<String>, amount: f64, currency: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            amount,
            currency: currency.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostGroup {
    /// Dimension value, e.g. "Amazon Simple Storage Service"
    pub key: String,
    /// Amount in `currency`; negative for credits and refunds
    pub amount: f64,
    /// Currency code (e.g., "USD")
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostReport {
    /// Account alias, account ID, or a placeholder when neither resolved
    pub account: String,
    /// First day covered by the report
    pub date: NaiveDate,
    /// Sorted by absolute amount descending, "Other" last
    pub groups: Vec<CostGroup>,
    pub total: f64,
    pub currency: String,
}
