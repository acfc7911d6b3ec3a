use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Rates as percentage points (12.5 = 12.5%). Input-boundary form only.
pub type Pct = Decimal;

/// Year fractions or counts
pub type Years = Decimal;

/// Gas volume conversion: thousand cubic feet per barrel of oil equivalent.
pub const MCF_PER_BOE: Decimal = dec!(5.615);

/// Days per year used for all annualization, including leap years.
pub const DAYS_PER_YEAR: Decimal = dec!(365.25);

/// Converts a boundary percentage-point value into an internal rate.
pub fn rate_from_pct(points: Pct) -> Rate {
    points / dec!(100)
}

/// How much weight a metric's value should carry downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// A metric either resolved to a value or it did not. Callers must branch;
/// there is no null value to misread as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Defined { value: Decimal },
    Undefined { reason: String },
}

impl Outcome {
    pub fn value(&self) -> Option<Decimal> {
        match self {
            Outcome::Defined { value } => Some(*value),
            Outcome::Undefined { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Outcome::Defined { .. } => None,
            Outcome::Undefined { reason } => Some(reason),
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Outcome::Defined { .. })
    }
}

/// Output envelope carried by every metric: the outcome plus the full
/// derivation trail (formula, inputs snapshot, workings, caveats).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalcResult {
    pub outcome: Outcome,
    pub unit: String,
    pub formula: String,
    pub inputs_used: serde_json::Value,
    pub workings: Vec<String>,
    pub caveats: Vec<String>,
    pub confidence: Confidence,
}

impl CalcResult {
    /// A resolved metric at HIGH confidence. Downgrade explicitly where the
    /// method warrants it.
    pub fn defined(value: Decimal, unit: &str, formula: &str, inputs_used: &impl Serialize) -> Self {
        CalcResult {
            outcome: Outcome::Defined { value },
            unit: unit.to_string(),
            formula: formula.to_string(),
            inputs_used: serde_json::to_value(inputs_used).unwrap_or_default(),
            workings: Vec::new(),
            caveats: Vec::new(),
            confidence: Confidence::High,
        }
    }

    /// A metric with no sensible value. Always LOW confidence.
    pub fn undefined(reason: &str, unit: &str, formula: &str, inputs_used: &impl Serialize) -> Self {
        CalcResult {
            outcome: Outcome::Undefined {
                reason: reason.to_string(),
            },
            unit: unit.to_string(),
            formula: formula.to_string(),
            inputs_used: serde_json::to_value(inputs_used).unwrap_or_default(),
            workings: Vec::new(),
            caveats: Vec::new(),
            confidence: Confidence::Low,
        }
    }

    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_workings(mut self, workings: Vec<String>) -> Self {
        self.workings = workings;
        self
    }

    pub fn with_caveat(mut self, caveat: &str) -> Self {
        self.caveats.push(caveat.to_string());
        self
    }

    pub fn value(&self) -> Option<Decimal> {
        self.outcome.value()
    }

    pub fn error(&self) -> Option<&str> {
        self.outcome.error()
    }
}

/// Display-name-keyed metric map. BTreeMap keeps iteration deterministic,
/// matching the engine's determinism guarantee.
pub type MetricMap = BTreeMap<String, CalcResult>;
