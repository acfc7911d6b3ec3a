use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::analysis::summary::FinancialAnalysisSummary;

/// Flag severities in ranking order: sorting ascending puts CRITICAL
/// first in every flag list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FlagSeverity {
    Critical,
    Warning,
    Info,
}

/// One benchmark breach: which metric, what it was, which threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialQualityFlag {
    pub severity: FlagSeverity,
    pub metric: String,
    pub value: Decimal,
    pub threshold: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Jurisdiction-parameterized thresholds
// ---------------------------------------------------------------------------

struct JurisdictionThresholds {
    key: &'static str,
    loe_warning: Decimal,
    loe_critical: Decimal,
    ev_2p_warning: Decimal,
    ev_2p_critical: Decimal,
}

const JURISDICTION_THRESHOLDS: &[JurisdictionThresholds] = &[
    JurisdictionThresholds {
        key: "gom",
        loe_warning: dec!(18),
        loe_critical: dec!(30),
        ev_2p_warning: dec!(15),
        ev_2p_critical: dec!(25),
    },
    JurisdictionThresholds {
        key: "ukcs",
        loe_warning: dec!(28),
        loe_critical: dec!(40),
        ev_2p_warning: dec!(10),
        ev_2p_critical: dec!(18),
    },
    JurisdictionThresholds {
        key: "norway",
        loe_warning: dec!(12),
        loe_critical: dec!(20),
        ev_2p_warning: dec!(12),
        ev_2p_critical: dec!(20),
    },
];

const DEFAULT_THRESHOLDS: JurisdictionThresholds = JurisdictionThresholds {
    key: "other",
    loe_warning: dec!(15),
    loe_critical: dec!(25),
    ev_2p_warning: dec!(12),
    ev_2p_critical: dec!(20),
};

fn thresholds_for(jurisdiction: &str) -> &'static JurisdictionThresholds {
    let key = jurisdiction.trim().to_lowercase();
    JURISDICTION_THRESHOLDS
        .iter()
        .find(|t| key.contains(t.key))
        .unwrap_or(&DEFAULT_THRESHOLDS)
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

fn flag(
    flags: &mut Vec<FinancialQualityFlag>,
    severity: FlagSeverity,
    metric: &str,
    value: Decimal,
    threshold: &str,
    message: &str,
) {
    flags.push(FinancialQualityFlag {
        severity,
        metric: metric.to_string(),
        value,
        threshold: threshold.to_string(),
        message: message.to_string(),
    });
}

/// Benchmark rules over the headline summary. Absent metrics are skipped;
/// the output is sorted CRITICAL, WARNING, INFO.
pub fn validate_summary(summary: &FinancialAnalysisSummary) -> Vec<FinancialQualityFlag> {
    let mut flags = Vec::new();

    if let Some(irr) = summary.irr_pct {
        if irr < dec!(10) {
            flag(&mut flags, FlagSeverity::Critical, "IRR", irr, "below 10%",
                "IRR is under the 10% minimum hurdle");
        } else if irr < dec!(15) {
            flag(&mut flags, FlagSeverity::Warning, "IRR", irr, "below 15%",
                "IRR is under the 15% target hurdle");
        } else if irr >= dec!(25) {
            flag(&mut flags, FlagSeverity::Info, "IRR", irr, "at or above 25%",
                "exceptional IRR; revisit the price deck and decline assumptions");
        }
    }

    if let Some(payback) = summary.payback_years {
        if payback > dec!(8) {
            flag(&mut flags, FlagSeverity::Critical, "Payback Period", payback, "above 8 years",
                "capital is not recovered within 8 years");
        } else if payback > dec!(5) {
            flag(&mut flags, FlagSeverity::Warning, "Payback Period", payback, "above 5 years",
                "capital recovery takes more than 5 years");
        }
    }

    if let Some(breakeven) = summary.cash_breakeven {
        if breakeven > dec!(65) {
            flag(&mut flags, FlagSeverity::Critical, "Cash Breakeven Oil Price", breakeven,
                "above 65 USD/bbl", "operations need more than 65 USD/bbl to cover cash costs");
        } else if breakeven > dec!(50) {
            flag(&mut flags, FlagSeverity::Warning, "Cash Breakeven Oil Price", breakeven,
                "above 50 USD/bbl", "thin cash margin below a 50 USD/bbl deck");
        }
    }

    if let Some(netback) = summary.netback_per_boe {
        if netback < Decimal::ZERO {
            flag(&mut flags, FlagSeverity::Critical, "Netback", netback, "below 0 USD/boe",
                "every barrel loses money at the current deck");
        } else if netback < dec!(10) {
            flag(&mut flags, FlagSeverity::Warning, "Netback", netback, "below 10 USD/boe",
                "netback margin is thin");
        }
    }

    if let Some(take) = summary.government_take_pct {
        if take > dec!(80) {
            flag(&mut flags, FlagSeverity::Critical, "Government Take", take, "above 80%",
                "the fiscal regime captures most of the revenue");
        } else if take > dec!(75) {
            flag(&mut flags, FlagSeverity::Warning, "Government Take", take, "above 75%",
                "government take is high for a concessionary regime");
        }
    }

    if let Some(full_cycle) = summary.full_cycle_breakeven {
        if full_cycle > dec!(80) {
            flag(&mut flags, FlagSeverity::Critical, "Full-Cycle Breakeven Oil Price", full_cycle,
                "above 80 USD/bbl", "the purchase price is not recovered below 80 USD/bbl");
        } else if full_cycle > dec!(65) {
            flag(&mut flags, FlagSeverity::Warning, "Full-Cycle Breakeven Oil Price", full_cycle,
                "above 65 USD/bbl", "full-cycle economics need an above-consensus deck");
        }
    }

    if let Some(pv10) = summary.pv10 {
        if pv10 < Decimal::ZERO {
            flag(&mut flags, FlagSeverity::Critical, "PV10", pv10, "below 0",
                "the asset has negative present value at the standard 10% rate");
        }
    }

    if let Some(base) = summary.borrowing_base {
        if base < Decimal::ZERO {
            flag(&mut flags, FlagSeverity::Critical, "Borrowing Base", base, "below 0",
                "lender PV is negative; the facility is unsupported");
        }
    }

    let thresholds = thresholds_for(&summary.jurisdiction);
    if let Some(loe) = summary.lifting_cost_per_boe {
        if loe > thresholds.loe_critical {
            flag(&mut flags, FlagSeverity::Critical, "Lifting Cost", loe,
                &format!("above {} USD/boe for {}", thresholds.loe_critical, thresholds.key),
                "lifting cost is far above the regional norm");
        } else if loe > thresholds.loe_warning {
            flag(&mut flags, FlagSeverity::Warning, "Lifting Cost", loe,
                &format!("above {} USD/boe for {}", thresholds.loe_warning, thresholds.key),
                "lifting cost is above the regional norm");
        }
    }
    if let Some(ev_2p) = summary.ev_per_2p {
        if ev_2p > thresholds.ev_2p_critical {
            flag(&mut flags, FlagSeverity::Critical, "EV/2P", ev_2p,
                &format!("above {} USD/boe for {}", thresholds.ev_2p_critical, thresholds.key),
                "paying far above regional comparables per 2P barrel");
        } else if ev_2p > thresholds.ev_2p_warning {
            flag(&mut flags, FlagSeverity::Warning, "EV/2P", ev_2p,
                &format!("above {} USD/boe for {}", thresholds.ev_2p_warning, thresholds.key),
                "paying above regional comparables per 2P barrel");
        }
    }

    flags.sort_by(|a, b| a.severity.cmp(&b.severity));
    flags
}
