use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde_json::json;

use crate::inputs::FinancialInputs;
use crate::production::decline::{DeclineCurve, DeclineKind};
use crate::types::{rate_from_pct, CalcResult, Confidence, Years};

/// Estimated ultimate recovery from the configured decline curve, in boe.
/// Hyperbolic curves with b > 1 fall back to numeric integration and carry
/// a caveat for it.
pub fn eur(inputs: &FinancialInputs) -> CalcResult {
    let formula = "integral of production rate from t=0 to the economic limit";
    let production = &inputs.production;
    let curve = DeclineCurve::from_assumptions(production.initial_rate_boepd, &production.decline);
    let limit = production.economic_limit_bopd;
    let snapshot = json!({
        "kind": production.decline.kind,
        "initial_rate_boepd": production.initial_rate_boepd.to_string(),
        "initial_decline_pct": production.decline.initial_decline_pct.to_string(),
        "b_factor": production.decline.b_factor.to_string(),
        "economic_limit_bopd": limit.to_string(),
    });

    if limit >= production.initial_rate_boepd {
        return CalcResult::defined(Decimal::ZERO, "boe", formula, &snapshot)
            .with_caveat("economic limit at or above the initial rate");
    }

    match curve.eur(limit) {
        None => CalcResult::undefined(
            "integral is unbounded without a positive economic limit",
            "boe",
            formula,
            &snapshot,
        ),
        Some(value) => {
            let numeric_path = production.decline.kind == DeclineKind::Hyperbolic
                && production.decline.b_factor > Decimal::ONE;
            let result = CalcResult::defined(value, "boe", formula, &snapshot);
            if numeric_path {
                result
                    .with_confidence(Confidence::Medium)
                    .with_caveat("monthly numeric integration, horizon capped at 50 years")
            } else {
                result
            }
        }
    }
}

/// Effective exponential decline implied by two observed rates.
pub fn back_calculated_decline(q1: Decimal, q2: Decimal, years: Years) -> CalcResult {
    let formula = "-ln(q2/q1) / years";
    let snapshot = json!({
        "q1": q1.to_string(),
        "q2": q2.to_string(),
        "years": years.to_string(),
    });
    if q1 <= Decimal::ZERO || q2 <= Decimal::ZERO {
        return CalcResult::undefined("both rates must be positive", "%/yr", formula, &snapshot);
    }
    if years <= Decimal::ZERO {
        return CalcResult::undefined("interval must be positive", "%/yr", formula, &snapshot);
    }
    let decline = (q1 / q2).ln() / years;
    let result = CalcResult::defined(decline * dec!(100), "%/yr", formula, &snapshot)
        .with_workings(vec![format!(
            "ln({} / {}) / {} = {}",
            q1,
            q2,
            years,
            decline.round_dp(6)
        )]);
    if q2 > q1 {
        result.with_caveat("rate increased over the interval; decline is negative")
    } else {
        result
    }
}

/// Producing gas-to-oil ratio in scf per barrel.
pub fn gas_oil_ratio(gas_rate_mcfd: Decimal, oil_rate_bopd: Decimal) -> CalcResult {
    let formula = "gas rate (scf/d) / oil rate (bbl/d)";
    let snapshot = json!({
        "gas_rate_mcfd": gas_rate_mcfd.to_string(),
        "oil_rate_bopd": oil_rate_bopd.to_string(),
    });
    if gas_rate_mcfd < Decimal::ZERO {
        return CalcResult::undefined("gas rate cannot be negative", "scf/bbl", formula, &snapshot);
    }
    if oil_rate_bopd <= Decimal::ZERO {
        return CalcResult::undefined("no oil production", "scf/bbl", formula, &snapshot);
    }
    CalcResult::defined(
        gas_rate_mcfd * dec!(1000) / oil_rate_bopd,
        "scf/bbl",
        formula,
        &snapshot,
    )
}

/// Water share of total liquids.
pub fn water_cut(water_rate_bpd: Decimal, oil_rate_bopd: Decimal) -> CalcResult {
    let formula = "water / (water + oil) x 100";
    let snapshot = json!({
        "water_rate_bpd": water_rate_bpd.to_string(),
        "oil_rate_bopd": oil_rate_bopd.to_string(),
    });
    if water_rate_bpd < Decimal::ZERO || oil_rate_bopd < Decimal::ZERO {
        return CalcResult::undefined("rates cannot be negative", "%", formula, &snapshot);
    }
    let total = water_rate_bpd + oil_rate_bopd;
    if total <= Decimal::ZERO {
        return CalcResult::undefined("no liquid production", "%", formula, &snapshot);
    }
    CalcResult::defined(water_rate_bpd / total * dec!(100), "%", formula, &snapshot)
}

/// Reserves booked per boe produced over the same period. Above 100%
/// the asset is replacing more than it depletes.
pub fn reserve_replacement_ratio(additions_boe: Decimal, produced_boe: Decimal) -> CalcResult {
    let formula = "reserve additions / production x 100";
    let snapshot = json!({
        "additions_boe": additions_boe.to_string(),
        "produced_boe": produced_boe.to_string(),
    });
    if produced_boe <= Decimal::ZERO {
        return CalcResult::undefined("no production over the period", "%", formula, &snapshot);
    }
    CalcResult::defined(additions_boe / produced_boe * dec!(100), "%", formula, &snapshot)
}

/// Gross field production scaled to the working interest share.
pub fn wi_production(gross_boepd: Decimal, wi_pct: Decimal) -> CalcResult {
    let formula = "gross production x working interest";
    let snapshot = json!({
        "gross_boepd": gross_boepd.to_string(),
        "wi_pct": wi_pct.to_string(),
    });
    if gross_boepd < Decimal::ZERO {
        return CalcResult::undefined("gross rate cannot be negative", "boepd", formula, &snapshot);
    }
    if wi_pct <= Decimal::ZERO || wi_pct > dec!(100) {
        return CalcResult::undefined(
            "working interest must be in (0, 100]",
            "boepd",
            formula,
            &snapshot,
        );
    }
    CalcResult::defined(gross_boepd * rate_from_pct(wi_pct), "boepd", formula, &snapshot)
}

/// Barrels attributable to the net revenue interest after royalty and
/// overriding royalty burdens.
pub fn nri_production(
    gross_boepd: Decimal,
    wi_pct: Decimal,
    royalty_pct: Decimal,
    orri_pct: Decimal,
) -> CalcResult {
    let formula = "gross x WI x (1 - royalty - ORRI)";
    let snapshot = json!({
        "gross_boepd": gross_boepd.to_string(),
        "wi_pct": wi_pct.to_string(),
        "royalty_pct": royalty_pct.to_string(),
        "orri_pct": orri_pct.to_string(),
    });
    if gross_boepd < Decimal::ZERO {
        return CalcResult::undefined("gross rate cannot be negative", "boepd", formula, &snapshot);
    }
    if wi_pct <= Decimal::ZERO || wi_pct > dec!(100) {
        return CalcResult::undefined(
            "working interest must be in (0, 100]",
            "boepd",
            formula,
            &snapshot,
        );
    }
    let burden = Decimal::ONE - rate_from_pct(royalty_pct) - rate_from_pct(orri_pct);
    if burden < Decimal::ZERO {
        return CalcResult::undefined(
            "royalty and overrides exceed the revenue interest",
            "boepd",
            formula,
            &snapshot,
        );
    }
    CalcResult::defined(
        gross_boepd * rate_from_pct(wi_pct) * burden,
        "boepd",
        formula,
        &snapshot,
    )
}
