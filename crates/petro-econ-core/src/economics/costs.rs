use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

use crate::inputs::FinancialInputs;
use crate::production::schedule::{build_schedule, YearlyCashFlow};
use crate::types::{rate_from_pct, CalcResult, Confidence, Money};
use crate::valuation::metrics::{present_value, PV10_RATE};
use crate::PetroEconResult;

const BREAKEVEN_PRICE_FLOOR: Money = dec!(5);
const BREAKEVEN_PRICE_CEILING: Money = dec!(200);
const BREAKEVEN_MAX_ITERATIONS: u32 = 50;
/// Bisection accepts once PV10 is within this distance of the acquisition
/// cost, in USD.
const BREAKEVEN_PV_TOLERANCE: Money = dec!(1000);

/// First-year lease operating expense per boe produced.
pub fn lifting_cost(rows: &[YearlyCashFlow]) -> CalcResult {
    let formula = "annual LOE / annual boe";
    let Some(first) = rows.first() else {
        return CalcResult::undefined("schedule has no production years", "USD/boe", formula, &json!({}));
    };
    let snapshot = json!({
        "loe": first.loe.to_string(),
        "boe_volume": first.boe_volume.to_string(),
    });
    if first.boe_volume <= Decimal::ZERO {
        return CalcResult::undefined("no production volume in year 1", "USD/boe", formula, &snapshot);
    }
    CalcResult::defined(first.loe / first.boe_volume, "USD/boe", formula, &snapshot).with_workings(
        vec![format!(
            "year 1: LOE {} / {} boe",
            first.loe.round_dp(0),
            first.boe_volume.round_dp(0)
        )],
    )
}

/// Realized oil price net of royalty, severance and cash costs, per boe.
pub fn netback(inputs: &FinancialInputs) -> CalcResult {
    let value = netback_value(inputs);
    CalcResult::defined(
        value,
        "USD/boe",
        "(price + differential) x (1 - royalty) x (1 - severance) - LOE - transport",
        &json!({
            "oil_price": inputs.prices.oil_price.to_string(),
            "oil_differential": inputs.prices.oil_differential.to_string(),
            "royalty_pct": inputs.fiscal.royalty_pct.to_string(),
            "severance_pct": inputs.fiscal.severance_pct.to_string(),
            "loe_per_boe": inputs.costs.loe_per_boe.to_string(),
            "transport_per_boe": inputs.costs.transport_per_boe.to_string(),
        }),
    )
    .with_workings(vec![format!(
        "{} x {} x {} - {} - {} = {}",
        inputs.realized_oil_price(),
        Decimal::ONE - rate_from_pct(inputs.fiscal.royalty_pct),
        Decimal::ONE - rate_from_pct(inputs.fiscal.severance_pct),
        inputs.costs.loe_per_boe,
        inputs.costs.transport_per_boe,
        value.round_dp(4)
    )])
}

fn netback_value(inputs: &FinancialInputs) -> Money {
    let royalty = rate_from_pct(inputs.fiscal.royalty_pct);
    let severance = rate_from_pct(inputs.fiscal.severance_pct);
    inputs.realized_oil_price() * (Decimal::ONE - royalty) * (Decimal::ONE - severance)
        - inputs.costs.loe_per_boe
        - inputs.costs.transport_per_boe
}

/// WTI price at which the netback is exactly zero. Closed form, no search.
pub fn cash_breakeven(inputs: &FinancialInputs) -> CalcResult {
    let formula = "(LOE + transport) / ((1 - royalty)(1 - severance)) - differential";
    let royalty = rate_from_pct(inputs.fiscal.royalty_pct);
    let severance = rate_from_pct(inputs.fiscal.severance_pct);
    let retained = (Decimal::ONE - royalty) * (Decimal::ONE - severance);
    let snapshot = json!({
        "loe_per_boe": inputs.costs.loe_per_boe.to_string(),
        "transport_per_boe": inputs.costs.transport_per_boe.to_string(),
        "royalty_pct": inputs.fiscal.royalty_pct.to_string(),
        "severance_pct": inputs.fiscal.severance_pct.to_string(),
        "oil_differential": inputs.prices.oil_differential.to_string(),
    });
    if retained <= Decimal::ZERO {
        return CalcResult::undefined(
            "royalty and severance consume all revenue",
            "USD/bbl",
            formula,
            &snapshot,
        );
    }
    let cash_costs = inputs.costs.loe_per_boe + inputs.costs.transport_per_boe;
    let value = cash_costs / retained - inputs.prices.oil_differential;
    CalcResult::defined(value, "USD/bbl", formula, &snapshot).with_workings(vec![format!(
        "{} / {} - {} = {}",
        cash_costs,
        retained,
        inputs.prices.oil_differential,
        value.round_dp(4)
    )])
}

/// WTI price at which the asset's PV10 covers the acquisition cost.
/// Bisection over a fixed price bracket, rebuilding the full schedule at
/// each trial price.
pub fn full_cycle_breakeven(inputs: &FinancialInputs) -> PetroEconResult<CalcResult> {
    let formula = "price where PV10(schedule at price) = acquisition cost";
    let target = inputs.deal.acquisition_cost;
    let snapshot = json!({
        "acquisition_cost": target.to_string(),
        "bracket": format!("[{}, {}] USD/bbl", BREAKEVEN_PRICE_FLOOR, BREAKEVEN_PRICE_CEILING),
        "pv_tolerance": BREAKEVEN_PV_TOLERANCE.to_string(),
    });

    let pv10_at = |price: Money| -> PetroEconResult<Money> {
        let rows = build_schedule(&inputs.with_oil_price(price))?;
        Ok(present_value(&rows, PV10_RATE))
    };

    let gap_floor = pv10_at(BREAKEVEN_PRICE_FLOOR)? - target;
    if gap_floor.abs() < BREAKEVEN_PV_TOLERANCE {
        return Ok(CalcResult::defined(BREAKEVEN_PRICE_FLOOR, "USD/bbl", formula, &snapshot));
    }
    if gap_floor > Decimal::ZERO {
        return Ok(CalcResult::defined(BREAKEVEN_PRICE_FLOOR, "USD/bbl", formula, &snapshot)
            .with_confidence(Confidence::Low)
            .with_caveat("PV10 already covers the acquisition cost at the search floor"));
    }
    let gap_ceiling = pv10_at(BREAKEVEN_PRICE_CEILING)? - target;
    if gap_ceiling.abs() < BREAKEVEN_PV_TOLERANCE {
        return Ok(CalcResult::defined(BREAKEVEN_PRICE_CEILING, "USD/bbl", formula, &snapshot));
    }
    if gap_ceiling < Decimal::ZERO {
        return Ok(CalcResult::undefined(
            "PV10 cannot reach the acquisition cost below 200 USD/bbl",
            "USD/bbl",
            formula,
            &snapshot,
        ));
    }

    let mut lo = BREAKEVEN_PRICE_FLOOR;
    let mut hi = BREAKEVEN_PRICE_CEILING;
    for iteration in 1..=BREAKEVEN_MAX_ITERATIONS {
        let mid = (lo + hi) / dec!(2);
        let gap = pv10_at(mid)? - target;
        if gap.abs() < BREAKEVEN_PV_TOLERANCE {
            return Ok(CalcResult::defined(mid, "USD/bbl", formula, &snapshot).with_workings(
                vec![format!(
                    "converged in {} iterations, PV10 within {} of target",
                    iteration,
                    gap.abs().round_dp(0)
                )],
            ));
        }
        if gap > Decimal::ZERO {
            hi = mid;
        } else {
            lo = mid;
        }
    }

    let mid = (lo + hi) / dec!(2);
    Ok(CalcResult::defined(mid, "USD/bbl", formula, &snapshot)
        .with_confidence(Confidence::Low)
        .with_caveat("bisection did not converge within 50 iterations; best midpoint returned"))
}

/// Finding and development cost per boe added. Omitted (None) when no
/// reserve additions are supplied.
pub fn fd_cost(inputs: &FinancialInputs) -> Option<CalcResult> {
    let additions = inputs.reserves.as_ref()?.reserve_additions_boe?;
    let capex = inputs.total_development_capex();
    let formula = "development capex / reserve additions";
    let snapshot = json!({
        "development_capex": capex.to_string(),
        "reserve_additions_boe": additions.to_string(),
    });
    if additions <= Decimal::ZERO {
        return Some(CalcResult::undefined(
            "no reserve additions booked",
            "USD/boe",
            formula,
            &snapshot,
        ));
    }
    Some(CalcResult::defined(capex / additions, "USD/boe", formula, &snapshot))
}

/// Netback over F&D: how many dollars each development dollar returns.
/// Follows F&D's availability.
pub fn recycle_ratio(inputs: &FinancialInputs) -> Option<CalcResult> {
    let fd = fd_cost(inputs)?;
    let formula = "netback / F&D cost";
    let snapshot = json!({
        "netback": netback_value(inputs).to_string(),
        "fd_cost": fd.value().map(|v| v.to_string()),
    });
    let result = match fd.value() {
        None => CalcResult::undefined("F&D cost is undefined", "x", formula, &snapshot),
        Some(fd_value) if fd_value <= Decimal::ZERO => {
            CalcResult::undefined("F&D cost is zero", "x", formula, &snapshot)
        }
        Some(fd_value) => {
            CalcResult::defined(netback_value(inputs) / fd_value, "x", formula, &snapshot)
        }
    };
    Some(result)
}
