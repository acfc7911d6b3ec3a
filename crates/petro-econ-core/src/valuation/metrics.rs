use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

use crate::production::schedule::YearlyCashFlow;
use crate::types::{CalcResult, Confidence, Money, Rate};

const IRR_INITIAL_GUESS: Rate = dec!(0.20);
const IRR_MAX_ITERATIONS: u32 = 1000;
const IRR_STEP_TOLERANCE: Decimal = dec!(0.000001);
const IRR_MIN_RATE: Rate = dec!(-0.99);
const IRR_MAX_RATE: Rate = dec!(10);

/// Fixed SEC/SPE reserve-valuation rate.
pub(crate) const PV10_RATE: Rate = dec!(0.10);

/// Present value of the schedule's net cash flows at `rate`, end-of-year
/// convention. Asset-level: acquisition cost is not in the sum. Terms whose
/// discount factor leaves Decimal range are dropped; by then they no longer
/// move the total.
pub fn present_value(rows: &[YearlyCashFlow], rate: Rate) -> Money {
    let flows: Vec<Decimal> = rows.iter().map(|r| r.net_cash_flow).collect();
    value_of_flows(&flows, rate)
}

fn value_of_flows(flows: &[Decimal], rate: Rate) -> Decimal {
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;
    let mut total = Decimal::ZERO;
    for cf in flows {
        discount = match discount.checked_mul(one_plus_r) {
            Some(d) if !d.is_zero() => d,
            _ => break,
        };
        let term = match cf.checked_div(discount) {
            Some(t) => t,
            None => break,
        };
        total = match total.checked_add(term) {
            Some(v) => v,
            None => break,
        };
    }
    total
}

/// f(r) = NPV(r) - acquisition_cost and its analytic derivative, summed with
/// one running discount factor instead of per-term powd.
fn root_fn_and_derivative(
    flows: &[Decimal],
    rate: Rate,
    acquisition_cost: Money,
) -> (Decimal, Decimal) {
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;
    let mut f = -acquisition_cost;
    let mut df = Decimal::ZERO;
    for (idx, cf) in flows.iter().enumerate() {
        let t = Decimal::from(idx as u32 + 1);
        discount = match discount.checked_mul(one_plus_r) {
            Some(d) if !d.is_zero() => d,
            _ => break,
        };
        let term = match cf.checked_div(discount) {
            Some(v) => v,
            None => break,
        };
        f = match f.checked_add(term) {
            Some(v) => v,
            None => break,
        };
        let slope_den = match discount.checked_mul(one_plus_r) {
            Some(d) if !d.is_zero() => d,
            _ => break,
        };
        let slope = match (t * cf).checked_div(slope_den) {
            Some(v) => v,
            None => break,
        };
        df = match df.checked_sub(slope) {
            Some(v) => v,
            None => break,
        };
    }
    (f, df)
}

/// NPV of the schedule at an arbitrary rate.
pub fn npv(rows: &[YearlyCashFlow], rate: Rate) -> CalcResult {
    let undiscounted: Decimal = rows.iter().map(|r| r.net_cash_flow).sum();
    let value = present_value(rows, rate);
    CalcResult::defined(
        value,
        "USD",
        "NPV = sum(CF_t / (1+r)^t)",
        &json!({
            "discount_rate": rate.to_string(),
            "schedule_years": rows.len(),
        }),
    )
    .with_workings(vec![
        format!("undiscounted net cash flow {}", undiscounted.round_dp(2)),
        format!("discounted at {} per year, end-of-year convention", rate),
        format!("NPV {}", value.round_dp(2)),
    ])
}

/// NPV at exactly 10%.
pub fn pv10(rows: &[YearlyCashFlow]) -> CalcResult {
    let value = present_value(rows, PV10_RATE);
    CalcResult::defined(
        value,
        "USD",
        "PV10 = sum(CF_t / 1.10^t)",
        &json!({ "schedule_years": rows.len() }),
    )
    .with_workings(vec![format!("PV10 {}", value.round_dp(2))])
}

/// IRR in percentage points: the rate where asset NPV equals the
/// acquisition cost. Newton-Raphson from 20%, clamped to [-99%, 1000%].
/// A root is accepted only when the residual is inside
/// max($1, 0.1% of the acquisition cost).
pub fn irr(rows: &[YearlyCashFlow], acquisition_cost: Money) -> CalcResult {
    let flows: Vec<Decimal> = rows.iter().map(|r| r.net_cash_flow).collect();
    let snapshot = json!({
        "acquisition_cost": acquisition_cost.to_string(),
        "schedule_years": flows.len(),
    });
    let formula = "0 = sum(CF_t / (1+IRR)^t) - acquisition_cost";

    if !flows.iter().any(|cf| *cf > Decimal::ZERO) {
        return CalcResult::undefined(
            "no positive cash flow in the schedule",
            "%",
            formula,
            &snapshot,
        );
    }

    let mut rate = IRR_INITIAL_GUESS;
    let mut converged = false;
    let mut iterations = 0u32;
    for _ in 0..IRR_MAX_ITERATIONS {
        iterations += 1;
        let (f, df) = root_fn_and_derivative(&flows, rate, acquisition_cost);
        if df.is_zero() {
            break;
        }
        let next = (rate - f / df).clamp(IRR_MIN_RATE, IRR_MAX_RATE);
        let delta = (next - rate).abs();
        rate = next;
        if delta < IRR_STEP_TOLERANCE {
            converged = true;
            break;
        }
    }

    let residual = value_of_flows(&flows, rate) - acquisition_cost;
    let tolerance = Decimal::ONE.max(dec!(0.001) * acquisition_cost.abs());
    if residual.abs() >= tolerance {
        return CalcResult::undefined(
            &format!(
                "Newton-Raphson residual {} outside tolerance {} after {} iterations",
                residual.round_dp(2),
                tolerance.round_dp(2),
                iterations
            ),
            "%",
            formula,
            &snapshot,
        );
    }

    let value = rate * dec!(100);
    let result = CalcResult::defined(value, "%", formula, &snapshot).with_workings(vec![
        format!("converged in {} iterations", iterations),
        format!("residual {}", residual.round_dp(2)),
    ]);
    if converged {
        result
    } else {
        result
            .with_confidence(Confidence::Low)
            .with_caveat("iteration budget exhausted; best-effort rate within residual tolerance")
    }
}

/// Years to recover the acquisition cost from undiscounted net cash flow,
/// interpolated inside the crossing year.
pub fn payback_years(rows: &[YearlyCashFlow], acquisition_cost: Money) -> CalcResult {
    let snapshot = json!({ "acquisition_cost": acquisition_cost.to_string() });
    let formula = "cumulative CF crosses zero, seeded at -acquisition_cost";

    if acquisition_cost <= Decimal::ZERO {
        return CalcResult::defined(Decimal::ZERO, "years", formula, &snapshot)
            .with_caveat("no acquisition cost to recover");
    }

    let mut cumulative = -acquisition_cost;
    for row in rows {
        let before = cumulative;
        cumulative += row.net_cash_flow;
        if before < Decimal::ZERO && cumulative >= Decimal::ZERO {
            let fraction = if row.net_cash_flow > Decimal::ZERO {
                -before / row.net_cash_flow
            } else {
                Decimal::ZERO
            };
            let years = Decimal::from(row.year - 1) + fraction;
            return CalcResult::defined(years, "years", formula, &snapshot).with_workings(vec![
                format!("shortfall {} entering year {}", (-before).round_dp(2), row.year),
                format!("year {} net cash flow {}", row.year, row.net_cash_flow.round_dp(2)),
            ]);
        }
    }

    CalcResult::undefined(
        "cumulative cash flow never recovers the acquisition cost",
        "years",
        formula,
        &snapshot,
    )
}

/// Gross multiple on invested equity, undiscounted.
pub fn moic(rows: &[YearlyCashFlow], equity_invested: Money) -> CalcResult {
    let snapshot = json!({ "equity_invested": equity_invested.to_string() });
    let formula = "MOIC = sum(CF) / equity_invested";

    if equity_invested <= Decimal::ZERO {
        return CalcResult::undefined(
            "equity invested is zero or not provided",
            "x",
            formula,
            &snapshot,
        );
    }
    let total: Decimal = rows.iter().map(|r| r.net_cash_flow).sum();
    CalcResult::defined(total / equity_invested, "x", formula, &snapshot).with_workings(vec![
        format!("total undiscounted net cash flow {}", total.round_dp(2)),
    ])
}
