use rust_decimal::Decimal;
use serde_json::json;

use crate::inputs::FinancialInputs;
use crate::production::schedule::YearlyCashFlow;
use crate::types::{rate_from_pct, CalcResult};
use crate::valuation::metrics::PV10_RATE;

/// Reserve-based lending view of the schedule: borrowing base, minimum
/// DSCR against a level-principal amortization, and loan-life coverage.
/// Returns nothing when no facility is described.
pub fn rbl_metrics(
    inputs: &FinancialInputs,
    rows: &[YearlyCashFlow],
) -> Vec<(String, CalcResult)> {
    let Some(rbl) = &inputs.rbl else {
        return Vec::new();
    };

    let service_years = (rbl.tenor_years as usize).min(rows.len());
    let snapshot = json!({
        "drawn_amount": rbl.drawn_amount.to_string(),
        "advance_rate_pct": rbl.advance_rate_pct.to_string(),
        "interest_rate_pct": rbl.interest_rate_pct.to_string(),
        "tenor_years": rbl.tenor_years,
        "schedule_years": rows.len(),
    });
    let truncated = service_years < rbl.tenor_years as usize;
    let truncation_note = format!(
        "schedule ends after year {}; facility tenor runs to year {}",
        rows.len(),
        rbl.tenor_years
    );

    let mut out = Vec::new();

    // Borrowing base: lender PV of the asset, haircut by the advance rate.
    let pv = super::metrics::present_value(&rows[..service_years], PV10_RATE);
    let advance = rate_from_pct(rbl.advance_rate_pct);
    let mut base = CalcResult::defined(
        advance * pv,
        "USD",
        "advance rate x PV10(net cash flow over facility tenor)",
        &snapshot,
    )
    .with_workings(vec![
        format!(
            "PV10 of net cash flow, years 1-{}: {}",
            service_years,
            pv.round_dp(2)
        ),
        format!(
            "advance rate {}% -> borrowing base {}",
            rbl.advance_rate_pct,
            (advance * pv).round_dp(2)
        ),
    ]);
    if truncated {
        base = base.with_caveat(&truncation_note);
    }
    out.push(("Borrowing Base".to_string(), base));

    // Level principal with interest on the outstanding balance.
    let interest_rate = rate_from_pct(rbl.interest_rate_pct);
    let min_dscr = if rbl.drawn_amount <= Decimal::ZERO {
        CalcResult::undefined(
            "facility is undrawn",
            "x",
            "min over tenor of net cash flow / (principal + interest)",
            &snapshot,
        )
    } else {
        let principal = rbl.drawn_amount / Decimal::from(rbl.tenor_years.max(1));
        let mut dscr_values: Vec<Decimal> = Vec::new();
        let mut workings = Vec::new();
        for (idx, row) in rows.iter().take(service_years).enumerate() {
            let outstanding = rbl.drawn_amount - principal * Decimal::from(idx as u32);
            let service = principal + outstanding * interest_rate;
            let dscr = row.net_cash_flow / service;
            workings.push(format!(
                "year {}: net cash flow {} / debt service {} = {}",
                row.year,
                row.net_cash_flow.round_dp(2),
                service.round_dp(2),
                dscr.round_dp(4)
            ));
            dscr_values.push(dscr);
        }
        match dscr_values.iter().copied().min() {
            Some(min) => {
                let mut result = CalcResult::defined(
                    min,
                    "x",
                    "min over tenor of net cash flow / (principal + interest)",
                    &snapshot,
                )
                .with_workings(workings);
                if truncated {
                    result = result.with_caveat(&truncation_note);
                }
                result
            }
            None => CalcResult::undefined(
                "no schedule years overlap the facility tenor",
                "x",
                "min over tenor of net cash flow / (principal + interest)",
                &snapshot,
            ),
        }
    };
    out.push(("Min DSCR".to_string(), min_dscr));

    let llcr = if rbl.drawn_amount <= Decimal::ZERO {
        CalcResult::undefined(
            "facility is undrawn",
            "x",
            "PV(net cash flow over tenor, at facility rate) / drawn amount",
            &snapshot,
        )
    } else {
        let loan_pv = super::metrics::present_value(&rows[..service_years], interest_rate);
        let mut result = CalcResult::defined(
            loan_pv / rbl.drawn_amount,
            "x",
            "PV(net cash flow over tenor, at facility rate) / drawn amount",
            &snapshot,
        )
        .with_workings(vec![format!(
            "PV of net cash flow at {}% over years 1-{}: {}",
            rbl.interest_rate_pct,
            service_years,
            loan_pv.round_dp(2)
        )]);
        if truncated {
            result = result.with_caveat(&truncation_note);
        }
        result
    };
    out.push(("LLCR".to_string(), llcr));

    out
}
