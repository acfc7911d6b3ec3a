use rust_decimal::Decimal;
use serde_json::json;

use crate::inputs::FinancialInputs;
use crate::production::schedule::YearlyCashFlow;
use crate::types::{CalcResult, Money};

/// Transaction multiples with the acquisition cost as enterprise value.
/// Metrics whose optional reserve figure is missing are omitted outright;
/// a present-but-zero denominator yields an undefined result instead.
pub fn ev_multiples(
    inputs: &FinancialInputs,
    rows: &[YearlyCashFlow],
) -> Vec<(String, CalcResult)> {
    let ev = inputs.deal.acquisition_cost;
    let mut out = Vec::new();

    if let Some(reserves) = &inputs.reserves {
        if let Some(p1) = reserves.reserves_1p_boe {
            out.push((
                "EV/1P".to_string(),
                ratio(
                    ev,
                    p1,
                    "USD/boe",
                    "EV / proved reserves",
                    "proved reserves are zero",
                ),
            ));
        }
        if let Some(p2) = reserves.reserves_2p_boe {
            out.push((
                "EV/2P".to_string(),
                ratio(
                    ev,
                    p2,
                    "USD/boe",
                    "EV / proved-plus-probable reserves",
                    "2P reserves are zero",
                ),
            ));
        }
    }

    out.push((
        "EV/Production".to_string(),
        ratio(
            ev,
            inputs.production.initial_rate_boepd,
            "USD/boepd",
            "EV / current production rate",
            "production rate is zero",
        ),
    ));

    let ebitda = rows.first().map(|r| r.ebitda).unwrap_or(Decimal::ZERO);
    out.push((
        "EV/EBITDA".to_string(),
        ratio(
            ev,
            ebitda,
            "x",
            "EV / first-year EBITDA",
            "first-year EBITDA is zero or negative",
        ),
    ));

    out
}

fn ratio(ev: Money, denominator: Decimal, unit: &str, formula: &str, zero_reason: &str) -> CalcResult {
    let snapshot = json!({
        "ev": ev.to_string(),
        "denominator": denominator.to_string(),
    });
    if denominator <= Decimal::ZERO {
        return CalcResult::undefined(zero_reason, unit, formula, &snapshot);
    }
    CalcResult::defined(ev / denominator, unit, formula, &snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::ReserveAssumptions;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn inputs_with_reserves() -> FinancialInputs {
        let json = r#"{
            "deal": {
                "deal_id": "D-7", "deal_name": "multiples", "jurisdiction": "us_gom",
                "deal_type": "shelf", "effective_date": "2025-01-01",
                "acquisition_cost": "50000000", "evaluation_years": 5, "discount_rate_pct": "10"
            },
            "prices": { "oil_price": "60", "gas_price": "3" },
            "production": {
                "initial_rate_boepd": "2000",
                "oil_fraction": "1", "gas_fraction": "0", "ngl_fraction": "0",
                "decline": { "kind": "exponential", "initial_decline_pct": "12" }
            },
            "fiscal": { "royalty_pct": "12.5" },
            "costs": { "loe_per_boe": "12" },
            "capex": {},
            "reserves": { "reserves_1p_boe": "4000000", "reserves_2p_boe": "6250000" }
        }"#;
        serde_json::from_str(json).unwrap()
    }

    fn ebitda_row(ebitda: Decimal) -> YearlyCashFlow {
        YearlyCashFlow {
            year: 1,
            ebitda,
            ..YearlyCashFlow::default()
        }
    }

    #[test]
    fn full_set_with_reserves() {
        let inputs = inputs_with_reserves();
        let rows = vec![ebitda_row(dec!(10_000_000))];
        let out = ev_multiples(&inputs, &rows);
        let keys: Vec<&str> = out.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["EV/1P", "EV/2P", "EV/Production", "EV/EBITDA"]);

        let by_key = |k: &str| out.iter().find(|(key, _)| key == k).unwrap().1.value();
        assert_eq!(by_key("EV/1P"), Some(dec!(12.5)));
        assert_eq!(by_key("EV/2P"), Some(dec!(8)));
        assert_eq!(by_key("EV/Production"), Some(dec!(25000)));
        assert_eq!(by_key("EV/EBITDA"), Some(dec!(5)));
    }

    #[test]
    fn reserve_multiples_omitted_without_reserve_group() {
        let mut inputs = inputs_with_reserves();
        inputs.reserves = None;
        let out = ev_multiples(&inputs, &[ebitda_row(dec!(1))]);
        let keys: Vec<&str> = out.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["EV/Production", "EV/EBITDA"]);
    }

    #[test]
    fn zero_denominator_is_undefined_not_omitted() {
        let mut inputs = inputs_with_reserves();
        inputs.reserves = Some(ReserveAssumptions {
            reserves_1p_boe: Some(Decimal::ZERO),
            reserves_2p_boe: None,
            reserve_additions_boe: None,
        });
        let out = ev_multiples(&inputs, &[ebitda_row(dec!(1))]);
        let ev_1p = &out.iter().find(|(k, _)| k == "EV/1P").unwrap().1;
        assert_eq!(ev_1p.value(), None);
        assert!(ev_1p.error().unwrap().contains("zero"));
    }

    #[test]
    fn negative_ebitda_is_undefined() {
        let inputs = inputs_with_reserves();
        let out = ev_multiples(&inputs, &[ebitda_row(dec!(-500))]);
        let ev_ebitda = &out.iter().find(|(k, _)| k == "EV/EBITDA").unwrap().1;
        assert_eq!(ev_ebitda.value(), None);
    }
}
