use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::production::schedule::YearlyCashFlow;
use crate::types::{rate_from_pct, CalcResult, Confidence, Money, Pct};

/// Statutory PRRT rate on taxable profit.
const PRRT_RATE: Decimal = dec!(0.40);

/// Government share of gross revenue across the whole schedule: royalty,
/// severance and income tax summed over every emitted year.
pub fn government_take(rows: &[YearlyCashFlow]) -> CalcResult {
    let formula = "(royalty + severance + income tax) / gross revenue x 100";
    let gross: Money = rows.iter().map(|r| r.gross_revenue).sum();
    let take: Money = rows
        .iter()
        .map(|r| r.royalty + r.severance + r.income_tax)
        .sum();
    let snapshot = json!({
        "gross_revenue": gross.to_string(),
        "government_share": take.to_string(),
        "years": rows.len(),
    });
    if gross <= Decimal::ZERO {
        return CalcResult::undefined("no gross revenue", "%", formula, &snapshot);
    }
    CalcResult::defined(take / gross * dec!(100), "%", formula, &snapshot)
}

/// Net revenue interest as percentage points: the working interest share
/// left after royalty and overriding royalty burdens.
pub fn net_revenue_interest(wi_pct: Pct, royalty_pct: Pct, orri_pct: Pct) -> CalcResult {
    let formula = "WI x (1 - royalty - ORRI)";
    let snapshot = json!({
        "wi_pct": wi_pct.to_string(),
        "royalty_pct": royalty_pct.to_string(),
        "orri_pct": orri_pct.to_string(),
    });
    if wi_pct <= Decimal::ZERO || wi_pct > dec!(100) {
        return CalcResult::undefined(
            "working interest must be in (0, 100]",
            "%",
            formula,
            &snapshot,
        );
    }
    let burden = Decimal::ONE - rate_from_pct(royalty_pct) - rate_from_pct(orri_pct);
    if burden < Decimal::ZERO {
        return CalcResult::undefined(
            "royalty and overrides exceed the revenue interest",
            "%",
            formula,
            &snapshot,
        );
    }
    CalcResult::defined(wi_pct * burden, "%", formula, &snapshot)
}

/// One evaluation period of a production sharing contract. Cost recovery
/// is capped by the ceiling; anything above it stays unrecovered within
/// this call and is not carried into later periods.
pub fn psc_contractor_cash_flow(
    gross_revenue: Money,
    total_costs: Money,
    cost_recovery_limit_pct: Pct,
    contractor_profit_share_pct: Pct,
) -> CalcResult {
    let formula = "cost oil recovered + contractor profit share - actual costs";
    let snapshot = json!({
        "gross_revenue": gross_revenue.to_string(),
        "total_costs": total_costs.to_string(),
        "cost_recovery_limit_pct": cost_recovery_limit_pct.to_string(),
        "contractor_profit_share_pct": contractor_profit_share_pct.to_string(),
    });
    if gross_revenue < Decimal::ZERO || total_costs < Decimal::ZERO {
        return CalcResult::undefined(
            "revenue and costs cannot be negative",
            "USD",
            formula,
            &snapshot,
        );
    }
    for pts in [cost_recovery_limit_pct, contractor_profit_share_pct] {
        if pts < Decimal::ZERO || pts > dec!(100) {
            return CalcResult::undefined(
                "percentages must be between 0 and 100",
                "USD",
                formula,
                &snapshot,
            );
        }
    }

    let ceiling = gross_revenue * rate_from_pct(cost_recovery_limit_pct);
    let recovered = total_costs.min(ceiling);
    let unrecovered = total_costs - recovered;
    let profit_oil = gross_revenue - recovered;
    let contractor_profit = profit_oil * rate_from_pct(contractor_profit_share_pct);
    let net = recovered + contractor_profit - total_costs;

    let result = CalcResult::defined(net, "USD", formula, &snapshot).with_workings(vec![
        format!("cost oil ceiling {}", ceiling.round_dp(2)),
        format!(
            "cost oil recovered {}, unrecovered {}",
            recovered.round_dp(2),
            unrecovered.round_dp(2)
        ),
        format!(
            "profit oil {}, contractor share {}",
            profit_oil.round_dp(2),
            contractor_profit.round_dp(2)
        ),
    ]);
    if unrecovered > Decimal::ZERO {
        result
            .with_confidence(Confidence::Medium)
            .with_caveat("unrecovered cost oil is not carried into later periods")
    } else {
        result
    }
}

/// One step of an R-factor ladder: government profit share applies while
/// the cumulative revenue/cost ratio sits in [r_from, r_to).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RFactorBand {
    pub r_from: Decimal,
    pub r_to: Decimal,
    pub govt_share_pct: Pct,
}

/// Stair-step lookup of the government share for an observed R-factor.
/// Bands are sorted by `r_from` before matching; the first band containing
/// the value wins. An R-factor outside every band yields a 0% share at
/// LOW confidence rather than an error.
pub fn r_factor_government_share(r_factor: Decimal, bands: &[RFactorBand]) -> CalcResult {
    let formula = "stair-step lookup over [r_from, r_to) bands";
    let snapshot = json!({
        "r_factor": r_factor.to_string(),
        "bands": bands.len(),
    });

    let mut sorted: Vec<&RFactorBand> = bands.iter().collect();
    sorted.sort_by(|a, b| a.r_from.cmp(&b.r_from));

    for band in sorted {
        if r_factor >= band.r_from && r_factor < band.r_to {
            return CalcResult::defined(band.govt_share_pct, "%", formula, &snapshot)
                .with_workings(vec![format!(
                    "R {} falls in [{}, {}) -> {}%",
                    r_factor, band.r_from, band.r_to, band.govt_share_pct
                )]);
        }
    }

    CalcResult::defined(Decimal::ZERO, "%", formula, &snapshot)
        .with_confidence(Confidence::Low)
        .with_caveat("R-factor outside all configured bands; share defaulted to 0%")
}

/// Simplified petroleum resource rent tax: a flat rate on positive net
/// income. The uplift allowance on carried-forward expenditure is not
/// modeled, so the figure overstates the liability in early years.
pub fn prrt(net_income: Money) -> CalcResult {
    let formula = "40% x max(net income, 0)";
    let snapshot = json!({ "net_income": net_income.to_string() });
    let taxable = net_income.max(Decimal::ZERO);
    CalcResult::defined(taxable * PRRT_RATE, "USD", formula, &snapshot)
        .with_confidence(Confidence::Low)
        .with_caveat("uplift allowance on carried-forward expenditure not modeled")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn revenue_row(gross: Decimal, royalty: Decimal, severance: Decimal, tax: Decimal) -> YearlyCashFlow {
        YearlyCashFlow {
            year: 1,
            gross_revenue: gross,
            royalty,
            severance,
            income_tax: tax,
            ..YearlyCashFlow::default()
        }
    }

    #[test]
    fn government_take_zero_when_untaxed() {
        let rows = vec![revenue_row(dec!(1000), Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)];
        assert_eq!(government_take(&rows).value(), Some(Decimal::ZERO));
    }

    #[test]
    fn government_take_sums_components_across_years() {
        let rows = vec![
            revenue_row(dec!(600), dec!(75), dec!(27), dec!(60)),
            revenue_row(dec!(400), dec!(50), dec!(18), dec!(40)),
        ];
        // (125 + 45 + 100) / 1000 = 27%
        assert_eq!(government_take(&rows).value(), Some(dec!(27)));
    }

    #[test]
    fn government_take_undefined_without_revenue() {
        assert_eq!(government_take(&[]).value(), None);
        let rows = vec![revenue_row(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)];
        assert_eq!(government_take(&rows).value(), None);
    }

    #[test]
    fn nri_probes_the_burden_stack() {
        // 75 x (1 - 0.125 - 0.025) = 63.75
        let result = net_revenue_interest(dec!(75), dec!(12.5), dec!(2.5));
        assert_eq!(result.value(), Some(dec!(63.75)));
    }

    #[test]
    fn psc_with_binding_ceiling() {
        // ceiling 500, recovered 500, unrecovered 100
        // profit oil 500, contractor 40% = 200, net = 500 + 200 - 600 = 100
        let result = psc_contractor_cash_flow(dec!(1000), dec!(600), dec!(50), dec!(40));
        assert_eq!(result.value(), Some(dec!(100)));
        assert_eq!(result.confidence, Confidence::Medium);
        assert!(result.caveats[0].contains("unrecovered"));
    }

    #[test]
    fn psc_fully_recovered_is_clean() {
        // recovered 300, profit oil 700, contractor 280, net = 280
        let result = psc_contractor_cash_flow(dec!(1000), dec!(300), dec!(50), dec!(40));
        assert_eq!(result.value(), Some(dec!(280)));
        assert_eq!(result.confidence, Confidence::High);
        assert!(result.caveats.is_empty());
    }

    #[test]
    fn psc_rejects_nonsense_shares() {
        assert_eq!(
            psc_contractor_cash_flow(dec!(1000), dec!(300), dec!(120), dec!(40)).value(),
            None
        );
        assert_eq!(
            psc_contractor_cash_flow(dec!(-1), dec!(300), dec!(50), dec!(40)).value(),
            None
        );
    }

    #[test]
    fn r_factor_picks_containing_band() {
        let bands = vec![
            RFactorBand { r_from: dec!(1.5), r_to: dec!(2.5), govt_share_pct: dec!(60) },
            RFactorBand { r_from: Decimal::ZERO, r_to: dec!(1), govt_share_pct: dec!(80) },
            RFactorBand { r_from: dec!(1), r_to: dec!(1.5), govt_share_pct: dec!(70) },
        ];
        assert_eq!(r_factor_government_share(dec!(1.2), &bands).value(), Some(dec!(70)));
        assert_eq!(r_factor_government_share(dec!(0.5), &bands).value(), Some(dec!(80)));
        // boundary belongs to the upper band
        assert_eq!(r_factor_government_share(dec!(1.5), &bands).value(), Some(dec!(60)));
    }

    #[test]
    fn r_factor_outside_bands_defaults_to_zero_share() {
        let bands = vec![RFactorBand {
            r_from: Decimal::ZERO,
            r_to: dec!(1),
            govt_share_pct: dec!(80),
        }];
        let result = r_factor_government_share(dec!(3), &bands);
        assert_eq!(result.value(), Some(Decimal::ZERO));
        assert_eq!(result.confidence, Confidence::Low);
        assert!(!result.caveats.is_empty());
    }

    #[test]
    fn prrt_taxes_positive_income_only() {
        let result = prrt(dec!(1000));
        assert_eq!(result.value(), Some(dec!(400)));
        assert_eq!(result.confidence, Confidence::Low);

        assert_eq!(prrt(dec!(-500)).value(), Some(Decimal::ZERO));
    }
}
