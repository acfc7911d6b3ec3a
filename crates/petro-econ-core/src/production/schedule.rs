use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::inputs::FinancialInputs;
use crate::production::decline::DeclineCurve;
use crate::types::{rate_from_pct, Money, DAYS_PER_YEAR, MCF_PER_BOE};
use crate::PetroEconResult;

/// One schedule year. All volumes are annual, all money is USD, and the
/// rates are uptime-adjusted averages for the year.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YearlyCashFlow {
    pub year: u32,
    pub avg_boepd: Decimal,
    pub avg_oil_bopd: Decimal,
    pub oil_volume_bbl: Decimal,
    pub gas_volume_mcf: Decimal,
    pub ngl_volume_bbl: Decimal,
    pub boe_volume: Decimal,
    pub oil_revenue: Money,
    pub gas_revenue: Money,
    pub ngl_revenue: Money,
    pub gross_revenue: Money,
    pub royalty: Money,
    pub severance: Money,
    pub net_revenue: Money,
    pub loe: Money,
    pub gna: Money,
    pub workovers: Money,
    pub transport: Money,
    pub total_opex: Money,
    pub ebitda: Money,
    pub development_capex: Money,
    pub abandonment: Money,
    pub income_tax: Money,
    pub net_cash_flow: Money,
    pub discounted_cash_flow: Money,
}

/// Builds the annual schedule for years 1..=evaluation_years. Emission
/// stops early once the uptime-adjusted average oil rate falls below the
/// economic limit; year 1 is always emitted regardless. An abandonment cost
/// without a scheduled year (or scheduled past the last emitted row) lands
/// on the final row after the loop, adjusting capex, net cash flow and
/// discounted cash flow only.
pub fn build_schedule(inputs: &FinancialInputs) -> PetroEconResult<Vec<YearlyCashFlow>> {
    inputs.validate()?;

    let curve = DeclineCurve::from_assumptions(
        inputs.production.initial_rate_boepd,
        &inputs.production.decline,
    );
    let uptime = rate_from_pct(inputs.production.uptime_pct);
    let oil_frac = inputs.production.oil_fraction;
    let gas_frac = inputs.production.gas_fraction;
    let ngl_frac = inputs.production.ngl_fraction;

    let royalty_frac = rate_from_pct(inputs.fiscal.royalty_pct);
    let severance_frac = rate_from_pct(inputs.fiscal.severance_pct);
    let tax_frac = rate_from_pct(inputs.fiscal.income_tax_pct);
    let ngl_pct_of_wti = rate_from_pct(inputs.prices.ngl_price_pct_of_wti);

    let price_growth = Decimal::ONE + rate_from_pct(inputs.prices.price_escalation_pct);
    let cost_growth = Decimal::ONE + rate_from_pct(inputs.costs.cost_escalation_pct);
    let one_plus_r = Decimal::ONE + inputs.discount_rate();

    // ── Phase 1: year rows ───────────────────────────────────────────

    let mut rows: Vec<YearlyCashFlow> =
        Vec::with_capacity(inputs.deal.evaluation_years as usize);
    let mut current_wti = inputs.prices.oil_price;
    let mut current_gas = inputs.prices.gas_price;
    let mut cost_factor = Decimal::ONE;
    let mut discount = Decimal::ONE;
    let mut abandonment_applied = false;

    for year in 1..=inputs.deal.evaluation_years {
        if year > 1 {
            current_wti *= price_growth;
            current_gas *= price_growth;
            cost_factor *= cost_growth;
        }

        let avg_boepd = curve.year_average(year) * uptime;
        let avg_oil_bopd = avg_boepd * oil_frac;

        // Year 1 is always emitted: one year of economics even when the
        // field arrives below its limit.
        if year >= 2 && avg_oil_bopd < inputs.production.economic_limit_bopd {
            break;
        }
        discount *= one_plus_r;

        let boe_volume = avg_boepd * DAYS_PER_YEAR;
        let oil_volume_bbl = boe_volume * oil_frac;
        let gas_volume_mcf = boe_volume * gas_frac * MCF_PER_BOE;
        let ngl_volume_bbl = boe_volume * ngl_frac;

        let oil_price = current_wti + inputs.prices.oil_differential;
        let ngl_price = current_wti * ngl_pct_of_wti;

        let oil_revenue = oil_volume_bbl * oil_price;
        let gas_revenue = gas_volume_mcf * current_gas;
        let ngl_revenue = ngl_volume_bbl * ngl_price;
        let gross_revenue = oil_revenue + gas_revenue + ngl_revenue;

        let royalty = gross_revenue * royalty_frac;
        let severance = gross_revenue * severance_frac;
        let net_revenue = gross_revenue - royalty - severance;

        let loe = boe_volume * inputs.costs.loe_per_boe * cost_factor;
        let gna = inputs.costs.gna_per_year * cost_factor;
        let workovers = boe_volume * inputs.costs.workovers_per_boe * cost_factor;
        let transport = boe_volume * inputs.costs.transport_per_boe * cost_factor;
        let total_opex = loe + gna + workovers + transport;

        let ebitda = net_revenue - total_opex;

        let development_capex: Money = inputs
            .capex
            .development
            .iter()
            .filter(|e| e.year == year)
            .map(|e| e.amount)
            .sum();
        let abandonment = match inputs.capex.abandonment_year {
            Some(scheduled) if scheduled == year => {
                abandonment_applied = true;
                inputs.capex.abandonment_cost
            }
            _ => Decimal::ZERO,
        };
        let total_capex = development_capex + abandonment;

        let taxable = net_revenue - total_opex - total_capex;
        let income_tax = if taxable > Decimal::ZERO {
            taxable * tax_frac
        } else {
            Decimal::ZERO
        };

        let net_cash_flow = net_revenue - total_opex - total_capex - income_tax;
        let discounted_cash_flow = net_cash_flow / discount;

        rows.push(YearlyCashFlow {
            year,
            avg_boepd,
            avg_oil_bopd,
            oil_volume_bbl,
            gas_volume_mcf,
            ngl_volume_bbl,
            boe_volume,
            oil_revenue,
            gas_revenue,
            ngl_revenue,
            gross_revenue,
            royalty,
            severance,
            net_revenue,
            loe,
            gna,
            workovers,
            transport,
            total_opex,
            ebitda,
            development_capex,
            abandonment,
            income_tax,
            net_cash_flow,
            discounted_cash_flow,
        });
    }

    // ── Phase 2: trailing abandonment ────────────────────────────────
    // No scheduled year, or the schedule stopped before reaching it: the
    // obligation still lands on the last row. Tax stays as computed.

    if inputs.capex.abandonment_cost > Decimal::ZERO && !abandonment_applied {
        if let Some(last) = rows.last_mut() {
            last.abandonment += inputs.capex.abandonment_cost;
            last.net_cash_flow -= inputs.capex.abandonment_cost;
            last.discounted_cash_flow = last.net_cash_flow / discount;
        }
    }

    Ok(rows)
}
