use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PetroEconError;
use crate::production::decline::DeclineKind;
use crate::types::{rate_from_pct, Money, Pct, Rate};
use crate::PetroEconResult;

// ---------------------------------------------------------------------------
// Input groups
// ---------------------------------------------------------------------------

/// Deal identity and the evaluation frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealTerms {
    pub deal_id: String,
    pub deal_name: String,
    /// Lowercase key, e.g. "us_gom", "ukcs", "norway_offshore".
    pub jurisdiction: String,
    /// Lowercase key, e.g. "deepwater", "shelf", "conventional".
    pub deal_type: String,
    pub effective_date: NaiveDate,
    pub acquisition_cost: Money,
    /// Equity portion of the purchase price; drives MOIC. Zero means
    /// undisclosed and leaves MOIC undefined.
    #[serde(default)]
    pub equity_invested: Money,
    pub evaluation_years: u32,
    pub discount_rate_pct: Pct,
}

/// Flat price deck with optional annual escalation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceAssumptions {
    /// USD/bbl on a WTI basis, before differential.
    pub oil_price: Money,
    /// USD/bbl adjustment to WTI; negative for discounts.
    #[serde(default)]
    pub oil_differential: Money,
    /// USD/mcf at the sales meter.
    pub gas_price: Money,
    /// NGL realizes this share of WTI.
    #[serde(default)]
    pub ngl_price_pct_of_wti: Pct,
    /// Compounds WTI and gas from year 2 onward. Zero keeps the deck flat.
    #[serde(default)]
    pub price_escalation_pct: Pct,
}

/// Decline parameters in boundary (percentage-point) form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclineAssumptions {
    pub kind: DeclineKind,
    /// Annual decline in percentage points (15 = 15%/yr).
    pub initial_decline_pct: Pct,
    /// Arps b exponent; only read for hyperbolic declines.
    #[serde(default)]
    pub b_factor: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionAssumptions {
    pub initial_rate_boepd: Decimal,
    pub oil_fraction: Decimal,
    pub gas_fraction: Decimal,
    pub ngl_fraction: Decimal,
    pub decline: DeclineAssumptions,
    #[serde(default = "default_uptime_pct")]
    pub uptime_pct: Pct,
    /// Oil rate below which the field is shut in. Checked from year 2.
    #[serde(default)]
    pub economic_limit_bopd: Decimal,
}

fn default_uptime_pct() -> Pct {
    dec!(100)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiscalTerms {
    pub royalty_pct: Pct,
    #[serde(default)]
    pub severance_pct: Pct,
    #[serde(default)]
    pub income_tax_pct: Pct,
    #[serde(default = "default_working_interest_pct")]
    pub working_interest_pct: Pct,
    /// Overriding royalty burdens carved out of the working interest.
    #[serde(default)]
    pub orri_pct: Pct,
}

fn default_working_interest_pct() -> Pct {
    dec!(100)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostAssumptions {
    pub loe_per_boe: Money,
    /// Fixed overhead, USD per year.
    #[serde(default)]
    pub gna_per_year: Money,
    #[serde(default)]
    pub workovers_per_boe: Money,
    #[serde(default)]
    pub transport_per_boe: Money,
    /// Compounds all operating costs from year 2 onward.
    #[serde(default)]
    pub cost_escalation_pct: Pct,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapexEntry {
    pub year: u32,
    pub amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapexSchedule {
    #[serde(default)]
    pub development: Vec<CapexEntry>,
    /// ARO settlement. Zero means no abandonment obligation is modeled.
    #[serde(default)]
    pub abandonment_cost: Money,
    /// Year the ARO lands. Absent: appended to the last schedule row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abandonment_year: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveAssumptions {
    /// Proved reserves, boe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserves_1p_boe: Option<Decimal>,
    /// Proved plus probable, boe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserves_2p_boe: Option<Decimal>,
    /// Reserve additions booked over the capex program, boe. Drives F&D.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserve_additions_boe: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RblTerms {
    pub drawn_amount: Money,
    pub advance_rate_pct: Pct,
    pub interest_rate_pct: Pct,
    pub tenor_years: u32,
}

// ---------------------------------------------------------------------------
// FinancialInputs
// ---------------------------------------------------------------------------

/// One immutable evaluation request. Perturbations go through the `with_*`
/// methods, which copy the whole value; the base input is never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialInputs {
    pub deal: DealTerms,
    pub prices: PriceAssumptions,
    pub production: ProductionAssumptions,
    pub fiscal: FiscalTerms,
    pub costs: CostAssumptions,
    pub capex: CapexSchedule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserves: Option<ReserveAssumptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rbl: Option<RblTerms>,
}

impl FinancialInputs {
    /// Fail-fast structural checks. Runs before any computation; nothing
    /// downstream re-validates.
    pub fn validate(&self) -> PetroEconResult<()> {
        let d = &self.deal;
        if d.evaluation_years < 1 || d.evaluation_years > 50 {
            return Err(PetroEconError::invalid(
                "deal.evaluation_years",
                "must be between 1 and 50",
            ));
        }
        if d.acquisition_cost < Decimal::ZERO {
            return Err(PetroEconError::invalid(
                "deal.acquisition_cost",
                "cannot be negative",
            ));
        }
        if d.equity_invested < Decimal::ZERO {
            return Err(PetroEconError::invalid(
                "deal.equity_invested",
                "cannot be negative",
            ));
        }
        if d.discount_rate_pct < Decimal::ZERO || d.discount_rate_pct > dec!(100) {
            return Err(PetroEconError::invalid(
                "deal.discount_rate_pct",
                "must be between 0 and 100 percentage points",
            ));
        }

        let p = &self.production;
        if p.initial_rate_boepd < Decimal::ZERO {
            return Err(PetroEconError::invalid(
                "production.initial_rate_boepd",
                "cannot be negative",
            ));
        }
        for (name, frac) in [
            ("production.oil_fraction", p.oil_fraction),
            ("production.gas_fraction", p.gas_fraction),
            ("production.ngl_fraction", p.ngl_fraction),
        ] {
            if frac < Decimal::ZERO || frac > Decimal::ONE {
                return Err(PetroEconError::invalid(name, "must be between 0 and 1"));
            }
        }
        let frac_sum = p.oil_fraction + p.gas_fraction + p.ngl_fraction;
        if (frac_sum - Decimal::ONE).abs() > dec!(0.01) {
            return Err(PetroEconError::invalid(
                "production.fractions",
                "oil, gas and NGL fractions must sum to 1.0 within 0.01",
            ));
        }
        if p.decline.initial_decline_pct <= Decimal::ZERO
            || p.decline.initial_decline_pct > dec!(100)
        {
            return Err(PetroEconError::invalid(
                "production.decline.initial_decline_pct",
                "must be above 0 and at most 100 percentage points",
            ));
        }
        if p.decline.b_factor < Decimal::ZERO || p.decline.b_factor > dec!(2) {
            return Err(PetroEconError::invalid(
                "production.decline.b_factor",
                "must be between 0 and 2",
            ));
        }
        if p.uptime_pct < Decimal::ZERO || p.uptime_pct > dec!(100) {
            return Err(PetroEconError::invalid(
                "production.uptime_pct",
                "must be between 0 and 100 percentage points",
            ));
        }
        if p.economic_limit_bopd < Decimal::ZERO {
            return Err(PetroEconError::invalid(
                "production.economic_limit_bopd",
                "cannot be negative",
            ));
        }

        let f = &self.fiscal;
        for (name, pts) in [
            ("fiscal.royalty_pct", f.royalty_pct),
            ("fiscal.severance_pct", f.severance_pct),
            ("fiscal.income_tax_pct", f.income_tax_pct),
            ("fiscal.orri_pct", f.orri_pct),
        ] {
            if pts < Decimal::ZERO || pts > dec!(100) {
                return Err(PetroEconError::invalid(
                    name,
                    "must be between 0 and 100 percentage points",
                ));
            }
        }
        if f.working_interest_pct <= Decimal::ZERO || f.working_interest_pct > dec!(100) {
            return Err(PetroEconError::invalid(
                "fiscal.working_interest_pct",
                "must be above 0 and at most 100 percentage points",
            ));
        }

        let c = &self.costs;
        for (name, amount) in [
            ("costs.loe_per_boe", c.loe_per_boe),
            ("costs.gna_per_year", c.gna_per_year),
            ("costs.workovers_per_boe", c.workovers_per_boe),
            ("costs.transport_per_boe", c.transport_per_boe),
        ] {
            if amount < Decimal::ZERO {
                return Err(PetroEconError::invalid(name, "cannot be negative"));
            }
        }

        for entry in &self.capex.development {
            if entry.year < 1 {
                return Err(PetroEconError::invalid(
                    "capex.development.year",
                    "schedule years start at 1",
                ));
            }
            if entry.amount < Decimal::ZERO {
                return Err(PetroEconError::invalid(
                    "capex.development.amount",
                    "cannot be negative",
                ));
            }
        }
        if self.capex.abandonment_cost < Decimal::ZERO {
            return Err(PetroEconError::invalid(
                "capex.abandonment_cost",
                "cannot be negative",
            ));
        }
        if let Some(year) = self.capex.abandonment_year {
            if year < 1 {
                return Err(PetroEconError::invalid(
                    "capex.abandonment_year",
                    "schedule years start at 1",
                ));
            }
        }

        if let Some(rbl) = &self.rbl {
            if rbl.drawn_amount < Decimal::ZERO {
                return Err(PetroEconError::invalid(
                    "rbl.drawn_amount",
                    "cannot be negative",
                ));
            }
            if rbl.advance_rate_pct < Decimal::ZERO || rbl.advance_rate_pct > dec!(100) {
                return Err(PetroEconError::invalid(
                    "rbl.advance_rate_pct",
                    "must be between 0 and 100 percentage points",
                ));
            }
            if rbl.interest_rate_pct < Decimal::ZERO {
                return Err(PetroEconError::invalid(
                    "rbl.interest_rate_pct",
                    "cannot be negative",
                ));
            }
            if rbl.tenor_years < 1 {
                return Err(PetroEconError::invalid(
                    "rbl.tenor_years",
                    "must be at least 1",
                ));
            }
        }

        Ok(())
    }

    /// Base discount rate as a fraction.
    pub fn discount_rate(&self) -> Rate {
        rate_from_pct(self.deal.discount_rate_pct)
    }

    /// WTI plus differential.
    pub fn realized_oil_price(&self) -> Money {
        self.prices.oil_price + self.prices.oil_differential
    }

    pub fn total_development_capex(&self) -> Money {
        self.capex
            .development
            .iter()
            .map(|e| e.amount)
            .sum::<Decimal>()
    }

    // -- copy-with-override -------------------------------------------------

    pub fn with_oil_price(&self, oil_price: Money) -> Self {
        let mut next = self.clone();
        next.prices.oil_price = oil_price;
        next
    }

    pub fn with_initial_rate(&self, initial_rate_boepd: Decimal) -> Self {
        let mut next = self.clone();
        next.production.initial_rate_boepd = initial_rate_boepd;
        next
    }

    pub fn with_decline_rate_pct(&self, initial_decline_pct: Pct) -> Self {
        let mut next = self.clone();
        next.production.decline.initial_decline_pct = initial_decline_pct;
        next
    }

    pub fn with_loe_per_boe(&self, loe_per_boe: Money) -> Self {
        let mut next = self.clone();
        next.costs.loe_per_boe = loe_per_boe;
        next
    }

    /// Scales every development capex entry by the same factor.
    pub fn with_development_capex_scaled(&self, factor: Decimal) -> Self {
        let mut next = self.clone();
        for entry in &mut next.capex.development {
            entry.amount *= factor;
        }
        next
    }

    pub fn with_discount_rate_pct(&self, discount_rate_pct: Pct) -> Self {
        let mut next = self.clone();
        next.deal.discount_rate_pct = discount_rate_pct;
        next
    }

    pub fn with_abandonment_cost(&self, abandonment_cost: Money) -> Self {
        let mut next = self.clone();
        next.capex.abandonment_cost = abandonment_cost;
        next
    }
}
