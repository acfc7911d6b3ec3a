use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PetroEconError;
use crate::inputs::FinancialInputs;
use crate::production::schedule::build_schedule;
use crate::types::Money;
use crate::valuation::metrics::present_value;
use crate::PetroEconResult;

const TORNADO_FACTORS: [Decimal; 4] = [dec!(-0.20), dec!(-0.10), dec!(0.10), dec!(0.20)];
const MATRIX_FACTORS: [Decimal; 5] = [dec!(-0.20), dec!(-0.10), dec!(0), dec!(0.10), dec!(0.20)];

/// The fixed set of inputs the tornado sweeps. Closed so that every
/// variable has an override path on FinancialInputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityVariable {
    OilPrice,
    InitialRate,
    DeclineRate,
    Loe,
    DevelopmentCapex,
    DiscountRate,
    AbandonmentCost,
}

impl SensitivityVariable {
    pub const ALL: [SensitivityVariable; 7] = [
        SensitivityVariable::OilPrice,
        SensitivityVariable::InitialRate,
        SensitivityVariable::DeclineRate,
        SensitivityVariable::Loe,
        SensitivityVariable::DevelopmentCapex,
        SensitivityVariable::DiscountRate,
        SensitivityVariable::AbandonmentCost,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SensitivityVariable::OilPrice => "Oil Price",
            SensitivityVariable::InitialRate => "Initial Production Rate",
            SensitivityVariable::DeclineRate => "Decline Rate",
            SensitivityVariable::Loe => "LOE",
            SensitivityVariable::DevelopmentCapex => "Development Capex",
            SensitivityVariable::DiscountRate => "Discount Rate",
            SensitivityVariable::AbandonmentCost => "Abandonment Cost",
        }
    }

    pub fn base_value(&self, inputs: &FinancialInputs) -> Decimal {
        match self {
            SensitivityVariable::OilPrice => inputs.prices.oil_price,
            SensitivityVariable::InitialRate => inputs.production.initial_rate_boepd,
            SensitivityVariable::DeclineRate => inputs.production.decline.initial_decline_pct,
            SensitivityVariable::Loe => inputs.costs.loe_per_boe,
            SensitivityVariable::DevelopmentCapex => inputs.total_development_capex(),
            SensitivityVariable::DiscountRate => inputs.deal.discount_rate_pct,
            SensitivityVariable::AbandonmentCost => inputs.capex.abandonment_cost,
        }
    }

    /// A structural copy of the inputs with this one variable scaled by
    /// (1 + factor). The base is never touched.
    fn applied(&self, inputs: &FinancialInputs, factor: Decimal) -> FinancialInputs {
        let scale = Decimal::ONE + factor;
        match self {
            SensitivityVariable::OilPrice => {
                inputs.with_oil_price(inputs.prices.oil_price * scale)
            }
            SensitivityVariable::InitialRate => {
                inputs.with_initial_rate(inputs.production.initial_rate_boepd * scale)
            }
            SensitivityVariable::DeclineRate => inputs
                .with_decline_rate_pct(inputs.production.decline.initial_decline_pct * scale),
            SensitivityVariable::Loe => inputs.with_loe_per_boe(inputs.costs.loe_per_boe * scale),
            SensitivityVariable::DevelopmentCapex => inputs.with_development_capex_scaled(scale),
            SensitivityVariable::DiscountRate => {
                inputs.with_discount_rate_pct(inputs.deal.discount_rate_pct * scale)
            }
            SensitivityVariable::AbandonmentCost => {
                inputs.with_abandonment_cost(inputs.capex.abandonment_cost * scale)
            }
        }
    }
}

/// One tornado bar: the four perturbed NPVs around the base case and the
/// swing used for ranking. A perturbation that fails input validation
/// leaves its slot empty rather than failing the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityRow {
    pub variable: SensitivityVariable,
    pub label: String,
    pub base_value: Decimal,
    pub base_npv: Money,
    pub npv_minus_20: Option<Money>,
    pub npv_minus_10: Option<Money>,
    pub npv_plus_10: Option<Money>,
    pub npv_plus_20: Option<Money>,
    /// max - min across the populated slots; zero when nothing moved.
    pub swing: Decimal,
}

/// Two-way NPV grid over both variables' perturbation factors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwoWayMatrix {
    pub variable_1: SensitivityVariable,
    pub variable_2: SensitivityVariable,
    pub variable_1_values: Vec<Decimal>,
    pub variable_2_values: Vec<Decimal>,
    /// matrix[i][j] = NPV when variable_1 = variable_1_values[i],
    /// variable_2 = variable_2_values[j]; None where the perturbed input
    /// fails validation.
    pub matrix: Vec<Vec<Option<Money>>>,
    pub base_case_value: Money,
    pub base_case_position: (usize, usize),
}

fn npv_of(inputs: &FinancialInputs) -> PetroEconResult<Money> {
    let rows = build_schedule(inputs)?;
    Ok(present_value(&rows, inputs.discount_rate()))
}

/// One-way tornado over the full variable set, sorted by descending swing.
/// NPV is asset-level at the perturbed input's own discount rate, so the
/// discount-rate bar reflects its perturbation like every other variable.
pub fn tornado(inputs: &FinancialInputs) -> PetroEconResult<Vec<SensitivityRow>> {
    let base_npv = npv_of(inputs)?;

    let mut rows = Vec::with_capacity(SensitivityVariable::ALL.len());
    for variable in SensitivityVariable::ALL {
        let npv_at = |factor: Decimal| npv_of(&variable.applied(inputs, factor)).ok();
        let npv_minus_20 = npv_at(TORNADO_FACTORS[0]);
        let npv_minus_10 = npv_at(TORNADO_FACTORS[1]);
        let npv_plus_10 = npv_at(TORNADO_FACTORS[2]);
        let npv_plus_20 = npv_at(TORNADO_FACTORS[3]);

        let populated: Vec<Decimal> = [npv_minus_20, npv_minus_10, npv_plus_10, npv_plus_20]
            .iter()
            .flatten()
            .copied()
            .collect();
        let swing = match (populated.iter().max(), populated.iter().min()) {
            (Some(max), Some(min)) => *max - *min,
            _ => Decimal::ZERO,
        };

        rows.push(SensitivityRow {
            variable,
            label: variable.label().to_string(),
            base_value: variable.base_value(inputs),
            base_npv,
            npv_minus_20,
            npv_minus_10,
            npv_plus_10,
            npv_plus_20,
            swing,
        });
    }

    rows.sort_by(|a, b| b.swing.cmp(&a.swing));
    Ok(rows)
}

/// Full NPV matrix over the Cartesian product of two variables'
/// perturbation grids, base case included on both axes.
pub fn two_way_matrix(
    inputs: &FinancialInputs,
    variable_1: SensitivityVariable,
    variable_2: SensitivityVariable,
) -> PetroEconResult<TwoWayMatrix> {
    if variable_1 == variable_2 {
        return Err(PetroEconError::invalid(
            "sensitivity.variables",
            "the two axes must be different variables",
        ));
    }
    let base_case_value = npv_of(inputs)?;

    let axis_values = |variable: SensitivityVariable| -> Vec<Decimal> {
        MATRIX_FACTORS
            .iter()
            .map(|f| variable.base_value(inputs) * (Decimal::ONE + *f))
            .collect()
    };

    let mut matrix = Vec::with_capacity(MATRIX_FACTORS.len());
    for f1 in MATRIX_FACTORS {
        let outer = variable_1.applied(inputs, f1);
        let mut row = Vec::with_capacity(MATRIX_FACTORS.len());
        for f2 in MATRIX_FACTORS {
            row.push(npv_of(&variable_2.applied(&outer, f2)).ok());
        }
        matrix.push(row);
    }

    Ok(TwoWayMatrix {
        variable_1,
        variable_2,
        variable_1_values: axis_values(variable_1),
        variable_2_values: axis_values(variable_2),
        matrix,
        base_case_value,
        // factor 0 sits at the center of the five-point grid
        base_case_position: (2, 2),
    })
}
