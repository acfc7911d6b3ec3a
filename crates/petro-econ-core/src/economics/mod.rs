//! Unit economics: per-boe cost metrics, breakeven prices and
//! reserve-denominated ratios.

pub mod costs;
pub mod reserves;

pub use costs::{
    cash_breakeven, fd_cost, full_cycle_breakeven, lifting_cost, netback, recycle_ratio,
};
pub use reserves::{
    back_calculated_decline, eur, gas_oil_ratio, nri_production, reserve_replacement_ratio,
    water_cut, wi_production,
};
