//! Fiscal regime mechanics: concessionary take, production-sharing
//! splits, R-factor ladders, PRRT and jurisdiction default profiles.

pub mod profiles;
pub mod regimes;

pub use profiles::{get_fiscal_profile, FiscalProfile};
pub use regimes::{
    government_take, net_revenue_interest, prrt, psc_contractor_cash_flow,
    r_factor_government_share, RFactorBand,
};
