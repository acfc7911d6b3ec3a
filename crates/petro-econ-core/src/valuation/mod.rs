pub mod metrics;
pub mod multiples;
pub mod rbl;

pub use metrics::{irr, moic, npv, payback_years, present_value, pv10};
pub use multiples::ev_multiples;
pub use rbl::rbl_metrics;
