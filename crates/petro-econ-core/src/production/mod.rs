pub mod decline;
pub mod schedule;

pub use decline::{DeclineCurve, DeclineKind};
pub use schedule::{build_schedule, YearlyCashFlow};
