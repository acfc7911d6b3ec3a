pub mod benchmarks;
pub mod sensitivity;
pub mod summary;

pub use benchmarks::{validate_summary, FinancialQualityFlag, FlagSeverity};
pub use sensitivity::{tornado, two_way_matrix, SensitivityRow, SensitivityVariable, TwoWayMatrix};
pub use summary::{evaluate, DealEvaluation, FinancialAnalysisSummary};
