use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::analysis::benchmarks::{self, FinancialQualityFlag, FlagSeverity};
use crate::analysis::sensitivity::{self, SensitivityRow};
use crate::economics::{costs, reserves};
use crate::fiscal::regimes;
use crate::inputs::FinancialInputs;
use crate::production::schedule::{build_schedule, YearlyCashFlow};
use crate::types::MetricMap;
use crate::valuation::{metrics, multiples, rbl};
use crate::PetroEconResult;

/// Headline rollup of one evaluation. This is the shape downstream
/// registries and report renderers consume; every field is a plain value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialAnalysisSummary {
    pub deal_id: String,
    pub deal_name: String,
    pub jurisdiction: String,
    pub evaluation_years_requested: u32,
    /// Emitted schedule length; shorter than requested when the economic
    /// limit cuts the field off.
    pub schedule_years: u32,
    pub npv: Option<Decimal>,
    pub pv10: Option<Decimal>,
    pub irr_pct: Option<Decimal>,
    pub payback_years: Option<Decimal>,
    pub moic: Option<Decimal>,
    pub lifting_cost_per_boe: Option<Decimal>,
    pub netback_per_boe: Option<Decimal>,
    pub cash_breakeven: Option<Decimal>,
    pub full_cycle_breakeven: Option<Decimal>,
    pub government_take_pct: Option<Decimal>,
    pub eur_boe: Option<Decimal>,
    pub ev_per_2p: Option<Decimal>,
    pub borrowing_base: Option<Decimal>,
    pub critical_flags: u32,
    pub warning_flags: u32,
    pub info_flags: u32,
}

/// Everything one evaluation produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealEvaluation {
    pub schedule: Vec<YearlyCashFlow>,
    pub metrics: MetricMap,
    pub summary: FinancialAnalysisSummary,
    pub sensitivity: Vec<SensitivityRow>,
    pub flags: Vec<FinancialQualityFlag>,
}

/// Runs the whole pipeline on one validated input: schedule, metric map,
/// headline summary, benchmark flags and the tornado. Metrics whose
/// optional input group is missing are left out of the map entirely.
pub fn evaluate(inputs: &FinancialInputs) -> PetroEconResult<DealEvaluation> {
    let schedule = build_schedule(inputs)?;

    // ── Phase 1: metric map ──
    let mut metric_map = MetricMap::new();
    metric_map.insert(
        "NPV".to_string(),
        metrics::npv(&schedule, inputs.discount_rate()),
    );
    metric_map.insert("PV10".to_string(), metrics::pv10(&schedule));
    metric_map.insert(
        "IRR".to_string(),
        metrics::irr(&schedule, inputs.deal.acquisition_cost),
    );
    metric_map.insert(
        "Payback Period".to_string(),
        metrics::payback_years(&schedule, inputs.deal.acquisition_cost),
    );
    metric_map.insert(
        "MOIC".to_string(),
        metrics::moic(&schedule, inputs.deal.equity_invested),
    );
    metric_map.insert("Lifting Cost".to_string(), costs::lifting_cost(&schedule));
    metric_map.insert("Netback".to_string(), costs::netback(inputs));
    metric_map.insert(
        "Cash Breakeven Oil Price".to_string(),
        costs::cash_breakeven(inputs),
    );
    metric_map.insert(
        "Full-Cycle Breakeven Oil Price".to_string(),
        costs::full_cycle_breakeven(inputs)?,
    );
    metric_map.insert("EUR".to_string(), reserves::eur(inputs));
    metric_map.insert(
        "Government Take".to_string(),
        regimes::government_take(&schedule),
    );
    for (key, result) in multiples::ev_multiples(inputs, &schedule) {
        metric_map.insert(key, result);
    }
    if let Some(fd) = costs::fd_cost(inputs) {
        metric_map.insert("F&D Cost".to_string(), fd);
    }
    if let Some(recycle) = costs::recycle_ratio(inputs) {
        metric_map.insert("Recycle Ratio".to_string(), recycle);
    }
    for (key, result) in rbl::rbl_metrics(inputs, &schedule) {
        metric_map.insert(key, result);
    }

    // ── Phase 2: headline summary, then flags over it ──
    let mut summary = summarize(inputs, &schedule, &metric_map);
    let flags = benchmarks::validate_summary(&summary);
    summary.critical_flags = count(&flags, FlagSeverity::Critical);
    summary.warning_flags = count(&flags, FlagSeverity::Warning);
    summary.info_flags = count(&flags, FlagSeverity::Info);

    // ── Phase 3: tornado ──
    let sensitivity = sensitivity::tornado(inputs)?;

    Ok(DealEvaluation {
        schedule,
        metrics: metric_map,
        summary,
        sensitivity,
        flags,
    })
}

fn metric_value(metric_map: &MetricMap, key: &str) -> Option<Decimal> {
    metric_map.get(key).and_then(|m| m.value())
}

fn summarize(
    inputs: &FinancialInputs,
    schedule: &[YearlyCashFlow],
    metric_map: &MetricMap,
) -> FinancialAnalysisSummary {
    FinancialAnalysisSummary {
        deal_id: inputs.deal.deal_id.clone(),
        deal_name: inputs.deal.deal_name.clone(),
        jurisdiction: inputs.deal.jurisdiction.clone(),
        evaluation_years_requested: inputs.deal.evaluation_years,
        schedule_years: schedule.len() as u32,
        npv: metric_value(metric_map, "NPV"),
        pv10: metric_value(metric_map, "PV10"),
        irr_pct: metric_value(metric_map, "IRR"),
        payback_years: metric_value(metric_map, "Payback Period"),
        moic: metric_value(metric_map, "MOIC"),
        lifting_cost_per_boe: metric_value(metric_map, "Lifting Cost"),
        netback_per_boe: metric_value(metric_map, "Netback"),
        cash_breakeven: metric_value(metric_map, "Cash Breakeven Oil Price"),
        full_cycle_breakeven: metric_value(metric_map, "Full-Cycle Breakeven Oil Price"),
        government_take_pct: metric_value(metric_map, "Government Take"),
        eur_boe: metric_value(metric_map, "EUR"),
        ev_per_2p: metric_value(metric_map, "EV/2P"),
        borrowing_base: metric_value(metric_map, "Borrowing Base"),
        critical_flags: 0,
        warning_flags: 0,
        info_flags: 0,
    }
}

fn count(flags: &[FinancialQualityFlag], severity: FlagSeverity) -> u32 {
    flags.iter().filter(|f| f.severity == severity).count() as u32
}
