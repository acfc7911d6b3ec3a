use petro_econ_core::analysis::{evaluate, FlagSeverity};
use petro_econ_core::inputs::FinancialInputs;
use petro_econ_core::production::schedule::build_schedule;
use petro_econ_core::valuation::metrics;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// $32M for 1,000 boepd of 100% oil declining 15%/yr exponentially,
/// $60 flat deck, 12.5% royalty, $10/boe LOE, 10% discount, 5 years.
fn base_deal() -> FinancialInputs {
    let json = r#"{
        "deal": {
            "deal_id": "ACQ-2025-001", "deal_name": "Eagle Draw bolt-on",
            "jurisdiction": "us_onshore", "deal_type": "conventional",
            "effective_date": "2025-01-01",
            "acquisition_cost": "32000000", "equity_invested": "32000000",
            "evaluation_years": 5, "discount_rate_pct": "10"
        },
        "prices": { "oil_price": "60", "gas_price": "3" },
        "production": {
            "initial_rate_boepd": "1000",
            "oil_fraction": "1", "gas_fraction": "0", "ngl_fraction": "0",
            "decline": { "kind": "exponential", "initial_decline_pct": "15" }
        },
        "fiscal": { "royalty_pct": "12.5" },
        "costs": { "loe_per_boe": "10" },
        "capex": {}
    }"#;
    serde_json::from_str(json).unwrap()
}

// ===========================================================================
// Base acquisition scenario
// ===========================================================================

#[test]
fn test_base_scenario_positive_economics() {
    // Year-1 volume = (1000 + 1000e^-0.15)/2 * 365.25 = 339,812 bbl,
    // netback = 60*0.875 - 10 = 42.50/bbl, so year-1 NCF = $14.44M and
    // PV10 ~ $42.65M against a $32M price. IRR lands near 24%.
    let result = evaluate(&base_deal()).unwrap();

    let pv10 = result.summary.pv10.unwrap();
    assert!(pv10 > Decimal::ZERO, "expected positive PV10, got {pv10}");
    assert!(
        (pv10 - dec!(42_651_000)).abs() < dec!(50_000),
        "expected PV10 ~42.65M, got {pv10}"
    );

    let irr = result.summary.irr_pct.unwrap();
    assert!(irr > Decimal::ZERO, "expected positive IRR, got {irr}");
    assert!(
        irr > dec!(20) && irr < dec!(27),
        "expected IRR near 24%, got {irr}"
    );

    let years = result.schedule.len();
    assert!((1..=5).contains(&years), "schedule length {years}");
}

#[test]
fn test_base_scenario_schedule_shape() {
    let result = evaluate(&base_deal()).unwrap();
    assert_eq!(result.schedule.len(), 5);
    for (idx, row) in result.schedule.iter().enumerate() {
        assert_eq!(row.year, idx as u32 + 1);
        assert!(row.net_cash_flow > Decimal::ZERO, "year {} NCF", row.year);
    }
    // 15%/yr decline shows up as strictly falling revenue.
    for pair in result.schedule.windows(2) {
        assert!(pair[1].gross_revenue < pair[0].gross_revenue);
    }
}

#[test]
fn test_base_scenario_has_no_quality_flags() {
    // Every benchmark clears: IRR ~24% sits between the 15% hurdle and the
    // 25% info line, breakevens are far below the deck, LOE is cheap.
    let result = evaluate(&base_deal()).unwrap();
    assert!(
        result.flags.is_empty(),
        "expected a clean deal, got {:?}",
        result.flags
    );
    assert_eq!(result.summary.critical_flags, 0);
    assert_eq!(result.summary.warning_flags, 0);
    assert_eq!(result.summary.info_flags, 0);
}

#[test]
fn test_high_loe_strictly_degrades_pv10_and_irr() {
    let base = evaluate(&base_deal()).unwrap();
    let stressed = evaluate(&base_deal().with_loe_per_boe(dec!(50))).unwrap();

    // Netback collapses from 42.50 to 2.50/bbl.
    let base_pv10 = base.summary.pv10.unwrap();
    let stressed_pv10 = stressed.summary.pv10.unwrap();
    assert!(
        stressed_pv10 < base_pv10,
        "PV10 should fall: {stressed_pv10} vs {base_pv10}"
    );

    let base_irr = base.summary.irr_pct.unwrap();
    let stressed_irr = stressed.summary.irr_pct.unwrap();
    assert!(
        stressed_irr < base_irr,
        "IRR should fall: {stressed_irr} vs {base_irr}"
    );
    assert!(stressed_irr < Decimal::ZERO, "a $3.2M stream against $32M");
}

#[test]
fn test_high_loe_deal_is_flagged() {
    // At $50/boe LOE: IRR ~ -49% (critical), lifting cost 50 > 25 (critical),
    // full-cycle breakeven ~93.6 > 80 (critical), cash breakeven 57.14
    // (warning) and netback 2.50 (warning). Payback never happens, so that
    // metric is absent and raises nothing.
    let result = evaluate(&base_deal().with_loe_per_boe(dec!(50))).unwrap();

    assert_eq!(result.summary.critical_flags, 3, "{:?}", result.flags);
    assert_eq!(result.summary.warning_flags, 2, "{:?}", result.flags);
    assert_eq!(result.summary.payback_years, None);

    assert!(result
        .flags
        .iter()
        .any(|f| f.metric == "IRR" && f.severity == FlagSeverity::Critical));
    // Sorted critical-first.
    for pair in result.flags.windows(2) {
        assert!(pair[0].severity <= pair[1].severity);
    }
}

// ===========================================================================
// Valuation identities on the emitted schedule
// ===========================================================================

#[test]
fn test_npv_at_zero_discount_equals_undiscounted_sum() {
    let schedule = build_schedule(&base_deal()).unwrap();
    let undiscounted: Decimal = schedule.iter().map(|r| r.net_cash_flow).sum();
    let npv = metrics::npv(&schedule, Decimal::ZERO).value().unwrap();
    assert!(
        (npv - undiscounted).abs() < Decimal::ONE,
        "NPV at 0% {npv} vs sum {undiscounted}"
    );
}

#[test]
fn test_npv_is_decreasing_in_discount_rate() {
    let schedule = build_schedule(&base_deal()).unwrap();
    let at_5 = metrics::npv(&schedule, dec!(0.05)).value().unwrap();
    let at_10 = metrics::npv(&schedule, dec!(0.10)).value().unwrap();
    let at_15 = metrics::npv(&schedule, dec!(0.15)).value().unwrap();
    assert!(at_5 > at_10 && at_10 > at_15, "{at_5} / {at_10} / {at_15}");
}

#[test]
fn test_lifting_cost_is_first_year_loe_per_boe() {
    let result = evaluate(&base_deal()).unwrap();
    let first = &result.schedule[0];
    assert_eq!(
        result.metrics["Lifting Cost"].value(),
        Some(first.loe / first.boe_volume)
    );
}

#[test]
fn test_government_take_is_zero_when_untaxed() {
    let mut inputs = base_deal();
    inputs.fiscal.royalty_pct = Decimal::ZERO;
    let result = evaluate(&inputs).unwrap();
    assert_eq!(result.metrics["Government Take"].value(), Some(Decimal::ZERO));
}

// ===========================================================================
// Economic limit
// ===========================================================================

#[test]
fn test_economic_limit_above_initial_rate_truncates_to_year_one() {
    let mut inputs = base_deal();
    inputs.production.economic_limit_bopd = dec!(2000);
    let result = evaluate(&inputs).unwrap();
    assert_eq!(result.schedule.len(), 1);
    assert_eq!(result.schedule[0].year, 1);
    assert_eq!(result.summary.schedule_years, 1);
    assert_eq!(result.summary.evaluation_years_requested, 5);
}

// ===========================================================================
// Optional input groups
// ===========================================================================

#[test]
fn test_reserves_group_unlocks_reserve_metrics() {
    let json = r#"{
        "deal": {
            "deal_id": "ACQ-2025-002", "deal_name": "Eagle Draw with reserves",
            "jurisdiction": "us_onshore", "deal_type": "conventional",
            "effective_date": "2025-01-01",
            "acquisition_cost": "32000000", "equity_invested": "32000000",
            "evaluation_years": 5, "discount_rate_pct": "10"
        },
        "prices": { "oil_price": "60", "gas_price": "3" },
        "production": {
            "initial_rate_boepd": "1000",
            "oil_fraction": "1", "gas_fraction": "0", "ngl_fraction": "0",
            "decline": { "kind": "exponential", "initial_decline_pct": "15" }
        },
        "fiscal": { "royalty_pct": "12.5" },
        "costs": { "loe_per_boe": "10" },
        "capex": { "development": [ { "year": 1, "amount": "8000000" } ] },
        "reserves": {
            "reserves_1p_boe": "4000000",
            "reserves_2p_boe": "6400000",
            "reserve_additions_boe": "2000000"
        }
    }"#;
    let inputs: FinancialInputs = serde_json::from_str(json).unwrap();
    let result = evaluate(&inputs).unwrap();

    // EV/1P = 32M/4M = 8, EV/2P = 32M/6.4M = 5, F&D = 8M/2M = 4,
    // recycle = 42.50/4 = 10.625.
    assert_eq!(result.metrics["EV/1P"].value(), Some(dec!(8)));
    assert_eq!(result.metrics["EV/2P"].value(), Some(dec!(5)));
    assert_eq!(result.metrics["F&D Cost"].value(), Some(dec!(4)));
    assert_eq!(result.metrics["Recycle Ratio"].value(), Some(dec!(10.625)));
    assert_eq!(result.summary.ev_per_2p, Some(dec!(5)));
}

#[test]
fn test_rbl_group_unlocks_lending_metrics() {
    let mut inputs = base_deal();
    inputs.rbl = serde_json::from_str(
        r#"{ "drawn_amount": "10000000", "advance_rate_pct": "60",
             "interest_rate_pct": "8", "tenor_years": 4 }"#,
    )
    .unwrap();
    let result = evaluate(&inputs).unwrap();
    for key in ["Borrowing Base", "Min DSCR", "LLCR"] {
        assert!(result.metrics.contains_key(key), "missing {key}");
        assert!(result.metrics[key].value().is_some(), "{key} undefined");
    }
    assert!(result.summary.borrowing_base.unwrap() > Decimal::ZERO);
}

#[test]
fn test_optional_metrics_are_absent_without_their_groups() {
    let result = evaluate(&base_deal()).unwrap();
    for key in ["EV/1P", "EV/2P", "F&D Cost", "Recycle Ratio", "Borrowing Base", "Min DSCR", "LLCR"] {
        assert!(!result.metrics.contains_key(key), "unexpected {key}");
    }
}

// ===========================================================================
// Sensitivity through the pipeline
// ===========================================================================

#[test]
fn test_sensitivity_rows_sorted_by_descending_swing() {
    let result = evaluate(&base_deal()).unwrap();
    assert_eq!(result.sensitivity.len(), 7);
    for pair in result.sensitivity.windows(2) {
        assert!(
            pair[0].swing >= pair[1].swing,
            "{} before {}",
            pair[0].label,
            pair[1].label
        );
    }
}

#[test]
fn test_unused_variable_has_zero_swing_not_an_error() {
    // No abandonment cost in the base deal, so perturbing it moves nothing.
    let result = evaluate(&base_deal()).unwrap();
    let row = result
        .sensitivity
        .iter()
        .find(|r| r.label == "Abandonment Cost")
        .unwrap();
    assert_eq!(row.swing, Decimal::ZERO);
}

// ===========================================================================
// Determinism and rejection
// ===========================================================================

#[test]
fn test_identical_inputs_produce_identical_output() {
    let a = serde_json::to_string(&evaluate(&base_deal()).unwrap()).unwrap();
    let b = serde_json::to_string(&evaluate(&base_deal()).unwrap()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_invalid_inputs_are_rejected_before_any_math() {
    let mut inputs = base_deal();
    inputs.deal.evaluation_years = 0;
    let err = evaluate(&inputs).unwrap_err();
    assert!(err.to_string().contains("evaluation_years"), "{err}");
}
