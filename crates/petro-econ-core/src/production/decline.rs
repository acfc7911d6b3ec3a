use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::inputs::DeclineAssumptions;
use crate::types::{rate_from_pct, Rate, Years, DAYS_PER_YEAR};

/// Numeric EUR integration never runs past this horizon. Long-tail
/// hyperbolic curves (b > 1) otherwise take geological time to reach limit.
const MAX_INTEGRATION_YEARS: Decimal = dec!(50);

/// Monthly step for the numeric fallback.
const INTEGRATION_STEPS_PER_YEAR: u32 = 12;

/// Arps decline families. Closed set: every operation dispatches
/// exhaustively, so a new family cannot be added without extending each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclineKind {
    Exponential,
    Hyperbolic,
    Harmonic,
}

/// A decline curve in internal fraction form. The rate basis (boe/d or
/// bbl/d) is whatever the caller put in `initial_rate`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeclineCurve {
    pub kind: DeclineKind,
    pub initial_rate: Decimal,
    /// Annual decline D as a fraction (0.15 = 15%/yr).
    pub annual_decline: Rate,
    pub b_factor: Decimal,
}

impl DeclineCurve {
    pub fn new(kind: DeclineKind, initial_rate: Decimal, annual_decline: Rate, b_factor: Decimal) -> Self {
        DeclineCurve {
            kind,
            initial_rate,
            annual_decline,
            b_factor,
        }
    }

    /// Builds the fraction-form curve from boundary (percentage-point)
    /// assumptions.
    pub fn from_assumptions(initial_rate: Decimal, decline: &DeclineAssumptions) -> Self {
        DeclineCurve {
            kind: decline.kind,
            initial_rate,
            annual_decline: rate_from_pct(decline.initial_decline_pct),
            b_factor: decline.b_factor,
        }
    }

    /// Hyperbolic curves with b outside (0, 2] collapse to exponential; b
    /// exactly 1 is the harmonic curve and is routed there for exact
    /// division instead of a powd round-trip.
    fn effective_kind(&self) -> DeclineKind {
        match self.kind {
            DeclineKind::Hyperbolic
                if self.b_factor <= Decimal::ZERO || self.b_factor > dec!(2) =>
            {
                DeclineKind::Exponential
            }
            DeclineKind::Hyperbolic if self.b_factor == Decimal::ONE => DeclineKind::Harmonic,
            other => other,
        }
    }

    /// Instantaneous rate `t` years from the effective date. `t <= 0`
    /// returns the initial rate exactly.
    pub fn rate_at(&self, t: Years) -> Decimal {
        if t <= Decimal::ZERO || self.initial_rate <= Decimal::ZERO {
            return self.initial_rate;
        }
        match self.effective_kind() {
            DeclineKind::Exponential => {
                self.initial_rate * (-self.annual_decline * t).exp()
            }
            DeclineKind::Harmonic => {
                self.initial_rate / (Decimal::ONE + self.annual_decline * t)
            }
            DeclineKind::Hyperbolic => {
                let base = Decimal::ONE + self.b_factor * self.annual_decline * t;
                self.initial_rate * base.powd(-Decimal::ONE / self.b_factor)
            }
        }
    }

    /// Average rate over schedule year `year` (year 1 spans t in [0, 1]):
    /// the trapezoidal mean of the start and end rates. Deliberately an
    /// approximation of the true integral.
    pub fn year_average(&self, year: u32) -> Decimal {
        let end = Decimal::from(year);
        let start = end - Decimal::ONE;
        (self.rate_at(start) + self.rate_at(end)) / dec!(2)
    }

    /// Years until the rate falls to `limit`. None when the limit is not
    /// positive (the curve never reaches it in finite closed form for the
    /// harmonic and hyperbolic families).
    pub fn time_to_limit_years(&self, limit: Decimal) -> Option<Years> {
        if self.initial_rate <= Decimal::ZERO {
            return Some(Decimal::ZERO);
        }
        if limit >= self.initial_rate {
            return Some(Decimal::ZERO);
        }
        if limit <= Decimal::ZERO {
            return None;
        }
        let ratio = self.initial_rate / limit;
        let d = self.annual_decline;
        match self.effective_kind() {
            DeclineKind::Exponential => Some(ratio.ln() / d),
            DeclineKind::Harmonic => Some((ratio - Decimal::ONE) / d),
            DeclineKind::Hyperbolic => {
                Some((ratio.powd(self.b_factor) - Decimal::ONE) / (self.b_factor * d))
            }
        }
    }

    /// Ultimate recovery from t=0 down to `economic_limit`, in barrels on
    /// the curve's rate basis. Closed-form integral per family; hyperbolic
    /// b > 1 has no practical closed form and integrates numerically at
    /// monthly steps, truncated at `MAX_INTEGRATION_YEARS`. None when the
    /// integral is unbounded for the given limit.
    pub fn eur(&self, economic_limit: Decimal) -> Option<Decimal> {
        let qi = self.initial_rate;
        if qi <= Decimal::ZERO || economic_limit >= qi {
            return Some(Decimal::ZERO);
        }
        let d = self.annual_decline;
        if d <= Decimal::ZERO {
            return None;
        }
        let q_econ = economic_limit.max(Decimal::ZERO);

        match self.effective_kind() {
            DeclineKind::Exponential => Some((qi - q_econ) / d * DAYS_PER_YEAR),
            DeclineKind::Harmonic => {
                if q_econ <= Decimal::ZERO {
                    return None;
                }
                Some(qi / d * (qi / q_econ).ln() * DAYS_PER_YEAR)
            }
            DeclineKind::Hyperbolic => {
                let b = self.b_factor;
                if b < Decimal::ONE {
                    // qi / ((1-b) D) * (1 - (q_econ/qi)^(1-b))
                    let tail = if q_econ <= Decimal::ZERO {
                        Decimal::ZERO
                    } else {
                        (q_econ / qi).powd(Decimal::ONE - b)
                    };
                    Some(qi / ((Decimal::ONE - b) * d) * (Decimal::ONE - tail) * DAYS_PER_YEAR)
                } else {
                    if q_econ <= Decimal::ZERO {
                        return None;
                    }
                    let horizon = self
                        .time_to_limit_years(q_econ)?
                        .min(MAX_INTEGRATION_YEARS);
                    Some(self.integrate_numeric(horizon))
                }
            }
        }
    }

    /// Trapezoidal integration of the rate over [0, horizon] years.
    fn integrate_numeric(&self, horizon: Years) -> Decimal {
        let steps_per_year = Decimal::from(INTEGRATION_STEPS_PER_YEAR);
        let step = Decimal::ONE / steps_per_year;
        let total_steps = (horizon * steps_per_year)
            .ceil()
            .to_u32()
            .unwrap_or(INTEGRATION_STEPS_PER_YEAR);

        let mut acc = Decimal::ZERO;
        let mut t0 = Decimal::ZERO;
        for _ in 0..total_steps {
            let t1 = (t0 + step).min(horizon);
            if t1 <= t0 {
                break;
            }
            acc += (self.rate_at(t0) + self.rate_at(t1)) / dec!(2) * (t1 - t0);
            t0 = t1;
        }
        acc * DAYS_PER_YEAR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn exp_curve() -> DeclineCurve {
        DeclineCurve::new(DeclineKind::Exponential, dec!(1000), dec!(0.15), Decimal::ZERO)
    }

    #[test]
    fn exponential_at_time_zero_is_exact() {
        assert_eq!(exp_curve().rate_at(Decimal::ZERO), dec!(1000));
    }

    #[test]
    fn exponential_strictly_decreases() {
        let curve = exp_curve();
        let half = curve.rate_at(dec!(0.5));
        let one = curve.rate_at(dec!(1));
        let five = curve.rate_at(dec!(5));
        assert!(half < dec!(1000));
        assert!(one < half);
        assert!(five < one);
    }

    #[test]
    fn exponential_one_year_matches_hand_value() {
        // 1000 * e^-0.15 = 860.70798...
        let rate = exp_curve().rate_at(dec!(1));
        assert!((rate - dec!(860.70798)).abs() < dec!(0.001));
    }

    #[test]
    fn harmonic_is_plain_division() {
        let curve = DeclineCurve::new(DeclineKind::Harmonic, dec!(1000), dec!(0.2), Decimal::ZERO);
        assert_eq!(curve.rate_at(dec!(1)).round_dp(4), dec!(833.3333));
        assert_eq!(curve.rate_at(dec!(5)).round_dp(0), dec!(500));
    }

    #[test]
    fn hyperbolic_matches_hand_value() {
        // 1000 * (1 + 0.5*0.3*2)^(-1/0.5) = 1000 * 1.3^-2 = 591.7160
        let curve = DeclineCurve::new(DeclineKind::Hyperbolic, dec!(1000), dec!(0.3), dec!(0.5));
        let rate = curve.rate_at(dec!(2));
        assert!((rate - dec!(591.7160)).abs() < dec!(0.01));
    }

    #[test]
    fn hyperbolic_with_zero_b_collapses_to_exponential() {
        let hyp = DeclineCurve::new(DeclineKind::Hyperbolic, dec!(1000), dec!(0.15), Decimal::ZERO);
        let exp = exp_curve();
        assert_eq!(hyp.rate_at(dec!(3)), exp.rate_at(dec!(3)));
    }

    #[test]
    fn hyperbolic_with_unit_b_is_harmonic() {
        let hyp = DeclineCurve::new(DeclineKind::Hyperbolic, dec!(1000), dec!(0.2), Decimal::ONE);
        let har = DeclineCurve::new(DeclineKind::Harmonic, dec!(1000), dec!(0.2), Decimal::ZERO);
        assert_eq!(hyp.rate_at(dec!(4)), har.rate_at(dec!(4)));
    }

    #[test]
    fn hyperbolic_with_out_of_band_b_collapses_to_exponential() {
        let hyp = DeclineCurve::new(DeclineKind::Hyperbolic, dec!(1000), dec!(0.15), dec!(2.4));
        let exp = exp_curve();
        assert_eq!(hyp.rate_at(dec!(2)), exp.rate_at(dec!(2)));
    }

    #[test]
    fn year_average_is_trapezoid_of_endpoints() {
        let curve = exp_curve();
        let expected = (curve.rate_at(Decimal::ZERO) + curve.rate_at(dec!(1))) / dec!(2);
        assert_eq!(curve.year_average(1), expected);
    }

    #[test]
    fn eur_exponential_closed_form() {
        // (1000 - 100) / 0.15 * 365.25 = 2,191,500
        let eur = exp_curve().eur(dec!(100)).unwrap();
        assert_eq!(eur, dec!(2_191_500));
    }

    #[test]
    fn eur_zero_when_limit_at_or_above_initial_rate() {
        assert_eq!(exp_curve().eur(dec!(1000)), Some(Decimal::ZERO));
        assert_eq!(exp_curve().eur(dec!(1500)), Some(Decimal::ZERO));
    }

    #[test]
    fn eur_harmonic_closed_form() {
        // (1000/0.2) * ln(10) * 365.25 = 4,205,096.0
        let curve = DeclineCurve::new(DeclineKind::Harmonic, dec!(1000), dec!(0.2), Decimal::ZERO);
        let eur = curve.eur(dec!(100)).unwrap();
        assert!((eur - dec!(4_205_096.0)).abs() < dec!(1));
    }

    #[test]
    fn eur_harmonic_unbounded_at_zero_limit() {
        let curve = DeclineCurve::new(DeclineKind::Harmonic, dec!(1000), dec!(0.2), Decimal::ZERO);
        assert_eq!(curve.eur(Decimal::ZERO), None);
    }

    #[test]
    fn eur_hyperbolic_low_b_closed_form() {
        // qi/((1-b)D) * (1 - (q/qi)^(1-b)) * 365.25
        // = 1000/(0.5*0.3) * (1 - 0.1^0.5) * 365.25 = 1,664,985.3
        let curve = DeclineCurve::new(DeclineKind::Hyperbolic, dec!(1000), dec!(0.3), dec!(0.5));
        let eur = curve.eur(dec!(100)).unwrap();
        assert!((eur - dec!(1_664_985.3)).abs() < dec!(5));
    }

    #[test]
    fn eur_hyperbolic_high_b_numeric_matches_analytic() {
        // b=2, D=0.3, limit 200: exact integral is (2/0.6)*(sqrt(25)-1)*1000
        // rate-years = 13,333.33 -> 4,870,000 boe. Monthly trapezoid lands
        // within a few hundred.
        let curve = DeclineCurve::new(DeclineKind::Hyperbolic, dec!(1000), dec!(0.3), dec!(2));
        let eur = curve.eur(dec!(200)).unwrap();
        assert!((eur - dec!(4_870_000)).abs() < dec!(500));
    }

    #[test]
    fn time_to_limit_exponential() {
        // ln(10)/0.15 = 15.35 years
        let t = exp_curve().time_to_limit_years(dec!(100)).unwrap();
        assert!((t - dec!(15.3506)).abs() < dec!(0.001));
    }
}
