//! The polynomial generation-rate model.
//!
//! A player's passive income is `f(x) = Σ coefficients[d] * x^d`, scaled by
//! an optional passive multiplier. Coefficients and `x` start at zero and
//! one respectively and only ever change through [`UpgradeEffect`]s applied
//! on successful purchases. Effects return a new state rather than mutating
//! in place, which keeps the purchase engine's rollback trivial.

use crate::fixed::Fixed64;
use serde::{Deserialize, Serialize};

/// Highest polynomial degree tracked by default.
pub const DEFAULT_MAX_DEGREE: usize = 7;

// ---------------------------------------------------------------------------
// PolynomialState
// ---------------------------------------------------------------------------

/// Coefficients and input of the generation-rate polynomial.
///
/// The coefficient vector is dense: index `d` holds the degree-`d`
/// coefficient, and every degree `0..=N` participates in evaluation even
/// when zero (a zero term contributes nothing, it is never skipped).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolynomialState {
    x: Fixed64,
    coefficients: Vec<Fixed64>,
    passive_multiplier: Fixed64,
}

impl PolynomialState {
    /// A fresh polynomial: all coefficients zero, `x = 1`, multiplier 1.
    pub fn new(max_degree: usize) -> Self {
        Self {
            x: Fixed64::ONE,
            coefficients: vec![Fixed64::ZERO; max_degree + 1],
            passive_multiplier: Fixed64::ONE,
        }
    }

    /// Construct from explicit parts. Used when restoring a save; the
    /// coefficient vector is resized to `max_degree + 1`, padding with zero.
    pub fn from_parts(
        x: Fixed64,
        mut coefficients: Vec<Fixed64>,
        passive_multiplier: Fixed64,
        max_degree: usize,
    ) -> Self {
        coefficients.resize(max_degree + 1, Fixed64::ZERO);
        Self {
            x,
            coefficients,
            passive_multiplier,
        }
    }

    /// Evaluate `Σ coefficients[d] * x^d` over every tracked degree.
    pub fn evaluate(&self) -> Fixed64 {
        let mut total = Fixed64::ZERO;
        let mut power = Fixed64::ONE;
        for coeff in &self.coefficients {
            total = total.saturating_add(coeff.saturating_mul(power));
            power = power.saturating_mul(self.x);
        }
        total
    }

    /// The per-tick accrual rate: `evaluate() * passive_multiplier`.
    pub fn rate(&self) -> Fixed64 {
        self.evaluate().saturating_mul(self.passive_multiplier)
    }

    pub fn x(&self) -> Fixed64 {
        self.x
    }

    pub fn coefficient(&self, degree: usize) -> Fixed64 {
        self.coefficients
            .get(degree)
            .copied()
            .unwrap_or(Fixed64::ZERO)
    }

    pub fn coefficients(&self) -> &[Fixed64] {
        &self.coefficients
    }

    /// Highest tracked degree (vector length minus one).
    pub fn max_degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    pub fn passive_multiplier(&self) -> Fixed64 {
        self.passive_multiplier
    }

    /// Render the nonzero terms highest-degree-first, hiding unit
    /// coefficients, for the `f(x) = ...` display. Returns `"0"` when every
    /// coefficient is zero.
    pub fn display_terms(&self) -> String {
        let mut terms = Vec::new();
        for degree in (0..self.coefficients.len()).rev() {
            let coeff = self.coefficients[degree];
            if coeff == Fixed64::ZERO {
                continue;
            }
            let coeff_str = if coeff == Fixed64::ONE && degree > 0 {
                String::new()
            } else {
                format_fixed(coeff)
            };
            let term = match degree {
                0 => coeff_str,
                1 => format!("{coeff_str}x"),
                _ => format!("{coeff_str}x^{degree}"),
            };
            terms.push(term);
        }
        if terms.is_empty() {
            "0".to_string()
        } else {
            terms.join(" + ")
        }
    }
}

/// Format a Fixed64 without a trailing ".0" for whole values.
fn format_fixed(v: Fixed64) -> String {
    if v.frac() == Fixed64::ZERO {
        format!("{}", v.to_num::<i64>())
    } else {
        format!("{v}")
    }
}

// ---------------------------------------------------------------------------
// UpgradeEffect
// ---------------------------------------------------------------------------

/// A pure transformation of the polynomial, applied on successful purchase.
///
/// Effects are data, not closures, so a catalog can be loaded from files and
/// serialized. A node may carry several effects; they apply in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeEffect {
    /// Set the degree-`degree` coefficient to `value`.
    SetCoefficient { degree: usize, value: Fixed64 },

    /// Multiply the degree-`degree` coefficient by `factor`.
    ScaleCoefficient { degree: usize, factor: Fixed64 },

    /// Set the input variable `x` to `value`.
    SetInput { value: Fixed64 },

    /// Multiply the input variable `x` by `factor`.
    ScaleInput { factor: Fixed64 },

    /// Multiply the passive accrual multiplier by `factor`.
    ScaleMultiplier { factor: Fixed64 },
}

impl UpgradeEffect {
    /// Apply this effect, returning a new state. The argument is never
    /// mutated. A degree beyond the tracked range is a no-op; catalog
    /// registration rejects such effects up front.
    pub fn apply(&self, state: &PolynomialState) -> PolynomialState {
        let mut next = state.clone();
        match *self {
            UpgradeEffect::SetCoefficient { degree, value } => {
                if degree < next.coefficients.len() {
                    next.coefficients[degree] = value;
                }
            }
            UpgradeEffect::ScaleCoefficient { degree, factor } => {
                if degree < next.coefficients.len() {
                    next.coefficients[degree] = next.coefficients[degree].saturating_mul(factor);
                }
            }
            UpgradeEffect::SetInput { value } => {
                next.x = value;
            }
            UpgradeEffect::ScaleInput { factor } => {
                next.x = next.x.saturating_mul(factor);
            }
            UpgradeEffect::ScaleMultiplier { factor } => {
                next.passive_multiplier = next.passive_multiplier.saturating_mul(factor);
            }
        }
        next
    }

    /// The highest degree this effect touches, if any. Used by catalog
    /// validation to reject out-of-range effects at load time.
    pub fn touched_degree(&self) -> Option<usize> {
        match *self {
            UpgradeEffect::SetCoefficient { degree, .. }
            | UpgradeEffect::ScaleCoefficient { degree, .. } => Some(degree),
            _ => None,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::f64_to_fixed64;

    fn fx(v: f64) -> Fixed64 {
        f64_to_fixed64(v)
    }

    // -----------------------------------------------------------------------
    // Evaluation
    // -----------------------------------------------------------------------

    #[test]
    fn evaluate_reference_case() {
        // x = 2, a0 = 1, a1 = 2, a2 = 3 => 1 + 2*2 + 3*4 = 17
        let state = PolynomialState::from_parts(fx(2.0), vec![fx(1.0), fx(2.0), fx(3.0)], fx(1.0), 2);
        assert_eq!(state.evaluate(), fx(17.0));
    }

    #[test]
    fn evaluate_fresh_state_is_zero() {
        let state = PolynomialState::new(DEFAULT_MAX_DEGREE);
        assert_eq!(state.evaluate(), Fixed64::ZERO);
        assert_eq!(state.x(), Fixed64::ONE);
    }

    #[test]
    fn evaluate_includes_zero_terms() {
        // a1 = 0 contributes nothing but the higher degree still counts.
        let state = PolynomialState::from_parts(fx(3.0), vec![fx(1.0), fx(0.0), fx(2.0)], fx(1.0), 2);
        assert_eq!(state.evaluate(), fx(19.0));
    }

    #[test]
    fn rate_applies_passive_multiplier() {
        let state = PolynomialState::from_parts(fx(1.0), vec![fx(4.0)], fx(2.5), 0);
        assert_eq!(state.rate(), fx(10.0));
    }

    // -----------------------------------------------------------------------
    // Effects
    // -----------------------------------------------------------------------

    #[test]
    fn effects_never_mutate_the_argument() {
        let state = PolynomialState::new(2);
        let effect = UpgradeEffect::SetCoefficient {
            degree: 0,
            value: fx(5.0),
        };
        let next = effect.apply(&state);
        assert_eq!(state.coefficient(0), Fixed64::ZERO);
        assert_eq!(next.coefficient(0), fx(5.0));
    }

    #[test]
    fn scale_effects_compose() {
        let state = PolynomialState::from_parts(fx(2.0), vec![fx(5.0)], fx(1.0), 0);
        let doubled = UpgradeEffect::ScaleCoefficient {
            degree: 0,
            factor: fx(2.0),
        }
        .apply(&state);
        assert_eq!(doubled.coefficient(0), fx(10.0));

        let x_doubled = UpgradeEffect::ScaleInput { factor: fx(2.0) }.apply(&doubled);
        assert_eq!(x_doubled.x(), fx(4.0));
    }

    #[test]
    fn out_of_range_degree_is_a_no_op() {
        let state = PolynomialState::new(1);
        let next = UpgradeEffect::SetCoefficient {
            degree: 9,
            value: fx(1.0),
        }
        .apply(&state);
        assert_eq!(next, state);
    }

    // -----------------------------------------------------------------------
    // Display
    // -----------------------------------------------------------------------

    #[test]
    fn display_orders_terms_and_hides_unit_coefficients() {
        let state = PolynomialState::from_parts(fx(2.0), vec![fx(3.0), fx(1.0), fx(2.0)], fx(1.0), 2);
        assert_eq!(state.display_terms(), "2x^2 + x + 3");
    }

    #[test]
    fn display_empty_polynomial_is_zero() {
        let state = PolynomialState::new(3);
        assert_eq!(state.display_terms(), "0");
    }

    #[test]
    fn restore_pads_short_coefficient_vectors() {
        let state = PolynomialState::from_parts(fx(1.0), vec![fx(1.0)], fx(1.0), 3);
        assert_eq!(state.coefficients().len(), 4);
        assert_eq!(state.coefficient(3), Fixed64::ZERO);
    }
}
