//! Three-parameter logistic (3PL) Item Response Theory scoring.
//!
//! Each item carries a discrimination `a`, a difficulty `b` and a guessing
//! floor `c`. The probability that a candidate of ability `theta` answers an
//! item correctly is
//!
//! ```text
//! P(theta) = c + (1 - c) / (1 + exp(-a * (theta - b)))
//! ```
//!
//! [`estimate`] finds the maximum-likelihood ability with Newton-Raphson,
//! using the Fisher information as the step denominator, and maps it onto the
//! 0-1000 display scale (mean 500, 100 points per unit of ability).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lower clamp bound for ability estimates.
pub const THETA_MIN: f64 = -4.0;
/// Upper clamp bound for ability estimates.
pub const THETA_MAX: f64 = 4.0;
/// Newton-Raphson iteration cap.
pub const MAX_ITERATIONS: u32 = 50;
/// Iteration stops once a step moves theta by less than this.
pub const TOLERANCE: f64 = 0.001;
/// Display score of an average candidate (theta = 0).
pub const SCALE_MEAN: f64 = 500.0;
/// Display points per unit of ability.
pub const SCALE_UNIT: f64 = 100.0;
/// Largest accepted item discrimination.
pub const MAX_DISCRIMINATION: f64 = 10.0;

// Keeps log-likelihood terms finite at the tails of the curve.
const PROBABILITY_FLOOR: f64 = 1e-9;

/// The 3PL parameters of a single item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemParams {
    /// Slope of the curve at its inflection point (`a`).
    pub discrimination: f64,
    /// Ability at the inflection point (`b`).
    pub difficulty: f64,
    /// Lower asymptote, the chance of guessing correctly (`c`).
    pub guessing: f64,
}

impl ItemParams {
    pub fn new(discrimination: f64, difficulty: f64, guessing: f64) -> Self {
        Self {
            discrimination,
            difficulty,
            guessing,
        }
    }

    /// Check that the parameters describe a usable item.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.discrimination.is_finite() || self.discrimination <= 0.0 {
            return Err("discrimination must be a positive number");
        }
        if self.discrimination > MAX_DISCRIMINATION {
            return Err("discrimination must not exceed 10");
        }
        if !self.difficulty.is_finite() {
            return Err("difficulty must be a finite number");
        }
        if !self.guessing.is_finite() || !(0.0..1.0).contains(&self.guessing) {
            return Err("guessing must be in [0, 1)");
        }
        Ok(())
    }

    /// Probability of a correct answer at ability `theta`.
    pub fn probability(&self, theta: f64) -> f64 {
        let logistic = 1.0 / (1.0 + (-self.discrimination * (theta - self.difficulty)).exp());
        self.guessing + (1.0 - self.guessing) * logistic
    }
}

/// One scored answer: the item answered and whether the answer was right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Response {
    pub item: ItemParams,
    pub correct: bool,
}

/// Result of an ability estimation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Estimate {
    /// Estimated ability, clamped to `[THETA_MIN, THETA_MAX]`.
    pub theta: f64,
    /// `1 / sqrt(I(theta))`, absent when the items carry no information.
    pub standard_error: Option<f64>,
    /// Ability on the display scale.
    pub score: f64,
    /// Newton-Raphson iterations performed.
    pub iterations: u32,
    /// Whether the last step fell under [`TOLERANCE`].
    pub converged: bool,
}

#[derive(Debug, Error, PartialEq)]
pub enum TriError {
    #[error("no responses to score")]
    NoResponses,
    #[error("item {index} has invalid parameters: {reason}")]
    InvalidItem { index: usize, reason: &'static str },
}

/// Map an ability onto the display scale.
pub fn to_scale(theta: f64) -> f64 {
    SCALE_MEAN + SCALE_UNIT * theta
}

/// Estimate the ability behind a set of responses.
///
/// Starts at `theta = 0` and iterates `theta += L'(theta) / I(theta)`, clamping
/// to `[-4, 4]` after every step, for at most [`MAX_ITERATIONS`] rounds or
/// until theta moves by less than [`TOLERANCE`]. Response vectors that are all
/// correct or all wrong have no finite maximum and end at a clamp bound.
pub fn estimate(responses: &[Response]) -> Result<Estimate, TriError> {
    if responses.is_empty() {
        return Err(TriError::NoResponses);
    }
    for (index, response) in responses.iter().enumerate() {
        response
            .item
            .validate()
            .map_err(|reason| TriError::InvalidItem { index, reason })?;
    }

    let mut theta = 0.0_f64;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < MAX_ITERATIONS {
        iterations += 1;
        let (gradient, information) = derivatives(responses, theta);
        let Some(step) = newton_step(gradient, information) else {
            break;
        };

        let next = (theta + step).clamp(THETA_MIN, THETA_MAX);
        let moved = (next - theta).abs();
        theta = next;
        if moved < TOLERANCE {
            converged = true;
            break;
        }
    }

    let (_, information) = derivatives(responses, theta);
    let standard_error = informative(information).then(|| 1.0 / information.sqrt());

    Ok(Estimate {
        theta,
        standard_error,
        score: to_scale(theta),
        iterations,
        converged,
    })
}

// Overflowed or vanishing information cannot drive a step or an error bound.
fn informative(information: f64) -> bool {
    information.is_finite() && information > f64::EPSILON
}

/// `L'(theta) / I(theta)`, or `None` when the derivatives are degenerate.
fn newton_step(gradient: f64, information: f64) -> Option<f64> {
    (gradient.is_finite() && informative(information)).then(|| gradient / information)
}

/// First derivative of the log-likelihood and the test information at `theta`.
fn derivatives(responses: &[Response], theta: f64) -> (f64, f64) {
    responses
        .iter()
        .fold((0.0, 0.0), |(gradient, information), response| {
            let ItemParams {
                discrimination: a,
                guessing: c,
                ..
            } = response.item;
            let p = response
                .item
                .probability(theta)
                .clamp(PROBABILITY_FLOOR, 1.0 - PROBABILITY_FLOOR);
            let u = if response.correct { 1.0 } else { 0.0 };

            let slope = a * (p - c) / (p * (1.0 - c));
            (
                gradient + slope * (u - p),
                information + slope * slope * p * (1.0 - p),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(a: f64, b: f64, c: f64) -> ItemParams {
        ItemParams::new(a, b, c)
    }

    fn answered(items: &[ItemParams], correct: &[bool]) -> Vec<Response> {
        items
            .iter()
            .zip(correct)
            .map(|(item, correct)| Response {
                item: *item,
                correct: *correct,
            })
            .collect()
    }

    fn ladder() -> Vec<ItemParams> {
        [-2.0, -1.0, 0.0, 1.0, 2.0]
            .into_iter()
            .map(|b| item(1.0, b, 0.0))
            .collect()
    }

    #[test]
    fn probability_at_difficulty_is_midway_above_guessing() {
        let params = item(1.2, 0.5, 0.2);
        assert!((params.probability(0.5) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn probability_approaches_guessing_floor() {
        let params = item(2.0, 0.0, 0.25);
        assert!((params.probability(-20.0) - 0.25).abs() < 1e-9);
        assert!(params.probability(20.0) > 0.999);
    }

    #[test]
    fn scale_maps_theta_linearly() {
        assert_eq!(to_scale(0.0), 500.0);
        assert_eq!(to_scale(1.5), 650.0);
        assert_eq!(to_scale(THETA_MIN), 100.0);
        assert_eq!(to_scale(THETA_MAX), 900.0);
    }

    #[test]
    fn balanced_answers_stay_at_mean() {
        let items = [item(1.0, 0.0, 0.0), item(1.0, 0.0, 0.0)];
        let est = estimate(&answered(&items, &[true, false])).unwrap();
        assert!(est.theta.abs() < 1e-9);
        assert_eq!(est.score, 500.0);
        assert!(est.converged);
        assert_eq!(est.iterations, 1);
        // I(0) = 2 * 0.25, so SE = 1 / sqrt(0.5)
        let se = est.standard_error.unwrap();
        assert!((se - 2.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn all_correct_hits_upper_bound() {
        let items = ladder();
        let est = estimate(&answered(&items, &[true; 5])).unwrap();
        assert_eq!(est.theta, THETA_MAX);
        assert_eq!(est.score, 900.0);
    }

    #[test]
    fn all_wrong_hits_lower_bound() {
        let items: Vec<_> = ladder().into_iter().map(|i| item(1.0, i.difficulty, 0.2)).collect();
        let est = estimate(&answered(&items, &[false; 5])).unwrap();
        assert_eq!(est.theta, THETA_MIN);
        assert_eq!(est.score, 100.0);
    }

    #[test]
    fn more_correct_answers_raise_ability() {
        let items = ladder();
        let three = estimate(&answered(&items, &[true, true, true, false, false])).unwrap();
        let four = estimate(&answered(&items, &[true, true, true, true, false])).unwrap();

        assert!(three.converged && four.converged);
        assert!(three.theta > THETA_MIN && three.theta < THETA_MAX);
        assert!(four.theta > three.theta);
        assert!(four.score > three.score);
    }

    #[test]
    fn estimate_sits_at_likelihood_maximum() {
        let items = ladder();
        let responses = answered(&items, &[true, true, false, true, false]);
        let est = estimate(&responses).unwrap();
        let (gradient, _) = derivatives(&responses, est.theta);
        assert!(gradient.abs() < 1e-2, "gradient {gradient} at theta {}", est.theta);
    }

    #[test]
    fn iteration_count_is_capped() {
        let items = ladder();
        let est = estimate(&answered(&items, &[false, true, false, true, true])).unwrap();
        assert!(est.iterations <= MAX_ITERATIONS);
    }

    #[test]
    fn empty_responses_are_rejected() {
        assert_eq!(estimate(&[]), Err(TriError::NoResponses));
    }

    #[test]
    fn invalid_items_are_rejected() {
        let bad = [
            item(0.0, 0.0, 0.2),
            item(1.0, f64::NAN, 0.2),
            item(1.0, 0.0, 1.0),
            item(1.0, 0.0, -0.1),
            item(1e200, 0.0, 0.2),
        ];
        for params in bad {
            let responses = answered(&[item(1.0, 0.0, 0.2), params], &[true, false]);
            assert!(matches!(
                estimate(&responses),
                Err(TriError::InvalidItem { index: 1, .. })
            ));
        }
    }

    #[test]
    fn discrimination_is_bounded() {
        assert!(item(MAX_DISCRIMINATION, 0.0, 0.2).validate().is_ok());
        assert!(item(MAX_DISCRIMINATION + 0.5, 0.0, 0.2).validate().is_err());
    }

    #[test]
    fn steep_items_still_reach_upper_bound() {
        let items = [item(MAX_DISCRIMINATION, 0.0, 0.2), item(MAX_DISCRIMINATION, 1.0, 0.2)];
        let est = estimate(&answered(&items, &[true, true])).unwrap();
        assert_eq!(est.theta, THETA_MAX);
        assert_eq!(est.score, 900.0);
    }

    #[test]
    fn non_finite_derivatives_give_no_step() {
        assert_eq!(newton_step(1.0, f64::INFINITY), None);
        assert_eq!(newton_step(f64::NAN, 2.0), None);
        assert_eq!(newton_step(f64::INFINITY, 2.0), None);
        assert_eq!(newton_step(1.0, 0.0), None);
        assert_eq!(newton_step(1.0, 2.0), Some(0.5));
        assert!(!informative(f64::INFINITY));
        assert!(!informative(f64::NAN));
    }
}
