// BSD 3-Clause License
//
// Copyright (c) 2025, BlackPortal ○
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this
//    list of conditions and the following disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice,
//    this list of conditions and the following disclaimer in the documentation
//    and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its
//    contributors may be used to endorse or promote products derived from
//    this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
// OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

use log::{debug, trace};
use ndarray::{s, Array1, Array2, Axis};

use crate::errors::OptimizerError;
use crate::losses::negative_log_likelihood;

/// Intercept and per-feature weights of a fitted logistic model.
#[derive(Debug, Clone, PartialEq)]
pub struct Coefficients {
    pub intercept: f64,
    pub weights: Array1<f64>,
}

impl Coefficients {
    pub fn zeros(n_features: usize) -> Self {
        Coefficients { intercept: 0.0, weights: Array1::zeros(n_features) }
    }

    /// Splits a coefficient vector whose first entry is the intercept.
    fn from_design(beta: &Array1<f64>) -> Self {
        Coefficients { intercept: beta[0], weights: beta.slice(s![1..]).to_owned() }
    }

    /// Linear scores `intercept + x·w` for each row of `x`.
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>, OptimizerError> {
        if x.ncols() != self.weights.len() {
            return Err(OptimizerError::DimensionMismatch {
                expected: self.weights.len(),
                actual: x.ncols(),
            });
        }
        Ok(x.dot(&self.weights) + self.intercept)
    }

    /// Probability of the positive class for each row of `x`.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, OptimizerError> {
        Ok(self.decision_function(x)?.mapv(sigmoid))
    }
}

#[inline]
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + libm::exp(-z))
    } else {
        let e = libm::exp(z);
        e / (1.0 + e)
    }
}

/// A backend that fits logistic-regression coefficients.
///
/// Implementors minimise the summed negative log-likelihood plus
/// `penalty / 2 * ||w||²`; the intercept is never penalised. A `penalty` of
/// zero gives the unregularised maximum-likelihood estimate.
pub trait Optimizer {
    fn fit(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        penalty: f64,
    ) -> Result<Coefficients, OptimizerError>;
}

fn validate_inputs(x: &Array2<f64>, y: &Array1<f64>, penalty: f64) -> Result<(), OptimizerError> {
    if x.is_empty() || y.is_empty() {
        return Err(OptimizerError::EmptyInput);
    }

    if x.nrows() != y.len() {
        return Err(OptimizerError::DimensionMismatch { expected: x.nrows(), actual: y.len() });
    }

    if x.iter().any(|v| !v.is_finite()) || !penalty.is_finite() || penalty < 0.0 {
        return Err(OptimizerError::InvalidNumericValue);
    }

    if y.iter().any(|&v| v != 0.0 && v != 1.0) {
        return Err(OptimizerError::InvalidLabel);
    }

    Ok(())
}

/// Objective over a design matrix whose first column is the intercept.
fn penalized_objective(design: &Array2<f64>, y: &Array1<f64>, beta: &Array1<f64>, penalty: f64) -> f64 {
    let z = design.dot(beta);
    let ridge = beta.slice(s![1..]).iter().map(|b| b * b).sum::<f64>();
    negative_log_likelihood(&z, y) + 0.5 * penalty * ridge
}

/// Solve the symmetric positive-definite system `a · x = b` by Cholesky factorisation.
///
/// A matrix that is not numerically positive definite gets a small ridge on
/// its diagonal and one more attempt.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    cholesky_solve_inner(a, b).or_else(|| {
        let n = a.nrows();
        let ridge = 1e-8 * a.diag().iter().map(|v| v.abs()).sum::<f64>() / n as f64;
        let mut regularized = a.clone();
        regularized.diag_mut().mapv_inplace(|v| v + ridge.max(f64::MIN_POSITIVE));
        cholesky_solve_inner(&regularized, b)
    })
}

fn cholesky_solve_inner(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    let mut l: Array2<f64> = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[[i, k]] * l[[j, k]]).sum();
            if i == j {
                let diag = a[[i, i]] - sum;
                if !(diag > 0.0) {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // Forward substitution: L y = b
    let mut y: Array1<f64> = Array1::zeros(n);
    for i in 0..n {
        let sum: f64 = (0..i).map(|j| l[[i, j]] * y[j]).sum();
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Back substitution: Lᵀ x = y
    let mut x: Array1<f64> = Array1::zeros(n);
    for i in (0..n).rev() {
        let sum: f64 = ((i + 1)..n).map(|j| l[[j, i]] * x[j]).sum();
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

/// Every row is fitted to within `1e-6` of its label, which only happens when
/// unpenalised weights are diverging.
fn perfectly_separated(design: &Array2<f64>, y: &Array1<f64>, beta: &Array1<f64>) -> bool {
    let prob = design.dot(beta).mapv(sigmoid);
    prob.iter().zip(y.iter()).all(|(p, t)| (p - t).abs() < 1e-6)
}

/// Newton-Raphson iterations on the penalised log-likelihood (IRLS).
///
/// Each step solves `H Δ = g` with the exact Hessian and halves the step until
/// the objective does not increase. Converges when the Newton decrement `g·Δ`
/// falls below `tolerance * (1 + |objective|)`; the converging step is still
/// taken. A step that cannot decrease the objective before convergence, or an
/// unpenalised fit that separates the classes perfectly, is `DidNotConverge`.
#[derive(Debug, Clone)]
pub struct NewtonRaphson {
    pub max_iter: usize,
    pub tolerance: f64,
}

impl Default for NewtonRaphson {
    fn default() -> Self {
        NewtonRaphson { max_iter: 100, tolerance: 1e-8 }
    }
}

impl NewtonRaphson {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

impl Optimizer for NewtonRaphson {
    fn fit(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        penalty: f64,
    ) -> Result<Coefficients, OptimizerError> {
        validate_inputs(x, y, penalty)?;

        let (n_samples, n_features) = x.dim();
        let mut design: Array2<f64> = Array2::ones((n_samples, n_features + 1));
        design.slice_mut(s![.., 1..]).assign(x);

        let mut beta: Array1<f64> = Array1::zeros(n_features + 1);
        let mut objective = penalized_objective(&design, y, &beta, penalty);
        let mut last_step = f64::INFINITY;

        for iteration in 1..=self.max_iter {
            let prob = design.dot(&beta).mapv(sigmoid);
            let curvature = prob.mapv(|p| p * (1.0 - p));

            let mut gradient = design.t().dot(&(&prob - y));
            let weighted = &design * &curvature.view().insert_axis(Axis(1));
            let mut hessian = design.t().dot(&weighted);
            for j in 1..=n_features {
                gradient[j] += penalty * beta[j];
                hessian[[j, j]] += penalty;
            }

            let step = cholesky_solve(&hessian, &gradient)
                .ok_or(OptimizerError::NumericalInstability { iteration })?;
            if !step.iter().all(|v| v.is_finite()) {
                return Err(OptimizerError::NumericalInstability { iteration });
            }

            // Judged on the full Newton step; the decrement ignores directions
            // the objective is flat along, such as collinear indicator columns.
            last_step = step.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
            let decrement = gradient.dot(&step);
            let converged = decrement <= self.tolerance * (1.0 + objective.abs());

            let mut scale = 1.0;
            let mut candidate = &beta - &step;
            let mut candidate_objective = penalized_objective(&design, y, &candidate, penalty);
            while !converged && !(candidate_objective <= objective) && scale > 1e-10 {
                scale *= 0.5;
                candidate = &beta - &(&step * scale);
                candidate_objective = penalized_objective(&design, y, &candidate, penalty);
            }

            if candidate_objective <= objective {
                if !candidate.iter().all(|v| v.is_finite()) {
                    return Err(OptimizerError::NumericalInstability { iteration });
                }
                beta = candidate;
                objective = candidate_objective;
                trace!(
                    "Newton iteration {}: objective={:.6}, step={:.3e}, scale={:.3e}",
                    iteration,
                    objective,
                    last_step,
                    scale
                );
            } else if !converged {
                debug!("Newton-Raphson line search failed at iteration {}", iteration);
                return Err(OptimizerError::DidNotConverge { iterations: iteration, last_step });
            }

            if converged {
                if penalty == 0.0 && perfectly_separated(&design, y, &beta) {
                    debug!("Classes are perfectly separated; no finite maximum-likelihood fit");
                    return Err(OptimizerError::DidNotConverge { iterations: iteration, last_step });
                }
                debug!("Newton-Raphson converged after {} iterations", iteration);
                return Ok(Coefficients::from_design(&beta));
            }
        }

        Err(OptimizerError::DidNotConverge { iterations: self.max_iter, last_step })
    }
}

/// Full-batch gradient descent on the mean penalised log-likelihood.
///
/// Converges when the largest gradient component falls below `tolerance`.
#[derive(Debug, Clone)]
pub struct LogisticGradientDescent {
    pub learning_rate: f64,
    pub max_iter: usize,
    pub tolerance: f64,
}

impl Default for LogisticGradientDescent {
    fn default() -> Self {
        LogisticGradientDescent { learning_rate: 0.5, max_iter: 10_000, tolerance: 1e-6 }
    }
}

impl LogisticGradientDescent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    fn compute_gradients(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        coefficients: &Coefficients,
        penalty: f64,
    ) -> Result<(Array1<f64>, f64), OptimizerError> {
        let n = x.nrows() as f64;
        let predictions = coefficients.predict_proba(x)?;
        let errors = &predictions - y;
        let grad_weights = (x.t().dot(&errors) + &coefficients.weights * penalty) / n;
        let grad_bias = errors.sum() / n;
        Ok((grad_weights, grad_bias))
    }
}

impl Optimizer for LogisticGradientDescent {
    fn fit(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        penalty: f64,
    ) -> Result<Coefficients, OptimizerError> {
        validate_inputs(x, y, penalty)?;

        let mut coefficients = Coefficients::zeros(x.ncols());
        let mut last_step = f64::INFINITY;

        for iteration in 1..=self.max_iter {
            let (grad_weights, grad_bias) = self.compute_gradients(x, y, &coefficients, penalty)?;

            if !grad_weights.iter().all(|v| v.is_finite()) || !grad_bias.is_finite() {
                return Err(OptimizerError::NumericalInstability { iteration });
            }

            let largest = grad_weights.iter().fold(grad_bias.abs(), |m, v| m.max(v.abs()));
            if largest < self.tolerance {
                debug!("Gradient descent converged after {} iterations", iteration);
                return Ok(coefficients);
            }

            coefficients.weights -= &(grad_weights * self.learning_rate);
            coefficients.intercept -= grad_bias * self.learning_rate;
            last_step = largest * self.learning_rate;
        }

        Err(OptimizerError::DidNotConverge { iterations: self.max_iter, last_step })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    /// Overlapping classes so the maximum-likelihood estimate is finite.
    fn overlapping() -> (Array2<f64>, Array1<f64>) {
        let x = array![[-2.0], [-1.5], [-1.0], [-0.5], [0.0], [0.5], [1.0], [1.5], [2.0], [0.25]];
        let y = array![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 1.0];
        (x, y)
    }

    fn score_gradient(x: &Array2<f64>, y: &Array1<f64>, c: &Coefficients) -> Array1<f64> {
        let errors = c.predict_proba(x).unwrap() - y;
        let mut g = x.t().dot(&errors).to_vec();
        g.insert(0, errors.sum());
        Array1::from_vec(g)
    }

    #[test]
    fn test_sigmoid_is_stable() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(-1000.0) >= 0.0);
        assert!((sigmoid(1000.0) - 1.0).abs() < 1e-15);
        assert!((sigmoid(2.0) + sigmoid(-2.0) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_cholesky_solve() {
        let a = array![[4.0, 2.0], [2.0, 3.0]];
        let b = array![2.0, 1.0];
        let x = cholesky_solve(&a, &b).unwrap();
        let residual = a.dot(&x) - &b;
        assert!(residual.iter().all(|r| r.abs() < 1e-12));
    }

    #[test]
    fn test_cholesky_solve_singular_gets_ridge() {
        let a = array![[1.0, 1.0], [1.0, 1.0]];
        let b = array![1.0, 1.0];
        let x = cholesky_solve(&a, &b).unwrap();
        assert!(x.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_newton_reaches_stationary_point() {
        let (x, y) = overlapping();
        let coefficients = NewtonRaphson::new().fit(&x, &y, 0.0).unwrap();

        let gradient = score_gradient(&x, &y, &coefficients);
        assert!(gradient.iter().all(|g| g.abs() < 1e-6), "gradient {:?}", gradient);
        assert!(coefficients.weights[0] > 0.0);
    }

    #[test]
    fn test_newton_and_gradient_descent_agree() {
        let (x, y) = overlapping();
        let newton = NewtonRaphson::new().fit(&x, &y, 0.0).unwrap();
        let descent = LogisticGradientDescent::new()
            .learning_rate(1.0)
            .max_iter(100_000)
            .tolerance(1e-9)
            .fit(&x, &y, 0.0)
            .unwrap();

        assert!((newton.intercept - descent.intercept).abs() < 1e-5);
        assert!((newton.weights[0] - descent.weights[0]).abs() < 1e-5);
    }

    #[test]
    fn test_penalty_shrinks_weights() {
        let (x, y) = overlapping();
        let free = NewtonRaphson::new().fit(&x, &y, 0.0).unwrap();
        let ridge = NewtonRaphson::new().fit(&x, &y, 10.0).unwrap();
        assert!(ridge.weights[0].abs() < free.weights[0].abs());
    }

    #[test]
    fn test_newton_did_not_converge() {
        let (x, y) = overlapping();
        let result = NewtonRaphson::new().max_iter(1).fit(&x, &y, 0.0);
        assert!(matches!(result, Err(OptimizerError::DidNotConverge { iterations: 1, .. })));
    }

    #[test]
    fn test_newton_separable_data_without_penalty_fails() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let result = NewtonRaphson::new().fit(&x, &y, 0.0);
        assert!(
            matches!(result, Err(OptimizerError::DidNotConverge { .. })),
            "separable data has no finite maximum-likelihood fit, got {:?}",
            result
        );
    }

    #[test]
    fn test_newton_separable_data_with_penalty_converges() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let coefficients = NewtonRaphson::new().fit(&x, &y, 1.0).unwrap();
        assert!(coefficients.weights[0] > 0.0);
        assert!(coefficients.weights[0].is_finite());
    }

    #[test]
    fn test_newton_collinear_columns_with_tiny_penalty() {
        let (x, y) = overlapping();
        let mut doubled: Array2<f64> = Array2::zeros((x.nrows(), 2));
        doubled.column_mut(0).assign(&x.column(0));
        doubled.column_mut(1).assign(&x.column(0));

        let single = NewtonRaphson::new().fit(&x, &y, 0.0).unwrap();
        let twin = NewtonRaphson::new().fit(&doubled, &y, 1e-9).unwrap();

        // The shared weight splits evenly across identical columns.
        let combined = twin.weights[0] + twin.weights[1];
        assert!((combined - single.weights[0]).abs() < 1e-4, "{} vs {}", combined, single.weights[0]);
        assert!((twin.intercept - single.intercept).abs() < 1e-4);
    }

    #[test]
    fn test_gradient_descent_did_not_converge() {
        let (x, y) = overlapping();
        let result = LogisticGradientDescent::new().max_iter(3).fit(&x, &y, 0.0);
        assert!(matches!(result, Err(OptimizerError::DidNotConverge { iterations: 3, .. })));
    }

    #[test]
    fn test_fit_empty_input() {
        let x: Array2<f64> = Array2::zeros((0, 2));
        let y: Array1<f64> = Array1::zeros(0);
        assert_eq!(NewtonRaphson::new().fit(&x, &y, 0.0), Err(OptimizerError::EmptyInput));
    }

    #[test]
    fn test_fit_dimension_mismatch() {
        let x = array![[1.0, 2.0], [3.0, 4.0]];
        let y = array![0.0, 1.0, 0.0];
        assert_eq!(
            NewtonRaphson::new().fit(&x, &y, 0.0),
            Err(OptimizerError::DimensionMismatch { expected: 2, actual: 3 })
        );
    }

    #[test]
    fn test_fit_invalid_labels() {
        let x = array![[1.0], [3.0]];
        let y = array![0.0, 2.0];
        assert_eq!(
            LogisticGradientDescent::new().fit(&x, &y, 0.0),
            Err(OptimizerError::InvalidLabel)
        );
    }

    #[test]
    fn test_predict_proba_dimension_mismatch() {
        let coefficients = Coefficients::zeros(2);
        let result = coefficients.predict_proba(&array![[1.0, 2.0, 3.0]]);
        assert_eq!(result, Err(OptimizerError::DimensionMismatch { expected: 2, actual: 3 }));
    }
}
