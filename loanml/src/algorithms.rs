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

use log::{debug, info};
use ndarray::{Array1, Array2};

use crate::errors::{LossError, ModelError};
use crate::losses::{CrossEntropy, LossFunction};
use crate::metrics::classify;
use crate::optimizers::{Coefficients, NewtonRaphson, Optimizer};
use crate::scalers::{Scaler, StandardScaler};

/// Inverse regularization strength used when none is given. Large enough
/// that the fit is effectively unpenalised maximum likelihood.
pub const DEFAULT_INVERSE_REGULARIZATION: f64 = 1e9;

pub struct LogisticRegressionBuilder {
    loss_function: Box<dyn LossFunction>,
    normalize: bool,
    x_scaler: StandardScaler<f64>,
    optimizer: Box<dyn Optimizer>,
    inverse_regularization: f64,
}

impl LogisticRegressionBuilder {
    pub fn optimizer(mut self, optimizer: impl Optimizer + 'static) -> Self {
        self.optimizer = Box::new(optimizer);
        self
    }

    pub fn loss_function(mut self, loss_function: impl LossFunction + 'static) -> Self {
        self.loss_function = Box::new(loss_function);
        self
    }

    pub fn scaler(mut self, scaler: StandardScaler<f64>) -> Self {
        self.x_scaler = scaler;
        self
    }

    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Sets `C`; the L2 penalty on the weights is `1 / C`. `f64::INFINITY` disables it.
    pub fn inverse_regularization(mut self, c: f64) -> Self {
        self.inverse_regularization = c;
        self
    }

    pub fn build(self) -> LogisticRegression {
        LogisticRegression {
            coefficients: None,
            loss_function: self.loss_function,
            normalize: self.normalize,
            x_scaler: self.x_scaler,
            optimizer: self.optimizer,
            inverse_regularization: self.inverse_regularization,
        }
    }
}

/// Binary logistic regression.
///
/// With `normalize` on (the default) features are standardised before the
/// optimiser runs; `coefficients` reports the fit in original feature units.
pub struct LogisticRegression {
    coefficients: Option<Coefficients>,
    loss_function: Box<dyn LossFunction>,
    normalize: bool,
    x_scaler: StandardScaler<f64>,
    optimizer: Box<dyn Optimizer>,
    inverse_regularization: f64,
}

impl LogisticRegression {
    pub fn new() -> LogisticRegressionBuilder {
        LogisticRegressionBuilder {
            loss_function: Box::new(CrossEntropy),
            normalize: true,
            x_scaler: StandardScaler::new(),
            optimizer: Box::new(NewtonRaphson::default()),
            inverse_regularization: DEFAULT_INVERSE_REGULARIZATION,
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        if x.nrows() != y.len() {
            return Err(ModelError::DimensionMismatch { expected: x.nrows(), actual: y.len() });
        }
        let c = self.inverse_regularization;
        if c.is_nan() || c <= 0.0 {
            return Err(ModelError::InvalidRegularization(c));
        }
        let penalty = 1.0 / c;

        let x_scaled = if self.normalize { self.x_scaler.fit_transform(x)? } else { x.clone() };
        debug!(
            "Fitting logistic regression on {} rows x {} features (penalty={:e})",
            x.nrows(),
            x.ncols(),
            penalty
        );

        let coefficients = self.optimizer.fit(&x_scaled, y, penalty)?;
        info!("Fitted logistic regression with intercept {:.6}", coefficients.intercept);
        self.coefficients = Some(coefficients);
        Ok(())
    }

    /// Probability of the positive class for each row of `x`.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        let coefficients = self.coefficients.as_ref().ok_or(ModelError::NotFitted)?;
        if x.ncols() != coefficients.weights.len() {
            return Err(ModelError::DimensionMismatch {
                expected: coefficients.weights.len(),
                actual: x.ncols(),
            });
        }
        let x_scaled = if self.normalize { self.x_scaler.transform(x)? } else { x.clone() };
        Ok(coefficients.predict_proba(&x_scaled)?)
    }

    /// 0/1 labels: 1 where the predicted probability is at least `threshold`.
    pub fn predict(&self, x: &Array2<f64>, threshold: f64) -> Result<Array1<f64>, ModelError> {
        let probabilities = self.predict_proba(x)?;
        classify(&probabilities, threshold).map_err(|_| ModelError::InvalidThreshold(threshold))
    }

    /// Fitted coefficients in the units of the original features.
    pub fn coefficients(&self) -> Option<Coefficients> {
        let fitted = self.coefficients.as_ref()?;
        if !self.normalize {
            return Some(fitted.clone());
        }
        let mean = self.x_scaler.mean()?;
        let std = self.x_scaler.std()?;
        let weights = &fitted.weights / std;
        let intercept = fitted.intercept - weights.dot(mean);
        Some(Coefficients { intercept, weights })
    }

    pub fn calculate_loss(
        &self,
        predictions: &Array1<f64>,
        actuals: &Array1<f64>,
    ) -> Result<f64, LossError> {
        self.loss_function.calculate(predictions, actuals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{OptimizerError, ScalerError};
    use crate::optimizers::LogisticGradientDescent;
    use ndarray::array;

    fn overlapping() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [700.0, 0.10],
            [720.0, 0.08],
            [650.0, 0.15],
            [680.0, 0.13],
            [760.0, 0.07],
            [640.0, 0.16],
            [710.0, 0.12],
            [690.0, 0.09],
            [730.0, 0.14],
            [660.0, 0.11]
        ];
        let y = array![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0];
        (x, y)
    }

    #[test]
    fn logistic_regression_fit_empty_input() {
        let mut model = LogisticRegression::new().build();
        let x: Array2<f64> = Array2::zeros((0, 2));
        let y: Array1<f64> = Array1::zeros(0);
        let result = model.fit(&x, &y);
        assert!(matches!(result, Err(ModelError::Scaler(ScalerError::EmptyInput))));
    }

    #[test]
    fn logistic_regression_fit_dimension_mismatch() {
        let mut model = LogisticRegression::new().build();
        let x = array![[1.0, 2.0], [3.0, 4.0]];
        let y = array![0.0, 1.0, 0.0];
        let result = model.fit(&x, &y);
        assert_eq!(result, Err(ModelError::DimensionMismatch { expected: 2, actual: 3 }));
    }

    #[test]
    fn logistic_regression_fit_invalid_labels() {
        let mut model = LogisticRegression::new().build();
        let x = array![[1.0, 2.0], [3.0, 5.0]];
        let y = array![0.0, 2.0];
        let result = model.fit(&x, &y);
        assert_eq!(result, Err(ModelError::Optimizer(OptimizerError::InvalidLabel)));
    }

    #[test]
    fn logistic_regression_invalid_regularization() {
        let (x, y) = overlapping();
        let mut model = LogisticRegression::new().inverse_regularization(0.0).build();
        assert_eq!(model.fit(&x, &y), Err(ModelError::InvalidRegularization(0.0)));
    }

    #[test]
    fn logistic_regression_unpenalized_separable_fit_fails() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0]];
        let y = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        let mut model = LogisticRegression::new().inverse_regularization(f64::INFINITY).build();

        let result = model.fit(&x, &y);

        assert!(
            matches!(result, Err(ModelError::Optimizer(OptimizerError::DidNotConverge { .. }))),
            "got {:?}",
            result
        );
        assert_eq!(model.predict_proba(&x), Err(ModelError::NotFitted));
    }

    #[test]
    fn logistic_regression_predict_not_fitted() {
        let model = LogisticRegression::new().build();
        let result = model.predict_proba(&array![[1.0, 2.0]]);
        assert_eq!(result, Err(ModelError::NotFitted));
    }

    #[test]
    fn logistic_regression_predict_dimension_mismatch() {
        let (x, y) = overlapping();
        let mut model = LogisticRegression::new().build();
        model.fit(&x, &y).unwrap();
        let result = model.predict_proba(&array![[1.0, 2.0, 3.0]]);
        assert_eq!(result, Err(ModelError::DimensionMismatch { expected: 2, actual: 3 }));
    }

    #[test]
    fn logistic_regression_fit_predict() {
        let (x, y) = overlapping();
        let mut model = LogisticRegression::new().build();
        model.fit(&x, &y).unwrap();

        let probabilities = model.predict_proba(&x).unwrap();
        assert!(probabilities.iter().all(|&p| (0.0..=1.0).contains(&p)));
        // The maximum-likelihood fit with an intercept matches the base rate on average.
        let mean = probabilities.mean().unwrap();
        assert!((mean - 0.4).abs() < 1e-6, "mean probability {}", mean);

        let labels = model.predict(&x, 0.5).unwrap();
        assert!(labels.iter().all(|&l| l == 0.0 || l == 1.0));
    }

    #[test]
    fn logistic_regression_coefficients_in_original_units() {
        let (x, y) = overlapping();
        let mut scaled = LogisticRegression::new().inverse_regularization(f64::INFINITY).build();
        scaled.fit(&x, &y).unwrap();

        let coefficients = scaled.coefficients().unwrap();
        let direct = coefficients.predict_proba(&x).unwrap();
        let through_model = scaled.predict_proba(&x).unwrap();
        for (a, b) in direct.iter().zip(through_model.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn logistic_regression_backends_agree() {
        let (x, y) = overlapping();
        let mut newton = LogisticRegression::new().build();
        newton.fit(&x, &y).unwrap();
        let mut descent = LogisticRegression::new()
            .optimizer(LogisticGradientDescent::new().learning_rate(1.0).max_iter(200_000).tolerance(1e-10))
            .build();
        descent.fit(&x, &y).unwrap();

        let p_newton = newton.predict_proba(&x).unwrap();
        let p_descent = descent.predict_proba(&x).unwrap();
        for (a, b) in p_newton.iter().zip(p_descent.iter()) {
            assert!((a - b).abs() < 1e-4);
        }
    }

    #[test]
    fn logistic_regression_calculate_loss() {
        let model = LogisticRegression::new().build();
        let loss = model.calculate_loss(&array![0.1, 0.9], &array![0.0, 1.0]).unwrap();
        assert!(loss > 0.0);
    }
}
