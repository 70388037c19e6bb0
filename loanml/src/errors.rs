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

use std::fmt;

use thiserror::Error;

use crate::data::error::DataError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodingError {
    #[error("Cannot encode an empty table")]
    EmptyTable,

    #[error("Unknown category '{value}' in column '{column}' at row {row}")]
    UnknownCategory { row: usize, column: &'static str, value: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SplitError {
    #[error("Test fraction must lie strictly between 0 and 1, got {0}")]
    InvalidFraction(f64),

    #[error("Cannot split {rows} rows into non-empty train and test sets")]
    TooFewRows { rows: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScalerError {
    #[error("Input is empty")]
    EmptyInput,

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Scaler has not been fitted")]
    NotFitted,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LossError {
    #[error("Input is empty")]
    EmptyInput,

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Input contains non-finite values")]
    InvalidNumericValue,

    #[error("Predictions must lie in [0, 1]")]
    InvalidPredictionRange,

    #[error("Actual values must be 0 or 1")]
    InvalidActualValue,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimizerError {
    #[error("Input is empty")]
    EmptyInput,

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Input contains non-finite values")]
    InvalidNumericValue,

    #[error("Labels must be 0 or 1")]
    InvalidLabel,

    #[error("Numerical instability encountered at iteration {iteration}")]
    NumericalInstability { iteration: usize },

    #[error("Optimizer did not converge within {iterations} iterations (last step {last_step:e})")]
    DidNotConverge { iterations: usize, last_step: f64 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Scaler error: {0}")]
    Scaler(#[from] ScalerError),

    #[error("Optimizer error: {0}")]
    Optimizer(#[from] OptimizerError),

    #[error("Loss error: {0}")]
    Loss(#[from] LossError),

    #[error("Model has not been fitted")]
    NotFitted,

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Inverse regularization strength must be positive, got {0}")]
    InvalidRegularization(f64),

    #[error("Threshold must lie in [0, 1], got {0}")]
    InvalidThreshold(f64),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricsError {
    #[error("Input is empty")]
    EmptyInput,

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Labels must be 0 or 1")]
    InvalidLabel,

    #[error("AUC is undefined when only one class is present")]
    SingleClass,

    #[error("Threshold must lie in [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("Loss error: {0}")]
    Loss(#[from] LossError),
}

/// The stage of the batch run that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Encode,
    Split,
    Fit,
    Predict,
    Evaluate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Encode => "encode",
            Stage::Split => "split",
            Stage::Fit => "fit",
            Stage::Predict => "predict",
            Stage::Evaluate => "evaluate",
        };
        f.write_str(name)
    }
}

/// Terminal failure of a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("load stage failed: {0}")]
    Load(#[from] DataError),

    #[error("encode stage failed: {0}")]
    Encode(#[from] EncodingError),

    #[error("split stage failed: {0}")]
    Split(#[from] SplitError),

    #[error("fit stage failed: {0}")]
    Fit(#[from] ModelError),

    #[error("predict stage failed: {0}")]
    Predict(ModelError),

    #[error("evaluate stage failed: {0}")]
    Evaluate(#[from] MetricsError),
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Load(_) => Stage::Load,
            PipelineError::Encode(_) => Stage::Encode,
            PipelineError::Split(_) => Stage::Split,
            PipelineError::Fit(_) => Stage::Fit,
            PipelineError::Predict(_) => Stage::Predict,
            PipelineError::Evaluate(_) => Stage::Evaluate,
        }
    }
}
