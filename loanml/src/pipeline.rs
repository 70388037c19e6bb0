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

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::algorithms::{LogisticRegression, DEFAULT_INVERSE_REGULARIZATION};
use crate::data::summary::{
    describe, describe_raw, missing_counts, positive_rate, purpose_counts, ColumnSummary,
};
use crate::data::{load_data, ImputedLoansLoader, RawLoansLoader};
use crate::encoding::OneHotEncoder;
use crate::errors::{ModelError, PipelineError};
use crate::metrics::{evaluate, Evaluation};
use crate::optimizers::{Coefficients, NewtonRaphson};
use crate::split::train_test_split;

/// Settings of one batch run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    imputed_path: PathBuf,
    raw_path: Option<PathBuf>,
    test_fraction: f64,
    seed: u64,
    threshold: f64,
    inverse_regularization: f64,
    max_iter: usize,
    tolerance: f64,
    drop_first: bool,
}

impl PipelineConfig {
    pub fn new(imputed_path: impl AsRef<Path>) -> Self {
        PipelineConfig {
            imputed_path: imputed_path.as_ref().to_path_buf(),
            raw_path: None,
            test_fraction: 0.3,
            seed: 101,
            threshold: 0.5,
            inverse_regularization: DEFAULT_INVERSE_REGULARIZATION,
            max_iter: 100,
            tolerance: 1e-8,
            drop_first: false,
        }
    }

    /// Also load the un-imputed file and summarise its missing values.
    pub fn with_raw_path(mut self, raw_path: impl AsRef<Path>) -> Self {
        self.raw_path = Some(raw_path.as_ref().to_path_buf());
        self
    }

    pub fn with_test_fraction(mut self, test_fraction: f64) -> Self {
        self.test_fraction = test_fraction;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_inverse_regularization(mut self, c: f64) -> Self {
        self.inverse_regularization = c;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_drop_first(mut self, drop_first: bool) -> Self {
        self.drop_first = drop_first;
        self
    }

    pub fn imputed_path(&self) -> &Path {
        &self.imputed_path
    }

    pub fn raw_path(&self) -> Option<&Path> {
        self.raw_path.as_deref()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// Everything a batch run produces.
#[derive(Debug, Clone)]
pub struct Report {
    pub n_rows: usize,
    pub positive_rate: f64,
    pub purpose_counts: BTreeMap<String, usize>,
    /// Statistics of the modelling table.
    pub summary: Vec<ColumnSummary>,
    pub raw_summary: Option<Vec<ColumnSummary>>,
    pub missing_counts: Option<BTreeMap<&'static str, usize>>,
    pub n_train: usize,
    pub n_test: usize,
    pub feature_names: Vec<String>,
    /// Fitted coefficients in original feature units.
    pub coefficients: Coefficients,
    pub evaluation: Evaluation,
}

fn write_summary(f: &mut fmt::Formatter<'_>, title: &str, summary: &[ColumnSummary]) -> fmt::Result {
    writeln!(
        f,
        "{:<18} {:>6} {:>6} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
        title, "count", "na", "mean", "std", "min", "25%", "50%", "75%", "max"
    )?;
    for column in summary {
        writeln!(f, "{}", column)?;
    }
    Ok(())
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Loans: {}", self.n_rows)?;
        writeln!(f, "Share not fully paid: {:.4}", self.positive_rate)?;
        writeln!(f)?;
        writeln!(f, "Loans by purpose:")?;
        for (purpose, count) in &self.purpose_counts {
            writeln!(f, "  {:<20} {:>6}", purpose, count)?;
        }

        writeln!(f)?;
        write_summary(f, "column", &self.summary)?;
        if let Some(summary) = &self.raw_summary {
            writeln!(f)?;
            write_summary(f, "raw column", summary)?;
        }
        if let Some(missing) = &self.missing_counts {
            writeln!(f)?;
            writeln!(f, "Missing values in raw file:")?;
            for (column, count) in missing {
                writeln!(f, "  {:<20} {:>6}", column, count)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Train rows: {}, test rows: {}", self.n_train, self.n_test)?;
        writeln!(f)?;
        writeln!(f, "Coefficients:")?;
        writeln!(f, "  {:<26} {:>14.6}", "intercept", self.coefficients.intercept)?;
        for (name, weight) in self.feature_names.iter().zip(self.coefficients.weights.iter()) {
            writeln!(f, "  {:<26} {:>14.6}", name, weight)?;
        }

        let evaluation = &self.evaluation;
        writeln!(f)?;
        writeln!(f, "Confusion matrix (threshold {}):", evaluation.threshold)?;
        writeln!(f, "{}", evaluation.confusion_matrix)?;
        writeln!(f)?;
        writeln!(f, "Accuracy:          {:.4}", evaluation.accuracy)?;
        writeln!(f, "Baseline accuracy: {:.4}", evaluation.baseline_accuracy)?;
        writeln!(f, "AUC:               {:.4}", evaluation.auc)?;
        writeln!(f, "Probability AUC:   {:.4}", evaluation.probability_auc)?;
        write!(f, "Log loss:          {:.4}", evaluation.log_loss)
    }
}

/// Loads, encodes, splits, fits and evaluates in one pass.
///
/// Stops at the first failing stage; the error names the stage.
pub fn run_pipeline(config: &PipelineConfig) -> Result<Report, PipelineError> {
    info!("Loading imputed loans from {}", config.imputed_path.display());
    let table = load_data::<ImputedLoansLoader, _>(&config.imputed_path)?;

    let (raw_summary, raw_missing) = match &config.raw_path {
        Some(path) => {
            info!("Loading raw loans from {}", path.display());
            let raw = load_data::<RawLoansLoader, _>(path)?;
            (Some(describe_raw(&raw)), Some(missing_counts(&raw)))
        }
        None => (None, None),
    };

    let rate = positive_rate(&table);
    info!("{} loans, share not fully paid {:.4}", table.len(), rate);

    let mut encoder = OneHotEncoder::new().drop_first(config.drop_first).build();
    let encoded = encoder.fit_transform(&table)?;
    info!("Encoded {} features", encoded.n_features());

    let split = train_test_split(&encoded, config.test_fraction, config.seed)?;
    info!(
        "Split into {} train and {} test rows (seed {})",
        split.train.n_rows(),
        split.test.n_rows(),
        config.seed
    );

    let optimizer =
        NewtonRaphson::new().max_iter(config.max_iter).tolerance(config.tolerance);
    let mut model = LogisticRegression::new()
        .optimizer(optimizer)
        .inverse_regularization(config.inverse_regularization)
        .build();
    model.fit(&split.train.features, &split.train.labels)?;
    let coefficients = model.coefficients().ok_or(PipelineError::Fit(ModelError::NotFitted))?;
    debug!("Intercept {:.6}", coefficients.intercept);

    let probabilities =
        model.predict_proba(&split.test.features).map_err(PipelineError::Predict)?;
    let evaluation =
        evaluate(&probabilities, &split.test.labels, &split.train.labels, config.threshold)?;
    info!(
        "Accuracy {:.4}, baseline {:.4}, AUC {:.4}",
        evaluation.accuracy, evaluation.baseline_accuracy, evaluation.auc
    );

    Ok(Report {
        n_rows: table.len(),
        positive_rate: rate,
        purpose_counts: purpose_counts(&table),
        summary: describe(&table),
        raw_summary,
        missing_counts: raw_missing,
        n_train: split.train.n_rows(),
        n_test: split.test.n_rows(),
        feature_names: encoded.feature_names,
        coefficients,
        evaluation,
    })
}
