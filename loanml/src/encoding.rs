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

use std::collections::BTreeSet;

use log::debug;
use ndarray::{Array1, Array2, Axis};

use crate::data::record::{LoanTable, NUMERIC_FEATURES, PURPOSE_COLUMN};
use crate::data::Purpose;
use crate::errors::EncodingError;

/// A numeric design matrix with its labels and column names.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedTable {
    pub feature_names: Vec<String>,
    pub features: Array2<f64>,
    pub labels: Array1<f64>,
}

impl EncodedTable {
    pub fn n_rows(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Copies the given rows, in order, into a new table.
    pub fn select_rows(&self, indices: &[usize]) -> EncodedTable {
        EncodedTable {
            feature_names: self.feature_names.clone(),
            features: self.features.select(Axis(0), indices),
            labels: self.labels.select(Axis(0), indices),
        }
    }
}

pub struct OneHotEncoderBuilder {
    prefix: String,
    drop_first: bool,
}

impl OneHotEncoderBuilder {
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn drop_first(mut self, drop_first: bool) -> Self {
        self.drop_first = drop_first;
        self
    }

    pub fn build(self) -> OneHotEncoder {
        OneHotEncoder { prefix: self.prefix, drop_first: self.drop_first, categories: Vec::new() }
    }
}

/// Replaces the `purpose` column with one indicator column per observed category.
///
/// Indicator columns are appended after the numeric covariates in lexicographic
/// category order and named `<prefix>_<category>`.
pub struct OneHotEncoder {
    prefix: String,
    drop_first: bool,
    categories: Vec<Purpose>,
}

impl OneHotEncoder {
    pub fn new() -> OneHotEncoderBuilder {
        OneHotEncoderBuilder { prefix: PURPOSE_COLUMN.to_string(), drop_first: false }
    }

    /// Categories seen by the last `fit_transform`, in column order.
    pub fn categories(&self) -> &[Purpose] {
        &self.categories
    }

    pub fn fit_transform(&mut self, table: &LoanTable) -> Result<EncodedTable, EncodingError> {
        if table.is_empty() {
            return Err(EncodingError::EmptyTable);
        }

        let purposes = table
            .records()
            .iter()
            .enumerate()
            .map(|(i, r)| {
                r.purpose.parse::<Purpose>().map_err(|e| EncodingError::UnknownCategory {
                    row: i + 1,
                    column: PURPOSE_COLUMN,
                    value: e.0,
                })
            })
            .collect::<Result<Vec<Purpose>, EncodingError>>()?;

        let observed: BTreeSet<Purpose> = purposes.iter().copied().collect();
        let skip = usize::from(self.drop_first);
        self.categories = observed.into_iter().skip(skip).collect();

        let mut feature_names: Vec<String> = NUMERIC_FEATURES.iter().map(|s| s.to_string()).collect();
        feature_names
            .extend(self.categories.iter().map(|c| format!("{}_{}", self.prefix, c.as_str())));

        let n_rows = table.len();
        let n_cols = feature_names.len();
        let mut features = Array2::zeros((n_rows, n_cols));
        for (i, (record, purpose)) in table.records().iter().zip(&purposes).enumerate() {
            for (j, value) in record.numeric_features().into_iter().enumerate() {
                features[[i, j]] = value;
            }
            if let Some(k) = self.categories.iter().position(|c| c == purpose) {
                features[[i, NUMERIC_FEATURES.len() + k]] = 1.0;
            }
        }
        let labels = table.records().iter().map(|r| r.label()).collect::<Array1<f64>>();

        debug!(
            "Encoded {} rows into {} columns ({} indicator columns)",
            n_rows,
            n_cols,
            self.categories.len()
        );
        Ok(EncodedTable { feature_names, features, labels })
    }
}
