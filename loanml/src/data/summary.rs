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

use super::record::{LoanTable, RawLoanTable, IMPUTABLE_COLUMNS, LABEL_COLUMN, NUMERIC_FEATURES};

/// Descriptive statistics of one numeric column.
///
/// Statistics are computed over present values only. A column with no present
/// values reports `NaN` for every statistic; `std` needs at least two values.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub missing: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnSummary {
    fn from_values(name: &str, values: impl Iterator<Item = Option<f64>>) -> Self {
        let mut present = Vec::new();
        let mut missing = 0;
        for value in values {
            match value {
                Some(v) => present.push(v),
                None => missing += 1,
            }
        }
        present.sort_by(f64::total_cmp);

        let count = present.len();
        let mean =
            if count == 0 { f64::NAN } else { present.iter().sum::<f64>() / count as f64 };
        let std = if count < 2 {
            f64::NAN
        } else {
            let ss = present.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
            (ss / (count - 1) as f64).sqrt()
        };

        ColumnSummary {
            name: name.to_string(),
            count,
            missing,
            mean,
            std,
            min: present.first().copied().unwrap_or(f64::NAN),
            q25: quantile(&present, 0.25),
            median: quantile(&present, 0.5),
            q75: quantile(&present, 0.75),
            max: present.last().copied().unwrap_or(f64::NAN),
        }
    }
}

impl fmt::Display for ColumnSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<18} {:>6} {:>6} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4}",
            self.name,
            self.count,
            self.missing,
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.median,
            self.q75,
            self.max
        )
    }
}

/// Linear-interpolation quantile of sorted values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
        }
    }
}

/// Summarises the 12 numeric covariates and the label of the imputed table.
pub fn describe(table: &LoanTable) -> Vec<ColumnSummary> {
    let mut summaries: Vec<ColumnSummary> = NUMERIC_FEATURES
        .iter()
        .enumerate()
        .map(|(j, name)| {
            ColumnSummary::from_values(
                name,
                table.records().iter().map(|r| Some(r.numeric_features()[j])),
            )
        })
        .collect();
    summaries.push(ColumnSummary::from_values(
        LABEL_COLUMN,
        table.records().iter().map(|r| Some(r.label())),
    ));
    summaries
}

/// Summarises the raw table, counting missing values per column.
pub fn describe_raw(table: &RawLoanTable) -> Vec<ColumnSummary> {
    let mut summaries: Vec<ColumnSummary> = NUMERIC_FEATURES
        .iter()
        .enumerate()
        .map(|(j, name)| {
            ColumnSummary::from_values(name, table.records().iter().map(|r| r.numeric_values()[j]))
        })
        .collect();
    summaries.push(ColumnSummary::from_values(
        LABEL_COLUMN,
        table.records().iter().map(|r| Some(r.not_fully_paid as f64)),
    ));
    summaries
}

/// Missing-value count for each imputable column of the raw table.
pub fn missing_counts(table: &RawLoanTable) -> BTreeMap<&'static str, usize> {
    let mut counts: BTreeMap<&'static str, usize> =
        IMPUTABLE_COLUMNS.iter().map(|&c| (c, 0)).collect();
    for record in table.records() {
        let values = record.numeric_values();
        for (j, &name) in NUMERIC_FEATURES.iter().enumerate() {
            if values[j].is_none() {
                *counts.entry(name).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// Share of loans with `not.fully.paid = 1`. `NaN` for an empty table.
pub fn positive_rate(table: &LoanTable) -> f64 {
    if table.is_empty() {
        return f64::NAN;
    }
    let positives = table.records().iter().filter(|r| r.not_fully_paid == 1).count();
    positives as f64 / table.len() as f64
}

/// Value counts of `purpose`, keyed by the raw string.
pub fn purpose_counts(table: &LoanTable) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in table.records() {
        *counts.entry(record.purpose.clone()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::{LoanRecord, RawLoanRecord};

    fn record(purpose: &str, fico: i64, label: u8) -> LoanRecord {
        LoanRecord {
            credit_policy: 1,
            purpose: purpose.to_string(),
            int_rate: 0.1,
            installment: 100.0,
            log_annual_inc: 11.0,
            dti: 10.0,
            fico,
            days_with_cr_line: 4000.0,
            revol_bal: 5000,
            revol_util: 40.0,
            inq_last_6mths: 1.0,
            delinq_2yrs: 0.0,
            pub_rec: 0.0,
            not_fully_paid: label,
        }
    }

    #[test]
    fn test_quantile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert!((quantile(&values, 0.25) - 1.75).abs() < 1e-12);
        assert!((quantile(&values, 0.5) - 2.5).abs() < 1e-12);
        assert!((quantile(&values, 0.75) - 3.25).abs() < 1e-12);
        assert!(quantile(&[], 0.5).is_nan());
    }

    #[test]
    fn test_describe_fico_column() {
        let table = LoanTable::new(vec![
            record("credit_card", 700, 0),
            record("credit_card", 720, 1),
            record("educational", 740, 0),
        ]);
        let summaries = describe(&table);
        assert_eq!(summaries.len(), 13);

        let fico = summaries.iter().find(|s| s.name == "fico").unwrap();
        assert_eq!(fico.count, 3);
        assert_eq!(fico.missing, 0);
        assert!((fico.mean - 720.0).abs() < 1e-12);
        assert!((fico.std - 20.0).abs() < 1e-12);
        assert_eq!(fico.min, 700.0);
        assert_eq!(fico.median, 720.0);
        assert_eq!(fico.max, 740.0);

        let label = summaries.last().unwrap();
        assert_eq!(label.name, LABEL_COLUMN);
        assert!((label.mean - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_positive_rate_and_purpose_counts() {
        let table = LoanTable::new(vec![
            record("credit_card", 700, 0),
            record("credit_card", 720, 1),
            record("educational", 740, 0),
            record("all_other", 690, 0),
        ]);
        assert!((positive_rate(&table) - 0.25).abs() < 1e-12);

        let counts = purpose_counts(&table);
        let keys: Vec<&str> = counts.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["all_other", "credit_card", "educational"]);
        assert_eq!(counts["credit_card"], 2);
    }

    #[test]
    fn test_positive_rate_empty_table() {
        assert!(positive_rate(&LoanTable::default()).is_nan());
    }

    #[test]
    fn test_raw_missing_counts() {
        let complete = record("credit_card", 700, 0);
        let raw = |revol_util: Option<f64>, pub_rec: Option<f64>| RawLoanRecord {
            credit_policy: complete.credit_policy,
            purpose: complete.purpose.clone(),
            int_rate: complete.int_rate,
            installment: complete.installment,
            log_annual_inc: Some(complete.log_annual_inc),
            dti: complete.dti,
            fico: complete.fico,
            days_with_cr_line: Some(complete.days_with_cr_line),
            revol_bal: complete.revol_bal,
            revol_util,
            inq_last_6mths: Some(complete.inq_last_6mths),
            delinq_2yrs: Some(complete.delinq_2yrs),
            pub_rec,
            not_fully_paid: complete.not_fully_paid,
        };
        let table = RawLoanTable::new(vec![
            raw(None, Some(0.0)),
            raw(None, None),
            raw(Some(12.0), Some(1.0)),
        ]);

        let counts = missing_counts(&table);
        assert_eq!(counts.len(), 6);
        assert_eq!(counts["revol.util"], 2);
        assert_eq!(counts["pub.rec"], 1);
        assert_eq!(counts["log.annual.inc"], 0);

        let summaries = describe_raw(&table);
        let revol_util = summaries.iter().find(|s| s.name == "revol.util").unwrap();
        assert_eq!(revol_util.count, 1);
        assert_eq!(revol_util.missing, 2);
        assert_eq!(revol_util.mean, 12.0);
        assert!(revol_util.std.is_nan());
    }
}
