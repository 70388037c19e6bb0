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
use std::str::FromStr;

use super::error::ParsePurposeError;

/// Name of the binary label column.
pub const LABEL_COLUMN: &str = "not.fully.paid";

/// Name of the categorical column expanded by the encoder.
pub const PURPOSE_COLUMN: &str = "purpose";

/// Numeric covariates in file order. The encoded feature matrix keeps this order.
pub const NUMERIC_FEATURES: [&str; 12] = [
    "credit.policy",
    "int.rate",
    "installment",
    "log.annual.inc",
    "dti",
    "fico",
    "days.with.cr.line",
    "revol.bal",
    "revol.util",
    "inq.last.6mths",
    "delinq.2yrs",
    "pub.rec",
];

/// Columns that may be missing in the raw (non-imputed) file.
pub const IMPUTABLE_COLUMNS: [&str; 6] =
    ["log.annual.inc", "days.with.cr.line", "revol.util", "inq.last.6mths", "delinq.2yrs", "pub.rec"];

/// Every column a loan file must carry, in file order.
pub const COLUMNS: [&str; 14] = [
    "credit.policy",
    PURPOSE_COLUMN,
    "int.rate",
    "installment",
    "log.annual.inc",
    "dti",
    "fico",
    "days.with.cr.line",
    "revol.bal",
    "revol.util",
    "inq.last.6mths",
    "delinq.2yrs",
    "pub.rec",
    LABEL_COLUMN,
];

/// The stated purpose of a loan.
///
/// Variants are declared in lexicographic order of their names so the derived
/// `Ord` matches string ordering, which fixes the order of indicator columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Purpose {
    AllOther,
    CreditCard,
    DebtConsolidation,
    Educational,
    HomeImprovement,
    MajorPurchase,
    SmallBusiness,
}

impl Purpose {
    pub const ALL: [Purpose; 7] = [
        Purpose::AllOther,
        Purpose::CreditCard,
        Purpose::DebtConsolidation,
        Purpose::Educational,
        Purpose::HomeImprovement,
        Purpose::MajorPurchase,
        Purpose::SmallBusiness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::AllOther => "all_other",
            Purpose::CreditCard => "credit_card",
            Purpose::DebtConsolidation => "debt_consolidation",
            Purpose::Educational => "educational",
            Purpose::HomeImprovement => "home_improvement",
            Purpose::MajorPurchase => "major_purchase",
            Purpose::SmallBusiness => "small_business",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Purpose {
    type Err = ParsePurposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Purpose::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ParsePurposeError(s.to_string()))
    }
}

/// One fully populated loan row.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanRecord {
    pub credit_policy: u8,
    pub purpose: String,
    pub int_rate: f64,
    pub installment: f64,
    pub log_annual_inc: f64,
    pub dti: f64,
    pub fico: i64,
    pub days_with_cr_line: f64,
    pub revol_bal: i64,
    pub revol_util: f64,
    pub inq_last_6mths: f64,
    pub delinq_2yrs: f64,
    pub pub_rec: f64,
    pub not_fully_paid: u8,
}

impl LoanRecord {
    /// Numeric covariates in `NUMERIC_FEATURES` order.
    pub fn numeric_features(&self) -> [f64; 12] {
        [
            self.credit_policy as f64,
            self.int_rate,
            self.installment,
            self.log_annual_inc,
            self.dti,
            self.fico as f64,
            self.days_with_cr_line,
            self.revol_bal as f64,
            self.revol_util,
            self.inq_last_6mths,
            self.delinq_2yrs,
            self.pub_rec,
        ]
    }

    pub fn label(&self) -> f64 {
        self.not_fully_paid as f64
    }
}

/// A loan row as it appears in the raw file, before imputation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLoanRecord {
    pub credit_policy: u8,
    pub purpose: String,
    pub int_rate: f64,
    pub installment: f64,
    pub log_annual_inc: Option<f64>,
    pub dti: f64,
    pub fico: i64,
    pub days_with_cr_line: Option<f64>,
    pub revol_bal: i64,
    pub revol_util: Option<f64>,
    pub inq_last_6mths: Option<f64>,
    pub delinq_2yrs: Option<f64>,
    pub pub_rec: Option<f64>,
    pub not_fully_paid: u8,
}

impl RawLoanRecord {
    /// Numeric covariates in `NUMERIC_FEATURES` order, `None` where missing.
    pub fn numeric_values(&self) -> [Option<f64>; 12] {
        [
            Some(self.credit_policy as f64),
            Some(self.int_rate),
            Some(self.installment),
            self.log_annual_inc,
            Some(self.dti),
            Some(self.fico as f64),
            self.days_with_cr_line,
            Some(self.revol_bal as f64),
            self.revol_util,
            self.inq_last_6mths,
            self.delinq_2yrs,
            self.pub_rec,
        ]
    }

    /// Converts to a complete record, naming the first missing column otherwise.
    pub fn complete(self) -> Result<LoanRecord, &'static str> {
        Ok(LoanRecord {
            credit_policy: self.credit_policy,
            purpose: self.purpose,
            int_rate: self.int_rate,
            installment: self.installment,
            log_annual_inc: self.log_annual_inc.ok_or("log.annual.inc")?,
            dti: self.dti,
            fico: self.fico,
            days_with_cr_line: self.days_with_cr_line.ok_or("days.with.cr.line")?,
            revol_bal: self.revol_bal,
            revol_util: self.revol_util.ok_or("revol.util")?,
            inq_last_6mths: self.inq_last_6mths.ok_or("inq.last.6mths")?,
            delinq_2yrs: self.delinq_2yrs.ok_or("delinq.2yrs")?,
            pub_rec: self.pub_rec.ok_or("pub.rec")?,
            not_fully_paid: self.not_fully_paid,
        })
    }
}

/// Rows of the imputed file. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoanTable {
    records: Vec<LoanRecord>,
}

impl LoanTable {
    pub fn new(records: Vec<LoanRecord>) -> Self {
        LoanTable { records }
    }

    pub fn records(&self) -> &[LoanRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Rows of the raw file, used for exploratory statistics only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawLoanTable {
    records: Vec<RawLoanRecord>,
}

impl RawLoanTable {
    pub fn new(records: Vec<RawLoanRecord>) -> Self {
        RawLoanTable { records }
    }

    pub fn records(&self) -> &[RawLoanRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purpose_round_trips_names() {
        for purpose in Purpose::ALL {
            assert_eq!(purpose.as_str().parse::<Purpose>().unwrap(), purpose);
        }
    }

    #[test]
    fn test_purpose_rejects_unknown() {
        let err = "vacation".parse::<Purpose>().unwrap_err();
        assert_eq!(err.0, "vacation");
    }

    #[test]
    fn test_purpose_order_is_lexicographic() {
        let mut by_name: Vec<&str> = Purpose::ALL.iter().map(|p| p.as_str()).collect();
        by_name.sort();
        let by_ord: Vec<&str> = Purpose::ALL.iter().map(|p| p.as_str()).collect();
        assert_eq!(by_name, by_ord);
    }

    #[test]
    fn test_complete_reports_missing_column() {
        let raw = RawLoanRecord {
            credit_policy: 1,
            purpose: "credit_card".to_string(),
            int_rate: 0.1,
            installment: 100.0,
            log_annual_inc: Some(11.0),
            dti: 10.0,
            fico: 700,
            days_with_cr_line: Some(4000.0),
            revol_bal: 5000,
            revol_util: None,
            inq_last_6mths: Some(0.0),
            delinq_2yrs: Some(0.0),
            pub_rec: Some(0.0),
            not_fully_paid: 0,
        };
        assert_eq!(raw.complete().unwrap_err(), "revol.util");
    }
}
