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

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use log::{debug, info};

use super::error::{CsvError, DataError, RowFault};
use super::record::{LoanRecord, LoanTable, RawLoanRecord, RawLoanTable, COLUMNS};
use crate::data::DataLoader;

/// Loads the imputed file. Every value must be present.
pub struct ImputedLoansLoader;

/// Loads the raw file. The imputable columns may be missing.
pub struct RawLoansLoader;

/// Header positions of the required columns.
struct ColumnIndex {
    positions: HashMap<&'static str, usize>,
    width: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self, CsvError> {
        let mut positions = HashMap::with_capacity(COLUMNS.len());
        for column in COLUMNS {
            let position = headers
                .iter()
                .position(|h| h.trim() == column)
                .ok_or(CsvError::MissingColumn(column))?;
            positions.insert(column, position);
        }
        Ok(ColumnIndex { positions, width: headers.len() })
    }

    fn field<'r>(&self, record: &'r StringRecord, column: &'static str) -> &'r str {
        // Width is checked before any field is read.
        self.positions.get(column).and_then(|&i| record.get(i)).map(str::trim).unwrap_or("")
    }
}

fn is_missing(value: &str) -> bool {
    value.is_empty() || value == "NA" || value.eq_ignore_ascii_case("nan")
}

fn parse_optional_f64(value: &str, column: &'static str) -> Result<Option<f64>, RowFault> {
    if is_missing(value) {
        return Ok(None);
    }
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(RowFault::Unparsable { column, value: value.to_string() }),
    }
}

fn parse_f64(value: &str, column: &'static str) -> Result<f64, RowFault> {
    parse_optional_f64(value, column)?.ok_or(RowFault::MissingValue { column })
}

fn parse_i64(value: &str, column: &'static str) -> Result<i64, RowFault> {
    if is_missing(value) {
        return Err(RowFault::MissingValue { column });
    }
    value.parse::<i64>().map_err(|_| RowFault::Unparsable { column, value: value.to_string() })
}

fn parse_binary(value: &str, column: &'static str) -> Result<u8, RowFault> {
    match parse_i64(value, column)? {
        0 => Ok(0),
        1 => Ok(1),
        _ => Err(RowFault::NotBinary { column, value: value.to_string() }),
    }
}

fn parse_row(record: &StringRecord, index: &ColumnIndex) -> Result<RawLoanRecord, RowFault> {
    if record.len() != index.width {
        return Err(RowFault::ColumnCount { actual: record.len(), expected: index.width });
    }
    let f = |column: &'static str| index.field(record, column);

    let purpose = f("purpose");
    if is_missing(purpose) {
        return Err(RowFault::MissingValue { column: "purpose" });
    }

    Ok(RawLoanRecord {
        credit_policy: parse_binary(f("credit.policy"), "credit.policy")?,
        purpose: purpose.to_string(),
        int_rate: parse_f64(f("int.rate"), "int.rate")?,
        installment: parse_f64(f("installment"), "installment")?,
        log_annual_inc: parse_optional_f64(f("log.annual.inc"), "log.annual.inc")?,
        dti: parse_f64(f("dti"), "dti")?,
        fico: parse_i64(f("fico"), "fico")?,
        days_with_cr_line: parse_optional_f64(f("days.with.cr.line"), "days.with.cr.line")?,
        revol_bal: parse_i64(f("revol.bal"), "revol.bal")?,
        revol_util: parse_optional_f64(f("revol.util"), "revol.util")?,
        inq_last_6mths: parse_optional_f64(f("inq.last.6mths"), "inq.last.6mths")?,
        delinq_2yrs: parse_optional_f64(f("delinq.2yrs"), "delinq.2yrs")?,
        pub_rec: parse_optional_f64(f("pub.rec"), "pub.rec")?,
        not_fully_paid: parse_binary(f("not.fully.paid"), "not.fully.paid")?,
    })
}

fn read_raw_records<P: AsRef<Path>>(path: P) -> Result<Vec<RawLoanRecord>, CsvError> {
    let path = path.as_ref();
    debug!("Reading loan records from {:?}", path);
    let file = File::open(path)?;
    let mut rdr = ReaderBuilder::new().has_headers(true).flexible(true).from_reader(file);

    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Err(CsvError::EmptyFile);
    }
    let index = ColumnIndex::from_headers(&headers)?;

    let mut records = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row = parse_row(&record, &index)
            .map_err(|fault| CsvError::MalformedRow { row: i + 1, fault })?;
        records.push(row);
    }

    if records.is_empty() {
        return Err(CsvError::EmptyFile);
    }
    Ok(records)
}

impl DataLoader for ImputedLoansLoader {
    type Output = LoanTable;
    type Error = DataError;

    fn load<P: AsRef<Path>>(path: P) -> Result<LoanTable, DataError> {
        let raw = read_raw_records(path)?;
        let records = raw
            .into_iter()
            .enumerate()
            .map(|(i, r)| {
                r.complete().map_err(|column| CsvError::MalformedRow {
                    row: i + 1,
                    fault: RowFault::MissingValue { column },
                })
            })
            .collect::<Result<Vec<LoanRecord>, CsvError>>()?;
        info!("Loaded {} imputed loan records", records.len());
        Ok(LoanTable::new(records))
    }
}

impl DataLoader for RawLoansLoader {
    type Output = RawLoanTable;
    type Error = DataError;

    fn load<P: AsRef<Path>>(path: P) -> Result<RawLoanTable, DataError> {
        let records = read_raw_records(path)?;
        info!("Loaded {} raw loan records", records.len());
        Ok(RawLoanTable::new(records))
    }
}
