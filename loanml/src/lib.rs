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

//! Loan default analysis on the LendingClub loan data.
//!
//! The crate loads the raw and imputed loan files, one-hot encodes the loan
//! purpose, splits rows with a seeded permutation, fits a logistic regression
//! and scores it on the held-out rows. [`pipeline::run_pipeline`] runs the
//! whole batch and returns a printable [`pipeline::Report`].

pub mod algorithms;
pub mod data;
pub mod encoding;
pub mod errors;
pub mod losses;
pub mod metrics;
pub mod optimizers;
pub mod pipeline;
pub mod scalers;
pub mod split;

pub use algorithms::LogisticRegression;
pub use data::{load_data, DataLoader, ImputedLoansLoader, LoanTable, Purpose, RawLoansLoader};
pub use encoding::{EncodedTable, OneHotEncoder};
pub use metrics::{evaluate, ConfusionMatrix, Evaluation};
pub use pipeline::{run_pipeline, PipelineConfig, Report};
pub use split::{train_test_split, Split};
