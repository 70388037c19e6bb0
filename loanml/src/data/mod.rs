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

pub mod csv;
pub mod error;
pub mod record;
pub mod summary;

pub use csv::{ImputedLoansLoader, RawLoansLoader};
pub use record::{LoanRecord, LoanTable, Purpose, RawLoanRecord, RawLoanTable};

/// A trait for loading loan files into in-memory tables.
///
/// Implementors read a file from a given path and return a table of parsed
/// rows. The trait is generic over the output and error types so the imputed
/// and raw variants of the dataset can share one entry point.
///
/// # Associated Types
/// - `Output`: The table produced by a successful load.
/// - `Error`: The error type returned by `load`, which must implement
///   `std::error::Error` and have a `'static` lifetime.
///
/// # Notes
/// - Row numbers in errors are 1-based and count data rows, not the header.
pub trait DataLoader {
    /// The table produced by the loader.
    type Output;

    /// The error type returned by the `load` method.
    type Error: std::error::Error + 'static;

    /// Loads a file into a table.
    ///
    /// # Parameters
    /// - `path`: The path to the data file, accepting any type that implements `AsRef<Path>`.
    fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self::Output, Self::Error>;
}

/// Loads data from a file using a specified `DataLoader` implementation.
///
/// # Type Parameters
/// - `T`: The type implementing `DataLoader`, determining the specific loading behavior,
///   output table and error type.
/// - `P`: The path type, constrained to implement `AsRef<Path>`.
///
/// # Example
/// ```no_run
/// use loanml::data::{load_data, ImputedLoansLoader};
///
/// let table = load_data::<ImputedLoansLoader, _>("loan_data_imputed.csv")?;
/// println!("{} loans", table.len());
/// # Ok::<(), loanml::data::error::DataError>(())
/// ```
pub fn load_data<T: DataLoader, P: AsRef<std::path::Path>>(path: P) -> Result<T::Output, T::Error> {
    T::load(path)
}
