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

use ndarray::{Array1, Array2, Axis};
use num_traits::{Float, FromPrimitive};

use crate::errors::ScalerError;

pub trait Scaler<T: Float> {
    fn fit(&mut self, x: &Array2<T>) -> Result<(), ScalerError>;

    fn transform(&self, x: &Array2<T>) -> Result<Array2<T>, ScalerError>;

    fn fit_transform(&mut self, x: &Array2<T>) -> Result<Array2<T>, ScalerError> {
        self.fit(x)?;
        self.transform(x)
    }
}

/// Centers each column on its mean and divides by its population standard deviation.
///
/// Constant columns keep a scale of one so they map to zero instead of `NaN`.
#[derive(Debug, Clone)]
pub struct StandardScaler<T: Float> {
    mean: Option<Array1<T>>,
    std: Option<Array1<T>>,
}

impl<T: Float + FromPrimitive> StandardScaler<T> {
    pub fn new() -> Self {
        StandardScaler { mean: None, std: None }
    }

    pub fn mean(&self) -> Option<&Array1<T>> {
        self.mean.as_ref()
    }

    pub fn std(&self) -> Option<&Array1<T>> {
        self.std.as_ref()
    }
}

impl<T: Float + FromPrimitive> Default for StandardScaler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float + FromPrimitive> Scaler<T> for StandardScaler<T> {
    fn fit(&mut self, x: &Array2<T>) -> Result<(), ScalerError> {
        let mean = x.mean_axis(Axis(0)).ok_or(ScalerError::EmptyInput)?;
        if x.ncols() == 0 {
            return Err(ScalerError::EmptyInput);
        }
        let std = x.std_axis(Axis(0), T::zero());
        self.mean = Some(mean);
        self.std = Some(std.mapv(|s| if s == T::zero() { T::one() } else { s }));
        Ok(())
    }

    fn transform(&self, x: &Array2<T>) -> Result<Array2<T>, ScalerError> {
        let mean = self.mean.as_ref().ok_or(ScalerError::NotFitted)?;
        let std = self.std.as_ref().ok_or(ScalerError::NotFitted)?;
        if x.ncols() != mean.len() {
            return Err(ScalerError::DimensionMismatch { expected: mean.len(), actual: x.ncols() });
        }
        Ok((x - mean) / std)
    }
}
