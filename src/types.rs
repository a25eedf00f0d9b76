//! Value types shared by the windowing and encoding code

use ndarray::{Array, ArrayBase, Data, Dimension};
use num_traits::AsPrimitive;
use std::fmt;
use thiserror::Error;

/// Rejected window bounds
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum WindowError {
    #[error("window lower bound {low} must be below upper bound {high}")]
    Inverted { low: f32, high: f32 },

    #[error("window bounds must be finite (got {low}, {high})")]
    NonFinite { low: f32, high: f32 },

    #[error("window [{low}, {high}] is too wide to represent")]
    Overflow { low: f32, high: f32 },
}

/// Intensity clipping range `[low, high]` with `low < high`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    low: f32,
    high: f32,
}

impl Window {
    /// Wide window, (-1024, 1024) HU
    pub const WIDE: Self = Self { low: -1024.0, high: 1024.0 };
    /// Mediastinum (chest) window, (-135, 215) HU
    pub const MEDIASTINUM: Self = Self { low: -135.0, high: 215.0 };
    /// Brain window, (0, 80) HU
    pub const BRAIN: Self = Self { low: 0.0, high: 80.0 };

    /// CT presets in output channel order
    pub const CT_PRESETS: [Self; 3] = [Self::WIDE, Self::MEDIASTINUM, Self::BRAIN];

    /// # Errors
    ///
    /// Returns an error if either bound is not finite, if `low >= high`, or
    /// if `high - low` overflows `f32`
    pub fn new(low: f32, high: f32) -> Result<Self, WindowError> {
        if !low.is_finite() || !high.is_finite() {
            return Err(WindowError::NonFinite { low, high });
        }
        if low >= high {
            return Err(WindowError::Inverted { low, high });
        }
        if !(high - low).is_finite() {
            return Err(WindowError::Overflow { low, high });
        }
        Ok(Self { low, high })
    }

    /// Build from a DICOM-style center/width pair
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting bounds are rejected by [`Window::new`]
    pub fn from_center_width(center: f32, width: f32) -> Result<Self, WindowError> {
        let half = width / 2.0;
        Self::new(center - half, center + half)
    }

    #[inline]
    #[must_use]
    pub fn low(&self) -> f32 {
        self.low
    }

    #[inline]
    #[must_use]
    pub fn high(&self) -> f32 {
        self.high
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> f32 {
        self.high - self.low
    }

    #[inline]
    #[must_use]
    pub fn center(&self) -> f32 {
        (self.low + self.high) / 2.0
    }

    /// Clip `value` into the window and map it linearly onto `[0.0, 255.0]`
    #[inline(always)]
    #[must_use]
    // Hot path: called for every sample
    pub fn scale(&self, value: f32) -> f32 {
        (value.clamp(self.low, self.high) - self.low) / (self.high - self.low) * 255.0
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{low}, {high}]", low = self.low, high = self.high)
    }
}

/// Rescale parameters for converting stored values to real units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RescaleParams {
    pub slope: f64,
    pub intercept: f64,
}

impl RescaleParams {
    #[must_use]
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    #[inline(always)]
    #[must_use]
    pub fn apply(&self, value: f64) -> f64 {
        value.mul_add(self.slope, self.intercept)
    }

    #[inline]
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.slope == 1.0 && self.intercept == 0.0
    }

    /// Apply the rescale to every element, producing `f32` real-unit values
    #[must_use]
    pub fn rescale<A, S, D>(&self, stored: &ArrayBase<S, D>) -> Array<f32, D>
    where
        A: AsPrimitive<f64>,
        S: Data<Elem = A>,
        D: Dimension,
    {
        stored.mapv(|v| self.apply(v.as_()) as f32)
    }
}

impl Default for RescaleParams {
    fn default() -> Self {
        Self {
            slope: 1.0,
            intercept: 0.0,
        }
    }
}

impl fmt::Display for RescaleParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "slope={slope}, intercept={intercept}",
            slope = self.slope,
            intercept = self.intercept
        )
    }
}
