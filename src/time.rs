// Defines a trait for tick-duration sources and provides several implementations
// Copyright © 2025 Hs293Go
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included
// in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES
// OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
// IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT,
// TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE
// OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use core::fmt::Debug;
use core::time::Duration;

use num_traits::float::FloatCore;

/// Smallest tick duration, in seconds, the controller will divide by.
///
/// A non-positive or NaN tick duration is replaced by this value before the integral and
/// derivative terms are evaluated.
pub const MIN_TIMESTEP: f64 = 1e-6;

/// A trait for values that describe the duration of one fixed simulation tick.
///
/// The host scheduler owns the clock; the controller only ever sees the length of the step it is
/// being advanced by. Implement this for your scheduler's step type to pass it straight into
/// `respond`.
pub trait Timestep: Copy + Debug {
    /// Returns the tick duration in seconds, converted to the controller's scalar type
    #[must_use]
    fn secs<T: FloatCore>(&self) -> T;
}

/// A tick duration in seconds, as reported by most physics engines' fixed-step hooks.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Seconds(pub f64);

impl Timestep for Seconds {
    fn secs<T: FloatCore>(&self) -> T {
        T::from(self.0).unwrap_or_else(T::nan)
    }
}

/// A tick duration in whole milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Millis(pub u64);

impl Timestep for Millis {
    fn secs<T: FloatCore>(&self) -> T {
        Duration::from_millis(self.0).secs()
    }
}

/// A tick duration in whole microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Micros(pub u64);

impl Timestep for Micros {
    fn secs<T: FloatCore>(&self) -> T {
        Duration::from_micros(self.0).secs()
    }
}

impl Timestep for Duration {
    fn secs<T: FloatCore>(&self) -> T {
        T::from(self.as_secs_f64()).unwrap_or_else(T::nan)
    }
}

/// Reads the tick duration from `step`, substituting [`MIN_TIMESTEP`] for anything that would make
/// the integral or derivative terms ill-defined.
pub(crate) fn sanitize<T: FloatCore, S: Timestep>(step: S) -> T {
    let dt: T = step.secs();
    if dt > T::zero() && dt.is_finite() {
        return dt;
    }
    log::warn!(
        "Rejected tick duration {:?}; substituting {} s",
        step,
        MIN_TIMESTEP
    );
    T::from(MIN_TIMESTEP).unwrap_or_else(T::epsilon)
}
