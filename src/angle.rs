// Heading wraparound for controllers that track an angle on a circle
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

use num_traits::float::FloatCore;

use crate::constant;

/// Selects how the controller measures the distance between two values.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ErrorMode {
    /// Plain subtraction on the real line.
    #[default]
    Linear,

    /// Shortest signed difference on a circle of 360 degrees. Used for compass headings, where
    /// 179° and -179° are two degrees apart, not 358.
    Heading,
}

impl ErrorMode {
    /// Returns `lhs - rhs` measured according to this mode.
    pub fn difference<T: FloatCore>(self, lhs: T, rhs: T) -> T {
        match self {
            ErrorMode::Linear => lhs - rhs,
            ErrorMode::Heading => wrap_heading(lhs - rhs),
        }
    }
}

/// Maps an angular difference in degrees into the half-open interval (-180°, 180°].
///
/// Non-finite inputs are returned unchanged.
pub fn wrap_heading<T: FloatCore>(degrees: T) -> T {
    if !degrees.is_finite() {
        return degrees;
    }
    let full = constant::<T>(360.0);
    let half = constant::<T>(180.0);

    // `%` keeps the sign of the dividend, so the result lies in (-360, 360)
    let rem = degrees % full;
    if rem > half {
        rem - full
    } else if rem <= -half {
        rem + full
    } else {
        rem
    }
}
