// Fixed-timestep PID controller with setpoint easing and anti-windup
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

use num_traits::clamp;
use num_traits::float::FloatCore;

use crate::angle::ErrorMode;
use crate::constant;
use crate::time::{self, Timestep};

/// Lower bound applied to `scale` and `easing` on assignment.
pub const MIN_SHAPING: f64 = 0.01;

/// Fraction of the tick duration by which the easing increment grows per call. At `easing = 1`
/// the ramp reaches full rate after about one hundred ticks.
pub const EASING_RATE: f64 = 0.01;

/// Number of scalars in a full positional parameter bundle.
pub const PARAMETER_COUNT: usize = 9;

/// Number of scalars in the shortest positional bundle accepted; `scale` and `easing` default to 1.
pub const MIN_PARAMETER_COUNT: usize = 7;

/// Errors produced when a configuration value is rejected.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum PidConfigError {
    /// The proportional gain is NaN or infinite.
    #[cfg_attr(feature = "std", error("Proportional gain must be finite"))]
    InvalidProportionalGain,

    /// The integral gain is NaN or infinite.
    #[cfg_attr(feature = "std", error("Integral gain must be finite"))]
    InvalidIntegralGain,

    /// The derivative gain is NaN or infinite.
    #[cfg_attr(feature = "std", error("Derivative gain must be finite"))]
    InvalidDerivativeGain,

    /// The error scale is NaN or infinite.
    #[cfg_attr(feature = "std", error("Scale must be finite"))]
    InvalidScale,

    /// The setpoint easing rate is NaN or infinite.
    #[cfg_attr(feature = "std", error("Easing must be finite"))]
    InvalidEasing,

    /// The derivative smoothing factor lies outside [0, 1].
    #[cfg_attr(feature = "std", error("Rolling factor must lie within [0, 1]"))]
    InvalidRollingFactor,

    /// The output limits are NaN or the lower limit exceeds the upper limit.
    #[cfg_attr(
        feature = "std",
        error("Output limits must be ordered and not NaN")
    )]
    InvalidOutputLimits,

    /// The input limits are NaN or the lower limit exceeds the upper limit.
    #[cfg_attr(feature = "std", error("Input limits must be ordered and not NaN"))]
    InvalidInputLimits,

    /// The integral clamp bounds are NaN or the lower bound exceeds the upper bound.
    #[cfg_attr(
        feature = "std",
        error("Integral limits must be ordered and not NaN")
    )]
    InvalidIntegralLimits,

    /// A positional parameter bundle had fewer than seven or more than nine entries.
    #[cfg_attr(
        feature = "std",
        error("Parameter bundles must hold between seven and nine values")
    )]
    InvalidParameterCount,
}

#[cfg(not(feature = "std"))]
impl core::fmt::Display for PidConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            PidConfigError::InvalidProportionalGain => "Proportional gain must be finite",
            PidConfigError::InvalidIntegralGain => "Integral gain must be finite",
            PidConfigError::InvalidDerivativeGain => "Derivative gain must be finite",
            PidConfigError::InvalidScale => "Scale must be finite",
            PidConfigError::InvalidEasing => "Easing must be finite",
            PidConfigError::InvalidRollingFactor => "Rolling factor must lie within [0, 1]",
            PidConfigError::InvalidOutputLimits => "Output limits must be ordered and not NaN",
            PidConfigError::InvalidInputLimits => "Input limits must be ordered and not NaN",
            PidConfigError::InvalidIntegralLimits => "Integral limits must be ordered and not NaN",
            PidConfigError::InvalidParameterCount => {
                "Parameter bundles must hold between seven and nine values"
            }
        };
        f.write_str(msg)
    }
}

fn limits_are_valid<T: FloatCore>(min: T, max: T) -> bool {
    !min.is_nan() && !max.is_nan() && min <= max
}

/// Tunable parameters of the controller.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PidConfig<T: FloatCore> {
    /// Proportional gain coefficient.
    /// Defaults to 1.0.
    kp: T,

    /// Integral gain coefficient. A zero gain disables the integrator and forgets its history.
    /// Defaults to 0.0.
    ki: T,

    /// Derivative gain coefficient.
    /// Defaults to 0.0.
    kd: T,

    /// Output saturation limits.
    /// Default to [-1, 1].
    output_min: T,
    output_max: T,

    /// Input clamp applied after inversion.
    /// Default to (-inf, inf), i.e. no limit.
    input_min: T,
    input_max: T,

    /// Anti-windup bounds on the integral accumulator, in output units.
    /// Default to [-1, 1].
    integral_min: T,
    integral_max: T,

    /// Common divisor of all three terms. Floored at 0.01.
    scale: T,

    /// Rate at which the active setpoint ramps toward the commanded one. Floored at 0.01.
    easing: T,

    /// Weight given to the previous derivative estimate; 0 is raw, 1 is frozen.
    rolling_factor: T,

    invert_input: bool,
    invert_output: bool,
    error_mode: ErrorMode,
}

impl<T: FloatCore> Default for PidConfig<T> {
    fn default() -> Self {
        PidConfig {
            kp: T::one(),
            ki: T::zero(),
            kd: T::zero(),
            output_min: -T::one(),
            output_max: T::one(),
            input_min: T::neg_infinity(),
            input_max: T::infinity(),
            integral_min: -T::one(),
            integral_max: T::one(),
            scale: T::one(),
            easing: T::one(),
            rolling_factor: T::zero(),
            invert_input: false,
            invert_output: false,
            error_mode: ErrorMode::Linear,
        }
    }
}

impl<T: FloatCore> PidConfig<T> {
    /// Creates a configuration from the labeled gain/limit bundle.
    ///
    /// Input limits default to unbounded, derivative smoothing to off and all flags to false.
    ///
    /// # Errors
    /// Returns the first rejected parameter, checked in argument order.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kp: T,
        ki: T,
        kd: T,
        output_min: T,
        output_max: T,
        integral_min: T,
        integral_max: T,
        scale: T,
        easing: T,
    ) -> Result<Self, PidConfigError> {
        let mut config = PidConfig::default();
        config.set_gains(kp, ki, kd)?;
        config.set_output_limits(output_min, output_max)?;
        config.set_integral_limits(integral_min, integral_max)?;
        config.set_scale(scale)?;
        config.set_easing(easing)?;
        Ok(config)
    }

    /// Returns the proportional gain.
    pub fn kp(&self) -> T {
        self.kp
    }

    /// Returns the integral gain.
    pub fn ki(&self) -> T {
        self.ki
    }

    /// Returns the derivative gain.
    pub fn kd(&self) -> T {
        self.kd
    }

    /// Convenience method that returns the proportional, integral, and derivative gains together as a tuple.
    pub fn gains(&self) -> (T, T, T) {
        (self.kp, self.ki, self.kd)
    }

    /// Returns the minimum output limit.
    pub fn output_min(&self) -> T {
        self.output_min
    }

    /// Returns the maximum output limit.
    pub fn output_max(&self) -> T {
        self.output_max
    }

    /// Returns the minimum input limit.
    pub fn input_min(&self) -> T {
        self.input_min
    }

    /// Returns the maximum input limit.
    pub fn input_max(&self) -> T {
        self.input_max
    }

    /// Returns the lower anti-windup bound.
    pub fn integral_min(&self) -> T {
        self.integral_min
    }

    /// Returns the upper anti-windup bound.
    pub fn integral_max(&self) -> T {
        self.integral_max
    }

    /// Returns the common divisor of the three terms.
    pub fn scale(&self) -> T {
        self.scale
    }

    /// Returns the setpoint easing rate.
    pub fn easing(&self) -> T {
        self.easing
    }

    /// Returns the derivative smoothing factor.
    pub fn rolling_factor(&self) -> T {
        self.rolling_factor
    }

    /// Returns whether the input is negated before use.
    pub fn invert_input(&self) -> bool {
        self.invert_input
    }

    /// Returns whether the output is negated before it is returned.
    pub fn invert_output(&self) -> bool {
        self.invert_output
    }

    /// Returns how errors and input differences are measured.
    pub fn error_mode(&self) -> ErrorMode {
        self.error_mode
    }

    /// Returns true if errors wrap around a 360° circle.
    pub fn is_heading_control(&self) -> bool {
        self.error_mode == ErrorMode::Heading
    }

    /// Sets the proportional gain. Any finite value, including negative ones, is accepted.
    ///
    /// # Errors
    /// - `InvalidProportionalGain` if `kp` is not finite.
    pub fn set_kp(&mut self, kp: T) -> Result<(), PidConfigError> {
        if !kp.is_finite() {
            return Err(PidConfigError::InvalidProportionalGain);
        }
        self.kp = kp;
        Ok(())
    }

    /// Sets the integral gain. Setting it to zero disables integration.
    ///
    /// # Errors
    /// - `InvalidIntegralGain` if `ki` is not finite.
    pub fn set_ki(&mut self, ki: T) -> Result<(), PidConfigError> {
        if !ki.is_finite() {
            return Err(PidConfigError::InvalidIntegralGain);
        }
        self.ki = ki;
        Ok(())
    }

    /// Sets the derivative gain.
    ///
    /// # Errors
    /// - `InvalidDerivativeGain` if `kd` is not finite.
    pub fn set_kd(&mut self, kd: T) -> Result<(), PidConfigError> {
        if !kd.is_finite() {
            return Err(PidConfigError::InvalidDerivativeGain);
        }
        self.kd = kd;
        Ok(())
    }

    /// Convenience method to set the proportional, integral, and derivative gains together.
    ///
    /// Gains are validated before any of them is assigned, so a failure leaves all three intact.
    pub fn set_gains(&mut self, kp: T, ki: T, kd: T) -> Result<(), PidConfigError> {
        let mut staged = *self;
        staged.set_kp(kp)?;
        staged.set_ki(ki)?;
        staged.set_kd(kd)?;
        *self = staged;
        Ok(())
    }

    /// Sets the divisor shared by the proportional, integral and derivative terms.
    ///
    /// Values below [`MIN_SHAPING`] are raised to it rather than rejected.
    ///
    /// # Errors
    /// - `InvalidScale` if `scale` is NaN or infinite.
    pub fn set_scale(&mut self, scale: T) -> Result<(), PidConfigError> {
        if !scale.is_finite() {
            return Err(PidConfigError::InvalidScale);
        }
        self.scale = scale.max(constant(MIN_SHAPING));
        Ok(())
    }

    /// Sets the rate at which the active setpoint ramps toward a bumpless target.
    ///
    /// Values below [`MIN_SHAPING`] are raised to it rather than rejected.
    ///
    /// # Errors
    /// - `InvalidEasing` if `easing` is NaN or infinite.
    pub fn set_easing(&mut self, easing: T) -> Result<(), PidConfigError> {
        if !easing.is_finite() {
            return Err(PidConfigError::InvalidEasing);
        }
        self.easing = easing.max(constant(MIN_SHAPING));
        Ok(())
    }

    /// Sets the weight of the previous derivative estimate in the rolling average.
    ///
    /// # Errors
    /// - `InvalidRollingFactor` if `rolling_factor` is NaN or outside [0, 1].
    pub fn set_rolling_factor(&mut self, rolling_factor: T) -> Result<(), PidConfigError> {
        if !(rolling_factor >= T::zero() && rolling_factor <= T::one()) {
            return Err(PidConfigError::InvalidRollingFactor);
        }
        self.rolling_factor = rolling_factor;
        Ok(())
    }

    /// Sets the minimum and maximum output limits for the PID controller.
    ///
    /// Equal limits pin the output to a constant; infinite limits disable clamping on that side.
    ///
    /// # Errors
    /// - `InvalidOutputLimits` if either limit is NaN or `output_min > output_max`.
    pub fn set_output_limits(&mut self, output_min: T, output_max: T) -> Result<(), PidConfigError> {
        if !limits_are_valid(output_min, output_max) {
            return Err(PidConfigError::InvalidOutputLimits);
        }
        self.output_min = output_min;
        self.output_max = output_max;
        Ok(())
    }

    /// Sets the range the (possibly inverted) input is clamped to.
    ///
    /// # Errors
    /// - `InvalidInputLimits` if either limit is NaN or `input_min > input_max`.
    pub fn set_input_limits(&mut self, input_min: T, input_max: T) -> Result<(), PidConfigError> {
        if !limits_are_valid(input_min, input_max) {
            return Err(PidConfigError::InvalidInputLimits);
        }
        self.input_min = input_min;
        self.input_max = input_max;
        Ok(())
    }

    /// Sets the anti-windup bounds of the integral accumulator.
    ///
    /// # Errors
    /// - `InvalidIntegralLimits` if either bound is NaN or `integral_min > integral_max`.
    pub fn set_integral_limits(
        &mut self,
        integral_min: T,
        integral_max: T,
    ) -> Result<(), PidConfigError> {
        if !limits_are_valid(integral_min, integral_max) {
            return Err(PidConfigError::InvalidIntegralLimits);
        }
        self.integral_min = integral_min;
        self.integral_max = integral_max;
        Ok(())
    }

    /// Sets whether the input (and the setpoint as seen by callers) is negated.
    pub fn set_invert_input(&mut self, invert_input: bool) {
        self.invert_input = invert_input;
    }

    /// Sets whether the returned output is negated.
    pub fn set_invert_output(&mut self, invert_output: bool) {
        self.invert_output = invert_output;
    }

    /// Sets how errors and input differences are measured.
    pub fn set_error_mode(&mut self, error_mode: ErrorMode) {
        self.error_mode = error_mode;
    }

    /// Switches between heading (wraparound) and linear error.
    pub fn set_heading_control(&mut self, heading_control: bool) {
        self.error_mode = if heading_control {
            ErrorMode::Heading
        } else {
            ErrorMode::Linear
        };
    }

    fn to_internal(&self, value: T) -> T {
        if self.invert_input {
            -value
        } else {
            value
        }
    }
}

/// Builds a config from the positional bundle
/// `[kp, ki, kd, output_min, output_max, integral_min, integral_max, scale, easing]`.
impl<T: FloatCore> TryFrom<[T; PARAMETER_COUNT]> for PidConfig<T> {
    type Error = PidConfigError;

    fn try_from(p: [T; PARAMETER_COUNT]) -> Result<Self, Self::Error> {
        PidConfig::new(p[0], p[1], p[2], p[3], p[4], p[5], p[6], p[7], p[8])
    }
}

/// Builds a config from a positional bundle of seven to nine values. Missing `scale` and
/// `easing` default to 1.
impl<T: FloatCore> TryFrom<&[T]> for PidConfig<T> {
    type Error = PidConfigError;

    fn try_from(p: &[T]) -> Result<Self, Self::Error> {
        if !(MIN_PARAMETER_COUNT..=PARAMETER_COUNT).contains(&p.len()) {
            return Err(PidConfigError::InvalidParameterCount);
        }
        let scale = p.get(7).copied().unwrap_or_else(T::one);
        let easing = p.get(8).copied().unwrap_or_else(T::one);
        PidConfig::new(p[0], p[1], p[2], p[3], p[4], p[5], p[6], scale, easing)
    }
}

/// Chained construction of a [`PidConfig`]. Validation is deferred to [`build`](Self::build),
/// which reports the first rejected value.
#[derive(Copy, Clone, Debug)]
pub struct PidConfigBuilder<T: FloatCore> {
    config: PidConfig<T>,
    error: Option<PidConfigError>,
}

impl<T: FloatCore> Default for PidConfigBuilder<T> {
    fn default() -> Self {
        PidConfigBuilder {
            config: PidConfig::default(),
            error: None,
        }
    }
}

impl<T: FloatCore> PidConfigBuilder<T> {
    fn record(mut self, result: Result<(), PidConfigError>) -> Self {
        if let (None, Err(e)) = (self.error, result) {
            self.error = Some(e);
        }
        self
    }

    /// Sets the proportional gain
    pub fn kp(mut self, kp: T) -> Self {
        let result = self.config.set_kp(kp);
        self.record(result)
    }

    /// Sets the integral gain
    pub fn ki(mut self, ki: T) -> Self {
        let result = self.config.set_ki(ki);
        self.record(result)
    }

    /// Sets the derivative gain
    pub fn kd(mut self, kd: T) -> Self {
        let result = self.config.set_kd(kd);
        self.record(result)
    }

    /// Sets the output limits
    pub fn output_limits(mut self, output_min: T, output_max: T) -> Self {
        let result = self.config.set_output_limits(output_min, output_max);
        self.record(result)
    }

    /// Sets the input limits
    pub fn input_limits(mut self, input_min: T, input_max: T) -> Self {
        let result = self.config.set_input_limits(input_min, input_max);
        self.record(result)
    }

    /// Sets the anti-windup bounds
    pub fn integral_limits(mut self, integral_min: T, integral_max: T) -> Self {
        let result = self.config.set_integral_limits(integral_min, integral_max);
        self.record(result)
    }

    /// Sets the term divisor, floored at 0.01
    pub fn scale(mut self, scale: T) -> Self {
        let result = self.config.set_scale(scale);
        self.record(result)
    }

    /// Sets the setpoint easing rate, floored at 0.01
    pub fn easing(mut self, easing: T) -> Self {
        let result = self.config.set_easing(easing);
        self.record(result)
    }

    /// Sets the derivative smoothing factor
    pub fn rolling_factor(mut self, rolling_factor: T) -> Self {
        let result = self.config.set_rolling_factor(rolling_factor);
        self.record(result)
    }

    /// Sets input inversion
    pub fn invert_input(mut self, invert_input: bool) -> Self {
        self.config.set_invert_input(invert_input);
        self
    }

    /// Sets output inversion
    pub fn invert_output(mut self, invert_output: bool) -> Self {
        self.config.set_invert_output(invert_output);
        self
    }

    /// Sets the error mode
    pub fn error_mode(mut self, error_mode: ErrorMode) -> Self {
        self.config.set_error_mode(error_mode);
        self
    }

    /// Shorthand for `error_mode(ErrorMode::Heading)` when `heading_control` is true
    pub fn heading_control(mut self, heading_control: bool) -> Self {
        self.config.set_heading_control(heading_control);
        self
    }

    /// Returns the configuration, or the first error encountered while building it.
    pub fn build(self) -> Result<PidConfig<T>, PidConfigError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.config),
        }
    }
}

/// State of the one-shot derivative suppression.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DerivativeSkip {
    /// The next call computes the derivative normally.
    #[default]
    Idle,

    /// The next call treats the input as unchanged, then returns to `Idle`.
    Armed,
}

/// Mutable working state of a controller, carried from one tick to the next.
///
/// Setpoints are stored exactly as assigned and compared against the conditioned input.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PidContext<T: FloatCore> {
    target_setpoint: T,
    active_setpoint: T,
    increment: T,
    sum: T,
    previous: T,
    rolling_diff: T,
    last_output: T,
    skip: DerivativeSkip,
}

impl<T: FloatCore> Default for PidContext<T> {
    fn default() -> Self {
        PidContext {
            target_setpoint: T::zero(),
            active_setpoint: T::zero(),
            increment: T::zero(),
            sum: T::zero(),
            previous: T::zero(),
            rolling_diff: T::zero(),
            last_output: T::zero(),
            skip: DerivativeSkip::Idle,
        }
    }
}

impl<T: FloatCore> PidContext<T> {
    /// Creates a context that is already tracking `setpoint`, with `previous_input` as the last
    /// seen input and `last_output` as the last emitted output.
    ///
    /// `previous_input` is in the conditioned frame. Seeding `previous_input` with the current
    /// measurement avoids a derivative spike on the first call; pair with [`preset`](Self::preset)
    /// to start the integrator from `last_output`.
    pub fn new(setpoint: T, previous_input: T, last_output: T) -> Self {
        PidContext {
            target_setpoint: setpoint,
            active_setpoint: setpoint,
            previous: previous_input,
            last_output,
            ..PidContext::default()
        }
    }

    /// Returns the last clamped output, before output inversion.
    pub fn output(&self) -> T {
        self.last_output
    }

    /// Returns the integral accumulator.
    pub fn integral_sum(&self) -> T {
        self.sum
    }

    /// Returns the last conditioned input.
    pub fn previous_input(&self) -> T {
        self.previous
    }

    /// Returns the smoothed derivative estimate, in input units per second.
    pub fn rolling_derivative(&self) -> T {
        self.rolling_diff
    }

    /// Returns the commanded setpoint as stored.
    pub fn target_setpoint(&self) -> T {
        self.target_setpoint
    }

    /// Returns the setpoint currently tracked, as stored.
    pub fn active_setpoint(&self) -> T {
        self.active_setpoint
    }

    /// Returns the accumulated easing step.
    pub fn increment(&self) -> T {
        self.increment
    }

    /// Returns true once the active setpoint has caught up with the target.
    pub fn is_converged(&self) -> bool {
        self.active_setpoint == self.target_setpoint
    }

    /// Drops the accumulated integral without touching setpoints or derivative history.
    pub fn clear(&mut self) {
        log::debug!("Clearing integral accumulator");
        self.sum = T::zero();
    }

    /// Seeds the integral accumulator from the last output, negated if `invert` is set.
    ///
    /// Use when re-engaging a controller so its first output continues from where it left off.
    pub fn preset(&mut self, invert: bool) {
        self.sum = if invert {
            -self.last_output
        } else {
            self.last_output
        };
        log::debug!("Preset integral accumulator from last output");
    }

    /// Arms the one-shot derivative suppression for the next call.
    pub fn skip_derivative(&mut self) {
        self.skip = DerivativeSkip::Armed;
    }

    /// Returns true if the next call will suppress the derivative.
    pub fn is_skipping_derivative(&self) -> bool {
        self.skip == DerivativeSkip::Armed
    }

    fn set_setpoint_internal(&mut self, setpoint: T) {
        self.target_setpoint = setpoint;
        self.active_setpoint = setpoint;
    }

    fn set_setpoint_bumpless_internal(&mut self, setpoint: T) {
        self.target_setpoint = setpoint;
        self.increment = T::zero();
    }

    /// Moves the active setpoint toward the target by at most the accumulated increment.
    fn ease_setpoint(&mut self, easing: T, dt: T) {
        if self.is_converged() {
            return;
        }
        self.increment = self.increment + easing * dt * constant(EASING_RATE);
        let gap = self.target_setpoint - self.active_setpoint;
        if gap.abs() <= self.increment {
            self.active_setpoint = self.target_setpoint;
            log::debug!("Active setpoint converged to target");
        } else {
            self.active_setpoint = self.active_setpoint + gap.signum() * self.increment;
        }
    }

    fn consume_skip(&mut self, input: T) {
        if self.skip == DerivativeSkip::Armed {
            self.previous = input;
            self.skip = DerivativeSkip::Idle;
        }
    }
}

/// Proportional contribution: `error * kp / scale`.
pub fn proportional_term<T: FloatCore>(error: T, kp: T, scale: T) -> T {
    saturate(error * kp / scale)
}

/// Advances the integral accumulator by one tick and returns the new, clamped value.
///
/// A disabled integrator (`enabled == false` or `ki == 0`) forgets its history and returns zero,
/// so re-enabling it starts from scratch. The returned value is also the term's contribution.
pub fn integral_step<T: FloatCore>(
    sum: T,
    error: T,
    dt: T,
    ki: T,
    scale: T,
    (lower, upper): (T, T),
    enabled: bool,
) -> T {
    if !enabled || ki == T::zero() {
        return T::zero();
    }
    let step = saturate(error * dt * ki / scale);
    clamp(saturate(sum + step), lower, upper)
}

/// Blends a raw rate into the exponential moving average `rolling`.
pub fn rolling_average<T: FloatCore>(rolling: T, raw: T, factor: T) -> T {
    saturate(rolling * factor + saturate(raw) * (T::one() - factor))
}

/// Derivative contribution from a known rate: `rate * kd / scale`.
pub fn derivative_term<T: FloatCore>(rate: T, kd: T, scale: T) -> T {
    saturate(saturate(rate) * kd / scale)
}

/// Pulls an overflowed value back to the largest finite magnitude. Opposing infinities would
/// otherwise cancel to NaN, which no clamp can remove.
fn saturate<T: FloatCore>(value: T) -> T {
    clamp(value, -T::max_value(), T::max_value())
}

fn as_f64<T: FloatCore>(value: T) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

/// A functional implementation of the controller.
///
/// The controller holds only its configuration; the working state lives in a [`PidContext`] that is
/// passed in and returned with each call to `respond`, so every call is functionally pure.
#[derive(Copy, Clone, Debug)]
pub struct FuncPidController<T: FloatCore> {
    config: PidConfig<T>,
}

impl<T: FloatCore> FuncPidController<T> {
    /// Creates a controller with the given configuration
    pub fn new(config: PidConfig<T>) -> Self {
        FuncPidController { config }
    }

    /// Returns the configuration
    pub fn config(&self) -> &PidConfig<T> {
        &self.config
    }

    /// Returns the configuration for on-the-fly tuning
    pub fn config_mut(&mut self) -> &mut PidConfig<T> {
        &mut self.config
    }

    /// Advances the controller by one tick of length `step` and returns the output along with the
    /// updated context.
    ///
    /// The input is negated if configured, clamped to the input limits, and compared against the
    /// eased setpoint. The returned output lies within the output limits before output inversion.
    pub fn respond<S: Timestep>(
        &self,
        mut ctx: PidContext<T>,
        input: T,
        use_integral: bool,
        step: S,
    ) -> (T, PidContext<T>) {
        let dt: T = time::sanitize(step);
        let (input, error) = self.prepare(&mut ctx, input, dt);

        let raw_rate = self.config.error_mode.difference(input, ctx.previous) / dt;
        ctx.rolling_diff = rolling_average(ctx.rolling_diff, raw_rate, self.config.rolling_factor);
        ctx.previous = input;
        let d_term = derivative_term(ctx.rolling_diff, self.config.kd, self.config.scale);

        self.finish(ctx, error, d_term, use_integral, dt)
    }

    /// Like [`respond`](Self::respond), but takes the derivative term from a rate the caller
    /// already knows instead of differencing successive inputs.
    ///
    /// The rolling derivative estimate is left untouched; the previous input is still updated so
    /// switching back to `respond` does not produce a spike.
    pub fn respond_with_rate<S: Timestep>(
        &self,
        mut ctx: PidContext<T>,
        input: T,
        rate: T,
        use_integral: bool,
        step: S,
    ) -> (T, PidContext<T>) {
        let dt: T = time::sanitize(step);
        let (input, error) = self.prepare(&mut ctx, input, dt);
        ctx.previous = input;
        let d_term = derivative_term(rate, self.config.kd, self.config.scale);

        self.finish(ctx, error, d_term, use_integral, dt)
    }

    /// Runs the steps shared by both entry points: easing, input conditioning, error and the
    /// one-shot derivative skip. Returns the conditioned input and the error.
    fn prepare(&self, ctx: &mut PidContext<T>, input: T, dt: T) -> (T, T) {
        ctx.ease_setpoint(self.config.easing, dt);

        let input = clamp(
            self.config.to_internal(input),
            self.config.input_min,
            self.config.input_max,
        );
        let error = saturate(self.config.error_mode.difference(input, ctx.active_setpoint));

        ctx.consume_skip(input);
        (input, error)
    }

    fn finish(
        &self,
        mut ctx: PidContext<T>,
        error: T,
        d_term: T,
        use_integral: bool,
        dt: T,
    ) -> (T, PidContext<T>) {
        let cfg = &self.config;
        let p_term = proportional_term(error, cfg.kp, cfg.scale);

        // The clamped accumulator is both the stored state and the integral contribution
        ctx.sum = integral_step(
            ctx.sum,
            error,
            dt,
            cfg.ki,
            cfg.scale,
            (cfg.integral_min, cfg.integral_max),
            use_integral,
        );

        let output = clamp(p_term + ctx.sum + d_term, cfg.output_min, cfg.output_max);
        ctx.last_output = output;

        log::trace!(
            "error={} p={} i={} d={} output={}",
            as_f64(error),
            as_f64(p_term),
            as_f64(ctx.sum),
            as_f64(d_term),
            as_f64(output)
        );

        let output = if cfg.invert_output { -output } else { output };
        (output, ctx)
    }

    /// Assigns the target and the active setpoint immediately, with no easing.
    ///
    /// The value is stored as given. Only the getters apply the input inversion sign.
    pub fn set_setpoint(&self, ctx: &mut PidContext<T>, setpoint: T) {
        ctx.set_setpoint_internal(setpoint);
    }

    /// Assigns only the target setpoint; subsequent calls to `respond` ease toward it.
    pub fn set_setpoint_bumpless(&self, ctx: &mut PidContext<T>, setpoint: T) {
        ctx.set_setpoint_bumpless_internal(setpoint);
    }

    /// Returns the commanded setpoint, negated if the controller inverts its input.
    pub fn setpoint(&self, ctx: &PidContext<T>) -> T {
        self.config.to_internal(ctx.target_setpoint)
    }

    /// Returns the setpoint currently tracked, negated if the controller inverts its input.
    pub fn active_setpoint(&self, ctx: &PidContext<T>) -> T {
        self.config.to_internal(ctx.active_setpoint)
    }

    /// Seeds the integral accumulator from an explicit value.
    ///
    /// The value takes the output inversion sign, and `invert` flips it once more. Note that this
    /// differs from [`PidContext::preset`], which ignores output inversion entirely.
    pub fn preset_to(&self, ctx: &mut PidContext<T>, target: T, invert: bool) {
        let negate = self.config.invert_output != invert;
        ctx.sum = if negate { -target } else { target };
        log::debug!("Preset integral accumulator to {}", as_f64(ctx.sum));
    }
}

/// A stateful implementation of the controller.
///
/// This struct owns its [`PidContext`] and forwards to a [`FuncPidController`], so it can be used
/// without passing a context object. It must be `mut`; each axis being controlled should own its
/// own instance.
#[derive(Copy, Clone, Debug)]
pub struct PidController<T: FloatCore> {
    ctx: PidContext<T>,
    controller: FuncPidController<T>,
}

impl<T: FloatCore> PidController<T> {
    /// Creates a controller with a zeroed context.
    pub fn new(config: PidConfig<T>) -> Self {
        Self::with_context(config, PidContext::default())
    }

    /// Creates a controller that resumes from an existing context.
    pub fn with_context(config: PidConfig<T>, ctx: PidContext<T>) -> Self {
        PidController {
            ctx,
            controller: FuncPidController::new(config),
        }
    }

    /// Returns the configuration
    pub fn config(&self) -> &PidConfig<T> {
        self.controller.config()
    }

    /// Returns the configuration for on-the-fly tuning
    pub fn config_mut(&mut self) -> &mut PidConfig<T> {
        self.controller.config_mut()
    }

    /// Returns the working state
    pub fn context(&self) -> &PidContext<T> {
        &self.ctx
    }

    /// Advances the controller by one tick. See [`FuncPidController::respond`].
    pub fn respond<S: Timestep>(&mut self, input: T, use_integral: bool, step: S) -> T {
        let (output, ctx) = self.controller.respond(self.ctx, input, use_integral, step);
        self.ctx = ctx;
        output
    }

    /// Advances the controller by one tick using a known rate for the derivative term. See
    /// [`FuncPidController::respond_with_rate`].
    pub fn respond_with_rate<S: Timestep>(
        &mut self,
        input: T,
        rate: T,
        use_integral: bool,
        step: S,
    ) -> T {
        let (output, ctx) = self
            .controller
            .respond_with_rate(self.ctx, input, rate, use_integral, step);
        self.ctx = ctx;
        output
    }

    /// Single-precision variant of [`respond`](Self::respond).
    pub fn respond_f32<S: Timestep>(&mut self, input: T, use_integral: bool, step: S) -> f32 {
        self.respond(input, use_integral, step)
            .to_f32()
            .unwrap_or(f32::NAN)
    }

    /// Returns the last clamped output, before output inversion.
    pub fn output(&self) -> T {
        self.ctx.output()
    }

    /// Returns the integral accumulator.
    pub fn integral_sum(&self) -> T {
        self.ctx.integral_sum()
    }

    /// Returns the smoothed derivative estimate.
    pub fn rolling_derivative(&self) -> T {
        self.ctx.rolling_derivative()
    }

    /// Returns the commanded setpoint.
    pub fn setpoint(&self) -> T {
        self.controller.setpoint(&self.ctx)
    }

    /// Returns the setpoint currently tracked.
    pub fn active_setpoint(&self) -> T {
        self.controller.active_setpoint(&self.ctx)
    }

    /// Snaps both setpoints to `setpoint`.
    pub fn set_setpoint(&mut self, setpoint: T) {
        self.controller.set_setpoint(&mut self.ctx, setpoint);
    }

    /// Commands a new setpoint that the controller eases toward.
    pub fn set_setpoint_bumpless(&mut self, setpoint: T) {
        self.controller.set_setpoint_bumpless(&mut self.ctx, setpoint);
    }

    /// Drops the accumulated integral. See [`PidContext::clear`].
    pub fn clear(&mut self) {
        self.ctx.clear();
    }

    /// Seeds the integral from the last output. See [`PidContext::preset`].
    pub fn preset(&mut self, invert: bool) {
        self.ctx.preset(invert);
    }

    /// Seeds the integral from `target`. See [`FuncPidController::preset_to`].
    pub fn preset_to(&mut self, target: T, invert: bool) {
        self.controller.preset_to(&mut self.ctx, target, invert);
    }

    /// Suppresses the derivative on the next call only.
    pub fn skip_derivative(&mut self) {
        self.ctx.skip_derivative();
    }

    /// Returns true if the next call will suppress the derivative.
    pub fn is_skipping_derivative(&self) -> bool {
        self.ctx.is_skipping_derivative()
    }
}
