#![warn(missing_docs)]

//! # Eased PID Controller Library
//!
//! This library provides a discrete PID (Proportional-Integral-Derivative) controller that is
//! advanced once per fixed simulation tick, as found in flight-assist and attitude-hold loops.
//!
//! It includes both functional and stateful implementations, allowing users to choose the approach
//! that best suits their needs.
//!
//! ## Features
//!
//! - Bumpless setpoint changes: a commanded setpoint is approached along a bounded-rate ramp
//!   instead of a step, avoiding output spikes.
//! - Heading control: errors and derivatives can be measured on a 360° circle, always taking the
//!   shortest path.
//! - Anti reset-windup: the integral accumulator is clamped to its own bounds, and is forgotten
//!   whenever integration is disabled.
//! - Derivative smoothing with an exponential rolling average, and a one-shot derivative skip
//!   for discontinuities in the input.
//! - Input/output clamping and inversion.
//! - The tick duration is injected on every call; the controller never reads a clock.
//!
//! ## Usage
//!
//! ### Stateful controller
//!
//! ```rust
//! use eased_pid::pid::{PidConfig, PidContext, PidController};
//! use eased_pid::time::Millis;
//!
//! // kp, ki, kd, output limits, integral limits, scale, easing
//! let config: PidConfig<f64> = PidConfig::new(1.0, 0.5, 0.1, -1.0, 1.0, -0.5, 0.5, 1.0, 1.0)
//!     .expect("Invalid PID config");
//!
//! // Start tracking 10.0 with the last measurement at 9.5, so there is no derivative kick
//! let mut pid = PidController::with_context(config, PidContext::new(10.0, 9.5, 0.0));
//!
//! // The error is measured as input minus setpoint
//! let output = pid.respond(9.5, true, Millis(20));
//! assert!((output + 0.505).abs() < 1e-12);
//!
//! // Command a new setpoint without kicking the output
//! pid.set_setpoint_bumpless(20.0);
//! pid.respond(9.6, true, Millis(20));
//! assert!(pid.active_setpoint() < 20.0);
//! ```
//!
//! ### Functional controller
//!
//! ```rust
//! use eased_pid::pid::{FuncPidController, PidConfigBuilder, PidContext};
//! use eased_pid::time::Seconds;
//!
//! let config = PidConfigBuilder::<f64>::default()
//!     .kp(0.05)
//!     .kd(0.01)
//!     .heading_control(true)
//!     .build()
//!     .expect("Invalid PID config");
//! let pid = FuncPidController::new(config);
//!
//! // Tracking a heading of -179°; the measured heading is 179°
//! let ctx = PidContext::new(-179.0, 179.0, 0.0);
//! let (output, ctx) = pid.respond(ctx, 179.0, false, Seconds(0.02));
//!
//! // Two degrees off, not 358
//! assert!((output + 0.1).abs() < 1e-9);
//! assert_eq!(ctx.output(), output);
//! ```
//!
//! ### Plugging in your tick type
//!
//! ``` rust
//! use eased_pid::pid::{PidConfig, PidController};
//! use eased_pid::time::Timestep;
//! use num_traits::float::FloatCore;
//!
//! #[derive(Copy, Clone, Debug)]
//! struct PhysicsStep {
//!     hz: u32,
//! }
//!
//! impl Timestep for PhysicsStep {
//!     fn secs<T: FloatCore>(&self) -> T {
//!         T::from(1.0 / self.hz as f64).unwrap()
//!     }
//! }
//!
//! let mut pid = PidController::<f64>::new(PidConfig::default());
//! let output = pid.respond(0.0, true, PhysicsStep { hz: 50 });
//! assert_eq!(output, 0.0);
//! ```
#![no_std]

#[cfg(feature = "std")]
extern crate std;

use num_traits::float::FloatCore;

/// The main module for the PID controller library.
pub mod pid;

/// Heading wraparound and error measurement modes.
pub mod angle;

/// Identity tags for controllers driving a particular axis.
pub mod tag;

/// The module containing the tick-duration abstraction.
pub mod time;

#[doc(hidden)]
#[cfg(feature = "simulation")]
pub mod sim;

/// Converts an `f64` literal into the controller's scalar type.
pub(crate) fn constant<T: FloatCore>(value: f64) -> T {
    T::from(value).unwrap_or_else(T::nan)
}

#[doc = include_str!("../README.md")]
#[cfg(doctest)]
pub struct ReadmeDoctests;
