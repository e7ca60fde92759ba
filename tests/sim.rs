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
#[cfg(feature = "simulation")]
mod fixtures;

#[cfg(feature = "simulation")]
mod test_pid_closed_loop_performance {
    use super::fixtures::test_pid::*;

    use eased_pid::angle::wrap_heading;
    use eased_pid::pid::*;
    use eased_pid::sim;

    use approx::assert_relative_eq;
    use nalgebra as na;

    /// Feeds a unit sine wave as the measurement to a pure-D controller. With no smoothing, the
    /// backward difference of sin(t) is cos(t - dt/2) up to a sinc factor of order dt²/24.
    #[test]
    fn test_open_loop_derivative_of_sine() {
        let (mut pid, mut ctx) = make_controller();
        assert!(pid.config_mut().set_gains(0.0, 0.0, 1.0).is_ok());

        let sine = sim::SignalGenerator::new(sim::WaveForm::Sine, 1.0, 0.0);
        let mut output: f64;

        for i in 0..500usize {
            let t = i as f64 * DT;
            (output, ctx) = pid.respond(ctx, sine.generate(t), false, TICK);
            if i > 0 {
                assert_relative_eq!(output, (t - 0.5 * DT).cos(), epsilon = 1e-4);
            }
        }
    }

    /// Holds a heading of -170° starting from 170°. The controller must turn through the ±180°
    /// seam (20°) rather than back through north (340°).
    #[test]
    fn test_heading_hold_across_seam() {
        let config = PidConfigBuilder::default()
            .kp(0.05)
            .kd(0.02)
            .rolling_factor(0.3)
            .invert_output(true)
            .heading_control(true)
            .build()
            .unwrap();
        let mut pid = PidController::with_context(config, PidContext::new(-170.0, 170.0, 0.0));

        let mdl = sim::YawPlant {
            damping: 1.0,
            authority: 50.0,
        };
        let mut state = na::vector![170.0, 0.0];

        for _ in 0..1000usize {
            let heading = mdl.h(state);
            assert!(
                heading.abs() > 150.0,
                "Heading {heading} went the long way round"
            );
            let torque = pid.respond(heading, false, TICK);
            state = sim::euler_step(|x| mdl.f(x, torque), state, DT);
        }

        let settled_error = wrap_heading(mdl.h(state) - (-170.0));
        assert!(settled_error.abs() < 0.5, "Residual error {settled_error}");
        assert!(mdl.rate(state).abs() < 0.5);
    }

    /// Commands a unit step to a mass-spring-damper under PI control. The bumpless controller
    /// starts from a tiny output while the hard-stepped one jumps immediately, yet both settle on
    /// the new setpoint.
    #[test]
    fn test_bumpless_step_response() {
        let config = PidConfigBuilder::default()
            .kp(-1.0)
            .ki(-0.5)
            .output_limits(-10.0, 10.0)
            .integral_limits(-5.0, 5.0)
            .build()
            .unwrap();

        let mdl = sim::MassSpringDamper {
            natural_frequency: 0.5 * std::f64::consts::PI,
            damping_ratio: 0.2,
        };

        let mut first_outputs = vec![];
        for bumpless in [false, true] {
            let mut pid = PidController::new(config);
            if bumpless {
                pid.set_setpoint_bumpless(1.0);
            } else {
                pid.set_setpoint(1.0);
            }

            let mut state = na::Vector2::<f64>::zeros();
            let mut output = 0.0;
            for i in 0..3000usize {
                let control = pid.respond(output, true, TICK);
                if i == 0 {
                    first_outputs.push(control);
                }
                state = sim::euler_step(|x| mdl.f(x, control), state, DT);
                output = mdl.h(state);
            }

            assert!(pid.context().is_converged());
            assert!((output - 1.0).abs() < 0.02, "Settled at {output}");
        }

        let (hard, eased) = (first_outputs[0], first_outputs[1]);
        assert!(hard >= 1.0);
        assert!(eased > 0.0 && eased < 0.01 * hard);
    }
}
