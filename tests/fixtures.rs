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

#[cfg(test)]
#[allow(dead_code)]
pub mod test_pid {

    use eased_pid::pid::*;
    use eased_pid::time::Millis;

    /// Fixed tick used throughout the tests: 20ms, i.e. dt = 0.02s
    pub const TICK: Millis = Millis(20);
    pub const DT: f64 = 0.02;

    /// Unbounded output and integral limits so that terms can be read off the output directly
    pub fn unbounded_config() -> PidConfig<f64> {
        PidConfigBuilder::default()
            .output_limits(f64::NEG_INFINITY, f64::INFINITY)
            .integral_limits(f64::NEG_INFINITY, f64::INFINITY)
            .build()
            .unwrap()
    }

    pub fn make_controller() -> (FuncPidController<f64>, PidContext<f64>) {
        let controller = FuncPidController::new(unbounded_config());
        let ctx = PidContext::default();
        (controller, ctx)
    }

    pub fn make_stateful_controller() -> PidController<f64> {
        PidController::new(unbounded_config())
    }
}
