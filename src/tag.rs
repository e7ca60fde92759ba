// Identity tags attached to controllers driving a particular axis
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

use crate::pid::PidController;

/// Axes handled by the flight-assist autopilot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssistAxis {
    /// Heading error to bank angle
    HeadingBank,
    /// Bank angle to yaw coordination
    BankToYaw,
    /// Roll rate through the ailerons
    Aileron,
    /// Yaw through the rudder
    Rudder,
    /// Altitude to vertical speed
    Altitude,
    /// Vertical speed to pitch
    VerticalSpeed,
    /// Pitch through the elevator
    Elevator,
    /// Airspeed to acceleration
    Speed,
    /// Acceleration to throttle demand
    Acceleration,
    /// Throttle position
    Throttle,
}

impl AssistAxis {
    /// Every flight-assist axis, in declaration order
    pub const ALL: [AssistAxis; 10] = [
        AssistAxis::HeadingBank,
        AssistAxis::BankToYaw,
        AssistAxis::Aileron,
        AssistAxis::Rudder,
        AssistAxis::Altitude,
        AssistAxis::VerticalSpeed,
        AssistAxis::Elevator,
        AssistAxis::Speed,
        AssistAxis::Acceleration,
        AssistAxis::Throttle,
    ];
}

/// Axes handled by the attitude stability system.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StabilityAxis {
    /// Nose up and down
    Pitch,
    /// Wing up and down
    Roll,
    /// Nose left and right
    Yaw,
}

impl StabilityAxis {
    /// Every stability axis, in declaration order
    pub const ALL: [StabilityAxis; 3] = [StabilityAxis::Pitch, StabilityAxis::Roll, StabilityAxis::Yaw];
}

/// Identifies which axis a controller drives. Carries no behavior.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ControllerTag {
    /// A flight-assist autopilot axis
    Assist(AssistAxis),
    /// An attitude stability axis
    Stability(StabilityAxis),
}

impl From<AssistAxis> for ControllerTag {
    fn from(axis: AssistAxis) -> Self {
        ControllerTag::Assist(axis)
    }
}

impl From<StabilityAxis> for ControllerTag {
    fn from(axis: StabilityAxis) -> Self {
        ControllerTag::Stability(axis)
    }
}

/// A [`PidController`] paired with the axis it drives.
///
/// The tag is identity only; all control behavior comes from the wrapped controller.
#[derive(Copy, Clone, Debug)]
pub struct TaggedController<T: FloatCore> {
    tag: ControllerTag,
    controller: PidController<T>,
}

impl<T: FloatCore> TaggedController<T> {
    /// Pairs `controller` with the axis named by `tag`.
    pub fn new(tag: impl Into<ControllerTag>, controller: PidController<T>) -> Self {
        TaggedController {
            tag: tag.into(),
            controller,
        }
    }

    /// Returns the axis this controller drives.
    pub fn tag(&self) -> ControllerTag {
        self.tag
    }

    /// Borrows the wrapped controller.
    pub fn controller(&self) -> &PidController<T> {
        &self.controller
    }

    /// Mutably borrows the wrapped controller.
    pub fn controller_mut(&mut self) -> &mut PidController<T> {
        &mut self.controller
    }

    /// Drops the tag and returns the wrapped controller.
    pub fn into_inner(self) -> PidController<T> {
        self.controller
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pid::PidConfig;

    #[test]
    fn test_tags_convert_from_axes() {
        assert_eq!(
            ControllerTag::from(AssistAxis::Throttle),
            ControllerTag::Assist(AssistAxis::Throttle)
        );
        assert_eq!(
            ControllerTag::from(StabilityAxis::Yaw),
            ControllerTag::Stability(StabilityAxis::Yaw)
        );
        assert_ne!(
            ControllerTag::from(AssistAxis::Rudder),
            ControllerTag::from(StabilityAxis::Yaw)
        );
    }

    #[test]
    fn test_tagging_does_not_change_behavior() {
        let mut plain = PidController::<f64>::new(PidConfig::default());
        let mut tagged = TaggedController::new(
            StabilityAxis::Pitch,
            PidController::new(PidConfig::default()),
        );
        plain.set_setpoint(0.5);
        tagged.controller_mut().set_setpoint(0.5);

        for input in [0.0, 0.1, 0.3, 0.7] {
            let expected = plain.respond(input, true, crate::time::Millis(20));
            let result = tagged
                .controller_mut()
                .respond(input, true, crate::time::Millis(20));
            assert_eq!(result, expected);
        }
        assert_eq!(tagged.tag(), ControllerTag::Stability(StabilityAxis::Pitch));
    }
}
