use navigation::{MotionSink, Power};

use crate::hbridge::{DriveError, Spin, Wheel};

use crate::hbridge::Spin::{Coast as C, Forward as F, Reverse as R};

// Wheel order: front-left, front-right, rear-left, rear-right.
const STOP: [Spin; 4] = [C, C, C, C];
const FORWARD: [Spin; 4] = [F, F, F, F];
const TURN_RIGHT: [Spin; 4] = [F, R, F, R];
const TRANSLATE_RIGHT: [Spin; 4] = [F, R, R, F];

fn reversed(pattern: [Spin; 4]) -> [Spin; 4] {
    pattern.map(Spin::reversed)
}

/// Four mecanum wheels, which is what lets the robot strafe sideways.
pub struct MecanumDrive<FL, FR, RL, RR> {
    front_left: FL,
    front_right: FR,
    rear_left: RL,
    rear_right: RR,
}

impl<FL, FR, RL, RR> MecanumDrive<FL, FR, RL, RR>
where
    FL: Wheel,
    FR: Wheel,
    RL: Wheel,
    RR: Wheel,
{
    pub fn new(front_left: FL, front_right: FR, rear_left: RL, rear_right: RR) -> Self {
        MecanumDrive {
            front_left,
            front_right,
            rear_left,
            rear_right,
        }
    }

    fn apply(&mut self, pattern: [Spin; 4], power: Power) -> Result<(), DriveError> {
        let [fl, fr, rl, rr] = pattern;
        self.front_left.spin(fl, power)?;
        self.front_right.spin(fr, power)?;
        self.rear_left.spin(rl, power)?;
        self.rear_right.spin(rr, power)
    }
}

impl<FL, FR, RL, RR> MotionSink for MecanumDrive<FL, FR, RL, RR>
where
    FL: Wheel,
    FR: Wheel,
    RL: Wheel,
    RR: Wheel,
{
    type Error = DriveError;

    fn stop(&mut self) -> Result<(), DriveError> {
        self.apply(STOP, Power::MIN)
    }

    fn move_forward(&mut self, power: Power) -> Result<(), DriveError> {
        self.apply(FORWARD, power)
    }

    fn move_backward(&mut self, power: Power) -> Result<(), DriveError> {
        self.apply(reversed(FORWARD), power)
    }

    fn turn_left(&mut self, power: Power) -> Result<(), DriveError> {
        self.apply(reversed(TURN_RIGHT), power)
    }

    fn turn_right(&mut self, power: Power) -> Result<(), DriveError> {
        self.apply(TURN_RIGHT, power)
    }

    fn translate_left(&mut self, power: Power) -> Result<(), DriveError> {
        self.apply(reversed(TRANSLATE_RIGHT), power)
    }

    fn translate_right(&mut self, power: Power) -> Result<(), DriveError> {
        self.apply(TRANSLATE_RIGHT, power)
    }
}
