use serde::Serialize;
use std::fmt;

/// Abstract actuator intensity, always within `0..=9`.
///
/// The actuator side maps a level onto a duty cycle of `level / 9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
pub struct Power(u8);

impl Power {
    pub const MIN: Power = Power(0);
    pub const MAX: Power = Power(9);

    /// Saturates anything above 9.
    pub const fn new(level: u8) -> Power {
        if level > Self::MAX.0 {
            Self::MAX
        } else {
            Power(level)
        }
    }

    pub fn level(self) -> u8 {
        self.0
    }

    /// `(numerator, denominator)` of the duty cycle for this level.
    pub fn duty_fraction(self) -> (u8, u8) {
        (self.0, Self::MAX.0)
    }
}

/// One manoeuvre for the current tick. Never stored beyond dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum MotionIntent {
    #[default]
    Stop,
    MoveForward(Power),
    MoveBackward(Power),
    TurnLeft(Power),
    TurnRight(Power),
    TranslateLeft(Power),
    TranslateRight(Power),
}

impl MotionIntent {
    pub fn power(&self) -> Power {
        match *self {
            MotionIntent::Stop => Power::MIN,
            MotionIntent::MoveForward(p)
            | MotionIntent::MoveBackward(p)
            | MotionIntent::TurnLeft(p)
            | MotionIntent::TurnRight(p)
            | MotionIntent::TranslateLeft(p)
            | MotionIntent::TranslateRight(p) => p,
        }
    }

    /// Turn toward the sign of `speed`: positive turns right.
    pub fn turn(speed: i32, power: Power) -> MotionIntent {
        if speed > 0 {
            MotionIntent::TurnRight(power)
        } else {
            MotionIntent::TurnLeft(power)
        }
    }

    /// Strafe toward the sign of `speed`: positive translates right.
    pub fn translate(speed: i32, power: Power) -> MotionIntent {
        if speed > 0 {
            MotionIntent::TranslateRight(power)
        } else {
            MotionIntent::TranslateLeft(power)
        }
    }

    /// Hands the intent to the sink as exactly one call.
    pub fn dispatch<S: MotionSink + ?Sized>(self, sink: &mut S) -> Result<(), S::Error> {
        match self {
            MotionIntent::Stop => sink.stop(),
            MotionIntent::MoveForward(p) => sink.move_forward(p),
            MotionIntent::MoveBackward(p) => sink.move_backward(p),
            MotionIntent::TurnLeft(p) => sink.turn_left(p),
            MotionIntent::TurnRight(p) => sink.turn_right(p),
            MotionIntent::TranslateLeft(p) => sink.translate_left(p),
            MotionIntent::TranslateRight(p) => sink.translate_right(p),
        }
    }
}

impl fmt::Display for MotionIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MotionIntent::Stop => return f.write_str("stop"),
            MotionIntent::MoveForward(_) => "forward",
            MotionIntent::MoveBackward(_) => "backward",
            MotionIntent::TurnLeft(_) => "turn-left",
            MotionIntent::TurnRight(_) => "turn-right",
            MotionIntent::TranslateLeft(_) => "translate-left",
            MotionIntent::TranslateRight(_) => "translate-right",
        };
        write!(f, "{}({})", name, self.power().level())
    }
}

/// Whatever actually moves the wheels.
///
/// The navigator calls exactly one of these per tick.
pub trait MotionSink {
    type Error: fmt::Debug;

    fn stop(&mut self) -> Result<(), Self::Error>;
    fn move_forward(&mut self, power: Power) -> Result<(), Self::Error>;
    fn move_backward(&mut self, power: Power) -> Result<(), Self::Error>;
    fn turn_left(&mut self, power: Power) -> Result<(), Self::Error>;
    fn turn_right(&mut self, power: Power) -> Result<(), Self::Error>;
    fn translate_left(&mut self, power: Power) -> Result<(), Self::Error>;
    fn translate_right(&mut self, power: Power) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[derive(Default)]
    struct Recorder(Vec<&'static str>);

    impl MotionSink for Recorder {
        type Error = Infallible;

        fn stop(&mut self) -> Result<(), Infallible> {
            self.0.push("stop");
            Ok(())
        }
        fn move_forward(&mut self, _: Power) -> Result<(), Infallible> {
            self.0.push("forward");
            Ok(())
        }
        fn move_backward(&mut self, _: Power) -> Result<(), Infallible> {
            self.0.push("backward");
            Ok(())
        }
        fn turn_left(&mut self, _: Power) -> Result<(), Infallible> {
            self.0.push("turn-left");
            Ok(())
        }
        fn turn_right(&mut self, _: Power) -> Result<(), Infallible> {
            self.0.push("turn-right");
            Ok(())
        }
        fn translate_left(&mut self, _: Power) -> Result<(), Infallible> {
            self.0.push("translate-left");
            Ok(())
        }
        fn translate_right(&mut self, _: Power) -> Result<(), Infallible> {
            self.0.push("translate-right");
            Ok(())
        }
    }

    #[test]
    fn power_saturates_at_nine() {
        assert_eq!(Power::new(4).level(), 4);
        assert_eq!(Power::new(12), Power::MAX);
        assert_eq!(Power::new(9).duty_fraction(), (9, 9));
    }

    #[test]
    fn dispatch_makes_exactly_one_call() {
        let mut sink = Recorder::default();
        MotionIntent::TranslateRight(Power::new(2))
            .dispatch(&mut sink)
            .unwrap();
        MotionIntent::Stop.dispatch(&mut sink).unwrap();
        assert_eq!(sink.0, vec!["translate-right", "stop"]);
    }

    #[test]
    fn direction_follows_sign() {
        let p = Power::new(3);
        assert_eq!(MotionIntent::turn(2, p), MotionIntent::TurnRight(p));
        assert_eq!(MotionIntent::turn(-2, p), MotionIntent::TurnLeft(p));
        assert_eq!(MotionIntent::translate(5, p), MotionIntent::TranslateRight(p));
        assert_eq!(MotionIntent::translate(-5, p), MotionIntent::TranslateLeft(p));
    }

    #[test]
    fn display_shows_power() {
        assert_eq!(MotionIntent::MoveForward(Power::new(4)).to_string(), "forward(4)");
        assert_eq!(MotionIntent::Stop.to_string(), "stop");
    }
}
