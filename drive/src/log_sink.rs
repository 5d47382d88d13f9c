use navigation::{MotionIntent, MotionSink, Power};
use std::convert::Infallible;

/// Stand-in for the motors when running on a desk. Logs a line whenever the
/// commanded motion changes.
#[derive(Debug, Default)]
pub struct LogSink {
    issued: u64,
    last: Option<MotionIntent>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issued(&self) -> u64 {
        self.issued
    }

    pub fn last(&self) -> Option<MotionIntent> {
        self.last
    }

    fn note(&mut self, intent: MotionIntent) -> Result<(), Infallible> {
        if self.last != Some(intent) {
            log::info!("motors: {}", intent);
        } else {
            log::trace!("motors: {}", intent);
        }
        self.issued += 1;
        self.last = Some(intent);
        Ok(())
    }
}

impl MotionSink for LogSink {
    type Error = Infallible;

    fn stop(&mut self) -> Result<(), Infallible> {
        self.note(MotionIntent::Stop)
    }

    fn move_forward(&mut self, power: Power) -> Result<(), Infallible> {
        self.note(MotionIntent::MoveForward(power))
    }

    fn move_backward(&mut self, power: Power) -> Result<(), Infallible> {
        self.note(MotionIntent::MoveBackward(power))
    }

    fn turn_left(&mut self, power: Power) -> Result<(), Infallible> {
        self.note(MotionIntent::TurnLeft(power))
    }

    fn turn_right(&mut self, power: Power) -> Result<(), Infallible> {
        self.note(MotionIntent::TurnRight(power))
    }

    fn translate_left(&mut self, power: Power) -> Result<(), Infallible> {
        self.note(MotionIntent::TranslateLeft(power))
    }

    fn translate_right(&mut self, power: Power) -> Result<(), Infallible> {
        self.note(MotionIntent::TranslateRight(power))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_remembers() {
        let mut sink = LogSink::new();
        assert_eq!(sink.last(), None);
        MotionIntent::TurnLeft(Power::new(3))
            .dispatch(&mut sink)
            .unwrap();
        sink.stop().unwrap();
        assert_eq!(sink.issued(), 2);
        assert_eq!(sink.last(), Some(MotionIntent::Stop));
    }
}
