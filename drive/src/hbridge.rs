use embedded_hal::digital::{self, Error as _, OutputPin};
use embedded_hal::pwm::{self, Error as _, SetDutyCycle};
use navigation::Power;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DriveError {
    #[error("direction pin failed: {0:?}")]
    Pin(digital::ErrorKind),
    #[error("pwm channel failed: {0:?}")]
    Pwm(pwm::ErrorKind),
}

/// Direction of a single motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spin {
    Forward,
    Reverse,
    /// Both bridge inputs low, no drive.
    Coast,
}

impl Spin {
    pub fn reversed(self) -> Spin {
        match self {
            Spin::Forward => Spin::Reverse,
            Spin::Reverse => Spin::Forward,
            Spin::Coast => Spin::Coast,
        }
    }
}

/// Anything that can spin one wheel.
pub trait Wheel {
    fn spin(&mut self, spin: Spin, power: Power) -> Result<(), DriveError>;
}

/// One motor behind an H-bridge: two direction inputs and an enable line
/// driven by PWM.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct HBridge<In1, In2, Pwm> {
    in1: In1,
    in2: In2,
    pwm: Pwm,
}

impl<In1, In2, Pwm> HBridge<In1, In2, Pwm> {
    pub fn new(in1: In1, in2: In2, pwm: Pwm) -> Self {
        HBridge { in1, in2, pwm }
    }
}

fn set_output<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), DriveError> {
    let result = if high { pin.set_high() } else { pin.set_low() };
    result.map_err(|e| DriveError::Pin(e.kind()))
}

impl<In1, In2, Pwm> Wheel for HBridge<In1, In2, Pwm>
where
    In1: OutputPin,
    In2: OutputPin,
    Pwm: SetDutyCycle,
{
    fn spin(&mut self, spin: Spin, power: Power) -> Result<(), DriveError> {
        let (a, b) = match spin {
            Spin::Forward => (true, false),
            Spin::Reverse => (false, true),
            Spin::Coast => (false, false),
        };
        set_output(&mut self.in1, a)?;
        set_output(&mut self.in2, b)?;

        let (num, denom) = match spin {
            Spin::Coast => (0, 1),
            _ => power.duty_fraction(),
        };
        self.pwm
            .set_duty_cycle_fraction(u16::from(num), u16::from(denom))
            .map_err(|e| DriveError::Pwm(e.kind()))
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use embedded_hal::digital::{self, OutputPin};
    use embedded_hal::pwm::{self, SetDutyCycle};
    use std::cell::Cell;
    use std::convert::Infallible;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    pub struct Pin(pub Rc<Cell<bool>>);

    impl digital::ErrorType for Pin {
        type Error = Infallible;
    }

    impl OutputPin for Pin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.set(false);
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.set(true);
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    pub struct Pwm(pub Rc<Cell<u16>>);

    impl pwm::ErrorType for Pwm {
        type Error = Infallible;
    }

    impl SetDutyCycle for Pwm {
        fn max_duty_cycle(&self) -> u16 {
            255
        }
        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
            self.0.set(duty);
            Ok(())
        }
    }

    /// Pin that always fails.
    pub struct BrokenPin;

    impl digital::ErrorType for BrokenPin {
        type Error = digital::ErrorKind;
    }

    impl OutputPin for BrokenPin {
        fn set_low(&mut self) -> Result<(), digital::ErrorKind> {
            Err(digital::ErrorKind::Other)
        }
        fn set_high(&mut self) -> Result<(), digital::ErrorKind> {
            Err(digital::ErrorKind::Other)
        }
    }

    /// Handles to the observable outputs of one fake bridge.
    #[derive(Clone, Default)]
    pub struct Probe {
        pub in1: Pin,
        pub in2: Pin,
        pub pwm: Pwm,
    }

    impl Probe {
        pub fn bridge(&self) -> super::HBridge<Pin, Pin, Pwm> {
            super::HBridge::new(self.in1.clone(), self.in2.clone(), self.pwm.clone())
        }

        pub fn levels(&self) -> (bool, bool, u16) {
            (self.in1.0.get(), self.in2.0.get(), self.pwm.0.get())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::{BrokenPin, Probe, Pwm};
    use super::*;

    #[test]
    fn forward_sets_in1_and_scales_duty() {
        let probe = Probe::default();
        let mut bridge = probe.bridge();
        bridge.spin(Spin::Forward, Power::new(9)).unwrap();
        assert_eq!(probe.levels(), (true, false, 255));

        // power * 255 / 9, rounded down
        bridge.spin(Spin::Forward, Power::new(4)).unwrap();
        assert_eq!(probe.levels(), (true, false, 113));
    }

    #[test]
    fn reverse_and_coast() {
        let probe = Probe::default();
        let mut bridge = probe.bridge();
        bridge.spin(Spin::Reverse, Power::new(3)).unwrap();
        assert_eq!(probe.levels(), (false, true, 85));

        bridge.spin(Spin::Coast, Power::new(9)).unwrap();
        assert_eq!(probe.levels(), (false, false, 0));
    }

    #[test]
    fn pin_failure_is_reported() {
        let mut bridge = HBridge::new(BrokenPin, BrokenPin, Pwm::default());
        assert_eq!(
            bridge.spin(Spin::Forward, Power::new(1)),
            Err(DriveError::Pin(digital::ErrorKind::Other))
        );
    }

    #[test]
    fn reversed_spin() {
        assert_eq!(Spin::Forward.reversed(), Spin::Reverse);
        assert_eq!(Spin::Coast.reversed(), Spin::Coast);
    }
}
