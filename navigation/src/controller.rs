use pid::Pid;
use serde::Serialize;

use crate::config::NavigationConfig;
use crate::observation::Snapshot;

/// Every speed command is clamped to `-SPEED_LIMIT..=SPEED_LIMIT`.
pub const SPEED_LIMIT: i32 = 9;

/// Desired speeds for one tick. Signs: forward is negative while the marker
/// is smaller than the docking width, translate is positive when the marker
/// sits right of centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Velocity {
    pub forward: i32,
    pub rotate: i32,
    pub translate: i32,
}

/// P-only controller on marker position and apparent size. Holds no state
/// between calls.
#[derive(Debug, Clone, PartialEq)]
pub struct ProportionalController {
    kp_x: f64,
    kp_distance: f64,
    frame_center_x: i32,
    dock_width: u32,
}

impl ProportionalController {
    pub fn new(kp_x: f64, kp_distance: f64, frame_center_x: i32, dock_width: u32) -> Self {
        ProportionalController {
            kp_x,
            kp_distance,
            frame_center_x,
            dock_width,
        }
    }

    pub fn from_config(config: &NavigationConfig) -> Self {
        Self::new(
            config.kp_x,
            config.kp_distance,
            config.frame_center_x(),
            config.dock_width,
        )
    }

    pub fn command(&self, snapshot: Snapshot<'_>) -> Velocity {
        if !snapshot.valid {
            return Velocity::default();
        }
        let marker = snapshot.observation;
        Velocity {
            forward: p_term(
                self.kp_distance,
                f64::from(self.dock_width),
                f64::from(marker.width),
            ),
            // Rotation correction is not implemented; kept as an explicit zero.
            rotate: 0,
            translate: p_term(
                self.kp_x,
                f64::from(self.frame_center_x),
                f64::from(marker.center_x),
            ),
        }
    }
}

/// `round(gain * (measurement - setpoint))`, clamped to the speed limit.
fn p_term(gain: f64, setpoint: f64, measurement: f64) -> i32 {
    let limit = f64::from(SPEED_LIMIT);
    // Pid works on (setpoint - measurement), hence the negated gain.
    let mut pid: Pid<f64> = Pid::new(setpoint, limit);
    pid.p(-gain, limit);
    let output = pid.next_control_output(measurement).output;
    if output.is_finite() {
        output.round() as i32
    } else {
        0
    }
}
