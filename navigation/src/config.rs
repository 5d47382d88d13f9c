use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::intent::Power;

/// Tunables for marker acceptance, control gains and per-phase power.
///
/// Defaults are the values the robot ships with
/// (QVGA frames, 80 px docking width, FRONT face).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    // Marker acceptance
    pub width_min: u32,
    pub width_max: u32,
    pub dock_width: u32,
    pub dock_complete_width: u32,
    pub center_tolerance: u32,
    /// Approaching hands over to Aligning at `dock_width - align_margin`.
    pub align_margin: u32,
    /// Aligning needs the width within this many pixels of `dock_width`.
    pub dock_width_tolerance: u32,

    // Frame geometry
    pub frame_width: u32,
    pub frame_height: u32,

    pub timeout_ms: u64,

    // Gains
    pub kp_x: f64,
    pub kp_distance: f64,
    /// Unused until rotation correction exists.
    pub kp_rotation: f64,

    // Power levels (0-9)
    pub search_power: u8,
    pub approach_power: u8,
    pub align_power: u8,
    pub dock_power: u8,

    pub docking_face: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        NavigationConfig {
            width_min: 30,
            width_max: 200,
            dock_width: 80,
            dock_complete_width: 90,
            center_tolerance: 20,
            align_margin: 20,
            dock_width_tolerance: 10,
            frame_width: 320,
            frame_height: 240,
            timeout_ms: 2000,
            kp_x: 0.3,
            kp_distance: 0.4,
            kp_rotation: 0.5,
            search_power: 3,
            approach_power: 4,
            align_power: 2,
            dock_power: 3,
            docking_face: "FRONT".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("width_min {min} is greater than width_max {max}")]
    WidthRange { min: u32, max: u32 },
    #[error("{name} = {value} lies outside the accepted width range {min}..={max}")]
    OutsideWidthRange {
        name: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
    #[error("gain {name} must be finite and non-negative, got {value}")]
    Gain { name: &'static str, value: f64 },
    #[error("power {name} = {value} exceeds 9")]
    Power { name: &'static str, value: u8 },
    #[error("timeout_ms must be non-zero")]
    ZeroTimeout,
    #[error("docking_face must not be empty")]
    EmptyFace,
    #[error("docking_face is longer than {max} bytes")]
    FaceTooLong { max: usize },
}

impl NavigationConfig {
    pub fn frame_center_x(&self) -> i32 {
        i32::try_from(self.frame_width / 2).unwrap_or(i32::MAX)
    }

    pub fn search_power(&self) -> Power {
        Power::new(self.search_power)
    }

    pub fn approach_power(&self) -> Power {
        Power::new(self.approach_power)
    }

    pub fn align_power(&self) -> Power {
        Power::new(self.align_power)
    }

    pub fn dock_power(&self) -> Power {
        Power::new(self.dock_power)
    }

    /// Width at which Approaching hands over to Aligning.
    pub fn align_width(&self) -> u32 {
        self.dock_width.saturating_sub(self.align_margin)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width_min > self.width_max {
            return Err(ConfigError::WidthRange {
                min: self.width_min,
                max: self.width_max,
            });
        }
        for (name, value) in [
            ("dock_width", self.dock_width),
            ("dock_complete_width", self.dock_complete_width),
        ] {
            if value < self.width_min || value > self.width_max {
                return Err(ConfigError::OutsideWidthRange {
                    name,
                    value,
                    min: self.width_min,
                    max: self.width_max,
                });
            }
        }
        for (name, value) in [
            ("kp_x", self.kp_x),
            ("kp_distance", self.kp_distance),
            ("kp_rotation", self.kp_rotation),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Gain { name, value });
            }
        }
        for (name, value) in [
            ("search_power", self.search_power),
            ("approach_power", self.approach_power),
            ("align_power", self.align_power),
            ("dock_power", self.dock_power),
        ] {
            if value > Power::MAX.level() {
                return Err(ConfigError::Power { name, value });
            }
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.docking_face.is_empty() {
            return Err(ConfigError::EmptyFace);
        }
        if self.docking_face.len() > crate::observation::MARKER_ID_CAPACITY {
            return Err(ConfigError::FaceTooLong {
                max: crate::observation::MARKER_ID_CAPACITY,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = NavigationConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.frame_center_x(), 160);
        assert_eq!(config.align_width(), 60);
    }

    #[test]
    fn rejects_inverted_width_range() {
        let config = NavigationConfig {
            width_min: 150,
            width_max: 100,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::WidthRange { min: 150, max: 100 })
        );
    }

    #[test]
    fn rejects_bad_gain_and_power() {
        let config = NavigationConfig {
            kp_x: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Gain { name: "kp_x", .. })
        ));

        let config = NavigationConfig {
            dock_power: 10,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::Power {
                name: "dock_power",
                value: 10
            })
        );
    }

    #[test]
    fn rejects_dock_width_out_of_range() {
        let config = NavigationConfig {
            dock_complete_width: 250,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutsideWidthRange {
                name: "dock_complete_width",
                ..
            })
        ));
    }

    #[test]
    fn rejects_empty_face() {
        let config = NavigationConfig {
            docking_face: String::new(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyFace));
    }
}
