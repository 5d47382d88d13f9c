// This module contains the docking state enum and its helpers.
// Transition logic lives in navigation.rs, not here.

use serde::Serialize;
use std::fmt;

/// - Searching: rotating in place until a marker shows up
/// - TargetFound: a marker is visible, deciding whether it is the docking face
/// - Approaching: closing the distance while keeping the marker centred
/// - Aligning: slow corrections until centred at the docking distance
/// - Docking: final push forward
/// - Docked: contact made, motors held stopped
/// - Lost: marker timed out mid-manoeuvre, falls back to Searching next tick
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default, Serialize)]
pub enum DockingState {
    #[default]
    Searching,
    TargetFound,
    Approaching,
    Aligning,
    Docking,
    Docked,
    Lost,
}

impl DockingState {
    /// States the staleness rule never forces into Lost.
    pub fn survives_marker_loss(&self) -> bool {
        matches!(self, DockingState::Searching | DockingState::Docked)
    }

    /// Docked only leaves through an external reset.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DockingState::Docked)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DockingState::Searching => "searching",
            DockingState::TargetFound => "target-found",
            DockingState::Approaching => "approaching",
            DockingState::Aligning => "aligning",
            DockingState::Docking => "docking",
            DockingState::Docked => "docked",
            DockingState::Lost => "lost",
        }
    }
}

impl fmt::Display for DockingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
