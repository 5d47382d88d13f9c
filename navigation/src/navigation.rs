use serde::Serialize;

use crate::config::NavigationConfig;
use crate::controller::ProportionalController;
use crate::intent::{MotionIntent, MotionSink};
use crate::observation::{MarkerObservation, ObservationStore, ParseError, Snapshot};
use crate::states::DockingState;

/// Outcome of one control tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub previous: DockingState,
    pub state: DockingState,
    pub intent: MotionIntent,
}

impl Tick {
    pub fn transitioned(&self) -> bool {
        self.previous != self.state
    }
}

/// Read-only view for logging and debugging.
#[derive(Debug, Clone, Serialize)]
pub struct Telemetry {
    pub state: DockingState,
    pub observation: MarkerObservation,
    pub marker_valid: bool,
    pub last_intent: MotionIntent,
    pub ticks: u64,
    pub in_state_ms: u64,
}

/// Owns everything one robot needs to dock: the observation store, the
/// current state and the controller.
#[derive(Debug, Clone)]
pub struct Navigator {
    config: NavigationConfig,
    controller: ProportionalController,
    store: ObservationStore,
    state: DockingState,
    state_since: u64,
    ticks: u64,
    last_intent: MotionIntent,
}

impl Navigator {
    pub fn new(config: NavigationConfig, now: u64) -> Self {
        Navigator {
            controller: ProportionalController::from_config(&config),
            store: ObservationStore::from_config(&config),
            config,
            state: DockingState::Searching,
            state_since: now,
            ticks: 0,
            last_intent: MotionIntent::Stop,
        }
    }

    /// Feeds one line from the detector. Lines that are not marker reports
    /// are ignored; malformed or out-of-range reports leave the store as is.
    pub fn ingest(&mut self, line: &str, now: u64) -> Result<(), ParseError> {
        let result = self.store.ingest(line.as_bytes(), now);
        match &result {
            Ok(()) => log::trace!("marker report accepted: {}", line.trim_end()),
            Err(ParseError::NotAReport) => {}
            Err(e) => log::debug!("rejected marker report {:?}: {}", line.trim_end(), e),
        }
        result
    }

    /// Runs one control tick and returns the motion to perform.
    pub fn tick(&mut self, now: u64) -> Tick {
        self.ticks += 1;
        let previous = self.state;

        let expired = self.store.expire(now);
        let (state, intent) = if expired && !previous.survives_marker_loss() {
            log::warn!("marker lost while {}", previous);
            (DockingState::Lost, MotionIntent::Stop)
        } else {
            transition(
                previous,
                self.store.current(now),
                &self.config,
                &self.controller,
            )
        };

        if state != previous {
            log::info!("{} -> {}", previous, state);
            self.state_since = now;
        }
        self.state = state;
        self.last_intent = intent;

        Tick {
            previous,
            state,
            intent,
        }
    }

    /// [`tick`](Self::tick) followed by dispatching the intent to `sink`.
    /// The state has already advanced when the sink fails.
    pub fn update<S: MotionSink + ?Sized>(
        &mut self,
        now: u64,
        sink: &mut S,
    ) -> Result<Tick, S::Error> {
        let tick = self.tick(now);
        tick.intent.dispatch(sink)?;
        Ok(tick)
    }

    /// Forgets the marker and starts over from Searching.
    pub fn reset(&mut self, now: u64) {
        log::info!("navigation reset from {}", self.state);
        self.store.clear();
        self.state = DockingState::Searching;
        self.state_since = now;
        self.last_intent = MotionIntent::Stop;
    }

    pub fn state(&self) -> DockingState {
        self.state
    }

    pub fn observation(&self, now: u64) -> Snapshot<'_> {
        self.store.current(now)
    }

    pub fn telemetry(&self, now: u64) -> Telemetry {
        let snapshot = self.store.current(now);
        Telemetry {
            state: self.state,
            observation: snapshot.observation.clone(),
            marker_valid: snapshot.valid,
            last_intent: self.last_intent,
            ticks: self.ticks,
            in_state_ms: now.saturating_sub(self.state_since),
        }
    }
}

fn search(config: &NavigationConfig) -> (DockingState, MotionIntent) {
    (
        DockingState::Searching,
        MotionIntent::TurnLeft(config.search_power()),
    )
}

/// Per-state decision for one tick: `(next_state, intent)`.
///
/// Every tick that lands in Searching issues the search rotation; the other
/// hand-over ticks stop the robot for one period.
pub fn transition(
    state: DockingState,
    snapshot: Snapshot<'_>,
    config: &NavigationConfig,
    controller: &ProportionalController,
) -> (DockingState, MotionIntent) {
    let marker = snapshot.observation;

    match state {
        DockingState::Searching => {
            if snapshot.valid {
                (DockingState::TargetFound, MotionIntent::Stop)
            } else {
                search(config)
            }
        }

        DockingState::TargetFound => {
            if snapshot.valid && marker.id.as_str() == config.docking_face {
                (DockingState::Approaching, MotionIntent::Stop)
            } else {
                if snapshot.valid {
                    log::debug!("face {} is not the docking face", marker.id);
                }
                search(config)
            }
        }

        DockingState::Approaching => {
            if !snapshot.valid {
                return search(config);
            }
            if marker.width >= config.align_width() {
                return (DockingState::Aligning, MotionIntent::Stop);
            }
            let velocity = controller.command(snapshot);
            let power = config.approach_power();
            let intent = if velocity.rotate.abs() > 1 {
                MotionIntent::turn(velocity.rotate, power)
            } else if velocity.translate.abs() > 1 {
                MotionIntent::translate(velocity.translate, power)
            } else {
                MotionIntent::MoveForward(power)
            };
            (DockingState::Approaching, intent)
        }

        DockingState::Aligning => {
            if !snapshot.valid {
                return search(config);
            }
            let x_offset = marker.x_offset(config.frame_center_x());
            let width_error = marker.width_error(config.dock_width);
            if x_offset.abs() < i64::from(config.center_tolerance)
                && width_error.abs() < i64::from(config.dock_width_tolerance)
            {
                return (DockingState::Docking, MotionIntent::Stop);
            }
            let velocity = controller.command(snapshot);
            let power = config.align_power();
            let intent = if velocity.rotate != 0 {
                MotionIntent::turn(velocity.rotate, power)
            } else if velocity.translate != 0 {
                MotionIntent::translate(velocity.translate, power)
            } else if velocity.forward < 0 {
                // Marker still smaller than the docking width: close in.
                MotionIntent::MoveForward(power)
            } else if velocity.forward > 0 {
                MotionIntent::MoveBackward(power)
            } else {
                MotionIntent::Stop
            };
            (DockingState::Aligning, intent)
        }

        DockingState::Docking => {
            if !snapshot.valid {
                return search(config);
            }
            if marker.width >= config.dock_complete_width {
                return (DockingState::Docked, MotionIntent::Stop);
            }
            let x_offset = marker.x_offset(config.frame_center_x());
            if x_offset.abs() > i64::from(config.center_tolerance) {
                let direction = if x_offset > 0 { 1 } else { -1 };
                (
                    DockingState::Docking,
                    MotionIntent::translate(direction, config.align_power()),
                )
            } else {
                (
                    DockingState::Docking,
                    MotionIntent::MoveForward(config.dock_power()),
                )
            }
        }

        DockingState::Docked => (DockingState::Docked, MotionIntent::Stop),

        // The stop was issued on the tick that entered Lost.
        DockingState::Lost => search(config),
    }
}
