//! Marker-guided docking: turns `QR:` sightings into one motion command per
//! control tick.
//!
//! Nothing in here blocks, sleeps or touches hardware. The caller feeds lines
//! with [`Navigator::ingest`], calls [`Navigator::update`] once per period and
//! supplies a [`MotionSink`] that moves the wheels.

pub mod config;
pub mod controller;
pub mod intent;
pub mod navigation;
pub mod observation;
pub mod states;

pub use config::{ConfigError, NavigationConfig};
pub use controller::{ProportionalController, Velocity, SPEED_LIMIT};
pub use intent::{MotionIntent, MotionSink, Power};
pub use navigation::{transition, Navigator, Telemetry, Tick};
pub use observation::{
    parse_report, MarkerId, MarkerObservation, MarkerReport, ObservationStore, ParseError,
    Snapshot,
};
pub use states::DockingState;
