//! Motion sinks: a mecanum H-bridge drive for the real robot and a logging
//! sink for running without hardware.

pub mod hbridge;
pub mod log_sink;
pub mod mecanum;

pub use hbridge::{DriveError, HBridge, Spin, Wheel};
pub use log_sink::LogSink;
pub use mecanum::MecanumDrive;
