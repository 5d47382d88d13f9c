//! Carries detector lines into the control loop. Bytes are framed into lines,
//! classified as commands and sent over a channel by a reader thread.

pub mod command;
pub mod framer;
pub mod reader;

pub use command::Command;
pub use framer::{LineFramer, LINE_CAPACITY};
pub use reader::{pump, spawn_stdin, spawn_tcp, PumpEnd};
