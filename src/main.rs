use clock::MonotonicClock;
use drive::LogSink;
use env_logger::Env;
use log::*;
use std::sync::mpsc;

mod config;
mod driver;

use config::{Config, LinkSource};
use driver::Driver;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    // ======== Configuration ========
    let config = Config::load()?;
    info!(
        "Docking on face {} (dock width {} px, timeout {} ms)",
        config.get_docking_face(),
        config.navigation.dock_width,
        config.navigation.timeout_ms
    );

    // ======== Detector link ========
    let (tx, rx) = mpsc::channel();
    let _reader = match config.get_link_source() {
        LinkSource::Stdin => link::spawn_stdin(tx)?,
        LinkSource::Tcp => {
            let (addr, handle) =
                link::spawn_tcp(config.get_bind_address(), config.get_greeting(), tx)?;
            info!("Waiting for the detector on {}", addr);
            handle
        }
    };

    // ======== Control loop ========
    // No motor hardware on the host; motions are logged instead.
    let mut driver = Driver::new(&config, LogSink::new(), MonotonicClock::new(), rx);
    driver.run();

    info!("Final state: {}", driver.navigator().state());
    Ok(())
}
