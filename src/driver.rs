use clock::Clock;
use link::Command;
use navigation::{MotionSink, Navigator};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle {
    Continue,
    Finished,
}

/// Fixed-cadence control loop around a [`Navigator`].
pub struct Driver<S, C> {
    navigator: Navigator,
    sink: S,
    clock: C,
    commands: Receiver<Command>,
    period: Duration,
    telemetry_every: u64,
    exit_on_disconnect: bool,
    link_open: bool,
}

impl<S: MotionSink, C: Clock> Driver<S, C> {
    pub fn new(config: &Config, sink: S, clock: C, commands: Receiver<Command>) -> Self {
        let navigator = Navigator::new(config.navigation.clone(), clock.now_ms());
        Driver {
            navigator,
            sink,
            clock,
            commands,
            period: config.get_tick_period(),
            telemetry_every: config.get_telemetry_every(),
            exit_on_disconnect: config.link.exit_on_disconnect,
            link_open: true,
        }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// One control period: apply pending commands, tick, move.
    pub fn cycle(&mut self) -> Cycle {
        self.drain();

        if !self.link_open && self.exit_on_disconnect {
            if let Err(e) = self.sink.stop() {
                log::error!("could not stop motors: {:?}", e);
            }
            log::info!("link closed, stopping in {}", self.navigator.state());
            return Cycle::Finished;
        }

        let now = self.clock.now_ms();
        let transitioned = match self.navigator.update(now, &mut self.sink) {
            Ok(tick) => {
                if tick.transitioned() && tick.state.is_terminal() {
                    log::info!("docked, send RESET to start over");
                }
                tick.transitioned()
            }
            Err(e) => {
                log::error!("motion sink failed: {:?}", e);
                false
            }
        };

        let ticks = self.navigator.telemetry(now).ticks;
        let periodic = self.telemetry_every != 0 && ticks % self.telemetry_every == 0;
        if transitioned || periodic {
            self.report(now);
        }
        Cycle::Continue
    }

    fn report(&self, now: u64) {
        match serde_json::to_string(&self.navigator.telemetry(now)) {
            Ok(json) => log::info!(
                "telemetry {} {}",
                self.clock.wall_time().to_rfc3339(),
                json
            ),
            Err(e) => log::warn!("could not encode telemetry: {}", e),
        }
    }

    /// Runs until the link closes (when configured to exit on disconnect).
    pub fn run(&mut self) {
        log::info!("control loop running every {:?}", self.period);
        loop {
            let started = Instant::now();
            if self.cycle() == Cycle::Finished {
                break;
            }
            if let Some(rest) = self.period.checked_sub(started.elapsed()) {
                thread::sleep(rest);
            }
        }
    }

    fn drain(&mut self) {
        loop {
            match self.commands.try_recv() {
                Ok(Command::Report(line)) => {
                    // Rejections are logged by the navigator.
                    let _ = self.navigator.ingest(&line, self.clock.now_ms());
                }
                Ok(Command::Reset) => self.navigator.reset(self.clock.now_ms()),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.link_open {
                        log::warn!("detector link closed");
                        self.link_open = false;
                    }
                    break;
                }
            }
        }
    }
}
