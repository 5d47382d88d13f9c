use anyhow::{Context, Result};
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use crate::command::Command;
use crate::framer::LineFramer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpEnd {
    /// The reader ran dry.
    Eof,
    /// Nobody is listening on the channel any more.
    ReceiverGone,
}

/// Reads `reader` to the end, sending one command per complete line.
pub fn pump<R: Read>(mut reader: R, tx: &Sender<Command>) -> Result<PumpEnd> {
    let mut framer = LineFramer::new();
    let mut chunk = [0u8; 64];
    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e).context("link read failed"),
        };
        for &byte in &chunk[..n] {
            if let Some(line) = framer.push(byte) {
                if tx.send(Command::classify(line)).is_err() {
                    return Ok(PumpEnd::ReceiverGone);
                }
            }
        }
    }
    if let Some(line) = framer.finish() {
        if tx.send(Command::classify(line)).is_err() {
            return Ok(PumpEnd::ReceiverGone);
        }
    }
    Ok(PumpEnd::Eof)
}

/// Reads detector lines from stdin on a background thread. The sender is
/// dropped when stdin closes, which the control loop sees as a disconnect.
pub fn spawn_stdin(tx: Sender<Command>) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("link-stdin".into())
        .spawn(move || {
            let stdin = io::stdin();
            match pump(stdin.lock(), &tx) {
                Ok(end) => log::info!("stdin link finished ({:?})", end),
                Err(e) => log::error!("stdin link failed: {:?}", e),
            }
        })
        .context("failed to spawn stdin reader")
}

/// Accepts one TCP client at a time on `bind`, greets it and forwards its
/// lines. Returns the bound address, useful when `bind` used port 0.
pub fn spawn_tcp(
    bind: &str,
    greeting: &str,
    tx: Sender<Command>,
) -> Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind(bind).with_context(|| format!("failed to bind {}", bind))?;
    let addr = listener.local_addr()?;
    log::info!("link listening on {}", addr);

    let greeting = greeting.to_owned();
    let handle = thread::Builder::new()
        .name("link-tcp".into())
        .spawn(move || serve(listener, &greeting, &tx))
        .context("failed to spawn tcp reader")?;
    Ok((addr, handle))
}

fn serve(listener: TcpListener, greeting: &str, tx: &Sender<Command>) {
    for stream in listener.incoming() {
        let mut stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                log::warn!("link accept failed: {}", e);
                continue;
            }
        };
        let peer = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        log::info!("link client connected: {}", peer);

        if !greeting.is_empty() {
            if let Err(e) = writeln!(stream, "{}", greeting) {
                log::warn!("could not greet {}: {}", peer, e);
            }
        }

        match pump(&stream, tx) {
            Ok(PumpEnd::ReceiverGone) => return,
            Ok(PumpEnd::Eof) => log::info!("link client {} disconnected", peer),
            Err(e) => log::warn!("link client {} dropped: {:?}", peer, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Cursor};
    use std::net::TcpStream;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn pump_forwards_every_line() {
        let (tx, rx) = mpsc::channel();
        let input = Cursor::new(b"QR:FRONT,1,2,60,60\nRESET\r\nQR:BACK,1,2,60,60".to_vec());
        assert_eq!(pump(input, &tx).unwrap(), PumpEnd::Eof);
        drop(tx);

        let got: Vec<Command> = rx.iter().collect();
        assert_eq!(
            got,
            vec![
                Command::Report("QR:FRONT,1,2,60,60".into()),
                Command::Reset,
                Command::Report("QR:BACK,1,2,60,60".into()),
            ]
        );
    }

    #[test]
    fn pump_stops_when_receiver_is_gone() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let input = Cursor::new(b"a\nb\n".to_vec());
        assert_eq!(pump(input, &tx).unwrap(), PumpEnd::ReceiverGone);
    }

    struct Failing;

    impl Read for Failing {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }
    }

    #[test]
    fn pump_reports_read_errors() {
        let (tx, _rx) = mpsc::channel();
        assert!(pump(Failing, &tx).is_err());
    }

    #[test]
    fn tcp_client_is_greeted_and_heard() {
        let (tx, rx) = mpsc::channel();
        let (addr, _handle) = spawn_tcp("127.0.0.1:0", "dockbot ready", tx).unwrap();

        let mut client = TcpStream::connect(addr).unwrap();
        client
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        let mut greeting = String::new();
        BufReader::new(client.try_clone().unwrap())
            .read_line(&mut greeting)
            .unwrap();
        assert_eq!(greeting.trim_end(), "dockbot ready");

        client.write_all(b"QR:FRONT,160,120,60,60\nRESET\n").unwrap();
        let timeout = Duration::from_secs(5);
        assert_eq!(
            rx.recv_timeout(timeout).unwrap(),
            Command::Report("QR:FRONT,160,120,60,60".into())
        );
        assert_eq!(rx.recv_timeout(timeout).unwrap(), Command::Reset);
    }
}
