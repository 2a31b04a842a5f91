//! Worker thread draining the net logger's queue.
//!
//! Exactly one drain thread exists per sink instance. It processes commands
//! strictly in submission order, one at a time, which is what guarantees that
//! frames reach the wire in emit order and are never interleaved mid-line.

use std::{
    io::{self, Write},
    net::TcpStream,
    thread,
    time::Duration,
};

use crossbeam_channel::{Receiver, Sender, bounded};
use log::warn;

use crate::drop_counter::DropCounter;

/// Commands processed by the drain thread.
pub enum Command {
    /// A formatted line, not yet newline-terminated.
    Line(String),
    /// Flush the socket and acknowledge.
    Flush(Sender<()>),
    /// Flush, acknowledge, and exit. Lines queued beforehand are still
    /// written first because the channel is FIFO.
    Shutdown(Sender<()>),
}

pub fn spawn_worker(
    name: String,
    connection: Option<TcpStream>,
    capacity: usize,
    write_timeout: Duration,
    warn_interval: Duration,
) -> (Sender<Command>, thread::JoinHandle<()>) {
    let (tx, rx) = bounded(capacity);
    let handle =
        thread::spawn(move || worker_loop(name, connection, rx, write_timeout, warn_interval));
    (tx, handle)
}

fn worker_loop(
    name: String,
    mut connection: Option<TcpStream>,
    rx: Receiver<Command>,
    write_timeout: Duration,
    warn_interval: Duration,
) {
    if let Some(stream) = connection.as_ref() {
        let _ = stream.set_write_timeout(Some(write_timeout));
    }
    let drops = DropCounter::new(warn_interval);
    while let Ok(cmd) = rx.recv() {
        match cmd {
            Command::Line(line) => {
                let Some(stream) = connection.as_mut() else {
                    drops.note();
                    drops.warn_if_due(&name, "no connection");
                    continue;
                };
                if let Err(err) = write_line(stream, &line) {
                    warn!("{name}: write failed ({err}); entering degraded mode");
                    connection = None;
                    drops.note();
                }
            }
            Command::Flush(ack) => {
                if let Some(stream) = connection.as_mut() {
                    let _ = stream.flush();
                }
                let _ = ack.send(());
            }
            Command::Shutdown(ack) => {
                if let Some(stream) = connection.as_mut() {
                    let _ = stream.flush();
                }
                let _ = ack.send(());
                break;
            }
        }
    }
    drops.drain(&name);
}

fn write_line(stream: &mut TcpStream, line: &str) -> io::Result<()> {
    stream.write_all(line.as_bytes())?;
    stream.write_all(b"\n")?;
    stream.flush()
}
