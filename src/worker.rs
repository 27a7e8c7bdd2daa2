//! Background ticker owned by the bridge. At most one worker thread is alive
//! per instance; each tick emits a `{threadCount: n}` event until a halt
//! message (or a dropped control handle) ends the loop.

use std::sync::Mutex;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};

use crate::events::{EventSender, TickEvent};
use crate::logging::log_debug;

pub const STATUS_STARTED: &str = "Thread Started";
pub const STATUS_ALREADY_RUNNING: &str = "Thread Running";
pub const STATUS_STOPPED: &str = "Thread stopped";
pub const STATUS_NOT_RUNNING: &str = "Thread not running";

/// Control handle for the live worker thread; present only while running.
struct TickerHandle {
    halt_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// Start/stop controller for the interval worker. All transitions go through
/// the inner lock, which is what keeps a second `start` from racing a live
/// thread into existence.
pub struct Ticker {
    interval: Duration,
    events: EventSender,
    inner: Mutex<Option<TickerHandle>>,
}

impl Ticker {
    pub fn new(interval: Duration, events: EventSender) -> Self {
        Self {
            interval,
            events,
            inner: Mutex::new(None),
        }
    }

    /// Spawn the worker unless one is already running; repeated starts are a
    /// reported no-op.
    pub fn start(&self, callback_id: &str) -> &'static str {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if guard.is_some() {
            return STATUS_ALREADY_RUNNING;
        }

        let (halt_tx, halt_rx) = bounded(1);
        let events = self.events.clone();
        let interval = self.interval;
        let callback_id = callback_id.to_string();
        let handle = thread::spawn(move || run_tick_loop(interval, halt_rx, events, callback_id));

        *guard = Some(TickerHandle { halt_tx, handle });
        STATUS_STARTED
    }

    /// Signal halt and join. The caller is suspended until the worker thread
    /// has exited; the halt message wakes a sleeping worker immediately, so
    /// in practice this returns within one tick callback.
    pub fn stop(&self) -> &'static str {
        let taken = self
            .inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        let Some(TickerHandle { halt_tx, handle }) = taken else {
            return STATUS_NOT_RUNNING;
        };

        let _ = halt_tx.send(());
        if handle.join().is_err() {
            log_debug("ticker worker panicked before join");
        }
        STATUS_STOPPED
    }

    pub fn is_running(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Sleep one interval, tick, repeat. The halt channel doubles as the alarm
/// clock: a message (or a dropped sender) ends the loop between ticks, and
/// the tick count restarts from zero on every fresh start.
fn run_tick_loop(
    interval: Duration,
    halt_rx: Receiver<()>,
    events: EventSender,
    callback_id: String,
) {
    let mut tick_count: u64 = 0;
    loop {
        match halt_rx.recv_timeout(interval) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                tick_count += 1;
                events.emit(
                    &callback_id,
                    &TickEvent {
                        thread_count: tick_count,
                    },
                );
            }
        }
    }
}
