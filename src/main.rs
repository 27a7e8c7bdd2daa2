use anyhow::Result;
use clap::Parser;
use crossbeam_channel::{unbounded, Sender};
use mailbridge::{
    bridge::Bridge, config::AppConfig, event_channel, init_debug_log_file,
    invoke::SystemInvoker, log_debug, log_file_path,
};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

#[cfg(not(test))]
fn main() -> Result<()> {
    run_with_args(std::env::args_os())
}

#[cfg_attr(test, allow(dead_code))]
fn run_with_args<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let mut config = AppConfig::parse_from(args);
    config.validate()?;

    init_debug_log_file();
    log_debug("=== mailbridge started ===");
    log_debug(&format!("Log file: {:?}", log_file_path()));

    run_bridge(config)
}

/// Dispatch loop: inbound command lines arrive over the stdin reader channel,
/// outbound event lines over the bridge's event channel; both leave on stdout
/// one line at a time.
fn run_bridge(config: AppConfig) -> Result<()> {
    let (events, event_rx) = event_channel();
    let invoker = Arc::new(SystemInvoker::new(
        &config.opener_cmd,
        config.invoke_cmd.as_deref(),
    ));
    let bridge = Bridge::new(invoker, events, &config);

    let (line_tx, line_rx) = unbounded();
    let _stdin_handle = spawn_stdin_reader(line_tx);

    let stdout = io::stdout();
    loop {
        crossbeam_channel::select! {
            recv(line_rx) -> line => match line {
                Ok(line) => {
                    let started = Instant::now();
                    let result = bridge.invoke_method(&line);
                    if config.log_timings {
                        log_debug(&format!(
                            "timing|phase=dispatch|ms={:.1}|line_bytes={}|result_bytes={}",
                            started.elapsed().as_secs_f64() * 1000.0,
                            line.len(),
                            result.len()
                        ));
                    }
                    if !result.is_empty() {
                        write_line(&stdout, &result)?;
                    }
                }
                // Stdin closed; shut down.
                Err(_) => break,
            },
            recv(event_rx) -> event => {
                if let Ok(event) = event {
                    write_line(&stdout, &event)?;
                }
            }
        }
    }

    bridge.shutdown();
    // Flush events the worker queued before the join finished.
    while let Ok(event) = event_rx.try_recv() {
        write_line(&stdout, &event)?;
    }

    log_debug("=== mailbridge exiting ===");
    Ok(())
}

fn spawn_stdin_reader(tx: Sender<String>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let stdin = io::stdin();
        let stdin_lock = stdin.lock();

        for line in stdin_lock.lines() {
            let line = match line {
                Ok(l) => l,
                Err(_) => break,
            };

            if line.trim().is_empty() {
                continue;
            }

            if tx.send(line).is_err() {
                break; // Main thread has exited
            }
        }

        log_debug("stdin reader thread exiting");
    })
}

fn write_line(stdout: &io::Stdout, line: &str) -> Result<()> {
    let mut lock = stdout.lock();
    writeln!(lock, "{line}")?;
    lock.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{Receiver, RecvTimeoutError};
    use std::time::Duration;

    #[test]
    fn reader_channel_closes_when_sender_thread_ends() {
        let (tx, rx): (Sender<String>, Receiver<String>) = unbounded();
        let handle = thread::spawn(move || {
            tx.send("isAvailable cb1".to_string()).expect("send");
        });
        handle.join().expect("join");

        assert_eq!(rx.recv().expect("queued line"), "isAvailable cb1");
        assert_eq!(
            rx.recv_timeout(Duration::from_millis(100)),
            Err(RecvTimeoutError::Disconnected)
        );
    }
}
