//! Stopwatch and redraw ticker for timing a contraction in progress

use crate::error::TimerError;
use crate::records::{now_millis, EpochMillis};
use log::{debug, error};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

/// Default redraw interval for the elapsed-time display
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(200);

/// Measures one contraction from start to stop
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stopwatch {
    started_at: Option<EpochMillis>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn started_at(&self) -> Option<EpochMillis> {
        self.started_at
    }

    /// Start timing now
    pub fn start(&mut self) -> Result<EpochMillis, TimerError> {
        self.start_at(now_millis())
    }

    /// Start timing at the given instant
    pub fn start_at(&mut self, at: EpochMillis) -> Result<EpochMillis, TimerError> {
        if self.started_at.is_some() {
            return Err(TimerError::AlreadyRunning);
        }
        self.started_at = Some(at);
        Ok(at)
    }

    /// Stop timing now, returning the `(start, end)` pair
    pub fn stop(&mut self) -> Result<(EpochMillis, EpochMillis), TimerError> {
        self.stop_at(now_millis())
    }

    /// Stop timing at the given instant, returning the `(start, end)` pair
    pub fn stop_at(&mut self, at: EpochMillis) -> Result<(EpochMillis, EpochMillis), TimerError> {
        let start = self.started_at.take().ok_or(TimerError::NotRunning)?;
        Ok((start, at))
    }

    /// Abandon the current timing without producing a measurement
    pub fn cancel(&mut self) -> Option<EpochMillis> {
        self.started_at.take()
    }

    /// Elapsed whole seconds as of `at`, zero when idle or when `at` precedes the start
    pub fn elapsed_secs_at(&self, at: EpochMillis) -> u64 {
        match self.started_at {
            Some(start) if at > start => (at.saturating_sub(start) / 1000) as u64,
            _ => 0,
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs_at(now_millis())
    }
}

/// Background thread that reports elapsed time at a fixed interval
///
/// The ticker only reads the start instant it was given; it never touches
/// the contraction history.
pub struct Ticker {
    shutdown_sender: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Spawn a ticker for a timing that started at `started_at`
    ///
    /// # Arguments
    ///
    /// * `started_at` - Start instant of the timing in progress
    /// * `interval` - Delay between redraws
    /// * `on_tick` - Called with the elapsed whole seconds on every tick
    pub fn spawn<F>(started_at: EpochMillis, interval: Duration, mut on_tick: F) -> Self
    where
        F: FnMut(u64) + Send + 'static,
    {
        let (shutdown_sender, shutdown_receiver) = mpsc::channel::<()>();
        let stopwatch = Stopwatch {
            started_at: Some(started_at),
        };

        let handle = std::thread::spawn(move || {
            debug!("Ticker thread started");
            loop {
                on_tick(stopwatch.elapsed_secs());

                match shutdown_receiver.recv_timeout(interval) {
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {}
                }
            }
            debug!("Ticker thread stopped");
        });

        Self {
            shutdown_sender,
            handle: Some(handle),
        }
    }

    /// Stop the ticker and wait for its thread to exit
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // The thread may already have exited; a failed send is fine.
        let _ = self.shutdown_sender.send(());
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.join() {
                error!("Ticker thread failed to join: {:?}", e);
            }
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
