//! File-stability polling for externally-produced tiles.
//!
//! A tile being written by the acquisition side has no terminating marker;
//! the only signal is its size. A file is considered done once two
//! consecutive non-zero size samples agree. A wait that exceeds the stall
//! threshold raises one alert and keeps polling; it never gives up on its
//! own, only cancellation ends it early.

use crate::io::notify::Notifier;
use crate::types::{DownloadState, GeotagError, GeotagResult};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cooperative cancellation signal checked on every poll tick
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Per-file completion state machine, one instance per monitored path.
///
/// Pure transition logic: feed it size samples (and whether the stall
/// threshold has elapsed) and it reports the resulting state. The clock and
/// filesystem stay outside, which keeps the machine testable tick by tick.
#[derive(Debug)]
pub struct StabilityProbe {
    previous_size: u64,
    state: DownloadState,
    notified: bool,
}

impl Default for StabilityProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl StabilityProbe {
    pub fn new() -> Self {
        Self {
            previous_size: 0,
            state: DownloadState::Waiting,
            notified: false,
        }
    }

    pub fn state(&self) -> DownloadState {
        self.state
    }

    /// Observe one poll tick. `size` is `None` while the file does not exist
    /// yet. Completion requires the current sample to equal the previous
    /// non-zero sample; a zero size never counts as stable.
    pub fn observe(&mut self, size: Option<u64>, stall_elapsed: bool) -> DownloadState {
        if self.state == DownloadState::Complete {
            return self.state;
        }

        if let Some(current) = size {
            if current == self.previous_size && self.previous_size != 0 {
                self.state = DownloadState::Complete;
                return self.state;
            }
            self.previous_size = current;
        }

        self.state = if stall_elapsed {
            DownloadState::Stalled
        } else if self.previous_size != 0 {
            DownloadState::StableCandidate
        } else {
            DownloadState::Waiting
        };
        self.state
    }

    /// True exactly once, on the first call after entering the stalled state
    pub fn should_notify(&mut self) -> bool {
        if self.state == DownloadState::Stalled && !self.notified {
            self.notified = true;
            true
        } else {
            false
        }
    }
}

/// Blocking download-completion monitor.
///
/// Polls a path at a fixed cadence until a `StabilityProbe` reports
/// completion. Stalls raise exactly one alert per wait and polling
/// continues indefinitely.
pub struct DownloadMonitor {
    machine_id: String,
    poll_interval: Duration,
    stall_threshold: Duration,
}

impl DownloadMonitor {
    /// Default cadence: 1 s polls, 600 s stall threshold
    pub fn new(machine_id: impl Into<String>) -> Self {
        Self {
            machine_id: machine_id.into(),
            poll_interval: Duration::from_secs(1),
            stall_threshold: Duration::from_secs(600),
        }
    }

    pub fn with_stall_threshold(mut self, threshold: Duration) -> Self {
        self.stall_threshold = threshold;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Block until `path` has a stable non-zero size.
    ///
    /// Returns `Cancelled` if the token fires; otherwise only returns on
    /// completion. A stalled wait alerts through `notifier` once and keeps
    /// polling; notifier failures are logged, never propagated.
    pub fn wait_for_completion(
        &self,
        path: &Path,
        notifier: &dyn Notifier,
        cancel: &CancelToken,
    ) -> GeotagResult<()> {
        log::debug!("Waiting for completion of {}", path.display());
        let started = Instant::now();
        let mut probe = StabilityProbe::new();

        loop {
            if cancel.is_cancelled() {
                log::warn!("Wait cancelled for {}", path.display());
                return Err(GeotagError::Cancelled(path.display().to_string()));
            }

            let size = std::fs::metadata(path).ok().map(|m| m.len());
            let stall_elapsed = started.elapsed() > self.stall_threshold;

            if probe.observe(size, stall_elapsed) == DownloadState::Complete {
                log::info!("Saved file: {}", path.display());
                return Ok(());
            }

            if probe.should_notify() {
                log::warn!(
                    "Download stalled for {} after {:?}, alerting",
                    path.display(),
                    started.elapsed()
                );
                if let Err(e) = notifier.notify(&self.machine_id) {
                    log::error!("Notification delivery failed: {}", e);
                }
            }

            std::thread::sleep(self.poll_interval);
        }
    }
}
