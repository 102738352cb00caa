use std::time::Duration;

use log::{trace, warn};
use web_time::Instant;

use crate::error::{HarnessError, HarnessResult};
use crate::host::HostPage;
use crate::reader::read_turn_flags;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(3000);

/// A bounded wait that has started but not settled.
///
/// `poll` never blocks, so the same wait can be driven by a blocking loop on
/// native targets or by the page's event loop from JS.
#[derive(Debug, Clone, Copy)]
pub struct ReadinessWait {
    started: Instant,
    timeout: Duration,
}

impl ReadinessWait {
    pub fn start(timeout: Duration) -> Self {
        Self {
            started: Instant::now(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn remaining(&self) -> Duration {
        self.timeout.saturating_sub(self.elapsed())
    }

    /// `Ok(true)` once the host is ready, `Ok(false)` while it is busy and
    /// time remains, `SyncTimeout` after that.
    pub fn poll<H: HostPage + ?Sized>(&self, host: &H) -> HarnessResult<bool> {
        let flags = read_turn_flags(host)?;
        if flags.is_ready() {
            return Ok(true);
        }
        self.check_deadline()?;
        trace!("host busy ({flags:?}), {:?} left", self.remaining());
        Ok(false)
    }

    /// Like [`poll`](Self::poll), but waits for the host to build its board and
    /// define its turn globals instead.
    pub fn poll_loaded<H: HostPage + ?Sized>(&self, host: &H) -> HarnessResult<bool> {
        if host.read_board()?.is_some() && host.read_flags()?.is_some() {
            return Ok(true);
        }
        self.check_deadline()?;
        trace!("host not initialized, {:?} left", self.remaining());
        Ok(false)
    }

    /// Waits for the document carrying `marker` to be replaced, then for the
    /// new one to load.
    pub fn poll_reloaded<H: HostPage + ?Sized>(
        &self,
        host: &H,
        marker: &str,
    ) -> HarnessResult<bool> {
        if !host.page_marked(marker)? {
            return self.poll_loaded(host);
        }
        self.check_deadline()?;
        trace!("old page still up, {:?} left", self.remaining());
        Ok(false)
    }

    fn check_deadline(&self) -> HarnessResult<()> {
        let waited = self.elapsed();
        if waited >= self.timeout {
            warn!("host still busy after {waited:?} (timeout {:?})", self.timeout);
            return Err(HarnessError::SyncTimeout {
                timeout: self.timeout,
                waited,
            });
        }
        Ok(())
    }
}

/// Blocks until the host is ready for input, or fails with `SyncTimeout`.
///
/// Sleeps the calling thread between polls, so it is for native drivers;
/// in-page callers drive a [`ReadinessWait`] from the event loop instead.
#[cfg(not(target_arch = "wasm32"))]
pub fn wait_until_ready<H: HostPage + ?Sized>(
    host: &H,
    timeout: Duration,
    poll_interval: Duration,
) -> HarnessResult<()> {
    let wait = ReadinessWait::start(timeout);
    while !wait.poll(host)? {
        std::thread::sleep(poll_interval.min(wait.remaining()));
    }
    Ok(())
}

/// Blocks until the host has initialized after a navigation.
#[cfg(not(target_arch = "wasm32"))]
pub fn wait_until_loaded<H: HostPage + ?Sized>(
    host: &H,
    timeout: Duration,
    poll_interval: Duration,
) -> HarnessResult<()> {
    let wait = ReadinessWait::start(timeout);
    while !wait.poll_loaded(host)? {
        std::thread::sleep(poll_interval.min(wait.remaining()));
    }
    Ok(())
}

/// Blocks until the page carrying `marker` has been replaced by a freshly
/// initialized one.
#[cfg(not(target_arch = "wasm32"))]
pub fn wait_until_reloaded<H: HostPage + ?Sized>(
    host: &H,
    marker: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> HarnessResult<()> {
    let wait = ReadinessWait::start(timeout);
    while !wait.poll_reloaded(host, marker)? {
        std::thread::sleep(poll_interval.min(wait.remaining()));
    }
    Ok(())
}
