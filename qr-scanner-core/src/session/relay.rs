use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Gate between the platform decode callback and the scan arbiter.
///
/// Each decode event is stamped with the input epoch current when it was
/// produced. Reconfiguring the session input suspends delivery and advances
/// the epoch, so events from a removed input are dropped instead of
/// resolving a scan.
#[derive(Debug, Default)]
pub struct DecodeRelay {
    epoch: AtomicU64,
    suspended: AtomicBool,
}

impl DecodeRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::SeqCst)
    }

    /// Whether an event stamped with `epoch` may be delivered now.
    pub fn accepts(&self, epoch: u64) -> bool {
        !self.is_suspended() && epoch == self.epoch()
    }

    /// Invalidate every event produced so far.
    pub fn retire_input(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    /// Suspend delivery until the returned guard drops.
    pub fn suspend(&self) -> Suspension<'_> {
        self.suspended.store(true, Ordering::SeqCst);
        self.retire_input();
        Suspension { relay: self }
    }
}

/// Holds decode delivery suspended.
pub struct Suspension<'a> {
    relay: &'a DecodeRelay,
}

impl Drop for Suspension<'_> {
    fn drop(&mut self) {
        self.relay.suspended.store(false, Ordering::SeqCst);
    }
}
