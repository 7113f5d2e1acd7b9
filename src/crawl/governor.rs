// src/crawl/governor.rs
// =============================================================================
// Politeness for one domain: how many fetches may be in flight at once, and
// how far apart their start times must be.
//
// Two mechanisms work together:
// - A Semaphore with `max_in_flight` permits caps concurrency. The permit is
//   handed to the fetch task and released when that task drops it.
// - A "next allowed start" timestamp spaces out fetch starts. Each caller
//   reserves the next slot under a short lock, then sleeps until it arrives.
//
// Every wait also watches a CancellationToken so a deadline or Ctrl-C can stop
// a crawl that is parked here.
// =============================================================================

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

/// Limits applied to each site's outbound fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolitenessConfig {
    /// Maximum fetches in flight at once
    pub max_in_flight: usize,
    /// Minimum time between two successive fetch starts
    pub delay: Duration,
}

impl Default for PolitenessConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 2,
            delay: Duration::from_secs(1),
        }
    }
}

/// Proof that a fetch may run; frees its slot when dropped
#[derive(Debug)]
pub struct FetchPermit {
    _slot: OwnedSemaphorePermit,
}

/// Concurrency cap and start-delay for a single domain
#[derive(Debug)]
pub struct PolitenessGovernor {
    slots: Arc<Semaphore>,
    delay: Duration,
    next_start: Mutex<Option<Instant>>,
}

impl PolitenessGovernor {
    pub fn new(config: PolitenessConfig) -> Self {
        Self {
            // A zero cap would block forever
            slots: Arc::new(Semaphore::new(config.max_in_flight.max(1))),
            delay: config.delay,
            next_start: Mutex::new(None),
        }
    }

    /// Waits for a free slot and for the delay window, in that order
    ///
    /// Returns None if `cancel` fires while waiting.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Option<FetchPermit> {
        let slot = tokio::select! {
            biased;
            _ = cancel.cancelled() => return None,
            slot = self.slots.clone().acquire_owned() => slot.ok()?,
        };

        let start_at = self.reserve_start();

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return None,
            _ = sleep_until(start_at) => {}
        }

        Some(FetchPermit { _slot: slot })
    }

    // Claims the earliest start time that respects the delay and pushes the
    // window forward for whoever comes next
    fn reserve_start(&self) -> Instant {
        let mut next = self
            .next_start
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let now = Instant::now();
        let start = match *next {
            Some(at) if at > now => at,
            _ => now,
        };
        *next = Some(start + self.delay);
        start
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why acquire_owned() on an Arc<Semaphore>?
//    - A plain acquire() borrows the semaphore, so the permit could not be
//      moved into a spawned task
//    - The owned permit carries its own Arc and frees the slot on drop
//
// 2. What does `biased;` do in select!?
//    - Branches are polled top to bottom instead of in random order
//    - Cancellation is always checked first, so a fired token wins even if a
//      slot happens to be free at the same moment
//
// 3. Why tokio::time::Instant instead of std::time::Instant?
//    - Tests run on a paused clock (start_paused = true) and tokio's Instant
//      follows that clock, so a 1 second delay costs no real time
// -----------------------------------------------------------------------------
