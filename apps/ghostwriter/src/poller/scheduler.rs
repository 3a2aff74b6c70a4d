//! Single-flight scheduler.
//!
//! Fires a job on a fixed interval. A firing that arrives while the previous
//! run is still in flight is dropped, never queued, so runs cannot overlap
//! or pile up behind a slow one.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Tracks whether a run is in flight.
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    busy: Arc<AtomicBool>,
}

/// Clears the in-flight flag when dropped, including during a panic unwind.
#[derive(Debug)]
pub struct FlightGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

impl SingleFlight {
    /// Claims the slot, or `None` if a run is already in flight.
    pub fn try_begin(&self) -> Option<FlightGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard {
                busy: Arc::clone(&self.busy),
            })
    }
}

/// Spawns the scheduling loop. The first firing is immediate.
///
/// Each run is its own task: a panicking run is reported by tokio, its
/// guard is released during unwinding, and the next firing proceeds.
pub fn spawn_single_flight<F, Fut>(period: Duration, job: F) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let flight = SingleFlight::default();
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("Scheduler started: firing every {}s", period.as_secs());

        loop {
            interval.tick().await;
            match flight.try_begin() {
                Some(guard) => {
                    let run = job();
                    tokio::spawn(async move {
                        let _guard = guard;
                        run.await;
                    });
                }
                None => debug!("Previous run still in flight; skipping this firing"),
            }
        }
    })
}
