use std::fmt::{Display, Formatter};
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use tokio::time::MissedTickBehavior;

use crate::dolar_client::DolarClient;
use crate::fetch_service::{self, FetchReport};
use crate::storage::Storage;

/// What caused a pipeline run. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Timer,
    Fetch,
    Job,
}

impl Display for Trigger {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Trigger::Timer => write!(f, "timer"),
            Trigger::Fetch => write!(f, "force-fetch"),
            Trigger::Job => write!(f, "run-job"),
        }
    }
}

/// Serializes pipeline runs. A trigger arriving while a run is in flight
/// waits for it instead of racing it, and the contention is logged.
pub struct RunGate {
    inner: Mutex<()>,
}

impl RunGate {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(()),
        }
    }

    pub async fn enter(&self, trigger: Trigger) -> MutexGuard<'_, ()> {
        match self.inner.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::info!("{trigger} trigger while a run is in flight, waiting");
                self.inner.lock().await
            }
        }
    }
}

impl Default for RunGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the periodic fetch loop and the run guard shared with the manual
/// HTTP triggers.
pub struct Scheduler {
    client: DolarClient,
    storage: Storage,
    interval: Duration,
    gate: RunGate,
}

impl Scheduler {
    pub fn new(client: DolarClient, storage: Storage, interval: Duration) -> Self {
        Self {
            client,
            storage,
            interval,
            gate: RunGate::new(),
        }
    }

    /// One serialized pipeline run on behalf of `trigger`.
    pub async fn run_once(&self, trigger: Trigger) -> FetchReport {
        let _guard = self.gate.enter(trigger).await;
        tracing::info!("starting fetch run ({trigger})");
        fetch_service::fetch_and_store(&self.client, &self.storage).await
    }

    /// Fires the pipeline every interval, forever. A failed run is logged
    /// and the next tick proceeds normally.
    pub async fn run_loop(&self) {
        tracing::info!("scheduler started, interval {:?}", self.interval);
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let report = self.run_once(Trigger::Timer).await;
            if report.is_ok() {
                tracing::info!(
                    "scheduled run stored {} of {} quotes",
                    report.total_inserted,
                    report.total_fetched
                );
            } else {
                tracing::error!(
                    "scheduled run failed: {}",
                    report.message.as_deref().unwrap_or("unknown error")
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn gate_never_admits_two_concurrent_runs() {
        let gate = Arc::new(RunGate::new());
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let gate = gate.clone();
            let active = active.clone();
            let peak = peak.clone();
            handles.push(tokio::spawn(async move {
                let _guard = gate.enter(Trigger::Fetch).await;
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                active.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gate_releases_after_run() {
        let gate = RunGate::new();
        drop(gate.enter(Trigger::Timer).await);
        // a second entry must not deadlock
        drop(gate.enter(Trigger::Job).await);
    }
}
