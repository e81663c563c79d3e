use crate::engine::RoutingMethod;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::{self, Duration};
use tracing::info;

#[derive(Debug)]
pub struct StatsCollector {
    // Indexed by RoutingMethod::ALL position.
    lookups: [AtomicU64; 3],
    pac_downloads: AtomicU64,
    refreshes: AtomicU64,
    refresh_failures: AtomicU64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub total_lookups: u64,
    pub direct: u64,
    pub blocked: u64,
    pub default: u64,
    pub pac_downloads: u64,
    pub refreshes: u64,
    pub refresh_failures: u64,
}

impl StatsCollector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            lookups: [0; 3].map(|_| AtomicU64::new(0)),
            pac_downloads: AtomicU64::new(0),
            refreshes: AtomicU64::new(0),
            refresh_failures: AtomicU64::new(0),
        })
    }

    /// Spawns a task that dumps the counters every `interval_sec` seconds.
    pub fn spawn_logger(self: &Arc<Self>, interval_sec: u64) {
        let stats = self.clone();
        let interval = Duration::from_secs(interval_sec.max(1));
        tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                stats.dump_stats();
            }
        });
    }

    pub fn inc_lookup(&self, method: RoutingMethod) {
        let idx = match method {
            RoutingMethod::Direct => 0,
            RoutingMethod::Blocked => 1,
            RoutingMethod::Default => 2,
        };
        self.lookups[idx].fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_pac_downloads(&self) {
        self.pac_downloads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_refreshes(&self) {
        self.refreshes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_refresh_failures(&self) {
        self.refresh_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_snapshot(&self) -> StatsSnapshot {
        let direct = self.lookups[0].load(Ordering::Relaxed);
        let blocked = self.lookups[1].load(Ordering::Relaxed);
        let default = self.lookups[2].load(Ordering::Relaxed);
        StatsSnapshot {
            total_lookups: direct + blocked + default,
            direct,
            blocked,
            default,
            pac_downloads: self.pac_downloads.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
            refresh_failures: self.refresh_failures.load(Ordering::Relaxed),
        }
    }

    fn dump_stats(&self) {
        let s = self.get_snapshot();
        let pct = |n: u64| {
            if s.total_lookups > 0 {
                (n as f64 / s.total_lookups as f64) * 100.0
            } else {
                0.0
            }
        };

        info!(
            "STATS DUMP: Lookups: {}, Direct: {} ({:.1}%), Blocked: {} ({:.1}%), Default: {} ({:.1}%), PAC downloads: {}, Refreshes: {} ({} failed)",
            s.total_lookups,
            s.direct,
            pct(s.direct),
            s.blocked,
            pct(s.blocked),
            s.default,
            pct(s.default),
            s.pac_downloads,
            s.refreshes,
            s.refresh_failures
        );
    }
}
