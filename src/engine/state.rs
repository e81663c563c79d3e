use super::policy::{PolicyConfiguration, RoutingMethod};
use super::traits::HostClassifier;
use crate::pac;
use arc_swap::ArcSwap;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;
use tracing::info;

/// A published policy together with its rendered PAC script.
#[derive(Debug)]
pub struct PolicySnapshot {
    pub generation: u64,
    pub policy: PolicyConfiguration,
    pub script: String,
    pub published_at: SystemTime,
}

impl PolicySnapshot {
    fn new(generation: u64, policy: PolicyConfiguration) -> Self {
        let script = pac::render(&policy);
        Self {
            generation,
            policy,
            script,
            published_at: SystemTime::now(),
        }
    }
}

/// Shared reference to the current policy.
///
/// Publishing builds the whole snapshot first and then swaps a single
/// pointer, so a reader sees either the old policy or the new one. Readers
/// never wait on writers.
#[derive(Debug, Clone)]
pub struct PolicyHandle {
    current: Arc<ArcSwap<PolicySnapshot>>,
    // Next generation to hand out. Held across the store so publishes
    // land in generation order.
    next_generation: Arc<Mutex<u64>>,
}

impl PolicyHandle {
    /// Starts at generation 0 with `initial`.
    pub fn new(initial: PolicyConfiguration) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(PolicySnapshot::new(0, initial))),
            next_generation: Arc::new(Mutex::new(1)),
        }
    }

    /// Captures the current snapshot. It stays valid however many
    /// publishes happen afterwards.
    pub fn load(&self) -> Arc<PolicySnapshot> {
        self.current.load_full()
    }

    /// Atomically replaces the active policy and returns its generation.
    pub fn publish(&self, policy: PolicyConfiguration) -> u64 {
        let mut next = self
            .next_generation
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let generation = *next;
        *next += 1;
        let snapshot = PolicySnapshot::new(generation, policy);
        info!(
            generation,
            direct = snapshot.policy.direct().len(),
            blocked = snapshot.policy.blocked().len(),
            "Publishing routing policy"
        );
        self.current.store(Arc::new(snapshot));
        drop(next);
        generation
    }
}

impl Default for PolicyHandle {
    fn default() -> Self {
        Self::new(PolicyConfiguration::default())
    }
}

impl HostClassifier for PolicyHandle {
    fn classify(&self, host: &str) -> RoutingMethod {
        self.current.load().policy.classify(host)
    }
}
