//! Provider credential pool and rotation.
//!
//! The pool is an ordered, non-empty set of API keys loaded once at
//! startup. Selection is a pure function over the pool (plus a cursor for
//! round-robin), injected into the cache manager so tests can make
//! rotation deterministic.

use rand::Rng;
use service_core::error::AppError;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A single provider API key.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keys must never land in logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(****)")
    }
}

/// How the pool picks a credential for a provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStrategy {
    Random,
    RoundRobin,
}

impl SelectionStrategy {
    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "random" => Ok(SelectionStrategy::Random),
            "round_robin" => Ok(SelectionStrategy::RoundRobin),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "Unknown CREDENTIAL_STRATEGY '{}': expected 'random' or 'round_robin'",
                other
            ))),
        }
    }
}

/// Ordered pool of provider credentials.
#[derive(Debug, Clone)]
pub struct CredentialPool {
    keys: Arc<Vec<Credential>>,
    strategy: SelectionStrategy,
    cursor: Arc<AtomicUsize>,
}

impl CredentialPool {
    /// Build a pool; an empty key list is a fatal configuration error.
    pub fn new(keys: Vec<Credential>, strategy: SelectionStrategy) -> Result<Self, AppError> {
        if keys.is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "Credential pool must not be empty"
            )));
        }
        Ok(Self {
            keys: Arc::new(keys),
            strategy,
            cursor: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn from_raw(keys: &[String], strategy: SelectionStrategy) -> Result<Self, AppError> {
        Self::new(keys.iter().map(Credential::new).collect(), strategy)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Pick a credential for the next provider call.
    pub fn select(&self) -> (usize, Credential) {
        let index = match self.strategy {
            SelectionStrategy::Random => rand::thread_rng().gen_range(0..self.keys.len()),
            SelectionStrategy::RoundRobin => {
                self.cursor.fetch_add(1, Ordering::Relaxed) % self.keys.len()
            }
        };
        (index, self.keys[index].clone())
    }

    /// Pick a credential for the rotation retry.
    ///
    /// Excludes the credential that just failed whenever the pool has
    /// more than one entry; with a single key the retry has no choice
    /// but to reuse it.
    pub fn select_excluding(&self, failed: usize) -> (usize, Credential) {
        if self.keys.len() == 1 {
            return (0, self.keys[0].clone());
        }

        let index = match self.strategy {
            SelectionStrategy::Random => {
                // Draw from the n-1 other slots, then skip past the failed one.
                let pick = rand::thread_rng().gen_range(0..self.keys.len() - 1);
                if pick >= failed {
                    pick + 1
                } else {
                    pick
                }
            }
            SelectionStrategy::RoundRobin => {
                // One atomic increment decides the pick; stepping the
                // cursor twice would let a concurrent select() slip in
                // between and land the retry back on the failed key.
                let candidate = self.cursor.fetch_add(1, Ordering::Relaxed) % self.keys.len();
                if candidate == failed {
                    (candidate + 1) % self.keys.len()
                } else {
                    candidate
                }
            }
        };
        (index, self.keys[index].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(n: usize, strategy: SelectionStrategy) -> CredentialPool {
        let keys = (0..n).map(|i| format!("key-{}", i)).collect::<Vec<_>>();
        CredentialPool::from_raw(&keys, strategy).unwrap()
    }

    #[test]
    fn empty_pool_is_rejected() {
        assert!(CredentialPool::from_raw(&[], SelectionStrategy::Random).is_err());
    }

    #[test]
    fn round_robin_cycles_in_order() {
        let p = pool(3, SelectionStrategy::RoundRobin);
        let picks: Vec<usize> = (0..6).map(|_| p.select().0).collect();
        assert_eq!(picks, vec![0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn rotation_never_repicks_the_failed_key() {
        for strategy in [SelectionStrategy::Random, SelectionStrategy::RoundRobin] {
            let p = pool(4, strategy);
            for failed in 0..4 {
                for _ in 0..50 {
                    let (index, _) = p.select_excluding(failed);
                    assert_ne!(index, failed);
                }
            }
        }
    }

    #[test]
    fn rotation_excludes_the_failed_key_under_contention() {
        let p = pool(2, SelectionStrategy::RoundRobin);

        // Noise threads advance the cursor concurrently; the retry pick
        // must still never land on the failed index.
        let stop = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let noise: Vec<_> = (0..3)
            .map(|_| {
                let p = p.clone();
                let stop = stop.clone();
                std::thread::spawn(move || {
                    while !stop.load(Ordering::Relaxed) {
                        p.select();
                    }
                })
            })
            .collect();

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let p = p.clone();
                std::thread::spawn(move || {
                    for _ in 0..200_000 {
                        assert_ne!(p.select_excluding(0).0, 0);
                    }
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }
        stop.store(true, Ordering::Relaxed);
        for thread in noise {
            thread.join().unwrap();
        }
    }

    #[test]
    fn single_key_pool_reuses_the_only_key() {
        let p = pool(1, SelectionStrategy::Random);
        assert_eq!(p.select_excluding(0).0, 0);
    }

    #[test]
    fn debug_output_redacts_the_key() {
        let c = Credential::new("super-secret");
        assert!(!format!("{:?}", c).contains("super-secret"));
    }
}
