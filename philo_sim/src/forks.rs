//! The ring of forks.

use crate::error::SimError;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Exclusive hold on one fork. Dropping it puts the fork back.
#[must_use = "the fork is released as soon as the guard is dropped"]
pub struct ForkGuard<'a> {
    _held: MutexGuard<'a, ()>,
}

/// `count` forks arranged in a ring. Philosopher `i` (0-based) needs fork
/// `i` (its left) and fork `(i + 1) % count` (its right).
///
/// The set owns every fork; philosophers only hold indices into it.
#[derive(Debug)]
pub struct ForkSet {
    forks: Vec<Mutex<()>>,
}

impl ForkSet {
    /// Allocates `count` forks.
    pub fn new(count: usize) -> Result<Self, SimError> {
        let mut forks = Vec::new();
        forks
            .try_reserve_exact(count)
            .map_err(|e| SimError::allocation("forks", e))?;
        forks.extend((0..count).map(|_| Mutex::new(())));
        Ok(Self { forks })
    }

    /// Number of forks.
    pub fn len(&self) -> usize {
        self.forks.len()
    }

    /// Returns true if the set holds no forks.
    pub fn is_empty(&self) -> bool {
        self.forks.is_empty()
    }

    /// Returns `(left, right)` fork indices for the philosopher at `index`.
    /// With a single fork both sides are the same fork.
    pub fn pair_for(&self, index: usize) -> (usize, usize) {
        (index, (index + 1) % self.forks.len())
    }

    /// Blocks until fork `index` is held exclusively.
    pub fn acquire(&self, index: usize) -> ForkGuard<'_> {
        ForkGuard {
            _held: self.forks[index]
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        }
    }

    /// Takes fork `index` if it is free right now.
    #[cfg(test)]
    pub(crate) fn try_acquire(&self, index: usize) -> Option<ForkGuard<'_>> {
        match self.forks[index].try_lock() {
            Ok(held) => Some(ForkGuard { _held: held }),
            Err(std::sync::TryLockError::Poisoned(p)) => Some(ForkGuard {
                _held: p.into_inner(),
            }),
            Err(std::sync::TryLockError::WouldBlock) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_ring_pairs() {
        let forks = ForkSet::new(5).unwrap();
        assert_eq!(forks.len(), 5);
        assert_eq!(forks.pair_for(0), (0, 1));
        assert_eq!(forks.pair_for(3), (3, 4));
        assert_eq!(forks.pair_for(4), (4, 0));
    }

    #[test]
    fn test_single_fork_is_its_own_neighbour() {
        let forks = ForkSet::new(1).unwrap();
        assert_eq!(forks.pair_for(0), (0, 0));
    }

    #[test]
    fn test_held_fork_is_exclusive() {
        let forks = ForkSet::new(2).unwrap();
        let held = forks.acquire(0);

        assert!(forks.try_acquire(0).is_none());
        assert!(forks.try_acquire(1).is_some());

        drop(held);
        assert!(forks.try_acquire(0).is_some());
    }

    #[test]
    fn test_mutual_exclusion_under_contention() {
        let forks = Arc::new(ForkSet::new(1).unwrap());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let forks = Arc::clone(&forks);
                let inside = Arc::clone(&inside);
                let max_inside = Arc::clone(&max_inside);
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        let _fork = forks.acquire(0);
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_inside.fetch_max(now, Ordering::SeqCst);
                        inside.fetch_sub(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    }
}
