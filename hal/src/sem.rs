// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2025 Oxide Computer Company

use parking_lot::{Condvar, Mutex};

use crate::{DevNum, HalResult};

/// The lock facade.  One semaphore guards each table family of a device for
/// the full length of a multi-register transaction.
pub trait Semaphore: Send + Sync {
    /// Block until the semaphore is held by the caller.
    fn take(&self, dev: DevNum) -> HalResult<()>;
    /// Release a semaphore previously returned by `take`.
    fn give(&self, dev: DevNum) -> HalResult<()>;
}

/// A binary semaphore built on a mutex and condition variable.
#[derive(Debug, Default)]
pub struct BinarySemaphore {
    held: Mutex<bool>,
    cv: Condvar,
}

impl BinarySemaphore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether some caller currently holds the semaphore.
    pub fn is_held(&self) -> bool {
        *self.held.lock()
    }
}

impl Semaphore for BinarySemaphore {
    fn take(&self, _dev: DevNum) -> HalResult<()> {
        let mut held = self.held.lock();
        while *held {
            self.cv.wait(&mut held);
        }
        *held = true;
        Ok(())
    }

    fn give(&self, _dev: DevNum) -> HalResult<()> {
        *self.held.lock() = false;
        self.cv.notify_one();
        Ok(())
    }
}

/// Holds a semaphore for the lifetime of the guard.  `release` surfaces a
/// failure to give the semaphore back; dropping the guard without calling it
/// still releases, discarding any error.
pub struct SemGuard<'a> {
    sem: &'a dyn Semaphore,
    dev: DevNum,
    held: bool,
}

impl<'a> SemGuard<'a> {
    pub fn take(sem: &'a dyn Semaphore, dev: DevNum) -> HalResult<Self> {
        sem.take(dev)?;
        Ok(SemGuard {
            sem,
            dev,
            held: true,
        })
    }

    pub fn release(mut self) -> HalResult<()> {
        self.held = false;
        self.sem.give(self.dev)
    }
}

impl Drop for SemGuard<'_> {
    fn drop(&mut self) {
        if self.held {
            let _ = self.sem.give(self.dev);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_guard_releases_on_drop() -> anyhow::Result<()> {
        let sem = BinarySemaphore::new();
        {
            let _g = SemGuard::take(&sem, 0)?;
            assert!(sem.is_held());
        }
        assert!(!sem.is_held());

        let g = SemGuard::take(&sem, 0)?;
        g.release()?;
        assert!(!sem.is_held());
        Ok(())
    }

    #[test]
    fn test_mutual_exclusion() {
        let sem = Arc::new(BinarySemaphore::new());
        let counter = Arc::new(Mutex::new(0u32));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let sem = sem.clone();
                let counter = counter.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        let g = SemGuard::take(sem.as_ref(), 0).unwrap();
                        let v = *counter.lock();
                        thread::yield_now();
                        *counter.lock() = v + 1;
                        g.release().unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(*counter.lock(), 400);
    }
}
