//! First-fault-wins status shared by all the tasks of one logical call.

use crate::Error;
use core::sync::atomic::{AtomicBool, Ordering};
use parking_lot::Mutex;

/// Status of a group of tile operations.
///
/// A sequence starts out active. The first failure reported to it is recorded and every later
/// one is ignored. Drivers stop emitting tasks once the sequence has failed, and tasks that were
/// already emitted skip their work.
#[derive(Debug, Default)]
pub struct Sequence {
    failed: AtomicBool,
    status: Mutex<Option<Error>>,
}

/// Per-call companion of a [`Sequence`], recording the failure of the call it belongs to.
#[derive(Debug, Default)]
pub struct Request {
    status: Mutex<Option<Error>>,
}

impl Sequence {
    /// Creates an active sequence.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` once a failure has been recorded.
    #[inline]
    pub fn is_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    /// Returns the recorded failure, if any.
    #[inline]
    pub fn status(&self) -> Result<(), Error> {
        match *self.status.lock() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Marks the sequence as failed with `err`, unless it has already failed, and records the
    /// failure in `request`.
    ///
    /// Returns `true` if this call recorded the failure.
    pub fn fail(&self, request: &Request, err: Error) -> bool {
        let mut status = self.status.lock();
        if status.is_some() {
            return false;
        }
        *status = Some(err);
        self.failed.store(true, Ordering::Release);
        drop(status);

        *request.status.lock() = Some(err);
        log::debug!(target: "tessera", "sequence failed: {err}");
        true
    }
}

impl Request {
    /// Creates a request with no recorded failure.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the failure recorded for this request, if any.
    #[inline]
    pub fn status(&self) -> Result<(), Error> {
        match *self.status.lock() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert;

    #[test]
    fn first_fault_wins() {
        let seq = Sequence::new();
        let (first, second) = (Request::new(), Request::new());
        assert!(!seq.is_failed());
        assert!(seq.status() == Ok(()));

        assert!(seq.fail(&first, Error::NotPositiveDefinite { minor: 3 }));
        assert!(!seq.fail(&second, Error::OutOfMemory));

        assert!(seq.is_failed());
        assert!(seq.status() == Err(Error::NotPositiveDefinite { minor: 3 }));
        assert!(first.status() == Err(Error::NotPositiveDefinite { minor: 3 }));
        assert!(second.status() == Ok(()));
    }

    #[test]
    fn concurrent_failures_record_one() {
        let seq = Sequence::new();
        let req = Request::new();
        let wins = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let (seq, req) = (&seq, &req);
                    s.spawn(move || seq.fail(req, Error::NotPositiveDefinite { minor: i + 1 }))
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap() as usize)
                .sum::<usize>()
        });
        assert!(wins == 1);
        assert!(seq.status() == req.status());
    }
}
