use crate::Error;
use dyn_stack::{GlobalPodBuffer, PodStack, StackReq};
use parking_lot::Mutex;

struct Slot {
    buffer: Option<GlobalPodBuffer>,
    bytes: usize,
}

/// Scratch memory of a parallel region, one buffer per thread that may run tasks.
pub(crate) struct Workspace {
    slots: Vec<Mutex<Slot>>,
}

impl Workspace {
    pub fn new(n_slots: usize) -> Self {
        Self {
            slots: (0..Ord::max(n_slots, 1))
                .map(|_| {
                    Mutex::new(Slot {
                        buffer: None,
                        bytes: 0,
                    })
                })
                .collect(),
        }
    }

    #[inline]
    fn current_slot(&self) -> usize {
        #[cfg(feature = "rayon")]
        let idx = rayon::current_thread_index().map_or(0, |idx| idx + 1);
        #[cfg(not(feature = "rayon"))]
        let idx = 0;
        idx % self.slots.len()
    }

    /// Runs `f` with a stack of at least `req` bytes, borrowed from the buffer of the current
    /// thread. The buffer grows as needed.
    pub fn with_stack<R>(
        &self,
        req: StackReq,
        f: impl FnOnce(PodStack<'_>) -> R,
    ) -> Result<R, Error> {
        let bytes = req.unaligned_bytes_required();
        if bytes == 0 {
            return Ok(f(PodStack::new(&mut [])));
        }

        let mut slot = self.slots[self.current_slot()].lock();
        if slot.buffer.is_none() || slot.bytes < bytes {
            slot.buffer = None;
            let buffer = GlobalPodBuffer::try_new(req).map_err(|_| Error::OutOfMemory)?;
            slot.buffer = Some(buffer);
            slot.bytes = bytes;
        }
        match slot.buffer.as_mut() {
            Some(buffer) => Ok(f(PodStack::new(buffer))),
            None => Err(Error::Internal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert;

    #[test]
    fn grows_on_demand() {
        let ws = Workspace::new(2);
        let n = ws
            .with_stack(StackReq::new::<f64>(16), |stack| {
                let (buf, _) = stack.make_raw::<f64>(16);
                buf.fill(1.0);
                buf.iter().sum::<f64>()
            })
            .unwrap();
        assert!(n == 16.0);
        let n = ws
            .with_stack(StackReq::new::<f64>(64), |stack| stack.make_raw::<f64>(64).0.len())
            .unwrap();
        assert!(n == 64);
        assert!(ws.with_stack(StackReq::empty(), |_| 3).unwrap() == 3);
    }
}
