//! Parallel regions and tile task scheduling.
//!
//! A [`Region`] is opened by [`run`] (or [`run_traced`]). Inside it, a single emitting path
//! submits tasks along with the list of tiles they access. Tasks that touch the same tile, with at
//! least one of the accesses being a write, run in submission order. Other tasks may run
//! concurrently on the worker pool of the [`Context`]. The region waits for every submitted task
//! before returning.
//!
//! With [`Parallelism::None`], tasks run inline when they are submitted.

use crate::{Context, Error, Parallelism, Request, Sequence};
use dyn_stack::{PodStack, StackReq};
use parking_lot::Mutex;
use std::{
    panic::{catch_unwind, AssertUnwindSafe},
    sync::Arc,
};

mod graph;
mod workspace;

use graph::Graph;
use workspace::Workspace;

/// Access mode of a task to a tile.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Access {
    /// The task reads the tile.
    Read,
    /// The task reads and writes the tile.
    ReadWrite,
    /// Per-thread scratch memory, not tracked.
    Scratch,
}

/// Identifies a tile across all the descriptors of a region.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey {
    /// Id of the descriptor, see [`TileDesc::id`](crate::desc::TileDesc::id).
    pub desc: u64,
    /// Tile row.
    pub m: usize,
    /// Tile column.
    pub n: usize,
}

/// Emitted task, as recorded by [`run_traced`].
#[derive(Clone, Debug, PartialEq)]
pub struct TaskRecord {
    /// Name of the tile kernel.
    pub kernel: &'static str,
    /// Tiles accessed by the task.
    pub tiles: Vec<(TileKey, Access)>,
    /// Nominal flop count of the kernel.
    pub flops: f64,
}

/// Description of a task: the kernel it runs, the tiles it accesses and the scratch memory it
/// needs.
#[derive(Clone, Debug)]
pub struct Task {
    kernel: &'static str,
    tiles: Vec<(TileKey, Access)>,
    scratch: StackReq,
    flops: f64,
}

impl Task {
    #[inline]
    pub fn new(kernel: &'static str) -> Self {
        Self {
            kernel,
            tiles: Vec::new(),
            scratch: StackReq::empty(),
            flops: 0.0,
        }
    }

    /// Declares a read-only access to a tile.
    #[inline]
    pub fn read(mut self, key: TileKey) -> Self {
        self.tiles.push((key, Access::Read));
        self
    }

    /// Declares a read-write access to a tile.
    #[inline]
    pub fn read_write(mut self, key: TileKey) -> Self {
        self.tiles.push((key, Access::ReadWrite));
        self
    }

    /// Declares the scratch memory needed by the task.
    #[inline]
    pub fn scratch(mut self, req: StackReq) -> Self {
        self.scratch = req;
        self
    }

    /// Sets the nominal flop count of the task.
    #[inline]
    pub fn flops(mut self, flops: f64) -> Self {
        self.flops = flops;
        self
    }
}

type Job<'env> = Box<dyn for<'s> FnOnce(PodStack<'s>) -> Result<(), Error> + Send + 'env>;

pub(crate) struct Pending<'env> {
    kernel: &'static str,
    scratch: StackReq,
    seq: &'env Sequence,
    req: &'env Request,
    job: Job<'env>,
}

struct Shared<'env> {
    graph: Mutex<Graph<'env>>,
    workspace: Workspace,
    trace: Option<Mutex<Vec<TaskRecord>>>,
}

/// Handle to an open parallel region.
pub struct Region<'a, 'env> {
    shared: &'a Arc<Shared<'env>>,
    #[cfg(feature = "rayon")]
    scope: Option<&'a rayon::Scope<'env>>,
}

fn execute(workspace: &Workspace, task: Pending<'_>) {
    let Pending {
        kernel,
        scratch,
        seq,
        req,
        job,
    } = task;

    if seq.is_failed() {
        log::trace!(target: "tessera", "skipping {kernel}");
        return;
    }
    let result = catch_unwind(AssertUnwindSafe(|| workspace.with_stack(scratch, job)));
    match result {
        Ok(Ok(Ok(()))) => {}
        Ok(Ok(Err(err))) | Ok(Err(err)) => {
            seq.fail(req, err);
        }
        Err(_) => {
            log::error!(target: "tessera", "{kernel} panicked");
            seq.fail(req, Error::Internal);
        }
    }
}

#[cfg(feature = "rayon")]
fn spawn<'env>(
    scope: &rayon::Scope<'env>,
    shared: Arc<Shared<'env>>,
    id: usize,
    task: Pending<'env>,
) {
    scope.spawn(move |scope| {
        execute(&shared.workspace, task);
        let ready = shared.graph.lock().complete(id);
        for (id, task) in ready {
            spawn(scope, shared.clone(), id, task);
        }
    });
}

impl<'a, 'env> Region<'a, 'env> {
    /// Submits a task that runs `job` once every earlier task it conflicts with has completed.
    ///
    /// Nothing is submitted if `seq` has already failed. The job is skipped if `seq` fails
    /// before it starts. A job that returns an error, or panics, fails `seq` and `req`.
    pub fn submit(
        &self,
        seq: &'env Sequence,
        req: &'env Request,
        task: Task,
        job: impl for<'s> FnOnce(PodStack<'s>) -> Result<(), Error> + Send + 'env,
    ) {
        if seq.is_failed() {
            return;
        }
        log::trace!(target: "tessera", "emit {} {:?}", task.kernel, task.tiles);

        let Task {
            kernel,
            tiles,
            scratch,
            flops,
        } = task;
        let pending = Pending {
            kernel,
            scratch,
            seq,
            req,
            job: Box::new(job),
        };

        #[cfg(feature = "rayon")]
        if let Some(scope) = self.scope {
            let ready = self.shared.graph.lock().insert(&tiles, pending);
            if let Some(trace) = &self.shared.trace {
                trace.lock().push(TaskRecord {
                    kernel,
                    tiles,
                    flops,
                });
            }
            if let Some((id, task)) = ready {
                spawn(scope, self.shared.clone(), id, task);
            }
            return;
        }

        if let Some(trace) = &self.shared.trace {
            trace.lock().push(TaskRecord {
                kernel,
                tiles,
                flops,
            });
        }
        execute(&self.shared.workspace, pending);
    }
}

fn run_impl<'env, R: Send>(
    ctx: &Context,
    trace: bool,
    f: impl Send + FnOnce(&Region<'_, 'env>) -> R,
) -> (R, Vec<TaskRecord>) {
    let shared = Arc::new(Shared {
        graph: Mutex::new(Graph::default()),
        workspace: Workspace::new(ctx.n_threads() + 1),
        trace: if trace {
            Some(Mutex::new(Vec::new()))
        } else {
            None
        },
    });

    log::debug!(target: "tessera", "region opened ({:?})", ctx.parallelism());
    let out = match ctx.parallelism() {
        Parallelism::None => f(&Region {
            shared: &shared,
            #[cfg(feature = "rayon")]
            scope: None,
        }),
        #[cfg(feature = "rayon")]
        Parallelism::Rayon(_) => ctx.install(|| {
            rayon::in_place_scope(|scope| {
                f(&Region {
                    shared: &shared,
                    scope: Some(scope),
                })
            })
        }),
    };

    let unfinished = shared.graph.lock().n_unfinished();
    if unfinished > 0 {
        log::error!(target: "tessera", "region closed with {unfinished} unfinished tasks");
    }
    log::debug!(target: "tessera", "region closed");

    let records = match &shared.trace {
        Some(trace) => core::mem::take(&mut *trace.lock()),
        None => Vec::new(),
    };
    (out, records)
}

/// Opens a parallel region, runs `f` on the emitting path, then waits for every task submitted
/// through the region.
pub fn run<'env, R: Send>(ctx: &Context, f: impl Send + FnOnce(&Region<'_, 'env>) -> R) -> R {
    run_impl(ctx, false, f).0
}

/// Same as [`run`], but also returns the record of every task that was submitted, in submission
/// order.
pub fn run_traced<'env, R: Send>(
    ctx: &Context,
    f: impl Send + FnOnce(&Region<'_, 'env>) -> R,
) -> (R, Vec<TaskRecord>) {
    run_impl(ctx, true, f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert, TileParams};
    use core::sync::atomic::{AtomicUsize, Ordering};

    fn contexts() -> Vec<Context> {
        let mut ctx = vec![Context::sequential()];
        #[cfg(feature = "rayon")]
        ctx.push(Context::new(TileParams::default(), Parallelism::Rayon(4)).unwrap());
        ctx
    }

    fn key(m: usize) -> TileKey {
        TileKey { desc: u64::MAX, m, n: 0 }
    }

    #[test]
    fn writes_run_in_order() {
        for ctx in contexts() {
            let seq = Sequence::new();
            let req = Request::new();
            let log = Mutex::new(Vec::new());
            let (log, seq, req) = (&log, &seq, &req);

            run(&ctx, |region| {
                for i in 0..64 {
                    region.submit(seq, req, Task::new("push").read_write(key(0)), move |_| {
                        log.lock().push(i);
                        Ok(())
                    });
                }
            });
            assert!(*log.lock() == (0..64).collect::<Vec<_>>());
        }
    }

    #[test]
    fn readers_wait_for_the_writer() {
        for ctx in contexts() {
            let seq = Sequence::new();
            let req = Request::new();
            let value = AtomicUsize::new(0);
            let seen = Mutex::new(Vec::new());
            let (value, seen, seq, req) = (&value, &seen, &seq, &req);

            run(&ctx, |region| {
                region.submit(seq, req, Task::new("write").read_write(key(1)), move |_| {
                    std::thread::sleep(std::time::Duration::from_millis(20));
                    value.store(7, Ordering::SeqCst);
                    Ok(())
                });
                for _ in 0..8 {
                    region.submit(seq, req, Task::new("read").read(key(1)), move |_| {
                        seen.lock().push(value.load(Ordering::SeqCst));
                        Ok(())
                    });
                }
                region.submit(seq, req, Task::new("overwrite").read_write(key(1)), move |_| {
                    value.store(9, Ordering::SeqCst);
                    Ok(())
                });
            });
            assert!(*seen.lock() == vec![7; 8]);
            assert!(value.load(Ordering::SeqCst) == 9);
        }
    }

    #[test]
    fn failure_stops_later_tasks() {
        for ctx in contexts() {
            let seq = Sequence::new();
            let req = Request::new();
            let count = AtomicUsize::new(0);
            let (count, seq, req) = (&count, &seq, &req);

            let (_, trace) = run_traced(&ctx, |region| {
                region.submit(seq, req, Task::new("fail").read_write(key(0)), move |_| {
                    Err(Error::NotPositiveDefinite { minor: 2 })
                });
                for _ in 0..4 {
                    region.submit(seq, req, Task::new("after").read_write(key(0)), move |_| {
                        count.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    });
                }
            });
            assert!(count.load(Ordering::SeqCst) == 0);
            assert!(seq.status() == Err(Error::NotPositiveDefinite { minor: 2 }));
            assert!(req.status() == seq.status());
            assert!(trace[0].kernel == "fail");
        }
    }

    #[test]
    fn panics_become_internal_errors() {
        for ctx in contexts() {
            let seq = Sequence::new();
            let req = Request::new();
            let (seq, req) = (&seq, &req);
            run(&ctx, |region| {
                region.submit(seq, req, Task::new("panic").read_write(key(0)), move |_| {
                    panic!("kernel failure")
                });
            });
            assert!(seq.status() == Err(Error::Internal));
        }
    }

    #[test]
    fn scratch_memory() {
        for ctx in contexts() {
            let seq = Sequence::new();
            let req = Request::new();
            let sum = Mutex::new(0.0);
            let (sum, seq, req) = (&sum, &seq, &req);
            run(&ctx, |region| {
                for i in 0..16 {
                    let task = Task::new("scratch")
                        .read_write(key(i))
                        .scratch(StackReq::new::<f64>(32));
                    region.submit(seq, req, task, move |stack| {
                        let (buf, _) = stack.make_raw::<f64>(32);
                        buf.fill(i as f64);
                        *sum.lock() += buf.iter().sum::<f64>();
                        Ok(())
                    });
                }
            });
            assert!(*sum.lock() == 32.0 * 120.0);
        }
    }
}
