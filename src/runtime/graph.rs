use super::{Access, Pending, TileKey};
use std::collections::HashMap;

#[derive(Default)]
struct TileState {
    last_writer: Option<usize>,
    readers: Vec<usize>,
}

/// Per-tile reader/writer bookkeeping.
///
/// For every tile, the tracker remembers the last task that wrote it and the tasks that read it
/// since then. A reader depends on the last writer, a writer depends on the last writer and on all
/// the readers since that write.
#[derive(Default)]
pub(crate) struct Tracker {
    tiles: HashMap<TileKey, TileState>,
}

impl Tracker {
    /// Registers the accesses of task `id`, and returns the tasks it must wait for, in increasing
    /// order and without duplicates.
    pub fn register(&mut self, id: usize, accesses: &[(TileKey, Access)]) -> Vec<usize> {
        let mut deps = Vec::new();
        for &(key, access) in accesses {
            match access {
                Access::Scratch => {}
                Access::Read => {
                    let state = self.tiles.entry(key).or_default();
                    deps.extend(state.last_writer);
                    if state.readers.last() != Some(&id) {
                        state.readers.push(id);
                    }
                }
                Access::ReadWrite => {
                    let state = self.tiles.entry(key).or_default();
                    deps.extend(state.last_writer);
                    deps.extend(state.readers.drain(..));
                    state.last_writer = Some(id);
                }
            }
        }
        deps.retain(|&dep| dep != id);
        deps.sort_unstable();
        deps.dedup();
        deps
    }
}

struct Node<'env> {
    pending: usize,
    dependents: Vec<usize>,
    done: bool,
    task: Option<Pending<'env>>,
}

/// Task graph of a parallel region.
#[derive(Default)]
pub(crate) struct Graph<'env> {
    tracker: Tracker,
    nodes: Vec<Node<'env>>,
}

impl<'env> Graph<'env> {
    /// Inserts a task. Returns it back along with its id if it can run right away.
    pub fn insert(
        &mut self,
        accesses: &[(TileKey, Access)],
        task: Pending<'env>,
    ) -> Option<(usize, Pending<'env>)> {
        let id = self.nodes.len();
        let deps = self.tracker.register(id, accesses);

        let mut pending = 0;
        for dep in deps {
            let node = &mut self.nodes[dep];
            if !node.done {
                node.dependents.push(id);
                pending += 1;
            }
        }

        if pending == 0 {
            self.nodes.push(Node {
                pending,
                dependents: Vec::new(),
                done: false,
                task: None,
            });
            Some((id, task))
        } else {
            self.nodes.push(Node {
                pending,
                dependents: Vec::new(),
                done: false,
                task: Some(task),
            });
            None
        }
    }

    /// Marks task `id` as completed, and returns the tasks that became ready.
    pub fn complete(&mut self, id: usize) -> Vec<(usize, Pending<'env>)> {
        let node = &mut self.nodes[id];
        node.done = true;
        let dependents = core::mem::take(&mut node.dependents);

        let mut ready = Vec::new();
        for dep in dependents {
            let node = &mut self.nodes[dep];
            node.pending -= 1;
            if node.pending == 0 {
                if let Some(task) = node.task.take() {
                    ready.push((dep, task));
                }
            }
        }
        ready
    }

    /// Number of tasks that were inserted but did not complete yet.
    pub fn n_unfinished(&self) -> usize {
        self.nodes.iter().filter(|node| !node.done).count()
    }
}
