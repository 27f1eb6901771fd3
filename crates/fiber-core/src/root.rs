use std::rc::Rc;

use crate::arena::{WorkArena, WorkNode, WorkNodeId};
use crate::commit::{commit_root, CommitSummary};
use crate::element::Element;
use crate::error::RenderError;
use crate::host::{Host, HostId};
use crate::props::Props;
use crate::runtime::{Runtime, RuntimeHandle};
use crate::scheduler::{perform_unit_of_work, Deadline, Unbounded, WorkContext, WorkStatus};

/// One render root: owns the host tree, the work-node arena and the
/// generation state (`work-in-progress`, `committed`, pending deletions).
///
/// Several roots can coexist; nothing here is process-wide.
///
/// A host error during commit is fatal: part of the generation may already be
/// applied to the host, so the root refuses further work with
/// [`RenderError::Poisoned`]. Build a new root over a fresh container.
pub struct FiberRoot<H: Host> {
    host: H,
    runtime: Runtime,
    arena: WorkArena,
    committed: Option<WorkNodeId>,
    work_in_progress: Option<WorkNodeId>,
    next_unit: Option<WorkNodeId>,
    deletions: Vec<WorkNodeId>,
    generation: u64,
    last_commit: Option<CommitSummary>,
    poisoned: bool,
}

impl<H: Host> FiberRoot<H> {
    pub fn new(host: H) -> Self {
        Self::with_runtime(host, Runtime::default())
    }

    pub fn with_runtime(host: H, runtime: Runtime) -> Self {
        Self {
            host,
            runtime,
            arena: WorkArena::new(),
            committed: None,
            work_in_progress: None,
            next_unit: None,
            deletions: Vec::new(),
            generation: 0,
            last_commit: None,
            poisoned: false,
        }
    }

    /// Seeds a new generation realizing `element` inside `container`.
    ///
    /// No work happens until the next [`work_loop`](Self::work_loop) tick.
    pub fn render(&mut self, element: Element, container: HostId) -> Result<(), RenderError> {
        if self.poisoned {
            return Err(RenderError::Poisoned);
        }
        if !self.host.accepts_children(container) {
            return Err(RenderError::Mount { container });
        }
        self.discard_work_in_progress();
        // The new generation replays every queued hook update anyway.
        self.runtime.take_update_request();
        let alternate = self
            .committed
            .filter(|&committed| self.arena[committed].host == Some(container));
        let props = Rc::new(Props::new().with_children(vec![element]));
        self.seed(WorkNode::root(container, props, alternate));
        Ok(())
    }

    /// Runs units of work until none remain or `deadline` asks to yield,
    /// committing the generation once its last unit is done.
    pub fn work_loop(&mut self, deadline: &dyn Deadline) -> Result<WorkStatus, RenderError> {
        if self.poisoned {
            return Err(RenderError::Poisoned);
        }
        if self.runtime.take_update_request() {
            self.restart_generation();
        }

        let mut performed = 0usize;
        while let Some(unit) = self.next_unit {
            let mut cx = WorkContext {
                arena: &mut self.arena,
                host: &mut self.host,
                deletions: &mut self.deletions,
                runtime: self.runtime.handle(),
            };
            match perform_unit_of_work(&mut cx, unit) {
                Ok(next) => self.next_unit = next,
                Err(err) => {
                    log::debug!("discarding generation after error: {err}");
                    self.discard_work_in_progress();
                    return Err(err);
                }
            }
            performed += 1;
            if self.next_unit.is_some() && deadline.should_yield() {
                log::debug!("yielding after {performed} units of work");
                return Ok(WorkStatus::Yielded);
            }
        }

        match self.work_in_progress {
            Some(root) => {
                self.commit(root)?;
                Ok(WorkStatus::Committed)
            }
            None => Ok(WorkStatus::Idle),
        }
    }

    /// Drains all scheduled work, including updates requested during the drain.
    pub fn flush(&mut self) -> Result<WorkStatus, RenderError> {
        let mut status = WorkStatus::Idle;
        while self.has_pending_work() {
            if self.work_loop(&Unbounded)? == WorkStatus::Committed {
                status = WorkStatus::Committed;
            }
        }
        Ok(status)
    }

    pub fn has_pending_work(&self) -> bool {
        self.work_in_progress.is_some() || self.runtime.has_update_request()
    }

    fn seed(&mut self, root: WorkNode) {
        let root = self.arena.alloc(root);
        self.deletions.clear();
        self.work_in_progress = Some(root);
        self.next_unit = Some(root);
    }

    /// Replaces any in-flight generation with a fresh root over the latest
    /// requested tree: the in-flight root's if there is one, else the
    /// committed root's. Hook cells replay against the committed tree.
    fn restart_generation(&mut self) {
        let Some(source) = self.work_in_progress.or(self.committed) else {
            return;
        };
        let node = &self.arena[source];
        let alternate = if self.work_in_progress.is_some() {
            node.alternate
        } else {
            Some(source)
        };
        let Some(container) = node.host else {
            return;
        };
        let seed = WorkNode::root(container, node.props.clone(), alternate);
        if self.work_in_progress.is_some() {
            log::debug!("update arrived mid-generation, restarting");
        }
        self.discard_work_in_progress();
        self.seed(seed);
    }

    fn discard_work_in_progress(&mut self) {
        if let Some(root) = self.work_in_progress.take() {
            let released = self.arena.release_tree(root);
            log::trace!("released {released} uncommitted work nodes");
        }
        self.next_unit = None;
        self.deletions.clear();
    }

    fn commit(&mut self, root: WorkNodeId) -> Result<(), RenderError> {
        let deletions = std::mem::take(&mut self.deletions);
        let mut summary = match commit_root(&mut self.arena, &mut self.host, root, &deletions) {
            Ok(summary) => summary,
            Err(err) => {
                log::error!("host rejected commit of generation {}: {err}", self.generation + 1);
                self.discard_work_in_progress();
                self.poisoned = true;
                return Err(err.into());
            }
        };
        self.generation += 1;
        summary.generation = self.generation;
        log::debug!(
            "committed generation {}: {} inserted, {} updated, {} deleted",
            summary.generation,
            summary.inserted,
            summary.updated,
            summary.deleted
        );

        self.work_in_progress = None;
        if let Some(previous) = self.committed.replace(root) {
            self.arena.release_tree(previous);
        }
        self.arena.clear_alternates(root);
        self.last_commit = Some(summary);
        Ok(())
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    pub fn arena(&self) -> &WorkArena {
        &self.arena
    }

    pub fn committed_root(&self) -> Option<WorkNodeId> {
        self.committed
    }

    pub fn work_in_progress(&self) -> Option<WorkNodeId> {
        self.work_in_progress
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn last_commit(&self) -> Option<CommitSummary> {
        self.last_commit
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }
}

/// Creates a root over `host` and seeds the first generation of `element`.
pub fn render<H: Host>(
    element: Element,
    container: HostId,
    host: H,
) -> Result<FiberRoot<H>, RenderError> {
    let mut root = FiberRoot::new(host);
    root.render(element, container)?;
    Ok(root)
}
