use std::cell::Cell;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use crate::platform::RuntimeScheduler;

struct RuntimeInner {
    scheduler: Arc<dyn RuntimeScheduler>,
    update_requested: Cell<bool>,
    requests: Cell<u64>,
}

impl RuntimeInner {
    fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            scheduler,
            update_requested: Cell::new(false),
            requests: Cell::new(0),
        }
    }

    fn request_update(&self) {
        self.requests.set(self.requests.get() + 1);
        if !self.update_requested.replace(true) {
            log::trace!("update requested, scheduling frame");
            self.scheduler.schedule_frame();
        }
    }
}

/// Shared update signal between a root and the `SetState` handles it hands out.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            inner: Rc::new(RuntimeInner::new(scheduler)),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle(Rc::downgrade(&self.inner))
    }

    pub fn has_update_request(&self) -> bool {
        self.inner.update_requested.get()
    }

    /// Total number of update requests seen, coalesced or not.
    pub fn request_count(&self) -> u64 {
        self.inner.requests.get()
    }

    pub(crate) fn take_update_request(&self) -> bool {
        self.inner.update_requested.replace(false)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(Arc::new(DefaultScheduler))
    }
}

#[derive(Default)]
pub struct DefaultScheduler;

impl RuntimeScheduler for DefaultScheduler {
    fn schedule_frame(&self) {}
}

/// Weak handle; requests made after the root is dropped are ignored.
#[derive(Clone)]
pub struct RuntimeHandle(Weak<RuntimeInner>);

impl RuntimeHandle {
    pub fn request_update(&self) {
        if let Some(inner) = self.0.upgrade() {
            inner.request_update();
        }
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

/// Counts frame requests instead of acting on them.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingScheduler {
    frames: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl RecordingScheduler {
    pub fn frames(&self) -> usize {
        self.frames.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl RuntimeScheduler for RecordingScheduler {
    fn schedule_frame(&self) {
        self.frames.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }
}
