//! Per-component persistent state.
//!
//! A component's hook cells are rebuilt on every render by replaying
//! `use_state` calls in order against the cells of its alternate. Each cell
//! shares its update queue with the cells that replace it, so a [`SetState`]
//! captured in any generation keeps feeding the same position.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use scoped_tls_hkt::scoped_thread_local;

use crate::error::RenderError;
use crate::runtime::RuntimeHandle;

type QueuedAction = Rc<dyn Any>;

#[derive(Clone, Default)]
pub(crate) struct UpdateQueue(Rc<RefCell<Vec<QueuedAction>>>);

impl UpdateQueue {
    fn push(&self, action: QueuedAction) {
        self.0.borrow_mut().push(action);
    }

    fn pending(&self) -> Vec<QueuedAction> {
        self.0.borrow().clone()
    }

    fn consume(&self, count: usize) {
        let mut queue = self.0.borrow_mut();
        let count = count.min(queue.len());
        queue.drain(..count);
    }

    pub(crate) fn len(&self) -> usize {
        self.0.borrow().len()
    }
}

/// One persistent state slot.
#[derive(Clone)]
pub struct HookCell {
    state: Rc<dyn Any>,
    queue: UpdateQueue,
    /// Queue entries folded into `state`; drained when this cell is committed.
    applied: usize,
}

impl HookCell {
    fn state<T: Clone + 'static>(&self) -> Option<T> {
        self.state.downcast_ref::<T>().cloned()
    }

    pub(crate) fn settle(&mut self) {
        if self.applied > 0 {
            self.queue.consume(self.applied);
            self.applied = 0;
        }
    }
}

impl fmt::Debug for HookCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookCell")
            .field("queued", &self.queue.len())
            .field("applied", &self.applied)
            .finish()
    }
}

enum StateAction<T> {
    Replace(T),
    Update(Rc<dyn Fn(&T) -> T>),
}

impl<T: Clone> StateAction<T> {
    fn apply(&self, state: T) -> T {
        match self {
            StateAction::Replace(value) => value.clone(),
            StateAction::Update(update) => update(&state),
        }
    }
}

/// Updater returned by [`use_state`].
pub struct SetState<T> {
    queue: UpdateQueue,
    runtime: RuntimeHandle,
    _marker: PhantomData<fn(T)>,
}

impl<T: Clone + 'static> SetState<T> {
    /// Queues a replacement value and schedules a new generation.
    pub fn set(&self, value: T) {
        self.dispatch(StateAction::Replace(value));
    }

    /// Queues a function of the previous state and schedules a new generation.
    pub fn update(&self, update: impl Fn(&T) -> T + 'static) {
        self.dispatch(StateAction::Update(Rc::new(update)));
    }

    fn dispatch(&self, action: StateAction<T>) {
        self.queue.push(Rc::new(action));
        self.runtime.request_update();
    }
}

impl<T> Clone for SetState<T> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            runtime: self.runtime.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for SetState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetState")
            .field("queued", &self.queue.len())
            .finish()
    }
}

/// Hook state for the component currently being invoked.
pub(crate) struct HookFrame {
    component: &'static str,
    previous: Option<Vec<HookCell>>,
    cells: Vec<HookCell>,
    runtime: RuntimeHandle,
    error: Option<RenderError>,
}

impl HookFrame {
    /// `previous` is `None` on first mount and the alternate's cells otherwise.
    pub(crate) fn new(
        component: &'static str,
        previous: Option<Vec<HookCell>>,
        runtime: RuntimeHandle,
    ) -> Self {
        Self {
            component,
            previous,
            cells: Vec::new(),
            runtime,
            error: None,
        }
    }

    fn fail(&mut self, index: usize, reason: &'static str) {
        if self.error.is_none() {
            self.error = Some(RenderError::HookOrder {
                component: self.component,
                index,
                reason,
            });
        }
    }

    fn use_state<T: Clone + 'static>(&mut self, init: impl FnOnce() -> T) -> (T, SetState<T>) {
        let index = self.cells.len();
        let previous = self.previous.as_ref().map(|cells| cells.get(index));
        let (base, queue) = match previous {
            Some(Some(cell)) => match cell.state::<T>() {
                Some(state) => (state, cell.queue.clone()),
                None => {
                    self.fail(index, "state type differs from the previous render");
                    (init(), UpdateQueue::default())
                }
            },
            Some(None) => {
                self.fail(index, "more hooks than during the previous render");
                (init(), UpdateQueue::default())
            }
            None => (init(), UpdateQueue::default()),
        };

        let pending = queue.pending();
        let mut state = base;
        for action in &pending {
            match action.downcast_ref::<StateAction<T>>() {
                Some(action) => state = action.apply(state),
                None => self.fail(index, "queued update has a different state type"),
            }
        }

        self.cells.push(HookCell {
            state: Rc::new(state.clone()),
            queue: queue.clone(),
            applied: pending.len(),
        });
        let set_state = SetState {
            queue,
            runtime: self.runtime.clone(),
            _marker: PhantomData,
        };
        (state, set_state)
    }

    /// Closes the frame, checking the hook count against the previous render.
    pub(crate) fn finish(self) -> Result<Vec<HookCell>, RenderError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if let Some(previous) = &self.previous {
            if previous.len() != self.cells.len() {
                return Err(RenderError::HookOrder {
                    component: self.component,
                    index: self.cells.len(),
                    reason: "fewer hooks than during the previous render",
                });
            }
        }
        Ok(self.cells)
    }
}

scoped_thread_local!(static CURRENT_FRAME: RefCell<HookFrame>);

pub(crate) fn with_frame<R>(frame: &RefCell<HookFrame>, f: impl FnOnce() -> R) -> R {
    CURRENT_FRAME.set(frame, f)
}

/// Returns the state for this call position and its updater.
///
/// # Panics
///
/// When called outside of a component render.
pub fn use_state<T: Clone + 'static>(initial: T) -> (T, SetState<T>) {
    use_state_with(move || initial)
}

/// Like [`use_state`], building the initial value only on first mount.
pub fn use_state_with<T: Clone + 'static>(init: impl FnOnce() -> T) -> (T, SetState<T>) {
    assert!(
        CURRENT_FRAME.is_set(),
        "use_state called outside of a component render"
    );
    CURRENT_FRAME.with(|frame| frame.borrow_mut().use_state(init))
}
