//! Standard runtime services backed by Rust's `std` library.
//!
//! This crate provides concrete implementations of the platform
//! abstraction traits defined in `fiber-core`, plus a frame driver that runs
//! work loop ticks under a wall-clock budget. Applications construct a
//! [`StdRuntime`] and build their [`fiber_core::FiberRoot`] with
//! [`StdRuntime::runtime`] so state updates reach its scheduler.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use fiber_core::{
    Clock, Deadline, FiberRoot, Host, RenderError, Runtime, RuntimeHandle, RuntimeScheduler,
    WorkStatus,
};

type FrameWaker = Arc<dyn Fn() + Send + Sync + 'static>;

/// Scheduler that records frame requests and pokes an optional waker.
pub struct StdScheduler {
    frame_requested: AtomicBool,
    frame_waker: RwLock<Option<FrameWaker>>,
}

impl StdScheduler {
    pub fn new() -> Self {
        Self {
            frame_requested: AtomicBool::new(false),
            frame_waker: RwLock::new(None),
        }
    }

    /// Returns whether a frame has been requested since the last call.
    pub fn take_frame_request(&self) -> bool {
        self.frame_requested.swap(false, Ordering::SeqCst)
    }

    /// Registers a waker that will be invoked whenever a new frame is scheduled.
    pub fn set_frame_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        *self
            .frame_waker
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(waker));
    }

    /// Clears any registered frame waker.
    pub fn clear_frame_waker(&self) {
        *self
            .frame_waker
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn wake(&self) {
        let waker = self
            .frame_waker
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(waker) = waker {
            waker();
        }
    }
}

impl Default for StdScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StdScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdScheduler")
            .field(
                "frame_requested",
                &self.frame_requested.load(Ordering::SeqCst),
            )
            .finish()
    }
}

impl RuntimeScheduler for StdScheduler {
    fn schedule_frame(&self) {
        self.frame_requested.store(true, Ordering::SeqCst);
        self.wake();
    }
}

/// Clock implementation backed by [`std::time`].
#[derive(Debug, Default, Clone)]
pub struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    fn elapsed_millis(&self, since: Self::Instant) -> u64 {
        since.elapsed().as_millis() as u64
    }
}

impl StdClock {
    /// Returns the elapsed time as a [`Duration`] for convenience.
    pub fn elapsed(&self, since: Instant) -> Duration {
        since.elapsed()
    }
}

/// Time budget settings for the frame driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Wall-clock time one frame may spend on units of work.
    pub frame_budget: Duration,
    /// The loop yields once less than this is left of the budget.
    pub min_time_remaining: Duration,
    /// Upper bound on frames [`StdRuntime::run_until_idle`] runs.
    pub max_frames: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            frame_budget: Duration::from_millis(16),
            min_time_remaining: Duration::from_millis(1),
            max_frames: 10_000,
        }
    }
}

impl SchedulerConfig {
    pub fn with_frame_budget(mut self, frame_budget: Duration) -> Self {
        self.frame_budget = frame_budget;
        self
    }

    pub fn with_min_time_remaining(mut self, min_time_remaining: Duration) -> Self {
        self.min_time_remaining = min_time_remaining;
        self
    }

    pub fn with_max_frames(mut self, max_frames: usize) -> Self {
        self.max_frames = max_frames;
        self
    }
}

/// Yields once the frame that started at construction is nearly out of time.
pub struct FrameDeadline<'a, C: Clock> {
    clock: &'a C,
    started: C::Instant,
    budget_millis: u64,
    min_remaining_millis: u64,
}

impl<'a, C: Clock> FrameDeadline<'a, C> {
    pub fn start(clock: &'a C, config: &SchedulerConfig) -> Self {
        Self {
            clock,
            started: clock.now(),
            budget_millis: config.frame_budget.as_millis() as u64,
            min_remaining_millis: config.min_time_remaining.as_millis() as u64,
        }
    }

    /// Milliseconds left of the budget, zero once it is spent.
    pub fn time_remaining(&self) -> u64 {
        self.budget_millis
            .saturating_sub(self.clock.elapsed_millis(self.started))
    }
}

impl<C: Clock> Deadline for FrameDeadline<'_, C> {
    fn should_yield(&self) -> bool {
        self.time_remaining() < self.min_remaining_millis
    }
}

/// What [`drive`] did before it stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub frames: usize,
    pub yields: usize,
    pub commits: usize,
    /// `false` when the frame limit was hit with work still pending.
    pub idle: bool,
}

/// Runs one budgeted work loop tick per frame until `root` has no pending
/// work or `config.max_frames` frames have run.
pub fn drive<H: Host, C: Clock>(
    root: &mut FiberRoot<H>,
    clock: &C,
    config: &SchedulerConfig,
) -> Result<FrameReport, RenderError> {
    let mut report = FrameReport::default();
    while root.has_pending_work() {
        if report.frames == config.max_frames {
            log::warn!(
                "stopping after {} frames with work still pending",
                report.frames
            );
            return Ok(report);
        }
        report.frames += 1;
        let deadline = FrameDeadline::start(clock, config);
        match root.work_loop(&deadline) {
            Ok(WorkStatus::Yielded) => report.yields += 1,
            Ok(WorkStatus::Committed) => report.commits += 1,
            Ok(WorkStatus::Idle) => {}
            Err(err) => {
                log::error!("frame {} failed: {err}", report.frames);
                return Err(err);
            }
        }
    }
    report.idle = true;
    Ok(report)
}

/// Convenience container bundling the standard scheduler, clock and budget.
#[derive(Clone)]
pub struct StdRuntime {
    scheduler: Arc<StdScheduler>,
    clock: Arc<StdClock>,
    runtime: Runtime,
    config: SchedulerConfig,
}

impl StdRuntime {
    /// Creates a new standard runtime instance with the default budget.
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        let scheduler = Arc::new(StdScheduler::default());
        let runtime = Runtime::new(scheduler.clone());
        Self {
            scheduler,
            clock: Arc::new(StdClock::default()),
            runtime,
            config,
        }
    }

    /// Returns a [`fiber_core::Runtime`] configured with the standard scheduler.
    pub fn runtime(&self) -> Runtime {
        self.runtime.clone()
    }

    /// Returns a handle to the runtime.
    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    /// Returns the scheduler implementation.
    pub fn scheduler(&self) -> Arc<StdScheduler> {
        Arc::clone(&self.scheduler)
    }

    /// Returns the clock implementation.
    pub fn clock(&self) -> Arc<StdClock> {
        Arc::clone(&self.clock)
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Returns whether a frame was requested since the last poll.
    pub fn take_frame_request(&self) -> bool {
        self.scheduler.take_frame_request()
    }

    /// Registers a waker to be called when the runtime schedules a new frame.
    pub fn set_frame_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        self.scheduler.set_frame_waker(waker);
    }

    /// Clears any previously registered frame waker.
    pub fn clear_frame_waker(&self) {
        self.scheduler.clear_frame_waker();
    }

    /// Runs a single budgeted tick of `root`'s work loop.
    pub fn run_frame<H: Host>(&self, root: &mut FiberRoot<H>) -> Result<WorkStatus, RenderError> {
        let deadline = FrameDeadline::start(self.clock.as_ref(), &self.config);
        root.work_loop(&deadline)
    }

    /// Answers the pending frame request, if any, by driving `root` to idle.
    pub fn run_until_idle<H: Host>(
        &self,
        root: &mut FiberRoot<H>,
    ) -> Result<FrameReport, RenderError> {
        self.scheduler.take_frame_request();
        drive(root, self.clock.as_ref(), &self.config)
    }
}

impl fmt::Debug for StdRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdRuntime")
            .field("scheduler", &self.scheduler)
            .field("clock", &self.clock)
            .field("config", &self.config)
            .finish()
    }
}

impl Default for StdRuntime {
    fn default() -> Self {
        Self::new()
    }
}
