//! Platform abstraction traits for fiber runtime services.
//!
//! These let a host environment decide when frames run and how time is
//! measured, so the work loop itself never touches a timing source.

/// Receives frame requests from the runtime.
///
/// Called whenever a state update needs a new work loop tick. Implementations
/// must be safe to share across threads even though the runtime itself is
/// single-threaded.
pub trait RuntimeScheduler: Send + Sync {
    /// Request that the host run the work loop on its next frame.
    fn schedule_frame(&self);
}

/// Provides timing information for deadline checks.
pub trait Clock: Send + Sync {
    /// Instant type produced by this clock implementation.
    type Instant: Copy + Send + Sync;

    /// Returns the current instant.
    fn now(&self) -> Self::Instant;

    /// Returns the number of milliseconds elapsed since `since`.
    fn elapsed_millis(&self, since: Self::Instant) -> u64;
}
