//! Time source and callback scheduling.
//!
//! Components never sleep. They ask a [`Scheduler`] for the next display frame
//! or for a one-shot delay and go dormant until the callback arrives. The
//! [`EventLoop`] implementation keeps a virtual clock that only moves when
//! the host pumps it, which makes every animation step reproducible in tests.

use std::cell::{Cell, RefCell};
use std::time::Duration;

/// Roughly one frame at 60 Hz.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Callback run on the next display frame with the frame timestamp.
pub type FrameCallback = Box<dyn FnOnce(Duration)>;

/// Callback run once a delay has elapsed, with the time it fired at.
pub type TimerCallback = Box<dyn FnOnce(Duration)>;

/// Identifies a requested frame so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

/// Identifies a pending timeout so it can be cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// Monotonic clock plus frame and delay scheduling.
///
/// Time points are offsets from the scheduler's origin. Cancelling a handle
/// that already fired or was already cancelled is a no-op.
pub trait Scheduler {
    /// Current time.
    fn now(&self) -> Duration;

    /// Run `callback` on the next frame opportunity.
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle;

    /// Drop a frame callback that has not run yet.
    fn cancel_frame(&self, handle: FrameHandle);

    /// Run `callback` once `delay` has elapsed.
    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerHandle;

    /// Drop a timeout that has not fired yet.
    fn clear_timeout(&self, handle: TimerHandle);
}

struct Timer {
    id: u64,
    deadline: Duration,
    callback: TimerCallback,
}

/// A manually pumped, single-threaded scheduler.
///
/// Each [`pump`](Self::pump) moves the clock forward, fires every due timeout
/// in deadline order, then runs each frame callback that was queued before
/// the frame phase started. Frames requested from inside a frame callback run
/// on the following pump, the way a browser's animation frames behave.
pub struct EventLoop {
    now: Cell<Duration>,
    next_id: Cell<u64>,
    frames: RefCell<Vec<(u64, FrameCallback)>>,
    timers: RefCell<Vec<Timer>>,
}

impl EventLoop {
    pub fn new() -> Self {
        EventLoop {
            now: Cell::new(Duration::ZERO),
            next_id: Cell::new(1),
            frames: RefCell::new(Vec::new()),
            timers: RefCell::new(Vec::new()),
        }
    }

    fn next_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    /// Move the clock to `now` (never backwards) and run everything that is due.
    pub fn pump(&self, now: Duration) {
        let now = now.max(self.now.get());
        self.now.set(now);

        while let Some(timer) = self.take_due_timer(now) {
            (timer.callback)(now);
        }

        let batch: Vec<u64> = self.frames.borrow().iter().map(|(id, _)| *id).collect();
        for id in batch {
            // A callback earlier in the batch may have cancelled this one.
            let callback = {
                let mut frames = self.frames.borrow_mut();
                frames
                    .iter()
                    .position(|(frame_id, _)| *frame_id == id)
                    .map(|pos| frames.remove(pos).1)
            };
            if let Some(callback) = callback {
                callback(now);
            }
        }
    }

    /// Pump once at `now + by`.
    pub fn advance(&self, by: Duration) {
        self.pump(self.now.get().saturating_add(by));
    }

    /// Pump repeatedly in `step` increments until `total` has elapsed.
    pub fn run_for(&self, total: Duration, step: Duration) {
        assert!(!step.is_zero(), "step must be positive");
        let end = self.now.get().saturating_add(total);
        while self.now.get() < end {
            let next = self.now.get().saturating_add(step).min(end);
            self.pump(next);
        }
    }

    /// Number of frame callbacks waiting for the next pump.
    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Number of timeouts that have not fired yet.
    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    fn take_due_timer(&self, now: Duration) -> Option<Timer> {
        let mut timers = self.timers.borrow_mut();
        let pos = timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.deadline <= now)
            .min_by_key(|(_, timer)| (timer.deadline, timer.id))
            .map(|(pos, _)| pos)?;
        Some(timers.remove(pos))
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for EventLoop {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn request_frame(&self, callback: FrameCallback) -> FrameHandle {
        let id = self.next_id();
        self.frames.borrow_mut().push((id, callback));
        FrameHandle(id)
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        self.frames.borrow_mut().retain(|(id, _)| *id != handle.0);
    }

    fn set_timeout(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let id = self.next_id();
        self.timers.borrow_mut().push(Timer {
            id,
            deadline: self.now.get().saturating_add(delay),
            callback,
        });
        TimerHandle(id)
    }

    fn clear_timeout(&self, handle: TimerHandle) {
        self.timers.borrow_mut().retain(|timer| timer.id != handle.0);
    }
}
