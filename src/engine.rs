//! The typing engine: reveals a command character by character, pauses,
//! erases it, and moves on to the next one.

use crate::clock::{FrameHandle, Scheduler, TimerHandle};
use crate::config::SnippetConfig;
use crate::host::TextDisplay;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;
use tracing::debug;

/// Upper bound (exclusive, in milliseconds) of the random delay added to
/// every tick so the typing does not look mechanical.
pub const JITTER_MS: f64 = 20.0;

/// Coarse lifecycle of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not running; `start` resumes.
    Idle,
    /// Ticking on every frame.
    Running,
    /// Holding a fully typed command before deleting it.
    Paused,
    /// Done for good. Only reachable when looping is off.
    Finished,
}

/// Read-only view of the typing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingSnapshot {
    pub command_index: usize,
    pub char_index: usize,
    pub deleting: bool,
    pub running: bool,
    pub phase: Phase,
}

enum Step {
    Continue,
    Pause(Duration),
    Halt,
}

struct EngineState {
    commands: Rc<[String]>,
    typing_speed: Duration,
    delete_speed: Duration,
    pause_between: Duration,
    looping: bool,

    command_index: usize,
    char_index: usize,
    deleting: bool,
    running: bool,
    finished: bool,
    disposed: bool,
    last_tick: Option<Duration>,

    frame: Option<FrameHandle>,
    pause: Option<TimerHandle>,

    display: Box<dyn TextDisplay>,
    rng: Box<dyn RngCore>,
}

impl EngineState {
    fn active_command(&self) -> &str {
        &self.commands[self.command_index]
    }

    fn jitter(&mut self) -> Duration {
        Duration::from_secs_f64(self.rng.gen_range(0.0..JITTER_MS) / 1000.0)
    }

    fn finish(&mut self) {
        self.finished = true;
        self.running = false;
        debug!(command_index = self.command_index, "typing finished");
    }

    /// One frame's worth of work. Decides what the engine schedules next.
    fn advance(&mut self, now: Duration) -> Step {
        let Some(last_tick) = self.last_tick else {
            self.last_tick = Some(now);
            return Step::Continue;
        };

        let base = if self.deleting {
            self.delete_speed
        } else {
            self.typing_speed
        };
        // Resampled every tick, never cached.
        let threshold = base.saturating_add(self.jitter());
        if now.saturating_sub(last_tick) < threshold {
            return Step::Continue;
        }
        self.last_tick = Some(now);

        let len = self.active_command().chars().count();
        let mut completed = false;

        if self.deleting {
            if self.char_index == 0 {
                self.deleting = false;
                self.command_index = (self.command_index + 1) % self.commands.len();
                if !self.looping && self.command_index == 0 {
                    self.finish();
                    return Step::Halt;
                }
            } else {
                self.char_index -= 1;
            }
        } else if self.char_index == len {
            if self.commands.len() > 1 || self.looping {
                self.deleting = true;
                debug!(command_index = self.command_index, "pausing before delete");
                return Step::Pause(self.pause_between);
            }
            self.finish();
            return Step::Halt;
        } else {
            self.char_index += 1;
            completed = self.char_index == len;
        }

        let commands = Rc::clone(&self.commands);
        let command = &commands[self.command_index];
        self.display.render(prefix(command, self.char_index));
        if completed {
            // Once per pass so screen readers are not flooded.
            self.display.announce(command);
        }

        Step::Continue
    }
}

/// First `chars` characters of `text`.
fn prefix(text: &str, chars: usize) -> &str {
    match text.char_indices().nth(chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Drives the typing animation over a fixed list of commands.
///
/// Cloning yields another handle to the same engine.
#[derive(Clone)]
pub struct TypingEngine {
    state: Rc<RefCell<EngineState>>,
    scheduler: Rc<dyn Scheduler>,
}

impl TypingEngine {
    /// Create an engine with an entropy-seeded jitter source.
    ///
    /// The configuration must already be validated.
    pub fn new(
        config: &SnippetConfig,
        display: Box<dyn TextDisplay>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Self {
        Self::with_rng(config, display, scheduler, Box::new(StdRng::from_entropy()))
    }

    /// Create an engine with a caller-supplied jitter source.
    pub fn with_rng(
        config: &SnippetConfig,
        display: Box<dyn TextDisplay>,
        scheduler: Rc<dyn Scheduler>,
        rng: Box<dyn RngCore>,
    ) -> Self {
        debug_assert!(!config.commands.is_empty());
        let state = EngineState {
            commands: config.commands.iter().cloned().collect(),
            typing_speed: config.typing_speed,
            delete_speed: config.delete_speed,
            pause_between: config.pause_between,
            looping: config.looping,
            command_index: 0,
            char_index: 0,
            deleting: false,
            running: false,
            finished: false,
            disposed: false,
            last_tick: None,
            frame: None,
            pause: None,
            display,
            rng,
        };
        TypingEngine {
            state: Rc::new(RefCell::new(state)),
            scheduler,
        }
    }

    /// Begin ticking. No-op while running, after finishing, or once disposed.
    pub fn start(&self) {
        {
            let mut state = self.state.borrow_mut();
            if state.running || state.finished || state.disposed {
                return;
            }
            state.running = true;
            state.last_tick = None;
            debug!(command_index = state.command_index, "typing started");
        }
        self.schedule_frame();
    }

    /// Stop ticking. Cancels the outstanding frame and any pause in progress;
    /// a later [`start`](Self::start) picks up where the engine left off.
    pub fn stop(&self) {
        let (frame, pause) = {
            let mut state = self.state.borrow_mut();
            if !state.running {
                return;
            }
            state.running = false;
            debug!(command_index = state.command_index, "typing stopped");
            (state.frame.take(), state.pause.take())
        };
        if let Some(frame) = frame {
            self.scheduler.cancel_frame(frame);
        }
        if let Some(pause) = pause {
            self.scheduler.clear_timeout(pause);
        }
    }

    /// Stop for good. Callbacks still queued with the scheduler become no-ops.
    pub fn dispose(&self) {
        self.stop();
        self.state.borrow_mut().disposed = true;
    }

    pub fn snapshot(&self) -> TypingSnapshot {
        let state = self.state.borrow();
        let phase = if state.finished {
            Phase::Finished
        } else if !state.running {
            Phase::Idle
        } else if state.pause.is_some() {
            Phase::Paused
        } else {
            Phase::Running
        };
        TypingSnapshot {
            command_index: state.command_index,
            char_index: state.char_index,
            deleting: state.deleting,
            running: state.running,
            phase,
        }
    }

    /// The command list this engine cycles through.
    pub fn commands(&self) -> Rc<[String]> {
        self.state.borrow().commands.clone()
    }

    /// Process one frame opportunity at `now`.
    ///
    /// Normally invoked by the scheduler. Ignored unless the engine is running,
    /// so a stopped engine never changes the display.
    pub fn tick(&self, now: Duration) {
        let step = {
            let mut state = self.state.borrow_mut();
            if !state.running || state.finished || state.disposed {
                return;
            }
            state.advance(now)
        };
        match step {
            Step::Continue => self.schedule_frame(),
            Step::Pause(delay) => self.schedule_pause(delay),
            Step::Halt => {}
        }
    }

    fn schedule_frame(&self) {
        {
            let state = self.state.borrow();
            if !state.running || state.finished || state.disposed || state.frame.is_some() {
                return;
            }
        }
        let (state, scheduler) = self.downgrade();
        let handle = self.scheduler.request_frame(Box::new(move |now| {
            if let Some(engine) = Self::upgrade(&state, &scheduler) {
                engine.on_frame(now);
            }
        }));
        self.state.borrow_mut().frame = Some(handle);
    }

    fn schedule_pause(&self, delay: Duration) {
        if !self.state.borrow().running {
            return;
        }
        let (state, scheduler) = self.downgrade();
        let handle = self.scheduler.set_timeout(
            delay,
            Box::new(move |now| {
                if let Some(engine) = Self::upgrade(&state, &scheduler) {
                    engine.on_pause_elapsed(now);
                }
            }),
        );
        self.state.borrow_mut().pause = Some(handle);
    }

    fn on_frame(&self, now: Duration) {
        {
            let mut state = self.state.borrow_mut();
            state.frame = None;
            if !state.running || state.disposed {
                return;
            }
        }
        self.tick(now);
    }

    fn on_pause_elapsed(&self, now: Duration) {
        {
            let mut state = self.state.borrow_mut();
            state.pause = None;
            if !state.running || state.disposed {
                return;
            }
            state.last_tick = Some(now);
        }
        self.schedule_frame();
    }

    fn downgrade(&self) -> (Weak<RefCell<EngineState>>, Weak<dyn Scheduler>) {
        (Rc::downgrade(&self.state), Rc::downgrade(&self.scheduler))
    }

    fn upgrade(
        state: &Weak<RefCell<EngineState>>,
        scheduler: &Weak<dyn Scheduler>,
    ) -> Option<TypingEngine> {
        Some(TypingEngine {
            state: state.upgrade()?,
            scheduler: scheduler.upgrade()?,
        })
    }
}
