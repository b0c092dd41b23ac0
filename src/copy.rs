//! Copy-button handling: clipboard write, success feedback, auto-reset.

use crate::clipboard::{ClipboardSink, CopyOutcome};
use crate::clock::{Scheduler, TimerHandle};
use crate::engine::TypingEngine;
use crate::host::{AnalyticsSink, ButtonState, FeedbackView};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;
use tracing::debug;

/// How long the "copied" feedback stays up.
pub const RESET_DELAY: Duration = Duration::from_millis(2000);

/// Button label while feedback is shown.
pub const COPIED_LABEL: &str = "Copied successfully";

/// Button label at rest.
pub const IDLE_LABEL: &str = "Copy installation command to clipboard";

/// Analytics event emitted after a successful copy.
pub const COPY_EVENT: &str = "copy";

struct Feedback {
    view: Box<dyn FeedbackView>,
    active: bool,
    pending_reset: Option<TimerHandle>,
    disposed: bool,
}

impl Feedback {
    fn show(&mut self) {
        self.active = true;
        self.view.set_button_state(ButtonState::Success);
        self.view.set_button_label(COPIED_LABEL);
        self.view.set_toast_visible(true);
    }

    fn reset(&mut self) {
        self.active = false;
        self.view.set_button_state(ButtonState::Idle);
        self.view.set_button_label(IDLE_LABEL);
        self.view.set_toast_visible(false);
    }
}

/// Copies the active command and drives the button and toast.
pub struct CopyController {
    engine: TypingEngine,
    sink: ClipboardSink,
    analytics: Option<Rc<dyn AnalyticsSink>>,
    scheduler: Rc<dyn Scheduler>,
    feedback: Rc<RefCell<Feedback>>,
}

impl CopyController {
    pub fn new(
        engine: TypingEngine,
        view: Box<dyn FeedbackView>,
        sink: ClipboardSink,
        analytics: Option<Rc<dyn AnalyticsSink>>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Self {
        CopyController {
            engine,
            sink,
            analytics,
            scheduler,
            feedback: Rc::new(RefCell::new(Feedback {
                view,
                active: false,
                pending_reset: None,
                disposed: false,
            })),
        }
    }

    /// The command a copy request would write right now: the engine's active
    /// command, or the first one when that is empty.
    pub fn text_to_copy(&self) -> String {
        let commands = self.engine.commands();
        let index = self.engine.snapshot().command_index % commands.len();
        let text = &commands[index];
        if text.is_empty() {
            commands[0].clone()
        } else {
            text.clone()
        }
    }

    /// Write the active command to the clipboard and show feedback on success.
    pub async fn copy(&self) -> CopyOutcome {
        let text = self.text_to_copy();
        let outcome = self.sink.write(&text).await;

        if let CopyOutcome::Copied { via } = outcome {
            if self.feedback.borrow().disposed {
                return outcome;
            }
            debug!(via, "copied to clipboard");
            self.show_success();
            // Fallback copies are not tracked.
            if self.sink.is_primary(via) {
                if let Some(analytics) = &self.analytics {
                    analytics.track(COPY_EVENT, &text);
                }
            }
        }
        outcome
    }

    pub fn feedback_active(&self) -> bool {
        self.feedback.borrow().active
    }

    /// Cancel the pending reset. Later resets and copies leave the view alone.
    pub fn dispose(&self) {
        let pending = {
            let mut feedback = self.feedback.borrow_mut();
            feedback.disposed = true;
            feedback.pending_reset.take()
        };
        if let Some(handle) = pending {
            self.scheduler.clear_timeout(handle);
        }
    }

    fn show_success(&self) {
        let superseded = {
            let mut feedback = self.feedback.borrow_mut();
            feedback.show();
            feedback.pending_reset.take()
        };
        // Only the newest reset may fire.
        if let Some(handle) = superseded {
            self.scheduler.clear_timeout(handle);
        }

        let feedback: Weak<RefCell<Feedback>> = Rc::downgrade(&self.feedback);
        let handle = self.scheduler.set_timeout(
            RESET_DELAY,
            Box::new(move |_| {
                let Some(feedback) = feedback.upgrade() else {
                    return;
                };
                let mut feedback = feedback.borrow_mut();
                feedback.pending_reset = None;
                if !feedback.disposed {
                    feedback.reset();
                }
            }),
        );
        self.feedback.borrow_mut().pending_reset = Some(handle);
    }
}
