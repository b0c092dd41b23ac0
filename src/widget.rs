//! Widget wiring: one [`init`] call builds the engine, visibility gate and
//! copy controller for a root, and returns the [`WidgetHandle`] that owns them.

use crate::clipboard::{ClipboardSink, CopyOutcome};
use crate::clock::Scheduler;
use crate::config::SnippetConfig;
use crate::copy::CopyController;
use crate::engine::{TypingEngine, TypingSnapshot};
use crate::host::{AnalyticsSink, Host};
use crate::visibility::VisibilityGate;
use anyhow::{Context as _, Result};
use rand::RngCore;
use std::cell::Cell;
use std::rc::Rc;
use tracing::debug;

/// Capabilities injected into a widget.
pub struct Services {
    pub clipboard: ClipboardSink,
    pub analytics: Option<Rc<dyn AnalyticsSink>>,
    /// Jitter source; entropy-seeded when `None`.
    pub rng: Option<Box<dyn RngCore>>,
}

impl Services {
    pub fn new(clipboard: ClipboardSink) -> Self {
        Services {
            clipboard,
            analytics: None,
            rng: None,
        }
    }

    pub fn with_analytics(mut self, analytics: Rc<dyn AnalyticsSink>) -> Self {
        self.analytics = Some(analytics);
        self
    }

    pub fn with_rng(mut self, rng: Box<dyn RngCore>) -> Self {
        self.rng = Some(rng);
        self
    }
}

/// Build a widget under the root matching `config.root_selector`.
///
/// Returns `Ok(None)` when the host has no such root; nothing is started in
/// that case. An invalid configuration is an error.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use typecast::{ClipboardSink, EventLoop, Services, SnippetConfig, init};
/// use typecast::host::{Host, WidgetRoot};
///
/// struct NoRoot;
///
/// impl Host for NoRoot {
///     fn resolve_root(&self, _selector: &str) -> Option<WidgetRoot> {
///         None
///     }
/// }
///
/// let event_loop = Rc::new(EventLoop::new());
/// let widget = init(
///     &NoRoot,
///     event_loop,
///     &SnippetConfig::default(),
///     Services::new(ClipboardSink::new()),
/// )
/// .unwrap();
/// assert!(widget.is_none());
/// ```
pub fn init(
    host: &dyn Host,
    scheduler: Rc<dyn Scheduler>,
    config: &SnippetConfig,
    services: Services,
) -> Result<Option<WidgetHandle>> {
    config.validate().context("Invalid snippet configuration")?;

    let Some(root) = host.resolve_root(&config.root_selector) else {
        debug!(selector = %config.root_selector, "widget root not found");
        return Ok(None);
    };

    let engine = match services.rng {
        Some(rng) => TypingEngine::with_rng(config, root.display, scheduler.clone(), rng),
        None => TypingEngine::new(config, root.display, scheduler.clone()),
    };
    let gate = VisibilityGate::new(engine.clone());
    let copy = CopyController::new(
        engine.clone(),
        root.feedback,
        services.clipboard,
        services.analytics,
        scheduler,
    );

    debug!(
        selector = %config.root_selector,
        commands = config.commands.len(),
        "widget initialized"
    );
    Ok(Some(WidgetHandle {
        engine,
        gate,
        copy,
        listening: Cell::new(true),
        disposed: Cell::new(false),
    }))
}

/// Owns one widget instance.
///
/// The host forwards visibility changes and copy clicks here. Disposing (or
/// dropping) the handle tears everything down.
pub struct WidgetHandle {
    engine: TypingEngine,
    gate: VisibilityGate,
    copy: CopyController,
    listening: Cell<bool>,
    disposed: Cell<bool>,
}

impl WidgetHandle {
    /// Deliver an intersection ratio from the host's visibility observer.
    pub fn on_visibility(&self, ratio: f64) {
        self.gate.observe(ratio);
    }

    /// Deliver a click on the copy button.
    ///
    /// Returns `None` once the click listener has been removed.
    pub async fn on_copy_click(&self) -> Option<CopyOutcome> {
        if !self.listening.get() {
            return None;
        }
        Some(self.copy.copy().await)
    }

    pub fn snapshot(&self) -> TypingSnapshot {
        self.engine.snapshot()
    }

    pub fn feedback_active(&self) -> bool {
        self.copy.feedback_active()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Stop the engine, cancel pending timers, disconnect the visibility
    /// observer and remove the click listener. Safe to call repeatedly.
    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        self.engine.dispose();
        self.copy.dispose();
        self.gate.disconnect();
        self.listening.set(false);
        debug!("widget disposed");
    }
}

impl Drop for WidgetHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}
