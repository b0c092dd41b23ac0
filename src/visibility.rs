//! Starts and stops the typing engine as the widget scrolls in and out of view.

use crate::engine::TypingEngine;
use std::cell::Cell;
use tracing::debug;

/// Fraction of the widget that must be on screen for it to count as visible.
pub const VISIBILITY_THRESHOLD: f64 = 0.1;

/// Observes intersection ratios and toggles the engine accordingly.
pub struct VisibilityGate {
    engine: TypingEngine,
    threshold: f64,
    visible: Cell<Option<bool>>,
    connected: Cell<bool>,
}

impl VisibilityGate {
    pub fn new(engine: TypingEngine) -> Self {
        Self::with_threshold(engine, VISIBILITY_THRESHOLD)
    }

    pub fn with_threshold(engine: TypingEngine, threshold: f64) -> Self {
        VisibilityGate {
            engine,
            threshold,
            visible: Cell::new(None),
            connected: Cell::new(true),
        }
    }

    /// Report the current intersection ratio (0.0 to 1.0).
    pub fn observe(&self, ratio: f64) {
        if !self.connected.get() {
            return;
        }
        let visible = ratio >= self.threshold;
        if self.visible.replace(Some(visible)) != Some(visible) {
            debug!(ratio, visible, "visibility changed");
        }
        // The engine tolerates repeats, so forward every observation.
        if visible {
            self.engine.start();
        } else {
            self.engine.stop();
        }
    }

    /// Stop reacting to observations.
    pub fn disconnect(&self) {
        self.connected.set(false);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.get()
    }

    /// Last reported visibility, if any observation has arrived.
    pub fn is_visible(&self) -> Option<bool> {
        self.visible.get()
    }
}
