//! The surfaces a host environment provides to a widget.
//!
//! The widget never touches markup directly. A [`Host`] resolves the root
//! and hands back a [`WidgetRoot`] holding the two output surfaces. The text
//! display belongs to the typing engine and the feedback view to the copy
//! controller, so neither is ever shared.

/// Copy button state attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Idle,
    Success,
}

/// Where the typed text and its accessibility announcement go.
pub trait TextDisplay {
    /// Replace the visible terminal text.
    fn render(&mut self, text: &str);

    /// Announce a completed command to assistive technology.
    fn announce(&mut self, text: &str);
}

/// The copy button and toast.
pub trait FeedbackView {
    fn set_button_state(&mut self, state: ButtonState);

    fn set_button_label(&mut self, label: &str);

    fn set_toast_visible(&mut self, visible: bool);
}

/// Receives usage events when the host has analytics installed.
pub trait AnalyticsSink {
    fn track(&self, event: &str, text: &str);
}

/// The surfaces found under a widget root.
pub struct WidgetRoot {
    pub display: Box<dyn TextDisplay>,
    pub feedback: Box<dyn FeedbackView>,
}

/// Locates widget roots.
pub trait Host {
    /// Returns `None` when nothing matches `selector`.
    fn resolve_root(&self, selector: &str) -> Option<WidgetRoot>;
}
