//! A [`Host`] that draws the widget as a single terminal line.
//!
//! The line looks like `$ pip install snakeskin-xplnhub▌  [Copied successfully]`
//! and is redrawn in place whenever the text, the button label or the toast
//! changes. Output goes through a handler so it can be captured.

use crate::clipboard::{ScratchId, ScratchSurface};
use crate::host::{ButtonState, FeedbackView, Host, TextDisplay, WidgetRoot};
use anyhow::{Result, anyhow};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use tracing::info;

type OutputHandler = Rc<dyn Fn(&[u8])>;

const PROMPT: &str = "$ ";
const CURSOR: &str = "▌";
const TOAST: &str = "Copied!";

#[derive(Default)]
struct Line {
    text: String,
    button: Option<ButtonState>,
    toast: bool,
}

struct Screen {
    line: RefCell<Line>,
    output: OutputHandler,
}

impl Screen {
    fn redraw(&self) {
        let line = self.line.borrow();
        let mut out = format!("\r\x1b[2K{PROMPT}{}{CURSOR}", line.text);
        if line.button == Some(ButtonState::Success) && line.toast {
            out.push_str(&format!("  [{TOAST}]"));
        }
        (self.output)(out.as_bytes());
    }
}

/// Renders typed text into the shared line.
struct LineDisplay(Rc<Screen>);

impl TextDisplay for LineDisplay {
    fn render(&mut self, text: &str) {
        self.0.line.borrow_mut().text = text.to_owned();
        self.0.redraw();
    }

    fn announce(&mut self, text: &str) {
        info!(command = text, "command typed");
    }
}

/// Renders copy feedback next to the typed text.
struct LineFeedback(Rc<Screen>);

impl FeedbackView for LineFeedback {
    fn set_button_state(&mut self, state: ButtonState) {
        self.0.line.borrow_mut().button = Some(state);
    }

    fn set_button_label(&mut self, label: &str) {
        info!(label, "copy button");
    }

    fn set_toast_visible(&mut self, visible: bool) {
        self.0.line.borrow_mut().toast = visible;
        self.0.redraw();
    }
}

/// Single-widget terminal host.
///
/// Every selector resolves to the one line this host owns, so at most one
/// widget should be initialized against it.
pub struct TerminalHost {
    screen: Rc<Screen>,
}

impl TerminalHost {
    /// Host writing to stdout.
    pub fn stdout() -> Self {
        Self::with_handler(|data| {
            let mut stdout = io::stdout();
            // A closed stdout only loses the animation.
            let _ = stdout.write_all(data).and_then(|_| stdout.flush());
        })
    }

    /// Host writing through `handler`.
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&[u8]) + 'static,
    {
        TerminalHost {
            screen: Rc::new(Screen {
                line: RefCell::new(Line::default()),
                output: Rc::new(handler),
            }),
        }
    }

    /// OSC 52 scratch surface writing through the same output.
    pub fn osc52_surface(&self) -> Osc52Surface {
        Osc52Surface {
            output: self.screen.output.clone(),
            staged: None,
            selected: false,
            next_id: 0,
        }
    }

    /// End the widget line.
    pub fn finish(&self) {
        (self.screen.output)(b"\n");
    }
}

impl Host for TerminalHost {
    fn resolve_root(&self, _selector: &str) -> Option<WidgetRoot> {
        Some(WidgetRoot {
            display: Box::new(LineDisplay(self.screen.clone())),
            feedback: Box::new(LineFeedback(self.screen.clone())),
        })
    }
}

/// Copies by asking the terminal emulator to set the clipboard (OSC 52).
///
/// The staged text is never shown; the copy command emits the escape
/// sequence for it.
pub struct Osc52Surface {
    output: OutputHandler,
    staged: Option<(ScratchId, String)>,
    selected: bool,
    next_id: u64,
}

impl Osc52Surface {
    /// The escape sequence that puts `text` on the system clipboard.
    pub fn sequence(text: &str) -> String {
        format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
    }
}

impl ScratchSurface for Osc52Surface {
    fn insert(&mut self, text: &str) -> Result<ScratchId> {
        self.next_id += 1;
        let id = ScratchId(self.next_id);
        self.staged = Some((id, text.to_owned()));
        self.selected = false;
        Ok(id)
    }

    fn select(&mut self, id: ScratchId) -> Result<()> {
        match &self.staged {
            Some((staged, _)) if *staged == id => {
                self.selected = true;
                Ok(())
            }
            _ => Err(anyhow!("No scratch element {:?}", id)),
        }
    }

    fn exec_copy(&mut self) -> Result<bool> {
        match &self.staged {
            Some((_, text)) if self.selected => {
                (self.output)(Self::sequence(text).as_bytes());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn remove(&mut self, id: ScratchId) {
        if matches!(&self.staged, Some((staged, _)) if *staged == id) {
            self.staged = None;
            self.selected = false;
        }
    }
}
