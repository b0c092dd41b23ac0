//! # Typecast
//!
//! A fake-terminal snippet widget: it types a shell command character by
//! character, pauses, erases it, moves on to the next command, and lets the
//! user copy the command to the clipboard.
//!
//! The crate owns the state machines and leaves every environment concern
//! behind a trait: time and scheduling ([`Scheduler`]), the output surfaces
//! ([`host::Host`]), and the clipboard ([`ClipboardStrategy`]). Everything is
//! single-threaded and callback driven.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::rc::Rc;
//! use typecast::terminal::TerminalHost;
//! use typecast::{ClipboardSink, EventLoop, Services, SnippetConfig, SystemClipboard, init};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let host = TerminalHost::stdout();
//!     let event_loop = Rc::new(EventLoop::new());
//!     let config = SnippetConfig::with_commands(["cargo install typecast"]);
//!     let clipboard = ClipboardSink::new().with_strategy(SystemClipboard);
//!
//!     let widget = init(&host, event_loop.clone(), &config, Services::new(clipboard))?
//!         .expect("terminal host always has a root");
//!     widget.on_visibility(1.0);
//!
//!     let start = tokio::time::Instant::now();
//!     while start.elapsed() < std::time::Duration::from_secs(5) {
//!         tokio::time::sleep(typecast::clock::FRAME_INTERVAL).await;
//!         event_loop.pump(start.elapsed());
//!     }
//!     widget.on_copy_click().await;
//!     widget.dispose();
//!     Ok(())
//! }
//! ```
//!
//! ## Timing
//!
//! On every frame the engine compares the time since its last accepted tick
//! with `typing_speed` (or `delete_speed` while erasing) plus a fresh random
//! jitter below [`engine::JITTER_MS`]. A fully typed command is held for
//! `pause_between` before it is erased. With `looping` off the engine stops
//! after the last command: a single command stays on screen, several commands
//! stop once the last one has been erased.
//!
//! ## Testing with a virtual clock
//!
//! [`EventLoop`] only moves when pumped, so tests can step the animation
//! deterministically:
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use std::time::Duration;
//! use typecast::host::TextDisplay;
//! use typecast::{EventLoop, SnippetConfig, TypingEngine};
//!
//! struct Shared(Rc<RefCell<String>>);
//!
//! impl TextDisplay for Shared {
//!     fn render(&mut self, text: &str) {
//!         *self.0.borrow_mut() = text.to_string();
//!     }
//!     fn announce(&mut self, _text: &str) {}
//! }
//!
//! let shown = Rc::new(RefCell::new(String::new()));
//! let event_loop = Rc::new(EventLoop::new());
//! let engine = TypingEngine::new(
//!     &SnippetConfig::with_commands(["ls"]).looping(false),
//!     Box::new(Shared(shown.clone())),
//!     event_loop.clone(),
//! );
//! engine.start();
//! event_loop.run_for(Duration::from_secs(1), Duration::from_millis(100));
//! assert_eq!(*shown.borrow(), "ls");
//! ```

pub mod clipboard;
pub mod clock;
pub mod config;
pub mod copy;
pub mod engine;
pub mod host;
pub mod terminal;
pub mod visibility;
pub mod widget;

pub use clipboard::{ClipboardSink, ClipboardStrategy, CopyOutcome, ScratchCopy, SystemClipboard};
pub use clock::{EventLoop, Scheduler};
pub use config::SnippetConfig;
pub use copy::CopyController;
pub use engine::{Phase, TypingEngine, TypingSnapshot};
pub use visibility::VisibilityGate;
pub use widget::{Services, WidgetHandle, init};
