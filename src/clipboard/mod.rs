//! Best-effort clipboard writes over an ordered chain of strategies.
//!
//! A [`ClipboardSink`] asks each [`ClipboardStrategy`] in turn and stops at
//! the first one that succeeds. Failures are logged and reported as a
//! [`CopyOutcome`]; nothing past the sink ever sees an error.

mod scratch;
mod system;

pub use scratch::{ScratchCopy, ScratchId, ScratchSurface};
pub use system::SystemClipboard;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{error, warn};

/// One way of putting text on the clipboard.
#[async_trait(?Send)]
pub trait ClipboardStrategy: 'static {
    /// Short name used in logs and in [`CopyOutcome::Copied`].
    fn name(&self) -> &'static str;

    /// Write `text` to the clipboard.
    async fn write(&self, text: &str) -> Result<()>;
}

/// Result of a [`ClipboardSink::write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Written by the named strategy.
    Copied { via: &'static str },
    /// Every strategy failed, or none is installed.
    Failed,
}

impl CopyOutcome {
    pub fn is_copied(&self) -> bool {
        matches!(self, CopyOutcome::Copied { .. })
    }
}

/// Ordered fallback chain of clipboard strategies.
#[derive(Default)]
pub struct ClipboardSink {
    strategies: Vec<Box<dyn ClipboardStrategy>>,
}

impl ClipboardSink {
    /// An empty chain. Every write fails until a strategy is added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy, tried after every strategy already in the chain.
    pub fn with_strategy(mut self, strategy: impl ClipboardStrategy) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Whether `name` is the first strategy in the chain.
    pub fn is_primary(&self, name: &str) -> bool {
        self.strategies.first().is_some_and(|s| s.name() == name)
    }

    /// Try each strategy in order until one succeeds.
    pub async fn write(&self, text: &str) -> CopyOutcome {
        let last = self.strategies.len().saturating_sub(1);
        for (idx, strategy) in self.strategies.iter().enumerate() {
            match strategy.write(text).await {
                Ok(()) => return CopyOutcome::Copied { via: strategy.name() },
                Err(err) if idx < last => {
                    warn!(strategy = strategy.name(), "clipboard write failed, trying fallback: {err:#}");
                }
                Err(err) => {
                    error!(strategy = strategy.name(), "clipboard write failed: {err:#}");
                }
            }
        }
        if self.strategies.is_empty() {
            error!("no clipboard strategy installed");
        }
        CopyOutcome::Failed
    }
}
