//! The platform clipboard, through `arboard`.

use super::ClipboardStrategy;
use anyhow::{Context as _, Result};
use async_trait::async_trait;

/// Writes to the system clipboard on tokio's blocking pool.
///
/// Requires a running tokio runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub const NAME: &'static str = "system";
}

#[async_trait(?Send)]
impl ClipboardStrategy for SystemClipboard {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn write(&self, text: &str) -> Result<()> {
        let text = text.to_owned();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut clipboard = arboard::Clipboard::new().context("Clipboard unavailable")?;
            clipboard
                .set_text(text)
                .context("Failed to set clipboard text")?;
            Ok(())
        })
        .await
        .context("Clipboard task panicked")?
    }
}
