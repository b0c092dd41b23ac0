//! Synchronous fallback copy through a temporary scratch element.

use super::ClipboardStrategy;
use anyhow::{Context as _, Result, bail};
use async_trait::async_trait;
use std::cell::RefCell;

/// Identifies a scratch element created by a [`ScratchSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScratchId(pub u64);

/// A surface that can hold off-screen, non-interactive text and copy the
/// current selection synchronously.
pub trait ScratchSurface {
    /// Create a scratch element holding `text`.
    fn insert(&mut self, text: &str) -> Result<ScratchId>;

    /// Select the whole content of the element.
    fn select(&mut self, id: ScratchId) -> Result<()>;

    /// Copy the current selection. `Ok(false)` means the command was refused.
    fn exec_copy(&mut self) -> Result<bool>;

    /// Remove the element. Called exactly once per successful `insert`.
    fn remove(&mut self, id: ScratchId);
}

/// Removes the scratch element when dropped, whichever way the copy ends.
struct ScratchGuard<'a, S: ScratchSurface> {
    surface: &'a mut S,
    id: ScratchId,
}

impl<S: ScratchSurface> Drop for ScratchGuard<'_, S> {
    fn drop(&mut self) {
        self.surface.remove(self.id);
    }
}

/// Copies by inserting, selecting and copying a scratch element.
pub struct ScratchCopy<S> {
    surface: RefCell<S>,
}

impl<S: ScratchSurface> ScratchCopy<S> {
    pub const NAME: &'static str = "scratch";

    pub fn new(surface: S) -> Self {
        ScratchCopy {
            surface: RefCell::new(surface),
        }
    }

    /// Run the copy synchronously.
    pub fn copy(&self, text: &str) -> Result<()> {
        let mut surface = self.surface.borrow_mut();
        let id = surface
            .insert(text)
            .context("Failed to create scratch element")?;
        let mut guard = ScratchGuard {
            surface: &mut *surface,
            id,
        };
        guard.surface.select(id).context("Failed to select scratch text")?;
        if !guard.surface.exec_copy().context("Copy command failed")? {
            bail!("Copy command was refused");
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl<S: ScratchSurface + 'static> ClipboardStrategy for ScratchCopy<S> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn write(&self, text: &str) -> Result<()> {
        self.copy(text)
    }
}
