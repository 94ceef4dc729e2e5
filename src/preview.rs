//! Revocable preview handles.
//!
//! A handle is the terminal counterpart of a browser object URL: it stays
//! resolvable to the file it was created for until it is released, after
//! which lookups fail. The controller is the only owner, so every handle the
//! registry still knows about must belong to a current projection.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::trace;

use crate::models::SourceFile;

/// Opaque token issued by a [`PreviewHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PreviewHandle(u64);

impl PreviewHandle {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Allocation and release of preview resources. Implementations must accept a
/// release for every handle they issued exactly once.
pub trait PreviewHost {
    fn allocate(&mut self, file: &SourceFile) -> PreviewHandle;
    fn release(&mut self, handle: PreviewHandle);
}

/// In-process registry mapping live handles to the file they preview.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    next_id: u64,
    live: HashMap<PreviewHandle, PathBuf>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path behind a live handle; `None` once it has been released.
    pub fn resolve(&self, handle: PreviewHandle) -> Option<&Path> {
        self.live.get(&handle).map(PathBuf::as_path)
    }

    pub fn is_live(&self, handle: PreviewHandle) -> bool {
        self.live.contains_key(&handle)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Every handle not yet released, in allocation order.
    pub fn live_handles(&self) -> Vec<PreviewHandle> {
        let mut handles: Vec<_> = self.live.keys().copied().collect();
        handles.sort();
        handles
    }

    /// Show the previewed file in the system image viewer.
    pub fn open(&self, handle: PreviewHandle) -> Result<()> {
        let path = self
            .resolve(handle)
            .ok_or_else(|| anyhow!("Preview is no longer available."))?;
        open::that(path).with_context(|| format!("failed to open {}", path.display()))
    }
}

impl PreviewHost for PreviewRegistry {
    fn allocate(&mut self, file: &SourceFile) -> PreviewHandle {
        self.next_id += 1;
        let handle = PreviewHandle(self.next_id);
        self.live.insert(handle, file.path.clone());
        trace!(handle = handle.raw(), file = %file.name, "preview allocated");
        handle
    }

    fn release(&mut self, handle: PreviewHandle) {
        if self.live.remove(&handle).is_some() {
            trace!(handle = handle.raw(), "preview released");
        }
    }
}
