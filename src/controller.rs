//! Intake and naming controller.
//!
//! Holds the accepted files and the base name, and rebuilds the projection
//! list after every mutation. The controller is the sole owner of preview
//! handles: after any public call returns, the handles the host still
//! considers live are exactly the ones referenced by `projections`.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, info, warn};

use crate::error::RenameError;
use crate::models::{FileIdentity, RenamedProjection, SourceFile};
use crate::naming::{derive_new_name, name_pattern_hint};
use crate::preview::{PreviewHandle, PreviewHost};

/// Default cap on accepted files.
pub const DEFAULT_MAX_FILES: usize = 15;

pub struct Controller<P: PreviewHost> {
    previews: P,
    max_files: usize,
    source_files: Vec<SourceFile>,
    base_name: String,
    projections: Vec<RenamedProjection>,
    last_error: Option<RenameError>,
}

impl<P: PreviewHost> Controller<P> {
    pub fn new(previews: P, max_files: usize) -> Self {
        Self {
            previews,
            max_files,
            source_files: Vec::new(),
            base_name: String::new(),
            projections: Vec::new(),
            last_error: None,
        }
    }

    /// Replace the accepted list with the image subset of `candidates`,
    /// truncated to the configured maximum.
    pub fn intake(&mut self, candidates: Vec<SourceFile>) {
        self.last_error = None;
        let offered = candidates.len();

        let mut images: Vec<SourceFile> =
            candidates.into_iter().filter(SourceFile::is_image).collect();
        if images.len() != offered {
            warn!(
                rejected = offered - images.len(),
                "non-image files left out of intake"
            );
            self.last_error = Some(RenameError::NonImageRejected);
        }

        if images.len() > self.max_files {
            warn!(
                offered = images.len(),
                max = self.max_files,
                "intake truncated to file limit"
            );
            images.truncate(self.max_files);
            self.last_error = Some(RenameError::TooManyFiles {
                max: self.max_files,
            });
        }

        info!(accepted = images.len(), "intake replaced file list");
        self.source_files = images;
        self.recompute();
    }

    /// Drop every file with identity `id`. Unknown ids are ignored.
    pub fn remove(&mut self, id: &FileIdentity) {
        let before = self.source_files.len();
        self.source_files.retain(|file| &file.identity() != id);
        if self.source_files.len() != before {
            debug!(%id, "file removed");
            self.recompute();
        }
    }

    /// Store the base name exactly as typed; trimming happens when names are
    /// derived.
    pub fn set_base_name(&mut self, name: impl Into<String>) {
        self.base_name = name.into();
        self.recompute();
    }

    /// Place an export outcome in the error slot.
    pub fn report(&mut self, error: RenameError) {
        self.last_error = Some(error);
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn projections(&self) -> &[RenamedProjection] {
        &self.projections
    }

    pub fn source_files(&self) -> &[SourceFile] {
        &self.source_files
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn last_error(&self) -> Option<&RenameError> {
        self.last_error.as_ref()
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    pub fn len(&self) -> usize {
        self.source_files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source_files.is_empty()
    }

    pub fn name_pattern_hint(&self) -> String {
        name_pattern_hint(&self.base_name)
    }

    pub fn previews(&self) -> &P {
        &self.previews
    }

    /// Rebuild projections from `(source_files, base_name)`, carrying preview
    /// handles over by identity and releasing the ones left behind.
    fn recompute(&mut self) {
        let previous = std::mem::take(&mut self.projections);

        // Queue per identity so duplicate identities each keep their own
        // handle instead of collapsing onto one.
        let mut reusable: HashMap<FileIdentity, VecDeque<PreviewHandle>> = HashMap::new();
        for projection in previous {
            reusable
                .entry(projection.id)
                .or_default()
                .push_back(projection.preview);
        }

        let mut projections = Vec::with_capacity(self.source_files.len());
        for (idx, file) in self.source_files.iter().enumerate() {
            let id = file.identity();
            let preview = match reusable.get_mut(&id).and_then(VecDeque::pop_front) {
                Some(handle) => handle,
                None => self.previews.allocate(file),
            };
            projections.push(RenamedProjection {
                new_name: derive_new_name(&self.base_name, idx + 1, &file.name),
                original_name: file.name.clone(),
                id,
                preview,
                source: file.clone(),
            });
        }

        for handle in reusable.into_values().flatten() {
            self.previews.release(handle);
        }

        self.projections = projections;
    }
}

impl<P: PreviewHost> Drop for Controller<P> {
    fn drop(&mut self) {
        for projection in self.projections.drain(..) {
            self.previews.release(projection.preview);
        }
    }
}
