//! Domain models that flow between the controller, the exporter and the TUI.
//! These stay light-weight data holders; the naming rules live in
//! `naming`, the handle bookkeeping in `controller`.

use std::fmt;
use std::path::PathBuf;

use crate::preview::PreviewHandle;

/// Content-type prefix shared by every image MIME type.
const IMAGE_TYPE_PREFIX: &str = "image/";

#[derive(Debug, Clone, PartialEq, Eq)]
/// A user-selected file on disk. The bytes are never cached here; the exporter
/// reads them from `path` when the archive is built.
pub struct SourceFile {
    /// Location the content is read from.
    pub path: PathBuf,
    /// Display name, normally the final path component.
    pub name: String,
    /// Modification time in milliseconds since the Unix epoch.
    pub last_modified_ms: u64,
    /// MIME type such as `image/png`, when one could be determined.
    pub content_type: Option<String>,
}

impl SourceFile {
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        last_modified_ms: u64,
        content_type: Option<String>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            last_modified_ms,
            content_type,
        }
    }

    /// Key used to correlate this file across recomputations.
    pub fn identity(&self) -> FileIdentity {
        FileIdentity(format!("{}-{}", self.name, self.last_modified_ms))
    }

    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|kind| kind.starts_with(IMAGE_TYPE_PREFIX))
            .unwrap_or(false)
    }
}

/// `name-lastModified` key. Two files with the same name and timestamp share
/// an identity; nothing deduplicates them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileIdentity(String);

impl FileIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The derived `original -> new` record for one accepted file.
pub struct RenamedProjection {
    pub id: FileIdentity,
    pub original_name: String,
    pub new_name: String,
    /// Owned by the controller. Copies handed out are only valid until the
    /// next recomputation that drops this projection.
    pub preview: PreviewHandle,
    pub source: SourceFile,
}

impl RenamedProjection {
    /// `a.png -> Vic1.png`, or just the name when nothing changes.
    pub fn display_rename(&self) -> String {
        if self.original_name == self.new_name {
            self.original_name.clone()
        } else {
            format!("{} -> {}", self.original_name, self.new_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_joins_name_and_timestamp() {
        let file = SourceFile::new("/tmp/a.png", "a.png", 1_700_000_000_123, None);
        assert_eq!(file.identity().as_str(), "a.png-1700000000123");
    }

    #[test]
    fn only_image_content_types_count_as_images() {
        let png = SourceFile::new("a.png", "a.png", 1, Some("image/png".into()));
        let pdf = SourceFile::new("a.pdf", "a.pdf", 1, Some("application/pdf".into()));
        let unknown = SourceFile::new("a", "a", 1, None);

        assert!(png.is_image());
        assert!(!pdf.is_image());
        assert!(!unknown.is_image());
    }
}
