use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can land in the session's single error slot. The display
/// text is what the user sees; sources are for the log only.
#[derive(Debug, Error)]
pub enum RenameError {
    #[error("Please add image files only.")]
    NonImageRejected,
    #[error("You can add at most {max} photos.")]
    TooManyFiles { max: usize },
    #[error("Please add files and enter a base name.")]
    MissingInputForExport,
    #[error("Could not create the ZIP archive. Please try again.")]
    ArchiveBuildFailure(#[source] ArchiveError),
}

impl RenameError {
    /// Advisories describe something intake already recovered from; the rest
    /// stopped the requested action.
    pub fn is_advisory(&self) -> bool {
        matches!(
            self,
            RenameError::NonImageRejected | RenameError::TooManyFiles { .. }
        )
    }
}

/// Underlying cause of an [`RenameError::ArchiveBuildFailure`].
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to build zip archive")]
    Zip(#[from] zip::result::ZipError),
    #[error("failed to save {}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("export worker stopped before reporting a result")]
    WorkerLost,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advisories_are_intake_errors_only() {
        assert!(RenameError::NonImageRejected.is_advisory());
        assert!(RenameError::TooManyFiles { max: 15 }.is_advisory());
        assert!(!RenameError::MissingInputForExport.is_advisory());
        assert!(!RenameError::ArchiveBuildFailure(ArchiveError::WorkerLost).is_advisory());
    }

    #[test]
    fn archive_failure_hides_cause_from_message() {
        let err = RenameError::ArchiveBuildFailure(ArchiveError::Read {
            path: PathBuf::from("/secret/a.png"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        });
        assert!(!err.to_string().contains("/secret"));
        assert_eq!(err.to_string(), "Could not create the ZIP archive. Please try again.");
    }

    #[test]
    fn too_many_files_names_the_limit() {
        assert_eq!(
            RenameError::TooManyFiles { max: 15 }.to_string(),
            "You can add at most 15 photos."
        );
    }
}
