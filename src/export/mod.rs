//! Archive exporter.
//!
//! `export` validates its inputs on the caller's thread, snapshots the
//! projections, and builds and saves the ZIP on a worker thread. The worker
//! sees entry names and source paths only; preview handles never leave the
//! controller. There is no queue: the UI refuses a second export while an
//! [`ExportJob`] is still pending.

mod archive;
mod save;

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use tracing::{debug, error, info};

use crate::error::{ArchiveError, RenameError};
use crate::models::RenamedProjection;
use crate::naming::archive_file_name;

pub use archive::ZipBundle;
pub use save::{DownloadFolder, SaveTarget};

/// One archive entry captured at export time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportEntry {
    pub entry_name: String,
    pub source: PathBuf,
}

/// Validated snapshot of everything the worker needs.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    entries: Vec<ExportEntry>,
    archive_name: String,
}

impl ExportRequest {
    /// Fails with [`RenameError::MissingInputForExport`] when there is
    /// nothing to bundle or the base name is blank.
    pub fn prepare(
        projections: &[RenamedProjection],
        archive_base_name: &str,
    ) -> Result<Self, RenameError> {
        if projections.is_empty() || archive_base_name.trim().is_empty() {
            return Err(RenameError::MissingInputForExport);
        }

        let entries = projections
            .iter()
            .map(|projection| ExportEntry {
                entry_name: projection.new_name.clone(),
                source: projection.source.path.clone(),
            })
            .collect();

        Ok(Self {
            entries,
            archive_name: archive_file_name(archive_base_name),
        })
    }

    pub fn entries(&self) -> &[ExportEntry] {
        &self.entries
    }

    pub fn archive_name(&self) -> &str {
        &self.archive_name
    }
}

/// What a finished export produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub saved_to: PathBuf,
    pub entries: usize,
}

/// Build the bundle for `request` in memory.
pub fn build_archive(request: &ExportRequest) -> Result<Vec<u8>, ArchiveError> {
    let mut bundle = ZipBundle::new();
    for entry in request.entries() {
        bundle.add_file(&entry.entry_name, &entry.source)?;
    }
    debug!(archive = request.archive_name(), entries = bundle.len(), "archive assembled");
    bundle.finish()
}

/// Build and save on the current thread.
pub fn run_export<S: SaveTarget + ?Sized>(
    request: &ExportRequest,
    target: &S,
) -> Result<ExportOutcome, RenameError> {
    let result = build_archive(request)
        .and_then(|bytes| target.save(request.archive_name(), &bytes));

    match result {
        Ok(saved_to) => {
            info!(
                archive = request.archive_name(),
                entries = request.entries().len(),
                path = %saved_to.display(),
                "export finished"
            );
            Ok(ExportOutcome {
                saved_to,
                entries: request.entries().len(),
            })
        }
        Err(cause) => {
            error!(archive = request.archive_name(), error = ?cause, "export failed");
            Err(RenameError::ArchiveBuildFailure(cause))
        }
    }
}

/// Handle to an export running on a worker thread.
pub struct ExportJob {
    archive_name: String,
    receiver: Receiver<Result<ExportOutcome, RenameError>>,
}

impl ExportJob {
    pub fn archive_name(&self) -> &str {
        &self.archive_name
    }

    /// Non-blocking check, suitable for an event-loop tick.
    pub fn poll(&self) -> Option<Result<ExportOutcome, RenameError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(worker_lost())),
        }
    }

    /// Block until the worker reports back.
    pub fn wait(self) -> Result<ExportOutcome, RenameError> {
        self.receiver.recv().unwrap_or_else(|_| Err(worker_lost()))
    }
}

fn worker_lost() -> RenameError {
    error!("export worker exited without a result");
    RenameError::ArchiveBuildFailure(ArchiveError::WorkerLost)
}

/// Runs exports against a shared save target.
pub struct Exporter<S: SaveTarget + 'static> {
    target: Arc<S>,
}

impl<S: SaveTarget + 'static> Exporter<S> {
    pub fn new(target: S) -> Self {
        Self {
            target: Arc::new(target),
        }
    }

    pub fn target(&self) -> &S {
        &self.target
    }

    /// Validate synchronously, then bundle and save in the background.
    pub fn export(
        &self,
        projections: &[RenamedProjection],
        archive_base_name: &str,
    ) -> Result<ExportJob, RenameError> {
        let request = ExportRequest::prepare(projections, archive_base_name)?;
        let archive_name = request.archive_name().to_string();
        let target = Arc::clone(&self.target);
        let (sender, receiver) = mpsc::channel();

        info!(
            archive = %archive_name,
            entries = request.entries().len(),
            "export started"
        );
        thread::spawn(move || {
            let result = run_export(&request, &*target);
            // The receiver is gone only when the session ended mid-export.
            let _ = sender.send(result);
        });

        Ok(ExportJob {
            archive_name,
            receiver,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Mutex;

    use tempfile::tempdir;

    use super::*;
    use crate::models::SourceFile;
    use crate::preview::{PreviewHandle, PreviewHost, PreviewRegistry};

    /// Save target that remembers calls instead of touching disk.
    #[derive(Default)]
    struct RecordingTarget {
        saves: Mutex<Vec<(String, usize)>>,
    }

    impl SaveTarget for RecordingTarget {
        fn save(&self, file_name: &str, bundle: &[u8]) -> Result<PathBuf, ArchiveError> {
            self.saves
                .lock()
                .unwrap()
                .push((file_name.to_string(), bundle.len()));
            Ok(PathBuf::from(file_name))
        }
    }

    fn projection(path: PathBuf, new_name: &str, preview: PreviewHandle) -> RenamedProjection {
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        let source = SourceFile::new(path, name.clone(), 1, Some("image/png".into()));
        RenamedProjection {
            id: source.identity(),
            original_name: name,
            new_name: new_name.to_string(),
            preview,
            source,
        }
    }

    fn handle() -> PreviewHandle {
        let mut registry = PreviewRegistry::new();
        registry.allocate(&SourceFile::new("x", "x", 0, None))
    }

    #[test]
    fn empty_projection_list_is_rejected_before_work() {
        let exporter = Exporter::new(RecordingTarget::default());
        let result = exporter.export(&[], "Vic");

        assert!(matches!(result, Err(RenameError::MissingInputForExport)));
        assert!(exporter.target().saves.lock().unwrap().is_empty());
    }

    #[test]
    fn blank_base_name_is_rejected_before_work() {
        let dir = tempdir().expect("failed to create temp dir");
        let path = dir.path().join("a.png");
        fs::write(&path, b"a").unwrap();
        let projections = vec![projection(path, "a.png", handle())];

        let exporter = Exporter::new(RecordingTarget::default());
        assert!(matches!(
            exporter.export(&projections, "   "),
            Err(RenameError::MissingInputForExport)
        ));
        assert!(matches!(
            exporter.export(&projections, ""),
            Err(RenameError::MissingInputForExport)
        ));
        assert!(exporter.target().saves.lock().unwrap().is_empty());
    }

    #[test]
    fn request_snapshots_names_and_paths() {
        let projections = vec![
            projection(PathBuf::from("/p/a.png"), "Vic1.png", handle()),
            projection(PathBuf::from("/p/b.jpg"), "Vic2.jpg", handle()),
        ];
        let request = ExportRequest::prepare(&projections, " Vic ").unwrap();

        assert_eq!(request.archive_name(), "Vic_photos.zip");
        assert_eq!(
            request.entries(),
            &[
                ExportEntry {
                    entry_name: "Vic1.png".into(),
                    source: PathBuf::from("/p/a.png"),
                },
                ExportEntry {
                    entry_name: "Vic2.jpg".into(),
                    source: PathBuf::from("/p/b.jpg"),
                },
            ]
        );
    }

    #[test]
    fn background_job_saves_once() {
        let dir = tempdir().expect("failed to create temp dir");
        let path = dir.path().join("a.png");
        fs::write(&path, b"pixels").unwrap();
        let projections = vec![projection(path, "Vic1.png", handle())];

        let exporter = Exporter::new(RecordingTarget::default());
        let job = exporter.export(&projections, "Vic").expect("valid input");
        assert_eq!(job.archive_name(), "Vic_photos.zip");
        let outcome = job.wait().expect("export should succeed");

        assert_eq!(outcome.entries, 1);
        let saves = exporter.target().saves.lock().unwrap();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].0, "Vic_photos.zip");
    }

    #[test]
    fn unreadable_source_fails_without_saving() {
        let dir = tempdir().expect("failed to create temp dir");
        let present = dir.path().join("a.png");
        fs::write(&present, b"a").unwrap();
        let projections = vec![
            projection(present, "Vic1.png", handle()),
            projection(dir.path().join("vanished.png"), "Vic2.png", handle()),
        ];

        let exporter = Exporter::new(RecordingTarget::default());
        let result = exporter.export(&projections, "Vic").unwrap().wait();

        assert!(matches!(
            result,
            Err(RenameError::ArchiveBuildFailure(ArchiveError::Read { .. }))
        ));
        assert!(exporter.target().saves.lock().unwrap().is_empty());
    }

    #[test]
    fn poll_reports_result_once_worker_is_done() {
        let dir = tempdir().expect("failed to create temp dir");
        let path = dir.path().join("a.png");
        fs::write(&path, b"a").unwrap();
        let projections = vec![projection(path, "Vic1.png", handle())];

        let exporter = Exporter::new(RecordingTarget::default());
        let job = exporter.export(&projections, "Vic").unwrap();
        let result = loop {
            if let Some(result) = job.poll() {
                break result;
            }
            thread::sleep(std::time::Duration::from_millis(5));
        };
        assert!(result.is_ok());
    }
}
