//! Core library surface for the photo batch renamer.
//!
//! The naming, preview-lifecycle and export logic is usable without the
//! terminal front-end; `main.rs` only wires configuration, logging and the
//! Ratatui event loop around it.
pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod naming;
pub mod preview;
pub mod source;
pub mod ui;

/// The pieces most callers need: the controller and its preview host.
pub use controller::{Controller, DEFAULT_MAX_FILES};
pub use preview::{PreviewHandle, PreviewHost, PreviewRegistry};

/// Domain types passed between layers.
pub use error::{ArchiveError, RenameError};
pub use models::{FileIdentity, RenamedProjection, SourceFile};

/// Export entry points.
pub use export::{DownloadFolder, ExportJob, ExportOutcome, Exporter, SaveTarget};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
