//! Turning filesystem paths into intake candidates.
//!
//! Paths reach the program three ways: the add-files form, a paste or
//! terminal drag-and-drop, and command-line arguments. All of them end up in
//! [`candidates_from_paths`], whose output goes straight to
//! `Controller::intake`.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use anyhow::{anyhow, Context, Result};
use image::ImageFormat;
use percent_encoding::percent_decode_str;
use tracing::{debug, warn};

use crate::models::SourceFile;

/// Bytes inspected when the extension does not identify an image.
const SNIFF_LEN: usize = 32;
const FILE_URI_PREFIX: &str = "file://";

/// Build a [`SourceFile`] from metadata on disk.
pub fn source_file_from_path(path: &Path) -> Result<SourceFile> {
    let metadata =
        fs::metadata(path).with_context(|| format!("cannot read {}", path.display()))?;
    if !metadata.is_file() {
        return Err(anyhow!("{} is not a file", path.display()));
    }

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("{} has no file name", path.display()))?;

    let last_modified_ms = metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0);

    Ok(SourceFile::new(
        path,
        name,
        last_modified_ms,
        classify_content_type(path),
    ))
}

/// MIME type from the extension, falling back to the file's magic bytes.
pub fn classify_content_type(path: &Path) -> Option<String> {
    if let Ok(format) = ImageFormat::from_path(path) {
        return Some(format.to_mime_type().to_string());
    }
    sniff_content_type(path)
}

fn sniff_content_type(path: &Path) -> Option<String> {
    let mut header = [0u8; SNIFF_LEN];
    let mut file = File::open(path).ok()?;
    let read = file.read(&mut header).ok()?;
    image::guess_format(&header[..read])
        .ok()
        .map(|format| format.to_mime_type().to_string())
}

/// Result of expanding user-supplied paths.
#[derive(Debug, Default)]
pub struct Candidates {
    pub files: Vec<SourceFile>,
    /// Paths that could not be read; they are left out of `files`.
    pub skipped: Vec<PathBuf>,
}

/// Expand every path into candidates, preserving the order given. A directory
/// contributes its visible files sorted by name; nested directories are not
/// descended into. Unreadable paths are skipped and listed, the rest still
/// go through.
pub fn candidates_from_paths(paths: &[PathBuf]) -> Candidates {
    let mut candidates = Candidates::default();
    for path in paths {
        if path.is_dir() {
            let listing = match fs::read_dir(path) {
                Ok(listing) => listing,
                Err(err) => {
                    warn!(dir = %path.display(), error = %err, "cannot list directory, skipping");
                    candidates.skipped.push(path.clone());
                    continue;
                }
            };
            let mut entries: Vec<PathBuf> = listing
                .filter_map(|entry| entry.ok().map(|entry| entry.path()))
                .filter(|entry| entry.is_file() && !is_hidden(entry))
                .collect();
            entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
            debug!(dir = %path.display(), files = entries.len(), "expanded directory");
            for entry in entries {
                candidates.push(&entry);
            }
        } else {
            candidates.push(path);
        }
    }
    candidates
}

impl Candidates {
    fn push(&mut self, path: &Path) {
        match source_file_from_path(path) {
            Ok(file) => self.files.push(file),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "cannot read path, skipping");
                self.skipped.push(path.to_path_buf());
            }
        }
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// Split pasted text into paths. Terminals deliver dropped files as
/// shell-quoted or backslash-escaped paths separated by whitespace, some as
/// `file://` URIs.
pub fn parse_dropped_paths(text: &str) -> Vec<PathBuf> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some('"') if ch == '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            Some(_) => current.push(ch),
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    in_token = true;
                }
                '\\' => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                    in_token = true;
                }
                ch if ch.is_whitespace() => {
                    if in_token {
                        tokens.push(std::mem::take(&mut current));
                        in_token = false;
                    }
                }
                ch => {
                    current.push(ch);
                    in_token = true;
                }
            },
        }
    }
    if in_token {
        tokens.push(current);
    }

    tokens
        .into_iter()
        .filter(|token| !token.is_empty())
        .map(|token| match token.strip_prefix(FILE_URI_PREFIX) {
            Some(rest) => PathBuf::from(percent_decode_str(rest).decode_utf8_lossy().into_owned()),
            None => PathBuf::from(token),
        })
        .collect()
}
