//! Sequential rename rule: `{base}{index}.{extension}`.

/// Extension used when a file name carries none.
pub const FALLBACK_EXTENSION: &str = "file";
/// Placeholder shown in the naming hint while the base name is blank.
const HINT_PLACEHOLDER: &str = "name";
/// Suffix appended to the trimmed base name for the archive file.
pub const ARCHIVE_SUFFIX: &str = "_photos.zip";

/// Text after the last `.`; [`FALLBACK_EXTENSION`] when there is no dot or
/// nothing follows it.
pub fn extension_of(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext,
        _ => FALLBACK_EXTENSION,
    }
}

/// Name for the file at 1-based `index`. A blank base leaves the original
/// name untouched.
pub fn derive_new_name(base_name: &str, index: usize, original_name: &str) -> String {
    let base = base_name.trim();
    if base.is_empty() {
        original_name.to_string()
    } else {
        format!("{base}{index}.{}", extension_of(original_name))
    }
}

/// `{trimmed base}_photos.zip`.
pub fn archive_file_name(base_name: &str) -> String {
    format!("{}{ARCHIVE_SUFFIX}", base_name.trim())
}

/// "name1, name2, ..." preview of the pattern, using the raw base name.
pub fn name_pattern_hint(base_name: &str) -> String {
    let stem = if base_name.is_empty() {
        HINT_PLACEHOLDER
    } else {
        base_name
    };
    format!("{stem}1, {stem}2, ...")
}
