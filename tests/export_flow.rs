use std::fs::{self, File};
use std::io::Read;

use photo_batch_renamer::source::candidates_from_paths;
use photo_batch_renamer::{
    Controller, DownloadFolder, Exporter, PreviewRegistry, RenameError, DEFAULT_MAX_FILES,
};
use tempfile::tempdir;
use zip::ZipArchive;

fn read_entry(archive: &mut ZipArchive<File>, idx: usize) -> (String, Vec<u8>) {
    let mut entry = archive.by_index(idx).expect("entry should exist");
    let mut content = Vec::new();
    entry.read_to_end(&mut content).expect("entry should read");
    (entry.name().to_string(), content)
}

#[test]
fn renamed_photos_end_up_in_named_archive() {
    let sources = tempdir().expect("failed to create temp dir");
    let downloads = tempdir().expect("failed to create temp dir");
    let a = sources.path().join("a.png");
    let b = sources.path().join("b.jpg");
    fs::write(&a, b"alpha png bytes").unwrap();
    fs::write(&b, b"bravo jpeg bytes").unwrap();

    let mut controller = Controller::new(PreviewRegistry::new(), DEFAULT_MAX_FILES);
    controller.intake(candidates_from_paths(&[a.clone(), b.clone()]).files);
    controller.set_base_name("Vic");

    let names: Vec<_> = controller
        .projections()
        .iter()
        .map(|p| p.new_name.as_str())
        .collect();
    assert_eq!(names, vec!["Vic1.png", "Vic2.jpg"]);

    let exporter = Exporter::new(DownloadFolder::new(downloads.path()));
    let outcome = exporter
        .export(controller.projections(), controller.base_name())
        .expect("inputs are valid")
        .wait()
        .expect("export should succeed");

    assert_eq!(outcome.saved_to, downloads.path().join("Vic_photos.zip"));
    assert_eq!(outcome.entries, 2);

    let mut archive = ZipArchive::new(File::open(&outcome.saved_to).unwrap()).unwrap();
    assert_eq!(archive.len(), 2);
    assert_eq!(
        read_entry(&mut archive, 0),
        ("Vic1.png".to_string(), fs::read(&a).unwrap())
    );
    assert_eq!(
        read_entry(&mut archive, 1),
        ("Vic2.jpg".to_string(), fs::read(&b).unwrap())
    );

    // Only the archive itself; the staging file is gone.
    assert_eq!(fs::read_dir(downloads.path()).unwrap().count(), 1);
}

#[test]
fn export_after_source_vanishes_saves_nothing() {
    let sources = tempdir().expect("failed to create temp dir");
    let downloads = tempdir().expect("failed to create temp dir");
    let a = sources.path().join("a.png");
    fs::write(&a, b"alpha").unwrap();

    let mut controller = Controller::new(PreviewRegistry::new(), DEFAULT_MAX_FILES);
    controller.intake(candidates_from_paths(&[a.clone()]).files);
    controller.set_base_name("Vic");
    fs::remove_file(&a).unwrap();

    let exporter = Exporter::new(DownloadFolder::new(downloads.path()));
    let result = exporter
        .export(controller.projections(), controller.base_name())
        .unwrap()
        .wait();

    let err = result.expect_err("missing source must fail the export");
    assert!(matches!(err, RenameError::ArchiveBuildFailure(_)));
    assert_eq!(fs::read_dir(downloads.path()).unwrap().count(), 0);
    // The session stays usable after the failure.
    assert_eq!(controller.len(), 1);
}

#[test]
fn directory_intake_respects_limit_and_type_filter() {
    let sources = tempdir().expect("failed to create temp dir");
    for i in 1..=20 {
        fs::write(sources.path().join(format!("img{i:02}.png")), b"x").unwrap();
    }
    fs::write(sources.path().join("readme.txt"), b"text").unwrap();

    let mut controller = Controller::new(PreviewRegistry::new(), DEFAULT_MAX_FILES);
    controller.intake(candidates_from_paths(&[sources.path().to_path_buf()]).files);

    assert_eq!(controller.len(), 15);
    assert_eq!(controller.source_files()[0].name, "img01.png");
    assert_eq!(controller.source_files()[14].name, "img15.png");
    assert!(matches!(
        controller.last_error(),
        Some(RenameError::TooManyFiles { max: 15 })
    ));
    assert_eq!(controller.previews().live_count(), 15);
}

#[test]
fn base_name_with_separator_saves_inside_download_folder() {
    let sources = tempdir().expect("failed to create temp dir");
    let downloads = tempdir().expect("failed to create temp dir");
    let a = sources.path().join("a.png");
    fs::write(&a, b"alpha").unwrap();

    let mut controller = Controller::new(PreviewRegistry::new(), DEFAULT_MAX_FILES);
    controller.intake(candidates_from_paths(&[a]).files);
    controller.set_base_name("Trip/Day");

    let exporter = Exporter::new(DownloadFolder::new(downloads.path()));
    let outcome = exporter
        .export(controller.projections(), controller.base_name())
        .unwrap()
        .wait()
        .expect("separator in base name must not fail the export");

    assert_eq!(outcome.saved_to, downloads.path().join("Trip_Day_photos.zip"));
}
