//! Integration tests for filearc-core.
//!
//! These tests run the public API end to end against real files.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use filearc_core::ArchiveError;
use filearc_core::ArchiveReader;
use filearc_core::CompressOptions;
use filearc_core::CompressionKind;
use filearc_core::ContainerFormat;
use filearc_core::ExtractOptions;
use filearc_core::compress_archive;
use filearc_core::extract_archive;
use filearc_core::list_archive;
use filearc_core::test_utils::TarTestBuilder;
use filearc_core::test_utils::create_fixture_tree;
use filearc_core::test_utils::list_tree;
use filearc_core::test_utils::write_archive;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

const TREE: [&str; 6] = ["a.txt", "b.txt", "c", "c/c1.txt", "c/c2.txt", "d"];

fn names(archive: &Path) -> Vec<String> {
    list_archive(archive)
        .unwrap()
        .into_iter()
        .map(|entry| entry.name)
        .collect()
}

fn assert_same_tree(expected: &Path, actual: &Path) {
    let paths = list_tree(expected);
    assert_eq!(paths, list_tree(actual));

    for path in paths {
        let (left, right) = (expected.join(&path), actual.join(&path));
        if left.is_file() {
            assert_eq!(fs::read(&left).unwrap(), fs::read(&right).unwrap(), "{path}");
        }
    }
}

fn round_trip(archive_name: &str) {
    let temp = TempDir::new().unwrap();
    let input = create_fixture_tree(temp.path());
    let archive = temp.path().join(archive_name);
    let out = temp.path().join("out");

    let created = compress_archive(&archive, &input, &CompressOptions::default()).unwrap();
    assert_eq!(created.files_added, 4);
    assert_eq!(created.directories_added, 2);

    let extracted = extract_archive(&archive, &out, &ExtractOptions::default()).unwrap();
    assert_eq!(extracted.files_extracted, 4);
    assert_eq!(extracted.bytes_written, created.bytes_written);

    assert_same_tree(&input, &out);
}

#[test]
fn test_round_trip_tar() {
    round_trip("out.tar");
}

#[test]
fn test_round_trip_tar_gz() {
    round_trip("out.tar.gz");
}

#[test]
fn test_round_trip_zip() {
    round_trip("out.zip");
}

#[test]
fn test_list_without_source_dir() {
    let temp = TempDir::new().unwrap();
    let input = create_fixture_tree(temp.path());
    let archive = temp.path().join("out.tar");

    compress_archive(&archive, &input, &CompressOptions::default()).unwrap();
    assert_eq!(names(&archive), TREE);
}

#[test]
fn test_list_with_source_dir() {
    let temp = TempDir::new().unwrap();
    let input = create_fixture_tree(temp.path());
    let archive = temp.path().join("out.zip");

    let options = CompressOptions::default().with_include_source_dir(true);
    compress_archive(&archive, &input, &options).unwrap();

    assert_eq!(
        names(&archive),
        [
            "input",
            "input/a.txt",
            "input/b.txt",
            "input/c",
            "input/c/c1.txt",
            "input/c/c2.txt",
            "input/d"
        ]
    );
}

#[test]
fn test_list_twice_is_identical() {
    let temp = TempDir::new().unwrap();
    let input = create_fixture_tree(temp.path());
    let archive = temp.path().join("out.tgz");
    compress_archive(&archive, &input, &CompressOptions::default()).unwrap();

    let mut reader = ArchiveReader::open(&archive).unwrap();
    let first = reader.list().unwrap();
    let second = reader.list().unwrap();
    reader.close().unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_create_with_filters() {
    let temp = TempDir::new().unwrap();
    let input = create_fixture_tree(temp.path());
    let archive = temp.path().join("out.tar");

    let options =
        CompressOptions::default().with_filters(vec!["a.txt".into(), "c/c2.txt".into()]);
    compress_archive(&archive, &input, &options).unwrap();

    assert_eq!(names(&archive), ["a.txt", "c", "c/c2.txt"]);
}

#[test]
fn test_extract_with_filters() {
    let temp = TempDir::new().unwrap();
    let input = create_fixture_tree(temp.path());
    let archive = temp.path().join("out.tar.gz");
    let out = temp.path().join("out");
    compress_archive(&archive, &input, &CompressOptions::default()).unwrap();

    let options = ExtractOptions::default().with_filters(vec!["a.txt".into(), "c/c2.txt".into()]);
    extract_archive(&archive, &out, &options).unwrap();

    assert_eq!(list_tree(&out), ["a.txt", "c", "c/c2.txt"]);
}

#[test]
fn test_extract_unmatched_prefix() {
    let temp = TempDir::new().unwrap();
    let input = create_fixture_tree(temp.path());
    let archive = temp.path().join("out.tar");
    compress_archive(&archive, &input, &CompressOptions::default()).unwrap();

    let options = ExtractOptions::default().with_match_prefix("nowhere");
    let err = extract_archive(&archive, temp.path().join("out"), &options).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_no_override_never_modifies_existing_files() {
    let temp = TempDir::new().unwrap();
    let input = create_fixture_tree(temp.path());
    let archive = temp.path().join("out.zip");
    let out = temp.path().join("out");
    compress_archive(&archive, &input, &CompressOptions::default()).unwrap();

    fs::create_dir_all(out.join("c")).unwrap();
    fs::write(out.join("a.txt"), "local a").unwrap();
    fs::write(out.join("c/c1.txt"), "local c1").unwrap();

    let options = ExtractOptions::default().with_no_override(true);
    let report = extract_archive(&archive, &out, &options).unwrap();

    assert_eq!(report.files_skipped, 2);
    assert_eq!(fs::read_to_string(out.join("a.txt")).unwrap(), "local a");
    assert_eq!(fs::read_to_string(out.join("c/c1.txt")).unwrap(), "local c1");
    assert_eq!(fs::read_to_string(out.join("b.txt")).unwrap(), "b.txt");
}

#[test]
fn test_flat_extraction_has_no_directories() {
    let temp = TempDir::new().unwrap();
    let input = create_fixture_tree(temp.path());
    let archive = temp.path().join("out.tar");
    let out = temp.path().join("out");
    compress_archive(&archive, &input, &CompressOptions::default()).unwrap();

    let options = ExtractOptions::default().with_flat_dir(true);
    let report = extract_archive(&archive, &out, &options).unwrap();

    assert_eq!(report.directories_created, 0);
    assert_eq!(list_tree(&out), ["a.txt", "b.txt", "c1.txt", "c2.txt"]);
    assert!(fs::read_dir(&out).unwrap().all(|e| e.unwrap().path().is_file()));
}

#[test]
fn test_append_to_tar() {
    let temp = TempDir::new().unwrap();
    let input = create_fixture_tree(temp.path());
    let archive = temp.path().join("out.tar");

    compress_archive(&archive, input.join("a.txt"), &CompressOptions::default()).unwrap();
    let options = CompressOptions::default().with_append(true);
    compress_archive(&archive, input.join("b.txt"), &options).unwrap();

    assert_eq!(names(&archive), ["a.txt", "b.txt"]);
}

#[test]
fn test_append_refused_on_compressed_and_zip() {
    let temp = TempDir::new().unwrap();
    let input = create_fixture_tree(temp.path());
    let options = CompressOptions::default().with_append(true);

    for name in ["out.tar.gz", "out.zip"] {
        let archive = temp.path().join(name);
        compress_archive(&archive, &input, &CompressOptions::default()).unwrap();
        let before = fs::read(&archive).unwrap();

        let err = compress_archive(&archive, input.join("a.txt"), &options).unwrap_err();
        assert!(
            matches!(err, ArchiveError::AppendNotSupported { .. }),
            "{name}: {err}"
        );
        assert_eq!(fs::read(&archive).unwrap(), before, "{name} was modified");
    }
}

#[test]
fn test_bzip2_write_refused() {
    let temp = TempDir::new().unwrap();
    let input = create_fixture_tree(temp.path());
    let archive = temp.path().join("out.tar");

    let options = CompressOptions::default().with_compression(CompressionKind::Bzip2);
    let err = compress_archive(&archive, &input, &options).unwrap_err();

    assert!(matches!(err, ArchiveError::Bzip2WriteNotSupported));
    assert!(!archive.exists());
}

#[test]
fn test_bzip2_read() {
    let temp = TempDir::new().unwrap();
    let tar = TarTestBuilder::new()
        .add_directory("docs/")
        .add_file("docs/notes.txt", b"bzip2 notes")
        .build();

    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
    encoder.write_all(&tar).unwrap();
    let archive = write_archive(temp.path(), "out.tbz", &encoder.finish().unwrap());

    let reader = ArchiveReader::open(&archive).unwrap();
    assert_eq!(reader.compression(), CompressionKind::Bzip2);
    assert_eq!(reader.format(), ContainerFormat::Tar);

    let out = temp.path().join("out");
    extract_archive(&archive, &out, &ExtractOptions::default()).unwrap();
    assert_eq!(
        fs::read_to_string(out.join("docs/notes.txt")).unwrap(),
        "bzip2 notes"
    );
}

#[test]
fn test_traversal_names_stay_inside_target() {
    let temp = TempDir::new().unwrap();
    let tar = TarTestBuilder::new()
        .add_file_raw_name("../x", b"outside")
        .add_file("inside.txt", b"inside")
        .build();
    let archive = write_archive(temp.path(), "evil.tar", &tar);
    let out = temp.path().join("nested/out");

    let report = extract_archive(&archive, &out, &ExtractOptions::default()).unwrap();

    assert!(report.has_warnings());
    assert!(!temp.path().join("nested/x").exists());
    assert_eq!(list_tree(&out), ["inside.txt"]);
}

#[cfg(unix)]
#[test]
fn test_symlinks_round_trip() {
    let temp = TempDir::new().unwrap();
    let input = create_fixture_tree(temp.path());
    std::os::unix::fs::symlink("c/c1.txt", input.join("link")).unwrap();

    for name in ["out.tar", "out.zip"] {
        let archive = temp.path().join(name);
        let out = temp.path().join(format!("out-{name}"));

        let created = compress_archive(&archive, &input, &CompressOptions::default()).unwrap();
        assert_eq!(created.symlinks_added, 1);

        let report = extract_archive(&archive, &out, &ExtractOptions::default()).unwrap();
        assert_eq!(report.symlinks_created, 1);
        assert_eq!(
            fs::read_link(out.join("link")).unwrap(),
            Path::new("c/c1.txt")
        );
        assert_eq!(fs::read_to_string(out.join("link")).unwrap(), "c1.txt");
    }
}

#[cfg(unix)]
#[test]
fn test_permissions_round_trip() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let input = create_fixture_tree(temp.path());
    fs::set_permissions(input.join("a.txt"), fs::Permissions::from_mode(0o750)).unwrap();

    for name in ["out.tar.gz", "out.zip"] {
        let archive = temp.path().join(name);
        let out = temp.path().join(format!("out-{name}"));
        compress_archive(&archive, &input, &CompressOptions::default()).unwrap();
        extract_archive(&archive, &out, &ExtractOptions::default()).unwrap();

        let mode = fs::metadata(out.join("a.txt")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o750, "{name}");
    }
}
