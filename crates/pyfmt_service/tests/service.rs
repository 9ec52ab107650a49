//! Service-level tests over real (temporary) files: the per-file pipeline,
//! ignore-based discovery, diff mode, and the parallel runner.

use std::fs;
use std::path::PathBuf;

use pyfmt_service::{
    discover_files, format_file, format_files, FormatOptions, Style, IGNORE_FILE_NAME,
};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn in_place_rewrites_only_changed_files() {
    let dir = TempDir::new().unwrap();
    let messy = write(&dir, "messy.py", "x  =  1\n");
    let clean = write(&dir, "clean.py", "x = 1\n");

    let mut options = FormatOptions::new(Style::default());
    options.in_place = true;

    let report = format_file(&messy, &options);
    assert!(report.changed);
    assert_eq!(fs::read_to_string(&messy).unwrap(), "x = 1\n");

    let report = format_file(&clean, &options);
    assert!(!report.changed);
    assert_eq!(fs::read_to_string(&clean).unwrap(), "x = 1\n");
}

#[test]
fn diff_mode_reports_without_writing() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "module.py", "x  =  1\n");

    let mut options = FormatOptions::new(Style::default());
    options.print_diff = true;

    let report = format_file(&path, &options);
    assert!(report.changed);
    let diff = report.diff.expect("diff requested");
    assert!(diff.contains("-x  =  1"));
    assert!(diff.contains("+x = 1"));
    // The file on disk is untouched.
    assert_eq!(fs::read_to_string(&path).unwrap(), "x  =  1\n");
}

#[test]
fn parse_errors_are_reported_not_fatal() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "broken.py", "x = (1\n");

    let report = format_file(&path, &FormatOptions::new(Style::default()));
    assert!(!report.changed);
    let error = report.error.expect("parse failure surfaces in the report");
    assert!(error.contains("never closed"));
}

#[test]
fn invalid_utf8_is_an_encoding_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("latin1.py");
    fs::write(&path, b"x = '\xe9'\n").unwrap();

    let report = format_file(&path, &FormatOptions::new(Style::default()));
    let error = report.error.expect("encoding failure surfaces in the report");
    assert!(error.contains("not valid UTF-8"));
}

#[test]
fn bom_is_preserved() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "bom.py", "\u{feff}x  =  1\n");

    let report = format_file(&path, &FormatOptions::new(Style::default()));
    assert!(report.changed);
    assert_eq!(report.formatted.unwrap(), "\u{feff}x = 1\n");
}

#[test]
fn discovery_honors_ignore_file() {
    let dir = TempDir::new().unwrap();
    write(&dir, "keep.py", "x = 1\n");
    write(&dir, "generated/skip.py", "x = 1\n");
    write(&dir, "notes.txt", "not source\n");
    write(&dir, IGNORE_FILE_NAME, "generated/\n");

    let found = discover_files([dir.path().to_path_buf()]);
    let names: Vec<String> = found
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["keep.py"]);
}

#[test]
fn reports_serialize_to_json() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "messy.py", "x  =  1\n");

    let mut options = FormatOptions::new(Style::default());
    options.print_diff = true;
    let report = format_file(&path, &options);

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"changed\":true"));
    assert!(json.contains("messy.py"));
    assert!(json.contains("\"diff\""));
    // Absent fields stay out of the serialized report entirely.
    assert!(!json.contains("\"error\""));
}

#[test]
fn runner_preserves_input_order() {
    let dir = TempDir::new().unwrap();
    let paths: Vec<PathBuf> = (0..12)
        .map(|index| write(&dir, &format!("file_{index:02}.py"), "x  =  1\n"))
        .collect();

    let reports = format_files(paths.clone(), &FormatOptions::new(Style::default()), None);
    assert_eq!(reports.len(), paths.len());
    for (report, path) in reports.iter().zip(&paths) {
        assert_eq!(&report.path, path);
        assert!(report.changed);
    }
}
