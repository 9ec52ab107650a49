//! Source discovery: walks the given inputs for target-language files,
//! honoring ignore patterns before traversal so excluded directories are
//! never scanned.

use std::path::PathBuf;

use ignore::WalkBuilder;

/// UNIX-glob ignore file recognized in any directory being traversed, in
/// addition to the standard VCS ignore files.
pub const IGNORE_FILE_NAME: &str = ".pyfmtignore";

const SOURCE_EXTENSION: &str = "py";

/// Expand files and directories into the sorted list of formattable files.
pub fn discover_files<I>(inputs: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    let mut found = Vec::new();
    for input in inputs {
        if input.is_file() {
            found.push(input);
            continue;
        }
        let mut builder = WalkBuilder::new(&input);
        builder.add_custom_ignore_filename(IGNORE_FILE_NAME);
        for entry in builder.build().flatten() {
            let is_file = entry.file_type().is_some_and(|kind| kind.is_file());
            let is_source = entry
                .path()
                .extension()
                .is_some_and(|extension| extension == SOURCE_EXTENSION);
            if is_file && is_source {
                found.push(entry.into_path());
            }
        }
    }
    found.sort();
    found.dedup();
    found
}
