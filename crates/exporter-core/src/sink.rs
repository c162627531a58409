//! Output sink: one JSON document per file, written to a tmp file and renamed

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Writes JSON documents under a root directory, grouped by subdirectory.
///
/// Each document lands in `<root>/<group>/<name>.json`. The bytes go to a
/// `.tmp` sibling first and are renamed into place, so an interrupted run never
/// leaves a truncated document behind.
#[derive(Debug, Clone)]
pub struct JsonSink {
    root: PathBuf,
}

impl JsonSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Final path for a document; `group` and `name` must be plain file names
    pub fn path_for(&self, group: &str, name: &str) -> io::Result<PathBuf> {
        check_component("group", group)?;
        check_component("name", name)?;
        Ok(self.root.join(group).join(format!("{name}.json")))
    }

    /// Serialize `value` and atomically place it at [`path_for`](Self::path_for)
    pub fn write(&self, group: &str, name: &str, value: &serde_json::Value) -> io::Result<PathBuf> {
        let final_path = self.path_for(group, name)?;
        let dir = self.root.join(group);
        fs::create_dir_all(&dir)?;

        let tmp_path = dir.join(format!("{name}.json.tmp"));
        {
            let mut file = io::BufWriter::new(fs::File::create(&tmp_path)?);
            serde_json::to_writer_pretty(&mut file, value).map_err(io::Error::other)?;
            file.write_all(b"\n")?;
            file.flush()?;
        }
        fs::rename(&tmp_path, &final_path)?;
        Ok(final_path)
    }
}

/// Reject anything that would not stay a single entry under its parent
fn check_component(what: &str, value: &str) -> io::Result<()> {
    let invalid = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\', '\0']);
    if invalid {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid {what} for output path: {value:?}"),
        ));
    }
    Ok(())
}

/// Remove stale .tmp files in `dir` and its immediate subdirectories
pub fn cleanup_tmp_files(dir: &Path) -> io::Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            for inner in fs::read_dir(&path)? {
                removed += remove_if_tmp(&inner?.path())?;
            }
        } else {
            removed += remove_if_tmp(&path)?;
        }
    }
    Ok(removed)
}

fn remove_if_tmp(path: &Path) -> io::Result<usize> {
    if path.extension().is_some_and(|ext| ext == "tmp") {
        log::warn!("Removing stale tmp file: {}", path.display());
        fs::remove_file(path)?;
        return Ok(1);
    }
    Ok(0)
}
