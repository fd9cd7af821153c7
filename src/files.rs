//! Filesystem primitives used by the manager.
//!
//! Thin wrappers over `std::fs` and `walkdir` that attach the offending path to every
//! failure, so a caught [`FilesystemError`] is readable on its own.

use crate::error::FilesystemError;
use crate::naming;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Remove `path` (if present) and create it again, empty.
pub fn delete_and_create_directory(path: &Path) -> Result<(), FilesystemError> {
    if path.exists() {
        delete_directory(path)?;
    }
    create_directory(path)
}

pub fn create_directory(path: &Path) -> Result<(), FilesystemError> {
    match fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(_) if path.is_dir() => Ok(()),
        Err(e) => Err(FilesystemError::io("create directory", path, e)),
    }
}

/// Recursively delete a directory. A missing directory is not an error.
pub fn delete_directory(path: &Path) -> Result<(), FilesystemError> {
    if !path.exists() {
        return Ok(());
    }
    if !path.is_dir() {
        return Err(FilesystemError::io(
            "delete directory",
            path,
            io::Error::other("it is not a directory"),
        ));
    }
    fs::remove_dir_all(path).map_err(|e| FilesystemError::io("delete directory", path, e))
}

/// Delete a single file. Fails with [`FilesystemError::MissingFile`] if it is absent.
pub fn delete_file(path: &Path) -> Result<(), FilesystemError> {
    if !path.exists() {
        return Err(FilesystemError::MissingFile(path.to_path_buf()));
    }
    fs::remove_file(path).map_err(|e| FilesystemError::io("delete file", path, e))
}

/// List the regular files of `dir`, skipping hidden entries, ordered by numeric prefix.
///
/// The ordering makes `10.png` follow `9.png`, which is what pairs images with metadata
/// by position.
pub fn files_in_dir(dir: &Path) -> Result<Vec<PathBuf>, FilesystemError> {
    if !dir.is_dir() {
        return Err(FilesystemError::MissingDirectory(dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| FilesystemError::io("scan directory", dir, e))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            let hidden = p
                .file_name()
                .map(|n| n.to_string_lossy().starts_with('.'))
                .unwrap_or(true);
            !hidden && p.is_file()
        })
        .collect();

    files.sort_by_cached_key(|p| {
        naming::sort_key(&p.file_name().unwrap_or_default().to_string_lossy())
    });
    Ok(files)
}

/// Copy the whole tree under `from` into `to`, creating `to` if needed.
pub fn deep_copy(from: &Path, to: &Path) -> Result<(), FilesystemError> {
    if !from.is_dir() {
        return Err(FilesystemError::MissingDirectory(from.to_path_buf()));
    }
    create_directory(to)?;
    log::debug!("deep copy {} -> {}", from.display(), to.display());

    for entry in WalkDir::new(from).min_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(from).to_path_buf();
            FilesystemError::io("walk directory", path, io::Error::other(e.to_string()))
        })?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| FilesystemError::io("walk directory", entry.path(), io::Error::other(e)))?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            create_directory(&target)?;
        } else {
            copy_file(entry.path(), &target)?;
        }
    }
    Ok(())
}

pub fn copy_file(from: &Path, to: &Path) -> Result<(), FilesystemError> {
    log::trace!("copy {} -> {}", from.display(), to.display());
    fs::copy(from, to)
        .map(|_| ())
        .map_err(|source| FilesystemError::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })
}

pub fn read_to_string(path: &Path) -> Result<String, FilesystemError> {
    fs::read_to_string(path).map_err(|e| FilesystemError::io("read file", path, e))
}

/// Pretty-print `value` as JSON (four-space indent, slashes left unescaped) into `path`.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<(), FilesystemError> {
    log::trace!("write {}", path.display());
    let json = to_pretty_json(value).map_err(|e| FilesystemError::io("encode JSON for", path, e))?;
    fs::write(path, json).map_err(|e| FilesystemError::io("write file", path, e))
}

fn to_pretty_json(value: &impl Serialize) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser).map_err(io::Error::other)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    // =========================================================================
    // Directory management
    // =========================================================================

    #[test]
    fn delete_and_create_empties_existing_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("out");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("nested/file"), "x").unwrap();

        delete_and_create_directory(&dir).unwrap();

        assert!(dir.is_dir());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn create_directory_tolerates_existing() {
        let tmp = TempDir::new().unwrap();
        create_directory(tmp.path()).unwrap();
    }

    #[test]
    fn create_directory_fails_without_parent() {
        let tmp = TempDir::new().unwrap();
        let result = create_directory(&tmp.path().join("a/b/c"));
        assert!(matches!(result, Err(FilesystemError::Io { .. })));
    }

    #[test]
    fn delete_missing_directory_is_noop() {
        let tmp = TempDir::new().unwrap();
        delete_directory(&tmp.path().join("nope")).unwrap();
    }

    #[test]
    fn delete_file_reports_missing_file() {
        let tmp = TempDir::new().unwrap();
        let result = delete_file(&tmp.path().join(".DS_Store"));
        assert!(matches!(result, Err(FilesystemError::MissingFile(_))));
    }

    // =========================================================================
    // Listing
    // =========================================================================

    #[test]
    fn files_in_dir_skips_hidden_and_directories() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("1.png"), "a").unwrap();
        fs::write(tmp.path().join(".DS_Store"), "junk").unwrap();
        fs::create_dir(tmp.path().join("2.png")).unwrap();

        let files = files_in_dir(tmp.path()).unwrap();
        assert_eq!(files, vec![tmp.path().join("1.png")]);
    }

    #[test]
    fn files_in_dir_orders_numerically() {
        let tmp = TempDir::new().unwrap();
        for name in ["10", "2", "1", "9"] {
            fs::write(tmp.path().join(name), "{}").unwrap();
        }

        let names: Vec<String> = files_in_dir(tmp.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["1", "2", "9", "10"]);
    }

    #[test]
    fn files_in_missing_dir_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = files_in_dir(&tmp.path().join("input/images"));
        assert!(matches!(result, Err(FilesystemError::MissingDirectory(_))));
    }

    // =========================================================================
    // Copy and write
    // =========================================================================

    #[test]
    fn deep_copy_copies_nested_tree() {
        let tmp = TempDir::new().unwrap();
        let from = tmp.path().join("output");
        fs::create_dir_all(from.join("images")).unwrap();
        fs::create_dir_all(from.join("metadata")).unwrap();
        fs::write(from.join("images/0.png"), "img").unwrap();
        fs::write(from.join("metadata/0"), "{}").unwrap();

        let to = tmp.path().join(".input-tmp");
        deep_copy(&from, &to).unwrap();

        assert_eq!(fs::read_to_string(to.join("images/0.png")).unwrap(), "img");
        assert_eq!(fs::read_to_string(to.join("metadata/0")).unwrap(), "{}");
    }

    #[test]
    fn copy_file_error_names_both_paths() {
        let tmp = TempDir::new().unwrap();
        let err = copy_file(&tmp.path().join("missing.png"), &tmp.path().join("0.png")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("missing.png"));
        assert!(message.contains("0.png"));
    }

    #[test]
    fn write_json_uses_four_space_indent_and_raw_slashes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("0");
        write_json(&path, &json!({"image": "ipfs://cid/0.png"})).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "{\n    \"image\": \"ipfs://cid/0.png\"\n}");
    }
}
