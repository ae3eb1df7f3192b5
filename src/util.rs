use crate::error::{Error, Result};

use std::fs;
use std::path::{Component, Path, PathBuf};

/// Rewrite a file whole: write a sibling temp file, then rename into place.
/// Keeps ref/index rewrites crash-atomic on common filesystems.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// The lower six octal digits of the file's permission bits, the form
/// recorded in the index and in tree entries.
#[cfg(unix)]
#[must_use]
pub fn file_mode(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::MetadataExt;
    metadata.mode() & 0o777_777
}

#[cfg(not(unix))]
#[must_use]
pub fn file_mode(_metadata: &fs::Metadata) -> u32 {
    crate::object::MODE_FILE
}

/// Apply an index-recorded mode to a freshly written file.
#[cfg(unix)]
pub fn set_file_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o7777))?;
    Ok(())
}

#[cfg(not(unix))]
pub fn set_file_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

/// Resolve `path` (absolute, or relative to the current directory) to a
/// repo-relative forward-slash string. The repo root itself maps to `""`.
pub fn repo_relative(root: &Path, path: &Path) -> Result<String> {
    let abs = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    // Canonicalize when the file exists; fall back to a lexical cleanup for
    // paths that are gone from disk but may still be indexed.
    let abs = abs.canonicalize().unwrap_or_else(|_| lexical_normalize(&abs));

    let rel = abs
        .strip_prefix(root)
        .map_err(|_| Error::PathOutsideRepo(path.display().to_string()))?;

    Ok(rel.to_string_lossy().replace('\\', "/"))
}

fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
