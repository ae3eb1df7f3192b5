use crate::error::{Error, Result};
use crate::repository::Repository;
use crate::tree;
use crate::util;

use std::fs;
use std::path::PathBuf;

/// Overwrite working-tree files from the blobs recorded in the HEAD
/// snapshot, discarding unstaged modifications.
pub fn restore(repo: &Repository, paths: &[PathBuf]) -> Result<usize> {
    let head = tree::head_snapshot(repo)?;
    let mut restored = 0usize;

    for path in paths {
        let rel = util::repo_relative(&repo.root, path)?;
        let entry = head
            .get(&rel)
            .ok_or_else(|| Error::NotInHead(rel.clone()))?;

        let data = repo.storage.read_blob(&entry.hash)?;
        let abs = repo.root.join(&rel);
        if let Some(parent) = abs.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&abs, data)?;
        util::set_file_mode(&abs, entry.mode)?;
        restored += 1;
    }

    Ok(restored)
}
