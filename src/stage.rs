use crate::error::{Error, Result};
use crate::index::{Entry, Index};
use crate::object::ObjectKind;
use crate::repository::{Repository, ADMIN_DIR};
use crate::tree;
use crate::util;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Stage files: serialize each as a blob and upsert its index entry.
///
/// A path that matches the ignore rules or lies under the admin directory
/// is refused. A path that is gone from disk but still indexed is removed
/// from the index. A directory expands one level only; files nested
/// deeper must be staged with their own paths.
pub fn add(repo: &Repository, paths: &[PathBuf]) -> Result<usize> {
    let mut index = Index::load(&repo.index_path())?;
    let mut changed = 0usize;

    for path in paths {
        let rel = util::repo_relative(&repo.root, path)?;
        refuse_unstageable(repo, &rel)?;

        let abs = repo.root.join(&rel);
        let metadata = match fs::metadata(&abs) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if index.remove(&rel) {
                    changed += 1;
                    continue;
                }
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };

        if metadata.is_dir() {
            for child in fs::read_dir(&abs)? {
                let child = child?;
                if !child.file_type()?.is_file() {
                    continue;
                }
                let Ok(name) = child.file_name().into_string() else {
                    continue;
                };

                let child_rel = if rel.is_empty() {
                    name
                } else {
                    format!("{rel}/{name}")
                };
                if is_admin_path(&child_rel) || repo.ignore.is_ignored(&child_rel) {
                    continue;
                }

                stage_file(repo, &mut index, &child_rel, &child.path())?;
                changed += 1;
            }
        } else {
            stage_file(repo, &mut index, &rel, &abs)?;
            changed += 1;
        }
    }

    index.save(&repo.index_path())?;
    Ok(changed)
}

/// Unstage paths: revert each index entry to the HEAD snapshot's, or drop
/// it when HEAD has no version of the path.
pub fn remove(repo: &Repository, paths: &[PathBuf]) -> Result<usize> {
    let head = tree::head_snapshot(repo)?;
    let mut index = Index::load(&repo.index_path())?;
    let mut changed = 0usize;

    for path in paths {
        let rel = util::repo_relative(&repo.root, path)?;
        match head.get(&rel) {
            Some(entry) => {
                index.upsert(rel, entry.clone());
                changed += 1;
            }
            None => {
                if index.remove(&rel) {
                    changed += 1;
                }
            }
        }
    }

    index.save(&repo.index_path())?;
    Ok(changed)
}

fn is_admin_path(rel: &str) -> bool {
    rel == ADMIN_DIR || rel.starts_with(&format!("{ADMIN_DIR}/"))
}

fn refuse_unstageable(repo: &Repository, rel: &str) -> Result<()> {
    if is_admin_path(rel) {
        return Err(Error::AdminPath(rel.to_string()));
    }
    if repo.ignore.is_ignored(rel) {
        return Err(Error::IgnoredPath(rel.to_string()));
    }
    Ok(())
}

fn stage_file(repo: &Repository, index: &mut Index, rel: &str, abs: &Path) -> Result<()> {
    let data = fs::read(abs)?;
    let hash = repo.storage.write(ObjectKind::Blob, &data)?;
    let mode = util::file_mode(&fs::metadata(abs)?);

    debug!(path = rel, mode = %format!("{mode:06o}"), "staged");
    index.upsert(rel.to_string(), Entry::blob(mode, hash));
    Ok(())
}
