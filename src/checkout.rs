use crate::error::{Error, Result};
use crate::hash::{hash_to_hex, Hash};
use crate::index::Index;
use crate::object::ObjectKind;
use crate::repository::Repository;
use crate::status;
use crate::tree;
use crate::util;

use std::fs;
use std::path::Path;

use tracing::debug;

/// What to check out: a branch by name, or a commit by hash / unique prefix.
#[derive(Debug, Clone)]
pub enum Target {
    Branch(String),
    Revision(String),
}

#[derive(Debug)]
pub enum Outcome {
    Attached { branch: String, hash: Hash },
    Detached { hash: Hash },
}

/// Reconcile the working tree and index with the snapshot at `target`.
///
/// The detached-HEAD marker is written before the first file mutation, so
/// a crash mid-checkout leaves a detached but self-consistent repository.
/// Changes apply deletes first (pruning emptied directories), then new
/// files, then overwrites; the index is replaced last.
pub fn checkout(repo: &Repository, target: &Target) -> Result<Outcome> {
    let mut index = Index::load(&repo.index_path())?;

    let current_status = status::collect(repo, &index)?;
    if current_status.blocks_checkout() {
        return Err(Error::DirtyTree);
    }

    let target_hash = match target {
        Target::Branch(name) => repo
            .branch_head(name)?
            .ok_or_else(|| Error::NoCommits(name.clone()))?,
        Target::Revision(rev) => {
            let hash = repo.storage.resolve_prefix(rev)?;
            repo.storage.read(&hash, Some(ObjectKind::Commit))?;
            hash
        }
    };

    let target_snapshot = tree::commit_snapshot(repo, &target_hash)?;

    let mut deletes = Vec::new();
    let mut modifies = Vec::new();
    let mut creates = Vec::new();
    for (path, entry) in index.iter() {
        match target_snapshot.get(path) {
            None => deletes.push(path.clone()),
            Some(wanted) if (wanted.mode, wanted.hash) != (entry.mode, entry.hash) => {
                modifies.push(path.clone());
            }
            Some(_) => {}
        }
    }
    for path in target_snapshot.keys() {
        if index.get(path).is_none() {
            creates.push(path.clone());
        }
    }

    debug!(
        target = %hash_to_hex(&target_hash),
        deletes = deletes.len(),
        creates = creates.len(),
        modifies = modifies.len(),
        "applying checkout"
    );

    // Record intent before touching the working tree.
    repo.set_detached_head(Some(&target_hash))?;

    for path in &deletes {
        let abs = repo.root.join(path);
        match fs::remove_file(&abs) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        prune_empty_parents(&repo.root, path);
    }

    for path in &creates {
        write_from_snapshot(repo, &target_snapshot, path)?;
    }
    for path in &modifies {
        write_from_snapshot(repo, &target_snapshot, path)?;
    }

    index.replace(target_snapshot);
    index.save(&repo.index_path())?;

    // Reattach when the target is some branch's head. A branch named on
    // the command line wins outright; for a hash, the current branch wins
    // a tie, else the lexicographically smallest name does.
    let chosen = match target {
        Target::Branch(name) => Some(name.clone()),
        Target::Revision(_) => {
            let current_branch = repo.current_branch()?;
            let mut matching = Vec::new();
            for name in repo.branches()? {
                if repo.branch_head(&name)? == Some(target_hash) {
                    matching.push(name);
                }
            }

            if matching.iter().any(|name| *name == current_branch) {
                Some(current_branch)
            } else {
                matching.into_iter().next()
            }
        }
    };

    match chosen {
        Some(branch) => {
            repo.set_current_branch(&branch)?;
            repo.set_detached_head(None)?;
            Ok(Outcome::Attached {
                branch,
                hash: target_hash,
            })
        }
        None => Ok(Outcome::Detached { hash: target_hash }),
    }
}

fn write_from_snapshot(
    repo: &Repository,
    snapshot: &crate::index::Snapshot,
    path: &str,
) -> Result<()> {
    let entry = &snapshot[path];
    let abs = repo.root.join(path);
    if let Some(parent) = abs.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = repo.storage.read_blob(&entry.hash)?;
    fs::write(&abs, data)?;
    util::set_file_mode(&abs, entry.mode)
}

/// Remove directories left empty by a deleted file, walking up toward the
/// repo root. Stops at the first non-empty (or otherwise unremovable) one.
fn prune_empty_parents(root: &Path, deleted: &str) {
    let mut dir = Path::new(deleted).parent();
    while let Some(rel) = dir {
        if rel.as_os_str().is_empty() {
            break;
        }
        if fs::remove_dir(root.join(rel)).is_err() {
            break;
        }
        dir = rel.parent();
    }
}
