use crate::error::Result;
use crate::index::Index;
use crate::object::ObjectKind;
use crate::repository::{Repository, ADMIN_DIR};
use crate::storage::Storage;
use crate::tree;
use crate::util;

use std::collections::BTreeSet;
use std::fs;

use tracing::debug;
use walkdir::WalkDir;

/// Six disjoint buckets of repo-relative paths: the tri-way diff between
/// the committed tree at HEAD, the index, and the working directory.
/// Untracked directories are reported once, as `dir/`, at the shallowest
/// level rather than per file.
#[derive(Debug, Default)]
pub struct Status {
    pub staged_added: Vec<String>,
    pub staged_deleted: Vec<String>,
    pub staged_modified: Vec<String>,
    pub unstaged_added: Vec<String>,
    pub unstaged_deleted: Vec<String>,
    pub unstaged_modified: Vec<String>,
}

impl Status {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        !self.has_staged_changes() && !self.has_unstaged_changes() && self.unstaged_added.is_empty()
    }

    #[must_use]
    pub fn has_staged_changes(&self) -> bool {
        !self.staged_added.is_empty()
            || !self.staged_deleted.is_empty()
            || !self.staged_modified.is_empty()
    }

    #[must_use]
    pub fn has_unstaged_changes(&self) -> bool {
        !self.unstaged_deleted.is_empty() || !self.unstaged_modified.is_empty()
    }

    /// Checkout requires the index to equal the HEAD snapshot and the
    /// indexed files to be unmodified on disk. Untracked files don't block.
    #[must_use]
    pub fn blocks_checkout(&self) -> bool {
        self.has_staged_changes() || self.has_unstaged_changes()
    }
}

pub fn collect(repo: &Repository, index: &Index) -> Result<Status> {
    let head = tree::head_snapshot(repo)?;
    let mut status = Status::default();

    // Staged buckets: index vs HEAD snapshot.
    for (path, entry) in index.iter() {
        match head.get(path) {
            None => status.staged_added.push(path.clone()),
            Some(committed) if (committed.mode, committed.hash) != (entry.mode, entry.hash) => {
                status.staged_modified.push(path.clone());
            }
            Some(_) => {}
        }
    }
    for path in head.keys() {
        if index.get(path).is_none() {
            status.staged_deleted.push(path.clone());
        }
    }

    // Unstaged buckets: walk the working tree against the index. The admin
    // directory is skipped unconditionally, ignored directories are pruned
    // before descent, and an untracked directory stops the walk so it is
    // reported once.
    let mut visited = BTreeSet::new();
    let mut walker = WalkDir::new(&repo.root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let Ok(entry) = entry else { continue };
        let Ok(rel) = entry.path().strip_prefix(&repo.root) else {
            continue;
        };
        let rel = rel.to_string_lossy().replace('\\', "/");

        if rel == ADMIN_DIR {
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
            continue;
        }

        if entry.file_type().is_dir() {
            if repo.ignore.is_ignored(&rel) {
                walker.skip_current_dir();
                continue;
            }
            if !index.tracks_under(&rel) {
                status.unstaged_added.push(format!("{rel}/"));
                walker.skip_current_dir();
            }
            continue;
        }

        if !entry.file_type().is_file() || repo.ignore.is_ignored(&rel) {
            continue;
        }

        match index.get(&rel) {
            None => status.unstaged_added.push(rel),
            Some(stored) => {
                visited.insert(rel.clone());
                let metadata = fs::metadata(entry.path())?;
                let data = fs::read(entry.path())?;
                let live_mode = util::file_mode(&metadata);
                let live_hash = Storage::hash_payload(ObjectKind::Blob, &data);
                if (live_mode, live_hash) != (stored.mode, stored.hash) {
                    status.unstaged_modified.push(rel);
                }
            }
        }
    }

    // Indexed but never seen on the walk (and not ignored): deleted on disk.
    for (path, _) in index.iter() {
        if !repo.ignore.is_ignored(path) && !visited.contains(path) {
            status.unstaged_deleted.push(path.clone());
        }
    }

    for bucket in [
        &mut status.staged_added,
        &mut status.staged_deleted,
        &mut status.staged_modified,
        &mut status.unstaged_added,
        &mut status.unstaged_deleted,
        &mut status.unstaged_modified,
    ] {
        bucket.sort_unstable();
    }

    debug!(
        staged = status.staged_added.len() + status.staged_deleted.len() + status.staged_modified.len(),
        untracked = status.unstaged_added.len(),
        "collected status"
    );
    Ok(status)
}

/// Plain-text sections, empty string when the tree is clean.
#[must_use]
pub fn render(status: &Status) -> String {
    let mut out = String::new();

    if status.has_staged_changes() {
        out.push_str("Changes to be committed:\n");
        for path in &status.staged_added {
            out.push_str(&format!("    new file:   {path}\n"));
        }
        for path in &status.staged_modified {
            out.push_str(&format!("    modified:   {path}\n"));
        }
        for path in &status.staged_deleted {
            out.push_str(&format!("    deleted:    {path}\n"));
        }
    }

    if status.has_unstaged_changes() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("Changes not staged for commit:\n");
        for path in &status.unstaged_modified {
            out.push_str(&format!("    modified:   {path}\n"));
        }
        for path in &status.unstaged_deleted {
            out.push_str(&format!("    deleted:    {path}\n"));
        }
    }

    if !status.unstaged_added.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("Untracked files:\n");
        for path in &status.unstaged_added {
            out.push_str(&format!("    {path}\n"));
        }
    }

    out
}
