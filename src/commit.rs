use crate::config;
use crate::error::{Error, Result};
use crate::hash::{hash_to_hex, Hash};
use crate::index::Index;
use crate::object::{Commit, Object, Signature};
use crate::repository::Repository;
use crate::status;
use crate::tree;

use chrono::Local;
use tracing::debug;

/// Snapshot the index into tree objects and record a commit on the current
/// branch. Refused while detached, and when nothing is staged.
pub fn commit(repo: &Repository, message: &str) -> Result<Hash> {
    if repo.detached_head()?.is_some() {
        return Err(Error::DetachedForbids);
    }

    let index = Index::load(&repo.index_path())?;
    let current_status = status::collect(repo, &index)?;
    if !current_status.has_staged_changes() {
        return Err(Error::EmptyStaging);
    }

    let identity = config::committer_identity(repo)?;

    let tree_hash = tree::build_tree(&repo.storage, index.snapshot())?;
    let branch = repo.current_branch()?;
    let parent = repo.branch_head(&branch)?;

    let commit = Commit {
        tree: tree_hash,
        parent,
        committer: Signature {
            name: identity.name,
            email: identity.email,
            timestamp: Local::now().to_rfc3339(),
        },
        message: message.to_string(),
    };

    let hash = repo.storage.write_object(&Object::Commit(commit))?;
    repo.set_branch_head(&branch, Some(&hash))?;

    debug!(branch = %branch, hash = %hash_to_hex(&hash), "created commit");
    Ok(hash)
}
