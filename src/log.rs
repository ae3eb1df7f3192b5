use crate::error::{Error, Result};
use crate::hash::{hash_to_hex, Hash};
use crate::object::Commit;
use crate::repository::Repository;

use std::collections::BTreeSet;

/// Walk parent links from the effective HEAD, newest to oldest.
pub fn history(repo: &Repository) -> Result<Vec<(Hash, Commit)>> {
    let Some(mut current) = repo.current_commit()? else {
        return Err(Error::NoCommits(repo.current_branch()?));
    };

    let mut commits = Vec::new();
    let mut seen = BTreeSet::new();

    loop {
        if !seen.insert(current) {
            return Err(Error::Corrupt(format!(
                "commit {} appears twice in its own ancestry",
                hash_to_hex(&current)
            )));
        }

        let commit = repo.storage.read_commit(&current)?;
        let parent = commit.parent;
        commits.push((current, commit));

        match parent {
            Some(parent) => current = parent,
            None => break,
        }
    }

    Ok(commits)
}

#[must_use]
pub fn render(commits: &[(Hash, Commit)]) -> String {
    let mut out = String::new();
    for (hash, commit) in commits {
        out.push_str(&format!("commit {}\n", hash_to_hex(hash)));
        out.push_str(&format!(
            "Author: {} {}\n",
            commit.committer.name, commit.committer.email
        ));
        out.push_str(&format!("Date: {}\n", commit.committer.timestamp));
        out.push_str(&format!("\n    {}\n\n", commit.message));
    }
    out
}
