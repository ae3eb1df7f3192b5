use crate::error::{Error, Result};
use crate::hash::{hash_to_hex, Hash};
use crate::repository::Repository;

use std::fs;

use regex::Regex;
use tracing::debug;

/// Create a branch pointing at the effective HEAD commit. Creating a
/// branch while detached reattaches: the new branch becomes current and
/// the detached marker is cleared.
pub fn create(repo: &Repository, name: &str) -> Result<()> {
    validate_branch_name(name)?;
    if repo.branch_exists(name) {
        return Err(Error::BranchExists(name.to_string()));
    }

    let head = repo.current_commit()?;
    repo.set_branch_head(name, head.as_ref())?;

    if repo.detached_head()?.is_some() {
        repo.set_current_branch(name)?;
        repo.set_detached_head(None)?;
        debug!(branch = name, "reattached to new branch");
    }

    Ok(())
}

pub fn delete(repo: &Repository, name: &str) -> Result<()> {
    if !repo.branch_exists(name) {
        return Err(Error::BranchMissing(name.to_string()));
    }
    if repo.current_branch()? == name {
        return Err(Error::BranchCheckedOut(name.to_string()));
    }

    fs::remove_file(repo.head_path(name))?;
    Ok(())
}

pub fn rename(repo: &Repository, old: &str, new: &str) -> Result<()> {
    if !repo.branch_exists(old) {
        return Err(Error::BranchMissing(old.to_string()));
    }
    validate_branch_name(new)?;
    if repo.branch_exists(new) {
        return Err(Error::BranchExists(new.to_string()));
    }

    fs::rename(repo.head_path(old), repo.head_path(new))?;

    if repo.current_branch()? == old {
        repo.set_current_branch(new)?;
    }

    Ok(())
}

#[derive(Debug)]
pub struct BranchInfo {
    pub name: String,
    pub head: Option<Hash>,
    pub current: bool,
}

pub fn list(repo: &Repository) -> Result<Vec<BranchInfo>> {
    let current = repo.current_branch()?;
    let detached = repo.detached_head()?.is_some();

    let mut branches = Vec::new();
    for name in repo.branches()? {
        let head = repo.branch_head(&name)?;
        let current = !detached && name == current;
        branches.push(BranchInfo {
            name,
            head,
            current,
        });
    }
    Ok(branches)
}

#[must_use]
pub fn render(branches: &[BranchInfo]) -> String {
    let mut out = String::new();
    for info in branches {
        let marker = if info.current { "* " } else { "  " };
        match &info.head {
            Some(hash) => {
                out.push_str(&format!("{marker}{}  {}\n", info.name, &hash_to_hex(hash)[..8]));
            }
            None => out.push_str(&format!("{marker}{}\n", info.name)),
        }
    }
    out
}

// Reject names that would break the filesystem or confuse path parsing.
fn validate_branch_name(name: &str) -> Result<()> {
    let re = Regex::new(r"^[A-Za-z0-9._-]+$").expect("static pattern");
    if !re.is_match(name) || name.starts_with('-') {
        return Err(Error::InvalidName(format!("branch '{name}'")));
    }
    Ok(())
}
