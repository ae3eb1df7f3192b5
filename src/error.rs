use crate::object::ObjectKind;

use std::path::PathBuf;

/// Error kinds for repository operations.
///
/// Everything propagates to the command boundary; nothing is recovered
/// internally. Integrity failures on object reads (`ObjectMalformed`,
/// `ObjectKindMismatch`) are unconditional.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no gud repository found in this directory, or in any parent directory")]
    NoRepo,

    #[error("repository already exists at {0}")]
    RepoExists(PathBuf),

    #[error("object '{0}' does not exist")]
    ObjectMissing(String),

    #[error("object {hash} is malformed: {reason}")]
    ObjectMalformed { hash: String, reason: String },

    #[error("object {hash} is a {found}, expected a {expected}")]
    ObjectKindMismatch {
        hash: String,
        expected: ObjectKind,
        found: ObjectKind,
    },

    #[error("object prefix '{0}' matches more than one object")]
    AmbiguousPrefix(String),

    #[error("path '{0}' is ignored")]
    IgnoredPath(String),

    #[error("path '{0}' is inside the repository's admin directory")]
    AdminPath(String),

    #[error("path '{0}' is outside the repository")]
    PathOutsideRepo(String),

    #[error("working tree has unsaved changes; commit, unstage or restore them first")]
    DirtyTree,

    #[error("branch '{0}' has no commits yet")]
    NoCommits(String),

    #[error("HEAD is detached; create a branch before committing")]
    DetachedForbids,

    #[error("branch '{0}' already exists")]
    BranchExists(String),

    #[error("branch '{0}' not found")]
    BranchMissing(String),

    #[error("branch '{0}' is currently checked out")]
    BranchCheckedOut(String),

    #[error("nothing staged to commit")]
    EmptyStaging,

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("path '{0}' has no committed version to restore")]
    NotInHead(String),

    #[error("corrupt repository metadata: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
