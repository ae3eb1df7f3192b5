use crate::error::Result;
use crate::object::ObjectKind;
use crate::repository::Repository;

/// Look up an object by full hash or unique prefix and return its kind
/// and payload bytes. Blobs come back raw; trees and commits are already
/// textual in their payload encoding.
pub fn cat_file(repo: &Repository, rev: &str) -> Result<(ObjectKind, Vec<u8>)> {
    let hash = repo.storage.resolve_prefix(rev)?;
    repo.storage.read(&hash, None)
}
