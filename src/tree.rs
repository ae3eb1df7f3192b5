use crate::error::Result;
use crate::hash::Hash;
use crate::index::{Entry, Snapshot};
use crate::object::{ObjectKind, Tree, TreeEntry, MODE_DIR};
use crate::repository::Repository;
use crate::storage::Storage;

use std::collections::BTreeMap;

enum Node {
    Leaf(Entry),
    Dir(BTreeMap<String, Node>),
}

/// Build tree objects for a snapshot, bottom-up, and return the root hash.
///
/// Entries are written sorted by name, so the root hash depends only on
/// the set of paths and their recorded attributes, not on insertion order.
/// Identical subtrees dedupe naturally in the content-addressed store.
pub fn build_tree(storage: &Storage, snapshot: &Snapshot) -> Result<Hash> {
    let mut root = BTreeMap::new();
    for (path, entry) in snapshot {
        insert(&mut root, path, entry.clone());
    }
    write_node(storage, &root)
}

fn insert(dir: &mut BTreeMap<String, Node>, path: &str, entry: Entry) {
    match path.split_once('/') {
        None => {
            dir.insert(path.to_string(), Node::Leaf(entry));
        }
        Some((head, rest)) => {
            let node = dir
                .entry(head.to_string())
                .or_insert_with(|| Node::Dir(BTreeMap::new()));
            if !matches!(node, Node::Dir(_)) {
                *node = Node::Dir(BTreeMap::new());
            }
            let Node::Dir(sub) = node else { unreachable!() };
            insert(sub, rest, entry);
        }
    }
}

fn write_node(storage: &Storage, dir: &BTreeMap<String, Node>) -> Result<Hash> {
    let mut entries = Vec::with_capacity(dir.len());
    for (name, node) in dir {
        match node {
            Node::Leaf(entry) => entries.push(TreeEntry {
                mode: entry.mode,
                kind: entry.kind,
                hash: entry.hash,
                name: name.clone(),
            }),
            Node::Dir(sub) => entries.push(TreeEntry {
                mode: MODE_DIR,
                kind: ObjectKind::Tree,
                hash: write_node(storage, sub)?,
                name: name.clone(),
            }),
        }
    }

    let tree = Tree { entries };
    storage.write(ObjectKind::Tree, &tree.encode_payload())
}

/// Flatten the tree at `root` into a snapshot: `path -> (mode, kind, hash)`
/// for every reachable blob.
pub fn read_tree(storage: &Storage, root: &Hash) -> Result<Snapshot> {
    let mut snapshot = Snapshot::new();
    let mut stack = vec![(String::new(), *root)];

    while let Some((prefix, hash)) = stack.pop() {
        let tree = storage.read_tree(&hash)?;
        for entry in tree.entries {
            let path = if prefix.is_empty() {
                entry.name
            } else {
                format!("{prefix}/{}", entry.name)
            };

            match entry.kind {
                ObjectKind::Tree => stack.push((path, entry.hash)),
                ObjectKind::Blob => {
                    snapshot.insert(
                        path,
                        Entry {
                            mode: entry.mode,
                            kind: entry.kind,
                            hash: entry.hash,
                        },
                    );
                }
                ObjectKind::Commit => {}
            }
        }
    }

    Ok(snapshot)
}

/// Snapshot of the tree a commit points at.
pub fn commit_snapshot(repo: &Repository, commit_hash: &Hash) -> Result<Snapshot> {
    let commit = repo.storage.read_commit(commit_hash)?;
    read_tree(&repo.storage, &commit.tree)
}

/// Snapshot at the effective HEAD; empty when there are no commits yet.
pub fn head_snapshot(repo: &Repository) -> Result<Snapshot> {
    match repo.current_commit()? {
        Some(hash) => commit_snapshot(repo, &hash),
        None => Ok(Snapshot::new()),
    }
}
