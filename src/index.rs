use crate::error::{Error, Result};
use crate::hash::{hash_to_hex, hex_to_hash, Hash};
use crate::object::ObjectKind;
use crate::util;

use std::collections::BTreeMap;
use std::path::Path;

/// One recorded file: mode, kind and content hash. The index only ever
/// holds blob entries; snapshots read back from trees are blobs too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub mode: u32,
    pub kind: ObjectKind,
    pub hash: Hash,
}

impl Entry {
    #[must_use]
    pub fn blob(mode: u32, hash: Hash) -> Self {
        Self {
            mode,
            kind: ObjectKind::Blob,
            hash,
        }
    }
}

/// Flat mapping of repo-relative forward-slash paths to entries. The
/// staging index and materialized HEAD snapshots share this shape, so one
/// diff routine serves both.
pub type Snapshot = BTreeMap<String, Entry>;

/// The staging area, persisted at `<admin>/index` as one tab-separated
/// line per entry: `mode\tkind\thash\tpath`.
#[derive(Default, Debug)]
pub struct Index {
    entries: Snapshot,
}

impl Index {
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Snapshot::new();
        for line in content.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }

            // Tab is the only delimiter; space-separated lines are rejected.
            let fields = line.split('\t').collect::<Vec<_>>();
            let [mode, kind, hash, entry_path] = fields.as_slice() else {
                return Err(Error::Corrupt(format!("index line '{line}' is not tab-separated")));
            };

            let mode = u32::from_str_radix(mode, 8)
                .map_err(|_| Error::Corrupt(format!("index mode '{mode}' is not octal")))?;
            if ObjectKind::parse(kind) != Some(ObjectKind::Blob) {
                return Err(Error::Corrupt(format!("index entry of kind '{kind}'")));
            }
            let hash = hex_to_hash(hash)?;

            entries.insert((*entry_path).to_string(), Entry::blob(mode, hash));
        }

        Ok(Self { entries })
    }

    /// Rewrite the whole index, entries sorted by path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut buf = String::new();
        for (entry_path, entry) in &self.entries {
            buf.push_str(&format!(
                "{:06o}\t{}\t{}\t{}\n",
                entry.mode,
                entry.kind,
                hash_to_hex(&entry.hash),
                entry_path,
            ));
        }
        util::write_atomic(path, buf.as_bytes())
    }

    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Entry> {
        self.entries.get(path)
    }

    pub fn upsert(&mut self, path: String, entry: Entry) {
        self.entries.insert(path, entry);
    }

    pub fn remove(&mut self, path: &str) -> bool {
        self.entries.remove(path).is_some()
    }

    /// Swap in a whole snapshot (checkout rewrites the index this way).
    pub fn replace(&mut self, snapshot: Snapshot) {
        self.entries = snapshot;
    }

    /// Whether any indexed path lies under the directory `dir`.
    #[must_use]
    pub fn tracks_under(&self, dir: &str) -> bool {
        let prefix = format!("{dir}/");
        self.entries
            .range(prefix.clone()..)
            .next()
            .is_some_and(|(path, _)| path.starts_with(&prefix))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Entry)> {
        self.entries.iter()
    }
}
