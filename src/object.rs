use crate::error::{Error, Result};
use crate::hash::{hash_to_hex, hex_to_hash, Hash};

use std::fmt;

pub const MODE_FILE: u32 = 0o100644;
pub const MODE_EXEC: u32 = 0o100755;
pub const MODE_DIR: u32 = 0o040000;

/// The three object kinds stored in the object database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
}

impl ObjectKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "blob" => Some(Self::Blob),
            "tree" => Some(Self::Tree),
            "commit" => Some(Self::Commit),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum Object {
    Blob(Vec<u8>),
    Tree(Tree),
    Commit(Commit),
}

impl Object {
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Blob(_) => ObjectKind::Blob,
            Self::Tree(_) => ObjectKind::Tree,
            Self::Commit(_) => ObjectKind::Commit,
        }
    }

    /// Payload bytes as framed and hashed by the store.
    #[must_use]
    pub fn encode_payload(&self) -> Vec<u8> {
        match self {
            Self::Blob(data) => data.clone(),
            Self::Tree(tree) => tree.encode_payload(),
            Self::Commit(commit) => commit.encode_payload(),
        }
    }

    pub fn decode(kind: ObjectKind, hash: &Hash, payload: &[u8]) -> Result<Self> {
        match kind {
            ObjectKind::Blob => Ok(Self::Blob(payload.to_vec())),
            ObjectKind::Tree => Ok(Self::Tree(Tree::decode_payload(hash, payload)?)),
            ObjectKind::Commit => Ok(Self::Commit(Commit::decode_payload(hash, payload)?)),
        }
    }
}

fn malformed(hash: &Hash, reason: impl Into<String>) -> Error {
    Error::ObjectMalformed {
        hash: hash_to_hex(hash),
        reason: reason.into(),
    }
}

/// One row of a tree object. `name` is a single path component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: u32,
    pub kind: ObjectKind,
    pub hash: Hash,
    pub name: String,
}

/// A directory snapshot: named entries pointing at blobs or subtrees.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// One entry per line, tab-separated: `mode\tkind\thash\tname\n`.
    /// Modes are six octal digits, so a subtree reads literally `040000`.
    #[must_use]
    pub fn encode_payload(&self) -> Vec<u8> {
        let mut buf = String::new();
        for entry in &self.entries {
            buf.push_str(&format!(
                "{:06o}\t{}\t{}\t{}\n",
                entry.mode,
                entry.kind,
                hash_to_hex(&entry.hash),
                entry.name,
            ));
        }
        buf.into_bytes()
    }

    pub fn decode_payload(hash: &Hash, payload: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(payload)
            .map_err(|_| malformed(hash, "tree payload is not utf-8"))?;

        let mut entries = Vec::new();
        for line in text.lines() {
            if line.is_empty() {
                continue;
            }

            let mut fields = line.split('\t');
            let (Some(mode), Some(kind), Some(entry_hash), Some(name)) = (
                fields.next(),
                fields.next(),
                fields.next(),
                fields.next(),
            ) else {
                return Err(malformed(hash, format!("bad tree entry '{line}'")));
            };
            if fields.next().is_some() {
                return Err(malformed(hash, format!("bad tree entry '{line}'")));
            }

            let mode = u32::from_str_radix(mode, 8)
                .map_err(|_| malformed(hash, format!("bad tree entry mode '{mode}'")))?;
            let kind = ObjectKind::parse(kind)
                .ok_or_else(|| malformed(hash, format!("bad tree entry kind '{kind}'")))?;
            let entry_hash = hex_to_hash(entry_hash)
                .map_err(|_| malformed(hash, format!("bad tree entry hash '{entry_hash}'")))?;

            if entries.iter().any(|e: &TreeEntry| e.name == name) {
                return Err(malformed(hash, format!("duplicate tree entry '{name}'")));
            }

            entries.push(TreeEntry {
                mode,
                kind,
                hash: entry_hash,
                name: name.to_string(),
            });
        }

        Ok(Self { entries })
    }
}

/// Committer identity plus the invocation timestamp (RFC 3339 with offset,
/// treated as an opaque string for equality and display).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub timestamp: String,
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.name, self.email, self.timestamp)
    }
}

/// A named snapshot: root tree, optional parent link, committer metadata.
#[derive(Debug, Clone)]
pub struct Commit {
    pub tree: Hash,
    pub parent: Option<Hash>,
    pub committer: Signature,
    pub message: String,
}

impl Commit {
    /// Header block, blank line, then the free-form message:
    ///
    /// ```text
    /// tree\t<hex>
    /// parent\t<hex>        (absent for a root commit)
    /// committer\t<name> <email> (<timestamp>)
    ///
    /// <message>
    /// ```
    #[must_use]
    pub fn encode_payload(&self) -> Vec<u8> {
        let mut buf = String::new();
        buf.push_str(&format!("tree\t{}\n", hash_to_hex(&self.tree)));
        if let Some(parent) = &self.parent {
            buf.push_str(&format!("parent\t{}\n", hash_to_hex(parent)));
        }
        buf.push_str(&format!("committer\t{}\n", self.committer));
        buf.push('\n');
        buf.push_str(&self.message);
        buf.into_bytes()
    }

    pub fn decode_payload(hash: &Hash, payload: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(payload)
            .map_err(|_| malformed(hash, "commit payload is not utf-8"))?;

        let (header, message) = text
            .split_once("\n\n")
            .ok_or_else(|| malformed(hash, "commit has no header/message separator"))?;

        let mut tree = None;
        let mut parent = None;
        let mut committer = None;

        for line in header.lines() {
            let (key, value) = line
                .split_once('\t')
                .ok_or_else(|| malformed(hash, format!("bad commit header line '{line}'")))?;
            match key {
                "tree" => tree = Some(hex_to_hash(value).map_err(|_| {
                    malformed(hash, format!("bad tree hash '{value}'"))
                })?),
                "parent" => parent = Some(hex_to_hash(value).map_err(|_| {
                    malformed(hash, format!("bad parent hash '{value}'"))
                })?),
                "committer" => committer = Some(parse_signature(hash, value)?),
                _ => return Err(malformed(hash, format!("unknown commit header '{key}'"))),
            }
        }

        let tree = tree.ok_or_else(|| malformed(hash, "commit has no tree header"))?;
        let committer =
            committer.ok_or_else(|| malformed(hash, "commit has no committer header"))?;

        Ok(Self {
            tree,
            parent,
            committer,
            message: message.to_string(),
        })
    }
}

/// Parse `<name> <email> (<timestamp>)`.
fn parse_signature(hash: &Hash, value: &str) -> Result<Signature> {
    let bad = || malformed(hash, format!("bad committer '{value}'"));

    let open = value.rfind(" (").ok_or_else(bad)?;
    let timestamp = value[open + 2..].strip_suffix(')').ok_or_else(bad)?;
    let (name, email) = value[..open].rsplit_once(' ').ok_or_else(bad)?;
    if name.is_empty() || email.is_empty() || timestamp.is_empty() {
        return Err(bad());
    }

    Ok(Signature {
        name: name.to_string(),
        email: email.to_string(),
        timestamp: timestamp.to_string(),
    })
}
