use crate::error::{Error, Result};
use crate::hash::{hash_bytes, hash_to_hex, hex_to_hash, Hash, HEX_LEN};
use crate::object::{Commit, Object, ObjectKind, Tree};
use crate::util;

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use tracing::{debug, trace};

pub const COMPRESSION_LEVEL: u32 = 6;

/// Loose-object store under `<admin>/objects`.
///
/// An object lives at `objects/<aa>/<38-hex>` where `aa` is the first two
/// hex characters of its SHA-1. The stored bytes are the zlib-compressed
/// framed form `kind SP size NUL payload`; the hash is computed over the
/// framed bytes before compression.
#[derive(Debug)]
pub struct Storage {
    objects_dir: PathBuf,
}

impl Storage {
    #[must_use]
    pub fn new(admin: &Path) -> Self {
        Self {
            objects_dir: admin.join("objects"),
        }
    }

    fn object_path(&self, hash: &Hash) -> PathBuf {
        let hex = hash_to_hex(hash);
        self.objects_dir.join(&hex[..2]).join(&hex[2..])
    }

    fn frame(kind: ObjectKind, payload: &[u8]) -> Vec<u8> {
        let mut framed = format!("{} {}\0", kind, payload.len()).into_bytes();
        framed.extend_from_slice(payload);
        framed
    }

    /// Hash a payload without writing it. Used by status to compare live
    /// working-tree contents against indexed blobs.
    #[must_use]
    pub fn hash_payload(kind: ObjectKind, payload: &[u8]) -> Hash {
        hash_bytes(&Self::frame(kind, payload))
    }

    #[must_use]
    pub fn contains(&self, hash: &Hash) -> bool {
        self.object_path(hash).exists()
    }

    /// Frame, hash and persist a payload. Writing the same content twice is
    /// a no-op: the object path exists, so the write is skipped.
    pub fn write(&self, kind: ObjectKind, payload: &[u8]) -> Result<Hash> {
        let framed = Self::frame(kind, payload);
        let hash = hash_bytes(&framed);

        let path = self.object_path(&hash);
        if path.exists() {
            trace!(hash = %hash_to_hex(&hash), "object already present");
            return Ok(hash);
        }

        if let Some(fanout) = path.parent() {
            fs::create_dir_all(fanout)?;
        }

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(COMPRESSION_LEVEL));
        encoder.write_all(&framed)?;
        let compressed = encoder.finish()?;

        util::write_atomic(&path, &compressed)?;
        debug!(hash = %hash_to_hex(&hash), kind = %kind, size = payload.len(), "wrote object");
        Ok(hash)
    }

    pub fn write_object(&self, object: &Object) -> Result<Hash> {
        self.write(object.kind(), &object.encode_payload())
    }

    /// Read an object's kind and payload, validating the frame. With an
    /// expected kind, a mismatch is an error rather than a silent success.
    pub fn read(&self, hash: &Hash, expected: Option<ObjectKind>) -> Result<(ObjectKind, Vec<u8>)> {
        let malformed = |reason: &str| Error::ObjectMalformed {
            hash: hash_to_hex(hash),
            reason: reason.to_string(),
        };

        let compressed =
            fs::read(self.object_path(hash)).map_err(|_| Error::ObjectMissing(hash_to_hex(hash)))?;

        let mut framed = Vec::new();
        ZlibDecoder::new(compressed.as_slice())
            .read_to_end(&mut framed)
            .map_err(|_| malformed("not a zlib stream"))?;

        let nul = framed
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| malformed("header delimiter missing"))?;
        let payload = &framed[nul + 1..];

        let header =
            std::str::from_utf8(&framed[..nul]).map_err(|_| malformed("header is not utf-8"))?;
        let (kind, size) = header
            .split_once(' ')
            .ok_or_else(|| malformed("header has no size field"))?;
        let kind = ObjectKind::parse(kind)
            .ok_or_else(|| malformed(&format!("unknown object kind '{kind}'")))?;
        let size: usize = size
            .parse()
            .map_err(|_| malformed(&format!("bad size field '{size}'")))?;

        if size != payload.len() {
            return Err(malformed(&format!(
                "size field says {size}, payload is {} bytes",
                payload.len()
            )));
        }

        if let Some(expected) = expected {
            if expected != kind {
                return Err(Error::ObjectKindMismatch {
                    hash: hash_to_hex(hash),
                    expected,
                    found: kind,
                });
            }
        }

        Ok((kind, payload.to_vec()))
    }

    pub fn read_object(&self, hash: &Hash) -> Result<Object> {
        let (kind, payload) = self.read(hash, None)?;
        Object::decode(kind, hash, &payload)
    }

    pub fn read_blob(&self, hash: &Hash) -> Result<Vec<u8>> {
        Ok(self.read(hash, Some(ObjectKind::Blob))?.1)
    }

    pub fn read_tree(&self, hash: &Hash) -> Result<Tree> {
        let (_, payload) = self.read(hash, Some(ObjectKind::Tree))?;
        Tree::decode_payload(hash, &payload)
    }

    pub fn read_commit(&self, hash: &Hash) -> Result<Commit> {
        let (_, payload) = self.read(hash, Some(ObjectKind::Commit))?;
        Commit::decode_payload(hash, &payload)
    }

    /// Resolve a full 40-hex hash or a unique prefix (at least 4 characters)
    /// to the hash of an existing object.
    pub fn resolve_prefix(&self, prefix: &str) -> Result<Hash> {
        let missing = || Error::ObjectMissing(prefix.to_string());

        if prefix.len() == HEX_LEN {
            let hash = hex_to_hash(prefix).map_err(|_| missing())?;
            if !self.contains(&hash) {
                return Err(missing());
            }
            return Ok(hash);
        }

        if prefix.len() < 4
            || prefix.len() > HEX_LEN
            || !prefix.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(missing());
        }

        let fanout = self.objects_dir.join(&prefix[..2]);
        let rest = &prefix[2..];

        let mut matches = Vec::new();
        let Ok(entries) = fs::read_dir(&fanout) else {
            return Err(missing());
        };
        for entry in entries.filter_map(std::result::Result::ok) {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with(rest) {
                matches.push(format!("{}{}", &prefix[..2], name));
            }
        }

        match matches.as_slice() {
            [] => Err(missing()),
            [unique] => hex_to_hash(unique),
            _ => Err(Error::AmbiguousPrefix(prefix.to_string())),
        }
    }
}
