use crate::error::{Error, Result};

use sha1::{Digest, Sha1};

/// Raw SHA-1 digest. The hex form is 40 lowercase characters.
pub type Hash = [u8; 20];

pub const HEX_LEN: usize = 40;

#[must_use]
pub fn hash_bytes(data: &[u8]) -> Hash {
    let mut hasher = Sha1::new();
    hasher.update(data);
    hasher.finalize().into()
}

#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    hex::encode(hash)
}

pub fn hex_to_hash(s: &str) -> Result<Hash> {
    let bytes = hex::decode(s).map_err(|_| Error::Corrupt(format!("'{s}' is not a hex hash")))?;
    bytes
        .try_into()
        .map_err(|_| Error::Corrupt(format!("'{s}' is not a {HEX_LEN}-character hash")))
}
