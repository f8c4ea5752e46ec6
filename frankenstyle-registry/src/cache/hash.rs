//! Canonical bytes and digests of a snapshot.
//!
//! Two builds over the same tree render to identical bytes, so comparing
//! digests is enough to decide whether an artifact is current.

use frankenstyle_core::errors::CacheResult;
use xxhash_rust::xxh3::xxh3_128;

use crate::snapshot::CacheSnapshot;

/// Canonical artifact bytes: pretty JSON with a trailing newline.
pub fn render(snapshot: &CacheSnapshot) -> CacheResult<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(snapshot)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// xxh3-128 digest as 32 lowercase hex digits.
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:032x}", xxh3_128(bytes))
}

/// Digest of the canonical rendering of `snapshot`.
pub fn content_hash(snapshot: &CacheSnapshot) -> CacheResult<String> {
    Ok(hash_bytes(&render(snapshot)?))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn digest_is_fixed_width_hex() {
        let digest = hash_bytes(b"");
        assert_eq!(digest.len(), 32);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn hash_tracks_content() {
        let mut snapshot = CacheSnapshot::default();
        let before = content_hash(&snapshot).unwrap();
        assert_eq!(before, content_hash(&snapshot.clone()).unwrap());

        snapshot
            .plugintypes
            .insert("mod".to_string(), PathBuf::from("/srv/site/mod"));
        assert_ne!(before, content_hash(&snapshot).unwrap());
    }
}
