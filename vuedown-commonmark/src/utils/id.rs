use std::path::Path;

use sha2::{Digest, Sha256};

/// Number of hex characters kept from the digest.
const ID_LEN: usize = 8;

/// Short identifier for a document's origin path.
///
/// The first eight hex characters of the SHA-256 digest of the path string.
/// Stable across runs, so cache entries named with it are reused.
#[must_use]
pub fn generate_id(origin: &Path) -> String {
  let mut hasher = Sha256::new();
  hasher.update(origin.to_string_lossy().as_bytes());
  let mut id = hex::encode(hasher.finalize());
  id.truncate(ID_LEN);
  id
}
