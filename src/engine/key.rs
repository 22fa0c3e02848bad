use std::fmt;

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::engine::years::normalize_text_only;
use crate::models::Record;

/// Digest deciding whether two records describe the same license obligation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EquivalenceKey([u8; 32]);

impl EquivalenceKey {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for EquivalenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EquivalenceKey({})", &self.to_hex()[..12])
    }
}

impl fmt::Display for EquivalenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for EquivalenceKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Derive the equivalence key of a record.
///
/// Records with text key on `(license_id, text)`, where the text is
/// year-normalized when `normalize_years` is set. Records without text key on
/// the identifier alone.
pub fn key_of(record: &Record, normalize_years: bool) -> EquivalenceKey {
    let license_id = record.license().unwrap_or("");
    match record.text() {
        Some(text) if normalize_years => digest(b"text", license_id, &normalize_text_only(text)),
        Some(text) => digest(b"text", license_id, text),
        None => digest(b"id", license_id, ""),
    }
}

fn digest(kind: &[u8], license_id: &str, text: &str) -> EquivalenceKey {
    let mut hasher = Sha256::new();
    // Length prefixes keep ("ab", "c") and ("a", "bc") apart.
    for part in [kind, license_id.as_bytes(), text.as_bytes()] {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    EquivalenceKey(hasher.finalize().into())
}
