//! Hash type tags known to the engine.
//!
//! Each type carries a stable integer identifier used as the ranking
//! tie-break key and as the `HashStats` record key, plus the tag string
//! stored on resolved entries. Candidate inference maps a digest's hex
//! length to the set of plausible types (MD5 is 32 chars, SHA1 and
//! RIPEMD160 are both 40, SHA256 is 64).
use std::fmt;

/// A supported hash algorithm tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HashType {
    Md5,
    Sha1,
    Sha256,
    Ripemd160,
}

impl HashType {
    /// All supported types, in ascending identifier order.
    pub const ALL: [HashType; 4] = [
        HashType::Md5,
        HashType::Sha1,
        HashType::Sha256,
        HashType::Ripemd160,
    ];

    /// Stable identifier. Never reorder these; ranking tie-breaks and
    /// stats records depend on the numbering.
    pub fn id(self) -> u32 {
        match self {
            HashType::Md5 => 0,
            HashType::Sha1 => 1,
            HashType::Sha256 => 2,
            HashType::Ripemd160 => 3,
        }
    }

    /// Tag string as stored on `Entry.type` and shown in reports.
    pub fn tag(self) -> &'static str {
        match self {
            HashType::Md5 => "MD5",
            HashType::Sha1 => "SHA1",
            HashType::Sha256 => "SHA256",
            HashType::Ripemd160 => "RIPEMD160",
        }
    }

    /// Parse a tag string, case-insensitively. Accepts the bare "RIPEMD"
    /// spelling some exports use.
    pub fn from_tag(tag: &str) -> Option<HashType> {
        match tag.trim().to_uppercase().as_str() {
            "MD5" => Some(HashType::Md5),
            "SHA1" => Some(HashType::Sha1),
            "SHA256" => Some(HashType::Sha256),
            "RIPEMD160" | "RIPEMD" => Some(HashType::Ripemd160),
            _ => None,
        }
    }

    /// Length of this type's digest in hex characters.
    pub fn digest_len(self) -> usize {
        match self {
            HashType::Md5 => 32,
            HashType::Sha1 | HashType::Ripemd160 => 40,
            HashType::Sha256 => 64,
        }
    }

    /// Candidate types for a digest, inferred from its length. Unknown
    /// lengths yield an empty list.
    pub fn candidates_for(hash: &str) -> Vec<HashType> {
        let len = hash.trim().len();
        Self::ALL
            .iter()
            .copied()
            .filter(|t| t.digest_len() == len)
            .collect()
    }
}

impl fmt::Display for HashType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
