use md5::Md5;
use ripemd::Ripemd160;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::hashtype::HashType;

/// Lowercase hex digest of `input` under the given hash type.
pub fn digest_hex(hash_type: HashType, input: &str) -> String {
    let bytes = input.as_bytes();
    match hash_type {
        HashType::Md5 => format!("{:x}", Md5::digest(bytes)),
        HashType::Sha1 => format!("{:x}", Sha1::digest(bytes)),
        HashType::Sha256 => format!("{:x}", Sha256::digest(bytes)),
        HashType::Ripemd160 => format!("{:x}", Ripemd160::digest(bytes)),
    }
}
