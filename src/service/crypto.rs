use sha3::{Digest, Sha3_256};

pub fn sha3_hex(data: &str) -> String {
    let mut hasher = Sha3_256::default();
    hasher.update(data.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn verify(data: &str, hash: &str) -> bool {
    sha3_hex(data) == hash
}
