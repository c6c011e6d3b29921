//! Page-scoped candidate keys
//!
//! Pages are processed concurrently, so every staged candidate gets a key
//! derived from its page, its method and a digest of its payload. Two pages
//! never produce the same key for different payloads.

use sha2::{Digest, Sha256};

const DIGEST_PREFIX_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CandidateNamespace {
    page_number: u32,
}

impl CandidateNamespace {
    pub fn for_page(page_number: u32) -> Self {
        Self { page_number }
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Key of the form `p{page}-{method}-{digest}`.
    pub fn key(&self, method: &str, payload: &[u8]) -> String {
        let digest = Sha256::digest(payload);
        let hex = hex::encode(digest);
        format!(
            "p{}-{}-{}",
            self.page_number,
            method,
            &hex[..DIGEST_PREFIX_LEN]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let ns = CandidateNamespace::for_page(3);
        let key = ns.key("high_res", b"payload");
        assert!(key.starts_with("p3-high_res-"));
        assert_eq!(key.len(), "p3-high_res-".len() + DIGEST_PREFIX_LEN);
    }

    #[test]
    fn test_keys_are_page_scoped() {
        let a = CandidateNamespace::for_page(1).key("xref_direct", b"same");
        let b = CandidateNamespace::for_page(2).key("xref_direct", b"same");
        assert_ne!(a, b);
    }

    #[test]
    fn test_keys_distinguish_payloads() {
        let ns = CandidateNamespace::for_page(1);
        assert_ne!(ns.key("extracted", b"one"), ns.key("extracted", b"two"));
        assert_eq!(ns.key("extracted", b"one"), ns.key("extracted", b"one"));
    }
}
