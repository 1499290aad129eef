use std::ffi::OsStr;

use md5::{Digest, Md5};
use sha1::Sha1;

/// Letter case of the rendered hex digits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HexCase {
    /// `A`-`F`.
    #[default]
    Upper,
    /// `a`-`f`.
    Lower,
}

/// Digest algorithm selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    /// 128-bit MD5.
    Md5,
    /// 160-bit SHA-1.
    Sha1,
}

impl DigestAlgorithm {
    /// Digest length in bytes.
    pub const fn output_len(self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha1 => 20,
        }
    }
}

/// Deterministic string-to-hex digester.
///
/// A digester pairs an algorithm with a hex case. The same input always
/// produces the same fixed-length output (32 characters for MD5, 40 for
/// SHA-1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HexDigester {
    algorithm: DigestAlgorithm,
    case: HexCase,
}

impl HexDigester {
    /// Uppercase MD5, the namespace digest used by the store registry.
    pub const MD5: Self = Self::new(DigestAlgorithm::Md5, HexCase::Upper);
    /// Uppercase SHA-1.
    pub const SHA1: Self = Self::new(DigestAlgorithm::Sha1, HexCase::Upper);

    pub const fn new(algorithm: DigestAlgorithm, case: HexCase) -> Self {
        Self { algorithm, case }
    }

    /// Same algorithm, different case.
    pub const fn with_case(self, case: HexCase) -> Self {
        Self::new(self.algorithm, case)
    }

    pub const fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub const fn case(&self) -> HexCase {
        self.case
    }

    /// Length of the rendered hex string.
    pub const fn hex_len(&self) -> usize {
        self.algorithm.output_len() * 2
    }

    /// Digest the UTF-8 bytes of `input`.
    pub fn digest(&self, input: &str) -> String {
        self.digest_bytes(input.as_bytes())
    }

    /// Digest an OS string. Returns an empty string when `input` is not
    /// valid Unicode.
    pub fn digest_os_str(&self, input: &OsStr) -> String {
        match input.to_str() {
            Some(s) => self.digest(s),
            None => String::new(),
        }
    }

    /// Digest raw bytes.
    pub fn digest_bytes(&self, data: &[u8]) -> String {
        let raw = self.raw(data);
        match self.case {
            HexCase::Upper => hex::encode_upper(raw),
            HexCase::Lower => hex::encode(raw),
        }
    }

    /// Raw digest bytes of `data`.
    pub fn raw(&self, data: &[u8]) -> Vec<u8> {
        match self.algorithm {
            DigestAlgorithm::Md5 => Md5::digest(data).to_vec(),
            DigestAlgorithm::Sha1 => Sha1::digest(data).to_vec(),
        }
    }
}

/// MD5 hex digest of `input`.
pub fn md5_hex(input: &str, case: HexCase) -> String {
    HexDigester::MD5.with_case(case).digest(input)
}

/// SHA-1 hex digest of `input`.
pub fn sha1_hex(input: &str, case: HexCase) -> String {
    HexDigester::SHA1.with_case(case).digest(input)
}

/// Digest methods on string slices.
pub trait DigestExt {
    fn md5(&self, case: HexCase) -> String;
    fn sha1(&self, case: HexCase) -> String;
}

impl DigestExt for str {
    fn md5(&self, case: HexCase) -> String {
        md5_hex(self, case)
    }

    fn sha1(&self, case: HexCase) -> String {
        sha1_hex(self, case)
    }
}
