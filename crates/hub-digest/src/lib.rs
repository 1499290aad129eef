//! Hex digests of strings for the hub preference stores.
//!
//! Provides MD5 (128-bit) and SHA-1 (160-bit) digests rendered as upper- or
//! lower-case hexadecimal text. The registry in `hub-defaults` uses the
//! uppercase MD5 digest of a namespace identifier as the storage domain name.
//!
//! These are naming digests, not security primitives: both algorithms wrap
//! the RustCrypto implementations and no custom cryptography lives here.

pub mod hasher;

pub use hasher::{md5_hex, sha1_hex, DigestAlgorithm, DigestExt, HexCase, HexDigester};
