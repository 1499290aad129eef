//! Domain name validation.
//!
//! Domain names double as backend file stems, so the rules keep them to a
//! single path component:
//! - Must be non-empty and at most 255 bytes
//! - Must not be `.` or `..`
//! - Must not contain `/`, `\` or NUL

use crate::error::{StoreError, StoreResult};

/// Longest accepted domain name, in bytes.
pub const MAX_DOMAIN_NAME_LEN: usize = 255;

const FORBIDDEN_CHARS: &[char] = &['/', '\\', '\0'];

/// Validate a domain name, returning `Ok(())` if it is usable.
///
/// # Examples
///
/// ```
/// use hub_store::names::validate_domain_name;
///
/// assert!(validate_domain_name("com.example.app").is_ok());
/// assert!(validate_domain_name("900150983CD24FB0D6963F7D28E17F72").is_ok());
/// assert!(validate_domain_name("").is_err());
/// assert!(validate_domain_name("../escape").is_err());
/// ```
pub fn validate_domain_name(name: &str) -> StoreResult<()> {
    let invalid = |reason: String| StoreError::InvalidDomainName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("domain name must not be empty".into()));
    }
    if name.len() > MAX_DOMAIN_NAME_LEN {
        return Err(invalid(format!(
            "domain name is {} bytes, limit is {MAX_DOMAIN_NAME_LEN}",
            name.len()
        )));
    }
    if name == "." || name == ".." {
        return Err(invalid("domain name must not be a relative path".into()));
    }
    if let Some(ch) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(invalid(format!("contains forbidden character: {ch:?}")));
    }
    Ok(())
}
