//! Key validation.
//!
//! Keys double as file names for [`LocalStore`](crate::backend::LocalStore),
//! so anything that could escape the store directory or collide with the
//! store's own temporary files is rejected.

use crate::error::{ErrorKind, Result};

/// Validates a store key.
///
/// # Examples
///
/// ```
/// use verse_storage::validate_key;
/// assert!(validate_key("device_seed").is_ok());
/// assert!(validate_key("widget.language-v2").is_ok());
/// assert!(validate_key("").is_err());
/// assert!(validate_key("../etc/passwd").is_err());
/// assert!(validate_key(".hidden").is_err());
/// ```
pub fn validate(key: &str) -> Result<&str> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key.bytes().all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'));
    match valid {
        true => Ok(key),
        false => exn::bail!(ErrorKind::InvalidKey(key.to_string())),
    }
}
