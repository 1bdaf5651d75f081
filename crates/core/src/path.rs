//! Container and object name handling
//!
//! Names are checked and percent-escaped here before they become URL path
//! segments.

use crate::error::{Error, Result};

/// Longest container or object name the server accepts
pub const MAX_NAME_LEN: usize = 256;

/// Check a single container or object name
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::BadName("name cannot be empty".to_string()));
    }
    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(Error::BadName(format!(
            "name is {len} characters, limit is {MAX_NAME_LEN}"
        )));
    }
    Ok(())
}

/// Validate and percent-escape one path segment
pub fn escape_segment(name: &str) -> Result<String> {
    validate_name(name)?;
    Ok(urlencoding::encode(name).into_owned())
}

/// Validate, escape and join segments into a relative path (`container/object`)
pub fn object_path<S: AsRef<str>>(segments: &[S]) -> Result<String> {
    let escaped = segments
        .iter()
        .map(|s| escape_segment(s.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    Ok(escaped.join("/"))
}
