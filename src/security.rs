use sha2::{Digest, Sha256};

/// Longest file or directory name accepted, in bytes.
pub const MAX_NAME_LEN: usize = 255;

/// Calculate SHA256 digest of `content`, hex encoded
pub fn calculate_checksum(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// Split a client supplied relative path into validated segments.
///
/// Leading, trailing and repeated separators are dropped, so `"/a//b/"`
/// yields `["a", "b"]` and `""` yields no segments (the namespace root).
pub fn sanitize_path(path: &str) -> Result<Vec<&str>, String> {
    let mut segments = Vec::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        match segment {
            "." | ".." => {
                return Err("Path traversal detected: '.' and '..' not allowed".to_string());
            }
            _ => validate_filename(segment)?,
        }
        segments.push(segment);
    }
    Ok(segments)
}

/// Validate a single file or directory name
pub fn validate_filename(filename: &str) -> Result<(), String> {
    if filename.is_empty() {
        return Err("Filename cannot be empty".to_string());
    }

    if filename.len() > MAX_NAME_LEN {
        return Err(format!("Filename exceeds {} bytes", MAX_NAME_LEN));
    }

    if filename == "." || filename == ".." {
        return Err(format!("'{}' is not a valid filename", filename));
    }

    let invalid_chars = ['/', '\\', '<', '>', ':', '"', '|', '?', '*'];
    if filename
        .chars()
        .any(|c| c.is_control() || invalid_chars.contains(&c))
    {
        return Err("Filename contains invalid characters".to_string());
    }

    Ok(())
}

/// True when `value` can be echoed back verbatim in an HTTP header: any text
/// without control characters other than tab.
pub fn is_header_safe(value: &str) -> bool {
    !value.chars().any(|c| c.is_control() && c != '\t')
}
