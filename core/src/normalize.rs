//! Canonical forms for the root URL and service path.
//!
//! A client's base URL is always `root_url + service_path`. Keeping the root
//! URL slash-terminated and the service path free of a leading slash means
//! the concatenation never doubles or drops the separator.

use crate::error::ClientError;

/// Append a trailing `/` to `root_url` unless it already has one.
pub fn normalize_root_url(root_url: &str) -> String {
    if root_url.ends_with('/') {
        root_url.to_string()
    } else {
        format!("{root_url}/")
    }
}

/// Canonicalize a service path.
///
/// - `""` and `"/"` collapse to `""`.
/// - Any other single-character path is rejected.
/// - Longer paths gain a trailing `/` if missing and lose one leading `/`.
pub fn normalize_service_path(service_path: &str) -> Result<String, ClientError> {
    let mut chars = service_path.chars();
    match (chars.next(), chars.next()) {
        (None, _) | (Some('/'), None) => Ok(String::new()),
        (Some(_), None) => Err(ClientError::InvalidServicePath(service_path.to_string())),
        _ => {
            let path = service_path.strip_prefix('/').unwrap_or(service_path);
            if path.ends_with('/') {
                Ok(path.to_string())
            } else {
                Ok(format!("{path}/"))
            }
        }
    }
}

/// URL of the batch endpoint served under a normalized root URL.
pub fn batch_url(root_url: &str) -> String {
    format!("{root_url}batch")
}
