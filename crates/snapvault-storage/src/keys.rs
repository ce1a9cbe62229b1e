//! Shared key generation for storage backends.

use uuid::Uuid;

/// Extension used for the stored object: the lowercase suffix of `filename`,
/// or `bin` when the name has none or the suffix is not plain alphanumeric.
pub fn key_extension(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            ext.to_ascii_lowercase()
        }
        _ => "bin".to_string(),
    }
}

/// Collision-resistant object name: 32 hex characters of randomness plus the extension.
pub fn generate_object_name(filename: &str) -> String {
    format!("{}.{}", Uuid::new_v4().simple(), key_extension(filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_name_shape() {
        let name = generate_object_name("Holiday.JPG");
        let (token, ext) = name.split_once('.').unwrap();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(ext, "jpg");
    }

    #[test]
    fn test_object_names_are_unique() {
        assert_ne!(generate_object_name("a.png"), generate_object_name("a.png"));
    }

    #[test]
    fn test_suspicious_extensions_fall_back() {
        assert_eq!(key_extension("noext"), "bin");
        assert_eq!(key_extension("weird.p/ng"), "bin");
        assert_eq!(key_extension("trailing."), "bin");
    }
}
