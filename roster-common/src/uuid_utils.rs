//! UUID utilities

use uuid::Uuid;

/// Generate a new record identifier (UUIDv4)
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Parse a record identifier from a path segment
///
/// Returns `None` for anything that is not a UUID; such a value can never
/// name a stored record.
pub fn parse(s: &str) -> Option<Uuid> {
    Uuid::parse_str(s.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_unique() {
        assert_ne!(generate(), generate());
    }

    #[test]
    fn test_parse() {
        let id = generate();
        assert_eq!(parse(&id.to_string()), Some(id));
        assert_eq!(parse("507f1f77bcf86cd799439011"), None);
    }
}
