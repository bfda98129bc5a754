use rand::Rng;

/// Generates a fresh object id: 24 lowercase hex characters, matching the
/// shape of a BSON ObjectId's string representation.
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    (0..24)
        .map(|_| std::char::from_digit(rng.gen_range(0..16), 16).unwrap())
        .collect()
}

/// Whether `s` could be the string representation of an object id: 24
/// characters, all lowercase ascii letters or digits. Used to distinguish
/// "this link value is already an id" from "this is a relative path" when
/// posting link attributes.
pub fn is_object_id(s: &str) -> bool {
    s.len() == 24 && s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_look_like_object_ids() {
        let id = generate();
        assert!(is_object_id(&id));
    }

    #[test]
    fn rejects_wrong_length_and_case() {
        assert!(!is_object_id("tooShort"));
        assert!(!is_object_id(&"a".repeat(23)));
        assert!(!is_object_id(&"A".repeat(24)));
        assert!(!is_object_id(&".".repeat(24)));
    }
}
