// src/cache/hash.rs

use blake3::Hasher;

/// Hash an optimizer identity together with the input bytes.
///
/// The identity covers the optimizer's settings (e.g. the JPEG quality), so
/// changing them invalidates earlier entries.
pub fn compute_content_hash(optimizer_id: &str, contents: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(optimizer_id.as_bytes());
    hasher.update(&[0]);
    hasher.update(contents);
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_part_of_the_key() {
        let a = compute_content_hash("images:q85", b"abc");
        let b = compute_content_hash("images:q60", b"abc");
        assert_ne!(a, b);
        assert_eq!(a, compute_content_hash("images:q85", b"abc"));
    }
}
