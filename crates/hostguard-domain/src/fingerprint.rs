use sha2::{Digest, Sha256};

/// Compute a stable SHA-256 fingerprint for a failed check.
///
/// Identity fields:
/// - host
/// - suite name
/// - check name
/// - failure code
pub fn fingerprint_for_result(host: &str, suite: &str, check: &str, code: &str) -> String {
    let canonical = [host, suite, check, code].join("|");

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_and_field_sensitive() {
        let a = fingerprint_for_result("worker-1", "docker", "docker_installed", "not_installed");
        let b = fingerprint_for_result("worker-1", "docker", "docker_installed", "not_installed");
        let c = fingerprint_for_result("worker-2", "docker", "docker_installed", "not_installed");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }
}
