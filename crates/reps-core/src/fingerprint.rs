use reps_types::config::FingerprintScheme;
use sha2::{Digest, Sha256};

/// Hash a client address (and optionally its user-agent) with the voter
/// pepper. Returns 64 lowercase hex characters.
pub fn voter_fingerprint(
    scheme: FingerprintScheme,
    address: &str,
    user_agent: &str,
    pepper: &str,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(address.as_bytes());
    if scheme == FingerprintScheme::AddressAndUserAgent {
        hasher.update(user_agent.as_bytes());
    }
    hasher.update(pepper.as_bytes());
    hex::encode(hasher.finalize())
}

/// Pick the address a vote is attributed to: the forwarded-for header when
/// a proxy set one, else the peer socket address.
pub fn client_address(forwarded_for: Option<&str>, peer: Option<&str>) -> String {
    match forwarded_for.map(str::trim) {
        Some(forwarded) if !forwarded.is_empty() => forwarded.to_string(),
        _ => peer.unwrap_or_default().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_sha256_of_address_and_pepper() {
        // sha256("1.2.3.4" + "pepper")
        let expected = hex::encode(Sha256::digest(b"1.2.3.4pepper"));
        let fp = voter_fingerprint(FingerprintScheme::Address, "1.2.3.4", "curl/8", "pepper");
        assert_eq!(fp, expected);
        assert_eq!(fp.len(), 64);
    }

    #[test]
    fn user_agent_only_counts_when_selected() {
        let a = voter_fingerprint(FingerprintScheme::Address, "1.2.3.4", "curl/8", "p");
        let b = voter_fingerprint(FingerprintScheme::Address, "1.2.3.4", "firefox", "p");
        assert_eq!(a, b);

        let c = voter_fingerprint(FingerprintScheme::AddressAndUserAgent, "1.2.3.4", "curl/8", "p");
        let d = voter_fingerprint(FingerprintScheme::AddressAndUserAgent, "1.2.3.4", "firefox", "p");
        assert_ne!(c, d);
        assert_eq!(c, hex::encode(Sha256::digest(b"1.2.3.4curl/8p")));
    }

    #[test]
    fn pepper_rotation_changes_fingerprint() {
        let a = voter_fingerprint(FingerprintScheme::Address, "10.0.0.1", "", "one");
        let b = voter_fingerprint(FingerprintScheme::Address, "10.0.0.1", "", "two");
        assert_ne!(a, b);
    }

    #[test]
    fn forwarded_header_wins_over_peer() {
        assert_eq!(client_address(Some("9.9.9.9"), Some("127.0.0.1")), "9.9.9.9");
        assert_eq!(client_address(Some("  "), Some("127.0.0.1")), "127.0.0.1");
        assert_eq!(client_address(None, Some("127.0.0.1")), "127.0.0.1");
        assert_eq!(client_address(None, None), "");
    }
}
