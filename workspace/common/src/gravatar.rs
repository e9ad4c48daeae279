use sha2::{Digest, Sha256};

/// Protocol-relative Gravatar URL for an email address.
///
/// Gravatar accepts SHA-256 digests of the trimmed, lower-cased address.
pub fn gravatar_url(email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    let hash = hex::encode(Sha256::digest(normalized.as_bytes()));

    format!("//www.gravatar.com/avatar/{}", hash)
}
