use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::NaiveDate;
use sha2::{Digest, Sha256};

/// Token printed into the workshop QR code for one calendar date. Scanning a
/// current token is itself the location proof, so the token binds the shared
/// secret to the date and nothing else.
pub fn daily_token(secret: &str, date: NaiveDate) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(b"|");
    hasher.update(date.to_string().as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

pub fn verify_token(secret: &str, date: NaiveDate, token: &str) -> bool {
    daily_token(secret, date) == token
}
