//! Single-use verification and reset token generation.
//!
//! Two token shapes live here: the short numeric code typed by a user to
//! confirm an email address, and the high-entropy opaque token embedded in a
//! password-reset link. The reset token is never persisted in plaintext --
//! only its SHA-256 digest is stored, so a database leak cannot be replayed
//! against the reset endpoint.

use rand::Rng;

use crate::hashing::sha256_hex;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of digits in an email verification code.
pub const VERIFICATION_CODE_DIGITS: u32 = 8;

/// Number of random bytes in a password-reset token (hex-encoded to 64 chars).
pub const RESET_TOKEN_BYTES: usize = 32;

// ---------------------------------------------------------------------------
// Email verification codes
// ---------------------------------------------------------------------------

/// Generate a random numeric email verification code.
///
/// The code is uniformly distributed over all values with exactly
/// [`VERIFICATION_CODE_DIGITS`] digits (no leading zeros).
pub fn generate_verification_code() -> String {
    let min = 10u64.pow(VERIFICATION_CODE_DIGITS - 1);
    let max = 10u64.pow(VERIFICATION_CODE_DIGITS);

    rand::rng().random_range(min..max).to_string()
}

// ---------------------------------------------------------------------------
// Password-reset tokens
// ---------------------------------------------------------------------------

/// The result of generating a new password-reset token.
pub struct GeneratedResetToken {
    /// The plaintext token (embedded in the emailed link, never stored).
    pub plaintext: String,
    /// The SHA-256 hex digest of the plaintext (stored in the database).
    pub hash: String,
}

/// Generate a new random password-reset token.
///
/// Returns the plaintext (sent to the user exactly once) and its SHA-256
/// digest (for storage). The plaintext must never be persisted.
pub fn generate_reset_token() -> GeneratedResetToken {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    rand::rng().fill(&mut bytes);

    let plaintext: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    let hash = hash_reset_token(&plaintext);

    GeneratedResetToken { plaintext, hash }
}

/// Compute the stored digest of a presented reset token.
///
/// Used both during issuance (to store the digest) and during consumption
/// (to look the token up by digest).
pub fn hash_reset_token(token: &str) -> String {
    sha256_hex(token.as_bytes())
}
