//! CSRF token primitives

use rand::RngCore;

/// Number of random bytes behind each token (hex encoded to twice as many characters)
pub const CSRF_TOKEN_BYTES: usize = 32;

/// Generate a fresh CSRF token: 32 random bytes from a CSPRNG, hex encoded
///
/// # Examples
///
/// ```
/// use formwork_core::generate_token;
///
/// let token = generate_token();
/// assert_eq!(token.len(), 64);
/// assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
pub fn generate_token() -> String {
	let mut random_bytes = [0u8; CSRF_TOKEN_BYTES];
	rand::thread_rng().fill_bytes(&mut random_bytes);
	hex::encode(random_bytes)
}

/// Constant-time comparison of two secrets.
///
/// Both inputs are hashed with SHA-256 first so the comparison does not leak
/// the length of either side through timing.
///
/// # Examples
///
/// ```
/// use formwork_core::constant_time_eq;
///
/// assert!(constant_time_eq(b"abc", b"abc"));
/// assert!(!constant_time_eq(b"abc", b"abd"));
/// assert!(!constant_time_eq(b"abc", b"abcd"));
/// ```
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
	use sha2::{Digest, Sha256};
	use subtle::ConstantTimeEq;

	let hash_a = Sha256::digest(a);
	let hash_b = Sha256::digest(b);
	hash_a.ct_eq(&hash_b).into()
}
