//! Access token generation
//!
//! Tokens are opaque random strings; the data layer stores only their
//! sha256 digest. Used by the provisioning path and by tests.

use rand::Rng;
use rand::distributions::Alphanumeric;

/// Token length in characters (~256 bits of entropy)
const ACCESS_TOKEN_LENGTH: usize = 43;

/// Generate a new opaque access token
pub fn generate_access_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ACCESS_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}
