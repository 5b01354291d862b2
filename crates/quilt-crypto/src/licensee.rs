//! Iterated licensee-proof computation.
//!
//! The cloud issues an opaque challenge and an iteration count; the
//! device proves possession of the licensee secret by returning
//! `h_{n-1}` where `h_0 = HMAC-SHA256(key, challenge)` and
//! `h_i = HMAC-SHA256(key, h_{i-1})`. The key is the base64-decoded
//! secret and stays constant throughout; only the message changes.

use data_encoding::BASE64;

use crate::CryptoError;
use crate::hmac::hmac_sha256;

/// Compute the licensee proof for a server-issued challenge.
///
/// `iterations` is the total number of HMAC applications, so a count of
/// exactly 1 short-circuits to `HMAC-SHA256(key, challenge)` with no
/// further hashing. Deterministic and side-effect-free.
pub fn licensee_proof(
    challenge: &[u8],
    iterations: u32,
    secret: &str,
) -> Result<[u8; 32], CryptoError> {
    if challenge.is_empty() {
        return Err(CryptoError::EmptyChallenge);
    }
    if secret.is_empty() {
        return Err(CryptoError::EmptySecret);
    }
    if iterations == 0 {
        return Err(CryptoError::ZeroIterations);
    }

    let key = BASE64
        .decode(secret.as_bytes())
        .map_err(|_| CryptoError::InvalidSecretEncoding)?;

    let mut hash = hmac_sha256(&key, challenge);
    for _ in 1..iterations {
        hash = hmac_sha256(&key, &hash);
    }
    Ok(hash)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn recurrence_law(
            challenge in proptest::collection::vec(any::<u8>(), 1..64),
            key in proptest::collection::vec(any::<u8>(), 1..48),
            n in 2..16u32,
        ) {
            let secret = BASE64.encode(&key);
            let prev = licensee_proof(&challenge, n - 1, &secret).unwrap();
            let next = licensee_proof(&challenge, n, &secret).unwrap();
            prop_assert_eq!(next, hmac_sha256(&key, &prev));
        }
    }
}
