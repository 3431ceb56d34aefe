//! Random admin tokens.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use domains::{DomainError, Result, TokenGenerator};

/// 32 bytes from the OS RNG, base64url without padding (43 characters).
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokenGenerator;

impl RandomTokenGenerator {
    const TOKEN_BYTES: usize = 32;
}

impl TokenGenerator for RandomTokenGenerator {
    fn generate(&self) -> Result<String> {
        let mut bytes = [0u8; Self::TOKEN_BYTES];
        getrandom::getrandom(&mut bytes)
            .map_err(|e| DomainError::Storage(format!("os rng unavailable: {e}")))?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }
}
