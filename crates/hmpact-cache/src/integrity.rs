use std::{fmt, str::FromStr};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::CacheError;

const ALGORITHM: &str = "sha256";

/// Subresource-integrity style token (`sha256-<base64>`) for a blob.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Integrity {
    digest: [u8; 32],
}

impl Integrity {
    #[must_use]
    pub fn of(bytes: &[u8]) -> Self {
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&Sha256::digest(bytes));
        Self { digest }
    }

    /// Lowercase hex digest, used for content paths.
    #[must_use]
    pub fn hex(&self) -> String {
        hex::encode(self.digest)
    }

    #[must_use]
    pub fn matches(&self, bytes: &[u8]) -> bool {
        Self::of(bytes) == *self
    }
}

impl fmt::Display for Integrity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ALGORITHM}-{}", STANDARD.encode(self.digest))
    }
}

impl FromStr for Integrity {
    type Err = CacheError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let invalid = || CacheError::InvalidIntegrity(token.to_string());
        let encoded = token
            .strip_prefix(ALGORITHM)
            .and_then(|rest| rest.strip_prefix('-'))
            .ok_or_else(invalid)?;
        let decoded = STANDARD.decode(encoded).map_err(|_| invalid())?;
        let digest: [u8; 32] = decoded.try_into().map_err(|_| invalid())?;
        Ok(Self { digest })
    }
}

impl TryFrom<String> for Integrity {
    type Error = CacheError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Integrity> for String {
    fn from(value: Integrity) -> Self {
        value.to_string()
    }
}

/// Hex SHA-256 of a cache key; keys of any shape map to a safe file name.
pub(crate) fn key_digest(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}
