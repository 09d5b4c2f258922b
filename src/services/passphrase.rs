use crate::domain::constants::PASSPHRASE_BYTES;
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;

/// Single-use secret protecting the signing key for one script.
///
/// `Debug` is redacted so the value cannot leak through logs; the plaintext is
/// only reachable through [`Passphrase::expose`].
#[derive(Clone, PartialEq, Eq)]
pub struct Passphrase(String);

impl Passphrase {
    /// Fresh independent draw from the OS CSPRNG, hex encoded.
    pub fn generate() -> Self {
        let mut bytes = [0u8; PASSPHRASE_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Passphrase(<redacted>)")
    }
}
