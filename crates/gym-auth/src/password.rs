use super::*;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::PasswordHash;
use argon2::PasswordHasher;
use argon2::PasswordVerifier;
use argon2::Version;
use argon2::password_hash::SaltString;
use gym_core::PASSWORD_MIN_LENGTH;

/// Stored credential: an Argon2 PHC string, never plaintext.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Wraps a hash loaded from storage. No validation happens here,
    /// so this must only ever see values produced by [`Hasher::create`].
    pub fn restore(hash: String) -> Self {
        Self(hash)
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(..)")
    }
}

/// Argon2id hashing with a configurable cost.
///
/// Salts are fresh per call, so hashing the same plaintext twice yields
/// two different credentials that both verify.
pub struct Hasher {
    argon: Argon2<'static>,
    decoy: Password,
}

impl Hasher {
    /// `memory` is in KiB, `iterations` is the Argon2 time cost.
    pub fn new(memory: u32, iterations: u32) -> Result<Self, Failure> {
        let params = Params::new(memory, iterations, Params::DEFAULT_P_COST, None)
            .map_err(Failure::internal)?;
        let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let decoy = hash(&argon, salt()?.as_str())?;
        Ok(Self {
            argon,
            decoy: Password(decoy),
        })
    }

    pub fn create(&self, plaintext: &str) -> Result<Password, Failure> {
        if plaintext.chars().count() < PASSWORD_MIN_LENGTH {
            return Err(Failure::Validation(format!(
                "password must be at least {} characters",
                PASSWORD_MIN_LENGTH
            )));
        }
        hash(&self.argon, plaintext).map(Password)
    }

    /// Salt and cost come from the stored hash, and the digest comparison
    /// is constant-time. An unparseable stored hash is just a mismatch.
    pub fn verify(&self, candidate: &str, password: &Password) -> bool {
        PasswordHash::new(password.as_str())
            .ok()
            .as_ref()
            .map(|hash| {
                self.argon
                    .verify_password(candidate.as_bytes(), hash)
                    .is_ok()
            })
            .unwrap_or(false)
    }

    /// Spends one full verification against a throwaway hash, so callers
    /// that have nothing to compare against take as long as those that do.
    pub fn decoy(&self, candidate: &str) {
        std::hint::black_box(self.verify(candidate, &self.decoy));
    }
}

fn salt() -> Result<SaltString, Failure> {
    use rand::Rng;
    let ref mut bytes = [0u8; 16];
    rand::rng().fill(bytes);
    SaltString::encode_b64(bytes).map_err(Failure::internal)
}

fn hash(argon: &Argon2<'_>, plaintext: &str) -> Result<String, Failure> {
    argon
        .hash_password(plaintext.as_bytes(), &salt()?)
        .map(|h| h.to_string())
        .map_err(Failure::internal)
}
