use super::*;
use anyhow::Context;
use std::time::Duration;

/// Signing material, either a shared HMAC secret or a PEM key pair.
pub enum Keys {
    Secret(String),
    Pair { private: String, public: String },
}

/// Auth settings read once at start-up and immutable afterwards.
///
/// | variable          | default        |
/// |-------------------|----------------|
/// | `JWT_SECRET`      | required, unless both PEM keys are set |
/// | `JWT_PRIVATE_KEY` | unset          |
/// | `JWT_PUBLIC_KEY`  | unset          |
/// | `ACCESS_TTL`      | `10m`          |
/// | `REFRESH_TTL`     | `7d`           |
/// | `HASH_COST`       | `2`            |
/// | `HASH_MEMORY`     | `19456` (KiB)  |
pub struct Config {
    pub keys: Keys,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub hash_cost: u32,
    pub hash_memory: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let keys = match (var("JWT_PRIVATE_KEY"), var("JWT_PUBLIC_KEY"), var("JWT_SECRET")) {
            (Some(private), Some(public), _) => Keys::Pair { private, public },
            (None, None, Some(secret)) if !secret.is_empty() => Keys::Secret(secret),
            (Some(_), None, _) | (None, Some(_), _) => {
                anyhow::bail!("JWT_PRIVATE_KEY and JWT_PUBLIC_KEY must be set together")
            }
            _ => anyhow::bail!("JWT_SECRET must be set"),
        };
        let ttl = |key: &str, default: Duration| -> anyhow::Result<Duration> {
            let ttl = match var(key) {
                Some(s) => gym_core::duration(&s).with_context(|| format!("{} is not a duration: {}", key, s))?,
                None => default,
            };
            anyhow::ensure!(
                !ttl.is_zero() && ttl <= gym_core::MAX_TTL,
                "{} must be between 1s and {}d",
                key,
                gym_core::MAX_TTL.as_secs() / 86400
            );
            Ok(ttl)
        };
        let int = |key: &str, default: u32| match var(key) {
            Some(s) => s.trim().parse::<u32>().with_context(|| format!("{} is not an integer: {}", key, s)),
            None => Ok(default),
        };
        Ok(Self {
            keys,
            access_ttl: ttl("ACCESS_TTL", gym_core::ACCESS_TTL)?,
            refresh_ttl: ttl("REFRESH_TTL", gym_core::REFRESH_TTL)?,
            hash_cost: int("HASH_COST", gym_core::HASH_COST)?,
            hash_memory: int("HASH_MEMORY", gym_core::HASH_MEMORY)?,
        })
    }

    pub fn crypto(&self) -> anyhow::Result<Crypto> {
        let crypto = match &self.keys {
            Keys::Secret(secret) => Crypto::hmac(secret.as_bytes()),
            Keys::Pair { private, public } => Crypto::rsa(private.as_bytes(), public.as_bytes())?,
        };
        Ok(crypto.with_ttl(self.access_ttl, self.refresh_ttl))
    }

    pub fn hasher(&self) -> anyhow::Result<Hasher> {
        Ok(Hasher::new(self.hash_memory, self.hash_cost)?)
    }
}
