//! Core identifiers, constants, and runtime utilities for the gym backend.
//!
//! This crate provides the foundational types and configuration defaults
//! used throughout the workspace.

// ============================================================================
// TRAITS
// ============================================================================
/// Unique identifier trait for domain entities.
pub trait Unique<T = Self> {
    fn id(&self) -> ID<T>;
}

// ============================================================================
// IDENTITY TYPES
// ============================================================================
use std::cmp::Ordering;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;
use std::time::Duration;

/// Generic ID wrapper providing compile-time type safety over uuid::Uuid.
pub struct ID<T> {
    inner: uuid::Uuid,
    marker: PhantomData<T>,
}

impl<T> ID<T> {
    pub fn inner(&self) -> uuid::Uuid {
        self.inner
    }
}

impl<T> From<ID<T>> for uuid::Uuid {
    fn from(id: ID<T>) -> Self {
        id.inner()
    }
}
impl<T> From<uuid::Uuid> for ID<T> {
    fn from(inner: uuid::Uuid) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }
}

impl<T> std::str::FromStr for ID<T> {
    type Err = uuid::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s).map(Self::from)
    }
}

impl<T> Default for ID<T> {
    fn default() -> Self {
        Self {
            inner: uuid::Uuid::now_v7(),
            marker: PhantomData,
        }
    }
}

impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Eq for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Hash for ID<T> {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.inner.hash(state);
    }
}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ID").field(&self.inner).finish()
    }
}
impl<T> Display for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

// ============================================================================
// CREDENTIALS
// ============================================================================
/// Shortest accepted plaintext password, in characters.
pub const PASSWORD_MIN_LENGTH: usize = 6;
/// Argon2 iteration count (time cost) unless overridden by HASH_COST.
pub const HASH_COST: u32 = 2;
/// Argon2 memory cost in KiB unless overridden by HASH_MEMORY.
pub const HASH_MEMORY: u32 = 19 * 1024;

// ============================================================================
// TOKENS
// Access tokens ride in Authorization headers; refresh tokens mint new ones.
// ============================================================================
/// Access token lifetime unless overridden by ACCESS_TTL.
pub const ACCESS_TTL: Duration = Duration::from_secs(10 * 60);
/// Refresh token lifetime unless overridden by REFRESH_TTL.
pub const REFRESH_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);
/// Longest lifetime configuration may give either token.
pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "server")]
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Register Ctrl+C handler for immediate (non-graceful) termination.
#[cfg(feature = "server")]
pub fn kys() {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!();
            log::warn!("violent interrupt received, exiting immediately");
            std::process::exit(0);
        }
    });
}

/// Parse duration string like "30s", "5m", "2h", "1d" into Duration.
/// Unknown units and values that overflow `u64` seconds are `None`.
pub fn duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    let (at, unit) = s.char_indices().last()?;
    let value: u64 = s[..at].parse().ok()?;
    let scale = match unit {
        's' => 1,
        'm' => 60,
        'h' => 3600,
        'd' => 86400,
        _ => return None,
    };
    value.checked_mul(scale).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Thing;

    #[test]
    fn durations_parse_every_unit() {
        assert_eq!(duration("30s"), Some(Duration::from_secs(30)));
        assert_eq!(duration("10m"), Some(Duration::from_secs(600)));
        assert_eq!(duration("2h"), Some(Duration::from_secs(7200)));
        assert_eq!(duration(" 7d "), Some(REFRESH_TTL));
    }

    #[test]
    fn durations_reject_garbage() {
        assert_eq!(duration(""), None);
        assert_eq!(duration("m"), None);
        assert_eq!(duration("10"), None);
        assert_eq!(duration("10w"), None);
        assert_eq!(duration("-1s"), None);
    }

    #[test]
    fn durations_survive_multibyte_units() {
        assert_eq!(duration("10µ"), None);
        assert_eq!(duration("µ"), None);
        assert_eq!(duration("1µs"), None);
    }

    #[test]
    fn durations_reject_overflow() {
        assert_eq!(duration("213503982334602d"), None);
        assert_eq!(duration("18446744073709551616s"), None);
        assert_eq!(duration("18446744073709551615s"), Some(Duration::from_secs(u64::MAX)));
    }

    #[test]
    fn ids_roundtrip_through_strings() {
        let id = ID::<Thing>::default();
        let parsed = id.to_string().parse::<ID<Thing>>().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<ID<Thing>>().is_err());
    }

    #[test]
    fn ids_are_distinct() {
        assert_ne!(ID::<Thing>::default(), ID::<Thing>::default());
    }
}
