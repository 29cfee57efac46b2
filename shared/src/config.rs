use tracing::warn;

/// Which underlying cache implementation backs a named cache
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Memory, // dashmap, unbounded
    Moka,   // moka::future, optional capacity + TTL
    Foyer,  // foyer in-memory, capacity in entries
}

impl StoreBackend {
    pub fn as_str(&self) -> &str {
        match self {
            StoreBackend::Memory => "memory",
            StoreBackend::Moka => "moka",
            StoreBackend::Foyer => "foyer",
        }
    }
}

impl TryFrom<&str> for StoreBackend {
    type Error = &'static str;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "moka" => Ok(StoreBackend::Moka),
            "foyer" => Ok(StoreBackend::Foyer),
            _ => Err("Invalid store backend value"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub backend: StoreBackend,
    pub max_entries: Option<u64>,
    pub default_ttl_ms: Option<u64>,
    pub blocking: bool,
    pub lock_timeout_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Self::DEFAULT_BACKEND,
            max_entries: None,
            default_ttl_ms: None,
            blocking: false,
            lock_timeout_ms: None,
        }
    }
}

impl Config {
    const DEFAULT_BACKEND: StoreBackend = StoreBackend::Moka;

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source. Unparseable values
    /// fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let backend = match lookup("TXCACHE_BACKEND") {
            Some(raw) => StoreBackend::try_from(raw.as_str()).unwrap_or_else(|_| {
                warn!(
                    "TXCACHE_BACKEND '{}' not recognised, using '{}'",
                    raw,
                    Self::DEFAULT_BACKEND.as_str()
                );
                Self::DEFAULT_BACKEND
            }),
            None => Self::DEFAULT_BACKEND,
        };

        let blocking = match lookup("TXCACHE_BLOCKING") {
            Some(raw) => raw.trim().parse::<bool>().unwrap_or_else(|_| {
                warn!("TXCACHE_BLOCKING '{}' is not a boolean, using false", raw);
                false
            }),
            None => false,
        };

        Self {
            backend,
            max_entries: parse_u64(&lookup, "TXCACHE_MAX_ENTRIES"),
            default_ttl_ms: parse_u64(&lookup, "TXCACHE_DEFAULT_TTL_MS"),
            blocking,
            lock_timeout_ms: parse_u64(&lookup, "TXCACHE_LOCK_TIMEOUT_MS"),
        }
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<u64> {
    let raw = lookup(name)?;
    match raw.trim().parse::<u64>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("{} '{}' is not a number, ignoring", name, raw);
            None
        }
    }
}
