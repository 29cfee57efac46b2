// shared/src/lib.rs

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid cache id: {0:?}")]
    InvalidCacheId(String),
    #[error("timed out after {timeout_ms}ms waiting for lock on key {key} in cache '{cache}'")]
    LockTimeout {
        cache: String,
        key: String,
        timeout_ms: u64,
    },
    /// Some staging caches failed to commit. The ones listed in `committed`
    /// were applied to their underlying cache; the others were not.
    #[error(
        "commit incomplete: {} cache(s) failed ({}), {} committed",
        .failed.len(),
        failed_names(.failed),
        .committed.len()
    )]
    PartialCommit {
        committed: Vec<String>,
        failed: Vec<(String, Error)>,
    },
    #[error("internal: {0}")]
    Internal(String),
}

fn failed_names(failed: &[(String, Error)]) -> String {
    failed
        .iter()
        .map(|(name, err)| format!("{name}: {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod config;
