use shared::Error;
use shared::config::StoreBackend;
use std::sync::Arc;
use storage_engine::UnifiedStorageFactory;
use txcache::{CacheCoordinator, CacheConfig, CacheStore, CachedValue, StorageFactory};

type Store = Arc<dyn CacheStore<String, String>>;
type Session = CacheCoordinator<String, String>;

fn key(s: &str) -> String {
    s.to_string()
}

fn value(s: &str) -> CachedValue<String> {
    CachedValue::Value(s.to_string())
}

fn shared_cache(name: &str, backend: StoreBackend, blocking: bool) -> Store {
    let mut config = CacheConfig::new(name, backend);
    config.blocking = blocking;
    config.lock_timeout_ms = Some(50);
    UnifiedStorageFactory.create_from_config(&config).unwrap()
}

#[tokio::test]
async fn committed_entries_become_visible_to_later_sessions() {
    for backend in [StoreBackend::Memory, StoreBackend::Moka, StoreBackend::Foyer] {
        let departments = shared_cache("departments", backend, false);

        let mut first = Session::new();
        assert_eq!(first.get(&departments, &key("d1")).await.unwrap(), None);
        first.put(&departments, key("d1"), value("Research")).unwrap();
        // Still a miss inside the same session
        assert_eq!(first.get(&departments, &key("d1")).await.unwrap(), None);

        let mut second = Session::new();
        assert_eq!(second.get(&departments, &key("d1")).await.unwrap(), None);

        // On a non-blocking cache rollback's unlock is a real remove, so the
        // reader finishes before the writer commits
        second.rollback().await;
        first.commit().await.unwrap();

        let mut third = Session::new();
        assert_eq!(
            third.get(&departments, &key("d1")).await.unwrap(),
            Some(value("Research")),
            "backend {}",
            backend.as_str()
        );
        third.commit().await.unwrap();
    }
}

#[tokio::test]
async fn rolled_back_entries_never_reach_the_shared_cache() {
    let departments = shared_cache("departments", StoreBackend::Memory, false);

    let mut session = Session::new();
    session.put(&departments, key("d1"), value("Research")).unwrap();
    session.rollback().await;

    assert_eq!(departments.get(&key("d1")).await.unwrap(), None);
    assert_eq!(departments.size(), 0);
}

#[tokio::test]
async fn blocking_miss_is_resolved_by_null_stamp_on_commit() {
    let departments = shared_cache("departments", StoreBackend::Memory, true);

    let mut loader = Session::new();
    assert_eq!(loader.get(&departments, &key("d404")).await.unwrap(), None);

    let mut reader = Session::new();
    let err = reader.get(&departments, &key("d404")).await.unwrap_err();
    assert!(matches!(err, Error::LockTimeout { .. }));

    // The query found nothing and the loader never put a value
    loader.commit().await.unwrap();

    assert_eq!(
        reader.get(&departments, &key("d404")).await.unwrap(),
        Some(CachedValue::Null)
    );
    reader.commit().await.unwrap();
}

#[tokio::test]
async fn blocking_miss_is_released_by_rollback() {
    let departments = shared_cache("departments", StoreBackend::Moka, true);

    let mut failed = Session::new();
    assert_eq!(failed.get(&departments, &key("d1")).await.unwrap(), None);
    failed.put(&departments, key("d1"), value("half-loaded")).unwrap();
    failed.rollback().await;

    let mut retry = Session::new();
    assert_eq!(retry.get(&departments, &key("d1")).await.unwrap(), None);
    retry.put(&departments, key("d1"), value("Research")).unwrap();
    retry.commit().await.unwrap();

    assert_eq!(
        departments.get(&key("d1")).await.unwrap(),
        Some(value("Research"))
    );
}

#[tokio::test]
async fn one_session_spans_several_caches() {
    let users = shared_cache("users", StoreBackend::Memory, true);
    let departments = shared_cache("departments", StoreBackend::Foyer, false);

    let mut session = Session::new();
    assert_eq!(session.get(&users, &key("u1")).await.unwrap(), None);
    session.put(&users, key("u1"), value("Ada")).unwrap();
    session.clear(&departments).unwrap();
    session.put(&departments, key("d1"), value("Research")).unwrap();
    assert_eq!(session.len(), 2);

    session.commit().await.unwrap();

    assert_eq!(users.get(&key("u1")).await.unwrap(), Some(value("Ada")));
    assert_eq!(
        departments.get(&key("d1")).await.unwrap(),
        Some(value("Research"))
    );
}
