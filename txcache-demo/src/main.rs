use shared::config::Config;
use std::collections::HashMap;
use std::sync::Arc;
use storage_engine::UnifiedStorageFactory;
use tracing::info;
use tracing_subscriber::EnvFilter;
use txcache::{CacheConfig, CacheCoordinator, CacheStore, CachedValue, StorageFactory};

type Department = String;
type DepartmentCache = Arc<dyn CacheStore<String, Department>>;

/// Stand-in for the database behind the cache
struct DepartmentTable {
    rows: HashMap<String, Department>,
}

impl DepartmentTable {
    fn find_by_id(&self, id: &str) -> Option<Department> {
        info!("SELECT * FROM department WHERE id = '{}'", id);
        self.rows.get(id).cloned()
    }
}

/// Read-through lookup: cache first, database on a miss, staged write-back
async fn find_department(
    session: &mut CacheCoordinator<String, Department>,
    cache: &DepartmentCache,
    table: &DepartmentTable,
    id: &str,
) -> shared::Result<Option<Department>> {
    let key = id.to_string();
    if let Some(cached) = session.get(cache, &key).await? {
        info!("cache hit for department '{}'", id);
        return Ok(cached.into_value());
    }

    let row = table.find_by_id(id);
    session.put(cache, key, CachedValue::from(row.clone()))?;
    Ok(row)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load environment variables
    match dotenvy::dotenv() {
        Ok(_) => info!("Loaded environment variables from .env file"),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    let config = Config::from_env();
    info!("Starting txcache demo with {:?}", config);

    let cache: DepartmentCache = UnifiedStorageFactory
        .create_from_config(&CacheConfig::with_defaults("DepartmentMapper", &config))?;
    let table = DepartmentTable {
        rows: HashMap::from([("d-18ec".to_string(), "Research".to_string())]),
    };

    info!("==> session 1: load a department, then commit");
    let mut session = CacheCoordinator::new();
    let first = find_department(&mut session, &cache, &table, "d-18ec").await?;
    info!(
        "before commit cache '{}' holds ~{} entries",
        cache.id(),
        cache.size()
    );
    session.commit().await?;
    info!(
        "after commit cache '{}' holds ~{} entries",
        cache.id(),
        cache.size()
    );

    info!("==> session 2: served from the shared cache");
    let mut session = CacheCoordinator::new();
    let second = find_department(&mut session, &cache, &table, "d-18ec").await?;
    info!("first == second: {}", first == second);
    session.commit().await?;

    info!("==> session 3: unknown department, rolled back");
    let mut session = CacheCoordinator::new();
    let missing = find_department(&mut session, &cache, &table, "d-0000").await?;
    info!("unknown department found: {}", missing.is_some());
    session.rollback().await;

    info!("Demo finished");
    Ok(())
}
