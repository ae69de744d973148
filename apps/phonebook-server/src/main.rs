use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use phonebook_api::{build_router, AppState};
use phonebook_core::repositories::{CompositeWriter, DepartmentRepository, ServiceRepository, WorkerRepository};
use phonebook_core::services::{CredentialResolver, DepartmentService, EmergencyListing, WorkerService};
use phonebook_core::TenantRouter;
use phonebook_infrastructure::{
    create_pool, HttpIdentityClient, MemoryDirectory, PgCompositeWriter, PgDepartmentRepository,
    PgServiceRepository, PgWorkerRepository,
};
use phonebook_security::JwtService;
use phonebook_shared::config::{AppConfig, DatabaseSettings};

const MEMORY_URL: &str = "memory://";

struct Stores {
    workers: Arc<dyn WorkerRepository>,
    departments: Arc<dyn DepartmentRepository>,
    services: Arc<dyn ServiceRepository>,
    writer: Arc<dyn CompositeWriter>,
}

async fn open_stores(settings: &DatabaseSettings) -> anyhow::Result<Stores> {
    if settings.url == MEMORY_URL {
        warn!("using in-memory storage, data is lost on exit");
        let store = Arc::new(MemoryDirectory::new());
        return Ok(Stores {
            workers: store.clone(),
            departments: store.clone(),
            services: store.clone(),
            writer: store,
        });
    }

    let pool = create_pool(settings).await.context("failed to connect to database")?;
    Ok(Stores {
        workers: Arc::new(PgWorkerRepository::new(pool.clone())),
        departments: Arc::new(PgDepartmentRepository::new(pool.clone())),
        services: Arc::new(PgServiceRepository::new(pool.clone())),
        writer: Arc::new(PgCompositeWriter::new(pool)),
    })
}

async fn shutdown_signal(token: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutdown requested, cancelling in-flight operations");
    token.cancel();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    let _log_guard = phonebook_shared::telemetry::init_telemetry(&config.logging)?;

    info!(name = %config.app.name, env = %config.app.env, "phonebook server starting");

    let router = Arc::new(TenantRouter::new(&config.tenants).context("invalid tenant configuration")?);
    let stores = open_stores(&config.database).await?;
    let identity = HttpIdentityClient::new(&config.identity).context("failed to build identity client")?;
    let resolver = CredentialResolver::new(
        Arc::new(JwtService::new(&config.jwt.secret)),
        Arc::new(identity),
    );

    let shutdown = CancellationToken::new();
    let state = AppState {
        workers: Arc::new(WorkerService::new(router.clone(), stores.workers, stores.writer.clone())),
        departments: Arc::new(DepartmentService::new(router.clone(), stores.departments, stores.writer)),
        emergency: Arc::new(EmergencyListing::new(stores.services)),
        resolver: Arc::new(resolver),
        deadline: config.requests.deadline_ms.map(Duration::from_millis),
        shutdown: shutdown.clone(),
    };
    let app = build_router(state);

    let tenants: Vec<String> = router.partitions().iter().map(|p| p.schema().to_string()).collect();
    info!(?tenants, "tenant partitions loaded");

    let host: std::net::IpAddr = config.app.host.parse().context("invalid app.host")?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    info!("server stopped");
    Ok(())
}
