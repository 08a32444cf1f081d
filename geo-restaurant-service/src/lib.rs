use std::sync::Arc;

use diesel::{Connection, PgConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::info;

pub mod config;
pub mod error;
pub mod geometry;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod schema;
pub mod serializer;

use config::{DatabaseConfig, ServeConfig};
use handlers::AppState;
use repository::{build_pool, PgRestaurantRepository};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

pub fn run_migrations(config: &DatabaseConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = PgConnection::establish(&config.database_url)?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    for version in &applied {
        info!(%version, "migration applied");
    }
    Ok(())
}

pub async fn serve(config: ServeConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let database = config.database.clone();
    tokio::task::spawn_blocking(move || run_migrations(&database)).await??;

    let pool = build_pool(&config.database.database_url, config.database.pool_size)?;
    let state = AppState {
        repository: Arc::new(PgRestaurantRepository::new(pool)),
        admin_credentials: config.admin_credentials().map(Arc::new),
    };
    let app = handlers::app(state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!("Geo restaurant service listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
