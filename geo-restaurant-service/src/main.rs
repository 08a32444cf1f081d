use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use geo_restaurant_service::config::{DatabaseConfig, ServeConfig};

#[derive(Parser)]
#[command(version, about = "Restaurants with MultiPoint locations over a GeoJSON REST API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations, then serve the API and admin screens
    Serve(ServeConfig),
    /// Apply pending migrations and exit
    Migrate(DatabaseConfig),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(config) => geo_restaurant_service::serve(config).await,
        Commands::Migrate(config) => {
            tokio::task::spawn_blocking(move || geo_restaurant_service::run_migrations(&config))
                .await?
        }
    }
}
