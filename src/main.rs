use std::sync::Arc;

use tracing::{error, info};

use tokengate::{ensure_admin, AppState, Config, SqliteIdentityStore, WebServer};

#[tokio::main]
async fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    // Load configuration
    let config = match Config::load_with_env(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {path}: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = tokengate::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        tokengate::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = run(config).await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> tokengate::Result<()> {
    config.validate()?;
    info!("tokengate starting");

    let store = Arc::new(SqliteIdentityStore::connect(&config.database.url).await?);
    let state = AppState::from_config(&config, store.clone())?;

    ensure_admin(store.as_ref(), &state.hasher, &config.admin)
        .await
        .map_err(|e| tokengate::TokengateError::Config(format!("admin bootstrap failed: {e}")))?;

    info!(
        "Server configured on {}:{}",
        config.server.host, config.server.port
    );
    WebServer::new(&config.server, state)?.run().await
}
