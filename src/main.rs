//! appredis-check — attaches the Redis extension to an application and
//! pings the configured server.
//!
//! Settings come from `config/default.toml`, the `config/{APP_ENV}.toml`
//! overlay, and `APP_*` environment variables.

use tracing_subscriber::{EnvFilter, fmt};

use appredis_client::{DEFAULT_CONFIG_PREFIX, EXTENSION_KEY, RedisExtension};
use appredis_core::config::logging::LoggingConfig;
use appredis_core::error::AppError;
use appredis_core::{Application, Settings};

#[tokio::main]
async fn main() {
    let settings = match load_settings() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&settings.logging());

    if let Err(e) = run(settings).await {
        tracing::error!("Check failed: {}", e);
        std::process::exit(1);
    }
}

/// Load settings from files and environment
fn load_settings() -> Result<Settings, AppError> {
    let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
    Settings::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(settings: Settings) -> Result<(), AppError> {
    tracing::info!("Starting appredis-check v{}", env!("CARGO_PKG_VERSION"));

    let strict = settings.get_bool("REDIS_STRICT").unwrap_or(false);
    let mut app = Application::new("appredis-check", settings);

    RedisExtension::create(Some(&mut app), strict, DEFAULT_CONFIG_PREFIX)?;

    let redis = app
        .extension::<RedisExtension>(EXTENSION_KEY)
        .ok_or_else(|| AppError::internal("Redis extension was not registered"))?;

    if redis.health_check().await? {
        tracing::info!("Redis responded to PING");
        Ok(())
    } else {
        Err(AppError::connection("Redis did not answer PING with PONG"))
    }
}
