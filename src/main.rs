//! Factory Management API server binary

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use factory_api::config::{LogFormat, LogTarget};
use factory_api::middleware::rate_limit::spawn_rate_limit_cleanup;
use factory_api::services::AuthService;
use factory_api::utils::error::set_debug_traces;
use factory_api::{db, AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return Ok(());
    }

    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        println!("factory-api {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Load configuration first so logging can follow the configured format
    let config = AppConfig::load().context("Failed to load configuration")?;

    // The guard must be kept alive so file logs are flushed on shutdown
    let _log_guard = init_logging(&config);

    info!("Factory Management API starting up");
    set_debug_traces(config.debug);
    if config.debug {
        info!("debug mode enabled, error responses will carry traces");
    }

    let db = db::init_pool(&config.database)
        .await
        .context("Failed to initialize database")?;

    AuthService::new(db.clone())
        .ensure_bootstrap_admin(config.auth.bootstrap_admin_password.as_deref())
        .await
        .context("Failed to seed bootstrap admin")?;

    let state = AppState::new(config.clone(), db);

    // Background maintenance: stale rate-limit buckets and expired cache entries
    let cleanup_interval = Duration::from_secs(config.rate_limit.read.window_secs.max(60));
    spawn_rate_limit_cleanup(state.read_limiter.clone(), cleanup_interval);
    spawn_rate_limit_cleanup(state.write_limiter.clone(), cleanup_interval);
    spawn_rate_limit_cleanup(state.auth_limiter.clone(), cleanup_interval);
    state
        .response_cache
        .spawn_eviction(config.cache.eviction_interval_secs);

    let app = factory_api::router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}

fn print_help() {
    println!("factory-api {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("USAGE:");
    println!("    factory-api [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print this help message");
    println!("    -V, --version    Print version information");
    println!();
    println!("ENVIRONMENT:");
    println!("    FACTORY_CONFIG   Path to the configuration file");
    println!("    JWT_SECRET       Token signing secret (required, min 32 chars)");
    println!("    DATABASE_URL     SQLite database URL");
    println!("    RUST_LOG         Log filter, e.g. info or factory_api=debug");
}

fn init_logging(config: &AppConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{prelude::*, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let log_config = &config.logging;

    match log_config.target {
        LogTarget::Console => {
            let subscriber = tracing_subscriber::registry().with(env_filter);
            init_console_logging(subscriber, &log_config.format);
            None
        }
        LogTarget::File => {
            let (writer, guard) = create_file_writer(log_config);
            let subscriber = tracing_subscriber::registry().with(env_filter);
            subscriber
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(writer)
                        .with_ansi(false),
                )
                .init();
            Some(guard)
        }
        LogTarget::Both => {
            let (writer, guard) = create_file_writer(log_config);
            let subscriber = tracing_subscriber::registry().with(env_filter).with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_ansi(false),
            );
            init_console_logging(subscriber, &log_config.format);
            Some(guard)
        }
    }
}

fn create_file_writer(
    log_config: &factory_api::config::LoggingConfig,
) -> (
    tracing_appender::non_blocking::NonBlocking,
    tracing_appender::non_blocking::WorkerGuard,
) {
    if let Err(e) = std::fs::create_dir_all(&log_config.log_dir) {
        eprintln!(
            "Warning: Failed to create log directory {:?}: {}",
            log_config.log_dir, e
        );
    }

    let file_appender = if log_config.daily_rotation {
        tracing_appender::rolling::daily(&log_config.log_dir, &log_config.log_prefix)
    } else {
        tracing_appender::rolling::never(&log_config.log_dir, &log_config.log_prefix)
    };

    tracing_appender::non_blocking(file_appender)
}

fn init_console_logging<S>(subscriber: S, format: &LogFormat)
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + Send + Sync,
{
    use tracing_subscriber::{fmt, prelude::*};

    match format {
        LogFormat::Json => {
            subscriber
                .with(fmt::layer().json().with_target(true))
                .init();
        }
        LogFormat::Compact => {
            subscriber
                .with(fmt::layer().compact().with_target(false))
                .init();
        }
        LogFormat::Pretty => {
            subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false),
                )
                .init();
        }
    }
}
