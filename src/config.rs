use clap::{Args, Parser, ValueEnum};
use std::path::PathBuf;

/// Upper bound for day-denominated windows, keeping `now - window` inside the representable date range.
pub const MAX_WINDOW_DAYS: i64 = 36_500;

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[command(flatten)]
    pub database: DatabaseConfig,

    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,

    #[command(flatten)]
    pub push: PushConfig,

    #[command(flatten)]
    pub cleanup: CleanupConfig,

    #[command(flatten)]
    pub stats: StatsConfig,

    #[command(flatten)]
    pub health: HealthConfig,
}

#[derive(Clone, Debug, Args)]
pub struct DatabaseConfig {
    /// Database connection URL. Tokens and broadcast history are kept in memory when unset
    #[arg(long = "database-url", env = "APPCAST_DATABASE_URL")]
    pub url: Option<String>,

    /// Maximum number of pooled connections
    #[arg(long = "db-max-connections", env = "APPCAST_DB_MAX_CONNECTIONS", default_value_t = 10)]
    pub max_connections: u32,

    /// Minimum number of idle connections kept open
    #[arg(long = "db-min-connections", env = "APPCAST_DB_MIN_CONNECTIONS", default_value_t = 1)]
    pub min_connections: u32,

    /// How long to wait for a free connection
    #[arg(long = "db-acquire-timeout-secs", env = "APPCAST_DB_ACQUIRE_TIMEOUT_SECS", default_value_t = 5)]
    pub acquire_timeout_secs: u64,

    /// How long a connection may sit idle before being closed
    #[arg(long = "db-idle-timeout-secs", env = "APPCAST_DB_IDLE_TIMEOUT_SECS", default_value_t = 600)]
    pub idle_timeout_secs: u64,

    /// Maximum lifetime of a single connection
    #[arg(long = "db-max-lifetime-secs", env = "APPCAST_DB_MAX_LIFETIME_SECS", default_value_t = 1800)]
    pub max_lifetime_secs: u64,

    /// How many times to retry the initial connection at startup
    #[arg(long = "db-connect-retries", env = "APPCAST_DB_CONNECT_RETRIES", default_value_t = 5)]
    pub connect_retries: usize,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "APPCAST_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port for the public API
    #[arg(long, env = "APPCAST_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Port for health probes and scheduled job triggers
    #[arg(long, env = "APPCAST_MGMT_PORT", default_value_t = 9090)]
    pub mgmt_port: u16,

    /// How long to wait for background tasks after a shutdown signal
    #[arg(long, env = "APPCAST_SHUTDOWN_TIMEOUT_SECS", default_value_t = 10)]
    pub shutdown_timeout_secs: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// OTLP gRPC endpoint for traces, metrics and logs
    #[arg(long, env = "APPCAST_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,

    /// Log output format
    #[arg(long, env = "APPCAST_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum PushProviderKind {
    /// Firebase Cloud Messaging HTTP v1
    Fcm,
    /// Log every send and report it delivered
    #[default]
    Log,
}

#[derive(Clone, Debug, Args)]
pub struct PushConfig {
    /// Which push provider delivers notifications
    #[arg(long = "push-provider", env = "APPCAST_PUSH_PROVIDER", value_enum, default_value_t = PushProviderKind::Log)]
    pub provider: PushProviderKind,

    /// Firebase project id
    #[arg(long, env = "APPCAST_FCM_PROJECT_ID")]
    pub fcm_project_id: Option<String>,

    /// Path to the Firebase service account key (JSON)
    #[arg(long, env = "APPCAST_FCM_CREDENTIALS_FILE")]
    pub fcm_credentials_file: Option<PathBuf>,

    /// Maximum number of in-flight provider requests during a broadcast
    #[arg(long = "push-concurrency", env = "APPCAST_PUSH_CONCURRENCY", default_value_t = 16)]
    pub concurrency: usize,

    /// Timeout for a single provider request
    #[arg(long = "push-timeout-secs", env = "APPCAST_PUSH_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,
}

#[derive(Clone, Debug, Args)]
pub struct CleanupConfig {
    /// How often the stale token cleanup runs (0 disables the in-process schedule)
    #[arg(long = "cleanup-interval-secs", env = "APPCAST_CLEANUP_INTERVAL_SECS", default_value_t = 86_400)]
    pub interval_secs: u64,

    /// Tokens registered longer ago than this are deleted
    #[arg(
        long = "token-retention-days",
        env = "APPCAST_TOKEN_RETENTION_DAYS",
        default_value_t = 90,
        value_parser = clap::value_parser!(u32).range(1..=MAX_WINDOW_DAYS)
    )]
    pub retention_days: u32,
}

#[derive(Clone, Debug, Args)]
pub struct StatsConfig {
    /// Trailing window summarised by the stats endpoint
    #[arg(
        long = "stats-window-days",
        env = "APPCAST_STATS_WINDOW_DAYS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u32).range(1..=MAX_WINDOW_DAYS)
    )]
    pub window_days: u32,
}

#[derive(Clone, Debug, Args)]
pub struct HealthConfig {
    /// Timeout for the token store readiness check
    #[arg(long = "health-store-timeout-ms", env = "APPCAST_HEALTH_STORE_TIMEOUT_MS", default_value_t = 2000)]
    pub store_timeout_ms: u64,
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        Self::parse()
    }
}
