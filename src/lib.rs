#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod telemetry;
pub mod workers;

use crate::adapters::database::{self, PgBroadcastLog, PgTokenStore};
use crate::adapters::memory::{InMemoryBroadcastLog, InMemoryTokenStore};
use crate::adapters::push::DeliveryGateway;
use crate::adapters::push::fcm::FcmGateway;
use crate::adapters::push::log::LogGateway;
use crate::adapters::store::{BroadcastLog, TokenStore};
use crate::api::{MgmtState, ServiceContainer};
use crate::config::{Config, DatabaseConfig, PushConfig, PushProviderKind};
use crate::services::broadcast::BroadcastEngine;
use crate::services::clock::{Clock, SystemClock};
use crate::services::health_service::HealthService;
use crate::services::notification_service::NotificationService;
use crate::services::push_token_service::PushTokenService;
use crate::services::stats::StatsAggregator;
use crate::services::update_trigger::UpdateTrigger;
use crate::workers::TokenCleanupWorker;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// The persistence pair every service shares.
#[derive(Clone, Debug)]
pub struct Stores {
    pub token_store: Arc<dyn TokenStore>,
    pub broadcast_log: Arc<dyn BroadcastLog>,
}

/// Connects to PostgreSQL and applies migrations when a database URL is configured, otherwise falls back to
/// in-memory stores.
///
/// # Errors
/// Returns an error if the database cannot be reached or a migration fails.
pub async fn init_stores(config: &DatabaseConfig) -> anyhow::Result<Stores> {
    let Some(url) = &config.url else {
        tracing::warn!("No database URL configured; device tokens and broadcast history are kept in memory");
        return Ok(Stores {
            token_store: Arc::new(InMemoryTokenStore::new()),
            broadcast_log: Arc::new(InMemoryBroadcastLog::new()),
        });
    };

    let pool = database::init_pool(url, config).await?;
    database::run_migrations(&pool).await?;

    Ok(Stores { token_store: Arc::new(PgTokenStore::new(pool.clone())), broadcast_log: Arc::new(PgBroadcastLog::new(pool)) })
}

/// # Errors
/// Returns an error if the FCM provider is selected without usable credentials.
pub fn init_gateway(config: &PushConfig) -> anyhow::Result<Arc<dyn DeliveryGateway>> {
    match config.provider {
        PushProviderKind::Fcm => Ok(Arc::new(FcmGateway::from_config(config)?)),
        PushProviderKind::Log => {
            tracing::warn!("Push provider is 'log'; notifications are logged, not delivered");
            Ok(Arc::new(LogGateway))
        }
    }
}

#[derive(Debug)]
pub struct App {
    pub services: ServiceContainer,
    pub mgmt: MgmtState,
    pub workers: Workers,
}

#[derive(Debug)]
pub struct Workers {
    token_cleanup: TokenCleanupWorker,
}

impl Workers {
    #[must_use]
    pub fn spawn_all(self, shutdown_rx: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        vec![tokio::spawn(
            self.token_cleanup.run(shutdown_rx).instrument(tracing::info_span!("token_cleanup_worker")),
        )]
    }
}

/// Wires services and workers around the given collaborators. Anything not supplied falls back to an in-memory
/// store, the logging gateway or the system clock.
#[derive(Debug)]
pub struct AppBuilder {
    config: Config,
    token_store: Option<Arc<dyn TokenStore>>,
    broadcast_log: Option<Arc<dyn BroadcastLog>>,
    gateway: Option<Arc<dyn DeliveryGateway>>,
    clock: Option<Arc<dyn Clock>>,
}

impl AppBuilder {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config, token_store: None, broadcast_log: None, gateway: None, clock: None }
    }

    #[must_use]
    pub fn with_stores(self, stores: Stores) -> Self {
        self.with_token_store(stores.token_store).with_broadcast_log(stores.broadcast_log)
    }

    #[must_use]
    pub fn with_token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    #[must_use]
    pub fn with_broadcast_log(mut self, log: Arc<dyn BroadcastLog>) -> Self {
        self.broadcast_log = Some(log);
        self
    }

    #[must_use]
    pub fn with_gateway(mut self, gateway: Arc<dyn DeliveryGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    #[must_use]
    pub fn build(self) -> App {
        let token_store = self.token_store.unwrap_or_else(|| Arc::new(InMemoryTokenStore::new()));
        let broadcast_log = self.broadcast_log.unwrap_or_else(|| Arc::new(InMemoryBroadcastLog::new()));
        let gateway = self.gateway.unwrap_or_else(|| Arc::new(LogGateway));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let engine = BroadcastEngine::new(
            Arc::clone(&token_store),
            Arc::clone(&gateway),
            Arc::clone(&broadcast_log),
            Arc::clone(&clock),
        );

        let services = ServiceContainer {
            notification_service: NotificationService::new(engine.clone(), gateway),
            push_token_service: PushTokenService::new(Arc::clone(&token_store), Arc::clone(&clock)),
            update_trigger: UpdateTrigger::new(engine, Arc::clone(&broadcast_log)),
            stats: StatsAggregator::new(
                Arc::clone(&token_store),
                broadcast_log,
                Arc::clone(&clock),
                self.config.stats.window_days,
            ),
        };

        let token_cleanup = TokenCleanupWorker::new(Arc::clone(&token_store), clock, &self.config.cleanup);

        App {
            services,
            mgmt: MgmtState {
                health_service: HealthService::new(token_store, self.config.health.clone()),
                cleanup: token_cleanup.clone(),
            },
            workers: Workers { token_cleanup },
        }
    }
}

/// Flips `shutdown_tx` on SIGINT or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => {},
            () = terminate => {},
        }

        tracing::info!("Shutdown signal received, draining connections...");
        let _ = shutdown_tx.send(true);
    });
}

/// Routes panics through `tracing` so they reach the configured log sinks.
pub fn setup_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| info.payload().downcast_ref::<String>().map(String::as_str))
            .unwrap_or("<non-string panic payload>");
        let location = info.location().map(|l| format!("{}:{}", l.file(), l.line())).unwrap_or_default();

        tracing::error!(panic.payload = %payload, panic.location = %location, "Thread panicked");
        default_hook(info);
    }));
}
