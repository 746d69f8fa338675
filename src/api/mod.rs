use crate::services::health_service::HealthService;
use crate::services::notification_service::NotificationService;
use crate::services::push_token_service::PushTokenService;
use crate::services::stats::StatsAggregator;
use crate::services::update_trigger::UpdateTrigger;
use crate::workers::TokenCleanupWorker;
use axum::body::Body;
use axum::http::{HeaderName, Request};
use axum::{
    Router,
    routing::{get, post},
};
use extract::method_not_allowed;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub mod extract;
pub mod health;
pub mod jobs;
pub mod notifications;
pub mod schemas;
pub mod stats;
pub mod tokens;
pub mod triggers;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone, Debug)]
pub struct AppState {
    pub notification_service: NotificationService,
    pub push_token_service: PushTokenService,
    pub update_trigger: UpdateTrigger,
    pub stats: StatsAggregator,
}

#[derive(Clone, Debug)]
pub struct MgmtState {
    pub health_service: HealthService,
    pub cleanup: TokenCleanupWorker,
}

#[derive(Debug)]
pub struct ServiceContainer {
    pub notification_service: NotificationService,
    pub push_token_service: PushTokenService,
    pub update_trigger: UpdateTrigger,
    pub stats: StatsAggregator,
}

/// Configures and returns the public application router.
pub fn app_router(services: ServiceContainer) -> Router {
    let state = AppState {
        notification_service: services.notification_service,
        push_token_service: services.push_token_service,
        update_trigger: services.update_trigger,
        stats: services.stats,
    };

    Router::new()
        .route("/send-notification", post(notifications::send_notification).fallback(method_not_allowed))
        .route("/send-progress", post(notifications::send_progress).fallback(method_not_allowed))
        .route("/test-notification", post(notifications::test_notification).fallback(method_not_allowed))
        .route("/register-token", post(tokens::register_token).fallback(method_not_allowed))
        .route("/app-updates", post(triggers::app_updates).fallback(method_not_allowed))
        .route("/notification-stats", get(stats::notification_stats).fallback(method_not_allowed))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER)))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .extensions()
                        .get::<tower_http::request_id::RequestId>()
                        .map(|id| id.header_value().to_str().unwrap_or_default())
                        .unwrap_or_default()
                        .to_string();

                    tracing::info_span!(
                        "request",
                        "request_id" = %request_id,
                        "http.request.method" = %request.method(),
                        "url.path" = %request.uri().path(),
                        "http.response.status_code" = tracing::field::Empty,
                        "otel.kind" = "server",
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, _span: &tracing::Span| {
                        let status = response.status();
                        tracing::Span::current().record("http.response.status_code", status.as_u16());

                        tracing::info!(
                            latency_ms = %latency.as_millis(),
                            status = %status.as_u16(),
                            "request completed"
                        );
                    },
                )
                .on_failure(|error, _latency, _span: &tracing::Span| {
                    tracing::error!(error = %error, "request failed");
                }),
        )
        .layer(SetRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER), MakeRequestUuid))
        .with_state(state)
}

/// Health probes and job triggers, served on the management port.
pub fn mgmt_router(state: MgmtState) -> Router {
    Router::new()
        .route("/livez", get(health::livez))
        .route("/readyz", get(health::readyz))
        .route("/jobs/cleanup-tokens", post(jobs::cleanup_tokens).fallback(method_not_allowed))
        .with_state(state)
}
