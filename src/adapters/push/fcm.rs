use crate::adapters::push::{DeliveryGateway, PushError};
use crate::config::PushConfig;
use crate::domain::delivery::{DeliveryErrorKind, DeliveryOutcome};
use crate::domain::notification::{NotificationPayload, Priority};
use anyhow::Context;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::Mutex;

const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
const JWT_BEARER_GRANT: &str = "urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const TOKEN_REFRESH_MARGIN: time::Duration = time::Duration::minutes(1);

/// The fields of a Google service account key file that are needed to mint access tokens.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: OffsetDateTime,
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Serialize)]
struct FcmRequest<'a> {
    message: FcmMessage<'a>,
}

#[derive(Serialize)]
struct FcmMessage<'a> {
    token: &'a str,
    notification: FcmNotification<'a>,
    #[serde(skip_serializing_if = "is_empty_map")]
    data: &'a BTreeMap<String, String>,
    android: AndroidConfig,
    webpush: WebpushConfig<'a>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_empty_map(map: &&BTreeMap<String, String>) -> bool {
    map.is_empty()
}

#[derive(Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Serialize)]
struct AndroidConfig {
    priority: &'static str,
}

#[derive(Serialize)]
struct WebpushConfig<'a> {
    headers: BTreeMap<&'static str, &'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification: Option<WebpushNotification<'a>>,
}

#[derive(Serialize)]
struct WebpushNotification<'a> {
    icon: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct FcmErrorResponse {
    #[serde(default)]
    error: FcmErrorBody,
}

#[derive(Debug, Default, Deserialize)]
struct FcmErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    details: Vec<FcmErrorDetail>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FcmErrorDetail {
    #[serde(default)]
    error_code: Option<String>,
}

impl FcmErrorBody {
    fn error_code(&self) -> Option<&str> {
        self.details.iter().find_map(|d| d.error_code.as_deref())
    }
}

/// Firebase Cloud Messaging HTTP v1 gateway.
///
/// Multicast is realised as concurrent single sends, bounded by `concurrency`, whose outcomes are collected in
/// input order.
#[derive(Debug)]
pub struct FcmGateway {
    project_id: String,
    key: ServiceAccountKey,
    http: reqwest::Client,
    concurrency: usize,
    cached_token: Mutex<Option<CachedToken>>,
}

impl FcmGateway {
    /// Builds a gateway from the push configuration, reading the service account key file.
    ///
    /// # Errors
    /// Returns an error if the project id or credentials file is missing or unreadable.
    pub fn from_config(config: &PushConfig) -> anyhow::Result<Self> {
        let project_id = config.fcm_project_id.clone().context("FCM provider requires --fcm-project-id")?;
        let path = config.fcm_credentials_file.as_ref().context("FCM provider requires --fcm-credentials-file")?;
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read FCM credentials from {}", path.display()))?;
        let key: ServiceAccountKey = serde_json::from_str(&raw).context("Malformed FCM service account key")?;

        Self::new(project_id, key, Duration::from_secs(config.request_timeout_secs), config.concurrency)
    }

    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        project_id: String,
        key: ServiceAccountKey,
        request_timeout: Duration,
        concurrency: usize,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self { project_id, key, http, concurrency: concurrency.max(1), cached_token: Mutex::new(None) })
    }

    /// Returns a cached OAuth2 access token, minting a new one when it is about to expire.
    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn access_token(&self) -> Result<String, PushError> {
        let mut cached = self.cached_token.lock().await;
        let now = OffsetDateTime::now_utc();

        if let Some(token) = cached.as_ref().filter(|t| t.expires_at - TOKEN_REFRESH_MARGIN > now) {
            return Ok(token.value.clone());
        }

        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: FCM_SCOPE,
            aud: &self.key.token_uri,
            iat: now.unix_timestamp(),
            exp: now.unix_timestamp() + ASSERTION_LIFETIME_SECS,
        };
        let encoding_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| PushError::Auth(format!("invalid service account key: {e}")))?;
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
            .map_err(|e| PushError::Auth(format!("failed to sign assertion: {e}")))?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .header(reqwest::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(format!("grant_type={JWT_BEARER_GRANT}&assertion={assertion}"))
            .send()
            .await
            .map_err(|e| PushError::Other(e.into()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PushError::Auth(format!("token exchange failed with {status}: {body}")));
        }

        let token: TokenResponse = response.json().await.map_err(|e| PushError::Other(e.into()))?;
        tracing::debug!(expires_in = token.expires_in, "Minted FCM access token");

        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: now + time::Duration::seconds(token.expires_in),
        });
        Ok(token.access_token)
    }

    fn endpoint(&self) -> String {
        format!("https://fcm.googleapis.com/v1/projects/{}/messages:send", self.project_id)
    }
}

fn build_request<'a>(token: &'a str, payload: &'a NotificationPayload) -> FcmRequest<'a> {
    let urgency = match payload.priority() {
        Priority::High => "high",
        Priority::Normal => "normal",
    };

    FcmRequest {
        message: FcmMessage {
            token,
            notification: FcmNotification { title: payload.title(), body: payload.body() },
            data: payload.data(),
            android: AndroidConfig { priority: payload.priority().as_str() },
            webpush: WebpushConfig {
                headers: BTreeMap::from([("Urgency", urgency)]),
                notification: payload.icon().map(|icon| WebpushNotification { icon }),
            },
        },
    }
}

/// Maps a non-2xx FCM response to a per-handle failure, or to a request-level error when the failure is ours
/// rather than the handle's.
fn classify_failure(status: StatusCode, body: &FcmErrorBody) -> Result<DeliveryErrorKind, PushError> {
    match body.error_code() {
        Some("UNREGISTERED" | "SENDER_ID_MISMATCH") => return Ok(DeliveryErrorKind::InvalidHandle),
        Some("QUOTA_EXCEEDED") => return Ok(DeliveryErrorKind::QuotaExceeded),
        // APNs or web push credentials were rejected for this handle's platform.
        Some("THIRD_PARTY_AUTH_ERROR") => return Ok(DeliveryErrorKind::TransientFailure),
        _ => {}
    }

    match status {
        StatusCode::NOT_FOUND => Ok(DeliveryErrorKind::InvalidHandle),
        StatusCode::BAD_REQUEST
            if body.status == "INVALID_ARGUMENT" && body.message.to_lowercase().contains("registration token") =>
        {
            Ok(DeliveryErrorKind::InvalidHandle)
        }
        StatusCode::TOO_MANY_REQUESTS => Ok(DeliveryErrorKind::QuotaExceeded),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(PushError::Auth(body.message.clone())),
        _ => Ok(DeliveryErrorKind::TransientFailure),
    }
}

#[async_trait]
impl DeliveryGateway for FcmGateway {
    #[tracing::instrument(level = "debug", skip(self, payload), err)]
    async fn send_to_one(&self, token: &str, payload: &NotificationPayload) -> Result<DeliveryOutcome, PushError> {
        let access_token = self.access_token().await?;

        let request = self.http.post(self.endpoint()).bearer_auth(&access_token).json(&build_request(token, payload));
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "FCM request failed");
                return Ok(DeliveryOutcome::failed(token, DeliveryErrorKind::TransientFailure));
            }
        };

        let status = response.status();
        if status.is_success() {
            return Ok(DeliveryOutcome::delivered(token));
        }

        let body = response.json::<FcmErrorResponse>().await.unwrap_or_default().error;
        let kind = classify_failure(status, &body)?;
        tracing::debug!(%status, kind = %kind, message = %body.message, "FCM rejected message");
        Ok(DeliveryOutcome::failed(token, kind))
    }

    async fn send_to_many(
        &self,
        tokens: &[String],
        payload: &NotificationPayload,
    ) -> Result<Vec<DeliveryOutcome>, PushError> {
        if tokens.is_empty() {
            return Err(PushError::NoTargets);
        }

        let sends: Vec<_> = tokens.iter().map(|token| self.send_to_one(token, payload)).collect();
        let mut results = stream::iter(sends).buffered(self.concurrency);

        let mut outcomes = Vec::with_capacity(tokens.len());
        while let Some(result) = results.next().await {
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    tracing::warn!(
                        completed = outcomes.len(),
                        total = tokens.len(),
                        error = %e,
                        "FCM fan-out aborted"
                    );
                    return Err(e);
                }
            }
        }
        Ok(outcomes)
    }
}
