//! Service-account authentication.
//!
//! A signed RS256 assertion is exchanged at the key's `token_uri` for a
//! short-lived OAuth access token (JWT bearer grant). Tokens are cached until
//! shortly before they expire.

use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::ReportingError;
use crate::http::check_response;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh this long before the reported expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    String::from("https://oauth2.googleapis.com/token")
}

/// The fields of a service-account JSON key file this client needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl ServiceAccountKey {
    /// Read and parse a key file.
    ///
    /// # Errors
    ///
    /// Returns [`ReportingError::Io`] if the file cannot be read and
    /// [`ReportingError::Parse`] if it is not a service-account key.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ReportingError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    /// Parse a key from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ReportingError::Parse`] if required fields are missing.
    pub fn from_json(raw: &str) -> Result<Self, ReportingError> {
        let key: Self = serde_json::from_str(raw)
            .map_err(|e| ReportingError::Parse(format!("service-account key: {e}")))?;
        if key.client_email.is_empty() || key.private_key.is_empty() {
            return Err(ReportingError::Parse(String::from(
                "service-account key: client_email and private_key are required",
            )));
        }
        Ok(key)
    }

    /// Build the signed JWT bearer assertion for `scopes`, issued at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportingError::Auth`] if the private key is not a valid RSA
    /// PEM or signing fails.
    pub fn assertion(&self, scopes: &[String], now: DateTime<Utc>) -> Result<String, ReportingError> {
        let iat = now.timestamp();
        let claims = AssertionClaims {
            iss: self.client_email.clone(),
            scope: scopes.join(" "),
            aud: self.token_uri.clone(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| ReportingError::Auth(format!("invalid private key: {e}")))?;
        let mut header = Header::new(Algorithm::RS256);
        header.kid.clone_from(&self.private_key_id);

        jsonwebtoken::encode(&header, &claims, &key)
            .map_err(|e| ReportingError::Auth(format!("failed to sign assertion: {e}")))
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

const fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + TimeDelta::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// Expiry of a token issued at `now`. An `expires_in` outside chrono's range
/// falls back to the assertion lifetime.
fn expires_at(now: DateTime<Utc>, expires_in: i64) -> DateTime<Utc> {
    TimeDelta::try_seconds(expires_in)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .unwrap_or_else(|| now + TimeDelta::seconds(ASSERTION_LIFETIME_SECS))
}

/// Exchanges service-account assertions for access tokens and caches them.
pub struct TokenProvider {
    http: reqwest::Client,
    key: ServiceAccountKey,
    scopes: Vec<String>,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    #[must_use]
    pub fn new(http: reqwest::Client, key: ServiceAccountKey, scopes: Vec<String>) -> Self {
        Self {
            http,
            key,
            scopes,
            cached: Mutex::new(None),
        }
    }

    #[must_use]
    pub const fn key(&self) -> &ServiceAccountKey {
        &self.key
    }

    /// Return a valid access token, exchanging a new assertion when needed.
    ///
    /// Concurrent callers wait on the same exchange instead of each minting a token.
    ///
    /// # Errors
    ///
    /// Returns [`ReportingError::Auth`] when signing or the exchange is
    /// rejected, or a transport error from the token endpoint.
    pub async fn access_token(&self) -> Result<String, ReportingError> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.access_token.clone());
        }

        let assertion = self.key.assertion(&self.scopes, now)?;
        tracing::debug!(client = %self.key.client_email, "exchanging service-account assertion");

        let body = format!(
            "grant_type={}&assertion={}",
            urlencoding::encode(JWT_BEARER_GRANT),
            urlencoding::encode(&assertion)
        );
        let resp = self
            .http
            .post(&self.key.token_uri)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(body)
            .send()
            .await?;
        let token: TokenResponse = check_response(resp).await?.json().await?;

        let fresh = CachedToken {
            access_token: token.access_token,
            expires_at: expires_at(now, token.expires_in),
        };
        let access_token = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access_token)
    }
}
