//! OAuth2 access tokens for the Sheets API.
//!
//! `ServiceAccount` implements the JWT-bearer grant: a claim set signed with
//! the account's RSA key is exchanged at `token_uri` for a short-lived bearer
//! token, which is cached until shortly before it expires.

use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::core::error::{AppError, AppResult};

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Tokens are refreshed this long before Google says they expire
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Supplies bearer tokens for Sheets requests.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> AppResult<String>;
}

/// Fixed token, for diagnostics and tests.
pub struct StaticToken(pub String);

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> AppResult<String> {
        Ok(self.0.clone())
    }
}

#[derive(Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    token_uri: String,
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
    expires_in: u64,
}

struct CachedToken {
    token: String,
    refresh_at: Instant,
}

/// Google service account read from a `credentials.json` key file.
pub struct ServiceAccount {
    client_email: String,
    private_key: SecretString,
    token_uri: String,
    http: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccount {
    /// Loads the key file.
    ///
    /// # Errors
    ///
    /// `AppError::Config` if the file is missing or is not a service-account key.
    pub fn from_file(path: &Path, http: reqwest::Client) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("cannot read credentials {}: {}", path.display(), e)))?;
        Self::from_json(&raw, http)
    }

    pub fn from_json(raw: &str, http: reqwest::Client) -> AppResult<Self> {
        let key: ServiceAccountKey = serde_json::from_str(raw)
            .map_err(|e| AppError::Config(format!("invalid service account key: {}", e)))?;
        Ok(Self {
            client_email: key.client_email,
            private_key: SecretString::from(key.private_key),
            token_uri: key.token_uri,
            http,
            cached: Mutex::new(None),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    fn signed_assertion(&self) -> AppResult<String> {
        let iat = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        let key = EncodingKey::from_rsa_pem(self.private_key.expose_secret().as_bytes())?;
        Ok(encode(&Header::new(Algorithm::RS256), &claims, &key)?)
    }

    async fn fetch_token(&self) -> AppResult<TokenResponse> {
        let assertion = self.signed_assertion()?;
        let response = self
            .http
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Token exchange failed with {}: {}", status, body);
            return Err(AppError::Integration(format!("token exchange failed with status {}", status)));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl TokenSource for ServiceAccount {
    async fn access_token(&self) -> AppResult<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.token.clone());
            }
        }

        let fresh = self.fetch_token().await?;
        log::debug!("Obtained Sheets access token for {}, valid {}s", self.client_email, fresh.expires_in);
        let lifetime = Duration::from_secs(fresh.expires_in).saturating_sub(EXPIRY_MARGIN);
        *cached = Some(CachedToken {
            token: fresh.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(fresh.access_token)
    }
}
