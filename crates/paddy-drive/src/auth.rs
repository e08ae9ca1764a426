// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service-account OAuth for the Drive API.
//!
//! Signs an RS256 JWT assertion with the service account's private key,
//! impersonating a workspace user through the `sub` claim, and exchanges it
//! at the token endpoint for a bearer token. Tokens are cached until shortly
//! before they expire.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use paddy_core::PaddyError;
use ring::rand::SystemRandom;
use ring::signature::{RSA_PKCS1_SHA256, RsaKeyPair};
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// OAuth scope granting full Drive access.
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

const JWT_BEARER_GRANT: &str = "urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Source of bearer tokens for Drive requests.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, PaddyError>;
}

/// A fixed token, for tests and for tokens minted elsewhere.
pub struct StaticToken(pub String);

#[async_trait]
impl AccessTokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, PaddyError> {
        Ok(self.0.clone())
    }
}

/// The fields of a service-account key file this crate uses.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl ServiceAccountKey {
    pub async fn from_file(path: &Path) -> Result<Self, PaddyError> {
        let raw = tokio::fs::read(path)
            .await
            .map_err(|e| PaddyError::io(path, e))?;
        serde_json::from_slice(&raw).map_err(|e| {
            PaddyError::Config(format!(
                "invalid service account file {}: {e}",
                path.display()
            ))
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

struct CachedToken {
    token: String,
    refresh_at: Instant,
}

/// Exchanges signed service-account assertions for access tokens.
pub struct ServiceAccountTokenSource {
    http: reqwest::Client,
    client_email: String,
    subject: String,
    token_uri: String,
    key_pair: RsaKeyPair,
    rng: SystemRandom,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokenSource {
    /// Builds a token source acting as `subject`.
    ///
    /// `token_uri` overrides the endpoint named in the key file.
    pub fn new(
        http: reqwest::Client,
        key: ServiceAccountKey,
        subject: impl Into<String>,
        token_uri: Option<String>,
    ) -> Result<Self, PaddyError> {
        let der = pem_to_der(&key.private_key)?;
        let key_pair = RsaKeyPair::from_pkcs8(&der).map_err(|e| {
            PaddyError::Config(format!("service account private key rejected: {e}"))
        })?;

        Ok(Self {
            http,
            client_email: key.client_email,
            subject: subject.into(),
            token_uri: token_uri.unwrap_or(key.token_uri),
            key_pair,
            rng: SystemRandom::new(),
            cached: Mutex::new(None),
        })
    }

    /// Builds the signed JWT assertion for the current time.
    pub fn signed_assertion(&self, issued_at: i64) -> Result<String, PaddyError> {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let claims = serde_json::json!({
            "iss": self.client_email,
            "sub": self.subject,
            "scope": DRIVE_SCOPE,
            "aud": self.token_uri,
            "iat": issued_at,
            "exp": issued_at + ASSERTION_LIFETIME_SECS,
        });
        let claims = URL_SAFE_NO_PAD.encode(claims.to_string());
        let signing_input = format!("{header}.{claims}");

        let mut signature = vec![0u8; self.key_pair.public().modulus_len()];
        self.key_pair
            .sign(
                &RSA_PKCS1_SHA256,
                &self.rng,
                signing_input.as_bytes(),
                &mut signature,
            )
            .map_err(|_| PaddyError::Internal("failed to sign service account assertion".into()))?;

        Ok(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature)))
    }

    async fn fetch_token(&self) -> Result<TokenResponse, PaddyError> {
        let assertion = self.signed_assertion(chrono::Utc::now().timestamp())?;
        let body = format!("grant_type={JWT_BEARER_GRANT}&assertion={assertion}");

        let response = self
            .http
            .post(&self.token_uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(crate::google::request_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PaddyError::Drive {
                message: format!("token exchange failed with {status}: {text}"),
                transient: status.is_server_error() || status.as_u16() == 429,
                source: None,
            });
        }

        response.json().await.map_err(|e| PaddyError::Drive {
            message: format!("malformed token response: {e}"),
            transient: false,
            source: Some(Box::new(e)),
        })
    }
}

#[async_trait]
impl AccessTokenProvider for ServiceAccountTokenSource {
    async fn access_token(&self) -> Result<String, PaddyError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref()
            && Instant::now() < token.refresh_at
        {
            return Ok(token.token.clone());
        }

        let fresh = self.fetch_token().await?;
        let lifetime = Duration::from_secs(fresh.expires_in).saturating_sub(REFRESH_MARGIN);
        debug!(expires_in = fresh.expires_in, "obtained drive access token");
        *cached = Some(CachedToken {
            token: fresh.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(fresh.access_token)
    }
}

fn pem_to_der(pem: &str) -> Result<Vec<u8>, PaddyError> {
    let body: String = pem
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("-----"))
        .collect();
    STANDARD
        .decode(body)
        .map_err(|e| PaddyError::Config(format!("service account private key is not PEM: {e}")))
}
