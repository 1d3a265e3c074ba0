//! Access tokens for a service account (OAuth 2.0 JWT bearer grant).

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use hearth_core::cache::TtlCache;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::credentials::ServiceAccountCredentials;

pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const CALENDAR_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for the signed assertion.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens are treated as expired this long before Google says they are.
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 300;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub scope: String,
    pub iat: i64,
    pub exp: i64,
}

impl AssertionClaims {
    pub fn new(creds: &ServiceAccountCredentials, token_url: &str, now: DateTime<Utc>) -> Self {
        let iat = now.timestamp();
        AssertionClaims {
            iss: creds.client_email.clone(),
            sub: creds.client_email.clone(),
            aud: token_url.to_string(),
            scope: CALENDAR_READONLY_SCOPE.to_string(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        }
    }
}

/// Sign the RS256 assertion exchanged for an access token.
pub fn sign_assertion(
    creds: &ServiceAccountCredentials,
    token_url: &str,
    now: DateTime<Utc>,
) -> Result<String> {
    let key = EncodingKey::from_rsa_pem(creds.private_key.as_bytes())
        .context("Service account private key is not a valid RSA PEM key")?;

    let claims = AssertionClaims::new(creds, token_url, now);
    jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
        .context("Failed to sign service account assertion")
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

/// Exchange a signed assertion for an access token.
pub async fn exchange_assertion(
    http: &reqwest::Client,
    token_url: &str,
    assertion: &str,
) -> Result<TokenResponse> {
    let response = http
        .post(token_url)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion)])
        .send()
        .await
        .context("Failed to send token request to Google")?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        anyhow::bail!("Token exchange failed ({}): {}", status, error_text);
    }

    response
        .json::<TokenResponse>()
        .await
        .context("Failed to parse token response")
}

/// The current access token, owned by whoever makes API calls.
#[derive(Debug, Clone)]
pub struct TokenCache {
    cache: TtlCache<String>,
}

impl Default for TokenCache {
    fn default() -> Self {
        TokenCache {
            cache: TtlCache::new(Duration::seconds(
                ASSERTION_LIFETIME_SECS - TOKEN_REFRESH_MARGIN_SECS,
            )),
        }
    }
}

impl TokenCache {
    pub fn get(&self, now: DateTime<Utc>) -> Option<&str> {
        self.cache.get(now).map(String::as_str)
    }

    /// Remember a token that Google says is valid for `expires_in` seconds.
    pub fn store(&mut self, access_token: String, expires_in: i64, now: DateTime<Utc>) {
        let expires_at = now + Duration::seconds(expires_in - TOKEN_REFRESH_MARGIN_SECS);
        self.cache.insert_with_expiry(access_token, expires_at);
    }

    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }
}
