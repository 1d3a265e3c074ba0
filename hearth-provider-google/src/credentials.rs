//! Service-account credentials for reading private Google calendars.
//!
//! Taken from the environment:
//!   HEARTH_GOOGLE_SERVICE_ACCOUNT_EMAIL
//!   HEARTH_GOOGLE_SERVICE_ACCOUNT_PRIVATE_KEY
//! or from the JSON key file downloaded from the Google Cloud console.
//! The calendar must be shared with the service account's email.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const EMAIL_ENV: &str = "HEARTH_GOOGLE_SERVICE_ACCOUNT_EMAIL";
pub const PRIVATE_KEY_ENV: &str = "HEARTH_GOOGLE_SERVICE_ACCOUNT_PRIVATE_KEY";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceAccountCredentials {
    pub client_email: String,
    /// PEM-encoded RSA private key.
    pub private_key: String,
}

impl ServiceAccountCredentials {
    /// Build credentials from raw values. Literal `\n` sequences in the key
    /// (as left behind by single-line env files) become real newlines.
    pub fn from_values(client_email: &str, private_key: &str) -> Self {
        ServiceAccountCredentials {
            client_email: client_email.trim().to_string(),
            private_key: private_key.replace("\\n", "\n"),
        }
    }

    pub fn from_env() -> Option<Self> {
        let email = std::env::var(EMAIL_ENV).ok().filter(|v| !v.trim().is_empty())?;
        let key = std::env::var(PRIVATE_KEY_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())?;
        Some(Self::from_values(&email, &key))
    }

    pub fn from_key_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read service account key from {}", path.display()))?;

        let creds: ServiceAccountCredentials = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse service account key from {}", path.display()))?;

        Ok(Self::from_values(&creds.client_email, &creds.private_key))
    }

    /// Environment first, then the key file if one is configured.
    pub fn resolve(key_file: Option<&Path>) -> Result<Option<Self>> {
        if let Some(creds) = Self::from_env() {
            return Ok(Some(creds));
        }

        match key_file {
            Some(path) => Ok(Some(Self::from_key_file(path)?)),
            None => Ok(None),
        }
    }
}
