//! Read-only Calendar API client.

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use hearth_core::event::Event;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::credentials::ServiceAccountCredentials;
use crate::normalize::{GoogleCalendarMeta, GoogleEventList, convert_items};
use crate::token::{GOOGLE_TOKEN_URL, TokenCache, exchange_assertion, sign_assertion};

pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
const MAX_RESULTS: u32 = 250;
const UNNAMED_CALENDAR: &str = "Unnamed Calendar";

/// How requests are authorized. A service account can read private
/// calendars shared with it; an API key only reaches public ones.
#[derive(Debug, Clone)]
pub enum GoogleAuth {
    ServiceAccount(ServiceAccountCredentials),
    ApiKey(String),
    None,
}

impl GoogleAuth {
    /// Service account if one is available, otherwise the API key.
    pub fn resolve(api_key: Option<&str>, key_file: Option<&Path>) -> Result<Self> {
        let service_account = ServiceAccountCredentials::resolve(key_file)?;
        Ok(Self::from_parts(service_account, api_key))
    }

    /// Pick the strongest of the given credentials. A blank key counts as none.
    pub fn from_parts(
        service_account: Option<ServiceAccountCredentials>,
        api_key: Option<&str>,
    ) -> Self {
        if let Some(creds) = service_account {
            return GoogleAuth::ServiceAccount(creds);
        }

        match api_key.map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => GoogleAuth::ApiKey(key.to_string()),
            None => GoogleAuth::None,
        }
    }

    pub fn is_configured(&self) -> bool {
        !matches!(self, GoogleAuth::None)
    }

    pub fn describe(&self) -> &'static str {
        match self {
            GoogleAuth::ServiceAccount(_) => "service account",
            GoogleAuth::ApiKey(_) => "API key",
            GoogleAuth::None => "none",
        }
    }
}

pub struct GoogleCalendarClient {
    http: reqwest::Client,
    auth: GoogleAuth,
    tokens: TokenCache,
    api_base: String,
    token_url: String,
}

impl GoogleCalendarClient {
    pub fn new(auth: GoogleAuth) -> Self {
        Self::with_endpoints(auth, CALENDAR_API_BASE, GOOGLE_TOKEN_URL)
    }

    pub fn with_endpoints(auth: GoogleAuth, api_base: &str, token_url: &str) -> Self {
        GoogleCalendarClient {
            http: reqwest::Client::new(),
            auth,
            tokens: TokenCache::default(),
            api_base: api_base.trim_end_matches('/').to_string(),
            token_url: token_url.to_string(),
        }
    }

    pub fn auth(&self) -> &GoogleAuth {
        &self.auth
    }

    /// `{api_base}/calendars/{calendar_id}/{tail..}` with the id escaped.
    fn calendar_url(&self, calendar_id: &str, tail: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)
            .with_context(|| format!("Invalid Calendar API base URL: {}", self.api_base))?;

        url.path_segments_mut()
            .map_err(|_| anyhow!("Calendar API base URL cannot have a path"))?
            .push("calendars")
            .push(calendar_id)
            .extend(tail);

        Ok(url)
    }

    /// URL listing single (expanded) events that start within the range.
    pub fn events_url(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Url> {
        let mut url = self.calendar_url(calendar_id, &["events"])?;
        url.query_pairs_mut()
            .append_pair("timeMin", &time_min.to_rfc3339_opts(SecondsFormat::Secs, true))
            .append_pair("timeMax", &time_max.to_rfc3339_opts(SecondsFormat::Secs, true))
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime")
            .append_pair("maxResults", &MAX_RESULTS.to_string());
        Ok(url)
    }

    async fn access_token(&mut self, creds: &ServiceAccountCredentials) -> Result<String> {
        let now = Utc::now();
        if let Some(token) = self.tokens.get(now) {
            return Ok(token.to_string());
        }

        tracing::debug!("Requesting new Google access token for {}", creds.client_email);
        let assertion = sign_assertion(creds, &self.token_url, now)?;
        let response = exchange_assertion(&self.http, &self.token_url, &assertion).await?;

        self.tokens
            .store(response.access_token.clone(), response.expires_in, now);
        Ok(response.access_token)
    }

    async fn authorize(&mut self, mut url: Url) -> Result<RequestBuilder> {
        match self.auth.clone() {
            GoogleAuth::ServiceAccount(creds) => {
                let token = self.access_token(&creds).await?;
                Ok(self.http.get(url).bearer_auth(token))
            }
            GoogleAuth::ApiKey(key) => {
                url.query_pairs_mut().append_pair("key", &key);
                Ok(self.http.get(url))
            }
            GoogleAuth::None => bail!("No Google credentials configured"),
        }
    }

    /// A rejected token is dropped so the next request signs a new one.
    fn note_status(&mut self, status: StatusCode) {
        if status == StatusCode::UNAUTHORIZED {
            tracing::debug!("Google rejected the access token, discarding it");
            self.tokens.invalidate();
        }
    }

    async fn get_json<T: DeserializeOwned>(&mut self, url: Url) -> Result<T> {
        let request = self.authorize(url).await?;
        let response = request
            .send()
            .await
            .context("Failed to reach Google Calendar")?;

        let status = response.status();
        self.note_status(status);
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            bail!("Google Calendar request failed ({}): {}", status, error_text);
        }

        response
            .json::<T>()
            .await
            .context("Failed to parse Google Calendar response")
    }

    /// Fetch the events starting within `[time_min, time_max]`, converted
    /// into read-only dashboard events dated in `tz`.
    ///
    /// Returns nothing when no calendar or credentials are configured.
    /// Cancelled events and events that cannot be converted are skipped.
    pub async fn fetch_events<Tz: TimeZone>(
        &mut self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
        tz: &Tz,
    ) -> Result<Vec<Event>> {
        let calendar_id = calendar_id.trim();
        if calendar_id.is_empty() || !self.auth.is_configured() {
            return Ok(Vec::new());
        }

        let url = self.events_url(calendar_id, time_min, time_max)?;
        let list: GoogleEventList = self.get_json(url).await?;
        let events = convert_items(list.items, tz);

        tracing::debug!("Fetched {} Google events from {}", events.len(), calendar_id);
        Ok(events)
    }

    /// Check that the calendar is reachable and return its name.
    pub async fn test_connection(&mut self, calendar_id: &str) -> Result<String> {
        let calendar_id = calendar_id.trim();
        if calendar_id.is_empty() {
            bail!("No Google calendar id configured");
        }

        let url = self.calendar_url(calendar_id, &[])?;
        let meta: GoogleCalendarMeta = self.get_json(url).await?;

        Ok(meta
            .summary
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNNAMED_CALENDAR.to_string()))
    }
}
