//! HTTP client for the Dead Man's Snitch REST API.

use crate::error::{ApiError, AuthError, Error, PreconditionError, ValidationError};
use crate::snitch::Snitch;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client as HttpClient, Method};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const API_BASE: &str = "https://api.deadmanssnitch.com/v1";

/// A snitch addressed either by its token or by a previously fetched instance.
#[derive(Debug, Clone, Copy)]
pub enum SnitchRef<'a> {
    Token(&'a str),
    Snitch(&'a Snitch),
}

impl<'a> From<&'a str> for SnitchRef<'a> {
    fn from(token: &'a str) -> Self {
        SnitchRef::Token(token)
    }
}

impl<'a> From<&'a String> for SnitchRef<'a> {
    fn from(token: &'a String) -> Self {
        SnitchRef::Token(token)
    }
}

impl<'a> From<&'a Snitch> for SnitchRef<'a> {
    fn from(snitch: &'a Snitch) -> Self {
        SnitchRef::Snitch(snitch)
    }
}

impl<'a> SnitchRef<'a> {
    /// Token to put in the URL path. `action` names the operation in the error.
    pub fn resolve(self, action: &'static str) -> Result<&'a str, Error> {
        match self {
            SnitchRef::Token(token) => {
                let token = token.trim();
                if token.is_empty() {
                    return Err(ValidationError::MissingSnitch.into());
                }
                Ok(token)
            }
            SnitchRef::Snitch(snitch) => snitch
                .token
                .as_deref()
                .filter(|t| !t.is_empty())
                .ok_or_else(|| PreconditionError::MissingToken { action }.into()),
        }
    }
}

/// Dead Man's Snitch API client.
///
/// Holds only the key and base URL; safe to clone and share across tasks.
#[derive(Clone)]
pub struct Client {
    api_key: String,
    api_base: String,
    http: HttpClient,
}

impl Client {
    /// Create a client for the production API with the given key.
    pub fn new(api_key: impl Into<String>) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(format!("snitch-cli/{}", crate::VERSION))
            .default_headers(headers)
            .build()?;
        Ok(Self::from_reqwest(api_key, API_BASE, http))
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn from_reqwest(
        api_key: impl Into<String>,
        api_base: impl Into<String>,
        http: HttpClient,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    /// Point the client at another base URL (e.g. a staging server or a mock).
    pub fn with_base_url(mut self, url: &str) -> Result<Self, Error> {
        let parsed = Url::parse(url)?;
        self.api_base = parsed.as_str().trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Issue one authenticated request to `api_base + path`.
    ///
    /// The body, if any, is sent as JSON. The response body is decoded as JSON when
    /// possible and otherwise handed back as a JSON string holding the raw text.
    pub async fn issue(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, Error> {
        let url = format!("{}{}", self.api_base, path);
        debug!(%method, %url, "sending request");
        let mut req = self
            .http
            .request(method, &url)
            .basic_auth(&self.api_key, Some(""));
        if let Some(body) = body {
            req = req.json(body);
        }
        let res = req.send().await?;
        let status = res.status();
        let text = res.text().await?;
        let data = decode_body(text);

        if status.as_u16() == 401 {
            warn!(%url, "request rejected: unauthorized");
            return Err(Error::Auth(AuthError {
                message: "Authentication failed. Check your API key.".to_string(),
            }));
        }
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "request failed");
            let msg = data
                .get("error")
                .and_then(|e| e.as_str())
                .map(String::from)
                .unwrap_or_else(|| format!("API request failed with status {}", status));
            return Err(Error::Api(ApiError::new(msg, Some(status.as_u16()), Some(data))));
        }
        Ok(data)
    }

    /// List snitches, optionally restricted to those carrying all of `tags`.
    pub async fn list_snitches<S: AsRef<str>>(&self, tags: &[S]) -> Result<Vec<Snitch>, Error> {
        let res = self.issue(Method::GET, &list_path(tags), None).await?;
        let items = match res {
            Value::Array(items) => items,
            other => {
                return Err(Error::UnexpectedResponse(format!(
                    "expected a list of snitches, got {}",
                    other
                )))
            }
        };
        items
            .iter()
            .map(|item| Snitch::parse(item).map_err(Error::from))
            .collect()
    }

    /// Fetch one snitch.
    pub async fn get_snitch<'a>(&self, snitch: impl Into<SnitchRef<'a>>) -> Result<Snitch, Error> {
        let token = snitch.into().resolve("get")?;
        let res = self.issue(Method::GET, &snitch_path(token), None).await?;
        Ok(Snitch::parse(&res)?)
    }

    /// Register a new snitch; returns it as stored by the service.
    pub async fn create_snitch(&self, snitch: &Snitch) -> Result<Snitch, Error> {
        let body = serde_json::to_value(snitch.payload())?;
        let res = self.issue(Method::POST, "/snitches", Some(&body)).await?;
        Ok(Snitch::parse(&res)?)
    }

    /// Push local changes to name, interval, notes and tags of a saved snitch.
    pub async fn edit_snitch(&self, snitch: &Snitch) -> Result<Snitch, Error> {
        let token = SnitchRef::Snitch(snitch).resolve("edit")?;
        let body = serde_json::to_value(snitch.payload())?;
        let res = self
            .issue(Method::PATCH, &snitch_path(token), Some(&body))
            .await?;
        Ok(Snitch::parse(&res)?)
    }

    /// Append tags to a snitch.
    pub async fn add_tags<'a, S: AsRef<str>>(
        &self,
        snitch: impl Into<SnitchRef<'a>>,
        tags: &[S],
    ) -> Result<Value, Error> {
        let token = snitch.into().resolve("tag")?;
        let tags = validate_tags(tags)?;
        let body = Value::from(tags);
        self.issue(Method::POST, &format!("{}/tags", snitch_path(token)), Some(&body))
            .await
    }

    /// Remove a single tag from a snitch.
    pub async fn remove_tag<'a>(
        &self,
        snitch: impl Into<SnitchRef<'a>>,
        tag: &str,
    ) -> Result<Value, Error> {
        let token = snitch.into().resolve("untag")?;
        if tag.trim().is_empty() {
            return Err(ValidationError::InvalidTags.into());
        }
        let path = format!("{}/tags/{}", snitch_path(token), urlencoding::encode(tag));
        self.issue(Method::DELETE, &path, None).await
    }

    /// Pause a snitch until its next check-in.
    pub async fn pause_snitch<'a>(&self, snitch: impl Into<SnitchRef<'a>>) -> Result<Value, Error> {
        let token = snitch.into().resolve("pause")?;
        self.issue(Method::POST, &format!("{}/pause", snitch_path(token)), None)
            .await
    }

    /// Delete a snitch.
    pub async fn delete_snitch<'a>(
        &self,
        snitch: impl Into<SnitchRef<'a>>,
    ) -> Result<Value, Error> {
        let token = snitch.into().resolve("delete")?;
        self.issue(Method::DELETE, &snitch_path(token), None).await
    }
}

fn decode_body(text: String) -> Value {
    match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) => {
            debug!(error = %e, "response body is not JSON, returning raw text");
            Value::String(text)
        }
    }
}

fn list_path<S: AsRef<str>>(tags: &[S]) -> String {
    if tags.is_empty() {
        return "/snitches".to_string();
    }
    let joined = tags
        .iter()
        .map(|t| urlencoding::encode(t.as_ref()).into_owned())
        .collect::<Vec<_>>()
        .join(",");
    format!("/snitches?tags={}", joined)
}

fn snitch_path(token: &str) -> String {
    format!("/snitches/{}", urlencoding::encode(token))
}

fn validate_tags<S: AsRef<str>>(tags: &[S]) -> Result<Vec<String>, ValidationError> {
    if tags.is_empty() || tags.iter().any(|t| t.as_ref().trim().is_empty()) {
        return Err(ValidationError::InvalidTags);
    }
    Ok(tags.iter().map(|t| t.as_ref().to_string()).collect())
}
