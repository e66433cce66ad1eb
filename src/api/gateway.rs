use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

use super::envelope::{ensure_success, error_message};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::session::{Credential, RequestAuth, SessionStore};

const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";

/// Where the operator is sent when the session is forcibly ended
pub trait LoginBoundary: Send + Sync {
    fn redirect_to_login(&self);
}

/// Boundary that only logs; for embedders that poll `SessionStore::status`
#[derive(Debug, Default)]
pub struct LogOnly;

impl LoginBoundary for LogOnly {
    fn redirect_to_login(&self) {
        tracing::info!("session ended, login required");
    }
}

/// A response that made it back from the server, before interpretation
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Every call to the admin API goes through here: the current credential is
/// attached on the way out and every response passes the unauthorized hook
/// on the way back.
pub struct Gateway {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<SessionStore>,
    boundary: Arc<dyn LoginBoundary>,
    log_requests: bool,
}

impl Gateway {
    pub fn new(
        config: &ClientConfig,
        session: Arc<SessionStore>,
        boundary: Arc<dyn LoginBoundary>,
    ) -> Result<Self> {
        let base_url = Url::parse(&format!("{}/", config.base_url()))
            .map_err(|e| ClientError::illegal_state(format!("invalid API url '{}': {}", config.api.url, e)))?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(ClientError::Transport)?;

        Ok(Self {
            http,
            base_url,
            session,
            boundary,
            log_requests: config.api.enable_request_logging,
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL. Each segment is percent-encoded on its own, so
    /// an id can never reach a different resource.
    fn url(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(ClientError::validation("id", format!("'{bad}' is not a valid id")));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::illegal_state(format!("API url '{}' cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// Attach the current credential, if any, as a bearer header
    pub fn attach(&self, request: RequestBuilder) -> (RequestBuilder, RequestAuth) {
        let auth = self.session.request_auth();
        let request = match &auth.credential {
            Some(credential) => request.bearer_auth(credential.as_str()),
            None => request,
        };
        (request, auth)
    }

    /// The global response hook. An unauthorized response ends the session it
    /// was sent under and redirects once, however many requests race here.
    ///
    /// A 401 to an unauthenticated request (a rejected login) ends nothing and
    /// is surfaced like any other rejection.
    pub fn on_response(&self, auth: &RequestAuth, response: &RawResponse) -> Result<()> {
        if response.status != 401 {
            return Ok(());
        }
        let message = response.json().as_ref().and_then(error_message);
        if auth.credential.is_none() {
            return Err(ClientError::api(
                401,
                message.unwrap_or_else(|| "Unauthorized".to_string()),
            ));
        }
        if self.session.invalidate(auth.epoch) {
            self.boundary.redirect_to_login();
        }
        Err(ClientError::Unauthorized(
            message.unwrap_or_else(|| SESSION_EXPIRED.to_string()),
        ))
    }

    /// Send a request and return the raw response after the hook has run
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &[&str],
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<RawResponse> {
        let url = self.url(path, query)?;
        let mut request = self.http.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        let (request, auth) = self.attach(request);

        if self.log_requests {
            tracing::debug!(%method, %url, authenticated = auth.credential.is_some(), "request");
        }

        let response = request.send().await.map_err(|e| {
            tracing::debug!(%method, %url, "transport error: {}", e);
            ClientError::Transport(e)
        })?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(ClientError::Transport)?;
        let raw = RawResponse { status, body };

        if self.log_requests {
            tracing::debug!(%method, %url, status, "response");
        }

        self.on_response(&auth, &raw)?;
        Ok(raw)
    }

    /// Send and interpret the body as a successful JSON envelope
    pub async fn call<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &[&str],
        query: &[(&str, String)],
        body: Option<&B>,
        fallback: &str,
    ) -> Result<Value> {
        let raw = self.send(method, path, query, body).await?;
        interpret(raw, fallback)
    }

    pub async fn get(&self, path: &[&str], query: &[(&str, String)], fallback: &str) -> Result<Value> {
        self.call::<Value>(Method::GET, path, query, None, fallback).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &[&str], body: &B, fallback: &str) -> Result<Value> {
        self.call(Method::POST, path, &[], Some(body), fallback).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &[&str], body: &B, fallback: &str) -> Result<Value> {
        self.call(Method::PUT, path, &[], Some(body), fallback).await
    }

    pub async fn delete(&self, path: &[&str], fallback: &str) -> Result<Value> {
        self.call::<Value>(Method::DELETE, path, &[], None, fallback).await
    }

    /// GET under an explicit credential, bypassing the session and its hook.
    /// Used while rehydrating, before the session holds the credential.
    pub async fn get_as(&self, path: &[&str], credential: &Credential, fallback: &str) -> Result<Value> {
        let url = self.url(path, &[])?;
        let response = self
            .http
            .get(url)
            .bearer_auth(credential.as_str())
            .send()
            .await
            .map_err(ClientError::Transport)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(ClientError::Transport)?;
        let raw = RawResponse { status, body };
        if status == 401 {
            let message = raw
                .json()
                .as_ref()
                .and_then(error_message)
                .unwrap_or_else(|| SESSION_EXPIRED.to_string());
            return Err(ClientError::Unauthorized(message));
        }
        interpret(raw, fallback)
    }
}

/// Turn a non-401 raw response into a JSON body or a surfaced error
pub fn interpret(raw: RawResponse, fallback: &str) -> Result<Value> {
    let body = raw.json();
    if !raw.is_success() {
        let message = body
            .as_ref()
            .and_then(error_message)
            .unwrap_or_else(|| fallback.to_string());
        return Err(ClientError::api(raw.status, message));
    }
    let body = body.ok_or_else(|| ClientError::decode("response body is not JSON"))?;
    ensure_success(raw.status, &body, fallback)?;
    Ok(body)
}
