use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::api::envelope::{decode_field, ensure_success, error_message};
use crate::api::Gateway;
use crate::error::{ClientError, Result};
use crate::models::Admin;
use crate::session::{Credential, Session};

const LOGIN_FAILED: &str = "Login failed. Please check your credentials and try again.";
const REGISTER_FAILED: &str = "Registration failed. Please try again.";
const PROFILE_FAILED: &str = "Failed to load admin profile.";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
    pub registration_key: String,
}

#[derive(Debug, Deserialize)]
struct SignedIn {
    token: Option<String>,
    admin: Option<Admin>,
}

/// Result of a registration the server accepted
#[derive(Debug, Clone, PartialEq)]
pub enum Registered {
    /// The response carried a token and identity; the session is live
    SignedIn(Session),
    /// The account exists but the response could not be fully read.
    /// The operator should log in rather than register again.
    Accepted { admin: Option<Admin> },
}

/// Validates the login form before anything is sent
pub fn validate_login(email: &str, password: &str) -> Result<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ClientError::validation("email", "Email is required"));
    }
    if !looks_like_email(email) {
        return Err(ClientError::validation("email", "Email is invalid"));
    }
    if password.is_empty() {
        return Err(ClientError::validation("password", "Password is required"));
    }
    Ok(())
}

// \S+@\S+\.\S+
fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain
                    .rsplit_once('.')
                    .map(|(host, tld)| !host.is_empty() && !tld.is_empty())
                    .unwrap_or(false)
        }
        None => false,
    }
}

/// Session lifecycle: login, register, rehydrate, logout
#[derive(Clone)]
pub struct AuthService {
    gateway: Arc<Gateway>,
}

impl AuthService {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Authenticate and start a session. On any failure stored state is untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        validate_login(email, password)?;

        let body = self
            .gateway
            .post(&["login"], &LoginRequest { email: email.trim(), password }, LOGIN_FAILED)
            .await?;
        let signed_in: SignedIn = serde_json::from_value(body)
            .map_err(|e| ClientError::decode(format!("login response: {e}")))?;

        let (Some(token), Some(admin)) = (signed_in.token, signed_in.admin) else {
            return Err(ClientError::decode("login response is missing token or admin"));
        };
        let session = Session {
            credential: Credential::new(token),
            identity: admin,
        };
        self.gateway.session().establish(session.clone())?;
        Ok(session)
    }

    /// Create an admin account.
    ///
    /// A 2xx whose body cannot be parsed still means the account was created
    /// upstream; it comes back as `Registered::Accepted`, never as an error.
    pub async fn register(&self, registration: &Registration) -> Result<Registered> {
        let raw = self
            .gateway
            .send(Method::POST, &["register"], &[], Some(registration))
            .await?;

        if !raw.is_success() {
            let message = raw
                .json()
                .as_ref()
                .and_then(error_message)
                .unwrap_or_else(|| REGISTER_FAILED.to_string());
            return Err(ClientError::api(raw.status, message));
        }

        let Some(body) = raw.json() else {
            tracing::warn!(status = raw.status, "registration succeeded with unreadable body");
            return Ok(Registered::Accepted { admin: None });
        };
        ensure_success(raw.status, &body, REGISTER_FAILED)?;

        match serde_json::from_value::<SignedIn>(body.clone()) {
            Ok(SignedIn {
                token: Some(token),
                admin: Some(admin),
            }) => {
                let session = Session {
                    credential: Credential::new(token),
                    identity: admin,
                };
                self.gateway.session().establish(session.clone())?;
                Ok(Registered::SignedIn(session))
            }
            Ok(SignedIn { admin, .. }) => Ok(Registered::Accepted { admin }),
            Err(e) => {
                tracing::warn!("registration succeeded with degraded body: {}", e);
                Ok(Registered::Accepted {
                    admin: salvage_admin(&body),
                })
            }
        }
    }

    /// Restore the session persisted by a previous process.
    ///
    /// Uses the cached identity when present, otherwise asks the server. If
    /// that fails for any reason the persisted keys are wiped.
    pub async fn rehydrate(&self) -> Result<Option<Session>> {
        let store = self.gateway.session();
        if let Some(session) = store.current() {
            return Ok(Some(session));
        }

        let persisted = match store.persisted() {
            Ok(persisted) => persisted,
            Err(e) => {
                tracing::warn!("unreadable persisted session, clearing: {}", e);
                store.wipe_persisted();
                return Ok(None);
            }
        };
        let Some(token) = persisted.credential else {
            return Ok(None);
        };
        let credential = Credential::new(token);

        let identity = match persisted.identity {
            Some(identity) => identity,
            None => match self.fetch_profile_with(&credential).await {
                Ok(identity) => identity,
                Err(e) => {
                    tracing::warn!("could not restore admin profile, logging out: {}", e);
                    store.wipe_persisted();
                    return Ok(None);
                }
            },
        };

        let session = Session { credential, identity };
        store.establish(session.clone())?;
        Ok(Some(session))
    }

    /// Drop the session locally. The server is not told.
    pub fn logout(&self) {
        self.gateway.session().logout();
    }

    /// `GET /profile` for the current session
    pub async fn profile(&self) -> Result<Admin> {
        let body = self.gateway.get(&["profile"], &[], PROFILE_FAILED).await?;
        decode_field(&body, "admin")
    }

    async fn fetch_profile_with(&self, credential: &Credential) -> Result<Admin> {
        let body = self.gateway.get_as(&["profile"], credential, PROFILE_FAILED).await?;
        decode_field(&body, "admin")
    }
}

fn salvage_admin(body: &Value) -> Option<Admin> {
    let admin = body.get("admin")?;
    Some(Admin {
        id: admin.get("id").map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })?,
        email: admin.get("email")?.as_str()?.to_string(),
        name: admin
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}
