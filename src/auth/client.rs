use gloo::net::http::{Request, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use web_sys::UrlSearchParams;

use super::session::{AuthSession, SessionStore, UserProfile};
use super::validation::{validate_login, validate_registration, RegistrationForm};
use crate::error::{PortalError, Result};

const LOGIN_FAILED: &str = "Authorization failed";
const REGISTRATION_FAILED: &str = "Registration failed";
const PROFILE_FAILED: &str = "Failed to fetch user data";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: String,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

/// Client of the token-issuing auth service.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthClient {
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Log in and persist the session.
    ///
    /// Credentials are validated locally first. The session is stored only
    /// once both the token and the profile have been fetched.
    pub async fn login<S: SessionStore + ?Sized>(
        &self,
        store: &S,
        username: &str,
        password: &str,
    ) -> Result<AuthSession> {
        validate_login(username, password)?;

        let token = self.request_token(username, password).await?;
        let user = self.fetch_profile(&token.access_token).await?;
        let session = AuthSession {
            access_token: token.access_token,
            user,
        };
        store.save(&session)?;

        log::info!("User {} logged in", session.user.username);
        Ok(session)
    }

    async fn request_token(&self, username: &str, password: &str) -> Result<TokenResponse> {
        let form = UrlSearchParams::new()
            .map_err(|e| PortalError::Network(format!("failed to build login form: {e:?}")))?;
        form.append("username", username);
        form.append("password", password);

        let response = Request::post(&self.endpoint("/token"))
            .body(form)?
            .send()
            .await?;
        if !response.ok() {
            return Err(PortalError::Auth(failure_message(response, LOGIN_FAILED).await));
        }

        let token = response.json::<TokenResponse>().await?;
        log::debug!("Received {} token", token.token_type);
        Ok(token)
    }

    async fn fetch_profile(&self, token: &str) -> Result<UserProfile> {
        let response = Request::get(&self.endpoint("/users/me"))
            .header("Authorization", &format!("Bearer {token}"))
            .send()
            .await?;
        if !response.ok() {
            return Err(PortalError::Auth(PROFILE_FAILED.to_string()));
        }
        Ok(response.json::<UserProfile>().await?)
    }

    /// Create an account. The user still has to log in afterwards.
    pub async fn register(&self, form: &RegistrationForm) -> Result<()> {
        validate_registration(form)?;

        let body = RegisterRequest {
            username: &form.username,
            email: &form.email,
            password: &form.password,
        };
        let response = Request::post(&self.endpoint("/register"))
            .json(&body)?
            .send()
            .await?;
        if !response.ok() {
            return Err(PortalError::Auth(
                failure_message(response, REGISTRATION_FAILED).await,
            ));
        }

        log::info!("User {} registered", form.username);
        Ok(())
    }

    pub fn logout<S: SessionStore + ?Sized>(&self, store: &S) {
        store.clear();
        log::info!("User logged out");
    }
}

async fn failure_message(response: Response, fallback: &str) -> String {
    let status = response.status();
    match response.json::<Value>().await {
        Ok(body) => error_message_from_detail(&body, fallback),
        Err(e) => {
            log::error!("Auth service answered {status} without a JSON body: {e}");
            fallback.to_string()
        }
    }
}

fn field_label(field: &str) -> &str {
    match field {
        "username" => "Username",
        "email" => "Email",
        "password" => "Password",
        other => other,
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Human readable message from a FastAPI error body `{"detail": ...}`.
///
/// `detail` may be a plain string, a list of `{loc, msg}` validation errors
/// (one `Field: msg` line each) or an object whose values are joined.
pub fn error_message_from_detail(body: &Value, fallback: &str) -> String {
    let message = match body.get("detail") {
        Some(Value::String(detail)) => detail.clone(),
        Some(Value::Array(errors)) => errors
            .iter()
            .map(|err| {
                let msg = err.get("msg").map(as_text).unwrap_or_default();
                match err.get("loc").and_then(|loc| loc.as_array()?.last()) {
                    Some(Value::String(field)) => format!("{}: {msg}", field_label(field)),
                    Some(other) => format!("{other}: {msg}"),
                    None => msg,
                }
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Some(Value::Object(fields)) => fields.values().map(as_text).collect::<Vec<_>>().join(", "),
        _ => String::new(),
    };

    if message.is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
