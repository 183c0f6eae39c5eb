//! Client for the external identity provider (GoTrue-compatible API).
//!
//! The provider owns credentials and sessions; this service only forwards
//! sign-in, refresh and sign-out calls and never stores tokens.

use mbg_auth::Role;
use mbg_config::IdentityProviderConfig;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("identity provider is not configured")]
    NotConfigured,
    #[error("identity provider request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("identity provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub app_metadata: Option<Value>,
    #[serde(default)]
    pub user_metadata: Option<Value>,
}

impl ProviderUser {
    /// Role recorded by the provider, preferring `app_metadata` (not user editable).
    pub fn role(&self) -> Option<Role> {
        [&self.app_metadata, &self.user_metadata]
            .into_iter()
            .flatten()
            .filter_map(|meta| meta.get("role").and_then(Value::as_str))
            .find_map(|role| role.parse().ok())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub user: Option<ProviderUser>,
}

#[derive(Debug, Clone)]
pub struct IdentityProvider {
    base_url: String,
    api_key: Option<String>,
    http: reqwest::Client,
}

impl IdentityProvider {
    /// Builds a client, or `None` when no provider URL is configured.
    pub fn from_config(config: &IdentityProviderConfig) -> Result<Option<Self>, ProviderError> {
        let Some(base_url) = config.url.clone() else {
            return Ok(None);
        };

        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Some(Self {
            base_url,
            api_key: config.api_key.clone(),
            http,
        }))
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<ProviderSession, ProviderError> {
        self.token_grant("password", json!({ "email": email, "password": password }))
            .await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<ProviderSession, ProviderError> {
        self.token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        let response = self
            .request(reqwest::Method::POST, "/auth/v1/logout")
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            status => Err(rejected(status, response).await),
        }
    }

    async fn token_grant(&self, grant_type: &str, body: Value) -> Result<ProviderSession, ProviderError> {
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/auth/v1/token?grant_type={grant_type}"),
            )
            .json(&body)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(rejected(response.status(), response).await);
        }
        Ok(response.json::<ProviderSession>().await?)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.api_key {
            Some(key) => builder.header("apikey", key),
            None => builder,
        }
    }
}

async fn rejected(status: StatusCode, response: reqwest::Response) -> ProviderError {
    let body: Value = response.json().await.unwrap_or(Value::Null);
    let message = ["error_description", "msg", "message", "error"]
        .into_iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .unwrap_or("no error message")
        .to_string();

    ProviderError::Rejected {
        status: status.as_u16(),
        message,
    }
}
