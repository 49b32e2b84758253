//! Inkdown account login for `ink auth`

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors from the Inkdown account API
#[derive(Debug, Error)]
pub enum AuthError {
    /// The request did not complete or the response was unreadable
    #[error("failed to connect to server: {0}")]
    Network(#[from] reqwest::Error),

    /// The server refused the login, with its message
    #[error("{0}")]
    Rejected(String),

    /// Login succeeded but no token came back
    #[error("server did not return a token")]
    MissingToken,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
    name: &'a str,
}

/// Body of `POST /cli/login`
#[derive(Debug, Default, Deserialize)]
pub struct LoginResponse {
    /// Whether the credentials were accepted
    #[serde(default)]
    pub success: bool,
    /// Issued token details
    #[serde(default)]
    pub data: LoginData,
    /// Reason for a failed login
    #[serde(default)]
    pub error: Option<String>,
}

/// Token details issued for this device
#[derive(Debug, Default, Deserialize)]
pub struct LoginData {
    /// Server-side token id
    #[serde(default)]
    pub id: String,
    /// Device name the token is registered under
    #[serde(default)]
    pub name: String,
    /// The secret itself
    #[serde(default)]
    pub token: String,
    /// Non-secret prefix shown in the account dashboard
    #[serde(default)]
    pub token_prefix: String,
    /// Granted scopes
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Issue timestamp as sent by the server
    #[serde(default)]
    pub created_at: String,
}

impl LoginResponse {
    /// The issued token, or the reason there is none
    pub fn into_token(self) -> Result<String, AuthError> {
        if !self.success {
            let message = self
                .error
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(AuthError::Rejected(message));
        }
        if self.data.token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        Ok(self.data.token)
    }
}

/// Client for the Inkdown account API
#[derive(Debug, Clone)]
pub struct AccountClient {
    http: Client,
    api_base_url: String,
}

impl AccountClient {
    /// Client for the API rooted at `api_base_url`
    pub fn new(api_base_url: impl Into<String>) -> Result<Self, AuthError> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            http,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Exchange credentials for a CLI token registered under `device_name`
    pub async fn login(&self, email: &str, password: &str, device_name: &str) -> Result<String, AuthError> {
        let url = format!("{}/cli/login", self.api_base_url);
        debug!(%url, device = device_name, "Logging in");

        let response = self
            .http
            .post(url)
            .json(&LoginRequest {
                email,
                password,
                name: device_name,
            })
            .send()
            .await?;
        let body: LoginResponse = response.json().await?;
        body.into_token()
    }
}

/// Name this machine registers its token under: `<hostname>-<os>-<arch>`
///
/// The host name comes from the operating system, not the environment.
pub fn device_name() -> String {
    device_name_for(&gethostname::gethostname().to_string_lossy())
}

fn device_name_for(host: &str) -> String {
    let host = match host.trim() {
        "" => "unknown",
        host => host,
    };
    format!("{}-{}-{}", host, std::env::consts::OS, std::env::consts::ARCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> LoginResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_successful_login_yields_token() {
        let response = parse(
            r#"{"success":true,"data":{"id":"1","name":"laptop-linux-x86_64","token":"ink_abc","token_prefix":"ink_","scopes":["plugins:publish"],"created_at":"2025-01-01"}}"#,
        );
        assert_eq!(response.into_token().unwrap(), "ink_abc");
    }

    #[test]
    fn test_rejection_uses_server_message() {
        let err = parse(r#"{"success":false,"error":"invalid credentials"}"#)
            .into_token()
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid credentials");
    }

    #[test]
    fn test_rejection_without_message() {
        let err = parse(r#"{"success":false}"#).into_token().unwrap_err();
        assert_eq!(err.to_string(), "unknown error");
    }

    #[test]
    fn test_success_without_token() {
        let err = parse(r#"{"success":true,"data":{}}"#).into_token().unwrap_err();
        assert!(matches!(err, AuthError::MissingToken));
    }

    #[test]
    fn test_device_name_shape() {
        let suffix = format!("-{}-{}", std::env::consts::OS, std::env::consts::ARCH);
        let name = device_name();
        assert!(name.ends_with(&suffix));
        assert!(!name.starts_with('-'));
    }

    #[test]
    fn test_device_name_uses_os_hostname() {
        let host = gethostname::gethostname().to_string_lossy().trim().to_string();
        let expected = if host.is_empty() { "unknown".to_string() } else { host };
        let name = device_name();
        let (prefix, _) = name.rsplit_once(&format!("-{}-", std::env::consts::OS)).unwrap();
        assert_eq!(prefix, expected);
    }

    #[test]
    fn test_device_name_for_blank_host() {
        let suffix = format!("-{}-{}", std::env::consts::OS, std::env::consts::ARCH);
        assert_eq!(device_name_for("  \n"), format!("unknown{}", suffix));
        assert_eq!(device_name_for("laptop\n"), format!("laptop{}", suffix));
    }
}
