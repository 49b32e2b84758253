//! GitHub REST client for releases and the community registry
//!
//! Covers the OAuth device flow used to obtain a token and the handful of
//! endpoints `ink plugin publish` needs: releases, release assets, forks,
//! git refs, repository contents and pull requests.

use std::path::Path;
use std::time::Duration;

use base64::Engine;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::registry::{COMMUNITY_BASE_BRANCH, COMMUNITY_OWNER, COMMUNITY_REPO};

/// GitHub REST API root
pub const API_BASE: &str = "https://api.github.com";
/// Host serving the OAuth device flow endpoints
pub const OAUTH_BASE: &str = "https://github.com";
/// Device code endpoint, relative to [`OAUTH_BASE`]
pub const DEVICE_CODE_PATH: &str = "/login/device/code";
/// Access token endpoint polled during the device flow, relative to [`OAUTH_BASE`]
pub const ACCESS_TOKEN_PATH: &str = "/login/oauth/access_token";
/// Scope requested for publishing
pub const OAUTH_SCOPE: &str = "public_repo";

const USER_AGENT: &str = concat!("inkdown-cli/", env!("CARGO_PKG_VERSION"));
const GITHUB_JSON: &str = "application/vnd.github+json";
const DEVICE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";
const SLOW_DOWN_STEP: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors returned by GitHub operations
#[derive(Debug, Error)]
pub enum GitHubError {
    /// The request could not be sent or its body read
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A response body was not the JSON expected
    #[error("unreadable response from GitHub: {0}")]
    Decode(#[source] reqwest::Error),

    /// GitHub answered with an unexpected status
    #[error("failed to {action}: {status} {body}")]
    Api {
        /// What was being attempted, e.g. `create release`
        action: &'static str,
        /// Status GitHub returned
        status: StatusCode,
        /// Response body, for GitHub's error message
        body: String,
    },

    /// The device flow ended with an OAuth error code
    #[error("oauth error: {0}")]
    OAuth(String),

    /// The device code lapsed before the user authorized it
    #[error("device code expired before authorization completed")]
    DeviceCodeExpired,

    /// GitHub rejected the token
    #[error("Invalid token")]
    InvalidToken,

    /// A response lacked a field this client needs
    #[error("unexpected response: missing '{0}'")]
    MissingField(&'static str),

    /// Contents API payload was not valid base64
    #[error("invalid base64 content: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decoded file contents were not UTF-8
    #[error("content is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// A local file to upload could not be read
    #[error("failed to read '{path}': {source}")]
    Io {
        /// File being read
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Result alias for GitHub operations
pub type GitHubResult<T> = Result<T, GitHubError>;

/// Device code issued at the start of the device flow
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceCode {
    /// Secret the CLI polls with
    pub device_code: String,
    /// Code the user types on the verification page
    pub user_code: String,
    /// Page where the user enters the code
    pub verification_uri: String,
    /// Seconds until the codes lapse; 0 when GitHub did not say
    #[serde(default)]
    pub expires_in: u64,
    /// Minimum seconds between polls
    #[serde(default = "default_interval")]
    pub interval: u64,
}

fn default_interval() -> u64 {
    5
}

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// What a single poll of the token endpoint means for the flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The user authorized the device; carries the access token
    Granted(String),
    /// Not authorized yet
    Pending,
    /// Polling too fast; back off before the next poll
    SlowDown,
    /// Any other OAuth error, which ends the flow
    Failed(String),
}

impl From<AccessTokenResponse> for PollOutcome {
    fn from(response: AccessTokenResponse) -> Self {
        if let Some(token) = response.access_token.filter(|t| !t.is_empty()) {
            return PollOutcome::Granted(token);
        }
        match response.error.as_deref() {
            None | Some("") | Some("authorization_pending") => PollOutcome::Pending,
            Some("slow_down") => PollOutcome::SlowDown,
            Some(other) => PollOutcome::Failed(other.to_string()),
        }
    }
}

/// OAuth device flow for a GitHub OAuth app
#[derive(Debug, Clone)]
pub struct DeviceFlow {
    http: Client,
    client_id: String,
    base_url: String,
}

impl DeviceFlow {
    /// Device flow for the OAuth app `client_id` on github.com
    pub fn new(client_id: impl Into<String>) -> GitHubResult<Self> {
        Ok(Self {
            http: build_http()?,
            client_id: client_id.into(),
            base_url: OAUTH_BASE.to_string(),
        })
    }

    /// Serve the flow from a different host, such as GitHub Enterprise
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Ask GitHub for a device and user code
    pub async fn request_code(&self) -> GitHubResult<DeviceCode> {
        debug!("Requesting device code");
        let response = self
            .http
            .post(format!("{}{}", self.base_url, DEVICE_CODE_PATH))
            .header(ACCEPT, "application/json")
            .form(&[("client_id", self.client_id.as_str()), ("scope", OAUTH_SCOPE)])
            .send()
            .await?;
        let response = expect_status(response, &[StatusCode::OK], "request device code").await?;
        response.json().await.map_err(GitHubError::Decode)
    }

    /// Poll until the user authorizes the device, GitHub reports an error or
    /// the code's `expires_in` has passed
    pub async fn poll_for_token(&self, code: &DeviceCode) -> GitHubResult<String> {
        let deadline = (code.expires_in > 0)
            .then(|| Instant::now() + Duration::from_secs(code.expires_in));
        let mut interval = Duration::from_secs(code.interval.max(1));
        loop {
            tokio::time::sleep(interval).await;

            let response = self
                .http
                .post(format!("{}{}", self.base_url, ACCESS_TOKEN_PATH))
                .header(ACCEPT, "application/json")
                .form(&[
                    ("client_id", self.client_id.as_str()),
                    ("device_code", code.device_code.as_str()),
                    ("grant_type", DEVICE_GRANT_TYPE),
                ])
                .send()
                .await?;
            let body: AccessTokenResponse = response.json().await.map_err(GitHubError::Decode)?;

            match PollOutcome::from(body) {
                PollOutcome::Granted(token) => return Ok(token),
                PollOutcome::Pending => debug!("Authorization pending"),
                PollOutcome::SlowDown => {
                    interval += SLOW_DOWN_STEP;
                    debug!(?interval, "GitHub asked to slow down");
                }
                PollOutcome::Failed(error) => return Err(GitHubError::OAuth(error)),
            }

            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Err(GitHubError::DeviceCodeExpired);
            }
        }
    }
}

/// A release as returned by the releases API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    /// Numeric id used by the delete endpoint
    pub id: u64,
    /// Tag the release points at
    pub tag_name: String,
    /// Display title
    #[serde(default)]
    pub name: Option<String>,
    /// Hypermedia template, e.g. `https://uploads.github.com/.../assets{?name,label}`
    pub upload_url: String,
    /// Release page on github.com
    #[serde(default)]
    pub html_url: String,
}

#[derive(Debug, Serialize)]
struct NewRelease<'a> {
    tag_name: &'a str,
    name: &'a str,
    body: &'a str,
    draft: bool,
}

#[derive(Debug, Deserialize)]
struct User {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GitRef {
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct GitObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct Fork {
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: Option<String>,
    sha: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PullRequest {
    html_url: String,
}

/// A decoded file from the contents API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContents {
    /// Decoded file text
    pub content: String,
    /// Blob SHA required to update the file
    pub sha: String,
}

/// Authenticated GitHub REST client
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    token: String,
    api_base: String,
}

impl GitHubClient {
    /// Client for api.github.com authenticated with `token`
    pub fn new(token: impl Into<String>) -> GitHubResult<Self> {
        Ok(Self {
            http: build_http()?,
            token: token.into(),
            api_base: API_BASE.to_string(),
        })
    }

    /// Point the client at a different API root, such as GitHub Enterprise
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let url = if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.api_base, path)
        };
        debug!(%method, %url, "GitHub request");
        self.http
            .request(method, url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, GITHUB_JSON)
    }

    /// Succeeds when GitHub accepts the token
    pub async fn validate_token(&self) -> GitHubResult<()> {
        let response = self.request(reqwest::Method::GET, "/user").send().await?;
        if response.status() == StatusCode::OK {
            Ok(())
        } else {
            Err(GitHubError::InvalidToken)
        }
    }

    /// Login of the token's owner
    pub async fn current_user(&self) -> GitHubResult<String> {
        let response = self.request(reqwest::Method::GET, "/user").send().await?;
        let response = expect_status(response, &[StatusCode::OK], "fetch user").await?;
        let user: User = response.json().await.map_err(GitHubError::Decode)?;
        Ok(user.login)
    }

    /// Release for `tag`, or `None` when it does not exist
    pub async fn release_by_tag(&self, owner: &str, repo: &str, tag: &str) -> GitHubResult<Option<Release>> {
        let path = format!("/repos/{}/{}/releases/tags/{}", owner, repo, tag);
        let response = self.request(reqwest::Method::GET, &path).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = expect_status(response, &[StatusCode::OK], "get release by tag").await?;
        Ok(Some(response.json().await.map_err(GitHubError::Decode)?))
    }

    /// Publish a non-draft release for `tag`
    pub async fn create_release(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
        name: &str,
        body: &str,
    ) -> GitHubResult<Release> {
        let path = format!("/repos/{}/{}/releases", owner, repo);
        let payload = NewRelease {
            tag_name: tag,
            name,
            body,
            draft: false,
        };
        let response = self
            .request(reqwest::Method::POST, &path)
            .json(&payload)
            .send()
            .await?;
        let response = expect_status(response, &[StatusCode::CREATED], "create release").await?;
        let release: Release = response.json().await.map_err(GitHubError::Decode)?;
        info!(id = release.id, tag, "Created release");
        Ok(release)
    }

    /// Delete a release by id, leaving its tag behind
    pub async fn delete_release(&self, owner: &str, repo: &str, id: u64) -> GitHubResult<()> {
        let path = format!("/repos/{}/{}/releases/{}", owner, repo, id);
        let response = self.request(reqwest::Method::DELETE, &path).send().await?;
        expect_status(response, &[StatusCode::NO_CONTENT], "delete release").await?;
        Ok(())
    }

    /// Delete the tag ref; a 422 (ref already gone) counts as success
    pub async fn delete_tag(&self, owner: &str, repo: &str, tag: &str) -> GitHubResult<()> {
        let path = format!("/repos/{}/{}/git/refs/tags/{}", owner, repo, tag);
        let response = self.request(reqwest::Method::DELETE, &path).send().await?;
        expect_status(
            response,
            &[StatusCode::NO_CONTENT, StatusCode::UNPROCESSABLE_ENTITY],
            "delete tag",
        )
        .await?;
        Ok(())
    }

    /// Upload `file` as a release asset named after its file name
    pub async fn upload_asset(&self, release: &Release, file: &Path, content_type: &str) -> GitHubResult<()> {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bytes = tokio::fs::read(file).await.map_err(|source| GitHubError::Io {
            path: file.display().to_string(),
            source,
        })?;

        let url = strip_url_template(&release.upload_url);
        let response = self
            .request(reqwest::Method::POST, url)
            .query(&[("name", name.as_str())])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        expect_status(response, &[StatusCode::CREATED], "upload asset").await?;
        Ok(())
    }

    /// Fork the community registry into the user's account, returning `owner/repo`
    pub async fn fork_community_repo(&self) -> GitHubResult<String> {
        let path = format!("/repos/{}/{}/forks", COMMUNITY_OWNER, COMMUNITY_REPO);
        let response = self
            .request(reqwest::Method::POST, &path)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        let response = expect_status(response, &[StatusCode::ACCEPTED], "create fork").await?;
        let fork: Fork = response.json().await.map_err(GitHubError::Decode)?;
        Ok(fork.full_name)
    }

    /// Head commit SHA of `branch` in `full_repo` (`owner/repo`)
    pub async fn branch_sha(&self, full_repo: &str, branch: &str) -> GitHubResult<String> {
        let path = format!("/repos/{}/git/refs/heads/{}", full_repo, branch);
        let response = self.request(reqwest::Method::GET, &path).send().await?;
        let response = expect_status(response, &[StatusCode::OK], "get branch SHA").await?;
        let git_ref: GitRef = response.json().await.map_err(GitHubError::Decode)?;
        Ok(git_ref.object.sha)
    }

    /// Create `branch` in `full_repo` at commit `sha`
    pub async fn create_branch(&self, full_repo: &str, branch: &str, sha: &str) -> GitHubResult<()> {
        let path = format!("/repos/{}/git/refs", full_repo);
        let response = self
            .request(reqwest::Method::POST, &path)
            .json(&serde_json::json!({
                "ref": format!("refs/heads/{}", branch),
                "sha": sha,
            }))
            .send()
            .await?;
        expect_status(response, &[StatusCode::CREATED], "create branch").await?;
        Ok(())
    }

    /// Read and decode a file from the contents API
    pub async fn file_contents(&self, full_repo: &str, branch: &str, file: &str) -> GitHubResult<FileContents> {
        let path = format!("/repos/{}/contents/{}", full_repo, file);
        let response = self
            .request(reqwest::Method::GET, &path)
            .query(&[("ref", branch)])
            .send()
            .await?;
        let response = expect_status(response, &[StatusCode::OK], "read file").await?;
        let body: ContentsResponse = response.json().await.map_err(GitHubError::Decode)?;

        let encoded = body.content.ok_or(GitHubError::MissingField("content"))?;
        let sha = body.sha.ok_or(GitHubError::MissingField("sha"))?;
        Ok(FileContents {
            content: decode_content(&encoded)?,
            sha,
        })
    }

    /// Commit new contents for an existing file
    pub async fn update_file(
        &self,
        full_repo: &str,
        branch: &str,
        file: &str,
        content: &str,
        sha: &str,
        message: &str,
    ) -> GitHubResult<()> {
        let path = format!("/repos/{}/contents/{}", full_repo, file);
        let response = self
            .request(reqwest::Method::PUT, &path)
            .json(&serde_json::json!({
                "message": message,
                "content": encode_content(content),
                "branch": branch,
                "sha": sha,
            }))
            .send()
            .await?;
        expect_status(response, &[StatusCode::OK, StatusCode::CREATED], "update file").await?;
        Ok(())
    }

    /// Open a pull request against the community registry, returning its URL
    pub async fn create_pull_request(&self, head: &str, title: &str, body: &str) -> GitHubResult<String> {
        let path = format!("/repos/{}/{}/pulls", COMMUNITY_OWNER, COMMUNITY_REPO);
        let response = self
            .request(reqwest::Method::POST, &path)
            .json(&serde_json::json!({
                "title": title,
                "head": head,
                "base": COMMUNITY_BASE_BRANCH,
                "body": body,
            }))
            .send()
            .await?;
        let response = expect_status(response, &[StatusCode::CREATED], "create pull request").await?;
        let pr: PullRequest = response.json().await.map_err(GitHubError::Decode)?;
        Ok(pr.html_url)
    }
}

fn build_http() -> GitHubResult<Client> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

async fn expect_status(
    response: Response,
    expected: &[StatusCode],
    action: &'static str,
) -> GitHubResult<Response> {
    let status = response.status();
    if expected.contains(&status) {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GitHubError::Api {
        action,
        status,
        body,
    })
}

/// Drop an RFC 6570 suffix such as `{?name,label}` from a hypermedia URL
pub fn strip_url_template(url: &str) -> &str {
    match url.find('{') {
        Some(index) => &url[..index],
        None => url,
    }
}

/// Decode contents API base64, which GitHub wraps at 60 columns
pub fn decode_content(encoded: &str) -> GitHubResult<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD.decode(compact)?;
    Ok(String::from_utf8(bytes)?)
}

/// Encode file text for the contents API
pub fn encode_content(content: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(content)
}
