//! `ink plugin publish`: build, release on GitHub, register in the community index
//!
//! The flow talks to the terminal only through [`PublishUi`], so the CLI owns
//! presentation and tests can script the prompts.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use inkdown_config::{ConfigError, Env, TokenStore};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::github::{DeviceFlow, GitHubClient, GitHubError, Release};
use crate::manifest::{slugify, ManifestError, PluginManifest, PLUGIN_MANIFEST_FILE};
use crate::registry::{self, RegistryEntry, COMMUNITY_BASE_BRANCH, REGISTRY_FILE};

/// Optional stylesheet shipped next to the main artifact
pub const STYLES_FILE: &str = "styles.css";
/// Target plugins are compiled for when built with cargo
pub const WASM_TARGET: &str = "wasm32-unknown-unknown";

/// Terminal interactions the publish flow needs
pub trait PublishUi {
    /// Progress message
    fn info(&mut self, message: &str);
    /// Non-fatal problem
    fn warn(&mut self, message: &str);
    /// A step finished
    fn success(&mut self, message: &str);
    /// Supplementary detail, such as the pull request body
    fn note(&mut self, message: &str);
    /// Show `prompt` and read one trimmed line
    fn input(&mut self, prompt: &str) -> std::io::Result<String>;
    /// Best-effort attempt to show `url` in a browser
    fn open_url(&mut self, url: &str);

    /// Ask a yes/no question; only `y` or `yes` confirm
    fn confirm(&mut self, prompt: &str) -> std::io::Result<bool> {
        let answer = self.input(prompt)?.to_lowercase();
        Ok(answer == "y" || answer == "yes")
    }
}

/// Errors that abort a publish
#[derive(Debug, Error)]
pub enum PublishError {
    /// `manifest.json` is missing, malformed or incomplete
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// A build tool could not be started
    #[error("failed to run '{command}': {source}")]
    Spawn {
        /// Command line that was attempted
        command: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A build tool exited unsuccessfully
    #[error("'{command}' exited with {status}")]
    BuildFailed {
        /// Command line that failed
        command: String,
        /// Its exit status
        status: std::process::ExitStatus,
    },

    /// The file a release needs is not there after building
    #[error("build completed but '{0}' was not found")]
    MissingArtifact(String),

    /// The project's `Cargo.toml` has no usable package name
    #[error("invalid Cargo.toml: {0}")]
    CargoManifest(String),

    /// The compiled wasm could not be copied next to the manifest
    #[error("failed to copy '{from}' to '{to}': {source}")]
    Copy {
        /// Build output
        from: PathBuf,
        /// Destination named by the manifest
        to: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Local `ink` state could not be read or written
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A GitHub call failed
    #[error(transparent)]
    GitHub(#[from] GitHubError),

    /// The registry file could not be updated
    #[error("failed to update {file}: {source}")]
    Registry {
        /// Registry file name
        file: &'static str,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// Reading the user's answer failed
    #[error("failed to read input: {0}")]
    Prompt(#[source] std::io::Error),
}

/// How a plugin project is built before release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildKind {
    /// `package.json`: `bun install` then `bun run build`
    Bun,
    /// `Cargo.toml`: release build for [`WASM_TARGET`]
    Cargo,
    /// Nothing to build; assets must already exist
    Prebuilt,
}

impl BuildKind {
    /// Pick the build from the files present in `dir`
    pub fn detect(dir: &Path) -> Self {
        if dir.join("package.json").is_file() {
            BuildKind::Bun
        } else if dir.join("Cargo.toml").is_file() {
            BuildKind::Cargo
        } else {
            BuildKind::Prebuilt
        }
    }
}

/// How publishing ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Release created and registry pull request opened
    Published {
        /// Pull request against the community registry
        pull_request_url: String,
    },
    /// The user declined to overwrite an existing release
    Aborted,
}

/// Drives a publish using the account configuration of this machine
#[derive(Debug, Clone)]
pub struct Publisher {
    env: Env,
    tokens: TokenStore,
    repository: Option<(String, String)>,
}

impl Publisher {
    /// Publisher talking to the GitHub API named by `env`
    pub fn new(env: Env, tokens: TokenStore) -> Self {
        Self {
            env,
            tokens,
            repository: None,
        }
    }

    /// Release to `owner/repo` instead of the checkout's `origin` remote
    pub fn with_repository(mut self, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        self.repository = Some((owner.into(), repo.into()));
        self
    }

    fn github(&self, token: &str) -> Result<GitHubClient, GitHubError> {
        Ok(GitHubClient::new(token)?.with_api_base(self.env.github_api_url.as_str()))
    }

    /// Publish the plugin rooted at `dir`
    pub async fn publish(&self, dir: &Path, ui: &mut dyn PublishUi) -> Result<PublishOutcome, PublishError> {
        ui.info("Started the publish process...");
        let manifest = prepare(dir, ui).await?;

        let github = self.github(&self.github_token(ui).await?)?;
        github.validate_token().await?;

        let detected = match &self.repository {
            Some(repository) => Some(repository.clone()),
            None => origin_repository(dir).await,
        };
        let (owner, repo) = match detected {
            Some(found) => found,
            None => {
                let owner = github.current_user().await?;
                let repo = slugify(&manifest.name);
                ui.warn(&format!(
                    "Could not detect git remote. Defaulting to {}/{}",
                    owner, repo
                ));
                (owner, repo)
            }
        };

        let tag = manifest.tag_name();
        ui.info(&format!(
            "Checking for existing release {} in {}/{}...",
            tag, owner, repo
        ));
        if let Some(existing) = github.release_by_tag(&owner, &repo, &tag).await? {
            ui.warn(&format!("Release {} already exists!", tag));
            let overwrite = ui
                .confirm("Do you want to overwrite it? ALL ASSETS WILL BE REPLACED. (y/N): ")
                .map_err(PublishError::Prompt)?;
            if !overwrite {
                ui.info("Aborting.");
                return Ok(PublishOutcome::Aborted);
            }

            ui.info("Deleting old release...");
            github.delete_release(&owner, &repo, existing.id).await?;
            if let Err(err) = github.delete_tag(&owner, &repo, &tag).await {
                warn!("Could not delete tag {}: {}", tag, err);
            }
        }

        ui.info(&format!("Creating release {}...", tag));
        let release = github
            .create_release(
                &owner,
                &repo,
                &tag,
                &format!("{} {}", manifest.name, manifest.version),
                &manifest.description,
            )
            .await?;
        upload_assets(&github, &release, dir, &manifest, ui).await?;
        ui.success("Release published successfully!");

        ui.info("Proceeding to update Community Registry...");
        let pull_request_url = register(&github, &manifest, &owner, &repo, ui).await?;
        Ok(PublishOutcome::Published { pull_request_url })
    }

    async fn github_token(&self, ui: &mut dyn PublishUi) -> Result<String, PublishError> {
        if let Some(token) = self.tokens.load() {
            if self.github(&token)?.validate_token().await.is_ok() {
                ui.info("Using saved GitHub token");
                return Ok(token);
            }
            debug!("Saved GitHub token was rejected");
        }

        let flow = DeviceFlow::new(self.env.client_id.as_str())?;
        let code = flow.request_code().await?;
        ui.info(&format!(
            "To authorize this application, open: {}",
            code.verification_uri
        ));
        ui.info(&format!("And enter the code: {}", code.user_code));
        ui.open_url(&code.verification_uri);

        let token = flow.poll_for_token(&code).await?;
        if let Err(err) = self.tokens.save(&token) {
            ui.warn(&format!("Could not save GitHub token: {}", err));
        }
        Ok(token)
    }
}

/// Load the manifest, run the build and check the release artifact exists
pub async fn prepare(dir: &Path, ui: &mut dyn PublishUi) -> Result<PluginManifest, PublishError> {
    let manifest = PluginManifest::load_checked(dir)?;
    ui.info(&format!("Detected Plugin: {}", manifest.display_name()));

    match BuildKind::detect(dir) {
        BuildKind::Bun => {
            ui.info("Building plugin...");
            run(dir, "bun", &["install"], ui).await?;
            run(dir, "bun", &["run", "build"], ui).await?;
        }
        BuildKind::Cargo => {
            ui.info("Building plugin...");
            run(
                dir,
                "cargo",
                &["build", "--release", "--target", WASM_TARGET],
                ui,
            )
            .await?;
            copy_wasm_artifact(dir, &manifest)?;
        }
        BuildKind::Prebuilt => {
            ui.warn("No package.json or Cargo.toml found. Skipping build step (expecting pre-built assets).");
        }
    }

    if !dir.join(&manifest.main).is_file() {
        return Err(PublishError::MissingArtifact(manifest.main.clone()));
    }
    ui.success("Build successful!");
    Ok(manifest)
}

async fn run(dir: &Path, program: &str, args: &[&str], ui: &mut dyn PublishUi) -> Result<(), PublishError> {
    let command = format!("{} {}", program, args.join(" "));
    ui.info(&format!("Running '{}'...", command));

    let status = Command::new(program)
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .status()
        .await
        .map_err(|source| PublishError::Spawn {
            command: command.clone(),
            source,
        })?;

    if !status.success() {
        return Err(PublishError::BuildFailed { command, status });
    }
    Ok(())
}

/// Where cargo leaves the compiled plugin for the package in `dir`
pub fn wasm_artifact_path(dir: &Path) -> Result<PathBuf, PublishError> {
    let cargo_toml = dir.join("Cargo.toml");
    let raw = std::fs::read_to_string(&cargo_toml)
        .map_err(|e| PublishError::CargoManifest(e.to_string()))?;
    let parsed: toml::Value =
        toml::from_str(&raw).map_err(|e| PublishError::CargoManifest(e.to_string()))?;
    let name = parsed
        .get("package")
        .and_then(|p| p.get("name"))
        .and_then(|n| n.as_str())
        .ok_or_else(|| PublishError::CargoManifest("missing package.name".to_string()))?;

    let target_dir = std::env::var_os("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| dir.join("target"));
    Ok(target_dir
        .join(WASM_TARGET)
        .join("release")
        .join(format!("{}.wasm", name.replace('-', "_"))))
}

fn copy_wasm_artifact(dir: &Path, manifest: &PluginManifest) -> Result<(), PublishError> {
    let from = wasm_artifact_path(dir)?;
    let to = dir.join(&manifest.main);
    if !from.is_file() {
        return Err(PublishError::MissingArtifact(from.display().to_string()));
    }
    std::fs::copy(&from, &to).map_err(|source| PublishError::Copy {
        from: from.clone(),
        to: to.clone(),
        source,
    })?;
    debug!("Copied {} to {}", from.display(), to.display());
    Ok(())
}

/// Files attached to the release, in upload order
pub fn release_assets(dir: &Path, manifest: &PluginManifest) -> Vec<PathBuf> {
    let mut assets = vec![dir.join(&manifest.main), dir.join(PLUGIN_MANIFEST_FILE)];
    let styles = dir.join(STYLES_FILE);
    if styles.is_file() {
        assets.push(styles);
    }
    assets
}

async fn upload_assets(
    github: &GitHubClient,
    release: &Release,
    dir: &Path,
    manifest: &PluginManifest,
    ui: &mut dyn PublishUi,
) -> Result<(), PublishError> {
    for asset in release_assets(dir, manifest) {
        let name = asset
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        ui.info(&format!("Uploading {}...", name));
        github
            .upload_asset(release, &asset, content_type_for(&asset))
            .await?;
    }
    Ok(())
}

async fn register(
    github: &GitHubClient,
    manifest: &PluginManifest,
    owner: &str,
    repo: &str,
    ui: &mut dyn PublishUi,
) -> Result<String, PublishError> {
    let fork = github.fork_community_repo().await?;
    let fork_owner = fork.split('/').next().unwrap_or(owner).to_string();
    let branch = registry::branch_name(repo);

    let sha = github.branch_sha(&fork, COMMUNITY_BASE_BRANCH).await?;
    if let Err(err) = github.create_branch(&fork, &branch, &sha).await {
        // A previous publish may have left the branch behind
        info!("Reusing branch {}: {}", branch, err);
    }

    let current = github.file_contents(&fork, &branch, REGISTRY_FILE).await?;
    ui.info(&format!("Updating {}...", REGISTRY_FILE));
    let entry = RegistryEntry::for_release(manifest, owner, repo);
    let updated = registry::upsert_entry(&current.content, entry).map_err(|source| {
        PublishError::Registry {
            file: REGISTRY_FILE,
            source,
        }
    })?;
    github
        .update_file(
            &fork,
            &branch,
            REGISTRY_FILE,
            &updated,
            &current.sha,
            &registry::commit_message(manifest),
        )
        .await?;

    let body = registry::pull_request_body(manifest);
    ui.note(&format!("Creating the following PR:\n{}", body));
    let title = ui
        .input("Please provide a title for your PR: ")
        .map_err(PublishError::Prompt)?;
    let title = if title.is_empty() {
        registry::commit_message(manifest)
    } else {
        title
    };

    let head = format!("{}:{}", fork_owner, branch);
    Ok(github.create_pull_request(&head, &title, &body).await?)
}

/// `(owner, repo)` of the `origin` remote of the git checkout at `dir`
async fn origin_repository(dir: &Path) -> Option<(String, String)> {
    let output = Command::new("git")
        .args(["remote", "get-url", "origin"])
        .current_dir(dir)
        .stderr(Stdio::null())
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    parse_remote_url(String::from_utf8_lossy(&output.stdout).trim())
}

/// Owner and repository from an SSH or HTTPS GitHub remote URL, or a bare
/// `owner/repo`
pub fn parse_remote_url(url: &str) -> Option<(String, String)> {
    let url = url.trim().trim_end_matches('/');
    let url = url.strip_suffix(".git").unwrap_or(url);

    let mut parts = url.rsplit('/');
    let repo = parts.next()?;
    let owner = parts.next()?;
    // SSH form: git@github.com:owner/repo
    let owner = owner.rsplit(':').next()?;

    // GitHub logins never contain a dot, so this is a host with no owner path
    if owner.is_empty() || repo.is_empty() || owner.contains('.') {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}

/// Content type for an uploaded release asset
pub fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("js") | Some("mjs") => "application/javascript",
        Some("json") => "application/json",
        Some("css") => "text/css",
        Some("wasm") => "application/wasm",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::encode_content;
    use crate::test_server::{Recorded, TestServer};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[derive(Default)]
    struct ScriptedUi {
        lines: Vec<String>,
        answers: Vec<String>,
    }

    impl PublishUi for ScriptedUi {
        fn info(&mut self, message: &str) {
            self.lines.push(format!("info: {}", message));
        }
        fn warn(&mut self, message: &str) {
            self.lines.push(format!("warn: {}", message));
        }
        fn success(&mut self, message: &str) {
            self.lines.push(format!("success: {}", message));
        }
        fn note(&mut self, message: &str) {
            self.lines.push(format!("note: {}", message));
        }
        fn input(&mut self, _prompt: &str) -> std::io::Result<String> {
            Ok(if self.answers.is_empty() {
                String::new()
            } else {
                self.answers.remove(0)
            })
        }
        fn open_url(&mut self, url: &str) {
            self.lines.push(format!("open: {}", url));
        }
    }

    fn write_manifest(dir: &Path, main: &str) {
        std::fs::write(
            dir.join(PLUGIN_MANIFEST_FILE),
            format!(r#"{{"name":"Word Count","version":"1.0.0","main":"{}"}}"#, main),
        )
        .unwrap();
    }

    #[test]
    fn test_parse_remote_url() {
        let expected = Some(("octocat".to_string(), "word-count".to_string()));
        assert_eq!(parse_remote_url("git@github.com:octocat/word-count.git"), expected);
        assert_eq!(parse_remote_url("https://github.com/octocat/word-count.git"), expected);
        assert_eq!(parse_remote_url("https://github.com/octocat/word-count"), expected);
        assert_eq!(parse_remote_url("ssh://git@github.com/octocat/word-count.git\n"), expected);
        assert_eq!(parse_remote_url("octocat/word-count"), expected);
        assert_eq!(parse_remote_url("word-count"), None);
        assert_eq!(parse_remote_url(""), None);
        assert_eq!(parse_remote_url("https://github.com/octocat"), None);
        assert_eq!(parse_remote_url("git@github.com:word-count.git"), None);
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for(Path::new("main.js")), "application/javascript");
        assert_eq!(content_type_for(Path::new("manifest.json")), "application/json");
        assert_eq!(content_type_for(Path::new("styles.css")), "text/css");
        assert_eq!(content_type_for(Path::new("main.wasm")), "application/wasm");
        assert_eq!(content_type_for(Path::new("README")), "application/octet-stream");
    }

    #[test]
    fn test_build_detection() {
        let dir = TempDir::new().unwrap();
        assert_eq!(BuildKind::detect(dir.path()), BuildKind::Prebuilt);

        std::fs::write(dir.path().join("Cargo.toml"), "").unwrap();
        assert_eq!(BuildKind::detect(dir.path()), BuildKind::Cargo);

        std::fs::write(dir.path().join("package.json"), "{}").unwrap();
        assert_eq!(BuildKind::detect(dir.path()), BuildKind::Bun);
    }

    #[test]
    fn test_wasm_artifact_path_uses_crate_name() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("Cargo.toml"),
            "[package]\nname = \"word-count\"\nversion = \"1.0.0\"\n",
        )
        .unwrap();

        let path = wasm_artifact_path(dir.path()).unwrap();
        assert!(path.ends_with("wasm32-unknown-unknown/release/word_count.wasm"));

        std::fs::write(dir.path().join("Cargo.toml"), "[workspace]\n").unwrap();
        assert!(matches!(
            wasm_artifact_path(dir.path()),
            Err(PublishError::CargoManifest(_))
        ));
    }

    #[test]
    fn test_release_assets_include_optional_styles() {
        let dir = TempDir::new().unwrap();
        let manifest = PluginManifest::minimal("Word Count", "1.0.0");
        assert_eq!(release_assets(dir.path(), &manifest).len(), 2);

        std::fs::write(dir.path().join(STYLES_FILE), "").unwrap();
        let assets = release_assets(dir.path(), &manifest);
        assert_eq!(assets.last(), Some(&dir.path().join(STYLES_FILE)));
    }

    #[tokio::test]
    async fn test_prepare_prebuilt_plugin() {
        let dir = TempDir::new().unwrap();
        write_manifest(dir.path(), "main.js");
        std::fs::write(dir.path().join("main.js"), "export default {}").unwrap();

        let mut ui = ScriptedUi::default();
        let manifest = prepare(dir.path(), &mut ui).await.unwrap();
        assert_eq!(manifest.name, "Word Count");
        assert!(ui.lines.iter().any(|l| l.starts_with("warn: No package.json")));
        assert_eq!(ui.lines.last().map(String::as_str), Some("success: Build successful!"));
    }

    #[tokio::test]
    async fn test_prepare_requires_artifact() {
        let dir = TempDir::new().unwrap();
        write_manifest(dir.path(), "main.js");

        let mut ui = ScriptedUi::default();
        let err = prepare(dir.path(), &mut ui).await.unwrap_err();
        assert_eq!(err.to_string(), "build completed but 'main.js' was not found");
    }

    #[tokio::test]
    async fn test_prepare_requires_version() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(PLUGIN_MANIFEST_FILE), r#"{"name":"Word Count"}"#).unwrap();

        let mut ui = ScriptedUi::default();
        let err = prepare(dir.path(), &mut ui).await.unwrap_err();
        assert_eq!(err.to_string(), "manifest.json missing 'version'");
    }

    const PULL_REQUEST_URL: &str = "https://github.com/inkdown/inkdown-community/pull/12";

    /// GitHub as seen by a publish of octocat/word-count whose v1.0.0
    /// release already exists
    fn github_route(request: &Recorded) -> (u16, String) {
        let release = |id: u64| {
            format!(
                r#"{{"id":{},"tag_name":"v1.0.0","upload_url":"/uploads/{}/assets{{?name,label}}"}}"#,
                id, id
            )
        };
        let repo = "/repos/octocat/word-count";
        let fork = "/repos/octocat/inkdown-community";
        let method = request.method.as_str();
        let path = request.url.split('?').next().unwrap_or_default();

        match (method, path) {
            ("GET", "/user") => (200, r#"{"login":"octocat"}"#.to_string()),
            ("GET", p) if p == format!("{}/releases/tags/v1.0.0", repo) => (200, release(7)),
            ("DELETE", p) if p == format!("{}/releases/7", repo) => (204, String::new()),
            ("DELETE", p) if p == format!("{}/git/refs/tags/v1.0.0", repo) => {
                (422, r#"{"message":"Reference does not exist"}"#.to_string())
            }
            ("POST", p) if p == format!("{}/releases", repo) => (201, release(8)),
            ("POST", "/uploads/8/assets") => (201, "{}".to_string()),
            ("POST", "/repos/inkdown/inkdown-community/forks") => {
                (202, r#"{"full_name":"octocat/inkdown-community"}"#.to_string())
            }
            ("GET", p) if p == format!("{}/git/refs/heads/main", fork) => {
                (200, r#"{"object":{"sha":"base-sha"}}"#.to_string())
            }
            ("POST", p) if p == format!("{}/git/refs", fork) => {
                (422, r#"{"message":"Reference already exists"}"#.to_string())
            }
            ("GET", p) if p == format!("{}/contents/plugins.json", fork) => (
                200,
                serde_json::json!({ "content": encode_content("[]"), "sha": "blob-sha" }).to_string(),
            ),
            ("PUT", p) if p == format!("{}/contents/plugins.json", fork) => (200, "{}".to_string()),
            ("POST", "/repos/inkdown/inkdown-community/pulls") => (
                201,
                serde_json::json!({ "html_url": PULL_REQUEST_URL }).to_string(),
            ),
            _ => (404, r#"{"message":"Not Found"}"#.to_string()),
        }
    }

    struct Fixture {
        server: TestServer,
        plugin: TempDir,
        state: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let plugin = TempDir::new().unwrap();
            write_manifest(plugin.path(), "main.js");
            std::fs::write(plugin.path().join("main.js"), "export default {}").unwrap();

            let state = TempDir::new().unwrap();
            TokenStore::at(state.path().join("github-token"))
                .save("gho_saved")
                .unwrap();

            Self {
                server: TestServer::start(github_route),
                plugin,
                state,
            }
        }

        fn publisher(&self) -> Publisher {
            let api = self.server.url();
            let env = Env::from_lookup(|key| (key == "GITHUB_API_URL").then(|| api.clone()));
            Publisher::new(env, TokenStore::at(self.state.path().join("github-token")))
                .with_repository("octocat", "word-count")
        }

        async fn publish(&self, answers: &[&str]) -> (PublishOutcome, Vec<Recorded>) {
            let mut ui = ScriptedUi {
                answers: answers.iter().map(|a| a.to_string()).collect(),
                ..ScriptedUi::default()
            };
            let outcome = self
                .publisher()
                .publish(self.plugin.path(), &mut ui)
                .await
                .unwrap();
            (outcome, self.server.requests())
        }
    }

    fn position(requests: &[Recorded], method: &str, path: &str) -> usize {
        requests
            .iter()
            .position(|r| r.is(method, path))
            .unwrap_or_else(|| panic!("no {} {} in {:?}", method, path, requests))
    }

    #[tokio::test]
    async fn test_declining_overwrite_aborts_without_deleting() {
        let fixture = Fixture::new();
        let (outcome, requests) = fixture.publish(&["n"]).await;

        assert_eq!(outcome, PublishOutcome::Aborted);
        assert!(requests.iter().all(|r| r.method == "GET"), "{:?}", requests);
        position(&requests, "GET", "/repos/octocat/word-count/releases/tags/v1.0.0");
    }

    #[tokio::test]
    async fn test_overwrite_replaces_release_and_opens_pull_request() {
        let fixture = Fixture::new();
        let (outcome, requests) = fixture.publish(&["y", ""]).await;

        assert_eq!(
            outcome,
            PublishOutcome::Published {
                pull_request_url: PULL_REQUEST_URL.to_string()
            }
        );

        let delete_release = position(&requests, "DELETE", "/repos/octocat/word-count/releases/7");
        let delete_tag = position(
            &requests,
            "DELETE",
            "/repos/octocat/word-count/git/refs/tags/v1.0.0",
        );
        let create = position(&requests, "POST", "/repos/octocat/word-count/releases");
        assert!(delete_release < delete_tag && delete_tag < create);

        let uploads: Vec<&str> = requests
            .iter()
            .filter(|r| r.is("POST", "/uploads/8/assets"))
            .map(|r| r.url.as_str())
            .collect();
        assert_eq!(
            uploads,
            vec!["/uploads/8/assets?name=main.js", "/uploads/8/assets?name=manifest.json"]
        );

        let update = &requests[position(
            &requests,
            "PUT",
            "/repos/octocat/inkdown-community/contents/plugins.json",
        )];
        let update = update.json();
        assert_eq!(update["sha"], "blob-sha");
        assert_eq!(update["branch"], "add-plugin/word-count");
        let registry = crate::github::decode_content(update["content"].as_str().unwrap()).unwrap();
        let registry: serde_json::Value = serde_json::from_str(&registry).unwrap();
        assert_eq!(registry[0]["id"], "word-count");
        assert_eq!(registry[0]["repo"], "octocat/word-count");
    }

    #[tokio::test]
    async fn test_empty_pull_request_title_uses_commit_message() {
        let fixture = Fixture::new();
        let (_, requests) = fixture.publish(&["yes", ""]).await;

        let pull = &requests[position(&requests, "POST", "/repos/inkdown/inkdown-community/pulls")];
        let pull = pull.json();
        assert_eq!(pull["title"], "feat: add plugin Word Count v1.0.0");
        assert_eq!(pull["head"], "octocat:add-plugin/word-count");
        assert_eq!(pull["base"], "main");
    }

    #[tokio::test]
    async fn test_custom_pull_request_title() {
        let fixture = Fixture::new();
        let (_, requests) = fixture.publish(&["y", "Add Word Count"]).await;

        let pull = &requests[position(&requests, "POST", "/repos/inkdown/inkdown-community/pulls")];
        assert_eq!(pull.json()["title"], "Add Word Count");
    }

    #[test]
    fn test_confirm_accepts_only_yes() {
        let mut ui = ScriptedUi {
            answers: vec!["Y".into(), "yes".into(), "no".into(), "".into()],
            ..ScriptedUi::default()
        };
        assert!(ui.confirm("?").unwrap());
        assert!(ui.confirm("?").unwrap());
        assert!(!ui.confirm("?").unwrap());
        assert!(!ui.confirm("?").unwrap());
    }
}
