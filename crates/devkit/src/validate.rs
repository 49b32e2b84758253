//! Static checks run by `ink plugin validate` and `ink theme validate`
//!
//! Validation never stops at the first problem unless the rest of the checks
//! cannot run; everything found is collected into a [`ValidationReport`].

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::manifest::{
    is_valid_version, ManifestError, PluginManifest, ThemeManifest, PLUGIN_MANIFEST_FILE,
    THEME_MANIFEST_FILE,
};

/// Extensions allowed under a plugin's `src/` directory
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    ".ts", ".js", ".mjs", ".json", ".md", ".css", ".png", ".jpg", ".jpeg", ".svg", ".gitignore",
    ".yaml", ".yml", ".rs", ".toml",
];

/// File names allowed regardless of extension
pub const ALLOWED_FILE_NAMES: &[&str] = &["LICENSE", "README", "README.md"];

/// Extensions whose contents are scanned for forbidden tokens
pub const SCRIPT_EXTENSIONS: &[&str] = &[".ts", ".js", ".mjs"];

/// A token plugin scripts must not use, with the note shown when found
#[derive(Debug, Clone, Copy)]
pub struct ForbiddenToken {
    /// Substring searched for on each non-comment line
    pub token: &'static str,
    /// Guidance shown under the error
    pub note: &'static str,
}

/// Tokens rejected in plugin scripts
pub const FORBIDDEN_TOKENS: &[ForbiddenToken] = &[
    ForbiddenToken {
        token: "window.",
        note: "Direct access to \"window\" is forbidden. Use platform-agnostic abstractions.",
    },
    ForbiddenToken {
        token: "document.",
        note: "Direct access to \"document\" is forbidden. Use platform-agnostic abstractions.",
    },
    ForbiddenToken {
        token: "innerHTML",
        note: "Usage of \"innerHTML\" is forbidden.",
    },
    ForbiddenToken {
        token: "outerHTML",
        note: "Usage of \"outerHTML\" is forbidden.",
    },
    ForbiddenToken {
        token: "@codemirror/",
        note: "Direct imports from \"@codemirror/\" are forbidden. Use @inkdown/core editor abstractions.",
    },
    ForbiddenToken {
        token: "@tauri-apps/",
        note: "Direct imports from \"@tauri-apps/\" are forbidden. Use @inkdown/core native abstractions.",
    },
];

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Reported, but validation still passes
    Warning,
    /// Fails validation
    Error,
}

/// A single finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Whether this finding fails validation
    pub severity: Severity,
    /// One-line description
    pub message: String,
    /// Extra guidance printed under the message
    pub note: Option<String>,
}

impl Diagnostic {
    /// An error-level finding
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            note: None,
        }
    }

    /// A warning-level finding
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            note: None,
        }
    }

    /// Attach guidance printed under the message
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Everything validation found in one project
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Findings in the order they were made
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    fn push(&mut self, diagnostic: Diagnostic) {
        debug!(severity = ?diagnostic.severity, "{}", diagnostic.message);
        self.diagnostics.push(diagnostic);
    }

    /// True when no error-level diagnostic was recorded
    pub fn passed(&self) -> bool {
        !self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    /// Error-level findings
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error)
    }

    /// Warning-level findings
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning)
    }
}

/// Validate the plugin project rooted at `dir`
pub fn validate_plugin(dir: &Path) -> ValidationReport {
    let mut report = ValidationReport::default();

    match PluginManifest::load(dir) {
        Ok(manifest) => {
            for field in manifest.missing_fields() {
                report.push(Diagnostic::error(format!(
                    "{} missing '{}'",
                    PLUGIN_MANIFEST_FILE, field
                )));
            }
            if !manifest.version.is_empty() && !is_valid_version(&manifest.version) {
                report.push(
                    Diagnostic::warning(format!("Invalid version format: '{}'", manifest.version))
                        .with_note("Expected MAJOR.MINOR or MAJOR.MINOR.PATCH, e.g. 1.0.0"),
                );
            }
        }
        Err(err) => report.push(manifest_diagnostic(err)),
    }

    let src = dir.join("src");
    if !src.is_dir() {
        report.push(Diagnostic::error(
            "Missing 'src' directory. Plugin source must be in 'src'.",
        ));
        return report;
    }

    for entry in WalkDir::new(&src).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                report.push(Diagnostic::error(format!("Error scanning files: {}", err)));
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }
        trace!("Checking {}", entry.path().display());
        check_source_file(entry.path(), &mut report);
    }

    report
}

/// Validate the theme project rooted at `dir`
pub fn validate_theme(dir: &Path) -> ValidationReport {
    let mut report = ValidationReport::default();

    let theme = match ThemeManifest::load(dir) {
        Ok(theme) => theme,
        Err(err) => {
            report.push(manifest_diagnostic(err));
            return report;
        }
    };

    for field in theme.missing_fields() {
        report.push(Diagnostic::error(format!(
            "{} missing '{}'",
            THEME_MANIFEST_FILE, field
        )));
    }
    if !theme.version.is_empty() && !is_valid_version(&theme.version) {
        report.push(Diagnostic::warning(format!(
            "Invalid version format: '{}'",
            theme.version
        )));
    }

    for mode in theme.effective_modes() {
        let css = format!("{}.css", mode);
        if !dir.join(&css).is_file() {
            report.push(Diagnostic::error(format!(
                "Missing required CSS file for mode '{}': {}",
                mode, css
            )));
        }
    }

    report
}

fn manifest_diagnostic(err: ManifestError) -> Diagnostic {
    Diagnostic::error(err.to_string())
}

fn check_source_file(path: &Path, report: &mut ValidationReport) {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = extension_of(&file_name);

    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) && !ALLOWED_FILE_NAMES.contains(&file_name.as_str()) {
        report.push(Diagnostic::error(format!(
            "Forbidden file type found: {} (Extension \"{}\" is not in whitelist)",
            path.display(),
            ext
        )));
    }

    if !SCRIPT_EXTENSIONS.contains(&ext.as_str()) {
        return;
    }

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            report.push(Diagnostic::error(format!(
                "Could not read {}: {}",
                path.display(),
                err
            )));
            return;
        }
    };
    let content = String::from_utf8_lossy(&bytes);

    for (line, finding) in scan_forbidden_tokens(&content) {
        report.push(
            Diagnostic::error(format!(
                "Forbidden token \"{}\" found in {}:{}",
                finding.token,
                path.display(),
                line
            ))
            .with_note(finding.note),
        );
    }
}

/// Lowercased extension including the dot, taken from the last `.` in the name.
///
/// A dotfile such as `.gitignore` is its own extension.
pub fn extension_of(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(index) => file_name[index..].to_lowercase(),
        None => String::new(),
    }
}

/// Forbidden tokens in `content` as `(1-based line, token)` pairs.
///
/// Lines starting with `//` or `*` after trimming are comments and skipped.
pub fn scan_forbidden_tokens(content: &str) -> Vec<(usize, &'static ForbiddenToken)> {
    let mut findings = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.starts_with("//") || trimmed.starts_with('*') {
            continue;
        }
        for rule in FORBIDDEN_TOKENS {
            if line.contains(rule.token) {
                findings.push((index + 1, rule));
            }
        }
    }
    findings
}

/// Errors from resolving a project directory argument
#[derive(Debug, Error)]
pub enum ProjectDirError {
    /// The path could not be made absolute
    #[error("Invalid path '{}': {source}", .path.display())]
    Invalid {
        /// Path as given
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Nothing exists at the path
    #[error("Directory does not exist: {}", .0.display())]
    NotFound(PathBuf),

    /// The path exists but is not a directory
    #[error("Path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

/// Resolve and check a project directory argument
pub fn resolve_project_dir(path: &Path) -> Result<PathBuf, ProjectDirError> {
    let resolved = std::path::absolute(path).map_err(|source| ProjectDirError::Invalid {
        path: path.to_path_buf(),
        source,
    })?;
    if !resolved.exists() {
        return Err(ProjectDirError::NotFound(resolved));
    }
    if !resolved.is_dir() {
        return Err(ProjectDirError::NotADirectory(resolved));
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn plugin_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(PLUGIN_MANIFEST_FILE),
            r#"{"name":"Word Count","version":"1.0.0"}"#,
        )
        .unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        dir
    }

    fn messages(report: &ValidationReport) -> Vec<&str> {
        report.diagnostics.iter().map(|d| d.message.as_str()).collect()
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("main.TS"), ".ts");
        assert_eq!(extension_of("archive.tar.gz"), ".gz");
        assert_eq!(extension_of(".gitignore"), ".gitignore");
        assert_eq!(extension_of("LICENSE"), "");
    }

    #[test]
    fn test_clean_plugin_passes() {
        let dir = plugin_dir();
        std::fs::write(dir.path().join("src/lib.rs"), "pub fn noop() {}\n").unwrap();
        std::fs::write(dir.path().join("src/README.md"), "# Word Count\n").unwrap();
        std::fs::write(dir.path().join("src/LICENSE"), "MIT\n").unwrap();

        let report = validate_plugin(dir.path());
        assert!(report.passed(), "{:?}", report);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_missing_src_stops_validation() {
        let dir = TempDir::new().unwrap();
        let report = validate_plugin(dir.path());

        assert_eq!(
            messages(&report),
            vec![
                "Missing 'manifest.json'",
                "Missing 'src' directory. Plugin source must be in 'src'.",
            ]
        );
        assert!(!report.passed());
    }

    #[test]
    fn test_manifest_field_errors_and_version_warning() {
        let dir = plugin_dir();
        std::fs::write(dir.path().join(PLUGIN_MANIFEST_FILE), r#"{"version":"one"}"#).unwrap();

        let report = validate_plugin(dir.path());
        let errors: Vec<_> = report.errors().map(|d| d.message.as_str()).collect();
        assert_eq!(errors, vec!["manifest.json missing 'name'"]);
        assert_eq!(report.warnings().count(), 1);
    }

    #[test]
    fn test_forbidden_extension() {
        let dir = plugin_dir();
        std::fs::create_dir(dir.path().join("src/bin")).unwrap();
        std::fs::write(dir.path().join("src/bin/tool.exe"), [0u8, 1, 2]).unwrap();

        let report = validate_plugin(dir.path());
        assert_eq!(report.errors().count(), 1);
        assert!(report.diagnostics[0].message.contains("Extension \".exe\" is not in whitelist"));
    }

    #[test]
    fn test_forbidden_tokens_skip_comments() {
        let source = "// window.alert is banned\n * document.body\nconst el = document.body;\nel.innerHTML = x;\n";
        let findings: Vec<(usize, &str)> = scan_forbidden_tokens(source)
            .into_iter()
            .map(|(line, rule)| (line, rule.token))
            .collect();
        assert_eq!(findings, vec![(3, "document."), (4, "innerHTML")]);
    }

    #[test]
    fn test_forbidden_token_reported_with_note() {
        let dir = plugin_dir();
        std::fs::write(
            dir.path().join("src/main.ts"),
            "import { EditorView } from '@codemirror/view';\n",
        )
        .unwrap();

        let report = validate_plugin(dir.path());
        assert!(!report.passed());
        let diagnostic = report.errors().next().unwrap();
        assert!(diagnostic.message.starts_with("Forbidden token \"@codemirror/\""));
        assert!(diagnostic.message.ends_with("main.ts:1"));
        assert!(diagnostic.note.as_deref().unwrap().contains("@inkdown/core"));
    }

    #[test]
    fn test_theme_requires_css_per_mode() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(THEME_MANIFEST_FILE),
            r#"{"name":"Nord","version":"1.0.0","modes":["light","dark"]}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("dark.css"), "").unwrap();

        let report = validate_theme(dir.path());
        assert_eq!(
            messages(&report),
            vec!["Missing required CSS file for mode 'light': light.css"]
        );
    }

    #[test]
    fn test_missing_theme_manifest_stops_validation() {
        let dir = TempDir::new().unwrap();
        let report = validate_theme(dir.path());
        assert_eq!(messages(&report), vec!["Missing 'theme.json'"]);
    }

    #[test]
    fn test_resolve_project_dir() {
        let dir = TempDir::new().unwrap();
        assert!(resolve_project_dir(dir.path()).is_ok());

        let file = dir.path().join("file.txt");
        std::fs::write(&file, "").unwrap();
        assert!(matches!(
            resolve_project_dir(&file),
            Err(ProjectDirError::NotADirectory(_))
        ));
        let missing = resolve_project_dir(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(missing, ProjectDirError::NotFound(_)));
        assert!(missing.to_string().starts_with("Directory does not exist: "));
    }

    #[test]
    fn test_non_utf8_script_is_still_scanned() {
        let dir = plugin_dir();
        std::fs::write(
            dir.path().join("src/main.js"),
            b"window.location = 'x';\n// \xff\n",
        )
        .unwrap();

        let report = validate_plugin(dir.path());
        assert!(!report.passed());
        let messages = messages(&report);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("Forbidden token \"window.\""));
        assert!(messages[0].ends_with("main.js:1"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_sources_are_checked() {
        let dir = plugin_dir();
        let payload = dir.path().join("payload.txt");
        std::fs::write(&payload, "const body = document.body;\n").unwrap();
        std::os::unix::fs::symlink(&payload, dir.path().join("src/tool.exe")).unwrap();
        std::os::unix::fs::symlink(&payload, dir.path().join("src/util.js")).unwrap();

        let report = validate_plugin(dir.path());
        let messages = messages(&report);
        assert_eq!(messages.len(), 2, "{:?}", messages);
        assert!(messages[0].contains("tool.exe (Extension \".exe\" is not in whitelist)"));
        assert!(messages[1].starts_with("Forbidden token \"document.\""));
        assert!(messages[1].ends_with("util.js:1"));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_reported() {
        let dir = plugin_dir();
        std::os::unix::fs::symlink(dir.path().join("gone.js"), dir.path().join("src/gone.js"))
            .unwrap();

        let report = validate_plugin(dir.path());
        assert!(!report.passed());
    }
}
