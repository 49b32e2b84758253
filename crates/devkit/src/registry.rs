//! Community registry (`plugins.json`) entries
//!
//! The registry lives in the `inkdown/inkdown-community` repository as a
//! JSON array. Publishing adds or replaces one entry and opens a pull request.
//! Entries written by other tools are carried through untouched, whatever
//! fields they have.

use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::manifest::PluginManifest;

/// Organization that owns the community registry
pub const COMMUNITY_OWNER: &str = "inkdown";
/// Repository holding the community registry
pub const COMMUNITY_REPO: &str = "inkdown-community";
/// Branch pull requests target
pub const COMMUNITY_BASE_BRANCH: &str = "main";
/// Registry file inside the community repository
pub const REGISTRY_FILE: &str = "plugins.json";

/// The entry this tool writes for a published plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Registry key, the plugin's repository name
    pub id: String,
    /// Display name
    pub name: String,
    /// GitHub owner of the plugin repository
    pub author: String,
    /// Released version
    pub version: String,
    /// Short description
    #[serde(default)]
    pub description: String,
    /// `owner/repo` of the plugin's GitHub repository
    pub repo: String,
}

impl RegistryEntry {
    /// Entry for a plugin released from `owner/repo`
    pub fn for_release(manifest: &PluginManifest, owner: &str, repo: &str) -> Self {
        Self {
            id: repo.to_string(),
            name: manifest.name.clone(),
            author: owner.to_string(),
            version: manifest.version.clone(),
            description: manifest.description.clone(),
            repo: format!("{}/{}", owner, repo),
        }
    }
}

/// Insert `entry` into the registry document, replacing any entry with the same id.
///
/// Other entries are kept exactly as found, including ones missing fields
/// [`RegistryEntry`] requires. A blank document is treated as an empty
/// registry; anything other than a JSON array is an error. The result is
/// pretty-printed with a trailing newline.
pub fn upsert_entry(existing: &str, entry: RegistryEntry) -> Result<String, serde_json::Error> {
    let mut entries: Vec<Value> = if existing.trim().is_empty() {
        Vec::new()
    } else {
        match serde_json::from_str(existing)? {
            Value::Array(entries) => entries,
            other => {
                return Err(serde_json::Error::custom(format!(
                    "registry must be a JSON array, found {}",
                    json_kind(&other)
                )))
            }
        }
    };

    let id = entry.id.clone();
    let value = serde_json::to_value(entry)?;
    match entries
        .iter_mut()
        .find(|e| e.get("id").and_then(Value::as_str) == Some(id.as_str()))
    {
        Some(slot) => {
            tracing::debug!(id = %id, "Replacing registry entry");
            *slot = value;
        }
        None => {
            tracing::debug!(id = %id, "Appending registry entry");
            entries.push(value);
        }
    }

    let mut out = serde_json::to_string_pretty(&entries)?;
    out.push('\n');
    Ok(out)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Branch in the fork that carries the registry change
pub fn branch_name(repo: &str) -> String {
    format!("add-plugin/{}", repo)
}

/// Commit message for the registry change
pub fn commit_message(manifest: &PluginManifest) -> String {
    format!("feat: add plugin {} v{}", manifest.name, manifest.version)
}

/// Body of the registry pull request
pub fn pull_request_body(manifest: &PluginManifest) -> String {
    format!(
        "\n### New Plugin (v{})\n\n- **Name:** {}\n- **Description:** {}\n\nPublished via Inkdown CLI.",
        manifest.version, manifest.name, manifest.description
    )
}
