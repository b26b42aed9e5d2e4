//! Startup configuration: the API key plus generation settings.
//!
//! Everything is resolved once, before the form is shown. A missing key is an
//! [`Error`] from [`Config::load`], never a lookup that fails halfway through
//! a session.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::prompt::PromptTemplate;

/// Name of the secret, both as a TOML key and as an environment variable.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Secrets file read when no path is given on the command line.
pub const DEFAULT_SECRETS_PATH: &str = "secrets.toml";

pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Resolved configuration, passed by reference to whatever needs it.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub template: PromptTemplate,
}

/// On-disk layout of the secrets file.
#[derive(Debug, Default, Deserialize)]
struct SecretsFile {
    #[serde(rename = "GEMINI_API_KEY")]
    api_key: Option<String>,

    #[serde(default)]
    generation: GenerationSection,

    #[serde(default)]
    prompt: PromptSection,
}

#[derive(Debug, Default, Deserialize)]
struct GenerationSection {
    model: Option<String>,
    api_base: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PromptSection {
    /// Path to a custom template, relative to the secrets file.
    template: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the secrets file at `path` (or
    /// [`DEFAULT_SECRETS_PATH`]), falling back to the environment for the key.
    ///
    /// A missing file is fine as long as the key comes from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let path = path.unwrap_or(Path::new(DEFAULT_SECRETS_PATH));
        let env_key = std::env::var(API_KEY_VAR).ok();
        Self::from_file(path, env_key)
    }

    /// Load configuration from `path`, using `env_key` when the file has no key.
    pub fn from_file(path: &Path, env_key: Option<String>) -> Result<Self, Error> {
        let file = SecretsFile::read(path)?;

        let api_key = file
            .api_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| env_key.filter(|k| !k.trim().is_empty()))
            .ok_or(Error::MissingApiKey)?;

        let template = file.prompt.load(path)?;

        Ok(Self {
            api_key,
            model: file
                .generation
                .model
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: file
                .generation
                .api_base
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            template,
        })
    }

    /// Load only the prompt template named by the secrets file at `path` (or
    /// [`DEFAULT_SECRETS_PATH`]). The API key is not needed for this.
    pub fn load_template(path: Option<&Path>) -> Result<PromptTemplate, Error> {
        let path = path.unwrap_or(Path::new(DEFAULT_SECRETS_PATH));
        SecretsFile::read(path)?.prompt.load(path)
    }
}

impl SecretsFile {
    /// Parse the file at `path`; a missing file reads as empty.
    fn read(path: &Path) -> Result<Self, Error> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| Error::Parse {
                path: path.display().to_string(),
                source: e,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(Error::Read {
                path: path.display().to_string(),
                source: e,
            }),
        }
    }
}

impl PromptSection {
    /// The configured template, or the bundled one. `secrets_path` anchors
    /// relative template paths.
    fn load(&self, secrets_path: &Path) -> Result<PromptTemplate, Error> {
        let Some(template_path) = &self.template else {
            return Ok(PromptTemplate::default());
        };
        let template_path = secrets_path
            .parent()
            .map(|dir| dir.join(template_path))
            .unwrap_or_else(|| template_path.clone());
        let text = std::fs::read_to_string(&template_path).map_err(|e| Error::Read {
            path: template_path.display().to_string(),
            source: e,
        })?;
        Ok(PromptTemplate::parse(text)?)
    }
}

/// Errors from loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Gemini API key not found. Add GEMINI_API_KEY to your secrets file or environment.")]
    MissingApiKey,

    #[error("failed to read '{path}'")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{path}'")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid prompt template")]
    Template(#[from] crate::prompt::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn key_from_file_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "secrets.toml", "GEMINI_API_KEY = \"file-key\"\n");

        let config = Config::from_file(&path, Some("env-key".into())).unwrap();
        assert_eq!(config.api_key, "file-key");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.template, PromptTemplate::default());
    }

    #[test]
    fn key_from_env_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let config = Config::from_file(&path, Some("env-key".into())).unwrap();
        assert_eq!(config.api_key, "env-key");
    }

    #[test]
    fn missing_key_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "secrets.toml", "[generation]\nmodel = \"m\"\n");

        assert!(matches!(
            Config::from_file(&path, None),
            Err(Error::MissingApiKey)
        ));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "secrets.toml", "GEMINI_API_KEY = \"  \"\n");

        assert!(matches!(
            Config::from_file(&path, Some(String::new())),
            Err(Error::MissingApiKey)
        ));
    }

    #[test]
    fn generation_and_prompt_sections() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "brief.txt", "Rewrite:\n{content_brief}\n");
        let path = write(
            dir.path(),
            "secrets.toml",
            r#"
GEMINI_API_KEY = "k"

[generation]
model = "gemini-2.5-flash"
api_base = "http://localhost:9999/v1beta"

[prompt]
template = "brief.txt"
"#,
        );

        let config = Config::from_file(&path, None).unwrap();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.api_base, "http://localhost:9999/v1beta");
        assert_eq!(config.template.render("x"), "Rewrite:\nx\n");
    }

    #[test]
    fn template_without_slot_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bad.txt", "no slot");
        let path = write(
            dir.path(),
            "secrets.toml",
            "GEMINI_API_KEY = \"k\"\n[prompt]\ntemplate = \"bad.txt\"\n",
        );

        assert!(matches!(
            Config::from_file(&path, None),
            Err(Error::Template(crate::prompt::Error::MissingSlot))
        ));
    }

    #[test]
    fn template_loads_without_a_key() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "custom.md", "Custom:\n{content_brief}\n");
        let path = write(
            dir.path(),
            "secrets.toml",
            "[prompt]\ntemplate = \"custom.md\"\n",
        );

        assert!(matches!(
            Config::from_file(&path, None),
            Err(Error::MissingApiKey)
        ));
        let template = Config::load_template(Some(&path)).unwrap();
        assert_eq!(template.as_str(), "Custom:\n{content_brief}\n");
    }

    #[test]
    fn template_errors_are_reported_without_a_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "secrets.toml",
            "[prompt]\ntemplate = \"missing.md\"\n",
        );

        assert!(matches!(
            Config::load_template(Some(&path)),
            Err(Error::Read { .. })
        ));
    }

    #[test]
    fn missing_secrets_file_gives_bundled_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        assert_eq!(
            Config::load_template(Some(&path)).unwrap(),
            PromptTemplate::default()
        );
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "secrets.toml", "GEMINI_API_KEY = ");

        assert!(matches!(
            Config::from_file(&path, None),
            Err(Error::Parse { .. })
        ));
    }
}
