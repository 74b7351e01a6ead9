//! Export configuration.
//!
//! Values come from an optional TOML file and are then overridden by
//! command-line flags. Required values are checked by
//! [`ExportConfig::resolve`] once both layers are merged.

use crate::error::{ExportError, ExportResult};
use kbexport_client::{AuthScheme, ClientConfig, DEFAULT_PAGE_SIZE};
use kbexport_shape::MalformedPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Unvalidated export settings, as read from a config file.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub target_url: Option<String>,
    pub credential: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub auth_scheme: AuthScheme,
    pub page_size: u32,
    pub paginate: bool,
    pub timeout_secs: Option<u64>,
    pub insecure: bool,
    /// Restricts the run to these space ids. Empty means every space.
    pub spaces: Vec<String>,
    /// Saved-object types to export. Empty means every type.
    pub types: Vec<String>,
    pub on_malformed: MalformedPolicy,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            target_url: None,
            credential: None,
            output_dir: None,
            auth_scheme: AuthScheme::default(),
            page_size: DEFAULT_PAGE_SIZE,
            paginate: true,
            timeout_secs: None,
            insecure: false,
            spaces: Vec::new(),
            types: Vec::new(),
            on_malformed: MalformedPolicy::default(),
        }
    }
}

impl fmt::Debug for ExportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportConfig")
            .field("target_url", &self.target_url)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .field("output_dir", &self.output_dir)
            .field("auth_scheme", &self.auth_scheme)
            .field("page_size", &self.page_size)
            .field("paginate", &self.paginate)
            .field("timeout_secs", &self.timeout_secs)
            .field("insecure", &self.insecure)
            .field("spaces", &self.spaces)
            .field("types", &self.types)
            .field("on_malformed", &self.on_malformed)
            .finish()
    }
}

/// Settings the pipeline needs besides the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub output_dir: PathBuf,
    pub spaces: Vec<String>,
    pub on_malformed: MalformedPolicy,
}

impl ExportOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            spaces: Vec::new(),
            on_malformed: MalformedPolicy::default(),
        }
    }
}

impl ExportConfig {
    /// Reads a TOML config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> ExportResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| ExportError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml(&text)
            .map_err(|e| ExportError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Checks required values and splits the config into client and
    /// pipeline settings.
    pub fn resolve(self) -> ExportResult<(ClientConfig, ExportOptions)> {
        let missing = |name: &str| ExportError::Config(format!("`{name}` is required"));

        let base_url = self
            .target_url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| missing("target_url"))?;
        let credential = self
            .credential
            .filter(|c| !c.is_empty())
            .ok_or_else(|| missing("credential"))?;
        let output_dir = self.output_dir.ok_or_else(|| missing("output_dir"))?;
        if self.page_size == 0 {
            return Err(ExportError::Config("`page_size` must be at least 1".into()));
        }

        let client = ClientConfig {
            base_url,
            credential,
            auth_scheme: self.auth_scheme,
            page_size: self.page_size,
            paginate: self.paginate,
            timeout_secs: self.timeout_secs,
            accept_invalid_certs: self.insecure,
            saved_object_types: self.types,
        };
        let options = ExportOptions {
            output_dir,
            spaces: self.spaces,
            on_malformed: self.on_malformed,
        };
        Ok((client, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn complete() -> ExportConfig {
        ExportConfig {
            target_url: Some("https://kibana.example:5601".into()),
            credential: Some("secret".into()),
            output_dir: Some("/tmp/out".into()),
            ..Default::default()
        }
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = ExportConfig::from_toml("").unwrap();
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert!(config.paginate);
        assert!(config.spaces.is_empty());
        assert!(config.types.is_empty());
        assert_eq!(config.on_malformed, MalformedPolicy::Skip);
    }

    #[test]
    fn file_values_are_parsed() {
        let config = ExportConfig::from_toml(
            r#"
            target_url = "https://kibana.example"
            auth_scheme = "bearer"
            page_size = 500
            paginate = false
            spaces = ["default", "ops"]
            types = ["dashboard", "visualization"]
            on_malformed = "fail"
            "#,
        )
        .unwrap();
        assert_eq!(config.target_url.as_deref(), Some("https://kibana.example"));
        assert_eq!(config.auth_scheme, AuthScheme::Bearer);
        assert_eq!(config.page_size, 500);
        assert!(!config.paginate);
        assert_eq!(config.spaces, vec!["default", "ops"]);
        assert_eq!(config.types, vec!["dashboard", "visualization"]);
        assert_eq!(config.on_malformed, MalformedPolicy::Fail);
    }

    #[test]
    fn unknown_auth_scheme_is_rejected() {
        assert!(ExportConfig::from_toml(r#"auth_scheme = "basic""#).is_err());
    }

    #[test]
    fn resolve_builds_client_config() {
        let mut config = complete();
        config.insecure = true;
        config.timeout_secs = Some(30);
        config.types = vec!["dashboard".into()];

        let (client, options) = config.resolve().unwrap();
        assert_eq!(client.saved_object_types, vec!["dashboard"]);
        assert_eq!(client.base_url, "https://kibana.example:5601");
        assert_eq!(client.credential, "secret");
        assert!(client.accept_invalid_certs);
        assert_eq!(client.timeout_secs, Some(30));
        assert_eq!(options.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn resolve_requires_target_credential_and_output() {
        for field in ["target_url", "credential", "output_dir"] {
            let mut config = complete();
            match field {
                "target_url" => config.target_url = None,
                "credential" => config.credential = Some(String::new()),
                _ => config.output_dir = None,
            }
            let err = config.resolve().unwrap_err();
            assert!(
                matches!(&err, ExportError::Config(msg) if msg.contains(field)),
                "{field}: {err}"
            );
        }
    }

    #[test]
    fn resolve_rejects_zero_page_size() {
        let mut config = complete();
        config.page_size = 0;
        assert!(matches!(config.resolve(), Err(ExportError::Config(_))));
    }

    #[test]
    fn debug_output_hides_credential() {
        let rendered = format!("{:?}", complete());
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
