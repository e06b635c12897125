//! Stack configuration.
//!
//! Provides the [`StackConfig`] struct that loads from TOML files,
//! environment variables, and defaults using the `confyg` crate. The config
//! is built once at startup and passed by reference to the fetcher and the
//! endpoint resolver.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `STACKPAGE_CONFIG` environment variable
//! 3. XDG default: `~/.config/stackpage/config.toml`
//! 4. Built-in defaults
//!
//! `CONTENTSTACK_*` environment variables overlay whichever file was loaded,
//! e.g. `CONTENTSTACK_API_KEY` sets `api_key`.

use std::fmt;
use std::path::PathBuf;

use confyg::{Confygery, env};
use serde::{Deserialize, Deserializer, Serialize};

use crate::endpoints::{Endpoints, HostOverrides, Region, resolve_endpoints};
use crate::{Error, Result};

/// Prefix of the environment variables overlaid onto the config.
pub const ENV_PREFIX: &str = "CONTENTSTACK";

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "STACKPAGE_CONFIG";

// ============================================================================
// Configuration struct
// ============================================================================

/// Credentials, preview settings, and host overrides for one stack.
///
/// Credentials are not validated here; a missing API key or token only
/// shows up as a failed request.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StackConfig {
    /// Region token (`EU`, `NA`, `AZURE-EU`, ...). Unknown tokens need host overrides.
    pub region: String,

    /// Stack API key.
    pub api_key: String,

    /// Delivery token sent as `access_token`.
    pub delivery_token: String,

    /// Publishing environment name.
    pub environment: String,

    /// Live preview switch. Only the exact value `true` enables it.
    #[serde(deserialize_with = "deserialize_flag")]
    pub preview: bool,

    /// Token sent as `preview_token` alongside a live preview hash.
    pub preview_token: Option<String>,

    /// Use the built-in regional host table.
    #[serde(deserialize_with = "deserialize_flag")]
    pub use_managed_endpoints: bool,

    /// Content delivery host override.
    pub content_delivery: Option<String>,

    /// REST preview host override.
    pub preview_host: Option<String>,

    /// GraphQL delivery host override.
    pub graphql_host: Option<String>,

    /// GraphQL preview host override.
    pub graphql_preview_host: Option<String>,

    /// Application host override (live preview bridge).
    pub content_application: Option<String>,

    /// HTTP request timeout in seconds. Unset leaves the client default.
    #[serde(deserialize_with = "deserialize_opt_secs")]
    pub timeout_secs: Option<u64>,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            region: Region::DEFAULT_TOKEN.to_string(),
            api_key: String::new(),
            delivery_token: String::new(),
            environment: String::new(),
            preview: false,
            preview_token: None,
            use_managed_endpoints: true,
            content_delivery: None,
            preview_host: None,
            graphql_host: None,
            graphql_preview_host: None,
            content_application: None,
            timeout_secs: None,
        }
    }
}

impl fmt::Debug for StackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackConfig")
            .field("region", &self.region)
            .field("api_key", &self.api_key)
            .field("delivery_token", &redact(&self.delivery_token))
            .field("environment", &self.environment)
            .field("preview", &self.preview)
            .field(
                "preview_token",
                &self.preview_token.as_deref().map(redact),
            )
            .field("use_managed_endpoints", &self.use_managed_endpoints)
            .field("host_overrides", &self.host_overrides())
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() { "" } else { "***" }
}

// ============================================================================
// Config loading
// ============================================================================

impl StackConfig {
    /// Load configuration from file, environment, and defaults.
    ///
    /// Loading priority:
    /// 1. Explicit `config_path` (from `--config` flag)
    /// 2. `STACKPAGE_CONFIG` env var
    /// 3. XDG default: `~/.config/stackpage/config.toml`
    /// 4. Built-in defaults
    ///
    /// A config path that does not exist is skipped, not an error.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path) {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading config file");
                builder
                    .add_file(&path.to_string_lossy())
                    .map_err(|e| Error::config(format!("config file: {e}")))?;
            }
        }

        let env_opts = env::Options::with_top_level(ENV_PREFIX);
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        let config: Self = builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))?;

        Ok(config)
    }

    /// Resolve the config file path from explicit flag, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }

        Self::default_config_path()
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("stackpage").join("config.toml"))
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Flatten this config into environment variable pairs with `CONTENTSTACK_` prefix.
    pub fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        let value: toml::Value =
            toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        let mut vars = Vec::new();
        flatten_toml_value(&value, ENV_PREFIX, &mut vars);
        Ok(vars)
    }

    // ------------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------------

    /// The configured region.
    pub fn region(&self) -> Region {
        Region::from_token(&self.region)
    }

    /// The five host overrides.
    pub fn host_overrides(&self) -> HostOverrides {
        HostOverrides {
            content_delivery: self.content_delivery.clone(),
            preview: self.preview_host.clone(),
            graphql: self.graphql_host.clone(),
            graphql_preview: self.graphql_preview_host.clone(),
            application: self.content_application.clone(),
        }
    }

    /// Resolve this stack's endpoints.
    pub fn endpoints(&self) -> Endpoints {
        resolve_endpoints(
            &self.region(),
            self.use_managed_endpoints,
            &self.host_overrides(),
        )
    }

    /// Preview token, ignoring blank values.
    pub fn preview_token(&self) -> Option<&str> {
        self.preview_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }
}

// ============================================================================
// Lenient deserializers
// ============================================================================

// Environment overlays arrive as strings, TOML files carry native types.
#[derive(Deserialize)]
#[serde(untagged)]
enum FlagRepr {
    Bool(bool),
    Text(String),
}

fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match FlagRepr::deserialize(deserializer)? {
        FlagRepr::Bool(value) => value,
        FlagRepr::Text(text) => text == "true",
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SecsRepr {
    Number(u64),
    Text(String),
}

fn deserialize_opt_secs<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<SecsRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(SecsRepr::Number(secs)) => Ok(Some(secs)),
        Some(SecsRepr::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(SecsRepr::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid timeout_secs '{text}': {e}"))),
    }
}

// ============================================================================
// Helper: flatten TOML to env vars
// ============================================================================

/// Recursively flatten a TOML value into `KEY=value` pairs.
fn flatten_toml_value(value: &toml::Value, prefix: &str, out: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, val) in table {
                let env_key = format!("{}_{}", prefix, key.to_uppercase());
                flatten_toml_value(val, &env_key, out);
            }
        }
        toml::Value::Array(arr) => {
            if let Ok(json) = serde_json::to_string(arr) {
                out.push((prefix.to_string(), json));
            }
        }
        toml::Value::String(s) => out.push((prefix.to_string(), s.clone())),
        toml::Value::Integer(i) => out.push((prefix.to_string(), i.to_string())),
        toml::Value::Float(f) => out.push((prefix.to_string(), f.to_string())),
        toml::Value::Boolean(b) => out.push((prefix.to_string(), b.to_string())),
        toml::Value::Datetime(dt) => out.push((prefix.to_string(), dt.to_string())),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// RAII guard for env var manipulation in tests.
    struct EnvGuard {
        key: String,
        prev: Option<String>,
    }

    impl EnvGuard {
        fn new(key: &str, value: &str) -> Self {
            let prev = std::env::var(key).ok();
            // SAFETY: each test touches a distinct variable.
            unsafe { std::env::set_var(key, value) };
            Self {
                key: key.to_string(),
                prev,
            }
        }

        fn remove(key: &str) -> Self {
            let prev = std::env::var(key).ok();
            // SAFETY: each test touches a distinct variable.
            unsafe { std::env::remove_var(key) };
            Self {
                key: key.to_string(),
                prev,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            // SAFETY: restores the variable this guard owns.
            unsafe {
                if let Some(ref val) = self.prev {
                    std::env::set_var(&self.key, val);
                } else {
                    std::env::remove_var(&self.key);
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Default tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_stack_config_default() {
        let config = StackConfig::default();
        assert_eq!(config.region, "EU");
        assert!(config.api_key.is_empty());
        assert!(!config.preview);
        assert!(config.use_managed_endpoints);
        assert!(config.timeout_secs.is_none());
        assert_eq!(config.region(), Region::Eu);
    }

    // ------------------------------------------------------------------------
    // Serialization tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_stack_config_from_toml() {
        let toml_str = r#"
            region = "azure-na"
            api_key = "blt_api"
            delivery_token = "cs_delivery"
            environment = "production"
            preview = true
            preview_token = "cs_preview"
            graphql_host = "graphql.internal"
            timeout_secs = 15
        "#;

        let config: StackConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.region(), Region::AzureNa);
        assert_eq!(config.api_key, "blt_api");
        assert_eq!(config.environment, "production");
        assert!(config.preview);
        assert_eq!(config.preview_token(), Some("cs_preview"));
        assert_eq!(config.graphql_host.as_deref(), Some("graphql.internal"));
        assert_eq!(config.timeout_secs, Some(15));
    }

    #[test]
    fn test_preview_flag_accepts_only_exact_true_string() {
        let on: StackConfig = toml::from_str(r#"preview = "true""#).unwrap();
        assert!(on.preview);

        let upper: StackConfig = toml::from_str(r#"preview = "TRUE""#).unwrap();
        assert!(!upper.preview);

        let other: StackConfig = toml::from_str(r#"preview = "yes""#).unwrap();
        assert!(!other.preview);
    }

    #[test]
    fn test_timeout_accepts_string() {
        let config: StackConfig = toml::from_str(r#"timeout_secs = "30""#).unwrap();
        assert_eq!(config.timeout_secs, Some(30));

        let err = toml::from_str::<StackConfig>(r#"timeout_secs = "soon""#);
        assert!(err.is_err());
    }

    #[test]
    fn test_stack_config_to_toml() {
        let config = StackConfig {
            api_key: "blt_api".into(),
            ..Default::default()
        };
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("region = \"EU\""));
        assert!(toml_str.contains("api_key = \"blt_api\""));

        let parsed: StackConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.api_key, config.api_key);
        assert_eq!(parsed.use_managed_endpoints, config.use_managed_endpoints);
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let config = StackConfig {
            delivery_token: "cs_secret".into(),
            preview_token: Some("cs_preview_secret".into()),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("cs_secret"));
        assert!(!debug.contains("cs_preview_secret"));
        assert!(debug.contains("***"));
    }

    // ------------------------------------------------------------------------
    // Loading tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_stack_config_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
                region = "NA"
                api_key = "from-file"
            "#,
        )
        .unwrap();

        let config = StackConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.region(), Region::Na);
        assert_eq!(config.api_key, "from-file");
    }

    #[test]
    fn test_stack_config_load_missing_file_uses_defaults() {
        let config = StackConfig::load(Some("/nonexistent/stackpage.toml")).unwrap();
        assert!(config.use_managed_endpoints);
    }

    #[test]
    fn test_stack_config_load_env_overlay() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
                graphql_preview_host = "file-preview.example"
            "#,
        )
        .unwrap();

        let _guard = EnvGuard::new("CONTENTSTACK_GRAPHQL_PREVIEW_HOST", "env-preview.example");
        let config = StackConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(
            config.graphql_preview_host.as_deref(),
            Some("env-preview.example")
        );
    }

    // ------------------------------------------------------------------------
    // resolve_config_path tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_resolve_config_path_explicit() {
        let path = StackConfig::resolve_config_path(Some("/explicit/config.toml"));
        assert_eq!(path, Some(PathBuf::from("/explicit/config.toml")));
    }

    #[test]
    fn test_resolve_config_path_env_then_default() {
        {
            let _guard = EnvGuard::new(CONFIG_PATH_ENV, "/env/config.toml");
            let path = StackConfig::resolve_config_path(None);
            assert_eq!(path, Some(PathBuf::from("/env/config.toml")));
        }

        let _guard = EnvGuard::remove(CONFIG_PATH_ENV);
        let path = StackConfig::resolve_config_path(None).unwrap();
        assert!(path.to_str().unwrap().contains("stackpage"));
        assert!(path.to_str().unwrap().ends_with("config.toml"));
    }

    // ------------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------------

    #[test]
    fn test_endpoints_apply_overrides() {
        let config = StackConfig {
            region: "EU".into(),
            graphql_host: Some("graphql.override".into()),
            ..Default::default()
        };
        let endpoints = config.endpoints();
        assert_eq!(endpoints.graphql_host().unwrap(), "graphql.override");
        assert_eq!(
            endpoints.graphql_preview_host().unwrap(),
            "eu-graphql-preview.contentstack.com"
        );
    }

    #[test]
    fn test_blank_preview_token_is_none() {
        let config = StackConfig {
            preview_token: Some(" ".into()),
            ..Default::default()
        };
        assert!(config.preview_token().is_none());
    }

    #[test]
    fn test_stack_config_to_env_vars() {
        let config = StackConfig {
            api_key: "blt_api".into(),
            ..Default::default()
        };
        let vars = config.to_env_vars().unwrap();
        let map: HashMap<_, _> = vars.into_iter().collect();
        assert_eq!(map.get("CONTENTSTACK_API_KEY").unwrap(), "blt_api");
        assert_eq!(map.get("CONTENTSTACK_REGION").unwrap(), "EU");
        assert_eq!(map.get("CONTENTSTACK_PREVIEW").unwrap(), "false");
    }

    #[test]
    fn test_stack_config_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StackConfig>();
    }
}
