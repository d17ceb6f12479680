// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading.
//!
//! # Loading Pipeline
//!
//! 1. Read the file and pick the format from its extension
//! 2. Expand `${VAR}` / `${VAR:default}` placeholders
//! 3. Deserialize into [`TaskgateConfig`]
//! 4. Apply `TASKGATE_*` environment overrides
//! 5. Validate
//!
//! # Environment Variable Override
//!
//! ```text
//! TASKGATE_JWT_SECRET=...
//! TASKGATE_JWT_EXPIRES_IN=1h
//! TASKGATE_API_HOST=127.0.0.1
//! TASKGATE_API_PORT=8080
//! ```

use std::fs;
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{ConfigError, ConfigResult, TaskgateConfig};

/// Source of environment variable values.
type EnvSource = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

// =============================================================================
// ConfigLoader
// =============================================================================

/// Configuration loader.
///
/// # Examples
///
/// ```no_run
/// use taskgate_bin::loader::ConfigLoader;
///
/// let config = ConfigLoader::new().load("taskgate.yaml").unwrap();
/// ```
#[derive(Clone)]
pub struct ConfigLoader {
    env_prefix: String,
    resolve_env_vars: bool,
    validate: bool,
    env: EnvSource,
}

impl ConfigLoader {
    /// Creates a loader reading the process environment.
    pub fn new() -> Self {
        Self {
            env_prefix: "TASKGATE".to_string(),
            resolve_env_vars: true,
            validate: true,
            env: Arc::new(|name| std::env::var(name).ok()),
        }
    }

    /// Sets the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables placeholder expansion and overrides.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Enables or disables validation after loading.
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validate = enabled;
        self
    }

    /// Replaces the environment lookup.
    pub fn with_env_source<F>(mut self, source: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Arc::new(source);
        self
    }

    /// Loads configuration from a file.
    ///
    /// The format is chosen by extension: `.yaml`/`.yml`, `.toml` or `.json`.
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<TaskgateConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }
        let content = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let format = ConfigFormat::from_path(path)?;

        let config = self.load_from_str(&content, format).map_err(|e| match e {
            ConfigError::Serialization { message } => ConfigError::parse(path, message),
            other => other,
        })?;

        debug!(
            seed_accounts = config.seed_accounts.len(),
            "Configuration loaded successfully"
        );
        Ok(config)
    }

    /// Loads configuration from a string.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<TaskgateConfig> {
        let content = if self.resolve_env_vars {
            self.resolve_env_placeholders(content)
        } else {
            content.to_string()
        };

        let mut config = parse_str(&content, format)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }
        if self.validate {
            config.validate()?;
        }

        Ok(config)
    }

    fn lookup(&self, name: &str) -> Option<String> {
        (self.env)(name)
    }

    /// Resolves `${VAR_NAME}` and `${VAR_NAME:default}` placeholders.
    ///
    /// Unknown variables without a default are left in place.
    fn resolve_env_placeholders(&self, content: &str) -> String {
        let mut result = String::with_capacity(content.len());
        let mut rest = content;

        while let Some(start) = rest.find("${") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];

            let Some(end) = after.find('}') else {
                result.push_str(&rest[start..]);
                return result;
            };

            let inner = &after[..end];
            let (name, default) = match inner.split_once(':') {
                Some((name, default)) => (name, Some(default)),
                None => (inner, None),
            };

            match (self.lookup(name), default) {
                (Some(value), _) => result.push_str(&value),
                (None, Some(default)) => result.push_str(default),
                (None, None) => {
                    warn!("Environment variable '{}' not found", name);
                    result.push_str(&rest[start..start + 2 + end + 1]);
                }
            }

            rest = &after[end + 1..];
        }

        result.push_str(rest);
        result
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&self, config: &mut TaskgateConfig) -> ConfigResult<()> {
        let var = |suffix: &str| format!("{}_{}", self.env_prefix, suffix);

        if let Some(value) = self.lookup(&var("JWT_SECRET")) {
            config.api.jwt.secret = value;
        }
        if let Some(value) = self.lookup(&var("JWT_EXPIRES_IN")) {
            config.api.jwt.expiration_secs = parse_duration_secs(&value).ok_or_else(|| {
                ConfigError::invalid_env_var(
                    var("JWT_EXPIRES_IN"),
                    "expected seconds or a duration like 15m, 1h, 7d",
                )
            })?;
        }
        if let Some(value) = self.lookup(&var("API_HOST")) {
            config.api.host = value.parse::<IpAddr>().map_err(|_| {
                ConfigError::invalid_env_var(var("API_HOST"), "expected an IP address")
            })?;
        }
        if let Some(value) = self.lookup(&var("API_PORT")) {
            config.api.port = value.parse().map_err(|_| {
                ConfigError::invalid_env_var(var("API_PORT"), "expected valid port number")
            })?;
        }
        if let Some(value) = self.lookup(&var("REVOCATION_TTL")) {
            config.api.session.revocation_ttl_secs =
                parse_duration_secs(&value).ok_or_else(|| {
                    ConfigError::invalid_env_var(
                        var("REVOCATION_TTL"),
                        "expected seconds or a duration like 15m, 1h, 7d",
                    )
                })?;
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigLoader")
            .field("env_prefix", &self.env_prefix)
            .field("resolve_env_vars", &self.resolve_env_vars)
            .field("validate", &self.validate)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::unsupported_format(other)),
            None => Err(ConfigError::unsupported_format("(no extension)")),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_str(content: &str, format: ConfigFormat) -> ConfigResult<TaskgateConfig> {
    match format {
        ConfigFormat::Yaml => {
            serde_yaml::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
    }
}

/// Parses `3600`, `90s`, `15m`, `1h` or `7d` into seconds.
pub fn parse_duration_secs(value: &str) -> Option<u64> {
    let value = value.trim();
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, unit) = value.split_at(split);
    let amount: u64 = digits.parse().ok()?;

    let multiplier = match unit.trim() {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        _ => return None,
    };

    amount.checked_mul(multiplier)
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Loads configuration from a file with default settings.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<TaskgateConfig> {
    ConfigLoader::new().load(path)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn loader_with(vars: &[(&str, &str)]) -> ConfigLoader {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ConfigLoader::new().with_env_source(move |name| vars.get(name).cloned())
    }

    fn write_config(ext: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(&format!(".{}", ext))
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_yaml() {
        let file = write_config(
            "yaml",
            &format!(
                "api:\n  port: 8081\n  jwt:\n    secret: {}\n    expiration_secs: 600\n",
                SECRET
            ),
        );

        let config = loader_with(&[]).load(file.path()).unwrap();
        assert_eq!(config.api.port, 8081);
        assert_eq!(config.api.jwt.expiration_secs, 600);
        assert!(config.seed_accounts.is_empty());
    }

    #[test]
    fn test_load_toml_and_json() {
        let file = write_config(
            "toml",
            &format!("[api]\nport = 9000\n\n[api.jwt]\nsecret = \"{}\"\n", SECRET),
        );
        assert_eq!(loader_with(&[]).load(file.path()).unwrap().api.port, 9000);

        let file = write_config(
            "json",
            &format!(r#"{{"api": {{"port": 9001, "jwt": {{"secret": "{}"}}}}}}"#, SECRET),
        );
        assert_eq!(loader_with(&[]).load(file.path()).unwrap().api.port, 9001);
    }

    #[test]
    fn test_missing_file() {
        let result = loader_with(&[]).load("/nonexistent/taskgate.yaml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_unsupported_format() {
        let file = write_config("ini", "port=1");
        let result = loader_with(&[]).load(file.path());
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_parse_error_carries_path() {
        let file = write_config("yaml", "api: [unclosed");
        let result = loader_with(&[]).load(file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_placeholders() {
        let loader = loader_with(&[("SECRET_FROM_ENV", SECRET)]);

        let config = loader
            .load_from_str(
                "api:\n  port: ${PORT_VAR:7000}\n  jwt:\n    secret: ${SECRET_FROM_ENV}\n",
                ConfigFormat::Yaml,
            )
            .unwrap();
        assert_eq!(config.api.port, 7000);
        assert_eq!(config.api.jwt.secret, SECRET);
    }

    #[test]
    fn test_unknown_placeholder_kept() {
        let loader = loader_with(&[]);
        assert_eq!(
            loader.resolve_env_placeholders("a ${MISSING} b ${OTHER:x} ${open"),
            "a ${MISSING} b x ${open"
        );
    }

    #[test]
    fn test_env_overrides() {
        let loader = loader_with(&[
            ("TASKGATE_JWT_SECRET", SECRET),
            ("TASKGATE_JWT_EXPIRES_IN", "15m"),
            ("TASKGATE_API_HOST", "127.0.0.1"),
            ("TASKGATE_API_PORT", "8443"),
        ]);

        let config = loader.load_from_str("{}", ConfigFormat::Json).unwrap();
        assert_eq!(config.api.jwt.secret, SECRET);
        assert_eq!(config.api.jwt.expiration_secs, 900);
        assert_eq!(config.api.host.to_string(), "127.0.0.1");
        assert_eq!(config.api.port, 8443);
    }

    #[test]
    fn test_invalid_env_override() {
        let loader = loader_with(&[("TASKGATE_JWT_SECRET", SECRET), ("TASKGATE_API_PORT", "http")]);
        let result = loader.load_from_str("{}", ConfigFormat::Json);
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
    }

    #[test]
    fn test_validation_can_be_skipped() {
        let loader = loader_with(&[]);
        assert!(loader.load_from_str("{}", ConfigFormat::Json).is_err());
        assert!(
            loader
                .with_validation(false)
                .load_from_str("{}", ConfigFormat::Json)
                .is_ok()
        );
    }

    #[test]
    fn test_parse_duration_secs() {
        assert_eq!(parse_duration_secs("3600"), Some(3600));
        assert_eq!(parse_duration_secs("90s"), Some(90));
        assert_eq!(parse_duration_secs("15m"), Some(900));
        assert_eq!(parse_duration_secs("1h"), Some(3600));
        assert_eq!(parse_duration_secs("7d"), Some(604_800));
        assert_eq!(parse_duration_secs("h"), None);
        assert_eq!(parse_duration_secs("1w"), None);
        assert_eq!(parse_duration_secs(""), None);
    }
}
