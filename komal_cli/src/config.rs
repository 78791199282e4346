use crate::paths;
use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::{Confirm, Input, Password};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Keys whose values `config list` never prints
const SECRET_KEYS: &[&str] = &["komga.password"];

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub komga: KomgaSettings,

    #[serde(default)]
    pub jikan: JikanSettings,

    #[serde(default)]
    pub run: RunSettings,

    #[serde(default)]
    pub paths: PathSettings,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct KomgaSettings {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct JikanSettings {
    pub base_url: String,
    pub search_limit: usize,
    pub offered_candidates: usize,
    pub timeout_seconds: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RunSettings {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub keep_progress: bool,
    /// Only these series names are processed when non-empty
    #[serde(default, deserialize_with = "string_or_list")]
    pub mangas: Vec<String>,
    pub entry_delay_ms: u64,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct PathSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_file: Option<PathBuf>,
}

impl Default for JikanSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.jikan.moe/v4".to_string(),
            search_limit: 5,
            offered_candidates: 3,
            timeout_seconds: 30,
        }
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            keep_progress: false,
            mangas: Vec::new(),
            entry_delay_ms: 1000,
        }
    }
}

impl AppConfig {
    /// Check that everything needed to reach Komga is present
    pub fn validate(&self) -> komal_core::Result<()> {
        let required = [
            ("komga.url", &self.komga.url),
            ("komga.email", &self.komga.email),
            ("komga.password", &self.komga.password),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(komal_core::Error::configuration_missing(field));
            }
        }

        Ok(())
    }

    pub fn cache_file(&self) -> PathBuf {
        self.paths
            .cache_file
            .clone()
            .unwrap_or_else(paths::default_cache_file)
    }

    pub fn progress_file(&self) -> PathBuf {
        self.paths
            .progress_file
            .clone()
            .unwrap_or_else(paths::default_progress_file)
    }

    pub fn entry_delay(&self) -> Duration {
        Duration::from_millis(self.run.entry_delay_ms)
    }

    pub fn jikan_timeout(&self) -> Duration {
        Duration::from_secs(self.jikan.timeout_seconds)
    }
}

/// Accept `"a, b"` as well as `["a", "b"]`
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        String(String),
        List(Vec<String>),
    }

    let names = match StringOrList::deserialize(deserializer)? {
        StringOrList::String(s) => s.split(',').map(str::to_string).collect(),
        StringOrList::List(list) => list,
    };

    Ok(names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect())
}

/// Accept booleans and the strings `true`/`false` in any case
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        String(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected true or false, got '{other}'"
            ))),
        },
    }
}

/// Environment names used by earlier releases of the tool
fn legacy_env() -> Env {
    Env::raw().filter_map(|key| {
        let mapped = match key.as_str().to_ascii_uppercase().as_str() {
            "KOMGAURL" => "komga.url",
            "KOMGAEMAIL" => "komga.email",
            "KOMGAPASSWORD" => "komga.password",
            "KEEPPROGRESS" => "run.keep_progress",
            "MANGAS" => "run.mangas",
            _ => return None,
        };
        Some(mapped.into())
    })
}

/// Configuration manager that handles XDG-compliant paths and layered configuration
pub struct ConfigManager {
    config_path: PathBuf,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    /// Create a new ConfigManager with default XDG-compliant paths
    pub fn new() -> Self {
        Self {
            config_path: paths::get_config_path(),
        }
    }

    /// Create a ConfigManager with a specific path (for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the configuration file path
    pub fn get_config_path(&self) -> PathBuf {
        self.config_path.clone()
    }

    /// Load configuration with layered priority: ENV > legacy ENV > File > Defaults
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new();

        // Layer 1: Defaults
        figment = figment.merge(Serialized::defaults(AppConfig::default()));

        // Layer 2: Config file (if exists)
        if self.config_path.exists() {
            figment = figment.merge(Toml::file(&self.config_path));
        }

        // Layer 3: Environment names from earlier releases
        figment = figment.merge(legacy_env());

        // Layer 4: Environment variables
        figment = figment.merge(Env::prefixed("KOMAL_").split("__"));

        figment.extract().context("Failed to load configuration")
    }

    /// Get a configuration value by key (dot notation)
    pub fn get(&self, key: &str) -> Result<String> {
        let value = Self::as_toml(&self.load()?)?;

        let mut current = &value;
        for part in key.split('.') {
            match current {
                toml::Value::Table(table) => {
                    current = table
                        .get(part)
                        .ok_or_else(|| anyhow::anyhow!("Key '{}' not found", key))?;
                }
                _ => anyhow::bail!("Invalid key path: {}", key),
            }
        }

        Self::render_value(current)
            .ok_or_else(|| anyhow::anyhow!("Value at '{}' is not a simple type", key))
    }

    /// Set a configuration value by key (dot notation)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parsed_value = Self::parse_config_value(key, value)?;

        // Load existing config or create new
        let mut config = if self.config_path.exists() {
            let content = fs::read_to_string(&self.config_path).with_context(|| {
                format!("Failed to read {}", self.config_path.display())
            })?;
            toml::from_str(&content)?
        } else {
            toml::Value::Table(toml::map::Map::new())
        };

        let parts: Vec<&str> = key.split('.').collect();
        let Some((last, sections)) = parts.split_last() else {
            anyhow::bail!("Empty key");
        };

        let mut current = &mut config;
        for part in sections {
            let toml::Value::Table(table) = current else {
                anyhow::bail!("Invalid key path: expected table at '{}'", part);
            };
            current = table
                .entry(part.to_string())
                .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
        }

        match current {
            toml::Value::Table(table) => {
                table.insert(last.to_string(), parsed_value);
            }
            _ => anyhow::bail!("Cannot set value on non-table"),
        }

        // Reject files that would no longer load
        let candidate = toml::to_string_pretty(&config)?;
        Figment::new()
            .merge(Serialized::defaults(AppConfig::default()))
            .merge(Toml::string(&candidate))
            .extract::<AppConfig>()
            .with_context(|| format!("Invalid value for '{key}'"))?;

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.config_path, candidate)
            .with_context(|| format!("Failed to write {}", self.config_path.display()))?;

        Ok(())
    }

    /// List all configuration values, with secrets masked
    pub fn list(&self) -> Result<Vec<(String, String)>> {
        let value = Self::as_toml(&self.load()?)?;

        let mut items = Vec::new();
        Self::collect_values(&value, String::new(), &mut items);
        for (key, value) in items.iter_mut() {
            if SECRET_KEYS.contains(&key.as_str()) && !value.is_empty() {
                *value = "********".to_string();
            }
        }
        items.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(items)
    }

    fn as_toml(config: &AppConfig) -> Result<toml::Value> {
        let toml_string = toml::to_string(config)?;
        Ok(toml::from_str(&toml_string)?)
    }

    fn render_value(value: &toml::Value) -> Option<String> {
        match value {
            toml::Value::String(s) => Some(s.clone()),
            toml::Value::Integer(i) => Some(i.to_string()),
            toml::Value::Float(f) => Some(f.to_string()),
            toml::Value::Boolean(b) => Some(b.to_string()),
            toml::Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(Self::render_value)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            _ => None,
        }
    }

    /// Recursively collect all key-value pairs from TOML
    fn collect_values(value: &toml::Value, prefix: String, items: &mut Vec<(String, String)>) {
        match value {
            toml::Value::Table(table) => {
                for (key, val) in table {
                    let new_prefix = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{prefix}.{key}")
                    };
                    Self::collect_values(val, new_prefix, items);
                }
            }
            other => {
                if let Some(rendered) = Self::render_value(other) {
                    items.push((prefix, rendered));
                }
            }
        }
    }

    /// Parse and validate a value for `key`
    fn parse_config_value(key: &str, value: &str) -> Result<toml::Value> {
        match key {
            "komga.url" | "jikan.base_url" => {
                let trimmed = value.trim();
                if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                    anyhow::bail!("{key} must start with http:// or https://");
                }
                Ok(toml::Value::String(trimmed.trim_end_matches('/').to_string()))
            }
            "jikan.search_limit" | "jikan.offered_candidates" | "jikan.timeout_seconds" => {
                let n: i64 = value
                    .parse()
                    .with_context(|| format!("{key} must be a positive integer"))?;
                if n <= 0 {
                    anyhow::bail!("{key} must be greater than 0");
                }
                Ok(toml::Value::Integer(n))
            }
            "run.entry_delay_ms" => {
                let n: u32 = value
                    .parse()
                    .context("entry_delay_ms must be a non-negative integer")?;
                Ok(toml::Value::Integer(i64::from(n)))
            }
            "run.keep_progress" => {
                let b: bool = value.parse().context("Value must be 'true' or 'false'")?;
                Ok(toml::Value::Boolean(b))
            }
            "run.mangas" => Ok(toml::Value::Array(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(|name| toml::Value::String(name.to_string()))
                    .collect(),
            )),
            // Strings even when they look like numbers
            "komga.email" | "komga.password" | "paths.cache_file" | "paths.progress_file" => {
                Ok(toml::Value::String(value.to_string()))
            }
            _ => anyhow::bail!("Unknown configuration key: {}", key),
        }
    }
}

/// Load the configuration from the default location
pub fn get_config() -> Result<AppConfig> {
    ConfigManager::new().load()
}

/// Interactive setup wizard for the Komga connection
pub async fn interactive_init(force: bool) -> Result<()> {
    println!("{}", "komal setup".bold());
    println!("{}", "===========".bold());
    println!();

    let mut config_mgr = ConfigManager::new();
    let current = config_mgr.load().ok();

    if !force
        && let Some(config) = &current
        && config.validate().is_ok()
    {
        let reconfigure = Confirm::new()
            .with_prompt("Configuration already exists. Reconfigure?")
            .default(false)
            .interact()
            .context("Failed to read input")?;

        if !reconfigure {
            println!("Setup cancelled.");
            return Ok(());
        }
    }

    println!("{}", "Komga server".bold());

    let existing = current.map(|c| c.komga).unwrap_or_default();

    let mut url_input = Input::<String>::new()
        .with_prompt("Server URL")
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.starts_with("http://") || input.starts_with("https://") {
                Ok(())
            } else {
                Err("Must start with http:// or https://")
            }
        });
    if !existing.url.is_empty() {
        url_input = url_input.default(existing.url.clone());
    }
    let url = url_input.interact_text().context("Failed to read URL")?;

    let mut email_input = Input::<String>::new().with_prompt("Email");
    if !existing.email.is_empty() {
        email_input = email_input.default(existing.email.clone());
    }
    let email = email_input
        .interact_text()
        .context("Failed to read email")?;

    let password = Password::new()
        .with_prompt("Password")
        .interact()
        .context("Failed to read password")?;

    println!();
    println!("{}", "Run behavior".bold());

    let keep_progress = Confirm::new()
        .with_prompt("Remember processed series between runs?")
        .default(false)
        .interact()
        .context("Failed to read input")?;

    config_mgr.set("komga.url", &url)?;
    config_mgr.set("komga.email", &email)?;
    config_mgr.set("komga.password", &password)?;
    config_mgr.set("run.keep_progress", &keep_progress.to_string())?;

    println!();
    println!("{}", "✓ Configuration saved".green());
    println!(
        "  {}",
        config_mgr.get_config_path().display().to_string().dimmed()
    );
    println!();
    println!("You can now use:");
    println!("  komal run              - Reconcile every series");
    println!("  komal run --only NAME  - Reconcile one series");

    Ok(())
}
