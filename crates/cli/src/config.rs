use crate::command::domain::UsageError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = ".solr-sync/config.json";
const DEFAULT_CHECKPOINT_PATH: &str = ".solr-sync/checkpoint.json";

pub const ENV_SOLR_URL: &str = "SOLR_SYNC_URL";
pub const ENV_CORE: &str = "SOLR_SYNC_CORE";
pub const ENV_SOURCE: &str = "SOLR_SYNC_SOURCE";
pub const ENV_BATCH_SIZE: &str = "SOLR_SYNC_BATCH_SIZE";

/// Resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Base URL of the Solr server, without the core name.
    pub solr_url: String,
    pub core: String,
    /// JSON-lines file the content items are read from.
    pub source: Option<PathBuf>,
    pub batch_size: usize,
    /// `commitWithin` sent with every update; `None` leaves commits to the completion hook.
    pub commit_within_ms: Option<u64>,
    pub timeout_secs: u64,
    pub checkpoint_path: PathBuf,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            solr_url: "http://localhost:8983/solr".to_string(),
            core: "content".to_string(),
            source: None,
            batch_size: solr_sync_indexer::DEFAULT_BATCH_SIZE,
            commit_within_ms: Some(10_000),
            timeout_secs: 30,
            checkpoint_path: PathBuf::from(DEFAULT_CHECKPOINT_PATH),
        }
    }
}

/// Command line overrides; `None` leaves the lower layers in place.
#[derive(Debug, Clone, Default)]
pub struct ConfigFlags {
    pub config_path: Option<PathBuf>,
    pub solr_url: Option<String>,
    pub core: Option<String>,
    pub source: Option<PathBuf>,
    pub batch_size: Option<usize>,
}

impl ConfigFlags {
    fn overlay(&self) -> Value {
        let mut map = Map::new();
        if let Some(url) = &self.solr_url {
            map.insert("solr_url".into(), Value::from(url.as_str()));
        }
        if let Some(core) = &self.core {
            map.insert("core".into(), Value::from(core.as_str()));
        }
        if let Some(source) = &self.source {
            map.insert("source".into(), Value::from(source.to_string_lossy().into_owned()));
        }
        if let Some(batch_size) = self.batch_size {
            map.insert("batch_size".into(), Value::from(batch_size));
        }
        Value::Object(map)
    }
}

/// Resolve defaults < config file < environment < flags.
///
/// `env` is the variable lookup, `std::env::var(..).ok()` outside tests.
pub fn resolve(flags: &ConfigFlags, env: impl Fn(&str) -> Option<String>) -> Result<SyncConfig> {
    let mut merged = serde_json::to_value(SyncConfig::default())?;

    if let Some(file) = load_file_layer(flags.config_path.as_deref())? {
        merge_json(&mut merged, &file);
    }
    merge_json(&mut merged, &env_layer(env)?);
    merge_json(&mut merged, &flags.overlay());

    let config: SyncConfig = serde_json::from_value(merged)
        .map_err(|err| UsageError::new(format!("Invalid configuration: {err}")))?;
    validate(&config)?;
    log::debug!("resolved config: {config:?}");
    Ok(config)
}

fn load_file_layer(explicit: Option<&Path>) -> Result<Option<Value>> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(
                    UsageError::new(format!("Config file {} does not exist", path.display()))
                        .into(),
                );
            }
            path.to_path_buf()
        }
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_PATH);
            if !default.exists() {
                return Ok(None);
            }
            default
        }
    };

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw).map_err(|err| {
        UsageError::new(format!("Config file {} is not valid JSON: {err}", path.display()))
    })?;
    if !value.is_object() {
        return Err(UsageError::new(format!(
            "Config file {} must contain a JSON object",
            path.display()
        ))
        .into());
    }
    Ok(Some(value))
}

fn env_layer(env: impl Fn(&str) -> Option<String>) -> Result<Value> {
    let mut map = Map::new();
    for (var, key) in [
        (ENV_SOLR_URL, "solr_url"),
        (ENV_CORE, "core"),
        (ENV_SOURCE, "source"),
    ] {
        if let Some(value) = env(var).filter(|v| !v.trim().is_empty()) {
            map.insert(key.into(), Value::from(value));
        }
    }
    if let Some(raw) = env(ENV_BATCH_SIZE).filter(|v| !v.trim().is_empty()) {
        let batch_size: usize = raw.trim().parse().map_err(|_| {
            UsageError::new(format!("{ENV_BATCH_SIZE} must be a positive integer, got `{raw}`"))
        })?;
        map.insert("batch_size".into(), Value::from(batch_size));
    }
    Ok(Value::Object(map))
}

fn validate(config: &SyncConfig) -> Result<()> {
    if config.batch_size == 0 {
        return Err(UsageError::new("Batch size must be at least 1").into());
    }
    if config.solr_url.trim().is_empty() {
        return Err(UsageError::new("Solr URL must not be empty").into());
    }
    if config.core.trim().is_empty() {
        return Err(UsageError::new("Core name must not be empty").into());
    }
    if config.timeout_secs == 0 {
        return Err(UsageError::new("Request timeout must be at least one second").into());
    }
    Ok(())
}

/// Deep merge: objects merge key by key, any other overlay value replaces the base.
fn merge_json(base: &mut Value, overlay: &Value) {
    if let Value::Object(overlay_map) = overlay {
        if !base.is_object() {
            *base = Value::Object(Map::new());
        }

        if let Value::Object(base_map) = base {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
    } else {
        *base = overlay.clone();
    }
}
