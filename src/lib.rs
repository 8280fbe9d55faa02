//! PMO Dashboard
//!
//! Role-aware client for the PMO backend with:
//! - Typed REST access to business units, projects, issues and change requests
//! - A coalescing, staleness-aware cache of the business-unit tree
//! - Write-invalidate mutations that publish CRUD events
//! - Memoized portfolio views rendered by one screen per role

pub mod api;
pub mod events;
pub mod models;
pub mod mutations;
pub mod screens;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod test_helpers;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use api::{ApiClient, PmoApi, DEFAULT_API_BASE};
use events::EventBus;
use mutations::MutationCoordinator;
use screens::{Role, Screen, ScreenContext};
use snapshot::{SnapshotCache, DEFAULT_STALE_AFTER};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "pmo.yaml";

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub api: ApiYamlConfig,
    pub snapshot: SnapshotYamlConfig,
    pub dashboard: DashboardYamlConfig,
}

/// Backend connection section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiYamlConfig {
    pub base_url: String,
    /// Per-request timeout; absent means the transport default
    pub timeout_secs: Option<u64>,
}

impl Default for ApiYamlConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.into(),
            timeout_secs: None,
        }
    }
}

/// Snapshot cache section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SnapshotYamlConfig {
    pub stale_after_secs: u64,
}

impl Default for SnapshotYamlConfig {
    fn default() -> Self {
        Self {
            stale_after_secs: DEFAULT_STALE_AFTER.as_secs(),
        }
    }
}

/// Dashboard section
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct DashboardYamlConfig {
    pub default_role: Role,
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Resolved configuration.
///
/// Priority: environment variable > YAML file > built-in default.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub api_timeout: Option<Duration>,
    pub stale_after: Duration,
    pub default_role: Role,
}

impl Config {
    /// Load from `pmo.yaml` in the working directory plus env vars
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);

        let api_timeout = env_parsed::<u64>("PMO_API_TIMEOUT_SECS")
            .or(yaml.api.timeout_secs)
            .map(Duration::from_secs);
        let stale_after_secs =
            env_parsed::<u64>("PMO_SNAPSHOT_STALE_SECS").unwrap_or(yaml.snapshot.stale_after_secs);

        Ok(Self {
            api_base: std::env::var("PMO_API_BASE").unwrap_or(yaml.api.base_url),
            api_timeout,
            stale_after: Duration::from_secs(stale_after_secs),
            default_role: env_parsed::<Role>("PMO_ROLE").unwrap_or(yaml.dashboard.default_role),
        })
    }

    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }
}

/// Read and parse an env var; unparsable values are logged and ignored
fn env_parsed<T>(var: &str) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(var).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring {}={:?}: {}", var, raw, e);
            None
        }
    }
}

// ============================================================================
// Application wiring
// ============================================================================

/// Everything a dashboard session needs, wired once from [`Config`]
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn PmoApi>,
    pub cache: SnapshotCache,
    pub coordinator: MutationCoordinator,
    pub events: EventBus,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.api_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;
        let api: Arc<dyn PmoApi> = Arc::new(ApiClient::with_client(&config.api_base, http));
        Ok(Self::with_api(api, config))
    }

    /// Wire the cache, event bus and coordinator around an existing backend
    pub fn with_api(api: Arc<dyn PmoApi>, config: Config) -> Self {
        let cache = SnapshotCache::new(api.clone(), config.stale_after);
        let events = EventBus::default();
        let coordinator = MutationCoordinator::new(api.clone(), cache.clone())
            .with_event_emitter(Arc::new(events.clone()));

        tracing::debug!(
            api_base = %config.api_base,
            stale_after_secs = config.stale_after.as_secs(),
            "Dashboard state initialised"
        );

        Self {
            api,
            cache,
            coordinator,
            events,
            config: Arc::new(config),
        }
    }

    pub fn screen_context(&self) -> ScreenContext {
        ScreenContext::new(self.coordinator.clone())
    }

    pub fn screen(&self, role: Role) -> Screen {
        Screen::for_role(role, self.screen_context())
    }

    /// Dispose the snapshot cache; results of fetches still in flight are dropped
    pub async fn shutdown(&self) {
        self.cache.dispose().await;
    }
}

// ============================================================================
// Tests
// ============================================================================
