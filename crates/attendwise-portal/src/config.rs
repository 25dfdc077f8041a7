//! Portal configuration and client factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use attendwise_core::projection::ProjectionMode;
use attendwise_core::session::AttendanceSession;
use attendwise_core::traits::PortalClient;

use crate::http::HttpPortal;
use crate::snapshot::SnapshotPortal;

pub const TOKEN_ENV: &str = "ATTENDWISE_TOKEN";
pub const STUDENT_ID_ENV: &str = "ATTENDWISE_STUDENT_ID";

/// Where portal data comes from.
///
/// `Debug` masks the bearer token.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PortalConfig {
    Http {
        base_url: String,
        #[serde(default)]
        token: String,
        #[serde(default)]
        timeout_secs: Option<u64>,
    },
    Snapshot {
        path: PathBuf,
    },
}

impl std::fmt::Debug for PortalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortalConfig::Http {
                base_url,
                token: _,
                timeout_secs,
            } => f
                .debug_struct("Http")
                .field("base_url", base_url)
                .field("token", &"***")
                .field("timeout_secs", timeout_secs)
                .finish(),
            PortalConfig::Snapshot { path } => {
                f.debug_struct("Snapshot").field("path", path).finish()
            }
        }
    }
}

/// Top-level attendwise configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendwiseConfig {
    #[serde(default)]
    pub portal: Option<PortalConfig>,
    /// Portal student identifier. Ignored for snapshots, which carry their own.
    #[serde(default)]
    pub student_id: String,
    /// Mode used by `project` when none is given.
    #[serde(default)]
    pub default_mode: ProjectionMode,
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Unset variables resolve to the empty string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let name = &rest[start + 2..start + len];
        result.push_str(&std::env::var(name).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_portal_config(config: &PortalConfig) -> PortalConfig {
    match config {
        PortalConfig::Http {
            base_url,
            token,
            timeout_secs,
        } => PortalConfig::Http {
            base_url: resolve_env_vars(base_url),
            token: resolve_env_vars(token),
            timeout_secs: *timeout_secs,
        },
        PortalConfig::Snapshot { path } => PortalConfig::Snapshot {
            path: PathBuf::from(resolve_env_vars(&path.to_string_lossy())),
        },
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `attendwise.toml` in the current directory
/// 2. `~/.config/attendwise/config.toml`
///
/// Environment overrides: `ATTENDWISE_TOKEN`, `ATTENDWISE_STUDENT_ID`.
pub fn load_config_from(path: Option<&Path>) -> Result<AttendwiseConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => [Some(PathBuf::from("attendwise.toml")), global_config_path()]
            .into_iter()
            .flatten()
            .find(|p| p.exists()),
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<AttendwiseConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "config loaded");
            config
        }
        None => AttendwiseConfig::default(),
    };

    config.student_id = resolve_env_vars(&config.student_id);
    config.portal = config.portal.as_ref().map(resolve_portal_config);
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    Ok(config)
}

fn apply_env_overrides(config: &mut AttendwiseConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(value) = lookup(TOKEN_ENV) {
        if let Some(PortalConfig::Http { token, .. }) = config.portal.as_mut() {
            *token = value;
        }
    }
    if let Some(value) = lookup(STUDENT_ID_ENV) {
        config.student_id = value;
    }
}

fn global_config_path() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|h| {
        PathBuf::from(h)
            .join(".config")
            .join("attendwise")
            .join("config.toml")
    })
}

/// Create the configured portal client.
pub async fn create_portal(config: &AttendwiseConfig) -> Result<Arc<dyn PortalClient>> {
    match &config.portal {
        Some(PortalConfig::Http {
            base_url,
            token,
            timeout_secs,
        }) => {
            if token.is_empty() {
                anyhow::bail!("no portal token configured (set {TOKEN_ENV})");
            }
            Ok(Arc::new(HttpPortal::new(base_url, token, *timeout_secs)?))
        }
        Some(PortalConfig::Snapshot { path }) => Ok(Arc::new(SnapshotPortal::load(path).await?)),
        None => anyhow::bail!("no portal configured; run `attendwise init` or pass --snapshot"),
    }
}

/// Build a session for the configured portal and student.
///
/// A snapshot session always uses the snapshot's own student id; the
/// configured one only applies to live portals.
pub async fn open_session(config: &AttendwiseConfig) -> Result<AttendanceSession> {
    if let Some(PortalConfig::Snapshot { path }) = &config.portal {
        let portal = SnapshotPortal::load(path).await?;
        let student_id = portal.student_id().to_string();
        if !config.student_id.is_empty() && config.student_id != student_id {
            tracing::warn!(
                configured = %config.student_id,
                snapshot = %student_id,
                "ignoring configured student id for snapshot"
            );
        }
        return Ok(AttendanceSession::new(Arc::new(portal), student_id));
    }

    let portal = create_portal(config).await?;
    if config.student_id.is_empty() {
        anyhow::bail!("no student id configured (set {STUDENT_ID_ENV})");
    }
    Ok(AttendanceSession::new(portal, config.student_id.clone()))
}
