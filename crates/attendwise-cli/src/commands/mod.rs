pub mod init;
pub mod project;
pub mod ratio;
pub mod today;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use attendwise_core::clock::Clock;
use attendwise_core::AttendanceSession;
use attendwise_portal::{load_config_from, open_session, AttendwiseConfig, PortalConfig};

/// Load config, letting `--snapshot` replace the configured portal.
fn load_config(snapshot: Option<PathBuf>, config: Option<PathBuf>) -> Result<AttendwiseConfig> {
    let mut config = load_config_from(config.as_deref())?;
    if let Some(path) = snapshot {
        config.portal = Some(PortalConfig::Snapshot { path });
    }
    Ok(config)
}

async fn connect(config: &AttendwiseConfig, clock: Arc<dyn Clock>) -> Result<AttendanceSession> {
    let session = open_session(config).await?.with_clock(clock);
    tracing::debug!(student = session.student_id(), "session opened");
    Ok(session)
}
