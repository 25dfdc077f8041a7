//! The `attendwise init` command.

use std::path::Path;

use anyhow::{Context, Result};

const CONFIG_FILE: &str = "attendwise.toml";

pub fn execute() -> Result<()> {
    if Path::new(CONFIG_FILE).exists() {
        println!("{CONFIG_FILE} already exists, skipping.");
        return Ok(());
    }
    std::fs::write(CONFIG_FILE, SAMPLE_CONFIG)
        .with_context(|| format!("failed to write {CONFIG_FILE}"))?;
    println!("Created {CONFIG_FILE}");

    println!("\nNext steps:");
    println!("  1. Set base_url and student_id in {CONFIG_FILE}");
    println!("  2. Export your portal token: export ATTENDWISE_TOKEN=...");
    println!("  3. Run: attendwise today");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# attendwise configuration

student_id = "${ATTENDWISE_STUDENT_ID}"

# Mode used by `attendwise project` when --mode is not given: "none" or "uniform".
default_mode = "uniform"

[portal]
type = "http"
base_url = "https://portal.example.edu/api"
token = "${ATTENDWISE_TOKEN}"
timeout_secs = 30

# Offline alternative:
# [portal]
# type = "snapshot"
# path = "portal-snapshot.json"
"#;
