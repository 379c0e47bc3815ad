//! Init command for writing a starter configuration file.

use std::fs;

use anyhow::{Context, Result, bail};

use crate::Config;
use crate::config::dirs_config_path;

/// Runs the init command.
pub fn run() -> Result<()> {
    let Some(config_dir) = dirs_config_path() else {
        bail!("no config directory on this platform");
    };
    let path = config_dir.join("config.toml");
    if path.exists() {
        bail!("config file already exists: {}", path.display());
    }

    fs::create_dir_all(&config_dir)
        .with_context(|| format!("failed to create {}", config_dir.display()))?;
    let defaults = Config::default();
    fs::write(&path, starter_config(&defaults))
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!("Wrote:      {}", path.display());
    println!("Export dir: {}", defaults.export_dir.display());
    println!(
        "Thresholds: speaker {} min, discussant {} min",
        defaults.thresholds.speaker_minutes, defaults.thresholds.discussant_minutes
    );

    Ok(())
}

/// Renders the starter config file with the given values filled in.
fn starter_config(config: &Config) -> String {
    format!(
        r#"# podium configuration
#
# Every value can also be set through the environment, e.g.
# PODIUM_EXPORT_DIR or PODIUM_THRESHOLDS__SPEAKER_MINUTES.

# Directory export files are written to.
export_dir = "{}"

# Minimum speaking minutes per role.
[thresholds]
speaker_minutes = {}
discussant_minutes = {}
"#,
        config.export_dir.display(),
        config.thresholds.speaker_minutes,
        config.thresholds.discussant_minutes
    )
}
