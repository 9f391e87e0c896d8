//! Configuration loading and resolution.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use feed_harvest::{HarvestConfig, Target};

/// Comma separated target handles.
pub const TARGETS_ENV: &str = "FEED_HARVEST_TARGETS";
/// Output directory for record files.
pub const OUT_DIR_ENV: &str = "FEED_HARVEST_OUT";

/// Load a JSON run configuration, or the defaults when no file is given.
/// Missing keys keep their defaults.
pub fn load_harvest_config(path: Option<&Path>) -> Result<HarvestConfig> {
    let Some(path) = path else {
        return Ok(HarvestConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read config file {}", path.display()))?;
    let config: HarvestConfig = serde_json::from_str(&raw)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Handles from a targets file: one per line, `#` starts a comment.
pub fn parse_targets_file(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Handles from the comma separated env form.
pub fn parse_targets_env(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .collect()
}

/// Merge target sources in order (arguments, file, env), dropping repeats,
/// and validate every handle.
pub fn collect_targets(
    explicit: &[String],
    file: Option<&Path>,
    env_value: Option<&str>,
) -> Result<Vec<Target>> {
    let mut handles: Vec<String> = explicit.to_vec();
    if let Some(path) = file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read targets file {}", path.display()))?;
        handles.extend(parse_targets_file(&text));
    }
    if let Some(value) = env_value {
        handles.extend(parse_targets_env(value));
    }

    let mut targets: Vec<Target> = Vec::new();
    for handle in &handles {
        let target = Target::new(handle)?;
        if !targets.contains(&target) {
            targets.push(target);
        }
    }
    if targets.is_empty() {
        bail!("no targets given. Pass handles as arguments, --targets-file, or {TARGETS_ENV}");
    }
    Ok(targets)
}

/// Targets from arguments, an optional file and the environment.
pub fn resolve_targets(explicit: &[String], file: Option<&Path>) -> Result<Vec<Target>> {
    let env_value = std::env::var(TARGETS_ENV).ok();
    collect_targets(explicit, file, env_value.as_deref())
}

/// Resolve the output directory.
pub fn resolve_out_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    if let Ok(env_path) = std::env::var(OUT_DIR_ENV) {
        return PathBuf::from(env_path);
    }

    PathBuf::from(".")
}
