//! Run configuration loading.
//!
//! A run file is the core `ScalperConfig` in TOML. Omitted tables fall back
//! to the validated defaults, so a file only needs the overrides.

use std::path::Path;

use anyhow::Context;

use scalplab_core::ScalperConfig;

/// Load a config from TOML, or return the validated defaults when no path
/// is given. The result is validated before it is handed to a driver.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<ScalperConfig> {
    let cfg = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => ScalperConfig::validated(),
    };
    cfg.validate().context("invalid configuration")?;
    Ok(cfg)
}
