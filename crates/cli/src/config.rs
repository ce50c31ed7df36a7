//! `mbrand config` and the shared config loader.

use std::path::{Path, PathBuf};

use multibrand_recon::EngineConfig;

use crate::CliError;

/// Load an engine config, or the defaults when no file is given.
pub fn load_engine_config(path: Option<&Path>) -> Result<EngineConfig, CliError> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let input = std::fs::read_to_string(path).map_err(|e| {
        CliError::io(format!("{}: {e}", path.display()))
            .with_hint("omit --config to run with the defaults")
    })?;
    let config = EngineConfig::from_toml(&input).map_err(|e| {
        let mut err = CliError::recon(e);
        err.message = format!("{}: {}", path.display(), err.message);
        err
    })?;
    log::info!("loaded config from {}", path.display());
    Ok(config)
}

pub fn cmd_config(file: Option<PathBuf>) -> Result<(), CliError> {
    let config = load_engine_config(file.as_deref())?;
    let rendered = config.to_toml().map_err(CliError::recon)?;
    print!("{rendered}");
    if let Some(path) = &file {
        eprintln!("{}: ok", path.display());
    }
    Ok(())
}
