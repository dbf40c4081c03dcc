use std::path::{Path, PathBuf};

use crate::build::Builder;
use crate::config::Config;
use crate::info;

pub fn run(args: &crate::BuildArgs) -> Result<(), anyhow::Error> {
    let config_path = resolve_config_path(&args.config_file)?;

    let config = Config::load(&config_path)?;
    let summary = Builder::new(config).build()?;

    info!(
        "built {} page(s) to {} ({} skipped)",
        summary.pages,
        summary.output_dir.display(),
        summary.skipped
    );

    Ok(())
}

/// Make the config path absolute so relative site paths resolve the same
/// way no matter where the command runs from.
pub fn resolve_config_path(config_file: &Path) -> Result<PathBuf, anyhow::Error> {
    if config_file.is_relative() {
        Ok(std::env::current_dir()?.join(config_file))
    } else {
        Ok(config_file.to_path_buf())
    }
}
