/* Common utilities shared between analyze and codegen commands */

use idl_gen::GoCodeGeneratorOptions;
use idl_gen::loader::load_options;
use std::path::PathBuf;

/* Command-line settings layered over the config file */
pub struct Settings {
    pub config: Option<PathBuf>,
    pub package: Option<String>,
    pub root_interface: Option<String>,
}

/* Resolve generator options: defaults < config file < command-line flags */
pub fn resolve_options(settings: Settings) -> anyhow::Result<GoCodeGeneratorOptions> {
    let mut options = match &settings.config {
        Some(path) => load_options(path)?,
        None => GoCodeGeneratorOptions::default(),
    };
    if let Some(package) = settings.package {
        options.package_name = Some(package);
    }
    if let Some(root) = settings.root_interface {
        options.root_interface = root;
    }
    Ok(options)
}
