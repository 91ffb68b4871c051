//! Shared pipeline helpers for CLI commands.
//!
//! Loading translation-unit dumps, locating and loading `ccguard.toml`, and
//! folding command-line check selections into the configuration.

use std::path::{Path, PathBuf};

use ccguard_ast::{FileKind, TranslationUnit};
use ccguard_config::{GuardConfig, CONFIG_FILE_NAME};

use crate::error::CliError;
use crate::{CheckArgs, GlobalArgs};

/// Reads a JSON translation-unit dump and validates it.
///
/// Files the dump lists without content are read from disk when they exist;
/// system headers and compiler pseudo-files are left empty.
pub fn load_unit(path: &Path) -> Result<TranslationUnit, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut unit: TranslationUnit =
        serde_json::from_str(&text).map_err(|source| CliError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    fill_contents(&mut unit);
    unit.validate().map_err(|source| CliError::Invalid {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(
        unit = %path.display(),
        files = unit.files.len(),
        decls = unit.decls.len(),
        pp_events = unit.pp_events.len(),
        "loaded translation unit"
    );
    Ok(unit)
}

fn fill_contents(unit: &mut TranslationUnit) {
    for file in &mut unit.files {
        if file.content.is_some() || file.kind != FileKind::User {
            continue;
        }
        match std::fs::read_to_string(&file.path) {
            Ok(content) => file.content = Some(content),
            Err(err) => {
                tracing::debug!(file = %file.path.display(), %err, "no content for file");
            }
        }
    }
}

/// Walks up from `start` looking for the nearest directory containing `ccguard.toml`.
pub fn find_config_dir(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE_NAME).is_file() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Loads the configuration named by `--config`, or the nearest
/// `ccguard.toml` above `start`, or the defaults when there is none.
pub fn resolve_config(global: &GlobalArgs, start: &Path) -> Result<GuardConfig, CliError> {
    if let Some(path) = &global.config {
        let path = PathBuf::from(path);
        let config = if path.is_dir() {
            ccguard_config::load_config(&path)?
        } else {
            ccguard_config::load_config_file(&path)?
        };
        return Ok(config);
    }
    match find_config_dir(start) {
        Some(dir) => {
            tracing::debug!(dir = %dir.display(), "using configuration");
            Ok(ccguard_config::load_config(&dir)?)
        }
        None => Ok(GuardConfig::default()),
    }
}

/// Merges `--allow`/`--deny` flags into the configuration's check selection.
///
/// Command-line flags take precedence: a check passed to `--allow` is
/// removed from the configured deny list and vice versa.
pub fn merge_selection(mut config: GuardConfig, args: &CheckArgs) -> GuardConfig {
    let checks = &mut config.checks;
    for name in &args.deny {
        checks.allow.retain(|n| n != name);
        if !checks.deny.contains(name) {
            checks.deny.push(name.clone());
        }
    }
    for name in &args.allow {
        checks.deny.retain(|n| n != name);
        if !checks.allow.contains(name) {
            checks.allow.push(name.clone());
        }
    }
    config
}
