//! `ccguard list-checks`: prints the registered checks.

use ccguard_checks::CheckEngine;
use serde::Serialize;

use crate::error::CliError;
use crate::pipeline::resolve_config;
use crate::{GlobalArgs, ReportFormat};

#[derive(Serialize)]
struct CheckInfo<'a> {
    code: String,
    name: &'a str,
    description: &'a str,
    severity: String,
    enabled: bool,
}

/// Runs the `ccguard list-checks` command.
///
/// Severities and the enabled flag reflect the loaded configuration.
pub fn run(format: ReportFormat, global: &GlobalArgs) -> Result<i32, CliError> {
    let cwd = std::env::current_dir().map_err(|source| CliError::Io {
        path: ".".into(),
        source,
    })?;
    let engine = CheckEngine::new(&resolve_config(global, &cwd)?);
    let infos = describe(&engine);
    match format {
        ReportFormat::Text => {
            for info in &infos {
                let marker = if info.enabled { ' ' } else { '-' };
                println!(
                    "{marker}{}  {:<36} {:<8} {}",
                    info.code, info.name, info.severity, info.description
                );
            }
        }
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&infos).unwrap_or_else(|_| "[]".to_string());
            println!("{json}");
        }
    }
    Ok(0)
}

fn describe(engine: &CheckEngine) -> Vec<CheckInfo<'_>> {
    let mut infos: Vec<CheckInfo<'_>> = engine
        .checks()
        .map(|check| CheckInfo {
            code: check.code().to_string(),
            name: check.name(),
            description: check.description(),
            severity: engine.severity_of(check).to_string(),
            enabled: engine.is_enabled(check),
        })
        .collect();
    infos.sort_by(|a, b| a.code.cmp(&b.code));
    infos
}
