//! Configuration types deserialized from `ccguard.toml`.

use serde::Deserialize;

/// The top-level configuration parsed from `ccguard.toml`.
///
/// Every section is optional; an empty file enables all checks at their
/// default severity with default options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GuardConfig {
    /// Check selection (deny/allow/warn lists).
    #[serde(default)]
    pub checks: CheckSelection,
    /// Options for the `include-order` check.
    #[serde(default)]
    pub include_order: IncludeOrderOptions,
    /// Options for the `local-methods-and-types` check.
    #[serde(default)]
    pub local_methods_and_types: LocalDeclOptions,
    /// Options for the `preprocessing-directives` check.
    #[serde(default)]
    pub preprocessing_directives: PreprocessorOptions,
    /// Options for the `type-conversions` check.
    #[serde(default)]
    pub type_conversions: ConversionOptions,
}

/// Check selection controlling which checks run and at what severity.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckSelection {
    /// Check names whose findings are reported as errors.
    #[serde(default)]
    pub deny: Vec<String>,
    /// Check names that do not run at all.
    #[serde(default)]
    pub allow: Vec<String>,
    /// Check names kept at warning severity.
    #[serde(default)]
    pub warn: Vec<String>,
}

/// Options for include grouping and ordering.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct IncludeOrderOptions {
    /// Extensions a file must carry to be included.
    pub header_extensions: Vec<String>,
    /// Extensions of implementation files that may own a related header.
    pub source_extensions: Vec<String>,
    /// Directory names that mark the root of a project tree.
    pub project_root_markers: Vec<String>,
}

impl Default for IncludeOrderOptions {
    fn default() -> Self {
        Self {
            header_extensions: default_header_extensions(),
            source_extensions: default_source_extensions(),
            project_root_markers: vec!["src".to_string(), "include".to_string()],
        }
    }
}

/// Options for the anonymous-namespace requirement.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LocalDeclOptions {
    /// Extensions of files whose top-level declarations must be local.
    pub source_extensions: Vec<String>,
}

impl Default for LocalDeclOptions {
    fn default() -> Self {
        Self {
            source_extensions: default_source_extensions(),
        }
    }
}

/// Options for the preprocessor directive ban.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PreprocessorOptions {
    /// Extensions of headers that must carry `#pragma once`.
    pub header_extensions: Vec<String>,
}

impl Default for PreprocessorOptions {
    fn default() -> Self {
        Self {
            header_extensions: default_header_extensions(),
        }
    }
}

/// Options for the numeric conversion rules.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ConversionOptions {
    /// Name of the utility that clips a value into a narrower type.
    pub clip_function: String,
    /// Names of the utilities converting floating point values to integers.
    pub rounding_functions: Vec<String>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            clip_function: "clipToFit".to_string(),
            rounding_functions: vec![
                "floor".to_string(),
                "ceil".to_string(),
                "round".to_string(),
            ],
        }
    }
}

fn default_header_extensions() -> Vec<String> {
    vec![".h".to_string(), ".hh".to_string()]
}

fn default_source_extensions() -> Vec<String> {
    vec![".cc".to_string(), ".cpp".to_string(), ".c".to_string()]
}
