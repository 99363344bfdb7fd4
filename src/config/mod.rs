pub mod toml_config;

use crate::core::CyclePolicy;
use serde::{Deserialize, Serialize};
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_path, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "jsonapi-deserializer")]
#[command(about = "Resolve a JSON:API document into plain JSON models")]
pub struct CliConfig {
    /// JSON:API document to read, `-` for stdin
    #[arg(short, long, default_value = "-")]
    pub input: String,

    /// Where to write the models, stdout when omitted
    #[arg(short, long)]
    pub output: Option<String>,

    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long, help = "Pretty-print the output")]
    pub pretty: bool,

    #[arg(long, help = "Stop expanding relationships at cycles instead of failing")]
    pub shallow_cycles: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines on stderr")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 合併 TOML 設定與命令列覆蓋
    pub fn resolve(&self, file: Option<&TomlConfig>) -> RunSettings {
        let mut settings = file.map(RunSettings::from).unwrap_or_default();
        if self.pretty {
            settings.pretty = true;
        }
        if self.shallow_cycles {
            settings.cycle_policy = CyclePolicy::Shallow;
        }
        settings
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input)?;
        if let Some(output) = &self.output {
            validate_path("output", output)?;
        }
        if let Some(config) = &self.config {
            validate_path("config", config)?;
        }
        Ok(())
    }
}

/// Effective settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSettings {
    pub cycle_policy: CyclePolicy,
    pub relationship_names_prop: String,
    pub pretty: bool,
    pub log_level: Option<String>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            cycle_policy: CyclePolicy::default(),
            relationship_names_prop: crate::adapters::json_mapper::RELATIONSHIP_NAMES_PROP
                .to_string(),
            pretty: false,
            log_level: None,
        }
    }
}

impl From<&TomlConfig> for RunSettings {
    fn from(config: &TomlConfig) -> Self {
        Self {
            cycle_policy: config.cycle_policy(),
            relationship_names_prop: config.relationship_names_prop().to_string(),
            pretty: config.pretty(),
            log_level: config.log_level().map(str::to_string),
        }
    }
}
