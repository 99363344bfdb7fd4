use crate::core::CyclePolicy;
use crate::utils::error::{JsonApiError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_one_of, Validate, LOG_LEVELS};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub deserializer: Option<DeserializerConfig>,
    pub mapper: Option<MapperConfig>,
    pub output: Option<OutputConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeserializerConfig {
    pub cycle_policy: Option<CyclePolicy>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapperConfig {
    pub relationship_names_prop: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub pretty: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| JsonApiError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${LOG_LEVEL})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| JsonApiError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn cycle_policy(&self) -> CyclePolicy {
        self.deserializer
            .as_ref()
            .and_then(|d| d.cycle_policy)
            .unwrap_or_default()
    }

    pub fn relationship_names_prop(&self) -> &str {
        self.mapper
            .as_ref()
            .and_then(|m| m.relationship_names_prop.as_deref())
            .unwrap_or(crate::adapters::json_mapper::RELATIONSHIP_NAMES_PROP)
    }

    pub fn pretty(&self) -> bool {
        self.output.as_ref().and_then(|o| o.pretty).unwrap_or(false)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string(
            "mapper.relationship_names_prop",
            self.relationship_names_prop(),
        )?;

        if let Some(level) = self.log_level() {
            validate_one_of("logging.level", level, &LOG_LEVELS)?;
        }

        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
