use crate::config::DEFAULT_ARCHIVE_NAME;
use crate::core::ConfigProvider;
use crate::utils::error::{Result, SwapError};
use crate::utils::validation::{self, Validate};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    #[serde(default)]
    pub contract: ContractConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Local CSV path or http(s) URL
    pub rates: String,
    pub timeout_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractConfig {
    /// TOML 日期 2004-01-01 或字串 "2004-01-01" 皆可
    #[serde(default, deserialize_with = "deserialize_start_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default = "default_tenure")]
    pub tenure_years: u32,
    #[serde(default = "default_notional")]
    pub notional: f64,
    #[serde(default = "default_fixed_rate")]
    pub fixed_rate: f64,
    #[serde(default = "default_spread")]
    pub spread: f64,
}

fn deserialize_start_date<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<toml::Value>::deserialize(deserializer)? {
        None => Ok(None),
        Some(toml::Value::String(text)) => text
            .parse::<NaiveDate>()
            .map(Some)
            .map_err(|e| D::Error::custom(format!("invalid start_date '{}': {}", text, e))),
        Some(toml::Value::Datetime(datetime)) => {
            match (datetime.date.as_ref(), datetime.time.as_ref()) {
                (Some(date), None) => {
                    NaiveDate::from_ymd_opt(date.year.into(), date.month.into(), date.day.into())
                        .map(Some)
                        .ok_or_else(|| D::Error::custom(format!("invalid start_date {}", date)))
                }
                _ => Err(D::Error::custom(format!(
                    "start_date must be a date without a time, got {}",
                    datetime
                ))),
            }
        }
        Some(other) => Err(D::Error::custom(format!(
            "start_date must be a date such as 2004-01-01, got a {}",
            other.type_str()
        ))),
    }
}

fn default_tenure() -> u32 {
    5
}

fn default_notional() -> f64 {
    100_000.0
}

fn default_fixed_rate() -> f64 {
    7.0
}

fn default_spread() -> f64 {
    2.0
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            start_date: None,
            tenure_years: default_tenure(),
            notional: default_notional(),
            fixed_rate: default_fixed_rate(),
            spread: default_spread(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
    pub json_logs: Option<bool>,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| SwapError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${RATES_URL})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("pipeline.name", &self.pipeline.name)?;
        validation::validate_rates_source("source.rates", &self.source.rates)?;
        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_output_formats("load.output_formats", &self.load.output_formats)?;

        if let Some(timeout) = self.source.timeout_seconds {
            validation::validate_range("source.timeout_seconds", timeout, 1, 600)?;
        }

        if let Some(name) = self.archive_name() {
            if !name.ends_with(".zip") {
                return Err(SwapError::InvalidConfigValueError {
                    field: "load.compression.filename".to_string(),
                    value: name.to_string(),
                    reason: "Archive name must end with .zip".to_string(),
                });
            }
        }

        validation::validate_contract_terms(
            self.contract.tenure_years,
            self.contract.notional,
            self.contract.fixed_rate,
            self.contract.spread,
        )
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }
}

impl ConfigProvider for TomlConfig {
    fn rates_source(&self) -> &str {
        &self.source.rates
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn start_date(&self) -> Option<NaiveDate> {
        self.contract.start_date
    }

    fn tenure_years(&self) -> u32 {
        self.contract.tenure_years
    }

    fn notional(&self) -> f64 {
        self.contract.notional
    }

    fn fixed_rate(&self) -> f64 {
        self.contract.fixed_rate
    }

    fn spread(&self) -> f64 {
        self.contract.spread
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn archive_name(&self) -> Option<&str> {
        let compression = self.load.compression.as_ref().filter(|c| c.enabled)?;
        Some(compression.filename.as_deref().unwrap_or(DEFAULT_ARCHIVE_NAME))
    }

    fn request_timeout_seconds(&self) -> Option<u64> {
        self.source.timeout_seconds
    }

    fn request_headers(&self) -> Option<&HashMap<String, String>> {
        self.source.headers.as_ref()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
