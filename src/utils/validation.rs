use crate::domain::model::SwapContract;
use crate::utils::error::{Result, SwapError};
use url::Url;

pub const TENURE_YEARS_RANGE: (u32, u32) = (1, 10);
pub const NOTIONAL_RANGE: (f64, f64) = (1_000.0, 250_000.0);
pub const NOTIONAL_STEP: f64 = 1_000.0;
pub const FIXED_RATE_RANGE: (f64, f64) = (1.0, 10.0);
pub const SPREAD_RANGE: (f64, f64) = (0.0, 5.0);
/// Fixed rate and spread move in tenths of a percent.
pub const RATE_STEP: f64 = 0.1;
pub const OUTPUT_FORMATS: [&str; 3] = ["csv", "tsv", "json"];

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn is_remote_source(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(SwapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(SwapError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(SwapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(SwapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(SwapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// 本地來源必須是 .csv；遠端來源只檢查 URL
pub fn validate_rates_source(field_name: &str, source: &str) -> Result<()> {
    if is_remote_source(source) {
        return validate_url(field_name, source);
    }

    validate_path(field_name, source)?;

    let extension = std::path::Path::new(source)
        .extension()
        .and_then(|ext| ext.to_str());
    match extension {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => Ok(()),
        Some(ext) => Err(SwapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: source.to_string(),
            reason: format!("Unsupported file extension: {}. Allowed extensions: csv", ext),
        }),
        None => Err(SwapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: source.to_string(),
            reason: "File has no extension or invalid filename".to_string(),
        }),
    }
}

pub fn validate_output_formats(field_name: &str, formats: &[String]) -> Result<()> {
    if formats.is_empty() {
        return Err(SwapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: String::new(),
            reason: "At least one output format is required".to_string(),
        });
    }

    for format in formats {
        if !OUTPUT_FORMATS.contains(&format.as_str()) {
            return Err(SwapError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: format.clone(),
                reason: format!(
                    "Unsupported format. Valid formats: {}",
                    OUTPUT_FORMATS.join(", ")
                ),
            });
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SwapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    // NaN 不會落在任何範圍內
    if !(value >= min && value <= max) {
        return Err(SwapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_step(field_name: &str, value: f64, step: f64) -> Result<()> {
    let steps = value / step;
    if (steps - steps.round()).abs() > 1e-9 {
        return Err(SwapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be a multiple of {}", step),
        });
    }
    Ok(())
}

/// 合約參數限制與互動版 demo 的滑桿範圍一致
pub fn validate_contract_terms(
    tenure_years: u32,
    notional: f64,
    fixed_rate: f64,
    spread: f64,
) -> Result<()> {
    validate_range(
        "contract.tenure_years",
        tenure_years,
        TENURE_YEARS_RANGE.0,
        TENURE_YEARS_RANGE.1,
    )?;
    validate_range("contract.notional", notional, NOTIONAL_RANGE.0, NOTIONAL_RANGE.1)?;
    validate_step("contract.notional", notional, NOTIONAL_STEP)?;
    validate_range(
        "contract.fixed_rate",
        fixed_rate,
        FIXED_RATE_RANGE.0,
        FIXED_RATE_RANGE.1,
    )?;
    validate_step("contract.fixed_rate", fixed_rate, RATE_STEP)?;
    validate_range("contract.spread", spread, SPREAD_RANGE.0, SPREAD_RANGE.1)?;
    validate_step("contract.spread", spread, RATE_STEP)?;
    Ok(())
}

impl Validate for SwapContract {
    fn validate(&self) -> Result<()> {
        validate_contract_terms(
            self.tenure_years,
            self.notional,
            self.fixed_rate,
            self.spread,
        )
    }
}
