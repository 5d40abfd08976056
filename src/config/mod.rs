pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use chrono::NaiveDate;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_RATES_FILE: &str = "LIBOR GBP.csv";
pub const DEFAULT_ARCHIVE_NAME: &str = "irs_output.zip";

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "irs-demo")]
#[command(about = "Quarterly cash flows of a fixed-for-floating interest rate swap on GBP LIBOR 3M")]
pub struct CliConfig {
    /// Historical LIBOR CSV (Date, 3M, 6M columns) or an http(s) URL serving it
    #[arg(long, default_value = DEFAULT_RATES_FILE)]
    pub rates: String,

    /// Contract start date (YYYY-MM-DD), must be a quarter start in the data
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    #[arg(long, default_value = "5", help = "Tenure in years (1-10)")]
    pub tenure: u32,

    #[arg(long, default_value = "100000", help = "Notional amount in GBP")]
    pub notional: f64,

    #[arg(long, default_value = "7.0", help = "Fixed rate in percent")]
    pub fixed_rate: f64,

    #[arg(long, default_value = "2.0", help = "Spread over LIBOR in percent")]
    pub spread: f64,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', default_values = ["csv", "json"])]
    pub formats: Vec<String>,

    /// Bundle all outputs into a single ZIP archive
    #[arg(long)]
    pub zip: bool,

    #[arg(long, help = "HTTP timeout in seconds for remote rate sources")]
    pub timeout: Option<u64>,

    /// Print the selectable contract start dates and exit
    #[arg(long)]
    pub list_start_dates: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn rates_source(&self) -> &str {
        &self.rates
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    fn tenure_years(&self) -> u32 {
        self.tenure
    }

    fn notional(&self) -> f64 {
        self.notional
    }

    fn fixed_rate(&self) -> f64 {
        self.fixed_rate
    }

    fn spread(&self) -> f64 {
        self.spread
    }

    fn output_formats(&self) -> &[String] {
        &self.formats
    }

    fn archive_name(&self) -> Option<&str> {
        self.zip.then_some(DEFAULT_ARCHIVE_NAME)
    }

    fn request_timeout_seconds(&self) -> Option<u64> {
        self.timeout
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_rates_source("rates", &self.rates)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_output_formats("formats", &self.formats)?;
        validation::validate_contract_terms(
            self.tenure,
            self.notional,
            self.fixed_rate,
            self.spread,
        )
    }
}
