use crate::domain::model::{RateObservation, SwapReport};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Where the rates come from, what contract to run and where results go.
pub trait ConfigProvider: Send + Sync {
    /// Local CSV path (relative to the storage root) or http(s) URL.
    fn rates_source(&self) -> &str;
    fn output_path(&self) -> &str;
    /// None means "use the default quarter start for this data set".
    fn start_date(&self) -> Option<NaiveDate>;
    fn tenure_years(&self) -> u32;
    fn notional(&self) -> f64;
    fn fixed_rate(&self) -> f64;
    fn spread(&self) -> f64;
    fn output_formats(&self) -> &[String];
    /// ZIP archive file name when results are bundled.
    fn archive_name(&self) -> Option<&str>;
    fn request_timeout_seconds(&self) -> Option<u64>;
    /// Extra headers sent with remote rate requests.
    fn request_headers(&self) -> Option<&HashMap<String, String>> {
        None
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RateObservation>>;
    async fn transform(&self, data: Vec<RateObservation>) -> Result<SwapReport>;
    async fn load(&self, report: SwapReport) -> Result<String>;
}
