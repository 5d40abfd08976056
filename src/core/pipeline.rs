use crate::core::cashflow::{self, ScenarioSeries};
use crate::core::rates;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{
    CashFlow, QuarterlyRate, RateObservation, Scenario, SwapContract, SwapReport,
};
use crate::utils::error::{Result, SwapError};
use crate::utils::validation::{is_remote_source, Validate};
use chrono::NaiveDate;
use reqwest::Client;
use std::io::Write;
use std::time::Duration;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const CASHFLOWS_CSV: &str = "cashflows.csv";
pub const CASHFLOWS_TSV: &str = "cashflows.tsv";
pub const REPORT_JSON: &str = "report.json";
pub const RATES_CSV: &str = "rates.csv";

const CASHFLOW_HEADER: [&str; 5] = [
    "date",
    "libor_3m",
    "floating_payment",
    "fixed_payment",
    "net_cash_flow",
];

/// Reads the rate history from `input`, writes results to `output`.
pub struct SwapPipeline<S: Storage, C: ConfigProvider> {
    input: S,
    output: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> SwapPipeline<S, C> {
    pub fn new(input: S, output: S, config: C) -> Self {
        Self {
            input,
            output,
            config,
            client: Client::new(),
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    async fn fetch_remote(&self, url: &str) -> Result<Vec<u8>> {
        let mut request = self.client.get(url);

        if let Some(headers) = self.config.request_headers() {
            for (key, value) in headers {
                request = request.header(key, value);
            }
        }

        if let Some(timeout) = self.config.request_timeout_seconds() {
            request = request.timeout(Duration::from_secs(timeout));
        }

        tracing::debug!("Requesting rate history from: {}", url);
        let response = request.send().await?;
        tracing::debug!("Rate source response status: {}", response.status());

        if !response.status().is_success() {
            return Err(SwapError::HttpStatusError {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// 依資料決定合約起始日，並確認是可選的季初日期
    fn resolve_start_date(&self, quarterly: &[QuarterlyRate]) -> Result<NaiveDate> {
        let selectable = rates::selectable_start_dates(quarterly);

        match self.config.start_date() {
            Some(date) if selectable.contains(&date) => Ok(date),
            Some(date) => Err(SwapError::StartDateError {
                date: date.to_string(),
            }),
            None => {
                let date = rates::default_start_date(&selectable).ok_or_else(|| {
                    SwapError::DataError {
                        message: format!(
                            "need more than four quarters of data to start a contract, got {}",
                            quarterly.len()
                        ),
                    }
                })?;
                tracing::info!("📅 No start date given, using {}", date);
                Ok(date)
            }
        }
    }

    fn contract(&self, start_date: NaiveDate) -> SwapContract {
        SwapContract {
            start_date,
            tenure_years: self.config.tenure_years(),
            notional: self.config.notional(),
            fixed_rate: self.config.fixed_rate(),
            spread: self.config.spread(),
        }
    }

    fn wants(&self, format: &str) -> bool {
        self.config.output_formats().iter().any(|f| f == format)
    }
}

/// Builds the report for one contract from the full quarterly history.
pub fn build_report(contract: SwapContract, quarterly: &[QuarterlyRate]) -> Result<SwapReport> {
    let rates = cashflow::contract_rates(&contract, quarterly);
    let cash_flows = cashflow::build_cash_flows(&contract, quarterly);
    let summary = cashflow::summarize(&cash_flows);

    Ok(SwapReport {
        end_date: contract.end_date(),
        csv_output: render_cash_flows(&cash_flows, b',')?,
        tsv_output: render_cash_flows(&cash_flows, b'\t')?,
        rates_csv_output: render_rates(&rates)?,
        contract,
        rates,
        cash_flows,
        summary,
    })
}

fn amount(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{:.*}", decimals, v))
        .unwrap_or_default()
}

pub fn render_cash_flows(flows: &[CashFlow], delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(CASHFLOW_HEADER)?;
    for cf in flows {
        writer.write_record([
            cf.date.to_string(),
            amount(cf.libor_3m, 4),
            amount(cf.floating_payment, 2),
            amount(Some(cf.fixed_payment), 2),
            amount(cf.net_cash_flow, 2),
        ])?;
    }

    into_string(writer)
}

pub fn render_rates(rates: &[QuarterlyRate]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(["quarter_end", "libor_3m", "libor_6m"])?;
    for q in rates {
        writer.write_record([
            q.quarter_end.to_string(),
            amount(q.three_month, 4),
            amount(q.six_month, 4),
        ])?;
    }

    into_string(writer)
}

fn into_string(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer.into_inner().map_err(|e| SwapError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| SwapError::DataError {
        message: format!("rendered table is not UTF-8: {}", e),
    })
}

fn series_json(scenario: Scenario, series: &ScenarioSeries) -> serde_json::Value {
    let points: Vec<serde_json::Value> = series
        .iter()
        .map(|(date, value)| serde_json::json!({ "date": date, "value": value }))
        .collect();

    serde_json::json!({
        "label": scenario.label(),
        "beneficiary": scenario.beneficiary().map(|party| party.to_string()),
        "points": points,
    })
}

pub fn render_report_json(report: &SwapReport) -> Result<String> {
    let (fixed_greater, floating_greater) = cashflow::split_scenarios(&report.cash_flows);

    let mut document = serde_json::to_value(report)?;
    if let serde_json::Value::Object(map) = &mut document {
        map.insert(
            "scenarios".to_string(),
            serde_json::json!({
                "fixed_greater": series_json(Scenario::FixedGreater, &fixed_greater),
                "floating_greater": series_json(Scenario::FloatingGreater, &floating_greater),
            }),
        );
    }

    Ok(serde_json::to_string_pretty(&document)?)
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for SwapPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<RateObservation>> {
        let source = self.config.rates_source();
        tracing::info!("📥 Loading rate history from: {}", source);

        let data = if is_remote_source(source) {
            self.fetch_remote(source).await?
        } else {
            self.input.read_file(source).await?
        };

        let observations = rates::parse_rate_csv(&data)?;
        if observations.is_empty() {
            return Err(SwapError::DataError {
                message: format!("no rows with both 3M and 6M rates in {}", source),
            });
        }

        Ok(observations)
    }

    async fn transform(&self, data: Vec<RateObservation>) -> Result<SwapReport> {
        let quarterly = rates::resample_quarterly(&data);
        tracing::debug!("Resampled into {} quarters", quarterly.len());

        let start_date = self.resolve_start_date(&quarterly)?;
        let contract = self.contract(start_date);
        contract.validate()?;

        tracing::info!(
            "🔄 Swap {} → {}: notional £{:.0}, fixed {:.2}%, LIBOR 3M + {:.2}%",
            contract.start_date,
            contract.end_date(),
            contract.notional,
            contract.fixed_rate,
            contract.spread
        );

        let report = build_report(contract, &quarterly)?;

        if let Some(beneficiary) = report.summary.overall_beneficiary {
            tracing::info!(
                "💷 Net over {} priced quarters: £{:.2} ({} comes out ahead)",
                report.summary.priced_periods,
                report.summary.total_net,
                beneficiary
            );
        }
        if report.summary.priced_periods < report.summary.periods {
            tracing::warn!(
                "⚠️ {} quarter(s) in the contract period have no LIBOR fixing",
                report.summary.periods - report.summary.priced_periods
            );
        }

        Ok(report)
    }

    async fn load(&self, report: SwapReport) -> Result<String> {
        let mut files: Vec<(&str, Vec<u8>)> = Vec::new();

        if self.wants("csv") {
            files.push((CASHFLOWS_CSV, report.csv_output.clone().into_bytes()));
        }
        if self.wants("tsv") {
            files.push((CASHFLOWS_TSV, report.tsv_output.clone().into_bytes()));
        }
        if self.wants("json") {
            files.push((REPORT_JSON, render_report_json(&report)?.into_bytes()));
        }

        let output_dir = self.config.output_path().trim_end_matches('/');

        match self.config.archive_name() {
            Some(archive) => {
                tracing::debug!("Creating ZIP file with {} files", files.len() + 1);

                let zip_data = {
                    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                    let options = SimpleFileOptions::default();

                    for (name, data) in &files {
                        zip.start_file(*name, options)?;
                        zip.write_all(data)?;
                    }

                    // 合約期間的季度利率一併打包
                    zip.start_file(RATES_CSV, options)?;
                    zip.write_all(report.rates_csv_output.as_bytes())?;

                    zip.finish()?.into_inner()
                };

                tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
                self.output.write_file(archive, &zip_data).await?;
                Ok(format!("{}/{}", output_dir, archive))
            }
            None => {
                for (name, data) in &files {
                    self.output.write_file(name, data).await?;
                }
                tracing::debug!("Wrote {} output files", files.len());
                Ok(output_dir.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put(&self, path: &str, data: &str) {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.as_bytes().to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                SwapError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        rates: String,
        start_date: Option<NaiveDate>,
        tenure_years: u32,
        formats: Vec<String>,
        archive: Option<String>,
    }

    impl MockConfig {
        fn new(rates: &str) -> Self {
            Self {
                rates: rates.to_string(),
                start_date: None,
                tenure_years: 1,
                formats: vec!["csv".to_string(), "tsv".to_string(), "json".to_string()],
                archive: None,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn rates_source(&self) -> &str {
            &self.rates
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn start_date(&self) -> Option<NaiveDate> {
            self.start_date
        }

        fn tenure_years(&self) -> u32 {
            self.tenure_years
        }

        fn notional(&self) -> f64 {
            100_000.0
        }

        fn fixed_rate(&self) -> f64 {
            7.0
        }

        fn spread(&self) -> f64 {
            2.0
        }

        fn output_formats(&self) -> &[String] {
            &self.formats
        }

        fn archive_name(&self) -> Option<&str> {
            self.archive.as_deref()
        }

        fn request_timeout_seconds(&self) -> Option<u64> {
            Some(5)
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// 2000Q1..2001Q4 每季兩筆報價，3M 依序為 4.0, 4.5, 5.0 ...
    fn sample_csv() -> String {
        let mut lines = vec!["Date,3M,6M".to_string()];
        for i in 0..8u32 {
            let year = 2000 + (i / 4) as i32;
            let month = (i % 4) * 3 + 1;
            let rate = 4.0 + 0.5 * i as f64;
            lines.push(format!(
                "05.{:02}.{},{:.2},{:.2}",
                month,
                year,
                rate - 0.1,
                rate + 0.2
            ));
            lines.push(format!(
                "20.{:02}.{},{:.2},{:.2}",
                month + 1,
                year,
                rate + 0.1,
                rate + 0.2
            ));
        }
        lines.join("\n")
    }

    async fn pipeline_with(
        config: MockConfig,
    ) -> (SwapPipeline<MockStorage, MockConfig>, MockStorage) {
        let storage = MockStorage::new();
        storage.put("rates.csv", &sample_csv()).await;
        let pipeline = SwapPipeline::new(storage.clone(), storage.clone(), config);
        (pipeline, storage)
    }

    #[tokio::test]
    async fn test_extract_from_storage() {
        let (pipeline, _) = pipeline_with(MockConfig::new("rates.csv")).await;

        let rows = pipeline.extract().await.unwrap();

        assert_eq!(rows.len(), 16);
        assert_eq!(rows[0].date, d(2000, 1, 5));
    }

    #[tokio::test]
    async fn test_extract_rejects_file_without_complete_rows() {
        let storage = MockStorage::new();
        storage.put("empty.csv", "Date,3M,6M\n01.01.2000,,5.0\n").await;
        let pipeline = SwapPipeline::new(storage.clone(), storage, MockConfig::new("empty.csv"));

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, SwapError::DataError { .. }));
    }

    #[tokio::test]
    async fn test_extract_from_http_source() {
        let server = MockServer::start();
        let rates_mock = server.mock(|when, then| {
            when.method(GET).path("/libor.csv");
            then.status(200)
                .header("Content-Type", "text/csv")
                .body(sample_csv());
        });

        let storage = MockStorage::new();
        let config = MockConfig::new(&server.url("/libor.csv"));
        let pipeline = SwapPipeline::new(storage.clone(), storage, config);

        let rows = pipeline.extract().await.unwrap();

        rates_mock.assert();
        assert_eq!(rows.len(), 16);
    }

    #[tokio::test]
    async fn test_extract_http_error_status() {
        let server = MockServer::start();
        let rates_mock = server.mock(|when, then| {
            when.method(GET).path("/missing.csv");
            then.status(404);
        });

        let storage = MockStorage::new();
        let config = MockConfig::new(&server.url("/missing.csv"));
        let pipeline = SwapPipeline::new(storage.clone(), storage, config);

        let err = pipeline.extract().await.unwrap_err();

        rates_mock.assert();
        assert!(matches!(err, SwapError::HttpStatusError { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_transform_with_explicit_start_date() {
        let mut config = MockConfig::new("rates.csv");
        config.start_date = Some(d(2000, 4, 1));
        let (pipeline, _) = pipeline_with(config).await;

        let rows = pipeline.extract().await.unwrap();
        let report = pipeline.transform(rows).await.unwrap();

        // 2000-04-01 .. 2001-04-01: 2000Q2, Q3, Q4, 2001Q1
        assert_eq!(report.end_date, d(2001, 4, 1));
        assert_eq!(report.cash_flows.len(), 4);
        assert_eq!(report.cash_flows[0].date, d(2000, 6, 30));
        assert_eq!(report.rates.len(), 4);

        // 2000Q2 的 3M 平均是 4.5 → (4.5 + 2) * 100000 / 100 / 4 = 1625
        let first = &report.cash_flows[0];
        assert!((first.libor_3m.unwrap() - 4.5).abs() < 1e-9);
        assert!((first.floating_payment.unwrap() - 1_625.0).abs() < 1e-9);
        assert!((first.net_cash_flow.unwrap() - 125.0).abs() < 1e-9);

        assert!(report.csv_output.starts_with("date,libor_3m,floating_payment"));
        assert!(report.csv_output.contains("2000-06-30,4.5000,1625.00,1750.00,125.00"));
        assert!(report.tsv_output.contains("2000-06-30\t4.5000\t1625.00"));
    }

    #[tokio::test]
    async fn test_transform_defaults_to_last_selectable_start() {
        let (pipeline, _) = pipeline_with(MockConfig::new("rates.csv")).await;

        let rows = pipeline.extract().await.unwrap();
        let report = pipeline.transform(rows).await.unwrap();

        // 8 季資料 → 可選 4 個季初，預設索引超出範圍時取最後一個
        assert_eq!(report.contract.start_date, d(2000, 10, 1));
    }

    #[tokio::test]
    async fn test_transform_rejects_non_quarter_start() {
        let mut config = MockConfig::new("rates.csv");
        config.start_date = Some(d(2000, 5, 1));
        let (pipeline, _) = pipeline_with(config).await;

        let rows = pipeline.extract().await.unwrap();
        let err = pipeline.transform(rows).await.unwrap_err();

        assert!(matches!(err, SwapError::StartDateError { .. }));
    }

    #[tokio::test]
    async fn test_transform_rejects_start_in_last_year() {
        let mut config = MockConfig::new("rates.csv");
        config.start_date = Some(d(2001, 1, 1));
        let (pipeline, _) = pipeline_with(config).await;

        let rows = pipeline.extract().await.unwrap();
        assert!(pipeline.transform(rows).await.is_err());
    }

    #[tokio::test]
    async fn test_load_writes_loose_files() {
        let mut config = MockConfig::new("rates.csv");
        config.formats = vec!["csv".to_string(), "json".to_string()];
        let (pipeline, storage) = pipeline_with(config).await;

        let rows = pipeline.extract().await.unwrap();
        let report = pipeline.transform(rows).await.unwrap();
        let path = pipeline.load(report).await.unwrap();

        assert_eq!(path, "test_output");
        assert!(storage.get_file(CASHFLOWS_CSV).await.is_some());
        assert!(storage.get_file(CASHFLOWS_TSV).await.is_none());

        let json = storage.get_file(REPORT_JSON).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["contract"]["tenure_years"], 1);
        assert!(value["summary"]["priced_periods"].as_u64().unwrap() > 0);
        let fixed_greater = &value["scenarios"]["fixed_greater"];
        assert_eq!(fixed_greater["label"], "Fixed > Floating");
        assert_eq!(fixed_greater["beneficiary"], "Company A");
        assert_eq!(value["scenarios"]["floating_greater"]["label"], "Floating > Fixed");
        assert_eq!(value["scenarios"]["floating_greater"]["beneficiary"], "Company B");
        assert_eq!(
            fixed_greater["points"].as_array().unwrap().len(),
            value["cash_flows"].as_array().unwrap().len()
        );
        assert!(value.get("csv_output").is_none());
    }

    #[tokio::test]
    async fn test_load_writes_zip_archive() {
        let mut config = MockConfig::new("rates.csv");
        config.archive = Some("swap.zip".to_string());
        let (pipeline, storage) = pipeline_with(config).await;

        let rows = pipeline.extract().await.unwrap();
        let report = pipeline.transform(rows).await.unwrap();
        let path = pipeline.load(report).await.unwrap();

        assert_eq!(path, "test_output/swap.zip");
        let zip_data = storage.get_file("swap.zip").await.unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();

        let names: Vec<&str> = archive.file_names().collect();
        assert_eq!(archive.len(), 4);
        for expected in [CASHFLOWS_CSV, CASHFLOWS_TSV, REPORT_JSON, RATES_CSV] {
            assert!(names.contains(&expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_render_cash_flows_blank_for_missing_fixing() {
        let flows = vec![CashFlow {
            date: d(2005, 9, 30),
            libor_3m: None,
            floating_payment: None,
            fixed_payment: 1_750.0,
            net_cash_flow: None,
        }];

        let csv = render_cash_flows(&flows, b',').unwrap();
        assert_eq!(
            csv,
            "date,libor_3m,floating_payment,fixed_payment,net_cash_flow\n2005-09-30,,,1750.00,\n"
        );
    }
}
