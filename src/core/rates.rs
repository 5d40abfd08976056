use crate::domain::model::{QuarterlyRate, RateObservation};
use crate::utils::error::{Result, SwapError};
use chrono::{Datelike, NaiveDate};

pub const DATE_FORMAT: &str = "%d.%m.%Y";
pub const DATE_COLUMN: &str = "Date";
pub const THREE_MONTH_COLUMN: &str = "3M";
pub const SIX_MONTH_COLUMN: &str = "6M";

/// Index into the selectable start dates used when none is given.
pub const DEFAULT_START_INDEX: usize = 56;

/// Quarters at the end of the series that cannot start a contract.
const TRAILING_QUARTERS: usize = 4;

/// Cell values read as a missing fixing, as pandas `read_csv` does by default.
const MISSING_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// 解析 LIBOR 歷史資料，只保留 3M 與 6M 都有值的列
pub fn parse_rate_csv(data: &[u8]) -> Result<Vec<RateObservation>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}') == name)
            .ok_or_else(|| SwapError::DataError {
                message: format!("missing '{}' column", name),
            })
    };
    let date_idx = column(DATE_COLUMN)?;
    let three_idx = column(THREE_MONTH_COLUMN)?;
    let six_idx = column(SIX_MONTH_COLUMN)?;

    let mut observations = Vec::new();
    let mut skipped = 0usize;

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        // 第一列是標題，資料從第 2 行開始
        let line = row + 2;

        let three_month = parse_rate(record.get(three_idx), THREE_MONTH_COLUMN, line)?;
        let six_month = parse_rate(record.get(six_idx), SIX_MONTH_COLUMN, line)?;
        let (Some(three_month), Some(six_month)) = (three_month, six_month) else {
            skipped += 1;
            continue;
        };

        let raw_date = record.get(date_idx).unwrap_or_default();
        let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT).map_err(|e| {
            SwapError::DataError {
                message: format!("line {}: invalid date '{}': {}", line, raw_date, e),
            }
        })?;

        observations.push(RateObservation {
            date,
            three_month,
            six_month,
        });
    }

    tracing::debug!(
        "Parsed {} rate observations, skipped {} incomplete rows",
        observations.len(),
        skipped
    );

    observations.sort_by_key(|o| o.date);
    Ok(observations)
}

fn parse_rate(value: Option<&str>, column: &str, line: usize) -> Result<Option<f64>> {
    let value = value.unwrap_or_default();
    if value.is_empty() || MISSING_MARKERS.contains(&value) {
        return Ok(None);
    }

    match value.parse::<f64>() {
        Ok(rate) if rate.is_finite() => Ok(Some(rate)),
        _ => Err(SwapError::DataError {
            message: format!("line {}: invalid {} rate '{}'", line, column, value),
        }),
    }
}

fn quarter_index(date: NaiveDate) -> i32 {
    date.year() * 4 + (date.month0() / 3) as i32
}

fn quarter_end_from_index(index: i32) -> NaiveDate {
    let year = index.div_euclid(4);
    let quarter = index.rem_euclid(4) as u32;
    let next_first_month = quarter * 3 + 4;
    let next = if next_first_month > 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, next_first_month, 1)
    };
    next.and_then(|d| d.pred_opt()).unwrap_or(NaiveDate::MAX)
}

/// Last day of the calendar quarter containing `date`.
pub fn quarter_end(date: NaiveDate) -> NaiveDate {
    quarter_end_from_index(quarter_index(date))
}

/// First day of the calendar quarter containing `date`.
pub fn quarter_start(date: NaiveDate) -> NaiveDate {
    let first_month = (date.month0() / 3) * 3 + 1;
    NaiveDate::from_ymd_opt(date.year(), first_month, 1).unwrap_or(date)
}

/// Averages observations per calendar quarter. Every quarter between the
/// first and last observation appears once, empty ones with `None`.
pub fn resample_quarterly(observations: &[RateObservation]) -> Vec<QuarterlyRate> {
    let (Some(first), Some(last)) = (
        observations.iter().map(|o| o.date).min(),
        observations.iter().map(|o| o.date).max(),
    ) else {
        return Vec::new();
    };

    let first_idx = quarter_index(first);
    let last_idx = quarter_index(last);
    let len = (last_idx - first_idx + 1) as usize;

    // (3M 總和, 6M 總和, 筆數)
    let mut buckets = vec![(0.0f64, 0.0f64, 0usize); len];
    for obs in observations {
        let slot = &mut buckets[(quarter_index(obs.date) - first_idx) as usize];
        slot.0 += obs.three_month;
        slot.1 += obs.six_month;
        slot.2 += 1;
    }

    buckets
        .into_iter()
        .enumerate()
        .map(|(offset, (sum_3m, sum_6m, count))| {
            let mean = |sum: f64| (count > 0).then(|| sum / count as f64);
            QuarterlyRate {
                quarter_end: quarter_end_from_index(first_idx + offset as i32),
                three_month: mean(sum_3m),
                six_month: mean(sum_6m),
            }
        })
        .collect()
}

/// Quarter starts a contract may begin on: all but the last four quarters.
pub fn selectable_start_dates(quarterly: &[QuarterlyRate]) -> Vec<NaiveDate> {
    let usable = quarterly.len().saturating_sub(TRAILING_QUARTERS);
    quarterly[..usable]
        .iter()
        .map(|q| quarter_start(q.quarter_end))
        .collect()
}

pub fn default_start_date(selectable: &[NaiveDate]) -> Option<NaiveDate> {
    selectable
        .get(DEFAULT_START_INDEX)
        .or_else(|| selectable.last())
        .copied()
}
