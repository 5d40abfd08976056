pub mod cashflow;
pub mod engine;
pub mod pipeline;
pub mod rates;

pub use crate::domain::model::{CashFlow, QuarterlyRate, RateObservation, SwapReport};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
