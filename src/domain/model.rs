use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// 一筆同時有 3M 與 6M 報價的每日利率
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateObservation {
    pub date: NaiveDate,
    pub three_month: f64,
    pub six_month: f64,
}

/// 季度平均利率；季度內沒有報價時為 None
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterlyRate {
    pub quarter_end: NaiveDate,
    pub three_month: Option<f64>,
    pub six_month: Option<f64>,
}

/// Plain-vanilla swap terms. Rates and spread are percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapContract {
    pub start_date: NaiveDate,
    pub tenure_years: u32,
    pub notional: f64,
    pub fixed_rate: f64,
    pub spread: f64,
}

impl SwapContract {
    /// Start date plus the tenure in calendar years. A 29 February start
    /// lands on 28 February in non-leap years.
    pub fn end_date(&self) -> NaiveDate {
        self.start_date
            .checked_add_months(Months::new(self.tenure_years * 12))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    pub date: NaiveDate,
    pub libor_3m: Option<f64>,
    pub floating_payment: Option<f64>,
    pub fixed_payment: f64,
    /// fixed - floating
    pub net_cash_flow: Option<f64>,
}

impl CashFlow {
    pub fn scenario(&self) -> Option<Scenario> {
        self.net_cash_flow.map(Scenario::from_net)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    FixedGreater,
    FloatingGreater,
    Even,
}

impl Scenario {
    pub fn from_net(net: f64) -> Self {
        if net > 0.0 {
            Scenario::FixedGreater
        } else if net < 0.0 {
            Scenario::FloatingGreater
        } else {
            Scenario::Even
        }
    }

    /// Company A took over the floating leg and receives fixed, so it gains
    /// when the fixed payment is the larger one. Company B is the mirror.
    pub fn beneficiary(&self) -> Option<Counterparty> {
        match self {
            Scenario::FixedGreater => Some(Counterparty::CompanyA),
            Scenario::FloatingGreater => Some(Counterparty::CompanyB),
            Scenario::Even => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Scenario::FixedGreater => "Fixed > Floating",
            Scenario::FloatingGreater => "Floating > Fixed",
            Scenario::Even => "Fixed = Floating",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Counterparty {
    CompanyA,
    CompanyB,
}

impl std::fmt::Display for Counterparty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Counterparty::CompanyA => write!(f, "Company A"),
            Counterparty::CompanyB => write!(f, "Company B"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwapSummary {
    pub periods: usize,
    pub priced_periods: usize,
    pub total_fixed: f64,
    pub total_floating: f64,
    pub total_net: f64,
    pub fixed_greater_periods: usize,
    pub floating_greater_periods: usize,
    pub even_periods: usize,
    pub largest_net_date: Option<NaiveDate>,
    pub largest_net: Option<f64>,
    pub overall_beneficiary: Option<Counterparty>,
}

/// Output of the transform stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapReport {
    pub contract: SwapContract,
    pub end_date: NaiveDate,
    pub rates: Vec<QuarterlyRate>,
    pub cash_flows: Vec<CashFlow>,
    pub summary: SwapSummary,
    #[serde(skip)]
    pub csv_output: String,
    #[serde(skip)]
    pub tsv_output: String,
    #[serde(skip)]
    pub rates_csv_output: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(start: NaiveDate, tenure_years: u32) -> SwapContract {
        SwapContract {
            start_date: start,
            tenure_years,
            notional: 100_000.0,
            fixed_rate: 7.0,
            spread: 2.0,
        }
    }

    #[test]
    fn test_end_date_adds_calendar_years() {
        let start = NaiveDate::from_ymd_opt(2012, 4, 1).unwrap();
        assert_eq!(
            contract(start, 5).end_date(),
            NaiveDate::from_ymd_opt(2017, 4, 1).unwrap()
        );
    }

    #[test]
    fn test_end_date_from_leap_day_clamps() {
        let start = NaiveDate::from_ymd_opt(2008, 2, 29).unwrap();
        assert_eq!(
            contract(start, 1).end_date(),
            NaiveDate::from_ymd_opt(2009, 2, 28).unwrap()
        );
    }

    #[test]
    fn test_covers_is_inclusive() {
        let start = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
        let c = contract(start, 1);
        assert!(c.covers(start));
        assert!(c.covers(NaiveDate::from_ymd_opt(2011, 1, 1).unwrap()));
        assert!(!c.covers(NaiveDate::from_ymd_opt(2011, 1, 2).unwrap()));
        assert!(!c.covers(NaiveDate::from_ymd_opt(2009, 12, 31).unwrap()));
    }

    #[test]
    fn test_scenario_beneficiary() {
        assert_eq!(
            Scenario::from_net(12.5).beneficiary(),
            Some(Counterparty::CompanyA)
        );
        assert_eq!(
            Scenario::from_net(-0.01).beneficiary(),
            Some(Counterparty::CompanyB)
        );
        assert_eq!(Scenario::from_net(0.0), Scenario::Even);
        assert_eq!(Counterparty::CompanyB.to_string(), "Company B");
    }
}
