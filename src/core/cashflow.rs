use crate::domain::model::{CashFlow, QuarterlyRate, Scenario, SwapContract, SwapSummary};
use chrono::NaiveDate;

/// Payments are made every quarter.
pub const PAYMENTS_PER_YEAR: f64 = 4.0;

pub fn fixed_payment(contract: &SwapContract) -> f64 {
    contract.notional * contract.fixed_rate / 100.0 / PAYMENTS_PER_YEAR
}

pub fn floating_payment(contract: &SwapContract, libor_3m: f64) -> f64 {
    contract.notional * (libor_3m + contract.spread) / 100.0 / PAYMENTS_PER_YEAR
}

/// Quarterly rates whose quarter end falls inside the contract period.
pub fn contract_rates(contract: &SwapContract, quarterly: &[QuarterlyRate]) -> Vec<QuarterlyRate> {
    quarterly
        .iter()
        .filter(|q| contract.covers(q.quarter_end))
        .cloned()
        .collect()
}

/// One cash flow per quarter inside the contract period.
pub fn build_cash_flows(contract: &SwapContract, quarterly: &[QuarterlyRate]) -> Vec<CashFlow> {
    let fixed = fixed_payment(contract);

    quarterly
        .iter()
        .filter(|q| contract.covers(q.quarter_end))
        .map(|q| {
            let floating = q.three_month.map(|libor| floating_payment(contract, libor));
            CashFlow {
                date: q.quarter_end,
                libor_3m: q.three_month,
                floating_payment: floating,
                fixed_payment: fixed,
                net_cash_flow: floating.map(|f| fixed - f),
            }
        })
        .collect()
}

pub type ScenarioSeries = Vec<(NaiveDate, Option<f64>)>;

/// Splits the net series into the part where fixed exceeds floating and the
/// part where floating exceeds fixed. Both stay aligned with `flows`.
pub fn split_scenarios(flows: &[CashFlow]) -> (ScenarioSeries, ScenarioSeries) {
    let pick = |keep: Scenario| {
        flows
            .iter()
            .map(|cf| {
                let value = cf.net_cash_flow.filter(|_| cf.scenario() == Some(keep));
                (cf.date, value)
            })
            .collect::<ScenarioSeries>()
    };

    (pick(Scenario::FixedGreater), pick(Scenario::FloatingGreater))
}

pub fn summarize(flows: &[CashFlow]) -> SwapSummary {
    let mut summary = SwapSummary {
        periods: flows.len(),
        ..SwapSummary::default()
    };

    for cf in flows {
        let (Some(floating), Some(net)) = (cf.floating_payment, cf.net_cash_flow) else {
            continue;
        };

        summary.priced_periods += 1;
        summary.total_fixed += cf.fixed_payment;
        summary.total_floating += floating;
        summary.total_net += net;

        match cf.scenario().unwrap_or(Scenario::Even) {
            Scenario::FixedGreater => summary.fixed_greater_periods += 1,
            Scenario::FloatingGreater => summary.floating_greater_periods += 1,
            Scenario::Even => summary.even_periods += 1,
        }

        let is_largest = summary
            .largest_net
            .map_or(true, |largest| net.abs() > largest.abs());
        if is_largest {
            summary.largest_net = Some(net);
            summary.largest_net_date = Some(cf.date);
        }
    }

    if summary.priced_periods > 0 {
        summary.overall_beneficiary = Scenario::from_net(summary.total_net).beneficiary();
    }

    summary
}
