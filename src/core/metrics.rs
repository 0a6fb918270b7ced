use serde::Serialize;

use super::validate::{InvalidInput, IssueList};

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsSplit {
    pub weekly: f64,
    pub bi_weekly: f64,
    pub monthly: f64,
    pub annual: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementOutlook {
    pub years_to_retirement: u32,
    pub nest_egg_target: f64,
    pub monthly_withdrawal: f64,
}

/// Splits the saved share of a salary into pay-period amounts. No rounding;
/// display formatting is the caller's concern.
pub fn savings_plan(annual_salary: f64, percent_saved: f64) -> Result<SavingsSplit, InvalidInput> {
    let mut issues = IssueList::new();
    issues.require(
        annual_salary.is_finite() && annual_salary > 0.0,
        "annualSalary must be > 0",
    );
    issues.require(
        percent_saved.is_finite() && (0.0..=100.0).contains(&percent_saved),
        "percentSaved must be between 0 and 100",
    );
    issues.into_result()?;

    Ok(periodic_savings_split(annual_salary * percent_saved / 100.0))
}

pub fn periodic_savings_split(annual_amount: f64) -> SavingsSplit {
    SavingsSplit {
        weekly: annual_amount / 52.0,
        bi_weekly: annual_amount / 26.0,
        monthly: annual_amount / 12.0,
        annual: annual_amount,
    }
}

/// Years for a fixed amount to lose half its purchasing power at the given
/// inflation rate. A zero rate has no economic meaning here and is rejected
/// rather than answered with infinity.
pub fn rule_of_72_halving_years(rate_percent: f64) -> Result<f64, InvalidInput> {
    if !rate_percent.is_finite() || rate_percent <= 0.0 {
        return Err(InvalidInput::single("annualRatePercent must be > 0"));
    }
    Ok(72.0 / rate_percent)
}

pub fn halved_value(amount: f64) -> f64 {
    amount / 2.0
}

/// Safe-withdrawal sizing: the nest egg that sustains `annual_expenses` at
/// the given withdrawal rate (25x expenses at the default 4%).
pub fn retirement_outlook(
    current_age: u32,
    retirement_age: u32,
    annual_expenses: f64,
    withdrawal_rate_percent: f64,
) -> Result<RetirementOutlook, InvalidInput> {
    let mut issues = IssueList::new();
    issues.require(
        retirement_age > current_age,
        "retirementAge must be > currentAge",
    );
    issues.require(
        annual_expenses.is_finite() && annual_expenses > 0.0,
        "annualExpenses must be > 0",
    );
    issues.require(
        withdrawal_rate_percent.is_finite()
            && withdrawal_rate_percent > 0.0
            && withdrawal_rate_percent <= 100.0,
        "withdrawalRatePercent must be between 0 (exclusive) and 100",
    );
    issues.into_result()?;

    Ok(RetirementOutlook {
        years_to_retirement: retirement_age - current_age,
        nest_egg_target: annual_expenses * 100.0 / withdrawal_rate_percent,
        monthly_withdrawal: annual_expenses / 12.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn savings_plan_splits_the_saved_share() {
        let split = savings_plan(52_000.0, 10.0).expect("valid inputs");
        assert_approx(split.annual, 5_200.0);
        assert_approx(split.weekly, 100.0);
        assert_approx(split.bi_weekly, 200.0);
        assert_approx(split.monthly, 5_200.0 / 12.0);
    }

    #[test]
    fn savings_plan_rejects_both_bad_fields_at_once() {
        let err = savings_plan(0.0, 150.0).expect_err("must reject");
        assert_eq!(err.issues.len(), 2);
        assert!(err.to_string().contains("annualSalary"));
        assert!(err.to_string().contains("percentSaved"));
    }

    #[test]
    fn saving_everything_is_allowed() {
        let split = savings_plan(40_000.0, 100.0).expect("valid inputs");
        assert_approx(split.annual, 40_000.0);
    }

    #[test]
    fn halving_years_at_published_inflation_rate() {
        let years = rule_of_72_halving_years(9.1).expect("valid rate");
        assert!((years - 7.912087912).abs() <= 1e-6);
    }

    #[test]
    fn zero_rate_never_returns_infinity() {
        let err = rule_of_72_halving_years(0.0).expect_err("must reject zero rate");
        assert!(err.to_string().contains("annualRatePercent"));
    }

    #[test]
    fn halved_value_is_exact() {
        assert_eq!(halved_value(10_000.0), 5_000.0);
    }

    #[test]
    fn retirement_outlook_targets_25x_expenses_at_four_percent() {
        let outlook = retirement_outlook(30, 65, 40_000.0, 4.0).expect("valid inputs");
        assert_eq!(outlook.years_to_retirement, 35);
        assert_approx(outlook.nest_egg_target, 1_000_000.0);
        assert_approx(outlook.monthly_withdrawal, 40_000.0 / 12.0);
    }

    #[test]
    fn retirement_in_the_past_is_rejected() {
        let err = retirement_outlook(65, 65, 40_000.0, 4.0).expect_err("must reject");
        assert!(err.to_string().contains("retirementAge"));
    }

    proptest! {
        #[test]
        fn prop_split_periods_recompose_the_annual_amount(amount_cents in 0u64..10_000_000_000) {
            let annual = amount_cents as f64 / 100.0;
            let split = periodic_savings_split(annual);
            prop_assert!((split.weekly * 52.0 - annual).abs() <= annual.abs() * 1e-12 + 1e-9);
            prop_assert!((split.bi_weekly * 26.0 - annual).abs() <= annual.abs() * 1e-12 + 1e-9);
            prop_assert!((split.monthly * 12.0 - annual).abs() <= annual.abs() * 1e-12 + 1e-9);
            prop_assert!(split.annual == annual);
        }
    }
}
