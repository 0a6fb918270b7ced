use serde::{Deserialize, Serialize};

use super::validate::{InvalidInput, IssueList};

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthInput {
    pub years: u32,
    pub annual_contribution: f64,
    pub annual_rate_percent: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthResult {
    pub total_contributed: f64,
    pub total_interest: f64,
    pub total: f64,
}

/// Annual compounding on the combined balance. Each year's contribution is
/// added before the interest pass, so a deposit starts earning interest in
/// the year it lands. Callers must not reorder these two steps; downstream
/// numbers are only reproducible with contribute-then-compound.
pub fn project_growth(input: &GrowthInput) -> Result<GrowthResult, InvalidInput> {
    validate(input)?;

    let rate = input.annual_rate_percent / 100.0;
    let mut principal = 0.0;
    let mut interest_accrued = 0.0;
    for _ in 1..=input.years {
        principal += input.annual_contribution;
        interest_accrued += (principal + interest_accrued) * rate;
    }

    Ok(GrowthResult {
        total_contributed: principal,
        total_interest: interest_accrued,
        total: principal + interest_accrued,
    })
}

fn validate(input: &GrowthInput) -> Result<(), InvalidInput> {
    let mut issues = IssueList::new();
    issues.require(input.years >= 1, "years must be >= 1");
    issues.require(
        input.annual_contribution.is_finite() && input.annual_contribution > 0.0,
        "annualContribution must be > 0",
    );
    issues.require(
        input.annual_rate_percent.is_finite() && input.annual_rate_percent >= 0.0,
        "annualRatePercent must be >= 0",
    );
    issues.into_result()
}
