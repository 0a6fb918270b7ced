mod growth;
mod metrics;
mod tax;
mod validate;

pub use growth::{GrowthInput, GrowthResult, project_growth};
pub use metrics::{
    RetirementOutlook, SavingsSplit, halved_value, periodic_savings_split, retirement_outlook,
    rule_of_72_halving_years, savings_plan,
};
pub use tax::{DEFAULT_BRACKETS, TaxBracket, TaxResult, compute_tax};
pub use validate::{InvalidInput, IssueList};
