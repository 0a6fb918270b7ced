use serde::Serialize;

use super::validate::{InvalidInput, IssueList};

/// One marginal tax bracket. `upper_bound` is the inclusive ceiling of the
/// income taxed at `rate`; the bracket's floor is the previous bracket's
/// ceiling. The final bracket carries `f64::INFINITY`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxBracket {
    pub rate: f64,
    pub upper_bound: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxResult {
    pub total_tax: f64,
    pub net_income: f64,
}

/// 2022 U.S. federal single-filer table. Replaceable per request; the walk
/// in [`compute_tax`] never assumes these numbers.
pub const DEFAULT_BRACKETS: [TaxBracket; 7] = [
    TaxBracket {
        rate: 0.10,
        upper_bound: 10_276.0,
    },
    TaxBracket {
        rate: 0.12,
        upper_bound: 41_776.0,
    },
    TaxBracket {
        rate: 0.22,
        upper_bound: 89_076.0,
    },
    TaxBracket {
        rate: 0.24,
        upper_bound: 170_051.0,
    },
    TaxBracket {
        rate: 0.32,
        upper_bound: 215_591.0,
    },
    TaxBracket {
        rate: 0.35,
        upper_bound: 539_901.0,
    },
    TaxBracket {
        rate: 0.37,
        upper_bound: f64::INFINITY,
    },
];

/// Marginal-bracket taxation: each slice of income is taxed at the rate of
/// the bracket it falls into. The early break once `income <= upper_bound`
/// is an optimization only; later slices would all be zero.
pub fn compute_tax(income: f64, brackets: &[TaxBracket]) -> Result<TaxResult, InvalidInput> {
    let mut issues = IssueList::new();
    issues.require(
        income.is_finite() && income >= 0.0,
        "taxableIncome must be >= 0",
    );
    check_brackets(brackets, &mut issues);
    issues.into_result()?;

    let mut tax = 0.0;
    let mut lower = 0.0;
    for bracket in brackets {
        let slice = (income.min(bracket.upper_bound) - lower).max(0.0);
        tax += slice * bracket.rate;
        if income <= bracket.upper_bound {
            break;
        }
        lower = bracket.upper_bound;
    }

    Ok(TaxResult {
        total_tax: tax,
        net_income: income - tax,
    })
}

fn check_brackets(brackets: &[TaxBracket], issues: &mut IssueList) {
    if brackets.is_empty() {
        issues.push("brackets must not be empty");
        return;
    }

    for (index, bracket) in brackets.iter().enumerate() {
        if !(0.0..=1.0).contains(&bracket.rate) {
            issues.push(format!("brackets[{index}].rate must be between 0 and 1"));
        }
        if bracket.upper_bound <= 0.0 || bracket.upper_bound.is_nan() {
            issues.push(format!("brackets[{index}].upperBound must be > 0"));
        }
    }

    for (index, pair) in brackets.windows(2).enumerate() {
        if pair[1].upper_bound <= pair[0].upper_bound {
            issues.push(format!(
                "brackets[{}].upperBound must exceed brackets[{index}].upperBound",
                index + 1
            ));
        }
    }

    if let Some(last) = brackets.last() {
        if last.upper_bound.is_finite() {
            issues.push("the final bracket must be unbounded");
        }
    }
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

    fn tax_on(income: f64) -> TaxResult {
        compute_tax(income, &DEFAULT_BRACKETS).expect("valid income")
    }

    #[test]
    fn income_inside_lowest_bracket_is_flat_ten_percent() {
        let result = tax_on(10_000.0);
        assert_approx(result.total_tax, 1_000.0);
        assert_approx(result.net_income, 9_000.0);
    }

    #[test]
    fn zero_income_owes_nothing() {
        let result = tax_on(0.0);
        assert_eq!(result.total_tax, 0.0);
        assert_eq!(result.net_income, 0.0);
    }

    #[test]
    fn boundary_dollar_is_not_taxed_twice() {
        let at_boundary = tax_on(10_276.0);
        assert_approx(at_boundary.total_tax, 1_027.6);

        let one_past = tax_on(10_277.0);
        assert_approx(one_past.total_tax, 1_027.6 + 0.12);
    }

    #[test]
    fn fifty_thousand_spans_first_three_brackets() {
        // 10276 * 0.10 + (41776 - 10276) * 0.12 + (50000 - 41776) * 0.22
        let result = tax_on(50_000.0);
        assert_approx(result.total_tax, 6_616.88);
        assert_approx(result.total_tax + result.net_income, 50_000.0);
    }

    #[test]
    fn top_bracket_income_uses_every_rate() {
        let result = tax_on(600_000.0);
        let expected = 10_276.0 * 0.10
            + (41_776.0 - 10_276.0) * 0.12
            + (89_076.0 - 41_776.0) * 0.22
            + (170_051.0 - 89_076.0) * 0.24
            + (215_591.0 - 170_051.0) * 0.32
            + (539_901.0 - 215_591.0) * 0.35
            + (600_000.0 - 539_901.0) * 0.37;
        assert_approx(result.total_tax, expected);
    }

    #[test]
    fn custom_flat_table_applies_single_rate() {
        let flat = [TaxBracket {
            rate: 0.25,
            upper_bound: f64::INFINITY,
        }];
        let result = compute_tax(80_000.0, &flat).expect("valid table");
        assert_approx(result.total_tax, 20_000.0);
    }

    #[test]
    fn negative_income_is_rejected() {
        let err = compute_tax(-1.0, &DEFAULT_BRACKETS).expect_err("must reject");
        assert!(err.to_string().contains("taxableIncome"));
    }

    #[test]
    fn misordered_bounds_are_rejected() {
        let table = [
            TaxBracket {
                rate: 0.10,
                upper_bound: 50_000.0,
            },
            TaxBracket {
                rate: 0.20,
                upper_bound: 40_000.0,
            },
            TaxBracket {
                rate: 0.30,
                upper_bound: f64::INFINITY,
            },
        ];
        let err = compute_tax(10_000.0, &table).expect_err("must reject");
        assert!(err.to_string().contains("upperBound"));
    }

    #[test]
    fn bounded_final_bracket_is_rejected() {
        let table = [TaxBracket {
            rate: 0.10,
            upper_bound: 10_000.0,
        }];
        let err = compute_tax(5_000.0, &table).expect_err("must reject");
        assert!(err.to_string().contains("unbounded"));
    }

    #[test]
    fn rate_above_one_is_rejected() {
        let table = [TaxBracket {
            rate: 1.5,
            upper_bound: f64::INFINITY,
        }];
        let err = compute_tax(5_000.0, &table).expect_err("must reject");
        assert!(err.to_string().contains("rate"));
    }

    proptest! {
        #[test]
        fn prop_tax_and_net_income_are_monotonic(
            lower_cents in 0u64..60_000_000,
            extra_cents in 0u64..60_000_000
        ) {
            let lower = lower_cents as f64 / 100.0;
            let higher = lower + extra_cents as f64 / 100.0;
            let a = tax_on(lower);
            let b = tax_on(higher);
            prop_assert!(b.total_tax + 1e-9 >= a.total_tax);
            prop_assert!(b.net_income + 1e-9 >= a.net_income);
        }

        #[test]
        fn prop_tax_never_exceeds_top_marginal_rate(income_cents in 0u64..100_000_000) {
            let income = income_cents as f64 / 100.0;
            let result = tax_on(income);
            prop_assert!(result.total_tax >= 0.0);
            prop_assert!(result.total_tax <= income * 0.37 + 1e-9);
            prop_assert!((result.net_income - (income - result.total_tax)).abs() <= 1e-9);
        }
    }
}
