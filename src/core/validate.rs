use thiserror::Error;

/// A rejected calculation request. Every offending field is reported in one
/// message rather than one at a time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .issues.join("; "))]
pub struct InvalidInput {
    pub issues: Vec<String>,
}

impl InvalidInput {
    pub fn single(issue: impl Into<String>) -> Self {
        Self {
            issues: vec![issue.into()],
        }
    }
}

/// Accumulates validation failures across all fields of a request.
#[derive(Debug, Default)]
pub struct IssueList {
    issues: Vec<String>,
}

impl IssueList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: impl Into<String>) {
        self.issues.push(issue.into());
    }

    pub fn require(&mut self, ok: bool, issue: &str) {
        if !ok {
            self.push(issue);
        }
    }

    pub fn into_result(self) -> Result<(), InvalidInput> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(InvalidInput {
                issues: self.issues,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_issue_list_is_ok() {
        assert!(IssueList::new().into_result().is_ok());
    }

    #[test]
    fn issues_are_joined_in_order() {
        let mut issues = IssueList::new();
        issues.require(false, "years must be >= 1");
        issues.require(true, "never recorded");
        issues.require(false, "annualContribution must be > 0");
        let err = issues.into_result().expect_err("must fail");
        assert_eq!(
            err.to_string(),
            "years must be >= 1; annualContribution must be > 0"
        );
    }
}
