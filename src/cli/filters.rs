//! Filter enums shared by list commands

use clap::ValueEnum;

use crate::core::result::CaseResult;

/// Result filter for case listings
///
/// Compares against the normalized result, so `pass` also matches
/// cases stored as `Passed`.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum ResultFilter {
    Pass,
    Fail,
    Pending,
    Blocked,
    /// Any result - default
    #[default]
    All,
}

impl ResultFilter {
    /// The result this filter selects, `None` for `all`
    pub fn as_result(&self) -> Option<CaseResult> {
        match self {
            ResultFilter::Pass => Some(CaseResult::Pass),
            ResultFilter::Fail => Some(CaseResult::Fail),
            ResultFilter::Pending => Some(CaseResult::Pending),
            ResultFilter::Blocked => Some(CaseResult::Blocked),
            ResultFilter::All => None,
        }
    }

    pub fn matches(&self, result: CaseResult) -> bool {
        self.as_result().map_or(true, |wanted| wanted == result)
    }
}

impl std::fmt::Display for ResultFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultFilter::Pass => write!(f, "pass"),
            ResultFilter::Fail => write!(f, "fail"),
            ResultFilter::Pending => write!(f, "pending"),
            ResultFilter::Blocked => write!(f, "blocked"),
            ResultFilter::All => write!(f, "all"),
        }
    }
}

/// Filter on the `isActive` flag
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum ActiveFilter {
    Active,
    Inactive,
    #[default]
    All,
}

impl ActiveFilter {
    pub fn matches(&self, is_active: bool) -> bool {
        match self {
            ActiveFilter::Active => is_active,
            ActiveFilter::Inactive => !is_active,
            ActiveFilter::All => true,
        }
    }
}

impl std::fmt::Display for ActiveFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActiveFilter::Active => write!(f, "active"),
            ActiveFilter::Inactive => write!(f, "inactive"),
            ActiveFilter::All => write!(f, "all"),
        }
    }
}
