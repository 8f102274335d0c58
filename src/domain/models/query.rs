use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest page a query may request
///
/// Only the first page is fetched, so this cap bounds how stale the oldest
/// listed issue can be.
pub const MAX_PAGE_SIZE: u8 = 10;

/// Page size used when none is configured
pub const DEFAULT_PAGE_SIZE: u8 = 10;

/// Issue state filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    #[default]
    Open,
    Closed,
    All,
}

impl IssueState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::All => "all",
        }
    }
}

/// Field the upstream sorts results by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Created,
    #[default]
    Updated,
    Comments,
}

impl SortField {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Comments => "comments",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Reasons an [`IssueQuery`] cannot be built
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidQuery {
    #[error("Label filter cannot be empty")]
    NoLabels,

    #[error("Label names cannot be blank")]
    BlankLabel,

    #[error("Invalid page size: {0}. Must be between 1 and {MAX_PAGE_SIZE}")]
    PageSize(u8),
}

/// Parameters for a single issue-list request
///
/// The label set is never empty: an unfiltered listing is not something this
/// pipeline asks for. An issue matches when it carries at least one label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueQuery {
    state: IssueState,
    labels: Vec<String>,
    sort: SortField,
    direction: SortDirection,
    per_page: u8,
}

impl IssueQuery {
    pub fn new<I, S>(labels: I) -> Result<Self, InvalidQuery>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(InvalidQuery::NoLabels);
        }
        if labels.iter().any(|l| l.trim().is_empty()) {
            return Err(InvalidQuery::BlankLabel);
        }
        Ok(Self {
            state: IssueState::default(),
            labels,
            sort: SortField::default(),
            direction: SortDirection::default(),
            per_page: DEFAULT_PAGE_SIZE,
        })
    }

    #[must_use]
    pub const fn with_state(mut self, state: IssueState) -> Self {
        self.state = state;
        self
    }

    #[must_use]
    pub const fn with_sort(mut self, sort: SortField, direction: SortDirection) -> Self {
        self.sort = sort;
        self.direction = direction;
        self
    }

    pub fn with_page_size(mut self, per_page: u8) -> Result<Self, InvalidQuery> {
        if per_page == 0 || per_page > MAX_PAGE_SIZE {
            return Err(InvalidQuery::PageSize(per_page));
        }
        self.per_page = per_page;
        Ok(self)
    }

    pub const fn state(&self) -> IssueState {
        self.state
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub const fn sort(&self) -> SortField {
        self.sort
    }

    pub const fn direction(&self) -> SortDirection {
        self.direction
    }

    pub const fn per_page(&self) -> u8 {
        self.per_page
    }

    /// Comma-joined label filter as sent on the wire
    pub fn label_filter(&self) -> String {
        self.labels.join(",")
    }

    /// Whether any of `labels` is one of the required labels
    pub fn matches_any_label<'a>(&self, mut labels: impl Iterator<Item = &'a str>) -> bool {
        labels.any(|candidate| self.labels.iter().any(|l| l.eq_ignore_ascii_case(candidate)))
    }

    /// Query string pairs in the order the upstream documents them
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("state", self.state.as_str().to_string()),
            ("labels", self.label_filter()),
            ("sort", self.sort.as_str().to_string()),
            ("direction", self.direction.as_str().to_string()),
            ("per_page", self.per_page.to_string()),
        ]
    }
}

impl fmt::Display for IssueQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "state={} labels=[{}] sort={} {} per_page={}",
            self.state.as_str(),
            self.label_filter(),
            self.sort.as_str(),
            self.direction.as_str(),
            self.per_page
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_upstream_freshness_window() {
        let query = IssueQuery::new(["good first issue", "help wanted"]).unwrap();
        assert_eq!(query.state(), IssueState::Open);
        assert_eq!(query.sort(), SortField::Updated);
        assert_eq!(query.direction(), SortDirection::Desc);
        assert_eq!(query.per_page(), 10);
        assert_eq!(query.label_filter(), "good first issue,help wanted");
    }

    #[test]
    fn test_empty_label_set_rejected() {
        assert_eq!(IssueQuery::new(Vec::<String>::new()), Err(InvalidQuery::NoLabels));
        assert_eq!(IssueQuery::new(["  "]), Err(InvalidQuery::BlankLabel));
    }

    #[test]
    fn test_page_size_bounds() {
        let query = IssueQuery::new(["bug"]).unwrap();
        assert!(query.clone().with_page_size(0).is_err());
        assert!(query.clone().with_page_size(11).is_err());
        assert!(query.clone().with_page_size(100).is_err());
        assert_eq!(query.clone().with_page_size(5).unwrap().per_page(), 5);
        assert_eq!(query.with_page_size(MAX_PAGE_SIZE).unwrap().per_page(), 10);
    }

    #[test]
    fn test_query_pairs() {
        let query = IssueQuery::new(["a", "b"])
            .unwrap()
            .with_state(IssueState::All)
            .with_sort(SortField::Created, SortDirection::Asc);
        let pairs = query.query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("state", "all".to_string()),
                ("labels", "a,b".to_string()),
                ("sort", "created".to_string()),
                ("direction", "asc".to_string()),
                ("per_page", "10".to_string()),
            ]
        );
    }

    #[test]
    fn test_label_membership_is_or() {
        let query = IssueQuery::new(["good first issue", "help wanted"]).unwrap();
        assert!(query.matches_any_label(["Help Wanted", "bug"].into_iter()));
        assert!(!query.matches_any_label(["bug"].into_iter()));
        assert!(!query.matches_any_label(std::iter::empty()));
    }
}
