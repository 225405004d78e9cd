//! Job Search Query Builder
//!
//! Translates the search parameters of `/allJobs` and `/jobsCount` into a
//! store filter plus find options. Listing and counting share
//! [`job_predicate`], so a count always describes the same set the pages
//! are cut from.

use solosphere_core::dto::job::{JobCountParams, JobSearchParams};

use crate::store::{Filter, FindOptions, Sort, SortDirection};

pub const TITLE_FIELD: &str = "job_title";
pub const CATEGORY_FIELD: &str = "job_category";
pub const DEADLINE_FIELD: &str = "deadline";

/// A parsed job search
///
/// Page and size are taken as given: a page past the end, or a size of
/// zero, simply yields an empty page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobQuery {
    /// Zero-based page index
    pub page: u64,
    /// Page size; `None` returns everything from the page start on
    pub size: Option<u64>,
    /// Exact category to restrict to
    pub category: Option<String>,
    /// Deadline ordering; `None` keeps store order
    pub sort: Option<SortDirection>,
    /// Case-insensitive title substring
    pub search: String,
}

impl JobQuery {
    pub fn from_params(params: JobSearchParams) -> Self {
        JobQuery {
            page: params.page.unwrap_or(0),
            size: params.size,
            category: non_empty(params.filter),
            sort: parse_sort(params.sort.as_deref()),
            search: params.search.unwrap_or_default(),
        }
    }

    /// Query used for counting: predicate fields only
    pub fn for_count(params: JobCountParams) -> Self {
        JobQuery {
            category: non_empty(params.filter),
            search: params.search.unwrap_or_default(),
            ..JobQuery::default()
        }
    }

    pub fn filter(&self) -> Filter {
        job_predicate(self.category.as_deref(), &self.search)
    }

    pub fn options(&self) -> FindOptions {
        let skip = match self.size {
            Some(size) => self.page.saturating_mul(size),
            None => 0,
        };

        FindOptions {
            sort: self.sort.map(|direction| Sort {
                field: DEADLINE_FIELD,
                direction,
            }),
            skip,
            limit: self.size,
        }
    }
}

/// Predicate shared by the search listing and the search count
///
/// An empty search matches every job; a present, non-empty category is
/// ANDed on as an exact match.
pub fn job_predicate(category: Option<&str>, search: &str) -> Filter {
    let mut parts = Vec::with_capacity(2);

    if !search.is_empty() {
        parts.push(Filter::contains_ignore_case(TITLE_FIELD, search));
    }
    if let Some(category) = category.filter(|c| !c.is_empty()) {
        parts.push(Filter::eq(CATEGORY_FIELD, category));
    }

    Filter::and(parts)
}

/// `asc` sorts ascending; any other non-empty value sorts descending
pub fn parse_sort(raw: Option<&str>) -> Option<SortDirection> {
    match raw {
        None | Some("") => None,
        Some("asc") => Some(SortDirection::Ascending),
        Some(_) => Some(SortDirection::Descending),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_search_matches_all() {
        assert_eq!(job_predicate(None, ""), Filter::All);
        assert_eq!(job_predicate(Some(""), ""), Filter::All);
    }

    #[test]
    fn test_search_and_category_are_anded() {
        assert_eq!(
            job_predicate(Some("design"), "lead"),
            Filter::And(vec![
                Filter::contains_ignore_case(TITLE_FIELD, "lead"),
                Filter::eq(CATEGORY_FIELD, "design"),
            ])
        );
        assert_eq!(
            job_predicate(Some("design"), ""),
            Filter::eq(CATEGORY_FIELD, "design")
        );
    }

    #[test]
    fn test_parse_sort() {
        assert_eq!(parse_sort(None), None);
        assert_eq!(parse_sort(Some("")), None);
        assert_eq!(parse_sort(Some("asc")), Some(SortDirection::Ascending));
        assert_eq!(parse_sort(Some("desc")), Some(SortDirection::Descending));
        assert_eq!(parse_sort(Some("newest")), Some(SortDirection::Descending));
    }

    #[test]
    fn test_pagination_window() {
        let query = JobQuery::from_params(JobSearchParams {
            page: Some(2),
            size: Some(10),
            filter: None,
            sort: Some("asc".to_string()),
            search: None,
        });

        let options = query.options();
        assert_eq!(options.skip, 20);
        assert_eq!(options.limit, Some(10));
        assert_eq!(
            options.sort,
            Some(Sort {
                field: DEADLINE_FIELD,
                direction: SortDirection::Ascending,
            })
        );
    }

    #[test]
    fn test_pagination_is_permissive() {
        let huge = JobQuery {
            page: u64::MAX,
            size: Some(u64::MAX),
            ..JobQuery::default()
        };
        assert_eq!(huge.options().skip, u64::MAX);

        let unsized_query = JobQuery {
            page: 3,
            ..JobQuery::default()
        };
        assert_eq!(unsized_query.options().skip, 0);
        assert_eq!(unsized_query.options().limit, None);
    }

    #[test]
    fn test_count_uses_same_predicate_as_search() {
        let params = JobSearchParams {
            page: Some(4),
            size: Some(5),
            filter: Some("design".to_string()),
            sort: Some("desc".to_string()),
            search: Some("Lead".to_string()),
        };

        let count = JobQuery::for_count(JobCountParams::from(&params));
        let search = JobQuery::from_params(params);
        assert_eq!(count.filter(), search.filter());
        assert_eq!(count.options(), FindOptions::default());
    }
}
