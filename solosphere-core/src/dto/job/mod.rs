//! Job DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::domain::job::Buyer;

/// Request to post a new job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJob {
    pub job_title: String,
    pub job_category: String,
    #[serde(with = "crate::deadline")]
    pub deadline: DateTime<Utc>,
    pub buyer: Buyer,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Partial job update with set semantics
///
/// Keys present replace the stored value; keys absent are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobPatch(pub Map<String, Value>);

impl JobPatch {
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for JobPatch {
    fn from(fields: Map<String, Value>) -> Self {
        JobPatch(fields)
    }
}

/// Query parameters for the paginated job search
///
/// Nothing here is validated; missing values fall back to permissive
/// defaults (first page, no limit, no category, store order, match all).
/// A `page` or `size` that is empty, negative or not a number is treated
/// as missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobSearchParams {
    #[serde(default, deserialize_with = "lenient_count")]
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub size: Option<u64>,
    pub filter: Option<String>,
    pub sort: Option<String>,
    pub search: Option<String>,
}

/// Query parameters for counting search matches
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobCountParams {
    pub filter: Option<String>,
    pub search: Option<String>,
}

impl From<&JobSearchParams> for JobCountParams {
    fn from(params: &JobSearchParams) -> Self {
        JobCountParams {
            filter: params.filter.clone(),
            search: params.search.clone(),
        }
    }
}

/// Number of jobs matching a search predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCount {
    pub count: u64,
}

/// Non-negative integer from a query string or JSON value; anything
/// unusable becomes `None`
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;

    Ok(match raw {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    })
}
