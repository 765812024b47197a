//! Backend-ready plans produced by an access session.

use crate::{
    expr::FieldPath,
    mutation::{self, Mutation},
    predicate::{self, Predicate},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json, json};
use thiserror::Error as ThisError;

///
/// PlanError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PlanError {
    #[error("page limit must be at least 1")]
    ZeroLimit,

    #[error("pages are numbered from 1")]
    ZeroPage,
}

///
/// PageRequest
///
/// One-based page window.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl PageRequest {
    pub const fn new(page: u64, limit: u64) -> Result<Self, PlanError> {
        if limit == 0 {
            return Err(PlanError::ZeroLimit);
        }
        if page == 0 {
            return Err(PlanError::ZeroPage);
        }

        Ok(Self { page, limit })
    }

    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Items before this page.
    #[must_use]
    pub const fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

///
/// PageInfo
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u64,
    pub limit: u64,
    pub total_count: u64,
    pub total_pages: u64,
}

impl PageInfo {
    #[must_use]
    pub const fn from_count(total_count: u64, request: PageRequest) -> Self {
        Self {
            page: request.page,
            limit: request.limit,
            total_count,
            total_pages: total_count.div_ceil(request.limit),
        }
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

///
/// RetrievePlan
///
/// Access-scoped read: one predicate, an optional projection and an
/// optional page window.
///

#[derive(Clone, Debug, PartialEq)]
pub struct RetrievePlan {
    pub predicate: Predicate,
    pub projection: Vec<FieldPath>,
    pub page: Option<PageRequest>,
}

impl RetrievePlan {
    #[must_use]
    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = Some(page);
        self
    }

    /// Aggregation pipeline: `$match`, then a `$facet` returning the total
    /// count next to the requested items.
    #[must_use]
    pub fn pipeline(&self) -> Json {
        let mut items = Vec::new();
        if let Some(page) = self.page {
            items.push(json!({ "$skip": page.skip() }));
            items.push(json!({ "$limit": page.limit() }));
        }
        if !self.projection.is_empty() {
            let fields: Map<String, Json> = self
                .projection
                .iter()
                .map(|f| (f.to_string(), json!(1)))
                .collect();
            items.push(json!({ "$project": fields }));
        }

        json!([
            { "$match": predicate::render(&self.predicate) },
            {
                "$facet": {
                    "total": [{ "$count": "count" }],
                    "items": items,
                }
            },
        ])
    }
}

///
/// UpdatePlan
///
/// Access-scoped update: every matched resource receives the whole
/// mutation.
///

#[derive(Clone, Debug, PartialEq)]
pub struct UpdatePlan {
    pub predicate: Predicate,
    pub mutation: Mutation,
}

impl UpdatePlan {
    #[must_use]
    pub fn render(&self) -> Json {
        json!({
            "filter": predicate::render(&self.predicate),
            "update": mutation::render(&self.mutation),
        })
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_round_up() {
        let request = PageRequest::new(1, 10).unwrap();

        assert_eq!(PageInfo::from_count(0, request).total_pages, 0);
        assert_eq!(PageInfo::from_count(10, request).total_pages, 1);
        assert_eq!(PageInfo::from_count(11, request).total_pages, 2);
        assert_eq!(PageInfo::from_count(95, request).total_pages, 10);
    }

    #[test]
    fn zero_limit_and_zero_page_are_rejected() {
        assert_eq!(PageRequest::new(1, 0), Err(PlanError::ZeroLimit));
        assert_eq!(PageRequest::new(0, 5), Err(PlanError::ZeroPage));
    }

    #[test]
    fn has_next_stops_at_the_last_page() {
        let info = PageInfo::from_count(25, PageRequest::new(2, 10).unwrap());
        assert!(info.has_next());

        let last = PageInfo::from_count(25, PageRequest::new(3, 10).unwrap());
        assert!(!last.has_next());
    }

    #[test]
    fn pipeline_matches_then_facets() {
        let plan = RetrievePlan {
            predicate: Predicate::True,
            projection: vec![FieldPath::parse("email").unwrap()],
            page: None,
        }
        .with_page(PageRequest::new(3, 20).unwrap());

        assert_eq!(
            plan.pipeline(),
            json!([
                { "$match": {} },
                {
                    "$facet": {
                        "total": [{ "$count": "count" }],
                        "items": [
                            { "$skip": 40 },
                            { "$limit": 20 },
                            { "$project": { "email": 1 } },
                        ],
                    }
                },
            ])
        );
    }
}
