//! Compound clauses that own other clauses
//!
//! Children are held exclusively: list roles are [`QueryClauses`], single
//! slots are boxed [`Query`] envelopes. Building a compound builds every
//! child first, so the first invalid child aborts the whole clause with its
//! role attached to the error.

use serde_json::{Map, Value};

use crate::error::{DslError, ErrorKind};
use crate::input::Loose;
use crate::params::{read_params, report_unknown, write_params, Param, Parameterized, Params};

use super::shape::flat;
use super::{build_slot, parse_slot, ClauseBody, ClauseParams, Query, QueryClauses, QueryKind, QueryParams};

// ============================================================================
// bool
// ============================================================================

const BOOL_ROLES: [&str; 4] = ["must", "filter", "should", "must_not"];

/// Boolean combination of clauses by occurrence role
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    must: QueryClauses,
    filter: QueryClauses,
    should: QueryClauses,
    must_not: QueryClauses,
    params: Params,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolParams {
    pub must: Vec<ClauseParams>,
    pub filter: Vec<ClauseParams>,
    pub should: Vec<ClauseParams>,
    pub must_not: Vec<ClauseParams>,
    pub minimum_should_match: Option<Loose>,
    pub boost: Option<Loose>,
    pub name: Option<String>,
}

impl BoolParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must(mut self, clause: impl Into<ClauseParams>) -> Self {
        self.must.push(clause.into());
        self
    }

    pub fn filter(mut self, clause: impl Into<ClauseParams>) -> Self {
        self.filter.push(clause.into());
        self
    }

    pub fn should(mut self, clause: impl Into<ClauseParams>) -> Self {
        self.should.push(clause.into());
        self
    }

    pub fn must_not(mut self, clause: impl Into<ClauseParams>) -> Self {
        self.must_not.push(clause.into());
        self
    }

    pub fn build(self) -> Result<BoolQuery, DslError> {
        BoolQuery::new(self)
    }
}

parameterized!(BoolQuery, Some(QueryKind::Bool), [
    WithMinimumShouldMatch: MinimumShouldMatch,
    WithBoost: Boost,
    WithName: Name,
]);

impl BoolQuery {
    pub fn new(record: BoolParams) -> Result<Self, DslError> {
        let owner = Self::OWNER;
        let mut params = Params::new();
        params.apply(Param::MinimumShouldMatch, record.minimum_should_match, owner)?;
        params.apply(Param::Boost, record.boost, owner)?;
        params.apply(Param::Name, record.name, owner)?;
        Ok(BoolQuery {
            must: QueryClauses::build("must", record.must)?,
            filter: QueryClauses::build("filter", record.filter)?,
            should: QueryClauses::build("should", record.should)?,
            must_not: QueryClauses::build("must_not", record.must_not)?,
            params,
        })
    }

    pub fn must(&self) -> &QueryClauses {
        &self.must
    }

    pub fn filter(&self) -> &QueryClauses {
        &self.filter
    }

    pub fn should(&self) -> &QueryClauses {
        &self.should
    }

    pub fn must_not(&self) -> &QueryClauses {
        &self.must_not
    }

    pub fn must_mut(&mut self) -> &mut QueryClauses {
        &mut self.must
    }

    pub fn filter_mut(&mut self) -> &mut QueryClauses {
        &mut self.filter
    }

    pub fn should_mut(&mut self) -> &mut QueryClauses {
        &mut self.should
    }

    pub fn must_not_mut(&mut self) -> &mut QueryClauses {
        &mut self.must_not
    }

    fn roles(&self) -> [(&'static str, &QueryClauses); 4] {
        [
            ("must", &self.must),
            ("filter", &self.filter),
            ("should", &self.should),
            ("must_not", &self.must_not),
        ]
    }
}

impl ClauseBody for BoolQuery {
    const KIND: QueryKind = QueryKind::Bool;

    fn is_empty(&self) -> bool {
        self.roles().iter().all(|(_, clauses)| clauses.is_empty())
    }

    fn to_json(&self) -> Value {
        if self.is_empty() {
            return Value::Null;
        }
        let mut body = Map::new();
        for (role, clauses) in self.roles() {
            if !clauses.is_empty() {
                body.insert(role.to_string(), clauses.to_json());
            }
        }
        write_params(self, &mut body);
        Value::Object(body)
    }

    fn decode(value: &Value) -> Result<Self, DslError> {
        let Some(body) = flat(value)? else {
            return Ok(Self::default());
        };
        let role = |name: &str| match body.get(name) {
            Some(list) => QueryClauses::parse(list, name),
            None => Ok(QueryClauses::new()),
        };
        let mut query = BoolQuery {
            must: role("must")?,
            filter: role("filter")?,
            should: role("should")?,
            must_not: role("must_not")?,
            params: Params::new(),
        };
        read_params(&mut query, body)?;
        report_unknown::<Self>(body, &BOOL_ROLES);
        Ok(query)
    }
}

// ============================================================================
// boosting
// ============================================================================

/// Demote documents matching `negative` instead of excluding them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoostingQuery {
    positive: Option<Box<Query>>,
    negative: Option<Box<Query>>,
    negative_boost: f64,
    params: Params,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoostingParams {
    pub positive: Option<QueryParams>,
    pub negative: Option<QueryParams>,
    /// Required, in (0, 1]
    pub negative_boost: Option<Loose>,
    pub boost: Option<Loose>,
    pub name: Option<String>,
}

impl BoostingParams {
    pub fn new(
        positive: impl Into<QueryParams>,
        negative: impl Into<QueryParams>,
        negative_boost: impl Into<Loose>,
    ) -> Self {
        Self {
            positive: Some(positive.into()),
            negative: Some(negative.into()),
            negative_boost: Some(negative_boost.into()),
            ..Default::default()
        }
    }

    pub fn build(self) -> Result<BoostingQuery, DslError> {
        BoostingQuery::new(self)
    }
}

parameterized!(BoostingQuery, Some(QueryKind::Boosting), [
    WithBoost: Boost,
    WithName: Name,
]);

fn negative_boost(value: Option<Loose>) -> Result<f64, DslError> {
    let fail = |received: String| {
        DslError::new(ErrorKind::InvalidNegativeBoost)
            .with_clause(QueryKind::Boosting)
            .with_param("negative_boost")
            .with_received(received)
    };
    let value = value.ok_or_else(|| fail("nothing".to_string()))?;
    value
        .to_f64()
        .filter(|b| *b > 0.0 && *b <= 1.0)
        .ok_or_else(|| fail(value.to_string()))
}

impl BoostingQuery {
    /// Checks run in order: positive, negative, then negative_boost
    pub fn new(record: BoostingParams) -> Result<Self, DslError> {
        let positive = build_slot(record.positive, "positive")?.ok_or_else(|| {
            DslError::new(ErrorKind::PositiveRequired).with_clause(Self::KIND)
        })?;
        let negative = build_slot(record.negative, "negative")?.ok_or_else(|| {
            DslError::new(ErrorKind::NegativeRequired).with_clause(Self::KIND)
        })?;
        let negative_boost = negative_boost(record.negative_boost)?;
        let mut params = Params::new();
        params.apply(Param::Boost, record.boost, Self::OWNER)?;
        params.apply(Param::Name, record.name, Self::OWNER)?;
        Ok(BoostingQuery {
            positive: Some(positive),
            negative: Some(negative),
            negative_boost,
            params,
        })
    }

    pub fn positive(&self) -> Option<&Query> {
        self.positive.as_deref()
    }

    pub fn negative(&self) -> Option<&Query> {
        self.negative.as_deref()
    }

    pub fn negative_boost(&self) -> f64 {
        self.negative_boost
    }

    pub fn set_negative_boost(&mut self, value: impl Into<Loose>) -> Result<(), DslError> {
        self.negative_boost = negative_boost(Some(value.into()))?;
        Ok(())
    }

    pub fn set_positive(&mut self, query: impl Into<Query>) -> Result<(), DslError> {
        let query = query.into();
        if query.is_empty() {
            return Err(DslError::new(ErrorKind::PositiveRequired).with_clause(Self::KIND));
        }
        self.positive = Some(Box::new(query));
        Ok(())
    }

    pub fn set_negative(&mut self, query: impl Into<Query>) -> Result<(), DslError> {
        let query = query.into();
        if query.is_empty() {
            return Err(DslError::new(ErrorKind::NegativeRequired).with_clause(Self::KIND));
        }
        self.negative = Some(Box::new(query));
        Ok(())
    }
}

impl ClauseBody for BoostingQuery {
    const KIND: QueryKind = QueryKind::Boosting;

    fn is_empty(&self) -> bool {
        self.positive.is_none() && self.negative.is_none()
    }

    fn to_json(&self) -> Value {
        if self.is_empty() {
            return Value::Null;
        }
        let mut body = Map::new();
        if let Some(positive) = &self.positive {
            body.insert("positive".to_string(), positive.to_json());
        }
        if let Some(negative) = &self.negative {
            body.insert("negative".to_string(), negative.to_json());
        }
        body.insert("negative_boost".to_string(), Value::from(self.negative_boost));
        write_params(self, &mut body);
        Value::Object(body)
    }

    fn decode(value: &Value) -> Result<Self, DslError> {
        let Some(body) = flat(value)? else {
            return Ok(Self::default());
        };
        let positive = parse_slot(body, "positive")?;
        let negative = parse_slot(body, "negative")?;
        let raw_boost = body.get("negative_boost");
        if positive.is_none() && negative.is_none() && raw_boost.is_none() {
            return Ok(Self::default());
        }
        let Some(positive) = positive else {
            return Err(DslError::new(ErrorKind::PositiveRequired));
        };
        let Some(negative) = negative else {
            return Err(DslError::new(ErrorKind::NegativeRequired));
        };
        let loose = match raw_boost {
            Some(raw) => Loose::from_json(raw).map_err(|received| {
                DslError::new(ErrorKind::InvalidNegativeBoost)
                    .with_param("negative_boost")
                    .with_received(received)
            })?,
            None => None,
        };
        let mut query = BoostingQuery {
            positive: Some(positive),
            negative: Some(negative),
            negative_boost: negative_boost(loose)?,
            params: Params::new(),
        };
        read_params(&mut query, body)?;
        report_unknown::<Self>(body, &["positive", "negative", "negative_boost"]);
        Ok(query)
    }
}

// ============================================================================
// constant_score
// ============================================================================

/// Wrap a filter and give every match the same score
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantScoreQuery {
    filter: Option<Box<Query>>,
    params: Params,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantScoreParams {
    pub filter: Option<QueryParams>,
    pub boost: Option<Loose>,
    pub name: Option<String>,
}

impl ConstantScoreParams {
    pub fn new(filter: impl Into<QueryParams>) -> Self {
        Self {
            filter: Some(filter.into()),
            ..Default::default()
        }
    }

    pub fn build(self) -> Result<ConstantScoreQuery, DslError> {
        ConstantScoreQuery::new(self)
    }
}

parameterized!(ConstantScoreQuery, Some(QueryKind::ConstantScore), [
    WithBoost: Boost,
    WithName: Name,
]);

impl ConstantScoreQuery {
    pub fn new(record: ConstantScoreParams) -> Result<Self, DslError> {
        let filter = build_slot(record.filter, "filter")?.ok_or_else(|| {
            DslError::new(ErrorKind::QueryRequired)
                .with_clause(Self::KIND)
                .with_role("filter")
        })?;
        let mut params = Params::new();
        params.apply(Param::Boost, record.boost, Self::OWNER)?;
        params.apply(Param::Name, record.name, Self::OWNER)?;
        Ok(ConstantScoreQuery {
            filter: Some(filter),
            params,
        })
    }

    pub fn filter(&self) -> Option<&Query> {
        self.filter.as_deref()
    }

    pub fn set_filter(&mut self, query: impl Into<Query>) {
        let query = query.into();
        self.filter = (!query.is_empty()).then(|| Box::new(query));
    }
}

impl ClauseBody for ConstantScoreQuery {
    const KIND: QueryKind = QueryKind::ConstantScore;

    fn is_empty(&self) -> bool {
        self.filter.is_none()
    }

    fn to_json(&self) -> Value {
        let Some(filter) = &self.filter else {
            return Value::Null;
        };
        let mut body = Map::new();
        body.insert("filter".to_string(), filter.to_json());
        write_params(self, &mut body);
        Value::Object(body)
    }

    fn decode(value: &Value) -> Result<Self, DslError> {
        let Some(body) = flat(value)? else {
            return Ok(Self::default());
        };
        let mut query = ConstantScoreQuery {
            filter: parse_slot(body, "filter")?,
            params: Params::new(),
        };
        read_params(&mut query, body)?;
        report_unknown::<Self>(body, &["filter"]);
        Ok(query)
    }
}

// ============================================================================
// dis_max
// ============================================================================

/// Best-scoring child wins; the others contribute through `tie_breaker`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisMaxQuery {
    queries: QueryClauses,
    params: Params,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisMaxParams {
    pub queries: Vec<ClauseParams>,
    pub tie_breaker: Option<Loose>,
    pub boost: Option<Loose>,
    pub name: Option<String>,
}

impl DisMaxParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, clause: impl Into<ClauseParams>) -> Self {
        self.queries.push(clause.into());
        self
    }

    pub fn build(self) -> Result<DisMaxQuery, DslError> {
        DisMaxQuery::new(self)
    }
}

parameterized!(DisMaxQuery, Some(QueryKind::DisMax), [
    WithTieBreaker: TieBreaker,
    WithBoost: Boost,
    WithName: Name,
]);

impl DisMaxQuery {
    pub fn new(record: DisMaxParams) -> Result<Self, DslError> {
        let mut params = Params::new();
        params.apply(Param::TieBreaker, record.tie_breaker, Self::OWNER)?;
        params.apply(Param::Boost, record.boost, Self::OWNER)?;
        params.apply(Param::Name, record.name, Self::OWNER)?;
        Ok(DisMaxQuery {
            queries: QueryClauses::build("queries", record.queries)?,
            params,
        })
    }

    pub fn queries(&self) -> &QueryClauses {
        &self.queries
    }

    pub fn queries_mut(&mut self) -> &mut QueryClauses {
        &mut self.queries
    }
}

impl ClauseBody for DisMaxQuery {
    const KIND: QueryKind = QueryKind::DisMax;

    fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    fn to_json(&self) -> Value {
        if self.is_empty() {
            return Value::Null;
        }
        let mut body = Map::new();
        body.insert("queries".to_string(), self.queries.to_json());
        write_params(self, &mut body);
        Value::Object(body)
    }

    fn decode(value: &Value) -> Result<Self, DslError> {
        let Some(body) = flat(value)? else {
            return Ok(Self::default());
        };
        let queries = match body.get("queries") {
            Some(list) => QueryClauses::parse(list, "queries")?,
            None => QueryClauses::new(),
        };
        let mut query = DisMaxQuery {
            queries,
            params: Params::new(),
        };
        read_params(&mut query, body)?;
        report_unknown::<Self>(body, &["queries"]);
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;
    use crate::query::{ExistsParams, TermParams};
    use serde_json::json;

    // ========================================================================
    // bool
    // ========================================================================

    #[test]
    fn test_bool_preserves_role_order() {
        let q = BoolParams::new()
            .should(TermParams::new("tags", "env1"))
            .should(TermParams::new("tags", "deployed"))
            .must_not(ExistsParams::new("deleted_at"))
            .build()
            .unwrap();
        assert_eq!(q.should().len(), 2);
        assert_eq!(
            q.to_json(),
            json!({
                "should": [
                    {"term": {"tags": {"value": "env1"}}},
                    {"term": {"tags": {"value": "deployed"}}}
                ],
                "must_not": [{"exists": {"field": "deleted_at"}}]
            })
        );
    }

    #[test]
    fn test_bool_child_error_carries_role_and_kind() {
        let err = BoolParams::new()
            .filter(TermParams::new("a", "1"))
            .filter(TermParams {
                field: "b".to_string(),
                ..Default::default()
            })
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueRequired);
        assert_eq!(err.clause(), Some(QueryKind::Term));
        assert_eq!(err.role(), Some("filter[1]"));
    }

    #[test]
    fn test_bool_parse_error_carries_role() {
        let err = BoolQuery::from_json(&json!({
            "must": [{"term": {"a": "1"}}, {"term": {"b": {"boost": "x", "value": 1}}}]
        }))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidBoost);
        assert_eq!(err.role(), Some("must[1]"));
    }

    #[test]
    fn test_bool_empty_is_null() {
        let q = BoolQuery::from_json(&json!({"must": [], "should": null, "boost": 2})).unwrap();
        assert!(q.is_empty());
        assert_eq!(q.to_json(), Value::Null);
    }

    #[test]
    fn test_bool_null_children_are_absent() {
        let q = BoolQuery::from_json(&json!({"filter": [null, {"exists": {"field": "f"}}]}))
            .unwrap();
        assert_eq!(q.filter().len(), 1);
    }

    #[test]
    fn test_bool_nested() {
        let body = json!({
            "must": [{"bool": {"should": [{"term": {"a": {"value": 1}}}]}}]
        });
        let q = BoolQuery::from_json(&body).unwrap();
        assert_eq!(q.to_json(), body);
    }

    // ========================================================================
    // boosting
    // ========================================================================

    #[test]
    fn test_boosting_requires_both_sides() {
        let err = BoostingParams {
            positive: Some(TermParams::new("text", "apple").into()),
            negative_boost: Some(0.5.into()),
            ..Default::default()
        }
        .build()
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NegativeRequired);

        let err = BoostingParams {
            negative: Some(TermParams::new("text", "pie").into()),
            negative_boost: Some(0.5.into()),
            ..Default::default()
        }
        .build()
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PositiveRequired);
    }

    #[test]
    fn test_boosting_negative_boost_bounds() {
        for bad in [0.0, -0.5, 1.5] {
            let err = BoostingParams::new(
                TermParams::new("text", "apple"),
                TermParams::new("text", "pie"),
                bad,
            )
            .build()
            .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidNegativeBoost);
        }
        let q = BoostingParams::new(
            TermParams::new("text", "apple"),
            TermParams::new("text", "pie"),
            1.0,
        )
        .build()
        .unwrap();
        assert_eq!(q.negative_boost(), 1.0);
    }

    #[test]
    fn test_boosting_round_trip() {
        let body = json!({
            "positive": {"term": {"text": {"value": "apple"}}},
            "negative": {"term": {"text": {"value": "pie tart"}}},
            "negative_boost": 0.5
        });
        let q = BoostingQuery::from_json(&body).unwrap();
        assert_eq!(q.negative_boost(), 0.5);
        assert_eq!(q.to_json(), body);

        let err = BoostingQuery::from_json(&json!({
            "positive": {"term": {"text": "apple"}},
            "negative": {"term": {"text": "pie"}}
        }))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidNegativeBoost);
    }

    // ========================================================================
    // constant_score / dis_max
    // ========================================================================

    #[test]
    fn test_constant_score() {
        let q = ConstantScoreParams {
            boost: Some(1.2.into()),
            ..ConstantScoreParams::new(TermParams::new("user.id", "kimchy"))
        }
        .build()
        .unwrap();
        assert_eq!(
            q.to_json(),
            json!({"filter": {"term": {"user.id": {"value": "kimchy"}}}, "boost": 1.2})
        );
        assert_eq!(
            ConstantScoreParams::default().build().unwrap_err().kind(),
            ErrorKind::QueryRequired
        );
    }

    #[test]
    fn test_dis_max_tie_breaker() {
        let body = json!({
            "queries": [
                {"term": {"title": {"value": "Quick pets"}}},
                {"term": {"body": {"value": "Quick pets"}}}
            ],
            "tie_breaker": 0.7
        });
        let q = DisMaxQuery::from_json(&body).unwrap();
        assert_eq!(q.tie_breaker(), 0.7);
        assert_eq!(q.queries().kinds(), vec![QueryKind::Term, QueryKind::Term]);
        assert_eq!(q.to_json(), body);

        let err = DisMaxParams {
            tie_breaker: Some(1.1.into()),
            ..DisMaxParams::new().query(TermParams::new("a", "b"))
        }
        .build()
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTieBreaker);
    }
}
