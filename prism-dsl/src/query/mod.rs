//! Query clause tree
//!
//! A [`Clause`] is one variant of the closed [`QueryKind`] family. Clauses
//! are built from parameter records (`TermParams`, `BoolParams`, ...) or
//! parsed from JSON, and serialize back to the engine's wire format.
//!
//! Three containers hold clauses:
//! - [`Query`]: `{"<kind>": <body>, ...}`, at most one clause per kind
//! - [`QueryClauses`]: ordered list of `{"<kind>": <body>}` envelopes,
//!   used by `bool` roles and `dis_max.queries`
//! - single-slot children (`boosting.positive`, `constant_score.filter`,
//!   ...), which are nested [`Query`] values

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{DslError, ErrorKind};

pub mod compound;
pub mod full_text;
pub mod function_score;
pub mod intervals;
pub(crate) mod shape;
pub mod specialized;
pub mod term_level;

pub use compound::{
    BoolParams, BoolQuery, BoostingParams, BoostingQuery, ConstantScoreParams,
    ConstantScoreQuery, DisMaxParams, DisMaxQuery,
};
pub use full_text::{
    MatchBoolPrefixParams, MatchBoolPrefixQuery, MatchParams, MatchPhrasePrefixParams,
    MatchPhrasePrefixQuery, MatchPhraseParams, MatchPhraseQuery, MatchQuery, MultiMatchParams,
    MultiMatchQuery, QueryStringParams, QueryStringQuery, SimpleQueryStringParams,
    SimpleQueryStringQuery,
};
pub use function_score::{
    DecayFunction, DecayParams, FieldValueFactorFunction, FieldValueFactorParams, Function,
    FunctionBody, FunctionKind, FunctionParams, FunctionScoreParams, FunctionScoreQuery, RandomScoreFunction,
    RandomScoreParams, ScriptScoreFunctionParams, WeightParams,
};
pub use intervals::{
    AllOfRule, AnyOfRule, FuzzyRule, IntervalFilter, IntervalsParams, IntervalsQuery, MatchRule,
    PrefixRule, Rule, RuleKind, WildcardRule,
};
pub use specialized::{
    MatchAllParams, MatchAllQuery, MatchNoneParams, MatchNoneQuery, Script, ScriptParams,
    ScriptQuery, ScriptScoreParams, ScriptScoreQuery,
};
pub use term_level::{
    ExistsParams, ExistsQuery, FuzzyParams, FuzzyQuery, IdsParams, IdsQuery, PrefixParams,
    PrefixQuery, RangeParams, RangeQuery, RegexpParams, RegexpQuery, TermParams, TermQuery,
    TermsLookup, TermsParams, TermsQuery, TermsSource, WildcardParams, WildcardQuery,
};

/// Behaviour shared by every clause variant
///
/// `decode` and `to_json` deal with the clause body only; the `{kind: ...}`
/// envelope is added by [`Clause`], [`Query`] and [`QueryClauses`].
pub trait ClauseBody: Sized + Default {
    const KIND: QueryKind;

    /// An empty clause serializes to null and is dropped by containers
    fn is_empty(&self) -> bool;

    fn to_json(&self) -> Value;

    fn decode(value: &Value) -> Result<Self, DslError>;

    /// Parse a clause body, tagging errors with the clause kind and JSON fragment
    fn from_json(value: &Value) -> Result<Self, DslError> {
        Self::decode(value).map_err(|e| e.with_clause(Self::KIND).with_json(value))
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

macro_rules! clause_kinds {
    ($($variant:ident($query:ident, $record:ident) => $tag:literal, $getter:ident;)+) => {
        /// Discriminator of a query clause
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum QueryKind {
            $($variant),+
        }

        impl QueryKind {
            pub const ALL: &'static [QueryKind] = &[$(QueryKind::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(QueryKind::$variant => $tag),+
                }
            }
        }

        impl FromStr for QueryKind {
            type Err = DslError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($tag => Ok(QueryKind::$variant),)+
                    _ => Err(DslError::new(ErrorKind::UnsupportedKind)
                        .with_received(format!("{:?}", s))),
                }
            }
        }

        /// One node of the query tree
        #[derive(Debug, Clone, PartialEq)]
        pub enum Clause {
            $($variant($query)),+
        }

        impl Clause {
            pub fn kind(&self) -> QueryKind {
                match self {
                    $(Clause::$variant(_) => QueryKind::$variant),+
                }
            }

            pub fn is_empty(&self) -> bool {
                match self {
                    $(Clause::$variant(c) => c.is_empty()),+
                }
            }

            /// Reset the clause to its empty state, keeping its kind
            pub fn clear(&mut self) {
                match self {
                    $(Clause::$variant(c) => c.clear()),+
                }
            }

            /// Clause body without the kind envelope
            pub fn to_body(&self) -> Value {
                match self {
                    $(Clause::$variant(c) => c.to_json()),+
                }
            }

            /// Parse the body of a clause whose kind is already known
            pub fn from_body(kind: QueryKind, body: &Value) -> Result<Clause, DslError> {
                match kind {
                    $(QueryKind::$variant => $query::from_json(body).map(Clause::$variant)),+
                }
            }
        }

        $(
            impl From<$query> for Clause {
                fn from(query: $query) -> Self {
                    Clause::$variant(query)
                }
            }

            impl From<$query> for Query {
                fn from(query: $query) -> Self {
                    Query::from(Clause::$variant(query))
                }
            }
        )+

        /// Parameter record of any clause kind
        #[derive(Debug, Clone, PartialEq)]
        pub enum ClauseParams {
            $($variant($record)),+
        }

        impl ClauseParams {
            pub fn kind(&self) -> QueryKind {
                match self {
                    $(ClauseParams::$variant(_) => QueryKind::$variant),+
                }
            }

            /// Validate the record and freeze it into a clause
            pub fn build(self) -> Result<Clause, DslError> {
                match self {
                    $(ClauseParams::$variant(p) => $query::new(p).map(Clause::$variant)),+
                }
            }
        }

        $(
            impl From<$record> for ClauseParams {
                fn from(params: $record) -> Self {
                    ClauseParams::$variant(params)
                }
            }

            impl From<$record> for QueryParams {
                fn from(params: $record) -> Self {
                    QueryParams::new().with(params)
                }
            }
        )+

        impl Query {
            $(
                pub fn $getter(&self) -> Option<&$query> {
                    match self.clauses.get(&QueryKind::$variant) {
                        Some(Clause::$variant(c)) => Some(c),
                        _ => None,
                    }
                }
            )+
        }
    };
}

clause_kinds! {
    Term(TermQuery, TermParams) => "term", term;
    Terms(TermsQuery, TermsParams) => "terms", terms;
    Match(MatchQuery, MatchParams) => "match", match_query;
    MatchAll(MatchAllQuery, MatchAllParams) => "match_all", match_all;
    MatchNone(MatchNoneQuery, MatchNoneParams) => "match_none", match_none;
    MatchBoolPrefix(MatchBoolPrefixQuery, MatchBoolPrefixParams) => "match_bool_prefix", match_bool_prefix;
    MatchPhrase(MatchPhraseQuery, MatchPhraseParams) => "match_phrase", match_phrase;
    MatchPhrasePrefix(MatchPhrasePrefixQuery, MatchPhrasePrefixParams) => "match_phrase_prefix", match_phrase_prefix;
    MultiMatch(MultiMatchQuery, MultiMatchParams) => "multi_match", multi_match;
    QueryString(QueryStringQuery, QueryStringParams) => "query_string", query_string;
    SimpleQueryString(SimpleQueryStringQuery, SimpleQueryStringParams) => "simple_query_string", simple_query_string;
    Exists(ExistsQuery, ExistsParams) => "exists", exists;
    Prefix(PrefixQuery, PrefixParams) => "prefix", prefix;
    Wildcard(WildcardQuery, WildcardParams) => "wildcard", wildcard;
    Regexp(RegexpQuery, RegexpParams) => "regexp", regexp;
    Fuzzy(FuzzyQuery, FuzzyParams) => "fuzzy", fuzzy;
    Range(RangeQuery, RangeParams) => "range", range;
    Ids(IdsQuery, IdsParams) => "ids", ids;
    Bool(BoolQuery, BoolParams) => "bool", bool_query;
    Boosting(BoostingQuery, BoostingParams) => "boosting", boosting;
    ConstantScore(ConstantScoreQuery, ConstantScoreParams) => "constant_score", constant_score;
    DisMax(DisMaxQuery, DisMaxParams) => "dis_max", dis_max;
    FunctionScore(FunctionScoreQuery, FunctionScoreParams) => "function_score", function_score;
    Script(ScriptQuery, ScriptParams) => "script", script;
    ScriptScore(ScriptScoreQuery, ScriptScoreParams) => "script_score", script_score;
    Intervals(IntervalsQuery, IntervalsParams) => "intervals", intervals;
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for QueryKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for QueryKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|e: DslError| D::Error::custom(e.to_string()))
    }
}

impl Clause {
    /// `{"<kind>": <body>}`, or null for an empty clause
    pub fn to_envelope(&self) -> Value {
        if self.is_empty() {
            return Value::Null;
        }
        let mut map = Map::new();
        map.insert(self.kind().as_str().to_string(), self.to_body());
        Value::Object(map)
    }

    /// Parse a single-kind envelope
    pub fn from_envelope(value: &Value) -> Result<Clause, DslError> {
        let invalid = || {
            DslError::new(ErrorKind::InvalidParams)
                .with_detail("expected a single-kind clause object")
                .with_json(value)
        };
        let map = value.as_object().ok_or_else(invalid)?;
        let mut entries = map.iter();
        let (key, body) = entries.next().ok_or_else(invalid)?;
        if entries.next().is_some() {
            return Err(invalid());
        }
        let kind = key
            .parse::<QueryKind>()
            .map_err(|e| e.with_json(value))?;
        Clause::from_body(kind, body)
    }
}

impl Serialize for Clause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_envelope().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Clause {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Clause::from_envelope(&value).map_err(|e| D::Error::custom(e.to_string()))
    }
}

/// Heterogeneous query envelope holding at most one clause of each kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    clauses: BTreeMap<QueryKind, Clause>,
}

impl Query {
    /// Build every clause of the record; the first failure aborts the build
    pub fn new(params: QueryParams) -> Result<Self, DslError> {
        params.build()
    }

    /// Store a clause, replacing and returning any clause of the same kind
    ///
    /// An empty clause removes the slot instead.
    pub fn set(&mut self, clause: impl Into<Clause>) -> Option<Clause> {
        let clause = clause.into();
        if clause.is_empty() {
            return self.clauses.remove(&clause.kind());
        }
        self.clauses.insert(clause.kind(), clause)
    }

    pub fn get(&self, kind: QueryKind) -> Option<&Clause> {
        self.clauses.get(&kind)
    }

    pub fn get_mut(&mut self, kind: QueryKind) -> Option<&mut Clause> {
        self.clauses.get_mut(&kind)
    }

    pub fn remove(&mut self, kind: QueryKind) -> Option<Clause> {
        self.clauses.remove(&kind)
    }

    pub fn clear(&mut self) {
        self.clauses.clear();
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.values().all(Clause::is_empty)
    }

    pub fn kinds(&self) -> impl Iterator<Item = QueryKind> + '_ {
        self.clauses.keys().copied()
    }

    pub fn clauses(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.values()
    }

    /// `{"<kind>": <body>, ...}`; an empty query is null
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for clause in self.clauses.values().filter(|c| !c.is_empty()) {
            map.insert(clause.kind().as_str().to_string(), clause.to_body());
        }
        if map.is_empty() {
            Value::Null
        } else {
            Value::Object(map)
        }
    }

    /// Parse an envelope; an unknown kind is an `UnsupportedKind` error
    pub fn from_json(value: &Value) -> Result<Self, DslError> {
        let map = match value {
            Value::Null => return Ok(Query::default()),
            Value::Object(map) => map,
            other => {
                return Err(DslError::new(ErrorKind::InvalidParams)
                    .with_detail("expected a query object")
                    .with_json(other))
            }
        };
        let mut query = Query::default();
        for (key, body) in map {
            let kind = key
                .parse::<QueryKind>()
                .map_err(|e| e.with_json(value))?;
            query.set(Clause::from_body(kind, body)?);
        }
        Ok(query)
    }

    pub fn from_json_str(json: &str) -> Result<Self, DslError> {
        let value: Value = serde_json::from_str(json)?;
        Query::from_json(&value)
    }
}

impl From<Clause> for Query {
    fn from(clause: Clause) -> Self {
        let mut query = Query::default();
        query.set(clause);
        query
    }
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Query {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Query::from_json(&value).map_err(|e| D::Error::custom(e.to_string()))
    }
}

/// Parameter record of a [`Query`] envelope: one record per clause kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    clauses: Vec<ClauseParams>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, clause: impl Into<ClauseParams>) -> Self {
        self.clauses.push(clause.into());
        self
    }

    pub fn push(&mut self, clause: impl Into<ClauseParams>) {
        self.clauses.push(clause.into());
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn build(self) -> Result<Query, DslError> {
        let mut query = Query::default();
        for params in self.clauses {
            let clause = params.build()?;
            let kind = clause.kind();
            if query.set(clause).is_some() {
                tracing::warn!(kind = %kind, "query names the same kind twice, keeping the last");
            }
        }
        Ok(query)
    }
}

impl From<ClauseParams> for QueryParams {
    fn from(params: ClauseParams) -> Self {
        QueryParams::new().with(params)
    }
}

/// Reject an empty field name for a clause that targets a field
pub(crate) fn require_field(kind: QueryKind, field: &str) -> Result<(), DslError> {
    if field.is_empty() {
        return Err(DslError::new(ErrorKind::FieldRequired).with_clause(kind));
    }
    Ok(())
}

/// Build an optional nested query slot, tagging errors with its role
pub(crate) fn build_slot(
    params: Option<QueryParams>,
    role: &str,
) -> Result<Option<Box<Query>>, DslError> {
    match params {
        None => Ok(None),
        Some(params) => {
            let query = params.build().map_err(|e| e.with_role(role))?;
            Ok((!query.is_empty()).then(|| Box::new(query)))
        }
    }
}

/// Parse an optional nested query slot out of a flat clause body
pub(crate) fn parse_slot(
    map: &Map<String, Value>,
    role: &str,
) -> Result<Option<Box<Query>>, DslError> {
    match map.get(role) {
        None => Ok(None),
        Some(value) => {
            let query = Query::from_json(value).map_err(|e| e.with_role(role))?;
            Ok((!query.is_empty()).then(|| Box::new(query)))
        }
    }
}

/// Ordered list of clauses, each serialized as a `{"<kind>": <body>}` envelope
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryClauses(Vec<Clause>);

impl QueryClauses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every record in order; the first failure aborts, tagged `role[i]`
    pub fn build(role: &str, params: Vec<ClauseParams>) -> Result<Self, DslError> {
        let mut clauses = QueryClauses::new();
        for (i, p) in params.into_iter().enumerate() {
            let kind = p.kind();
            let clause = p
                .build()
                .map_err(|e| e.with_clause(kind).with_role(format!("{}[{}]", role, i)))?;
            clauses.push(clause);
        }
        Ok(clauses)
    }

    /// Append a clause; empty clauses are dropped
    pub fn push(&mut self, clause: impl Into<Clause>) {
        let clause = clause.into();
        if !clause.is_empty() {
            self.0.push(clause);
        }
    }

    pub fn get(&self, index: usize) -> Option<&Clause> {
        self.0.get(index)
    }

    pub fn remove(&mut self, index: usize) -> Option<Clause> {
        (index < self.0.len()).then(|| self.0.remove(index))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Clause> {
        self.0.iter()
    }

    pub fn kinds(&self) -> Vec<QueryKind> {
        self.0.iter().map(Clause::kind).collect()
    }

    pub fn to_json(&self) -> Value {
        Value::Array(self.0.iter().map(Clause::to_envelope).collect())
    }

    /// Parse an array of envelopes or a single envelope
    ///
    /// Null elements are treated as absent and unknown kinds are skipped.
    pub fn from_json(value: &Value) -> Result<Self, DslError> {
        Self::parse(value, "")
    }

    /// Parse the clause list stored under `role`, tagging errors `role[i]`
    pub(crate) fn parse(value: &Value, role: &str) -> Result<Self, DslError> {
        let mut clauses = QueryClauses::new();
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    clauses
                        .push_envelope(item)
                        .map_err(|e| e.with_role(format!("{}[{}]", role, i)))?;
                }
            }
            Value::Object(_) => clauses.push_envelope(value).map_err(|e| match role {
                "" => e,
                role => e.with_role(role),
            })?,
            other => {
                let err = DslError::new(ErrorKind::InvalidParams)
                    .with_detail("expected a clause or an array of clauses")
                    .with_json(other);
                return Err(match role {
                    "" => err,
                    role => err.with_role(role),
                });
            }
        }
        Ok(clauses)
    }

    fn push_envelope(&mut self, value: &Value) -> Result<(), DslError> {
        let map = match value {
            Value::Null => return Ok(()),
            Value::Object(map) => map,
            other => {
                return Err(DslError::new(ErrorKind::InvalidParams)
                    .with_detail("expected a clause object")
                    .with_json(other))
            }
        };
        for (key, body) in map {
            let Ok(kind) = key.parse::<QueryKind>() else {
                tracing::warn!(kind = %key, "skipping unsupported clause kind");
                continue;
            };
            self.push(Clause::from_body(kind, body)?);
        }
        Ok(())
    }
}

impl From<Vec<Clause>> for QueryClauses {
    fn from(clauses: Vec<Clause>) -> Self {
        let mut list = QueryClauses::new();
        for clause in clauses {
            list.push(clause);
        }
        list
    }
}

impl<'a> IntoIterator for &'a QueryClauses {
    type Item = &'a Clause;
    type IntoIter = std::slice::Iter<'a, Clause>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for QueryClauses {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for QueryClauses {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        QueryClauses::from_json(&value).map_err(|e| D::Error::custom(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::WithBoost;
    use serde_json::json;

    #[test]
    fn test_kind_tags_round_trip() {
        for kind in QueryKind::ALL {
            assert_eq!(kind.as_str().parse::<QueryKind>().unwrap(), *kind);
        }
        assert_eq!(QueryKind::ALL.len(), 26);
    }

    #[test]
    fn test_unknown_kind_rejected_at_top_level() {
        let err = Query::from_json(&json!({"percolate": {"field": "q"}})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedKind);
        assert!(err.json().is_some());
    }

    #[test]
    fn test_unknown_kind_skipped_in_list() {
        let clauses = QueryClauses::from_json(&json!([
            {"percolate": {"field": "q"}},
            {"term": {"tags": "env1"}},
            null
        ]))
        .unwrap();
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses.kinds(), vec![QueryKind::Term]);
    }

    #[test]
    fn test_single_envelope_normalised_to_list() {
        let clauses = QueryClauses::from_json(&json!({"term": {"tags": "env1"}})).unwrap();
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses.to_json(), json!([{"term": {"tags": {"value": "env1"}}}]));
    }

    #[test]
    fn test_query_holds_one_clause_per_kind() {
        let mut query = Query::default();
        query.set(TermParams::new("a", "1").build().unwrap());
        let previous = query.set(TermParams::new("b", "2").build().unwrap());
        assert!(previous.is_some());
        assert_eq!(query.len(), 1);
        assert_eq!(query.term().unwrap().field(), "b");
    }

    #[test]
    fn test_multi_kind_envelope() {
        let query = Query::from_json(&json!({
            "term": {"user.id": "kimchy"},
            "exists": {"field": "title"}
        }))
        .unwrap();
        assert_eq!(query.len(), 2);
        assert!(query.exists().is_some());
        let reparsed = Query::from_json(&query.to_json()).unwrap();
        assert_eq!(reparsed, query);
    }

    #[test]
    fn test_empty_query_is_null() {
        assert_eq!(Query::default().to_json(), Value::Null);
        assert!(Query::from_json(&json!({"term": {}})).unwrap().is_empty());
    }

    #[test]
    fn test_clause_envelope_serde() {
        let clause: Clause = serde_json::from_value(json!({"term": {"f": "v"}})).unwrap();
        assert_eq!(clause.kind(), QueryKind::Term);
        assert_eq!(
            serde_json::to_value(&clause).unwrap(),
            json!({"term": {"f": {"value": "v"}}})
        );
    }

    #[test]
    fn test_query_params_later_kind_wins() {
        let query = QueryParams::new()
            .with(TermParams::new("a", "1"))
            .with(TermParams::new("b", "2"))
            .build()
            .unwrap();
        assert_eq!(query.term().unwrap().field(), "b");
    }

    #[test]
    fn test_clause_clear_empties() {
        let mut clause: Clause = TermParams {
            boost: Some(2.into()),
            ..TermParams::new("f", "v")
        }
        .build()
        .unwrap()
        .into();
        assert!(!clause.is_empty());
        clause.clear();
        assert!(clause.is_empty());
        assert_eq!(clause.to_envelope(), Value::Null);
        if let Clause::Term(term) = &clause {
            assert_eq!(term.boost(), 1.0);
        }
    }
}
