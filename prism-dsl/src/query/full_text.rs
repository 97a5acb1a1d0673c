//! Full-text clauses: analyzed queries over one or more fields

use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::enums::MultiMatchType;
use crate::error::{DslError, ErrorKind};
use crate::input::Loose;
use crate::params::{read_params, report_unknown, write_params, Param, Parameterized, Params};
use crate::scalar::{Scalar, Strings};

use super::shape::{field_keyed, flat, put, scalar, string, strings, wrap_field};
use super::{require_field, ClauseBody, QueryKind};

/// Field-keyed clause with a `query` slot that accepts the scalar shortcut
macro_rules! field_text_clause {
    (
        $(#[$doc:meta])*
        $query:ident, $record:ident, $kind:ident,
        [$($mixin:ident: $param:ident => $rfield:ident: $rty:ty),* $(,)?]
    ) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $query {
            field: String,
            query: Option<Scalar>,
            params: Params,
        }

        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $record {
            pub field: String,
            pub query: Option<Scalar>,
            $(pub $rfield: Option<$rty>,)*
        }

        impl $record {
            pub fn new(field: impl Into<String>, query: impl Into<Scalar>) -> Self {
                Self {
                    field: field.into(),
                    query: Some(query.into()),
                    ..Default::default()
                }
            }

            pub fn build(self) -> Result<$query, DslError> {
                $query::new(self)
            }
        }

        parameterized!($query, Some(QueryKind::$kind), [$($mixin: $param),*]);

        impl $query {
            pub fn new(record: $record) -> Result<Self, DslError> {
                require_field(Self::KIND, &record.field)?;
                let field = record.field;
                let fail = |e: DslError| e.with_clause(QueryKind::$kind).with_field(field.as_str());
                let query = record
                    .query
                    .filter(|q| !q.is_empty())
                    .ok_or_else(|| fail(DslError::new(ErrorKind::ValueRequired)))?;
                let mut params = Params::new();
                $(
                    params
                        .apply(Param::$param, record.$rfield, Self::OWNER)
                        .map_err(fail)?;
                )*
                Ok($query {
                    field,
                    query: Some(query),
                    params,
                })
            }

            pub fn field(&self) -> &str {
                &self.field
            }

            /// Query text; numbers and booleans are rendered as text
            pub fn query(&self) -> Cow<'_, str> {
                match &self.query {
                    Some(Scalar::String(s)) => Cow::Borrowed(s.as_str()),
                    Some(other) => Cow::Owned(other.to_string()),
                    None => Cow::Borrowed(""),
                }
            }

            pub fn query_value(&self) -> Option<&Scalar> {
                self.query.as_ref()
            }

            pub fn set_query(&mut self, query: impl Into<Scalar>) {
                self.query = Some(query.into());
            }
        }

        impl ClauseBody for $query {
            const KIND: QueryKind = QueryKind::$kind;

            fn is_empty(&self) -> bool {
                self.field.is_empty()
            }

            fn to_json(&self) -> Value {
                if self.is_empty() {
                    return Value::Null;
                }
                let mut body = Map::new();
                put(&mut body, "query", self.query.as_ref().map(Scalar::to_json));
                write_params(self, &mut body);
                wrap_field(&self.field, body)
            }

            fn decode(value: &Value) -> Result<Self, DslError> {
                let Some((field, body)) = field_keyed(value, Some("query"))? else {
                    return Ok(Self::default());
                };
                let mut query = $query {
                    query: scalar(&body, "query").map_err(|e| e.with_field(field.as_str()))?,
                    field,
                    params: Params::new(),
                };
                read_params(&mut query, &body).map_err(|e| e.with_field(query.field.as_str()))?;
                report_unknown::<Self>(&body, &["query"]);
                if query.query.as_ref().map_or(true, Scalar::is_empty) {
                    return Err(DslError::new(ErrorKind::ValueRequired).with_field(query.field));
                }
                Ok(query)
            }
        }
    };
}

field_text_clause!(
    /// Analyzed match on a single field
    MatchQuery, MatchParams, Match,
    [
        WithAnalyzer: Analyzer => analyzer: String,
        WithAutoGenerateSynonymsPhraseQuery: AutoGenerateSynonymsPhraseQuery
            => auto_generate_synonyms_phrase_query: Loose,
        WithFuzziness: Fuzziness => fuzziness: Loose,
        WithMaxExpansions: MaxExpansions => max_expansions: Loose,
        WithPrefixLength: PrefixLength => prefix_length: Loose,
        WithFuzzyTranspositions: FuzzyTranspositions => fuzzy_transpositions: Loose,
        WithFuzzyRewrite: FuzzyRewrite => fuzzy_rewrite: Loose,
        WithLenient: Lenient => lenient: Loose,
        WithOperator: Operator => operator: Loose,
        WithMinimumShouldMatch: MinimumShouldMatch => minimum_should_match: Loose,
        WithZeroTermsQuery: ZeroTermsQuery => zero_terms_query: Loose,
        WithCutoffFrequency: CutoffFrequency => cutoff_frequency: Loose,
        WithBoost: Boost => boost: Loose,
        WithName: Name => name: String,
    ]
);

field_text_clause!(
    /// Terms as a bool of term clauses, the last one a prefix
    MatchBoolPrefixQuery, MatchBoolPrefixParams, MatchBoolPrefix,
    [
        WithAnalyzer: Analyzer => analyzer: String,
        WithMinimumShouldMatch: MinimumShouldMatch => minimum_should_match: Loose,
        WithOperator: Operator => operator: Loose,
        WithFuzziness: Fuzziness => fuzziness: Loose,
        WithPrefixLength: PrefixLength => prefix_length: Loose,
        WithMaxExpansions: MaxExpansions => max_expansions: Loose,
        WithFuzzyTranspositions: FuzzyTranspositions => fuzzy_transpositions: Loose,
        WithFuzzyRewrite: FuzzyRewrite => fuzzy_rewrite: Loose,
        WithBoost: Boost => boost: Loose,
        WithName: Name => name: String,
    ]
);

field_text_clause!(
    MatchPhraseQuery, MatchPhraseParams, MatchPhrase,
    [
        WithAnalyzer: Analyzer => analyzer: String,
        WithSlop: Slop => slop: Loose,
        WithZeroTermsQuery: ZeroTermsQuery => zero_terms_query: Loose,
        WithBoost: Boost => boost: Loose,
        WithName: Name => name: String,
    ]
);

field_text_clause!(
    /// Phrase match whose last term is a prefix
    MatchPhrasePrefixQuery, MatchPhrasePrefixParams, MatchPhrasePrefix,
    [
        WithAnalyzer: Analyzer => analyzer: String,
        WithMaxExpansions: MaxExpansions => max_expansions: Loose,
        WithSlop: Slop => slop: Loose,
        WithZeroTermsQuery: ZeroTermsQuery => zero_terms_query: Loose,
        WithBoost: Boost => boost: Loose,
        WithName: Name => name: String,
    ]
);

fn read_type(body: &Map<String, Value>) -> Result<Option<MultiMatchType>, DslError> {
    let Some(raw) = body.get("type") else {
        return Ok(None);
    };
    let loose = Loose::from_json(raw).map_err(|received| {
        DslError::new(ErrorKind::InvalidParams)
            .with_param("type")
            .with_received(received)
    })?;
    match loose {
        Some(loose) => {
            let kind: MultiMatchType = loose.to_text().parse().map_err(|e: DslError| e.with_param("type"))?;
            Ok((kind != MultiMatchType::default()).then_some(kind))
        }
        None => Ok(None),
    }
}

// ============================================================================
// multi_match
// ============================================================================

/// Match over several fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiMatchQuery {
    query: String,
    fields: Strings,
    match_type: Option<MultiMatchType>,
    params: Params,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiMatchParams {
    pub query: String,
    pub fields: Strings,
    pub match_type: Option<Loose>,
    pub analyzer: Option<String>,
    pub auto_generate_synonyms_phrase_query: Option<Loose>,
    pub fuzziness: Option<Loose>,
    pub max_expansions: Option<Loose>,
    pub prefix_length: Option<Loose>,
    pub fuzzy_transpositions: Option<Loose>,
    pub fuzzy_rewrite: Option<Loose>,
    pub lenient: Option<Loose>,
    pub operator: Option<Loose>,
    pub minimum_should_match: Option<Loose>,
    pub zero_terms_query: Option<Loose>,
    pub cutoff_frequency: Option<Loose>,
    pub tie_breaker: Option<Loose>,
    pub slop: Option<Loose>,
    pub boost: Option<Loose>,
    pub name: Option<String>,
}

impl MultiMatchParams {
    pub fn new(query: impl Into<String>, fields: impl Into<Strings>) -> Self {
        Self {
            query: query.into(),
            fields: fields.into(),
            ..Default::default()
        }
    }

    pub fn build(self) -> Result<MultiMatchQuery, DslError> {
        MultiMatchQuery::new(self)
    }
}

parameterized!(MultiMatchQuery, Some(QueryKind::MultiMatch), [
    WithAnalyzer: Analyzer,
    WithAutoGenerateSynonymsPhraseQuery: AutoGenerateSynonymsPhraseQuery,
    WithFuzziness: Fuzziness,
    WithMaxExpansions: MaxExpansions,
    WithPrefixLength: PrefixLength,
    WithFuzzyTranspositions: FuzzyTranspositions,
    WithFuzzyRewrite: FuzzyRewrite,
    WithLenient: Lenient,
    WithOperator: Operator,
    WithMinimumShouldMatch: MinimumShouldMatch,
    WithZeroTermsQuery: ZeroTermsQuery,
    WithCutoffFrequency: CutoffFrequency,
    WithTieBreaker: TieBreaker,
    WithSlop: Slop,
    WithBoost: Boost,
    WithName: Name,
]);

impl MultiMatchQuery {
    pub fn new(record: MultiMatchParams) -> Result<Self, DslError> {
        let fail = |e: DslError| e.with_clause(QueryKind::MultiMatch);
        if record.query.is_empty() {
            return Err(fail(DslError::new(ErrorKind::ValueRequired)));
        }
        let match_type = match record.match_type {
            Some(loose) => {
                let kind: MultiMatchType = loose
                    .to_text()
                    .parse()
                    .map_err(|e: DslError| fail(e.with_param("type")))?;
                (kind != MultiMatchType::default()).then_some(kind)
            }
            None => None,
        };
        let mut params = Params::new();
        let owner = Self::OWNER;
        params.apply(Param::Analyzer, record.analyzer, owner)?;
        params.apply(
            Param::AutoGenerateSynonymsPhraseQuery,
            record.auto_generate_synonyms_phrase_query,
            owner,
        )?;
        params.apply(Param::Fuzziness, record.fuzziness, owner)?;
        params.apply(Param::MaxExpansions, record.max_expansions, owner)?;
        params.apply(Param::PrefixLength, record.prefix_length, owner)?;
        params.apply(Param::FuzzyTranspositions, record.fuzzy_transpositions, owner)?;
        params.apply(Param::FuzzyRewrite, record.fuzzy_rewrite, owner)?;
        params.apply(Param::Lenient, record.lenient, owner)?;
        params.apply(Param::Operator, record.operator, owner)?;
        params.apply(Param::MinimumShouldMatch, record.minimum_should_match, owner)?;
        params.apply(Param::ZeroTermsQuery, record.zero_terms_query, owner)?;
        params.apply(Param::CutoffFrequency, record.cutoff_frequency, owner)?;
        params.apply(Param::TieBreaker, record.tie_breaker, owner)?;
        params.apply(Param::Slop, record.slop, owner)?;
        params.apply(Param::Boost, record.boost, owner)?;
        params.apply(Param::Name, record.name, owner)?;
        Ok(MultiMatchQuery {
            query: record.query,
            fields: record.fields,
            match_type,
            params,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn fields(&self) -> &Strings {
        &self.fields
    }

    pub fn match_type(&self) -> MultiMatchType {
        self.match_type.unwrap_or_default()
    }

    pub fn set_match_type(&mut self, match_type: MultiMatchType) {
        self.match_type = (match_type != MultiMatchType::default()).then_some(match_type);
    }
}

impl ClauseBody for MultiMatchQuery {
    const KIND: QueryKind = QueryKind::MultiMatch;

    fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    fn to_json(&self) -> Value {
        if self.is_empty() {
            return Value::Null;
        }
        let mut body = Map::new();
        body.insert("query".to_string(), Value::from(self.query.as_str()));
        if !self.fields.is_empty() {
            body.insert("fields".to_string(), self.fields.to_json());
        }
        if let Some(kind) = self.match_type {
            body.insert("type".to_string(), Value::from(kind.as_str()));
        }
        write_params(self, &mut body);
        Value::Object(body)
    }

    fn decode(value: &Value) -> Result<Self, DslError> {
        let Some(body) = flat(value)? else {
            return Ok(Self::default());
        };
        let mut query = MultiMatchQuery {
            query: string(body, "query")?.unwrap_or_default(),
            fields: strings(body, "fields")?,
            match_type: read_type(body)?,
            params: Params::new(),
        };
        read_params(&mut query, body)?;
        report_unknown::<Self>(body, &["query", "fields", "type"]);
        if query.query.is_empty() && !(query.params.is_default() && query.fields.is_empty()) {
            return Err(DslError::new(ErrorKind::ValueRequired));
        }
        Ok(query)
    }
}

// ============================================================================
// query_string
// ============================================================================

/// Lucene query syntax
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryStringQuery {
    query: String,
    default_field: String,
    fields: Strings,
    params: Params,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryStringParams {
    pub query: String,
    pub default_field: String,
    pub fields: Strings,
    pub default_operator: Option<Loose>,
    pub allow_leading_wildcard: Option<Loose>,
    pub analyze_wildcard: Option<Loose>,
    pub analyzer: Option<String>,
    pub quote_analyzer: Option<String>,
    pub auto_generate_synonyms_phrase_query: Option<Loose>,
    pub fuzziness: Option<Loose>,
    pub fuzzy_max_expansions: Option<Loose>,
    pub fuzzy_prefix_length: Option<Loose>,
    pub fuzzy_transpositions: Option<Loose>,
    pub lenient: Option<Loose>,
    pub max_determinized_states: Option<Loose>,
    pub minimum_should_match: Option<Loose>,
    pub rewrite: Option<Loose>,
    pub time_zone: Option<String>,
    pub tie_breaker: Option<Loose>,
    pub boost: Option<Loose>,
    pub name: Option<String>,
}

impl QueryStringParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn build(self) -> Result<QueryStringQuery, DslError> {
        QueryStringQuery::new(self)
    }
}

parameterized!(QueryStringQuery, Some(QueryKind::QueryString), [
    WithDefaultOperator: DefaultOperator,
    WithAllowLeadingWildcard: AllowLeadingWildcard,
    WithAnalyzeWildcard: AnalyzeWildcard,
    WithAnalyzer: Analyzer,
    WithQuoteAnalyzer: QuoteAnalyzer,
    WithAutoGenerateSynonymsPhraseQuery: AutoGenerateSynonymsPhraseQuery,
    WithFuzziness: Fuzziness,
    WithFuzzyMaxExpansions: FuzzyMaxExpansions,
    WithFuzzyPrefixLength: FuzzyPrefixLength,
    WithFuzzyTranspositions: FuzzyTranspositions,
    WithLenient: Lenient,
    WithMaxDeterminizedStates: MaxDeterminizedStates,
    WithMinimumShouldMatch: MinimumShouldMatch,
    WithRewrite: Rewrite,
    WithTimeZone: TimeZone,
    WithTieBreaker: TieBreaker,
    WithBoost: Boost,
    WithName: Name,
]);

impl QueryStringQuery {
    pub fn new(record: QueryStringParams) -> Result<Self, DslError> {
        if record.query.is_empty() {
            return Err(DslError::new(ErrorKind::ValueRequired).with_clause(Self::KIND));
        }
        let mut params = Params::new();
        let owner = Self::OWNER;
        params.apply(Param::DefaultOperator, record.default_operator, owner)?;
        params.apply(Param::AllowLeadingWildcard, record.allow_leading_wildcard, owner)?;
        params.apply(Param::AnalyzeWildcard, record.analyze_wildcard, owner)?;
        params.apply(Param::Analyzer, record.analyzer, owner)?;
        params.apply(Param::QuoteAnalyzer, record.quote_analyzer, owner)?;
        params.apply(
            Param::AutoGenerateSynonymsPhraseQuery,
            record.auto_generate_synonyms_phrase_query,
            owner,
        )?;
        params.apply(Param::Fuzziness, record.fuzziness, owner)?;
        params.apply(Param::FuzzyMaxExpansions, record.fuzzy_max_expansions, owner)?;
        params.apply(Param::FuzzyPrefixLength, record.fuzzy_prefix_length, owner)?;
        params.apply(Param::FuzzyTranspositions, record.fuzzy_transpositions, owner)?;
        params.apply(Param::Lenient, record.lenient, owner)?;
        params.apply(Param::MaxDeterminizedStates, record.max_determinized_states, owner)?;
        params.apply(Param::MinimumShouldMatch, record.minimum_should_match, owner)?;
        params.apply(Param::Rewrite, record.rewrite, owner)?;
        params.apply(Param::TimeZone, record.time_zone, owner)?;
        params.apply(Param::TieBreaker, record.tie_breaker, owner)?;
        params.apply(Param::Boost, record.boost, owner)?;
        params.apply(Param::Name, record.name, owner)?;
        Ok(QueryStringQuery {
            query: record.query,
            default_field: record.default_field,
            fields: record.fields,
            params,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn default_field(&self) -> &str {
        &self.default_field
    }

    pub fn fields(&self) -> &Strings {
        &self.fields
    }
}

impl ClauseBody for QueryStringQuery {
    const KIND: QueryKind = QueryKind::QueryString;

    fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    fn to_json(&self) -> Value {
        if self.is_empty() {
            return Value::Null;
        }
        let mut body = Map::new();
        body.insert("query".to_string(), Value::from(self.query.as_str()));
        if !self.default_field.is_empty() {
            body.insert(
                "default_field".to_string(),
                Value::from(self.default_field.as_str()),
            );
        }
        if !self.fields.is_empty() {
            body.insert("fields".to_string(), self.fields.to_json());
        }
        write_params(self, &mut body);
        Value::Object(body)
    }

    fn decode(value: &Value) -> Result<Self, DslError> {
        let Some(body) = flat(value)? else {
            return Ok(Self::default());
        };
        let mut query = QueryStringQuery {
            query: string(body, "query")?.unwrap_or_default(),
            default_field: string(body, "default_field")?.unwrap_or_default(),
            fields: strings(body, "fields")?,
            params: Params::new(),
        };
        read_params(&mut query, body)?;
        report_unknown::<Self>(body, &["query", "default_field", "fields"]);
        if query.query.is_empty() && !query.params.is_default() {
            return Err(DslError::new(ErrorKind::ValueRequired));
        }
        Ok(query)
    }
}

// ============================================================================
// simple_query_string
// ============================================================================

/// Forgiving query syntax that never throws on malformed input
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimpleQueryStringQuery {
    query: String,
    fields: Strings,
    flags: String,
    params: Params,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimpleQueryStringParams {
    pub query: String,
    pub fields: Strings,
    /// `|`-separated syntax flags (`AND`, `OR`, `PREFIX`, ...)
    pub flags: String,
    pub default_operator: Option<Loose>,
    pub analyzer: Option<String>,
    pub analyze_wildcard: Option<Loose>,
    pub auto_generate_synonyms_phrase_query: Option<Loose>,
    pub fuzzy_max_expansions: Option<Loose>,
    pub fuzzy_prefix_length: Option<Loose>,
    pub fuzzy_transpositions: Option<Loose>,
    pub lenient: Option<Loose>,
    pub minimum_should_match: Option<Loose>,
    pub boost: Option<Loose>,
    pub name: Option<String>,
}

impl SimpleQueryStringParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn build(self) -> Result<SimpleQueryStringQuery, DslError> {
        SimpleQueryStringQuery::new(self)
    }
}

parameterized!(SimpleQueryStringQuery, Some(QueryKind::SimpleQueryString), [
    WithDefaultOperator: DefaultOperator,
    WithAnalyzer: Analyzer,
    WithAnalyzeWildcard: AnalyzeWildcard,
    WithAutoGenerateSynonymsPhraseQuery: AutoGenerateSynonymsPhraseQuery,
    WithFuzzyMaxExpansions: FuzzyMaxExpansions,
    WithFuzzyPrefixLength: FuzzyPrefixLength,
    WithFuzzyTranspositions: FuzzyTranspositions,
    WithLenient: Lenient,
    WithMinimumShouldMatch: MinimumShouldMatch,
    WithBoost: Boost,
    WithName: Name,
]);

impl SimpleQueryStringQuery {
    pub fn new(record: SimpleQueryStringParams) -> Result<Self, DslError> {
        if record.query.is_empty() {
            return Err(DslError::new(ErrorKind::ValueRequired).with_clause(Self::KIND));
        }
        let mut params = Params::new();
        let owner = Self::OWNER;
        params.apply(Param::DefaultOperator, record.default_operator, owner)?;
        params.apply(Param::Analyzer, record.analyzer, owner)?;
        params.apply(Param::AnalyzeWildcard, record.analyze_wildcard, owner)?;
        params.apply(
            Param::AutoGenerateSynonymsPhraseQuery,
            record.auto_generate_synonyms_phrase_query,
            owner,
        )?;
        params.apply(Param::FuzzyMaxExpansions, record.fuzzy_max_expansions, owner)?;
        params.apply(Param::FuzzyPrefixLength, record.fuzzy_prefix_length, owner)?;
        params.apply(Param::FuzzyTranspositions, record.fuzzy_transpositions, owner)?;
        params.apply(Param::Lenient, record.lenient, owner)?;
        params.apply(Param::MinimumShouldMatch, record.minimum_should_match, owner)?;
        params.apply(Param::Boost, record.boost, owner)?;
        params.apply(Param::Name, record.name, owner)?;
        Ok(SimpleQueryStringQuery {
            query: record.query,
            fields: record.fields,
            flags: record.flags,
            params,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn fields(&self) -> &Strings {
        &self.fields
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }
}

impl ClauseBody for SimpleQueryStringQuery {
    const KIND: QueryKind = QueryKind::SimpleQueryString;

    fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    fn to_json(&self) -> Value {
        if self.is_empty() {
            return Value::Null;
        }
        let mut body = Map::new();
        body.insert("query".to_string(), Value::from(self.query.as_str()));
        if !self.fields.is_empty() {
            body.insert("fields".to_string(), self.fields.to_json());
        }
        if !self.flags.is_empty() {
            body.insert("flags".to_string(), Value::from(self.flags.as_str()));
        }
        write_params(self, &mut body);
        Value::Object(body)
    }

    fn decode(value: &Value) -> Result<Self, DslError> {
        let Some(body) = flat(value)? else {
            return Ok(Self::default());
        };
        let mut query = SimpleQueryStringQuery {
            query: string(body, "query")?.unwrap_or_default(),
            fields: strings(body, "fields")?,
            flags: string(body, "flags")?.unwrap_or_default(),
            params: Params::new(),
        };
        read_params(&mut query, body)?;
        report_unknown::<Self>(body, &["query", "fields", "flags"]);
        if query.query.is_empty() && !query.params.is_default() {
            return Err(DslError::new(ErrorKind::ValueRequired));
        }
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{Operator, ZeroTerms};
    use crate::prelude::*;
    use serde_json::json;

    #[test]
    fn test_match_shortcut_expands_to_query() {
        let q = MatchQuery::from_json(&json!({"message": "this is a test"})).unwrap();
        assert_eq!(q.field(), "message");
        assert_eq!(q.query(), "this is a test");
        assert!(q.params().is_default());
        assert_eq!(
            q.to_json(),
            json!({"message": {"query": "this is a test"}})
        );
    }

    #[test]
    fn test_match_numeric_and_bool_query_kept() {
        let body = json!({"age": {"query": 30}});
        let q = MatchQuery::from_json(&body).unwrap();
        assert_eq!(q.query_value(), Some(&Scalar::from(30)));
        assert_eq!(q.query(), "30");
        assert_eq!(q.to_json(), body);

        let q = MatchQuery::from_json(&json!({"active": true})).unwrap();
        assert_eq!(q.query_value(), Some(&Scalar::Bool(true)));
        assert_eq!(q.to_json(), json!({"active": {"query": true}}));
    }

    #[test]
    fn test_match_params_round_trip() {
        let body = json!({"message": {
            "query": "to be or not",
            "operator": "AND",
            "zero_terms_query": "all",
            "fuzziness": "AUTO",
            "cutoff_frequency": 0.001,
            "auto_generate_synonyms_phrase_query": false,
            "_name": "m1"
        }});
        let q = MatchQuery::from_json(&body).unwrap();
        assert_eq!(q.operator(), Operator::And);
        assert_eq!(q.zero_terms_query(), ZeroTerms::All);
        assert!(!q.auto_generate_synonyms_phrase_query());
        assert_eq!(q.name(), "m1");
        assert_eq!(q.to_json(), body);
    }

    #[test]
    fn test_match_operator_lowercase_canonicalised() {
        let q = MatchParams {
            operator: Some("and".into()),
            ..MatchParams::new("message", "x")
        }
        .build()
        .unwrap();
        assert_eq!(q.to_json(), json!({"message": {"query": "x", "operator": "AND"}}));
    }

    #[test]
    fn test_match_requires_query() {
        let err = MatchParams::new("message", "").build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueRequired);
        assert_eq!(err.clause(), Some(QueryKind::Match));
    }

    #[test]
    fn test_match_invalid_zero_terms() {
        let err = MatchQuery::from_json(&json!({"m": {"query": "x", "zero_terms_query": "some"}}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidZeroTermQuery);
        assert_eq!(err.field(), Some("m"));
    }

    #[test]
    fn test_match_phrase_prefix_keeps_params() {
        let body = json!({"message": {
            "query": "quick brown f",
            "max_expansions": 10,
            "slop": 2,
            "zero_terms_query": "all",
            "analyzer": "standard",
            "_name": "mpp"
        }});
        let q = MatchPhrasePrefixQuery::from_json(&body).unwrap();
        assert_eq!(q.max_expansions(), 10);
        assert_eq!(q.slop(), 2);
        assert_eq!(q.to_json(), body);
    }

    #[test]
    fn test_match_bool_prefix_shortcut() {
        let q = MatchBoolPrefixQuery::from_json(&json!({"message": "quick brown f"})).unwrap();
        assert_eq!(q.query(), "quick brown f");
    }

    #[test]
    fn test_match_phrase_slop() {
        let q = MatchPhraseParams {
            slop: Some("3".into()),
            ..MatchPhraseParams::new("message", "this is a test")
        }
        .build()
        .unwrap();
        assert_eq!(q.slop(), 3);
    }

    #[test]
    fn test_multi_match() {
        let body = json!({
            "query": "brown fox",
            "type": "most_fields",
            "fields": ["subject", "message"],
            "tie_breaker": 0.3
        });
        let q = MultiMatchQuery::from_json(&body).unwrap();
        assert_eq!(q.match_type(), MultiMatchType::MostFields);
        assert_eq!(q.fields().len(), 2);
        assert_eq!(q.to_json(), body);

        let err = MultiMatchQuery::from_json(&json!({"query": "x", "type": "best"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidMultiMatchType);
    }

    #[test]
    fn test_query_string() {
        let body = json!({
            "query": "(new york city) OR (big apple)",
            "default_field": "content",
            "default_operator": "AND",
            "allow_leading_wildcard": false
        });
        let q = QueryStringQuery::from_json(&body).unwrap();
        assert_eq!(q.default_operator(), Operator::And);
        assert!(!q.allow_leading_wildcard());
        assert_eq!(q.to_json(), body);
    }

    #[test]
    fn test_simple_query_string_fields_single_string() {
        let q = SimpleQueryStringQuery::from_json(&json!({
            "query": "\"fried eggs\" +(eggplant | potato)",
            "fields": "title",
            "flags": "OR|AND"
        }))
        .unwrap();
        assert_eq!(q.fields().as_slice(), &["title"]);
        assert_eq!(q.flags(), "OR|AND");
    }
}
