//! Term-level clauses: exact values, patterns and ranges over a single field
//!
//! `term`, `prefix`, `wildcard`, `regexp`, `fuzzy` and `range` are
//! field-keyed; `terms` puts its parameters beside the field key; `exists`
//! and `ids` are flat.

use serde_json::{Map, Value};

use crate::error::{DslError, ErrorKind};
use crate::input::Loose;
use crate::params::{read_params, report_unknown, write_params, Param, Parameterized, Params};
use crate::scalar::{Scalar, Strings};

use super::shape::{field_keyed, flat, put, scalar, string, wrap_field};
use super::{require_field, ClauseBody, QueryKind};

// ============================================================================
// term
// ============================================================================

/// Exact value match on a field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermQuery {
    field: String,
    value: Option<Scalar>,
    params: Params,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermParams {
    pub field: String,
    pub value: Option<Scalar>,
    pub boost: Option<Loose>,
    pub case_insensitive: Option<Loose>,
    pub name: Option<String>,
}

impl TermParams {
    pub fn new(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self {
            field: field.into(),
            value: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn build(self) -> Result<TermQuery, DslError> {
        TermQuery::new(self)
    }
}

parameterized!(TermQuery, Some(QueryKind::Term), [
    WithBoost: Boost,
    WithCaseInsensitive: CaseInsensitive,
    WithName: Name,
]);

impl TermQuery {
    pub fn new(record: TermParams) -> Result<Self, DslError> {
        require_field(Self::KIND, &record.field)?;
        let field = record.field;
        let fail = |e: DslError| e.with_clause(QueryKind::Term).with_field(field.as_str());
        let value = record
            .value
            .ok_or_else(|| fail(DslError::new(ErrorKind::ValueRequired)))?;
        let mut params = Params::new();
        params.apply(Param::Boost, record.boost, Self::OWNER).map_err(fail)?;
        params
            .apply(Param::CaseInsensitive, record.case_insensitive, Self::OWNER)
            .map_err(fail)?;
        params.apply(Param::Name, record.name, Self::OWNER).map_err(fail)?;
        Ok(TermQuery {
            field,
            value: Some(value),
            params,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn value(&self) -> Option<&Scalar> {
        self.value.as_ref()
    }

    pub fn set_field(&mut self, field: impl Into<String>) -> Result<(), DslError> {
        let field = field.into();
        require_field(Self::KIND, &field)?;
        self.field = field;
        Ok(())
    }

    pub fn set_value(&mut self, value: impl Into<Scalar>) {
        self.value = Some(value.into());
    }
}

impl ClauseBody for TermQuery {
    const KIND: QueryKind = QueryKind::Term;

    fn is_empty(&self) -> bool {
        self.field.is_empty()
    }

    fn to_json(&self) -> Value {
        if self.is_empty() {
            return Value::Null;
        }
        let mut body = Map::new();
        put(&mut body, "value", self.value.as_ref().map(Scalar::to_json));
        write_params(self, &mut body);
        wrap_field(&self.field, body)
    }

    fn decode(value: &Value) -> Result<Self, DslError> {
        let Some((field, body)) = field_keyed(value, Some("value"))? else {
            return Ok(Self::default());
        };
        let mut query = TermQuery {
            value: scalar(&body, "value").map_err(|e| e.with_field(field.as_str()))?,
            field,
            params: Params::new(),
        };
        read_params(&mut query, &body).map_err(|e| e.with_field(query.field.as_str()))?;
        report_unknown::<Self>(&body, &["value"]);
        if query.value.is_none() {
            return Err(DslError::new(ErrorKind::ValueRequired).with_field(query.field));
        }
        Ok(query)
    }
}

// ============================================================================
// terms
// ============================================================================

/// Fetch the term list from a field of another document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermsLookup {
    pub index: String,
    pub id: String,
    pub path: String,
    pub routing: String,
}

impl TermsLookup {
    pub fn new(index: impl Into<String>, id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            id: id.into(),
            path: path.into(),
            routing: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), DslError> {
        if self.index.is_empty() {
            return Err(DslError::new(ErrorKind::IndexRequired));
        }
        if self.id.is_empty() {
            return Err(DslError::new(ErrorKind::IdRequired));
        }
        if self.path.is_empty() {
            return Err(DslError::new(ErrorKind::PathRequired));
        }
        Ok(())
    }

    fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("index".to_string(), Value::from(self.index.as_str()));
        map.insert("id".to_string(), Value::from(self.id.as_str()));
        map.insert("path".to_string(), Value::from(self.path.as_str()));
        if !self.routing.is_empty() {
            map.insert("routing".to_string(), Value::from(self.routing.as_str()));
        }
        Value::Object(map)
    }

    fn from_map(map: &Map<String, Value>) -> Result<Self, DslError> {
        let lookup = TermsLookup {
            index: string(map, "index")?.unwrap_or_default(),
            id: string(map, "id")?.unwrap_or_default(),
            path: string(map, "path")?.unwrap_or_default(),
            routing: string(map, "routing")?.unwrap_or_default(),
        };
        lookup.validate()?;
        Ok(lookup)
    }
}

/// Term list source: inline values or a lookup
#[derive(Debug, Clone, PartialEq)]
pub enum TermsSource {
    Values(Vec<Scalar>),
    Lookup(TermsLookup),
}

impl Default for TermsSource {
    fn default() -> Self {
        TermsSource::Values(Vec::new())
    }
}

/// Match any of several exact values on a field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermsQuery {
    field: String,
    source: TermsSource,
    params: Params,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermsParams {
    pub field: String,
    pub values: Vec<Scalar>,
    pub lookup: Option<TermsLookup>,
    pub boost: Option<Loose>,
    pub name: Option<String>,
}

impl TermsParams {
    pub fn new<V: Into<Scalar>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn lookup(field: impl Into<String>, lookup: TermsLookup) -> Self {
        Self {
            field: field.into(),
            lookup: Some(lookup),
            ..Default::default()
        }
    }

    pub fn build(self) -> Result<TermsQuery, DslError> {
        TermsQuery::new(self)
    }
}

parameterized!(TermsQuery, Some(QueryKind::Terms), [
    WithBoost: Boost,
    WithName: Name,
]);

impl TermsQuery {
    /// A lookup, when given, takes precedence over inline values
    pub fn new(record: TermsParams) -> Result<Self, DslError> {
        require_field(Self::KIND, &record.field)?;
        let field = record.field;
        let fail = |e: DslError| e.with_clause(QueryKind::Terms).with_field(field.as_str());
        let source = match record.lookup {
            Some(lookup) => {
                lookup.validate().map_err(fail)?;
                TermsSource::Lookup(lookup)
            }
            None => TermsSource::Values(record.values),
        };
        let mut params = Params::new();
        params.apply(Param::Boost, record.boost, Self::OWNER).map_err(fail)?;
        params.apply(Param::Name, record.name, Self::OWNER).map_err(fail)?;
        Ok(TermsQuery {
            field,
            source,
            params,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn source(&self) -> &TermsSource {
        &self.source
    }

    /// Inline values; empty for a lookup
    pub fn values(&self) -> &[Scalar] {
        match &self.source {
            TermsSource::Values(values) => values,
            TermsSource::Lookup(_) => &[],
        }
    }

    pub fn lookup(&self) -> Option<&TermsLookup> {
        match &self.source {
            TermsSource::Lookup(lookup) => Some(lookup),
            TermsSource::Values(_) => None,
        }
    }

    pub fn push_value(&mut self, value: impl Into<Scalar>) {
        match &mut self.source {
            TermsSource::Values(values) => values.push(value.into()),
            TermsSource::Lookup(_) => self.source = TermsSource::Values(vec![value.into()]),
        }
    }
}

impl ClauseBody for TermsQuery {
    const KIND: QueryKind = QueryKind::Terms;

    fn is_empty(&self) -> bool {
        self.field.is_empty()
    }

    fn to_json(&self) -> Value {
        if self.is_empty() {
            return Value::Null;
        }
        let mut body = Map::new();
        write_params(self, &mut body);
        let terms = match &self.source {
            TermsSource::Values(values) => {
                Value::Array(values.iter().map(Scalar::to_json).collect())
            }
            TermsSource::Lookup(lookup) => lookup.to_json(),
        };
        body.insert(self.field.clone(), terms);
        Value::Object(body)
    }

    fn decode(value: &Value) -> Result<Self, DslError> {
        let Some(body) = flat(value)? else {
            return Ok(Self::default());
        };
        let mut query = TermsQuery::default();
        read_params(&mut query, body)?;
        let mut fields = body
            .iter()
            .filter(|(key, _)| !Self::PARAMS.iter().any(|p| p.key() == key.as_str()));
        let Some((field, terms)) = fields.next() else {
            return Ok(query);
        };
        if let Some((second, _)) = fields.next() {
            return Err(DslError::new(ErrorKind::InvalidParams).with_detail(format!(
                "expected a single field, got several ({}, {}, ...)",
                field, second
            )));
        }
        let fail = |e: DslError| e.with_field(field.as_str());
        query.source = match terms {
            Value::Array(items) => TermsSource::Values(
                items
                    .iter()
                    .map(|item| {
                        Scalar::from_json(item).ok_or_else(|| {
                            fail(DslError::new(ErrorKind::InvalidParams).with_received(item))
                        })
                    })
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(map) => TermsSource::Lookup(TermsLookup::from_map(map).map_err(fail)?),
            Value::Null => TermsSource::default(),
            other => TermsSource::Values(vec![Scalar::from_json(other).ok_or_else(|| {
                fail(DslError::new(ErrorKind::InvalidParams).with_received(other))
            })?]),
        };
        query.field = field.clone();
        Ok(query)
    }
}

// ============================================================================
// prefix / wildcard
// ============================================================================

macro_rules! pattern_clause {
    ($(#[$doc:meta])* $query:ident, $record:ident, $kind:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $query {
            field: String,
            value: String,
            params: Params,
        }

        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $record {
            pub field: String,
            pub value: String,
            pub rewrite: Option<Loose>,
            pub case_insensitive: Option<Loose>,
            pub boost: Option<Loose>,
            pub name: Option<String>,
        }

        impl $record {
            pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
                Self {
                    field: field.into(),
                    value: value.into(),
                    ..Default::default()
                }
            }

            pub fn build(self) -> Result<$query, DslError> {
                $query::new(self)
            }
        }

        parameterized!($query, Some(QueryKind::$kind), [
            WithRewrite: Rewrite,
            WithCaseInsensitive: CaseInsensitive,
            WithBoost: Boost,
            WithName: Name,
        ]);

        impl $query {
            pub fn new(record: $record) -> Result<Self, DslError> {
                require_field(Self::KIND, &record.field)?;
                let field = record.field;
                let fail = |e: DslError| e.with_clause(QueryKind::$kind).with_field(field.as_str());
                if record.value.is_empty() {
                    return Err(fail(DslError::new(ErrorKind::ValueRequired)));
                }
                let mut params = Params::new();
                params.apply(Param::Rewrite, record.rewrite, Self::OWNER).map_err(fail)?;
                params
                    .apply(Param::CaseInsensitive, record.case_insensitive, Self::OWNER)
                    .map_err(fail)?;
                params.apply(Param::Boost, record.boost, Self::OWNER).map_err(fail)?;
                params.apply(Param::Name, record.name, Self::OWNER).map_err(fail)?;
                Ok($query {
                    field,
                    value: record.value,
                    params,
                })
            }

            pub fn field(&self) -> &str {
                &self.field
            }

            pub fn value(&self) -> &str {
                &self.value
            }

            pub fn set_value(&mut self, value: impl Into<String>) {
                self.value = value.into();
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
                body.insert("value".to_string(), Value::from(self.value.as_str()));
                write_params(self, &mut body);
                wrap_field(&self.field, body)
            }

            fn decode(value: &Value) -> Result<Self, DslError> {
                let Some((field, body)) = field_keyed(value, Some("value"))? else {
                    return Ok(Self::default());
                };
                let mut query = $query {
                    value: string(&body, "value")
                        .map_err(|e| e.with_field(field.as_str()))?
                        .unwrap_or_default(),
                    field,
                    params: Params::new(),
                };
                read_params(&mut query, &body).map_err(|e| e.with_field(query.field.as_str()))?;
                report_unknown::<Self>(&body, &["value"]);
                if query.value.is_empty() {
                    return Err(DslError::new(ErrorKind::ValueRequired).with_field(query.field));
                }
                Ok(query)
            }
        }
    };
}

pattern_clause!(
    /// Terms starting with a prefix
    PrefixQuery, PrefixParams, Prefix
);
pattern_clause!(
    /// Terms matching a `*`/`?` pattern
    WildcardQuery, WildcardParams, Wildcard
);

// ============================================================================
// regexp
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegexpQuery {
    field: String,
    value: String,
    flags: String,
    params: Params,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegexpParams {
    pub field: String,
    pub value: String,
    /// `|`-separated operator flags (`ALL`, `COMPLEMENT`, `INTERVAL`, ...)
    pub flags: String,
    pub case_insensitive: Option<Loose>,
    pub max_determinized_states: Option<Loose>,
    pub rewrite: Option<Loose>,
    pub boost: Option<Loose>,
    pub name: Option<String>,
}

impl RegexpParams {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn build(self) -> Result<RegexpQuery, DslError> {
        RegexpQuery::new(self)
    }
}

parameterized!(RegexpQuery, Some(QueryKind::Regexp), [
    WithCaseInsensitive: CaseInsensitive,
    WithMaxDeterminizedStates: MaxDeterminizedStates,
    WithRewrite: Rewrite,
    WithBoost: Boost,
    WithName: Name,
]);

impl RegexpQuery {
    pub fn new(record: RegexpParams) -> Result<Self, DslError> {
        require_field(Self::KIND, &record.field)?;
        let field = record.field;
        let fail = |e: DslError| e.with_clause(QueryKind::Regexp).with_field(field.as_str());
        if record.value.is_empty() {
            return Err(fail(DslError::new(ErrorKind::ValueRequired)));
        }
        let mut params = Params::new();
        params
            .apply(Param::CaseInsensitive, record.case_insensitive, Self::OWNER)
            .map_err(fail)?;
        params
            .apply(
                Param::MaxDeterminizedStates,
                record.max_determinized_states,
                Self::OWNER,
            )
            .map_err(fail)?;
        params.apply(Param::Rewrite, record.rewrite, Self::OWNER).map_err(fail)?;
        params.apply(Param::Boost, record.boost, Self::OWNER).map_err(fail)?;
        params.apply(Param::Name, record.name, Self::OWNER).map_err(fail)?;
        Ok(RegexpQuery {
            field,
            value: record.value,
            flags: record.flags,
            params,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    pub fn set_flags(&mut self, flags: impl Into<String>) {
        self.flags = flags.into();
    }
}

impl ClauseBody for RegexpQuery {
    const KIND: QueryKind = QueryKind::Regexp;

    fn is_empty(&self) -> bool {
        self.field.is_empty()
    }

    fn to_json(&self) -> Value {
        if self.is_empty() {
            return Value::Null;
        }
        let mut body = Map::new();
        body.insert("value".to_string(), Value::from(self.value.as_str()));
        if !self.flags.is_empty() {
            body.insert("flags".to_string(), Value::from(self.flags.as_str()));
        }
        write_params(self, &mut body);
        wrap_field(&self.field, body)
    }

    fn decode(value: &Value) -> Result<Self, DslError> {
        let Some((field, body)) = field_keyed(value, Some("value"))? else {
            return Ok(Self::default());
        };
        let read = |key: &str| -> Result<String, DslError> {
            Ok(string(&body, key)
                .map_err(|e| e.with_field(field.as_str()))?
                .unwrap_or_default())
        };
        let (value, flags) = (read("value")?, read("flags")?);
        let mut query = RegexpQuery {
            field,
            value,
            flags,
            params: Params::new(),
        };
        read_params(&mut query, &body).map_err(|e| e.with_field(query.field.as_str()))?;
        report_unknown::<Self>(&body, &["value", "flags"]);
        if query.value.is_empty() {
            return Err(DslError::new(ErrorKind::ValueRequired).with_field(query.field));
        }
        Ok(query)
    }
}

// ============================================================================
// fuzzy
// ============================================================================

/// Terms within an edit distance of the value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FuzzyQuery {
    field: String,
    value: String,
    params: Params,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FuzzyParams {
    pub field: String,
    pub value: String,
    pub fuzziness: Option<Loose>,
    pub max_expansions: Option<Loose>,
    pub prefix_length: Option<Loose>,
    pub transpositions: Option<Loose>,
    pub rewrite: Option<Loose>,
    pub boost: Option<Loose>,
    pub name: Option<String>,
}

impl FuzzyParams {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn build(self) -> Result<FuzzyQuery, DslError> {
        FuzzyQuery::new(self)
    }
}

parameterized!(FuzzyQuery, Some(QueryKind::Fuzzy), [
    WithFuzziness: Fuzziness,
    WithMaxExpansions: MaxExpansions,
    WithPrefixLength: PrefixLength,
    WithTranspositions: Transpositions,
    WithRewrite: Rewrite,
    WithBoost: Boost,
    WithName: Name,
]);

impl FuzzyQuery {
    pub fn new(record: FuzzyParams) -> Result<Self, DslError> {
        require_field(Self::KIND, &record.field)?;
        let field = record.field;
        let fail = |e: DslError| e.with_clause(QueryKind::Fuzzy).with_field(field.as_str());
        if record.value.is_empty() {
            return Err(fail(DslError::new(ErrorKind::ValueRequired)));
        }
        let mut params = Params::new();
        params.apply(Param::Fuzziness, record.fuzziness, Self::OWNER).map_err(fail)?;
        params
            .apply(Param::MaxExpansions, record.max_expansions, Self::OWNER)
            .map_err(fail)?;
        params
            .apply(Param::PrefixLength, record.prefix_length, Self::OWNER)
            .map_err(fail)?;
        params
            .apply(Param::Transpositions, record.transpositions, Self::OWNER)
            .map_err(fail)?;
        params.apply(Param::Rewrite, record.rewrite, Self::OWNER).map_err(fail)?;
        params.apply(Param::Boost, record.boost, Self::OWNER).map_err(fail)?;
        params.apply(Param::Name, record.name, Self::OWNER).map_err(fail)?;
        Ok(FuzzyQuery {
            field,
            value: record.value,
            params,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl ClauseBody for FuzzyQuery {
    const KIND: QueryKind = QueryKind::Fuzzy;

    fn is_empty(&self) -> bool {
        self.field.is_empty()
    }

    fn to_json(&self) -> Value {
        if self.is_empty() {
            return Value::Null;
        }
        let mut body = Map::new();
        body.insert("value".to_string(), Value::from(self.value.as_str()));
        write_params(self, &mut body);
        wrap_field(&self.field, body)
    }

    fn decode(value: &Value) -> Result<Self, DslError> {
        let Some((field, body)) = field_keyed(value, Some("value"))? else {
            return Ok(Self::default());
        };
        let mut query = FuzzyQuery {
            value: string(&body, "value")
                .map_err(|e| e.with_field(field.as_str()))?
                .unwrap_or_default(),
            field,
            params: Params::new(),
        };
        read_params(&mut query, &body).map_err(|e| e.with_field(query.field.as_str()))?;
        report_unknown::<Self>(&body, &["value"]);
        if query.value.is_empty() {
            return Err(DslError::new(ErrorKind::ValueRequired).with_field(query.field));
        }
        Ok(query)
    }
}

// ============================================================================
// range
// ============================================================================

const RANGE_BOUNDS: [&str; 4] = ["gt", "gte", "lt", "lte"];

/// Values between bounds; any subset of the four bounds may be given
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeQuery {
    field: String,
    gt: Option<Scalar>,
    gte: Option<Scalar>,
    lt: Option<Scalar>,
    lte: Option<Scalar>,
    params: Params,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeParams {
    pub field: String,
    pub gt: Option<Scalar>,
    pub gte: Option<Scalar>,
    pub lt: Option<Scalar>,
    pub lte: Option<Scalar>,
    pub format: Option<String>,
    pub time_zone: Option<String>,
    pub relation: Option<Loose>,
    pub boost: Option<Loose>,
    pub name: Option<String>,
}

impl RangeParams {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ..Default::default()
        }
    }

    pub fn build(self) -> Result<RangeQuery, DslError> {
        RangeQuery::new(self)
    }
}

parameterized!(RangeQuery, Some(QueryKind::Range), [
    WithFormat: Format,
    WithTimeZone: TimeZone,
    WithRelation: Relation,
    WithBoost: Boost,
    WithName: Name,
]);

impl RangeQuery {
    pub fn new(record: RangeParams) -> Result<Self, DslError> {
        require_field(Self::KIND, &record.field)?;
        let field = record.field;
        let fail = |e: DslError| e.with_clause(QueryKind::Range).with_field(field.as_str());
        let mut params = Params::new();
        params.apply(Param::Format, record.format, Self::OWNER).map_err(fail)?;
        params.apply(Param::TimeZone, record.time_zone, Self::OWNER).map_err(fail)?;
        params.apply(Param::Relation, record.relation, Self::OWNER).map_err(fail)?;
        params.apply(Param::Boost, record.boost, Self::OWNER).map_err(fail)?;
        params.apply(Param::Name, record.name, Self::OWNER).map_err(fail)?;
        Ok(RangeQuery {
            field,
            gt: record.gt,
            gte: record.gte,
            lt: record.lt,
            lte: record.lte,
            params,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn gt(&self) -> Option<&Scalar> {
        self.gt.as_ref()
    }

    pub fn gte(&self) -> Option<&Scalar> {
        self.gte.as_ref()
    }

    pub fn lt(&self) -> Option<&Scalar> {
        self.lt.as_ref()
    }

    pub fn lte(&self) -> Option<&Scalar> {
        self.lte.as_ref()
    }

    pub fn set_gt(&mut self, bound: Option<Scalar>) {
        self.gt = bound;
    }

    pub fn set_gte(&mut self, bound: Option<Scalar>) {
        self.gte = bound;
    }

    pub fn set_lt(&mut self, bound: Option<Scalar>) {
        self.lt = bound;
    }

    pub fn set_lte(&mut self, bound: Option<Scalar>) {
        self.lte = bound;
    }

    fn bounds(&self) -> [(&'static str, &Option<Scalar>); 4] {
        [
            ("gt", &self.gt),
            ("gte", &self.gte),
            ("lt", &self.lt),
            ("lte", &self.lte),
        ]
    }
}

impl ClauseBody for RangeQuery {
    const KIND: QueryKind = QueryKind::Range;

    fn is_empty(&self) -> bool {
        self.field.is_empty()
    }

    fn to_json(&self) -> Value {
        if self.is_empty() {
            return Value::Null;
        }
        let mut body = Map::new();
        for (key, bound) in self.bounds() {
            put(&mut body, key, bound.as_ref().map(Scalar::to_json));
        }
        write_params(self, &mut body);
        wrap_field(&self.field, body)
    }

    fn decode(value: &Value) -> Result<Self, DslError> {
        let Some((field, body)) = field_keyed(value, None)? else {
            return Ok(Self::default());
        };
        let bound = |key: &str| scalar(&body, key).map_err(|e| e.with_field(field.as_str()));
        let (gt, gte, lt, lte) = (bound("gt")?, bound("gte")?, bound("lt")?, bound("lte")?);
        let mut query = RangeQuery {
            field,
            gt,
            gte,
            lt,
            lte,
            params: Params::new(),
        };
        read_params(&mut query, &body).map_err(|e| e.with_field(query.field.as_str()))?;
        report_unknown::<Self>(&body, &RANGE_BOUNDS);
        Ok(query)
    }
}

// ============================================================================
// exists
// ============================================================================

/// Documents with any indexed value for a field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExistsQuery {
    field: String,
    params: Params,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExistsParams {
    pub field: String,
    pub boost: Option<Loose>,
    pub name: Option<String>,
}

impl ExistsParams {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ..Default::default()
        }
    }

    pub fn build(self) -> Result<ExistsQuery, DslError> {
        ExistsQuery::new(self)
    }
}

parameterized!(ExistsQuery, Some(QueryKind::Exists), [
    WithBoost: Boost,
    WithName: Name,
]);

impl ExistsQuery {
    pub fn new(record: ExistsParams) -> Result<Self, DslError> {
        require_field(Self::KIND, &record.field)?;
        let mut params = Params::new();
        params.apply(Param::Boost, record.boost, Self::OWNER)?;
        params.apply(Param::Name, record.name, Self::OWNER)?;
        Ok(ExistsQuery {
            field: record.field,
            params,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

impl ClauseBody for ExistsQuery {
    const KIND: QueryKind = QueryKind::Exists;

    fn is_empty(&self) -> bool {
        self.field.is_empty()
    }

    fn to_json(&self) -> Value {
        if self.is_empty() {
            return Value::Null;
        }
        let mut body = Map::new();
        body.insert("field".to_string(), Value::from(self.field.as_str()));
        write_params(self, &mut body);
        Value::Object(body)
    }

    fn decode(value: &Value) -> Result<Self, DslError> {
        let Some(body) = flat(value)? else {
            return Ok(Self::default());
        };
        let mut query = ExistsQuery {
            field: string(body, "field")?.unwrap_or_default(),
            params: Params::new(),
        };
        read_params(&mut query, body)?;
        report_unknown::<Self>(body, &["field"]);
        if query.field.is_empty() && !query.params.is_default() {
            return Err(DslError::new(ErrorKind::FieldRequired));
        }
        Ok(query)
    }
}

// ============================================================================
// ids
// ============================================================================

/// Documents by `_id`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdsQuery {
    values: Strings,
    params: Params,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdsParams {
    pub values: Strings,
    pub boost: Option<Loose>,
    pub name: Option<String>,
}

impl IdsParams {
    pub fn new(values: impl Into<Strings>) -> Self {
        Self {
            values: values.into(),
            ..Default::default()
        }
    }

    pub fn build(self) -> Result<IdsQuery, DslError> {
        IdsQuery::new(self)
    }
}

parameterized!(IdsQuery, Some(QueryKind::Ids), [
    WithBoost: Boost,
    WithName: Name,
]);

impl IdsQuery {
    pub fn new(record: IdsParams) -> Result<Self, DslError> {
        let mut params = Params::new();
        params.apply(Param::Boost, record.boost, Self::OWNER)?;
        params.apply(Param::Name, record.name, Self::OWNER)?;
        Ok(IdsQuery {
            values: record.values,
            params,
        })
    }

    pub fn values(&self) -> &Strings {
        &self.values
    }

    pub fn push(&mut self, id: impl Into<String>) {
        self.values.push(id);
    }
}

impl ClauseBody for IdsQuery {
    const KIND: QueryKind = QueryKind::Ids;

    fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn to_json(&self) -> Value {
        if self.is_empty() {
            return Value::Null;
        }
        let mut body = Map::new();
        body.insert("values".to_string(), self.values.to_json());
        write_params(self, &mut body);
        Value::Object(body)
    }

    fn decode(value: &Value) -> Result<Self, DslError> {
        let Some(body) = flat(value)? else {
            return Ok(Self::default());
        };
        // numeric ids are accepted and kept as their decimal text
        let values = match body.get("values") {
            None | Some(Value::Null) => Strings::default(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    Value::Number(n) => Ok(n.to_string()),
                    other => Err(DslError::new(ErrorKind::InvalidParams)
                        .with_param("values")
                        .with_received(other)),
                })
                .collect::<Result<Strings, _>>()?,
            Some(Value::String(s)) => Strings::from(s.as_str()),
            Some(other) => {
                return Err(DslError::new(ErrorKind::InvalidParams)
                    .with_param("values")
                    .with_received(other))
            }
        };
        let mut query = IdsQuery {
            values,
            params: Params::new(),
        };
        read_params(&mut query, body)?;
        report_unknown::<Self>(body, &["values"]);
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;
    use serde_json::json;

    // ========================================================================
    // term / terms
    // ========================================================================

    #[test]
    fn test_term_parse_and_defaults() {
        let q = TermQuery::from_json(&json!({"user.id": {"value": "v"}})).unwrap();
        assert_eq!(q.field(), "user.id");
        assert_eq!(q.value(), Some(&Scalar::from("v")));
        assert_eq!(q.boost(), 1.0);
        assert!(!q.case_insensitive());
        assert_eq!(q.to_json(), json!({"user.id": {"value": "v"}}));
    }

    #[test]
    fn test_term_scalar_shortcut() {
        let q = TermQuery::from_json(&json!({"status": 200})).unwrap();
        assert_eq!(q.value(), Some(&Scalar::from(200)));
        assert_eq!(q.to_json(), json!({"status": {"value": 200}}));
    }

    #[test]
    fn test_term_requires_field_and_value() {
        let err = TermParams::default().build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FieldRequired);
        assert_eq!(err.clause(), Some(QueryKind::Term));

        let err = TermParams {
            field: "f".to_string(),
            ..Default::default()
        }
        .build()
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueRequired);
        assert_eq!(err.field(), Some("f"));

        let err = TermQuery::from_json(&json!({"f": {"boost": 2}})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueRequired);
        assert!(err.json().is_some());
    }

    #[test]
    fn test_term_invalid_boost_carries_context() {
        let err = TermParams {
            boost: Some("x".into()),
            ..TermParams::new("f", "v")
        }
        .build()
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidBoost);
        assert_eq!(err.field(), Some("f"));
        assert_eq!(err.param(), Some("boost"));
    }

    #[test]
    fn test_terms_values_beside_params() {
        let q = TermsQuery::from_json(&json!({"user.id": ["kimchy", "elkbee"], "boost": 1.5}))
            .unwrap();
        assert_eq!(q.field(), "user.id");
        assert_eq!(q.values().len(), 2);
        assert_eq!(q.boost(), 1.5);
        assert_eq!(
            q.to_json(),
            json!({"user.id": ["kimchy", "elkbee"], "boost": 1.5})
        );
    }

    #[test]
    fn test_terms_lookup() {
        let q = TermsQuery::from_json(&json!({
            "color": {"index": "my-index", "id": "2", "path": "color"}
        }))
        .unwrap();
        assert_eq!(q.lookup().unwrap().index, "my-index");
        assert!(q.values().is_empty());

        let err = TermsQuery::from_json(&json!({"color": {"id": "2", "path": "color"}}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexRequired);
        let err = TermsParams::lookup("color", TermsLookup::new("idx", "", "color"))
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IdRequired);
        let err = TermsParams::lookup("color", TermsLookup::new("idx", "2", ""))
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PathRequired);
    }

    #[test]
    fn test_terms_rejects_two_fields() {
        let err = TermsQuery::from_json(&json!({"a": ["x"], "b": ["y"]})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParams);
    }

    // ========================================================================
    // patterns
    // ========================================================================

    #[test]
    fn test_prefix_shortcut_and_rewrite() {
        let q = PrefixQuery::from_json(&json!({"user.id": "ki"})).unwrap();
        assert_eq!(q.value(), "ki");
        let q = PrefixQuery::from_json(&json!({
            "user.id": {"value": "ki", "rewrite": "top_terms_10"}
        }))
        .unwrap();
        assert_eq!(q.rewrite(), crate::enums::Rewrite::TopTerms(10));
        assert_eq!(
            q.to_json(),
            json!({"user.id": {"value": "ki", "rewrite": "top_terms_10"}})
        );
    }

    #[test]
    fn test_wildcard_invalid_rewrite() {
        let err = WildcardQuery::from_json(&json!({"f": {"value": "k*y", "rewrite": "fast"}}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRewrite);
        assert_eq!(err.clause(), Some(QueryKind::Wildcard));
    }

    #[test]
    fn test_regexp_flags_round_trip() {
        let body = json!({"user.id": {
            "value": "k.*y",
            "flags": "ALL",
            "case_insensitive": true,
            "max_determinized_states": 10000
        }});
        let q = RegexpQuery::from_json(&body).unwrap();
        assert_eq!(q.flags(), "ALL");
        assert!(q.case_insensitive());
        assert_eq!(
            q.to_json(),
            json!({"user.id": {"value": "k.*y", "flags": "ALL", "case_insensitive": true}})
        );
    }

    #[test]
    fn test_fuzzy_max_expansions_error() {
        let err = FuzzyParams {
            max_expansions: Some(0.into()),
            ..FuzzyParams::new("f", "ki")
        }
        .build()
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFuzzyMaxExpansions);
    }

    #[test]
    fn test_fuzzy_round_trip() {
        let body = json!({"user.id": {
            "value": "ki",
            "fuzziness": "AUTO",
            "max_expansions": 10,
            "prefix_length": 1,
            "transpositions": false
        }});
        let q = FuzzyQuery::from_json(&body).unwrap();
        assert_eq!(q.fuzziness(), "AUTO");
        assert_eq!(q.to_json(), body);
    }

    // ========================================================================
    // range / exists / ids
    // ========================================================================

    #[test]
    fn test_range_bounds() {
        let q = RangeParams {
            gte: Some(10.into()),
            lt: Some(20.into()),
            ..RangeParams::new("age")
        }
        .build()
        .unwrap();
        assert_eq!(q.to_json(), json!({"age": {"gte": 10, "lt": 20}}));
    }

    #[test]
    fn test_range_invalid_relation() {
        let err = RangeQuery::from_json(&json!({"ts": {"gte": 1, "relation": "overlaps"}}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRelation);
        assert_eq!(err.field(), Some("ts"));
    }

    #[test]
    fn test_range_scalar_body_rejected() {
        let err = RangeQuery::from_json(&json!({"ts": "now"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParams);
    }

    #[test]
    fn test_exists() {
        let q = ExistsQuery::from_json(&json!({"field": "user"})).unwrap();
        assert_eq!(q.field(), "user");
        assert_eq!(q.to_json(), json!({"field": "user"}));
        assert_eq!(
            ExistsParams::new("").build().unwrap_err().kind(),
            ErrorKind::FieldRequired
        );
    }

    #[test]
    fn test_ids_numeric_values() {
        let q = IdsQuery::from_json(&json!({"values": ["1", 4, "100"]})).unwrap();
        assert_eq!(q.values().as_slice(), &["1", "4", "100"]);
        assert_eq!(q.to_json(), json!({"values": ["1", "4", "100"]}));
    }
}
