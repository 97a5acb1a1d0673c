//! `intervals`: proximity and ordering of matching terms
//!
//! The query wraps one root [`Rule`] under a field name:
//!
//! ```json
//! {"intervals": {"body": {"all_of": {"ordered": true, "intervals": [
//!     {"match": {"query": "my favorite food"}},
//!     {"any_of": {"intervals": [{"match": {"query": "hot water"}}, {"match": {"query": "cold porridge"}}]}}
//! ]}}}}
//! ```
//!
//! Rules are a closed family of their own, keyed by rule kind.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{DslError, ErrorKind};
use crate::input::Loose;
use crate::params::{read_params, report_unknown, write_params, Param, Parameterized, Params};

use super::shape::{boolean, field_keyed, integer, put, string, wrap_field};
use super::specialized::Script;
use super::{require_field, ClauseBody, QueryKind};

/// `max_gaps` of an unbounded rule
pub const UNBOUNDED_GAPS: i64 = -1;

/// Discriminator key of an intervals rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Match,
    Prefix,
    Wildcard,
    Fuzzy,
    AllOf,
    AnyOf,
}

impl RuleKind {
    pub const ALL: &'static [RuleKind] = &[
        RuleKind::Match,
        RuleKind::Prefix,
        RuleKind::Wildcard,
        RuleKind::Fuzzy,
        RuleKind::AllOf,
        RuleKind::AnyOf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Match => "match",
            RuleKind::Prefix => "prefix",
            RuleKind::Wildcard => "wildcard",
            RuleKind::Fuzzy => "fuzzy",
            RuleKind::AllOf => "all_of",
            RuleKind::AnyOf => "any_of",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleKind {
    type Err = DslError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleKind::ALL
            .iter()
            .find(|kind| kind.as_str() == s)
            .copied()
            .ok_or_else(|| {
                DslError::new(ErrorKind::UnsupportedKind)
                    .with_clause(QueryKind::Intervals)
                    .with_received(format!("{:?}", s))
            })
    }
}

fn max_gaps(map: &Map<String, Value>) -> Result<i64, DslError> {
    Ok(integer(map, "max_gaps")?
        .filter(|gaps| *gaps >= 0)
        .unwrap_or(UNBOUNDED_GAPS))
}

fn put_gaps(map: &mut Map<String, Value>, max_gaps: i64, ordered: bool) {
    if max_gaps != UNBOUNDED_GAPS {
        map.insert("max_gaps".to_string(), Value::from(max_gaps));
    }
    if ordered {
        map.insert("ordered".to_string(), Value::Bool(true));
    }
}

fn put_text(map: &mut Map<String, Value>, key: &str, value: &str) {
    if !value.is_empty() {
        map.insert(key.to_string(), Value::from(value));
    }
}

fn required_text(kind: RuleKind, slot: &str, value: String) -> Result<String, DslError> {
    if value.is_empty() {
        return Err(DslError::new(ErrorKind::ValueRequired)
            .with_clause(QueryKind::Intervals)
            .with_param(format!("{}.{}", kind, slot)));
    }
    Ok(value)
}

// ============================================================================
// leaf rules
// ============================================================================

/// Analyzed text, optionally within `max_gaps` positions and in order
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRule {
    query: String,
    max_gaps: i64,
    ordered: bool,
    use_field: String,
    filter: Option<Box<IntervalFilter>>,
    params: Params,
}

parameterized!(MatchRule, Some(QueryKind::Intervals), [WithAnalyzer: Analyzer]);

impl MatchRule {
    pub fn new(query: impl Into<String>) -> Result<Self, DslError> {
        Ok(MatchRule {
            query: required_text(RuleKind::Match, "query", query.into())?,
            max_gaps: UNBOUNDED_GAPS,
            ordered: false,
            use_field: String::new(),
            filter: None,
            params: Params::new(),
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn max_gaps(&self) -> i64 {
        self.max_gaps
    }

    pub fn ordered(&self) -> bool {
        self.ordered
    }

    pub fn use_field(&self) -> &str {
        &self.use_field
    }

    pub fn filter(&self) -> Option<&IntervalFilter> {
        self.filter.as_deref()
    }

    /// Negative values mean unbounded
    pub fn with_max_gaps(mut self, max_gaps: i64) -> Self {
        self.max_gaps = max_gaps.max(UNBOUNDED_GAPS);
        self
    }

    pub fn with_ordered(mut self, ordered: bool) -> Self {
        self.ordered = ordered;
        self
    }

    pub fn with_use_field(mut self, field: impl Into<String>) -> Self {
        self.use_field = field.into();
        self
    }

    pub fn with_filter(mut self, filter: IntervalFilter) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("query".to_string(), Value::from(self.query.as_str()));
        put_gaps(&mut map, self.max_gaps, self.ordered);
        write_params(self, &mut map);
        put_text(&mut map, "use_field", &self.use_field);
        put(&mut map, "filter", self.filter.as_ref().map(|f| f.to_json()));
        Value::Object(map)
    }

    fn from_map(map: &Map<String, Value>) -> Result<Self, DslError> {
        let mut rule = MatchRule::new(string(map, "query")?.unwrap_or_default())?;
        rule.max_gaps = max_gaps(map)?;
        rule.ordered = boolean(map, "ordered")?.unwrap_or(false);
        rule.use_field = string(map, "use_field")?.unwrap_or_default();
        rule.filter = IntervalFilter::slot(map)?;
        read_params(&mut rule, map)?;
        report_unknown::<Self>(map, &["query", "max_gaps", "ordered", "use_field", "filter"]);
        Ok(rule)
    }
}

macro_rules! pattern_rule {
    ($(#[$doc:meta])* $name:ident, $kind:ident, $slot:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            pattern: String,
            use_field: String,
            params: Params,
        }

        parameterized!($name, Some(QueryKind::Intervals), [WithAnalyzer: Analyzer]);

        impl $name {
            pub fn new(pattern: impl Into<String>) -> Result<Self, DslError> {
                Ok($name {
                    pattern: required_text(RuleKind::$kind, $slot, pattern.into())?,
                    use_field: String::new(),
                    params: Params::new(),
                })
            }

            pub fn pattern(&self) -> &str {
                &self.pattern
            }

            pub fn use_field(&self) -> &str {
                &self.use_field
            }

            pub fn with_use_field(mut self, field: impl Into<String>) -> Self {
                self.use_field = field.into();
                self
            }

            fn to_json(&self) -> Value {
                let mut map = Map::new();
                map.insert($slot.to_string(), Value::from(self.pattern.as_str()));
                write_params(self, &mut map);
                put_text(&mut map, "use_field", &self.use_field);
                Value::Object(map)
            }

            fn from_map(map: &Map<String, Value>) -> Result<Self, DslError> {
                let mut rule = $name::new(string(map, $slot)?.unwrap_or_default())?;
                rule.use_field = string(map, "use_field")?.unwrap_or_default();
                read_params(&mut rule, map)?;
                report_unknown::<Self>(map, &[$slot, "use_field"]);
                Ok(rule)
            }
        }
    };
}

pattern_rule!(
    /// Terms starting with a prefix
    PrefixRule, Prefix, "prefix"
);
pattern_rule!(
    /// Terms matching a `*`/`?` pattern
    WildcardRule, Wildcard, "pattern"
);

/// Terms within an edit distance of `term`
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyRule {
    term: String,
    use_field: String,
    params: Params,
}

parameterized!(FuzzyRule, Some(QueryKind::Intervals), [
    WithPrefixLength: PrefixLength,
    WithTranspositions: Transpositions,
    WithFuzziness: Fuzziness,
    WithAnalyzer: Analyzer,
]);

impl FuzzyRule {
    pub fn new(term: impl Into<String>) -> Result<Self, DslError> {
        Ok(FuzzyRule {
            term: required_text(RuleKind::Fuzzy, "term", term.into())?,
            use_field: String::new(),
            params: Params::new(),
        })
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn use_field(&self) -> &str {
        &self.use_field
    }

    pub fn with_use_field(mut self, field: impl Into<String>) -> Self {
        self.use_field = field.into();
        self
    }

    fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("term".to_string(), Value::from(self.term.as_str()));
        write_params(self, &mut map);
        put_text(&mut map, "use_field", &self.use_field);
        Value::Object(map)
    }

    fn from_map(map: &Map<String, Value>) -> Result<Self, DslError> {
        let mut rule = FuzzyRule::new(string(map, "term")?.unwrap_or_default())?;
        rule.use_field = string(map, "use_field")?.unwrap_or_default();
        read_params(&mut rule, map)?;
        report_unknown::<Self>(map, &["term", "use_field"]);
        Ok(rule)
    }
}

// ============================================================================
// compound rules
// ============================================================================

fn parse_rules(map: &Map<String, Value>, kind: RuleKind) -> Result<Vec<Rule>, DslError> {
    let rules = match map.get("intervals") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                Rule::from_json(item).map_err(|e| e.with_role(format!("{}[{}]", kind, i)))
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => {
            return Err(DslError::new(ErrorKind::InvalidParams)
                .with_clause(QueryKind::Intervals)
                .with_param("intervals")
                .with_received(other))
        }
    };
    Ok(rules)
}

fn require_rules(kind: RuleKind, rules: &[Rule]) -> Result<(), DslError> {
    if rules.is_empty() {
        return Err(DslError::new(ErrorKind::IntervalsRequired)
            .with_clause(QueryKind::Intervals)
            .with_param(kind.as_str()));
    }
    Ok(())
}

macro_rules! compound_rule {
    ($(#[$doc:meta])* $name:ident, $kind:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            intervals: Vec<Rule>,
            max_gaps: i64,
            ordered: bool,
            filter: Option<Box<IntervalFilter>>,
        }

        impl $name {
            /// Fails with `IntervalsRequired` on an empty rule list
            pub fn new(intervals: Vec<Rule>) -> Result<Self, DslError> {
                require_rules(RuleKind::$kind, &intervals)?;
                Ok($name {
                    intervals,
                    max_gaps: UNBOUNDED_GAPS,
                    ordered: false,
                    filter: None,
                })
            }

            pub fn intervals(&self) -> &[Rule] {
                &self.intervals
            }

            pub fn push(&mut self, rule: Rule) {
                self.intervals.push(rule);
            }

            pub fn max_gaps(&self) -> i64 {
                self.max_gaps
            }

            pub fn ordered(&self) -> bool {
                self.ordered
            }

            pub fn filter(&self) -> Option<&IntervalFilter> {
                self.filter.as_deref()
            }

            pub fn with_max_gaps(mut self, max_gaps: i64) -> Self {
                self.max_gaps = max_gaps.max(UNBOUNDED_GAPS);
                self
            }

            pub fn with_ordered(mut self, ordered: bool) -> Self {
                self.ordered = ordered;
                self
            }

            pub fn with_filter(mut self, filter: IntervalFilter) -> Self {
                self.filter = Some(Box::new(filter));
                self
            }

            fn to_json(&self) -> Value {
                let mut map = Map::new();
                map.insert(
                    "intervals".to_string(),
                    Value::Array(self.intervals.iter().map(Rule::to_json).collect()),
                );
                put_gaps(&mut map, self.max_gaps, self.ordered);
                put(&mut map, "filter", self.filter.as_ref().map(|f| f.to_json()));
                Value::Object(map)
            }

            fn from_map(map: &Map<String, Value>) -> Result<Self, DslError> {
                let mut rule = $name::new(parse_rules(map, RuleKind::$kind)?)?;
                rule.max_gaps = max_gaps(map)?;
                rule.ordered = boolean(map, "ordered")?.unwrap_or(false);
                rule.filter = IntervalFilter::slot(map)?;
                Ok(rule)
            }
        }
    };
}

compound_rule!(
    /// Every child rule must match
    AllOfRule, AllOf
);
compound_rule!(
    /// Any child rule may match
    AnyOfRule, AnyOf
);

// ============================================================================
// rule
// ============================================================================

/// One node of the intervals rule tree
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Match(MatchRule),
    Prefix(PrefixRule),
    Wildcard(WildcardRule),
    Fuzzy(FuzzyRule),
    AllOf(AllOfRule),
    AnyOf(AnyOfRule),
}

impl Rule {
    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::Match(_) => RuleKind::Match,
            Rule::Prefix(_) => RuleKind::Prefix,
            Rule::Wildcard(_) => RuleKind::Wildcard,
            Rule::Fuzzy(_) => RuleKind::Fuzzy,
            Rule::AllOf(_) => RuleKind::AllOf,
            Rule::AnyOf(_) => RuleKind::AnyOf,
        }
    }

    /// `{"<kind>": <body>}`
    pub fn to_json(&self) -> Value {
        let body = match self {
            Rule::Match(rule) => rule.to_json(),
            Rule::Prefix(rule) => rule.to_json(),
            Rule::Wildcard(rule) => rule.to_json(),
            Rule::Fuzzy(rule) => rule.to_json(),
            Rule::AllOf(rule) => rule.to_json(),
            Rule::AnyOf(rule) => rule.to_json(),
        };
        let mut map = Map::new();
        map.insert(self.kind().as_str().to_string(), body);
        Value::Object(map)
    }

    pub fn from_json(value: &Value) -> Result<Self, DslError> {
        let map = value.as_object().ok_or_else(|| {
            DslError::new(ErrorKind::InvalidParams)
                .with_clause(QueryKind::Intervals)
                .with_detail("expected a rule object")
                .with_received(value)
        })?;
        let mut entries = map.iter();
        let (key, body) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            (None, _) => {
                return Err(DslError::new(ErrorKind::IntervalsRequired)
                    .with_clause(QueryKind::Intervals))
            }
            _ => {
                return Err(DslError::new(ErrorKind::InvalidParams)
                    .with_clause(QueryKind::Intervals)
                    .with_detail("a rule object holds a single rule")
                    .with_json(value))
            }
        };
        let kind: RuleKind = key.parse()?;
        Self::from_body(kind, body).map_err(|e| e.with_clause(QueryKind::Intervals).with_json(value))
    }

    fn from_body(kind: RuleKind, body: &Value) -> Result<Self, DslError> {
        let empty = Map::new();
        let map = match body {
            Value::Object(map) => map,
            Value::Null => &empty,
            other => {
                return Err(DslError::new(ErrorKind::InvalidParams)
                    .with_param(kind.as_str())
                    .with_received(other))
            }
        };
        Ok(match kind {
            RuleKind::Match => Rule::Match(MatchRule::from_map(map)?),
            RuleKind::Prefix => Rule::Prefix(PrefixRule::from_map(map)?),
            RuleKind::Wildcard => Rule::Wildcard(WildcardRule::from_map(map)?),
            RuleKind::Fuzzy => Rule::Fuzzy(FuzzyRule::from_map(map)?),
            RuleKind::AllOf => Rule::AllOf(AllOfRule::from_map(map)?),
            RuleKind::AnyOf => Rule::AnyOf(AnyOfRule::from_map(map)?),
        })
    }
}

impl From<MatchRule> for Rule {
    fn from(rule: MatchRule) -> Self {
        Rule::Match(rule)
    }
}

impl From<PrefixRule> for Rule {
    fn from(rule: PrefixRule) -> Self {
        Rule::Prefix(rule)
    }
}

impl From<WildcardRule> for Rule {
    fn from(rule: WildcardRule) -> Self {
        Rule::Wildcard(rule)
    }
}

impl From<FuzzyRule> for Rule {
    fn from(rule: FuzzyRule) -> Self {
        Rule::Fuzzy(rule)
    }
}

impl From<AllOfRule> for Rule {
    fn from(rule: AllOfRule) -> Self {
        Rule::AllOf(rule)
    }
}

impl From<AnyOfRule> for Rule {
    fn from(rule: AnyOfRule) -> Self {
        Rule::AnyOf(rule)
    }
}

impl Serialize for Rule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Rule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Rule::from_json(&value).map_err(|e| D::Error::custom(e.to_string()))
    }
}

// ============================================================================
// filter
// ============================================================================

const FILTER_RELATIONS: [&str; 8] = [
    "after",
    "before",
    "contained_by",
    "containing",
    "not_contained_by",
    "not_containing",
    "not_overlapping",
    "overlapping",
];

/// Restriction of a rule's intervals by a second rule or a script
#[derive(Debug, Clone, PartialEq)]
pub enum IntervalFilter {
    /// `{"<relation>": <rule>}`, e.g. `{"not_containing": {"match": {...}}}`
    Rule { relation: String, rule: Box<Rule> },
    Script(Script),
}

impl IntervalFilter {
    pub fn new(relation: impl Into<String>, rule: impl Into<Rule>) -> Result<Self, DslError> {
        let relation = relation.into();
        if !FILTER_RELATIONS.contains(&relation.as_str()) {
            return Err(DslError::new(ErrorKind::InvalidParams)
                .with_clause(QueryKind::Intervals)
                .with_param("filter")
                .with_received(format!("{:?}", relation)));
        }
        Ok(IntervalFilter::Rule {
            relation,
            rule: Box::new(rule.into()),
        })
    }

    pub fn script(script: impl Into<Script>) -> Self {
        IntervalFilter::Script(script.into())
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        match self {
            IntervalFilter::Rule { relation, rule } => {
                map.insert(relation.clone(), rule.to_json());
            }
            IntervalFilter::Script(script) => {
                map.insert("script".to_string(), script.to_json());
            }
        }
        Value::Object(map)
    }

    pub fn from_json(value: &Value) -> Result<Self, DslError> {
        let invalid = || {
            DslError::new(ErrorKind::InvalidParams)
                .with_clause(QueryKind::Intervals)
                .with_param("filter")
                .with_received(value)
        };
        let map = value.as_object().ok_or_else(invalid)?;
        let mut entries = map.iter();
        let (key, body) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            _ => return Err(invalid()),
        };
        if key == "script" {
            return Ok(IntervalFilter::Script(Script::from_json(body)?));
        }
        let rule = Rule::from_json(body).map_err(|e| e.with_role(format!("filter.{}", key)))?;
        IntervalFilter::new(key.as_str(), rule)
    }

    fn slot(map: &Map<String, Value>) -> Result<Option<Box<IntervalFilter>>, DslError> {
        match map.get("filter") {
            None | Some(Value::Null) => Ok(None),
            Some(raw) => Ok(Some(Box::new(IntervalFilter::from_json(raw)?))),
        }
    }
}

// ============================================================================
// intervals query
// ============================================================================

/// Root rule applied to one field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntervalsQuery {
    field: String,
    rule: Option<Rule>,
    params: Params,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntervalsParams {
    pub field: String,
    pub rule: Option<Rule>,
    pub boost: Option<Loose>,
    pub name: Option<String>,
}

impl IntervalsParams {
    pub fn new(field: impl Into<String>, rule: impl Into<Rule>) -> Self {
        Self {
            field: field.into(),
            rule: Some(rule.into()),
            ..Default::default()
        }
    }

    pub fn build(self) -> Result<IntervalsQuery, DslError> {
        IntervalsQuery::new(self)
    }
}

parameterized!(IntervalsQuery, Some(QueryKind::Intervals), [
    WithBoost: Boost,
    WithName: Name,
]);

impl IntervalsQuery {
    pub fn new(record: IntervalsParams) -> Result<Self, DslError> {
        require_field(Self::KIND, &record.field)?;
        let field = record.field;
        let fail = |e: DslError| e.with_clause(QueryKind::Intervals).with_field(field.as_str());
        let rule = record
            .rule
            .ok_or_else(|| fail(DslError::new(ErrorKind::IntervalsRequired)))?;
        let mut params = Params::new();
        params.apply(Param::Boost, record.boost, Self::OWNER).map_err(fail)?;
        params.apply(Param::Name, record.name, Self::OWNER).map_err(fail)?;
        Ok(IntervalsQuery {
            field,
            rule: Some(rule),
            params,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn rule(&self) -> Option<&Rule> {
        self.rule.as_ref()
    }

    pub fn set_rule(&mut self, rule: impl Into<Rule>) {
        self.rule = Some(rule.into());
    }
}

impl ClauseBody for IntervalsQuery {
    const KIND: QueryKind = QueryKind::Intervals;

    fn is_empty(&self) -> bool {
        self.field.is_empty()
    }

    fn to_json(&self) -> Value {
        if self.is_empty() {
            return Value::Null;
        }
        let mut body = match self.rule.as_ref().map(Rule::to_json) {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        write_params(self, &mut body);
        wrap_field(&self.field, body)
    }

    fn decode(value: &Value) -> Result<Self, DslError> {
        let Some((field, body)) = field_keyed(value, None)? else {
            return Ok(Self::default());
        };
        let with_field = |e: DslError| e.with_field(field.as_str());
        let mut rules = RuleKind::ALL
            .iter()
            .filter_map(|kind| body.get(kind.as_str()).map(|raw| (*kind, raw)));
        let rule = match (rules.next(), rules.next()) {
            (Some((kind, raw)), None) => Rule::from_body(kind, raw).map_err(with_field)?,
            (None, _) => return Err(with_field(DslError::new(ErrorKind::IntervalsRequired))),
            (Some(_), Some((second, _))) => {
                return Err(with_field(
                    DslError::new(ErrorKind::InvalidParams)
                        .with_param(second.as_str())
                        .with_detail("an intervals query holds a single root rule"),
                ))
            }
        };
        let mut query = IntervalsQuery {
            field,
            rule: Some(rule),
            params: Params::new(),
        };
        read_params(&mut query, &body).map_err(|e| e.with_field(query.field.as_str()))?;
        let payload: Vec<&str> = RuleKind::ALL.iter().map(RuleKind::as_str).collect();
        report_unknown::<Self>(&body, &payload);
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;
    use crate::query::Query;
    use serde_json::json;

    fn favorite_food() -> Value {
        json!({
            "my_text": {
                "all_of": {
                    "ordered": true,
                    "intervals": [
                        {"match": {"query": "my favorite food", "max_gaps": 0, "ordered": true}},
                        {"any_of": {"intervals": [
                            {"match": {"query": "hot water"}},
                            {"match": {"query": "cold porridge"}}
                        ]}}
                    ]
                }
            }
        })
    }

    #[test]
    fn test_intervals_round_trip_preserves_order() {
        let q = IntervalsQuery::from_json(&favorite_food()).unwrap();
        assert_eq!(q.field(), "my_text");
        let Some(Rule::AllOf(all_of)) = q.rule() else {
            panic!("expected all_of, got {:?}", q.rule());
        };
        assert!(all_of.ordered());
        assert_eq!(all_of.max_gaps(), UNBOUNDED_GAPS);
        assert_eq!(all_of.intervals()[0].kind(), RuleKind::Match);
        assert_eq!(all_of.intervals()[1].kind(), RuleKind::AnyOf);
        assert_eq!(q.to_json(), favorite_food());
    }

    #[test]
    fn test_build_rule_tree() {
        let rule = AllOfRule::new(vec![
            MatchRule::new("my favorite food").unwrap().with_max_gaps(0).into(),
            PrefixRule::new("hot").unwrap().into(),
        ])
        .unwrap()
        .with_ordered(true);
        let q = IntervalsParams::new("my_text", rule).build().unwrap();
        assert_eq!(
            q.to_json(),
            json!({"my_text": {"all_of": {
                "intervals": [
                    {"match": {"query": "my favorite food", "max_gaps": 0}},
                    {"prefix": {"prefix": "hot"}}
                ],
                "ordered": true
            }}})
        );
    }

    #[test]
    fn test_empty_all_of_rejected() {
        let err = AllOfRule::new(Vec::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IntervalsRequired);

        let err = IntervalsQuery::from_json(&json!({"f": {"all_of": {"intervals": []}}})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IntervalsRequired);
        assert_eq!(err.clause(), Some(QueryKind::Intervals));
        assert_eq!(err.field(), Some("f"));
    }

    #[test]
    fn test_leaf_rules_require_text() {
        assert_eq!(MatchRule::new("").unwrap_err().kind(), ErrorKind::ValueRequired);
        assert_eq!(FuzzyRule::new("").unwrap_err().kind(), ErrorKind::ValueRequired);
        let err = Rule::from_json(&json!({"wildcard": {"use_field": "x"}})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueRequired);
    }

    #[test]
    fn test_unknown_rule_kind() {
        let err = Rule::from_json(&json!({"regexp": {"pattern": "a.*"}})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedKind);
    }

    #[test]
    fn test_nested_rule_error_names_position() {
        let err = Rule::from_json(&json!({"any_of": {"intervals": [
            {"match": {"query": "a"}},
            {"fuzzy": {}}
        ]}}))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueRequired);
        assert_eq!(err.role(), Some("any_of[1]"));
    }

    #[test]
    fn test_fuzzy_rule_params() {
        let rule = Rule::from_json(&json!({"fuzzy": {"term": "quikc", "fuzziness": "AUTO", "prefix_length": 1}}))
            .unwrap();
        let Rule::Fuzzy(fuzzy) = &rule else {
            panic!("expected fuzzy rule");
        };
        assert_eq!(fuzzy.fuzziness(), "AUTO");
        assert_eq!(fuzzy.prefix_length(), 1);
        assert!(fuzzy.transpositions());
    }

    #[test]
    fn test_filter_rule_and_script() {
        let body = json!({"body": {"match": {
            "query": "hot porridge",
            "max_gaps": 10,
            "filter": {"not_containing": {"match": {"query": "salty"}}}
        }}});
        let q = IntervalsQuery::from_json(&body).unwrap();
        let Some(Rule::Match(rule)) = q.rule() else {
            panic!("expected match rule");
        };
        assert!(matches!(rule.filter(), Some(IntervalFilter::Rule { relation, .. }) if relation == "not_containing"));
        assert_eq!(q.to_json(), body);

        let filter = IntervalFilter::from_json(&json!({"script": {"source": "interval.start > 10"}})).unwrap();
        assert!(matches!(filter, IntervalFilter::Script(_)));

        let err = IntervalFilter::new("around", MatchRule::new("x").unwrap()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParams);
    }

    #[test]
    fn test_intervals_in_query_envelope() {
        let q = Query::from_json(&json!({
            "intervals": {"title": {"wildcard": {"pattern": "qu*k"}, "boost": 2}}
        }))
        .unwrap();
        let intervals = q.intervals().unwrap();
        assert_eq!(intervals.boost(), 2.0);
        assert_eq!(
            q.to_json(),
            json!({"intervals": {"title": {"wildcard": {"pattern": "qu*k"}, "boost": 2.0}}})
        );
    }

    #[test]
    fn test_rule_serde() {
        let rule: Rule = serde_json::from_value(json!({"prefix": {"prefix": "out"}})).unwrap();
        assert_eq!(rule.kind(), RuleKind::Prefix);
        assert_eq!(serde_json::to_value(&rule).unwrap(), json!({"prefix": {"prefix": "out"}}));
    }
}
