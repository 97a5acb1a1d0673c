//! Script-driven clauses and the match-everything / match-nothing pair

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{DslError, ErrorKind};
use crate::input::Loose;
use crate::params::{read_params, report_unknown, write_params, Param, Parameterized, Params};

use super::shape::{flat, string};
use super::{build_slot, parse_slot, ClauseBody, Query, QueryKind, QueryParams};

/// An inline (`source`) or stored (`id`) script
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    pub source: String,
    pub id: String,
    pub lang: String,
    pub params: Map<String, Value>,
}

impl Script {
    pub fn inline(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }

    pub fn stored(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty() && self.id.is_empty()
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        if !self.source.is_empty() {
            map.insert("source".to_string(), Value::from(self.source.as_str()));
        }
        if !self.id.is_empty() {
            map.insert("id".to_string(), Value::from(self.id.as_str()));
        }
        if !self.lang.is_empty() {
            map.insert("lang".to_string(), Value::from(self.lang.as_str()));
        }
        if !self.params.is_empty() {
            map.insert("params".to_string(), Value::Object(self.params.clone()));
        }
        Value::Object(map)
    }

    /// A bare string is shorthand for `{"source": ...}`
    pub fn from_json(value: &Value) -> Result<Self, DslError> {
        match value {
            Value::Null => Ok(Script::default()),
            Value::String(source) => Ok(Script::inline(source.as_str())),
            Value::Object(map) => {
                let params = match map.get("params") {
                    None | Some(Value::Null) => Map::new(),
                    Some(Value::Object(params)) => params.clone(),
                    Some(other) => {
                        return Err(DslError::new(ErrorKind::InvalidParams)
                            .with_param("params")
                            .with_received(other))
                    }
                };
                Ok(Script {
                    source: string(map, "source")?.unwrap_or_default(),
                    id: string(map, "id")?.unwrap_or_default(),
                    lang: string(map, "lang")?.unwrap_or_default(),
                    params,
                })
            }
            other => Err(DslError::new(ErrorKind::InvalidParams)
                .with_param("script")
                .with_received(other)),
        }
    }

    pub(crate) fn required(script: Option<Script>) -> Result<Script, DslError> {
        script
            .filter(|s| !s.is_empty())
            .ok_or_else(|| DslError::new(ErrorKind::ScriptRequired))
    }
}

impl From<&str> for Script {
    fn from(source: &str) -> Self {
        Script::inline(source)
    }
}

impl Serialize for Script {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Script {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Script::from_json(&value).map_err(|e| D::Error::custom(e.to_string()))
    }
}

// ============================================================================
// script
// ============================================================================

/// Filter documents with a boolean script
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptQuery {
    script: Script,
    params: Params,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptParams {
    pub script: Option<Script>,
    pub boost: Option<Loose>,
    pub name: Option<String>,
}

impl ScriptParams {
    pub fn new(script: impl Into<Script>) -> Self {
        Self {
            script: Some(script.into()),
            ..Default::default()
        }
    }

    pub fn build(self) -> Result<ScriptQuery, DslError> {
        ScriptQuery::new(self)
    }
}

parameterized!(ScriptQuery, Some(QueryKind::Script), [
    WithBoost: Boost,
    WithName: Name,
]);

impl ScriptQuery {
    pub fn new(record: ScriptParams) -> Result<Self, DslError> {
        let script = Script::required(record.script).map_err(|e| e.with_clause(Self::KIND))?;
        let mut params = Params::new();
        params.apply(Param::Boost, record.boost, Self::OWNER)?;
        params.apply(Param::Name, record.name, Self::OWNER)?;
        Ok(ScriptQuery { script, params })
    }

    pub fn script(&self) -> &Script {
        &self.script
    }
}

impl ClauseBody for ScriptQuery {
    const KIND: QueryKind = QueryKind::Script;

    fn is_empty(&self) -> bool {
        self.script.is_empty()
    }

    fn to_json(&self) -> Value {
        if self.is_empty() {
            return Value::Null;
        }
        let mut body = Map::new();
        body.insert("script".to_string(), self.script.to_json());
        write_params(self, &mut body);
        Value::Object(body)
    }

    fn decode(value: &Value) -> Result<Self, DslError> {
        let Some(body) = flat(value)? else {
            return Ok(Self::default());
        };
        let script = match body.get("script") {
            Some(raw) => Script::from_json(raw)?,
            None => Script::default(),
        };
        let mut query = ScriptQuery {
            script,
            params: Params::new(),
        };
        read_params(&mut query, body)?;
        report_unknown::<Self>(body, &["script"]);
        if query.script.is_empty() && !query.params.is_default() {
            return Err(DslError::new(ErrorKind::ScriptRequired));
        }
        Ok(query)
    }
}

// ============================================================================
// script_score
// ============================================================================

/// Rescore the documents of an inner query with a script
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptScoreQuery {
    query: Option<Box<Query>>,
    script: Script,
    params: Params,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptScoreParams {
    pub query: Option<QueryParams>,
    pub script: Option<Script>,
    pub min_score: Option<Loose>,
    pub boost: Option<Loose>,
    pub name: Option<String>,
}

impl ScriptScoreParams {
    pub fn new(query: impl Into<QueryParams>, script: impl Into<Script>) -> Self {
        Self {
            query: Some(query.into()),
            script: Some(script.into()),
            ..Default::default()
        }
    }

    pub fn build(self) -> Result<ScriptScoreQuery, DslError> {
        ScriptScoreQuery::new(self)
    }
}

parameterized!(ScriptScoreQuery, Some(QueryKind::ScriptScore), [
    WithMinScore: MinScore,
    WithBoost: Boost,
    WithName: Name,
]);

impl ScriptScoreQuery {
    pub fn new(record: ScriptScoreParams) -> Result<Self, DslError> {
        let query = build_slot(record.query, "query")?
            .ok_or_else(|| DslError::new(ErrorKind::QueryRequired).with_clause(Self::KIND))?;
        let script = Script::required(record.script).map_err(|e| e.with_clause(Self::KIND))?;
        let mut params = Params::new();
        params.apply(Param::MinScore, record.min_score, Self::OWNER)?;
        params.apply(Param::Boost, record.boost, Self::OWNER)?;
        params.apply(Param::Name, record.name, Self::OWNER)?;
        Ok(ScriptScoreQuery {
            query: Some(query),
            script,
            params,
        })
    }

    pub fn query(&self) -> Option<&Query> {
        self.query.as_deref()
    }

    pub fn script(&self) -> &Script {
        &self.script
    }
}

impl ClauseBody for ScriptScoreQuery {
    const KIND: QueryKind = QueryKind::ScriptScore;

    fn is_empty(&self) -> bool {
        self.query.is_none() && self.script.is_empty()
    }

    fn to_json(&self) -> Value {
        if self.is_empty() {
            return Value::Null;
        }
        let mut body = Map::new();
        if let Some(query) = &self.query {
            body.insert("query".to_string(), query.to_json());
        }
        body.insert("script".to_string(), self.script.to_json());
        write_params(self, &mut body);
        Value::Object(body)
    }

    fn decode(value: &Value) -> Result<Self, DslError> {
        let Some(body) = flat(value)? else {
            return Ok(Self::default());
        };
        let query = parse_slot(body, "query")?;
        let script = match body.get("script") {
            Some(raw) => Script::from_json(raw)?,
            None => Script::default(),
        };
        if query.is_none() && script.is_empty() {
            return Ok(Self::default());
        }
        if query.is_none() {
            return Err(DslError::new(ErrorKind::QueryRequired));
        }
        if script.is_empty() {
            return Err(DslError::new(ErrorKind::ScriptRequired));
        }
        let mut clause = ScriptScoreQuery {
            query,
            script,
            params: Params::new(),
        };
        read_params(&mut clause, body)?;
        report_unknown::<Self>(body, &["query", "script"]);
        Ok(clause)
    }
}

// ============================================================================
// match_all / match_none
// ============================================================================

macro_rules! constant_clause {
    ($(#[$doc:meta])* $query:ident, $record:ident, $kind:ident) => {
        $(#[$doc])*
        ///
        /// The clause carries no payload, so `{}` is a present clause; only
        /// the cleared default is empty.
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $query {
            present: bool,
            params: Params,
        }

        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $record {
            pub boost: Option<Loose>,
            pub name: Option<String>,
        }

        impl $record {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn build(self) -> Result<$query, DslError> {
                $query::new(self)
            }
        }

        parameterized!($query, Some(QueryKind::$kind), [
            WithBoost: Boost,
            WithName: Name,
        ]);

        impl $query {
            pub fn new(record: $record) -> Result<Self, DslError> {
                let mut params = Params::new();
                params.apply(Param::Boost, record.boost, Self::OWNER)?;
                params.apply(Param::Name, record.name, Self::OWNER)?;
                Ok($query {
                    present: true,
                    params,
                })
            }
        }

        impl ClauseBody for $query {
            const KIND: QueryKind = QueryKind::$kind;

            fn is_empty(&self) -> bool {
                !self.present
            }

            fn to_json(&self) -> Value {
                if self.is_empty() {
                    return Value::Null;
                }
                let mut body = Map::new();
                write_params(self, &mut body);
                Value::Object(body)
            }

            fn decode(value: &Value) -> Result<Self, DslError> {
                let Some(body) = flat(value)? else {
                    return Ok(Self::default());
                };
                let mut query = $query {
                    present: true,
                    params: Params::new(),
                };
                read_params(&mut query, body)?;
                report_unknown::<Self>(body, &[]);
                Ok(query)
            }
        }
    };
}

constant_clause!(
    /// Every document, scored `boost`
    MatchAllQuery, MatchAllParams, MatchAll
);
constant_clause!(
    /// No documents
    MatchNoneQuery, MatchNoneParams, MatchNone
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;
    use crate::query::TermParams;
    use serde_json::json;

    #[test]
    fn test_script_string_shorthand() {
        let script = Script::from_json(&json!("doc['n'].value > 1")).unwrap();
        assert_eq!(script.source, "doc['n'].value > 1");
        assert_eq!(script.to_json(), json!({"source": "doc['n'].value > 1"}));
    }

    #[test]
    fn test_script_query_round_trip() {
        let body = json!({
            "script": {
                "source": "doc['num1'].value > params.param1",
                "lang": "painless",
                "params": {"param1": 5}
            },
            "_name": "s"
        });
        let q = ScriptQuery::from_json(&body).unwrap();
        assert_eq!(q.script().lang, "painless");
        assert_eq!(q.name(), "s");
        assert_eq!(q.to_json(), body);
    }

    #[test]
    fn test_script_required() {
        let err = ScriptParams::default().build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ScriptRequired);
        assert_eq!(err.clause(), Some(QueryKind::Script));
    }

    #[test]
    fn test_script_score_requires_query_then_script() {
        let err = ScriptScoreParams {
            script: Some("_score".into()),
            ..Default::default()
        }
        .build()
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::QueryRequired);

        let err = ScriptScoreParams {
            query: Some(TermParams::new("a", "b").into()),
            ..Default::default()
        }
        .build()
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ScriptRequired);
    }

    #[test]
    fn test_script_score_min_score() {
        let q = ScriptScoreParams {
            min_score: Some(2.into()),
            ..ScriptScoreParams::new(
                TermParams::new("a", "b"),
                Script::inline("doc['likes'].value / 10"),
            )
        }
        .build()
        .unwrap();
        assert_eq!(q.min_score(), 2.0);
        assert_eq!(
            q.to_json(),
            json!({
                "query": {"term": {"a": {"value": "b"}}},
                "script": {"source": "doc['likes'].value / 10"},
                "min_score": 2.0
            })
        );
    }

    #[test]
    fn test_match_all_empty_object_is_present() {
        let q = MatchAllQuery::from_json(&json!({})).unwrap();
        assert!(!q.is_empty());
        assert_eq!(q.to_json(), json!({}));
        assert!(MatchAllQuery::default().is_empty());
    }

    #[test]
    fn test_match_none_boost() {
        let q = MatchNoneParams {
            boost: Some("1.5".into()),
            ..Default::default()
        }
        .build()
        .unwrap();
        assert_eq!(q.to_json(), json!({"boost": 1.5}));
    }
}
