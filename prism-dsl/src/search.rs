//! Top-level `_search` request body
//!
//! [`Search`] embeds one [`Query`] next to paging, source filtering and
//! response options. Aggregations and runtime mappings are carried as opaque
//! JSON.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{DslError, ErrorKind};
use crate::query::{Query, QueryParams};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Search {
    #[serde(default, skip_serializing_if = "query_is_empty")]
    pub query: Option<Query>,

    /// Starting offset (default 0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<u64>,

    /// Maximum number of hits (default 10)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    #[serde(default, rename = "_source", skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceFilter>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldAndFormat>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docvalue_fields: Vec<FieldAndFormat>,

    /// Per-index score multipliers
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub indices_boost: BTreeMap<String, f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,

    /// Point in time to search against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pit: Option<PointInTime>,

    /// Statistics groups to tag the request with
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stats: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminate_after: Option<u64>,

    /// Duration string such as `"2s"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explain: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq_no_primary_term: Option<bool>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub runtime_mappings: Map<String, Value>,

    /// Aggregations
    #[serde(default, alias = "aggregations", skip_serializing_if = "Map::is_empty")]
    pub aggs: Map<String, Value>,

    /// Sort order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortClause>,

    /// Track total hits exactly, or up to a count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_total_hits: Option<TrackTotalHits>,
}

fn query_is_empty(query: &Option<Query>) -> bool {
    query.as_ref().map_or(true, Query::is_empty)
}

impl Search {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: Query) -> Self {
        self.query = Some(query);
        self
    }

    /// Build the query from parameter records and embed it
    pub fn with_query_params(mut self, params: impl Into<QueryParams>) -> Result<Self, DslError> {
        self.query = Some(params.into().build()?);
        Ok(self)
    }

    pub fn with_from(mut self, from: u64) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_source(mut self, source: impl Into<SourceFilter>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_sort(mut self, sort: SortClause) -> Self {
        self.sort.push(sort);
        self
    }

    pub fn to_json(&self) -> Result<Value, DslError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json_string(&self) -> Result<String, DslError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a request body; query errors keep their clause context
    pub fn from_json(value: &Value) -> Result<Self, DslError> {
        let map = value.as_object().ok_or_else(|| {
            DslError::new(ErrorKind::InvalidParams)
                .with_detail("expected a search request object")
                .with_json(value)
        })?;
        if let Some(raw) = map.get("_source") {
            SourceFilter::from_json(raw)?;
        }
        let query = match map.get("query") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(Query::from_json(raw)?),
        };
        let mut rest = map.clone();
        rest.remove("query");
        let mut search: Search = serde_json::from_value(Value::Object(rest))?;
        search.query = query;
        Ok(search)
    }

    pub fn from_json_str(json: &str) -> Result<Self, DslError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json(&value)
    }
}

// ============================================================================
// _source
// ============================================================================

/// `_source` filtering: on/off, field patterns, or includes/excludes
#[derive(Debug, Clone, PartialEq)]
pub enum SourceFilter {
    Enabled(bool),
    Field(String),
    Fields(Vec<String>),
    Filter {
        includes: Vec<String>,
        excludes: Vec<String>,
    },
}

impl SourceFilter {
    pub fn to_json(&self) -> Value {
        let list = |items: &[String]| Value::Array(items.iter().cloned().map(Value::String).collect());
        match self {
            SourceFilter::Enabled(enabled) => Value::Bool(*enabled),
            SourceFilter::Field(field) => Value::from(field.as_str()),
            SourceFilter::Fields(fields) => list(fields),
            SourceFilter::Filter { includes, excludes } => {
                let mut map = Map::new();
                if !includes.is_empty() {
                    map.insert("includes".to_string(), list(includes));
                }
                if !excludes.is_empty() {
                    map.insert("excludes".to_string(), list(excludes));
                }
                Value::Object(map)
            }
        }
    }

    /// Any shape other than bool, string, string array or filter object is `InvalidSourceKind`
    pub fn from_json(value: &Value) -> Result<Self, DslError> {
        let invalid = || {
            DslError::new(ErrorKind::InvalidSourceKind)
                .with_param("_source")
                .with_received(value)
        };
        let strings = |raw: &Value| -> Result<Vec<String>, DslError> {
            match raw {
                Value::Null => Ok(Vec::new()),
                Value::String(s) => Ok(vec![s.clone()]),
                Value::Array(items) => items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
                    .collect(),
                _ => Err(invalid()),
            }
        };
        match value {
            Value::Bool(enabled) => Ok(SourceFilter::Enabled(*enabled)),
            Value::String(field) => Ok(SourceFilter::Field(field.clone())),
            Value::Array(_) => Ok(SourceFilter::Fields(strings(value)?)),
            Value::Object(map) => {
                // "include"/"exclude" are accepted spellings of the engine
                let pick = |plural: &str, singular: &str| {
                    map.get(plural)
                        .or_else(|| map.get(singular))
                        .map_or(Ok(Vec::new()), strings)
                };
                Ok(SourceFilter::Filter {
                    includes: pick("includes", "include")?,
                    excludes: pick("excludes", "exclude")?,
                })
            }
            _ => Err(invalid()),
        }
    }
}

impl From<bool> for SourceFilter {
    fn from(enabled: bool) -> Self {
        SourceFilter::Enabled(enabled)
    }
}

impl From<&str> for SourceFilter {
    fn from(field: &str) -> Self {
        SourceFilter::Field(field.to_string())
    }
}

impl From<Vec<&str>> for SourceFilter {
    fn from(fields: Vec<&str>) -> Self {
        SourceFilter::Fields(fields.into_iter().map(str::to_string).collect())
    }
}

impl Serialize for SourceFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SourceFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        SourceFilter::from_json(&value).map_err(|e| D::Error::custom(e.to_string()))
    }
}

// ============================================================================
// fields, pit, sort, track_total_hits
// ============================================================================

/// Entry of `fields` / `docvalue_fields`: a pattern, optionally with a format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldAndFormat {
    Name(String),
    Spec {
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<String>,
    },
}

impl From<&str> for FieldAndFormat {
    fn from(name: &str) -> Self {
        FieldAndFormat::Name(name.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointInTime {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SortClause {
    /// Field name, or `_score` / `_doc`
    Field(String),
    Object(BTreeMap<String, SortSpec>),
}

impl SortClause {
    pub fn field(field: impl Into<String>, order: SortOrder) -> Self {
        let mut map = BTreeMap::new();
        map.insert(field.into(), SortSpec::Order(order));
        SortClause::Object(map)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SortSpec {
    Order(SortOrder),
    Options(SortOptions),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SortOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unmapped_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrackTotalHits {
    Bool(bool),
    Count(u64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;
    use crate::query::TermParams;
    use serde_json::json;

    #[test]
    fn test_search_round_trip() {
        let body = json!({
            "query": {"match": {"title": {"query": "rust"}}},
            "from": 20,
            "size": 10,
            "_source": {"includes": ["title", "author.*"], "excludes": ["body"]},
            "fields": ["title", {"field": "created", "format": "epoch_millis"}],
            "docvalue_fields": ["tags"],
            "indices_boost": {"docs-2024": 1.5},
            "min_score": 0.5,
            "pit": {"id": "46ToAwMDaWR5", "keep_alive": "1m"},
            "stats": ["group_a"],
            "terminate_after": 1000,
            "timeout": "2s",
            "version": true,
            "explain": false,
            "seq_no_primary_term": true,
            "runtime_mappings": {"day": {"type": "keyword", "script": "emit('x')"}},
            "aggs": {"by_tag": {"terms": {"field": "tags"}}},
            "sort": ["_score", {"created": "desc"}, {"price": {"order": "asc", "mode": "avg"}}],
            "track_total_hits": 10000
        });
        let search = Search::from_json(&body).unwrap();
        assert_eq!(search.size, Some(10));
        assert_eq!(search.query.as_ref().unwrap().match_query().unwrap().query(), "rust");
        assert_eq!(search.track_total_hits, Some(TrackTotalHits::Count(10000)));
        assert_eq!(search.to_json().unwrap(), body);
    }

    #[test]
    fn test_source_kinds() {
        let cases = [
            json!(false),
            json!("title"),
            json!(["title", "body"]),
            json!({"includes": ["a"]}),
        ];
        for raw in cases {
            let source = SourceFilter::from_json(&raw).unwrap();
            assert_eq!(source.to_json(), raw);
        }
        let legacy = SourceFilter::from_json(&json!({"include": "a", "exclude": ["b"]})).unwrap();
        assert_eq!(
            legacy,
            SourceFilter::Filter {
                includes: vec!["a".to_string()],
                excludes: vec!["b".to_string()],
            }
        );
    }

    #[test]
    fn test_invalid_source_kind() {
        let err = Search::from_json(&json!({"_source": 5})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSourceKind);
        let err = SourceFilter::from_json(&json!([1, 2])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSourceKind);
    }

    #[test]
    fn test_aggregations_alias() {
        let search = Search::from_json(&json!({
            "size": 0,
            "aggregations": {"max_price": {"max": {"field": "price"}}}
        }))
        .unwrap();
        assert!(search.aggs.contains_key("max_price"));
        assert_eq!(
            search.to_json().unwrap(),
            json!({"size": 0, "aggs": {"max_price": {"max": {"field": "price"}}}})
        );
    }

    #[test]
    fn test_query_errors_surface() {
        let err = Search::from_json_str(r#"{"query": {"percolate": {}}}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedKind);
        let err = Search::from_json_str("{").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidJson);
    }

    #[test]
    fn test_builder() {
        let search = Search::new()
            .with_query_params(TermParams::new("user.id", "kimchy"))
            .unwrap()
            .with_size(5)
            .with_source(vec!["user.id"])
            .with_sort(SortClause::field("created", SortOrder::Desc));
        assert_eq!(search.query.as_ref().unwrap().term().unwrap().boost(), 1.0);
        assert_eq!(
            search.to_json().unwrap(),
            json!({
                "query": {"term": {"user.id": {"value": "kimchy"}}},
                "size": 5,
                "_source": ["user.id"],
                "sort": [{"created": "desc"}]
            })
        );
    }

    #[test]
    fn test_empty_search() {
        let search = Search::from_json(&json!({"query": {}})).unwrap();
        assert_eq!(search.to_json().unwrap(), json!({}));
        assert_eq!(serde_json::from_value::<Search>(json!({})).unwrap(), Search::new());
    }
}
